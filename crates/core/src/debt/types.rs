//! Debt domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Debt repayment status.
///
/// The status is derived from the balance, never set directly by a
/// payment: `paid == 0` ⇒ pending, `0 < paid < total` ⇒ partial,
/// `paid >= total` ⇒ paid. Cancellation is an administrative state that
/// only applies to debts without payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtStatus {
    /// No payment received yet.
    Pending,
    /// Partially repaid.
    Partial,
    /// Fully repaid.
    Paid,
    /// Administratively cancelled.
    Cancelled,
}

impl DebtStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "partial" => Some(Self::Partial),
            "paid" => Some(Self::Paid),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if the debt can still receive payments.
    #[must_use]
    pub fn accepts_payments(&self) -> bool {
        matches!(self, Self::Pending | Self::Partial)
    }
}

impl fmt::Display for DebtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    /// Cash handed over in person.
    Cash,
    /// Bank transfer.
    Transfer,
    /// Card payment.
    Card,
    /// Paid directly on the blockchain ledger.
    Ledger,
}

impl PaymentType {
    /// Returns the string representation of the payment type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Transfer => "transfer",
            Self::Card => "card",
            Self::Ledger => "ledger",
        }
    }

    /// Parses a payment type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "transfer" => Some(Self::Transfer),
            "card" => Some(Self::Card),
            "ledger" => Some(Self::Ledger),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
