//! Pending-payment domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pending-payment status.
///
/// The only valid transitions are:
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject)
///
/// Approved and Rejected are terminal: no re-approval, no un-rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingPaymentStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved and applied to the debt (terminal).
    Approved,
    /// Rejected without touching the debt (terminal).
    Rejected,
}

impl PendingPaymentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for PendingPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
