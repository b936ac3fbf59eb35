//! Pure role/action policy table.

use serde::{Deserialize, Serialize};

/// User role in the system hierarchy.
///
/// Roles are ordered from lowest to highest privilege. Higher roles can
/// perform all actions of lower roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Day-to-day staff; read-only access.
    Employee = 0,
    /// Runs a site; registers debts and decides payments.
    Manager = 1,
    /// Oversees several sites; may also delete settled debts.
    Director = 2,
    /// Full access.
    SuperAdmin = 3,
}

impl Role {
    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "employee" => Some(Self::Employee),
            "manager" => Some(Self::Manager),
            "director" => Some(Self::Director),
            "super_admin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Director => "director",
            Self::SuperAdmin => "super_admin",
        }
    }
}

/// Protected action on a core resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// List and inspect debts and payments.
    ViewDebts,
    /// Create debts and register direct payments.
    ManageDebts,
    /// Approve or reject pending payments.
    DecidePayments,
    /// Delete debts without payments.
    DeleteDebts,
}

/// Evaluates the access policy.
#[must_use]
pub const fn can(role: Role, action: Action) -> bool {
    match action {
        Action::ViewDebts => true,
        Action::ManageDebts | Action::DecidePayments => role as u8 >= Role::Manager as u8,
        Action::DeleteDebts => role as u8 >= Role::Director as u8,
    }
}
