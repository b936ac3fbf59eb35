//! Role-based access policy.
//!
//! The policy is a pure function over [`Role`] and [`Action`]; the API
//! layer evaluates it after the session middleware resolved the caller.

pub mod policy;

pub use policy::{Action, Role, can};
