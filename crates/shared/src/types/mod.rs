//! Common types used across the application.

pub mod money;

pub use money::{MONEY_SCALE, to_minor_units, valid_money_scale};
