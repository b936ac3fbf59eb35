//! `SeaORM` entity definitions.

pub mod customers;
pub mod debts;
pub mod pending_payments;
pub mod sessions;
pub mod sites;
pub mod users;
