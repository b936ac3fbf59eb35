//! Shared types, configuration, and external-service contracts for Fiado.
//!
//! This crate provides common pieces used across all other crates:
//! - Money-scale rules for fixed-point currency amounts
//! - The ledger gateway contract (blockchain anchoring)
//! - Application-wide configuration management

pub mod config;
pub mod ledger;
pub mod types;

pub use config::AppConfig;
pub use ledger::{LedgerError, LedgerGateway, SorobanGateway};
