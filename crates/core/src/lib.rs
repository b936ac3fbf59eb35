//! Core business logic for Fiado.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and balance
//! calculations live here.
//!
//! # Modules
//!
//! - `debt` - Debt balance math and status rules
//! - `payment` - Pending-payment decision state machine
//! - `auth` - Role-based access policy

pub mod auth;
pub mod debt;
pub mod payment;
