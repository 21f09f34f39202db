//! Shared types and models for the textile production and cash ledger service
//!
//! This crate contains the domain types and the pure ledger calculations
//! shared between the backend, the browser (via WASM), and tests.

pub mod ledger;
pub mod models;
pub mod validation;

pub use ledger::*;
pub use models::*;
pub use validation::*;
