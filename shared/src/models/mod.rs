//! Domain models for the textile production and cash ledger service

mod dashboard;
mod finished_good;
mod production;
mod raw_material;
mod transaction;

pub use dashboard::*;
pub use finished_good::*;
pub use production::*;
pub use raw_material::*;
pub use transaction::*;
