//! HTTP handlers

pub mod dashboard;
pub mod finished_goods;
pub mod health;
pub mod invalidation;
pub mod production;
pub mod raw_material;
pub mod transaction;

pub use dashboard::*;
pub use finished_goods::*;
pub use health::*;
pub use invalidation::*;
pub use production::*;
pub use raw_material::*;
pub use transaction::*;
