//! Business logic services for the textile production ledger

pub mod cash_ledger;
pub mod dashboard;
pub mod finished_goods;
pub mod production;
pub mod raw_material;

pub use cash_ledger::CashLedgerService;
pub use dashboard::DashboardService;
pub use finished_goods::FinishedGoodsService;
pub use production::{ProductionOutcome, ProductionService, RetryPolicy};
pub use raw_material::StockLedgerService;
