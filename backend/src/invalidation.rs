//! Stale-view notifications
//!
//! After a successful mutation the services announce which collections
//! changed. Readers holding cached listings drop them and fetch again.
//! Nothing is sent for failed calls, except production runs that left
//! partial writes behind.

use serde::Serialize;
use tokio::sync::broadcast;

/// Persisted collections a client may cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    RawMaterials,
    ProductionRecords,
    FinishedGoods,
    Transactions,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::RawMaterials => "raw_materials",
            Collection::ProductionRecords => "production_records",
            Collection::FinishedGoods => "finished_goods",
            Collection::Transactions => "transactions",
        }
    }
}

/// Broadcast channel of stale collections
#[derive(Clone)]
pub struct Invalidations {
    sender: broadcast::Sender<Collection>,
}

impl Invalidations {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Collection> {
        self.sender.subscribe()
    }

    /// Mark collections stale; a no-op when nobody is listening
    pub fn notify(&self, collections: &[Collection]) {
        for collection in collections {
            tracing::debug!(collection = collection.as_str(), "collection stale");
            // Err only means there are no subscribers
            let _ = self.sender.send(*collection);
        }
    }
}
