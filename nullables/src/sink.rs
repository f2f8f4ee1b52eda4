//! Nullable result sink — records deliveries instead of sending them.

use orng_store::{ResultSink, StoreError};
use orng_types::Delivery;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A result sink that keeps every delivery in memory.
pub struct NullResultSink {
    delivered: Mutex<Vec<Delivery>>,
    reject: AtomicBool,
}

impl NullResultSink {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            reject: AtomicBool::new(false),
        }
    }

    /// All deliveries accepted so far, in order.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn last_delivery(&self) -> Option<Delivery> {
        self.delivered.lock().unwrap().last().cloned()
    }

    /// Make subsequent deliveries fail, simulating a consumer whose
    /// callback aborts.
    pub fn reject_deliveries(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }
}

impl Default for NullResultSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultSink for NullResultSink {
    fn deliver(&self, delivery: &Delivery) -> Result<(), StoreError> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(StoreError::DeliveryRejected(delivery.recipient.to_string()));
        }
        self.delivered.lock().unwrap().push(delivery.clone());
        Ok(())
    }
}
