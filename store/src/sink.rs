use orng_types::Delivery;

use crate::StoreError;

/// Trait for handing resolved results to consumers.
///
/// Delivery is fire-and-forget from the oracle's point of view: a failure is
/// logged but never rolls back the job's resolution.
pub trait ResultSink: Send + Sync {
    fn deliver(&self, delivery: &Delivery) -> Result<(), StoreError>;
}
