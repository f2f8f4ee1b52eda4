use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account not found: {0}")]
    NotFound(String),

    #[error("ledger backend error: {0}")]
    Backend(String),

    #[error("delivery rejected: {0}")]
    DeliveryRejected(String),
}
