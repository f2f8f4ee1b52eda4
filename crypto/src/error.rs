use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid hex in {field}: {reason}")]
    InvalidHex { field: &'static str, reason: String },

    #[error("invalid RSA public key: {0}")]
    InvalidKey(String),

    #[error("signature verification failed")]
    BadSignature,
}
