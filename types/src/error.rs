use thiserror::Error;

/// Errors raised while parsing account or permission names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name must be 1 to {max} characters, got {len}", max = crate::Name::MAX_LEN)]
    InvalidLength { len: usize },

    #[error("invalid character {ch:?} in name {name:?}")]
    InvalidCharacter { name: String, ch: char },

    #[error("name {0:?} must not end with '.'")]
    TrailingDot(String),

    #[error("permission level {0:?} must look like actor@permission")]
    InvalidPermissionLevel(String),
}
