//! Abstract host-ledger collaborator traits for the ORNG oracle.
//!
//! The oracle never talks to a ledger directly. Authorization checks, account
//! existence and result delivery all go through these traits; the rest of the
//! codebase depends only on the traits.

pub mod authority;
pub mod directory;
pub mod error;
pub mod sink;

pub use authority::{AuthorityChecker, Requirement};
pub use directory::AccountDirectory;
pub use error::StoreError;
pub use sink::ResultSink;

/// Everything the oracle needs from the host ledger besides result delivery.
pub trait Ledger: AuthorityChecker + AccountDirectory + Send + Sync {}

impl<T: AuthorityChecker + AccountDirectory + Send + Sync> Ledger for T {}
