//! Nullable infrastructure for deterministic testing.
//!
//! Every host-ledger dependency of the oracle (authorization, account
//! existence, result delivery) sits behind a trait. This crate provides
//! test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! It also ships a deterministic RSA signer standing in for the off-chain
//! oracle process.
//!
//! Usage: swap real implementations for nullables in tests and dry runs.

pub mod ledger;
pub mod signer;
pub mod sink;

pub use ledger::NullLedger;
pub use signer::NullSigner;
pub use sink::NullResultSink;
