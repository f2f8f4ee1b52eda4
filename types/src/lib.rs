//! Fundamental types for the ORNG random-number oracle.
//!
//! This crate defines the rows shared across every other crate in the workspace:
//! account names, permission levels, jobs, signing keys, per-dapp configuration,
//! error log entries and result deliveries.

pub mod dapp;
pub mod delivery;
pub mod error;
pub mod error_log;
pub mod job;
pub mod key;
pub mod name;

pub use dapp::{BwPayerLink, DappConfig};
pub use delivery::{Delivery, RandomValue};
pub use error::NameError;
pub use error_log::ErrorLogEntry;
pub use job::{Job, JobId};
pub use key::{KeyConfig, KeyId, PublicKey};
pub use name::{Name, PermissionLevel};
