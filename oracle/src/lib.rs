//! The ORNG verifiable random-number oracle.
//!
//! Consumers ("dapps") request randomness by submitting a signing value. The
//! oracle process signs it with the active RSA key and submits the signature;
//! the service verifies it and delivers SHA-256 of the signature to the dapp.
//!
//! - [`KeyRegistry`]: registered keys, rotation, per-key signing-value scopes
//! - [`JobStore`]: outstanding jobs under a monotonic auto-index
//! - [`AdmissionControl`]: per-dapp quota, bans, bandwidth payers
//! - [`ErrorLog`]: bounded per-dapp ring of reported job errors
//! - [`OracleService`]: the action entry points, applied all-or-nothing

pub mod action;
pub mod admission;
pub mod config;
pub mod config_table;
pub mod error;
pub mod error_log;
pub mod job_store;
pub mod key_registry;
pub mod rotation;
pub mod service;
pub mod state;
pub mod verifier;

pub use action::{Action, ActionOutcome, SignedAction};
pub use admission::{AdmissionControl, AdmissionLimits};
pub use config::{OracleConfig, RotationMode};
pub use config_table::ConfigTable;
pub use error::OracleError;
pub use error_log::ErrorLog;
pub use job_store::JobStore;
pub use key_registry::KeyRegistry;
pub use rotation::{RandomRotation, Rotation};
pub use service::{OracleService, RequestOutcome, VERSION};
pub use state::OracleState;
