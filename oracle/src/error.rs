use orng_store::{Requirement, StoreError};
use orng_types::{JobId, KeyId, Name, NameError};
use thiserror::Error;

/// Every way an oracle action can be rejected. A rejected action leaves no
/// trace in the oracle state.
#[derive(Debug, Error)]
pub enum OracleError {
    // ── Availability ────────────────────────────────────────────────────
    #[error("contract is paused")]
    ContractPaused,

    #[error("requests are paused for maintenance, please try again later")]
    RequestsPaused,

    // ── Authorization ───────────────────────────────────────────────────
    #[error("missing authority of {0}")]
    Unauthorized(Requirement),

    // ── Validation ──────────────────────────────────────────────────────
    #[error("key id {got} is out of order, expected {expected}")]
    OutOfOrderKey { expected: KeyId, got: KeyId },

    #[error("modulus must have leading zeroes stripped")]
    LeadingZeroModulus,

    #[error("modulus must have non-zero length")]
    EmptyModulus,

    #[error("chance to switch must be at least 1")]
    InvalidChance,

    #[error("config row {0} can only be changed with the pause permission")]
    ReservedConfigRow(Name),

    #[error("invalid name: {0}")]
    InvalidName(#[from] NameError),

    // ── State conflicts ─────────────────────────────────────────────────
    #[error("signing value {0} already used")]
    DuplicateSigningValue(u64),

    #[error("public key with hash id {0} already exists")]
    DuplicateKey(u64),

    #[error("dapp {0} is already banned")]
    AlreadyBanned(Name),

    #[error("dapp {0} is not banned")]
    NotBanned(Name),

    #[error("payer for {payee} has already been set to {payer}")]
    PayerAlreadySet { payee: Name, payer: Name },

    #[error("invalid payer {payer} for {payee}")]
    InvalidPayer { payee: Name, payer: Name },

    #[error("only signing values of retired keys can be cleaned (scope {0})")]
    ActiveKeyScope(u64),

    // ── Resource exhaustion ─────────────────────────────────────────────
    #[error("job queue of {dapp} is full ({in_flight}/{cap})")]
    QueueFull { dapp: Name, in_flight: u64, cap: u64 },

    #[error("no available public key to rotate to")]
    NoAvailableKey,

    // ── Not found ───────────────────────────────────────────────────────
    #[error("could not find job id {0}")]
    JobNotFound(JobId),

    #[error("payer account {0} does not exist")]
    PayerNotFound(Name),

    #[error("payee {0} does not exist")]
    PayeeNotFound(Name),

    #[error("job {job_id} was requested by {owner}, not {dapp}")]
    DappMismatch { job_id: JobId, owner: Name, dapp: Name },

    #[error("no public key with hash id {0}")]
    KeyNotFound(u64),

    #[error("no public key is responsible for job {0}")]
    NoKeyForJob(JobId),

    #[error("no signing key has been registered")]
    NoKeyConfig,

    // ── Cryptography ────────────────────────────────────────────────────
    #[error("could not verify signature")]
    SignatureInvalid,

    // ── Plumbing ────────────────────────────────────────────────────────
    #[error("ledger error: {0}")]
    Store(#[from] StoreError),

    #[error("config error: {0}")]
    Config(String),
}
