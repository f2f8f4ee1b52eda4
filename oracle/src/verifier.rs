//! Checks a submitted signature against the key responsible for a job and
//! derives the value delivered to the dapp.

use orng_crypto::{sha256, verify_signing_value};
use orng_types::{Job, PublicKey, RandomValue};

use crate::OracleError;

/// Verify `random_value` (hex RSA signature) over the job's signing value
/// and return SHA-256 of the submitted text.
///
/// Malformed hex, an unusable key and a genuine mismatch are all reported as
/// [`OracleError::SignatureInvalid`].
pub fn verify_job_signature(
    job: &Job,
    random_value: &str,
    key: &PublicKey,
) -> Result<RandomValue, OracleError> {
    verify_signing_value(job.signing_value, random_value, &key.exponent, &key.modulus).map_err(
        |e| {
            tracing::warn!(
                job_id = job.id,
                key_id = key.id,
                error = %e,
                "rejected oracle signature"
            );
            OracleError::SignatureInvalid
        },
    )?;
    Ok(RandomValue::new(sha256(random_value.as_bytes())))
}
