//! Registered signing keys, the active-key pointer and per-key signing-value
//! scopes.

use orng_crypto::pubkey_hash_id;
use orng_types::{JobId, KeyConfig, KeyId, PublicKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{OracleError, Rotation};

/// Catalog of RSA public keys in registration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRegistry {
    config: Option<KeyConfig>,
    keys: BTreeMap<KeyId, PublicKey>,
    /// Signing values already used, keyed by the owning key's `pubkey_hash_id`.
    signing_values: BTreeMap<u64, BTreeSet<u64>>,
    #[serde(default)]
    rotation: Rotation,
}

impl KeyRegistry {
    pub fn with_rotation(rotation: Rotation) -> Self {
        Self {
            rotation,
            ..Self::default()
        }
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    /// Register the next key.
    ///
    /// The first key must carry id 0 and installs the key configuration with
    /// `initial_chance`. Every later key must carry exactly the next id and
    /// may not reuse a modulus.
    pub fn register(
        &mut self,
        id: KeyId,
        exponent: &str,
        modulus: &str,
        initial_chance: u64,
    ) -> Result<&PublicKey, OracleError> {
        if modulus.is_empty() {
            return Err(OracleError::EmptyModulus);
        }
        if modulus.starts_with('0') {
            return Err(OracleError::LeadingZeroModulus);
        }

        let expected = self
            .config
            .as_ref()
            .map_or(0, |config| config.available_key_counter);
        let after_active = self
            .config
            .as_ref()
            .map_or(true, |config| id > config.active_key_index);
        if id != expected || !after_active {
            return Err(OracleError::OutOfOrderKey { expected, got: id });
        }

        let hash_id = pubkey_hash_id(modulus);
        if self.keys.values().any(|k| k.pubkey_hash_id == hash_id) {
            return Err(OracleError::DuplicateKey(hash_id));
        }

        match self.config.as_mut() {
            Some(config) => config.available_key_counter += 1,
            None => self.config = Some(KeyConfig::initial(initial_chance)),
        }

        tracing::info!(key_id = id, pubkey_hash_id = hash_id, "registered signing key");
        let key = self.keys.entry(id).or_insert(PublicKey {
            id,
            exponent: exponent.to_string(),
            modulus: modulus.to_string(),
            pubkey_hash_id: hash_id,
            last: None,
        });
        Ok(key)
    }

    pub fn config(&self) -> Option<&KeyConfig> {
        self.config.as_ref()
    }

    pub fn key(&self, id: KeyId) -> Option<&PublicKey> {
        self.keys.get(&id)
    }

    pub fn key_by_hash_id(&self, pubkey_hash_id: u64) -> Option<&PublicKey> {
        self.keys
            .values()
            .find(|k| k.pubkey_hash_id == pubkey_hash_id)
    }

    /// All keys in id order.
    pub fn keys(&self) -> impl Iterator<Item = &PublicKey> {
        self.keys.values()
    }

    pub fn active_key(&self) -> Result<&PublicKey, OracleError> {
        let config = self.config.as_ref().ok_or(OracleError::NoKeyConfig)?;
        self.keys
            .get(&config.active_key_index)
            .ok_or(OracleError::NoKeyConfig)
    }

    /// The key authoritative for a job: the one with the smallest `last`
    /// that still covers the job id.
    pub fn key_for_job(&self, job_id: JobId) -> Option<&PublicKey> {
        self.keys
            .values()
            .filter(|k| k.covers(job_id))
            .min_by_key(|k| k.last)
    }

    pub fn set_chance(&mut self, chance_to_switch: u64) -> Result<(), OracleError> {
        if chance_to_switch < 1 {
            return Err(OracleError::InvalidChance);
        }
        let config = self.config.as_mut().ok_or(OracleError::NoKeyConfig)?;
        config.chance_to_switch = chance_to_switch;
        tracing::info!(chance_to_switch, "updated key rotation chance");
        Ok(())
    }

    /// Resolve the key that signs a freshly numbered job, rotating first if
    /// the active key's range has run out or the rotation draw retires it.
    /// Returns the owning key's signing-value scope.
    pub fn assign(&mut self, job_id: JobId) -> Result<u64, OracleError> {
        let config = self.config.as_mut().ok_or(OracleError::NoKeyConfig)?;
        let chance = config.chance_to_switch;
        let active = self
            .keys
            .get_mut(&config.active_key_index)
            .ok_or(OracleError::NoKeyConfig)?;

        if active.last.is_none() {
            active.last = Some(self.rotation.horizon(job_id, chance));
            return Ok(active.pubkey_hash_id);
        }
        if active.covers(job_id) && !self.rotation.retire_early(chance) {
            return Ok(active.pubkey_hash_id);
        }
        if !config.has_next_key() {
            return Err(OracleError::NoAvailableKey);
        }

        active.last = Some(job_id.saturating_sub(1));
        let retired = active.id;
        config.active_key_index += 1;
        let next = self
            .keys
            .get_mut(&config.active_key_index)
            .ok_or(OracleError::NoAvailableKey)?;
        next.last = Some(self.rotation.horizon(job_id, chance));

        tracing::info!(
            retired_key = retired,
            active_key = next.id,
            first_job = job_id,
            last = ?next.last,
            "rotated signing key"
        );
        Ok(next.pubkey_hash_id)
    }

    pub fn is_signing_value_used(&self, scope: u64, signing_value: u64) -> bool {
        self.signing_values
            .get(&scope)
            .is_some_and(|values| values.contains(&signing_value))
    }

    /// Number of signing values recorded under a scope.
    pub fn signing_value_count(&self, scope: u64) -> usize {
        self.signing_values.get(&scope).map_or(0, BTreeSet::len)
    }

    /// Mutable access to a scope's used signing values.
    pub fn signing_scope_mut(&mut self, scope: u64) -> &mut BTreeSet<u64> {
        self.signing_values.entry(scope).or_default()
    }

    /// Delete up to `rows` signing values recorded under a retired key.
    pub fn clean_signing_values(&mut self, scope: u64, rows: u64) -> Result<usize, OracleError> {
        let key = self
            .key_by_hash_id(scope)
            .ok_or(OracleError::KeyNotFound(scope))?;
        let config = self.config.as_ref().ok_or(OracleError::NoKeyConfig)?;
        if key.id >= config.active_key_index {
            return Err(OracleError::ActiveKeyScope(scope));
        }

        let Some(values) = self.signing_values.get_mut(&scope) else {
            return Ok(0);
        };
        let doomed: Vec<u64> = values
            .iter()
            .take(usize::try_from(rows).unwrap_or(usize::MAX))
            .copied()
            .collect();
        for value in &doomed {
            values.remove(value);
        }
        if values.is_empty() {
            self.signing_values.remove(&scope);
        }
        tracing::debug!(scope, removed = doomed.len(), "cleaned signing values");
        Ok(doomed.len())
    }
}
