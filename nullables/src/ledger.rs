//! Nullable ledger — in-memory accounts and permission delegation.

use orng_store::{AccountDirectory, AuthorityChecker, Requirement, StoreError};
use orng_types::{Name, PermissionLevel};
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

/// An in-memory host ledger for testing.
///
/// A permission requirement is met by presenting exactly that level, or a
/// level it has been delegated to with [`NullLedger::delegate`]. An actor
/// requirement is met by any permission of that account.
pub struct NullLedger {
    accounts: Mutex<BTreeSet<Name>>,
    delegations: Mutex<HashMap<PermissionLevel, Vec<PermissionLevel>>>,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(BTreeSet::new()),
            delegations: Mutex::new(HashMap::new()),
        }
    }

    /// Create a ledger that already knows the given accounts.
    pub fn with_accounts<I: IntoIterator<Item = Name>>(accounts: I) -> Self {
        let ledger = Self::new();
        ledger.accounts.lock().unwrap().extend(accounts);
        ledger
    }

    pub fn create_account(&self, name: Name) {
        self.accounts.lock().unwrap().insert(name);
    }

    /// Let `delegate` act wherever `permission` is required.
    pub fn delegate(&self, permission: PermissionLevel, delegate: PermissionLevel) {
        self.delegations
            .lock()
            .unwrap()
            .entry(permission)
            .or_default()
            .push(delegate);
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorityChecker for NullLedger {
    fn satisfies(&self, provided: &[PermissionLevel], required: &Requirement) -> bool {
        match required {
            Requirement::Actor(actor) => provided.iter().any(|p| &p.actor == actor),
            Requirement::Permission(level) => {
                if provided.contains(level) {
                    return true;
                }
                let delegations = self.delegations.lock().unwrap();
                delegations
                    .get(level)
                    .is_some_and(|delegates| delegates.iter().any(|d| provided.contains(d)))
            }
        }
    }
}

impl AccountDirectory for NullLedger {
    fn account_exists(&self, name: &Name) -> Result<bool, StoreError> {
        Ok(self.accounts.lock().unwrap().contains(name))
    }
}
