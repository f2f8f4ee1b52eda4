use orng_types::Name;

use crate::StoreError;

/// Trait for checking whether accounts exist on the ledger.
pub trait AccountDirectory {
    fn account_exists(&self, name: &Name) -> Result<bool, StoreError>;
}
