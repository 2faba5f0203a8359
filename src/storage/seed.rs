//! Built-in sample dataset
//!
//! Stored in the older record shapes (string steps, runs without a product)
//! and loaded through the same adapters as persisted data.

use rust_embed::Embed;

use super::{keys, MemoryStore, Snapshot, StorageError};

#[derive(Embed)]
#[folder = "seed/"]
struct EmbeddedSeed;

/// Raw JSON of one seed collection
pub fn raw(key: &str) -> Result<String, StorageError> {
    let filename = format!("{}.json", key);
    let file = EmbeddedSeed::get(&filename)
        .ok_or_else(|| StorageError::MissingSeed(filename.clone()))?;
    std::str::from_utf8(&file.data)
        .map(str::to_string)
        .map_err(|_| StorageError::MissingSeed(filename))
}

/// The seed as a store holding every key
pub fn store() -> Result<MemoryStore, StorageError> {
    keys::ALL
        .into_iter()
        .try_fold(MemoryStore::new(), |store, key| Ok(store.with_entry(key, raw(key)?)))
}

/// Decode the seed
pub fn load() -> Result<Snapshot, StorageError> {
    let source = store()?;
    let no_fallback = || -> Result<Snapshot, StorageError> {
        Err(StorageError::MissingSeed("supplementary collection".into()))
    };
    Snapshot::decode_from(&source, &no_fallback)?
        .ok_or_else(|| StorageError::MissingSeed(keys::TEST_CASES.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::result::StoredResult;

    #[test]
    fn test_every_key_is_embedded() {
        for key in keys::ALL {
            assert!(raw(key).is_ok(), "missing seed for {}", key);
        }
    }

    #[test]
    fn test_seed_goes_through_adapters() {
        let snapshot = load().unwrap();
        let first = snapshot
            .cases
            .iter()
            .find(|c| c.test_case_id == "TC101" && c.module_id == "mod1")
            .unwrap();
        assert_eq!(first.steps.len(), 1);
        assert_eq!(first.steps[0].expected_result, "Dashboard should be displayed");
        assert_eq!(first.result, StoredResult::Pending);

        let run = &snapshot.runs[0];
        assert_eq!(run.product_id, "1");
        assert!(snapshot.suites.iter().all(|s| !s.product_id.is_empty()));
    }
}
