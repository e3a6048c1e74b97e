//! The levelled address cache.
//!
//! Four independent concurrent maps, one per resolution level, each keyed by
//! `place_id`. Insertion is first-writer-wins and the cache only ever grows;
//! warm starts across runs come from replaying snapshot files through the
//! same population path as a live fetch (see [`crate::geocode::snapshot`]).

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use strum::IntoEnumIterator;

use super::types::{AddressLevel, AddressRecord};

/// Concurrent `place_id -> AddressRecord` store partitioned by
/// [`AddressLevel`].
///
/// # Thread Safety
///
/// `try_insert` and `scan` are safe under arbitrary concurrent callers.
/// Concurrent inserts of the same key converge to exactly one stored value
/// (the first writer); inserts of different keys are independent.
pub struct LevelledCache {
    shards: [RwLock<HashMap<String, AddressRecord>>; 4],
}

impl LevelledCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        LevelledCache {
            shards: std::array::from_fn(|_| RwLock::new(HashMap::new())),
        }
    }

    fn shard(&self, level: AddressLevel) -> &RwLock<HashMap<String, AddressRecord>> {
        &self.shards[level.index()]
    }

    /// Inserts a record at a level unless its `place_id` is blank or already
    /// present there. Returns whether the insertion occurred.
    ///
    /// Records with a blank `place_id` are silently skipped; they have no
    /// stable identity to key on.
    pub fn try_insert(&self, level: AddressLevel, record: AddressRecord) -> bool {
        if record.place_id.trim().is_empty() {
            return false;
        }

        let mut map = self.shard(level).write().unwrap();
        match map.entry(record.place_id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                log::debug!(
                    "cached {:?} record {} ({})",
                    level,
                    record.place_id,
                    record.formatted_address
                );
                vacant.insert(record);
                true
            }
        }
    }

    /// Snapshot of one level's entries for matching.
    pub fn scan(&self, level: AddressLevel) -> Vec<(String, AddressRecord)> {
        let map = self.shard(level).read().unwrap();
        map.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Number of records stored at one level.
    pub fn len(&self, level: AddressLevel) -> usize {
        self.shard(level).read().unwrap().len()
    }

    /// Total records across all levels.
    pub fn total_len(&self) -> usize {
        AddressLevel::iter().map(|level| self.len(level)).sum()
    }

    /// True when no level holds any record.
    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }
}

impl Default for LevelledCache {
    fn default() -> Self {
        Self::new()
    }
}
