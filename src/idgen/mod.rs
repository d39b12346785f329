//! Pickup identifier generation
//!
//! Ids are a fixed prefix plus a zero-padded counter (`P001`, `P002`, ...).
//! The counter is an `AtomicU64` seeded once from the highest id already in
//! the store, so ids stay unique across restarts and under concurrent
//! creation without any locking beyond the atomic increment itself.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;

use crate::storage::PickupStore;

/// Fixed prefix of every pickup id.
pub const ID_PREFIX: &str = "P";

/// Minimum number of digits in the counter suffix. Counters past 999
/// simply grow wider (`P1000`).
const ID_PAD_WIDTH: usize = 3;

/// Generator of unique pickup ids
pub struct IdGenerator {
    counter: AtomicU64,
}

impl IdGenerator {
    /// Create a generator starting after the given counter value
    pub fn with_seed(seed: u64) -> Self {
        Self {
            counter: AtomicU64::new(seed),
        }
    }

    /// Create a generator seeded from the most recent id in the store
    ///
    /// An empty store or an unparsable suffix seeds the counter at zero,
    /// matching the store's lifetime guarantee only when ids were always
    /// produced by this generator.
    pub fn from_store(store: &dyn PickupStore) -> Result<Self> {
        let seed = match store.latest_id()? {
            Some(last_id) => parse_counter(&last_id).unwrap_or(0),
            None => 0,
        };

        tracing::debug!(seed, "Id generator seeded from store");
        Ok(Self::with_seed(seed))
    }

    /// Produce the next unique id
    pub fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{ID_PREFIX}{n:0ID_PAD_WIDTH$}")
    }

    /// Counter value the next id will be derived from
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

/// Extract the numeric counter from an id like `P042`
fn parse_counter(id: &str) -> Option<u64> {
    id.strip_prefix(ID_PREFIX)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::storage::MemoryPickupStore;

    fn store_with_ids(ids: &[&str]) -> MemoryPickupStore {
        use crate::models::{Frequency, Pickup, PickupStatus};
        use chrono::{Duration, Utc};

        let store = MemoryPickupStore::new();
        for id in ids {
            let start = Utc::now();
            store
                .insert(&Pickup {
                    id: id.to_string(),
                    zone_id: "Z001".to_string(),
                    time_slot_start: start,
                    time_slot_end: start + Duration::hours(1),
                    frequency: Frequency::OneTime,
                    location_name: "Depot".to_string(),
                    vehicle_id: "V001".to_string(),
                    worker1_id: "W001".to_string(),
                    worker2_id: "W002".to_string(),
                    status: PickupStatus::Scheduled,
                })
                .unwrap();
        }
        store
    }

    #[test]
    fn test_id_format() {
        let generator = IdGenerator::with_seed(0);
        assert_eq!(generator.next_id(), "P001");
        assert_eq!(generator.next_id(), "P002");
    }

    #[test]
    fn test_id_grows_past_padding() {
        let generator = IdGenerator::with_seed(999);
        assert_eq!(generator.next_id(), "P1000");
    }

    #[test]
    fn test_seed_from_store() {
        let store = store_with_ids(&["P001", "P007"]);
        let generator = IdGenerator::from_store(&store).unwrap();
        assert_eq!(generator.next_id(), "P008");
    }

    #[test]
    fn test_seed_survives_padding_overflow() {
        // A restart after the counter outgrew the padding must not
        // reissue P1000
        let store = store_with_ids(&["P999", "P1000"]);
        let generator = IdGenerator::from_store(&store).unwrap();
        assert_eq!(generator.next_id(), "P1001");
    }

    #[test]
    fn test_seed_from_empty_store() {
        let store = MemoryPickupStore::new();
        let generator = IdGenerator::from_store(&store).unwrap();
        assert_eq!(generator.next_id(), "P001");
    }

    #[test]
    fn test_unparsable_latest_id_resets_seed() {
        let store = store_with_ids(&["LEGACY-42"]);
        let generator = IdGenerator::from_store(&store).unwrap();
        assert_eq!(generator.next_id(), "P001");
    }

    #[test]
    fn test_parse_counter() {
        assert_eq!(parse_counter("P042"), Some(42));
        assert_eq!(parse_counter("P1000"), Some(1000));
        assert_eq!(parse_counter("X042"), None);
        assert_eq!(parse_counter("Pabc"), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_ids_are_distinct() {
        let generator = Arc::new(IdGenerator::with_seed(0));
        let mut handles = Vec::new();

        for _ in 0..128 {
            let generator = Arc::clone(&generator);
            handles.push(tokio::spawn(async move { generator.next_id() }));
        }

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap()));
        }
        assert_eq!(ids.len(), 128);
    }
}
