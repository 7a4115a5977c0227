//! Memoizing accident loader.
//!
//! Tables are cached per [`LoadKey`] (source path plus row limit) for the
//! lifetime of the [`AccidentLoader`]. Each key has its own guard, so
//! concurrent callers asking for the same key wait for the first load
//! instead of reading the file again. Failed loads are not cached and
//! leave no entry behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use crate::{AccidentTable, LoadError, LoadOptions, TimestampPolicy, load_accidents};

/// Cache key for a loaded table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadKey {
    /// Source CSV path, as given by the caller.
    pub path: PathBuf,
    /// Maximum number of data rows read.
    pub row_limit: usize,
}

impl LoadKey {
    /// Creates a key for `path` limited to `row_limit` rows.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, row_limit: usize) -> Self {
        Self {
            path: path.into(),
            row_limit,
        }
    }
}

type Slot = Arc<Mutex<Option<Arc<AccidentTable>>>>;

/// Loads accident tables, reusing previously loaded ones.
///
/// The only ways to force a reload are [`AccidentLoader::invalidate`],
/// [`AccidentLoader::invalidate_all`], or dropping the loader.
#[derive(Debug, Default)]
pub struct AccidentLoader {
    timestamp_policy: TimestampPolicy,
    slots: Mutex<BTreeMap<LoadKey, Slot>>,
}

impl AccidentLoader {
    /// Creates an empty loader that applies `timestamp_policy` to every
    /// load.
    #[must_use]
    pub fn new(timestamp_policy: TimestampPolicy) -> Self {
        Self {
            timestamp_policy,
            slots: Mutex::new(BTreeMap::new()),
        }
    }

    /// The timestamp policy applied to loads.
    #[must_use]
    pub const fn timestamp_policy(&self) -> TimestampPolicy {
        self.timestamp_policy
    }

    /// Returns the cached table for `(path, row_limit)`, loading it first
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the table is not cached and loading fails.
    /// The failure is not cached; the next call retries the load.
    pub fn load(&self, path: &Path, row_limit: usize) -> Result<Arc<AccidentTable>, LoadError> {
        let key = LoadKey::new(path, row_limit);
        let slot = self.slot(&key);

        // Held for the whole load so that concurrent callers for the same
        // key wait here rather than starting a second read.
        let mut cached = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(table) = cached.as_ref() {
            log::debug!(
                "Cache hit for {} (row limit {row_limit})",
                path.display()
            );
            return Ok(Arc::clone(table));
        }

        let options = LoadOptions {
            row_limit,
            timestamp_policy: self.timestamp_policy,
        };
        let table = match load_accidents(path, &options) {
            Ok(table) => Arc::new(table),
            Err(e) => {
                drop(cached);
                self.discard_empty(&key, &slot);
                return Err(e);
            }
        };
        *cached = Some(Arc::clone(&table));

        Ok(table)
    }

    /// Whether a loaded table is cached for `key`.
    #[must_use]
    pub fn is_cached(&self, key: &LoadKey) -> bool {
        let slot = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();

        slot.is_some_and(|slot| {
            slot.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_some()
        })
    }

    /// Drops the cached table for `key`. Returns whether a loaded table was
    /// removed.
    pub fn invalidate(&self, key: &LoadKey) -> bool {
        let removed = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some_and(|slot| holds_table(&slot));

        if removed {
            log::info!(
                "Invalidated cached table for {} (row limit {})",
                key.path.display(),
                key.row_limit
            );
        }
        removed
    }

    /// Drops every cached table. Returns how many loaded tables were
    /// removed.
    pub fn invalidate_all(&self) -> usize {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let count = slots.values().filter(|slot| holds_table(slot)).count();
        slots.clear();
        drop(slots);

        log::info!("Invalidated {count} cached table(s)");
        count
    }

    fn slot(&self, key: &LoadKey) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    /// Removes `slot` from the map after a failed load, unless another
    /// caller has since filled it or is loading into it.
    fn discard_empty(&self, key: &LoadKey, slot: &Slot) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let idle_and_empty = match slot.try_lock() {
            Ok(cached) => cached.is_none(),
            Err(TryLockError::Poisoned(e)) => e.into_inner().is_none(),
            Err(TryLockError::WouldBlock) => false,
        };
        if idle_and_empty && slots.get(key).is_some_and(|s| Arc::ptr_eq(s, slot)) {
            slots.remove(key);
        }
    }
}

/// Whether `slot` holds a loaded table. A slot locked by an in-progress
/// load holds nothing yet.
fn holds_table(slot: &Slot) -> bool {
    match slot.try_lock() {
        Ok(cached) => cached.is_some(),
        Err(TryLockError::Poisoned(e)) => e.into_inner().is_some(),
        Err(TryLockError::WouldBlock) => false,
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    const CSV: &str = "ID,Severity,Start_Time,Start_Lat,Start_Lng,Weather_Condition,Amenity\n\
                       A-1,4,2023-01-01 05:30:00.5,39.86,-84.05,Clear,False\n\
                       A-2,2,2023-01-01 06:30:00,39.92,-84.06,,True\n\
                       A-3,4,2023-01-01 07:30:00,,,Rain,False\n";

    /// A CSV file in the temp directory, removed on drop.
    struct TempCsv(PathBuf);

    impl TempCsv {
        fn new(contents: &str) -> Self {
            let path = std::env::temp_dir().join(format!("accidents-{}.csv", uuid::Uuid::new_v4()));
            std::fs::write(&path, contents).unwrap();
            Self(path)
        }
    }

    impl Drop for TempCsv {
        fn drop(&mut self) {
            std::fs::remove_file(&self.0).ok();
        }
    }

    #[test]
    fn same_key_is_loaded_once() {
        let csv = TempCsv::new(CSV);
        let loader = AccidentLoader::default();

        let first = loader.load(&csv.0, 100).unwrap();
        assert_eq!(first.len(), 3);

        // The file is gone, so a second read would fail.
        std::fs::remove_file(&csv.0).unwrap();
        let second = loader.load(&csv.0, 100).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(loader.is_cached(&LoadKey::new(&csv.0, 100)));
    }

    #[test]
    fn different_row_limit_is_a_different_key() {
        let csv = TempCsv::new(CSV);
        let loader = AccidentLoader::default();

        let full = loader.load(&csv.0, 100).unwrap();
        let partial = loader.load(&csv.0, 1).unwrap();

        assert_eq!(full.len(), 3);
        assert_eq!(partial.len(), 1);
        assert!(!Arc::ptr_eq(&full, &partial));
    }

    #[test]
    fn invalidate_forces_reload() {
        let csv = TempCsv::new(CSV);
        let loader = AccidentLoader::default();
        let key = LoadKey::new(&csv.0, 100);

        let first = loader.load(&csv.0, 100).unwrap();
        assert!(loader.invalidate(&key));
        assert!(!loader.is_cached(&key));
        assert!(!loader.invalidate(&key));

        let reloaded = loader.load(&csv.0, 100).unwrap();
        assert!(!Arc::ptr_eq(&first, &reloaded));
        assert_eq!(first.len(), reloaded.len());

        std::fs::remove_file(&csv.0).unwrap();
        assert_eq!(loader.invalidate_all(), 1);
        assert!(loader.load(&csv.0, 100).is_err());
    }

    #[test]
    fn failed_load_is_not_cached() {
        let path = std::env::temp_dir().join(format!("accidents-{}.csv", uuid::Uuid::new_v4()));
        let loader = AccidentLoader::default();

        assert!(loader.load(&path, 10).is_err());
        assert!(!loader.is_cached(&LoadKey::new(&path, 10)));
        assert_eq!(loader.invalidate_all(), 0);
        assert!(!loader.invalidate(&LoadKey::new(&path, 10)));

        let csv = TempCsv(path);
        std::fs::write(&csv.0, CSV).unwrap();
        assert_eq!(loader.load(&csv.0, 10).unwrap().len(), 3);
    }

    #[test]
    fn failed_loads_leave_no_entries() {
        let loader = AccidentLoader::default();
        for _ in 0..5 {
            let path =
                std::env::temp_dir().join(format!("accidents-{}.csv", uuid::Uuid::new_v4()));
            assert!(loader.load(&path, 10).is_err());
        }

        assert!(
            loader
                .slots
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_empty()
        );

        let csv = TempCsv::new(CSV);
        loader.load(&csv.0, 10).unwrap();
        assert_eq!(loader.invalidate_all(), 1);
    }

    #[test]
    fn concurrent_callers_share_one_table() {
        let csv = TempCsv::new(CSV);
        let loader = Arc::new(AccidentLoader::default());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let loader = Arc::clone(&loader);
                let path = csv.0.clone();
                thread::spawn(move || loader.load(&path, 100).unwrap())
            })
            .collect();

        let tables: Vec<Arc<AccidentTable>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        for table in &tables[1..] {
            assert!(Arc::ptr_eq(&tables[0], table));
        }
    }

    #[test]
    fn loader_applies_its_timestamp_policy() {
        let csv = TempCsv::new(
            "ID,Severity,Start_Time,Start_Lat,Start_Lng,Weather_Condition,Amenity\n\
             A-1,4,garbage,1,1,Clear,False\n\
             A-2,2,2023-01-01 06:30:00,1,1,Clear,False\n",
        );

        assert!(AccidentLoader::new(TimestampPolicy::Fail).load(&csv.0, 10).is_err());

        let table = AccidentLoader::new(TimestampPolicy::Skip)
            .load(&csv.0, 10)
            .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.skipped_rows(), 1);
    }
}
