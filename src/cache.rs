//! Column profile cache.
//!
//! Profiles are computed once per sheet and shared across every chart spec generated
//! against it. Callers key entries by whatever identifies a sheet in their storage (upload
//! id plus tab name, for instance) and invalidate the key when the sheet changes.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::data::Sheet;
use crate::profile::{profile_sheet, Column};
use crate::ProfileOptions;

#[derive(Debug, Default)]
pub struct ProfileCache {
    options: ProfileOptions,
    entries: RwLock<HashMap<String, Arc<[Column]>>>,
}

impl ProfileCache {
    pub fn new(options: ProfileOptions) -> Self {
        Self {
            options,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached profile for `key`, profiling `sheet` on a miss
    pub fn get_or_profile(&self, key: &str, sheet: &Sheet) -> Arc<[Column]> {
        if let Some(columns) = self.entries.read().get(key) {
            return Arc::clone(columns);
        }

        // Profiling happens outside the write lock; a concurrent miss on the same key
        // computes the same result, and the first insert wins.
        let columns: Arc<[Column]> = profile_sheet(sheet, &self.options).into();
        let mut entries = self.entries.write();
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Arc::clone(&columns));
        debug!(key, columns = entry.len(), "cached column profile");
        Arc::clone(entry)
    }

    pub fn get(&self, key: &str) -> Option<Arc<[Column]>> {
        self.entries.read().get(key).cloned()
    }

    /// Drop the profile for a sheet that changed. Returns whether an entry existed.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
