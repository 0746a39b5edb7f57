// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::sync::Arc;

use ahash::HashMap;
use cid::Cid;
use parking_lot::RwLock;

/// Memoizes expensive sub-computations of migrators across runs. Entries only
/// ever map a content-derived key to a content-addressed result, so whatever
/// a cache holds must never change the output of a migration.
pub trait MigrationCache: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<Cid>>;
    fn put(&self, key: &str, value: Cid) -> anyhow::Result<()>;
}

impl dyn MigrationCache {
    /// Returns the cached value for `key`, computing and storing it with
    /// `compute` on a miss.
    pub fn load<F>(&self, key: &str, compute: F) -> anyhow::Result<Cid>
    where
        F: FnOnce() -> anyhow::Result<Cid>,
    {
        if let Some(cid) = self.get(key)? {
            return Ok(cid);
        }
        let cid = compute()?;
        self.put(key, cid)?;
        Ok(cid)
    }
}

/// Sized wrapper of [`MigrationCache`].
pub type MigrationCacheArc = Arc<dyn MigrationCache>;

/// Key of the result of migration `name` applied to the content `cid`.
pub fn cache_key(name: &str, cid: &Cid) -> String {
    format!("{name}-{cid}")
}

/// In-memory [`MigrationCache`]. Clones share the same entries.
#[derive(Debug, Default, Clone)]
pub struct MemoryMigrationCache {
    cache: Arc<RwLock<HashMap<String, Cid>>>,
}

impl MemoryMigrationCache {
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}

impl MigrationCache for MemoryMigrationCache {
    fn get(&self, key: &str) -> anyhow::Result<Option<Cid>> {
        Ok(self.cache.read().get(key).copied())
    }

    fn put(&self, key: &str, value: Cid) -> anyhow::Result<()> {
        self.cache.write().insert(key.to_owned(), value);
        Ok(())
    }
}
