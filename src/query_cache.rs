// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Short-lived LRU cache for GraphQL read results.
//!
//! Entries are raw `data` objects keyed by operation and arguments
//! (`courses:published:`, `course:<id>`, ...). Mutations drop whole key
//! families through [`QueryCache::invalidate_prefix`].
//!
//! Every invalidation bumps a generation counter. A read captures the
//! generation before hitting the network and stores its result with
//! [`QueryCache::put_if_current`], so a response that raced a mutation is
//! never written back.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 256;
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

struct CacheEntry {
    value: Value,
    inserted_at: Instant,
}

pub struct QueryCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
    /// Only changed while `cache` is locked.
    generation: AtomicU64,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl QueryCache {
    /// Create a cache holding at most `capacity` results for `ttl` each.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            ttl,
            generation: AtomicU64::new(0),
        }
    }

    /// Cached value for `key`, or `None` if absent or expired.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut cache = self.cache.lock().ok()?;
        if let Some(entry) = cache.get(key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.value.clone());
            }
            cache.pop(key);
        }
        None
    }

    pub fn put(&self, key: &str, value: Value) {
        if let Ok(mut cache) = self.cache.lock() {
            insert(&mut cache, key, value);
        }
    }

    /// Current invalidation generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Store `value` only if nothing was invalidated since `generation` was
    /// read. Returns whether the value was stored.
    pub fn put_if_current(&self, key: &str, value: Value, generation: u64) -> bool {
        let Ok(mut cache) = self.cache.lock() else {
            return false;
        };
        if self.generation.load(Ordering::Acquire) != generation {
            debug!(key = %key, "Dropped query result that raced an invalidation");
            return false;
        }
        insert(&mut cache, key, value);
        true
    }

    /// Drop every entry whose key starts with `prefix`. Returns how many
    /// entries were removed.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let Ok(mut cache) = self.cache.lock() else {
            return 0;
        };
        self.generation.fetch_add(1, Ordering::AcqRel);
        let stale: Vec<String> = cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            cache.pop(key);
        }
        if !stale.is_empty() {
            debug!(prefix = %prefix, removed = stale.len(), "Invalidated cached queries");
        }
        stale.len()
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            self.generation.fetch_add(1, Ordering::AcqRel);
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn insert(cache: &mut LruCache<String, CacheEntry>, key: &str, value: Value) {
    cache.put(
        key.to_string(),
        CacheEntry {
            value,
            inserted_at: Instant::now(),
        },
    );
}
