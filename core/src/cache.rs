//! Tag-indexed query cache.
//!
//! # Design
//! Each cached query result is stored under a `QueryKey` together with the
//! tags it provides. A reverse index maps every tag to the keys providing it,
//! so `invalidate` touches only the affected entries.
//!
//! Invalidation follows two rules:
//! - a type-only tag (`"Courses"`) marks every entry providing any tag of
//!   that type stale, id-qualified ones included;
//! - an id-qualified tag (`{"Courses", "c1"}`) marks only entries providing
//!   exactly that tag.
//!
//! Stale entries stay in the map (callers may still `peek` them) but `get`
//! no longer returns them, which forces a refetch on next access.
//!
//! The cache holds at most `capacity` entries. Inserting a new key into a
//! full cache evicts the oldest stale entry, or the least recently stored
//! entry when none is stale. `prune_stale` drops all stale entries at once.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::Serialize;

/// Tag type shared by all course queries.
pub const COURSES_TAG: &str = "Courses";

/// Entry limit used by `QueryCache::new`.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Invalidation label attached to cached query results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheTag {
    pub kind: String,
    pub id: Option<String>,
}

impl CacheTag {
    pub fn of_type(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            id: None,
        }
    }

    pub fn with_id(kind: &str, id: &str) -> Self {
        Self {
            kind: kind.to_string(),
            id: Some(id.to_string()),
        }
    }

    /// Whether invalidating `self` affects an entry that provides `provided`.
    fn covers(&self, provided: &CacheTag) -> bool {
        self.kind == provided.kind && (self.id.is_none() || self.id == provided.id)
    }
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}:{id}", self.kind),
            None => f.write_str(&self.kind),
        }
    }
}

/// Cache-entry key: endpoint name plus JSON-serialized arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn new<A: Serialize + ?Sized>(endpoint: &str, args: &A) -> Self {
        let args = serde_json::to_string(args).unwrap_or_default();
        Self(format!("{endpoint}({args})"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    tags: Vec<CacheTag>,
    stale: bool,
    stored_at: u64,
}

/// A cached value and whether it has been invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cached<'a, V> {
    pub value: &'a V,
    pub stale: bool,
}

#[derive(Debug, Clone)]
pub struct QueryCache<V> {
    entries: HashMap<QueryKey, Entry<V>>,
    by_tag: HashMap<CacheTag, HashSet<QueryKey>>,
    capacity: usize,
    next_seq: u64,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl<V> QueryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            by_tag: HashMap::new(),
            capacity: capacity.max(1),
            next_seq: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Store a fresh result, replacing any previous entry for `key`.
    ///
    /// Returns the key evicted to make room, if any.
    pub fn insert(&mut self, key: QueryKey, value: V, tags: Vec<CacheTag>) -> Option<QueryKey> {
        self.unindex(&key);
        let evicted = if self.entries.contains_key(&key) {
            None
        } else {
            self.evict_for_insert()
        };
        for tag in &tags {
            self.by_tag.entry(tag.clone()).or_default().insert(key.clone());
        }
        let stored_at = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            key,
            Entry {
                value,
                tags,
                stale: false,
                stored_at,
            },
        );
        evicted
    }

    /// The value for `key` if present and not invalidated.
    pub fn get(&self, key: &QueryKey) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| !entry.stale)
            .map(|entry| &entry.value)
    }

    /// The value for `key` regardless of staleness.
    pub fn peek(&self, key: &QueryKey) -> Option<Cached<'_, V>> {
        self.entries.get(key).map(|entry| Cached {
            value: &entry.value,
            stale: entry.stale,
        })
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries.get(key).is_some_and(|entry| entry.stale)
    }

    /// Tags the entry under `key` was stored with.
    pub fn tags(&self, key: &QueryKey) -> Option<&[CacheTag]> {
        self.entries.get(key).map(|entry| entry.tags.as_slice())
    }

    /// Mark every entry covered by `tags` stale. Returns the affected keys in
    /// sorted order.
    pub fn invalidate(&mut self, tags: &[CacheTag]) -> Vec<QueryKey> {
        let mut hit = BTreeSet::new();
        for tag in tags {
            for (provided, keys) in &self.by_tag {
                if tag.covers(provided) {
                    hit.extend(keys.iter().cloned());
                }
            }
        }
        for key in &hit {
            if let Some(entry) = self.entries.get_mut(key) {
                entry.stale = true;
            }
        }
        hit.into_iter().collect()
    }

    pub fn remove(&mut self, key: &QueryKey) -> Option<V> {
        self.unindex(key);
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Drop every stale entry. Returns the removed keys in sorted order.
    pub fn prune_stale(&mut self) -> Vec<QueryKey> {
        let stale: BTreeSet<QueryKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.stale)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            self.remove(key);
        }
        stale.into_iter().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_tag.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_for_insert(&mut self) -> Option<QueryKey> {
        if self.entries.len() < self.capacity {
            return None;
        }
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| (!entry.stale, entry.stored_at))
            .map(|(key, _)| key.clone())?;
        self.remove(&victim);
        Some(victim)
    }

    fn unindex(&mut self, key: &QueryKey) {
        let Some(entry) = self.entries.get(key) else {
            return;
        };
        for tag in &entry.tags {
            if let Some(keys) = self.by_tag.get_mut(tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.by_tag.remove(tag);
                }
            }
        }
    }
}
