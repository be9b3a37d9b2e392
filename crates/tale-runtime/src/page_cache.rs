#![forbid(unsafe_code)]

//! Bounded LRU cache of page instances.
//!
//! Some child pages are expensive to build (a list page with its scroll
//! position, a reply page with a half-written draft). Their parents keep
//! them in a [`PageCache`] keyed by a content-derived key and reuse the same
//! instance when the user comes back to it.
//!
//! # Example
//! ```
//! use tale_runtime::PageCache;
//!
//! let mut cache: PageCache<String, Vec<u32>> = PageCache::new(2);
//!
//! let first = cache.get_or_insert_with("tale0".to_string(), Vec::new);
//! first.borrow_mut().push(1);
//!
//! let again = cache.get_or_insert_with("tale0".to_string(), Vec::new);
//! assert!(std::rc::Rc::ptr_eq(&first, &again));
//! assert_eq!(cache.stats().hits, 1);
//! ```
//!
//! # Eviction
//! When full, inserting a new key evicts the least recently used entry. The
//! cache only drops its own handle: an evicted page is not removed, and a
//! page still mounted by its parent stays alive through the parent's handle.
//!
//! # Re-entrancy
//! Caches are shared through [`SharedPageCache`]. The constructor passed to
//! [`PageCache::get_or_insert_with`] runs while the cache is borrowed and
//! must not touch the same cache.

use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::rc::Rc;

use lru::LruCache;
use tracing::debug;

/// A page cache shared by every instance of one page type.
pub type SharedPageCache<K, V> = Rc<RefCell<PageCache<K, V>>>;

/// Statistics about cache behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups that found an instance.
    pub hits: u64,
    /// Lookups that had to construct one.
    pub misses: u64,
    /// Entries dropped to make room.
    pub evictions: u64,
    /// Current number of entries.
    pub size: usize,
    /// Maximum capacity.
    pub capacity: usize,
}

impl CacheStats {
    /// Hit rate in `0.0..=1.0`.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache holding shared page instances.
pub struct PageCache<K: Hash + Eq, V> {
    cache: LruCache<K, Rc<RefCell<V>>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K: Hash + Eq + fmt::Debug, V> PageCache<K, V> {
    /// Create a cache with the given capacity. Zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Wrap the cache for sharing between page instances.
    #[must_use]
    pub fn shared(self) -> SharedPageCache<K, V> {
        Rc::new(RefCell::new(self))
    }

    /// Return the cached instance for `key`, or build and cache a new one.
    pub fn get_or_insert_with<F>(&mut self, key: K, make: F) -> Rc<RefCell<V>>
    where
        F: FnOnce() -> V,
    {
        if let Some(page) = self.cache.get(&key) {
            self.hits += 1;
            return Rc::clone(page);
        }

        self.misses += 1;
        let page = Rc::new(RefCell::new(make()));
        if let Some((evicted, _)) = self.cache.push(key, Rc::clone(&page)) {
            self.evictions += 1;
            debug!(key = ?evicted, "page cache eviction");
        }
        page
    }

    /// Look up `key`, refreshing its recency.
    pub fn get(&mut self, key: &K) -> Option<Rc<RefCell<V>>> {
        self.cache.get(key).map(Rc::clone)
    }

    /// Look up `key` without touching recency.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<Rc<RefCell<V>>> {
        self.cache.peek(key).map(Rc::clone)
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.cache.contains(key)
    }

    /// Drop the entry for `key`.
    pub fn invalidate(&mut self, key: &K) -> Option<Rc<RefCell<V>>> {
        self.cache.pop(key)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }

    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            size: self.cache.len(),
            capacity: self.capacity(),
        }
    }
}

impl<K: Hash + Eq, V> fmt::Debug for PageCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageCache")
            .field("len", &self.cache.len())
            .field("capacity", &self.cache.cap())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}
