//! Memoized resolution keyed by message id.

use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::debug;

use crate::model::content::ResolvedContent;
use crate::parser::gmail::GmailMessage;
use crate::resolve::Resolver;

/// Default number of resolved bodies to keep.
pub const DEFAULT_CACHE_SIZE: usize = 256;

/// LRU cache of [`ResolvedContent`] keyed by message id.
///
/// Resolution is pure, so a message id always maps to the same result and
/// re-opening a message in a list view costs nothing after the first time.
/// Messages without an id are resolved but never cached.
pub struct ResolvedCache {
    resolver: Resolver,
    cache: LruCache<String, ResolvedContent>,
    hits: u64,
    misses: u64,
}

impl ResolvedCache {
    /// A cache holding up to `capacity` entries (at least one).
    pub fn new(capacity: usize, resolver: Resolver) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            resolver,
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached result for `message`, resolving it on a miss.
    pub fn get_or_resolve(&mut self, message: &GmailMessage) -> ResolvedContent {
        if message.id.is_empty() {
            self.misses += 1;
            return message.resolve_with(&self.resolver);
        }

        if let Some(hit) = self.cache.get(&message.id) {
            self.hits += 1;
            debug!(id = %message.id, "Resolved body served from cache");
            return hit.clone();
        }

        self.misses += 1;
        let resolved = message.resolve_with(&self.resolver);
        self.cache.put(message.id.clone(), resolved.clone());
        resolved
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl Default for ResolvedCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE, Resolver::default())
    }
}
