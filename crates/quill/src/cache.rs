//! Least-recently-used cache of parsed templates.
//!
//! [`TemplateCache`] maps a [`SourceId`] to its parsed [`Template`]. Lookups
//! go through [`TemplateCache::get_or_parse`]: the first caller for an id
//! parses while later callers for the same id wait for the result instead of
//! parsing it again.
//!
//! Eviction only drops the cache's own handle. Templates already handed out
//! stay valid; the next lookup of an evicted id parses it again.
//!
//! A lookup never waits on a thread that is itself waiting, directly or
//! through other threads, on the caller. That only happens when templates
//! include each other; the caller then parses on its own and the parser's
//! include stack reports the cycle.
//!
//! A capacity of zero disables caching: every lookup parses. This is the
//! setting for development, where templates change on disk between renders.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use lru::LruCache;
use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::resolver::SourceId;
use crate::template::Template;

/// Counters describing cache behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to parse.
    pub misses: u64,
    /// Entries dropped to make room.
    pub evictions: u64,
    /// Entries currently cached.
    pub entries: usize,
}

struct CacheState {
    entries: Option<LruCache<SourceId, Arc<Template>>>,
    /// Ids being parsed, with the thread parsing each.
    pending: HashMap<SourceId, ThreadId>,
    /// The id each blocked thread waits for.
    waiting: HashMap<ThreadId, SourceId>,
    stats: CacheStats,
}

impl CacheState {
    /// Returns `true` if waiting for `id` would make `me` wait on itself.
    fn wait_closes_loop(&self, id: &SourceId, me: ThreadId) -> bool {
        let mut current = id;
        for _ in 0..=self.waiting.len() {
            let Some(owner) = self.pending.get(current) else {
                return false;
            };
            if *owner == me {
                return true;
            }
            match self.waiting.get(owner) {
                Some(next) => current = next,
                None => return false,
            }
        }
        false
    }
}

/// Thread-safe LRU cache of parsed templates.
pub struct TemplateCache {
    capacity: usize,
    state: Mutex<CacheState>,
    ready: Condvar,
}

/// Clears the in-progress marker of an id, also when parsing panics.
struct PendingGuard<'a> {
    cache: &'a TemplateCache,
    id: &'a SourceId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.cache.state.lock().pending.remove(self.id);
        self.cache.ready.notify_all();
    }
}

impl TemplateCache {
    /// Creates a cache holding at most `capacity` templates.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(CacheState {
                entries: NonZeroUsize::new(capacity).map(LruCache::new),
                pending: HashMap::new(),
                waiting: HashMap::new(),
                stats: CacheStats::default(),
            }),
            ready: Condvar::new(),
        }
    }

    /// Maximum number of cached templates; zero means caching is disabled.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if the cache stores anything at all.
    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    /// Returns the cached template for `id`, or parses and caches it.
    ///
    /// `parse` runs without the cache lock held, so it may itself look up
    /// other ids (included templates). Errors are returned to the caller and
    /// nothing is cached for them.
    pub fn get_or_parse<F, E>(&self, id: &SourceId, parse: F) -> Result<Arc<Template>, E>
    where
        F: FnOnce() -> Result<Template, E>,
    {
        if !self.is_enabled() {
            self.state.lock().stats.misses += 1;
            debug!(%id, "template cache disabled, parsing");
            return parse().map(Arc::new);
        }

        let me = thread::current().id();
        let mut state = self.state.lock();
        let mut owns_marker = true;
        loop {
            if let Some(template) = state.entries.as_mut().and_then(|e| e.get(id)).cloned() {
                state.stats.hits += 1;
                return Ok(template);
            }
            if !state.pending.contains_key(id) {
                break;
            }
            if state.wait_closes_loop(id, me) {
                debug!(%id, "template parses wait on each other, parsing here");
                owns_marker = false;
                break;
            }
            debug!(%id, "waiting for template parse in progress");
            state.waiting.insert(me, id.clone());
            self.ready.wait(&mut state);
            state.waiting.remove(&me);
        }

        state.stats.misses += 1;
        if owns_marker {
            state.pending.insert(id.clone(), me);
        }
        drop(state);

        let _guard = owns_marker.then(|| PendingGuard { cache: self, id });
        let template = Arc::new(parse()?);

        let mut state = self.state.lock();
        if let Some(entries) = state.entries.as_mut() {
            if let Some((evicted, _)) = entries.push(id.clone(), Arc::clone(&template)) {
                if evicted != *id {
                    debug!(%evicted, "evicted template from cache");
                    state.stats.evictions += 1;
                }
            }
        }
        Ok(template)
    }

    /// Returns the cached template for `id` without parsing.
    pub fn get(&self, id: &SourceId) -> Option<Arc<Template>> {
        let mut state = self.state.lock();
        let found = state.entries.as_mut().and_then(|e| e.get(id)).cloned();
        if found.is_some() {
            state.stats.hits += 1;
        }
        found
    }

    /// Returns `true` if `id` is cached. Does not touch recency.
    pub fn contains(&self, id: &SourceId) -> bool {
        self.state
            .lock()
            .entries
            .as_ref()
            .is_some_and(|e| e.contains(id))
    }

    /// Drops the entry for `id`. Returns `true` if there was one.
    pub fn invalidate(&self, id: &SourceId) -> bool {
        let removed = self
            .state
            .lock()
            .entries
            .as_mut()
            .and_then(|e| e.pop(id))
            .is_some();
        if removed {
            debug!(%id, "invalidated cached template");
        }
        removed
    }

    /// Drops every entry.
    pub fn clear(&self) {
        if let Some(entries) = self.state.lock().entries.as_mut() {
            entries.clear();
        }
    }

    /// Number of cached templates.
    pub fn len(&self) -> usize {
        self.state.lock().entries.as_ref().map_or(0, LruCache::len)
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            entries: state.entries.as_ref().map_or(0, LruCache::len),
            ..state.stats
        }
    }
}

impl std::fmt::Debug for TemplateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateCache")
            .field("capacity", &self.capacity)
            .field("stats", &self.stats())
            .finish()
    }
}
