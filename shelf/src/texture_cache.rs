//! Keyed cache of GPU-resident textures.
//!
//! The cache owns every handle it stores. Callers borrow handles for the
//! duration of a draw call and never keep them across frames; releasing a
//! handle happens exactly once, when the entry is dropped by [`TextureCache::clear`]
//! or when the cache itself goes away.
//!
//! Loads that fail are *not* remembered. A missing or momentarily locked file
//! is retried on the next lookup, so transient failures heal on their own.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;

use crate::primitives::Color;

/// A persistent texture cache, retained across frames.
#[derive(Debug)]
pub struct TextureCache<T> {
    /// Used in log lines to tell the image and text caches apart.
    label: &'static str,
    entries: HashMap<String, T>,
    /// Keys whose last load failed. Only used to keep repeated failures out of
    /// the warning log; a failed key is still reloaded on every lookup.
    failed: HashSet<String>,
    loads: u64,
    failures: u64,
}

impl<T> TextureCache<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: HashMap::new(),
            failed: HashSet::new(),
            loads: 0,
            failures: 0,
        }
    }

    /// Look up `key`, running `load` on a miss.
    ///
    /// Returns the cached handle, or `None` if the loader failed. A hit never
    /// calls the loader, so repeated lookups of one key create one resource.
    pub fn get<E, F>(&mut self, key: &str, load: F) -> Option<&T>
    where
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        if self.entries.contains_key(key) {
            return self.entries.get(key);
        }

        self.loads += 1;
        match load() {
            Ok(handle) => {
                if self.failed.remove(key) {
                    tracing::debug!(cache = self.label, key, "texture recovered after earlier failure");
                }
                Some(self.entries.entry(key.to_owned()).or_insert(handle))
            }
            Err(e) => {
                self.failures += 1;
                if self.failed.insert(key.to_owned()) {
                    tracing::warn!(cache = self.label, key, error = %e, "texture load failed");
                } else {
                    tracing::debug!(cache = self.label, key, error = %e, "texture load failed again");
                }
                None
            }
        }
    }

    /// Check whether a live entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of loader invocations so far (hits excluded).
    pub fn loads(&self) -> u64 {
        self.loads
    }

    /// Number of loader invocations that failed.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Release every texture and empty the cache.
    ///
    /// Must run before the drawing context that created the textures is torn
    /// down.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            tracing::debug!(cache = self.label, count = self.entries.len(), "releasing textures");
        }
        self.entries.clear();
        self.failed.clear();
    }
}

/// Cache key for a rendered string in a given color.
///
/// The text is length-prefixed and the color is fixed-width hex, so two
/// different `(text, color)` pairs can never produce the same key.
pub fn text_key(text: &str, color: Color) -> String {
    let [r, g, b, a] = color.to_rgba8();
    format!("{}:{}|{r:02x}{g:02x}{b:02x}{a:02x}", text.len(), text)
}
