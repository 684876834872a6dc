//! Cross-document reflink cache
//!
//! The cache belongs to whoever drives the transform over many documents.
//! The transform itself never touches it; callers fold each document's
//! `reflinks` in with [`ReflinkCache::record`].

use crate::document::Document;
use serde::{Deserialize, Serialize};

/// Names in `candidates` that are not in `cache`, in candidate order.
/// A missing cache counts as empty.
pub fn diff(cache: Option<&[String]>, candidates: &[String]) -> Vec<String> {
    let cache = cache.unwrap_or_default();
    candidates
        .iter()
        .filter(|name| !cache.contains(name))
        .cloned()
        .collect()
}

/// `first` followed by the names of `second` it does not already hold,
/// duplicates removed
pub fn union(first: &[String], second: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(first.len() + second.len());
    for name in first.iter().chain(second) {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}

/// Ordered set of reference names already resolved across documents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReflinkCache {
    names: Vec<String>,
}

impl ReflinkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Names in `candidates` not yet cached
    pub fn diff(&self, candidates: &[String]) -> Vec<String> {
        diff(Some(self.names.as_slice()), candidates)
    }

    /// Add names not yet cached
    pub fn union<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.contains(&name) {
                self.names.push(name);
            }
        }
    }

    /// Fold a processed document's reflinks in, returning the newly added names
    pub fn record(&mut self, document: &Document) -> Vec<String> {
        let Some(found) = document.reflinks.as_deref() else {
            return Vec::new();
        };
        let added = self.diff(found);
        self.union(added.iter().cloned());
        added
    }
}

impl<S: Into<String>> FromIterator<S> for ReflinkCache {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut cache = Self::new();
        cache.union(iter);
        cache
    }
}
