//! Insertion-ordered map with case-insensitive keys
//!
//! Used for variable environments and for reading definition fields, so that
//! `Amount`, `amount` and `AMOUNT` all name the same binding. The first spelling
//! inserted is the one reported back.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CaseInsensitiveMap<V> {
    index: HashMap<String, usize>,
    entries: Vec<(String, V)>,
}

impl<V> Default for CaseInsensitiveMap<V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

fn fold(key: &str) -> String {
    key.to_lowercase()
}

impl<V> CaseInsensitiveMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(&fold(key))
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(&fold(key)).map(|&i| &self.entries[i].1)
    }

    /// Insert or replace. A replaced entry keeps its position and original spelling.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.index.get(&fold(&key)) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.index.insert(fold(&key), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Insert only when no entry exists under any casing of `key`.
    /// Returns whether the value was stored.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        if self.contains_key(&key) {
            return false;
        }
        self.insert(key, value);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for CaseInsensitiveMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = CaseInsensitiveMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
