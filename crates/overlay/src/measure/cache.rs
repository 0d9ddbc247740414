//! Draw-product caches and the refresh generation counter.
//!
//! A refresh builds fresh maps stamped with its own generation and swaps them in
//! whole on commit, so keys not seen in that pass disappear with the old map.

use std::cell::Cell;
use std::collections::HashMap;
use std::hash::Hash;

use shared::{ActiveAxis, DrawProduct, MeasurementId};

/// Monotonic refresh counter.
///
/// Each refresh takes a value with [`Generation::begin`]; its results may only be
/// committed while that value is still [`current`](Generation::current).
#[derive(Debug, Default)]
pub struct Generation(Cell<u64>);

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a refresh and return its generation
    pub fn begin(&self) -> u64 {
        let next = self.0.get() + 1;
        self.0.set(next);
        next
    }

    pub fn current(&self) -> u64 {
        self.0.get()
    }

    /// True when no refresh started after `generation`
    pub fn is_current(&self, generation: u64) -> bool {
        self.0.get() == generation
    }
}

/// Cached value plus the generation that last refreshed it
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<V> {
    pub value: V,
    pub generation: u64,
}

/// Map from identity to the latest value, at most one entry per key
#[derive(Debug, Clone)]
pub struct GenerationCache<K, V> {
    entries: HashMap<K, Entry<V>>,
}

impl<K, V> Default for GenerationCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> GenerationCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&Entry<V>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Store `value`, replacing any entry with the same key
    pub fn insert(&mut self, key: K, value: V, generation: u64) {
        self.entries.insert(key, Entry { value, generation });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Entry<V>)> {
        self.entries.iter()
    }

    /// Number of keys in `self` that `other` does not have
    pub fn missing_from(&self, other: &Self) -> usize {
        self.entries
            .keys()
            .filter(|k| !other.contains_key(k))
            .count()
    }
}

/// Entity key → projected geometry
pub type ProductCache = GenerationCache<String, Option<DrawProduct>>;

impl ProductCache {
    /// Cached product that can be re-projected instead of converted again
    pub fn reusable(&self, key: &str) -> Option<&DrawProduct> {
        self.entries
            .get(key)?
            .value
            .as_ref()
            .filter(|p| !p.is_empty())
    }
}

/// Duo-measurement product with the axis flags it was cached under
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEntry {
    pub product: Option<DrawProduct>,
    pub active_axis: ActiveAxis,
}

/// Measurement id → projected result geometry
pub type ResultCache = GenerationCache<MeasurementId, ResultEntry>;

impl ResultCache {
    pub fn reusable(&self, id: MeasurementId) -> Option<&DrawProduct> {
        self.entries
            .get(&id)?
            .value
            .product
            .as_ref()
            .filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::edge_product;
    use glam::Vec3;
    use shared::{DrawObject, DrawObjectKind, DrawProductKind};

    #[test]
    fn test_generation_is_monotonic() {
        let generation = Generation::new();
        assert_eq!(generation.current(), 0);
        let first = generation.begin();
        let second = generation.begin();
        assert!(second > first);
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }

    #[test]
    fn test_insert_replaces_same_key() {
        let mut cache = ProductCache::new();
        cache.insert("1_0_-".into(), None, 1);
        cache.insert("1_0_-".into(), Some(edge_product(Vec3::ZERO, Vec3::X)), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"1_0_-".to_string()).map(|e| e.generation), Some(2));
    }

    #[test]
    fn test_reusable_skips_missing_and_empty() {
        let mut cache = ProductCache::new();
        cache.insert("a".into(), None, 1);
        cache.insert(
            "b".into(),
            Some(DrawProduct {
                kind: DrawProductKind::Basic,
                objects: vec![DrawObject {
                    kind: DrawObjectKind::Edge,
                    parts: Vec::new(),
                }],
            }),
            1,
        );
        cache.insert("c".into(), Some(edge_product(Vec3::ZERO, Vec3::X)), 1);
        assert!(cache.reusable("a").is_none());
        assert!(cache.reusable("b").is_none());
        assert!(cache.reusable("c").is_some());
        assert!(cache.reusable("d").is_none());
    }

    #[test]
    fn test_missing_from_counts_evicted_keys() {
        let mut old = ProductCache::new();
        old.insert("a".into(), None, 1);
        old.insert("b".into(), None, 1);
        let mut new = ProductCache::new();
        new.insert("b".into(), None, 2);
        new.insert("c".into(), None, 2);
        assert_eq!(old.missing_from(&new), 1);
    }

    #[test]
    fn test_result_cache_keeps_axis_flags() {
        let mut cache = ResultCache::new();
        let axes = ActiveAxis {
            x: false,
            ..ActiveAxis::default()
        };
        cache.insert(
            7,
            ResultEntry {
                product: Some(edge_product(Vec3::ZERO, Vec3::Y)),
                active_axis: axes,
            },
            3,
        );
        let entry = cache.get(&7).map(|e| &e.value);
        assert_eq!(entry.map(|e| e.active_axis), Some(axes));
        assert!(cache.reusable(7).is_some());
    }
}
