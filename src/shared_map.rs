use parking_lot::RwLock;
use std::{
    borrow::Borrow,
    collections::hash_map::RandomState,
    hash::{BuildHasher, Hash},
    sync::Arc,
};

use crate::{error::Result, ordered_map::OrderedMap};

/// Wrapper for an [`OrderedMap`] which is shareable across thread
/// boundaries. Every method holds the lock for exactly the duration of one
/// operation, so each call is atomic, but two calls in a row are not. If
/// you need "check then insert" you'll have to bring your own lock.
///
/// Nothing borrowed from the map leaves the lock: keys and values come
/// back as clones, and `keys`/`values` are snapshots taken at call time.
pub struct SharedOrderedMap<K, V, S = RandomState>(
    Arc<RwLock<OrderedMap<K, V, S>>>,
)
where
    K: Eq + Hash,
    S: BuildHasher;

impl<K, V> SharedOrderedMap<K, V, RandomState>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_map(OrderedMap::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_map(OrderedMap::with_capacity(capacity))
    }
}

impl<K, V, S> SharedOrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Wraps a map into a shared accessor, making it safe to move across
    /// thread boundaries.
    pub fn with_map(map: OrderedMap<K, V, S>) -> Self {
        Self(Arc::from(RwLock::from(map)))
    }

    /// Inserts an entry, returning the value it replaced.
    pub fn insert(&self, k: K, v: V) -> Option<V>
    where
        K: Clone,
    {
        self.0.write().insert(k, v)
    }

    /// Get a value from the map. This clones it to minimize the lock time
    /// of the map.
    pub fn get<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.0.read().get(k).cloned()
    }

    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.0.read().contains_key(k)
    }

    /// A snapshot of the keys in insertion order.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.0.read().keys().cloned().collect()
    }

    /// A snapshot of the values, lined up with what `keys` would have
    /// returned at the same moment.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.0.read().values().cloned().collect()
    }

    pub fn element_at(&self, index: usize) -> Result<V>
    where
        V: Clone,
    {
        self.0.read().element_at(index).map(V::clone)
    }

    pub fn key_at(&self, index: usize) -> Result<K>
    where
        K: Clone,
    {
        self.0.read().key_at(index).map(K::clone)
    }

    pub fn index_of<Q>(&self, k: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.0.read().index_of(k)
    }

    /// Remove an entry from the map, returning its value if it existed.
    pub fn remove<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.0.write().remove(k)
    }

    pub fn remove_at(&self, index: usize) -> Result<(K, V)> {
        self.0.write().remove_at(index)
    }

    /// Clears the map.
    pub fn clear(&self) {
        self.0.write().clear()
    }

    /// The number of entries in the map at present.
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn ensure_capacity(&self, capacity: usize) {
        self.0.write().ensure_capacity(capacity)
    }
}

impl<K, V, S> Clone for SharedOrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn clone(&self) -> Self {
        SharedOrderedMap(self.0.clone())
    }
}

impl<K, V, S> Default for SharedOrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_map(OrderedMap::default())
    }
}

impl<K, V, S> From<OrderedMap<K, V, S>> for SharedOrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn from(map: OrderedMap<K, V, S>) -> Self {
        Self::with_map(map)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crate::{OrderedMap, OrderedMapError, SharedOrderedMap};
    use test_log::test;

    #[test]
    fn test_shared_across_threads() {
        let map: SharedOrderedMap<usize, usize> = SharedOrderedMap::new();
        map.insert(1, 1);

        let thread_map = map.clone();
        let r = thread::spawn(move || thread_map.get(&1)).join();

        assert_eq!(Some(1), r.unwrap());
    }

    #[test]
    fn test_snapshots_are_detached() {
        let map = SharedOrderedMap::with_map(
            vec![("a", 1), ("b", 2)].into_iter().collect::<OrderedMap<_, _>>(),
        );

        let keys = map.keys();
        let values = map.values();
        map.insert("c", 3);
        map.remove("a");

        assert_eq!(vec!["a", "b"], keys);
        assert_eq!(vec![1, 2], values);
        assert_eq!(vec!["b", "c"], map.keys());
    }

    #[test]
    fn test_positional_access() {
        let map = SharedOrderedMap::new();
        map.insert("a".to_owned(), 1);
        map.insert("b".to_owned(), 2);
        map.insert("a".to_owned(), 3);

        assert_eq!(Ok("a".to_owned()), map.key_at(0));
        assert_eq!(Ok(3), map.element_at(0));
        assert_eq!(Some(1), map.index_of("b"));
        assert_eq!(
            Err(OrderedMapError::OutOfRange { index: 2, len: 2 }),
            map.element_at(2)
        );

        assert_eq!(Ok(("a".to_owned(), 3)), map.remove_at(0));
        assert!(map.remove_at(1).is_err());
        assert_eq!(1, map.len());

        map.clear();
        assert!(map.is_empty());
        assert_eq!(None, map.get("b"));
    }

    #[test]
    fn test_from_ordered_map() {
        let map: SharedOrderedMap<_, _> = vec![(3, 'c'), (1, 'a')]
            .into_iter()
            .collect::<OrderedMap<_, _>>()
            .into();

        assert!(map.contains_key(&3));
        assert!(!map.contains_key(&2));
        assert_eq!(vec![3, 1], map.keys());
        assert_eq!(vec!['c', 'a'], map.values());

        map.remove(&3);
        assert!(!map.contains_key(&3));
        assert_eq!(Some(0), map.index_of(&1));
    }

    #[test]
    fn test_with_capacity() {
        let map: SharedOrderedMap<String, u32> =
            SharedOrderedMap::with_capacity(8);
        assert!(map.is_empty());

        map.insert("x".to_owned(), 1);
        assert!(map.contains_key("x"));
        assert_eq!(1, map.len());

        // an impossible hint leaves the map as it was, lock included
        map.ensure_capacity(usize::MAX);
        assert_eq!(vec!["x".to_owned()], map.keys());
        assert_eq!(Some(1), map.get("x"));
    }

    /// Hammers the map from several threads at once; every insert lands
    /// exactly once and the order stays consistent with the values.
    #[test]
    fn test_concurrent_inserts() {
        let map: SharedOrderedMap<usize, usize> = SharedOrderedMap::default();
        map.ensure_capacity(400);

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let map = map.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        map.insert(t * 100 + i, i);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(400, map.len());

        let keys = map.keys();
        let values = map.values();
        assert_eq!(keys.len(), values.len());
        for (k, v) in keys.iter().zip(values.iter()) {
            assert_eq!(k % 100, *v);
        }

        // each thread's keys went in in the order it inserted them
        for t in 0..4 {
            let mine: Vec<_> =
                keys.iter().filter(|k| *k / 100 == t).copied().collect();
            assert_eq!((t * 100..t * 100 + 100).collect::<Vec<_>>(), mine);
        }
    }
}
