use crate::error::{OrderedMapError, Result};
use std::{
    borrow::Borrow,
    collections::{hash_map::RandomState, HashMap},
    fmt,
    hash::{BuildHasher, Hash},
    iter::FromIterator,
    mem, slice,
};
use tracing::{debug, trace};

/// A [`HashMap`] paired with a [`Vec`] of its keys, so entries can be
/// reached by key or by their position in insertion order.
///
/// Re-inserting a key which is already present replaces its value but
/// leaves it where it was. Removing a key shifts every key after it down
/// by one. The key order and the value store are only ever touched
/// together, and no mutable reference to either escapes, so the two
/// can't drift apart.
pub struct OrderedMap<K, V, S = RandomState>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    order: Vec<K>,
    store: HashMap<K, V, S>,
}

/// Keys of an [`OrderedMap`] in insertion order.
pub struct Keys<'a, K> {
    inner: slice::Iter<'a, K>,
}

/// Values of an [`OrderedMap`], in the same order as its keys.
pub struct Values<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    keys: slice::Iter<'a, K>,
    store: &'a HashMap<K, V, S>,
}

/// Entries of an [`OrderedMap`] in insertion order.
pub struct Iter<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    keys: slice::Iter<'a, K>,
    store: &'a HashMap<K, V, S>,
}

impl<K, V> OrderedMap<K, V, RandomState>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Makes a new map with room for `capacity` entries before either
    /// backing structure has to grow.
    pub fn with_capacity(capacity: usize) -> Self {
        OrderedMap::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V, S> OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            order: Vec::with_capacity(capacity),
            store: HashMap::with_capacity_and_hasher(capacity, hash_builder),
        }
    }

    /// Maps `k` to `v`, returning the value `k` previously mapped to.
    /// A new key goes on the end of the order; an existing key keeps its
    /// position.
    pub fn insert(&mut self, k: K, v: V) -> Option<V>
    where
        K: Clone,
    {
        if let Some(slot) = self.store.get_mut(&k) {
            return Some(mem::replace(slot, v));
        }

        self.order.push(k.clone());
        self.store.insert(k, v);
        trace!(index = self.order.len() - 1, len = self.len(), "appended key");

        #[cfg(test)]
        self.continuity_test();

        None
    }

    pub fn get<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.get(k)
    }

    /// Mutates a value in place. Its key stays where it is.
    pub fn get_mut<Q>(&mut self, k: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.get_mut(k)
    }

    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.contains_key(k)
    }

    pub fn keys(&self) -> Keys<'_, K> {
        Keys {
            inner: self.order.iter(),
        }
    }

    /// Values in key order, so the nth value belongs to the nth key.
    pub fn values(&self) -> Values<'_, K, V, S> {
        Values {
            keys: self.order.iter(),
            store: &self.store,
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter {
            keys: self.order.iter(),
            store: &self.store,
        }
    }

    /// The value belonging to the key at `index`.
    pub fn element_at(&self, index: usize) -> Result<&V> {
        let k = self.key_at(index)?;
        self.store.get(k).ok_or_else(|| self.out_of_range(index))
    }

    /// The key at `index` in insertion order.
    pub fn key_at(&self, index: usize) -> Result<&K> {
        self.order.get(index).ok_or_else(|| self.out_of_range(index))
    }

    /// The position of `k` in insertion order, or `None` if it isn't
    /// mapped. This is a linear scan of the order.
    pub fn index_of<Q>(&self, k: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if !self.store.contains_key(k) {
            return None;
        }

        self.order.iter().position(|key| Borrow::<Q>::borrow(key) == k)
    }

    /// Removes `k`, returning its value. Does nothing if `k` isn't
    /// mapped.
    pub fn remove<Q>(&mut self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let removed = self.store.remove(k)?;

        let position =
            self.order.iter().position(|key| Borrow::<Q>::borrow(key) == k);
        if let Some(index) = position {
            self.order.remove(index);
            trace!(index, len = self.len(), "removed key");
        }

        #[cfg(test)]
        self.continuity_test();

        Some(removed)
    }

    /// Removes the entry at `index`, shifting later entries down by one.
    pub fn remove_at(&mut self, index: usize) -> Result<(K, V)> {
        if index >= self.order.len() {
            return Err(self.out_of_range(index));
        }

        let k = self.order.remove(index);
        let entry = match self.store.remove_entry(&k) {
            Some(entry) => entry,
            None => unreachable!("key order references a key with no value"),
        };
        trace!(index, len = self.len(), "removed key by position");

        #[cfg(test)]
        self.continuity_test();

        Ok(entry)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.store.clear();
        trace!("cleared");

        #[cfg(test)]
        {
            assert_eq!(0, self.len());
            self.continuity_test();
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Makes sure both structures can hold at least `capacity` entries
    /// without reallocating. Contents are untouched. This is only a hint:
    /// a request which can't be satisfied is dropped.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let additional = capacity.saturating_sub(self.order.len());
        if let Err(err) = self.order.try_reserve(additional) {
            debug!(capacity, %err, "could not reserve key order");
            return;
        }
        if let Err(err) = self.store.try_reserve(additional) {
            debug!(capacity, %err, "could not reserve value store");
        }
    }

    fn out_of_range(&self, index: usize) -> OrderedMapError {
        let len = self.len();
        debug!(index, len, "positional access out of range");
        OrderedMapError::OutOfRange { index, len }
    }

    #[cfg(test)]
    fn continuity_test(&self) {
        use std::collections::HashSet;

        assert_eq!(self.order.len(), self.store.len());

        // every ordered key has a value, and none appears twice
        let mut seen = HashSet::with_capacity(self.order.len());
        for k in self.order.iter() {
            assert!(self.store.contains_key(k));
            assert!(seen.insert(k));
        }
    }
}

impl<K, V, S> Default for OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V, S> Clone for OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        Self {
            order: self.order.clone(),
            store: self.store.clone(),
        }
    }
}

impl<K, V, S> fmt::Debug for OrderedMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Two maps are equal when they hold equal entries in the same order.
impl<K, V, S> PartialEq for OrderedMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V, S> Eq for OrderedMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Extend<(K, V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(self.len() + iter.size_hint().0);
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a OrderedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K> Iterator for Keys<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K> DoubleEndedIterator for Keys<'a, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<'a, K> ExactSizeIterator for Keys<'a, K> {}

impl<'a, K, V, S> Iterator for Values<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store;
        self.keys.next().and_then(|k| store.get(k))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<'a, K, V, S> DoubleEndedIterator for Values<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        let store = self.store;
        self.keys.next_back().and_then(|k| store.get(k))
    }
}

impl<'a, K, V, S> ExactSizeIterator for Values<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
}

impl<'a, K, V, S> Iterator for Iter<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store;
        self.keys.next().and_then(|k| store.get(k).map(|v| (k, v)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<'a, K, V, S> DoubleEndedIterator for Iter<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        let store = self.store;
        self.keys.next_back().and_then(|k| store.get(k).map(|v| (k, v)))
    }
}

impl<'a, K, V, S> ExactSizeIterator for Iter<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
}
