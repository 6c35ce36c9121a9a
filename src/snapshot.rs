use std::{
    borrow::Borrow,
    collections::{hash_map, HashMap},
    hash::{BuildHasher, Hash},
};

use serde::{Deserialize, Serialize};

use super::*;

/// An owned, point-in-time copy of every entry in a `VersionedMap`,
/// stamped with the version it was captured at.
///
/// A `Snapshot` shares nothing with the map it came from: later
/// mutations of the map are not visible here, and consuming the
/// snapshot with `into_inner` hands out a plain `HashMap` that can
/// be changed freely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize, V: Serialize",
    deserialize = "K: Deserialize<'de> + Hash + Eq, \
                   V: Deserialize<'de>, \
                   S: BuildHasher + Default"
))]
pub struct Snapshot<K, V, S = FnvBuildHasher> {
    version: u64,
    entries: HashMap<K, V, S>,
}

impl<K, V, S> Snapshot<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub(crate) fn new(version: u64, entries: HashMap<K, V, S>) -> Self {
        Snapshot { version, entries }
    }

    /// The map version at which this snapshot was captured. Every
    /// mutation with a version at or below this one is reflected.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Retrieve a value from the snapshot if it exists.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Returns `true` if the snapshot contains a value for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Number of entries captured.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries were captured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the captured entries in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<'_, K, V> {
        self.entries.iter()
    }

    /// Consume the snapshot, returning the captured entries.
    pub fn into_inner(self) -> HashMap<K, V, S> {
        self.entries
    }
}

impl<K, V, S> PartialEq for Snapshot<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.entries == other.entries
    }
}

impl<K, V, S> Eq for Snapshot<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> IntoIterator for Snapshot<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (K, V);
    type IntoIter = hash_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a Snapshot<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = hash_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
