use std::{
    borrow::Borrow,
    collections::{hash_map::Entry, HashMap},
    fmt,
    hash::{BuildHasher, Hash},
    ops::Deref,
    sync::{
        atomic::{
            AtomicU64,
            Ordering::{Acquire, Release},
        },
        Arc,
    },
};

use parking_lot::RwLock;

use super::*;

/// A concurrent map that counts its committed mutations.
///
/// All entries live behind one reader/writer lock. Point reads and
/// `snapshot` share the lock, while every mutation holds it
/// exclusively and bumps the version by exactly one before releasing
/// it. Writes are therefore totally ordered, and the version
/// observed alongside any read matches the entries that read saw.
///
/// Cloning a `VersionedMap` is cheap and yields another handle to the
/// same underlying map, so it can be moved into worker threads or
/// async tasks directly.
///
/// Removing a key that is not present is not a mutation: it returns
/// `None` and leaves the version untouched.
///
/// # Examples
///
/// ```
/// use std::thread;
///
/// use versioned_map::VersionedMap;
///
/// let map: VersionedMap<u32, String> = VersionedMap::new();
///
/// let workers: Vec<_> = (0..4)
///     .map(|i| {
///         let map = map.clone();
///         thread::spawn(move || {
///             map.insert(i, format!("worker {}", i));
///         })
///     })
///     .collect();
///
/// for worker in workers {
///     worker.join().unwrap();
/// }
///
/// assert_eq!(map.version(), 4);
/// assert_eq!(map.get(&2), Some("worker 2".to_string()));
/// ```
pub struct VersionedMap<K, V, S = FnvBuildHasher>(Arc<MapInner<K, V, S>>);

#[doc(hidden)]
pub struct MapInner<K, V, S> {
    config: Config,
    entries: RwLock<HashMap<K, V, S>>,
    // only ever written while `entries` is write-locked
    version: AtomicU64,
    counters: Counters,
}

impl<K, V, S> Clone for VersionedMap<K, V, S> {
    fn clone(&self) -> Self {
        VersionedMap(self.0.clone())
    }
}

impl<K, V, S> Deref for VersionedMap<K, V, S> {
    type Target = MapInner<K, V, S>;

    fn deref(&self) -> &MapInner<K, V, S> {
        &self.0
    }
}

impl<K, V> VersionedMap<K, V>
where
    K: Hash + Eq,
{
    /// Create an empty map at version 0 with the default `Config`.
    pub fn new() -> Self {
        Config::default().open()
    }
}

impl<K, V> Default for VersionedMap<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        VersionedMap::new()
    }
}

impl<K, V, S> VersionedMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub(crate) fn from_config(config: Config, hasher: S) -> Self {
        let entries =
            HashMap::with_capacity_and_hasher(config.get_capacity(), hasher);
        let counters = Counters::new(config.get_track_stats());

        VersionedMap(Arc::new(MapInner {
            config,
            entries: RwLock::new(entries),
            version: AtomicU64::new(0),
            counters,
        }))
    }

    /// The name this map was configured with.
    pub fn name(&self) -> &str {
        self.config.name_ref()
    }

    /// Insert a key to a new value, returning the last value if it
    /// was set. Always counts as one mutation, even if the new value
    /// is equal to the old one.
    ///
    /// # Examples
    ///
    /// ```
    /// # use versioned_map::VersionedMap;
    /// let map = VersionedMap::new();
    /// assert_eq!(map.insert("k", 0), None);
    /// assert_eq!(map.insert("k", 1), Some(0));
    /// assert_eq!(map.version(), 2);
    /// ```
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let mut entries = self.entries.write();
        let last = entries.insert(key, value);
        let version = self.bump();
        drop(entries);

        trace!("{}: insert committed version {}", self.name(), version);
        last
    }

    /// Retrieve a copy of the value for `key` if it exists.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.counters.read();
        self.entries.read().get(key).cloned()
    }

    /// Retrieve a copy of the value for `key` together with the
    /// version it was read at. Both are observed under the same lock
    /// acquisition, so the value is exactly the one committed as of
    /// the returned version.
    pub fn get_with_version<Q>(&self, key: &Q) -> (Option<V>, u64)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.counters.read();
        let entries = self.entries.read();
        (entries.get(key).cloned(), self.version.load(Acquire))
    }

    /// Returns `true` if the map contains a value for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counters.read();
        self.entries.read().contains_key(key)
    }

    /// Delete a value, returning the old value if it existed. The
    /// version only advances when something was actually removed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use versioned_map::VersionedMap;
    /// let map = VersionedMap::new();
    /// map.insert(1, "one");
    /// assert_eq!(map.remove(&1), Some("one"));
    /// assert_eq!(map.remove(&1), None);
    /// assert_eq!(map.version(), 2);
    /// ```
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut entries = self.entries.write();
        let last = entries.remove(key);
        if last.is_some() {
            let version = self.bump();
            drop(entries);
            trace!("{}: remove committed version {}", self.name(), version);
        }
        last
    }

    /// Compare and swap. Capable of unique creation, conditional
    /// modification, or deletion. If `old` is `None`, this will only
    /// set the value if it doesn't exist yet. If `new` is `None`, will
    /// delete the value if `old` is correct. If both `old` and `new`
    /// are `Some`, will modify the value if `old` is correct.
    ///
    /// Returns the version of the map after the operation. A
    /// successful swap bumps the version unless it changed nothing,
    /// which only happens when both `old` and `new` are `None` for an
    /// absent key.
    ///
    /// On a mismatch, returns a `CompareAndSwapError` holding the
    /// current value and handing back the proposed one.
    ///
    /// # Examples
    ///
    /// ```
    /// # use versioned_map::VersionedMap;
    /// let map = VersionedMap::new();
    ///
    /// // unique creation
    /// assert_eq!(map.compare_and_swap("k", None, Some(10)), Ok(1));
    ///
    /// // conditional modification
    /// assert_eq!(map.compare_and_swap("k", Some(&10), Some(20)), Ok(2));
    ///
    /// // failed conditional modification -- the current value is
    /// // returned in the error variant
    /// let conflict = map.compare_and_swap("k", Some(&30), Some(40)).unwrap_err();
    /// assert_eq!(conflict.current, Some(20));
    /// assert_eq!(conflict.proposed, Some(40));
    ///
    /// // conditional deletion
    /// assert_eq!(map.compare_and_swap("k", Some(&20), None), Ok(3));
    /// assert_eq!(map.get("k"), None);
    /// ```
    pub fn compare_and_swap(
        &self,
        key: K,
        old: Option<&V>,
        new: Option<V>,
    ) -> CompareAndSwapResult<V>
    where
        V: PartialEq + Clone,
    {
        let mut entries = self.entries.write();

        let current = entries.get(&key);
        let matches = match (old, current) {
            (None, None) => true,
            (Some(o), Some(c)) => o == c,
            _ => false,
        };

        if !matches {
            let current = current.cloned();
            drop(entries);
            trace!("{}: compare and swap conflict", self.name());
            return Err(CompareAndSwapError { current, proposed: new });
        }

        let version = match new {
            Some(value) => {
                entries.insert(key, value);
                self.bump()
            }
            None => {
                if entries.remove(&key).is_some() {
                    self.bump()
                } else {
                    self.version.load(Acquire)
                }
            }
        };
        drop(entries);

        trace!("{}: compare and swap at version {}", self.name(), version);
        Ok(version)
    }

    /// Returns the value for `key` if one exists, otherwise inserts
    /// `value` and returns it. Only an actual insertion advances the
    /// version.
    pub fn get_or_insert(&self, key: K, value: V) -> V
    where
        V: Clone,
    {
        let mut entries = self.entries.write();
        let (ret, inserted_at) = match entries.entry(key) {
            Entry::Occupied(occupied) => (occupied.get().clone(), None),
            Entry::Vacant(vacant) => {
                (vacant.insert(value).clone(), Some(self.bump()))
            }
        };
        drop(entries);

        if let Some(version) = inserted_at {
            trace!("{}: get_or_insert committed version {}", self.name(), version);
        } else {
            self.counters.read();
        }
        ret
    }

    /// Remove every entry. Counts as a single mutation if the map was
    /// not already empty.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        if entries.is_empty() {
            return;
        }
        entries.clear();
        let version = self.bump();
        drop(entries);
        trace!("{}: clear committed version {}", self.name(), version);
    }

    /// The number of committed mutations since this map was created.
    ///
    /// Reading the version never takes the lock, and any mutation
    /// that returned before this call started is reflected.
    pub fn version(&self) -> u64 {
        self.version.load(Acquire)
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Capture a deep copy of every entry along with the current
    /// version. Concurrent readers proceed while the copy is made;
    /// writers wait until it is done.
    ///
    /// # Examples
    ///
    /// ```
    /// # use versioned_map::VersionedMap;
    /// let map = VersionedMap::new();
    /// map.insert("a", vec![1]);
    ///
    /// let snapshot = map.snapshot();
    /// map.insert("a", vec![2]);
    /// map.insert("b", vec![3]);
    ///
    /// assert_eq!(snapshot.version(), 1);
    /// assert_eq!(snapshot.get("a"), Some(&vec![1]));
    /// assert!(!snapshot.contains_key("b"));
    /// ```
    pub fn snapshot(&self) -> Snapshot<K, V, S>
    where
        K: Clone,
        V: Clone,
        S: Clone,
    {
        self.counters.read();
        let entries = self.entries.read();
        let version = self.version.load(Acquire);
        let snapshot = Snapshot::new(version, entries.clone());
        drop(entries);

        debug!(
            "{}: captured snapshot of {} entries at version {}",
            self.name(),
            snapshot.len(),
            version
        );
        snapshot
    }

    /// Read and write counts, if this map was configured to track
    /// them. All zeros otherwise.
    pub fn stats(&self) -> Stats {
        self.counters.load()
    }

    // must be called while holding the write lock on `entries`
    fn bump(&self) -> u64 {
        self.counters.wrote();
        self.version.fetch_add(1, Release) + 1
    }
}

impl<K, V, S> fmt::Debug for VersionedMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read();
        f.debug_struct("VersionedMap")
            .field("name", &self.config.name_ref())
            .field("version", &self.version.load(Acquire))
            .field("entries", &*entries)
            .finish()
    }
}

/// The result of a `compare_and_swap`: the map version after the
/// swap, or the conflict that prevented it.
pub type CompareAndSwapResult<V> = Result<u64, CompareAndSwapError<V>>;

/// Compare and swap error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompareAndSwapError<V> {
    /// The current value which caused your CAS to fail.
    pub current: Option<V>,
    /// Returned value that was proposed unsuccessfully.
    pub proposed: Option<V>,
}

impl<V> fmt::Display for CompareAndSwapError<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Compare and swap conflict")
    }
}

impl<V: fmt::Debug> std::error::Error for CompareAndSwapError<V> {}
