use std::hash::{BuildHasher, Hash};

use super::*;

/// Top-level configuration for a `VersionedMap`.
///
/// # Examples
///
/// ```
/// use versioned_map::{Config, VersionedMap};
///
/// let map: VersionedMap<u64, &str> =
///     Config::new().name("sessions".to_owned()).capacity(1024).open();
///
/// assert_eq!(map.name(), "sessions");
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    name: String,
    capacity: usize,
    track_stats: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            name: "versioned_map".to_owned(),
            capacity: 0,
            track_stats: true,
        }
    }
}

macro_rules! builder {
    ($(($name:ident, $get:ident, $set:ident, $t:ty, $desc:expr)),*) => {
        $(
            #[doc="Get "]
            #[doc=$desc]
            pub fn $get(&self) -> $t {
                self.$name.clone()
            }

            #[doc="Set "]
            #[doc=$desc]
            pub fn $set(&mut self, to: $t) {
                self.$name = to;
            }

            #[doc="Builder, set "]
            #[doc=$desc]
            pub fn $name(mut self, to: $t) -> Config {
                self.$name = to;
                self
            }
        )*
    }
}

impl Config {
    /// Returns a default `Config`.
    pub fn new() -> Config {
        Config::default()
    }

    builder!(
        (name, get_name, set_name, String, "the name used to tag log lines for this map"),
        (capacity, get_capacity, set_capacity, usize, "the number of entries to preallocate"),
        (track_stats, get_track_stats, set_track_stats, bool, "whether read and write operations are counted")
    );

    pub(crate) fn name_ref(&self) -> &str {
        &self.name
    }

    /// Create a new, empty `VersionedMap` at version 0 using the
    /// default hasher.
    pub fn open<K, V>(&self) -> VersionedMap<K, V>
    where
        K: Hash + Eq,
    {
        self.open_with_hasher(FnvBuildHasher::default())
    }

    /// Create a new, empty `VersionedMap` at version 0 that hashes
    /// keys with `hasher`.
    pub fn open_with_hasher<K, V, S>(&self, hasher: S) -> VersionedMap<K, V, S>
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        debug!(
            "opening map {} with capacity {} (stats: {})",
            self.name, self.capacity, self.track_stats
        );
        VersionedMap::from_config(self.clone(), hasher)
    }
}
