//! `versioned-map` is a concurrent key/value map guarded by a single
//! reader/writer lock, with a counter of committed mutations and
//! point-in-time snapshots.
//!
//! # Examples
//!
//! ```
//! use versioned_map::VersionedMap;
//!
//! let map: VersionedMap<String, String> = VersionedMap::new();
//! assert_eq!(map.version(), 0);
//!
//! map.insert("a".to_string(), "1".to_string());
//! map.insert("a".to_string(), "2".to_string());
//! assert_eq!(map.get("a"), Some("2".to_string()));
//! assert_eq!(map.version(), 2);
//!
//! // removing an absent key is not a mutation
//! assert_eq!(map.remove("b"), None);
//! assert_eq!(map.version(), 2);
//!
//! let snapshot = map.snapshot();
//!
//! // Atomic compare-and-swap.
//! map.compare_and_swap(
//!     "a".to_string(),
//!     Some(&"2".to_string()), // old value, None for not present
//!     None,                   // new value, None for delete
//! )
//! .unwrap();
//! assert_eq!(map.get("a"), None);
//! assert_eq!(map.version(), 3);
//!
//! // the snapshot is unaffected by later mutations
//! assert_eq!(snapshot.version(), 2);
//! assert_eq!(snapshot.get("a"), Some(&"2".to_string()));
//! ```
#![deny(missing_docs)]
#![deny(future_incompatible)]
#![deny(nonstandard_style)]
#![deny(rust_2018_idioms)]

mod config;
mod map;
mod snapshot;
mod stats;

pub use {
    self::{
        config::Config,
        map::{CompareAndSwapError, CompareAndSwapResult, VersionedMap},
        snapshot::Snapshot,
        stats::Stats,
    },
    fnv::FnvBuildHasher,
};

use {
    self::stats::Counters,
    log::{debug, trace},
};
