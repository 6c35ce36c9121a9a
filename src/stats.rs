use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

use serde::{Deserialize, Serialize};

/// Operation counts for a `VersionedMap`, as returned by
/// `VersionedMap::stats`.
///
/// `writes` only counts mutations that were committed, so for a map
/// that tracked statistics since it was opened it equals the version.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct Stats {
    /// Number of point reads and snapshots served.
    pub reads: u64,
    /// Number of committed mutations.
    pub writes: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    enabled: bool,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl Counters {
    pub(crate) fn new(enabled: bool) -> Counters {
        Counters { enabled, ..Counters::default() }
    }

    pub(crate) fn read(&self) {
        if self.enabled {
            self.reads.fetch_add(1, Relaxed);
        }
    }

    pub(crate) fn wrote(&self) {
        if self.enabled {
            self.writes.fetch_add(1, Relaxed);
        }
    }

    pub(crate) fn load(&self) -> Stats {
        Stats { reads: self.reads.load(Relaxed), writes: self.writes.load(Relaxed) }
    }
}

#[test]
fn disabled_counters_stay_at_zero() {
    let counters = Counters::new(false);
    counters.read();
    counters.wrote();
    assert_eq!(counters.load(), Stats::default());

    let counters = Counters::new(true);
    counters.read();
    counters.read();
    counters.wrote();
    assert_eq!(counters.load(), Stats { reads: 2, writes: 1 });
}
