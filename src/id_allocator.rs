// ===========================================================================
// Cluster ID allocator, scoped to exactly one clustering run
// ===========================================================================
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Identifier of one terminal cluster, unique within a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterId(pub u32);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Thread-safe allocator that dispenses cluster ids on demand.
///
/// Ids are dense: strictly increasing from 0 with no gaps and no reuse for
/// the lifetime of the allocator. Construct a fresh allocator per run; the
/// counter never resets in place.
#[derive(Debug, Default)]
pub struct ClusterIdAllocator {
    next_id: AtomicU32,
}

impl ClusterIdAllocator {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(0),
        }
    }

    /// Allocate the next cluster id.
    pub fn next_id(&self) -> ClusterId {
        ClusterId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u32 {
        self.next_id.load(Ordering::Relaxed)
    }
}
