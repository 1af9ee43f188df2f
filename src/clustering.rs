use crate::bisection::RecursiveBisector;
use crate::error::{ClusterError, Result};
use crate::id_allocator::{ClusterId, ClusterIdAllocator};
use crate::islands::detect_islands;
use crate::regions::{GeometrySet, Region};
use ahash::AHashMap;
use serde::Serialize;
use tracing::{debug, info};

/// Sets at or below this size are served as one trivial cluster; they do
/// not benefit from partitioning overhead.
pub const SMALL_SET_LIMIT: usize = 25;

/// Aim for roughly this many clusters when the size bound is derived.
const TARGET_CLUSTER_COUNT: usize = 10;

/// Bounds on the derived per-cluster region count.
const MIN_CLUSTER_SIZE: usize = 5;
const MAX_CLUSTER_SIZE: usize = 25;

/// Caller-facing knobs for one clustering run.
#[derive(Debug, Clone, Default)]
pub struct ClusterOptions {
    /// Overrides the derived size bound and forces clustering on, even for
    /// sets small enough for the trivial single cluster.
    pub max_cluster_size: Option<usize>,
    /// Skip clustering entirely; every region lands in cluster 0.
    pub disable: bool,
}

/// The final region → cluster mapping of one run: every input region appears
/// exactly once, cluster ids form a contiguous range starting at 0.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterAssignment {
    by_region: AHashMap<String, ClusterId>,
    cluster_count: usize,
}

impl ClusterAssignment {
    pub fn get(&self, region_id: &str) -> Option<ClusterId> {
        self.by_region.get(region_id).copied()
    }

    /// Number of assigned regions.
    pub fn len(&self) -> usize {
        self.by_region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_region.is_empty()
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ClusterId)> {
        self.by_region.iter().map(|(id, &cluster)| (id.as_str(), cluster))
    }
}

/// Derive the size bound from the region count: aim for about
/// `TARGET_CLUSTER_COUNT` clusters, but never fewer than `MIN_CLUSTER_SIZE`
/// nor more than `MAX_CLUSTER_SIZE` regions per cluster.
pub fn derived_cluster_size(region_count: usize) -> usize {
    (region_count / TARGET_CLUSTER_COUNT).clamp(MIN_CLUSTER_SIZE, MAX_CLUSTER_SIZE)
}

/// The single entry point of the clustering core.
///
/// Validates the input (unique ids, non-empty planar geometries), detects
/// islands, bisects each island independently and merges the per-region
/// assignments. See [`cluster_set`] for use with an already validated set.
pub fn cluster(regions: Vec<Region>, options: &ClusterOptions) -> Result<ClusterAssignment> {
    let set = GeometrySet::new(regions)?;
    cluster_set(&set, options)
}

/// Cluster an already validated [`GeometrySet`].
pub fn cluster_set(set: &GeometrySet, options: &ClusterOptions) -> Result<ClusterAssignment> {
    // An explicit bound is validated before anything else runs, even when
    // clustering ends up disabled.
    if let Some(bound) = options.max_cluster_size {
        if bound < 1 {
            return Err(ClusterError::InvalidBound { given: bound });
        }
    }

    let skip_small = options.max_cluster_size.is_none() && set.len() <= SMALL_SET_LIMIT;
    if options.disable || skip_small {
        debug!(
            regions = set.len(),
            "clustering skipped, assigning one trivial cluster"
        );
        let by_region = set
            .regions()
            .iter()
            .map(|region| (region.id().to_string(), ClusterId(0)))
            .collect();
        return Ok(ClusterAssignment {
            by_region,
            cluster_count: usize::from(!set.is_empty()),
        });
    }

    let bound = options
        .max_cluster_size
        .unwrap_or_else(|| derived_cluster_size(set.len()));
    let bisector = RecursiveBisector::new(set, bound)?;
    let allocator = ClusterIdAllocator::new();

    let islands = detect_islands(set);
    info!(
        regions = set.len(),
        islands = islands.len(),
        max_cluster_size = bound,
        "clustering"
    );

    // Islands are bisected in detection order so cluster ids come out
    // identical across runs on identical input.
    let mut by_region = AHashMap::with_capacity(set.len());
    for island in &islands {
        if island.region_indices.is_empty() {
            continue;
        }
        for (cluster_id, group) in bisector.partition(island.region_indices.clone(), &allocator) {
            for region_index in group {
                by_region.insert(set.regions()[region_index].id().to_string(), cluster_id);
            }
        }
    }

    let cluster_count = allocator.allocated() as usize;
    debug!(clusters = cluster_count, "clustering complete");

    Ok(ClusterAssignment {
        by_region,
        cluster_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use geo_types::MultiPolygon;

    fn square(id: &str, cx: f64, cy: f64) -> Region {
        let geometry = MultiPolygon(vec![polygon![
            (x: cx - 1.0, y: cy - 1.0),
            (x: cx + 1.0, y: cy - 1.0),
            (x: cx + 1.0, y: cy + 1.0),
            (x: cx - 1.0, y: cy + 1.0),
        ]]);
        Region::new(id, id, geometry).unwrap()
    }

    /// Two landmasses of 20 overlapping squares each, far apart.
    fn two_islands() -> Vec<Region> {
        let mut regions = Vec::new();
        for i in 0..20 {
            regions.push(square(&format!("a{i}"), i as f64, 0.0));
        }
        for i in 0..20 {
            regions.push(square(&format!("b{i}"), 1000.0 + i as f64, 0.0));
        }
        regions
    }

    #[test]
    fn every_region_is_assigned_exactly_once() {
        let regions = two_islands();
        let count = regions.len();
        let assignment = cluster(regions, &ClusterOptions::default()).unwrap();

        assert_eq!(assignment.len(), count);
        for i in 0..20 {
            assert!(assignment.get(&format!("a{i}")).is_some());
            assert!(assignment.get(&format!("b{i}")).is_some());
        }
    }

    #[test]
    fn clusters_respect_the_size_bound() {
        let assignment = cluster(two_islands(), &ClusterOptions::default()).unwrap();

        // 40 regions derive a bound of 5.
        let mut sizes: AHashMap<ClusterId, usize> = AHashMap::new();
        for (_, cluster_id) in assignment.iter() {
            *sizes.entry(cluster_id).or_default() += 1;
        }
        assert!(sizes.values().all(|&size| size <= 5));
        assert!(assignment.cluster_count() >= 8);
    }

    #[test]
    fn no_cluster_spans_two_islands() {
        let assignment = cluster(two_islands(), &ClusterOptions::default()).unwrap();

        let mut prefixes: AHashMap<ClusterId, ahash::AHashSet<u8>> = AHashMap::new();
        for (region_id, cluster_id) in assignment.iter() {
            prefixes
                .entry(cluster_id)
                .or_default()
                .insert(region_id.as_bytes()[0]);
        }
        assert!(prefixes.values().all(|landmasses| landmasses.len() == 1));
    }

    #[test]
    fn clustering_is_deterministic() {
        let first = cluster(two_islands(), &ClusterOptions::default()).unwrap();
        let second = cluster(two_islands(), &ClusterOptions::default()).unwrap();

        assert_eq!(first.cluster_count(), second.cluster_count());
        for (region_id, cluster_id) in first.iter() {
            assert_eq!(second.get(region_id), Some(cluster_id));
        }
    }

    #[test]
    fn cluster_ids_are_contiguous_from_zero() {
        let assignment = cluster(two_islands(), &ClusterOptions::default()).unwrap();

        let mut ids: Vec<u32> = assignment.iter().map(|(_, id)| id.0).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids, (0..assignment.cluster_count() as u32).collect::<Vec<_>>());
    }

    #[test]
    fn small_sets_pass_through_as_one_cluster() {
        let regions: Vec<Region> = (0..25).map(|i| square(&format!("r{i}"), i as f64, 0.0)).collect();
        let assignment = cluster(regions, &ClusterOptions::default()).unwrap();

        assert_eq!(assignment.cluster_count(), 1);
        assert!(assignment.iter().all(|(_, id)| id == ClusterId(0)));
    }

    #[test]
    fn disabling_clustering_passes_any_set_through() {
        let assignment = cluster(
            two_islands(),
            &ClusterOptions {
                max_cluster_size: None,
                disable: true,
            },
        )
        .unwrap();

        assert_eq!(assignment.cluster_count(), 1);
        assert!(assignment.iter().all(|(_, id)| id == ClusterId(0)));
    }

    #[test]
    fn explicit_bound_forces_clustering_on_small_sets() {
        // Three regions forming one compact island, forced active: all of
        // them still fit one cluster.
        let regions = vec![
            square("a", 0.0, 0.0),
            square("b", 1.0, 0.0),
            square("c", 0.5, 1.0),
        ];
        let assignment = cluster(
            regions,
            &ClusterOptions {
                max_cluster_size: Some(5),
                disable: false,
            },
        )
        .unwrap();

        assert_eq!(assignment.cluster_count(), 1);
        assert_eq!(assignment.get("a"), Some(ClusterId(0)));
        assert_eq!(assignment.get("b"), Some(ClusterId(0)));
        assert_eq!(assignment.get("c"), Some(ClusterId(0)));
    }

    #[test]
    fn derived_size_clamps_to_the_configured_range() {
        assert_eq!(derived_cluster_size(40), 5);
        assert_eq!(derived_cluster_size(100), 10);
        assert_eq!(derived_cluster_size(500), 25);
    }

    #[test]
    fn zero_bound_fails_before_anything_runs() {
        let err = cluster(
            two_islands(),
            &ClusterOptions {
                max_cluster_size: Some(0),
                disable: false,
            },
        )
        .unwrap_err();
        assert_eq!(err, ClusterError::InvalidBound { given: 0 });
    }

    #[test]
    fn duplicate_ids_fail_the_whole_run() {
        let regions = vec![square("x", 0.0, 0.0), square("x", 10.0, 0.0)];
        let err = cluster(regions, &ClusterOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ClusterError::DuplicateIdentifier {
                region_id: "x".into()
            }
        );
    }

    #[test]
    fn empty_input_yields_an_empty_assignment() {
        let assignment = cluster(Vec::new(), &ClusterOptions::default()).unwrap();
        assert!(assignment.is_empty());
        assert_eq!(assignment.cluster_count(), 0);
    }
}
