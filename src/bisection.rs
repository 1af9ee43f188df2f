use crate::error::{ClusterError, Result};
use crate::id_allocator::{ClusterId, ClusterIdAllocator};
use crate::regions::GeometrySet;
use itertools::{Itertools, MinMaxResult};

/// Recursive spatial median bisection of one island's regions.
///
/// Splits along the axis with the larger centroid extent, at the median of
/// that coordinate, until every group fits the size bound. Each recursion
/// resolves its two halves independently, so dense areas subdivide further
/// while sparse ones terminate early.
#[derive(Debug)]
pub struct RecursiveBisector<'a> {
    set: &'a GeometrySet,
    max_cluster_size: usize,
}

impl<'a> RecursiveBisector<'a> {
    /// Fails with [`ClusterError::InvalidBound`] before any recursion when
    /// the size bound is zero.
    pub fn new(set: &'a GeometrySet, max_cluster_size: usize) -> Result<Self> {
        if max_cluster_size < 1 {
            return Err(ClusterError::InvalidBound {
                given: max_cluster_size,
            });
        }

        Ok(Self {
            set,
            max_cluster_size,
        })
    }

    /// Partition the given regions (indices into the geometry set, all known
    /// to lie on one island) into terminal groups of at most
    /// `max_cluster_size` regions each, allocating one fresh cluster id per
    /// terminal group.
    ///
    /// Groups are returned in split order, which is deterministic for a
    /// given input order and geometry.
    pub fn partition(
        &self,
        indices: Vec<usize>,
        ids: &ClusterIdAllocator,
    ) -> Vec<(ClusterId, Vec<usize>)> {
        let mut groups = Vec::new();
        self.split(indices, ids, &mut groups);
        groups
    }

    fn split(
        &self,
        indices: Vec<usize>,
        ids: &ClusterIdAllocator,
        out: &mut Vec<(ClusterId, Vec<usize>)>,
    ) {
        if indices.len() <= self.max_cluster_size {
            // Terminal group; intermediate partitions never get an id.
            if !indices.is_empty() {
                out.push((ids.next_id(), indices));
            }
            return;
        }

        let (below, rest) = self.split_in_half(indices);
        self.split(below, ids, out);
        self.split(rest, ids, out);
    }

    /// One bisection step: split along the longer axis at the median
    /// centroid coordinate. Regions strictly below the median form one
    /// group, everything at or above it the other, so the second group is
    /// never empty no matter how many centroids share the median value.
    fn split_in_half(&self, mut indices: Vec<usize>) -> (Vec<usize>, Vec<usize>) {
        let regions = self.set.regions();

        let range_x = coordinate_range(indices.iter().map(|&i| regions[i].centroid().x()));
        let range_y = coordinate_range(indices.iter().map(|&i| regions[i].centroid().y()));

        // Ties prefer X so the rule stays deterministic.
        let axis_value: fn(&crate::regions::Region) -> f64 = if range_x >= range_y {
            |region| region.centroid().x()
        } else {
            |region| region.centroid().y()
        };

        let split_at = median(indices.iter().map(|&i| axis_value(&regions[i])).collect());

        let (below, rest): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| axis_value(&regions[i]) < split_at);

        if below.is_empty() {
            // Every centroid sits on the median of the split axis (e.g. all
            // centroids identical). Halve in input order instead so the
            // recursion still makes progress.
            let rest = indices.split_off(indices.len() / 2);
            return (indices, rest);
        }

        (below, rest)
    }
}

fn coordinate_range(values: impl Iterator<Item = f64>) -> f64 {
    match values.minmax_by(f64::total_cmp) {
        MinMaxResult::MinMax(lo, hi) => hi - lo,
        _ => 0.0,
    }
}

/// Median of the sampled coordinate; an even count takes the mean of the two
/// middle values.
fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}
