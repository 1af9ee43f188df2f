use crate::regions::GeometrySet;
use geo::{ConvexHull, EuclideanDistance, Intersects};
use geo_types::Polygon;
use rayon::prelude::*;
use tracing::debug;

/// One maximal connected component of the union of all regions' convex
/// hulls, with the indices of the regions whose centroids fall inside it.
///
/// Islands are ephemeral: derived once per clustering run, never persisted.
#[derive(Debug, Clone)]
pub struct Island {
    pub outline: Polygon<f64>,
    pub region_indices: Vec<usize>,
}

/// Decompose the region set into disjoint islands.
///
/// Convex hulls stand in for the full outlines: they close small gaps and
/// holes, so two regions count as connected when their hulls touch or
/// overlap, including boundary-only contact. The union of all hulls is then
/// split into its connected components, one island each.
pub fn detect_islands(set: &GeometrySet) -> Vec<Island> {
    let hulls: Vec<Polygon<f64>> = set
        .regions()
        .par_iter()
        .map(|region| region.geometry().convex_hull())
        .collect();

    let union = geo::unary_union(hulls.iter());

    let mut islands: Vec<Island> = union
        .0
        .into_iter()
        .map(|outline| Island {
            outline,
            region_indices: Vec::new(),
        })
        .collect();

    // A region's centroid always lies inside its own convex hull, hence
    // inside the union, so the intersection test matches some island for
    // every region. Nearest-outline is the fallback for centroids that land
    // exactly on a component boundary after float rounding; first match wins
    // either way, keeping the mapping deterministic.
    let memberships: Vec<usize> = set
        .regions()
        .par_iter()
        .map(|region| {
            islands
                .iter()
                .position(|island| island.outline.intersects(&region.centroid()))
                .unwrap_or_else(|| nearest_island(&islands, region.centroid()))
        })
        .collect();

    for (region_index, island_index) in memberships.into_iter().enumerate() {
        islands[island_index].region_indices.push(region_index);
    }

    debug!(
        regions = set.len(),
        islands = islands.len(),
        "island detection complete"
    );

    islands
}

fn nearest_island(islands: &[Island], centroid: geo_types::Point<f64>) -> usize {
    islands
        .iter()
        .enumerate()
        .map(|(index, island)| (index, island.outline.euclidean_distance(&centroid)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
        .unwrap_or(0)
}
