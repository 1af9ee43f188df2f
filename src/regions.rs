use crate::error::{ClusterError, Result};
use ahash::AHashSet;
use geo::{Centroid, CoordsIter, Validation};
use geo_types::{MultiPolygon, Point};

/// One input region: an externally supplied identifier, a display label,
/// and a planar polygon/multipolygon geometry with its derived centroid.
///
/// Coordinates are assumed already projected to a common Euclidean
/// reference; reprojection is the caller's job.
///
/// Fields are private so a region cannot drift from its validated state:
/// geometry and centroid are fixed at construction.
#[derive(Debug, Clone)]
pub struct Region {
    id: String,
    label: String,
    geometry: MultiPolygon<f64>,
    centroid: Point<f64>,
}

impl Region {
    /// Validates the geometry and derives the centroid.
    ///
    /// Fails with [`ClusterError::InvalidGeometry`] on empty geometry,
    /// non-finite coordinates, or geometry that is invalid beyond repair.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        geometry: MultiPolygon<f64>,
    ) -> Result<Self> {
        let id = id.into();

        if geometry.0.is_empty()
            || geometry
                .coords_iter()
                .any(|c| !c.x.is_finite() || !c.y.is_finite())
            || !geometry.is_valid()
        {
            return Err(ClusterError::InvalidGeometry { region_id: id });
        }

        let centroid = geometry
            .centroid()
            .ok_or_else(|| ClusterError::InvalidGeometry {
                region_id: id.clone(),
            })?;

        Ok(Self {
            id,
            label: label.into(),
            geometry,
            centroid,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    pub fn centroid(&self) -> Point<f64> {
        self.centroid
    }
}

/// The validated input collection for one clustering run.
///
/// Regions keep their load order; everything downstream addresses them by
/// index into this set.
#[derive(Debug, Clone, Default)]
pub struct GeometrySet {
    regions: Vec<Region>,
}

impl GeometrySet {
    /// Fails fast with [`ClusterError::DuplicateIdentifier`] when two
    /// regions share an id. Geometry was already validated per region by
    /// [`Region::new`].
    pub fn new(regions: Vec<Region>) -> Result<Self> {
        let mut seen = AHashSet::with_capacity(regions.len());
        for region in &regions {
            if !seen.insert(region.id.as_str()) {
                return Err(ClusterError::DuplicateIdentifier {
                    region_id: region.id.clone(),
                });
            }
        }

        Ok(Self { regions })
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
