use thiserror::Error;

/// Errors produced by the clustering core.
///
/// Every variant indicates invalid input, not a transient fault: the run is
/// aborted and nothing is silently dropped or repaired.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    #[error("region {region_id} has null, empty, or irreparably invalid geometry")]
    InvalidGeometry { region_id: String },

    #[error("max_cluster_size must be at least 1, got {given}")]
    InvalidBound { given: usize },

    #[error("duplicate region identifier {region_id}")]
    DuplicateIdentifier { region_id: String },
}

pub type Result<T> = std::result::Result<T, ClusterError>;
