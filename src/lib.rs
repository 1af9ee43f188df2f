//! Spatial clustering of geographic regions into compact, bounded-size
//! groups. Disjoint landmasses ("islands") are detected via the union of the
//! regions' convex hulls and never merged; within an island, space is
//! recursively bisected at the median until every group fits the size bound.

#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::cmp_null,
    clippy::op_ref
)]

pub mod bisection;
pub mod clustering;
pub mod error;
pub mod id_allocator;
pub mod islands;
pub mod regions;

pub use clustering::{ClusterAssignment, ClusterOptions, cluster, cluster_set};
pub use error::ClusterError;
pub use id_allocator::{ClusterId, ClusterIdAllocator};
pub use regions::{GeometrySet, Region};
