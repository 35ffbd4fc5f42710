/*!
 * Types and functions for working with clusters.
 *
 * A cluster is a spatially connected group of samples together with the region of the field it
 * represents. Samples that are not close enough to any other sample become single sample
 * clusters of their own.
 */

pub use cluster::{Cluster, ClusterKind, Clusterer};
pub use cluster_list::ClusterList;

#[allow(clippy::module_inception)]
mod cluster;
mod cluster_list;
mod dbscan;
