//! Spatial interaction engine: box scanners, clustering, interaction queries and edge joining.

mod box_scanner;
mod clusterer;
mod interact;
mod join_edges;

pub use box_scanner::{BoxScanner, BoxScanner2, collect_pairs};
pub use clusterer::{BoxClusterer, ClusterReceiver};
pub use interact::*;
pub use join_edges::{EdgeChain, JoinEdgesCluster, edge_chains, extended_edge, extended_edges};
