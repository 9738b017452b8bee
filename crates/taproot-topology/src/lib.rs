//! Taproot Topology
//!
//! Neighbor topology for a fixed set of spanning-tree participants.
//!
//! The input format is an ASCII edge list, one directed arc per line,
//! sorted by source id. Undirected graphs supply every edge in both
//! directions. The [`EdgeList`] keeps the arcs in the grouped
//! sources/degrees/destinations form the construction collective consumes,
//! and [`DistGraph`] materializes the per-participant in- and out-neighbor
//! sets every agent queries.
//!
//! The [`erdos_renyi`] generator produces random undirected inputs in
//! exactly this format, for testing.

mod dist_graph;
mod edge_list;
mod gen;

pub mod error;

pub use dist_graph::DistGraph;
pub use edge_list::EdgeList;
pub use error::{Error, Result};
pub use gen::{erdos_renyi, to_edge_lines, to_edge_list};
