//! Network topology module.
//!
//! This module contains the coordinate/direction model, the per-node
//! neighbor-graph generators for the three topology families, and the
//! assembly of per-node neighbor maps into one deduplicated global
//! edge set.

pub mod types;
pub mod neighbors;
pub mod links;

// Re-export key types and functions for easier access
pub use types::{Coordinate, Direction, NodeType, SpecialConfig, TopologyConfig, TopologyKind};
pub use neighbors::{neighbors, NeighborMap};
pub use links::{assemble, canonical_pair, Edge, EdgeCategory};
