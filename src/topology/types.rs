//! Topology type definitions.
//!
//! This file contains the value types shared by the neighbor
//! generators, link assembly and interface assignment: coordinates,
//! cardinal directions with their fixed interface-name bijection,
//! node classification, and the topology configuration itself.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::PlanError;

/// Grid position of one router, `0 <= row, col < size`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub row: usize,
    pub col: usize,
}

impl Coordinate {
    pub fn new(row: usize, col: usize) -> Self {
        Coordinate { row, col }
    }

    /// Flatten to a linear node id in row-major order
    pub fn node_id(&self, size: usize) -> u64 {
        (self.row * size + self.col) as u64
    }

    /// Returns true if both indices are within `[0, size)`
    pub fn in_bounds(&self, size: usize) -> bool {
        self.row < size && self.col < size
    }

    /// Sub-region index for domain-divided topologies
    /// (`area_size x area_size` blocks, row-major)
    pub fn sub_region(&self, area_size: usize) -> (usize, usize) {
        (self.row / area_size, self.col / area_size)
    }

    /// Router hostname derived from the position, e.g. `router_03_11`
    pub fn router_name(&self) -> String {
        format!("router_{:02}_{:02}", self.row, self.col)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Cardinal link orientation, each bound to one fixed interface name
///
/// The declaration order is also the fixed fallback order used when a
/// preferred interface slot is already occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    /// All directions in the fixed slot-assignment order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// The opposite direction; `d.opposite().opposite() == d`
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    /// Fixed bijection to physical interface names
    pub fn iface(&self) -> &'static str {
        match self {
            Direction::North => "eth1",
            Direction::South => "eth2",
            Direction::West => "eth3",
            Direction::East => "eth4",
        }
    }

    /// Inverse of [`Direction::iface`]
    pub fn from_iface(name: &str) -> Option<Direction> {
        match name {
            "eth1" => Some(Direction::North),
            "eth2" => Some(Direction::South),
            "eth3" => Some(Direction::West),
            "eth4" => Some(Direction::East),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        };
        write!(f, "{}", name)
    }
}

/// Node classification
///
/// Gateway is the only type that may carry declared bridge edges
/// beyond the base topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    Corner,
    Edge,
    Internal,
    Gateway,
    Source,
    Destination,
}

impl NodeType {
    /// Classify a coordinate within the fabric
    ///
    /// Source, Destination and Gateway declarations from the special
    /// configuration take precedence over the positional classes.
    pub fn classify(coord: Coordinate, size: usize, special: Option<&SpecialConfig>) -> NodeType {
        if let Some(cfg) = special {
            if coord == cfg.source_node {
                return NodeType::Source;
            }
            if coord == cfg.dest_node {
                return NodeType::Destination;
            }
            if cfg.gateway_nodes.contains(&coord) {
                return NodeType::Gateway;
            }
        }

        let row_boundary = coord.row == 0 || coord.row == size - 1;
        let col_boundary = coord.col == 0 || coord.col == size - 1;
        match (row_boundary, col_boundary) {
            (true, true) => NodeType::Corner,
            (true, false) | (false, true) => NodeType::Edge,
            (false, false) => NodeType::Internal,
        }
    }
}

/// Topology family to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopologyKind {
    /// Bounded grid: boundary nodes lose the out-of-range directions
    Grid,
    /// Torus: every node has exactly 4 neighbors, indices wrap
    Torus,
    /// Domain-divided grid with declared bridge edges between regions
    Special,
}

impl TopologyKind {
    pub fn is_special(&self) -> bool {
        matches!(self, TopologyKind::Special)
    }
}

/// An undirected declared edge between two coordinates
pub type BridgeEdge = (Coordinate, Coordinate);

/// Configuration block for the Special topology family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialConfig {
    pub source_node: Coordinate,
    pub dest_node: Coordinate,
    #[serde(default)]
    pub gateway_nodes: BTreeSet<Coordinate>,
    /// Declared edges between nodes of different sub-regions
    #[serde(default)]
    pub internal_bridge_edges: Vec<BridgeEdge>,
    /// Declared edges that emulate a torus-style wrap between regions
    #[serde(default)]
    pub torus_bridge_edges: Vec<BridgeEdge>,
    /// Whether the filtered-grid base edges are generated at all
    #[serde(default = "default_include_base")]
    pub include_base_connections: bool,
    /// Side length of one sub-region
    #[serde(default = "default_area_size")]
    pub area_size: usize,
}

fn default_include_base() -> bool {
    true
}

fn default_area_size() -> usize {
    3
}

impl SpecialConfig {
    /// All declared bridge edges in category priority order
    /// (internal bridges first, then torus bridges)
    pub fn declared_edges(&self) -> impl Iterator<Item = &BridgeEdge> {
        self.internal_bridge_edges
            .iter()
            .chain(self.torus_bridge_edges.iter())
    }
}

/// Complete description of one fabric to plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Side length of the fabric; the fabric has `size * size` routers
    pub size: usize,
    pub topology_type: TopologyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special: Option<SpecialConfig>,
}

impl TopologyConfig {
    /// Validate the configuration before any generation work starts
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.size < 2 || self.size > 100 {
            return Err(PlanError::Configuration(format!(
                "size must be in 2..=100, got {}",
                self.size
            )));
        }
        if self.topology_type == TopologyKind::Torus && self.size < 3 {
            // A 2x2 torus folds every wrap edge onto its grid twin,
            // which breaks the 2N^2 unique-link expectation.
            return Err(PlanError::Configuration(
                "torus topology requires size >= 3".to_string(),
            ));
        }

        match (&self.topology_type, &self.special) {
            (TopologyKind::Special, None) => {
                return Err(PlanError::Configuration(
                    "special topology selected without a special config block".to_string(),
                ));
            }
            (TopologyKind::Special, Some(cfg)) => self.validate_special(cfg)?,
            _ => {}
        }

        Ok(())
    }

    fn validate_special(&self, cfg: &SpecialConfig) -> Result<(), PlanError> {
        if cfg.area_size == 0 || cfg.area_size > self.size {
            return Err(PlanError::Configuration(format!(
                "area_size {} must be in 1..=size ({})",
                cfg.area_size, self.size
            )));
        }

        for coord in [cfg.source_node, cfg.dest_node]
            .iter()
            .chain(cfg.gateway_nodes.iter())
        {
            if !coord.in_bounds(self.size) {
                return Err(PlanError::Configuration(format!(
                    "coordinate {} is outside the {size}x{size} fabric",
                    coord,
                    size = self.size
                )));
            }
        }

        for (a, b) in cfg.declared_edges() {
            if !a.in_bounds(self.size) || !b.in_bounds(self.size) {
                return Err(PlanError::Configuration(format!(
                    "bridge edge {}-{} has an endpoint outside the {size}x{size} fabric",
                    a,
                    b,
                    size = self.size
                )));
            }
            if a == b {
                return Err(PlanError::Configuration(format!(
                    "bridge edge {}-{} is a self-loop",
                    a, b
                )));
            }
        }

        Ok(())
    }

    pub fn special(&self) -> Option<&SpecialConfig> {
        self.special.as_ref()
    }
}
