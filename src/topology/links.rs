//! Link assembly and deduplication.
//!
//! This file turns the per-node neighbor maps into one global set of
//! undirected edges. Edges are canonicalized as the sorted pair of
//! their endpoints and deduplicated through a seen-set owned by the
//! assembly pass, so the resulting edge set is independent of the
//! discovery order.

use std::collections::HashSet;

use crate::error::PlanError;
use crate::topology::neighbors;
use crate::topology::types::{Coordinate, Direction, TopologyConfig, TopologyKind};

/// Where an edge came from
///
/// For the special family the categories are processed in this fixed
/// priority order; a later category never replaces an edge an earlier
/// one already emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeCategory {
    /// Grid/torus edge, or a filtered-grid base edge of the special family
    Base,
    /// Declared bridge between two sub-regions
    InternalBridge,
    /// Declared torus-style wrap bridge
    TorusBridge,
}

/// One undirected edge of the fabric
///
/// Endpoints are stored in canonical (sorted) order. Edges discovered
/// through the neighbor-graph traversal carry the Direction recorded
/// at each endpoint; declared bridge edges carry none and get their
/// directions from the delta policy during interface assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub a: Coordinate,
    pub b: Coordinate,
    /// Direction from `a` toward `b`, if recorded during traversal
    pub dir_a: Option<Direction>,
    /// Direction from `b` toward `a`, if recorded during traversal
    pub dir_b: Option<Direction>,
    pub category: EdgeCategory,
}

impl Edge {
    /// Canonical endpoint pair used for deduplication
    pub fn canonical(&self) -> (Coordinate, Coordinate) {
        (self.a, self.b)
    }
}

/// Sort an endpoint pair into canonical order
pub fn canonical_pair(x: Coordinate, y: Coordinate) -> (Coordinate, Coordinate) {
    if x <= y {
        (x, y)
    } else {
        (y, x)
    }
}

/// Assemble the global edge set for the configured topology
///
/// Coordinates are visited in row-major order and each edge is
/// emitted exactly once, on first sight. For the special family the
/// base filtered-grid edges are emitted first, then the declared
/// internal bridges, then the declared torus bridges; a declared pair
/// whose canonical form was already emitted is silently skipped.
pub fn assemble(config: &TopologyConfig) -> Result<Vec<Edge>, PlanError> {
    let mut edges = Vec::new();
    let mut seen: HashSet<(Coordinate, Coordinate)> = HashSet::new();

    match config.topology_type {
        TopologyKind::Grid | TopologyKind::Torus => {
            traverse_base(config, &mut edges, &mut seen)?;
        }
        TopologyKind::Special => {
            let special = config.special().ok_or_else(|| {
                PlanError::Configuration(
                    "special topology selected without a special config block".to_string(),
                )
            })?;

            if special.include_base_connections {
                traverse_filtered_base(config, &mut edges, &mut seen);
            }

            for (x, y) in &special.internal_bridge_edges {
                push_declared(*x, *y, EdgeCategory::InternalBridge, &mut edges, &mut seen);
            }
            for (x, y) in &special.torus_bridge_edges {
                push_declared(*x, *y, EdgeCategory::TorusBridge, &mut edges, &mut seen);
            }
        }
    }

    Ok(edges)
}

/// Number of assembled edges in each category
pub fn category_counts(edges: &[Edge]) -> (usize, usize, usize) {
    let base = edges
        .iter()
        .filter(|e| e.category == EdgeCategory::Base)
        .count();
    let internal = edges
        .iter()
        .filter(|e| e.category == EdgeCategory::InternalBridge)
        .count();
    let torus = edges
        .iter()
        .filter(|e| e.category == EdgeCategory::TorusBridge)
        .count();
    (base, internal, torus)
}

fn traverse_base(
    config: &TopologyConfig,
    edges: &mut Vec<Edge>,
    seen: &mut HashSet<(Coordinate, Coordinate)>,
) -> Result<(), PlanError> {
    for row in 0..config.size {
        for col in 0..config.size {
            let here = Coordinate::new(row, col);
            for (dir, peer) in neighbors::neighbors(here, config)? {
                push_traversed(here, dir, peer, edges, seen);
            }
        }
    }
    Ok(())
}

fn traverse_filtered_base(
    config: &TopologyConfig,
    edges: &mut Vec<Edge>,
    seen: &mut HashSet<(Coordinate, Coordinate)>,
) {
    // Base edges only; declared bridges are appended by category
    // afterwards so the priority order stays explicit.
    let area_size = config
        .special()
        .map(|s| s.area_size)
        .unwrap_or(config.size);
    for row in 0..config.size {
        for col in 0..config.size {
            let here = Coordinate::new(row, col);
            for (dir, peer) in neighbors::filtered_grid_neighbors(here, config.size, area_size) {
                push_traversed(here, dir, peer, edges, seen);
            }
        }
    }
}

fn push_traversed(
    here: Coordinate,
    dir: Direction,
    peer: Coordinate,
    edges: &mut Vec<Edge>,
    seen: &mut HashSet<(Coordinate, Coordinate)>,
) {
    let pair = canonical_pair(here, peer);
    if !seen.insert(pair) {
        return;
    }
    let (a, b) = pair;
    let (dir_a, dir_b) = if a == here {
        (dir, dir.opposite())
    } else {
        (dir.opposite(), dir)
    };
    edges.push(Edge {
        a,
        b,
        dir_a: Some(dir_a),
        dir_b: Some(dir_b),
        category: EdgeCategory::Base,
    });
}

fn push_declared(
    x: Coordinate,
    y: Coordinate,
    category: EdgeCategory,
    edges: &mut Vec<Edge>,
    seen: &mut HashSet<(Coordinate, Coordinate)>,
) {
    let pair = canonical_pair(x, y);
    if !seen.insert(pair) {
        return;
    }
    let (a, b) = pair;
    edges.push(Edge {
        a,
        b,
        dir_a: None,
        dir_b: None,
        category,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::types::{SpecialConfig, TopologyKind};
    use std::collections::BTreeSet;

    fn coord(row: usize, col: usize) -> Coordinate {
        Coordinate::new(row, col)
    }

    fn config(size: usize, kind: TopologyKind) -> TopologyConfig {
        TopologyConfig {
            size,
            topology_type: kind,
            special: None,
        }
    }

    #[test]
    fn test_grid_link_count() {
        // 2N(N-1) unique links for a bounded N x N grid
        for size in [2, 3, 4, 7] {
            let edges = assemble(&config(size, TopologyKind::Grid)).unwrap();
            assert_eq!(edges.len(), 2 * size * (size - 1), "grid size {}", size);
        }
    }

    #[test]
    fn test_torus_link_count() {
        // 2N^2 unique links for an N x N torus
        for size in [3, 4, 5, 8] {
            let edges = assemble(&config(size, TopologyKind::Torus)).unwrap();
            assert_eq!(edges.len(), 2 * size * size, "torus size {}", size);
        }
    }

    #[test]
    fn test_edges_are_canonical_and_unique() {
        let edges = assemble(&config(5, TopologyKind::Torus)).unwrap();
        let mut pairs = HashSet::new();
        for edge in &edges {
            assert!(edge.a <= edge.b, "endpoints not in canonical order");
            assert!(pairs.insert(edge.canonical()), "duplicate edge emitted");
        }
    }

    #[test]
    fn test_traversed_directions_are_opposite_twins() {
        let edges = assemble(&config(4, TopologyKind::Torus)).unwrap();
        for edge in &edges {
            let dir_a = edge.dir_a.expect("traversed edge without direction");
            let dir_b = edge.dir_b.expect("traversed edge without direction");
            assert_eq!(dir_a.opposite(), dir_b);
        }
    }

    fn special_6x6() -> TopologyConfig {
        TopologyConfig {
            size: 6,
            topology_type: TopologyKind::Special,
            special: Some(SpecialConfig {
                source_node: coord(0, 0),
                dest_node: coord(5, 5),
                gateway_nodes: BTreeSet::new(),
                internal_bridge_edges: vec![
                    (coord(1, 2), coord(1, 3)),
                    (coord(4, 2), coord(4, 3)),
                    (coord(2, 1), coord(3, 1)),
                    (coord(2, 4), coord(3, 4)),
                ],
                torus_bridge_edges: vec![
                    (coord(1, 0), coord(1, 5)),
                    (coord(4, 0), coord(4, 5)),
                    (coord(0, 1), coord(5, 1)),
                    (coord(0, 4), coord(5, 4)),
                ],
                include_base_connections: true,
                area_size: 3,
            }),
        }
    }

    #[test]
    fn test_special_6x6_link_counts() {
        // Four 3x3 sub-regions contribute 12 intra-region links each,
        // plus 4 internal and 4 torus bridges: 48 + 4 + 4 = 56.
        let edges = assemble(&special_6x6()).unwrap();
        assert_eq!(edges.len(), 56);

        let (base, internal, torus) = category_counts(&edges);
        assert_eq!(base, 48);
        assert_eq!(internal, 4);
        assert_eq!(torus, 4);
    }

    #[test]
    fn test_special_declared_edges_present_verbatim() {
        let edges = assemble(&special_6x6()).unwrap();
        let pair = canonical_pair(coord(1, 2), coord(1, 3));
        let matching: Vec<_> = edges.iter().filter(|e| e.canonical() == pair).collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].category, EdgeCategory::InternalBridge);
    }

    #[test]
    fn test_special_duplicate_declaration_emitted_once() {
        let mut config = special_6x6();
        let special = config.special.as_mut().unwrap();
        // Redeclare an internal bridge as a torus bridge; the internal
        // category has priority and the torus copy is skipped.
        special.torus_bridge_edges.push((coord(1, 3), coord(1, 2)));
        let edges = assemble(&config).unwrap();
        assert_eq!(edges.len(), 56);
        let pair = canonical_pair(coord(1, 2), coord(1, 3));
        let matching: Vec<_> = edges.iter().filter(|e| e.canonical() == pair).collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].category, EdgeCategory::InternalBridge);
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let first = assemble(&special_6x6()).unwrap();
        let second = assemble(&special_6x6()).unwrap();
        assert_eq!(first, second);
    }
}
