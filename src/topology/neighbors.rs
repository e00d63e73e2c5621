//! Neighbor-graph generators.
//!
//! This file produces, for a single coordinate, the map from
//! outgoing Direction to neighbor coordinate under the active
//! topology family. The generators are pure: the same inputs always
//! yield the same map, and nothing outside the return value is
//! touched.

use std::collections::BTreeMap;

use crate::error::PlanError;
use crate::topology::types::{
    Coordinate, Direction, SpecialConfig, TopologyConfig, TopologyKind,
};

/// Neighbor map of one coordinate, ordered by Direction slot
pub type NeighborMap = BTreeMap<Direction, Coordinate>;

/// Neighbor map under the configured topology family
///
/// Grid and torus generation cannot fail; the special family can,
/// when declared bridge edges demand more than 4 slots at a node.
pub fn neighbors(coord: Coordinate, config: &TopologyConfig) -> Result<NeighborMap, PlanError> {
    match config.topology_type {
        TopologyKind::Grid => Ok(grid_neighbors(coord, config.size)),
        TopologyKind::Torus => Ok(torus_neighbors(coord, config.size)),
        TopologyKind::Special => {
            let special = config.special().ok_or_else(|| {
                PlanError::Configuration(
                    "special topology selected without a special config block".to_string(),
                )
            })?;
            special_neighbors(coord, config.size, special)
        }
    }
}

/// Bounded-grid neighbors: a neighbor exists in a direction iff the
/// unit step in that direction stays within `[0, size)`
pub fn grid_neighbors(coord: Coordinate, size: usize) -> NeighborMap {
    let mut map = NeighborMap::new();
    if coord.row > 0 {
        map.insert(Direction::North, Coordinate::new(coord.row - 1, coord.col));
    }
    if coord.row + 1 < size {
        map.insert(Direction::South, Coordinate::new(coord.row + 1, coord.col));
    }
    if coord.col > 0 {
        map.insert(Direction::West, Coordinate::new(coord.row, coord.col - 1));
    }
    if coord.col + 1 < size {
        map.insert(Direction::East, Coordinate::new(coord.row, coord.col + 1));
    }
    map
}

/// Torus neighbors: always exactly 4, indices wrap around
///
/// The backward step is computed as `(x + size - 1) % size` so the
/// arithmetic never sees a negative value, and the direction label
/// stays consistent across the wrap: the North neighbor of row 0 is
/// row `size - 1`, whose own South neighbor is row 0 again.
pub fn torus_neighbors(coord: Coordinate, size: usize) -> NeighborMap {
    let mut map = NeighborMap::new();
    map.insert(
        Direction::North,
        Coordinate::new((coord.row + size - 1) % size, coord.col),
    );
    map.insert(
        Direction::South,
        Coordinate::new((coord.row + 1) % size, coord.col),
    );
    map.insert(
        Direction::West,
        Coordinate::new(coord.row, (coord.col + size - 1) % size),
    );
    map.insert(
        Direction::East,
        Coordinate::new(coord.row, (coord.col + 1) % size),
    );
    map
}

/// Grid neighbors restricted to the coordinate's own sub-region
///
/// Any base edge whose endpoints fall in different
/// `area_size x area_size` sub-regions is removed; connectivity
/// between regions comes exclusively from declared bridge edges.
pub fn filtered_grid_neighbors(
    coord: Coordinate,
    size: usize,
    area_size: usize,
) -> NeighborMap {
    grid_neighbors(coord, size)
        .into_iter()
        .filter(|(_, peer)| peer.sub_region(area_size) == coord.sub_region(area_size))
        .collect()
}

/// Special-topology neighbors: filtered grid base plus declared
/// bridge edges
///
/// Declared edges touching this coordinate are attached to the first
/// unoccupied Direction slot in the fixed `{N, S, W, E}` order,
/// internal bridges before torus bridges, each list in declaration
/// order. A node that would need a fifth slot aborts generation; an
/// edge is never dropped or overwritten silently.
pub fn special_neighbors(
    coord: Coordinate,
    size: usize,
    special: &SpecialConfig,
) -> Result<NeighborMap, PlanError> {
    let mut map = if special.include_base_connections {
        filtered_grid_neighbors(coord, size, special.area_size)
    } else {
        NeighborMap::new()
    };

    for (a, b) in special.declared_edges() {
        let peer = if coord == *a {
            *b
        } else if coord == *b {
            *a
        } else {
            continue;
        };

        // The same declared pair may be listed in both categories;
        // only the first occurrence claims a slot.
        if map.values().any(|existing| *existing == peer) {
            continue;
        }

        let slot = Direction::ALL
            .iter()
            .copied()
            .find(|dir| !map.contains_key(dir));
        match slot {
            Some(dir) => {
                map.insert(dir, peer);
            }
            None => {
                return Err(PlanError::InvariantViolation(format!(
                    "node {} needs more than 4 neighbor directions \
                     (declared bridge to {} has no free slot)",
                    coord, peer
                )));
            }
        }
    }

    Ok(map)
}
