//! Interface and direction assignment.
//!
//! This file maps every accepted edge onto one physical interface
//! slot per endpoint. Slot occupancy is tracked in a registry owned
//! by the generation pass; a slot is never overwritten, and a node
//! that runs out of slots aborts the run instead of silently dropping
//! an edge.

use std::collections::{BTreeMap, HashMap};

use crate::error::PlanError;
use crate::topology::links::Edge;
use crate::topology::types::{Coordinate, Direction};

/// Occupied interface slots per router, local to one generation pass
///
/// The registry is the single authority on slot occupancy: every
/// binding goes through [`InterfaceRegistry::bind`], which refuses to
/// overwrite an existing binding.
#[derive(Debug, Default)]
pub struct InterfaceRegistry {
    occupied: HashMap<Coordinate, BTreeMap<Direction, Coordinate>>,
}

impl InterfaceRegistry {
    pub fn new() -> Self {
        InterfaceRegistry {
            occupied: HashMap::new(),
        }
    }

    /// Peer currently bound to a slot, if any
    pub fn peer(&self, coord: Coordinate, dir: Direction) -> Option<Coordinate> {
        self.occupied.get(&coord).and_then(|slots| slots.get(&dir)).copied()
    }

    pub fn is_free(&self, coord: Coordinate, dir: Direction) -> bool {
        self.peer(coord, dir).is_none()
    }

    /// Bind a slot to a peer; never overwrites
    pub fn bind(
        &mut self,
        coord: Coordinate,
        dir: Direction,
        peer: Coordinate,
    ) -> Result<(), PlanError> {
        let slots = self.occupied.entry(coord).or_default();
        if let Some(existing) = slots.get(&dir) {
            return Err(PlanError::InvariantViolation(format!(
                "interface {} of {} already bound to {} (attempted rebind to {})",
                dir.iface(),
                coord,
                existing,
                peer
            )));
        }
        slots.insert(dir, peer);
        Ok(())
    }

    /// All bindings of one router, ordered by Direction slot
    pub fn bindings(&self, coord: Coordinate) -> impl Iterator<Item = (Direction, Coordinate)> + '_ {
        self.occupied
            .get(&coord)
            .into_iter()
            .flat_map(|slots| slots.iter().map(|(d, p)| (*d, *p)))
    }
}

/// Direction slots chosen for one edge, following canonical endpoint
/// order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeAssignment {
    /// Slot at the canonical-lower endpoint
    pub dir_a: Direction,
    /// Slot at the canonical-higher endpoint; always `dir_a.opposite()`
    pub dir_b: Direction,
}

/// Delta-to-direction policy for declared bridge edges
///
/// Bridge edges have no unit or wrap relationship, so the direction
/// is read off the coordinate delta: the axis with the larger
/// magnitude wins and the sign picks the direction on it. A diagonal
/// tie resolves to the row axis.
pub fn direction_for_delta(from: Coordinate, to: Coordinate) -> Direction {
    let row_delta = to.row as i64 - from.row as i64;
    let col_delta = to.col as i64 - from.col as i64;

    if row_delta.abs() >= col_delta.abs() {
        if row_delta >= 0 {
            Direction::South
        } else {
            Direction::North
        }
    } else if col_delta >= 0 {
        Direction::East
    } else {
        Direction::West
    }
}

/// Assign interface slots for every edge, in edge emission order
///
/// Traversal-discovered edges use their recorded directions directly.
/// Declared bridge edges start from the delta policy and fall back to
/// the next Direction in fixed `{N, S, W, E}` order whose slot is
/// free at one endpoint and whose opposite is free at the other, so
/// the opposite-twin invariant holds for every binding this function
/// makes.
pub fn assign(
    edges: &[Edge],
    registry: &mut InterfaceRegistry,
) -> Result<Vec<EdgeAssignment>, PlanError> {
    let mut assignments = Vec::with_capacity(edges.len());

    for edge in edges {
        let assignment = match (edge.dir_a, edge.dir_b) {
            (Some(dir_a), Some(dir_b)) => {
                registry.bind(edge.a, dir_a, edge.b)?;
                registry.bind(edge.b, dir_b, edge.a)?;
                EdgeAssignment { dir_a, dir_b }
            }
            _ => assign_declared(edge, registry)?,
        };
        assignments.push(assignment);
    }

    Ok(assignments)
}

fn assign_declared(
    edge: &Edge,
    registry: &mut InterfaceRegistry,
) -> Result<EdgeAssignment, PlanError> {
    let preferred = direction_for_delta(edge.a, edge.b);
    let candidates = std::iter::once(preferred)
        .chain(Direction::ALL.iter().copied().filter(move |d| *d != preferred));

    for dir_a in candidates {
        let dir_b = dir_a.opposite();
        if registry.is_free(edge.a, dir_a) && registry.is_free(edge.b, dir_b) {
            registry.bind(edge.a, dir_a, edge.b)?;
            registry.bind(edge.b, dir_b, edge.a)?;
            return Ok(EdgeAssignment { dir_a, dir_b });
        }
    }

    Err(PlanError::InvariantViolation(format!(
        "no free interface slot pair for declared edge {}-{}",
        edge.a, edge.b
    )))
}
