//! Plan validation.
//!
//! This file checks the global invariants of a finished plan before
//! it is exposed to consumers: the link count matches the closed-form
//! expectation of the topology family, no interface is bound twice or
//! to two different peers, every declared bridge edge made it into
//! the plan exactly once, and no two links share a subnet.

use std::collections::{HashMap, HashSet};

use crate::error::PlanError;
use crate::plan::FabricPlan;
use crate::topology::links::canonical_pair;
use crate::topology::neighbors::filtered_grid_neighbors;
use crate::topology::types::{Coordinate, Direction, TopologyConfig, TopologyKind};

/// Validate a finished plan against its configuration
pub fn validate(plan: &FabricPlan, config: &TopologyConfig) -> Result<(), PlanError> {
    check_link_count(plan, config)?;
    check_interface_bindings(plan)?;
    check_neighbor_coherence(plan)?;
    check_declared_edges(plan, config)?;
    check_network_uniqueness(plan)?;
    Ok(())
}

/// Closed-form link-count expectation per topology family
fn check_link_count(plan: &FabricPlan, config: &TopologyConfig) -> Result<(), PlanError> {
    let n = config.size;
    let expected = match config.topology_type {
        TopologyKind::Grid => 2 * n * (n - 1),
        TopologyKind::Torus => 2 * n * n,
        TopologyKind::Special => expected_special_count(config)?,
    };

    let actual = plan.links.len();
    if actual != expected {
        return Err(PlanError::InvariantViolation(format!(
            "{:?} fabric of size {} must have {} links, plan has {}",
            config.topology_type, n, expected, actual
        )));
    }
    Ok(())
}

/// Expected link count for the special family: filtered base edges
/// plus distinct declared edges, recomputed independently of the
/// assembly pass
fn expected_special_count(config: &TopologyConfig) -> Result<usize, PlanError> {
    let special = config.special().ok_or_else(|| {
        PlanError::Configuration(
            "special topology selected without a special config block".to_string(),
        )
    })?;

    let mut pairs: HashSet<(Coordinate, Coordinate)> = HashSet::new();
    if special.include_base_connections {
        for row in 0..config.size {
            for col in 0..config.size {
                let here = Coordinate::new(row, col);
                for peer in filtered_grid_neighbors(here, config.size, special.area_size).values() {
                    pairs.insert(canonical_pair(here, *peer));
                }
            }
        }
    }
    for (a, b) in special.declared_edges() {
        pairs.insert(canonical_pair(*a, *b));
    }

    Ok(pairs.len())
}

/// No router may bind one interface twice, bind more than 4, or
/// disagree with its peer about the link's direction pair
fn check_interface_bindings(plan: &FabricPlan) -> Result<(), PlanError> {
    for router in &plan.routers {
        if router.interfaces.len() > 4 {
            return Err(PlanError::InvariantViolation(format!(
                "router {} has {} interfaces, at most 4 are possible",
                router.name,
                router.interfaces.len()
            )));
        }
        for name in router.interfaces.keys() {
            if Direction::from_iface(name).is_none() {
                return Err(PlanError::InvariantViolation(format!(
                    "router {} has unknown interface name {}",
                    router.name, name
                )));
            }
        }
    }

    // One peer per (router, interface) across the whole plan.
    let mut bound: HashMap<(Coordinate, &str), Coordinate> = HashMap::new();
    for link in &plan.links {
        for (local, iface, peer) in [
            (link.a, link.iface_a.as_str(), link.b),
            (link.b, link.iface_b.as_str(), link.a),
        ] {
            if let Some(previous) = bound.insert((local, iface), peer) {
                return Err(PlanError::InvariantViolation(format!(
                    "interface {} of {} carries both {} and {}",
                    iface, local, previous, peer
                )));
            }
        }

        // The two endpoints must sit on opposite-direction twins.
        let dir_a = Direction::from_iface(&link.iface_a);
        let dir_b = Direction::from_iface(&link.iface_b);
        match (dir_a, dir_b) {
            (Some(da), Some(db)) if da.opposite() == db => {}
            _ => {
                return Err(PlanError::InvariantViolation(format!(
                    "link {}-{} uses non-opposite interfaces {}/{}",
                    link.a, link.b, link.iface_a, link.iface_b
                )));
            }
        }

        // The interface maps must carry exactly the link's host
        // addresses.
        let router_a = plan.router(link.a).ok_or_else(|| {
            PlanError::InvariantViolation(format!("link endpoint {} has no router", link.a))
        })?;
        let router_b = plan.router(link.b).ok_or_else(|| {
            PlanError::InvariantViolation(format!("link endpoint {} has no router", link.b))
        })?;
        if router_a.interfaces.get(&link.iface_a) != Some(&link.address.addr1)
            || router_b.interfaces.get(&link.iface_b) != Some(&link.address.addr2)
        {
            return Err(PlanError::InvariantViolation(format!(
                "interface map of {} or {} disagrees with link addressing",
                router_a.name, router_b.name
            )));
        }
    }

    Ok(())
}

/// The neighbor map of every router must agree with its interface
/// bindings: the entry at direction `d` is exactly the peer reached
/// through `d.iface()` on some planned link
fn check_neighbor_coherence(plan: &FabricPlan) -> Result<(), PlanError> {
    for router in &plan.routers {
        if router.neighbors.len() != router.interfaces.len() {
            return Err(PlanError::InvariantViolation(format!(
                "router {} has {} neighbors but {} interfaces",
                router.name,
                router.neighbors.len(),
                router.interfaces.len()
            )));
        }
        for dir in router.neighbors.keys() {
            if !router.interfaces.contains_key(dir.iface()) {
                return Err(PlanError::InvariantViolation(format!(
                    "router {} lists a {} neighbor but has no {} interface",
                    router.name,
                    dir,
                    dir.iface()
                )));
            }
        }
    }

    for link in &plan.links {
        for (local, iface, peer) in [
            (link.a, link.iface_a.as_str(), link.b),
            (link.b, link.iface_b.as_str(), link.a),
        ] {
            let router = plan.router(local).ok_or_else(|| {
                PlanError::InvariantViolation(format!("link endpoint {} has no router", local))
            })?;
            let dir = Direction::from_iface(iface).ok_or_else(|| {
                PlanError::InvariantViolation(format!(
                    "link {}-{} uses unknown interface name {}",
                    link.a, link.b, iface
                ))
            })?;
            if router.neighbors.get(&dir) != Some(&peer) {
                return Err(PlanError::InvariantViolation(format!(
                    "router {} reaches {} through {} but its neighbor map says {:?}",
                    router.name,
                    peer,
                    iface,
                    router.neighbors.get(&dir)
                )));
            }
        }
    }

    Ok(())
}

/// Every declared bridge edge must appear in the plan exactly once
fn check_declared_edges(plan: &FabricPlan, config: &TopologyConfig) -> Result<(), PlanError> {
    let special = match config.special() {
        Some(special) if config.topology_type.is_special() => special,
        _ => return Ok(()),
    };

    for (a, b) in special.declared_edges() {
        let pair = canonical_pair(*a, *b);
        let occurrences = plan
            .links
            .iter()
            .filter(|link| canonical_pair(link.a, link.b) == pair)
            .count();
        if occurrences != 1 {
            return Err(PlanError::InvariantViolation(format!(
                "declared bridge edge {}-{} appears {} times in the plan",
                a, b, occurrences
            )));
        }
    }

    Ok(())
}

/// The emitted link subnets must be injective in the edge
fn check_network_uniqueness(plan: &FabricPlan) -> Result<(), PlanError> {
    let mut networks = HashSet::new();
    for link in &plan.links {
        if !networks.insert(link.address.network) {
            return Err(PlanError::InvariantViolation(format!(
                "links {}-{} share subnet {} with another link",
                link.a, link.b, link.address.network
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn torus(size: usize) -> TopologyConfig {
        TopologyConfig {
            size,
            topology_type: TopologyKind::Torus,
            special: None,
        }
    }

    #[test]
    fn test_generated_plan_passes_validation() {
        let config = torus(4);
        let plan = FabricPlan::generate(&config).unwrap();
        validate(&plan, &config).unwrap();
    }

    #[test]
    fn test_swapped_neighbor_entries_are_rejected() {
        let config = torus(3);
        let mut plan = FabricPlan::generate(&config).unwrap();

        // Swap the peers behind two directions of one router. The
        // interface maps and links still agree with each other, only
        // the neighbor map now lies about who sits where.
        let neighbors = &mut plan.routers[0].neighbors;
        let north = neighbors[&Direction::North];
        let south = neighbors[&Direction::South];
        neighbors.insert(Direction::North, south);
        neighbors.insert(Direction::South, north);

        assert!(matches!(
            validate(&plan, &config),
            Err(PlanError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_dropped_neighbor_entry_is_rejected() {
        let config = torus(3);
        let mut plan = FabricPlan::generate(&config).unwrap();
        plan.routers[0].neighbors.remove(&Direction::East);

        assert!(matches!(
            validate(&plan, &config),
            Err(PlanError::InvariantViolation(_))
        ));
    }
}
