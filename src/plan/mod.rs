//! Fabric plan generation module.
//!
//! This module composes the neighbor generators, link assembly,
//! address allocator and interface assignment into one generation
//! pass, validates the global invariants, and exposes the finished,
//! immutable plan to consumers (config emitters, topology-file
//! writers).

pub mod interfaces;
pub mod validate;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv6Addr;

use crate::addressing;
use crate::addressing::LinkAddress;
use crate::error::PlanError;
use crate::topology::links::{self, EdgeCategory};
use crate::topology::neighbors::{self, NeighborMap};
use crate::topology::types::{Coordinate, NodeType, TopologyConfig};

pub use interfaces::{direction_for_delta, InterfaceRegistry};

/// Everything the plan knows about one router
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterInfo {
    /// Hostname, `router_{row:02}_{col:02}`
    pub name: String,
    pub coordinate: Coordinate,
    pub node_type: NodeType,
    /// Protocol router id, `10.{row}.{col}.1`
    pub router_id: String,
    pub loopback: Ipv6Addr,
    /// Interface name to host address, at most 4 entries
    pub interfaces: BTreeMap<String, Ipv6Addr>,
    /// Direction to peer coordinate, mirroring the bound interfaces:
    /// the entry at direction `d` is the peer reached through
    /// `d.iface()`
    pub neighbors: NeighborMap,
}

/// One fully-planned link: endpoints, interface slots and addressing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedLink {
    /// Canonical-lower endpoint
    pub a: Coordinate,
    /// Canonical-higher endpoint
    pub b: Coordinate,
    /// Interface at `a`; carries `address.addr1`
    pub iface_a: String,
    /// Interface at `b`; carries `address.addr2`
    pub iface_b: String,
    pub category: EdgeCategory,
    pub address: LinkAddress,
}

/// Flattened wire-format view of one link for topology-file writers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTuple {
    pub router1: String,
    pub iface1: String,
    pub router2: String,
    pub iface2: String,
}

/// A complete, validated, immutable link and addressing plan
///
/// The plan is a pure function of its [`TopologyConfig`]: repeated
/// generations from identical input are byte-identical. Consumers
/// only ever read it, so no locking is needed when external writers
/// parallelize their I/O over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricPlan {
    pub size: usize,
    /// Routers in row-major coordinate order
    pub routers: Vec<RouterInfo>,
    /// Links in emission order
    pub links: Vec<PlannedLink>,
}

impl FabricPlan {
    /// Generate and validate the plan for one configuration
    ///
    /// All-or-nothing: any configuration inconsistency, topology
    /// invariant violation or address-space overflow aborts the run
    /// with no partial state left behind.
    pub fn generate(config: &TopologyConfig) -> Result<FabricPlan, PlanError> {
        config.validate()?;
        addressing::check_address_capacity(config.size)?;

        info!(
            "Generating {:?} fabric plan, size {}x{}",
            config.topology_type, config.size, config.size
        );

        let mut routers = Vec::with_capacity(config.size * config.size);
        for row in 0..config.size {
            for col in 0..config.size {
                let coord = Coordinate::new(row, col);
                let area = addressing::area_id(coord, config);
                // Per-node degree check up front: a node that cannot
                // seat all its declared bridges fails before any
                // assembly work. The neighbor map itself is rebuilt
                // from the final slot assignments further down so it
                // always mirrors the bound interfaces.
                neighbors::neighbors(coord, config)?;
                routers.push(RouterInfo {
                    name: coord.router_name(),
                    coordinate: coord,
                    node_type: NodeType::classify(coord, config.size, config.special()),
                    router_id: format!("10.{}.{}.1", row, col),
                    loopback: addressing::loopback(area, coord)?,
                    interfaces: BTreeMap::new(),
                    neighbors: NeighborMap::new(),
                });
            }
        }
        debug!("Built {} router records", routers.len());

        let edges = links::assemble(config)?;
        debug!("Assembled {} unique links", edges.len());

        let mut registry = InterfaceRegistry::new();
        let assignments = interfaces::assign(&edges, &mut registry)?;

        let mut planned = Vec::with_capacity(edges.len());
        for (edge, assignment) in edges.iter().zip(assignments) {
            let address = addressing::link_address(edge.a, edge.b, config.size)?;

            let index_a = edge.a.row * config.size + edge.a.col;
            let index_b = edge.b.row * config.size + edge.b.col;
            routers[index_a]
                .interfaces
                .insert(assignment.dir_a.iface().to_string(), address.addr1);
            routers[index_b]
                .interfaces
                .insert(assignment.dir_b.iface().to_string(), address.addr2);
            routers[index_a].neighbors.insert(assignment.dir_a, edge.b);
            routers[index_b].neighbors.insert(assignment.dir_b, edge.a);

            planned.push(PlannedLink {
                a: edge.a,
                b: edge.b,
                iface_a: assignment.dir_a.iface().to_string(),
                iface_b: assignment.dir_b.iface().to_string(),
                category: edge.category,
                address,
            });
        }

        let plan = FabricPlan {
            size: config.size,
            routers,
            links: planned,
        };

        validate::validate(&plan, config)?;
        info!(
            "Plan validated: {} routers, {} links",
            plan.routers.len(),
            plan.links.len()
        );
        Ok(plan)
    }

    /// All planned links in emission order
    pub fn all_links(&self) -> &[PlannedLink] {
        &self.links
    }

    /// Router record at a coordinate
    pub fn router(&self, coord: Coordinate) -> Option<&RouterInfo> {
        if !coord.in_bounds(self.size) {
            return None;
        }
        self.routers.get(coord.row * self.size + coord.col)
    }

    /// Interface name to host address, per router name
    pub fn interface_mappings(&self) -> BTreeMap<String, BTreeMap<String, Ipv6Addr>> {
        self.routers
            .iter()
            .map(|router| (router.name.clone(), router.interfaces.clone()))
            .collect()
    }

    /// Flattened `(router1, iface1, router2, iface2)` view for
    /// wire-format export
    pub fn wiring(&self) -> Vec<WireTuple> {
        self.links
            .iter()
            .map(|link| WireTuple {
                router1: link.address.name1.clone(),
                iface1: link.iface_a.clone(),
                router2: link.address.name2.clone(),
                iface2: link.iface_b.clone(),
            })
            .collect()
    }
}
