//! # Fabriclab - Link and addressing planner for emulated router fabrics
//!
//! This library computes, for an emulated router fabric of size N x N,
//! a complete, collision-free link and addressing plan: which router
//! ports connect to which peer, what IPv6 subnet each link occupies,
//! and what loopback address each router owns.
//!
//! ## Overview
//!
//! Fabriclab is a pure, offline planner. It never touches live
//! network state; it produces the immutable plan that config emitters
//! and topology-file writers (ContainerLab exports, per-daemon config
//! rendering) consume afterwards. The same input always produces a
//! byte-identical plan, so test beds can be regenerated reproducibly.
//!
//! ## Key Features
//!
//! - **Three topology families**: bounded Grid, wraparound Torus, and
//!   a domain-divided Special topology with declared bridge edges
//! - **Collision-free by construction**: no interface slot is ever
//!   bound to two peers, no two links share a subnet
//! - **Deterministic**: repeated runs from identical input are
//!   byte-identical
//! - **Validated before exposure**: link counts, interface bindings
//!   and declared bridge edges are checked against closed-form
//!   expectations before the plan is handed out
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `config`: YAML configuration document and loading
//! - `topology`: coordinate/direction model, neighbor-graph
//!   generators, link assembly and deduplication
//! - `addressing`: deterministic IPv6 loopback and link-subnet
//!   allocation
//! - `plan`: interface/direction assignment, plan validation, and the
//!   finished [`plan::FabricPlan`]
//! - `error`: typed planner errors
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fabriclab::plan::FabricPlan;
//! use fabriclab::topology::types::{TopologyConfig, TopologyKind};
//!
//! let config = TopologyConfig {
//!     size: 6,
//!     topology_type: TopologyKind::Torus,
//!     special: None,
//! };
//!
//! let plan = FabricPlan::generate(&config)?;
//! for wire in plan.wiring() {
//!     println!("{}:{} <-> {}:{}", wire.router1, wire.iface1, wire.router2, wire.iface2);
//! }
//! # Ok::<(), fabriclab::error::PlanError>(())
//! ```
//!
//! ## Error Handling
//!
//! Domain errors are the typed [`error::PlanError`] enum; generation
//! is all-or-nothing and safely re-runnable. The binary wraps them in
//! `color_eyre` reports with context at the application boundary.

pub mod config;
pub mod error;
pub mod topology;
pub mod addressing;
pub mod plan;

// Re-export the central entry points
pub use error::PlanError;
pub use plan::FabricPlan;
pub use topology::types::{Coordinate, Direction, NodeType, TopologyConfig, TopologyKind};
