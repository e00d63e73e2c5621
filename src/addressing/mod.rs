//! IPv6 address allocation module.
//!
//! This module derives the stable loopback address of every router
//! and the stable point-to-point subnet of every link, purely from
//! coordinates and the fabric size. No allocation state is carried
//! between runs; identical input yields identical addresses.

pub mod allocator;

// Re-export commonly used types
pub use allocator::{
    area_id, check_address_capacity, link_address, loopback, pair_link_id, LinkAddress,
};
