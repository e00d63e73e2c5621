//! IPv6 address allocation logic.
//!
//! This file contains the deterministic address derivation: loopbacks
//! under `2001:db8:1000::` as a function of (area, row, col), and one
//! /126 link subnet under `2001:db8:2000::` per undirected edge,
//! keyed by a pairing function over the two flattened node ids.
//!
//! Indices are hex-encoded into 16-bit address groups. An index that
//! exceeds 0xFFFF is split into high/low 16-bit groups; skipping that
//! split would silently emit malformed or colliding addresses once
//! the fabric grows, so the split and the prefix capacity are checked
//! up front rather than discovered mid-generation.

use serde::{Deserialize, Serialize};
use std::net::Ipv6Addr;

use crate::error::PlanError;
use crate::topology::types::{Coordinate, TopologyConfig};

/// Prefix groups for router loopbacks (`2001:db8:1000::/48`)
const LOOPBACK_PREFIX: [u16; 3] = [0x2001, 0x0db8, 0x1000];

/// Prefix groups for link subnets (`2001:db8:2000::/48`)
const LINK_PREFIX: [u16; 3] = [0x2001, 0x0db8, 0x2000];

/// Addressing of one undirected link
///
/// Exactly two usable host addresses exist per subnet: `network + 1`
/// and `network + 2`. The network address itself and the
/// broadcast-like `network + 3` are never assigned to a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAddress {
    /// Base of the /126 subnet carrying this link
    pub network: Ipv6Addr,
    /// Host address of the canonical-lower endpoint (`network + 1`)
    pub addr1: Ipv6Addr,
    /// Host address of the canonical-higher endpoint (`network + 2`)
    pub addr2: Ipv6Addr,
    /// Router name of the canonical-lower endpoint
    pub name1: String,
    /// Router name of the canonical-higher endpoint
    pub name2: String,
}

impl LinkAddress {
    /// Prefix length of the allocated subnet
    pub const SUBNET_PREFIX_LEN: u8 = 126;

    /// Prefix length written into interface configuration; the same
    /// space truncated to a point-to-point /127
    pub const IFACE_PREFIX_LEN: u8 = 127;

    /// `addr1` in CIDR notation for interface configuration
    pub fn iface_cidr1(&self) -> String {
        format!("{}/{}", self.addr1, Self::IFACE_PREFIX_LEN)
    }

    /// `addr2` in CIDR notation for interface configuration
    pub fn iface_cidr2(&self) -> String {
        format!("{}/{}", self.addr2, Self::IFACE_PREFIX_LEN)
    }

    /// The subnet in CIDR notation
    pub fn subnet_cidr(&self) -> String {
        format!("{}/{}", self.network, Self::SUBNET_PREFIX_LEN)
    }
}

/// Hex-encode an index into 16-bit address groups
///
/// Indices up to 0xFFFF take one group; larger indices are split into
/// a high and a low group. Anything beyond 32 bits does not fit the
/// chosen prefix layout at all.
fn hex_groups(index: u64) -> Result<Vec<u16>, PlanError> {
    if index <= 0xFFFF {
        Ok(vec![index as u16])
    } else if index <= 0xFFFF_FFFF {
        Ok(vec![(index >> 16) as u16, (index & 0xFFFF) as u16])
    } else {
        Err(PlanError::AddressSpaceExhaustion(format!(
            "index {:#x} does not fit two 16-bit address groups",
            index
        )))
    }
}

/// Assemble a full 8-group address from a prefix and encoded indices
///
/// The final group is reserved for host bits; indices that spill into
/// it mean the prefix width is exhausted.
fn assemble_segments(prefix: &[u16; 3], indices: &[u64], host: u16) -> Result<Ipv6Addr, PlanError> {
    let mut groups: Vec<u16> = prefix.to_vec();
    for index in indices {
        groups.extend(hex_groups(*index)?);
    }
    if groups.len() > 7 {
        return Err(PlanError::AddressSpaceExhaustion(format!(
            "indices {:?} need {} address groups, only 7 are available",
            indices,
            groups.len()
        )));
    }
    groups.resize(7, 0);
    groups.push(host);

    Ok(Ipv6Addr::new(
        groups[0], groups[1], groups[2], groups[3], groups[4], groups[5], groups[6], groups[7],
    ))
}

/// Cantor-style pairing over an unordered node-id pair
///
/// Injective over the whole coordinate space: distinct unordered
/// pairs always map to distinct link ids.
pub fn pair_link_id(x: u64, y: u64) -> u64 {
    let (a, b) = if x <= y { (x, y) } else { (y, x) };
    (a + b) * (a + b + 1) / 2 + b
}

/// Verify analytically that every address the given fabric size can
/// demand fits the prefix layout
///
/// Run before generation; a failure here means no address in the run
/// would have been trustworthy.
pub fn check_address_capacity(size: usize) -> Result<(), PlanError> {
    if size < 2 {
        return Err(PlanError::Configuration(format!(
            "fabric size must be at least 2, got {}",
            size
        )));
    }
    let max_id = (size * size - 1) as u64;

    // Largest pairing value any edge of this fabric can produce.
    let max_link_id = max_id
        .checked_add(max_id - 1)
        .and_then(|s| s.checked_mul(s + 1))
        .map(|p| p / 2 + max_id)
        .ok_or_else(|| {
            PlanError::AddressSpaceExhaustion(format!(
                "link id overflows for fabric size {}",
                size
            ))
        })?;
    assemble_segments(&LINK_PREFIX, &[max_link_id], 0)?;

    // Loopback indices are bounded by the coordinate range itself.
    assemble_segments(&LOOPBACK_PREFIX, &[max_id, (size - 1) as u64, (size - 1) as u64], 1)?;

    Ok(())
}

/// Sub-region id of a coordinate for loopback derivation
///
/// Special topologies number their `area_size x area_size` regions in
/// row-major order; grid and torus fabrics are one single area.
pub fn area_id(coord: Coordinate, config: &TopologyConfig) -> u64 {
    match config.special() {
        Some(special) => {
            let areas_per_row = config.size.div_ceil(special.area_size);
            let (area_row, area_col) = coord.sub_region(special.area_size);
            (area_row * areas_per_row + area_col) as u64
        }
        None => 0,
    }
}

/// Stable loopback address of one router
pub fn loopback(area: u64, coord: Coordinate) -> Result<Ipv6Addr, PlanError> {
    assemble_segments(
        &LOOPBACK_PREFIX,
        &[area, coord.row as u64, coord.col as u64],
        1,
    )
}

/// Stable /126 subnet and host addresses for one undirected edge
///
/// The canonical-lower endpoint always receives `addr1`, so the
/// result is independent of which endpoint the edge was discovered
/// from.
pub fn link_address(
    a: Coordinate,
    b: Coordinate,
    size: usize,
) -> Result<LinkAddress, PlanError> {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let link_id = pair_link_id(lo.node_id(size), hi.node_id(size));

    let network = assemble_segments(&LINK_PREFIX, &[link_id], 0)?;
    let base = u128::from(network);
    let addr1 = Ipv6Addr::from(base + 1);
    let addr2 = Ipv6Addr::from(base + 2);

    Ok(LinkAddress {
        network,
        addr1,
        addr2,
        name1: lo.router_name(),
        name2: hi.router_name(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn coord(row: usize, col: usize) -> Coordinate {
        Coordinate::new(row, col)
    }

    #[test]
    fn test_hex_groups_single() {
        assert_eq!(hex_groups(0).unwrap(), vec![0]);
        assert_eq!(hex_groups(0xFFFF).unwrap(), vec![0xFFFF]);
    }

    #[test]
    fn test_hex_groups_split() {
        assert_eq!(hex_groups(0x10000).unwrap(), vec![1, 0]);
        assert_eq!(hex_groups(0x0BAD_CAFE).unwrap(), vec![0x0BAD, 0xCAFE]);
        assert_eq!(hex_groups(0xFFFF_FFFF).unwrap(), vec![0xFFFF, 0xFFFF]);
    }

    #[test]
    fn test_hex_groups_overflow() {
        assert!(matches!(
            hex_groups(0x1_0000_0000),
            Err(PlanError::AddressSpaceExhaustion(_))
        ));
    }

    #[test]
    fn test_pairing_is_injective_over_small_space() {
        let mut seen = HashSet::new();
        for a in 0..64u64 {
            for b in a + 1..64 {
                assert!(seen.insert(pair_link_id(a, b)), "collision at ({},{})", a, b);
            }
        }
    }

    #[test]
    fn test_pairing_is_order_independent() {
        assert_eq!(pair_link_id(3, 17), pair_link_id(17, 3));
    }

    #[test]
    fn test_loopback_layout() {
        let addr = loopback(2, coord(4, 11)).unwrap();
        assert_eq!(addr, "2001:db8:1000:2:4:b:0:1".parse::<Ipv6Addr>().unwrap());
    }

    #[test]
    fn test_loopbacks_unique_per_router() {
        let mut seen = HashSet::new();
        for row in 0..10 {
            for col in 0..10 {
                let addr = loopback(0, coord(row, col)).unwrap();
                assert!(seen.insert(addr));
            }
        }
    }

    #[test]
    fn test_link_hosts_are_network_plus_one_and_two() {
        let link = link_address(coord(0, 0), coord(0, 1), 6).unwrap();
        let base = u128::from(link.network);
        assert_eq!(u128::from(link.addr1), base + 1);
        assert_eq!(u128::from(link.addr2), base + 2);
        // The /126 base is aligned: the network and broadcast-like
        // addresses stay unassigned.
        assert_eq!(base % 4, 0);
    }

    #[test]
    fn test_link_address_order_independent() {
        let forward = link_address(coord(2, 3), coord(3, 3), 6).unwrap();
        let backward = link_address(coord(3, 3), coord(2, 3), 6).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.name1, "router_02_03");
        assert_eq!(forward.name2, "router_03_03");
    }

    #[test]
    fn test_link_networks_unique_per_edge() {
        // Every adjacent pair of a 9x9 grid must land in its own subnet.
        let size = 9;
        let mut seen = HashSet::new();
        for row in 0..size {
            for col in 0..size {
                if col + 1 < size {
                    let link = link_address(coord(row, col), coord(row, col + 1), size).unwrap();
                    assert!(seen.insert(link.network));
                }
                if row + 1 < size {
                    let link = link_address(coord(row, col), coord(row + 1, col), size).unwrap();
                    assert!(seen.insert(link.network));
                }
            }
        }
    }

    #[test]
    fn test_capacity_check_accepts_supported_sizes() {
        for size in [2, 10, 100] {
            assert!(check_address_capacity(size).is_ok(), "size {}", size);
        }
    }

    #[test]
    fn test_capacity_check_rejects_degenerate_sizes() {
        for size in [0, 1] {
            assert!(matches!(
                check_address_capacity(size),
                Err(PlanError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_capacity_check_rejects_absurd_sizes() {
        assert!(matches!(
            check_address_capacity(100_000),
            Err(PlanError::AddressSpaceExhaustion(_))
        ));
    }

    #[test]
    fn test_large_link_id_splits_into_two_groups() {
        // node ids near the top of a 100x100 fabric force the pairing
        // value past 0xFFFF; the network must still be well-formed.
        let link = link_address(coord(99, 98), coord(99, 99), 100).unwrap();
        let segments = link.network.segments();
        assert_eq!(&segments[..3], &[0x2001, 0x0db8, 0x2000]);
        // Two id groups, then zero padding before the host group.
        assert_ne!(segments[3], 0);
        assert_eq!(segments[6], 0);
        assert_eq!(segments[7], 0);
    }

    #[test]
    fn test_iface_cidr_format() {
        let link = link_address(coord(0, 0), coord(0, 1), 6).unwrap();
        assert!(link.iface_cidr1().ends_with("/127"));
        assert!(link.subnet_cidr().ends_with("/126"));
    }
}
