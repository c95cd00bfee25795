// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! ARP entries share one frame between two interpretations: a unicast
//! replacement MAC, or a per-port duplication count for multicast.  The
//! hardware does not record which one was loaded, so decoding yields raw
//! bytes that the caller interprets.

use common::network::MacAddr;

use crate::layout::{Field, Frame, PortSlots};

#[derive(Clone, Copy, Debug)]
pub struct ArpLayout {
    /// The MAC address, least significant part first.
    pub mac: [Field; 3],
    pub counts: PortSlots,
}

/// The largest per-port duplication count.
pub const MAX_DUP_COUNT: u8 = 0xf;

pub fn encode_unicast(layout: &ArpLayout, mac: MacAddr, f: &mut Frame) {
    f.set_wide(&layout.mac, u64::from(mac));
}

pub fn encode_multicast(
    layout: &ArpLayout,
    num_ports: u8,
    counts: &[u8],
    f: &mut Frame,
) {
    for port in 0..num_ports {
        let c = counts.get(port as usize).copied().unwrap_or(0);
        f.set(layout.counts.field(port), c as u32);
    }
}

/// The frame as six bytes, most significant first.
pub fn decode(layout: &ArpLayout, f: &Frame) -> [u8; 6] {
    MacAddr::from(f.get_wide(&layout.mac)).into()
}

/// Recover per-port duplication counts from raw entry bytes.
pub fn multicast_counts(
    layout: &ArpLayout,
    num_ports: u8,
    raw: [u8; 6],
) -> Vec<u8> {
    let mut f = Frame::new(layout.mac.len());
    f.set_wide(&layout.mac, u64::from(MacAddr::from(raw)));
    (0..num_ports)
        .map(|port| f.get(layout.counts.field(port)) as u8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::ARP_LAYOUT;
    use proptest::prelude::*;

    #[test]
    fn test_unicast_word_order() {
        let mut f = Frame::new(3);
        let mac = MacAddr::new(0x00, 0x11, 0x22, 0x33, 0x44, 0x55);
        encode_unicast(&ARP_LAYOUT, mac, &mut f);
        assert_eq!(f.words, vec![0x0011, 0x2233, 0x4455]);
        assert_eq!(decode(&ARP_LAYOUT, &f), mac.octets());
    }

    #[test]
    fn test_multicast_counts() {
        let mut f = Frame::new(3);
        let counts = vec![1, 0, 2, 0, 0, 0, 0, 0, 0, 0, 3];
        encode_multicast(&ARP_LAYOUT, 11, &counts, &mut f);
        let raw = decode(&ARP_LAYOUT, &f);
        assert_eq!(multicast_counts(&ARP_LAYOUT, 11, raw), counts);
    }

    proptest! {
        #[test]
        fn unicast_round_trip(octets in any::<[u8; 6]>()) {
            let mut f = Frame::new(3);
            encode_unicast(&ARP_LAYOUT, MacAddr::from(octets), &mut f);
            prop_assert_eq!(decode(&ARP_LAYOUT, &f), octets);
        }

        #[test]
        fn multicast_round_trip(
            counts in proptest::collection::vec(0u8..=MAX_DUP_COUNT, 11)
        ) {
            let mut f = Frame::new(3);
            encode_multicast(&ARP_LAYOUT, 11, &counts, &mut f);
            let raw = decode(&ARP_LAYOUT, &f);
            prop_assert_eq!(multicast_counts(&ARP_LAYOUT, 11, raw), counts);
        }
    }
}
