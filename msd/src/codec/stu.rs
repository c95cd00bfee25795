// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

use crate::layout::{Frame, PortSlots};
use crate::table::stu::{PortState, StuEntry};

#[derive(Clone, Copy, Debug)]
pub struct StuLayout {
    pub ports: PortSlots,
}

pub fn encode(layout: &StuLayout, num_ports: u8, e: &StuEntry, f: &mut Frame) {
    for port in 0..num_ports {
        let state =
            e.port_state.get(port as usize).copied().unwrap_or_default();
        f.set(layout.ports.field(port), state.bits());
    }
}

pub fn decode(
    layout: &StuLayout,
    num_ports: u8,
    sid: u8,
    f: &Frame,
) -> StuEntry {
    StuEntry {
        sid,
        port_state: (0..num_ports)
            .map(|port| PortState::from_bits(f.get(layout.ports.field(port))))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Field;
    use proptest::prelude::*;

    const LAYOUT: StuLayout = StuLayout {
        ports: PortSlots {
            first_word: 0,
            bits: 2,
            per_word: 8,
            overrides: &[],
        },
    };

    const FIR_LAYOUT: StuLayout = StuLayout {
        ports: PortSlots {
            first_word: 0,
            bits: 2,
            per_word: 8,
            overrides: &[(11, Field::new(2, 0, 2))],
        },
    };

    fn port_state() -> impl Strategy<Value = PortState> {
        (0u32..4).prop_map(PortState::from_bits)
    }

    #[test]
    fn test_packing() {
        let e = StuEntry {
            sid: 3,
            port_state: vec![
                PortState::Forwarding,
                PortState::Blocking,
                PortState::Disabled,
                PortState::Learning,
                PortState::Disabled,
                PortState::Disabled,
                PortState::Disabled,
                PortState::Disabled,
                PortState::Forwarding,
            ],
        };
        let mut f = Frame::new(2);
        encode(&LAYOUT, 9, &e, &mut f);
        assert_eq!(f.words, vec![0b10_00_01_11, 0b11]);
    }

    #[test]
    fn test_override_slot() {
        let mut e = StuEntry {
            sid: 1,
            port_state: vec![PortState::Disabled; 12],
        };
        e.port_state[11] = PortState::Forwarding;
        let mut f = Frame::new(3);
        encode(&FIR_LAYOUT, 12, &e, &mut f);
        assert_eq!(f.words, vec![0, 0, 0b11]);
        assert_eq!(decode(&FIR_LAYOUT, 12, 1, &f), e);
    }

    proptest! {
        #[test]
        fn round_trip(states in proptest::collection::vec(port_state(), 11)) {
            let e = StuEntry { sid: 9, port_state: states };
            let mut f = Frame::new(2);
            encode(&LAYOUT, 11, &e, &mut f);
            prop_assert_eq!(decode(&LAYOUT, 11, 9, &f), e);
        }
    }
}
