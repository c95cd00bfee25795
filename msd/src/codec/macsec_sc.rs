// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

use crate::layout::{Field, Frame};
use crate::table::macsec_sc::{MacsecScEntry, ScDirection, ValidateFrames};

#[derive(Clone, Copy, Debug)]
pub struct ScLayout {
    /// The 64-bit secure channel identifier, least significant word first.
    pub sci: [Field; 2],
    pub port: Field,
    pub direction: Field,
    pub encoding_an: Field,
    pub protect_frames: Field,
    pub replay_protect: Field,
    pub validate_frames: Field,
    pub replay_window: Field,
}

pub fn encode(layout: &ScLayout, e: &MacsecScEntry, f: &mut Frame) {
    f.set_wide(&layout.sci, e.sci);
    f.set(layout.port, e.port as u32);
    f.set(layout.direction, e.direction as u32);
    f.set(layout.encoding_an, e.encoding_an as u32);
    f.set_bool(layout.protect_frames, e.protect_frames);
    f.set_bool(layout.replay_protect, e.replay_protect);
    f.set(layout.validate_frames, e.validate_frames as u32);
    f.set(layout.replay_window, e.replay_window);
}

pub fn decode(layout: &ScLayout, index: u32, f: &Frame) -> MacsecScEntry {
    MacsecScEntry {
        index,
        sci: f.get_wide(&layout.sci),
        port: f.get(layout.port) as u8,
        direction: if f.get_bool(layout.direction) {
            ScDirection::Rx
        } else {
            ScDirection::Tx
        },
        encoding_an: f.get(layout.encoding_an) as u8,
        protect_frames: f.get_bool(layout.protect_frames),
        replay_protect: f.get_bool(layout.replay_protect),
        validate_frames: ValidateFrames::from_bits(
            f.get(layout.validate_frames),
        ),
        replay_window: f.get(layout.replay_window),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::MACSEC_SC_LAYOUT;
    use proptest::prelude::*;

    #[test]
    fn test_sci_word_order() {
        let e = MacsecScEntry {
            sci: 0x0011_2233_4455_0001,
            direction: ScDirection::Rx,
            ..Default::default()
        };
        let mut f = Frame::new(4);
        encode(&MACSEC_SC_LAYOUT, &e, &mut f);
        assert_eq!(f.words[0], 0x4455_0001);
        assert_eq!(f.words[1], 0x0011_2233);
        assert_eq!(f.words[2], (1 << 4) | (2 << 16));
    }

    prop_compose! {
        fn sc()(
            index in 0u32..16,
            sci in any::<u64>(),
            port in 0u8..16,
            rx in any::<bool>(),
            encoding_an in 0u8..4,
            flags in any::<[bool; 2]>(),
            validate in 0u32..3,
            replay_window in any::<u32>(),
        ) -> MacsecScEntry {
            MacsecScEntry {
                index,
                sci,
                port,
                direction: if rx { ScDirection::Rx } else { ScDirection::Tx },
                encoding_an,
                protect_frames: flags[0],
                replay_protect: flags[1],
                validate_frames: ValidateFrames::from_bits(validate),
                replay_window,
            }
        }
    }

    proptest! {
        #[test]
        fn round_trip(e in sc()) {
            let mut f = Frame::new(4);
            encode(&MACSEC_SC_LAYOUT, &e, &mut f);
            prop_assert_eq!(decode(&MACSEC_SC_LAYOUT, e.index, &f), e);
        }
    }
}
