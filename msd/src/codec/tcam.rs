// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

use crate::layout::{Field, Frame};
use crate::table::tcam::{TcamAction, TcamEntry, TcamKey, TCAM_KEY_OCTETS};

#[derive(Clone, Copy, Debug)]
pub struct TcamActionLayout {
    pub continue_next: Field,
    pub interrupt: Field,
    pub inc_counter: Field,
    pub vid_override: Field,
    pub vid: Field,
    pub next_id: Field,
    pub fpri_override: Field,
    pub fpri: Field,
    pub qpri_override: Field,
    pub qpri: Field,
    pub dscp_override: Field,
    pub dscp: Field,
    pub dpv_override: Field,
    pub dpv: Field,
}

#[derive(Clone, Copy, Debug)]
pub struct TcamLayout {
    pub frame_type_key: Field,
    pub frame_type_mask: Field,
    pub spv_key: Field,
    pub spv_mask: Field,
    /// Runs of (first word, octet count) holding the frame octets in order.
    /// Each word carries the key octet in bits 7:0 and the mask in 15:8.
    pub octets: &'static [(u8, u8)],
    pub action: TcamActionLayout,
}

impl TcamLayout {
    fn octet_words(&self) -> impl Iterator<Item = u8> + '_ {
        self.octets
            .iter()
            .flat_map(|(first, count)| *first..*first + *count)
            .take(TCAM_KEY_OCTETS)
    }
}

fn set_opt(f: &mut Frame, en: Field, val: Field, v: Option<u32>) {
    f.set_bool(en, v.is_some());
    f.set(val, v.unwrap_or(0));
}

fn get_opt(f: &Frame, en: Field, val: Field) -> Option<u32> {
    f.get_bool(en).then(|| f.get(val))
}

pub fn encode(layout: &TcamLayout, e: &TcamEntry, f: &mut Frame) {
    f.set(layout.frame_type_key, e.key.frame_type as u32);
    f.set(layout.frame_type_mask, e.mask.frame_type as u32);
    f.set(layout.spv_key, e.key.spv);
    f.set(layout.spv_mask, e.mask.spv);
    for (i, word) in layout.octet_words().enumerate() {
        f.set(Field::new(word, 0, 8), e.key.frame[i] as u32);
        f.set(Field::new(word, 8, 8), e.mask.frame[i] as u32);
    }

    let a = &layout.action;
    let act = &e.action;
    f.set_bool(a.continue_next, act.continue_next);
    f.set_bool(a.interrupt, act.interrupt);
    f.set_bool(a.inc_counter, act.inc_counter);
    f.set(a.next_id, act.next_id as u32);
    set_opt(f, a.vid_override, a.vid, act.vid_override.map(u32::from));
    set_opt(f, a.fpri_override, a.fpri, act.fpri_override.map(u32::from));
    set_opt(f, a.qpri_override, a.qpri, act.qpri_override.map(u32::from));
    set_opt(f, a.dscp_override, a.dscp, act.dscp_override.map(u32::from));
    set_opt(f, a.dpv_override, a.dpv, act.dpv_override);
}

pub fn decode(layout: &TcamLayout, index: u32, f: &Frame) -> TcamEntry {
    let mut key = TcamKey {
        frame_type: f.get(layout.frame_type_key) as u8,
        spv: f.get(layout.spv_key),
        ..Default::default()
    };
    let mut mask = TcamKey {
        frame_type: f.get(layout.frame_type_mask) as u8,
        spv: f.get(layout.spv_mask),
        ..Default::default()
    };
    for (i, word) in layout.octet_words().enumerate() {
        key.frame[i] = f.get(Field::new(word, 0, 8)) as u8;
        mask.frame[i] = f.get(Field::new(word, 8, 8)) as u8;
    }

    let a = &layout.action;
    let action = TcamAction {
        continue_next: f.get_bool(a.continue_next),
        interrupt: f.get_bool(a.interrupt),
        inc_counter: f.get_bool(a.inc_counter),
        next_id: f.get(a.next_id) as u8,
        vid_override: get_opt(f, a.vid_override, a.vid).map(|v| v as u16),
        fpri_override: get_opt(f, a.fpri_override, a.fpri).map(|v| v as u8),
        qpri_override: get_opt(f, a.qpri_override, a.qpri).map(|v| v as u8),
        dscp_override: get_opt(f, a.dscp_override, a.dscp).map(|v| v as u8),
        dpv_override: get_opt(f, a.dpv_override, a.dpv),
    };

    TcamEntry {
        index,
        key,
        mask,
        action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::TCAM_LAYOUT;
    use proptest::prelude::*;

    const WORDS: usize = 78;

    prop_compose! {
        fn tcam_key()(
            frame_type in 0u8..4,
            spv in 0u32..0x800,
            frame in proptest::collection::vec(any::<u8>(), TCAM_KEY_OCTETS),
        ) -> TcamKey {
            let mut k = TcamKey { frame_type, spv, ..Default::default() };
            k.frame.copy_from_slice(&frame);
            k
        }
    }

    prop_compose! {
        fn tcam_action()(
            flags in proptest::collection::vec(any::<bool>(), 3),
            next_id in any::<u8>(),
            vid in proptest::option::of(0u16..0x1000),
            fpri in proptest::option::of(0u8..8),
            qpri in proptest::option::of(0u8..8),
            dscp in proptest::option::of(0u8..64),
            dpv in proptest::option::of(0u32..0x800),
        ) -> TcamAction {
            TcamAction {
                continue_next: flags[0],
                interrupt: flags[1],
                inc_counter: flags[2],
                next_id,
                vid_override: vid,
                fpri_override: fpri,
                qpri_override: qpri,
                dscp_override: dscp,
                dpv_override: dpv,
            }
        }
    }

    #[test]
    fn test_octets_span_pages() {
        let mut e = TcamEntry::default();
        e.key.frame[0] = 0x01;
        e.mask.frame[0] = 0xff;
        e.key.frame[47] = 0x47;
        e.mask.frame[47] = 0x0f;
        let mut f = Frame::new(WORDS);
        encode(&TCAM_LAYOUT, &e, &mut f);
        assert_eq!(f.words[4], 0xff01);
        assert_eq!(f.words[51], 0x0f47);
    }

    proptest! {
        #[test]
        fn round_trip(
            index in 0u32..256,
            key in tcam_key(),
            mask in tcam_key(),
            action in tcam_action(),
        ) {
            let e = TcamEntry { index, key, mask, action };
            let mut f = Frame::new(WORDS);
            encode(&TCAM_LAYOUT, &e, &mut f);
            prop_assert_eq!(decode(&TCAM_LAYOUT, index, &f), e);
        }
    }
}
