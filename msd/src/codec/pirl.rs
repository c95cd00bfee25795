// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

use crate::layout::{Field, Frame};
use crate::table::pirl::{ExhaustAction, FcMode, PirlData};

#[derive(Clone, Copy, Debug)]
pub struct PirlLayout {
    /// Highest resource number per port.
    pub max_resource: u8,
    pub bkt_type_mask: Field,
    pub tcam_flows: Field,
    pub color_aware: Field,
    pub account_filtered: Field,
    pub account_discarded: Field,
    pub exhaust_action: Field,
    pub fc_mode: Field,
    /// The 24-bit bucket limits, least significant part first.
    pub cbs: [Field; 2],
    pub ebs: [Field; 2],
    pub bkt_increment: Field,
    pub rate_factor: Field,
}

pub fn encode(layout: &PirlLayout, d: &PirlData, f: &mut Frame) {
    f.set(layout.bkt_type_mask, d.bkt_type_mask as u32);
    f.set_bool(layout.tcam_flows, d.tcam_flows);
    f.set_bool(layout.color_aware, d.color_aware);
    f.set_bool(layout.account_filtered, d.account_filtered);
    f.set_bool(layout.account_discarded, d.account_discarded);
    f.set(layout.exhaust_action, d.exhaust_action as u32);
    f.set(layout.fc_mode, d.fc_mode as u32);
    f.set_wide(&layout.cbs, d.cbs as u64);
    f.set_wide(&layout.ebs, d.ebs as u64);
    f.set(layout.bkt_increment, d.bkt_increment as u32);
    f.set(layout.rate_factor, d.rate_factor as u32);
}

pub fn decode(layout: &PirlLayout, f: &Frame) -> PirlData {
    PirlData {
        bkt_type_mask: f.get(layout.bkt_type_mask) as u16,
        tcam_flows: f.get_bool(layout.tcam_flows),
        color_aware: f.get_bool(layout.color_aware),
        account_filtered: f.get_bool(layout.account_filtered),
        account_discarded: f.get_bool(layout.account_discarded),
        exhaust_action: if f.get_bool(layout.exhaust_action) {
            ExhaustAction::FlowControl
        } else {
            ExhaustAction::Drop
        },
        fc_mode: if f.get_bool(layout.fc_mode) {
            FcMode::WhenBelowCbs
        } else {
            FcMode::WhenEmpty
        },
        cbs: f.get_wide(&layout.cbs) as u32,
        ebs: f.get_wide(&layout.ebs) as u32,
        bkt_increment: f.get(layout.bkt_increment) as u16,
        rate_factor: f.get(layout.rate_factor) as u16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::PIRL_LAYOUT;
    use crate::table::pirl::{BKT_INCREMENT_MAX, BUCKET_SIZE_MAX};
    use proptest::prelude::*;

    prop_compose! {
        fn pirl_data()(
            bkt_type_mask in 0u16..0x8000,
            flags in proptest::collection::vec(any::<bool>(), 6),
            cbs in 0u32..=BUCKET_SIZE_MAX,
            ebs in 0u32..=BUCKET_SIZE_MAX,
            bkt_increment in 0u16..=BKT_INCREMENT_MAX,
            rate_factor in any::<u16>(),
        ) -> PirlData {
            PirlData {
                bkt_type_mask,
                tcam_flows: flags[0],
                color_aware: flags[1],
                account_filtered: flags[2],
                account_discarded: flags[3],
                exhaust_action: if flags[4] {
                    ExhaustAction::FlowControl
                } else {
                    ExhaustAction::Drop
                },
                fc_mode: if flags[5] {
                    FcMode::WhenBelowCbs
                } else {
                    FcMode::WhenEmpty
                },
                cbs,
                ebs,
                bkt_increment,
                rate_factor,
            }
        }
    }

    #[test]
    fn test_bucket_limits_split() {
        let d = PirlData {
            cbs: 0x12_3456,
            ebs: 0xab_cdef,
            ..Default::default()
        };
        let mut f = Frame::new(8);
        encode(&PIRL_LAYOUT, &d, &mut f);
        assert_eq!(f.words[2], 0x3456);
        assert_eq!(f.words[3], 0xab12);
        assert_eq!(f.words[4], 0xcdef);
    }

    proptest! {
        #[test]
        fn round_trip(d in pirl_data()) {
            let mut f = Frame::new(8);
            encode(&PIRL_LAYOUT, &d, &mut f);
            prop_assert_eq!(decode(&PIRL_LAYOUT, &f), d);
        }
    }
}
