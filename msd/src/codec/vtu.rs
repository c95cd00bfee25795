// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

use crate::layout::{Field, Frame, PortSlots};
use crate::table::vtu::{MemberTag, VtuEntry, VtuExtInfo};

#[derive(Clone, Copy, Debug)]
pub struct VtuLayout {
    pub fid: Field,
    pub sid: Field,
    pub vid_policy: Field,
    pub dont_learn: Field,
    pub igmp_mld_snoop: Field,
    pub filter_uc: Field,
    pub filter_bc: Field,
    pub filter_mc: Field,
    pub use_vid_fpri: Field,
    pub vid_fpri: Field,
    pub use_vid_qpri: Field,
    pub vid_qpri: Field,
    pub tags: PortSlots,
}

pub fn encode(layout: &VtuLayout, num_ports: u8, e: &VtuEntry, f: &mut Frame) {
    f.set(layout.fid, e.fid as u32);
    f.set(layout.sid, e.sid as u32);
    f.set_bool(layout.vid_policy, e.ext.vid_policy);
    f.set_bool(layout.dont_learn, e.ext.dont_learn);
    f.set_bool(layout.igmp_mld_snoop, e.ext.igmp_mld_snoop);
    f.set_bool(layout.filter_uc, e.ext.filter_uc);
    f.set_bool(layout.filter_bc, e.ext.filter_bc);
    f.set_bool(layout.filter_mc, e.ext.filter_mc);
    f.set_bool(layout.use_vid_fpri, e.ext.use_vid_fpri);
    f.set(layout.vid_fpri, e.ext.vid_fpri as u32);
    f.set_bool(layout.use_vid_qpri, e.ext.use_vid_qpri);
    f.set(layout.vid_qpri, e.ext.vid_qpri as u32);
    for port in 0..num_ports {
        let tag = e.member_tag.get(port as usize).copied().unwrap_or_default();
        f.set(layout.tags.field(port), tag.bits());
    }
}

pub fn decode(
    layout: &VtuLayout,
    num_ports: u8,
    vid: u16,
    f: &Frame,
) -> VtuEntry {
    VtuEntry {
        vid,
        fid: f.get(layout.fid) as u16,
        sid: f.get(layout.sid) as u8,
        member_tag: (0..num_ports)
            .map(|port| MemberTag::from_bits(f.get(layout.tags.field(port))))
            .collect(),
        ext: VtuExtInfo {
            vid_policy: f.get_bool(layout.vid_policy),
            dont_learn: f.get_bool(layout.dont_learn),
            igmp_mld_snoop: f.get_bool(layout.igmp_mld_snoop),
            filter_uc: f.get_bool(layout.filter_uc),
            filter_bc: f.get_bool(layout.filter_bc),
            filter_mc: f.get_bool(layout.filter_mc),
            use_vid_fpri: f.get_bool(layout.use_vid_fpri),
            vid_fpri: f.get(layout.vid_fpri) as u8,
            use_vid_qpri: f.get_bool(layout.use_vid_qpri),
            vid_qpri: f.get(layout.vid_qpri) as u8,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::VTU_LAYOUT;
    use proptest::prelude::*;

    prop_compose! {
        fn ext_info()(
            flags in proptest::collection::vec(any::<bool>(), 8),
            vid_fpri in 0u8..8,
            vid_qpri in 0u8..8,
        ) -> VtuExtInfo {
            VtuExtInfo {
                vid_policy: flags[0],
                dont_learn: flags[1],
                igmp_mld_snoop: flags[2],
                filter_uc: flags[3],
                filter_bc: flags[4],
                filter_mc: flags[5],
                use_vid_fpri: flags[6],
                vid_fpri,
                use_vid_qpri: flags[7],
                vid_qpri,
            }
        }
    }

    prop_compose! {
        fn vtu_entry(num_ports: usize)(
            vid in 0u16..0x2000,
            fid in 0u16..0x1000,
            sid in 0u8..0x40,
            tags in proptest::collection::vec(
                (0u32..4).prop_map(MemberTag::from_bits),
                num_ports,
            ),
            ext in ext_info(),
        ) -> VtuEntry {
            VtuEntry { vid, fid, sid, member_tag: tags, ext }
        }
    }

    #[test]
    fn test_tags_follow_fid_and_sid() {
        let e = VtuEntry {
            vid: 100,
            fid: 0xabc,
            sid: 5,
            member_tag: vec![MemberTag::Tagged, MemberTag::Untagged],
            ext: VtuExtInfo::default(),
        };
        let mut f = Frame::new(5);
        encode(&VTU_LAYOUT, 2, &e, &mut f);
        assert_eq!(f.words[0], 0xabc);
        assert_eq!(f.words[1], 5);
        assert_eq!(f.words[2], 0b01_10);
    }

    proptest! {
        #[test]
        fn round_trip(e in vtu_entry(11)) {
            let mut f = Frame::new(5);
            encode(&VTU_LAYOUT, 11, &e, &mut f);
            prop_assert_eq!(decode(&VTU_LAYOUT, 11, e.vid, &f), e);
        }
    }
}
