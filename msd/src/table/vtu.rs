// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! The VLAN translation unit: per-VID forwarding database, spanning tree
//! instance, port membership and priority overrides.

use strum::Display;

use common::table::TableKind;
use hal::{HalError, HalResult, PortMap};

use super::{check_ports, check_range, Dump, TableEntry, TableRow};
use crate::chip::ChipConfig;
use crate::codec::vtu::{self as codec, VtuLayout};
use crate::device::Device;
use crate::layout::{Frame, Table};

pub const FID_MAX: u16 = 0xfff;
pub const SID_MAX: u8 = 0x3f;
pub const PRI_MAX: u8 = 7;

/// How frames egress a port for this VLAN.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum MemberTag {
    Unmodified = 0,
    Untagged = 1,
    Tagged = 2,
    #[default]
    NotMember = 3,
}

impl MemberTag {
    pub fn from_bits(b: u32) -> Self {
        match b & 0x3 {
            0 => MemberTag::Unmodified,
            1 => MemberTag::Untagged,
            2 => MemberTag::Tagged,
            _ => MemberTag::NotMember,
        }
    }

    pub fn bits(self) -> u32 {
        self as u32
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VtuExtInfo {
    pub vid_policy: bool,
    pub dont_learn: bool,
    pub igmp_mld_snoop: bool,
    pub filter_uc: bool,
    pub filter_bc: bool,
    pub filter_mc: bool,
    pub use_vid_fpri: bool,
    pub vid_fpri: u8,
    pub use_vid_qpri: bool,
    pub vid_qpri: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VtuEntry {
    pub vid: u16,
    pub fid: u16,
    pub sid: u8,
    /// Indexed by logical port.
    pub member_tag: Vec<MemberTag>,
    pub ext: VtuExtInfo,
}

impl VtuEntry {
    /// An entry with no member ports, in FID 0 and SID 0.
    pub fn new(dev: &Device, vid: u16) -> Self {
        VtuEntry {
            vid,
            fid: 0,
            sid: 0,
            member_tag: vec![MemberTag::NotMember; dev.ports().len()],
            ext: VtuExtInfo::default(),
        }
    }
}

impl TableEntry for VtuEntry {
    type Layout = VtuLayout;
    const KIND: TableKind = TableKind::Vtu;

    fn binding(chip: &'static ChipConfig) -> Option<&'static Table<VtuLayout>> {
        chip.vtu.as_ref()
    }

    fn index(&self) -> u32 {
        self.vid as u32
    }

    fn validate(&self, dev: &Device, _layout: &VtuLayout) -> HalResult<()> {
        check_range("fid", self.fid as u32, FID_MAX as u32)?;
        check_range("sid", self.sid as u32, SID_MAX as u32)?;
        check_range("vid fpri", self.ext.vid_fpri as u32, PRI_MAX as u32)?;
        check_range("vid qpri", self.ext.vid_qpri as u32, PRI_MAX as u32)?;
        check_ports("member tag", dev.ports(), &self.member_tag)
    }

    fn to_physical(&self, ports: &PortMap) -> HalResult<Self> {
        Ok(VtuEntry {
            member_tag: ports.slots_to_physical(&self.member_tag)?,
            ..self.clone()
        })
    }

    fn to_logical(self, ports: &PortMap) -> Self {
        VtuEntry {
            member_tag: ports.slots_to_logical(&self.member_tag),
            ..self
        }
    }

    fn encode(&self, layout: &VtuLayout, num_ports: u8, frame: &mut Frame) {
        codec::encode(layout, num_ports, self, frame)
    }

    fn decode(
        layout: &VtuLayout,
        num_ports: u8,
        index: u32,
        frame: &Frame,
    ) -> Self {
        codec::decode(layout, num_ports, index as u16, frame)
    }
}

impl TableRow for VtuEntry {
    fn header() -> Vec<&'static str> {
        vec!["VID", "FID", "SID", "MEMBERS"]
    }

    fn row(&self) -> Vec<String> {
        let tags: Vec<String> =
            self.member_tag.iter().map(|t| t.to_string()).collect();
        vec![
            self.vid.to_string(),
            self.fid.to_string(),
            self.sid.to_string(),
            tags.join(" "),
        ]
    }
}

pub fn add_entry(dev: &Device, entry: &VtuEntry) -> HalResult<()> {
    super::add_entry(dev, entry)
}

pub fn del_entry(dev: &Device, vid: u16) -> HalResult<()> {
    super::del_entry::<VtuEntry>(dev, vid as u32)
}

pub fn get_entry_next(dev: &Device, vid: u16) -> HalResult<Option<VtuEntry>> {
    super::get_entry_next(dev, vid as u32)
}

pub fn find_entry(dev: &Device, vid: u16) -> HalResult<Option<VtuEntry>> {
    super::find_entry(dev, vid as u32)
}

pub fn flush_all(dev: &Device) -> HalResult<()> {
    super::flush_all::<VtuEntry>(dev)
}

pub fn dump(dev: &Device) -> HalResult<Dump<'_, VtuEntry>> {
    super::dump(dev)
}

pub fn entry_count(dev: &Device) -> HalResult<usize> {
    super::entry_count::<VtuEntry>(dev)
}

/// The membership of `lport` in `vid`.  Fails with `NoSuch` if the VLAN is
/// not present.
pub fn member_tag(dev: &Device, vid: u16, lport: u8) -> HalResult<MemberTag> {
    dev.ports().to_physical(lport)?;
    let e = find_entry(dev, vid)?.ok_or(HalError::NoSuch)?;
    Ok(e.member_tag[lport as usize])
}

/// Change the membership of one port in an existing VLAN.  The lookup and
/// the reload are separate transactions.
pub fn set_member_tag(
    dev: &Device,
    vid: u16,
    lport: u8,
    tag: MemberTag,
) -> HalResult<()> {
    dev.ports().to_physical(lport)?;
    let mut e = find_entry(dev, vid)?.ok_or(HalError::NoSuch)?;
    e.member_tag[lport as usize] = tag;
    add_entry(dev, &e)
}
