// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! The ingress classifier TCAM.  Each entry matches the first 48 octets of
//! a frame, its frame type and source port, and applies an action.

use common::table::TableKind;
use hal::{HalError, HalResult, PortMap};

use super::{check_index, check_range, Dump, TableEntry, TableRow};
use crate::chip::ChipConfig;
use crate::codec::tcam::{self as codec, TcamLayout};
use crate::device::Device;
use crate::layout::{Frame, Table};

pub const TCAM_KEY_OCTETS: usize = 48;
pub const FRAME_TYPE_MAX: u8 = 3;
pub const VID_MAX: u16 = 0xfff;
pub const PRI_MAX: u8 = 7;
pub const DSCP_MAX: u8 = 0x3f;

/// Match data for one TCAM entry.  Used for both the key and its mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TcamKey {
    pub frame_type: u8,
    /// Source ports, as a bitmap of logical ports.
    pub spv: u32,
    pub frame: [u8; TCAM_KEY_OCTETS],
}

impl Default for TcamKey {
    fn default() -> Self {
        TcamKey {
            frame_type: 0,
            spv: 0,
            frame: [0; TCAM_KEY_OCTETS],
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TcamAction {
    /// Continue matching at `next_id` instead of stopping here.
    pub continue_next: bool,
    pub next_id: u8,
    pub interrupt: bool,
    pub inc_counter: bool,
    pub vid_override: Option<u16>,
    pub fpri_override: Option<u8>,
    pub qpri_override: Option<u8>,
    pub dscp_override: Option<u8>,
    /// Destination ports, as a bitmap of logical ports.
    pub dpv_override: Option<u32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TcamEntry {
    pub index: u32,
    pub key: TcamKey,
    pub mask: TcamKey,
    pub action: TcamAction,
}

fn check_bitmap(what: &str, ports: &PortMap, bitmap: u32) -> HalResult<()> {
    let max = (1u64 << ports.len()) - 1;
    check_range(what, bitmap, max as u32)
}

impl TableEntry for TcamEntry {
    type Layout = TcamLayout;
    const KIND: TableKind = TableKind::Tcam;

    fn binding(
        chip: &'static ChipConfig,
    ) -> Option<&'static Table<TcamLayout>> {
        chip.tcam.as_ref()
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn validate(&self, dev: &Device, _layout: &TcamLayout) -> HalResult<()> {
        let ports = dev.ports();
        let a = &self.action;
        let ft_max = FRAME_TYPE_MAX as u32;
        check_range("frame type", self.key.frame_type as u32, ft_max)?;
        check_range("frame type mask", self.mask.frame_type as u32, ft_max)?;
        check_bitmap("spv", ports, self.key.spv)?;
        check_bitmap("spv mask", ports, self.mask.spv)?;
        if let Some(v) = a.vid_override {
            check_range("vid", v as u32, VID_MAX as u32)?;
        }
        if let Some(p) = a.fpri_override {
            check_range("fpri", p as u32, PRI_MAX as u32)?;
        }
        if let Some(p) = a.qpri_override {
            check_range("qpri", p as u32, PRI_MAX as u32)?;
        }
        if let Some(d) = a.dscp_override {
            check_range("dscp", d as u32, DSCP_MAX as u32)?;
        }
        if let Some(d) = a.dpv_override {
            check_bitmap("dpv", ports, d)?;
        }
        Ok(())
    }

    fn to_physical(&self, ports: &PortMap) -> HalResult<Self> {
        let mut e = *self;
        e.key.spv = ports.bitmap_to_physical(self.key.spv)?;
        e.mask.spv = ports.bitmap_to_physical(self.mask.spv)?;
        e.action.dpv_override = self
            .action
            .dpv_override
            .map(|d| ports.bitmap_to_physical(d))
            .transpose()?;
        Ok(e)
    }

    fn to_logical(mut self, ports: &PortMap) -> Self {
        self.key.spv = ports.bitmap_to_logical(self.key.spv);
        self.mask.spv = ports.bitmap_to_logical(self.mask.spv);
        self.action.dpv_override =
            self.action.dpv_override.map(|d| ports.bitmap_to_logical(d));
        self
    }

    fn encode(&self, layout: &TcamLayout, _num_ports: u8, frame: &mut Frame) {
        codec::encode(layout, self, frame)
    }

    fn decode(
        layout: &TcamLayout,
        _num_ports: u8,
        index: u32,
        frame: &Frame,
    ) -> Self {
        codec::decode(layout, index, frame)
    }
}

impl TableRow for TcamEntry {
    fn header() -> Vec<&'static str> {
        vec!["INDEX", "FT", "SPV", "MASKED OCTETS", "NEXT", "DPV"]
    }

    fn row(&self) -> Vec<String> {
        let masked = self.mask.frame.iter().filter(|m| **m != 0).count();
        let next = if self.action.continue_next {
            self.action.next_id.to_string()
        } else {
            "-".to_string()
        };
        let dpv = self
            .action
            .dpv_override
            .map(|d| format!("{d:#x}"))
            .unwrap_or_else(|| "-".to_string());
        vec![
            self.index.to_string(),
            format!("{}/{}", self.key.frame_type, self.mask.frame_type),
            format!("{:#x}/{:#x}", self.key.spv, self.mask.spv),
            masked.to_string(),
            next,
            dpv,
        ]
    }
}

pub fn load_entry(dev: &Device, entry: &TcamEntry) -> HalResult<()> {
    super::add_entry(dev, entry)
}

pub fn flush_entry(dev: &Device, index: u32) -> HalResult<()> {
    super::del_entry::<TcamEntry>(dev, index)
}

pub fn read_entry(dev: &Device, index: u32) -> HalResult<Option<TcamEntry>> {
    super::read_entry(dev, index)
}

pub fn get_entry_next(
    dev: &Device,
    index: u32,
) -> HalResult<Option<TcamEntry>> {
    super::get_entry_next(dev, index)
}

pub fn find_entry(dev: &Device, index: u32) -> HalResult<Option<TcamEntry>> {
    super::find_entry(dev, index)
}

pub fn flush_all(dev: &Device) -> HalResult<()> {
    super::flush_all::<TcamEntry>(dev)
}

pub fn dump(dev: &Device) -> HalResult<Dump<'_, TcamEntry>> {
    super::dump(dev)
}

/// Copy the entry at `src` to `dst`.  Fails with `NoSuch` if `src` is not
/// valid.
pub fn copy_entry(dev: &Device, src: u32, dst: u32) -> HalResult<()> {
    let t = super::binding::<TcamEntry>(dev)?;
    check_index(&t.spec, dst)?;
    let mut e = read_entry(dev, src)?.ok_or(HalError::NoSuch)?;
    e.index = dst;
    load_entry(dev, &e)
}
