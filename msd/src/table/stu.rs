// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! The spanning tree unit: a 2-bit forwarding state per port for each
//! spanning tree instance (SID).

use strum::Display;

use common::table::TableKind;
use hal::{HalResult, PortMap};

use super::{check_ports, Dump, TableEntry, TableRow};
use crate::chip::ChipConfig;
use crate::codec::stu::{self as codec, StuLayout};
use crate::device::Device;
use crate::layout::{Frame, Table};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PortState {
    #[default]
    Disabled = 0,
    Blocking = 1,
    Learning = 2,
    Forwarding = 3,
}

impl PortState {
    pub fn from_bits(b: u32) -> Self {
        match b & 0x3 {
            0 => PortState::Disabled,
            1 => PortState::Blocking,
            2 => PortState::Learning,
            _ => PortState::Forwarding,
        }
    }

    pub fn bits(self) -> u32 {
        self as u32
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StuEntry {
    pub sid: u8,
    /// Indexed by logical port.
    pub port_state: Vec<PortState>,
}

impl StuEntry {
    /// An entry with every port disabled.
    pub fn new(dev: &Device, sid: u8) -> Self {
        StuEntry {
            sid,
            port_state: vec![PortState::Disabled; dev.ports().len()],
        }
    }
}

impl TableEntry for StuEntry {
    type Layout = StuLayout;
    const KIND: TableKind = TableKind::Stu;

    fn binding(chip: &'static ChipConfig) -> Option<&'static Table<StuLayout>> {
        chip.stu.as_ref()
    }

    fn index(&self) -> u32 {
        self.sid as u32
    }

    fn validate(&self, dev: &Device, _layout: &StuLayout) -> HalResult<()> {
        check_ports("port state", dev.ports(), &self.port_state)
    }

    fn to_physical(&self, ports: &PortMap) -> HalResult<Self> {
        Ok(StuEntry {
            sid: self.sid,
            port_state: ports.slots_to_physical(&self.port_state)?,
        })
    }

    fn to_logical(self, ports: &PortMap) -> Self {
        StuEntry {
            sid: self.sid,
            port_state: ports.slots_to_logical(&self.port_state),
        }
    }

    fn encode(&self, layout: &StuLayout, num_ports: u8, frame: &mut Frame) {
        codec::encode(layout, num_ports, self, frame)
    }

    fn decode(
        layout: &StuLayout,
        num_ports: u8,
        index: u32,
        frame: &Frame,
    ) -> Self {
        codec::decode(layout, num_ports, index as u8, frame)
    }
}

impl TableRow for StuEntry {
    fn header() -> Vec<&'static str> {
        vec!["SID", "PORT STATES"]
    }

    fn row(&self) -> Vec<String> {
        let states: Vec<String> =
            self.port_state.iter().map(|s| s.to_string()).collect();
        vec![self.sid.to_string(), states.join(" ")]
    }
}

pub fn add_entry(dev: &Device, entry: &StuEntry) -> HalResult<()> {
    super::add_entry(dev, entry)
}

pub fn del_entry(dev: &Device, sid: u8) -> HalResult<()> {
    super::del_entry::<StuEntry>(dev, sid as u32)
}

pub fn get_entry_next(dev: &Device, sid: u8) -> HalResult<Option<StuEntry>> {
    super::get_entry_next(dev, sid as u32)
}

pub fn find_entry(dev: &Device, sid: u8) -> HalResult<Option<StuEntry>> {
    super::find_entry(dev, sid as u32)
}

pub fn dump(dev: &Device) -> HalResult<Dump<'_, StuEntry>> {
    super::dump(dev)
}

pub fn entry_count(dev: &Device) -> HalResult<usize> {
    super::entry_count::<StuEntry>(dev)
}
