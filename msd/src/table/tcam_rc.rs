// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! TCAM range comparators: each entry holds eight (selector, operator,
//! low, high) tuples whose results feed back into TCAM matching.

use strum::Display;

use common::table::TableKind;
use hal::{HalError, HalResult, PortMap};

use super::{Dump, TableEntry, TableRow};
use crate::chip::ChipConfig;
use crate::codec::tcam_rc::{self as codec, TcamRcLayout};
use crate::device::Device;
use crate::layout::{Frame, Table};

pub const RANGE_COMPARATORS: usize = 8;

/// The frame field a comparator looks at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RangeSelector {
    #[default]
    L4SrcPort = 0,
    L4DstPort = 1,
    Vid = 2,
    FrameLen = 3,
    EtherType = 4,
    IpLen = 5,
    Dscp = 6,
    IpProto = 7,
}

impl RangeSelector {
    pub fn from_bits(b: u32) -> Self {
        match b & 0x7 {
            0 => RangeSelector::L4SrcPort,
            1 => RangeSelector::L4DstPort,
            2 => RangeSelector::Vid,
            3 => RangeSelector::FrameLen,
            4 => RangeSelector::EtherType,
            5 => RangeSelector::IpLen,
            6 => RangeSelector::Dscp,
            _ => RangeSelector::IpProto,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RangeOperator {
    /// Match when low <= value <= high.
    #[default]
    Inside = 0,
    Outside = 1,
}

impl RangeOperator {
    pub fn from_bits(b: u32) -> Self {
        if b & 1 == 0 {
            RangeOperator::Inside
        } else {
            RangeOperator::Outside
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RangeComparator {
    pub selector: RangeSelector,
    pub operator: RangeOperator,
    pub low: u16,
    pub high: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TcamRcEntry {
    pub index: u32,
    pub comparators: [RangeComparator; RANGE_COMPARATORS],
}

impl TableEntry for TcamRcEntry {
    type Layout = TcamRcLayout;
    const KIND: TableKind = TableKind::TcamRc;

    fn binding(
        chip: &'static ChipConfig,
    ) -> Option<&'static Table<TcamRcLayout>> {
        chip.tcam_rc.as_ref()
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn validate(&self, _dev: &Device, _layout: &TcamRcLayout) -> HalResult<()> {
        for (i, c) in self.comparators.iter().enumerate() {
            if c.low > c.high {
                return Err(HalError::BadParam(format!(
                    "comparator {i}: low {} above high {}",
                    c.low, c.high
                )));
            }
        }
        Ok(())
    }

    fn to_physical(&self, _ports: &PortMap) -> HalResult<Self> {
        Ok(*self)
    }

    fn to_logical(self, _ports: &PortMap) -> Self {
        self
    }

    fn encode(&self, layout: &TcamRcLayout, _num_ports: u8, frame: &mut Frame) {
        codec::encode(layout, self, frame)
    }

    fn decode(
        layout: &TcamRcLayout,
        _num_ports: u8,
        index: u32,
        frame: &Frame,
    ) -> Self {
        codec::decode(layout, index, frame)
    }
}

impl TableRow for TcamRcEntry {
    fn header() -> Vec<&'static str> {
        vec!["INDEX", "COMPARATORS"]
    }

    fn row(&self) -> Vec<String> {
        let cs: Vec<String> = self
            .comparators
            .iter()
            .map(|c| {
                format!("{}:{}[{}..={}]", c.selector, c.operator, c.low, c.high)
            })
            .collect();
        vec![self.index.to_string(), cs.join(" ")]
    }
}

pub fn load_entry(dev: &Device, entry: &TcamRcEntry) -> HalResult<()> {
    super::add_entry(dev, entry)
}

pub fn flush_entry(dev: &Device, index: u32) -> HalResult<()> {
    super::del_entry::<TcamRcEntry>(dev, index)
}

pub fn read_entry(dev: &Device, index: u32) -> HalResult<Option<TcamRcEntry>> {
    super::read_entry(dev, index)
}

pub fn get_entry_next(
    dev: &Device,
    index: u32,
) -> HalResult<Option<TcamRcEntry>> {
    super::get_entry_next(dev, index)
}

pub fn find_entry(dev: &Device, index: u32) -> HalResult<Option<TcamRcEntry>> {
    super::find_entry(dev, index)
}

pub fn flush_all(dev: &Device) -> HalResult<()> {
    super::flush_all::<TcamRcEntry>(dev)
}

pub fn dump(dev: &Device) -> HalResult<Dump<'_, TcamRcEntry>> {
    super::dump(dev)
}
