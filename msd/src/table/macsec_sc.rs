// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! MACsec secure channels.  A channel binds an SCI to a port and direction
//! and carries the per-channel protection policy.  Its associations live in
//! the SA table, which has an engine and lock of its own.

use strum::Display;

use common::table::TableKind;
use hal::{HalResult, PortMap};

use super::macsec::AN_MAX;
use super::{check_range, Dump, TableEntry, TableRow};
use crate::chip::ChipConfig;
use crate::codec::macsec_sc::{self as codec, ScLayout};
use crate::device::Device;
use crate::layout::{Frame, Table};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ScDirection {
    #[default]
    Tx = 0,
    Rx = 1,
}

/// How strictly received frames are validated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ValidateFrames {
    Disabled = 0,
    Check = 1,
    #[default]
    Strict = 2,
}

impl ValidateFrames {
    pub fn from_bits(b: u32) -> Self {
        match b & 0x3 {
            0 => ValidateFrames::Disabled,
            1 => ValidateFrames::Check,
            _ => ValidateFrames::Strict,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MacsecScEntry {
    pub index: u32,
    /// Secure channel identifier: the MAC address and port identifier of
    /// the transmitting station.
    pub sci: u64,
    /// Logical port.
    pub port: u8,
    pub direction: ScDirection,
    /// Association number used for transmit.
    pub encoding_an: u8,
    pub protect_frames: bool,
    pub replay_protect: bool,
    pub validate_frames: ValidateFrames,
    pub replay_window: u32,
}

impl TableEntry for MacsecScEntry {
    type Layout = ScLayout;
    const KIND: TableKind = TableKind::MacsecSc;

    fn binding(chip: &'static ChipConfig) -> Option<&'static Table<ScLayout>> {
        chip.macsec_sc.as_ref()
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn validate(&self, _dev: &Device, _layout: &ScLayout) -> HalResult<()> {
        check_range(
            "association number",
            self.encoding_an as u32,
            AN_MAX as u32,
        )
    }

    fn to_physical(&self, ports: &PortMap) -> HalResult<Self> {
        Ok(MacsecScEntry {
            port: ports.to_physical(self.port)?,
            ..*self
        })
    }

    fn to_logical(self, ports: &PortMap) -> Self {
        // An unmapped physical port is reported as read.
        match ports.to_logical(self.port) {
            Ok(port) => MacsecScEntry { port, ..self },
            Err(_) => self,
        }
    }

    fn encode(&self, layout: &ScLayout, _num_ports: u8, frame: &mut Frame) {
        codec::encode(layout, self, frame)
    }

    fn decode(
        layout: &ScLayout,
        _num_ports: u8,
        index: u32,
        frame: &Frame,
    ) -> Self {
        codec::decode(layout, index, frame)
    }
}

impl TableRow for MacsecScEntry {
    fn header() -> Vec<&'static str> {
        vec!["INDEX", "SCI", "PORT", "DIR", "AN", "VALIDATE", "WINDOW"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.index.to_string(),
            format!("{:#018x}", self.sci),
            self.port.to_string(),
            self.direction.to_string(),
            self.encoding_an.to_string(),
            self.validate_frames.to_string(),
            self.replay_window.to_string(),
        ]
    }
}

pub fn load_sc(dev: &Device, entry: &MacsecScEntry) -> HalResult<()> {
    super::add_entry(dev, entry)
}

pub fn read_sc(dev: &Device, index: u32) -> HalResult<Option<MacsecScEntry>> {
    super::read_entry(dev, index)
}

pub fn del_sc(dev: &Device, index: u32) -> HalResult<()> {
    super::del_entry::<MacsecScEntry>(dev, index)
}

pub fn get_sc_next(
    dev: &Device,
    index: u32,
) -> HalResult<Option<MacsecScEntry>> {
    super::get_entry_next(dev, index)
}

/// The channel carrying `sci`, if one is loaded.
pub fn find_sc_by_sci(
    dev: &Device,
    sci: u64,
) -> HalResult<Option<MacsecScEntry>> {
    for e in dump(dev)? {
        let e = e?;
        if e.sci == sci {
            return Ok(Some(e));
        }
    }
    Ok(None)
}

pub fn flush_all(dev: &Device) -> HalResult<()> {
    super::flush_all::<MacsecScEntry>(dev)
}

pub fn dump(dev: &Device) -> HalResult<Dump<'_, MacsecScEntry>> {
    super::dump(dev)
}
