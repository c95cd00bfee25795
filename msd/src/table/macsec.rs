// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! MACsec secure associations.  Key material is written and read like any
//! other field but never appears in dumps or debug output.

use std::fmt;

use strum::Display;

use common::table::TableKind;
use hal::{HalResult, PortMap};

use super::{check_range, Dump, TableEntry, TableRow};
use crate::chip::ChipConfig;
use crate::codec::macsec::{self as codec, SaLayout};
use crate::device::Device;
use crate::layout::{Frame, Table};

pub const KEY_LEN: usize = 32;
pub const SALT_LEN: usize = 12;
pub const AN_MAX: u8 = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
pub enum CipherSuite {
    #[default]
    #[strum(serialize = "GCM-AES-128")]
    GcmAes128 = 0,
    #[strum(serialize = "GCM-AES-256")]
    GcmAes256 = 1,
    #[strum(serialize = "GCM-AES-XPN-128")]
    GcmAesXpn128 = 2,
    #[strum(serialize = "GCM-AES-XPN-256")]
    GcmAesXpn256 = 3,
}

impl CipherSuite {
    pub fn from_bits(b: u32) -> Self {
        match b & 0x3 {
            0 => CipherSuite::GcmAes128,
            1 => CipherSuite::GcmAes256,
            2 => CipherSuite::GcmAesXpn128,
            _ => CipherSuite::GcmAesXpn256,
        }
    }

    /// Extended packet numbering uses all 64 bits of the packet number.
    pub fn is_xpn(&self) -> bool {
        matches!(self, CipherSuite::GcmAesXpn128 | CipherSuite::GcmAesXpn256)
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct MacsecSaEntry {
    pub index: u32,
    pub cipher: CipherSuite,
    /// Association number.
    pub an: u8,
    pub ssci: u32,
    pub next_pn: u64,
    /// 128-bit suites use the first 16 octets.
    pub key: [u8; KEY_LEN],
    pub salt: [u8; SALT_LEN],
}

impl fmt::Debug for MacsecSaEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MacsecSaEntry")
            .field("index", &self.index)
            .field("cipher", &self.cipher)
            .field("an", &self.an)
            .field("ssci", &self.ssci)
            .field("next_pn", &self.next_pn)
            .field("key", &"<redacted>")
            .field("salt", &"<redacted>")
            .finish()
    }
}

impl TableEntry for MacsecSaEntry {
    type Layout = SaLayout;
    const KIND: TableKind = TableKind::MacsecSa;

    fn binding(chip: &'static ChipConfig) -> Option<&'static Table<SaLayout>> {
        chip.macsec_sa.as_ref()
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn validate(&self, _dev: &Device, _layout: &SaLayout) -> HalResult<()> {
        check_range("association number", self.an as u32, AN_MAX as u32)?;
        if !self.cipher.is_xpn() {
            check_range("packet number", (self.next_pn >> 32) as u32, 0)?;
        }
        Ok(())
    }

    fn to_physical(&self, _ports: &PortMap) -> HalResult<Self> {
        Ok(*self)
    }

    fn to_logical(self, _ports: &PortMap) -> Self {
        self
    }

    fn encode(&self, layout: &SaLayout, _num_ports: u8, frame: &mut Frame) {
        codec::encode(layout, self, frame)
    }

    fn decode(
        layout: &SaLayout,
        _num_ports: u8,
        index: u32,
        frame: &Frame,
    ) -> Self {
        codec::decode(layout, index, frame)
    }
}

impl TableRow for MacsecSaEntry {
    fn header() -> Vec<&'static str> {
        vec!["INDEX", "CIPHER", "AN", "SSCI", "NEXT PN"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.index.to_string(),
            self.cipher.to_string(),
            self.an.to_string(),
            format!("{:#010x}", self.ssci),
            self.next_pn.to_string(),
        ]
    }
}

pub fn load_sa(dev: &Device, entry: &MacsecSaEntry) -> HalResult<()> {
    super::add_entry(dev, entry)
}

pub fn read_sa(dev: &Device, index: u32) -> HalResult<Option<MacsecSaEntry>> {
    super::read_entry(dev, index)
}

pub fn del_sa(dev: &Device, index: u32) -> HalResult<()> {
    super::del_entry::<MacsecSaEntry>(dev, index)
}

pub fn get_sa_next(
    dev: &Device,
    index: u32,
) -> HalResult<Option<MacsecSaEntry>> {
    super::get_entry_next(dev, index)
}

pub fn find_sa(dev: &Device, index: u32) -> HalResult<Option<MacsecSaEntry>> {
    super::find_entry(dev, index)
}

pub fn flush_all(dev: &Device) -> HalResult<()> {
    super::flush_all::<MacsecSaEntry>(dev)
}

pub fn dump(dev: &Device) -> HalResult<Dump<'_, MacsecSaEntry>> {
    super::dump(dev)
}
