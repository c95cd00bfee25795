// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! Frame replication and elimination for reliability (802.1CB).  Two banks
//! share one table engine: sequence recovery and sequence generation.
//! Neither supports get-next, so find and dump report `NotSupported`.

use strum::Display;

use common::table::TableKind;
use hal::{HalResult, PortMap};

use super::{check_range, TableEntry};
use crate::chip::ChipConfig;
use crate::codec::frer::{self as codec, RecoveryLayout, SeqGenLayout};
use crate::device::Device;
use crate::layout::{Frame, Table};

pub const HISTORY_LEN_MAX: u8 = 31;
pub const RESET_TIME_MAX: u16 = 0xfff;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RecoveryAlgorithm {
    #[default]
    Vector = 0,
    Match = 1,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrerCounters {
    pub passed: u32,
    pub discarded: u32,
    pub out_of_order: u32,
    pub rogue: u32,
    pub lost: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrerRecoveryEntry {
    pub index: u32,
    /// Accept frames without a sequence tag.
    pub take_no_seq: bool,
    pub individual: bool,
    pub latent_error_detect: bool,
    pub algorithm: RecoveryAlgorithm,
    pub history_len: u8,
    /// Sequence recovery reset timeout, in milliseconds.
    pub reset_time: u16,
    pub seq_num: u16,
    pub counters: FrerCounters,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrerSeqGenEntry {
    pub index: u32,
    pub next_seq: u16,
}

impl TableEntry for FrerRecoveryEntry {
    type Layout = RecoveryLayout;
    const KIND: TableKind = TableKind::FrerRecovery;

    fn binding(
        chip: &'static ChipConfig,
    ) -> Option<&'static Table<RecoveryLayout>> {
        chip.frer_recovery.as_ref()
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn validate(
        &self,
        _dev: &Device,
        _layout: &RecoveryLayout,
    ) -> HalResult<()> {
        check_range(
            "history length",
            self.history_len as u32,
            HISTORY_LEN_MAX as u32,
        )?;
        check_range(
            "reset time",
            self.reset_time as u32,
            RESET_TIME_MAX as u32,
        )
    }

    fn to_physical(&self, _ports: &PortMap) -> HalResult<Self> {
        Ok(*self)
    }

    fn to_logical(self, _ports: &PortMap) -> Self {
        self
    }

    fn encode(
        &self,
        layout: &RecoveryLayout,
        _num_ports: u8,
        frame: &mut Frame,
    ) {
        codec::encode_recovery(layout, self, frame)
    }

    fn decode(
        layout: &RecoveryLayout,
        _num_ports: u8,
        index: u32,
        frame: &Frame,
    ) -> Self {
        codec::decode_recovery(layout, index, frame)
    }
}

impl TableEntry for FrerSeqGenEntry {
    type Layout = SeqGenLayout;
    const KIND: TableKind = TableKind::FrerSeqGen;

    fn binding(
        chip: &'static ChipConfig,
    ) -> Option<&'static Table<SeqGenLayout>> {
        chip.frer_seq_gen.as_ref()
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn validate(&self, _dev: &Device, _layout: &SeqGenLayout) -> HalResult<()> {
        Ok(())
    }

    fn to_physical(&self, _ports: &PortMap) -> HalResult<Self> {
        Ok(*self)
    }

    fn to_logical(self, _ports: &PortMap) -> Self {
        self
    }

    fn encode(&self, layout: &SeqGenLayout, _num_ports: u8, frame: &mut Frame) {
        codec::encode_seq_gen(layout, self, frame)
    }

    fn decode(
        layout: &SeqGenLayout,
        _num_ports: u8,
        index: u32,
        frame: &Frame,
    ) -> Self {
        codec::decode_seq_gen(layout, index, frame)
    }
}

pub fn load_recovery(dev: &Device, entry: &FrerRecoveryEntry) -> HalResult<()> {
    super::add_entry(dev, entry)
}

pub fn read_recovery(
    dev: &Device,
    index: u32,
) -> HalResult<Option<FrerRecoveryEntry>> {
    super::read_entry(dev, index)
}

pub fn del_recovery(dev: &Device, index: u32) -> HalResult<()> {
    super::del_entry::<FrerRecoveryEntry>(dev, index)
}

pub fn flush_recovery(dev: &Device) -> HalResult<()> {
    super::flush_all::<FrerRecoveryEntry>(dev)
}

pub fn load_seq_gen(dev: &Device, entry: &FrerSeqGenEntry) -> HalResult<()> {
    super::add_entry(dev, entry)
}

pub fn read_seq_gen(
    dev: &Device,
    index: u32,
) -> HalResult<Option<FrerSeqGenEntry>> {
    super::read_entry(dev, index)
}

pub fn del_seq_gen(dev: &Device, index: u32) -> HalResult<()> {
    super::del_entry::<FrerSeqGenEntry>(dev, index)
}

pub fn flush_seq_gen(dev: &Device) -> HalResult<()> {
    super::flush_all::<FrerSeqGenEntry>(dev)
}
