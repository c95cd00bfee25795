// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! The routing ARP table.  An entry either replaces the destination MAC of
//! unicast routed frames, or gives the number of copies of a multicast
//! frame sent out each port.  Reads return raw bytes, since the hardware
//! does not remember which form was loaded.

use common::network::MacAddr;
use hal::{HalError, HalResult};

use super::{check_index, check_ports};
use crate::codec::arp::{self as codec, ArpLayout, MAX_DUP_COUNT};
use crate::device::Device;
use crate::engine::Engine;
use crate::layout::{Frame, Table};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArpData {
    Unicast(MacAddr),
    /// Duplication count per logical port.
    Multicast(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArpEntry {
    pub index: u32,
    pub data: ArpData,
}

fn binding(dev: &Device) -> HalResult<&'static Table<ArpLayout>> {
    dev.chip().arp.as_ref().ok_or_else(|| {
        HalError::NotSupported(format!("arp table on {}", dev.family()))
    })
}

fn load(
    dev: &Device,
    t: &Table<ArpLayout>,
    index: u32,
    frame: &Frame,
) -> HalResult<()> {
    Engine::new(dev, &t.spec).load_entry(index, frame)
}

/// Load a unicast replacement MAC at `index`.
pub fn load_uc_entry(dev: &Device, index: u32, mac: MacAddr) -> HalResult<()> {
    let t = binding(dev)?;
    check_index(&t.spec, index)?;
    let mut frame = Frame::new(t.spec.data.words());
    codec::encode_unicast(&t.layout, mac, &mut frame);
    load(dev, t, index, &frame)
}

/// Load per-port multicast duplication counts, indexed by logical port.
pub fn load_mc_entry(dev: &Device, index: u32, counts: &[u8]) -> HalResult<()> {
    let t = binding(dev)?;
    check_index(&t.spec, index)?;
    check_ports("duplication counts", dev.ports(), counts)?;
    if let Some(c) = counts.iter().find(|c| **c > MAX_DUP_COUNT) {
        return Err(HalError::BadParam(format!(
            "duplication count {c} exceeds {MAX_DUP_COUNT}"
        )));
    }
    let phys = dev.ports().slots_to_physical(counts)?;
    let mut frame = Frame::new(t.spec.data.words());
    let num_phys = dev.ports().num_phys();
    codec::encode_multicast(&t.layout, num_phys, &phys, &mut frame);
    load(dev, t, index, &frame)
}

pub fn load_entry(dev: &Device, entry: &ArpEntry) -> HalResult<()> {
    match &entry.data {
        ArpData::Unicast(mac) => load_uc_entry(dev, entry.index, *mac),
        ArpData::Multicast(counts) => load_mc_entry(dev, entry.index, counts),
    }
}

/// The raw bytes of the entry at `index`, or `None` if it is not valid.
pub fn read_entry(dev: &Device, index: u32) -> HalResult<Option<[u8; 6]>> {
    let t = binding(dev)?;
    check_index(&t.spec, index)?;
    let (valid, frame) = Engine::new(dev, &t.spec).read_entry(index)?;
    Ok(valid.then(|| codec::decode(&t.layout, &frame)))
}

pub fn read_uc_entry(dev: &Device, index: u32) -> HalResult<Option<MacAddr>> {
    Ok(read_entry(dev, index)?.map(MacAddr::from))
}

/// Duplication counts per logical port.
pub fn read_mc_entry(dev: &Device, index: u32) -> HalResult<Option<Vec<u8>>> {
    let t = binding(dev)?;
    Ok(read_entry(dev, index)?.map(|raw| {
        let num_phys = dev.ports().num_phys();
        let phys = codec::multicast_counts(&t.layout, num_phys, raw);
        dev.ports().slots_to_logical(&phys)
    }))
}

pub fn flush_entry(dev: &Device, index: u32) -> HalResult<()> {
    let t = binding(dev)?;
    check_index(&t.spec, index)?;
    Engine::new(dev, &t.spec).flush_entry(index)
}

pub fn flush_all(dev: &Device) -> HalResult<()> {
    Engine::new(dev, &binding(dev)?.spec).flush_all()
}
