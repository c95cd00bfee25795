// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! The table API.  Requests are validated here before anything touches the
//! hardware: index bounds, field ranges and port numbers are all checked
//! ahead of taking the table lock.  Entries are translated between logical
//! and physical ports, packed by the codec, and handed to the engine.

use std::io::Write;
use std::marker::PhantomData;

use tabwriter::TabWriter;

use common::table::TableKind;
use hal::{HalError, HalResult, PortMap};

use crate::chip::ChipConfig;
use crate::device::Device;
use crate::engine::Engine;
use crate::layout::{Frame, Table, TableSpec};

pub mod arp;
pub mod frer;
pub mod macsec;
pub mod macsec_sc;
pub mod pirl;
pub mod qos;
pub mod stu;
pub mod tcam;
pub mod tcam_rc;
pub mod vtu;

/// An entry type with a generic add/read/get-next life cycle.
pub trait TableEntry: Clone + Sized {
    type Layout: 'static;
    const KIND: TableKind;

    /// This table's binding on a chip, if the chip has one.
    fn binding(
        chip: &'static ChipConfig,
    ) -> Option<&'static Table<Self::Layout>>;

    fn index(&self) -> u32;

    /// Check every field other than the index against its domain.
    fn validate(&self, dev: &Device, layout: &Self::Layout) -> HalResult<()>;

    /// The same entry with per-port data in physical port order.
    fn to_physical(&self, ports: &PortMap) -> HalResult<Self>;

    /// The same entry with per-port data in logical port order.
    fn to_logical(self, ports: &PortMap) -> Self;

    fn encode(&self, layout: &Self::Layout, num_ports: u8, frame: &mut Frame);

    fn decode(
        layout: &Self::Layout,
        num_ports: u8,
        index: u32,
        frame: &Frame,
    ) -> Self;
}

/// Column layout for a tabular dump of a table.
pub trait TableRow {
    fn header() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

pub(crate) fn binding<E: TableEntry>(
    dev: &Device,
) -> HalResult<&'static Table<E::Layout>> {
    E::binding(dev.chip()).ok_or_else(|| {
        HalError::NotSupported(format!(
            "{} table on {}",
            E::KIND,
            dev.family()
        ))
    })
}

pub(crate) fn check_index(spec: &TableSpec, index: u32) -> HalResult<()> {
    if index > spec.max_index {
        return Err(HalError::BadParam(format!(
            "{} index {index:#x} exceeds {:#x}",
            spec.kind, spec.max_index
        )));
    }
    Ok(())
}

pub(crate) fn check_range(what: &str, v: u32, max: u32) -> HalResult<()> {
    if v > max {
        return Err(HalError::BadParam(format!(
            "{what} {v:#x} exceeds {max:#x}"
        )));
    }
    Ok(())
}

/// Per-port data must cover exactly the logical ports of the device.
pub(crate) fn check_ports<T>(
    what: &str,
    ports: &PortMap,
    v: &[T],
) -> HalResult<()> {
    if v.len() != ports.len() {
        return Err(HalError::BadParam(format!(
            "{what} has {} ports, device has {}",
            v.len(),
            ports.len()
        )));
    }
    Ok(())
}

pub(crate) fn encode_entry<E: TableEntry>(
    dev: &Device,
    t: &Table<E::Layout>,
    entry: &E,
) -> HalResult<Frame> {
    check_index(&t.spec, entry.index())?;
    entry.validate(dev, &t.layout)?;
    let phys = entry.to_physical(dev.ports())?;
    let mut frame = Frame::new(t.spec.data.words());
    phys.encode(&t.layout, dev.ports().num_phys(), &mut frame);
    Ok(frame)
}

fn decode_entry<E: TableEntry>(
    dev: &Device,
    t: &Table<E::Layout>,
    index: u32,
    frame: &Frame,
) -> E {
    E::decode(&t.layout, dev.ports().num_phys(), index, frame)
        .to_logical(dev.ports())
}

/// Create or replace an entry.
pub fn add_entry<E: TableEntry>(dev: &Device, entry: &E) -> HalResult<()> {
    let t = binding::<E>(dev)?;
    let frame = encode_entry(dev, t, entry)?;
    Engine::new(dev, &t.spec).load_entry(entry.index(), &frame)
}

/// Invalidate the entry at `index`.  Deleting an absent entry succeeds.
pub fn del_entry<E: TableEntry>(dev: &Device, index: u32) -> HalResult<()> {
    let t = binding::<E>(dev)?;
    check_index(&t.spec, index)?;
    Engine::new(dev, &t.spec).flush_entry(index)
}

/// Read the entry at `index` directly.  Returns `None` if it is not valid.
pub fn read_entry<E: TableEntry>(
    dev: &Device,
    index: u32,
) -> HalResult<Option<E>> {
    let t = binding::<E>(dev)?;
    check_index(&t.spec, index)?;
    let (valid, frame) = Engine::new(dev, &t.spec).read_entry(index)?;
    Ok(valid.then(|| decode_entry(dev, t, index, &frame)))
}

/// Invalidate every entry in the table.
pub fn flush_all<E: TableEntry>(dev: &Device) -> HalResult<()> {
    let t = binding::<E>(dev)?;
    Engine::new(dev, &t.spec).flush_all()
}

fn next_in<E: TableEntry>(
    dev: &Device,
    t: &Table<E::Layout>,
    start: u32,
) -> HalResult<Option<E>> {
    let max = t.spec.max_index;
    let next = Engine::new(dev, &t.spec).get_next(start)?;
    match (next.valid, next.frame) {
        (true, Some(frame)) => {
            Ok(Some(decode_entry(dev, t, next.index, &frame)))
        }
        _ => {
            if next.index != max {
                slog::warn!(dev.log(),
                    "get-next reported an invalid entry below the max index";
                    "table" => E::KIND.to_string(),
                    "index" => next.index);
            }
            Ok(None)
        }
    }
}

/// The first valid entry after `start`, wrapping past the max index.
/// `None` means the table has no more entries.
pub fn get_entry_next<E: TableEntry>(
    dev: &Device,
    start: u32,
) -> HalResult<Option<E>> {
    let t = binding::<E>(dev)?;
    check_index(&t.spec, start)?;
    next_in(dev, t, start)
}

/// Look up the entry at exactly `index`.
pub fn find_entry<E: TableEntry>(
    dev: &Device,
    index: u32,
) -> HalResult<Option<E>> {
    let t = binding::<E>(dev)?;
    check_index(&t.spec, index)?;
    let start = if index == 0 {
        t.spec.max_index
    } else {
        index - 1
    };
    Ok(next_in::<E>(dev, t, start)?.filter(|e| e.index() == index))
}

/// Walk a table in ascending index order.  The walk ends when the engine
/// reports no more entries, after the entry at the max index, if an index
/// fails to ascend, or after `max_index + 2` get-next operations.
pub struct Dump<'a, E: TableEntry> {
    dev: &'a Device,
    table: &'static Table<E::Layout>,
    start: u32,
    last: Option<u32>,
    calls: u64,
    done: bool,
    _entry: PhantomData<E>,
}

pub fn dump<E: TableEntry>(dev: &Device) -> HalResult<Dump<'_, E>> {
    let table = binding::<E>(dev)?;
    Ok(Dump {
        dev,
        table,
        start: table.spec.max_index,
        last: None,
        calls: 0,
        done: false,
        _entry: PhantomData,
    })
}

impl<E: TableEntry> Iterator for Dump<'_, E> {
    type Item = HalResult<E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let max = self.table.spec.max_index;
        if self.calls >= max as u64 + 2 {
            slog::warn!(self.dev.log(), "dump iteration limit reached";
                "table" => E::KIND.to_string());
            self.done = true;
            return None;
        }
        self.calls += 1;

        let entry = match next_in::<E>(self.dev, self.table, self.start) {
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
            Ok(None) => {
                self.done = true;
                return None;
            }
            Ok(Some(entry)) => entry,
        };

        let index = entry.index();
        if matches!(self.last, Some(last) if index <= last) {
            slog::warn!(self.dev.log(), "dump index did not ascend";
                "table" => E::KIND.to_string(),
                "index" => index);
            self.done = true;
            return None;
        }
        self.last = Some(index);
        self.start = index;
        if index == max {
            self.done = true;
        }
        Some(Ok(entry))
    }
}

/// Number of valid entries in the table.
pub fn entry_count<E: TableEntry>(dev: &Device) -> HalResult<usize> {
    let mut n = 0;
    for e in dump::<E>(dev)? {
        e?;
        n += 1;
    }
    Ok(n)
}

/// Write every valid entry to `out` as aligned text.  Returns the number of
/// entries written.
pub fn write_dump<E, W>(dev: &Device, out: W) -> HalResult<usize>
where
    E: TableEntry + TableRow,
    W: Write,
{
    let io = |e: std::io::Error| HalError::Internal(format!("dump: {e}"));
    let mut tw = TabWriter::new(out);
    writeln!(tw, "{}", E::header().join("\t")).map_err(io)?;
    let mut n = 0;
    for e in dump::<E>(dev)? {
        writeln!(tw, "{}", e?.row().join("\t")).map_err(io)?;
        n += 1;
    }
    tw.flush().map_err(io)?;
    Ok(n)
}

/// An entry of any table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnyEntry {
    Stu(stu::StuEntry),
    Vtu(vtu::VtuEntry),
    Arp(arp::ArpEntry),
    Tcam(tcam::TcamEntry),
    TcamRc(tcam_rc::TcamRcEntry),
    Pirl(pirl::PirlEntry),
    FrerRecovery(frer::FrerRecoveryEntry),
    FrerSeqGen(frer::FrerSeqGenEntry),
    MacsecSa(macsec::MacsecSaEntry),
    MacsecSc(macsec_sc::MacsecScEntry),
    QosWeight(qos::QosWeightEntry),
}

impl AnyEntry {
    pub fn kind(&self) -> TableKind {
        match self {
            AnyEntry::Stu(_) => TableKind::Stu,
            AnyEntry::Vtu(_) => TableKind::Vtu,
            AnyEntry::Arp(_) => TableKind::Arp,
            AnyEntry::Tcam(_) => TableKind::Tcam,
            AnyEntry::TcamRc(_) => TableKind::TcamRc,
            AnyEntry::Pirl(_) => TableKind::Pirl,
            AnyEntry::FrerRecovery(_) => TableKind::FrerRecovery,
            AnyEntry::FrerSeqGen(_) => TableKind::FrerSeqGen,
            AnyEntry::MacsecSa(_) => TableKind::MacsecSa,
            AnyEntry::MacsecSc(_) => TableKind::MacsecSc,
            AnyEntry::QosWeight(_) => TableKind::QosWeight,
        }
    }

    /// Write the entry into its table.
    pub fn load(&self, dev: &Device) -> HalResult<()> {
        match self {
            AnyEntry::Stu(e) => add_entry(dev, e),
            AnyEntry::Vtu(e) => add_entry(dev, e),
            AnyEntry::Arp(e) => arp::load_entry(dev, e),
            AnyEntry::Tcam(e) => add_entry(dev, e),
            AnyEntry::TcamRc(e) => add_entry(dev, e),
            AnyEntry::Pirl(e) => {
                pirl::write_resource(dev, e.port, e.resource, &e.data)
            }
            AnyEntry::FrerRecovery(e) => add_entry(dev, e),
            AnyEntry::FrerSeqGen(e) => add_entry(dev, e),
            AnyEntry::MacsecSa(e) => add_entry(dev, e),
            AnyEntry::MacsecSc(e) => add_entry(dev, e),
            AnyEntry::QosWeight(e) => add_entry(dev, e),
        }
    }
}
