// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! A simulated switch: a register file plus a model of each table engine on
//! the chip.  Writing an operation register with the busy bit set runs the
//! operation immediately; the busy bit can be made to linger for a number
//! of polls, or forever.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

use common::table::TableKind;
use hal::{DevNum, HalResult, RegAccess};

use crate::chip::{ChipConfig, ChipFamily};
use crate::layout::{mask, Frame, RegField, TableSpec};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    FlushAll,
    Load,
    Read,
    GetNext,
}

#[derive(Default)]
struct SimState {
    // Keyed by (block, register, selected window block).
    regs: HashMap<(u8, u8, u8), u32>,
    tables: HashMap<TableKind, BTreeMap<u32, Frame>>,
    // Busy polls left per (block, operation register).
    pending: HashMap<(u8, u8), u32>,
    busy_polls: u32,
    wedged: bool,
    ops: usize,
}

pub struct SimSwitch {
    chip: &'static ChipConfig,
    state: Mutex<SimState>,
}

impl SimSwitch {
    pub fn new(family: ChipFamily) -> Self {
        SimSwitch {
            chip: family.config(),
            state: Mutex::new(SimState::default()),
        }
    }

    /// Keep the busy bit set for `n` polls after each operation.
    pub fn with_busy_polls(self, n: u32) -> Self {
        self.state.lock().busy_polls = n;
        self
    }

    /// A wedged engine never clears its busy bit.
    pub fn set_wedged(&self, wedged: bool) {
        self.state.lock().wedged = wedged;
    }

    /// The stored data of a valid entry.
    pub fn entry(&self, kind: TableKind, index: u32) -> Option<Frame> {
        self.state
            .lock()
            .tables
            .get(&kind)
            .and_then(|t| t.get(&index))
            .cloned()
    }

    /// Indices of the valid entries in a table, ascending.
    pub fn indices(&self, kind: TableKind) -> Vec<u32> {
        self.state
            .lock()
            .tables
            .get(&kind)
            .map(|t| t.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Place an entry directly, bypassing the table engine.
    pub fn insert(&self, kind: TableKind, index: u32, frame: Frame) {
        self.state
            .lock()
            .tables
            .entry(kind)
            .or_default()
            .insert(index, frame);
    }

    /// Number of table operations started.
    pub fn ops(&self) -> usize {
        self.state.lock().ops
    }

    /// A register as seen with the neutral window selection.
    pub fn reg(&self, block: u8, reg: u8) -> u32 {
        self.state
            .lock()
            .regs
            .get(&(block, reg, 0))
            .copied()
            .unwrap_or(0)
    }

    fn op_spec(&self, block: u8, reg: u8) -> Option<&'static TableSpec> {
        self.chip
            .specs()
            .into_iter()
            .find(|s| s.op.block == block && s.op.op_reg == reg)
    }

    // The window block currently selected for a data register.
    fn bank(&self, st: &SimState, block: u8, reg: u8) -> u8 {
        for s in self.chip.specs() {
            let d = &s.data;
            if let (true, Some(ext)) = (d.block == block, d.ext) {
                if d.regs.contains(&reg) {
                    let v = st.regs.get(&(block, ext.reg, 0)).copied();
                    return ((v.unwrap_or(0) >> ext.offset) & mask(ext.width))
                        as u8;
                }
            }
        }
        0
    }

    fn load(&self, st: &SimState, block: u8, reg: u8) -> u32 {
        let bank = self.bank(st, block, reg);
        st.regs.get(&(block, reg, bank)).copied().unwrap_or(0)
    }

    fn store(&self, st: &mut SimState, block: u8, reg: u8, v: u32) {
        let bank = self.bank(st, block, reg);
        st.regs.insert((block, reg, bank), v);
    }

    fn read_window(&self, st: &SimState, spec: &TableSpec) -> Frame {
        let d = &spec.data;
        let mut f = Frame::new(d.words());
        for page in 0..d.pages {
            let bank = d.ext.map(|e| e.first_block + page).unwrap_or(0);
            for (i, reg) in d.regs.iter().enumerate() {
                let v = st.regs.get(&(d.block, *reg, bank)).copied();
                f.words[page as usize * d.regs.len() + i] = v.unwrap_or(0);
            }
        }
        f
    }

    fn write_window(&self, st: &mut SimState, spec: &TableSpec, f: &Frame) {
        let d = &spec.data;
        let width = d.width.bits();
        for page in 0..d.pages {
            let bank = d.ext.map(|e| e.first_block + page).unwrap_or(0);
            for (i, reg) in d.regs.iter().enumerate() {
                let v = f.words.get(page as usize * d.regs.len() + i);
                st.regs.insert(
                    (d.block, *reg, bank),
                    v.copied().unwrap_or(0) & mask(width),
                );
            }
        }
    }

    fn get_field(
        &self,
        st: &SimState,
        spec: &TableSpec,
        word: u32,
        f: RegField,
    ) -> u32 {
        let v = if f.reg == spec.op.op_reg {
            word
        } else {
            self.load(st, spec.op.block, f.reg)
        };
        (v >> f.offset) & f.mask()
    }

    fn set_field(
        &self,
        st: &mut SimState,
        spec: &TableSpec,
        word: &mut u32,
        f: RegField,
        v: u32,
    ) {
        let m = f.mask() << f.offset;
        if f.reg == spec.op.op_reg {
            *word = (*word & !m) | ((v << f.offset) & m);
        } else {
            let old = self.load(st, spec.op.block, f.reg);
            let new = (old & !m) | ((v << f.offset) & m);
            self.store(st, spec.op.block, f.reg, new);
        }
    }

    // Run the operation encoded in `word`, returning the operation register
    // contents once it completes.
    fn run(&self, st: &mut SimState, block: u8, reg: u8, word: u32) -> u32 {
        let Some(base) = self.op_spec(block, reg) else {
            return word;
        };
        let code = (word >> base.op.opcode_offset)
            & mask(base.op.opcode_width);
        let code = code as u8;

        // Tables sharing an operation register are told apart by opcode.
        let found = self
            .chip
            .specs()
            .into_iter()
            .filter(|s| s.op.block == block && s.op.op_reg == reg)
            .find_map(|s| {
                let c = s.op.opcodes;
                [
                    (c.flush_all, Op::FlushAll),
                    (c.load, Op::Load),
                    (c.read, Op::Read),
                    (c.get_next, Op::GetNext),
                ]
                .into_iter()
                .find(|(o, _)| *o == Some(code))
                .map(|(_, op)| (s, op))
            });
        let Some((spec, op)) = found else {
            return word & !(1 << base.op.busy_bit);
        };

        st.ops += 1;
        let mut word = word & !(1 << spec.op.busy_bit);
        let mut index = 0;
        let mut shift = 0;
        for part in spec.op.index {
            index |= self.get_field(st, spec, word, *part) << shift;
            shift += part.width;
        }
        let valid = spec
            .op
            .valid
            .map(|f| self.get_field(st, spec, word, f) != 0)
            .unwrap_or(true);

        match op {
            Op::FlushAll => {
                st.tables.remove(&spec.kind);
            }
            Op::Load if valid => {
                let frame = self.read_window(st, spec);
                st.tables.entry(spec.kind).or_default().insert(index, frame);
            }
            Op::Load => {
                if let Some(t) = st.tables.get_mut(&spec.kind) {
                    t.remove(&index);
                }
            }
            Op::Read => {
                let frame = st
                    .tables
                    .get(&spec.kind)
                    .and_then(|t| t.get(&index))
                    .cloned();
                if let Some(f) = spec.op.valid {
                    let v = frame.is_some() as u32;
                    self.set_field(st, spec, &mut word, f, v);
                }
                let frame =
                    frame.unwrap_or_else(|| Frame::new(spec.data.words()));
                self.write_window(st, spec, &frame);
            }
            Op::GetNext => {
                let max = spec.max_index;
                let lo = if index >= max { 0 } else { index + 1 };
                let next = st
                    .tables
                    .get(&spec.kind)
                    .and_then(|t| t.range(lo..=max).next())
                    .map(|(i, f)| (*i, f.clone()));
                let (found, valid) = match next {
                    Some((i, frame)) => {
                        self.write_window(st, spec, &frame);
                        (i, 1)
                    }
                    None => (max, 0),
                };
                let mut shift = 0;
                for part in spec.op.index {
                    let v = (found >> shift) & part.mask();
                    self.set_field(st, spec, &mut word, *part, v);
                    shift += part.width;
                }
                if let Some(f) = spec.op.valid {
                    self.set_field(st, spec, &mut word, f, valid);
                }
            }
        }

        st.pending.insert((block, reg), st.busy_polls);
        word
    }
}

impl RegAccess for SimSwitch {
    fn read_reg(&self, _dev: DevNum, block: u8, reg: u8) -> HalResult<u16> {
        let mut st = self.state.lock();
        let mut v = self.load(&st, block, reg);
        if let Some(spec) = self.op_spec(block, reg) {
            let busy = 1u32 << spec.op.busy_bit;
            if st.wedged {
                v |= busy;
            } else if let Some(n) = st.pending.get_mut(&(block, reg)) {
                if *n > 0 {
                    *n -= 1;
                    v |= busy;
                }
            }
        }
        Ok(v as u16)
    }

    fn write_reg(
        &self,
        _dev: DevNum,
        block: u8,
        reg: u8,
        val: u16,
    ) -> HalResult<()> {
        let mut st = self.state.lock();
        let mut v = val as u32;
        if let Some(spec) = self.op_spec(block, reg) {
            if v & (1 << spec.op.busy_bit) != 0 {
                v = self.run(&mut st, block, reg, v);
            }
        }
        self.store(&mut st, block, reg, v);
        Ok(())
    }

    fn read_reg32(&self, _dev: DevNum, block: u8, reg: u8) -> HalResult<u32> {
        let st = self.state.lock();
        Ok(self.load(&st, block, reg))
    }

    fn write_reg32(
        &self,
        _dev: DevNum,
        block: u8,
        reg: u8,
        val: u32,
    ) -> HalResult<()> {
        let mut st = self.state.lock();
        self.store(&mut st, block, reg, val);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_next_sentinel() {
        let sim = SimSwitch::new(ChipFamily::Amethyst);
        // STU get-next from SID 0 on an empty table
        sim.write_reg(0, 0x1b, 0x03, 0).unwrap();
        sim.write_reg(0, 0x1b, 0x05, 0x8000 | (6 << 12)).unwrap();
        assert_eq!(sim.reg(0x1b, 0x03) & 0x3f, 0x3f);
        assert_eq!(sim.reg(0x1b, 0x06) & (1 << 12), 0);
        assert_eq!(sim.ops(), 1);
    }

    #[test]
    fn test_window_banks() {
        let sim = SimSwitch::new(ChipFamily::Amethyst);
        // TCAM page 1 and range comparator data share register 0x02
        sim.write_field(0, 0x1f, 0x01, 12, 3, 2).unwrap();
        sim.write_reg(0, 0x1f, 0x02, 0x1234).unwrap();
        sim.write_field(0, 0x1f, 0x01, 12, 3, 4).unwrap();
        sim.write_reg(0, 0x1f, 0x02, 0x5678).unwrap();
        sim.write_field(0, 0x1f, 0x01, 12, 3, 2).unwrap();
        assert_eq!(sim.read_reg(0, 0x1f, 0x02).unwrap(), 0x1234);
        sim.write_field(0, 0x1f, 0x01, 12, 3, 0).unwrap();
        assert_eq!(sim.read_reg(0, 0x1f, 0x02).unwrap(), 0);
    }

    #[test]
    fn test_busy_polls() {
        let sim = SimSwitch::new(ChipFamily::Amethyst).with_busy_polls(2);
        sim.write_reg(0, 0x1b, 0x05, 0x8000 | (1 << 12)).unwrap();
        assert_ne!(sim.read_reg(0, 0x1b, 0x05).unwrap() & 0x8000, 0);
        assert_ne!(sim.read_reg(0, 0x1b, 0x05).unwrap() & 0x8000, 0);
        assert_eq!(sim.read_reg(0, 0x1b, 0x05).unwrap() & 0x8000, 0);
    }
}
