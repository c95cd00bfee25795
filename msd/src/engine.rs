// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! The table operation engine.  Every operation on a stateful table runs as
//! one transaction under the table family's lock:
//!
//! 1. wait for the engine to go idle,
//! 2. stage data pages (loads only),
//! 3. write the operation register with the busy bit set,
//! 4. wait for the engine to go idle again,
//! 5. read back index, valid bit and data pages (reads only),
//! 6. return the page selection to the neutral block.
//!
//! Only the busy-wait may suspend, and it is bounded by the device's poll
//! timeout.

use std::time::Instant;

use slog::Logger;

use hal::{HalError, HalResult, SemGuard};

use crate::device::Device;
use crate::layout::{mask, Frame, RegField, RegWidth, TableSpec};

/// What a get-next operation reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NextResult {
    pub index: u32,
    pub valid: bool,
    /// Entry data, present only when `valid` is set.
    pub frame: Option<Frame>,
}

pub struct Engine<'a> {
    dev: &'a Device,
    spec: &'a TableSpec,
    log: Logger,
}

// State of one locked transaction.
#[derive(Default)]
struct Txn {
    page_selected: bool,
}

impl<'a> Engine<'a> {
    pub fn new(dev: &'a Device, spec: &'a TableSpec) -> Self {
        let log = dev.log().new(slog::o!("table" => spec.kind.to_string()));
        Engine { dev, spec, log }
    }

    pub fn spec(&self) -> &TableSpec {
        self.spec
    }

    fn opcode(&self, code: Option<u8>, name: &str) -> HalResult<u8> {
        code.ok_or_else(|| {
            HalError::NotSupported(format!(
                "{name} on {} table of {}",
                self.spec.kind,
                self.dev.family()
            ))
        })
    }

    fn valid_field(&self) -> HalResult<RegField> {
        self.spec.op.valid.ok_or_else(|| {
            HalError::NotSupported(format!(
                "{} table has no valid bit",
                self.spec.kind
            ))
        })
    }

    /// Invalidate every entry in the table.
    pub fn flush_all(&self) -> HalResult<()> {
        let code = self.opcode(self.spec.op.opcodes.flush_all, "flush all")?;
        self.locked("flush_all", |_txn| {
            self.issue(code, None, None)?;
            self.wait_ready()
        })
    }

    /// Invalidate one entry: a load with the valid bit cleared.
    pub fn flush_entry(&self, index: u32) -> HalResult<()> {
        let code = self.opcode(self.spec.op.opcodes.load, "load")?;
        self.valid_field()?;
        self.locked("flush_entry", |_txn| {
            self.issue(code, Some(index), Some(false))?;
            self.wait_ready()
        })
    }

    /// Stage `frame` and load it at `index`, marking the entry valid.
    pub fn load_entry(&self, index: u32, frame: &Frame) -> HalResult<()> {
        let code = self.opcode(self.spec.op.opcodes.load, "load")?;
        self.check_frame(frame)?;
        let valid = self.spec.op.valid.map(|_| true);
        self.locked("load_entry", |txn| {
            self.stage(txn, frame)?;
            self.issue(code, Some(index), valid)?;
            self.wait_ready()
        })
    }

    /// Read the entry at `index`.  Returns the valid bit and the staged
    /// data; tables without a valid bit always report valid.
    pub fn read_entry(&self, index: u32) -> HalResult<(bool, Frame)> {
        let code = self.opcode(self.spec.op.opcodes.read, "read")?;
        self.locked("read_entry", |txn| {
            self.issue(code, Some(index), None)?;
            self.wait_ready()?;
            let valid = self.read_valid()?;
            let frame = self.unstage(txn)?;
            Ok((valid, frame))
        })
    }

    /// Ask the engine for the first valid entry after `start`.
    pub fn get_next(&self, start: u32) -> HalResult<NextResult> {
        let code = self.opcode(self.spec.op.opcodes.get_next, "get next")?;
        self.valid_field()?;
        self.locked("get_next", |txn| {
            self.issue(code, Some(start), None)?;
            self.wait_ready()?;
            let index = self.read_index()?;
            let valid = self.read_valid()?;
            let frame = if valid {
                Some(self.unstage(txn)?)
            } else {
                None
            };
            Ok(NextResult {
                index,
                valid,
                frame,
            })
        })
    }

    fn check_frame(&self, frame: &Frame) -> HalResult<()> {
        let words = self.spec.data.words();
        if frame.len() != words {
            return Err(HalError::Internal(format!(
                "{} frame has {} words, expected {words}",
                self.spec.kind,
                frame.len()
            )));
        }
        Ok(())
    }

    // Run `f` with the table family lock held, after the engine is idle.
    // The page selection is reset and the lock given back on every path.
    fn locked<T>(
        &self,
        what: &str,
        f: impl FnOnce(&mut Txn) -> HalResult<T>,
    ) -> HalResult<T> {
        let sem = self.dev.semaphore(self.spec.family)?;
        let guard = SemGuard::take(sem, self.dev.dev_num())?;
        slog::trace!(self.log, "{}", what);

        let mut txn = Txn::default();
        let mut result = self.wait_ready().and_then(|_| f(&mut txn));

        if txn.page_selected {
            if let Err(e) = self.select_block(0) {
                if result.is_ok() {
                    result = Err(e);
                } else {
                    slog::error!(
                        self.log,
                        "failed to reset page after {}: {}",
                        what,
                        e
                    );
                }
            }
        }

        let released = guard.release();
        match (result, released) {
            (Err(e), _) => {
                slog::debug!(self.log, "{} failed: {}", what, e);
                Err(e)
            }
            (Ok(_), Err(e)) => Err(e),
            (Ok(v), Ok(())) => Ok(v),
        }
    }

    fn wait_ready(&self) -> HalResult<()> {
        let op = &self.spec.op;
        let timeout = self.dev.poll_timeout();
        let start = Instant::now();
        loop {
            let v = self.dev.bus().read_reg(
                self.dev.dev_num(),
                op.block,
                op.op_reg,
            )?;
            if v & (1 << op.busy_bit) == 0 {
                return Ok(());
            }
            let waited = start.elapsed();
            if waited >= timeout {
                slog::error!(self.log, "table engine stuck busy";
                    "block" => op.block,
                    "reg" => op.op_reg,
                    "waited_us" => waited.as_micros() as u64);
                return Err(HalError::HardwareTimeout {
                    block: op.block,
                    reg: op.op_reg,
                    waited,
                });
            }
            std::hint::spin_loop();
        }
    }

    // Write the index and valid fields, then start the operation.  Fields
    // living in the operation register itself ride along in the operation
    // word.
    fn issue(
        &self,
        code: u8,
        index: Option<u32>,
        valid: Option<bool>,
    ) -> HalResult<()> {
        let op = &self.spec.op;
        let mut word = (1u32 << op.busy_bit)
            | ((code as u32 & mask(op.opcode_width)) << op.opcode_offset);

        let mut fields: Vec<(RegField, u32)> = Vec::new();
        if let Some(index) = index {
            let mut shift = 0;
            for part in op.index {
                fields.push((*part, (index >> shift) & part.mask()));
                shift += part.width;
            }
        }
        if let (Some(v), Some(f)) = (valid, op.valid) {
            fields.push((f, v as u32));
        }

        for (f, v) in fields {
            if f.reg == op.op_reg {
                word |= v << f.offset;
            } else {
                self.dev.bus().write_field(
                    self.dev.dev_num(),
                    op.block,
                    f.reg,
                    f.offset,
                    f.width,
                    v as u16,
                )?;
            }
        }

        self.dev
            .bus()
            .write_reg(self.dev.dev_num(), op.block, op.op_reg, word as u16)
    }

    fn read_field(&self, f: RegField) -> HalResult<u32> {
        self.dev
            .bus()
            .read_field(
                self.dev.dev_num(),
                self.spec.op.block,
                f.reg,
                f.offset,
                f.width,
            )
            .map(u32::from)
    }

    fn read_index(&self) -> HalResult<u32> {
        let mut index = 0;
        let mut shift = 0;
        for part in self.spec.op.index {
            index |= self.read_field(*part)? << shift;
            shift += part.width;
        }
        Ok(index)
    }

    fn read_valid(&self) -> HalResult<bool> {
        match self.spec.op.valid {
            Some(f) => Ok(self.read_field(f)? != 0),
            None => Ok(true),
        }
    }

    // The extension register is as wide as the window it pages.
    fn select_block(&self, block: u8) -> HalResult<()> {
        let Some(ext) = self.spec.data.ext else {
            return Ok(());
        };
        let (bus, dev, data) =
            (self.dev.bus(), self.dev.dev_num(), self.spec.data.block);
        match self.spec.data.width {
            RegWidth::Bits16 => bus.write_field(
                dev,
                data,
                ext.reg,
                ext.offset,
                ext.width,
                block as u16,
            ),
            RegWidth::Bits32 => bus.write_field32(
                dev,
                data,
                ext.reg,
                ext.offset,
                ext.width,
                block as u32,
            ),
        }
    }

    fn select_page(&self, txn: &mut Txn, page: u8) -> HalResult<()> {
        if let Some(ext) = self.spec.data.ext {
            txn.page_selected = true;
            self.select_block(ext.first_block + page)?;
        }
        Ok(())
    }

    fn write_data(&self, reg: u8, v: u32) -> HalResult<()> {
        let (bus, dev, block) =
            (self.dev.bus(), self.dev.dev_num(), self.spec.data.block);
        match self.spec.data.width {
            RegWidth::Bits16 => bus.write_reg(dev, block, reg, v as u16),
            RegWidth::Bits32 => bus.write_reg32(dev, block, reg, v),
        }
    }

    fn read_data(&self, reg: u8) -> HalResult<u32> {
        let (bus, dev, block) =
            (self.dev.bus(), self.dev.dev_num(), self.spec.data.block);
        match self.spec.data.width {
            RegWidth::Bits16 => bus.read_reg(dev, block, reg).map(u32::from),
            RegWidth::Bits32 => bus.read_reg32(dev, block, reg),
        }
    }

    fn stage(&self, txn: &mut Txn, frame: &Frame) -> HalResult<()> {
        let data = &self.spec.data;
        for page in 0..data.pages {
            self.select_page(txn, page)?;
            let base = page as usize * data.regs.len();
            for (i, reg) in data.regs.iter().enumerate() {
                self.write_data(*reg, frame.words[base + i])?;
            }
        }
        Ok(())
    }

    fn unstage(&self, txn: &mut Txn) -> HalResult<Frame> {
        let data = &self.spec.data;
        let mut frame = Frame::new(data.words());
        for page in 0..data.pages {
            self.select_page(txn, page)?;
            let base = page as usize * data.regs.len();
            for (i, reg) in data.regs.iter().enumerate() {
                frame.words[base + i] = self.read_data(*reg)?;
            }
        }
        Ok(frame)
    }
}
