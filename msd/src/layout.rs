// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! The vocabulary used to describe where a table lives in a chip's register
//! space, and how a table entry is laid out across its data words.

use common::table::TableKind;

use crate::chip::TableFamily;

/// A bit field within a 16-bit register of a table's operation block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegField {
    pub reg: u8,
    pub offset: u8,
    pub width: u8,
}

impl RegField {
    pub const fn new(reg: u8, offset: u8, width: u8) -> Self {
        RegField { reg, offset, width }
    }

    pub const fn mask(&self) -> u32 {
        mask(self.width)
    }
}

/// The operation codes understood by a table engine.  An absent code means
/// the engine cannot perform that operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Opcodes {
    pub flush_all: Option<u8>,
    pub load: Option<u8>,
    pub read: Option<u8>,
    pub get_next: Option<u8>,
}

/// The operation register of a table engine and the fields that address an
/// entry.
#[derive(Clone, Copy, Debug)]
pub struct OpLayout {
    pub block: u8,
    pub op_reg: u8,
    pub busy_bit: u8,
    pub opcode_offset: u8,
    pub opcode_width: u8,
    pub opcodes: Opcodes,
    /// The entry index, least significant part first.  Parts that live in
    /// the operation register are merged into the operation word.
    pub index: &'static [RegField],
    pub valid: Option<RegField>,
}

impl OpLayout {
    /// Total number of bits in the index.
    pub fn index_width(&self) -> u8 {
        self.index.iter().map(|f| f.width).sum()
    }
}

/// The extension register used to select which block of a paged data window
/// is visible.  A block value of zero is the neutral selection.
#[derive(Clone, Copy, Debug)]
pub struct ExtLayout {
    pub reg: u8,
    pub offset: u8,
    pub width: u8,
    /// Block value selecting page 0 of the data window.
    pub first_block: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegWidth {
    Bits16,
    Bits32,
}

impl RegWidth {
    pub fn bits(&self) -> u8 {
        match self {
            RegWidth::Bits16 => 16,
            RegWidth::Bits32 => 32,
        }
    }
}

/// The registers an entry is staged through.  Wide entries are spread over
/// `pages` copies of the same register window, selected through `ext`.
#[derive(Clone, Copy, Debug)]
pub struct DataWindow {
    pub block: u8,
    pub regs: &'static [u8],
    pub pages: u8,
    pub width: RegWidth,
    pub ext: Option<ExtLayout>,
}

impl DataWindow {
    /// Number of data words in a staged entry.
    pub fn words(&self) -> usize {
        self.regs.len() * self.pages as usize
    }
}

/// Where a table lives on a particular chip.
#[derive(Clone, Copy, Debug)]
pub struct TableSpec {
    pub kind: TableKind,
    pub family: TableFamily,
    pub op: OpLayout,
    pub data: DataWindow,
    /// The largest valid index.  Also the index reported by get-next when
    /// the table has no more entries.
    pub max_index: u32,
}

/// A table binding: the register placement plus the codec layout of its
/// entries.
#[derive(Clone, Copy, Debug)]
pub struct Table<L: 'static> {
    pub spec: TableSpec,
    pub layout: L,
}

/// A bit field within one word of a staged entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub word: u8,
    pub offset: u8,
    pub width: u8,
}

impl Field {
    pub const fn new(word: u8, offset: u8, width: u8) -> Self {
        Field {
            word,
            offset,
            width,
        }
    }
}

pub(crate) const fn mask(width: u8) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1u32 << width) - 1
    }
}

/// Per-port fields packed at a fixed number of bits per port.  Ports in
/// `overrides` live somewhere other than their natural slot.
#[derive(Clone, Copy, Debug)]
pub struct PortSlots {
    pub first_word: u8,
    pub bits: u8,
    pub per_word: u8,
    pub overrides: &'static [(u8, Field)],
}

impl PortSlots {
    pub fn field(&self, port: u8) -> Field {
        if let Some((_, f)) = self.overrides.iter().find(|(p, _)| *p == port) {
            return *f;
        }
        Field {
            word: self.first_word + port / self.per_word,
            offset: (port % self.per_word) * self.bits,
            width: self.bits,
        }
    }
}

/// The data words of one entry, in staging order: page 0 registers first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub words: Vec<u32>,
}

impl Frame {
    pub fn new(words: usize) -> Self {
        Frame {
            words: vec![0; words],
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Fields outside the frame read as zero.
    pub fn get(&self, f: Field) -> u32 {
        self.words
            .get(f.word as usize)
            .map(|w| (w >> f.offset) & mask(f.width))
            .unwrap_or(0)
    }

    /// Bits of `v` beyond the field width are dropped.  Fields outside the
    /// frame are ignored.
    pub fn set(&mut self, f: Field, v: u32) {
        if let Some(w) = self.words.get_mut(f.word as usize) {
            let m = mask(f.width) << f.offset;
            *w = (*w & !m) | ((v << f.offset) & m);
        }
    }

    pub fn get_bool(&self, f: Field) -> bool {
        self.get(f) != 0
    }

    pub fn set_bool(&mut self, f: Field, v: bool) {
        self.set(f, v as u32)
    }

    /// Read a value split across several fields, least significant first.
    pub fn get_wide(&self, parts: &[Field]) -> u64 {
        let mut shift = 0;
        let mut v = 0u64;
        for p in parts {
            v |= (self.get(*p) as u64) << shift;
            shift += p.width;
        }
        v
    }

    /// Write a value split across several fields, least significant first.
    pub fn set_wide(&mut self, parts: &[Field], v: u64) {
        let mut shift = 0;
        for p in parts {
            self.set(*p, ((v >> shift) & mask(p.width) as u64) as u32);
            shift += p.width;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_access() {
        let mut f = Frame::new(2);
        f.set(Field::new(0, 4, 4), 0x1f);
        assert_eq!(f.words[0], 0xf0);
        f.set(Field::new(1, 0, 16), 0xbeef);
        assert_eq!(f.get(Field::new(1, 8, 8)), 0xbe);
        assert_eq!(f.get(Field::new(7, 0, 8)), 0);
    }

    #[test]
    fn test_wide_value() {
        let parts = [Field::new(0, 0, 16), Field::new(1, 0, 8)];
        let mut f = Frame::new(2);
        f.set_wide(&parts, 0xabcdef);
        assert_eq!(f.words, vec![0xcdef, 0xab]);
        assert_eq!(f.get_wide(&parts), 0xabcdef);
    }

    #[test]
    fn test_port_slot_override() {
        const SLOTS: PortSlots = PortSlots {
            first_word: 1,
            bits: 2,
            per_word: 8,
            overrides: &[(11, Field::new(3, 0, 2))],
        };
        assert_eq!(SLOTS.field(0), Field::new(1, 0, 2));
        assert_eq!(SLOTS.field(9), Field::new(2, 2, 2));
        assert_eq!(SLOTS.field(11), Field::new(3, 0, 2));
    }
}
