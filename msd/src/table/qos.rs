// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! Egress scheduling profiles.  Each entry gives the weighted round robin
//! share of every egress queue, plus the queues served in strict priority
//! ahead of the weighted ones.

use common::table::TableKind;
use hal::{HalError, HalResult, PortMap};

use super::{check_range, Dump, TableEntry, TableRow};
use crate::chip::ChipConfig;
use crate::codec::qos::{self as codec, QosWeightLayout};
use crate::device::Device;
use crate::layout::{Frame, Table};

pub const NUM_QUEUES: usize = 8;
pub const WEIGHT_MAX: u8 = 0x7f;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QosWeightEntry {
    pub index: u32,
    /// Weight per egress queue, queue 0 first.
    pub weights: [u8; NUM_QUEUES],
    /// Bitmap of strict priority queues.
    pub strict: u8,
}

impl QosWeightEntry {
    /// The share of weighted bandwidth `queue` receives, in percent.
    pub fn share(&self, queue: usize) -> Option<u32> {
        let w = |q: usize| {
            if self.strict & (1 << q) != 0 {
                0
            } else {
                self.weights[q] as u32
            }
        };
        let total: u32 = (0..NUM_QUEUES).map(w).sum();
        (queue < NUM_QUEUES && total > 0).then(|| w(queue) * 100 / total)
    }
}

impl TableEntry for QosWeightEntry {
    type Layout = QosWeightLayout;
    const KIND: TableKind = TableKind::QosWeight;

    fn binding(
        chip: &'static ChipConfig,
    ) -> Option<&'static Table<QosWeightLayout>> {
        chip.qos_weight.as_ref()
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn validate(
        &self,
        _dev: &Device,
        _layout: &QosWeightLayout,
    ) -> HalResult<()> {
        for w in self.weights {
            check_range("queue weight", w as u32, WEIGHT_MAX as u32)?;
        }
        if self.strict != u8::MAX
            && self
                .weights
                .iter()
                .enumerate()
                .all(|(q, w)| *w == 0 || self.strict & (1 << q) != 0)
        {
            return Err(HalError::BadParam(
                "no weighted queue has a nonzero weight".into(),
            ));
        }
        Ok(())
    }

    fn to_physical(&self, _ports: &PortMap) -> HalResult<Self> {
        Ok(*self)
    }

    fn to_logical(self, _ports: &PortMap) -> Self {
        self
    }

    fn encode(
        &self,
        layout: &QosWeightLayout,
        _num_ports: u8,
        frame: &mut Frame,
    ) {
        codec::encode(layout, self, frame)
    }

    fn decode(
        layout: &QosWeightLayout,
        _num_ports: u8,
        index: u32,
        frame: &Frame,
    ) -> Self {
        codec::decode(layout, index, frame)
    }
}

impl TableRow for QosWeightEntry {
    fn header() -> Vec<&'static str> {
        vec!["INDEX", "WEIGHTS", "STRICT"]
    }

    fn row(&self) -> Vec<String> {
        let weights: Vec<String> =
            self.weights.iter().map(|w| w.to_string()).collect();
        vec![
            self.index.to_string(),
            weights.join(","),
            format!("{:#04x}", self.strict),
        ]
    }
}

pub fn load_profile(dev: &Device, entry: &QosWeightEntry) -> HalResult<()> {
    super::add_entry(dev, entry)
}

pub fn read_profile(
    dev: &Device,
    index: u32,
) -> HalResult<Option<QosWeightEntry>> {
    super::read_entry(dev, index)
}

pub fn del_profile(dev: &Device, index: u32) -> HalResult<()> {
    super::del_entry::<QosWeightEntry>(dev, index)
}

pub fn get_profile_next(
    dev: &Device,
    index: u32,
) -> HalResult<Option<QosWeightEntry>> {
    super::get_entry_next(dev, index)
}

pub fn flush_all(dev: &Device) -> HalResult<()> {
    super::flush_all::<QosWeightEntry>(dev)
}

pub fn dump(dev: &Device) -> HalResult<Dump<'_, QosWeightEntry>> {
    super::dump(dev)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_skips_strict_queues() {
        let e = QosWeightEntry {
            index: 0,
            weights: [1, 1, 2, 0, 0, 0, 0, 50],
            strict: 0x80,
        };
        assert_eq!(e.share(2), Some(50));
        assert_eq!(e.share(7), Some(0));
        assert_eq!(e.share(8), None);
        assert_eq!(QosWeightEntry::default().share(0), None);
    }
}
