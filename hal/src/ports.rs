// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

use crate::{HalError, HalResult};

/// Translation between the logical port numbers used by callers and the
/// physical port numbers used in hardware tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortMap {
    // Indexed by logical port.
    l2p: Vec<u8>,
    num_phys: u8,
}

impl PortMap {
    /// A map where logical port N is physical port N.
    pub fn identity(num_ports: u8) -> Self {
        PortMap {
            l2p: (0..num_ports).collect(),
            num_phys: num_ports,
        }
    }

    /// Build a map from a list of physical ports indexed by logical port.
    /// Every physical port must be below `num_phys` and appear only once.
    pub fn new(l2p: Vec<u8>, num_phys: u8) -> HalResult<Self> {
        let mut seen = vec![false; num_phys as usize];
        for p in &l2p {
            match seen.get_mut(*p as usize) {
                Some(s) if !*s => *s = true,
                _ => return Err(HalError::InvalidPort(*p)),
            }
        }
        Ok(PortMap { l2p, num_phys })
    }

    /// Number of logical ports.
    pub fn len(&self) -> usize {
        self.l2p.len()
    }

    pub fn is_empty(&self) -> bool {
        self.l2p.is_empty()
    }

    /// Number of physical ports on the device.
    pub fn num_phys(&self) -> u8 {
        self.num_phys
    }

    pub fn to_physical(&self, lport: u8) -> HalResult<u8> {
        self.l2p
            .get(lport as usize)
            .copied()
            .ok_or(HalError::InvalidPort(lport))
    }

    pub fn to_logical(&self, pport: u8) -> HalResult<u8> {
        self.l2p
            .iter()
            .position(|p| *p == pport)
            .map(|l| l as u8)
            .ok_or(HalError::InvalidPort(pport))
    }

    /// Rearrange per-logical-port values into physical port order.  Physical
    /// ports with no logical counterpart get the default value.
    pub fn slots_to_physical<T: Copy + Default>(
        &self,
        logical: &[T],
    ) -> HalResult<Vec<T>> {
        if logical.len() > self.l2p.len() {
            return Err(HalError::InvalidPort(logical.len() as u8 - 1));
        }
        let mut out = vec![T::default(); self.num_phys as usize];
        for (l, v) in logical.iter().enumerate() {
            out[self.l2p[l] as usize] = *v;
        }
        Ok(out)
    }

    /// Rearrange per-physical-port values into logical port order.
    pub fn slots_to_logical<T: Copy + Default>(
        &self,
        physical: &[T],
    ) -> Vec<T> {
        self.l2p
            .iter()
            .map(|p| physical.get(*p as usize).copied().unwrap_or_default())
            .collect()
    }

    /// Convert a bitmap of logical ports to a bitmap of physical ports.
    pub fn bitmap_to_physical(&self, lports: u32) -> HalResult<u32> {
        let mut out = 0u32;
        for l in 0..32u8 {
            if lports & (1 << l) != 0 {
                out |= 1 << self.to_physical(l)?;
            }
        }
        Ok(out)
    }

    /// Convert a bitmap of physical ports to a bitmap of logical ports.
    /// Physical ports without a logical mapping are dropped.
    pub fn bitmap_to_logical(&self, pports: u32) -> u32 {
        self.l2p
            .iter()
            .enumerate()
            .filter(|(_, p)| pports & (1 << **p) != 0)
            .fold(0, |acc, (l, _)| acc | (1 << l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swapped_map() -> anyhow::Result<()> {
        let map = PortMap::new(vec![1, 0, 2], 4)?;
        assert_eq!(map.to_physical(0)?, 1);
        assert_eq!(map.to_logical(1)?, 0);
        assert!(matches!(map.to_physical(3), Err(HalError::InvalidPort(3))));
        assert!(map.to_logical(3).is_err());

        assert_eq!(map.slots_to_physical(&[7u8, 8, 9])?, vec![8, 7, 9, 0]);
        assert_eq!(map.slots_to_logical(&[8u8, 7, 9, 5]), vec![7, 8, 9]);

        assert_eq!(map.bitmap_to_physical(0b001)?, 0b010);
        assert_eq!(map.bitmap_to_logical(0b1010), 0b001);
        assert!(map.bitmap_to_physical(0b1000).is_err());
        Ok(())
    }

    #[test]
    fn test_rejects_duplicates() {
        assert!(PortMap::new(vec![0, 0], 2).is_err());
        assert!(PortMap::new(vec![0, 5], 2).is_err());
    }
}
