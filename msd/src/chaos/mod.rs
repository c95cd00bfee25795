// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! A register bus wrapper that injects synthetic faults, either at random
//! according to a per-operation fault rate or deterministically at the Nth
//! bus access.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::random;
use serde::{Deserialize, Serialize};
use slog::Logger;

use hal::{DevNum, HalError, HalResult, RegAccess};

/// The likelihood that a bus operation fails.  Configured as a bare number
/// and clamped into [0.0, 1.0]; NaN reads as never.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[serde(from = "f64", into = "f64")]
pub struct FaultRate(f64);

impl From<f64> for FaultRate {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            FaultRate::NEVER
        } else {
            FaultRate(v.clamp(0.0, 1.0))
        }
    }
}

impl From<FaultRate> for f64 {
    fn from(r: FaultRate) -> Self {
        r.0
    }
}

impl FaultRate {
    pub const NEVER: FaultRate = FaultRate(0.0);
    pub const ALWAYS: FaultRate = FaultRate(1.0);

    pub fn value(self) -> f64 {
        self.0
    }

    fn strikes(self) -> bool {
        self.0 > 0.0 && self.0 >= random::<f64>()
    }
}

/// Extra fault rates for writes into particular register blocks.
#[derive(Default, Debug, Serialize, Deserialize, Clone)]
pub struct BlockFaults {
    pub blocks: HashMap<u8, FaultRate>,
}

/// Build a [`BlockFaults`] from `(block, rate)` pairs.
#[macro_export]
macro_rules! block_faults {
    ( $( ($block:expr, $rate:expr) ),* ) => {
        $crate::chaos::BlockFaults {
            blocks: ::std::collections::HashMap::from([
                $( ($block, $crate::chaos::FaultRate::from($rate)) ),*
            ])
        }
    };
}

impl BlockFaults {
    fn rate(&self, block: u8) -> FaultRate {
        self.blocks.get(&block).copied().unwrap_or_default()
    }
}

/// Fault rates for each bus operation.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ChaosConfig {
    pub read_reg: FaultRate,
    pub write_reg: FaultRate,
    pub read_reg32: FaultRate,
    pub write_reg32: FaultRate,
    pub block_write: BlockFaults,
    /// Fail exactly the bus access with this zero-based sequence number.
    pub fail_at: Option<usize>,
}

impl ChaosConfig {
    /// Apply one rate to every bus operation.
    pub fn uniform(v: f64) -> Self {
        let r = FaultRate::from(v);
        Self {
            read_reg: r,
            write_reg: r,
            read_reg32: r,
            write_reg32: r,
            ..Default::default()
        }
    }

    /// Fail only the `n`th bus access.
    pub fn fail_at(n: usize) -> Self {
        Self {
            fail_at: Some(n),
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum BusOp {
    Read16,
    Write16,
    Read32,
    Write32,
}

impl BusOp {
    fn name(self) -> &'static str {
        match self {
            BusOp::Read16 => "read_reg",
            BusOp::Write16 => "write_reg",
            BusOp::Read32 => "read_reg32",
            BusOp::Write32 => "write_reg32",
        }
    }

    fn is_write(self) -> bool {
        matches!(self, BusOp::Write16 | BusOp::Write32)
    }
}

pub struct ChaosBus<B: RegAccess> {
    inner: B,
    config: ChaosConfig,
    log: Logger,
    counter: AtomicUsize,
}

impl<B: RegAccess> ChaosBus<B> {
    pub fn new(log: &Logger, inner: B, config: ChaosConfig) -> Self {
        ChaosBus {
            inner,
            config,
            log: log.new(slog::o!("unit" => "chaos")),
            counter: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Number of bus accesses seen so far, failed ones included.
    pub fn accesses(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    // Every access counts toward `fail_at`, whether or not it goes on to
    // fail at random.
    fn inject(&self, op: BusOp, block: u8, reg: u8) -> HalResult<()> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let c = &self.config;
        let rate = match op {
            BusOp::Read16 => c.read_reg,
            BusOp::Write16 => c.write_reg,
            BusOp::Read32 => c.read_reg32,
            BusOp::Write32 => c.write_reg32,
        };
        let hit = c.fail_at == Some(n)
            || rate.strikes()
            || (op.is_write() && c.block_write.rate(block).strikes());
        if !hit {
            return Ok(());
        }
        slog::error!(self.log, "injected {} fault", op.name();
            "access" => n,
            "block" => block,
            "reg" => reg);
        Err(HalError::Synthetic(format!(
            "{} {block:#x}/{reg:#x} #{n}",
            op.name()
        )))
    }
}

impl<B: RegAccess> RegAccess for ChaosBus<B> {
    fn read_reg(&self, dev: DevNum, block: u8, reg: u8) -> HalResult<u16> {
        self.inject(BusOp::Read16, block, reg)?;
        self.inner.read_reg(dev, block, reg)
    }

    fn write_reg(
        &self,
        dev: DevNum,
        block: u8,
        reg: u8,
        val: u16,
    ) -> HalResult<()> {
        self.inject(BusOp::Write16, block, reg)?;
        self.inner.write_reg(dev, block, reg, val)
    }

    fn read_reg32(&self, dev: DevNum, block: u8, reg: u8) -> HalResult<u32> {
        self.inject(BusOp::Read32, block, reg)?;
        self.inner.read_reg32(dev, block, reg)
    }

    fn write_reg32(
        &self,
        dev: DevNum,
        block: u8,
        reg: u8,
        val: u32,
    ) -> HalResult<()> {
        self.inject(BusOp::Write32, block, reg)?;
        self.inner.write_reg32(dev, block, reg, val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::ChipFamily;
    use crate::sim::SimSwitch;
    use common::logging::test_logger;

    #[test]
    fn test_fail_at() {
        let log = test_logger();
        let bus = ChaosBus::new(
            &log,
            SimSwitch::new(ChipFamily::Amethyst),
            ChaosConfig::fail_at(1),
        );
        assert!(bus.read_reg(0, 0x1b, 0x05).is_ok());
        assert!(matches!(
            bus.write_reg(0, 0x1b, 0x05, 0),
            Err(HalError::Synthetic(_))
        ));
        assert!(bus.read_reg(0, 0x1b, 0x05).is_ok());
        assert_eq!(bus.accesses(), 3);
    }

    #[test]
    fn test_certain_faults() {
        let log = test_logger();
        let config = ChaosConfig {
            block_write: block_faults!((0x1c, 1.0)),
            ..Default::default()
        };
        let bus =
            ChaosBus::new(&log, SimSwitch::new(ChipFamily::Amethyst), config);
        assert!(bus.write_reg(0, 0x1b, 0x02, 1).is_ok());
        assert!(bus.write_reg(0, 0x1c, 0x02, 1).is_err());
        // Block faults only apply to writes.
        assert!(bus.read_reg(0, 0x1c, 0x02).is_ok());

        let bus = ChaosBus::new(
            &log,
            SimSwitch::new(ChipFamily::Amethyst),
            ChaosConfig::uniform(1.0),
        );
        assert!(bus.read_reg(0, 0x1b, 0x02).is_err());
        assert!(bus.write_reg32(0, 0x16, 0x02, 0).is_err());
    }

    #[test]
    fn test_rate_is_clamped() {
        assert_eq!(FaultRate::from(2.0), FaultRate::ALWAYS);
        assert_eq!(FaultRate::from(-0.5), FaultRate::NEVER);
        assert_eq!(FaultRate::from(f64::NAN), FaultRate::NEVER);
        assert!(!FaultRate::NEVER.strikes());
        assert!(FaultRate::ALWAYS.strikes());
    }

    #[test]
    fn test_config_serde() -> anyhow::Result<()> {
        let config: ChaosConfig = toml::from_str(
            r#"
            fail_at = 4
            write_reg = 0.25
            read_reg32 = 3.0
            "#,
        )?;
        assert_eq!(config.fail_at, Some(4));
        assert_eq!(config.write_reg.value(), 0.25);
        assert_eq!(config.read_reg32, FaultRate::ALWAYS);
        assert_eq!(config.read_reg, FaultRate::NEVER);
        assert!(config.block_write.blocks.is_empty());
        Ok(())
    }
}
