// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use strum::Display;
use thiserror::Error;

mod ports;
pub use ports::*;

mod sem;
pub use sem::*;

/// Identifies a single switch device on the management bus.
pub type DevNum = u8;

/// A specialized Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;

/// Error type conveying additional information about HAL errors
#[derive(Error, Debug)]
pub enum HalError {
    /// An argument passed to the HAL is out of range or otherwise
    /// inappropriate.  Detected before any hardware is touched.
    #[error("Bad parameter: {}", .0)]
    BadParam(String),
    /// A logical port number that has no physical mapping on this device.
    #[error("Invalid port: {}", .0)]
    InvalidPort(u8),
    /// The register bus reported a failure.
    #[error("bus error at {ctx}: {err}")]
    Bus { ctx: String, err: String },
    /// A table engine failed to drop its busy bit in time.
    #[error(
        "busy bit stuck in block {block:#04x} reg {reg:#04x} after {waited:?}"
    )]
    HardwareTimeout { block: u8, reg: u8, waited: Duration },
    /// The requested entry does not exist.
    #[error("No such entry")]
    NoSuch,
    /// The chip has no binding for this table or operation.
    #[error("Operation not supported: {}", .0)]
    NotSupported(String),
    /// An error derived from a purposely triggered synthetic fault for testing
    /// purposes.
    #[error("Synthetic HAL error: {}", .0)]
    Synthetic(String),
    /// The HAL detected some internal inconsistency
    #[error("Internal error: {}", .0)]
    Internal(String),
}

/// The status codes reported across the legacy driver interface.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
pub enum Status {
    #[strum(serialize = "MSD_OK")]
    Ok,
    #[strum(serialize = "MSD_FAIL")]
    Fail,
    #[strum(serialize = "MSD_BAD_PARAM")]
    BadParam,
    #[strum(serialize = "MSD_NO_SUCH")]
    NoSuch,
    #[strum(serialize = "MSD_NOT_SUPPORTED")]
    NotSupported,
}

impl HalError {
    /// Collapse this error into the legacy status taxonomy.
    pub fn status(&self) -> Status {
        match self {
            HalError::BadParam(_) | HalError::InvalidPort(_) => {
                Status::BadParam
            }
            HalError::NoSuch => Status::NoSuch,
            HalError::NotSupported(_) => Status::NotSupported,
            HalError::Bus { .. }
            | HalError::HardwareTimeout { .. }
            | HalError::Synthetic(_)
            | HalError::Internal(_) => Status::Fail,
        }
    }

    /// True for errors raised by validation, before the hardware is touched.
    pub fn is_param(&self) -> bool {
        self.status() == Status::BadParam
    }
}

/// Map the outcome of any HAL call onto its legacy status code.
pub fn status_of<T>(r: &HalResult<T>) -> Status {
    match r {
        Ok(_) => Status::Ok,
        Err(e) => e.status(),
    }
}

fn field_mask(width: u8) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1u32 << width) - 1
    }
}

fn check_field(offset: u8, width: u8, bits: u32) -> HalResult<()> {
    if offset as u32 + width as u32 > bits || width == 0 {
        return Err(HalError::BadParam(format!(
            "field {offset}+{width} outside {bits}-bit register"
        )));
    }
    Ok(())
}

/// Register access to a switch device over its management bus.  Registers
/// are addressed by a (block, register) pair, where the block is the SMI
/// device address of a register bank.  Implementations must not block
/// beyond the duration of a single bus transaction.
pub trait RegAccess: Send + Sync {
    /// Read a 16-bit register.
    fn read_reg(&self, dev: DevNum, block: u8, reg: u8) -> HalResult<u16>;

    /// Write a 16-bit register.
    fn write_reg(
        &self,
        dev: DevNum,
        block: u8,
        reg: u8,
        val: u16,
    ) -> HalResult<()>;

    /// Read a 32-bit register.  Only chips with an extended register space
    /// implement this.
    fn read_reg32(&self, _dev: DevNum, _block: u8, _reg: u8) -> HalResult<u32> {
        Err(HalError::NotSupported("32-bit register read".into()))
    }

    /// Write a 32-bit register.
    fn write_reg32(
        &self,
        _dev: DevNum,
        _block: u8,
        _reg: u8,
        _val: u32,
    ) -> HalResult<()> {
        Err(HalError::NotSupported("32-bit register write".into()))
    }

    /// Read `width` bits starting at bit `offset` of a 16-bit register.
    fn read_field(
        &self,
        dev: DevNum,
        block: u8,
        reg: u8,
        offset: u8,
        width: u8,
    ) -> HalResult<u16> {
        check_field(offset, width, 16)?;
        let v = self.read_reg(dev, block, reg)? as u32;
        Ok(((v >> offset) & field_mask(width)) as u16)
    }

    /// Read-modify-write `width` bits starting at bit `offset` of a 16-bit
    /// register.
    fn write_field(
        &self,
        dev: DevNum,
        block: u8,
        reg: u8,
        offset: u8,
        width: u8,
        val: u16,
    ) -> HalResult<()> {
        check_field(offset, width, 16)?;
        let mask = field_mask(width) << offset;
        let old = self.read_reg(dev, block, reg)? as u32;
        let new = (old & !mask) | (((val as u32) << offset) & mask);
        self.write_reg(dev, block, reg, new as u16)
    }

    /// Read `width` bits starting at bit `offset` of a 32-bit register.
    fn read_field32(
        &self,
        dev: DevNum,
        block: u8,
        reg: u8,
        offset: u8,
        width: u8,
    ) -> HalResult<u32> {
        check_field(offset, width, 32)?;
        let v = self.read_reg32(dev, block, reg)?;
        Ok((v >> offset) & field_mask(width))
    }

    /// Read-modify-write `width` bits starting at bit `offset` of a 32-bit
    /// register.
    fn write_field32(
        &self,
        dev: DevNum,
        block: u8,
        reg: u8,
        offset: u8,
        width: u8,
        val: u32,
    ) -> HalResult<()> {
        check_field(offset, width, 32)?;
        let mask = field_mask(width) << offset;
        let old = self.read_reg32(dev, block, reg)?;
        let new = (old & !mask) | ((val << offset) & mask);
        self.write_reg32(dev, block, reg, new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    mockall::mock! {
        pub Bus {}
        impl RegAccess for Bus {
            fn read_reg(
                &self,
                dev: DevNum,
                block: u8,
                reg: u8,
            ) -> HalResult<u16>;
            fn write_reg(
                &self,
                dev: DevNum,
                block: u8,
                reg: u8,
                val: u16,
            ) -> HalResult<()>;
            fn read_reg32(
                &self,
                dev: DevNum,
                block: u8,
                reg: u8,
            ) -> HalResult<u32>;
            fn write_reg32(
                &self,
                dev: DevNum,
                block: u8,
                reg: u8,
                val: u32,
            ) -> HalResult<()>;
        }
    }

    #[test]
    fn test_write_field_preserves_neighbors() {
        let mut bus = MockBus::new();
        bus.expect_read_reg()
            .with(eq(0), eq(0x1b), eq(0x05))
            .once()
            .return_once(|_, _, _| Ok(0xf00f));
        bus.expect_write_reg()
            .with(eq(0), eq(0x1b), eq(0x05), eq(0xf5af))
            .once()
            .return_once(|_, _, _, _| Ok(()));

        bus.write_field(0, 0x1b, 0x05, 4, 8, 0x5a).unwrap();
    }

    #[test]
    fn test_read_field() {
        let mut bus = MockBus::new();
        bus.expect_read_reg().returning(|_, _, _| Ok(0b1011_0000));
        assert_eq!(bus.read_field(0, 0, 0, 4, 4).unwrap(), 0b1011);
        assert!(matches!(
            bus.read_field(0, 0, 0, 12, 8),
            Err(HalError::BadParam(_))
        ));
    }

    #[test]
    fn test_write_field32_preserves_neighbors() {
        let mut bus = MockBus::new();
        bus.expect_read_reg().never();
        bus.expect_write_reg().never();
        bus.expect_read_reg32()
            .with(eq(0), eq(0x16), eq(0x01))
            .once()
            .return_once(|_, _, _| Ok(0xdead_beef));
        bus.expect_write_reg32()
            .with(eq(0), eq(0x16), eq(0x01), eq(0xdead_beee))
            .once()
            .return_once(|_, _, _, _| Ok(()));

        // Only the two low bits change.
        bus.write_field32(0, 0x16, 0x01, 0, 2, 0x2).unwrap();
    }

    #[test]
    fn test_field32_bounds() {
        let mut bus = MockBus::new();
        bus.expect_read_reg32().returning(|_, _, _| Ok(0x8000_0001));
        bus.expect_write_reg32().never();
        assert_eq!(bus.read_field32(0, 0, 0, 31, 1).unwrap(), 1);
        assert_eq!(bus.read_field32(0, 0, 0, 0, 32).unwrap(), 0x8000_0001);
        assert!(matches!(
            bus.write_field32(0, 0, 0, 24, 9, 0),
            Err(HalError::BadParam(_))
        ));
        assert!(matches!(
            bus.read_field32(0, 0, 0, 0, 0),
            Err(HalError::BadParam(_))
        ));
    }

    #[test]
    fn test_field32_needs_wide_registers() {
        struct Narrow;
        impl RegAccess for Narrow {
            fn read_reg(&self, _: DevNum, _: u8, _: u8) -> HalResult<u16> {
                Ok(0)
            }
            fn write_reg(
                &self,
                _: DevNum,
                _: u8,
                _: u8,
                _: u16,
            ) -> HalResult<()> {
                Ok(())
            }
        }
        assert!(matches!(
            Narrow.write_field32(0, 0, 0, 0, 4, 1),
            Err(HalError::NotSupported(_))
        ));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of::<()>(&Ok(())).to_string(), "MSD_OK");
        assert_eq!(HalError::InvalidPort(3).status(), Status::BadParam);
        assert_eq!(HalError::NoSuch.status().to_string(), "MSD_NO_SUCH");
        let timeout = HalError::HardwareTimeout {
            block: 0x1b,
            reg: 5,
            waited: Duration::from_millis(2),
        };
        assert_eq!(timeout.status(), Status::Fail);
        assert_eq!(
            HalError::NotSupported("x".into()).status().to_string(),
            "MSD_NOT_SUPPORTED"
        );
    }
}
