// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! Table access for managed Ethernet switch chips.
//!
//! Each table on the chip is driven through an operation register: the
//! caller stages entry data in a window of data registers, writes an opcode
//! with the busy bit set, and polls until the engine clears it.  A
//! [`Device`] holds the per-family semaphores that serialize these
//! transactions, and the modules under [`table`] expose typed entries for
//! each table.

pub mod chaos;
pub mod chip;
pub mod codec;
pub mod device;
pub mod engine;
pub mod layout;
pub mod sim;
pub mod table;

pub use chip::{ChipConfig, ChipFamily, TableFamily};
pub use device::{Device, DeviceConfig, DEFAULT_POLL_TIMEOUT_US};
pub use layout::Frame;
pub use table::{AnyEntry, TableEntry, TableRow};

pub use common::table::TableKind;
pub use hal::{HalError, HalResult, Status};
