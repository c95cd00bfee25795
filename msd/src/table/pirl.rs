// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! Ingress rate limiting.  Each port has a small set of bucket resources,
//! addressed by (physical port, resource) and spread over eight pages of a
//! single data register.

use hal::{HalError, HalResult};

use super::check_range;
use crate::chip::PIRL_RESOURCE_BITS;
use crate::codec::pirl::{self as codec, PirlLayout};
use crate::device::Device;
use crate::engine::Engine;
use crate::layout::{Frame, Table};

pub const BUCKET_SIZE_MAX: u32 = 0xff_ffff;
pub const BKT_INCREMENT_MAX: u16 = 0xfff;
pub const BKT_TYPE_MASK_MAX: u16 = 0x7fff;

/// What the port does once the bucket is exhausted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExhaustAction {
    #[default]
    Drop = 0,
    FlowControl = 1,
}

/// When flow control is deasserted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FcMode {
    #[default]
    WhenEmpty = 0,
    WhenBelowCbs = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PirlData {
    /// Which frame types are accounted against this bucket.  Zero leaves
    /// the resource idle.
    pub bkt_type_mask: u16,
    pub tcam_flows: bool,
    pub color_aware: bool,
    pub account_filtered: bool,
    pub account_discarded: bool,
    pub exhaust_action: ExhaustAction,
    pub fc_mode: FcMode,
    /// Committed burst size.
    pub cbs: u32,
    /// Excess burst size.
    pub ebs: u32,
    pub bkt_increment: u16,
    pub rate_factor: u16,
}

impl Default for PirlData {
    /// The idle resource a reset leaves behind.
    fn default() -> Self {
        PirlData {
            bkt_type_mask: 0,
            tcam_flows: false,
            color_aware: false,
            account_filtered: true,
            account_discarded: false,
            exhaust_action: ExhaustAction::Drop,
            fc_mode: FcMode::WhenEmpty,
            cbs: 0,
            ebs: BUCKET_SIZE_MAX,
            bkt_increment: 0,
            rate_factor: 0,
        }
    }
}

/// A rate limiting resource on a logical port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PirlEntry {
    pub port: u8,
    pub resource: u8,
    pub data: PirlData,
}

fn binding(dev: &Device) -> HalResult<&'static Table<PirlLayout>> {
    dev.chip().pirl.as_ref().ok_or_else(|| {
        HalError::NotSupported(format!("pirl table on {}", dev.family()))
    })
}

fn index(
    dev: &Device,
    t: &Table<PirlLayout>,
    lport: u8,
    resource: u8,
) -> HalResult<u32> {
    check_range("resource", resource as u32, t.layout.max_resource as u32)?;
    let pport = dev.ports().to_physical(lport)?;
    Ok(((pport as u32) << PIRL_RESOURCE_BITS) | resource as u32)
}

fn validate(d: &PirlData) -> HalResult<()> {
    check_range(
        "bucket type mask",
        d.bkt_type_mask as u32,
        BKT_TYPE_MASK_MAX as u32,
    )?;
    check_range("cbs", d.cbs, BUCKET_SIZE_MAX)?;
    check_range("ebs", d.ebs, BUCKET_SIZE_MAX)?;
    check_range(
        "bucket increment",
        d.bkt_increment as u32,
        BKT_INCREMENT_MAX as u32,
    )
}

pub fn write_resource(
    dev: &Device,
    lport: u8,
    resource: u8,
    data: &PirlData,
) -> HalResult<()> {
    let t = binding(dev)?;
    let index = index(dev, t, lport, resource)?;
    validate(data)?;
    let mut frame = Frame::new(t.spec.data.words());
    codec::encode(&t.layout, data, &mut frame);
    Engine::new(dev, &t.spec).load_entry(index, &frame)
}

pub fn read_resource(
    dev: &Device,
    lport: u8,
    resource: u8,
) -> HalResult<PirlData> {
    let t = binding(dev)?;
    let index = index(dev, t, lport, resource)?;
    let (_, frame) = Engine::new(dev, &t.spec).read_entry(index)?;
    Ok(codec::decode(&t.layout, &frame))
}

/// Return one resource to its idle state.
pub fn reset_resource(dev: &Device, lport: u8, resource: u8) -> HalResult<()> {
    write_resource(dev, lport, resource, &PirlData::default())
}

/// Reset every resource of every port.
pub fn init_all(dev: &Device) -> HalResult<()> {
    Engine::new(dev, &binding(dev)?.spec).flush_all()
}
