// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use slog::{o, Logger};
use strum::IntoEnumIterator;

use hal::{
    BinarySemaphore, DevNum, HalError, HalResult, PortMap, RegAccess,
    Semaphore,
};

use crate::chip::{ChipConfig, ChipFamily, TableFamily};

/// Default limit on how long a table engine may stay busy.
pub const DEFAULT_POLL_TIMEOUT_US: u64 = 2000;

/// The attach-time settings for one switch device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Address of the device on the management bus.
    pub dev_num: DevNum,

    /// Which constant table describes the device.
    pub chip: ChipFamily,

    /// Physical port for each logical port.  If not set, logical and
    /// physical ports are the same.
    pub port_map: Option<Vec<u8>>,

    /// How long to wait for a table engine to go idle, in microseconds.
    pub poll_timeout_us: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            dev_num: 0,
            chip: ChipFamily::default(),
            port_map: None,
            poll_timeout_us: DEFAULT_POLL_TIMEOUT_US,
        }
    }
}

impl DeviceConfig {
    pub fn from_toml(s: &str) -> HalResult<Self> {
        toml::from_str(s).map_err(|e| {
            HalError::BadParam(format!("invalid device config: {e}"))
        })
    }

    pub fn load(path: &Path) -> HalResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            HalError::BadParam(format!("reading {}: {e}", path.display()))
        })?;
        Self::from_toml(&s)
    }
}

/// An attached switch device.  Everything here is fixed at attach time.
pub struct Device {
    dev_num: DevNum,
    chip: &'static ChipConfig,
    ports: PortMap,
    bus: Arc<dyn RegAccess>,
    sems: BTreeMap<TableFamily, Arc<dyn Semaphore>>,
    poll_timeout: Duration,
    log: Logger,
}

impl Device {
    pub fn attach(
        log: &Logger,
        config: &DeviceConfig,
        bus: Arc<dyn RegAccess>,
    ) -> HalResult<Self> {
        let chip = config.chip.config();
        let ports = match &config.port_map {
            Some(map) => PortMap::new(map.clone(), chip.num_ports)?,
            None => PortMap::identity(chip.num_ports),
        };
        let sems = TableFamily::iter()
            .map(|f| {
                let s: Arc<dyn Semaphore> = Arc::new(BinarySemaphore::new());
                (f, s)
            })
            .collect();
        let log = log.new(o!(
            "unit" => "msd",
            "dev" => config.dev_num,
            "chip" => config.chip.to_string(),
        ));
        slog::debug!(log, "attached";
            "ports" => ports.len(),
            "tables" => chip.specs().len());

        Ok(Device {
            dev_num: config.dev_num,
            chip,
            ports,
            bus,
            sems,
            poll_timeout: Duration::from_micros(config.poll_timeout_us),
            log,
        })
    }

    /// Replace the lock guarding one table family.
    pub fn with_semaphore(
        mut self,
        family: TableFamily,
        sem: Arc<dyn Semaphore>,
    ) -> Self {
        self.sems.insert(family, sem);
        self
    }

    pub fn dev_num(&self) -> DevNum {
        self.dev_num
    }

    pub fn chip(&self) -> &'static ChipConfig {
        self.chip
    }

    pub fn family(&self) -> ChipFamily {
        self.chip.family
    }

    pub fn ports(&self) -> &PortMap {
        &self.ports
    }

    pub fn bus(&self) -> &dyn RegAccess {
        self.bus.as_ref()
    }

    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    pub fn log(&self) -> &Logger {
        &self.log
    }

    pub fn semaphore(&self, family: TableFamily) -> HalResult<&dyn Semaphore> {
        self.sems
            .get(&family)
            .map(|s| s.as_ref())
            .ok_or_else(|| HalError::Internal(format!("no lock for {family}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimSwitch;

    #[test]
    fn test_config_from_toml() -> anyhow::Result<()> {
        let cfg = DeviceConfig::from_toml(
            r#"
            dev_num = 2
            chip = "fir"
            port_map = [1, 0, 2]
            "#,
        )?;
        assert_eq!(cfg.dev_num, 2);
        assert_eq!(cfg.chip, ChipFamily::Fir);
        assert_eq!(cfg.port_map, Some(vec![1, 0, 2]));
        assert_eq!(cfg.poll_timeout_us, DEFAULT_POLL_TIMEOUT_US);

        assert!(DeviceConfig::from_toml("chip = \"granite\"").is_err());
        Ok(())
    }

    #[test]
    fn test_attach_rejects_bad_port_map() {
        let log = common::logging::test_logger();
        let cfg = DeviceConfig {
            chip: ChipFamily::Topaz,
            port_map: Some(vec![0, 9]),
            ..Default::default()
        };
        let bus = Arc::new(SimSwitch::new(ChipFamily::Topaz));
        assert!(matches!(
            Device::attach(&log, &cfg, bus),
            Err(HalError::InvalidPort(9))
        ));
    }
}
