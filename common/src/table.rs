// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The stateful on-chip tables reachable through the table operation
/// protocol.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TableKind {
    /// Spanning tree state per SID
    Stu,
    /// VLAN membership per VID
    Vtu,
    /// Routing MAC replacement / multicast duplication
    Arp,
    /// Ingress classifier
    Tcam,
    /// TCAM range comparators
    TcamRc,
    /// Ingress rate limiting resources
    Pirl,
    /// 802.1CB sequence recovery
    FrerRecovery,
    /// 802.1CB sequence generation
    FrerSeqGen,
    /// MACsec secure associations
    MacsecSa,
    /// MACsec secure channels
    MacsecSc,
    /// Egress queue scheduling weights
    QosWeight,
}

/// Return a vector containing all of the table kinds.
pub fn get_table_kinds() -> Vec<TableKind> {
    TableKind::iter().collect()
}
