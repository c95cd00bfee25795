// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! Pieces shared by the switch HAL crates: logger construction, layer-2
//! address handling, and the catalog of hardware tables.

pub mod logging;
pub mod network;
pub mod table;
