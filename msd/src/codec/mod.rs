// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! Packing of typed table entries into the data words staged through a
//! table's register window.  Everything here is pure: entries arrive with
//! ports already in physical order, and the layouts come from the chip
//! configuration.

pub mod arp;
pub mod frer;
pub mod macsec;
pub mod macsec_sc;
pub mod pirl;
pub mod qos;
pub mod stu;
pub mod tcam;
pub mod tcam_rc;
pub mod vtu;
