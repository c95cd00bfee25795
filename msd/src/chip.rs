// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

//! Per-chip constant tables.  Each chip family binds the tables it
//! implements to their register placement and entry layout; tables a chip
//! lacks are simply absent.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use common::table::TableKind;

use crate::codec::arp::ArpLayout;
use crate::codec::frer::{RecoveryLayout, SeqGenLayout};
use crate::codec::macsec::SaLayout;
use crate::codec::macsec_sc::ScLayout;
use crate::codec::pirl::PirlLayout;
use crate::codec::qos::QosWeightLayout;
use crate::codec::stu::StuLayout;
use crate::codec::tcam::{TcamActionLayout, TcamLayout};
use crate::codec::tcam_rc::TcamRcLayout;
use crate::codec::vtu::VtuLayout;
use crate::layout::{
    DataWindow, ExtLayout, Field, OpLayout, Opcodes, PortSlots, RegField,
    RegWidth, Table, TableSpec,
};

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChipFamily {
    Topaz,
    Peridot,
    #[default]
    Amethyst,
    Oak,
    Spruce,
    Bonsai,
    BonsaiZ1,
    Fir,
}

impl ChipFamily {
    pub fn config(&self) -> &'static ChipConfig {
        match self {
            ChipFamily::Topaz => &TOPAZ,
            ChipFamily::Peridot => &PERIDOT,
            ChipFamily::Amethyst => &AMETHYST,
            ChipFamily::Oak => &OAK,
            ChipFamily::Spruce => &SPRUCE,
            ChipFamily::Bonsai => &BONSAI,
            ChipFamily::BonsaiZ1 => &BONSAI_Z1,
            ChipFamily::Fir => &FIR,
        }
    }
}

/// Tables that share a table engine, and so a lock.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter,
)]
pub enum TableFamily {
    /// STU, VTU and ARP
    Atu,
    /// TCAM and TCAM range comparators
    Tcam,
    Pirl,
    Frer,
    /// MACsec secure associations
    Macsec,
    /// MACsec secure channels
    MacsecSc,
    Qos,
}

#[derive(Debug)]
pub struct ChipConfig {
    pub family: ChipFamily,
    pub num_ports: u8,
    pub stu: Option<Table<StuLayout>>,
    pub vtu: Option<Table<VtuLayout>>,
    pub arp: Option<Table<ArpLayout>>,
    pub tcam: Option<Table<TcamLayout>>,
    pub tcam_rc: Option<Table<TcamRcLayout>>,
    pub pirl: Option<Table<PirlLayout>>,
    pub frer_recovery: Option<Table<RecoveryLayout>>,
    pub frer_seq_gen: Option<Table<SeqGenLayout>>,
    pub macsec_sa: Option<Table<SaLayout>>,
    pub macsec_sc: Option<Table<ScLayout>>,
    pub qos_weight: Option<Table<QosWeightLayout>>,
}

impl ChipConfig {
    /// The register placement of a table, if this chip has it.
    pub fn spec(&self, kind: TableKind) -> Option<&TableSpec> {
        match kind {
            TableKind::Stu => self.stu.as_ref().map(|t| &t.spec),
            TableKind::Vtu => self.vtu.as_ref().map(|t| &t.spec),
            TableKind::Arp => self.arp.as_ref().map(|t| &t.spec),
            TableKind::Tcam => self.tcam.as_ref().map(|t| &t.spec),
            TableKind::TcamRc => self.tcam_rc.as_ref().map(|t| &t.spec),
            TableKind::Pirl => self.pirl.as_ref().map(|t| &t.spec),
            TableKind::FrerRecovery => {
                self.frer_recovery.as_ref().map(|t| &t.spec)
            }
            TableKind::FrerSeqGen => {
                self.frer_seq_gen.as_ref().map(|t| &t.spec)
            }
            TableKind::MacsecSa => self.macsec_sa.as_ref().map(|t| &t.spec),
            TableKind::MacsecSc => self.macsec_sc.as_ref().map(|t| &t.spec),
            TableKind::QosWeight => {
                self.qos_weight.as_ref().map(|t| &t.spec)
            }
        }
    }

    /// Every table this chip implements.
    pub fn specs(&self) -> Vec<&TableSpec> {
        common::table::get_table_kinds()
            .into_iter()
            .filter_map(|k| self.spec(k))
            .collect()
    }
}

// Operation registers share one shape: busy in bit 15, opcode in 14:12.
const BUSY_BIT: u8 = 15;
const OPCODE_OFFSET: u8 = 12;
const OPCODE_WIDTH: u8 = 3;

const fn op(
    block: u8,
    op_reg: u8,
    opcodes: Opcodes,
    index: &'static [RegField],
    valid: Option<RegField>,
) -> OpLayout {
    OpLayout {
        block,
        op_reg,
        busy_bit: BUSY_BIT,
        opcode_offset: OPCODE_OFFSET,
        opcode_width: OPCODE_WIDTH,
        opcodes,
        index,
        valid,
    }
}

const fn window16(block: u8, regs: &'static [u8]) -> DataWindow {
    DataWindow {
        block,
        regs,
        pages: 1,
        width: RegWidth::Bits16,
        ext: None,
    }
}

// STU / VTU

const VTU_BLOCK: u8 = 0x1b;
const VTU_OP: u8 = 0x05;
const VTU_VID: u8 = 0x06;
const VTU_VALID: RegField = RegField::new(VTU_VID, 12, 1);

const VTU_OPCODES: Opcodes = Opcodes {
    flush_all: Some(1),
    load: Some(3),
    read: None,
    get_next: Some(4),
};

const STU_OPCODES: Opcodes = Opcodes {
    flush_all: None,
    load: Some(5),
    read: None,
    get_next: Some(6),
};

/// The low twelve VID bits plus the page bit.
const VTU_INDEX: &[RegField] =
    &[RegField::new(VTU_VID, 0, 12), RegField::new(VTU_VID, 13, 1)];
const VTU_INDEX_4K: &[RegField] = &[RegField::new(VTU_VID, 0, 12)];

pub(crate) const VTU_LAYOUT: VtuLayout = VtuLayout {
    fid: Field::new(0, 0, 12),
    vid_policy: Field::new(0, 12, 1),
    dont_learn: Field::new(0, 13, 1),
    igmp_mld_snoop: Field::new(0, 14, 1),
    filter_uc: Field::new(0, 15, 1),
    sid: Field::new(1, 0, 6),
    filter_bc: Field::new(1, 6, 1),
    filter_mc: Field::new(1, 7, 1),
    vid_qpri: Field::new(1, 8, 3),
    use_vid_qpri: Field::new(1, 11, 1),
    vid_fpri: Field::new(1, 12, 3),
    use_vid_fpri: Field::new(1, 15, 1),
    tags: PortSlots {
        first_word: 2,
        bits: 2,
        per_word: 8,
        overrides: &[],
    },
};

const fn vtu(index: &'static [RegField], max_index: u32) -> Table<VtuLayout> {
    Table {
        spec: TableSpec {
            kind: TableKind::Vtu,
            family: TableFamily::Atu,
            op: op(VTU_BLOCK, VTU_OP, VTU_OPCODES, index, Some(VTU_VALID)),
            data: window16(VTU_BLOCK, &[0x02, 0x03, 0x07, 0x08, 0x09]),
            max_index,
        },
        layout: VTU_LAYOUT,
    }
}

const STU_SLOTS: PortSlots = PortSlots {
    first_word: 0,
    bits: 2,
    per_word: 8,
    overrides: &[],
};

const fn stu(regs: &'static [u8], ports: PortSlots) -> Table<StuLayout> {
    Table {
        spec: TableSpec {
            kind: TableKind::Stu,
            family: TableFamily::Atu,
            op: op(
                VTU_BLOCK,
                VTU_OP,
                STU_OPCODES,
                &const { [RegField::new(0x03, 0, 6)] },
                Some(VTU_VALID),
            ),
            data: window16(VTU_BLOCK, regs),
            max_index: 0x3f,
        },
        layout: StuLayout { ports },
    }
}

// ARP

const ARP_BLOCK: u8 = 0x1c;
const ARP_OP: u8 = 0x10;

pub(crate) const ARP_LAYOUT: ArpLayout = ArpLayout {
    mac: [
        Field::new(2, 0, 16),
        Field::new(1, 0, 16),
        Field::new(0, 0, 16),
    ],
    counts: PortSlots {
        first_word: 0,
        bits: 4,
        per_word: 4,
        overrides: &[],
    },
};

const ARP: Table<ArpLayout> = Table {
    spec: TableSpec {
        kind: TableKind::Arp,
        family: TableFamily::Atu,
        op: op(
            ARP_BLOCK,
            ARP_OP,
            Opcodes {
                flush_all: Some(1),
                load: Some(3),
                read: Some(4),
                get_next: None,
            },
            &[RegField::new(ARP_OP, 0, 10)],
            Some(RegField::new(ARP_OP, 11, 1)),
        ),
        data: window16(ARP_BLOCK, &[0x12, 0x13, 0x14]),
        max_index: 0x3ff,
    },
    layout: ARP_LAYOUT,
};

// TCAM and range comparators

const TCAM_BLOCK: u8 = 0x1f;
const TCAM_OP: u8 = 0x00;
const TCAM_RC_OP: u8 = 0x1c;

const TCAM_OPCODES: Opcodes = Opcodes {
    flush_all: Some(1),
    load: Some(3),
    read: Some(6),
    get_next: Some(5),
};

/// Registers 0x02 through 0x1b, one window page.
const TCAM_REGS: &[u8] = &[
    0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
    0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19,
    0x1a, 0x1b,
];

/// Registers 0x02 through 0x19.
const TCAM_RC_REGS: &[u8] = &[
    0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
    0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19,
];

const TCAM_EXT_REG: u8 = 0x01;

pub(crate) const TCAM_LAYOUT: TcamLayout = TcamLayout {
    frame_type_key: Field::new(0, 0, 2),
    frame_type_mask: Field::new(0, 8, 2),
    spv_key: Field::new(1, 0, 12),
    spv_mask: Field::new(2, 0, 12),
    octets: &[(4, 22), (26, 26)],
    action: TcamActionLayout {
        continue_next: Field::new(52, 15, 1),
        interrupt: Field::new(52, 14, 1),
        inc_counter: Field::new(52, 13, 1),
        vid_override: Field::new(52, 12, 1),
        vid: Field::new(52, 0, 12),
        next_id: Field::new(53, 0, 8),
        fpri_override: Field::new(54, 15, 1),
        fpri: Field::new(54, 12, 3),
        qpri_override: Field::new(54, 11, 1),
        qpri: Field::new(54, 8, 3),
        dscp_override: Field::new(54, 7, 1),
        dscp: Field::new(54, 0, 6),
        dpv_override: Field::new(55, 15, 1),
        dpv: Field::new(55, 0, 12),
    },
};

const fn tcam(max_index: u32) -> Table<TcamLayout> {
    Table {
        spec: TableSpec {
            kind: TableKind::Tcam,
            family: TableFamily::Tcam,
            op: op(
                TCAM_BLOCK,
                TCAM_OP,
                TCAM_OPCODES,
                &const { [RegField::new(TCAM_OP, 0, 8)] },
                Some(RegField::new(TCAM_OP, 11, 1)),
            ),
            data: DataWindow {
                block: TCAM_BLOCK,
                regs: TCAM_REGS,
                pages: 3,
                width: RegWidth::Bits16,
                ext: Some(ExtLayout {
                    reg: TCAM_EXT_REG,
                    offset: 12,
                    width: 3,
                    first_block: 1,
                }),
            },
            max_index,
        },
        layout: TCAM_LAYOUT,
    }
}

pub(crate) const TCAM_RC_LAYOUT: TcamRcLayout = TcamRcLayout {
    stride: 3,
    selector: Field::new(0, 0, 3),
    operator: Field::new(0, 3, 1),
    low: Field::new(1, 0, 16),
    high: Field::new(2, 0, 16),
};

const TCAM_RC: Table<TcamRcLayout> = Table {
    spec: TableSpec {
        kind: TableKind::TcamRc,
        family: TableFamily::Tcam,
        op: op(
            TCAM_BLOCK,
            TCAM_RC_OP,
            TCAM_OPCODES,
            &[RegField::new(TCAM_RC_OP, 0, 6)],
            Some(RegField::new(TCAM_RC_OP, 11, 1)),
        ),
        data: DataWindow {
            block: TCAM_BLOCK,
            regs: TCAM_RC_REGS,
            pages: 1,
            width: RegWidth::Bits16,
            ext: Some(ExtLayout {
                reg: TCAM_EXT_REG,
                offset: 12,
                width: 3,
                first_block: 4,
            }),
        },
        max_index: 0x3f,
    },
    layout: TCAM_RC_LAYOUT,
};

// PIRL

const PIRL_BLOCK: u8 = 0x1c;
const PIRL_OP: u8 = 0x01;

/// Bits of the PIRL index holding the resource number.  The physical port
/// sits above them.
pub(crate) const PIRL_RESOURCE_BITS: u8 = 3;

pub(crate) const PIRL_LAYOUT: PirlLayout = PirlLayout {
    max_resource: 7,
    bkt_type_mask: Field::new(0, 0, 15),
    tcam_flows: Field::new(0, 15, 1),
    color_aware: Field::new(1, 0, 1),
    account_filtered: Field::new(1, 1, 1),
    account_discarded: Field::new(1, 2, 1),
    exhaust_action: Field::new(1, 4, 1),
    fc_mode: Field::new(1, 5, 1),
    cbs: [Field::new(2, 0, 16), Field::new(3, 0, 8)],
    ebs: [Field::new(4, 0, 16), Field::new(3, 8, 8)],
    bkt_increment: Field::new(5, 0, 12),
    rate_factor: Field::new(6, 0, 16),
};

const fn pirl(num_ports: u8, max_resource: u8) -> Table<PirlLayout> {
    Table {
        spec: TableSpec {
            kind: TableKind::Pirl,
            family: TableFamily::Pirl,
            op: op(
                PIRL_BLOCK,
                PIRL_OP,
                Opcodes {
                    flush_all: Some(1),
                    load: Some(3),
                    read: Some(4),
                    get_next: None,
                },
                &const {
                    [
                        RegField::new(PIRL_OP, 0, PIRL_RESOURCE_BITS),
                        RegField::new(PIRL_OP, 8, 4),
                    ]
                },
                None,
            ),
            data: DataWindow {
                block: PIRL_BLOCK,
                regs: &[0x02],
                pages: 8,
                width: RegWidth::Bits16,
                ext: Some(ExtLayout {
                    reg: 0x03,
                    offset: 0,
                    width: 4,
                    first_block: 1,
                }),
            },
            max_index: ((num_ports as u32 - 1) << PIRL_RESOURCE_BITS)
                | max_resource as u32,
        },
        layout: PirlLayout {
            max_resource,
            ..PIRL_LAYOUT
        },
    }
}

// FRER

const FRER_BLOCK: u8 = 0x15;
const FRER_OP: u8 = 0x00;
const FRER_INDEX: &[RegField] = &[RegField::new(FRER_OP, 0, 6)];
const FRER_VALID: RegField = RegField::new(FRER_OP, 11, 1);

pub(crate) const FRER_RECOVERY_LAYOUT: RecoveryLayout = RecoveryLayout {
    take_no_seq: Field::new(0, 0, 1),
    individual: Field::new(0, 1, 1),
    latent_error_detect: Field::new(0, 2, 1),
    algorithm: Field::new(0, 4, 1),
    history_len: Field::new(0, 8, 5),
    reset_time: Field::new(0, 16, 12),
    seq_num: Field::new(1, 0, 16),
    passed: Field::new(2, 0, 32),
    discarded: Field::new(3, 0, 32),
    out_of_order: Field::new(4, 0, 32),
    rogue: Field::new(5, 0, 32),
    lost: Field::new(6, 0, 32),
};

pub(crate) const FRER_SEQ_GEN_LAYOUT: SeqGenLayout = SeqGenLayout {
    next_seq: Field::new(0, 0, 16),
};

const fn frer_window(regs: &'static [u8]) -> DataWindow {
    DataWindow {
        block: FRER_BLOCK,
        regs,
        pages: 1,
        width: RegWidth::Bits32,
        ext: None,
    }
}

const fn frer_recovery(max_index: u32) -> Table<RecoveryLayout> {
    Table {
        spec: TableSpec {
            kind: TableKind::FrerRecovery,
            family: TableFamily::Frer,
            op: op(
                FRER_BLOCK,
                FRER_OP,
                Opcodes {
                    flush_all: Some(1),
                    load: Some(2),
                    read: Some(3),
                    get_next: None,
                },
                FRER_INDEX,
                Some(FRER_VALID),
            ),
            data: frer_window(&[0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a]),
            max_index,
        },
        layout: FRER_RECOVERY_LAYOUT,
    }
}

const fn frer_seq_gen(max_index: u32) -> Table<SeqGenLayout> {
    Table {
        spec: TableSpec {
            kind: TableKind::FrerSeqGen,
            family: TableFamily::Frer,
            op: op(
                FRER_BLOCK,
                FRER_OP,
                Opcodes {
                    flush_all: Some(4),
                    load: Some(5),
                    read: Some(6),
                    get_next: None,
                },
                FRER_INDEX,
                Some(FRER_VALID),
            ),
            data: frer_window(&[0x04]),
            max_index,
        },
        layout: FRER_SEQ_GEN_LAYOUT,
    }
}

// MACsec

const MACSEC_BLOCK: u8 = 0x16;
const MACSEC_OP: u8 = 0x00;

pub(crate) const MACSEC_SA_LAYOUT: SaLayout = SaLayout {
    cipher: Field::new(0, 0, 2),
    an: Field::new(0, 4, 2),
    ssci: Field::new(1, 0, 32),
    next_pn: [Field::new(2, 0, 32), Field::new(3, 0, 32)],
    key_word: 4,
    salt_word: 12,
};

const MACSEC_SA: Table<SaLayout> = Table {
    spec: TableSpec {
        kind: TableKind::MacsecSa,
        family: TableFamily::Macsec,
        op: op(
            MACSEC_BLOCK,
            MACSEC_OP,
            Opcodes {
                flush_all: Some(1),
                load: Some(3),
                read: Some(4),
                get_next: Some(5),
            },
            &[RegField::new(MACSEC_OP, 0, 5)],
            Some(RegField::new(MACSEC_OP, 11, 1)),
        ),
        data: DataWindow {
            block: MACSEC_BLOCK,
            regs: &[0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09],
            pages: 2,
            width: RegWidth::Bits32,
            ext: Some(ExtLayout {
                reg: 0x01,
                offset: 0,
                width: 2,
                first_block: 1,
            }),
        },
        max_index: 0x1f,
    },
    layout: MACSEC_SA_LAYOUT,
};

const MACSEC_SC_BLOCK: u8 = 0x17;
const MACSEC_SC_OP: u8 = 0x00;

pub(crate) const MACSEC_SC_LAYOUT: ScLayout = ScLayout {
    sci: [Field::new(0, 0, 32), Field::new(1, 0, 32)],
    port: Field::new(2, 0, 4),
    direction: Field::new(2, 4, 1),
    encoding_an: Field::new(2, 8, 2),
    protect_frames: Field::new(2, 12, 1),
    replay_protect: Field::new(2, 13, 1),
    validate_frames: Field::new(2, 16, 2),
    replay_window: Field::new(3, 0, 32),
};

const MACSEC_SC: Table<ScLayout> = Table {
    spec: TableSpec {
        kind: TableKind::MacsecSc,
        family: TableFamily::MacsecSc,
        op: op(
            MACSEC_SC_BLOCK,
            MACSEC_SC_OP,
            Opcodes {
                flush_all: Some(1),
                load: Some(3),
                read: Some(4),
                get_next: Some(5),
            },
            &[RegField::new(MACSEC_SC_OP, 0, 4)],
            Some(RegField::new(MACSEC_SC_OP, 11, 1)),
        ),
        data: DataWindow {
            block: MACSEC_SC_BLOCK,
            regs: &[0x02, 0x03, 0x04, 0x05],
            pages: 1,
            width: RegWidth::Bits32,
            ext: None,
        },
        max_index: 0x0f,
    },
    layout: MACSEC_SC_LAYOUT,
};

// QoS weights

const QOS_BLOCK: u8 = 0x1a;
const QOS_OP: u8 = 0x00;

pub(crate) const QOS_WEIGHT_LAYOUT: QosWeightLayout = QosWeightLayout {
    weights: [
        Field::new(0, 0, 7),
        Field::new(0, 8, 7),
        Field::new(1, 0, 7),
        Field::new(1, 8, 7),
        Field::new(2, 0, 7),
        Field::new(2, 8, 7),
        Field::new(3, 0, 7),
        Field::new(3, 8, 7),
    ],
    strict: Field::new(4, 0, 8),
};

const QOS_WEIGHT: Table<QosWeightLayout> = Table {
    spec: TableSpec {
        kind: TableKind::QosWeight,
        family: TableFamily::Qos,
        op: op(
            QOS_BLOCK,
            QOS_OP,
            Opcodes {
                flush_all: Some(1),
                load: Some(2),
                read: Some(3),
                get_next: Some(4),
            },
            &[RegField::new(QOS_OP, 0, 4)],
            Some(RegField::new(QOS_OP, 11, 1)),
        ),
        data: window16(QOS_BLOCK, &[0x01, 0x02, 0x03, 0x04, 0x05]),
        max_index: 0x0f,
    },
    layout: QOS_WEIGHT_LAYOUT,
};

// Chips

pub static TOPAZ: ChipConfig = ChipConfig {
    family: ChipFamily::Topaz,
    num_ports: 7,
    stu: Some(stu(&[0x07, 0x08], STU_SLOTS)),
    vtu: Some(vtu(VTU_INDEX_4K, 0xfff)),
    arp: None,
    tcam: None,
    tcam_rc: None,
    pirl: Some(pirl(7, 3)),
    frer_recovery: None,
    frer_seq_gen: None,
    macsec_sa: None,
    macsec_sc: None,
    qos_weight: None,
};

pub static PERIDOT: ChipConfig = ChipConfig {
    family: ChipFamily::Peridot,
    num_ports: 11,
    stu: Some(stu(&[0x07, 0x08], STU_SLOTS)),
    vtu: Some(vtu(VTU_INDEX, 0x1fff)),
    arp: None,
    tcam: Some(tcam(0xff)),
    tcam_rc: None,
    pirl: Some(pirl(11, 7)),
    frer_recovery: None,
    frer_seq_gen: None,
    macsec_sa: None,
    macsec_sc: None,
    qos_weight: Some(QOS_WEIGHT),
};

pub static AMETHYST: ChipConfig = ChipConfig {
    family: ChipFamily::Amethyst,
    num_ports: 11,
    stu: Some(stu(&[0x07, 0x08], STU_SLOTS)),
    vtu: Some(vtu(VTU_INDEX, 0x1fff)),
    arp: Some(ARP),
    tcam: Some(tcam(0xff)),
    tcam_rc: Some(TCAM_RC),
    pirl: Some(pirl(11, 7)),
    frer_recovery: None,
    frer_seq_gen: None,
    macsec_sa: None,
    macsec_sc: None,
    qos_weight: Some(QOS_WEIGHT),
};

pub static OAK: ChipConfig = ChipConfig {
    family: ChipFamily::Oak,
    num_ports: 11,
    stu: Some(stu(&[0x07, 0x08], STU_SLOTS)),
    vtu: Some(vtu(VTU_INDEX, 0x1fff)),
    arp: Some(ARP),
    tcam: Some(tcam(0x7f)),
    tcam_rc: Some(TCAM_RC),
    pirl: Some(pirl(11, 7)),
    frer_recovery: None,
    frer_seq_gen: None,
    macsec_sa: None,
    macsec_sc: None,
    qos_weight: Some(QOS_WEIGHT),
};

pub static SPRUCE: ChipConfig = ChipConfig {
    family: ChipFamily::Spruce,
    num_ports: 11,
    stu: Some(stu(&[0x07, 0x08], STU_SLOTS)),
    vtu: Some(vtu(VTU_INDEX, 0x1fff)),
    arp: Some(ARP),
    tcam: Some(tcam(0x7f)),
    tcam_rc: Some(TCAM_RC),
    pirl: Some(pirl(11, 7)),
    frer_recovery: None,
    frer_seq_gen: None,
    macsec_sa: None,
    macsec_sc: None,
    qos_weight: Some(QOS_WEIGHT),
};

pub static BONSAI: ChipConfig = ChipConfig {
    family: ChipFamily::Bonsai,
    num_ports: 11,
    stu: Some(stu(&[0x07, 0x08], STU_SLOTS)),
    vtu: Some(vtu(VTU_INDEX, 0x1fff)),
    arp: Some(ARP),
    tcam: Some(tcam(0xff)),
    tcam_rc: Some(TCAM_RC),
    pirl: Some(pirl(11, 7)),
    frer_recovery: Some(frer_recovery(0x3f)),
    frer_seq_gen: Some(frer_seq_gen(0x3f)),
    macsec_sa: Some(MACSEC_SA),
    macsec_sc: Some(MACSEC_SC),
    qos_weight: Some(QOS_WEIGHT),
};

pub static BONSAI_Z1: ChipConfig = ChipConfig {
    family: ChipFamily::BonsaiZ1,
    num_ports: 11,
    stu: Some(stu(&[0x07, 0x08], STU_SLOTS)),
    vtu: Some(vtu(VTU_INDEX, 0x1fff)),
    arp: Some(ARP),
    tcam: Some(tcam(0xff)),
    tcam_rc: Some(TCAM_RC),
    pirl: Some(pirl(11, 7)),
    frer_recovery: Some(frer_recovery(0x3f)),
    frer_seq_gen: Some(frer_seq_gen(0x3f)),
    macsec_sa: None,
    macsec_sc: None,
    qos_weight: Some(QOS_WEIGHT),
};

/// Fir adds a twelfth port whose spanning tree state lives in an extra
/// STU data register.
pub static FIR: ChipConfig = ChipConfig {
    family: ChipFamily::Fir,
    num_ports: 12,
    stu: Some(stu(
        &[0x07, 0x08, 0x09],
        PortSlots {
            overrides: &[(11, Field::new(2, 0, 2))],
            ..STU_SLOTS
        },
    )),
    vtu: Some(vtu(VTU_INDEX, 0x1fff)),
    arp: Some(ARP),
    tcam: Some(tcam(0xff)),
    tcam_rc: Some(TCAM_RC),
    pirl: Some(pirl(12, 7)),
    frer_recovery: Some(frer_recovery(0x1f)),
    frer_seq_gen: Some(frer_seq_gen(0x1f)),
    macsec_sa: None,
    macsec_sc: None,
    qos_weight: Some(QOS_WEIGHT),
};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_index_fields_cover_max() {
        for family in ChipFamily::iter() {
            for spec in family.config().specs() {
                let width = spec.op.index_width();
                assert!(
                    spec.max_index < (1 << width),
                    "{family} {}: max {:#x} does not fit {width} bits",
                    spec.kind,
                    spec.max_index
                );
            }
        }
    }

    #[test]
    fn test_paged_windows_have_ext() {
        for family in ChipFamily::iter() {
            for spec in family.config().specs() {
                if spec.data.pages > 1 {
                    assert!(spec.data.ext.is_some(), "{family} {}", spec.kind);
                }
                // opcodes must fit their field
                let c = spec.op.opcodes;
                for c in [c.flush_all, c.load, c.read, c.get_next]
                    .into_iter()
                    .flatten()
                {
                    assert!(c < (1 << spec.op.opcode_width));
                }
            }
        }
    }

    #[test]
    fn test_families_own_their_op_registers() {
        use std::collections::HashMap;

        for family in ChipFamily::iter() {
            let mut owner = HashMap::new();
            for spec in family.config().specs() {
                let reg = (spec.op.block, spec.op.op_reg);
                let prev = owner.insert(reg, spec.family);
                assert!(
                    prev.is_none() || prev == Some(spec.family),
                    "{family} {}: op register {reg:?} shared across locks",
                    spec.kind
                );
            }
        }
    }

    #[test]
    fn test_family_lookup() {
        assert_eq!(
            "bonsai_z1".parse::<ChipFamily>().unwrap(),
            ChipFamily::BonsaiZ1
        );
        assert!(ChipFamily::Topaz.config().arp.is_none());
        let bonsai = ChipFamily::Bonsai.config();
        assert!(bonsai.spec(TableKind::MacsecSa).is_some());
        assert!(bonsai.spec(TableKind::MacsecSc).is_some());
        assert!(ChipFamily::Topaz.config().qos_weight.is_none());
        assert_eq!(ChipFamily::Fir.config().num_ports, 12);
        let pirl = ChipFamily::Amethyst.config().pirl.unwrap();
        assert_eq!(pirl.spec.max_index, 87);
    }
}
