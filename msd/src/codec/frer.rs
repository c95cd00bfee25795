// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

use crate::layout::{Field, Frame};
use crate::table::frer::{
    FrerCounters, FrerRecoveryEntry, FrerSeqGenEntry, RecoveryAlgorithm,
};

#[derive(Clone, Copy, Debug)]
pub struct RecoveryLayout {
    pub take_no_seq: Field,
    pub individual: Field,
    pub latent_error_detect: Field,
    pub algorithm: Field,
    pub history_len: Field,
    pub reset_time: Field,
    pub seq_num: Field,
    pub passed: Field,
    pub discarded: Field,
    pub out_of_order: Field,
    pub rogue: Field,
    pub lost: Field,
}

#[derive(Clone, Copy, Debug)]
pub struct SeqGenLayout {
    pub next_seq: Field,
}

pub fn encode_recovery(
    layout: &RecoveryLayout,
    e: &FrerRecoveryEntry,
    f: &mut Frame,
) {
    f.set_bool(layout.take_no_seq, e.take_no_seq);
    f.set_bool(layout.individual, e.individual);
    f.set_bool(layout.latent_error_detect, e.latent_error_detect);
    f.set(layout.algorithm, e.algorithm as u32);
    f.set(layout.history_len, e.history_len as u32);
    f.set(layout.reset_time, e.reset_time as u32);
    f.set(layout.seq_num, e.seq_num as u32);
    f.set(layout.passed, e.counters.passed);
    f.set(layout.discarded, e.counters.discarded);
    f.set(layout.out_of_order, e.counters.out_of_order);
    f.set(layout.rogue, e.counters.rogue);
    f.set(layout.lost, e.counters.lost);
}

pub fn decode_recovery(
    layout: &RecoveryLayout,
    index: u32,
    f: &Frame,
) -> FrerRecoveryEntry {
    FrerRecoveryEntry {
        index,
        take_no_seq: f.get_bool(layout.take_no_seq),
        individual: f.get_bool(layout.individual),
        latent_error_detect: f.get_bool(layout.latent_error_detect),
        algorithm: if f.get_bool(layout.algorithm) {
            RecoveryAlgorithm::Match
        } else {
            RecoveryAlgorithm::Vector
        },
        history_len: f.get(layout.history_len) as u8,
        reset_time: f.get(layout.reset_time) as u16,
        seq_num: f.get(layout.seq_num) as u16,
        counters: FrerCounters {
            passed: f.get(layout.passed),
            discarded: f.get(layout.discarded),
            out_of_order: f.get(layout.out_of_order),
            rogue: f.get(layout.rogue),
            lost: f.get(layout.lost),
        },
    }
}

pub fn encode_seq_gen(
    layout: &SeqGenLayout,
    e: &FrerSeqGenEntry,
    f: &mut Frame,
) {
    f.set(layout.next_seq, e.next_seq as u32);
}

pub fn decode_seq_gen(
    layout: &SeqGenLayout,
    index: u32,
    f: &Frame,
) -> FrerSeqGenEntry {
    FrerSeqGenEntry {
        index,
        next_seq: f.get(layout.next_seq) as u16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::{FRER_RECOVERY_LAYOUT, FRER_SEQ_GEN_LAYOUT};
    use crate::table::frer::{HISTORY_LEN_MAX, RESET_TIME_MAX};
    use proptest::prelude::*;

    prop_compose! {
        fn recovery()(
            index in 0u32..64,
            flags in proptest::collection::vec(any::<bool>(), 4),
            history_len in 0u8..=HISTORY_LEN_MAX,
            reset_time in 0u16..=RESET_TIME_MAX,
            seq_num in any::<u16>(),
            c in any::<[u32; 5]>(),
        ) -> FrerRecoveryEntry {
            FrerRecoveryEntry {
                index,
                take_no_seq: flags[0],
                individual: flags[1],
                latent_error_detect: flags[2],
                algorithm: if flags[3] {
                    RecoveryAlgorithm::Match
                } else {
                    RecoveryAlgorithm::Vector
                },
                history_len,
                reset_time,
                seq_num,
                counters: FrerCounters {
                    passed: c[0],
                    discarded: c[1],
                    out_of_order: c[2],
                    rogue: c[3],
                    lost: c[4],
                },
            }
        }
    }

    #[test]
    fn test_counters_use_full_words() {
        let e = FrerRecoveryEntry {
            counters: FrerCounters {
                passed: u32::MAX,
                lost: 0x8000_0001,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut f = Frame::new(7);
        encode_recovery(&FRER_RECOVERY_LAYOUT, &e, &mut f);
        assert_eq!(f.words[2], u32::MAX);
        assert_eq!(f.words[6], 0x8000_0001);
    }

    proptest! {
        #[test]
        fn round_trip(e in recovery()) {
            let mut f = Frame::new(7);
            encode_recovery(&FRER_RECOVERY_LAYOUT, &e, &mut f);
            let got = decode_recovery(&FRER_RECOVERY_LAYOUT, e.index, &f);
            prop_assert_eq!(got, e);
        }

        #[test]
        fn seq_gen_round_trip(index in 0u32..64, next_seq in any::<u16>()) {
            let e = FrerSeqGenEntry { index, next_seq };
            let mut f = Frame::new(1);
            encode_seq_gen(&FRER_SEQ_GEN_LAYOUT, &e, &mut f);
            prop_assert_eq!(f.words[0], next_seq as u32);
            let got = decode_seq_gen(&FRER_SEQ_GEN_LAYOUT, index, &f);
            prop_assert_eq!(got, e);
        }
    }
}
