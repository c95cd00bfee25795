// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

use crate::layout::{Field, Frame};
use crate::table::qos::{QosWeightEntry, NUM_QUEUES};

#[derive(Clone, Copy, Debug)]
pub struct QosWeightLayout {
    /// Two queues per data word, in queue order.
    pub weights: [Field; NUM_QUEUES],
    pub strict: Field,
}

pub fn encode(layout: &QosWeightLayout, e: &QosWeightEntry, f: &mut Frame) {
    for (field, w) in layout.weights.iter().zip(e.weights) {
        f.set(*field, w as u32);
    }
    f.set(layout.strict, e.strict as u32);
}

pub fn decode(
    layout: &QosWeightLayout,
    index: u32,
    f: &Frame,
) -> QosWeightEntry {
    let mut weights = [0u8; NUM_QUEUES];
    for (w, field) in weights.iter_mut().zip(layout.weights) {
        *w = f.get(field) as u8;
    }
    QosWeightEntry {
        index,
        weights,
        strict: f.get(layout.strict) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::QOS_WEIGHT_LAYOUT;
    use crate::table::qos::WEIGHT_MAX;
    use proptest::prelude::*;

    #[test]
    fn test_weight_packing() {
        let e = QosWeightEntry {
            index: 3,
            weights: [1, 2, 0, 0, 0, 0, 0, WEIGHT_MAX],
            strict: 0x80,
        };
        let mut f = Frame::new(5);
        encode(&QOS_WEIGHT_LAYOUT, &e, &mut f);
        assert_eq!(f.words[0], 0x0201);
        assert_eq!(f.words[3], (WEIGHT_MAX as u32) << 8);
        assert_eq!(f.words[4], 0x80);
    }

    proptest! {
        #[test]
        fn round_trip(
            index in 0u32..16,
            weights in any::<[u8; NUM_QUEUES]>(),
            strict in any::<u8>(),
        ) {
            let e = QosWeightEntry {
                index,
                weights: weights.map(|w| w & WEIGHT_MAX),
                strict,
            };
            let mut f = Frame::new(5);
            encode(&QOS_WEIGHT_LAYOUT, &e, &mut f);
            prop_assert_eq!(decode(&QOS_WEIGHT_LAYOUT, index, &f), e);
        }
    }
}
