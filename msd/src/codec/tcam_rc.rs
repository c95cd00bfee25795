// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

use crate::layout::{Field, Frame};
use crate::table::tcam_rc::{
    RangeComparator, RangeOperator, RangeSelector, TcamRcEntry,
    RANGE_COMPARATORS,
};

/// Comparator `i` lives at the template fields shifted by `i * stride`
/// words.
#[derive(Clone, Copy, Debug)]
pub struct TcamRcLayout {
    pub stride: u8,
    pub selector: Field,
    pub operator: Field,
    pub low: Field,
    pub high: Field,
}

fn at(f: Field, word: u8) -> Field {
    Field { word: f.word + word, ..f }
}

pub fn encode(layout: &TcamRcLayout, e: &TcamRcEntry, f: &mut Frame) {
    for (i, c) in e.comparators.iter().enumerate() {
        let base = i as u8 * layout.stride;
        f.set(at(layout.selector, base), c.selector as u32);
        f.set(at(layout.operator, base), c.operator as u32);
        f.set(at(layout.low, base), c.low as u32);
        f.set(at(layout.high, base), c.high as u32);
    }
}

pub fn decode(layout: &TcamRcLayout, index: u32, f: &Frame) -> TcamRcEntry {
    let mut comparators = [RangeComparator::default(); RANGE_COMPARATORS];
    for (i, c) in comparators.iter_mut().enumerate() {
        let base = i as u8 * layout.stride;
        *c = RangeComparator {
            selector: RangeSelector::from_bits(
                f.get(at(layout.selector, base)),
            ),
            operator: RangeOperator::from_bits(
                f.get(at(layout.operator, base)),
            ),
            low: f.get(at(layout.low, base)) as u16,
            high: f.get(at(layout.high, base)) as u16,
        };
    }
    TcamRcEntry { index, comparators }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::TCAM_RC_LAYOUT;
    use proptest::prelude::*;

    prop_compose! {
        fn comparator()(
            sel in 0u32..8,
            op in 0u32..2,
            low in any::<u16>(),
            high in any::<u16>(),
        ) -> RangeComparator {
            RangeComparator {
                selector: RangeSelector::from_bits(sel),
                operator: RangeOperator::from_bits(op),
                low,
                high,
            }
        }
    }

    #[test]
    fn test_stride() {
        let mut e = TcamRcEntry::default();
        e.comparators[7] = RangeComparator {
            selector: RangeSelector::L4DstPort,
            operator: RangeOperator::Outside,
            low: 1000,
            high: 2000,
        };
        let mut f = Frame::new(24);
        encode(&TCAM_RC_LAYOUT, &e, &mut f);
        assert_eq!(f.words[21], RangeSelector::L4DstPort as u32 | 0b1000);
        assert_eq!(f.words[22], 1000);
        assert_eq!(f.words[23], 2000);
    }

    proptest! {
        #[test]
        fn round_trip(
            index in 0u32..64,
            cs in proptest::collection::vec(comparator(), RANGE_COMPARATORS),
        ) {
            let mut e = TcamRcEntry { index, ..Default::default() };
            e.comparators.copy_from_slice(&cs);
            let mut f = Frame::new(24);
            encode(&TCAM_RC_LAYOUT, &e, &mut f);
            prop_assert_eq!(decode(&TCAM_RC_LAYOUT, index, &f), e);
        }
    }
}
