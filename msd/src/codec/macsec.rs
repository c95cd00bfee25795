// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

use crate::layout::{Field, Frame};
use crate::table::macsec::{CipherSuite, MacsecSaEntry, KEY_LEN, SALT_LEN};

#[derive(Clone, Copy, Debug)]
pub struct SaLayout {
    pub cipher: Field,
    pub an: Field,
    pub ssci: Field,
    /// The 64-bit packet number, least significant word first.
    pub next_pn: [Field; 2],
    /// First of the 32-bit words holding the key, most significant first.
    pub key_word: u8,
    pub salt_word: u8,
}

fn set_bytes(f: &mut Frame, first: u8, bytes: &[u8]) {
    for (i, chunk) in bytes.chunks(4).enumerate() {
        let mut b = [0u8; 4];
        b[..chunk.len()].copy_from_slice(chunk);
        f.set(Field::new(first + i as u8, 0, 32), u32::from_be_bytes(b));
    }
}

fn get_bytes(f: &Frame, first: u8, bytes: &mut [u8]) {
    for (i, chunk) in bytes.chunks_mut(4).enumerate() {
        let w = f.get(Field::new(first + i as u8, 0, 32)).to_be_bytes();
        chunk.copy_from_slice(&w[..chunk.len()]);
    }
}

pub fn encode(layout: &SaLayout, e: &MacsecSaEntry, f: &mut Frame) {
    f.set(layout.cipher, e.cipher as u32);
    f.set(layout.an, e.an as u32);
    f.set(layout.ssci, e.ssci);
    f.set_wide(&layout.next_pn, e.next_pn);
    set_bytes(f, layout.key_word, &e.key);
    set_bytes(f, layout.salt_word, &e.salt);
}

pub fn decode(layout: &SaLayout, index: u32, f: &Frame) -> MacsecSaEntry {
    let mut key = [0u8; KEY_LEN];
    let mut salt = [0u8; SALT_LEN];
    get_bytes(f, layout.key_word, &mut key);
    get_bytes(f, layout.salt_word, &mut salt);
    MacsecSaEntry {
        index,
        cipher: CipherSuite::from_bits(f.get(layout.cipher)),
        an: f.get(layout.an) as u8,
        ssci: f.get(layout.ssci),
        next_pn: f.get_wide(&layout.next_pn),
        key,
        salt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::MACSEC_SA_LAYOUT;
    use proptest::prelude::*;

    #[test]
    fn test_key_byte_order() {
        let mut e = MacsecSaEntry::default();
        e.key[0] = 0xaa;
        e.key[31] = 0x55;
        let mut f = Frame::new(16);
        encode(&MACSEC_SA_LAYOUT, &e, &mut f);
        assert_eq!(f.words[4], 0xaa00_0000);
        assert_eq!(f.words[11], 0x0000_0055);
    }

    proptest! {
        #[test]
        fn round_trip(
            index in 0u32..32,
            cipher in 0u32..4,
            an in 0u8..4,
            ssci in any::<u32>(),
            next_pn in any::<u64>(),
            key in any::<[u8; KEY_LEN]>(),
            salt in any::<[u8; SALT_LEN]>(),
        ) {
            let e = MacsecSaEntry {
                index,
                cipher: CipherSuite::from_bits(cipher),
                an,
                ssci,
                next_pn,
                key,
                salt,
            };
            let mut f = Frame::new(16);
            encode(&MACSEC_SA_LAYOUT, &e, &mut f);
            prop_assert_eq!(decode(&MACSEC_SA_LAYOUT, index, &f), e);
        }
    }
}
