//! Shared test utilities for note encryption integration tests
#![allow(dead_code)]

use common::crypto::{EncryptedNote, KeyPair, NoteCipher};
use common::note::{Note, NOTE_SIZE};

/// A recipient key pair and a default-params engine
pub fn setup_recipient() -> (NoteCipher, KeyPair) {
    let recipient = KeyPair::generate().unwrap();
    (NoteCipher::default(), recipient)
}

/// A note with every field distinguishable
pub fn sample_note() -> Note {
    let mut apk = [0u8; 32];
    let mut rho = [0u8; 32];
    let mut trap_r = [0u8; 32];
    for i in 0..32 {
        apk[i] = i as u8;
        rho[i] = 0x40 + i as u8;
        trap_r[i] = 0x80 + i as u8;
    }
    Note {
        apk,
        value: 0x2F0000000000000F,
        rho,
        trap_r,
    }
}

/// Encrypt `sample_note` to a fresh recipient
pub fn encrypted_sample() -> (NoteCipher, KeyPair, EncryptedNote) {
    let (cipher, recipient) = setup_recipient();
    let record = cipher
        .encrypt(&sample_note().to_bytes(), recipient.public())
        .unwrap();
    (cipher, recipient, record)
}

/// Copy of `record` with bit `bit` flipped
pub fn flip_bit(record: &[u8], bit: usize) -> Vec<u8> {
    let mut mutated = record.to_vec();
    mutated[bit / 8] ^= 1 << (bit % 8);
    mutated
}

pub const RECORD_SIZE: usize = 32 + NOTE_SIZE + 16;
