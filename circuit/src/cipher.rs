//! Keystream generation for the supported TLS record ciphers.
//!
//! Only the counter-mode keystream of each AEAD is needed: authentication tags
//! are checked outside the circuit. AES suites use a 12-byte nonce followed by
//! a 32-bit big-endian block counter, and GCM encrypts record data starting at
//! counter 2. ChaCha20 follows RFC 7539 with 64-byte blocks, and the Poly1305
//! construction encrypts data starting at counter 1.

use core::fmt;

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128, Aes256};
use chacha20::cipher::{KeyIvInit, StreamCipher, StreamCipherSeek};
use chacha20::ChaCha20;
use serde::{Deserialize, Serialize};

use crate::error::StepError;

/// Bytes in a TLS 1.3 / 1.2 AEAD nonce.
pub const NONCE_LEN: usize = 12;

const AES_BLOCK: usize = 16;
const CHACHA_BLOCK: usize = 64;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherSuite {
    Aes128Gcm,
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl CipherSuite {
    pub const fn key_len(self) -> usize {
        match self {
            CipherSuite::Aes128Gcm => 16,
            CipherSuite::Aes256Gcm | CipherSuite::ChaCha20Poly1305 => 32,
        }
    }

    /// Bytes of keystream produced per counter value.
    pub const fn block_len(self) -> usize {
        match self {
            CipherSuite::Aes128Gcm | CipherSuite::Aes256Gcm => AES_BLOCK,
            CipherSuite::ChaCha20Poly1305 => CHACHA_BLOCK,
        }
    }

    /// Counter of the first block of record data.
    pub const fn initial_counter(self) -> u32 {
        match self {
            CipherSuite::Aes128Gcm | CipherSuite::Aes256Gcm => 2,
            CipherSuite::ChaCha20Poly1305 => 1,
        }
    }

    /// Counter of the block that starts at byte `offset` of a record.
    ///
    /// `offset` must be a multiple of [`CipherSuite::block_len`].
    pub fn counter_at(self, offset: usize) -> u32 {
        self.initial_counter()
            .wrapping_add((offset / self.block_len()) as u32)
    }

    fn check_key(self, key: &[u8]) -> Result<(), StepError> {
        if key.len() != self.key_len() {
            return Err(StepError::KeyLength {
                suite: self,
                expected: self.key_len(),
                actual: key.len(),
            });
        }
        Ok(())
    }

    /// XORs `data` with the keystream starting at block `counter`.
    ///
    /// Encryption and decryption are the same operation.
    pub fn apply_keystream(
        self,
        key: &[u8],
        nonce: &[u8; NONCE_LEN],
        counter: u32,
        data: &mut [u8],
    ) -> Result<(), StepError> {
        self.check_key(key)?;
        match self {
            CipherSuite::Aes128Gcm => aes_ctr::<Aes128>(self, key, nonce, counter, data),
            CipherSuite::Aes256Gcm => aes_ctr::<Aes256>(self, key, nonce, counter, data),
            CipherSuite::ChaCha20Poly1305 => chacha_ctr(key, nonce, counter, data),
        }
    }

    /// Raw keystream of `len` bytes starting at block `counter`.
    pub fn keystream(
        self,
        key: &[u8],
        nonce: &[u8; NONCE_LEN],
        counter: u32,
        len: usize,
    ) -> Result<Vec<u8>, StepError> {
        let mut out = vec![0u8; len];
        self.apply_keystream(key, nonce, counter, &mut out)?;
        Ok(out)
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CipherSuite::Aes128Gcm => "AES-128-GCM",
            CipherSuite::Aes256Gcm => "AES-256-GCM",
            CipherSuite::ChaCha20Poly1305 => "CHACHA20-POLY1305",
        };
        f.write_str(name)
    }
}

fn aes_ctr<C: BlockEncrypt + KeyInit>(
    suite: CipherSuite,
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    counter: u32,
    data: &mut [u8],
) -> Result<(), StepError> {
    let cipher = C::new_from_slice(key).map_err(|_| StepError::KeyLength {
        suite,
        expected: suite.key_len(),
        actual: key.len(),
    })?;

    let mut block = [0u8; AES_BLOCK];
    for (i, chunk) in data.chunks_mut(AES_BLOCK).enumerate() {
        block[..NONCE_LEN].copy_from_slice(nonce);
        block[NONCE_LEN..].copy_from_slice(&counter.wrapping_add(i as u32).to_be_bytes());
        cipher.encrypt_block(GenericArray::from_mut_slice(&mut block));
        for (byte, k) in chunk.iter_mut().zip(block) {
            *byte ^= k;
        }
    }
    Ok(())
}

fn chacha_ctr(
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    counter: u32,
    data: &mut [u8],
) -> Result<(), StepError> {
    let mut cipher =
        ChaCha20::new_from_slices(key, nonce).map_err(|_| StepError::KeyLength {
            suite: CipherSuite::ChaCha20Poly1305,
            expected: CipherSuite::ChaCha20Poly1305.key_len(),
            actual: key.len(),
        })?;
    let overflow = StepError::CounterOverflow {
        counter,
        len: data.len(),
    };
    cipher
        .try_seek(u64::from(counter) * CHACHA_BLOCK as u64)
        .map_err(|_| overflow.clone())?;
    cipher.try_apply_keystream(data).map_err(|_| overflow)
}

/// Per-record nonce: the IV with the big-endian sequence number XORed into
/// its last eight bytes.
pub fn derive_nonce(iv: &[u8; NONCE_LEN], sequence: u64) -> [u8; NONCE_LEN] {
    let mut nonce = *iv;
    for (byte, s) in nonce[4..].iter_mut().zip(sequence.to_be_bytes()) {
        *byte ^= s;
    }
    nonce
}
