//! Padding-aware running hash over byte streams.

use field::Fr;

use crate::constants::DATA_HASHER_WORD_BYTES;
use crate::poseidon::hash_two;

/// Packs one word little-endian, counting padding as zero.
///
/// Returns `None` when every byte of the word is padding.
fn pack_word(word: &[Option<u8>]) -> Option<Fr> {
    if word.iter().all(Option::is_none) {
        return None;
    }
    let mut bytes = [0u8; DATA_HASHER_WORD_BYTES];
    for (dst, src) in bytes.iter_mut().zip(word) {
        *dst = src.unwrap_or(0);
    }
    Some(Fr::from_canonical_u128(u128::from_le_bytes(bytes)))
}

/// Folds `bytes` into the running digest `seed`.
///
/// Bytes are consumed in 16-byte words; a short final word is treated as
/// if it were padded. Each word that holds at least one real byte updates the
/// digest to `Poseidon(digest, word)`. Words made entirely of padding leave the
/// digest unchanged, so a padded tail costs nothing.
///
/// Hashing a stream in pieces split on word boundaries, feeding each result in
/// as the next seed, matches hashing the whole stream from [`Fr::ZERO`].
pub fn data_hasher(bytes: &[Option<u8>], seed: Fr) -> Fr {
    bytes
        .chunks(DATA_HASHER_WORD_BYTES)
        .filter_map(pack_word)
        .fold(seed, hash_two)
}

/// [`data_hasher`] over unpadded bytes, starting from zero.
pub fn data_hasher_bytes(bytes: &[u8]) -> Fr {
    let padded: Vec<Option<u8>> = bytes.iter().copied().map(Some).collect();
    data_hasher(&padded, Fr::ZERO)
}
