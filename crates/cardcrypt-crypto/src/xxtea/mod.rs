//! XXTEA (Corrected Block TEA) block cipher.
//!
//! Operates on little-endian 32-bit words with a variable round count
//! derived from the block count. Encryption appends one trailing word
//! holding the original byte length; decryption reads it back to recover
//! the exact plaintext and rejects ciphertexts whose recovered length
//! exceeds the buffer capacity.
//!
//! Self-contained; does not use the AES primitive.

use cardcrypt_types::CryptoError;

const DELTA: u32 = 0x9E37_79B9;

/// XXTEA mixes with exactly four key words; the first 16 key bytes are
/// used, shorter keys are zero-padded.
const KEY_WORDS: usize = 4;

fn mx(sum: u32, y: u32, z: u32, p: usize, e: usize, k: &[u32; KEY_WORDS]) -> u32 {
    ((z >> 5 ^ y << 2).wrapping_add(y >> 3 ^ z << 4))
        ^ ((sum ^ y).wrapping_add(k[(p & 3) ^ e] ^ z))
}

/// Pack bytes little-endian into 32-bit words, zero-filling the tail.
/// With `include_length`, one extra word holding the byte length is
/// appended.
fn to_words(data: &[u8], include_length: bool) -> Vec<u32> {
    let n = data.len().div_ceil(4);
    let mut words = vec![0u32; if include_length { n + 1 } else { n }];
    for (i, &b) in data.iter().enumerate() {
        words[i >> 2] |= u32::from(b) << ((i & 3) << 3);
    }
    if include_length {
        words[n] = data.len() as u32;
    }
    words
}

/// Unpack the first `len` bytes of a little-endian word array.
fn to_bytes(words: &[u32], len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = (words[i >> 2] >> ((i & 3) << 3)) as u8;
    }
    out
}

fn key_words(key: &[u8]) -> [u32; KEY_WORDS] {
    let mut k = [0u32; KEY_WORDS];
    for (i, &b) in key.iter().take(KEY_WORDS * 4).enumerate() {
        k[i >> 2] |= u32::from(b) << ((i & 3) << 3);
    }
    k
}

fn encrypt_words(v: &mut [u32], k: &[u32; KEY_WORDS]) {
    let n = v.len().saturating_sub(1);
    if n < 1 {
        return;
    }
    let rounds = 6 + 52 / (n + 1);
    let mut sum = 0u32;
    let mut z = v[n];
    for _ in 0..rounds {
        sum = sum.wrapping_add(DELTA);
        let e = ((sum >> 2) & 3) as usize;
        for p in 0..n {
            let y = v[p + 1];
            v[p] = v[p].wrapping_add(mx(sum, y, z, p, e, k));
            z = v[p];
        }
        let y = v[0];
        v[n] = v[n].wrapping_add(mx(sum, y, z, n, e, k));
        z = v[n];
    }
}

fn decrypt_words(v: &mut [u32], k: &[u32; KEY_WORDS]) {
    let n = v.len().saturating_sub(1);
    if n < 1 {
        return;
    }
    let rounds = 6 + 52 / (n + 1);
    let mut sum = (rounds as u32).wrapping_mul(DELTA);
    let mut y = v[0];
    while sum != 0 {
        let e = ((sum >> 2) & 3) as usize;
        for p in (1..=n).rev() {
            let z = v[p - 1];
            v[p] = v[p].wrapping_sub(mx(sum, y, z, p, e, k));
            y = v[p];
        }
        let z = v[n];
        v[0] = v[0].wrapping_sub(mx(sum, y, z, 0, e, k));
        y = v[0];
        sum = sum.wrapping_sub(DELTA);
    }
}

/// Encrypt `data` with `key`.
///
/// Empty input is returned unchanged. The output length is the input
/// rounded up to a whole word plus the four-byte length word. Only the
/// first 16 key bytes participate; an empty key is the all-zero key.
/// Neither input buffer is modified.
pub fn xxtea_encrypt(data: &[u8], key: &[u8]) -> Vec<u8> {
    if data.is_empty() {
        return Vec::new();
    }
    let mut v = to_words(data, true);
    let k = key_words(key);
    encrypt_words(&mut v, &k);
    to_bytes(&v, v.len() * 4)
}

/// Decrypt `data` with `key`.
///
/// Empty input is returned unchanged. Fails with `CorruptedCiphertext`
/// when the recovered length word exceeds the buffer capacity, which
/// catches truncated or mangled ciphertexts and wrong-length inputs.
pub fn xxtea_decrypt(data: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let mut v = to_words(data, false);
    let k = key_words(key);
    decrypt_words(&mut v, &k);

    let recovered = v[v.len() - 1] as usize;
    if recovered > v.len() * 4 {
        return Err(CryptoError::CorruptedCiphertext);
    }
    Ok(to_bytes(&v, recovered))
}
