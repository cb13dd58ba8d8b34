//! CBC (Cipher Block Chaining) mode with a fixed all-zero IV and no padding.
//!
//! This is the raw buffer operation the CMAC engine and the smart-card
//! protocol layer build on: Ci = AES(Ci-1 XOR Pi) with C-1 = 0^16. Inputs
//! that are not a positive multiple of the block size are a contract
//! violation and rejected, never padded or truncated.

use crate::aes::{Aes128Key, AES_BLOCK_SIZE};
use cardcrypt_types::CryptoError;

fn check_alignment(len: usize) -> Result<(), CryptoError> {
    if len == 0 || len % AES_BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidBlockSize { len });
    }
    Ok(())
}

/// Encrypt a block-aligned buffer using CBC mode with a zero IV.
///
/// The key must be exactly 16 bytes and `plaintext` a positive multiple of
/// 16 bytes. The input buffer is not modified.
pub fn cbc_encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    check_alignment(plaintext.len())?;
    let cipher = Aes128Key::new(key)?;

    let mut data = plaintext.to_vec();
    let mut prev = [0u8; AES_BLOCK_SIZE];

    for chunk in data.chunks_mut(AES_BLOCK_SIZE) {
        for (b, &p) in chunk.iter_mut().zip(prev.iter()) {
            *b ^= p;
        }
        cipher.encrypt_block(chunk)?;
        prev.copy_from_slice(chunk);
    }
    Ok(data)
}

/// Decrypt a block-aligned buffer using CBC mode with a zero IV.
///
/// Exact inverse of [`cbc_encrypt`]; same key and alignment constraints.
pub fn cbc_decrypt(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    check_alignment(ciphertext.len())?;
    let cipher = Aes128Key::new(key)?;

    let mut data = ciphertext.to_vec();
    let mut prev = [0u8; AES_BLOCK_SIZE];

    for chunk in data.chunks_mut(AES_BLOCK_SIZE) {
        let mut ct_copy = [0u8; AES_BLOCK_SIZE];
        ct_copy.copy_from_slice(chunk);
        cipher.decrypt_block(chunk)?;
        for (b, &p) in chunk.iter_mut().zip(prev.iter()) {
            *b ^= p;
        }
        prev = ct_copy;
    }
    Ok(data)
}
