//! Hexadecimal encoding and decoding.
//!
//! Used for diagnostic formatting of keys, tags, and intermediate values;
//! encoding is lowercase, decoding accepts either case.

use cardcrypt_types::CryptoError;

const ENCODE_TABLE: &[u8; 16] = b"0123456789abcdef";

/// Encode bytes as a lowercase hex string.
pub fn encode(input: &[u8]) -> String {
    let mut output = String::with_capacity(input.len() * 2);
    for &b in input {
        output.push(ENCODE_TABLE[(b >> 4) as usize] as char);
        output.push(ENCODE_TABLE[(b & 0x0F) as usize] as char);
    }
    output
}

/// Decode a hex string to bytes.
///
/// The input must have even length and contain only hex digits.
pub fn decode(input: &str) -> Result<Vec<u8>, CryptoError> {
    let input = input.as_bytes();
    if input.len() % 2 != 0 {
        return Err(CryptoError::InvalidArg);
    }

    let mut output = Vec::with_capacity(input.len() / 2);
    for pair in input.chunks_exact(2) {
        let hi = digit_value(pair[0])?;
        let lo = digit_value(pair[1])?;
        output.push((hi << 4) | lo);
    }
    Ok(output)
}

fn digit_value(digit: u8) -> Result<u8, CryptoError> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        _ => Err(CryptoError::InvalidArg),
    }
}
