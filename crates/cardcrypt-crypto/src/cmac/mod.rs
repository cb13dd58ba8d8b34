//! CMAC (Cipher-based Message Authentication Code) over AES-128.
//!
//! Implements the NIST SP 800-38B / RFC 4493 construction, plus the
//! truncated 8-byte tag ("MACT") used for SAM AV2 host authentication.

use crate::aes::{Aes128Key, AES_BLOCK_SIZE};
use crate::provider::Mac;
use cardcrypt_types::CryptoError;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// MACT tag size in bytes.
pub const MACT_SIZE: usize = 8;

/// Left-shift a 128-bit block by 1 bit; if the MSB was 1, XOR with Rb (0x87).
///
/// This is doubling in GF(2^128) with the standard reduction polynomial.
fn dbl(block: &[u8; AES_BLOCK_SIZE]) -> [u8; AES_BLOCK_SIZE] {
    let mut result = [0u8; AES_BLOCK_SIZE];
    let mut carry = 0u8;
    for i in (0..AES_BLOCK_SIZE).rev() {
        result[i] = (block[i] << 1) | carry;
        carry = block[i] >> 7;
    }
    if block[0] & 0x80 != 0 {
        result[AES_BLOCK_SIZE - 1] ^= 0x87;
    }
    result
}

/// The CMAC subkey pair.
///
/// K1 masks a complete final block, K2 a padded one.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Subkeys {
    pub(crate) k1: [u8; AES_BLOCK_SIZE],
    pub(crate) k2: [u8; AES_BLOCK_SIZE],
}

impl Subkeys {
    /// Derive K1 and K2 from the cipher: L = E_K(0^128), K1 = dbl(L),
    /// K2 = dbl(K1).
    pub fn derive(cipher: &Aes128Key) -> Result<Self, CryptoError> {
        let mut l = [0u8; AES_BLOCK_SIZE];
        cipher.encrypt_block(&mut l)?;

        let k1 = dbl(&l);
        let k2 = dbl(&k1);
        l.zeroize();

        Ok(Self { k1, k2 })
    }
}

/// CMAC context.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Cmac {
    cipher: Aes128Key,
    subkeys: Subkeys,
    /// CBC chain value.
    state: [u8; AES_BLOCK_SIZE],
    /// Buffer holding the trailing block; never flushed until finish(), so
    /// the final-block subkey selection can tell complete from partial.
    buf: [u8; AES_BLOCK_SIZE],
    buf_len: usize,
    /// Whether the context is ready for use (false after finish).
    active: bool,
}

impl Cmac {
    /// Create a new CMAC instance with the given 16-byte AES key.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let cipher = Aes128Key::new(key)?;
        let subkeys = Subkeys::derive(&cipher)?;
        Ok(Cmac {
            cipher,
            subkeys,
            state: [0u8; AES_BLOCK_SIZE],
            buf: [0u8; AES_BLOCK_SIZE],
            buf_len: 0,
            active: true,
        })
    }

    fn absorb_buffered(&mut self) -> Result<(), CryptoError> {
        for (s, &b) in self.state.iter_mut().zip(self.buf.iter()) {
            *s ^= b;
        }
        self.cipher.encrypt_block(&mut self.state)?;
        self.buf_len = 0;
        Ok(())
    }

    /// Feed data into the CMAC computation.
    ///
    /// Fails once the context has been finalized; call [`reset`](Self::reset)
    /// to start a new message.
    pub fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        if !self.active {
            return Err(CryptoError::InvalidArg);
        }

        let mut pos = 0;
        while pos < data.len() {
            // Only flush a full buffer when more input remains, so the last
            // block of the message is still buffered at finish() time.
            if self.buf_len == AES_BLOCK_SIZE {
                self.absorb_buffered()?;
            }
            let take = (AES_BLOCK_SIZE - self.buf_len).min(data.len() - pos);
            self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[pos..pos + take]);
            self.buf_len += take;
            pos += take;
        }
        Ok(())
    }

    /// Finalize the CMAC computation and write the 16-byte result to `out`.
    ///
    /// Consumes the message state: further `update` or `finish` calls fail
    /// with `InvalidArg` until [`reset`](Self::reset).
    pub fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError> {
        if !self.active {
            return Err(CryptoError::InvalidArg);
        }
        if out.len() < AES_BLOCK_SIZE {
            return Err(CryptoError::BufferTooSmall {
                need: AES_BLOCK_SIZE,
                got: out.len(),
            });
        }

        let mut last_block = [0u8; AES_BLOCK_SIZE];

        if self.buf_len == AES_BLOCK_SIZE {
            // Complete final block: XOR with K1.
            for (lb, (&b, &k)) in last_block
                .iter_mut()
                .zip(self.buf.iter().zip(self.subkeys.k1.iter()))
            {
                *lb = b ^ k;
            }
        } else {
            // Partial (or empty) final block: 0x80 marker, zero fill, K2.
            last_block[..self.buf_len].copy_from_slice(&self.buf[..self.buf_len]);
            last_block[self.buf_len] = 0x80;
            for (lb, &k) in last_block.iter_mut().zip(self.subkeys.k2.iter()) {
                *lb ^= k;
            }
        }

        for (s, &b) in self.state.iter_mut().zip(last_block.iter()) {
            *s ^= b;
        }
        self.cipher.encrypt_block(&mut self.state)?;

        out[..AES_BLOCK_SIZE].copy_from_slice(&self.state);
        last_block.zeroize();
        self.active = false;
        Ok(())
    }

    /// Reset the CMAC state for reuse with the same key.
    pub fn reset(&mut self) {
        self.state = [0u8; AES_BLOCK_SIZE];
        self.buf = [0u8; AES_BLOCK_SIZE];
        self.buf_len = 0;
        self.active = true;
    }
}

impl Mac for Cmac {
    fn output_size(&self) -> usize {
        AES_BLOCK_SIZE
    }

    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        Cmac::update(self, data)
    }

    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError> {
        Cmac::finish(self, out)
    }

    fn reset(&mut self) {
        Cmac::reset(self)
    }
}

/// One-shot CMAC of `message` under a 16-byte `key`.
pub fn cmac(key: &[u8], message: &[u8]) -> Result<[u8; AES_BLOCK_SIZE], CryptoError> {
    let mut ctx = Cmac::new(key)?;
    ctx.update(message)?;
    let mut out = [0u8; AES_BLOCK_SIZE];
    ctx.finish(&mut out)?;
    Ok(out)
}

/// Truncated MAC used for SAM AV2 host authentication.
///
/// Selects the odd-indexed bytes (1, 3, ..., 15) of the full CMAC, in
/// order. This is the protocol's fixed truncation, not a left-truncation.
pub fn mact(key: &[u8], message: &[u8]) -> Result<[u8; MACT_SIZE], CryptoError> {
    let full = cmac(key, message)?;
    let mut tag = [0u8; MACT_SIZE];
    for (i, t) in tag.iter_mut().enumerate() {
        *t = full[2 * i + 1];
    }
    Ok(tag)
}

/// Verify a truncated MAC in constant time.
pub fn mact_verify(
    key: &[u8],
    message: &[u8],
    tag: &[u8; MACT_SIZE],
) -> Result<bool, CryptoError> {
    let expected = mact(key, message)?;
    Ok(expected.ct_eq(tag).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardcrypt_utils::hex;

    // RFC 4493 Test Vectors for AES-CMAC with 128-bit key
    // Key: 2b7e1516 28aed2a6 abf71588 09cf4f3c

    fn rfc_key() -> Vec<u8> {
        hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap()
    }

    #[test]
    fn subkeys_rfc4493() {
        let cipher = Aes128Key::new(&rfc_key()).unwrap();
        let subkeys = Subkeys::derive(&cipher).unwrap();
        // L = 7df76b0c1ab899b33e42f047b91b546f has its MSB clear, so K1 is
        // the plain shift; K1's MSB is set, so K2 takes the Rb reduction.
        assert_eq!(hex::encode(&subkeys.k1), "fbeed618357133667c85e08f7236a8de");
        assert_eq!(hex::encode(&subkeys.k2), "f7ddac306ae266ccf90bc11ee46d513b");
    }

    #[test]
    fn dbl_msb_clear_is_plain_shift() {
        let mut block = [0u8; 16];
        block[0] = 0x40;
        let mut expected = [0u8; 16];
        expected[0] = 0x80;
        assert_eq!(dbl(&block), expected);
    }

    #[test]
    fn dbl_msb_set_applies_reduction() {
        let mut block = [0u8; 16];
        block[0] = 0x80;
        let mut expected = [0u8; 16];
        expected[15] = 0x87;
        assert_eq!(dbl(&block), expected);
    }

    #[test]
    fn cmac_rfc4493_empty() {
        let tag = cmac(&rfc_key(), &[]).unwrap();
        assert_eq!(hex::encode(&tag), "bb1d6929e95937287fa37d129b756746");
    }

    #[test]
    fn cmac_rfc4493_16bytes() {
        let msg = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let tag = cmac(&rfc_key(), &msg).unwrap();
        assert_eq!(hex::encode(&tag), "070a16b46b4d4144f79bdd9dd04a287c");
    }

    #[test]
    fn cmac_rfc4493_40bytes() {
        let msg = hex::decode(
            "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e5130c81c46a35ce411",
        )
        .unwrap();
        let tag = cmac(&rfc_key(), &msg).unwrap();
        assert_eq!(hex::encode(&tag), "dfa66747de9ae63030ca32611497c827");
    }

    #[test]
    fn cmac_rfc4493_64bytes() {
        let msg = hex::decode("6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e5130c81c46a35ce411e5fbc1191a0a52eff69f2445df4f9b17ad2b417be66c3710").unwrap();
        let tag = cmac(&rfc_key(), &msg).unwrap();
        assert_eq!(hex::encode(&tag), "51f0bebf7e3b9d92fc49741779363cfe");
    }

    // The empty-message vector above is itself the padded-path check: an
    // empty message has no complete block, so only K2 can produce that tag.
    // The 16/64-byte vectors cover the complete-block K1 path.

    #[test]
    fn mact_is_odd_indexed_bytes() {
        let msg = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let full = cmac(&rfc_key(), &msg).unwrap();
        let tag = mact(&rfc_key(), &msg).unwrap();
        for i in 0..MACT_SIZE {
            assert_eq!(tag[i], full[2 * i + 1]);
        }
        assert_eq!(hex::encode(&tag), "0ab44d449b9d4a7c");
    }

    #[test]
    fn mact_empty_message() {
        let tag = mact(&rfc_key(), &[]).unwrap();
        assert_eq!(hex::encode(&tag), "1d295928a3127546");
    }

    #[test]
    fn mact_verify_accepts_and_rejects() {
        let msg = b"host authentication challenge";
        let tag = mact(&rfc_key(), msg).unwrap();
        assert!(mact_verify(&rfc_key(), msg, &tag).unwrap());

        let mut bad = tag;
        bad[0] ^= 0x01;
        assert!(!mact_verify(&rfc_key(), msg, &bad).unwrap());
        assert!(!mact_verify(&rfc_key(), b"different message", &tag).unwrap());
    }

    #[test]
    fn streaming_matches_one_shot() {
        let msg = hex::decode("6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e5130c81c46a35ce411e5fbc1191a0a52eff69f2445df4f9b17ad2b417be66c3710").unwrap();
        let expected = cmac(&rfc_key(), &msg).unwrap();

        for split in [0usize, 1, 15, 16, 17, 32, 63] {
            let mut ctx = Cmac::new(&rfc_key()).unwrap();
            ctx.update(&msg[..split]).unwrap();
            ctx.update(&msg[split..]).unwrap();
            let mut tag = [0u8; 16];
            ctx.finish(&mut tag).unwrap();
            assert_eq!(tag, expected, "split at {split}");
        }
    }

    #[test]
    fn finalized_context_rejects_further_use() {
        let mut ctx = Cmac::new(&rfc_key()).unwrap();
        ctx.update(b"message").unwrap();
        let mut tag = [0u8; 16];
        ctx.finish(&mut tag).unwrap();

        // The state is consumed: a second finish must not hand back a tag
        // computed from the already-finalized chain value.
        let mut tag2 = [0u8; 16];
        assert!(matches!(
            ctx.finish(&mut tag2),
            Err(CryptoError::InvalidArg)
        ));
        assert!(matches!(
            ctx.update(b"more data"),
            Err(CryptoError::InvalidArg)
        ));

        // reset() re-arms the context.
        ctx.reset();
        ctx.update(b"message").unwrap();
        ctx.finish(&mut tag2).unwrap();
        assert_eq!(tag, tag2);
    }

    #[test]
    fn failed_finish_does_not_consume_state() {
        let mut ctx = Cmac::new(&rfc_key()).unwrap();
        ctx.update(&[]).unwrap();
        let mut short = [0u8; 8];
        assert!(ctx.finish(&mut short).is_err());

        // The short-buffer failure happens before finalization, so a
        // well-sized finish still succeeds.
        let mut tag = [0u8; 16];
        ctx.finish(&mut tag).unwrap();
        assert_eq!(hex::encode(&tag), "bb1d6929e95937287fa37d129b756746");
    }

    #[test]
    fn reset_allows_reuse() {
        let mut ctx = Cmac::new(&rfc_key()).unwrap();
        ctx.update(b"first message").unwrap();
        let mut tag1 = [0u8; 16];
        ctx.finish(&mut tag1).unwrap();

        ctx.reset();
        ctx.update(b"first message").unwrap();
        let mut tag2 = [0u8; 16];
        ctx.finish(&mut tag2).unwrap();
        assert_eq!(tag1, tag2);
    }

    #[test]
    fn short_output_buffer_rejected() {
        let mut ctx = Cmac::new(&rfc_key()).unwrap();
        let mut out = [0u8; 8];
        assert!(matches!(
            ctx.finish(&mut out),
            Err(CryptoError::BufferTooSmall { need: 16, got: 8 })
        ));
    }

    #[test]
    fn wrong_key_length_propagates() {
        assert!(matches!(
            cmac(&[0u8; 15], b"msg"),
            Err(CryptoError::InvalidKeyLength { expected: 16, got: 15 })
        ));
        assert!(mact(&[0u8; 17], b"msg").is_err());
    }

    #[test]
    fn usable_through_mac_trait() {
        let mut ctx: Box<dyn Mac> = Box::new(Cmac::new(&rfc_key()).unwrap());
        assert_eq!(ctx.output_size(), 16);
        ctx.update(&[]).unwrap();
        let mut tag = [0u8; 16];
        ctx.finish(&mut tag).unwrap();
        assert_eq!(hex::encode(&tag), "bb1d6929e95937287fa37d129b756746");
    }
}
