#![doc = "Core cryptographic primitives for cardcrypt."]
#![forbid(unsafe_code)]

// Core traits
pub mod provider;

// Symmetric ciphers
#[cfg(feature = "aes")]
pub mod aes;
#[cfg(feature = "xxtea")]
pub mod xxtea;

// Modes of operation
#[cfg(feature = "modes")]
pub mod modes;

// MAC algorithms
#[cfg(feature = "cmac")]
pub mod cmac;

pub mod cipher {
    //! Unified symmetric cipher interface.
    pub use super::provider::BlockCipher;
}

pub mod mac {
    //! Unified MAC interface.
    pub use super::provider::Mac;
}
