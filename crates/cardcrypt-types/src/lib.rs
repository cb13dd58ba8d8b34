#![forbid(unsafe_code)]
#![doc = "Common types and error codes for cardcrypt."]

pub mod error;

pub use error::*;
