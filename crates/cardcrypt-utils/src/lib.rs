#![forbid(unsafe_code)]
#![doc = "Utility helpers for cardcrypt: hex formatting of byte buffers."]

pub mod hex;
