//! Block cipher modes of operation.
//!
//! Only CBC is provided, in the exact shape the card-facing callers need:
//! fixed all-zero IV, no padding, inputs required to be block aligned.

pub mod cbc;
