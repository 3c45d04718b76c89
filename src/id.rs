//! Random trace and span identifiers.
//!
//! Identifiers are lowercase, zero-padded hex strings. Randomness comes from
//! `fastrand`'s thread-local generator, so concurrent callers never contend
//! on a shared lock.

use serde::{Deserialize, Serialize};

/// Width of a generated identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdLength {
    /// 64 bits, 16 hex characters. Used for span IDs and classic trace IDs.
    #[default]
    Bits64,
    /// 128 bits, 32 hex characters.
    Bits128,
}

impl IdLength {
    /// Returns the number of hex characters an identifier of this width has.
    #[inline]
    pub fn hex_len(&self) -> usize {
        match self {
            IdLength::Bits64 => 16,
            IdLength::Bits128 => 32,
        }
    }
}

/// Returns a random 64-bit identifier as 16 lowercase hex characters.
///
/// ## Example
///
/// ```rust
/// let id = zipkin_ids::next_id();
/// assert_eq!(id.len(), 16);
/// assert!(id.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
/// ```
pub fn next_id() -> String {
    next_id_with_length(IdLength::Bits64)
}

/// Returns a random identifier of the given width.
///
/// A 128-bit identifier is two independent 64-bit draws.
pub fn next_id_with_length(length: IdLength) -> String {
    match length {
        IdLength::Bits64 => hex::encode(fastrand::u64(..).to_be_bytes()),
        IdLength::Bits128 => {
            let value = (u128::from(fastrand::u64(..)) << 64) | u128::from(fastrand::u64(..));
            hex::encode(value.to_be_bytes())
        }
    }
}
