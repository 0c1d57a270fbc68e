//! Reversible, salted text encoding of session IDs.
//!
//! IDs are written in base 32 over a salt-dependent permutation of
//! [`TOKEN_ALPHABET`] and left-padded to [`MIN_ENCODED_LEN`] characters, so
//! every ID has exactly one encoding.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::types::SessionId;

/// Lowercase letters and digits without the look-alikes `l`, `o`, `0`, `1`.
pub const TOKEN_ALPHABET: &[u8; 32] = b"abcdefghijkmnpqrstuvwxyz23456789";
pub const MIN_ENCODED_LEN: usize = 14;

const RADIX: u64 = 32;

#[derive(Clone)]
pub struct SessionIdCodec {
    alphabet: [u8; 32],
}

impl std::fmt::Debug for SessionIdCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIdCodec").finish_non_exhaustive()
    }
}

impl SessionIdCodec {
    pub fn new(salt: &str) -> Self {
        let mut alphabet = *TOKEN_ALPHABET;
        alphabet.sort_by_cached_key(|c| shuffle_key(salt, *c));
        Self { alphabet }
    }

    pub fn encode(&self, id: SessionId) -> String {
        let mut value = id.as_i64() as u64;
        let mut digits = Vec::with_capacity(MIN_ENCODED_LEN);
        loop {
            digits.push(self.alphabet[(value % RADIX) as usize]);
            value /= RADIX;
            if value == 0 {
                break;
            }
        }
        while digits.len() < MIN_ENCODED_LEN {
            digits.push(self.alphabet[0]);
        }
        digits.reverse();
        String::from_utf8(digits).unwrap_or_default()
    }

    /// Returns `None` for anything [`encode`](Self::encode) could not have produced.
    pub fn decode(&self, encoded: &str) -> Option<SessionId> {
        if encoded.len() != MIN_ENCODED_LEN {
            return None;
        }
        let mut value: u64 = 0;
        for byte in encoded.bytes() {
            let digit = self.alphabet.iter().position(|c| *c == byte)? as u64;
            value = value.checked_mul(RADIX)?.checked_add(digit)?;
        }
        i64::try_from(value).ok().map(SessionId::from_i64)
    }
}

fn shuffle_key(salt: &str, c: u8) -> [u8; 32] {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(salt.as_bytes()).expect("HMAC can take key of any size");
    mac.update(&[c]);
    let mut key = [0u8; 32];
    key.copy_from_slice(&mac.finalize().into_bytes());
    key
}
