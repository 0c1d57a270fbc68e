//! Session secret generation, hashing and the `<id>.<secret>` token format.

use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::types::SessionId;
use crate::utils::id_codec::{SessionIdCodec, TOKEN_ALPHABET};

type HmacSha256 = Hmac<Sha256>;

pub const SECRET_LEN: usize = 44;
pub const TOKEN_SEPARATOR: char = '.';

/// Draws a fresh secret from the token alphabet.
///
/// Each random byte picks a character by its top five bits, so every
/// character is equally likely.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_LEN];
    OsRng.fill_bytes(&mut bytes);
    bytes
        .iter()
        .map(|b| TOKEN_ALPHABET[(b >> 3) as usize] as char)
        .collect()
}

/// HMAC-SHA256 of the secret under the server key. Only this digest is stored.
pub fn hash_secret(key: &[u8], secret: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(secret.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Recomputes the digest and compares in constant time.
pub fn verify_secret(key: &[u8], secret: &str, expected_hash: &[u8]) -> bool {
    let computed = hash_secret(key, secret);
    computed.as_slice().ct_eq(expected_hash).into()
}

pub fn compose_token(codec: &SessionIdCodec, session_id: SessionId, secret: &str) -> String {
    format!("{}{}{}", codec.encode(session_id), TOKEN_SEPARATOR, secret)
}

/// A token split into its two halves. Says nothing about validity.
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedToken<'a> {
    pub session_id: SessionId,
    pub secret: &'a str,
}

pub fn parse_token<'a>(codec: &SessionIdCodec, token: &'a str) -> Option<ParsedToken<'a>> {
    let mut parts = token.split(TOKEN_SEPARATOR);
    let (encoded_id, secret) = match (parts.next(), parts.next(), parts.next()) {
        (Some(id), Some(secret), None) => (id, secret),
        _ => return None,
    };
    let session_id = codec.decode(encoded_id)?;
    Some(ParsedToken { session_id, secret })
}
