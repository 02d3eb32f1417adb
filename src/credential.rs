// src/credential.rs

//! Per-run credential generation.
//!
//! A [`Token`] is drawn from the OS randomness source, hex-encoded, handed to
//! the supervised service on its command line and sent back to it in the
//! `Authorization` header of the gated request. It lives for one run only and
//! is never written anywhere.

use std::fmt;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::errors::{GateError, Result};

/// Default amount of entropy, in bytes, for a generated token.
pub const DEFAULT_TOKEN_BYTES: usize = 32;

/// Smallest entropy a configured token may carry.
pub const MIN_TOKEN_BYTES: usize = 16;

/// Opaque hex-encoded secret.
///
/// `Debug` is redacted so the value cannot leak through `tracing` fields.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Generate a token with `byte_len` bytes of entropy from the OS source.
    pub fn generate(byte_len: usize) -> Result<Self> {
        Self::from_rng(&mut OsRng, byte_len)
    }

    /// Generate a token from an explicit cryptographic RNG.
    ///
    /// Failure of the RNG is reported as [`GateError::EntropySource`].
    pub fn from_rng<R>(rng: &mut R, byte_len: usize) -> Result<Self>
    where
        R: RngCore + CryptoRng,
    {
        if byte_len == 0 {
            return Err(GateError::ConfigError(
                "token length must be at least 1 byte".to_string(),
            ));
        }

        let mut bytes = vec![0u8; byte_len];
        rng.try_fill_bytes(&mut bytes)?;
        Ok(Token(hex::encode(bytes)))
    }

    /// The encoded secret. Only call this where the value must leave the
    /// process (child arguments, request header).
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Number of entropy bytes carried by this token.
    pub fn entropy_len(&self) -> usize {
        self.0.len() / 2
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&"<redacted>").finish()
    }
}
