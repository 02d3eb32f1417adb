// tests/credential_tokens.rs

use std::collections::HashSet;

use proptest::prelude::*;
use rand::{CryptoRng, RngCore};

use readygate::credential::{DEFAULT_TOKEN_BYTES, Token};
use readygate::errors::GateError;

/// An RNG whose entropy source is always unavailable.
struct BrokenRng;

impl RngCore for BrokenRng {
    fn next_u32(&mut self) -> u32 {
        unreachable!("only try_fill_bytes is used")
    }

    fn next_u64(&mut self) -> u64 {
        unreachable!("only try_fill_bytes is used")
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {
        unreachable!("only try_fill_bytes is used")
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
        Err(rand::Error::new("entropy source offline"))
    }
}

impl CryptoRng for BrokenRng {}

#[test]
fn default_token_is_32_bytes_hex() {
    let token = Token::generate(DEFAULT_TOKEN_BYTES).unwrap();
    assert_eq!(token.expose().len(), 64);
    assert!(token.expose().chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(token.entropy_len(), 32);
}

#[test]
fn broken_entropy_source_is_reported() {
    let err = Token::from_rng(&mut BrokenRng, 32).unwrap_err();
    assert!(
        matches!(err, GateError::EntropySource(_)),
        "expected EntropySource, got {err:?}"
    );
}

#[test]
fn zero_length_token_is_rejected() {
    assert!(Token::generate(0).is_err());
}

#[test]
fn debug_output_never_contains_the_secret() {
    let token = Token::generate(16).unwrap();
    let rendered = format!("{token:?}");
    assert!(!rendered.contains(token.expose()));
    assert!(rendered.contains("redacted"));
}

proptest! {
    #[test]
    fn token_decodes_to_requested_length(len in 1usize..=256) {
        let token = Token::generate(len).unwrap();
        let decoded = hex::decode(token.expose()).unwrap();
        prop_assert_eq!(decoded.len(), len);
    }

    #[test]
    fn repeated_tokens_are_unique(len in 16usize..=64, samples in 2usize..=64) {
        let mut seen = HashSet::new();
        for _ in 0..samples {
            let token = Token::generate(len).unwrap();
            prop_assert!(seen.insert(token.expose().to_string()));
        }
    }
}
