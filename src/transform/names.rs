//! Opaque name generation
//!
//! The renamer draws candidates from an injected [`NameSource`] so tests and
//! batch runs control the randomness; there is no process-wide generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FIRST_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_";
const REST_CHARS: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";

/// Shortest name length accepted; keeps the candidate space far larger than
/// any program's identifier count.
pub const MIN_NAME_LENGTH: usize = 4;

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Supplier of candidate replacement names.
///
/// Candidates need not be unique; the renamer retries until one is free.
pub trait NameSource {
    fn candidate(&mut self) -> String;
}

/// Fixed-length names drawn uniformly from the identifier alphabet.
pub struct RandomNames<R: Rng = StdRng> {
    rng: R,
    length: usize,
}

impl RandomNames<StdRng> {
    /// Deterministic generator for a given seed.
    pub fn seeded(seed: u64, length: usize) -> Self {
        Self::new(StdRng::seed_from_u64(seed), length)
    }

    /// Generator seeded from OS entropy.
    pub fn from_entropy(length: usize) -> Self {
        Self::new(StdRng::from_entropy(), length)
    }
}

impl<R: Rng> RandomNames<R> {
    pub fn new(rng: R, length: usize) -> Self {
        Self {
            rng,
            length: length.max(MIN_NAME_LENGTH),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl<R: Rng> NameSource for RandomNames<R> {
    fn candidate(&mut self) -> String {
        let mut name = String::with_capacity(self.length);
        name.push(FIRST_CHARS[self.rng.gen_range(0..FIRST_CHARS.len())] as char);
        for _ in 1..self.length {
            name.push(REST_CHARS[self.rng.gen_range(0..REST_CHARS.len())] as char);
        }
        name
    }
}
