//! Random string generators.

use rand::Rng;

/// Alphabet for `random/string` tokens.
pub const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Alphabet for `random/hex` tokens.
pub const HEX: &[u8] = b"ABCDEF0123456789";

/// `length` independent uniform picks from `alphabet`.
pub fn generate_from_alphabet<R: Rng>(rng: &mut R, alphabet: &[u8], length: usize) -> String {
    (0..length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}
