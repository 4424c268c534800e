//! UUID value generator.

use rand::Rng;
use uuid::Uuid;

/// Random version 4 UUID drawn from the provided RNG, hyphenated.
pub fn generate_guid<R: Rng>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);

    bytes[6] = (bytes[6] & 0x0f) | 0x40; // Version 4
    bytes[8] = (bytes[8] & 0x3f) | 0x80; // Variant RFC 4122

    Uuid::from_bytes(bytes).hyphenated().to_string()
}
