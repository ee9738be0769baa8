//! Identity tokens for entities and keyframes.
//!
//! Identities are opaque fixed-length numeric strings. Randomness comes from
//! v4 UUIDs so two generated ids collide only with negligible probability.

use uuid::Uuid;

pub const DEFAULT_ID_LENGTH: usize = 16;

/// Shortest identity ever generated.
pub const MIN_ID_LENGTH: usize = 4;

/// Generate a fresh identity of [`DEFAULT_ID_LENGTH`] digits.
#[inline]
pub fn generate() -> String {
    generate_with_len(DEFAULT_ID_LENGTH)
}

/// Generate a fresh identity with `len` decimal digits, never fewer than
/// [`MIN_ID_LENGTH`].
pub fn generate_with_len(len: usize) -> String {
    let len = len.max(MIN_ID_LENGTH);
    let mut out = String::with_capacity(len);
    while out.len() < len {
        let mut bits = Uuid::new_v4().as_u128();
        // 30 digits stay well inside the 122 random bits of a v4 UUID.
        for _ in 0..30 {
            if out.len() == len {
                break;
            }
            let digit = (bits % 10) as u8;
            bits /= 10;
            out.push(char::from(b'0' + digit));
        }
    }
    out
}

/// Stable 64-bit hash of an identity, used to seed per-keyframe randomness.
pub fn seed_of(id: &str) -> u64 {
    // FNV-1a
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in id.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_requested_length_and_digits() {
        let id = generate();
        assert_eq!(id.len(), DEFAULT_ID_LENGTH);
        assert!(id.bytes().all(|b| b.is_ascii_digit()));

        let long = generate_with_len(70);
        assert_eq!(long.len(), 70);
    }

    #[test]
    fn short_lengths_are_raised_to_the_minimum() {
        assert_eq!(generate_with_len(0).len(), MIN_ID_LENGTH);
        assert_eq!(generate_with_len(1).len(), MIN_ID_LENGTH);
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(generate(), generate());
    }

    #[test]
    fn seed_is_stable() {
        assert_eq!(seed_of("abc"), seed_of("abc"));
        assert_ne!(seed_of("abc"), seed_of("abd"));
    }
}
