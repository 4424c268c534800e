//! Network address generators.

use rand::Rng;

/// Four uniform octets in `[0, 255]`, dot-joined.
pub fn generate_ipv4<R: Rng>(rng: &mut R) -> String {
    (0..4)
        .map(|_| rng.random_range(0..=u8::MAX).to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// Eight uniform groups in `[0, 65535]`, lowercase hex, colon-joined.
///
/// Groups are not zero-compressed.
pub fn generate_ipv6<R: Rng>(rng: &mut R) -> String {
    (0..8)
        .map(|_| format!("{:x}", rng.random_range(0..=u16::MAX)))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_generate_ipv4() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let value = generate_ipv4(&mut rng);
            let octets: Vec<&str> = value.split('.').collect();
            assert_eq!(octets.len(), 4);
            for octet in octets {
                let n: u32 = octet.parse().unwrap();
                assert!(n <= 255);
            }
            assert!(value.parse::<Ipv4Addr>().is_ok());
        }
    }

    #[test]
    fn test_generate_ipv6() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let value = generate_ipv6(&mut rng);
            let groups: Vec<&str> = value.split(':').collect();
            assert_eq!(groups.len(), 8);
            assert!(groups
                .iter()
                .all(|g| !g.is_empty() && g.len() <= 4 && *g == g.to_lowercase()));
            assert!(value.parse::<Ipv6Addr>().is_ok());
        }
    }
}
