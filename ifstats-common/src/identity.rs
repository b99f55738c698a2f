//! Stable identifiers derived from configuration.
//!
//! Entity identities must survive restarts, so everything here is a pure
//! function of configured values.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from a SHA-256 digest.
pub const HASH_PREFIX_LEN: usize = 32;

/// Truncated SHA-256 hex digest of a device host.
pub fn host_hash(host: &str) -> String {
    truncated_digest(host.as_bytes())
}

/// Identifier of one collector instance.
///
/// Derived from the set of configured device hashes: order and duplicates
/// do not matter, so the same fleet always yields the same id.
pub fn instance_id<'a>(device_hashes: impl IntoIterator<Item = &'a str>) -> String {
    let mut hashes: Vec<&str> = device_hashes.into_iter().collect();
    hashes.sort_unstable();
    hashes.dedup();
    truncated_digest(hashes.join(",").as_bytes())
}

fn truncated_digest(data: &[u8]) -> String {
    let mut digest = hex::encode(Sha256::digest(data));
    digest.truncate(HASH_PREFIX_LEN);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_hash() {
        // sha256("192.168.1.1")
        assert_eq!(host_hash("192.168.1.1"), "c5eb5a4cc76a5cdb16e79864b9ccd26c");
        assert_eq!(host_hash("192.168.1.1").len(), HASH_PREFIX_LEN);
        assert_ne!(host_hash("192.168.1.1"), host_hash("192.168.1.2"));
    }

    #[test]
    fn test_instance_id_is_order_independent() {
        let a = host_hash("router");
        let b = host_hash("switch");

        let forward = instance_id([a.as_str(), b.as_str()]);
        let reverse = instance_id([b.as_str(), a.as_str()]);
        let duplicated = instance_id([b.as_str(), a.as_str(), b.as_str()]);

        assert_eq!(forward, reverse);
        assert_eq!(forward, duplicated);
        assert_eq!(forward.len(), HASH_PREFIX_LEN);
        assert_ne!(forward, instance_id([a.as_str()]));
    }
}
