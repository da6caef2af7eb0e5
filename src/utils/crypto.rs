use rand::{Rng, rng};
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 digest
pub const DIGEST_LENGTH: usize = 32;

/// Fill a fresh buffer with random bytes
pub fn generate_random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rng().fill_bytes(&mut bytes);
    bytes
}

/// HMAC-SHA256 over the concatenation of `parts`, without copying them together.
pub fn hmac_sha256_parts(key: &[u8], parts: &[&[u8]]) -> [u8; DIGEST_LENGTH] {
    let mut mac = match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts keys of any length"),
    };
    for part in parts {
        mac.update(part);
    }

    let mut output = [0u8; DIGEST_LENGTH];
    output.copy_from_slice(&mac.finalize().into_bytes());
    output
}
