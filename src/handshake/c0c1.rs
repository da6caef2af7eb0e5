use crate::{Error, Result};
use crate::handshake::state::HandshakeFormat;
use crate::utils::{generate_random_bytes, hmac_sha256_parts, current_timestamp, DIGEST_LENGTH};

/// RTMP version
pub const RTMP_VERSION: u8 = 3;

/// Handshake packet size (C1/S1/C2/S2)
pub const HANDSHAKE_SIZE: usize = 1536;

/// Bytes preceding the signature in a digest-scheme C2/S2
pub const SIGNED_PAYLOAD_SIZE: usize = HANDSHAKE_SIZE - DIGEST_LENGTH;

/// Version field advertised in a digest-scheme S1
pub const SERVER_VERSION: [u8; 4] = [0x03, 0x05, 0x01, 0x01];

/// Version field advertised by a digest-scheme client
pub const PLAYER_VERSION: [u8; 4] = [0x09, 0x00, 0x7C, 0x02];

pub const GENUINE_FP_KEY: &[u8] = b"Genuine Adobe Flash Player 001";
pub const GENUINE_FMS_KEY: &[u8] = b"Genuine Adobe Flash Media Server 001";

/// Appended to the key texts to form the keys used for C2/S2 signatures
pub const KEY_SUFFIX: [u8; 32] = [
    0xF0, 0xEE, 0xC2, 0x4A, 0x80, 0x68, 0xBE, 0xE8,
    0x2E, 0x00, 0xD0, 0xD1, 0x02, 0x9E, 0x7E, 0x57,
    0x6E, 0xEC, 0x5D, 0x2D, 0x29, 0x80, 0x6F, 0xAB,
    0x93, 0xB8, 0xE6, 0x36, 0xCF, 0xEB, 0x31, 0xAE,
];

/// Player key with the suffix (62 bytes)
pub fn full_player_key() -> Vec<u8> {
    [GENUINE_FP_KEY, &KEY_SUFFIX[..]].concat()
}

/// Media server key with the suffix (68 bytes)
pub fn full_server_key() -> Vec<u8> {
    [GENUINE_FMS_KEY, &KEY_SUFFIX[..]].concat()
}

/// Where the 32-byte digest lives inside a 1536-byte block.
pub fn digest_offset(block: &[u8], format: HandshakeFormat) -> Option<usize> {
    let (base, start) = match format {
        HandshakeFormat::Simple => return None,
        HandshakeFormat::Format1 => (12, 8),
        HandshakeFormat::Format2 => (776, 772),
    };
    let sum: usize = block.get(start..start + 4)?.iter().map(|b| *b as usize).sum();
    Some(sum % 728 + base)
}

/// HMAC of the block with the digest bytes left out
pub fn block_digest(block: &[u8], offset: usize, key: &[u8]) -> [u8; DIGEST_LENGTH] {
    hmac_sha256_parts(key, &[&block[..offset], &block[offset + DIGEST_LENGTH..]])
}

/// Compute the block digest and write it into place.
pub(crate) fn sign_block(block: &mut [u8], format: HandshakeFormat, key: &[u8]) -> Option<[u8; DIGEST_LENGTH]> {
    let offset = digest_offset(block, format)?;
    let digest = block_digest(block, offset, key);
    block[offset..offset + DIGEST_LENGTH].copy_from_slice(&digest);
    Some(digest)
}

/// Signature closing a C2/S2: HMAC over the first 1504 bytes, keyed by the
/// HMAC of the peer's digest under the full key.
pub fn block_signature(payload: &[u8], peer_digest: &[u8], full_key: &[u8]) -> [u8; DIGEST_LENGTH] {
    let signing_key = hmac_sha256_parts(full_key, &[peer_digest]);
    hmac_sha256_parts(&signing_key, &[&payload[..SIGNED_PAYLOAD_SIZE]])
}

/// Client handshake (C0 + C1)
#[derive(Debug, Clone)]
pub struct C0C1 {
    pub version: u8,
    /// The 1536-byte C1 block
    pub c1: Vec<u8>,
}

impl C0C1 {
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 1 + HANDSHAKE_SIZE {
            return Err(Error::handshake(format!(
                "C0+C1 too short: {} bytes, expected {}",
                data.len(),
                1 + HANDSHAKE_SIZE
            )));
        }

        let version = data[0];
        if version != RTMP_VERSION {
            return Err(Error::handshake(format!(
                "unsupported RTMP version {}, expected {}",
                version, RTMP_VERSION
            )));
        }

        Ok(C0C1 {
            version,
            c1: data[1..1 + HANDSHAKE_SIZE].to_vec(),
        })
    }

    /// Plain C0+C1: timestamp, zero version field, random filler
    pub fn create_client() -> Self {
        let mut c1 = Vec::with_capacity(HANDSHAKE_SIZE);
        c1.extend_from_slice(&current_timestamp().to_be_bytes());
        c1.extend_from_slice(&[0; 4]);
        c1.extend_from_slice(&generate_random_bytes(HANDSHAKE_SIZE - 8));

        C0C1 {
            version: RTMP_VERSION,
            c1,
        }
    }

    /// C0+C1 carrying a player digest in the given scheme
    pub fn create_client_digest(format: HandshakeFormat) -> Self {
        let mut c0c1 = Self::create_client();
        c0c1.c1[4..8].copy_from_slice(&PLAYER_VERSION);
        sign_block(&mut c0c1.c1, format, GENUINE_FP_KEY);
        c0c1
    }

    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.c1[0], self.c1[1], self.c1[2], self.c1[3]])
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(1 + HANDSHAKE_SIZE);
        result.push(self.version);
        result.extend_from_slice(&self.c1);
        result
    }

    /// Work out which handshake the client speaks.
    ///
    /// A zero version field means a plain handshake. Otherwise the digest is
    /// checked in both schemes; a block that verifies in neither falls back
    /// to plain.
    pub fn detect_format(&self) -> HandshakeFormat {
        if self.c1[4..8] == [0, 0, 0, 0] {
            return HandshakeFormat::Simple;
        }

        [HandshakeFormat::Format1, HandshakeFormat::Format2]
            .into_iter()
            .find(|format| self.client_digest(*format).is_some())
            .unwrap_or(HandshakeFormat::Simple)
    }

    /// The client's digest, if it verifies in the given scheme
    pub fn client_digest(&self, format: HandshakeFormat) -> Option<[u8; DIGEST_LENGTH]> {
        let offset = digest_offset(&self.c1, format)?;
        let expected = block_digest(&self.c1, offset, GENUINE_FP_KEY);
        (self.c1[offset..offset + DIGEST_LENGTH] == expected).then_some(expected)
    }
}
