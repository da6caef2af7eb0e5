use crate::{Error, Result};
use crate::handshake::c0c1::*;
use crate::handshake::state::HandshakeFormat;
use crate::utils::{generate_random_bytes, current_timestamp, DIGEST_LENGTH};

/// Server handshake (S0 + S1 + S2)
#[derive(Debug, Clone)]
pub struct S0S1S2 {
    pub version: u8,
    pub s1: Vec<u8>,
    pub s2: Vec<u8>,
    /// Scheme S1 was built with; `Simple` when parsed by a client
    pub format: HandshakeFormat,
}

fn plain_block(timestamp: u32, version: [u8; 4]) -> Vec<u8> {
    let mut block = Vec::with_capacity(HANDSHAKE_SIZE);
    block.extend_from_slice(&timestamp.to_be_bytes());
    block.extend_from_slice(&version);
    block.extend_from_slice(&generate_random_bytes(HANDSHAKE_SIZE - 8));
    block
}

impl S0S1S2 {
    /// Plain response: random S1, S2 echoing C1 with our read time
    pub fn generate(c0c1: &C0C1) -> Result<Self> {
        if c0c1.version != RTMP_VERSION {
            return Err(Error::handshake(format!(
                "unsupported client version {}",
                c0c1.version
            )));
        }

        let mut s2 = c0c1.c1.clone();
        s2[4..8].copy_from_slice(&current_timestamp().to_be_bytes());

        Ok(S0S1S2 {
            version: RTMP_VERSION,
            s1: plain_block(current_timestamp(), [0; 4]),
            s2,
            format: HandshakeFormat::Simple,
        })
    }

    /// Digest response: S1 carries a server digest in the client's scheme
    /// and S2 is signed against the client's digest.
    pub fn generate_complex(c0c1: &C0C1, format: HandshakeFormat) -> Result<Self> {
        if !format.is_digest() {
            return Self::generate(c0c1);
        }
        let client_digest = c0c1
            .client_digest(format)
            .ok_or_else(|| Error::handshake(format!("C1 digest does not verify as {:?}", format)))?;

        let mut s1 = plain_block(current_timestamp(), SERVER_VERSION);
        sign_block(&mut s1, format, GENUINE_FMS_KEY);

        let mut s2 = generate_random_bytes(HANDSHAKE_SIZE);
        let signature = block_signature(&s2, &client_digest, &full_server_key());
        s2[SIGNED_PAYLOAD_SIZE..].copy_from_slice(&signature);

        Ok(S0S1S2 {
            version: RTMP_VERSION,
            s1,
            s2,
            format,
        })
    }

    pub fn s1_timestamp(&self) -> u32 {
        u32::from_be_bytes([self.s1[0], self.s1[1], self.s1[2], self.s1[3]])
    }

    /// Digest embedded in S1 by a digest-scheme response
    pub fn s1_digest(&self) -> Option<[u8; DIGEST_LENGTH]> {
        let offset = digest_offset(&self.s1, self.format)?;
        let mut digest = [0u8; DIGEST_LENGTH];
        digest.copy_from_slice(&self.s1[offset..offset + DIGEST_LENGTH]);
        Some(digest)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(1 + HANDSHAKE_SIZE * 2);
        result.push(self.version);
        result.extend_from_slice(&self.s1);
        result.extend_from_slice(&self.s2);
        result
    }

    /// Parse S0+S1+S2 on the client side
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 1 + HANDSHAKE_SIZE * 2 {
            return Err(Error::handshake(format!(
                "S0+S1+S2 too short: {} bytes",
                data.len()
            )));
        }

        Ok(S0S1S2 {
            version: data[0],
            s1: data[1..1 + HANDSHAKE_SIZE].to_vec(),
            s2: data[1 + HANDSHAKE_SIZE..1 + HANDSHAKE_SIZE * 2].to_vec(),
            format: HandshakeFormat::Simple,
        })
    }
}

/// C2 packet for completing handshake
#[derive(Debug, Clone)]
pub struct C2 {
    pub timestamp: u32,
    pub timestamp2: u32,
    pub random_echo: Vec<u8>,
}

impl C2 {
    /// Plain C2 echoing S1
    pub fn create_from_s1(s0s1s2: &S0S1S2) -> Self {
        C2 {
            timestamp: s0s1s2.s1_timestamp(),
            timestamp2: current_timestamp(),
            random_echo: s0s1s2.s1[8..].to_vec(),
        }
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HANDSHAKE_SIZE {
            return Err(Error::handshake(format!(
                "C2 too short: {} bytes",
                data.len()
            )));
        }

        Ok(C2 {
            timestamp: u32::from_be_bytes([data[0], data[1], data[2], data[3]]),
            timestamp2: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            random_echo: data[8..HANDSHAKE_SIZE].to_vec(),
        })
    }

    /// Check C2 against the S1 we sent.
    ///
    /// Plain handshakes must echo S1; digest handshakes must carry a
    /// signature over our S1 digest.
    pub fn validate(&self, s0s1s2: &S0S1S2) -> Result<()> {
        match s0s1s2.s1_digest() {
            None => {
                if self.timestamp != s0s1s2.s1_timestamp() {
                    return Err(Error::handshake("C2 timestamp mismatch"));
                }
                if self.random_echo[..] != s0s1s2.s1[8..] {
                    return Err(Error::handshake("C2 random echo mismatch"));
                }
            }
            Some(server_digest) => {
                let block = self.encode();
                let expected = block_signature(&block, &server_digest, &full_player_key());
                if block[SIGNED_PAYLOAD_SIZE..] != expected {
                    return Err(Error::handshake("C2 signature mismatch"));
                }
            }
        }
        Ok(())
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut block = Vec::with_capacity(HANDSHAKE_SIZE);
        block.extend_from_slice(&self.timestamp.to_be_bytes());
        block.extend_from_slice(&self.timestamp2.to_be_bytes());
        block.extend_from_slice(&self.random_echo);
        block
    }
}
