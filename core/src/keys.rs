//! Shared-secret key pairs used by the login handshake.

use crate::Error;
use std::convert::TryFrom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPair {
    pub server: u16,
    pub client: u16,
}

pub const KEY_PAIRS: [KeyPair; 5] = [
    KeyPair { server: 23019, client: 32037 },
    KeyPair { server: 32037, client: 29295 },
    KeyPair { server: 18789, client: 13603 },
    KeyPair { server: 16443, client: 29533 },
    KeyPair { server: 18189, client: 21952 },
];

/// Both sides of the challenge derived from one name hash and one key pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Challenge {
    pub server: u16,
    pub client: u16,
}

impl KeyPair {
    pub fn challenge(&self, hash: u16) -> Challenge {
        Challenge {
            server: hash.wrapping_add(self.server),
            client: hash.wrapping_add(self.client),
        }
    }
}

/// Sum of the name's character codes, times 1000, modulo 2^16.
pub fn hash(name: &str) -> u16 {
    let sum: u64 = name.chars().map(|c| u64::from(u32::from(c))).sum();
    (sum.wrapping_mul(1000) % 65536) as u16
}

/// Resolves a key id as sent by the client.
pub fn lookup(id: &str) -> Result<KeyPair, Error> {
    let digits = id.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(id);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Syntax);
    }
    // all digits: only overflow can fail, and that is out of range too
    let id: i64 = id.parse().map_err(|_| Error::KeyOutOfRange)?;
    usize::try_from(id)
        .ok()
        .and_then(|index| KEY_PAIRS.get(index).copied())
        .ok_or(Error::KeyOutOfRange)
}
