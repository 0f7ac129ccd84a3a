//! Nachrichten-Hashes (SHA-256 und SHA3-256)

use std::str::FromStr;

use sha2::Sha256;
use sha3::{Digest, Sha3_256};

use crate::error::CryptoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    Sha3_256,
}

impl FromStr for DigestAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha3_256" => Ok(Self::Sha3_256),
            andere => Err(CryptoError::Kodierung(format!(
                "unbekannter Hash-Algorithmus '{andere}'"
            ))),
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sha256 => write!(f, "sha256"),
            Self::Sha3_256 => write!(f, "sha3_256"),
        }
    }
}

/// Hash eines Textes als Hex (Kleinbuchstaben)
pub fn message_digest(text: &str, algorithm: DigestAlgorithm) -> String {
    match algorithm {
        DigestAlgorithm::Sha256 => hex::encode(Sha256::digest(text.as_bytes())),
        DigestAlgorithm::Sha3_256 => hex::encode(Sha3_256::digest(text.as_bytes())),
    }
}
