//! Gemeinsame Typen fuer das Kryptografie-Subsystem

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};

/// Laenge eines symmetrischen Schluessels (AES-256)
pub const KEY_LEN: usize = 32;

/// Laenge einer AES-GCM-Nonce (96 Bit)
pub const NONCE_LEN: usize = 12;

/// Laenge des AES-GCM Auth-Tags (128 Bit)
pub const TAG_LEN: usize = 16;

/// Eine kryptografische Nonce (Number used once)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nonce {
    pub bytes: [u8; NONCE_LEN],
}

impl Nonce {
    /// Erzeugt eine frische Nonce aus dem OS-Zufallsgenerator
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Uebernimmt eine Nonce aus Rohbytes (exakt 12 Bytes)
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; NONCE_LEN] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::UngueltigeNonce {
                    erwartet: NONCE_LEN,
                    erhalten: bytes.len(),
                })?;
        Ok(Self { bytes })
    }

    pub fn from_base64(text: &str) -> CryptoResult<Self> {
        Self::from_slice(&BASE64.decode(text)?)
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.bytes
    }
}

/// Symmetrischer 256-Bit-Schluessel (Nachrichten- oder Gruppenschluessel)
///
/// Wird beim Drop genullt.
#[derive(Clone)]
pub struct SymmetricKey([u8; KEY_LEN]);

/// Frischer Schluessel pro Klartext-Nachricht, genau einmal verwendet
pub type MessageKey = SymmetricKey;

impl SymmetricKey {
    /// Erzeugt einen zufaelligen Schluessel aus dem OS-Zufallsgenerator
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Uebernimmt Schluesselbytes (exakt 32 Bytes)
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let key: [u8; KEY_LEN] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::UngueltigeSchluesselLaenge {
                    erwartet: KEY_LEN,
                    erhalten: bytes.len(),
                })?;
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl From<[u8; KEY_LEN]> for SymmetricKey {
    fn from(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymmetricKey([REDACTED] {KEY_LEN} bytes)")
    }
}

/// Sicherer Container fuer entschluesselte Geheimnisse variabler Laenge
/// (wird beim Drop genullt)
pub struct SecretBytes(Vec<u8>);

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Drop for SecretBytes {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretBytes([REDACTED] {} bytes)", self.0.len())
    }
}
