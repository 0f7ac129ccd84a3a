//! Key Derivation: Einblock-HKDF-SHA256
//!
//! Extract mit einem Null-Salt in Blockgroesse (64 Bytes), danach genau
//! eine Expand-Runde mit `label || 0x01`. Das Ergebnis ist die erste
//! HMAC-Ausgabe (32 Bytes) und wird direkt als AES-256-Schluessel benutzt.
//!
//! Eine Variante mit laengerer Ausgabe gibt es nicht; der
//! Ausgabetyp ist fest 32 Bytes gross.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::e2e::agreement::SharedSecret;
use crate::error::{CryptoError, CryptoResult};
use crate::types::KEY_LEN;

/// Kontext-Label des Nachrichten-Protokolls
pub const ECIES_LABEL: &str = "ecies";

/// Salt fuer den Extract-Schritt: Nullen in SHA-256-Blockgroesse
const SALT: [u8; 64] = [0u8; 64];

/// Aus einem Shared Secret abgeleiteter Schluessel, der genau einen
/// anderen Schluessel ein- bzw. auswickelt
pub struct WrappingKey([u8; KEY_LEN]);

impl WrappingKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for WrappingKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for WrappingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WrappingKey([REDACTED])")
    }
}

/// Leitet den Wrapping Key deterministisch aus dem Shared Secret ab
pub fn derive(secret: &SharedSecret, label: &str) -> CryptoResult<WrappingKey> {
    let hk = Hkdf::<Sha256>::new(Some(&SALT), secret.as_bytes());

    let mut okm = [0u8; KEY_LEN];
    hk.expand(label.as_bytes(), &mut okm)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    Ok(WrappingKey(okm))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hmac::{Hmac, Mac};

    fn geheimnis(bytes: [u8; 32]) -> SharedSecret {
        SharedSecret::from(bytes)
    }

    fn fortlaufend() -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        bytes
    }

    /// Nachbau des Browser-Clients: zwei HMAC-Aufrufe
    fn hmac_referenz(ikm: &[u8], label: &str) -> Vec<u8> {
        let mut extract = Hmac::<Sha256>::new_from_slice(&[0u8; 32]).unwrap();
        extract.update(ikm);
        let prk = extract.finalize().into_bytes();

        let mut expand = Hmac::<Sha256>::new_from_slice(&prk).unwrap();
        expand.update(label.as_bytes());
        expand.update(&[0x01]);
        expand.finalize().into_bytes().to_vec()
    }

    #[test]
    fn derive_deterministisch() {
        let secret = geheimnis([0x11; 32]);
        let k1 = derive(&secret, ECIES_LABEL).unwrap();
        let k2 = derive(&secret, ECIES_LABEL).unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn entspricht_zwei_hmac_runden() {
        let ikm = fortlaufend();
        let key = derive(&geheimnis(ikm), ECIES_LABEL).unwrap();
        assert_eq!(key.as_bytes().to_vec(), hmac_referenz(&ikm, ECIES_LABEL));
    }

    #[test]
    fn bekannter_vektor_ecies() {
        // Gegengeprueft mit HKDF(SHA256, salt=None, info=b"ecies") aus pyca/cryptography
        let key = derive(&geheimnis(fortlaufend()), ECIES_LABEL).unwrap();
        assert_eq!(
            hex::encode(key.as_bytes()),
            "bc1c8d592e7b32c5969397cbd2cba6d5bbca8e55bce412d6be6f81e5d60e11ef"
        );
    }

    #[test]
    fn rfc5869_fall_3_erster_block() {
        // RFC 5869 A.3: leeres Salt, leeres Info, IKM = 22 x 0x0b
        let hk = Hkdf::<Sha256>::new(Some(&SALT), &[0x0b; 22]);
        let mut okm = [0u8; 32];
        hk.expand(b"", &mut okm).unwrap();
        assert_eq!(
            hex::encode(okm),
            "8da4e775a563c18f715f802a063c5a31b8a11f5c5ee1879ec3454e5f3c738d2d"
        );
    }

    #[test]
    fn verschiedene_labels_verschiedene_schluessel() {
        let secret = geheimnis([0x22; 32]);
        let a = derive(&secret, "ecies").unwrap();
        let b = derive(&secret, "ecies-v2").unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }
}
