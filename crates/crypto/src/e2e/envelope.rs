//! Nachrichten-Umschlag fuer Direktnachrichten (ECIES, zweistufig)
//!
//! ## Senden
//! 1. Ephemeres P-256-Paar `E` erzeugen
//! 2. `secret = ECDH(E.private, empfaenger)`
//! 3. `wrap_key = HKDF(secret, "ecies")`
//! 4. Frischen Nachrichtenschluessel `K` und `key_nonce` erzeugen
//! 5. `encrypted_key = AES-GCM(wrap_key, key_nonce, K)`
//! 6. `ciphertext = AES-GCM(K, msg_nonce, klartext)`
//!
//! Empfangen ist die Umkehrung. Der Umweg ueber `K` erlaubt es, dasselbe
//! Einwickel-Muster fuer Gruppenschluessel zu verwenden.
//!
//! ## Wire-Format (JSON)
//! ```text
//! {
//!   "ephemeral_public_key": "-----BEGIN PUBLIC KEY-----...",  // SPKI-PEM
//!   "encrypted_key":        "<base64>",                        // K + Tag
//!   "nonce":                "<base64, 12 Bytes>",              // Key-Wrap-Nonce
//!   "ciphertext":           "<base64>",                        // Klartext + Tag
//!   "ciphertext_nonce":     "<base64, 12 Bytes>"               // Payload-Nonce
//! }
//! ```
//! Alternativ als zwei Teile ([`WrappedKey`] + [`EncryptedContent`]),
//! wobei beide Teile ihre Nonce jeweils im Feld `nonce` tragen.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::e2e::agreement::{agree, EphemeralKeyPair};
use crate::e2e::cipher::{open, open_with_aad, seal, seal_with_aad};
use crate::e2e::kdf::{derive, ECIES_LABEL};
use crate::error::{CryptoError, CryptoResult};
use crate::keys::{load_public_key, PrivateKeyHandle, PublicKeyHandle};
use crate::types::{MessageKey, Nonce, SecretBytes, SymmetricKey};

/// Eingewickelter symmetrischer Schluessel fuer genau einen Empfaenger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedKey {
    /// Oeffentlicher Teil des ephemeren Paars (SPKI-PEM)
    pub ephemeral_public_key: String,
    /// Verschluesselter Schluessel inkl. Auth-Tag (Base64)
    pub encrypted_key: String,
    /// Nonce des Key-Wraps (Base64, 12 Bytes)
    pub nonce: String,
}

/// Verschluesselter Inhalt einer Nachricht
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedContent {
    /// Klartext-Ciphertext inkl. Auth-Tag (Base64)
    pub ciphertext: String,
    /// Payload-Nonce (Base64, 12 Bytes)
    pub nonce: String,
}

/// Vollstaendiger Umschlag einer Direktnachricht
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherEnvelope {
    pub ephemeral_public_key: String,
    pub encrypted_key: String,
    /// Key-Wrap-Nonce
    pub nonce: String,
    pub ciphertext: String,
    pub ciphertext_nonce: String,
}

impl CipherEnvelope {
    /// Setzt einen Umschlag aus der zweiteiligen Form zusammen
    pub fn from_parts(key: WrappedKey, content: EncryptedContent) -> Self {
        Self {
            ephemeral_public_key: key.ephemeral_public_key,
            encrypted_key: key.encrypted_key,
            nonce: key.nonce,
            ciphertext: content.ciphertext,
            ciphertext_nonce: content.nonce,
        }
    }

    /// Zerlegt den Umschlag in Schluessel- und Inhaltsteil
    pub fn into_parts(self) -> (WrappedKey, EncryptedContent) {
        (
            WrappedKey {
                ephemeral_public_key: self.ephemeral_public_key,
                encrypted_key: self.encrypted_key,
                nonce: self.nonce,
            },
            EncryptedContent {
                ciphertext: self.ciphertext,
                nonce: self.ciphertext_nonce,
            },
        )
    }

    pub fn to_json(&self) -> CryptoResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> CryptoResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn schluesselteil(&self) -> WrappedKey {
        WrappedKey {
            ephemeral_public_key: self.ephemeral_public_key.clone(),
            encrypted_key: self.encrypted_key.clone(),
            nonce: self.nonce.clone(),
        }
    }

    fn inhaltsteil(&self) -> EncryptedContent {
        EncryptedContent {
            ciphertext: self.ciphertext.clone(),
            nonce: self.ciphertext_nonce.clone(),
        }
    }
}

/// Dekodierte Binaerform eines [`WrappedKey`]
struct DekodierterSchluessel {
    ephemeral: PublicKeyHandle,
    encrypted_key: Vec<u8>,
    nonce: Nonce,
}

impl WrappedKey {
    fn dekodieren(&self) -> CryptoResult<DekodierterSchluessel> {
        let encrypted_key = BASE64.decode(&self.encrypted_key)?;
        let nonce = Nonce::from_base64(&self.nonce)?;
        let ephemeral = load_public_key(&self.ephemeral_public_key)?;
        Ok(DekodierterSchluessel {
            ephemeral,
            encrypted_key,
            nonce,
        })
    }
}

impl EncryptedContent {
    /// Verschluesselt `plaintext` unter `key` mit frischer Nonce
    pub fn seal(key: &SymmetricKey, plaintext: &[u8]) -> CryptoResult<Self> {
        let nonce = Nonce::generate();
        let ciphertext = seal(key.as_bytes(), &nonce, plaintext)?;
        Ok(Self {
            ciphertext: BASE64.encode(ciphertext),
            nonce: nonce.to_base64(),
        })
    }

    /// Entschluesselt den Inhalt; dekodiert vor jedem Krypto-Schritt
    pub fn open(&self, key: &SymmetricKey) -> CryptoResult<Vec<u8>> {
        let (ciphertext, nonce) = self.dekodieren()?;
        open(key.as_bytes(), &nonce, &ciphertext)
    }

    fn dekodieren(&self) -> CryptoResult<(Vec<u8>, Nonce)> {
        Ok((
            BASE64.decode(&self.ciphertext)?,
            Nonce::from_base64(&self.nonce)?,
        ))
    }
}

/// Wickelt `key` fuer `recipient` ein (Schritte 1-5)
pub fn wrap_key(key: &SymmetricKey, recipient: &PublicKeyHandle) -> CryptoResult<WrappedKey> {
    wrap_key_with_label(key, recipient, ECIES_LABEL)
}

/// Wie [`wrap_key`], mit frei waehlbarem KDF-Kontext-Label
pub fn wrap_key_with_label(
    key: &SymmetricKey,
    recipient: &PublicKeyHandle,
    label: &str,
) -> CryptoResult<WrappedKey> {
    einwickeln(key, recipient, label, &[])
}

/// Wie [`wrap_key`], bindet zusaetzlich `aad` an den Auth-Tag des Wraps
///
/// Beim Auswickeln muss exakt dieselbe `aad` uebergeben werden.
pub fn wrap_key_with_aad(
    key: &SymmetricKey,
    recipient: &PublicKeyHandle,
    aad: &[u8],
) -> CryptoResult<WrappedKey> {
    einwickeln(key, recipient, ECIES_LABEL, aad)
}

fn einwickeln(
    key: &SymmetricKey,
    recipient: &PublicKeyHandle,
    label: &str,
    aad: &[u8],
) -> CryptoResult<WrappedKey> {
    let ephemeral = EphemeralKeyPair::generate();
    let ephemeral_public_key = ephemeral.public_key().to_pem()?;

    let secret = ephemeral.agree(recipient)?;
    let wrapping_key = derive(&secret, label)?;

    let nonce = Nonce::generate();
    let encrypted_key = seal_with_aad(wrapping_key.as_bytes(), &nonce, key.as_bytes(), aad)?;

    Ok(WrappedKey {
        ephemeral_public_key,
        encrypted_key: BASE64.encode(encrypted_key),
        nonce: nonce.to_base64(),
    })
}

/// Wickelt einen Schluessel mit dem eigenen privaten Schluessel aus
pub fn unwrap_key(wrapped: &WrappedKey, recipient: &PrivateKeyHandle) -> CryptoResult<SymmetricKey> {
    unwrap_key_with_label(wrapped, recipient, ECIES_LABEL)
}

/// Wie [`unwrap_key`], mit frei waehlbarem KDF-Kontext-Label
pub fn unwrap_key_with_label(
    wrapped: &WrappedKey,
    recipient: &PrivateKeyHandle,
    label: &str,
) -> CryptoResult<SymmetricKey> {
    let dekodiert = wrapped.dekodieren()?;
    unwrap_dekodiert(&dekodiert, recipient, label, &[])
}

/// Gegenstueck zu [`wrap_key_with_aad`]; abweichende `aad` ergibt
/// `Authentifizierung`
pub fn unwrap_key_with_aad(
    wrapped: &WrappedKey,
    recipient: &PrivateKeyHandle,
    aad: &[u8],
) -> CryptoResult<SymmetricKey> {
    let dekodiert = wrapped.dekodieren()?;
    unwrap_dekodiert(&dekodiert, recipient, ECIES_LABEL, aad)
}

fn unwrap_dekodiert(
    dekodiert: &DekodierterSchluessel,
    recipient: &PrivateKeyHandle,
    label: &str,
    aad: &[u8],
) -> CryptoResult<SymmetricKey> {
    let secret = agree(recipient, &dekodiert.ephemeral)?;
    let wrapping_key = derive(&secret, label)?;

    let key_bytes = SecretBytes::new(open_with_aad(
        wrapping_key.as_bytes(),
        &dekodiert.nonce,
        &dekodiert.encrypted_key,
        aad,
    )?);

    // Ein authentischer Wrap mit falscher Laenge ist kein gueltiger Schluessel
    SymmetricKey::from_slice(key_bytes.as_bytes()).map_err(|_| CryptoError::Authentifizierung)
}

/// Versiegelt eine Text-Nachricht fuer `recipient`
pub fn seal_message(plaintext: &str, recipient: &PublicKeyHandle) -> CryptoResult<CipherEnvelope> {
    seal_bytes_with_label(plaintext.as_bytes(), recipient, ECIES_LABEL)
}

/// Oeffnet eine Text-Nachricht mit dem eigenen privaten Schluessel
pub fn open_message(envelope: &CipherEnvelope, recipient: &PrivateKeyHandle) -> CryptoResult<String> {
    let bytes = open_bytes_with_label(envelope, recipient, ECIES_LABEL)?;
    String::from_utf8(bytes).map_err(|_| CryptoError::Kodierung("Klartext ist kein UTF-8".into()))
}

pub fn seal_bytes(plaintext: &[u8], recipient: &PublicKeyHandle) -> CryptoResult<CipherEnvelope> {
    seal_bytes_with_label(plaintext, recipient, ECIES_LABEL)
}

pub fn open_bytes(envelope: &CipherEnvelope, recipient: &PrivateKeyHandle) -> CryptoResult<Vec<u8>> {
    open_bytes_with_label(envelope, recipient, ECIES_LABEL)
}

/// Versiegelt Bytes: frischer Nachrichtenschluessel, eingewickelt fuer `recipient`
pub fn seal_bytes_with_label(
    plaintext: &[u8],
    recipient: &PublicKeyHandle,
    label: &str,
) -> CryptoResult<CipherEnvelope> {
    let message_key = MessageKey::generate();
    let wrapped = wrap_key_with_label(&message_key, recipient, label)?;
    let content = EncryptedContent::seal(&message_key, plaintext)?;

    tracing::debug!(klartext_bytes = plaintext.len(), "Direktnachricht versiegelt");
    Ok(CipherEnvelope::from_parts(wrapped, content))
}

/// Oeffnet einen Umschlag; alle Felder werden vor dem ersten
/// Krypto-Schritt dekodiert
pub fn open_bytes_with_label(
    envelope: &CipherEnvelope,
    recipient: &PrivateKeyHandle,
    label: &str,
) -> CryptoResult<Vec<u8>> {
    let schluessel = envelope.schluesselteil().dekodieren()?;
    let (ciphertext, nonce) = envelope.inhaltsteil().dekodieren()?;

    let message_key = unwrap_dekodiert(&schluessel, recipient, label, &[])?;
    let plaintext = open(message_key.as_bytes(), &nonce, &ciphertext)?;

    tracing::debug!(klartext_bytes = plaintext.len(), "Direktnachricht geoeffnet");
    Ok(plaintext)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FehlerKategorie;
    use p256::SecretKey;
    use rand::rngs::OsRng;

    fn schluesselpaar() -> (PrivateKeyHandle, PublicKeyHandle) {
        let private = PrivateKeyHandle::from(SecretKey::random(&mut OsRng));
        let public = private.public_key();
        (private, public)
    }

    /// Kippt ein Bit im dekodierten Wert eines Base64-Feldes
    fn bit_kippen(feld: &str, index: usize) -> String {
        let mut bytes = BASE64.decode(feld).unwrap();
        let i = index % bytes.len();
        bytes[i] ^= 0x01;
        BASE64.encode(bytes)
    }

    #[test]
    fn hola_roundtrip() {
        let (private, public) = schluesselpaar();
        let envelope = seal_message("hola", &public).unwrap();
        assert_eq!(open_message(&envelope, &private).unwrap(), "hola");
    }

    #[test]
    fn hola_mit_manipuliertem_ciphertext() {
        let (private, public) = schluesselpaar();
        let mut envelope = seal_message("hola", &public).unwrap();
        envelope.ciphertext = bit_kippen(&envelope.ciphertext, 0);

        assert!(matches!(
            open_message(&envelope, &private),
            Err(CryptoError::Authentifizierung)
        ));
    }

    #[test]
    fn manipulation_jedes_feldes_wird_erkannt() {
        let (private, public) = schluesselpaar();
        let original = seal_message("Treffen um 8", &public).unwrap();

        let varianten: Vec<Box<dyn Fn(&mut CipherEnvelope)>> = vec![
            Box::new(|e: &mut CipherEnvelope| e.ciphertext = bit_kippen(&e.ciphertext, 3)),
            Box::new(|e: &mut CipherEnvelope| e.encrypted_key = bit_kippen(&e.encrypted_key, 5)),
            Box::new(|e: &mut CipherEnvelope| e.nonce = bit_kippen(&e.nonce, 7)),
            Box::new(|e: &mut CipherEnvelope| e.ciphertext_nonce = bit_kippen(&e.ciphertext_nonce, 11)),
        ];

        for manipulieren in varianten {
            let mut envelope = original.clone();
            manipulieren(&mut envelope);
            let result = open_message(&envelope, &private);
            assert!(
                matches!(result, Err(CryptoError::Authentifizierung)),
                "erwartet Authentifizierungsfehler, erhalten {result:?}"
            );
        }
    }

    #[test]
    fn falscher_empfaenger_schlaegt_fehl() {
        let (_, bob_pub) = schluesselpaar();
        let (eve_priv, _) = schluesselpaar();

        let envelope = seal_message("nur fuer Bob", &bob_pub).unwrap();
        let result = open_message(&envelope, &eve_priv);
        assert!(matches!(
            result.map_err(|e| e.kategorie()),
            Err(FehlerKategorie::AuthenticationFailed | FehlerKategorie::AgreementFailed)
        ));
    }

    #[test]
    fn zwei_nachrichten_teilen_nichts() {
        let (_, public) = schluesselpaar();
        let a = seal_message("gleich", &public).unwrap();
        let b = seal_message("gleich", &public).unwrap();

        assert_ne!(a.ephemeral_public_key, b.ephemeral_public_key);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext_nonce, b.ciphertext_nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn kaputtes_base64_ist_kodierungsfehler() {
        let (private, public) = schluesselpaar();
        let mut envelope = seal_message("x", &public).unwrap();
        envelope.ciphertext = "%%%".into();

        let err = open_message(&envelope, &private).unwrap_err();
        assert_eq!(err.kategorie(), FehlerKategorie::EncodingError);
    }

    #[test]
    fn kurze_nonce_ist_kodierungsfehler() {
        let (private, public) = schluesselpaar();
        let mut envelope = seal_message("x", &public).unwrap();
        envelope.nonce = BASE64.encode([0u8; 8]);

        let err = open_message(&envelope, &private).unwrap_err();
        assert!(matches!(err, CryptoError::UngueltigeNonce { erhalten: 8, .. }));
    }

    #[test]
    fn kaputter_ephemerer_schluessel_ist_formatfehler() {
        let (private, public) = schluesselpaar();
        let mut envelope = seal_message("x", &public).unwrap();
        envelope.ephemeral_public_key = "kein pem".into();

        let err = open_message(&envelope, &private).unwrap_err();
        assert_eq!(err.kategorie(), FehlerKategorie::InvalidKeyFormat);
    }

    #[test]
    fn json_wire_format() {
        let (private, public) = schluesselpaar();
        let envelope = seal_message("json", &public).unwrap();
        let json = envelope.to_json().unwrap();

        let wert: serde_json::Value = serde_json::from_str(&json).unwrap();
        for feld in [
            "ephemeral_public_key",
            "encrypted_key",
            "nonce",
            "ciphertext",
            "ciphertext_nonce",
        ] {
            assert!(wert.get(feld).is_some(), "Feld {feld} fehlt");
        }

        let zurueck = CipherEnvelope::from_json(&json).unwrap();
        assert_eq!(open_message(&zurueck, &private).unwrap(), "json");
    }

    #[test]
    fn unvollstaendiges_json_ist_kodierungsfehler() {
        let err = CipherEnvelope::from_json(r#"{"ciphertext":"AAAA"}"#).unwrap_err();
        assert_eq!(err.kategorie(), FehlerKategorie::EncodingError);
    }

    #[test]
    fn zweiteilige_form() {
        let (private, public) = schluesselpaar();
        let envelope = seal_message("teile", &public).unwrap();

        let (key, content) = envelope.clone().into_parts();
        assert_eq!(content.nonce, envelope.ciphertext_nonce);
        assert_eq!(key.nonce, envelope.nonce);

        let message_key = unwrap_key(&key, &private).unwrap();
        assert_eq!(content.open(&message_key).unwrap(), b"teile");
        assert_eq!(CipherEnvelope::from_parts(key, content), envelope);
    }

    #[test]
    fn anderes_label_passt_nicht() {
        let (private, public) = schluesselpaar();
        let envelope = seal_bytes_with_label(b"x", &public, "ecies").unwrap();
        let result = open_bytes_with_label(&envelope, &private, "anders");
        assert!(matches!(result, Err(CryptoError::Authentifizierung)));
    }

    #[test]
    fn binaerer_klartext_ist_kein_utf8() {
        let (private, public) = schluesselpaar();
        let envelope = seal_bytes(&[0xff, 0xfe, 0x00], &public).unwrap();
        assert_eq!(open_bytes(&envelope, &private).unwrap(), vec![0xff, 0xfe, 0x00]);
        assert!(matches!(
            open_message(&envelope, &private),
            Err(CryptoError::Kodierung(_))
        ));
    }

    #[test]
    fn wrap_mit_aad_verlangt_dieselbe_aad() {
        let (private, public) = schluesselpaar();
        let key = SymmetricKey::generate();

        let wrapped = wrap_key_with_aad(&key, &public, b"kontext-a").unwrap();
        let zurueck = unwrap_key_with_aad(&wrapped, &private, b"kontext-a").unwrap();
        assert_eq!(zurueck.as_bytes(), key.as_bytes());

        assert!(matches!(
            unwrap_key_with_aad(&wrapped, &private, b"kontext-b"),
            Err(CryptoError::Authentifizierung)
        ));
        assert!(matches!(
            unwrap_key(&wrapped, &private),
            Err(CryptoError::Authentifizierung)
        ));
    }
}
