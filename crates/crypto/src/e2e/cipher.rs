//! AES-256-GCM Seal/Open
//!
//! Ausgabe von `seal` ist `ciphertext || tag(16)`. `open` schlaegt bei
//! jeder Abweichung geschlossen fehl und gibt keinen Teil-Klartext heraus.
//!
//! ## Nonce-Vorbedingung
//! Eine Nonce darf unter demselben Schluessel nur fuer genau eine
//! Verschluesselung verwendet werden. Dieses Modul dedupliziert nicht; der
//! Aufrufer erzeugt pro Aufruf eine frische Nonce mit [`Nonce::generate`].

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce as AesNonce,
};

use crate::error::{CryptoError, CryptoResult};
use crate::types::{Nonce, KEY_LEN, TAG_LEN};

/// Verschluesselt `plaintext` ohne zusaetzliche AAD
pub fn seal(key: &[u8; KEY_LEN], nonce: &Nonce, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    seal_with_aad(key, nonce, plaintext, &[])
}

/// Entschluesselt und verifiziert `ciphertext || tag`
pub fn open(key: &[u8; KEY_LEN], nonce: &Nonce, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
    open_with_aad(key, nonce, ciphertext, &[])
}

/// Verschluesselt und bindet `aad` an den Auth-Tag
pub fn seal_with_aad(
    key: &[u8; KEY_LEN],
    nonce: &Nonce,
    plaintext: &[u8],
    aad: &[u8],
) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    cipher
        .encrypt(
            AesNonce::from_slice(nonce.as_bytes()),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| CryptoError::Kodierung(format!("AES-GCM Verschluesselung: {e}")))
}

/// Entschluesselt mit derselben `aad` wie beim Versiegeln
pub fn open_with_aad(
    key: &[u8; KEY_LEN],
    nonce: &Nonce,
    ciphertext: &[u8],
    aad: &[u8],
) -> CryptoResult<Vec<u8>> {
    if ciphertext.len() < TAG_LEN {
        return Err(CryptoError::Authentifizierung);
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    cipher
        .decrypt(
            AesNonce::from_slice(nonce.as_bytes()),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| CryptoError::Authentifizierung)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
