//! Verschluesselung des Nachrichtenstroms einer Gruppe
//!
//! Pro Nachricht wird ein frischer Nachrichtenschluessel `K` erzeugt und
//! direkt mit dem Gruppenschluessel `G` per AES-256-GCM eingewickelt (kein
//! ephemeres ECDH pro Gruppennachricht). Der Klartext wird unter `K`
//! verschluesselt.
//!
//! Beide Verschluesselungen binden `group_id(16) || epoch(4, BE)` als AAD,
//! damit eine Nachricht weder in eine andere Gruppe noch in eine andere
//! Epoch verschoben werden kann.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use geheimpost_core::GroupId;
use serde::{Deserialize, Serialize};

use crate::e2e::cipher::{open_with_aad, seal_with_aad};
use crate::e2e::group_key::GroupSymmetricKey;
use crate::error::{CryptoError, CryptoResult};
use crate::types::{MessageKey, Nonce, SecretBytes};

/// Umschlag einer Gruppennachricht
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEnvelope {
    pub group_id: GroupId,
    /// Epoch des Gruppenschluessels, unter dem `encrypted_key` liegt
    pub epoch: u32,
    /// Nachrichtenschluessel, eingewickelt unter `G` (Base64)
    pub encrypted_key: String,
    /// Key-Wrap-Nonce (Base64, 12 Bytes)
    pub nonce: String,
    pub ciphertext: String,
    pub ciphertext_nonce: String,
}

impl GroupEnvelope {
    pub fn to_json(&self) -> CryptoResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> CryptoResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn aad(group_id: &GroupId, epoch: u32) -> [u8; 20] {
    let mut aad = [0u8; 20];
    aad[..16].copy_from_slice(group_id.as_bytes());
    aad[16..].copy_from_slice(&epoch.to_be_bytes());
    aad
}

pub fn seal_group_message(
    plaintext: &str,
    group_key: &GroupSymmetricKey,
) -> CryptoResult<GroupEnvelope> {
    seal_group_bytes(plaintext.as_bytes(), group_key)
}

pub fn open_group_message(
    envelope: &GroupEnvelope,
    group_key: &GroupSymmetricKey,
) -> CryptoResult<String> {
    let bytes = open_group_bytes(envelope, group_key)?;
    String::from_utf8(bytes).map_err(|_| CryptoError::Kodierung("Klartext ist kein UTF-8".into()))
}

/// Versiegelt Bytes fuer alle Inhaber des Gruppenschluessels
pub fn seal_group_bytes(
    plaintext: &[u8],
    group_key: &GroupSymmetricKey,
) -> CryptoResult<GroupEnvelope> {
    let aad = aad(&group_key.group_id, group_key.epoch);
    let message_key = MessageKey::generate();

    let key_nonce = Nonce::generate();
    let encrypted_key = seal_with_aad(
        group_key.key().as_bytes(),
        &key_nonce,
        message_key.as_bytes(),
        &aad,
    )?;

    let ciphertext_nonce = Nonce::generate();
    let ciphertext = seal_with_aad(message_key.as_bytes(), &ciphertext_nonce, plaintext, &aad)?;

    tracing::debug!(
        group = %group_key.group_id,
        epoch = group_key.epoch,
        klartext_bytes = plaintext.len(),
        "Gruppennachricht versiegelt"
    );

    Ok(GroupEnvelope {
        group_id: group_key.group_id,
        epoch: group_key.epoch,
        encrypted_key: BASE64.encode(encrypted_key),
        nonce: key_nonce.to_base64(),
        ciphertext: BASE64.encode(ciphertext),
        ciphertext_nonce: ciphertext_nonce.to_base64(),
    })
}

/// Oeffnet eine Gruppennachricht mit dem passenden Gruppenschluessel
///
/// Gruppe und Epoch werden vor jedem Krypto-Schritt geprueft.
pub fn open_group_bytes(
    envelope: &GroupEnvelope,
    group_key: &GroupSymmetricKey,
) -> CryptoResult<Vec<u8>> {
    if envelope.group_id != group_key.group_id {
        return Err(CryptoError::KeinSchluessel {
            group_id: envelope.group_id.to_string(),
            epoch: envelope.epoch,
        });
    }
    if envelope.epoch != group_key.epoch {
        return Err(CryptoError::EpochMismatch {
            erwartet: group_key.epoch,
            erhalten: envelope.epoch,
        });
    }

    let encrypted_key = BASE64.decode(&envelope.encrypted_key)?;
    let key_nonce = Nonce::from_base64(&envelope.nonce)?;
    let ciphertext = BASE64.decode(&envelope.ciphertext)?;
    let ciphertext_nonce = Nonce::from_base64(&envelope.ciphertext_nonce)?;

    let aad = aad(&envelope.group_id, envelope.epoch);

    let key_bytes = SecretBytes::new(open_with_aad(
        group_key.key().as_bytes(),
        &key_nonce,
        &encrypted_key,
        &aad,
    )?);
    let message_key =
        MessageKey::from_slice(key_bytes.as_bytes()).map_err(|_| CryptoError::Authentifizierung)?;

    open_with_aad(message_key.as_bytes(), &ciphertext_nonce, &ciphertext, &aad)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
