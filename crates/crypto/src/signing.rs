//! ECDSA-Signaturen (P-256, SHA-256)
//!
//! Signaturen sind DER-kodiert und als Hex-String transportiert. Dieselben
//! P-256-Schluessel wie fuer die Verschluesselung werden verwendet.
//!
//! `sign_envelope` bindet einen `CipherEnvelope` an seinen Absender: die
//! Signatur laeuft ueber eine kanonische Kodierung aller fuenf Felder
//! (jeweils Laengenpraefix u32 BE + Bytes).

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::e2e::envelope::CipherEnvelope;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::{PrivateKeyHandle, PublicKeyHandle};

const UMSCHLAG_DOMAENE: &[u8] = b"geheimpost-envelope-v1";

/// Umschlag mit Absendersignatur
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    pub envelope: CipherEnvelope,
    /// DER-Signatur, Hex
    pub signature: String,
}

/// Signiert einen Text, gibt die DER-Signatur als Hex zurueck
///
/// Deterministisch (RFC 6979): gleicher Schluessel und Text ergeben
/// dieselbe Signatur.
pub fn sign_message(private_key: &PrivateKeyHandle, message: &str) -> String {
    signieren(private_key, message.as_bytes())
}

/// Prueft eine Hex/DER-Signatur. Defektes Hex oder DER ergibt `false`.
pub fn verify_signature(public_key: &PublicKeyHandle, message: &str, signature_hex: &str) -> bool {
    pruefen(public_key, message.as_bytes(), signature_hex)
}

pub fn sign_envelope(
    envelope: &CipherEnvelope,
    sender: &PrivateKeyHandle,
) -> SignedEnvelope {
    let signature = signieren(sender, &kanonisch(envelope));
    SignedEnvelope {
        envelope: envelope.clone(),
        signature,
    }
}

/// Prueft die Absendersignatur und gibt den Umschlag frei
pub fn verify_envelope<'a>(
    signed: &'a SignedEnvelope,
    sender: &PublicKeyHandle,
) -> CryptoResult<&'a CipherEnvelope> {
    if pruefen(sender, &kanonisch(&signed.envelope), &signed.signature) {
        Ok(&signed.envelope)
    } else {
        tracing::debug!("Umschlag-Signatur ungueltig");
        Err(CryptoError::Signatur("Absendersignatur ungueltig".into()))
    }
}

fn signieren(private_key: &PrivateKeyHandle, data: &[u8]) -> String {
    let signing_key = SigningKey::from(private_key.secret());
    let signature: Signature = signing_key.sign(data);
    hex::encode(signature.to_der().as_bytes())
}

fn pruefen(public_key: &PublicKeyHandle, data: &[u8], signature_hex: &str) -> bool {
    let Ok(der) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(signature) = Signature::from_der(&der) else {
        return false;
    };
    VerifyingKey::from(public_key.inner())
        .verify(data, &signature)
        .is_ok()
}

fn kanonisch(envelope: &CipherEnvelope) -> Vec<u8> {
    let felder = [
        &envelope.ephemeral_public_key,
        &envelope.encrypted_key,
        &envelope.nonce,
        &envelope.ciphertext,
        &envelope.ciphertext_nonce,
    ];

    let mut bytes = Vec::with_capacity(
        UMSCHLAG_DOMAENE.len() + felder.iter().map(|f| 4 + f.len()).sum::<usize>(),
    );
    bytes.extend_from_slice(UMSCHLAG_DOMAENE);
    for feld in felder {
        bytes.extend_from_slice(&(feld.len() as u32).to_be_bytes());
        bytes.extend_from_slice(feld.as_bytes());
    }
    bytes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
