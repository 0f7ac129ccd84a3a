//! # geheimpost-crypto
//!
//! Ende-zu-Ende Protokollkern fuer Geheimpost: Direktnachrichten nach dem
//! ECIES-Muster (P-256, HKDF-SHA256, AES-256-GCM) und Verteilung von
//! Gruppenschluesseln an beliebig viele Mitglieder.
//!
//! ## Module
//! - `keys` - PEM-Schluessel laden (PKCS8, SEC1, SPKI)
//! - `e2e` - Key Agreement, Ableitung, Umschlaege, Gruppen
//! - `signing` - ECDSA-Signaturen fuer Texte und Umschlaege
//! - `digest` - SHA-256 / SHA3-256 Nachrichten-Hashes
//! - `ledger` - Hash-verkettetes Nachrichtenbuch
//! - `config` - TOML-Konfiguration und `MessageProtocol`
//! - `types` - Gemeinsame Typen (Nonce, SymmetricKey, SecretBytes)
//! - `error` - Fehlertypen
//!
//! Alle Operationen sind synchron und ohne geteilten Zustand; sie koennen
//! beliebig parallel aus mehreren Threads aufgerufen werden.

pub mod config;
pub mod digest;
pub mod e2e;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod signing;
pub mod types;

// Bequeme Re-Exports
pub use config::{CryptoConfig, MessageProtocol};
pub use digest::{message_digest, DigestAlgorithm};
pub use error::{CryptoError, CryptoResult, FehlerKategorie};
pub use keys::{load_private_key, load_public_key, PrivateKeyHandle, PublicKeyHandle};
pub use ledger::{KettenFehler, KettenFehlerArt, LedgerBlock, MessageLedger, GENESIS_HASH};
pub use signing::{sign_envelope, sign_message, verify_envelope, verify_signature, SignedEnvelope};
pub use types::{MessageKey, Nonce, SecretBytes, SymmetricKey};

pub use e2e::{
    agree, create_group_key, derive, distribute_group_key, open_group_message, open_message,
    rotate_group_key, seal_group_message, seal_message, unwrap_group_key, CipherEnvelope,
    EphemeralKeyPair, GroupEnvelope, GroupKeyRecord, GroupKeyring, GroupSymmetricKey,
    MessageState, SharedSecret, Uebergangsfehler, WrappingKey, ECIES_LABEL,
};
