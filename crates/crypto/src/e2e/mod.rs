//! Ende-zu-Ende Verschluesselung
//!
//! Transport und Speicher sehen nur Umschlaege, nie Klartext.
//!
//! ## Direktnachricht
//! 1. Ephemeres P-256-Schluesselpaar `E` erzeugen
//! 2. ECDH(`E`, Empfaenger) -> HKDF ("ecies") -> Wrapping-Key
//! 3. Frischen Nachrichtenschluessel `K` unter dem Wrapping-Key versiegeln
//! 4. Klartext unter `K` versiegeln (AES-256-GCM)
//!
//! ## Gruppe
//! 1. Gruppenschluessel `G` pro Epoch, pro Mitglied wie `K` eingewickelt
//! 2. Nachrichtenschluessel direkt unter `G` versiegelt
//! 3. Rotation (neue Epoch) nur auf expliziten Aufruf

pub mod agreement;
pub mod cipher;
pub mod envelope;
pub mod group_key;
pub mod group_message;
pub mod kdf;
pub mod key_manager;
pub mod state;

pub use agreement::{agree, EphemeralKeyPair, SharedSecret};
pub use cipher::{open, open_with_aad, seal, seal_with_aad};
pub use envelope::{
    open_bytes, open_message, seal_bytes, seal_message, unwrap_key, unwrap_key_with_aad, wrap_key,
    wrap_key_with_aad, CipherEnvelope, EncryptedContent, WrappedKey,
};
pub use group_key::{
    create_group_key, distribute_group_key, rotate_group_key, unwrap_group_key,
    wrap_group_key_for_member, GroupKeyRecord, GroupSymmetricKey,
};
pub use group_message::{
    open_group_bytes, open_group_message, seal_group_bytes, seal_group_message, GroupEnvelope,
};
pub use kdf::{derive, WrappingKey, ECIES_LABEL};
pub use key_manager::GroupKeyring;
pub use state::{MessageState, Uebergangsfehler};
