//! geheimpost-core – Gemeinsame Identifikationstypen
//!
//! Gruppen und Mitglieder werden vom Mitgliedschaftsdienst verwaltet.
//! Der Krypto-Kern kennt nur ihre IDs, z.B. als Schluessel eines
//! `GroupKeyRecord` (`group_id`, `member_id`).

pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use types::{GroupId, MemberId};
