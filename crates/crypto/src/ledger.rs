//! Hash-verkettetes Nachrichtenbuch
//!
//! Jede gespeicherte Nachricht bekommt einen Block. Der Block haelt den
//! SHA-256 des Klartexts (`data`) und ist ueber seinen Vorgaenger-Hash an
//! die Kette gebunden:
//!
//! ```text
//! hash = sha256_hex(previous_hash || data || nonce || timestamp)
//! ```
//!
//! Alle Teile gehen als Text ein: `nonce` sind 8 Zufallsbytes als Hex,
//! `timestamp` ist UTC im ISO-Format ohne Zone, Mikrosekunden nur wenn
//! ungleich 0 (`2024-05-01T12:30:45.123456` bzw. `2024-05-01T12:31:00`).
//! Der erste Block verweist auf [`GENESIS_HASH`].
//!
//! [`MessageLedger::verify_chain`] rechnet Nachrichten-Hashes und
//! Block-Hashes nach und prueft jede Verkettung. Fehler werden pro Eintrag
//! gesammelt, die Pruefung bricht nicht beim ersten ab.

use chrono::{NaiveDateTime, SubsecRound, Timelike, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::digest::{message_digest, DigestAlgorithm};

/// Vorgaenger-Hash des ersten Blocks
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

const NONCE_BYTES: usize = 8;

/// Ein Eintrag der Kette
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerBlock {
    pub index: usize,
    pub previous_hash: String,
    /// Nachrichten-Hash (oder freier Inhalt bei `append_block`)
    pub data: String,
    pub nonce: String,
    pub timestamp: NaiveDateTime,
    pub hash: String,
}

impl LedgerBlock {
    /// Rechnet den Hash aus den gespeicherten Feldern neu
    pub fn berechne_hash(&self) -> String {
        block_hash(&self.previous_hash, &self.data, &self.nonce, &self.timestamp)
    }
}

/// Block-Hash ueber die verketteten Textfelder
pub fn block_hash(previous_hash: &str, data: &str, nonce: &str, timestamp: &NaiveDateTime) -> String {
    let mut hasher = Sha256::new();
    hasher.update(previous_hash.as_bytes());
    hasher.update(data.as_bytes());
    hasher.update(nonce.as_bytes());
    hasher.update(iso_zeitstempel(timestamp).as_bytes());
    hex::encode(hasher.finalize())
}

fn iso_zeitstempel(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() / 1_000 == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// Art einer Abweichung in der Kette
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KettenFehlerArt {
    #[error("kein Block zur Nachricht")]
    BlockFehlt,

    #[error("keine Nachricht zum Block")]
    NachrichtFehlt,

    #[error("Index {gespeichert} an Position erwartet")]
    FalscherIndex { gespeichert: usize },

    #[error("Nachrichten-Hash stimmt nicht (erwartet {erwartet}, gespeichert {gespeichert})")]
    NachrichtenHash {
        erwartet: String,
        gespeichert: String,
    },

    #[error("Block-Hash stimmt nicht mit dem Inhalt ueberein")]
    BlockHash,

    #[error("Vorgaenger-Hash stimmt nicht mit dem vorherigen Block ueberein")]
    Vorgaenger,
}

/// Abweichung an einer Position der Kette
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Eintrag {index}: {art}")]
pub struct KettenFehler {
    pub index: usize,
    pub art: KettenFehlerArt,
}

/// Nachrichtenbuch, nur Anhaengen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLedger {
    blocks: Vec<LedgerBlock>,
}

impl MessageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[LedgerBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Hash des letzten Blocks, bzw. [`GENESIS_HASH`] bei leerer Kette
    pub fn letzter_hash(&self) -> &str {
        self.blocks.last().map_or(GENESIS_HASH, |b| b.hash.as_str())
    }

    /// Haengt einen Block fuer eine Nachricht an (`data` = SHA-256 des Klartexts)
    pub fn append_message(&mut self, plaintext: &str) -> &LedgerBlock {
        let data = message_digest(plaintext, DigestAlgorithm::Sha256);
        self.append_block(&data)
    }

    /// Haengt einen Block mit frischer Nonce und aktueller UTC-Zeit an
    pub fn append_block(&mut self, data: &str) -> &LedgerBlock {
        let mut nonce = [0u8; NONCE_BYTES];
        OsRng.fill_bytes(&mut nonce);
        let timestamp = Utc::now().naive_utc().trunc_subsecs(6);
        self.append_block_mit(data, &hex::encode(nonce), timestamp)
    }

    /// Wie [`append_block`](Self::append_block), mit vorgegebener Nonce und Zeit
    pub fn append_block_mit(
        &mut self,
        data: &str,
        nonce: &str,
        timestamp: NaiveDateTime,
    ) -> &LedgerBlock {
        let previous_hash = self.letzter_hash().to_string();
        let hash = block_hash(&previous_hash, data, nonce, &timestamp);
        let index = self.blocks.len();

        tracing::debug!(index, hash = %hash, "Block angehaengt");

        self.blocks.push(LedgerBlock {
            index,
            previous_hash,
            data: data.to_string(),
            nonce: nonce.to_string(),
            timestamp,
            hash,
        });
        &self.blocks[index]
    }

    /// Prueft die Kette gegen die Klartexte, in Reihenfolge der Bloecke
    ///
    /// Leere Rueckgabe heisst: Kette intakt.
    pub fn verify_chain<S: AsRef<str>>(&self, messages: &[S]) -> Vec<KettenFehler> {
        let mut fehler = Vec::new();
        let mut melden = |index, art| fehler.push(KettenFehler { index, art });

        for index in 0..self.blocks.len().max(messages.len()) {
            let Some(block) = self.blocks.get(index) else {
                melden(index, KettenFehlerArt::BlockFehlt);
                continue;
            };

            match messages.get(index) {
                Some(nachricht) => {
                    let erwartet = message_digest(nachricht.as_ref(), DigestAlgorithm::Sha256);
                    if erwartet != block.data {
                        melden(
                            index,
                            KettenFehlerArt::NachrichtenHash {
                                erwartet,
                                gespeichert: block.data.clone(),
                            },
                        );
                    }
                }
                None => melden(index, KettenFehlerArt::NachrichtFehlt),
            }

            if block.index != index {
                melden(
                    index,
                    KettenFehlerArt::FalscherIndex {
                        gespeichert: block.index,
                    },
                );
            }

            if block.berechne_hash() != block.hash {
                melden(index, KettenFehlerArt::BlockHash);
            }

            let vorgaenger = match index {
                0 => GENESIS_HASH,
                _ => self.blocks[index - 1].hash.as_str(),
            };
            if block.previous_hash != vorgaenger {
                melden(index, KettenFehlerArt::Vorgaenger);
            }
        }

        if !fehler.is_empty() {
            tracing::warn!(anzahl = fehler.len(), "Nachrichtenbuch nicht intakt");
        }
        fehler
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
