//! Protokoll-Konfiguration (TOML)
//!
//! Alle Felder haben Standardwerte; eine fehlende Datei ergibt die
//! Standardkonfiguration.
//!
//! ```toml
//! [e2e]
//! kontext_label = "ecies"
//! max_klartext_bytes = 1048576
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use std::path::Path;

use geheimpost_observability::{log_format_gueltig, log_level_gueltig};
use serde::{Deserialize, Serialize};

use crate::e2e::envelope::{open_bytes_with_label, seal_bytes_with_label, CipherEnvelope};
use crate::e2e::kdf::ECIES_LABEL;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::{PrivateKeyHandle, PublicKeyHandle};
use crate::types::TAG_LEN;

/// Standard-Obergrenze fuer Klartexte (1 MiB)
pub const STANDARD_MAX_KLARTEXT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    pub e2e: E2eEinstellungen,
    pub logging: LoggingEinstellungen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct E2eEinstellungen {
    /// Kontext-Label der Schluesselableitung; beide Seiten muessen es teilen
    pub kontext_label: String,
    pub max_klartext_bytes: usize,
}

impl Default for E2eEinstellungen {
    fn default() -> Self {
        Self {
            kontext_label: ECIES_LABEL.to_string(),
            max_klartext_bytes: STANDARD_MAX_KLARTEXT_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    pub level: String,
    /// "text" oder "json"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl CryptoConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: impl AsRef<Path>) -> anyhow::Result<Self> {
        let pfad = pfad.as_ref();
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt).map_err(|e| {
                    anyhow::anyhow!("Konfigurationsfehler in '{}': {e}", pfad.display())
                })?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = %pfad.display(),
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{}' nicht lesbar: {e}",
                pfad.display()
            )),
        }
    }

    pub fn validieren(&self) -> CryptoResult<()> {
        if self.e2e.kontext_label.is_empty() {
            return Err(CryptoError::Konfiguration(
                "e2e.kontext_label darf nicht leer sein".into(),
            ));
        }
        if self.e2e.max_klartext_bytes == 0 {
            return Err(CryptoError::Konfiguration(
                "e2e.max_klartext_bytes muss groesser als 0 sein".into(),
            ));
        }
        if !log_level_gueltig(&self.logging.level) {
            return Err(CryptoError::Konfiguration(format!(
                "unbekanntes Log-Level '{}'",
                self.logging.level
            )));
        }
        if !log_format_gueltig(&self.logging.format) {
            return Err(CryptoError::Konfiguration(format!(
                "unbekanntes Log-Format '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }
}

/// Direktnachrichten mit fester Konfiguration
///
/// Die freien Funktionen in [`crate::e2e::envelope`] verwenden die
/// Standardwerte; `MessageProtocol` bindet Label und Groessenlimit.
#[derive(Debug, Clone, Default)]
pub struct MessageProtocol {
    einstellungen: E2eEinstellungen,
}

impl MessageProtocol {
    pub fn neu(config: &CryptoConfig) -> CryptoResult<Self> {
        config.validieren()?;
        Ok(Self {
            einstellungen: config.e2e.clone(),
        })
    }

    pub fn kontext_label(&self) -> &str {
        &self.einstellungen.kontext_label
    }

    pub fn versiegeln(
        &self,
        plaintext: &str,
        recipient: &PublicKeyHandle,
    ) -> CryptoResult<CipherEnvelope> {
        self.versiegeln_bytes(plaintext.as_bytes(), recipient)
    }

    pub fn versiegeln_bytes(
        &self,
        plaintext: &[u8],
        recipient: &PublicKeyHandle,
    ) -> CryptoResult<CipherEnvelope> {
        let maximal = self.einstellungen.max_klartext_bytes;
        if plaintext.len() > maximal {
            return Err(CryptoError::NachrichtZuGross {
                maximal,
                erhalten: plaintext.len(),
            });
        }
        seal_bytes_with_label(plaintext, recipient, &self.einstellungen.kontext_label)
    }

    pub fn oeffnen(
        &self,
        envelope: &CipherEnvelope,
        recipient: &PrivateKeyHandle,
    ) -> CryptoResult<String> {
        let bytes = self.oeffnen_bytes(envelope, recipient)?;
        String::from_utf8(bytes)
            .map_err(|_| CryptoError::Kodierung("Klartext ist kein UTF-8".into()))
    }

    /// Ueberlange Ciphertexte werden anhand der Base64-Laenge abgewiesen,
    /// bevor dekodiert wird
    pub fn oeffnen_bytes(
        &self,
        envelope: &CipherEnvelope,
        recipient: &PrivateKeyHandle,
    ) -> CryptoResult<Vec<u8>> {
        let maximal = self.einstellungen.max_klartext_bytes;
        let geschaetzt = envelope.ciphertext.len() / 4 * 3;
        if geschaetzt > maximal + TAG_LEN + 2 {
            return Err(CryptoError::NachrichtZuGross {
                maximal,
                erhalten: geschaetzt.saturating_sub(TAG_LEN),
            });
        }
        open_bytes_with_label(envelope, recipient, &self.einstellungen.kontext_label)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
