//! Fehlertypen fuer das Kryptografie-Subsystem
//!
//! Keine Variante traegt Schluesselmaterial oder Klartext. Fehler beim
//! Oeffnen (`Authentifizierung`) tragen keine Details.

use thiserror::Error;

/// Fehler im Kryptografie-Subsystem
#[derive(Debug, Error)]
pub enum CryptoError {
    /// PEM/DER nicht lesbar, falsche Kurve oder falscher Schluesseltyp
    #[error("Ungueltiges Schluesselformat: {0}")]
    UngueltigesSchluesselformat(String),

    /// ECDH mit einem degenerierten oder fremden Schluessel
    #[error("Key-Agreement fehlgeschlagen: {0}")]
    KeyAgreement(String),

    /// Auth-Tag stimmt nicht (manipuliert, falscher Schluessel, gekuerzt)
    #[error("Authentifizierung fehlgeschlagen")]
    Authentifizierung,

    #[error("Kodierung fehlerhaft: {0}")]
    Kodierung(String),

    #[error("Base64-Dekodierung fehlgeschlagen: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("JSON-Umschlag fehlerhaft: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Ungueltige Nonce-Laenge: erwartet {erwartet}, erhalten {erhalten}")]
    UngueltigeNonce { erwartet: usize, erhalten: usize },

    #[error("Ungueltige Schluessel-Laenge: erwartet {erwartet}, erhalten {erhalten}")]
    UngueltigeSchluesselLaenge { erwartet: usize, erhalten: usize },

    #[error("Nachricht zu gross: maximal {maximal} Bytes, erhalten {erhalten}")]
    NachrichtZuGross { maximal: usize, erhalten: usize },

    #[error("Key Derivation fehlgeschlagen: {0}")]
    KeyDerivation(String),

    #[error("Signatur fehlerhaft: {0}")]
    Signatur(String),

    #[error("Epoch-Mismatch: erwartet {erwartet}, erhalten {erhalten}")]
    EpochMismatch { erwartet: u32, erhalten: u32 },

    #[error("Epoch von Gruppe {group_id} kann nicht weiter erhoeht werden")]
    EpochUeberlauf { group_id: String },

    #[error("Kein Schluessel fuer Gruppe {group_id} (Epoch {epoch})")]
    KeinSchluessel { group_id: String, epoch: u32 },

    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    #[error("Aktion '{aktion}' im Zustand {zustand} nicht erlaubt")]
    UngueltigerZustand {
        zustand: &'static str,
        aktion: &'static str,
    },
}

/// Grobe Fehlerklasse, wie sie Aufrufer unterscheiden muessen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FehlerKategorie {
    InvalidKeyFormat,
    AgreementFailed,
    AuthenticationFailed,
    EncodingError,
    Sonstige,
}

impl CryptoError {
    /// Ordnet den Fehler einer der Fehlerklassen zu
    pub fn kategorie(&self) -> FehlerKategorie {
        match self {
            Self::UngueltigesSchluesselformat(_) => FehlerKategorie::InvalidKeyFormat,
            Self::KeyAgreement(_) => FehlerKategorie::AgreementFailed,
            Self::Authentifizierung => FehlerKategorie::AuthenticationFailed,
            Self::Kodierung(_)
            | Self::Base64(_)
            | Self::Json(_)
            | Self::UngueltigeNonce { .. }
            | Self::UngueltigeSchluesselLaenge { .. } => FehlerKategorie::EncodingError,
            _ => FehlerKategorie::Sonstige,
        }
    }

    /// Gibt true zurueck wenn ein erneutes Laden des Umschlags vom
    /// Transport helfen koennte (moeglicherweise beschaedigte Daten).
    ///
    /// Intern wird nie wiederholt: dieselben Eingaben schlagen
    /// deterministisch erneut fehl.
    pub fn neu_laden_sinnvoll(&self) -> bool {
        matches!(
            self.kategorie(),
            FehlerKategorie::AuthenticationFailed | FehlerKategorie::EncodingError
        )
    }
}

pub type CryptoResult<T> = Result<T, CryptoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentifizierung_ohne_details() {
        let e = CryptoError::Authentifizierung;
        assert_eq!(e.to_string(), "Authentifizierung fehlgeschlagen");
        assert_eq!(e.kategorie(), FehlerKategorie::AuthenticationFailed);
    }

    #[test]
    fn kodierungsfehler_kategorie() {
        let e = CryptoError::UngueltigeNonce {
            erwartet: 12,
            erhalten: 8,
        };
        assert_eq!(e.kategorie(), FehlerKategorie::EncodingError);
        assert!(e.to_string().contains("erwartet 12"));
    }

    #[test]
    fn neu_laden_nur_bei_transportfehlern() {
        assert!(CryptoError::Authentifizierung.neu_laden_sinnvoll());
        assert!(CryptoError::Kodierung("x".into()).neu_laden_sinnvoll());
        assert!(!CryptoError::UngueltigesSchluesselformat("x".into()).neu_laden_sinnvoll());
        assert!(!CryptoError::KeyAgreement("x".into()).neu_laden_sinnvoll());
    }
}
