//! Lebenszyklus einer einzelnen Nachricht
//!
//! ```text
//! Composed -> Sealed -> Transmitted -> Received -> Opened
//!                                          |
//!                                          +-----> Rejected
//! ```
//!
//! Jeder Uebergang konsumiert den alten Zustand. Ein Umschlag ist entweder
//! vollstaendig versiegelt oder gar nicht; beim Oeffnen gibt es nur
//! `Opened` mit dem ganzen Klartext oder `Rejected` ohne jeden Klartext.
//!
//! Scheitert ein Uebergang, steckt der unveraenderte Ausgangszustand im
//! [`Uebergangsfehler`]; ein `Composed`-Klartext geht so nicht verloren.

use crate::e2e::envelope::{open_bytes, seal_bytes, CipherEnvelope};
use crate::error::{CryptoError, FehlerKategorie};
use crate::keys::{PrivateKeyHandle, PublicKeyHandle};
use crate::types::SecretBytes;

/// Gescheiterter Uebergang samt dem Zustand, von dem er ausging
#[derive(Debug, thiserror::Error)]
#[error("Uebergang aus {zustand} fehlgeschlagen: {fehler}")]
pub struct Uebergangsfehler {
    pub zustand: MessageState,
    #[source]
    pub fehler: CryptoError,
}

impl Uebergangsfehler {
    /// Gibt den Ausgangszustand zurueck, z.B. fuer einen zweiten Versuch
    pub fn into_zustand(self) -> MessageState {
        self.zustand
    }
}

/// Ergebnis eines Zustandsuebergangs
pub type Uebergang = Result<MessageState, Uebergangsfehler>;

/// Zustand einer Nachricht
pub enum MessageState {
    /// Klartext liegt beim Absender vor
    Composed(SecretBytes),
    /// Fertig versiegelt, noch nicht abgegeben
    Sealed(CipherEnvelope),
    /// An den Transport uebergeben
    Transmitted(CipherEnvelope),
    /// Beim Empfaenger angekommen
    Received(CipherEnvelope),
    /// Erfolgreich geoeffnet
    Opened(SecretBytes),
    /// Oeffnen fehlgeschlagen, kein Klartext
    Rejected(FehlerKategorie),
}

impl MessageState {
    pub fn verfassen(plaintext: &[u8]) -> Self {
        Self::Composed(SecretBytes::new(plaintext.to_vec()))
    }

    /// Einstieg auf Empfaengerseite: ein vom Transport gelieferter Umschlag
    pub fn eingegangen(envelope: CipherEnvelope) -> Self {
        Self::Received(envelope)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Composed(_) => "Composed",
            Self::Sealed(_) => "Sealed",
            Self::Transmitted(_) => "Transmitted",
            Self::Received(_) => "Received",
            Self::Opened(_) => "Opened",
            Self::Rejected(_) => "Rejected",
        }
    }

    /// `Composed -> Sealed`
    pub fn versiegeln(self, recipient: &PublicKeyHandle) -> Uebergang {
        match self {
            Self::Composed(klartext) => match seal_bytes(klartext.as_bytes(), recipient) {
                Ok(envelope) => Ok(Self::Sealed(envelope)),
                Err(fehler) => Err(Uebergangsfehler {
                    zustand: Self::Composed(klartext),
                    fehler,
                }),
            },
            andere => Err(andere.ungueltig("versiegeln")),
        }
    }

    /// `Sealed -> Transmitted`
    pub fn uebertragen(self) -> Uebergang {
        match self {
            Self::Sealed(envelope) => Ok(Self::Transmitted(envelope)),
            andere => Err(andere.ungueltig("uebertragen")),
        }
    }

    /// `Transmitted -> Received`
    pub fn empfangen(self) -> Uebergang {
        match self {
            Self::Transmitted(envelope) => Ok(Self::Received(envelope)),
            andere => Err(andere.ungueltig("empfangen")),
        }
    }

    /// `Received -> Opened | Rejected`
    ///
    /// Ein fehlgeschlagenes Oeffnen ist kein Fehler des Uebergangs, sondern
    /// endet im Zustand `Rejected` mit der Fehlerklasse.
    pub fn oeffnen(self, recipient: &PrivateKeyHandle) -> Uebergang {
        match self {
            Self::Received(envelope) => match open_bytes(&envelope, recipient) {
                Ok(klartext) => Ok(Self::Opened(SecretBytes::new(klartext))),
                Err(e) => {
                    tracing::debug!(kategorie = ?e.kategorie(), "Nachricht abgewiesen");
                    Ok(Self::Rejected(e.kategorie()))
                }
            },
            andere => Err(andere.ungueltig("oeffnen")),
        }
    }

    /// Umschlag, falls der Zustand einen traegt
    pub fn umschlag(&self) -> Option<&CipherEnvelope> {
        match self {
            Self::Sealed(e) | Self::Transmitted(e) | Self::Received(e) => Some(e),
            _ => None,
        }
    }

    /// Klartext, nur im Zustand `Opened`
    pub fn klartext(&self) -> Option<&[u8]> {
        match self {
            Self::Opened(k) => Some(k.as_bytes()),
            _ => None,
        }
    }

    pub fn ist_abgeschlossen(&self) -> bool {
        matches!(self, Self::Opened(_) | Self::Rejected(_))
    }

    fn ungueltig(self, aktion: &'static str) -> Uebergangsfehler {
        let fehler = CryptoError::UngueltigerZustand {
            zustand: self.name(),
            aktion,
        };
        tracing::debug!(zustand = self.name(), aktion, "Uebergang abgelehnt");
        Uebergangsfehler {
            zustand: self,
            fehler,
        }
    }
}

impl std::fmt::Debug for MessageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(k) => write!(f, "Rejected({k:?})"),
            andere => write!(f, "{}", andere.name()),
        }
    }
}

impl std::fmt::Display for MessageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
