//! IDs fuer Gruppen und Mitglieder
//!
//! Beide sind UUID-Newtypes. Ihre 16 Rohbytes werden als AAD in den
//! Auth-Tag von Gruppenschluessel-Records und Gruppennachrichten
//! eingerechnet, deshalb ist die Byte-Darstellung Teil der Schnittstelle.
//! Im JSON erscheinen sie als schlichter UUID-String.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident, $praefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Neue zufaellige ID (UUID v4)
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn inner(&self) -> Uuid {
                self.0
            }

            /// Rohbytes in Netzwerk-Reihenfolge
            pub fn as_bytes(&self) -> &[u8; 16] {
                self.0.as_bytes()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($praefix, ":{}"), self.0)
            }
        }

        /// Akzeptiert die UUID mit oder ohne Praefix (`group:...`)
        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let roh = s.strip_prefix(concat!($praefix, ":")).unwrap_or(s);
                Uuid::parse_str(roh).map(Self)
            }
        }
    };
}

uuid_id!(
    /// ID einer Gruppe, vergeben vom Mitgliedschaftsdienst
    GroupId,
    "group"
);

uuid_id!(
    /// ID eines Mitglieds innerhalb der Gruppenverwaltung
    MemberId,
    "member"
);
