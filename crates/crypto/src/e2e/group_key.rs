//! Gruppen-Schluessel und ihre Verteilung an Mitglieder
//!
//! Jede Gruppe hat einen symmetrischen 256-Bit-Schluessel `G`. Fuer jedes
//! Mitglied wird `G` separat mit dessen oeffentlichem P-256-Schluessel
//! eingewickelt (gleiches ECIES-Schema wie bei Direktnachrichten), das
//! ergibt einen `GroupKeyRecord` pro `(Gruppe, Mitglied)`.
//!
//! Entfernen eines Mitglieds loescht nur dessen Record. `G` wird dabei
//! nicht rotiert: der Aufrufer muss explizit [`rotate_group_key`] aufrufen
//! und den neuen Schluessel an die verbleibenden Mitglieder verteilen.
//!
//! Gruppe, Mitglied und Epoch eines Records gehen als AAD
//! (`group_id || member_id || epoch` big-endian) in den Auth-Tag ein.
//! Ein umetikettierter Record scheitert mit `Authentifizierung`.

use std::collections::HashMap;

use geheimpost_core::{GroupId, MemberId};
use serde::{Deserialize, Serialize};

use crate::e2e::envelope::{unwrap_key_with_aad, wrap_key_with_aad, WrappedKey};
use crate::error::{CryptoError, CryptoResult};
use crate::keys::{PrivateKeyHandle, PublicKeyHandle};
use crate::types::SymmetricKey;

/// Symmetrischer Schluessel einer Gruppe in einer bestimmten Epoch
#[derive(Debug, Clone)]
pub struct GroupSymmetricKey {
    pub group_id: GroupId,
    /// Startet bei 0, erhoeht sich bei jeder Rotation
    pub epoch: u32,
    key: SymmetricKey,
}

impl GroupSymmetricKey {
    pub fn key(&self) -> &SymmetricKey {
        &self.key
    }
}

/// Eingewickelter Gruppenschluessel fuer genau ein Mitglied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupKeyRecord {
    pub group_id: GroupId,
    pub member_id: MemberId,
    pub epoch: u32,
    #[serde(flatten)]
    pub wrapped: WrappedKey,
}

/// Erstellt einen neuen Gruppen-Schluessel (Epoch 0)
pub fn create_group_key(group_id: GroupId) -> GroupSymmetricKey {
    GroupSymmetricKey {
        group_id,
        epoch: 0,
        key: SymmetricKey::generate(),
    }
}

/// Rotiert einen Gruppen-Schluessel (frische Bytes, Epoch + 1)
///
/// Bei `u32::MAX` gibt es keine naechste Epoch: `EpochUeberlauf`.
pub fn rotate_group_key(current: &GroupSymmetricKey) -> CryptoResult<GroupSymmetricKey> {
    let epoch = current
        .epoch
        .checked_add(1)
        .ok_or_else(|| CryptoError::EpochUeberlauf {
            group_id: current.group_id.to_string(),
        })?;
    Ok(GroupSymmetricKey {
        group_id: current.group_id,
        epoch,
        key: SymmetricKey::generate(),
    })
}

/// AAD eines Records: group_id (16) || member_id (16) || epoch (u32 BE)
fn record_aad(group_id: &GroupId, member_id: &MemberId, epoch: u32) -> [u8; 36] {
    let mut aad = [0u8; 36];
    aad[..16].copy_from_slice(group_id.as_bytes());
    aad[16..32].copy_from_slice(member_id.as_bytes());
    aad[32..].copy_from_slice(&epoch.to_be_bytes());
    aad
}

/// Wickelt den Gruppenschluessel fuer ein einzelnes Mitglied ein
/// (z.B. beim Hinzufuegen eines Mitglieds)
pub fn wrap_group_key_for_member(
    group_key: &GroupSymmetricKey,
    member_id: MemberId,
    member_public_key: &PublicKeyHandle,
) -> CryptoResult<GroupKeyRecord> {
    let aad = record_aad(&group_key.group_id, &member_id, group_key.epoch);
    let wrapped = wrap_key_with_aad(&group_key.key, member_public_key, &aad)?;
    Ok(GroupKeyRecord {
        group_id: group_key.group_id,
        member_id,
        epoch: group_key.epoch,
        wrapped,
    })
}

/// Verteilt den Gruppenschluessel an alle aktuellen Mitglieder
///
/// Gibt eine Map member_id -> GroupKeyRecord zurueck. Jeder Record nutzt
/// ein eigenes ephemeres Schluesselpaar.
pub fn distribute_group_key(
    group_key: &GroupSymmetricKey,
    members: &HashMap<MemberId, PublicKeyHandle>,
) -> CryptoResult<HashMap<MemberId, GroupKeyRecord>> {
    let mut records = HashMap::with_capacity(members.len());

    for (member_id, public_key) in members {
        let record = wrap_group_key_for_member(group_key, *member_id, public_key)?;
        records.insert(*member_id, record);
    }

    tracing::debug!(
        group = %group_key.group_id,
        epoch = group_key.epoch,
        mitglieder = records.len(),
        "Gruppenschluessel verteilt"
    );
    Ok(records)
}

/// Stellt den Gruppenschluessel aus dem eigenen Record wieder her
///
/// Laeuft ausschliesslich lokal beim Schluesselinhaber; der private
/// Schluessel verlaesst den Prozess nie.
pub fn unwrap_group_key(
    record: &GroupKeyRecord,
    private_key: &PrivateKeyHandle,
) -> CryptoResult<GroupSymmetricKey> {
    let aad = record_aad(&record.group_id, &record.member_id, record.epoch);
    let key = unwrap_key_with_aad(&record.wrapped, private_key, &aad)?;
    Ok(GroupSymmetricKey {
        group_id: record.group_id,
        epoch: record.epoch,
        key,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
