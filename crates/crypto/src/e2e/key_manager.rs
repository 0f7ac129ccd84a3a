//! Lokaler Schluesselbund fuer Gruppenschluessel
//!
//! Haelt die bereits ausgepackten Gruppenschluessel eines Mitglieds pro
//! `(Gruppe, Epoch)`. Nach einer Rotation bleiben aeltere Epochs erhalten,
//! damit der Nachrichtenverlauf lesbar bleibt.

use dashmap::DashMap;
use std::sync::Arc;

use geheimpost_core::GroupId;

use crate::e2e::group_key::{unwrap_group_key, GroupKeyRecord, GroupSymmetricKey};
use crate::e2e::group_message::{open_group_bytes, seal_group_bytes, GroupEnvelope};
use crate::error::{CryptoError, CryptoResult};
use crate::keys::PrivateKeyHandle;

/// Ausgepackte Gruppenschluessel eines Mitglieds
#[derive(Debug, Default)]
pub struct GroupKeyring {
    /// (group_id, epoch) -> Schluessel
    keys: DashMap<(GroupId, u32), Arc<GroupSymmetricKey>>,
    /// Hoechste bekannte Epoch pro Gruppe
    aktuell: DashMap<GroupId, u32>,
}

impl GroupKeyring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nimmt einen Schluessel auf (z.B. den selbst erzeugten des Gruenders)
    pub fn insert(&self, key: GroupSymmetricKey) -> Arc<GroupSymmetricKey> {
        let group_id = key.group_id;
        let epoch = key.epoch;
        let key = Arc::new(key);

        self.keys.insert((group_id, epoch), Arc::clone(&key));
        self.aktuell
            .entry(group_id)
            .and_modify(|e| *e = (*e).max(epoch))
            .or_insert(epoch);

        tracing::debug!(group = %group_id, epoch, "Gruppenschluessel im Schluesselbund");
        key
    }

    /// Packt den eigenen Record aus und legt den Schluessel ab
    pub fn unwrap_and_store(
        &self,
        record: &GroupKeyRecord,
        private_key: &PrivateKeyHandle,
    ) -> CryptoResult<Arc<GroupSymmetricKey>> {
        let key = unwrap_group_key(record, private_key)?;
        Ok(self.insert(key))
    }

    pub fn get(&self, group_id: &GroupId, epoch: u32) -> CryptoResult<Arc<GroupSymmetricKey>> {
        self.keys
            .get(&(*group_id, epoch))
            .map(|entry| Arc::clone(&*entry))
            .ok_or_else(|| CryptoError::KeinSchluessel {
                group_id: group_id.to_string(),
                epoch,
            })
    }

    /// Schluessel der hoechsten bekannten Epoch
    pub fn current(&self, group_id: &GroupId) -> CryptoResult<Arc<GroupSymmetricKey>> {
        let epoch = self.current_epoch(group_id).ok_or_else(|| CryptoError::KeinSchluessel {
            group_id: group_id.to_string(),
            epoch: 0,
        })?;
        self.get(group_id, epoch)
    }

    pub fn current_epoch(&self, group_id: &GroupId) -> Option<u32> {
        self.aktuell.get(group_id).map(|e| *e)
    }

    /// Alle bekannten Epochs einer Gruppe, aufsteigend
    pub fn epochs(&self, group_id: &GroupId) -> Vec<u32> {
        let mut epochs: Vec<u32> = self
            .keys
            .iter()
            .filter(|entry| entry.key().0 == *group_id)
            .map(|entry| entry.key().1)
            .collect();
        epochs.sort_unstable();
        epochs
    }

    /// Versiegelt eine Nachricht mit dem aktuellen Gruppenschluessel
    pub fn seal(&self, group_id: &GroupId, plaintext: &[u8]) -> CryptoResult<GroupEnvelope> {
        let key = self.current(group_id)?;
        seal_group_bytes(plaintext, &key)
    }

    /// Oeffnet eine Gruppennachricht mit dem Schluessel ihrer Epoch
    pub fn open(&self, envelope: &GroupEnvelope) -> CryptoResult<Vec<u8>> {
        let key = self.get(&envelope.group_id, envelope.epoch)?;
        open_group_bytes(envelope, &key)
    }

    /// Vergisst alle Schluessel einer Gruppe, gibt die Anzahl zurueck
    pub fn forget_group(&self, group_id: &GroupId) -> usize {
        let vorher = self.keys.len();
        self.keys.retain(|(g, _), _| g != group_id);
        self.aktuell.remove(group_id);
        vorher - self.keys.len()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
