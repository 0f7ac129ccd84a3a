//! ECDH Key Agreement (P-256)
//!
//! Liefert die x-Koordinate des gemeinsamen Punktes als 32 rohe Bytes.
//! Die Skalarmultiplikation von `p256` ist konstant-zeitig bezueglich des
//! privaten Skalars.
//!
//! Ein `EphemeralKeyPair` wird beim Agreement konsumiert und kann deshalb
//! nicht fuer einen zweiten Ciphertext wiederverwendet werden.

use p256::ecdh::{diffie_hellman, EphemeralSecret};
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::keys::{PrivateKeyHandle, PublicKeyHandle};

/// Laenge des rohen ECDH-Geheimnisses fuer P-256
pub const SHARED_SECRET_LEN: usize = 32;

/// Rohes ECDH-Ergebnis, wird sofort von der Key Derivation verbraucht
pub struct SharedSecret([u8; SHARED_SECRET_LEN]);

impl SharedSecret {
    fn aus_rohbytes(raw: &[u8]) -> CryptoResult<Self> {
        let mut bytes = [0u8; SHARED_SECRET_LEN];
        bytes.copy_from_slice(raw);

        // Ohne fruehen Abbruch pruefen, ob alle Bytes null sind
        if bytes.iter().fold(0u8, |acc, b| acc | b) == 0 {
            return Err(CryptoError::KeyAgreement(
                "degeneriertes gemeinsames Geheimnis".into(),
            ));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_LEN] {
        &self.0
    }
}

impl From<[u8; SHARED_SECRET_LEN]> for SharedSecret {
    fn from(bytes: [u8; SHARED_SECRET_LEN]) -> Self {
        Self(bytes)
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SharedSecret([REDACTED])")
    }
}

/// ECDH zwischen einem statischen privaten und einem fremden oeffentlichen Schluessel
///
/// Ungueltige Punkte (nicht auf der Kurve, Identitaet) koennen als
/// `PublicKeyHandle` gar nicht existieren; sie scheitern bereits beim Laden.
pub fn agree(private: &PrivateKeyHandle, public: &PublicKeyHandle) -> CryptoResult<SharedSecret> {
    let shared = diffie_hellman(
        private.secret().to_nonzero_scalar(),
        public.inner().as_affine(),
    );
    SharedSecret::aus_rohbytes(shared.raw_secret_bytes().as_slice())
}

/// Einmal-Schluesselpaar pro ausgehender Nachricht bzw. pro Key-Wrap
pub struct EphemeralKeyPair {
    secret: EphemeralSecret,
    public: PublicKeyHandle,
}

impl EphemeralKeyPair {
    /// Erzeugt ein frisches Paar aus dem OS-Zufallsgenerator
    pub fn generate() -> Self {
        let secret = EphemeralSecret::random(&mut OsRng);
        let public = PublicKeyHandle::from(secret.public_key());
        Self { secret, public }
    }

    pub fn public_key(&self) -> &PublicKeyHandle {
        &self.public
    }

    /// Fuehrt ECDH mit dem Empfaenger durch und verwirft den privaten Teil
    pub fn agree(self, peer: &PublicKeyHandle) -> CryptoResult<SharedSecret> {
        let shared = self.secret.diffie_hellman(peer.inner());
        SharedSecret::aus_rohbytes(shared.raw_secret_bytes().as_slice())
    }
}

impl std::fmt::Debug for EphemeralKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EphemeralKeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use p256::SecretKey;

    fn schluesselpaar() -> (PrivateKeyHandle, PublicKeyHandle) {
        let private = PrivateKeyHandle::from(SecretKey::random(&mut OsRng));
        let public = private.public_key();
        (private, public)
    }

    #[test]
    fn beide_seiten_erhalten_dasselbe_geheimnis() {
        let (alice_priv, alice_pub) = schluesselpaar();
        let (bob_priv, bob_pub) = schluesselpaar();

        let a = agree(&alice_priv, &bob_pub).unwrap();
        let b = agree(&bob_priv, &alice_pub).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn ephemeres_paar_passt_zum_statischen_empfaenger() {
        let (empf_priv, empf_pub) = schluesselpaar();
        let ephemeral = EphemeralKeyPair::generate();
        let eph_pub = ephemeral.public_key().clone();

        let sender_seite = ephemeral.agree(&empf_pub).unwrap();
        let empfaenger_seite = agree(&empf_priv, &eph_pub).unwrap();
        assert_eq!(sender_seite.as_bytes(), empfaenger_seite.as_bytes());
    }

    #[test]
    fn verschiedene_partner_verschiedene_geheimnisse() {
        let (alice_priv, _) = schluesselpaar();
        let (_, bob_pub) = schluesselpaar();
        let (_, carol_pub) = schluesselpaar();

        let mit_bob = agree(&alice_priv, &bob_pub).unwrap();
        let mit_carol = agree(&alice_priv, &carol_pub).unwrap();
        assert_ne!(mit_bob.as_bytes(), mit_carol.as_bytes());
    }

    #[test]
    fn ephemere_paare_sind_einmalig() {
        let a = EphemeralKeyPair::generate();
        let b = EphemeralKeyPair::generate();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn null_geheimnis_wird_abgelehnt() {
        let result = SharedSecret::aus_rohbytes(&[0u8; SHARED_SECRET_LEN]);
        assert!(matches!(result, Err(CryptoError::KeyAgreement(_))));
    }

    #[test]
    fn debug_verraet_kein_geheimnis() {
        let secret = SharedSecret::from([7u8; SHARED_SECRET_LEN]);
        assert_eq!(format!("{secret:?}"), "SharedSecret([REDACTED])");
    }
}
