//! Per-direction key schedule for Initial packets

use hkdf::Hkdf;
use quell_proto::Version;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::initial::secrets::{DirectionalSecret, hkdf_expand_label};

/// AEAD key length in bytes (AES-128)
pub const KEY_LEN: usize = 16;

/// AEAD base IV length in bytes
pub const IV_LEN: usize = 12;

/// Header protection key length in bytes (AES-128)
pub const HP_KEY_LEN: usize = 16;

/// Packet protection keys for one direction.
///
/// Three independent expansions of the directional secret: the AEAD key
/// and base IV protect the payload, the header protection key masks the
/// packet number field. Zeroized on drop.
pub struct KeyMaterial {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
    hp: [u8; HP_KEY_LEN],
}

impl KeyMaterial {
    /// Expand a directional secret into packet protection keys.
    ///
    /// The version picks the expansion labels. Supported versions share
    /// the v1 labels, and they still produce unrelated keys because the
    /// secret itself already depends on the version salt.
    pub fn derive(secret: &DirectionalSecret, version: Version) -> Self {
        let Ok(hkdf) = Hkdf::<Sha256>::from_prk(secret.as_bytes()) else {
            unreachable!("a 32-byte secret is a valid HKDF-SHA256 PRK");
        };
        let params = version.initial_params();

        let mut key = [0u8; KEY_LEN];
        let mut iv = [0u8; IV_LEN];
        let mut hp = [0u8; HP_KEY_LEN];
        hkdf_expand_label(&hkdf, params.key_label, &mut key);
        hkdf_expand_label(&hkdf, params.iv_label, &mut iv);
        hkdf_expand_label(&hkdf, params.hp_label, &mut hp);

        Self { key, iv, hp }
    }

    /// AEAD key
    pub fn key(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    /// AEAD base IV, XORed with the packet number to form each nonce
    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    /// Header protection key
    pub fn hp(&self) -> &[u8; HP_KEY_LEN] {
        &self.hp
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
        self.hp.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use quell_proto::ConnectionId;

    use super::*;
    use crate::initial::secrets::derive_directional_secrets;

    fn client_secret(version: Version, dcid: &[u8]) -> DirectionalSecret {
        let id = ConnectionId::new(dcid).unwrap();
        let (client, _) = derive_directional_secrets(version, &id).unwrap();
        client
    }

    #[test]
    fn derive_is_deterministic() {
        let secret = client_secret(Version::V1, &[1, 2, 3, 4]);
        let a = KeyMaterial::derive(&secret, Version::V1);
        let b = KeyMaterial::derive(&secret, Version::V1);

        assert_eq!(a.key(), b.key());
        assert_eq!(a.iv(), b.iv());
        assert_eq!(a.hp(), b.hp());
    }

    #[test]
    fn outputs_are_pairwise_distinct() {
        let secret = client_secret(Version::V1, &[1, 2, 3, 4]);
        let keys = KeyMaterial::derive(&secret, Version::V1);

        // The three labels must land on independent key material
        assert_ne!(keys.key(), keys.hp());
        assert_ne!(&keys.key()[..IV_LEN], &keys.iv()[..]);
        assert_ne!(&keys.hp()[..IV_LEN], &keys.iv()[..]);
    }

    #[test]
    fn secrets_from_different_directions_produce_different_keys() {
        let id = ConnectionId::new(&[9, 9, 9, 9]).unwrap();
        let (client, server) = derive_directional_secrets(Version::V1, &id).unwrap();

        let client_keys = KeyMaterial::derive(&client, Version::V1);
        let server_keys = KeyMaterial::derive(&server, Version::V1);

        assert_ne!(client_keys.key(), server_keys.key());
        assert_ne!(client_keys.iv(), server_keys.iv());
        assert_ne!(client_keys.hp(), server_keys.hp());
    }
}
