// Copyright (c) 2021 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// 	http://spdx.org/licenses/MIT
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeMap;

use secp256k1::{PublicKey, SecretKey};

use common::address::{decode_wif, encode_wif, AddressError};
use common::chain::{config::ChainConfig, Script};
use common::primitives::{hash160, H160};

use crate::signature_checker::SECP;

/// A private key together with the compression choice for its public key;
/// the choice decides the key's address, so it travels with the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey {
    secret: SecretKey,
    compressed: bool,
}

impl PrivateKey {
    pub fn new(secret: SecretKey, compressed: bool) -> Self {
        PrivateKey { secret, compressed }
    }

    pub fn from_wif(config: &ChainConfig, wif: &str) -> Result<Self, AddressError> {
        let (bytes, compressed) = decode_wif(config, wif)?;
        let secret =
            SecretKey::from_slice(&bytes).map_err(|_| AddressError::InvalidPrivateKey)?;
        Ok(PrivateKey { secret, compressed })
    }

    pub fn to_wif(&self, config: &ChainConfig) -> String {
        encode_wif(config, &self.secret.secret_bytes(), self.compressed)
    }

    /// The serialized public key in the form the compression flag dictates.
    pub fn public_key(&self) -> Vec<u8> {
        let pk = PublicKey::from_secret_key(&SECP, &self.secret);
        if self.compressed {
            pk.serialize().to_vec()
        } else {
            pk.serialize_uncompressed().to_vec()
        }
    }

    pub fn pubkey_hash(&self) -> H160 {
        hash160(&self.public_key())
    }

    /// DER-encoded ECDSA signature over `digest` (low-S, as the strict
    /// encoding rules demand), without the hash-type byte.
    pub fn sign_digest(&self, digest: &common::primitives::H256) -> Vec<u8> {
        let msg = secp256k1::Message::from_digest(digest.to_fixed_bytes());
        SECP.sign_ecdsa(&msg, &self.secret).serialize_der().to_vec()
    }
}

/// Read-only key lookup the signer works against. Backed by the wallet in
/// the node, by a transient store when keys arrive with the RPC call.
pub trait KeyStore {
    fn get_key(&self, pubkey_hash: &H160) -> Option<PrivateKey>;
    fn get_script(&self, script_hash: &H160) -> Option<Script>;
}

/// In-memory key store; also the transient store built from RPC-supplied
/// keys and redeem scripts.
#[derive(Debug, Default, Clone)]
pub struct MemoryKeyStore {
    keys: BTreeMap<H160, PrivateKey>,
    scripts: BTreeMap<H160, Script>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_key(&mut self, key: PrivateKey) {
        self.keys.insert(key.pubkey_hash(), key);
    }

    pub fn add_redeem_script(&mut self, script: Script) {
        self.scripts.insert(script.script_hash(), script);
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.scripts.is_empty()
    }
}

impl KeyStore for MemoryKeyStore {
    fn get_key(&self, pubkey_hash: &H160) -> Option<PrivateKey> {
        self.keys.get(pubkey_hash).cloned()
    }

    fn get_script(&self, script_hash: &H160) -> Option<Script> {
        self.scripts.get(script_hash).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key(byte: u8, compressed: bool) -> PrivateKey {
        PrivateKey::new(SecretKey::from_slice(&[byte; 32]).unwrap(), compressed)
    }

    #[test]
    fn wif_roundtrip_preserves_key_and_compression() {
        let config = ChainConfig::regtest();
        for compressed in [true, false] {
            let key = test_key(0x21, compressed);
            let wif = key.to_wif(&config);
            assert_eq!(PrivateKey::from_wif(&config, &wif), Ok(key));
        }
    }

    #[test]
    fn compression_changes_the_address() {
        let compressed = test_key(0x21, true);
        let uncompressed = test_key(0x21, false);
        assert_eq!(compressed.public_key().len(), 33);
        assert_eq!(uncompressed.public_key().len(), 65);
        assert_ne!(compressed.pubkey_hash(), uncompressed.pubkey_hash());
    }

    #[test]
    fn store_lookup_by_hash() {
        let mut store = MemoryKeyStore::new();
        let key = test_key(0x42, true);
        store.add_key(key.clone());
        assert_eq!(store.get_key(&key.pubkey_hash()), Some(key));
        assert_eq!(store.get_key(&H160::zero()), None);

        let script = Script::from_bytes(vec![0x51]);
        store.add_redeem_script(script.clone());
        assert_eq!(store.get_script(&script.script_hash()), Some(script));
    }

    #[test]
    fn invalid_wif_rejected() {
        let config = ChainConfig::regtest();
        assert!(PrivateKey::from_wif(&config, "notakey").is_err());
    }
}
