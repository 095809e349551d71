// Copyright (c) 2021-2022 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://github.com/mintlayer/mintlayer-core/blob/master/LICENSE
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Base58Check address and key encoding: a version byte, the payload, and
//! the first four bytes of the payload's double-SHA256 as a checksum.

use crate::chain::config::ChainConfig;
use crate::primitives::{hash256, H160};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Not a base58 string")]
    Base58,
    #[error("Checksum mismatch")]
    BadChecksum,
    #[error("Unexpected payload length")]
    BadLength,
    #[error("Unknown version prefix {0:#04x}")]
    UnknownPrefix(u8),
    #[error("Invalid private key")]
    InvalidPrivateKey,
}

/// Where a payment can be sent: a public-key hash or a script hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Destination {
    PubKeyHash(H160),
    ScriptHash(H160),
}

fn base58check_encode(payload: &[u8]) -> String {
    let checksum = hash256(payload);
    let mut data = payload.to_vec();
    data.extend_from_slice(&checksum.as_bytes()[..4]);
    bs58::encode(data).into_string()
}

fn base58check_decode(s: &str) -> Result<Vec<u8>, AddressError> {
    let data = bs58::decode(s).into_vec().map_err(|_| AddressError::Base58)?;
    if data.len() < 5 {
        return Err(AddressError::BadLength);
    }
    let (payload, checksum) = data.split_at(data.len() - 4);
    if &hash256(payload).as_bytes()[..4] != checksum {
        return Err(AddressError::BadChecksum);
    }
    Ok(payload.to_vec())
}

pub fn encode_address(config: &ChainConfig, destination: &Destination) -> String {
    let (version, hash) = match destination {
        Destination::PubKeyHash(h) => (config.p2pkh_address_prefix(), h),
        Destination::ScriptHash(h) => (config.p2sh_address_prefix(), h),
    };
    let mut payload = vec![version];
    payload.extend_from_slice(hash.as_bytes());
    base58check_encode(&payload)
}

pub fn decode_address(config: &ChainConfig, s: &str) -> Result<Destination, AddressError> {
    let payload = base58check_decode(s)?;
    if payload.len() != 21 {
        return Err(AddressError::BadLength);
    }
    let hash = H160::from_slice(&payload[1..]);
    match payload[0] {
        v if v == config.p2pkh_address_prefix() => Ok(Destination::PubKeyHash(hash)),
        v if v == config.p2sh_address_prefix() => Ok(Destination::ScriptHash(hash)),
        other => Err(AddressError::UnknownPrefix(other)),
    }
}

/// Decodes a wallet-import-format private key into its 32 raw bytes and the
/// compressed-public-key marker.
pub fn decode_wif(config: &ChainConfig, s: &str) -> Result<([u8; 32], bool), AddressError> {
    let payload = base58check_decode(s)?;
    if payload.first() != Some(&config.wif_key_prefix()) {
        return Err(AddressError::InvalidPrivateKey);
    }
    let (bytes, compressed) = match payload.len() {
        33 => (&payload[1..33], false),
        34 if payload[33] == 0x01 => (&payload[1..33], true),
        _ => return Err(AddressError::InvalidPrivateKey),
    };
    Ok((bytes.try_into().expect("length checked above"), compressed))
}

pub fn encode_wif(config: &ChainConfig, key: &[u8; 32], compressed: bool) -> String {
    let mut payload = vec![config.wif_key_prefix()];
    payload.extend_from_slice(key);
    if compressed {
        payload.push(0x01);
    }
    base58check_encode(&payload)
}
