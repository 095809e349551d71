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

// TODO: consider removing this in the future when fixed-hash fixes this problem
#![allow(clippy::non_canonical_clone_impl)]

use std::fmt::{Debug, Display};

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use serialization::{Decode, Encode, Error};

fixed_hash::construct_fixed_hash! {
    /// A 32-byte hash stored in wire byte order. The external text form is
    /// the byte-reversed hex string, per [`H256::to_rpc_string`].
    pub struct H256(32);
}

fixed_hash::construct_fixed_hash! {
    /// A 20-byte hash (ripemd160 of sha256), used for key and script hashes.
    pub struct H160(20);
}

impl Encode for H256 {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        dest.extend_from_slice(self.as_bytes());
    }

    fn encoded_size(&self) -> usize {
        H256::len_bytes()
    }
}

impl Decode for H256 {
    fn decode(input: &mut &[u8]) -> Result<Self, Error> {
        <[u8; 32]>::decode(input).map(H256)
    }
}

impl H256 {
    /// The hash printed the way the network's tooling prints it: the bytes
    /// in reverse order, two lowercase hex digits each (big-endian display
    /// of a little-endian number).
    pub fn to_rpc_string(&self) -> String {
        let mut bytes = self.0;
        bytes.reverse();
        hex::encode(bytes)
    }

    /// Parses the byte-reversed hex form produced by [`Self::to_rpc_string`].
    pub fn from_rpc_str(s: &str) -> Option<Self> {
        if s.len() != 64 {
            return None;
        }
        let mut bytes: [u8; 32] = hex::decode(s).ok()?.try_into().ok()?;
        bytes.reverse();
        Some(H256(bytes))
    }
}

/// Double-SHA256, the hash behind transaction and block identifiers.
pub fn hash256(data: &[u8]) -> H256 {
    let once = Sha256::digest(data);
    let twice = Sha256::digest(once);
    H256(twice.into())
}

/// RIPEMD160 of SHA256, the hash behind addresses and script hashes.
pub fn hash160(data: &[u8]) -> H160 {
    let sha = Sha256::digest(data);
    let rip = Ripemd160::digest(sha);
    H160(rip.into())
}

/// A hash statically tagged with the type of the object it identifies, so a
/// block id cannot be passed where a transaction id is expected.
pub struct Id<T> {
    hash: H256,
    _shadow: std::marker::PhantomData<fn() -> T>,
}

// Manual PartialEq/Eq/Hash so the bound does not propagate to T through PhantomData.
impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

// Implementing Clone/Copy manually to avoid the constraint on T
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Id{{{}}}", self.hash.to_rpc_string())
    }
}

impl<T> Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash.to_rpc_string())
    }
}

// Manual Ord so the bound does not propagate to T through PhantomData.
impl<T: Eq> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.hash.cmp(&other.hash)
    }
}

impl<T: Eq> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Eq> From<H256> for Id<T> {
    fn from(hash: H256) -> Self {
        Self::new(hash)
    }
}

impl<T> Encode for Id<T> {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.hash.encode_to(dest);
    }

    fn encoded_size(&self) -> usize {
        H256::len_bytes()
    }
}

impl<T> Decode for Id<T> {
    fn decode(input: &mut &[u8]) -> Result<Self, Error> {
        H256::decode(input).map(Self::new)
    }
}

impl<T> Id<T> {
    pub const fn new(hash: H256) -> Self {
        Self {
            hash,
            _shadow: std::marker::PhantomData,
        }
    }

    pub const fn zero() -> Self {
        Self::new(H256::zero())
    }

    pub const fn to_hash(&self) -> H256 {
        self.hash
    }

    pub fn is_zero(&self) -> bool {
        self.hash.is_zero()
    }

    pub fn to_rpc_string(&self) -> String {
        self.hash.to_rpc_string()
    }

    pub fn from_rpc_str(s: &str) -> Option<Self> {
        H256::from_rpc_str(s).map(Self::new)
    }
}

/// A trait for objects that have a canonical hash identity.
pub trait Idable {
    type Tag;

    fn get_id(&self) -> Id<Self::Tag>;
}

impl<T: Idable> Idable for &T {
    type Tag = T::Tag;

    fn get_id(&self) -> Id<Self::Tag> {
        (*self).get_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HASHES: [&str; 4] = [
        "0000000000000000000000000000000000000000000000000000000000000000",
        "0000000000000000000000000000000000000000000000000000000000000001",
        "000000006a625f06636b8bb6ac7b960a8d03705d1ace08b1a19da3fdcc99ddbd",
        "02f0000ff000000004ec466ce4732fe6f1ed1cddc2ed4b328fff5224276e3f6f",
    ];

    #[test]
    fn rpc_hex_roundtrip() {
        for s in SAMPLE_HASHES {
            let h = H256::from_rpc_str(s).unwrap();
            assert_eq!(h.to_rpc_string(), s);
        }
    }

    #[test]
    fn rpc_hex_is_byte_reversed() {
        let h = H256::from_rpc_str(
            "00000000000000000000000000000000000000000000000000000000000000ff",
        )
        .unwrap();
        // The least significant display digit pair is the first wire byte.
        assert_eq!(h.as_bytes()[0], 0xff);
        assert_eq!(h.as_bytes()[31], 0x00);
    }

    #[test]
    fn rpc_hex_rejects_bad_input() {
        assert_eq!(H256::from_rpc_str("00ff"), None);
        assert_eq!(H256::from_rpc_str(&"zz".repeat(32)), None);
    }

    #[test]
    fn hash256_known_vector() {
        // double_sha256("hello")
        let h = hash256(b"hello");
        assert_eq!(
            hex::encode(h.as_bytes()),
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        );
    }

    #[test]
    fn hash160_known_vector() {
        // ripemd160(sha256("hello"))
        let h = hash160(b"hello");
        assert_eq!(
            hex::encode(h.as_bytes()),
            "b6a9c8c230722b7c748331a8b450f05566dc7d0f"
        );
    }

    #[test]
    fn id_wire_form_is_raw_bytes() {
        let h = H256::from_rpc_str(
            "000000006a625f06636b8bb6ac7b960a8d03705d1ace08b1a19da3fdcc99ddbd",
        )
        .unwrap();
        let id: Id<()> = Id::new(h);
        assert_eq!(id.encode(), h.as_bytes().to_vec());
        assert_eq!(Id::<()>::decode_all(&id.encode()), Ok(id));
    }
}
