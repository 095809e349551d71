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

use crate::primitives::{hash160, H160};
use serialization::{Decode, Encode, Error};

/// A flat opcode/push-data byte sequence. This type is only the container;
/// execution, templates and building live in the script engine crate.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Script {
    data: Vec<u8>,
}

impl Script {
    pub const fn new() -> Self {
        Script { data: Vec::new() }
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Script { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// RIPEMD160∘SHA256 of the raw bytes; the commitment a pay-to-script-hash
    /// output stores.
    pub fn script_hash(&self) -> H160 {
        hash160(&self.data)
    }

    /// Whether the script is exactly the canonical pay-to-script-hash
    /// template `OP_HASH160 <20 bytes> OP_EQUAL`.
    pub fn is_pay_to_script_hash(&self) -> bool {
        self.data.len() == 23
            && self.data[0] == 0xa9 // OP_HASH160
            && self.data[1] == 0x14 // push of 20 bytes
            && self.data[22] == 0x87 // OP_EQUAL
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.data)
    }
}

impl From<Vec<u8>> for Script {
    fn from(data: Vec<u8>) -> Self {
        Script { data }
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl Encode for Script {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.data.encode_to(dest);
    }
}

impl Decode for Script {
    fn decode(input: &mut &[u8]) -> Result<Self, Error> {
        Vec::<u8>::decode(input).map(Script::from_bytes)
    }
}
