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

use crate::chain::transaction::Transaction;
use crate::primitives::{hash256, Id, Idable, H256};
use serialization::{Decode, Encode, Error};

/// An 80-byte block header. The block id is the double-SHA256 of the header
/// encoding alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block: Id<Block>,
    pub merkle_root: H256,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl Encode for BlockHeader {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.version.encode_to(dest);
        self.prev_block.encode_to(dest);
        self.merkle_root.encode_to(dest);
        self.time.encode_to(dest);
        self.bits.encode_to(dest);
        self.nonce.encode_to(dest);
    }

    fn encoded_size(&self) -> usize {
        80
    }
}

impl Decode for BlockHeader {
    fn decode(input: &mut &[u8]) -> Result<Self, Error> {
        Ok(BlockHeader {
            version: i32::decode(input)?,
            prev_block: Id::decode(input)?,
            merkle_root: H256::decode(input)?,
            time: u32::decode(input)?,
            bits: u32::decode(input)?,
            nonce: u32::decode(input)?,
        })
    }
}

impl Idable for BlockHeader {
    type Tag = Block;

    fn get_id(&self) -> Id<Block> {
        Id::new(hash256(&self.encode()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Block {
            header,
            transactions,
        }
    }
}

impl Idable for Block {
    type Tag = Block;

    fn get_id(&self) -> Id<Block> {
        self.header.get_id()
    }
}

impl Encode for Block {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.header.encode_to(dest);
        self.transactions.encode_to(dest);
    }
}

impl Decode for Block {
    fn decode(input: &mut &[u8]) -> Result<Self, Error> {
        let header = BlockHeader::decode(input)?;
        let transactions = Vec::<Transaction>::decode(input)?;
        Ok(Block {
            header,
            transactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_80_bytes() {
        let header = BlockHeader {
            version: 1,
            prev_block: Id::zero(),
            merkle_root: H256::zero(),
            time: 1_231_006_505,
            bits: 0x1d00ffff,
            nonce: 2_083_236_893,
        };
        assert_eq!(header.encode().len(), 80);
        assert_eq!(BlockHeader::decode_all(&header.encode()), Ok(header));
    }

    #[test]
    fn block_id_is_header_id() {
        let header = BlockHeader {
            version: 1,
            prev_block: Id::zero(),
            merkle_root: H256::from_low_u64_be(7),
            time: 0,
            bits: 0,
            nonce: 0,
        };
        let block = Block::new(header.clone(), vec![]);
        assert_eq!(block.get_id(), header.get_id());
    }
}
