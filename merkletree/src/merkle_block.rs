// Copyright (c) 2022 RBB S.r.l
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

use std::collections::BTreeSet;

use common::chain::{Block, BlockHeader, Transaction};
use common::primitives::{Id, Idable, H256};
use serialization::{Decode, Encode};

use crate::{PartialMerkleTree, ProofError};

/// A block header together with a partial Merkle tree for a chosen subset
/// of the block's transactions; the wire form of a transaction-inclusion
/// proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleBlock {
    pub header: BlockHeader,
    pub partial_tree: PartialMerkleTree,
}

impl MerkleBlock {
    /// Builds the proof for the transactions of `block` whose ids appear in
    /// `txid_set`.
    pub fn from_block(block: &Block, txid_set: &BTreeSet<Id<Transaction>>) -> Self {
        let txids: Vec<H256> =
            block.transactions.iter().map(|tx| tx.get_id().to_hash()).collect();
        let matches: Vec<bool> = block
            .transactions
            .iter()
            .map(|tx| txid_set.contains(&tx.get_id()))
            .collect();
        MerkleBlock {
            header: block.header.clone(),
            partial_tree: PartialMerkleTree::from_txids(&txids, &matches),
        }
    }

    /// Verifies the partial tree and returns the committed txids. The root
    /// must equal the header's Merkle root; whether the header belongs to
    /// the active chain is the caller's concern.
    pub fn extract_matches(&self) -> Result<Vec<Id<Transaction>>, ProofError> {
        let (root, matched) = self.partial_tree.extract_matches()?;
        if root != self.header.merkle_root {
            return Err(ProofError::RootMismatch);
        }
        Ok(matched.into_iter().map(Id::new).collect())
    }
}

impl Encode for MerkleBlock {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.header.encode_to(dest);
        self.partial_tree.encode_to(dest);
    }
}

impl Decode for MerkleBlock {
    fn decode(input: &mut &[u8]) -> Result<Self, serialization::Error> {
        let header = BlockHeader::decode(input)?;
        let partial_tree = PartialMerkleTree::decode(input)?;
        Ok(MerkleBlock {
            header,
            partial_tree,
        })
    }
}
