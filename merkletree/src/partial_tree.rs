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

use common::primitives::H256;
use serialization::{Decode, Encode};

use crate::tree::hash_pair;

/// An upper bound on transactions per block (the minimum possible
/// transaction size divides the block size limit); proofs claiming more are
/// garbage regardless of content.
const MAX_TRANSACTIONS_PER_PROOF: u32 = 1_000_000 / 60;

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ProofError {
    #[error("Proof commits to zero transactions")]
    NoTransactions,
    #[error("Proof claims more transactions than a block can hold")]
    TooManyTransactions,
    #[error("More hashes than transactions")]
    TooManyHashes,
    #[error("Fewer bits than hashes")]
    NotEnoughBits,
    #[error("Traversal overran the bit array")]
    MissingBits,
    #[error("Traversal overran the hash array")]
    MissingHashes,
    #[error(
        "Identical left and right subtree hashes; the duplicated-last-node ambiguity is not an acceptable encoding"
    )]
    DuplicateSubtree,
    #[error("Bits left over after traversal")]
    UnconsumedBits,
    #[error("Hashes left over after traversal")]
    UnconsumedHashes,
    #[error("Reconstructed root does not match the header's Merkle root")]
    RootMismatch,
}

/// A partial Merkle tree: a depth-first serialization of the subset of the
/// tree needed to connect a set of designated leaves to the root. One bit
/// per visited node says whether the subtree below holds a designated leaf;
/// pruned subtrees and designated leaves contribute one hash each, in
/// traversal order.
///
/// The total leaf count travels with the proof, and every width computation
/// derives from it; this is what forecloses the classic mutation where the
/// last leaf is read a second time to pad an odd level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialMerkleTree {
    total_transactions: u32,
    bits: Vec<bool>,
    hashes: Vec<H256>,
}

impl PartialMerkleTree {
    /// Builds the proof for the leaves flagged in `matches`.
    pub fn from_txids(txids: &[H256], matches: &[bool]) -> Self {
        assert_eq!(txids.len(), matches.len(), "one match flag per txid");
        let mut tree = PartialMerkleTree {
            total_transactions: txids.len() as u32,
            bits: Vec::new(),
            hashes: Vec::new(),
        };
        if txids.is_empty() {
            return tree;
        }
        let height = tree.tree_height();
        tree.traverse_and_build(height, 0, txids, matches);
        tree
    }

    pub fn total_transactions(&self) -> u32 {
        self.total_transactions
    }

    /// Nodes at the given height (0 = leaves).
    fn calc_tree_width(&self, height: u32) -> u32 {
        (self.total_transactions + (1 << height) - 1) >> height
    }

    fn tree_height(&self) -> u32 {
        let mut height = 0;
        while self.calc_tree_width(height) > 1 {
            height += 1;
        }
        height
    }

    fn calc_hash(&self, height: u32, pos: u32, txids: &[H256]) -> H256 {
        if height == 0 {
            return txids[pos as usize];
        }
        let left = self.calc_hash(height - 1, pos * 2, txids);
        let right = if pos * 2 + 1 < self.calc_tree_width(height - 1) {
            self.calc_hash(height - 1, pos * 2 + 1, txids)
        } else {
            // An odd level reuses its last node as its own sibling.
            left
        };
        hash_pair(&left, &right)
    }

    fn traverse_and_build(&mut self, height: u32, pos: u32, txids: &[H256], matches: &[bool]) {
        let first_leaf = (pos as usize) << height;
        let last_leaf = usize::min(((pos + 1) as usize) << height, txids.len());
        let parent_of_match = matches[first_leaf..last_leaf].iter().any(|&m| m);

        self.bits.push(parent_of_match);

        if height == 0 || !parent_of_match {
            // Leaf, or a subtree with nothing designated: one hash stands
            // for the whole thing.
            self.hashes.push(self.calc_hash(height, pos, txids));
        } else {
            self.traverse_and_build(height - 1, pos * 2, txids, matches);
            if pos * 2 + 1 < self.calc_tree_width(height - 1) {
                self.traverse_and_build(height - 1, pos * 2 + 1, txids, matches);
            }
        }
    }

    /// Re-runs the traversal consuming bits and hashes, returning the
    /// reconstructed root and the designated txids in leaf order. Every
    /// deviation from the canonical encoding is an error.
    pub fn extract_matches(&self) -> Result<(H256, Vec<H256>), ProofError> {
        if self.total_transactions == 0 {
            return Err(ProofError::NoTransactions);
        }
        if self.total_transactions > MAX_TRANSACTIONS_PER_PROOF {
            return Err(ProofError::TooManyTransactions);
        }
        if self.hashes.len() as u32 > self.total_transactions {
            return Err(ProofError::TooManyHashes);
        }
        if self.bits.len() < self.hashes.len() {
            return Err(ProofError::NotEnoughBits);
        }

        let mut bits_used = 0usize;
        let mut hashes_used = 0usize;
        let mut matched = Vec::new();
        let root = self.traverse_and_extract(
            self.tree_height(),
            0,
            &mut bits_used,
            &mut hashes_used,
            &mut matched,
        )?;

        // Everything in the proof must have been needed; the bit array may
        // only carry the zero padding of its final serialized byte.
        if bits_used.div_ceil(8) != self.bits.len().div_ceil(8)
            || self.bits[bits_used..].iter().any(|&b| b)
        {
            return Err(ProofError::UnconsumedBits);
        }
        if hashes_used != self.hashes.len() {
            return Err(ProofError::UnconsumedHashes);
        }

        Ok((root, matched))
    }

    fn traverse_and_extract(
        &self,
        height: u32,
        pos: u32,
        bits_used: &mut usize,
        hashes_used: &mut usize,
        matched: &mut Vec<H256>,
    ) -> Result<H256, ProofError> {
        let parent_of_match = *self.bits.get(*bits_used).ok_or(ProofError::MissingBits)?;
        *bits_used += 1;

        if height == 0 || !parent_of_match {
            let hash = *self.hashes.get(*hashes_used).ok_or(ProofError::MissingHashes)?;
            *hashes_used += 1;
            if height == 0 && parent_of_match {
                matched.push(hash);
            }
            return Ok(hash);
        }

        let left = self.traverse_and_extract(height - 1, pos * 2, bits_used, hashes_used, matched)?;
        let right = if pos * 2 + 1 < self.calc_tree_width(height - 1) {
            let right =
                self.traverse_and_extract(height - 1, pos * 2 + 1, bits_used, hashes_used, matched)?;
            if right == left {
                // Two identical children can only be the duplicated-last-
                // node trick; the genuine odd case never serializes the
                // right child.
                return Err(ProofError::DuplicateSubtree);
            }
            right
        } else {
            left
        };
        Ok(hash_pair(&left, &right))
    }
}

impl Encode for PartialMerkleTree {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.total_transactions.encode_to(dest);
        self.hashes.encode_to(dest);
        // Bits pack least-significant first into bytes.
        let mut bytes = vec![0u8; self.bits.len().div_ceil(8)];
        for (i, &bit) in self.bits.iter().enumerate() {
            if bit {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }
        bytes.encode_to(dest);
    }
}

impl Decode for PartialMerkleTree {
    fn decode(input: &mut &[u8]) -> Result<Self, serialization::Error> {
        let total_transactions = u32::decode(input)?;
        let hashes = Vec::<H256>::decode(input)?;
        let bytes = Vec::<u8>::decode(input)?;
        let mut bits = Vec::with_capacity(bytes.len() * 8);
        for i in 0..bytes.len() * 8 {
            bits.push(bytes[i / 8] & (1 << (i % 8)) != 0);
        }
        Ok(PartialMerkleTree {
            total_transactions,
            bits,
            hashes,
        })
    }
}
