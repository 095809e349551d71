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

use std::collections::BTreeMap;

use common::chain::Block;
use common::primitives::{BlockHeight, Id, Idable};

/// Index metadata of a block known to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockIndexData {
    pub block_id: Id<Block>,
    pub height: BlockHeight,
    pub time: u32,
}

/// Read access to the active chain and its blocks. Reading a block is
/// acceptable under a shared lock; block files are memory-mappable and the
/// call does not suspend.
pub trait ChainStore {
    /// Height of the chain tip.
    fn active_height(&self) -> BlockHeight;

    /// Index data for a block hash, if the block is known at all.
    fn block_index_for(&self, block_id: &Id<Block>) -> Option<BlockIndexData>;

    /// The block id at a height of the active chain.
    fn block_id_at_height(&self, height: BlockHeight) -> Option<Id<Block>>;

    /// Whether the block lies on the active chain.
    fn contains_in_active_chain(&self, block_id: &Id<Block>) -> bool {
        self.block_index_for(block_id)
            .map(|data| self.block_id_at_height(data.height) == Some(data.block_id))
            .unwrap_or(false)
    }

    /// Reads the full block.
    fn read_block(&self, block_id: &Id<Block>) -> Option<Block>;
}

/// An owned chain store holding every block in memory; the node-in-process
/// and test backend.
#[derive(Debug, Default, Clone)]
pub struct InMemoryChainStore {
    blocks: BTreeMap<Id<Block>, (Block, BlockHeight)>,
    by_height: Vec<Id<Block>>,
}

impl InMemoryChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a block to the active chain and returns its height. The
    /// first block appended sits at height zero.
    pub fn append_block(&mut self, block: Block) -> BlockHeight {
        let height = BlockHeight::new(self.by_height.len() as u32);
        let block_id = block.get_id();
        self.blocks.insert(block_id, (block, height));
        self.by_height.push(block_id);
        height
    }

    pub fn is_empty(&self) -> bool {
        self.by_height.is_empty()
    }
}

impl ChainStore for InMemoryChainStore {
    fn active_height(&self) -> BlockHeight {
        // An empty chain reports height zero, same as a lone genesis.
        BlockHeight::new(self.by_height.len().saturating_sub(1) as u32)
    }

    fn block_index_for(&self, block_id: &Id<Block>) -> Option<BlockIndexData> {
        self.blocks.get(block_id).map(|(block, height)| BlockIndexData {
            block_id: *block_id,
            height: *height,
            time: block.header.time,
        })
    }

    fn block_id_at_height(&self, height: BlockHeight) -> Option<Id<Block>> {
        self.by_height.get(height.into_int() as usize).copied()
    }

    fn read_block(&self, block_id: &Id<Block>) -> Option<Block> {
        self.blocks.get(block_id).map(|(block, _)| block.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::chain::BlockHeader;
    use common::primitives::H256;

    fn block(prev: Id<Block>, tag: u64) -> Block {
        Block::new(
            BlockHeader {
                version: 1,
                prev_block: prev,
                merkle_root: H256::from_low_u64_be(tag),
                time: 1_600_000_000 + tag as u32,
                bits: 0x207fffff,
                nonce: 0,
            },
            vec![],
        )
    }

    #[test]
    fn append_and_lookup() {
        let mut store = InMemoryChainStore::new();
        assert!(store.is_empty());

        let genesis = block(Id::zero(), 0);
        let genesis_id = genesis.get_id();
        assert_eq!(store.append_block(genesis.clone()), BlockHeight::zero());

        let next = block(genesis_id, 1);
        let next_id = next.get_id();
        assert_eq!(store.append_block(next), BlockHeight::new(1));

        assert_eq!(store.active_height(), BlockHeight::new(1));
        assert_eq!(store.block_id_at_height(BlockHeight::zero()), Some(genesis_id));
        assert_eq!(store.block_id_at_height(BlockHeight::new(2)), None);
        assert!(store.contains_in_active_chain(&next_id));
        assert!(!store.contains_in_active_chain(&Id::new(H256::from_low_u64_be(99))));
        assert_eq!(store.read_block(&genesis_id), Some(genesis));

        let index = store.block_index_for(&next_id).unwrap();
        assert_eq!(index.height, BlockHeight::new(1));
        assert_eq!(index.block_id, next_id);
    }
}
