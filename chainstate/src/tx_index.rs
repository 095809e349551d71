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

use common::chain::{Block, Transaction};
use common::primitives::{Id, Idable};

/// Where a transaction sits: which block, and at which position within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxPosition {
    pub block_id: Id<Block>,
    pub index: usize,
}

/// The optional txid → position index. Without it, transaction lookup only
/// works through the memory pool and through coins still unspent in the
/// utxo view.
#[derive(Debug, Default, Clone)]
pub struct TxIndex {
    positions: BTreeMap<Id<Transaction>, TxPosition>,
}

impl TxIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every transaction of a connected block.
    pub fn index_block(&mut self, block: &Block) {
        let block_id = block.get_id();
        for (index, tx) in block.transactions.iter().enumerate() {
            self.positions.insert(tx.get_id(), TxPosition { block_id, index });
        }
    }

    pub fn position(&self, txid: &Id<Transaction>) -> Option<TxPosition> {
        self.positions.get(txid).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::chain::{BlockHeader, Script, TxIn, TxOut, OutPoint, SEQUENCE_FINAL};
    use common::primitives::{Amount, H256};

    #[test]
    fn index_and_lookup() {
        let tx = Transaction::new(
            1,
            vec![TxIn::new(OutPoint::null(), Script::new(), SEQUENCE_FINAL)],
            vec![TxOut::new(Amount::from_atoms(50), Script::new())],
            0,
        );
        let block = Block::new(
            BlockHeader {
                version: 1,
                prev_block: Id::zero(),
                merkle_root: H256::from_low_u64_be(1),
                time: 0,
                bits: 0,
                nonce: 0,
            },
            vec![tx.clone()],
        );

        let mut index = TxIndex::new();
        index.index_block(&block);

        let position = index.position(&tx.get_id()).unwrap();
        assert_eq!(position.block_id, block.get_id());
        assert_eq!(position.index, 0);
        assert_eq!(index.position(&Id::new(H256::from_low_u64_be(5))), None);
    }
}
