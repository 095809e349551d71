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

use common::chain::TxOut;
use common::primitives::BlockHeight;

/// Where a coin came from: a block at a known height, or an unconfirmed
/// transaction still in the memory pool.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum UtxoSource {
    Blockchain(BlockHeight),
    Mempool,
}

impl UtxoSource {
    pub fn is_mempool(&self) -> bool {
        matches!(self, UtxoSource::Mempool)
    }

    pub fn blockchain_height(&self) -> Option<BlockHeight> {
        match self {
            UtxoSource::Blockchain(h) => Some(*h),
            UtxoSource::Mempool => None,
        }
    }
}

/// An unspent transaction output with the metadata validation needs: its
/// origin and whether it was created by a coinbase (and is therefore subject
/// to the maturity rule).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Utxo {
    output: TxOut,
    is_coinbase: bool,
    source: UtxoSource,
}

impl Utxo {
    pub fn new(output: TxOut, is_coinbase: bool, source: UtxoSource) -> Self {
        Utxo {
            output,
            is_coinbase,
            source,
        }
    }

    pub fn new_for_blockchain(output: TxOut, is_coinbase: bool, height: BlockHeight) -> Self {
        Self::new(output, is_coinbase, UtxoSource::Blockchain(height))
    }

    pub fn new_for_mempool(output: TxOut) -> Self {
        Self::new(output, false, UtxoSource::Mempool)
    }

    pub fn output(&self) -> &TxOut {
        &self.output
    }

    pub fn is_coinbase(&self) -> bool {
        self.is_coinbase
    }

    pub fn source(&self) -> &UtxoSource {
        &self.source
    }
}
