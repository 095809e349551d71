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

use common::chain::OutPoint;
use utxo::{Utxo, UtxosView};

use crate::pool::Mempool;

/// A utxo view that, on a parent miss, answers from the outputs of pending
/// pool transactions as if they were coins. Stacked under a request-local
/// cache layer it lets chains of unconfirmed transactions validate and
/// sign.
pub struct MempoolUtxosView<'a, P> {
    mempool: &'a Mempool,
    parent: P,
}

impl<'a, P: UtxosView> MempoolUtxosView<'a, P> {
    pub fn new(mempool: &'a Mempool, parent: P) -> Self {
        MempoolUtxosView { mempool, parent }
    }
}

impl<P: UtxosView> UtxosView for MempoolUtxosView<'_, P> {
    fn utxo(&self, outpoint: &OutPoint) -> Option<Utxo> {
        if let Some(utxo) = self.parent.utxo(outpoint) {
            return Some(utxo);
        }
        self.mempool.get(&outpoint.txid).and_then(|tx| {
            tx.outputs()
                .get(outpoint.index as usize)
                .map(|output| Utxo::new_for_mempool(output.clone()))
        })
    }
}
