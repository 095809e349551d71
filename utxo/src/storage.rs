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

use common::chain::OutPoint;

use crate::{ConsumedUtxoCache, Error, FlushableUtxoView, Utxo, UtxosView};

/// The bottom layer of the view stack: plain owned storage of coins. Stands
/// where a persistent coin database would, and is what the tests and the
/// in-process node populate directly.
#[derive(Debug, Default, Clone)]
pub struct UtxosStore {
    utxos: BTreeMap<OutPoint, Utxo>,
}

impl UtxosStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditionally stores a coin; the store level has no notion of
    /// freshness.
    pub fn set_utxo(&mut self, outpoint: OutPoint, utxo: Utxo) {
        self.utxos.insert(outpoint, utxo);
    }

    pub fn remove_utxo(&mut self, outpoint: &OutPoint) {
        self.utxos.remove(outpoint);
    }

    pub fn utxo_count(&self) -> usize {
        self.utxos.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OutPoint, &Utxo)> {
        self.utxos.iter()
    }
}

impl UtxosView for UtxosStore {
    fn utxo(&self, outpoint: &OutPoint) -> Option<Utxo> {
        self.utxos.get(outpoint).cloned()
    }
}

impl FlushableUtxoView for UtxosStore {
    fn batch_write(&mut self, utxos: ConsumedUtxoCache) -> Result<(), Error> {
        for (outpoint, entry) in utxos.container {
            if !entry.is_dirty() {
                continue;
            }
            match entry.take_utxo() {
                Some(utxo) => {
                    self.utxos.insert(outpoint, utxo);
                }
                None => {
                    self.utxos.remove(&outpoint);
                }
            }
        }
        Ok(())
    }
}
