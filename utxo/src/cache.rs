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

use common::chain::{OutPoint, Transaction};
use common::primitives::Idable;

use crate::utxo_entry::{IsDirty, IsFresh, UtxoEntry};
use crate::{Error, FlushableUtxoView, Utxo, UtxoSource, UtxosView};

/// The entries of a torn-down cache layer, ready to be flushed into the
/// parent with [`FlushableUtxoView::batch_write`].
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct ConsumedUtxoCache {
    pub(crate) container: BTreeMap<OutPoint, UtxoEntry>,
}

/// One copy-on-write layer over a parent view. Reads fall through to the
/// parent and are memoized; writes only ever touch this layer, so throwing
/// the cache away rolls everything back.
pub struct UtxosCache<P> {
    parent: P,
    utxos: BTreeMap<OutPoint, UtxoEntry>,
}

impl<P: UtxosView> UtxosCache<P> {
    pub fn new(parent: P) -> Self {
        UtxosCache {
            parent,
            utxos: BTreeMap::new(),
        }
    }

    /// Returns the entry for an outpoint, pulling a clean copy from the
    /// parent on first access. Cloned rather than referenced since the
    /// flags may change on the cached copy.
    fn fetch_utxo_entry(&mut self, outpoint: &OutPoint) -> Option<UtxoEntry> {
        if let Some(entry) = self.utxos.get(outpoint) {
            return Some(entry.clone());
        }

        // Not in this layer: a parent hit is cached as neither fresh (the
        // parent has it) nor dirty (it is identical to the parent's).
        let entry = self
            .parent
            .utxo(outpoint)
            .map(|utxo| UtxoEntry::new(Some(utxo), IsFresh::No, IsDirty::No))?;
        self.utxos.insert(*outpoint, entry.clone());
        Some(entry)
    }

    /// Adds a utxo entry to this layer. With `possible_overwrite` the write
    /// replaces whatever is there (the signing path re-populates outputs it
    /// received as hints this way); without it, overwriting an unspent coin
    /// is an error.
    pub fn add_utxo(
        &mut self,
        outpoint: &OutPoint,
        utxo: Utxo,
        possible_overwrite: bool,
    ) -> Result<(), Error> {
        let is_fresh = match self.utxos.get(outpoint) {
            None => !possible_overwrite,
            Some(current) => {
                if !possible_overwrite {
                    if !current.is_spent() {
                        return Err(Error::OverwritingUtxo);
                    }
                    // The utxo exists here as spent-and-dirty when its
                    // spentness has not reached the parent yet. Re-adding it
                    // must not mark it fresh: a fresh entry that gets spent
                    // again would be dropped outright and the parent would
                    // never learn of the first spend.
                    !current.is_dirty() || current.is_fresh()
                } else {
                    current.is_fresh()
                }
            }
        };

        let entry = UtxoEntry::new(Some(utxo), IsFresh::from(is_fresh), IsDirty::Yes);
        self.utxos.insert(*outpoint, entry);
        Ok(())
    }

    /// Marks the utxo as spent and returns it.
    pub fn spend_utxo(&mut self, outpoint: &OutPoint) -> Result<Utxo, Error> {
        let entry = self.fetch_utxo_entry(outpoint).ok_or(Error::NoUtxoFound)?;
        if entry.is_spent() {
            return Err(Error::UtxoAlreadySpent(*outpoint));
        }

        if entry.is_fresh() {
            // The parent never saw this coin; forget it entirely.
            self.utxos.remove(outpoint);
        } else {
            let spent = UtxoEntry::new(None, IsFresh::No, IsDirty::Yes);
            self.utxos.insert(*outpoint, spent);
        }

        Ok(entry.take_utxo().expect("not spent, checked above"))
    }

    /// Applies a transaction: consumes its inputs, creates its outputs.
    /// Coinbase transactions consume nothing.
    pub fn connect_transaction(
        &mut self,
        tx: &Transaction,
        source: UtxoSource,
    ) -> Result<(), Error> {
        if !tx.is_coinbase() {
            for input in tx.inputs() {
                self.spend_utxo(&input.outpoint)?;
            }
        }
        self.add_utxos_from_tx(tx, source)
    }

    /// Adds all outputs of a transaction as new coins.
    pub fn add_utxos_from_tx(&mut self, tx: &Transaction, source: UtxoSource) -> Result<(), Error> {
        let txid = tx.get_id();
        let is_coinbase = tx.is_coinbase();
        for (index, output) in tx.outputs().iter().enumerate() {
            let outpoint = OutPoint::new(txid, index as u32);
            let utxo = Utxo::new(output.clone(), is_coinbase, source);
            self.add_utxo(&outpoint, utxo, false)?;
        }
        Ok(())
    }

    /// Whether the outpoint has an entry in this layer itself.
    pub fn has_utxo_in_cache(&self, outpoint: &OutPoint) -> bool {
        self.utxos.contains_key(outpoint)
    }

    pub fn consume(self) -> ConsumedUtxoCache {
        ConsumedUtxoCache {
            container: self.utxos,
        }
    }
}

impl<P> std::fmt::Debug for UtxosCache<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The parent's entries are its own business; show only this layer.
        f.debug_struct("UtxosCache").field("utxos", &self.utxos).finish()
    }
}

impl<P: UtxosView> UtxosView for UtxosCache<P> {
    fn utxo(&self, outpoint: &OutPoint) -> Option<Utxo> {
        match self.utxos.get(outpoint) {
            Some(entry) => entry.utxo().cloned(),
            None => self.parent.utxo(outpoint),
        }
    }
}

impl<P> FlushableUtxoView for UtxosCache<P> {
    fn batch_write(&mut self, utxos: ConsumedUtxoCache) -> Result<(), Error> {
        for (outpoint, entry) in utxos.container {
            // Clean entries carry no information for the parent.
            if !entry.is_dirty() {
                continue;
            }

            match self.utxos.get(&outpoint) {
                None => {
                    // Nothing here: take the child's entry as-is, unless it
                    // is a coin the child both created and spent, which as a
                    // whole never happened from this layer's viewpoint.
                    if !(entry.is_fresh() && entry.is_spent()) {
                        let is_fresh = IsFresh::from(entry.is_fresh());
                        let copy = UtxoEntry::new(entry.take_utxo(), is_fresh, IsDirty::Yes);
                        self.utxos.insert(outpoint, copy);
                    }
                }
                Some(parent_entry) => {
                    if entry.is_fresh() && !parent_entry.is_spent() {
                        // The child thought the coin was new while this
                        // layer holds it unspent: the caller corrupted the
                        // flags somewhere.
                        return Err(Error::FreshUtxoAlreadyExists);
                    }

                    if parent_entry.is_fresh() && entry.is_spent() {
                        // Our own parent never saw it either; annihilate.
                        self.utxos.remove(&outpoint);
                    } else {
                        // An ordinary modification. FRESH is inherited from
                        // this layer's entry: marking it fresh here when a
                        // spent version exists below would lose that spend.
                        let is_fresh = IsFresh::from(parent_entry.is_fresh());
                        let copy = UtxoEntry::new(entry.take_utxo(), is_fresh, IsDirty::Yes);
                        self.utxos.insert(outpoint, copy);
                    }
                }
            }
        }
        Ok(())
    }
}
