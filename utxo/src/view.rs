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

use crate::{ConsumedUtxoCache, Error, Utxo, UtxosCache};
use common::chain::OutPoint;

/// Read access to some unspent-output state. Implementations form a stack:
/// a cache layer answers from its own entries and otherwise delegates to
/// its parent view.
pub trait UtxosView {
    /// Retrieves the utxo, walking the layer stack down on a miss. A spend
    /// recorded in an upper layer terminates the walk with `None`.
    fn utxo(&self, outpoint: &OutPoint) -> Option<Utxo>;

    /// Whether the outpoint refers to an unspent output.
    fn has_utxo(&self, outpoint: &OutPoint) -> bool {
        self.utxo(outpoint).is_some()
    }
}

impl<T: UtxosView> UtxosView for &T {
    fn utxo(&self, outpoint: &OutPoint) -> Option<Utxo> {
        (*self).utxo(outpoint)
    }
}

/// Bulk application of a consumed child layer.
pub trait FlushableUtxoView {
    /// Merges the child's entries into this view according to the
    /// fresh/dirty state table.
    fn batch_write(&mut self, utxos: ConsumedUtxoCache) -> Result<(), Error>;
}

/// An empty backing view. The bottom of request-local stacks that are
/// populated explicitly and thrown away afterwards.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyUtxosView;

impl UtxosView for DummyUtxosView {
    fn utxo(&self, _outpoint: &OutPoint) -> Option<Utxo> {
        None
    }
}

/// Flushes the cache into the given base, consuming the cache.
pub fn flush_to_base<P: UtxosView>(
    cache: UtxosCache<P>,
    base: &mut impl FlushableUtxoView,
) -> Result<(), Error> {
    base.batch_write(cache.consume())
}
