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

//! The unspent-output view stack: copy-on-write cache layers over a backing
//! store, with explicit freshness/dirtiness tracking so flushing a child
//! into its parent preserves exactly the observable state.

mod cache;
mod error;
mod storage;
#[cfg(test)]
mod tests;
mod utxo;
mod utxo_entry;
mod view;

pub use cache::{ConsumedUtxoCache, UtxosCache};
pub use error::Error;
pub use storage::UtxosStore;
pub use utxo::{Utxo, UtxoSource};
pub use utxo_entry::{IsDirty, IsFresh, UtxoEntry, UtxoStatus};
pub use view::{flush_to_base, DummyUtxosView, FlushableUtxoView, UtxosView};
