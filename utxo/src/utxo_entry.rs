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

use crate::Utxo;

/// A cache slot either holds the coin or records that this layer spent it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum UtxoStatus {
    Spent,
    Entry(Utxo),
}

/// The entry is fresh when the parent view does not contain this utxo; a
/// fresh entry that gets spent can simply be dropped rather than flushed.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IsFresh {
    Yes,
    No,
}

impl From<bool> for IsFresh {
    fn from(v: bool) -> Self {
        if v {
            IsFresh::Yes
        } else {
            IsFresh::No
        }
    }
}

/// The entry is dirty when this layer's version differs from the parent's
/// and must be written down on flush.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IsDirty {
    Yes,
    No,
}

impl From<bool> for IsDirty {
    fn from(v: bool) -> Self {
        if v {
            IsDirty::Yes
        } else {
            IsDirty::No
        }
    }
}

/// A utxo (or its recorded spending) plus the flags that steer flushing.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UtxoEntry {
    status: UtxoStatus,
    is_fresh: IsFresh,
    is_dirty: IsDirty,
}

impl UtxoEntry {
    pub fn new(utxo: Option<Utxo>, is_fresh: IsFresh, is_dirty: IsDirty) -> UtxoEntry {
        let entry = UtxoEntry {
            status: match utxo {
                Some(utxo) => UtxoStatus::Entry(utxo),
                None => UtxoStatus::Spent,
            },
            is_fresh,
            is_dirty,
        };

        // Of the 2^3 combinations only these occur:
        // - unspent, FRESH, DIRTY: a coin created in this layer
        // - unspent, not FRESH, DIRTY: a coin changed in this layer
        // - unspent, not FRESH, not DIRTY: a clean copy from the parent
        // - spent, FRESH, not DIRTY: parent never saw it, nothing to flush
        // - spent, not FRESH, DIRTY: the spend still has to reach the parent
        match &entry.status {
            UtxoStatus::Entry(_) => debug_assert!(!entry.is_fresh() || entry.is_dirty()),
            UtxoStatus::Spent => debug_assert!(entry.is_fresh() ^ entry.is_dirty()),
        }

        entry
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self.is_dirty, IsDirty::Yes)
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self.is_fresh, IsFresh::Yes)
    }

    pub fn is_spent(&self) -> bool {
        self.status == UtxoStatus::Spent
    }

    pub fn utxo(&self) -> Option<&Utxo> {
        match &self.status {
            UtxoStatus::Spent => None,
            UtxoStatus::Entry(utxo) => Some(utxo),
        }
    }

    pub fn take_utxo(self) -> Option<Utxo> {
        match self.status {
            UtxoStatus::Spent => None,
            UtxoStatus::Entry(utxo) => Some(utxo),
        }
    }
}
