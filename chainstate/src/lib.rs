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

//! The active-chain view the transaction path consumes: block lookup by
//! hash and height, the chain tip, and the optional transaction index.
//! Block storage itself lives elsewhere; this crate only defines the read
//! interface plus an owned in-memory implementation.

mod store;
mod tx_index;

pub use store::{BlockIndexData, ChainStore, InMemoryChainStore};
pub use tx_index::{TxIndex, TxPosition};
