// Copyright (c) 2021-2022 RBB S.r.l
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

pub mod block;
pub mod config;
pub mod script;
pub mod transaction;

pub use block::{Block, BlockHeader};
pub use config::{ChainConfig, ChainType};
pub use script::Script;
pub use transaction::{
    OutPoint, Transaction, TxIn, TxOut, LOCKTIME_THRESHOLD, SEQUENCE_FINAL,
};
