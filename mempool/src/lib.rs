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

//! The memory pool: validation and admission of unconfirmed transactions,
//! indexed by id and by the outpoints they spend.

pub mod error;
mod feerate;
mod pool;
mod utxos_view;

pub use error::{Error, RejectCode, TxValidationError};
pub use feerate::FeeRate;
pub use pool::{check_transaction, Mempool, TxMempoolEntry};
pub use utxos_view::MempoolUtxosView;
