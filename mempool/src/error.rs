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

use common::chain::{OutPoint, Transaction};
use common::primitives::Id;
use thiserror::Error;

/// The numeric class of a rejection, exposed verbatim to peers and RPC
/// callers alongside the reason text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RejectCode {
    Malformed = 0x01,
    Invalid = 0x10,
    Duplicate = 0x12,
    NonStandard = 0x40,
    InsufficientFee = 0x42,
}

impl RejectCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    TxValidation(#[from] TxValidationError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TxValidationError {
    #[error("Transaction has no inputs")]
    NoInputs,
    #[error("Transaction has no outputs")]
    NoOutputs,
    #[error("Transaction exceeds the maximum block size")]
    ExceedsMaxBlockSize,
    #[error("Transaction has duplicate inputs")]
    DuplicateInputs,
    #[error("Output value out of the valid money range")]
    OutputValueOutOfRange,
    #[error("Sum of output values overflows the valid money range")]
    OutputTotalOutOfRange,
    #[error("Coinbase transactions cannot enter the pool")]
    Coinbase,
    #[error("Transaction is already in the pool")]
    AlreadyInMempool,
    #[error("Input already spent by a pool transaction: {outpoint:?}")]
    ConflictingOutPoint { outpoint: OutPoint },
    #[error("Missing or spent previous output: {outpoint:?}")]
    MissingOutPoint { outpoint: OutPoint },
    #[error("Premature spend of a coinbase output: {outpoint:?}")]
    ImmatureCoinbaseSpend { outpoint: OutPoint },
    #[error("Transaction is not final yet")]
    NonFinal,
    #[error("Sum of input values overflows")]
    InputValuesOverflow,
    #[error("Sum of inputs is below the sum of outputs")]
    InputsBelowOutputs,
    #[error("Fee {tx_fee} below the relay floor {minimum_fee}")]
    InsufficientFeesToRelay { tx_fee: i64, minimum_fee: i64 },
    #[error("Absurdly high fee {tx_fee}, above the sanity bound {sanity_bound}")]
    AbsurdlyHighFee { tx_fee: i64, sanity_bound: i64 },
    #[error("Script verification failed on input {input_index} of {txid:?}: {error}")]
    ScriptVerificationFailed {
        txid: Id<Transaction>,
        input_index: usize,
        error: script::Error,
    },
    #[error("Fee computation overflow")]
    FeeOverflow,
}

impl TxValidationError {
    /// Whether the transaction failed only because its inputs are not
    /// currently known; callers report this case separately since such a
    /// transaction may become valid once its parents arrive.
    pub fn is_missing_inputs(&self) -> bool {
        matches!(self, TxValidationError::MissingOutPoint { .. })
    }

    pub fn reject_code(&self) -> RejectCode {
        use TxValidationError::*;
        match self {
            NoInputs | NoOutputs | ExceedsMaxBlockSize | DuplicateInputs
            | OutputValueOutOfRange | OutputTotalOutOfRange | InputValuesOverflow
            | InputsBelowOutputs | FeeOverflow => RejectCode::Malformed,
            Coinbase | MissingOutPoint { .. } | ImmatureCoinbaseSpend { .. } | NonFinal => {
                RejectCode::Invalid
            }
            AlreadyInMempool | ConflictingOutPoint { .. } => RejectCode::Duplicate,
            ScriptVerificationFailed { .. } => RejectCode::NonStandard,
            InsufficientFeesToRelay { .. } | AbsurdlyHighFee { .. } => {
                RejectCode::InsufficientFee
            }
        }
    }
}
