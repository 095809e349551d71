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

use std::num::NonZeroUsize;

use common::primitives::Amount;

use crate::error::TxValidationError;

/// A fee density in atoms per kilobyte of serialized transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FeeRate {
    amount_per_kb: Amount,
}

impl FeeRate {
    pub const fn new(amount_per_kb: Amount) -> Self {
        FeeRate { amount_per_kb }
    }

    pub fn from_total_tx_fee(
        total_tx_fee: Amount,
        tx_size: NonZeroUsize,
    ) -> Result<Self, TxValidationError> {
        let scaled = (total_tx_fee * 1000).ok_or(TxValidationError::FeeOverflow)?;
        let amount_per_kb =
            (scaled / usize::from(tx_size) as i64).expect("divisor is nonzero");
        Ok(FeeRate { amount_per_kb })
    }

    /// The fee this rate demands for a transaction of `size` bytes, rounded
    /// up to the next atom.
    pub fn compute_fee(&self, size: usize) -> Result<Amount, TxValidationError> {
        let scaled =
            (self.amount_per_kb * size as i64).ok_or(TxValidationError::FeeOverflow)?;
        let rounded = (scaled + Amount::from_atoms(999)).ok_or(TxValidationError::FeeOverflow)?;
        Ok((rounded / 1000).expect("divisor is nonzero"))
    }

    pub const fn amount_per_kb(&self) -> Amount {
        self.amount_per_kb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_from_fee_and_size() {
        let rate =
            FeeRate::from_total_tx_fee(Amount::from_atoms(500), NonZeroUsize::new(250).unwrap())
                .unwrap();
        assert_eq!(rate.amount_per_kb(), Amount::from_atoms(2000));
    }

    #[test]
    fn fee_rounds_up() {
        let rate = FeeRate::new(Amount::from_atoms(1000));
        assert_eq!(rate.compute_fee(1), Ok(Amount::from_atoms(1)));
        assert_eq!(rate.compute_fee(999), Ok(Amount::from_atoms(999)));
        assert_eq!(rate.compute_fee(1000), Ok(Amount::from_atoms(1000)));

        let rate = FeeRate::new(Amount::from_atoms(500));
        assert_eq!(rate.compute_fee(1001), Ok(Amount::from_atoms(501)));
    }

    #[test]
    fn zero_size_fee_is_zero() {
        let rate = FeeRate::new(Amount::from_atoms(12_345));
        assert_eq!(rate.compute_fee(0), Ok(Amount::ZERO));
    }

    #[test]
    fn overflow_is_reported() {
        let rate = FeeRate::new(Amount::from_atoms(i64::MAX));
        assert_eq!(rate.compute_fee(2), Err(TxValidationError::FeeOverflow));
        assert_eq!(
            FeeRate::from_total_tx_fee(
                Amount::from_atoms(i64::MAX),
                NonZeroUsize::new(1).unwrap()
            ),
            Err(TxValidationError::FeeOverflow)
        );
    }
}
