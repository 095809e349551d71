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
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use logging::log;

use common::chain::{config::ChainConfig, OutPoint, Transaction};
use common::primitives::{Amount, BlockHeight, Id, Idable};
use utxo::{Utxo, UtxosView};

use crate::error::{Error, TxValidationError};
use crate::feerate::FeeRate;
use crate::utxos_view::MempoolUtxosView;

/// A transaction resident in the pool, with the data eviction and fee
/// queries need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxMempoolEntry {
    tx: Transaction,
    fee: Amount,
    size: usize,
    arrival_time: Duration,
}

impl TxMempoolEntry {
    pub fn tx(&self) -> &Transaction {
        &self.tx
    }

    pub fn fee(&self) -> Amount {
        self.fee
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn arrival_time(&self) -> Duration {
        self.arrival_time
    }

    pub fn fee_rate(&self) -> FeeRate {
        NonZeroUsize::new(self.size)
            .and_then(|size| FeeRate::from_total_tx_fee(self.fee, size).ok())
            .unwrap_or(FeeRate::new(Amount::ZERO))
    }
}

/// Structural checks that need nothing but the transaction itself: input
/// and output presence, size, money ranges, input uniqueness. The first
/// stage of admission, also usable on its own.
pub fn check_transaction(
    config: &ChainConfig,
    tx: &Transaction,
) -> Result<(), TxValidationError> {
    if tx.inputs().is_empty() {
        return Err(TxValidationError::NoInputs);
    }
    if tx.outputs().is_empty() {
        return Err(TxValidationError::NoOutputs);
    }

    if tx.encoded_size() > config.max_block_size() {
        return Err(TxValidationError::ExceedsMaxBlockSize);
    }

    let mut total_out = Amount::ZERO;
    for output in tx.outputs() {
        if !output.value.is_valid_money() {
            return Err(TxValidationError::OutputValueOutOfRange);
        }
        total_out = (total_out + output.value).ok_or(TxValidationError::OutputTotalOutOfRange)?;
        if !total_out.is_valid_money() {
            return Err(TxValidationError::OutputTotalOutOfRange);
        }
    }

    let mut seen = std::collections::BTreeSet::new();
    for input in tx.inputs() {
        if !seen.insert(input.outpoint) {
            return Err(TxValidationError::DuplicateInputs);
        }
    }

    Ok(())
}

/// The transaction pool. Admission validates against the chain state view
/// handed in by the caller (who holds the chain lock); on success the
/// transaction is indexed by id and by every outpoint it spends, atomically
/// with respect to other admissions.
pub struct Mempool {
    config: Arc<ChainConfig>,
    txs_by_id: BTreeMap<Id<Transaction>, TxMempoolEntry>,
    spender_by_outpoint: BTreeMap<OutPoint, Id<Transaction>>,
}

impl Mempool {
    pub fn new(config: Arc<ChainConfig>) -> Self {
        Mempool {
            config,
            txs_by_id: BTreeMap::new(),
            spender_by_outpoint: BTreeMap::new(),
        }
    }

    pub fn contains(&self, txid: &Id<Transaction>) -> bool {
        self.txs_by_id.contains_key(txid)
    }

    pub fn get(&self, txid: &Id<Transaction>) -> Option<&Transaction> {
        self.txs_by_id.get(txid).map(TxMempoolEntry::tx)
    }

    pub fn entry(&self, txid: &Id<Transaction>) -> Option<&TxMempoolEntry> {
        self.txs_by_id.get(txid)
    }

    /// The pool transaction spending the given outpoint, if any.
    pub fn spender_of(&self, outpoint: &OutPoint) -> Option<Id<Transaction>> {
        self.spender_by_outpoint.get(outpoint).copied()
    }

    pub fn len(&self) -> usize {
        self.txs_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs_by_id.is_empty()
    }

    /// Removes a transaction and its spend-index entries.
    pub fn remove(&mut self, txid: &Id<Transaction>) -> Option<Transaction> {
        let entry = self.txs_by_id.remove(txid)?;
        for input in entry.tx.inputs() {
            self.spender_by_outpoint.remove(&input.outpoint);
        }
        Some(entry.tx)
    }

    /// Validates and admits a transaction. `chain_utxos` is the utxo state
    /// of the chain tip (without pool overlays; the pool supplies its own),
    /// `tip_height` the current chain height and `current_time` the wall
    /// clock used for finality. No index is touched unless every check
    /// passed.
    pub fn accept_transaction(
        &mut self,
        chain_utxos: &impl UtxosView,
        tip_height: BlockHeight,
        current_time: Duration,
        tx: Transaction,
        allow_high_fees: bool,
    ) -> Result<(), Error> {
        let (fee, size) =
            self.validate_transaction(chain_utxos, tip_height, current_time, &tx, allow_high_fees)?;

        let txid = tx.get_id();
        for input in tx.inputs() {
            self.spender_by_outpoint.insert(input.outpoint, txid);
        }
        let entry = TxMempoolEntry {
            tx,
            fee,
            size,
            arrival_time: current_time,
        };
        self.txs_by_id.insert(txid, entry);

        log::debug!("accepted transaction {txid} into the pool, fee {}", fee.into_atoms());
        Ok(())
    }

    fn validate_transaction(
        &self,
        chain_utxos: &impl UtxosView,
        tip_height: BlockHeight,
        current_time: Duration,
        tx: &Transaction,
        allow_high_fees: bool,
    ) -> Result<(Amount, usize), TxValidationError> {
        check_transaction(&self.config, tx)?;

        if tx.is_coinbase() {
            return Err(TxValidationError::Coinbase);
        }

        let txid = tx.get_id();
        if self.contains(&txid) {
            return Err(TxValidationError::AlreadyInMempool);
        }

        for input in tx.inputs() {
            if self.spender_by_outpoint.contains_key(&input.outpoint) {
                return Err(TxValidationError::ConflictingOutPoint {
                    outpoint: input.outpoint,
                });
            }
        }

        if !tx.is_final(tip_height.next_height(), current_time.as_secs()) {
            return Err(TxValidationError::NonFinal);
        }

        // Resolve every input through the pool-aware view and collect the
        // coins for the fee and script stages.
        let view = MempoolUtxosView::new(self, chain_utxos);
        let mut input_coins: Vec<Utxo> = Vec::with_capacity(tx.inputs().len());
        for input in tx.inputs() {
            let coin = view.utxo(&input.outpoint).ok_or(
                TxValidationError::MissingOutPoint {
                    outpoint: input.outpoint,
                },
            )?;
            if coin.is_coinbase() {
                let born = coin
                    .source()
                    .blockchain_height()
                    .unwrap_or(tip_height);
                let mature_at = born.checked_add(self.config.coinbase_maturity());
                if mature_at.map_or(true, |h| tip_height < h) {
                    return Err(TxValidationError::ImmatureCoinbaseSpend {
                        outpoint: input.outpoint,
                    });
                }
            }
            input_coins.push(coin);
        }

        let total_in: Amount = input_coins
            .iter()
            .map(|coin| coin.output().value)
            .sum::<Option<Amount>>()
            .ok_or(TxValidationError::InputValuesOverflow)?;
        let total_out: Amount = tx
            .outputs()
            .iter()
            .map(|output| output.value)
            .sum::<Option<Amount>>()
            .expect("checked in check_transaction");
        let fee = (total_in - total_out).ok_or(TxValidationError::InputsBelowOutputs)?;
        if fee.is_negative() {
            return Err(TxValidationError::InputsBelowOutputs);
        }

        let size = tx.encoded_size();
        let relay_floor = FeeRate::new(self.config.min_relay_fee_rate_per_kb())
            .compute_fee(size)?;
        if fee < relay_floor {
            return Err(TxValidationError::InsufficientFeesToRelay {
                tx_fee: fee.into_atoms(),
                minimum_fee: relay_floor.into_atoms(),
            });
        }
        if !allow_high_fees {
            let sanity_bound = (relay_floor * self.config.absurd_fee_multiplier())
                .ok_or(TxValidationError::FeeOverflow)?;
            if fee > sanity_bound {
                return Err(TxValidationError::AbsurdlyHighFee {
                    tx_fee: fee.into_atoms(),
                    sanity_bound: sanity_bound.into_atoms(),
                });
            }
        }

        // Scripts run last; everything cheaper has already passed.
        for (input_index, (input, coin)) in
            tx.inputs().iter().zip(input_coins.iter()).enumerate()
        {
            let checker = script::signature_checker::TransactionSignatureChecker::new(tx, input_index);
            script::verify_script(
                &input.script_sig,
                &coin.output().script_pubkey,
                &script::STANDARD_VERIFY_FLAGS,
                &checker,
            )
            .map_err(|error| TxValidationError::ScriptVerificationFailed {
                txid,
                input_index,
                error,
            })?;
        }

        Ok((fee, size))
    }
}
