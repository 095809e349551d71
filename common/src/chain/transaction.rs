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

use crate::chain::script::Script;
use crate::primitives::{hash256, Amount, BlockHeight, Id, Idable};
use serialization::{Decode, Encode, Error};

/// The sequence value that opts an input out of all timelock semantics.
pub const SEQUENCE_FINAL: u32 = 0xFFFF_FFFF;

/// Lock times below this are block heights, above it unix timestamps.
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

/// Reference to an output of a previous transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutPoint {
    pub txid: Id<Transaction>,
    pub index: u32,
}

impl OutPoint {
    pub const fn new(txid: Id<Transaction>, index: u32) -> Self {
        OutPoint { txid, index }
    }

    /// The outpoint a coinbase input carries: all-zero hash, max index.
    pub const fn null() -> Self {
        OutPoint {
            txid: Id::zero(),
            index: u32::MAX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.txid.is_zero() && self.index == u32::MAX
    }
}

impl Encode for OutPoint {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.txid.encode_to(dest);
        self.index.encode_to(dest);
    }

    fn encoded_size(&self) -> usize {
        36
    }
}

impl Decode for OutPoint {
    fn decode(input: &mut &[u8]) -> Result<Self, Error> {
        let txid = Id::decode(input)?;
        let index = u32::decode(input)?;
        Ok(OutPoint { txid, index })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    pub outpoint: OutPoint,
    pub script_sig: Script,
    pub sequence: u32,
}

impl TxIn {
    pub fn new(outpoint: OutPoint, script_sig: Script, sequence: u32) -> Self {
        TxIn {
            outpoint,
            script_sig,
            sequence,
        }
    }
}

impl Encode for TxIn {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.outpoint.encode_to(dest);
        self.script_sig.encode_to(dest);
        self.sequence.encode_to(dest);
    }
}

impl Decode for TxIn {
    fn decode(input: &mut &[u8]) -> Result<Self, Error> {
        let outpoint = OutPoint::decode(input)?;
        let script_sig = Script::decode(input)?;
        let sequence = u32::decode(input)?;
        Ok(TxIn {
            outpoint,
            script_sig,
            sequence,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    pub value: Amount,
    pub script_pubkey: Script,
}

impl TxOut {
    pub fn new(value: Amount, script_pubkey: Script) -> Self {
        TxOut {
            value,
            script_pubkey,
        }
    }
}

impl Encode for TxOut {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.value.encode_to(dest);
        self.script_pubkey.encode_to(dest);
    }
}

impl Decode for TxOut {
    fn decode(input: &mut &[u8]) -> Result<Self, Error> {
        let value = Amount::decode(input)?;
        let script_pubkey = Script::decode(input)?;
        Ok(TxOut {
            value,
            script_pubkey,
        })
    }
}

/// A transaction. The wire order is strictly version, inputs, outputs,
/// lock time; the id is the double-SHA256 of that encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    version: i32,
    inputs: Vec<TxIn>,
    outputs: Vec<TxOut>,
    lock_time: u32,
}

impl Transaction {
    pub const CURRENT_VERSION: i32 = 1;

    pub fn new(version: i32, inputs: Vec<TxIn>, outputs: Vec<TxOut>, lock_time: u32) -> Self {
        Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        }
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn inputs(&self) -> &[TxIn] {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut [TxIn] {
        &mut self.inputs
    }

    pub fn outputs(&self) -> &[TxOut] {
        &self.outputs
    }

    pub fn lock_time(&self) -> u32 {
        self.lock_time
    }

    /// A coinbase has exactly one input and that input's outpoint is null.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].outpoint.is_null()
    }

    pub fn encoded_size(&self) -> usize {
        Encode::encoded_size(self)
    }

    /// Whether the lock time permits inclusion at the given height/time.
    /// A nonzero lock time is ignored once every input opted out by using
    /// the final sequence value.
    pub fn is_final(&self, height: BlockHeight, time: u64) -> bool {
        if self.lock_time == 0 {
            return true;
        }
        let cutoff = if self.lock_time < LOCKTIME_THRESHOLD {
            height.into_int() as u64
        } else {
            time
        };
        if (self.lock_time as u64) < cutoff {
            return true;
        }
        self.inputs.iter().all(|input| input.sequence == SEQUENCE_FINAL)
    }
}

impl Idable for Transaction {
    type Tag = Transaction;

    fn get_id(&self) -> Id<Transaction> {
        Id::new(hash256(&self.encode()))
    }
}

impl Encode for Transaction {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.version.encode_to(dest);
        self.inputs.encode_to(dest);
        self.outputs.encode_to(dest);
        self.lock_time.encode_to(dest);
    }
}

impl Decode for Transaction {
    fn decode(input: &mut &[u8]) -> Result<Self, Error> {
        let version = i32::decode(input)?;
        let inputs = Vec::<TxIn>::decode(input)?;
        let outputs = Vec::<TxOut>::decode(input)?;
        let lock_time = u32::decode(input)?;
        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::H256;
    use serialization::{HexDecode, HexEncode};

    fn sample_tx() -> Transaction {
        let outpoint = OutPoint::new(
            Id::new(H256::from_low_u64_be(0x1234)),
            1,
        );
        Transaction::new(
            1,
            vec![TxIn::new(outpoint, Script::from_bytes(vec![0x51]), SEQUENCE_FINAL)],
            vec![TxOut::new(
                Amount::from_atoms(50_000),
                Script::from_bytes(vec![0x6a, 0x01, 0xaa]),
            )],
            0,
        )
    }

    #[test]
    fn wire_roundtrip() {
        let tx = sample_tx();
        let encoded = tx.encode();
        assert_eq!(Transaction::decode_all(&encoded), Ok(tx.clone()));
        assert_eq!(Transaction::hex_decode(tx.hex_encode()), Ok(tx));
    }

    #[test]
    fn txid_is_hash_of_encoding() {
        let tx = sample_tx();
        assert_eq!(tx.get_id().to_hash(), hash256(&tx.encode()));
        // Determinism.
        assert_eq!(tx.get_id(), tx.get_id());
    }

    #[test]
    fn txid_changes_with_content() {
        let tx = sample_tx();
        let mut other = tx.clone();
        other.inputs_mut()[0].sequence = 0;
        assert_ne!(tx.get_id(), other.get_id());
    }

    #[test]
    fn coinbase_detection() {
        let coinbase = Transaction::new(
            1,
            vec![TxIn::new(OutPoint::null(), Script::new(), SEQUENCE_FINAL)],
            vec![TxOut::new(Amount::from_atoms(50), Script::new())],
            0,
        );
        assert!(coinbase.is_coinbase());
        assert!(!sample_tx().is_coinbase());
    }

    #[test]
    fn finality_rules() {
        let mut tx = sample_tx();
        assert!(tx.is_final(BlockHeight::new(0), 0));

        tx.lock_time = 100;
        tx.inputs_mut()[0].sequence = 0;
        // Height lock not yet reached.
        assert!(!tx.is_final(BlockHeight::new(100), 0));
        assert!(tx.is_final(BlockHeight::new(101), 0));

        // Final sequence numbers disable the lock entirely.
        tx.inputs_mut()[0].sequence = SEQUENCE_FINAL;
        assert!(tx.is_final(BlockHeight::new(0), 0));

        // Time-based lock.
        tx.lock_time = LOCKTIME_THRESHOLD + 10;
        tx.inputs_mut()[0].sequence = 0;
        assert!(!tx.is_final(BlockHeight::new(1000), LOCKTIME_THRESHOLD as u64));
        assert!(tx.is_final(BlockHeight::new(1000), (LOCKTIME_THRESHOLD + 11) as u64));
    }

    #[test]
    fn truncated_decode_fails() {
        let tx = sample_tx();
        let mut encoded = tx.encode();
        encoded.pop();
        assert_eq!(
            Transaction::decode_all(&encoded),
            Err(serialization::Error::UnexpectedEof)
        );
    }
}
