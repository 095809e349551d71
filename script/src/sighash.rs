// Copyright (c) 2021 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// 	http://spdx.org/licenses/MIT
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The signature-hash transform: which parts of a transaction a signature
//! commits to, selected by the hash-type byte carried at the end of every
//! signature.

use common::chain::{Script, Transaction, TxIn, TxOut};
use common::primitives::{hash256, Amount, H256};
use serialization::Encode;

use crate::instruction::{instructions, Instruction};
use crate::opcodes::all::OP_CODESEPARATOR;

/// The hash-type byte. The low bits select the output commitment
/// (ALL/NONE/SINGLE), the high bit restricts the input commitment to the
/// input being signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigHashType(u8);

impl SigHashType {
    pub const ALL: u8 = 0x01;
    pub const NONE: u8 = 0x02;
    pub const SINGLE: u8 = 0x03;
    pub const ANYONE_CAN_PAY: u8 = 0x80;

    pub const fn from_byte(byte: u8) -> Self {
        SigHashType(byte)
    }

    pub const fn all() -> Self {
        SigHashType(Self::ALL)
    }

    pub const fn to_byte(self) -> u8 {
        self.0
    }

    fn output_mode(self) -> u8 {
        self.0 & 0x1f
    }

    pub fn is_none(self) -> bool {
        self.output_mode() == Self::NONE
    }

    pub fn is_single(self) -> bool {
        self.output_mode() == Self::SINGLE
    }

    pub fn anyone_can_pay(self) -> bool {
        self.0 & Self::ANYONE_CAN_PAY != 0
    }

    /// Whether the byte is one of the defined types; anything else is
    /// rejected under strict-encoding verification.
    pub fn is_defined(self) -> bool {
        let base = self.0 & !Self::ANYONE_CAN_PAY;
        (Self::ALL..=Self::SINGLE).contains(&base)
    }
}

/// The digest signed for `input_index` of `tx` against `script_code` under
/// the given hash type.
///
/// One quirk is load-bearing: signing with SIGHASH_SINGLE when there is no
/// output at the input's index does not fail, it signs the constant digest
/// `1`. Both signer and verifier reproduce it, so such signatures validate;
/// producing anything else here is a consensus split.
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    sighash_type: SigHashType,
) -> H256 {
    assert!(input_index < tx.inputs().len(), "input index out of range");

    if sighash_type.is_single() && input_index >= tx.outputs().len() {
        let mut one = [0u8; 32];
        one[0] = 1;
        return H256(one);
    }

    let script_code = strip_code_separators(script_code);

    let inputs = if sighash_type.anyone_can_pay() {
        // Only the signed input is committed; others may be added freely.
        vec![commitment_input(tx, input_index, &script_code, input_index, sighash_type)]
    } else {
        (0..tx.inputs().len())
            .map(|i| commitment_input(tx, i, &script_code, input_index, sighash_type))
            .collect()
    };

    let outputs = if sighash_type.is_none() {
        // Outputs are not committed at all.
        vec![]
    } else if sighash_type.is_single() {
        // Outputs up to and including the signed index; earlier ones are
        // blanked to (-1, empty) so only their count and position commit.
        tx.outputs()
            .iter()
            .take(input_index + 1)
            .enumerate()
            .map(|(i, out)| {
                if i == input_index {
                    out.clone()
                } else {
                    TxOut::new(Amount::from_atoms(-1), Script::new())
                }
            })
            .collect()
    } else {
        tx.outputs().to_vec()
    };

    let commitment = Transaction::new(tx.version(), inputs, outputs, tx.lock_time());
    let mut data = commitment.encode();
    data.extend_from_slice(&(sighash_type.to_byte() as u32).to_le_bytes());
    hash256(&data)
}

fn commitment_input(
    tx: &Transaction,
    i: usize,
    script_code: &Script,
    signed_index: usize,
    sighash_type: SigHashType,
) -> TxIn {
    let input = &tx.inputs()[i];
    let script = if i == signed_index {
        script_code.clone()
    } else {
        Script::new()
    };
    // With NONE/SINGLE the other inputs' sequences are zeroed so they stay
    // replaceable without invalidating this signature.
    let sequence = if i != signed_index && (sighash_type.is_none() || sighash_type.is_single()) {
        0
    } else {
        input.sequence
    };
    TxIn::new(input.outpoint, script, sequence)
}

fn strip_code_separators(script: &Script) -> Script {
    let has_separator = instructions(script)
        .any(|ins| ins == Ok(Instruction::Op(OP_CODESEPARATOR)));
    if !has_separator {
        return script.clone();
    }
    let mut data = Vec::with_capacity(script.len());
    for ins in instructions(script) {
        match ins {
            Ok(Instruction::Op(OP_CODESEPARATOR)) => {}
            Ok(Instruction::Op(op)) => data.push(op.to_u8()),
            Ok(Instruction::PushBytes(bytes)) => {
                // Re-emit the push with its original minimal framing.
                push_bytes_raw(&mut data, bytes);
            }
            Err(_) => return script.clone(),
        }
    }
    Script::from_bytes(data)
}

fn push_bytes_raw(dest: &mut Vec<u8>, bytes: &[u8]) {
    match bytes.len() {
        len @ 0..=75 => dest.push(len as u8),
        len @ 76..=255 => {
            dest.push(0x4c);
            dest.push(len as u8);
        }
        len => {
            dest.push(0x4d);
            dest.extend_from_slice(&(len as u16).to_le_bytes());
        }
    }
    dest.extend_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::chain::{OutPoint, SEQUENCE_FINAL};
    use common::primitives::Id;

    fn two_in_two_out() -> Transaction {
        let mk_in = |n: u64| {
            TxIn::new(
                OutPoint::new(Id::new(H256::from_low_u64_be(n)), 0),
                Script::new(),
                SEQUENCE_FINAL,
            )
        };
        let mk_out = |v: i64| TxOut::new(Amount::from_atoms(v), Script::from_bytes(vec![0x51]));
        Transaction::new(1, vec![mk_in(1), mk_in(2)], vec![mk_out(10), mk_out(20)], 0)
    }

    #[test]
    fn single_out_of_range_digest_is_one() {
        let tx = two_in_two_out();
        let one_output = Transaction::new(
            1,
            tx.inputs().to_vec(),
            tx.outputs()[..1].to_vec(),
            0,
        );
        let digest = signature_hash(
            &one_output,
            1,
            &Script::from_bytes(vec![0x51]),
            SigHashType::from_byte(SigHashType::SINGLE),
        );
        let mut expected = [0u8; 32];
        expected[0] = 1;
        assert_eq!(digest, H256(expected));
    }

    #[test]
    fn all_commits_to_every_output() {
        let tx = two_in_two_out();
        let code = Script::from_bytes(vec![0x51]);
        let base = signature_hash(&tx, 0, &code, SigHashType::all());

        let mut changed = Transaction::new(
            tx.version(),
            tx.inputs().to_vec(),
            vec![tx.outputs()[0].clone(), TxOut::new(Amount::from_atoms(21), Script::new())],
            tx.lock_time(),
        );
        assert_ne!(
            signature_hash(&changed, 0, &code, SigHashType::all()),
            base
        );
        // And to the other inputs' sequence numbers.
        changed = tx.clone();
        changed.inputs_mut()[1].sequence = 0;
        assert_ne!(
            signature_hash(&changed, 0, &code, SigHashType::all()),
            base
        );
    }

    #[test]
    fn none_ignores_outputs_and_other_sequences() {
        let tx = two_in_two_out();
        let code = Script::from_bytes(vec![0x51]);
        let ty = SigHashType::from_byte(SigHashType::NONE);
        let base = signature_hash(&tx, 0, &code, ty);

        let mut changed = Transaction::new(
            tx.version(),
            tx.inputs().to_vec(),
            vec![],
            tx.lock_time(),
        );
        assert_eq!(signature_hash(&changed, 0, &code, ty), base);

        changed = tx.clone();
        changed.inputs_mut()[1].sequence = 0;
        assert_eq!(signature_hash(&changed, 0, &code, ty), base);
    }

    #[test]
    fn single_commits_only_to_matching_output() {
        let tx = two_in_two_out();
        let code = Script::from_bytes(vec![0x51]);
        let ty = SigHashType::from_byte(SigHashType::SINGLE);
        let base = signature_hash(&tx, 1, &code, ty);

        // Changing output 0's value does not invalidate input 1's signature.
        let mut outputs = tx.outputs().to_vec();
        outputs[0].value = Amount::from_atoms(999);
        let changed = Transaction::new(tx.version(), tx.inputs().to_vec(), outputs, 0);
        assert_eq!(signature_hash(&changed, 1, &code, ty), base);

        // Changing output 1 does.
        let mut outputs = tx.outputs().to_vec();
        outputs[1].value = Amount::from_atoms(999);
        let changed = Transaction::new(tx.version(), tx.inputs().to_vec(), outputs, 0);
        assert_ne!(signature_hash(&changed, 1, &code, ty), base);
    }

    #[test]
    fn anyone_can_pay_ignores_other_inputs() {
        let tx = two_in_two_out();
        let code = Script::from_bytes(vec![0x51]);
        let ty = SigHashType::from_byte(SigHashType::ALL | SigHashType::ANYONE_CAN_PAY);
        let base = signature_hash(&tx, 0, &code, ty);

        let one_input =
            Transaction::new(1, tx.inputs()[..1].to_vec(), tx.outputs().to_vec(), 0);
        assert_eq!(signature_hash(&one_input, 0, &code, ty), base);
    }

    #[test]
    fn hash_type_byte_is_committed() {
        let tx = two_in_two_out();
        let code = Script::from_bytes(vec![0x51]);
        assert_ne!(
            signature_hash(&tx, 0, &code, SigHashType::all()),
            signature_hash(&tx, 0, &code, SigHashType::from_byte(SigHashType::NONE)),
        );
    }

    #[test]
    fn defined_hash_types() {
        for byte in [0x01, 0x02, 0x03, 0x81, 0x82, 0x83] {
            assert!(SigHashType::from_byte(byte).is_defined(), "{byte:#x}");
        }
        for byte in [0x00, 0x04, 0x80, 0xff] {
            assert!(!SigHashType::from_byte(byte).is_defined(), "{byte:#x}");
        }
    }
}
