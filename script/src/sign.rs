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

//! Producing signature scripts for the standard templates, and the
//! deterministic merge of two partial signature scripts (the co-signing
//! path of multisig spends).

use common::chain::{Script, Transaction};
use common::primitives::hash160;

use crate::builder::Builder;
use crate::instruction::{instructions, Instruction};
use crate::keystore::KeyStore;
use crate::opcodes::all::OP_0;
use crate::sighash::{signature_hash, SigHashType};
use crate::signature_checker::{SignatureChecker, TransactionSignatureChecker};
use crate::solver::{classify, ScriptTemplate};

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum SignError {
    #[error("No key for the requested output in the key store")]
    KeyNotFound,
    #[error("Redeem script not known to the key store")]
    RedeemScriptNotFound,
    #[error("Output script does not match a signable template")]
    UnsupportedScript,
}

/// Produces the signature script for `input_index` of `tx` spending an
/// output locked with `prev_script_pubkey`.
///
/// A multisig result may be partial (fewer signatures than required) when
/// the store only holds some of the keys; partial results are valid inputs
/// to [`combine_signatures`]. For pay-to-script-hash the redeem script must
/// be present in the store, and is itself signed and then appended.
pub fn sign_input(
    keystore: &impl KeyStore,
    prev_script_pubkey: &Script,
    tx: &Transaction,
    input_index: usize,
    sighash_type: SigHashType,
) -> Result<Script, SignError> {
    match classify(prev_script_pubkey) {
        ScriptTemplate::ScriptHash { hash } => {
            let redeem_script =
                keystore.get_script(&hash).ok_or(SignError::RedeemScriptNotFound)?;
            let inner = match classify(&redeem_script) {
                // A redeem script must not be another script hash; the
                // recursion would never terminate on chain either.
                ScriptTemplate::ScriptHash { .. } => Err(SignError::UnsupportedScript),
                template => sign_step(keystore, template, &redeem_script, tx, input_index, sighash_type),
            }?;
            let mut builder = Builder::new();
            for push in pushed_data(&inner).ok_or(SignError::UnsupportedScript)? {
                builder = builder.push_data(&push);
            }
            Ok(builder.push_data(redeem_script.as_bytes()).into_script())
        }
        template => sign_step(keystore, template, prev_script_pubkey, tx, input_index, sighash_type),
    }
}

fn sign_step(
    keystore: &impl KeyStore,
    template: ScriptTemplate,
    script_code: &Script,
    tx: &Transaction,
    input_index: usize,
    sighash_type: SigHashType,
) -> Result<Script, SignError> {
    let make_sig = |pubkey: &[u8]| -> Result<Vec<u8>, SignError> {
        let key = keystore.get_key(&hash160(pubkey)).ok_or(SignError::KeyNotFound)?;
        let digest = signature_hash(tx, input_index, script_code, sighash_type);
        let mut sig = key.sign_digest(&digest);
        sig.push(sighash_type.to_byte());
        Ok(sig)
    };

    match template {
        ScriptTemplate::PubKey { pubkey } => {
            let sig = make_sig(&pubkey)?;
            Ok(Builder::new().push_data(&sig).into_script())
        }
        ScriptTemplate::PubKeyHash { hash } => {
            let key = keystore.get_key(&hash).ok_or(SignError::KeyNotFound)?;
            let pubkey = key.public_key();
            let sig = make_sig(&pubkey)?;
            Ok(Builder::new().push_data(&sig).push_data(&pubkey).into_script())
        }
        ScriptTemplate::Multisig { required, pubkeys } => {
            // The off-by-one in OP_CHECKMULTISIG consumes one extra element.
            let mut builder = Builder::new().push_opcode(OP_0);
            let mut signed = 0;
            for pubkey in &pubkeys {
                if signed == required {
                    break;
                }
                if let Ok(sig) = make_sig(pubkey) {
                    builder = builder.push_data(&sig);
                    signed += 1;
                }
            }
            Ok(builder.into_script())
        }
        ScriptTemplate::ScriptHash { .. }
        | ScriptTemplate::NullData
        | ScriptTemplate::Nonstandard => Err(SignError::UnsupportedScript),
    }
}

/// Deterministically merges two signature scripts for the same input, each
/// of which may satisfy only part of the spending condition. Neither order
/// nor repetition of calls changes the outcome; offline co-signers can
/// exchange partial transactions in any order.
pub fn combine_signatures(
    prev_script_pubkey: &Script,
    tx: &Transaction,
    input_index: usize,
    script_sig_a: &Script,
    script_sig_b: &Script,
) -> Script {
    combine_for_template(
        classify(prev_script_pubkey),
        prev_script_pubkey,
        tx,
        input_index,
        script_sig_a,
        script_sig_b,
    )
}

fn combine_for_template(
    template: ScriptTemplate,
    script_code: &Script,
    tx: &Transaction,
    input_index: usize,
    script_sig_a: &Script,
    script_sig_b: &Script,
) -> Script {
    match template {
        ScriptTemplate::PubKey { .. } | ScriptTemplate::PubKeyHash { .. } => {
            // A single signature either is there or is not.
            let has_sig = |s: &Script| {
                pushed_data(s).is_some_and(|p| p.first().is_some_and(|first| !first.is_empty()))
            };
            if has_sig(script_sig_a) {
                script_sig_a.clone()
            } else {
                script_sig_b.clone()
            }
        }
        ScriptTemplate::ScriptHash { .. } => {
            let pushes_a = pushed_data(script_sig_a).unwrap_or_default();
            let pushes_b = pushed_data(script_sig_b).unwrap_or_default();
            match (pushes_a.split_last(), pushes_b.split_last()) {
                (None, _) => script_sig_b.clone(),
                (_, None) => script_sig_a.clone(),
                (Some((redeem, inner_a)), Some((_, inner_b))) => {
                    // The last push is the redeem script; combine what is
                    // underneath it against that script, then re-append it.
                    let redeem_script = Script::from_bytes(redeem.clone());
                    let combined = combine_for_template(
                        classify(&redeem_script),
                        &redeem_script,
                        tx,
                        input_index,
                        &script_from_pushes(inner_a),
                        &script_from_pushes(inner_b),
                    );
                    let mut builder = Builder::new();
                    for push in pushed_data(&combined).unwrap_or_default() {
                        builder = builder.push_data(&push);
                    }
                    builder.push_data(redeem).into_script()
                }
            }
        }
        ScriptTemplate::Multisig { required, pubkeys } => combine_multisig(
            script_code,
            tx,
            input_index,
            required,
            &pubkeys,
            script_sig_a,
            script_sig_b,
        ),
        ScriptTemplate::NullData | ScriptTemplate::Nonstandard => {
            if script_sig_a.is_empty() {
                script_sig_b.clone()
            } else {
                script_sig_a.clone()
            }
        }
    }
}

fn combine_multisig(
    script_code: &Script,
    tx: &Transaction,
    input_index: usize,
    required: usize,
    pubkeys: &[Vec<u8>],
    script_sig_a: &Script,
    script_sig_b: &Script,
) -> Script {
    let checker = TransactionSignatureChecker::new(tx, input_index);

    let mut candidates: Vec<Vec<u8>> = Vec::new();
    for script_sig in [script_sig_a, script_sig_b] {
        for push in pushed_data(script_sig).unwrap_or_default() {
            if !push.is_empty() && !candidates.contains(&push) {
                candidates.push(push);
            }
        }
    }

    // Every candidate signature is attributed to the first key it verifies
    // against; signatures then emit in key order, which is what the
    // interpreter's forward walk requires.
    let mut matched: Vec<Option<Vec<u8>>> = vec![None; pubkeys.len()];
    for sig in candidates {
        for (i, pubkey) in pubkeys.iter().enumerate() {
            if matched[i].is_some() {
                continue;
            }
            if checker.check_sig(&sig, pubkey, script_code) {
                matched[i] = Some(sig);
                break;
            }
        }
    }

    let mut builder = Builder::new().push_opcode(OP_0);
    let mut have = 0;
    for sig in matched.iter().flatten() {
        if have == required {
            break;
        }
        builder = builder.push_data(sig);
        have += 1;
    }
    // Pad to the required count so the script shape stays canonical even
    // while incomplete.
    for _ in have..required {
        builder = builder.push_opcode(OP_0);
    }
    builder.into_script()
}

/// The pushes of a push-only script, in order; `None` if anything else
/// appears. Small-number opcodes count as pushes of their minimal encoding.
fn pushed_data(script: &Script) -> Option<Vec<Vec<u8>>> {
    let mut pushes = Vec::new();
    for item in instructions(script) {
        match item.ok()? {
            Instruction::PushBytes(data) => pushes.push(data.to_vec()),
            Instruction::Op(op) => match op.decode_pushnum() {
                Some(n) => pushes.push(crate::num::ScriptNum::from(n).to_bytes()),
                None if op == OP_0 => pushes.push(vec![]),
                None => return None,
            },
        }
    }
    Some(pushes)
}

fn script_from_pushes(pushes: &[Vec<u8>]) -> Script {
    let mut builder = Builder::new();
    for push in pushes {
        builder = builder.push_data(push);
    }
    builder.into_script()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::verify_script;
    use crate::keystore::{MemoryKeyStore, PrivateKey};
    use crate::solver::{multisig_script, p2pkh_script, p2sh_script};
    use crate::VerifyFlags;
    use common::chain::{OutPoint, TxIn, TxOut, SEQUENCE_FINAL};
    use common::primitives::{Amount, Id, H256};
    use secp256k1::SecretKey;

    fn test_key(byte: u8) -> PrivateKey {
        PrivateKey::new(SecretKey::from_slice(&[byte; 32]).unwrap(), true)
    }

    fn spending_tx() -> Transaction {
        Transaction::new(
            1,
            vec![TxIn::new(
                OutPoint::new(Id::new(H256::from_low_u64_be(9)), 0),
                Script::new(),
                SEQUENCE_FINAL,
            )],
            vec![TxOut::new(Amount::from_atoms(40_000), Script::from_bytes(vec![0x51]))],
            0,
        )
    }

    fn verify(tx: &Transaction, prev: &Script) -> Result<(), crate::error::Error> {
        let checker = TransactionSignatureChecker::new(tx, 0);
        verify_script(
            &tx.inputs()[0].script_sig,
            prev,
            &crate::STANDARD_VERIFY_FLAGS,
            &checker,
        )
    }

    #[test]
    fn sign_and_verify_p2pkh() {
        let key = test_key(0x31);
        let prev = p2pkh_script(&key.pubkey_hash());
        let mut store = MemoryKeyStore::new();
        store.add_key(key);

        let mut tx = spending_tx();
        let script_sig =
            sign_input(&store, &prev, &tx, 0, SigHashType::all()).unwrap();
        tx.inputs_mut()[0].script_sig = script_sig;
        assert_eq!(verify(&tx, &prev), Ok(()));
    }

    #[test]
    fn sign_all_sighash_modes() {
        let key = test_key(0x32);
        let prev = p2pkh_script(&key.pubkey_hash());
        let mut store = MemoryKeyStore::new();
        store.add_key(key);

        for byte in [0x01, 0x02, 0x03, 0x81, 0x82, 0x83] {
            let mut tx = spending_tx();
            let script_sig =
                sign_input(&store, &prev, &tx, 0, SigHashType::from_byte(byte)).unwrap();
            tx.inputs_mut()[0].script_sig = script_sig;
            assert_eq!(verify(&tx, &prev), Ok(()), "sighash byte {byte:#04x}");
        }
    }

    #[test]
    fn missing_key_reported() {
        let key = test_key(0x33);
        let prev = p2pkh_script(&key.pubkey_hash());
        let store = MemoryKeyStore::new();
        assert_eq!(
            sign_input(&store, &prev, &spending_tx(), 0, SigHashType::all()),
            Err(SignError::KeyNotFound)
        );
    }

    #[test]
    fn data_outputs_are_unsignable() {
        let store = MemoryKeyStore::new();
        let prev = crate::solver::null_data_script(&[0x01]);
        assert_eq!(
            sign_input(&store, &prev, &spending_tx(), 0, SigHashType::all()),
            Err(SignError::UnsupportedScript)
        );
    }

    #[test]
    fn sign_and_verify_p2sh_wrapped_multisig() {
        let keys: Vec<_> = (0x41..0x44).map(test_key).collect();
        let pubkeys: Vec<_> = keys.iter().map(|k| k.public_key()).collect();
        let redeem = multisig_script(2, &pubkeys);
        let prev = p2sh_script(&redeem.script_hash());

        let mut store = MemoryKeyStore::new();
        store.add_redeem_script(redeem);
        keys.iter().take(2).for_each(|k| store.add_key(k.clone()));

        let mut tx = spending_tx();
        let script_sig = sign_input(&store, &prev, &tx, 0, SigHashType::all()).unwrap();
        tx.inputs_mut()[0].script_sig = script_sig;
        assert_eq!(verify(&tx, &prev), Ok(()));
    }

    #[test]
    fn combine_merges_partial_multisig() {
        let keys: Vec<_> = (0x51..0x54).map(test_key).collect();
        let pubkeys: Vec<_> = keys.iter().map(|k| k.public_key()).collect();
        let prev = multisig_script(2, &pubkeys);
        let tx = spending_tx();

        // Two co-signers, one key each.
        let partial = |idx: usize| {
            let mut store = MemoryKeyStore::new();
            store.add_key(keys[idx].clone());
            sign_input(&store, &prev, &tx, 0, SigHashType::all()).unwrap()
        };
        let sig_a = partial(0);
        let sig_b = partial(2);

        // Each partial alone does not verify.
        let mut attempt = tx.clone();
        attempt.inputs_mut()[0].script_sig = sig_a.clone();
        assert!(verify(&attempt, &prev).is_err());

        let combined = combine_signatures(&prev, &tx, 0, &sig_a, &sig_b);
        let mut complete = tx.clone();
        complete.inputs_mut()[0].script_sig = combined.clone();
        assert_eq!(verify(&complete, &prev), Ok(()));

        // Order of combination does not matter.
        assert_eq!(combined, combine_signatures(&prev, &tx, 0, &sig_b, &sig_a));
        // Combining is idempotent.
        assert_eq!(
            combined,
            combine_signatures(&prev, &tx, 0, &combined, &sig_a)
        );
    }

    #[test]
    fn combine_prefers_the_signed_side_for_p2pkh() {
        let key = test_key(0x61);
        let prev = p2pkh_script(&key.pubkey_hash());
        let mut store = MemoryKeyStore::new();
        store.add_key(key);
        let tx = spending_tx();

        let signed = sign_input(&store, &prev, &tx, 0, SigHashType::all()).unwrap();
        let empty = Script::new();
        assert_eq!(combine_signatures(&prev, &tx, 0, &signed, &empty), signed);
        assert_eq!(combine_signatures(&prev, &tx, 0, &empty, &signed), signed);
    }

    #[test]
    fn single_mode_with_missing_output_still_verifies() {
        // Sign input 1 of a transaction with only one output under SINGLE;
        // the digest degenerates to the constant 1 and verification agrees.
        let key = test_key(0x71);
        let prev = p2pkh_script(&key.pubkey_hash());
        let mut store = MemoryKeyStore::new();
        store.add_key(key);

        let mut tx = Transaction::new(
            1,
            vec![
                TxIn::new(
                    OutPoint::new(Id::new(H256::from_low_u64_be(1)), 0),
                    Script::new(),
                    SEQUENCE_FINAL,
                ),
                TxIn::new(
                    OutPoint::new(Id::new(H256::from_low_u64_be(2)), 0),
                    Script::new(),
                    SEQUENCE_FINAL,
                ),
            ],
            vec![TxOut::new(Amount::from_atoms(10), Script::from_bytes(vec![0x51]))],
            0,
        );

        let ty = SigHashType::from_byte(SigHashType::SINGLE);
        let script_sig = sign_input(&store, &prev, &tx, 1, ty).unwrap();
        tx.inputs_mut()[1].script_sig = script_sig;

        let checker = TransactionSignatureChecker::new(&tx, 1);
        assert_eq!(
            verify_script(
                &tx.inputs()[1].script_sig,
                &prev,
                &crate::STANDARD_VERIFY_FLAGS,
                &checker,
            ),
            Ok(())
        );
    }
}
