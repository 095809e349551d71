// Copyright (c) 2022-2023 RBB S.r.l
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

//! The raw-transaction commands: build, decode, look up, prove, sign and
//! submit transactions. Handlers validate their JSON arguments explicitly
//! before touching any state, and follow the `chain` → `mempool` → `wallet`
//! lock order throughout.

use std::collections::BTreeSet;

use serde_json::{json, Value};

use chainstate::{ChainStore, TxPosition};
use common::address::{decode_address, encode_address, Destination};
use common::chain::{
    Block, OutPoint, Script, Transaction, TxIn, TxOut, SEQUENCE_FINAL,
};
use common::primitives::{Amount, BlockHeight, Id, Idable};
use merkletree::MerkleBlock;
use script::keystore::{MemoryKeyStore, PrivateKey};
use script::sighash::SigHashType;
use script::signature_checker::TransactionSignatureChecker;
use serialization::{Decode, HexDecode, HexEncode};
use utxo::{DummyUtxosView, Utxo, UtxosCache, UtxosView};

use crate::error::Error;
use crate::node::{Node, NodeState};
use crate::types::{
    ScriptPubKeyJson, ScriptSigJson, SignRawTransactionResult, TxInErrorJson, TxJson, VinJson,
    VoutJson,
};

type Result<T> = std::result::Result<T, Error>;

/// `createrawtransaction inputs outputs (locktime)`
///
/// Builds an unsigned transaction spending `inputs` into `outputs`. Input
/// and output order is preserved exactly as given. A nonzero locktime sets
/// every input's sequence to the locktime-activating value. The `"data"`
/// output key encodes a zero-value data-carrier output.
pub fn create_raw_transaction(
    node: &Node,
    inputs: &Value,
    outputs: &Value,
    locktime: Option<i64>,
) -> Result<String> {
    let inputs = inputs
        .as_array()
        .ok_or_else(|| Error::InvalidParameter("Invalid parameter, arguments 1 and 2 must be non-null".into()))?;
    let outputs = outputs
        .as_object()
        .ok_or_else(|| Error::InvalidParameter("Invalid parameter, arguments 1 and 2 must be non-null".into()))?;

    let lock_time = match locktime {
        None => 0,
        Some(n) if (0..=u32::MAX as i64).contains(&n) => n as u32,
        Some(_) => {
            return Err(Error::InvalidParameter(
                "Invalid parameter, locktime out of range".into(),
            ))
        }
    };

    let mut tx_inputs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let object = input
            .as_object()
            .ok_or_else(|| Error::InvalidParameter("Invalid parameter, expected object".into()))?;
        let txid = parse_txid(object.get("txid").unwrap_or(&Value::Null), "txid")?;
        let vout = object
            .get("vout")
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::InvalidParameter("Invalid parameter, missing vout key".into()))?;
        if vout < 0 {
            return Err(Error::InvalidParameter(
                "Invalid parameter, vout must be positive".into(),
            ));
        }
        // An index above u32 can never name an output; a plain cast would
        // wrap it onto a different one.
        if vout > i64::from(u32::MAX) {
            return Err(Error::InvalidParameter(
                "Invalid parameter, vout out of range".into(),
            ));
        }

        // A nonzero locktime only takes effect on non-final sequences.
        let sequence = if lock_time != 0 {
            SEQUENCE_FINAL - 1
        } else {
            SEQUENCE_FINAL
        };
        tx_inputs.push(TxIn::new(
            OutPoint::new(txid, vout as u32),
            Script::new(),
            sequence,
        ));
    }

    let mut seen_addresses = BTreeSet::new();
    let mut tx_outputs = Vec::with_capacity(outputs.len());
    for (key, value) in outputs {
        if key == "data" {
            let data = parse_hex_field(value, "Data")?;
            tx_outputs.push(TxOut::new(Amount::ZERO, script::solver::null_data_script(&data)));
        } else {
            let destination = decode_address(node.config(), key)
                .map_err(|_| Error::InvalidAddressOrKey(format!("Invalid address: {key}")))?;
            if !seen_addresses.insert(key.clone()) {
                return Err(Error::InvalidParameter(format!(
                    "Invalid parameter, duplicated address: {key}"
                )));
            }
            let amount = amount_from_value(value)?;
            tx_outputs.push(TxOut::new(amount, script::solver::script_for_destination(&destination)));
        }
    }

    let tx = Transaction::new(Transaction::CURRENT_VERSION, tx_inputs, tx_outputs, lock_time);
    Ok(tx.hex_encode())
}

/// `decoderawtransaction hexstring`
///
/// Returns the structured form of a serialized transaction.
pub fn decode_raw_transaction(node: &Node, hex_tx: &str) -> Result<Value> {
    let tx = Transaction::hex_decode(hex_tx)
        .map_err(|_| Error::Deserialization("TX decode failed".into()))?;
    let tx_json = tx_to_json(node, &tx);
    serde_json::to_value(tx_json).map_err(|e| Error::Internal(e.to_string()))
}

/// `decodescript hexstring`
///
/// Decodes an output script: disassembly, template classification,
/// destinations, and the address the script would have when wrapped as
/// pay-to-script-hash. The empty script is valid and classifies as
/// nonstandard.
pub fn decode_script(node: &Node, hex_script: &str) -> Result<Value> {
    let bytes = hex::decode(hex_script)
        .map_err(|_| Error::InvalidParameter("argument must be hexadecimal string".into()))?;
    let script = Script::from_bytes(bytes);

    let mut object = serde_json::to_value(script_pubkey_json(node, &script, false))
        .map_err(|e| Error::Internal(e.to_string()))?;
    let p2sh = encode_address(node.config(), &Destination::ScriptHash(script.script_hash()));
    if let Value::Object(map) = &mut object {
        map.insert("p2sh".into(), Value::String(p2sh));
    }
    Ok(object)
}

/// `getrawtransaction txid (verbose)`
///
/// Returns a transaction by id, serialized or structured. Without the
/// transaction index this only succeeds for mempool transactions and for
/// transactions that still have an unspent output in the utxo set (whose
/// coin pins the containing block); anything else reports not-found even
/// though it may exist on the chain.
pub fn get_raw_transaction(node: &Node, txid_hex: &str, verbose: bool) -> Result<Value> {
    let txid: Id<Transaction> = parse_txid(&Value::String(txid_hex.into()), "parameter 1")?;

    let state = node.chain_read();
    let found = {
        let pool = node.mempool_lock();
        pool.get(&txid).cloned().map(|tx| (tx, None))
    }
    .or_else(|| {
        lookup_chain_transaction(&state, &txid).map(|(tx, block)| (tx, Some(block)))
    });

    let Some((tx, containing_block)) = found else {
        return Err(Error::InvalidAddressOrKey(
            "No information available about transaction".into(),
        ));
    };

    if !verbose {
        return Ok(Value::String(tx.hex_encode()));
    }

    let block_info = containing_block.map(|block_id| {
        let confirmations = state
            .chain
            .block_index_for(&block_id)
            .filter(|data| state.chain.contains_in_active_chain(&data.block_id))
            .map(|data| {
                let tip = state.chain.active_height().into_int();
                (tip - data.height.into_int() + 1, data.time)
            });
        (block_id, confirmations)
    });

    let mut tx_json = tx_to_json(node, &tx);
    tx_json.hex = Some(tx.hex_encode());
    if let Some((block_id, confirmations)) = block_info {
        tx_json.blockhash = Some(block_id.to_rpc_string());
        match confirmations {
            Some((count, time)) => {
                tx_json.confirmations = Some(count);
                tx_json.time = Some(time);
                tx_json.blocktime = Some(time);
            }
            None => tx_json.confirmations = Some(0),
        }
    }
    serde_json::to_value(tx_json).map_err(|e| Error::Internal(e.to_string()))
}

/// `gettxoutproof ["txid",...] (blockhash)`
///
/// Produces a hex-encoded proof that the given transactions are included
/// in one block. Without an explicit block hash the block is located via an
/// unspent output of one of the transactions, then via the transaction
/// index if enabled.
pub fn get_tx_out_proof(node: &Node, txids: &Value, block_hash: Option<&str>) -> Result<String> {
    let txid_values = txids
        .as_array()
        .ok_or_else(|| Error::InvalidParameter("Expected array of txids".into()))?;

    let mut txid_set: BTreeSet<Id<Transaction>> = BTreeSet::new();
    let mut last_txid = None;
    for value in txid_values {
        let txid = parse_txid(value, "txid")?;
        if !txid_set.insert(txid) {
            return Err(Error::InvalidParameter(format!(
                "Invalid parameter, duplicated txid: {txid}"
            )));
        }
        last_txid = Some(txid);
    }
    let last_txid = last_txid
        .ok_or_else(|| Error::InvalidParameter("Parameter 'txids' cannot be empty".into()))?;

    let state = node.chain_read();

    let block_id: Id<Block> = match block_hash {
        Some(hash) => {
            let block_id = Id::new(
                common::primitives::H256::from_rpc_str(hash)
                    .ok_or_else(|| Error::InvalidParameter(format!("Invalid block hash: {hash}")))?,
            );
            if state.chain.block_index_for(&block_id).is_none() {
                return Err(Error::InvalidAddressOrKey("Block not found".into()));
            }
            block_id
        }
        None => locate_block_of_transaction(&state, &last_txid)?,
    };

    let block = state
        .chain
        .read_block(&block_id)
        .ok_or_else(|| Error::Internal("Can't read block from disk".into()))?;

    let found = block
        .transactions
        .iter()
        .filter(|tx| txid_set.contains(&tx.get_id()))
        .count();
    if found != txid_set.len() {
        return Err(Error::InvalidAddressOrKey(
            "(Not all) transactions not found in specified block".into(),
        ));
    }

    Ok(MerkleBlock::from_block(&block, &txid_set).hex_encode())
}

/// `verifytxoutproof proof`
///
/// Verifies an inclusion proof and returns the txids it commits to. A
/// structurally valid proof whose content does not check out yields an
/// empty array, not an error; a proof for a block off the active chain is
/// an error.
pub fn verify_tx_out_proof(node: &Node, proof_hex: &str) -> Result<Value> {
    let merkle_block = MerkleBlock::hex_decode(proof_hex)
        .map_err(|_| Error::Deserialization("Proof decode failed".into()))?;

    let matches = match merkle_block.extract_matches() {
        Ok(matches) => matches,
        Err(_) => return Ok(json!([])),
    };

    let state = node.chain_read();
    let block_id = merkle_block.header.get_id();
    if !state.chain.contains_in_active_chain(&block_id) {
        return Err(Error::InvalidAddressOrKey("Block not found in chain".into()));
    }

    let txids: Vec<String> = matches.iter().map(Id::to_rpc_string).collect();
    Ok(json!(txids))
}

/// `signrawtransaction hexstring (prevtxs) (privkeys) (sighashtype)`
///
/// Signs every input it can and reports per-input failures in `errors`
/// instead of failing the command; the returned hex is usable either way,
/// which is what makes offline co-signing rounds possible. The input hex
/// may concatenate several variants of the transaction whose signatures
/// are merged.
pub fn sign_raw_transaction(
    node: &Node,
    hex_tx: &str,
    prev_txs: Option<&Value>,
    priv_keys: Option<&Value>,
    sighash_type: Option<&str>,
) -> Result<Value> {
    let tx_bytes = hex::decode(hex_tx)
        .map_err(|_| Error::Deserialization("TX decode failed".into()))?;
    let mut variants: Vec<Transaction> = Vec::new();
    let mut rest = tx_bytes.as_slice();
    while !rest.is_empty() {
        let tx = Transaction::decode(&mut rest)
            .map_err(|_| Error::Deserialization("TX decode failed".into()))?;
        variants.push(tx);
    }
    let mut merged = variants
        .first()
        .cloned()
        .ok_or_else(|| Error::Deserialization("Missing transaction".into()))?;

    // A request-local view over the chain-plus-mempool coins. Populated
    // while the locks are held, used and mutated afterwards; everything
    // written here dies with this call.
    let mut view = UtxosCache::new(DummyUtxosView);
    {
        let state = node.chain_read();
        let pool = node.mempool_lock();
        let backing = mempool::MempoolUtxosView::new(&pool, &state.coins);
        for input in merged.inputs() {
            if let Some(coin) = backing.utxo(&input.outpoint) {
                view.add_utxo(&input.outpoint, coin, true)
                    .map_err(|e| Error::Internal(e.to_string()))?;
            }
        }
    }

    // The key store: either transient from supplied keys, or the wallet's.
    let keys_given = priv_keys.is_some_and(|keys| !keys.is_null());
    let mut keystore = if keys_given {
        let keys = priv_keys
            .and_then(Value::as_array)
            .ok_or_else(|| Error::InvalidParameter("Expected array of keys".into()))?;
        let mut store = MemoryKeyStore::new();
        for key in keys {
            let wif = key
                .as_str()
                .ok_or_else(|| Error::InvalidAddressOrKey("Invalid private key".into()))?;
            let key = PrivateKey::from_wif(node.config(), wif)
                .map_err(|_| Error::InvalidAddressOrKey("Invalid private key".into()))?;
            store.add_key(key);
        }
        store
    } else {
        node.wallet_lock().clone()
    };

    // Previous outputs supplied with the call are overlaid onto the view.
    // The value is unknown and irrelevant here; signing never looks at it.
    if let Some(prev_txs) = prev_txs.filter(|v| !v.is_null()) {
        let entries = prev_txs
            .as_array()
            .ok_or_else(|| Error::Deserialization(
                "expected object with {\"txid'\",\"vout\",\"scriptPubKey\"}".into(),
            ))?;
        for entry in entries {
            let object = entry.as_object().ok_or_else(|| {
                Error::Deserialization(
                    "expected object with {\"txid'\",\"vout\",\"scriptPubKey\"}".into(),
                )
            })?;
            let txid = parse_txid(object.get("txid").unwrap_or(&Value::Null), "txid")?;
            let vout = object
                .get("vout")
                .and_then(Value::as_i64)
                .ok_or_else(|| Error::Deserialization("vout must be positive".into()))?;
            if vout < 0 {
                return Err(Error::Deserialization("vout must be positive".into()));
            }
            if vout > i64::from(u32::MAX) {
                return Err(Error::Deserialization("vout out of range".into()));
            }
            let script_bytes =
                parse_hex_field(object.get("scriptPubKey").unwrap_or(&Value::Null), "scriptPubKey")?;
            let script_pubkey = Script::from_bytes(script_bytes);

            let outpoint = OutPoint::new(txid, vout as u32);
            if let Some(existing) = view.utxo(&outpoint) {
                if existing.output().script_pubkey != script_pubkey {
                    return Err(Error::Deserialization(format!(
                        "Previous output scriptPubKey mismatch:\n{}\nvs:\n{}",
                        script::asm::to_asm_string(&existing.output().script_pubkey),
                        script::asm::to_asm_string(&script_pubkey),
                    )));
                }
            }
            let hint = Utxo::new_for_mempool(TxOut::new(Amount::ZERO, script_pubkey.clone()));
            view.add_utxo(&outpoint, hint, true)
                .map_err(|e| Error::Internal(e.to_string()))?;

            // A redeem script supplied alongside keys feeds the transient
            // store so pay-to-script-hash inputs become signable.
            if keys_given && script_pubkey.is_pay_to_script_hash() {
                if let Some(redeem) = object.get("redeemScript") {
                    let redeem_bytes = parse_hex_field(redeem, "redeemScript")?;
                    keystore.add_redeem_script(Script::from_bytes(redeem_bytes));
                }
            }
        }
    }

    let sighash = match sighash_type {
        None => SigHashType::all(),
        Some(name) => parse_sighash_name(name)?,
    };

    let mut errors: Vec<TxInErrorJson> = Vec::new();
    for i in 0..merged.inputs().len() {
        let outpoint = merged.inputs()[i].outpoint;
        let Some(coin) = view.utxo(&outpoint) else {
            push_input_error(&mut errors, &merged.inputs()[i], "Input not found or already spent");
            continue;
        };
        let prev_script = coin.output().script_pubkey.clone();

        merged.inputs_mut()[i].script_sig = Script::new();

        // SIGHASH_SINGLE with no matching output is only signed over the
        // degenerate digest by explicit request; the RPC skips it.
        if !(sighash.is_single() && i >= merged.outputs().len()) {
            if let Ok(script_sig) =
                script::sign::sign_input(&keystore, &prev_script, &merged, i, sighash)
            {
                merged.inputs_mut()[i].script_sig = script_sig;
            }
        }

        // Merge whatever signatures the other variants carry for this input.
        for variant in &variants {
            if let Some(other) = variant.inputs().get(i) {
                let combined = script::sign::combine_signatures(
                    &prev_script,
                    &merged,
                    i,
                    &merged.inputs()[i].script_sig,
                    &other.script_sig,
                );
                merged.inputs_mut()[i].script_sig = combined;
            }
        }

        let checker = TransactionSignatureChecker::new(&merged, i);
        if let Err(e) = script::verify_script(
            &merged.inputs()[i].script_sig,
            &prev_script,
            &script::STANDARD_VERIFY_FLAGS,
            &checker,
        ) {
            push_input_error(&mut errors, &merged.inputs()[i], &e.to_string());
        }
    }

    let result = SignRawTransactionResult {
        hex: merged.hex_encode(),
        complete: errors.is_empty(),
        errors,
    };
    serde_json::to_value(result).map_err(|e| Error::Internal(e.to_string()))
}

/// `sendrawtransaction hexstring (allowhighfees)`
///
/// Submits a transaction to the pool and schedules relay. Re-submitting a
/// transaction already pooled returns its id without error; one already
/// included in an active-chain block is an error.
pub fn send_raw_transaction(node: &Node, hex_tx: &str, allow_high_fees: bool) -> Result<String> {
    let tx = Transaction::hex_decode(hex_tx)
        .map_err(|_| Error::Deserialization("TX decode failed".into()))?;
    let txid = tx.get_id();

    {
        let state = node.chain_read();
        let mut pool = node.mempool_lock();

        let have_mempool = pool.contains(&txid);
        let have_chain = state
            .coins
            .iter()
            .any(|(outpoint, coin)| outpoint.txid == txid && !coin.source().is_mempool());

        if !have_mempool && !have_chain {
            pool.accept_transaction(
                &state.coins,
                state.chain.active_height(),
                node.current_time(),
                tx,
                allow_high_fees,
            )
            .map_err(|err| match err {
                mempool::Error::TxValidation(e) if e.is_missing_inputs() => {
                    Error::Transaction("Missing inputs".into())
                }
                mempool::Error::TxValidation(e) => {
                    Error::TransactionRejected(format!("{}: {}", e.reject_code().as_u8(), e))
                }
            })?;
        } else if have_chain {
            return Err(Error::TransactionAlreadyInChain);
        }
    }

    // Relay happens outside every lock; its failure is the network's
    // problem, not the submitter's.
    node.network().relay(&txid);

    Ok(txid.to_rpc_string())
}

fn parse_txid(value: &Value, name: &str) -> Result<Id<Transaction>> {
    let hex_str = value
        .as_str()
        .ok_or_else(|| Error::InvalidParameter(format!("Invalid {name}, must be a string")))?;
    Id::from_rpc_str(hex_str).ok_or_else(|| {
        Error::InvalidParameter(format!(
            "Invalid {name}, must be of length 64 (not {})",
            hex_str.len()
        ))
    })
}

fn parse_hex_field(value: &Value, name: &str) -> Result<Vec<u8>> {
    let hex_str = value
        .as_str()
        .ok_or_else(|| Error::InvalidParameter(format!("Invalid {name}, must be a string")))?;
    hex::decode(hex_str)
        .map_err(|_| Error::InvalidParameter(format!("Invalid {name}, must be hexadecimal")))
}

/// Parses a monetary JSON value (number or numeric string) into atoms,
/// rejecting negatives and out-of-range amounts.
fn amount_from_value(value: &Value) -> Result<Amount> {
    let text = match value {
        Value::Number(n) => format!("{:.8}", n.as_f64().unwrap_or(-1.0)),
        Value::String(s) => s.clone(),
        _ => return Err(Error::InvalidParameter("Invalid amount".into())),
    };
    let amount = Amount::from_fixed_decimal_str(&text)
        .ok_or_else(|| Error::InvalidParameter("Invalid amount".into()))?;
    if !amount.is_valid_money() {
        return Err(Error::InvalidParameter("Amount out of range".into()));
    }
    Ok(amount)
}

fn parse_sighash_name(name: &str) -> Result<SigHashType> {
    let byte = match name {
        "ALL" => SigHashType::ALL,
        "NONE" => SigHashType::NONE,
        "SINGLE" => SigHashType::SINGLE,
        "ALL|ANYONECANPAY" => SigHashType::ALL | SigHashType::ANYONE_CAN_PAY,
        "NONE|ANYONECANPAY" => SigHashType::NONE | SigHashType::ANYONE_CAN_PAY,
        "SINGLE|ANYONECANPAY" => SigHashType::SINGLE | SigHashType::ANYONE_CAN_PAY,
        _ => return Err(Error::InvalidParameter("Invalid sighash param".into())),
    };
    Ok(SigHashType::from_byte(byte))
}

fn push_input_error(errors: &mut Vec<TxInErrorJson>, input: &TxIn, message: &str) {
    errors.push(TxInErrorJson {
        txid: input.outpoint.txid.to_rpc_string(),
        vout: input.outpoint.index,
        script_sig: hex::encode(input.script_sig.as_bytes()),
        sequence: input.sequence,
        error: message.into(),
    });
}

/// Finds a transaction on the chain: through the tx-index when enabled,
/// else through any of its still-unspent outputs.
fn lookup_chain_transaction(
    state: &NodeState,
    txid: &Id<Transaction>,
) -> Option<(Transaction, Id<Block>)> {
    if let Some(tx_index) = &state.tx_index {
        if let Some(TxPosition { block_id, index }) = tx_index.position(txid) {
            let block = state.chain.read_block(&block_id)?;
            return block.transactions.get(index).cloned().map(|tx| (tx, block_id));
        }
    }

    let height = coin_height_of_transaction(state, txid)?;
    let block_id = state.chain.block_id_at_height(height)?;
    let block = state.chain.read_block(&block_id)?;
    block
        .transactions
        .iter()
        .find(|tx| tx.get_id() == *txid)
        .cloned()
        .map(|tx| (tx, block_id))
}

/// The height of the block that created a transaction's coins, if any of
/// them is still unspent in the chain-tip view.
fn coin_height_of_transaction(state: &NodeState, txid: &Id<Transaction>) -> Option<BlockHeight> {
    state
        .coins
        .iter()
        .find(|(outpoint, _)| outpoint.txid == *txid)
        .and_then(|(_, coin)| coin.source().blockchain_height())
}

/// Resolves the block containing `txid` for proof construction: first via
/// an unspent coin, then via the tx-index.
fn locate_block_of_transaction(
    state: &NodeState,
    txid: &Id<Transaction>,
) -> Result<Id<Block>> {
    if let Some(height) = coin_height_of_transaction(state, txid) {
        if let Some(block_id) = state.chain.block_id_at_height(height) {
            return Ok(block_id);
        }
    }

    if let Some(tx_index) = &state.tx_index {
        if let Some(position) = tx_index.position(txid) {
            return Ok(position.block_id);
        }
    }

    Err(Error::InvalidAddressOrKey("Transaction not yet in block".into()))
}

fn tx_to_json(node: &Node, tx: &Transaction) -> TxJson {
    let is_coinbase = tx.is_coinbase();
    let vin = tx
        .inputs()
        .iter()
        .map(|input| {
            if is_coinbase {
                VinJson {
                    coinbase: Some(hex::encode(input.script_sig.as_bytes())),
                    txid: None,
                    vout: None,
                    script_sig: None,
                    sequence: input.sequence,
                }
            } else {
                VinJson {
                    coinbase: None,
                    txid: Some(input.outpoint.txid.to_rpc_string()),
                    vout: Some(input.outpoint.index),
                    script_sig: Some(ScriptSigJson {
                        asm: script::asm::to_asm_string(&input.script_sig),
                        hex: hex::encode(input.script_sig.as_bytes()),
                    }),
                    sequence: input.sequence,
                }
            }
        })
        .collect();

    let vout = tx
        .outputs()
        .iter()
        .enumerate()
        .map(|(n, output)| VoutJson {
            value: output.value.into_fixed_decimal_str(),
            n: n as u32,
            script_pub_key: script_pubkey_json(node, &output.script_pubkey, true),
        })
        .collect();

    TxJson {
        hex: None,
        txid: tx.get_id().to_rpc_string(),
        size: tx.encoded_size(),
        version: tx.version(),
        locktime: tx.lock_time(),
        vin,
        vout,
        blockhash: None,
        confirmations: None,
        time: None,
        blocktime: None,
    }
}

fn script_pubkey_json(node: &Node, script: &Script, include_hex: bool) -> ScriptPubKeyJson {
    let template = script::solver::classify(script);
    let mut json = ScriptPubKeyJson {
        asm: script::asm::to_asm_string(script),
        hex: include_hex.then(|| hex::encode(script.as_bytes())),
        req_sigs: None,
        script_type: template.name().to_string(),
        addresses: None,
    };

    if let Some((destinations, required)) = script::solver::extract_destinations(script) {
        json.req_sigs = Some(required);
        json.addresses = Some(
            destinations
                .iter()
                .map(|dest| encode_address(node.config(), dest))
                .collect(),
        );
    }

    json
}
