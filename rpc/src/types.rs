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

//! The JSON shapes the raw-transaction commands return. Hashes render in
//! the reversed-hex form everywhere.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ScriptSigJson {
    pub asm: String,
    pub hex: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScriptPubKeyJson {
    pub asm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
    #[serde(rename = "reqSigs", skip_serializing_if = "Option::is_none")]
    pub req_sigs: Option<usize>,
    #[serde(rename = "type")]
    pub script_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VinJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coinbase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vout: Option<u32>,
    #[serde(rename = "scriptSig", skip_serializing_if = "Option::is_none")]
    pub script_sig: Option<ScriptSigJson>,
    pub sequence: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoutJson {
    /// The amount in whole-coin units, pre-formatted with eight decimal
    /// places. A float here would be subject to binary representation
    /// error; the fixed-decimal form is exact and mirrors what the amount
    /// parser accepts on the way in.
    pub value: String,
    pub n: u32,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKeyJson,
}

#[derive(Debug, Clone, Serialize)]
pub struct TxJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
    pub txid: String,
    pub size: usize,
    pub version: i32,
    pub locktime: u32,
    pub vin: Vec<VinJson>,
    pub vout: Vec<VoutJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockhash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocktime: Option<u32>,
}

/// Per-input failure entry of `signrawtransaction`.
#[derive(Debug, Clone, Serialize)]
pub struct TxInErrorJson {
    pub txid: String,
    pub vout: u32,
    #[serde(rename = "scriptSig")]
    pub script_sig: String,
    pub sequence: u32,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignRawTransactionResult {
    pub hex: String,
    pub complete: bool,
    pub errors: Vec<TxInErrorJson>,
}
