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

//! Classification of output scripts against the standard templates, and the
//! constructors for those templates.

use common::address::Destination;
use common::chain::Script;
use common::primitives::{hash160, H160};

use crate::builder::Builder;
use crate::constants::MAX_PUBKEYS_PER_MULTISIG;
use crate::instruction::{instructions, Instruction};
use crate::opcodes::all::*;

/// The standard output-script shapes. `solutions` of each carry the data a
/// signer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptTemplate {
    /// `<pubkey> OP_CHECKSIG`
    PubKey { pubkey: Vec<u8> },
    /// `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`
    PubKeyHash { hash: H160 },
    /// `OP_HASH160 <hash> OP_EQUAL`
    ScriptHash { hash: H160 },
    /// `m <pubkey>... n OP_CHECKMULTISIG`
    Multisig {
        required: usize,
        pubkeys: Vec<Vec<u8>>,
    },
    /// `OP_RETURN ...`, a provably unspendable data carrier.
    NullData,
    Nonstandard,
}

impl ScriptTemplate {
    /// The `type` string the RPC layer reports.
    pub fn name(&self) -> &'static str {
        match self {
            ScriptTemplate::PubKey { .. } => "pubkey",
            ScriptTemplate::PubKeyHash { .. } => "pubkeyhash",
            ScriptTemplate::ScriptHash { .. } => "scripthash",
            ScriptTemplate::Multisig { .. } => "multisig",
            ScriptTemplate::NullData => "nulldata",
            ScriptTemplate::Nonstandard => "nonstandard",
        }
    }
}

fn plausible_pubkey(data: &[u8]) -> bool {
    match data.first() {
        Some(0x02) | Some(0x03) => data.len() == 33,
        Some(0x04) => data.len() == 65,
        _ => false,
    }
}

/// Matches a script against the standard templates.
pub fn classify(script: &Script) -> ScriptTemplate {
    // The script-hash template is matched on raw bytes before anything is
    // parsed; this is the shape consensus keys P2SH behavior on.
    if script.is_pay_to_script_hash() {
        return ScriptTemplate::ScriptHash {
            hash: H160::from_slice(&script.as_bytes()[2..22]),
        };
    }

    let bytes = script.as_bytes();
    if bytes.first() == Some(&OP_RETURN.to_u8()) {
        return ScriptTemplate::NullData;
    }

    let Ok(parsed) = instructions(script).collect::<Result<Vec<_>, _>>() else {
        return ScriptTemplate::Nonstandard;
    };

    match parsed.as_slice() {
        [Instruction::PushBytes(pubkey), Instruction::Op(OP_CHECKSIG)]
            if plausible_pubkey(pubkey) =>
        {
            ScriptTemplate::PubKey {
                pubkey: pubkey.to_vec(),
            }
        }
        [Instruction::Op(OP_DUP), Instruction::Op(OP_HASH160), Instruction::PushBytes(hash), Instruction::Op(OP_EQUALVERIFY), Instruction::Op(OP_CHECKSIG)]
            if hash.len() == 20 =>
        {
            ScriptTemplate::PubKeyHash {
                hash: H160::from_slice(hash),
            }
        }
        [Instruction::Op(m_op), middle @ .., Instruction::Op(n_op), Instruction::Op(OP_CHECKMULTISIG)] => {
            let (Some(required), Some(total)) = (m_op.decode_pushnum(), n_op.decode_pushnum())
            else {
                return ScriptTemplate::Nonstandard;
            };
            let pubkeys: Option<Vec<Vec<u8>>> = middle
                .iter()
                .map(|ins| match ins {
                    Instruction::PushBytes(data) if plausible_pubkey(data) => {
                        Some(data.to_vec())
                    }
                    _ => None,
                })
                .collect();
            match pubkeys {
                Some(pubkeys)
                    if required >= 1
                        && required <= total
                        && total as usize == pubkeys.len()
                        && pubkeys.len() <= MAX_PUBKEYS_PER_MULTISIG =>
                {
                    ScriptTemplate::Multisig {
                        required: required as usize,
                        pubkeys,
                    }
                }
                _ => ScriptTemplate::Nonstandard,
            }
        }
        _ => ScriptTemplate::Nonstandard,
    }
}

/// The destinations a standard script pays to, with the number of signatures
/// required. Data carriers and nonstandard scripts have none.
pub fn extract_destinations(script: &Script) -> Option<(Vec<Destination>, usize)> {
    match classify(script) {
        ScriptTemplate::PubKey { pubkey } => Some((
            vec![Destination::PubKeyHash(hash160(&pubkey))],
            1,
        )),
        ScriptTemplate::PubKeyHash { hash } => Some((vec![Destination::PubKeyHash(hash)], 1)),
        ScriptTemplate::ScriptHash { hash } => Some((vec![Destination::ScriptHash(hash)], 1)),
        ScriptTemplate::Multisig { required, pubkeys } => Some((
            pubkeys
                .iter()
                .map(|pk| Destination::PubKeyHash(hash160(pk)))
                .collect(),
            required,
        )),
        ScriptTemplate::NullData | ScriptTemplate::Nonstandard => None,
    }
}

/// The output script paying to a destination.
pub fn script_for_destination(destination: &Destination) -> Script {
    match destination {
        Destination::PubKeyHash(hash) => p2pkh_script(hash),
        Destination::ScriptHash(hash) => p2sh_script(hash),
    }
}

pub fn p2pkh_script(hash: &H160) -> Script {
    Builder::new()
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_data(hash.as_bytes())
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_CHECKSIG)
        .into_script()
}

pub fn p2sh_script(hash: &H160) -> Script {
    Builder::new()
        .push_opcode(OP_HASH160)
        .push_data(hash.as_bytes())
        .push_opcode(OP_EQUAL)
        .into_script()
}

/// `OP_RETURN <data>`, a zero-value data carrier output.
pub fn null_data_script(data: &[u8]) -> Script {
    Builder::new()
        .push_opcode(OP_RETURN)
        .push_data(data)
        .into_script()
}

/// An m-of-n bare multisig output script.
pub fn multisig_script(required: usize, pubkeys: &[Vec<u8>]) -> Script {
    assert!(required >= 1 && required <= pubkeys.len());
    assert!(pubkeys.len() <= MAX_PUBKEYS_PER_MULTISIG);
    let mut builder = Builder::new().push_int(required as i64);
    for pubkey in pubkeys {
        builder = builder.push_data(pubkey);
    }
    builder
        .push_int(pubkeys.len() as i64)
        .push_opcode(OP_CHECKMULTISIG)
        .into_script()
}
