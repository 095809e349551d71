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

use std::sync::LazyLock;

use secp256k1::{ecdsa, All, Message, PublicKey, Secp256k1};

use common::chain::{Script, Transaction, SEQUENCE_FINAL};
use common::primitives::H256;

use crate::error::Error;
use crate::num::ScriptNum;
use crate::sighash::{signature_hash, SigHashType};
use crate::VerifyFlags;

pub(crate) static SECP: LazyLock<Secp256k1<All>> = LazyLock::new(Secp256k1::new);

/// Relative-timelock encoding of a sequence number (BIP 68).
pub const SEQUENCE_LOCKTIME_DISABLE_FLAG: u32 = 1 << 31;
pub const SEQUENCE_LOCKTIME_TYPE_FLAG: u32 = 1 << 22;
pub const SEQUENCE_LOCKTIME_MASK: u32 = 0x0000_ffff;

use common::chain::LOCKTIME_THRESHOLD;

/// The hook through which the interpreter checks signatures and timelocks.
/// The transaction-bound implementation is used for real verification; the
/// no-op one evaluates scripts whose signatures are irrelevant.
pub trait SignatureChecker {
    /// Checks `sig_with_hashtype` (DER signature + hash-type byte) by `pubkey`
    /// over the digest determined by `script_code`. Malformed signatures and
    /// keys report `false`, not an error; in a multisig not every (sig, key)
    /// pairing is expected to match.
    fn check_sig(&self, sig_with_hashtype: &[u8], pubkey: &[u8], script_code: &Script) -> bool;

    /// Whether an absolute timelock demanded by the script is satisfied by
    /// the transaction's lock time.
    fn check_lock_time(&self, lock_time: ScriptNum) -> bool;

    /// Whether a relative timelock demanded by the script is satisfied by
    /// the signed input's sequence number.
    fn check_sequence(&self, sequence: ScriptNum) -> bool;
}

/// Accepts everything; used where only the stack effects of a script matter.
pub struct NoSignatureCheck;

impl SignatureChecker for NoSignatureCheck {
    fn check_sig(&self, _sig: &[u8], _pubkey: &[u8], _script_code: &Script) -> bool {
        true
    }

    fn check_lock_time(&self, _lock_time: ScriptNum) -> bool {
        true
    }

    fn check_sequence(&self, _sequence: ScriptNum) -> bool {
        true
    }
}

/// Checks signatures against a concrete transaction input.
pub struct TransactionSignatureChecker<'a> {
    tx: &'a Transaction,
    input_index: usize,
}

impl<'a> TransactionSignatureChecker<'a> {
    pub fn new(tx: &'a Transaction, input_index: usize) -> Self {
        TransactionSignatureChecker { tx, input_index }
    }
}

impl SignatureChecker for TransactionSignatureChecker<'_> {
    fn check_sig(&self, sig_with_hashtype: &[u8], pubkey: &[u8], script_code: &Script) -> bool {
        let Some((&hashtype_byte, der)) = sig_with_hashtype.split_last() else {
            return false;
        };
        let sighash_type = SigHashType::from_byte(hashtype_byte);
        let digest = signature_hash(self.tx, self.input_index, script_code, sighash_type);
        verify_ecdsa(der, pubkey, &digest)
    }

    fn check_lock_time(&self, lock_time: ScriptNum) -> bool {
        let lock_time = match u32::try_from(lock_time.value()) {
            Ok(v) => v,
            Err(_) => return false,
        };

        // Height locks and time locks live on separate clocks; comparing
        // across them proves nothing, so the types must agree.
        let tx_lock_time = self.tx.lock_time();
        let same_kind = (lock_time < LOCKTIME_THRESHOLD) == (tx_lock_time < LOCKTIME_THRESHOLD);
        if !same_kind || lock_time > tx_lock_time {
            return false;
        }

        // A final sequence number would disable the transaction-level lock
        // and with it the opcode, so the signed input must not be final.
        self.tx.inputs()[self.input_index].sequence != SEQUENCE_FINAL
    }

    fn check_sequence(&self, sequence: ScriptNum) -> bool {
        // Relative locks only exist from version 2 on.
        if self.tx.version() < 2 {
            return false;
        }

        let tx_sequence = self.tx.inputs()[self.input_index].sequence;
        if tx_sequence & SEQUENCE_LOCKTIME_DISABLE_FLAG != 0 {
            return false;
        }

        let required = match u32::try_from(sequence.value()) {
            Ok(v) => v,
            Err(_) => return false,
        };

        let type_and_mask = SEQUENCE_LOCKTIME_TYPE_FLAG | SEQUENCE_LOCKTIME_MASK;
        let required_masked = required & type_and_mask;
        let tx_masked = tx_sequence & type_and_mask;

        let same_kind = (required_masked & SEQUENCE_LOCKTIME_TYPE_FLAG)
            == (tx_masked & SEQUENCE_LOCKTIME_TYPE_FLAG);
        same_kind && (required_masked & SEQUENCE_LOCKTIME_MASK) <= (tx_masked & SEQUENCE_LOCKTIME_MASK)
    }
}

/// Raw ECDSA verification of `der` by `pubkey` over `digest`. High-S
/// signatures are normalized first; whether they are acceptable is the
/// interpreter's policy decision, not a cryptographic one.
pub fn verify_ecdsa(der: &[u8], pubkey: &[u8], digest: &H256) -> bool {
    let Ok(mut sig) = ecdsa::Signature::from_der_lax(der) else {
        return false;
    };
    let Ok(pk) = PublicKey::from_slice(pubkey) else {
        return false;
    };
    sig.normalize_s();
    let msg = Message::from_digest(digest.to_fixed_bytes());
    SECP.verify_ecdsa(&msg, &sig, &pk).is_ok()
}

/// Strictness checks on a signature push, driven by the verification flags:
/// DER shape, low S, and a defined hash-type byte. The empty signature is
/// always acceptable here; it simply never validates.
pub fn check_signature_encoding(sig: &[u8], flags: &VerifyFlags) -> Result<(), Error> {
    if sig.is_empty() {
        return Ok(());
    }
    if flags.intersects(VerifyFlags::DERSIG | VerifyFlags::LOW_S | VerifyFlags::STRICTENC)
        && !is_valid_signature_encoding(sig)
    {
        return Err(Error::SigDer);
    }
    if flags.contains(VerifyFlags::LOW_S) && !is_low_der_signature(sig) {
        return Err(Error::SigHighS);
    }
    if flags.contains(VerifyFlags::STRICTENC) {
        let hashtype = *sig.last().expect("non-empty checked above");
        if !SigHashType::from_byte(hashtype).is_defined() {
            return Err(Error::SigHashType);
        }
    }
    Ok(())
}

/// Strictness check on a public-key push: compressed or uncompressed form
/// only.
pub fn check_pubkey_encoding(pubkey: &[u8], flags: &VerifyFlags) -> Result<(), Error> {
    if flags.contains(VerifyFlags::STRICTENC) && !is_compressed_or_uncompressed_pubkey(pubkey) {
        return Err(Error::PubkeyType);
    }
    Ok(())
}

/// Canonical DER shape check of a signature-plus-hashtype push, a
/// transliteration of the consensus rule (not a general DER parser).
fn is_valid_signature_encoding(sig: &[u8]) -> bool {
    // Minimum and maximum size constraints.
    if sig.len() < 9 || sig.len() > 73 {
        return false;
    }

    // A signature is of type 0x30 (compound).
    if sig[0] != 0x30 {
        return false;
    }

    // Make sure the length covers the entire signature.
    if sig[1] as usize != sig.len() - 3 {
        return false;
    }

    // Extract the length of the R element.
    let len_r = sig[3] as usize;
    if 5 + len_r >= sig.len() {
        return false;
    }

    // Extract the length of the S element.
    let len_s = sig[5 + len_r] as usize;
    if len_r + len_s + 7 != sig.len() {
        return false;
    }

    // Check whether the R element is an integer.
    if sig[2] != 0x02 {
        return false;
    }
    // Zero-length integers are not allowed for R.
    if len_r == 0 {
        return false;
    }
    // Negative numbers are not allowed for R.
    if sig[4] & 0x80 != 0 {
        return false;
    }
    // Null bytes at the start of R are not allowed, unless R would
    // otherwise be interpreted as a negative number.
    if len_r > 1 && sig[4] == 0x00 && sig[5] & 0x80 == 0 {
        return false;
    }

    // Check whether the S element is an integer.
    if sig[len_r + 4] != 0x02 {
        return false;
    }
    if len_s == 0 {
        return false;
    }
    if sig[len_r + 6] & 0x80 != 0 {
        return false;
    }
    if len_s > 1 && sig[len_r + 6] == 0x00 && sig[len_r + 7] & 0x80 == 0 {
        return false;
    }

    true
}

fn is_low_der_signature(sig_with_hashtype: &[u8]) -> bool {
    let der = &sig_with_hashtype[..sig_with_hashtype.len() - 1];
    let Ok(sig) = ecdsa::Signature::from_der_lax(der) else {
        return false;
    };
    let mut normalized = sig;
    normalized.normalize_s();
    normalized == sig
}

fn is_compressed_or_uncompressed_pubkey(pubkey: &[u8]) -> bool {
    match pubkey.first() {
        Some(0x02) | Some(0x03) => pubkey.len() == 33,
        Some(0x04) => pubkey.len() == 65,
        _ => false,
    }
}
