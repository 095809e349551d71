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

use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use common::chain::Script;
use common::primitives::{hash160, hash256};

use crate::constants::{
    MAX_OPS_PER_SCRIPT, MAX_PUBKEYS_PER_MULTISIG, MAX_SCRIPT_ELEMENT_SIZE, MAX_SCRIPT_SIZE,
    MAX_STACK_SIZE,
};
use crate::error::Error;
use crate::instruction::{instructions, instructions_minimal, is_push_only, Instruction};
use crate::num::ScriptNum;
use crate::opcodes::{all::*, Opcode};
use crate::signature_checker::{
    check_pubkey_encoding, check_signature_encoding, SignatureChecker,
    SEQUENCE_LOCKTIME_DISABLE_FLAG,
};
use crate::stack::{cast_to_bool, Stack};
use crate::VerifyFlags;

type Result<T> = std::result::Result<T, Error>;

/// Runs a single script against `stack`. The caller inspects the final
/// stack; an `Ok` return only means no operation failed.
pub fn eval_script(
    stack: &mut Stack,
    script: &Script,
    flags: &VerifyFlags,
    checker: &impl SignatureChecker,
) -> Result<()> {
    if script.len() > MAX_SCRIPT_SIZE {
        return Err(Error::ScriptSize);
    }

    let mut alt_stack = Stack::new(flags.contains(VerifyFlags::MINIMALDATA));

    // One bool per enclosing conditional; execution is live iff all are true.
    let mut exec_stack: Vec<bool> = Vec::new();

    // Byte offset of the script code committed by signatures: everything
    // after the most recently executed OP_CODESEPARATOR.
    let mut begincode = 0;

    let mut op_count = 0;

    let mut iter = if flags.contains(VerifyFlags::MINIMALDATA) {
        instructions_minimal(script)
    } else {
        instructions(script)
    };

    while let Some(item) = iter.next() {
        let instruction = item?;
        let executing = exec_stack.iter().all(|&x| x);

        match instruction {
            Instruction::PushBytes(data) => {
                if data.len() > MAX_SCRIPT_ELEMENT_SIZE {
                    return Err(Error::PushSize);
                }
                if executing {
                    stack.push(data.to_vec());
                }
            }
            Instruction::Op(op) => {
                // Push-number opcodes are exempt from the operation budget.
                if op.0 > OP_PUSHNUM_16.0 {
                    op_count += 1;
                    if op_count > MAX_OPS_PER_SCRIPT {
                        return Err(Error::OpCount);
                    }
                }

                // Disabled opcodes poison the script even on a dead branch.
                if op.is_disabled() {
                    return Err(Error::DisabledOpcode);
                }

                let is_conditional = (OP_IF.0..=OP_ENDIF.0).contains(&op.0);
                if !executing && !is_conditional {
                    continue;
                }

                eval_opcode(
                    op,
                    stack,
                    &mut alt_stack,
                    &mut exec_stack,
                    executing,
                    script,
                    &mut begincode,
                    script.len() - iter.remaining_len(),
                    &mut op_count,
                    flags,
                    checker,
                )?;
            }
        }

        if stack.len() + alt_stack.len() > MAX_STACK_SIZE {
            return Err(Error::StackSize);
        }
    }

    if !exec_stack.is_empty() {
        return Err(Error::UnbalancedConditional);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn eval_opcode(
    op: Opcode,
    stack: &mut Stack,
    alt_stack: &mut Stack,
    exec_stack: &mut Vec<bool>,
    executing: bool,
    script: &Script,
    begincode: &mut usize,
    position: usize,
    op_count: &mut usize,
    flags: &VerifyFlags,
    checker: &impl SignatureChecker,
) -> Result<()> {
    match op {
        // Constants
        OP_0 => stack.push(vec![]),
        op if op.decode_pushnum().is_some() => {
            stack.push_num(op.decode_pushnum().expect("checked by guard"));
        }

        // Flow control
        OP_NOP => {}
        OP_IF | OP_NOTIF => {
            let mut value = false;
            if executing {
                let top = stack.pop().map_err(|_| Error::UnbalancedConditional)?;
                value = cast_to_bool(&top);
                if op == OP_NOTIF {
                    value = !value;
                }
            }
            exec_stack.push(value);
        }
        OP_ELSE => {
            let top = exec_stack.last_mut().ok_or(Error::UnbalancedConditional)?;
            *top = !*top;
        }
        OP_ENDIF => {
            exec_stack.pop().ok_or(Error::UnbalancedConditional)?;
        }
        OP_VERIFY => {
            if !stack.pop_bool()? {
                return Err(Error::Verify);
            }
        }
        OP_RETURN => return Err(Error::OpReturn),

        // Stack
        OP_TOALTSTACK => alt_stack.push(stack.pop()?),
        OP_FROMALTSTACK => {
            let v = alt_stack.pop().map_err(|_| Error::InvalidAltStackOperation)?;
            stack.push(v);
        }
        OP_2DROP => stack.drop_top(2)?,
        OP_2DUP => stack.dup(2)?,
        OP_3DUP => stack.dup(3)?,
        OP_2OVER => stack.over(2)?,
        OP_2ROT => stack.rot(2)?,
        OP_2SWAP => stack.swap(2)?,
        OP_IFDUP => {
            if stack.peek_bool()? {
                stack.dup(1)?;
            }
        }
        OP_DEPTH => stack.push_num(stack.len() as i64),
        OP_DROP => stack.drop_top(1)?,
        OP_DUP => stack.dup(1)?,
        OP_NIP => stack.nip()?,
        OP_OVER => stack.over(1)?,
        OP_PICK | OP_ROLL => {
            let n = stack.pop_num()?.value();
            if n < 0 || n >= stack.len() as i64 {
                return Err(Error::InvalidStackOperation);
            }
            let v = if op == OP_PICK {
                stack.top(n as usize)?.clone()
            } else {
                stack.remove(n as usize)?
            };
            stack.push(v);
        }
        OP_ROT => stack.rot(1)?,
        OP_SWAP => stack.swap(1)?,
        OP_TUCK => stack.tuck()?,
        OP_SIZE => {
            let len = stack.last()?.len();
            stack.push_num(len as i64);
        }

        // Bitwise logic
        OP_EQUAL | OP_EQUALVERIFY => {
            let a = stack.pop()?;
            let b = stack.pop()?;
            if op == OP_EQUAL {
                stack.push_bool(a == b);
            } else if a != b {
                return Err(Error::EqualVerify);
            }
        }

        // Arithmetic
        OP_1ADD => {
            let n = (stack.pop_num()? + 1.into())?;
            stack.push_num(n);
        }
        OP_1SUB => {
            let n = (stack.pop_num()? - 1.into())?;
            stack.push_num(n);
        }
        OP_NEGATE => {
            let n = (-stack.pop_num()?)?;
            stack.push_num(n);
        }
        OP_ABS => {
            let n = stack.pop_num()?.abs();
            stack.push_num(n);
        }
        OP_NOT => {
            let z = stack.pop_num()?.is_zero();
            stack.push_num(z as i64);
        }
        OP_0NOTEQUAL => {
            let nz = !stack.pop_num()?.is_zero();
            stack.push_num(nz as i64);
        }
        OP_ADD => {
            let v1 = stack.pop_num()?;
            let v2 = stack.pop_num()?;
            stack.push_num((v1 + v2)?);
        }
        OP_SUB => {
            let v1 = stack.pop_num()?;
            let v2 = stack.pop_num()?;
            stack.push_num((v2 - v1)?);
        }
        OP_BOOLAND => {
            let v1 = !stack.pop_num()?.is_zero();
            let v2 = !stack.pop_num()?.is_zero();
            stack.push_num((v1 && v2) as i64);
        }
        OP_BOOLOR => {
            let v1 = !stack.pop_num()?.is_zero();
            let v2 = !stack.pop_num()?.is_zero();
            stack.push_num((v1 || v2) as i64);
        }
        OP_NUMEQUAL | OP_NUMEQUALVERIFY => {
            let v1 = stack.pop_num()?;
            let v2 = stack.pop_num()?;
            if op == OP_NUMEQUAL {
                stack.push_num((v1 == v2) as i64);
            } else if v1 != v2 {
                return Err(Error::NumEqualVerify);
            }
        }
        OP_NUMNOTEQUAL => {
            let v1 = stack.pop_num()?;
            let v2 = stack.pop_num()?;
            stack.push_num((v1 != v2) as i64);
        }
        OP_LESSTHAN => {
            let v1 = stack.pop_num()?;
            let v2 = stack.pop_num()?;
            stack.push_num((v2 < v1) as i64);
        }
        OP_GREATERTHAN => {
            let v1 = stack.pop_num()?;
            let v2 = stack.pop_num()?;
            stack.push_num((v2 > v1) as i64);
        }
        OP_LESSTHANOREQUAL => {
            let v1 = stack.pop_num()?;
            let v2 = stack.pop_num()?;
            stack.push_num((v2 <= v1) as i64);
        }
        OP_GREATERTHANOREQUAL => {
            let v1 = stack.pop_num()?;
            let v2 = stack.pop_num()?;
            stack.push_num((v2 >= v1) as i64);
        }
        OP_MIN => {
            let v1 = stack.pop_num()?;
            let v2 = stack.pop_num()?;
            stack.push_num(v1.min(v2));
        }
        OP_MAX => {
            let v1 = stack.pop_num()?;
            let v2 = stack.pop_num()?;
            stack.push_num(v1.max(v2));
        }
        OP_WITHIN => {
            let max = stack.pop_num()?;
            let min = stack.pop_num()?;
            let x = stack.pop_num()?;
            stack.push_bool(min <= x && x < max);
        }

        // Crypto
        OP_RIPEMD160 => {
            let v = Ripemd160::digest(stack.pop()?);
            stack.push(v.to_vec());
        }
        OP_SHA1 => {
            let v = Sha1::digest(stack.pop()?);
            stack.push(v.to_vec());
        }
        OP_SHA256 => {
            let v = Sha256::digest(stack.pop()?);
            stack.push(v.to_vec());
        }
        OP_HASH160 => {
            let v = hash160(&stack.pop()?);
            stack.push(v.as_bytes().to_vec());
        }
        OP_HASH256 => {
            let v = hash256(&stack.pop()?);
            stack.push(v.as_bytes().to_vec());
        }
        OP_CODESEPARATOR => {
            *begincode = position;
        }
        OP_CHECKSIG | OP_CHECKSIGVERIFY => {
            let pubkey = stack.pop()?;
            let sig = stack.pop()?;

            let script_code = subscript_for_signing(script, *begincode, &[&sig]);
            check_signature_encoding(&sig, flags)?;
            check_pubkey_encoding(&pubkey, flags)?;
            let success = checker.check_sig(&sig, &pubkey, &script_code);

            if op == OP_CHECKSIG {
                stack.push_bool(success);
            } else if !success {
                return Err(Error::CheckSigVerify);
            }
        }
        OP_CHECKMULTISIG | OP_CHECKMULTISIGVERIFY => {
            let success = eval_checkmultisig(stack, script, *begincode, flags, checker, op_count)?;
            if op == OP_CHECKMULTISIG {
                stack.push_bool(success);
            } else if !success {
                return Err(Error::CheckMultiSigVerify);
            }
        }

        // Timelocks. Both peek their operand; as upgraded NOPs they must not
        // disturb the stack.
        OP_CHECKLOCKTIMEVERIFY => {
            if !flags.contains(VerifyFlags::CHECKLOCKTIMEVERIFY) {
                if flags.contains(VerifyFlags::DISCOURAGE_UPGRADABLE_NOPS) {
                    return Err(Error::DiscourageUpgradableNops);
                }
                return Ok(());
            }
            // Five-byte operands keep lock times usable past the four-byte
            // numeric horizon of year 2038.
            let lock_time = ScriptNum::from_bytes(
                stack.last()?,
                flags.contains(VerifyFlags::MINIMALDATA),
                Some(5),
            )?;
            if lock_time.is_negative() {
                return Err(Error::NegativeLocktime);
            }
            if !checker.check_lock_time(lock_time) {
                return Err(Error::UnsatisfiedLocktime);
            }
        }
        OP_CHECKSEQUENCEVERIFY => {
            if !flags.contains(VerifyFlags::CHECKSEQUENCEVERIFY) {
                if flags.contains(VerifyFlags::DISCOURAGE_UPGRADABLE_NOPS) {
                    return Err(Error::DiscourageUpgradableNops);
                }
                return Ok(());
            }
            let sequence = ScriptNum::from_bytes(
                stack.last()?,
                flags.contains(VerifyFlags::MINIMALDATA),
                Some(5),
            )?;
            if sequence.is_negative() {
                return Err(Error::NegativeLocktime);
            }
            // With the disable bit set the operand demands nothing.
            if sequence.value() & SEQUENCE_LOCKTIME_DISABLE_FLAG as i64 == 0
                && !checker.check_sequence(sequence)
            {
                return Err(Error::UnsatisfiedLocktime);
            }
        }

        // Reserved words
        OP_VER | OP_RESERVED | OP_RESERVED1 | OP_RESERVED2 => {
            // Unreachable on a dead branch; the interpreter skips them there.
            return Err(Error::BadOpcode);
        }
        OP_VERIF | OP_VERNOTIF => return Err(Error::BadOpcode),

        OP_NOP1 | OP_NOP4 | OP_NOP5 | OP_NOP6 | OP_NOP7 | OP_NOP8 | OP_NOP9 | OP_NOP10 => {
            if flags.contains(VerifyFlags::DISCOURAGE_UPGRADABLE_NOPS) {
                return Err(Error::DiscourageUpgradableNops);
            }
        }

        _ => return Err(Error::BadOpcode),
    }

    Ok(())
}

fn eval_checkmultisig(
    stack: &mut Stack,
    script: &Script,
    begincode: usize,
    flags: &VerifyFlags,
    checker: &impl SignatureChecker,
    op_count: &mut usize,
) -> Result<bool> {
    let keys_count = stack.pop_num()?.value();
    if keys_count < 0 || keys_count > MAX_PUBKEYS_PER_MULTISIG as i64 {
        return Err(Error::PubkeyCount);
    }
    *op_count += keys_count as usize;
    if *op_count > MAX_OPS_PER_SCRIPT {
        return Err(Error::OpCount);
    }

    let mut keys = Vec::with_capacity(keys_count as usize);
    for _ in 0..keys_count {
        keys.push(stack.pop()?);
    }
    // Pops leave the first-listed key last in `keys`; reverse so index 0 is
    // the first key in script order, matching the signature order rule.
    keys.reverse();

    let sigs_count = stack.pop_num()?.value();
    if sigs_count < 0 || sigs_count > keys_count {
        return Err(Error::SigCount);
    }
    let mut sigs = Vec::with_capacity(sigs_count as usize);
    for _ in 0..sigs_count {
        sigs.push(stack.pop()?);
    }
    sigs.reverse();

    // The dummy element consumed by the off-by-one in the original
    // implementation; consensus forever requires it.
    let dummy = stack.pop()?;
    if flags.contains(VerifyFlags::NULLDUMMY) && !dummy.is_empty() {
        return Err(Error::SigNullDummy);
    }

    let sig_refs: Vec<&[u8]> = sigs.iter().map(|s| s.as_slice()).collect();
    let script_code = subscript_for_signing(script, begincode, &sig_refs);

    // Signatures must appear in key order, so a single forward walk over
    // both lists decides the outcome.
    let mut ikey = 0;
    let mut isig = 0;
    let mut success = true;
    while success && isig < sigs.len() {
        let sig = &sigs[isig];
        let key = &keys[ikey];

        // Encoding failures abort the script outright, even when enough
        // other signatures would have matched.
        check_signature_encoding(sig, flags)?;
        check_pubkey_encoding(key, flags)?;

        if checker.check_sig(sig, key, &script_code) {
            isig += 1;
        }
        ikey += 1;

        // Fewer keys left than signatures still unmatched: cannot succeed.
        if sigs.len() - isig > keys.len() - ikey {
            success = false;
        }
    }

    Ok(success)
}

/// The script code a signature in `script` commits to: the bytes from the
/// last executed OP_CODESEPARATOR on, with any pushes of the signatures
/// themselves deleted (a signature cannot cover itself).
fn subscript_for_signing(script: &Script, begincode: usize, sigs: &[&[u8]]) -> Script {
    let sub = Script::from_bytes(script.as_bytes()[begincode..].to_vec());
    sigs.iter().fold(sub, |acc, sig| find_and_delete(&acc, sig))
}

/// Removes every push instruction whose payload equals `needle`. Anything
/// unparsable is kept verbatim; deletion only applies to well-formed pushes.
fn find_and_delete(script: &Script, needle: &[u8]) -> Script {
    if needle.is_empty() {
        return script.clone();
    }
    let bytes = script.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut iter = instructions(script);
    let mut consumed = 0;
    loop {
        let before = bytes.len() - iter.remaining_len();
        let item = match iter.next() {
            Some(item) => item,
            None => break,
        };
        let after = bytes.len() - iter.remaining_len();
        match item {
            Ok(Instruction::PushBytes(data)) if data == needle => {}
            _ => result.extend_from_slice(&bytes[before..after]),
        }
        consumed = after;
    }
    // Trailing garbage that failed to parse still belongs to the script.
    result.extend_from_slice(&bytes[consumed..]);
    Script::from_bytes(result)
}

/// Full input verification: evaluate the signature script, then the output
/// script, then (behind the P2SH flag) the deserialized redeem script, with
/// the cleanliness checks the flags demand.
pub fn verify_script(
    script_sig: &Script,
    script_pubkey: &Script,
    flags: &VerifyFlags,
    checker: &impl SignatureChecker,
) -> Result<()> {
    if flags.contains(VerifyFlags::SIGPUSHONLY) && !is_push_only(script_sig) {
        return Err(Error::SigPushOnly);
    }

    // The two scripts run sequentially on one stack, never concatenated;
    // concatenation let signature scripts smuggle operations into the
    // output script (CVE-2010-5141).
    let mut stack = Stack::new(flags.contains(VerifyFlags::MINIMALDATA));
    eval_script(&mut stack, script_sig, flags, checker)?;

    let stack_copy = flags.contains(VerifyFlags::P2SH).then(|| stack.clone());

    eval_script(&mut stack, script_pubkey, flags, checker)?;

    if stack.is_empty() || !stack.peek_bool()? {
        return Err(Error::EvalFalse);
    }

    if flags.contains(VerifyFlags::P2SH) && script_pubkey.is_pay_to_script_hash() {
        // The spend of a script hash must be pure data; the last push is the
        // script that actually runs.
        if !is_push_only(script_sig) {
            return Err(Error::SigPushOnly);
        }

        let mut stack = stack_copy.expect("created under the same flag");
        // The hash comparison above succeeded, so the signature script
        // pushed at least the redeem script.
        let redeem_bytes = stack.pop().expect("non-empty by P2SH evaluation");
        let redeem_script = Script::from_bytes(redeem_bytes);

        eval_script(&mut stack, &redeem_script, flags, checker)?;

        if stack.is_empty() || !stack.peek_bool()? {
            return Err(Error::EvalFalse);
        }

        if flags.contains(VerifyFlags::CLEANSTACK) && stack.len() != 1 {
            return Err(Error::CleanStack);
        }
        return Ok(());
    }

    if flags.contains(VerifyFlags::CLEANSTACK) {
        // CLEANSTACK without P2SH would make adding P2SH later a hardfork;
        // the flag combination is a caller bug.
        assert!(flags.contains(VerifyFlags::P2SH), "CLEANSTACK requires P2SH");
        if stack.len() != 1 {
            return Err(Error::CleanStack);
        }
    }

    Ok(())
}
