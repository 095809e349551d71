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

//! Interpreter-level tests exercising whole scripts.

use common::chain::Script;

use crate::error::Error;
use crate::interpreter::{eval_script, verify_script};
use crate::opcodes::all::*;
use crate::signature_checker::NoSignatureCheck;
use crate::stack::Stack;
use crate::{Builder, VerifyFlags};

fn eval(script: &Script, flags: VerifyFlags) -> Result<Stack, Error> {
    let mut stack = Stack::new(flags.contains(VerifyFlags::MINIMALDATA));
    eval_script(&mut stack, script, &flags, &NoSignatureCheck)?;
    Ok(stack)
}

#[test]
fn arithmetic_script() {
    let script = Builder::new().push_int(3).push_int(5).push_opcode(OP_ADD).into_script();
    let stack = eval(&script, VerifyFlags::NONE).unwrap();
    assert_eq!(stack.into_data(), vec![vec![0x08]]);
}

#[test]
fn equalverify_failure() {
    let script = Builder::new()
        .push_int(1)
        .push_int(2)
        .push_opcode(OP_EQUALVERIFY)
        .into_script();
    assert_eq!(eval(&script, VerifyFlags::NONE), Err(Error::EqualVerify));
}

#[test]
fn op_return_aborts() {
    let script = Builder::new().push_int(1).push_opcode(OP_RETURN).into_script();
    assert_eq!(eval(&script, VerifyFlags::NONE), Err(Error::OpReturn));
}

#[test]
fn conditional_branches() {
    // IF 2 ELSE 3 ENDIF over a true condition.
    let script = Builder::new()
        .push_int(1)
        .push_opcode(OP_IF)
        .push_int(2)
        .push_opcode(OP_ELSE)
        .push_int(3)
        .push_opcode(OP_ENDIF)
        .into_script();
    let stack = eval(&script, VerifyFlags::NONE).unwrap();
    assert_eq!(stack.into_data(), vec![vec![0x02]]);

    // The false branch is taken when the condition is empty.
    let script = Builder::new()
        .push_int(0)
        .push_opcode(OP_IF)
        .push_int(2)
        .push_opcode(OP_ELSE)
        .push_int(3)
        .push_opcode(OP_ENDIF)
        .into_script();
    let stack = eval(&script, VerifyFlags::NONE).unwrap();
    assert_eq!(stack.into_data(), vec![vec![0x03]]);
}

#[test]
fn unbalanced_conditionals() {
    let missing_endif = Builder::new().push_int(1).push_opcode(OP_IF).into_script();
    assert_eq!(
        eval(&missing_endif, VerifyFlags::NONE),
        Err(Error::UnbalancedConditional)
    );

    let stray_else = Builder::new().push_opcode(OP_ELSE).into_script();
    assert_eq!(
        eval(&stray_else, VerifyFlags::NONE),
        Err(Error::UnbalancedConditional)
    );

    let stray_endif = Builder::new().push_opcode(OP_ENDIF).into_script();
    assert_eq!(
        eval(&stray_endif, VerifyFlags::NONE),
        Err(Error::UnbalancedConditional)
    );
}

#[test]
fn disabled_opcode_fails_even_unexecuted() {
    let script = Builder::new()
        .push_int(0)
        .push_opcode(OP_IF)
        .push_opcode(OP_CAT)
        .push_opcode(OP_ENDIF)
        .into_script();
    assert_eq!(eval(&script, VerifyFlags::NONE), Err(Error::DisabledOpcode));
}

#[test]
fn reserved_opcode_ok_on_dead_branch() {
    let script = Builder::new()
        .push_int(0)
        .push_opcode(OP_IF)
        .push_opcode(OP_RESERVED)
        .push_opcode(OP_ENDIF)
        .push_int(1)
        .into_script();
    assert!(eval(&script, VerifyFlags::NONE).is_ok());

    let script = Builder::new().push_opcode(OP_RESERVED).into_script();
    assert_eq!(eval(&script, VerifyFlags::NONE), Err(Error::BadOpcode));
}

#[test]
fn alt_stack_moves() {
    let script = Builder::new()
        .push_int(7)
        .push_opcode(OP_TOALTSTACK)
        .push_int(1)
        .push_opcode(OP_FROMALTSTACK)
        .into_script();
    let stack = eval(&script, VerifyFlags::NONE).unwrap();
    assert_eq!(stack.into_data(), vec![vec![0x01], vec![0x07]]);

    let script = Builder::new().push_opcode(OP_FROMALTSTACK).into_script();
    assert_eq!(
        eval(&script, VerifyFlags::NONE),
        Err(Error::InvalidAltStackOperation)
    );
}

#[test]
fn upgradable_nops() {
    let script = Builder::new().push_int(1).push_opcode(OP_NOP4).into_script();
    assert!(eval(&script, VerifyFlags::NONE).is_ok());
    assert_eq!(
        eval(&script, VerifyFlags::DISCOURAGE_UPGRADABLE_NOPS),
        Err(Error::DiscourageUpgradableNops)
    );
}

#[test]
fn hash_opcodes() {
    let script = Builder::new().push_data(b"hello").push_opcode(OP_HASH256).into_script();
    let stack = eval(&script, VerifyFlags::NONE).unwrap();
    assert_eq!(
        hex::encode(&stack.into_data()[0]),
        "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
    );

    let script = Builder::new().push_data(b"hello").push_opcode(OP_HASH160).into_script();
    let stack = eval(&script, VerifyFlags::NONE).unwrap();
    assert_eq!(
        hex::encode(&stack.into_data()[0]),
        "b6a9c8c230722b7c748331a8b450f05566dc7d0f"
    );
}

#[test]
fn verify_script_requires_true_result() {
    let sig = Builder::new().push_int(0).into_script();
    let pubkey = Script::new();
    assert_eq!(
        verify_script(&sig, &pubkey, &VerifyFlags::NONE, &NoSignatureCheck),
        Err(Error::EvalFalse)
    );

    let sig = Builder::new().push_int(1).into_script();
    assert_eq!(
        verify_script(&sig, &pubkey, &VerifyFlags::NONE, &NoSignatureCheck),
        Ok(())
    );
}

#[test]
fn verify_script_p2sh_runs_redeem_script() {
    // Redeem script: 2 OP_EQUAL; spend pushes 2 and the redeem script.
    let redeem = Builder::new().push_int(2).push_opcode(OP_EQUAL).into_script();
    let prev = crate::solver::p2sh_script(&redeem.script_hash());

    let good = Builder::new()
        .push_int(2)
        .push_data(redeem.as_bytes())
        .into_script();
    assert_eq!(
        verify_script(&good, &prev, &VerifyFlags::P2SH, &NoSignatureCheck),
        Ok(())
    );

    let bad = Builder::new()
        .push_int(3)
        .push_data(redeem.as_bytes())
        .into_script();
    assert_eq!(
        verify_script(&bad, &prev, &VerifyFlags::P2SH, &NoSignatureCheck),
        Err(Error::EvalFalse)
    );

    // Without the P2SH flag the hash comparison alone satisfies the script.
    assert_eq!(
        verify_script(&bad, &prev, &VerifyFlags::NONE, &NoSignatureCheck),
        Ok(())
    );
}

#[test]
fn p2sh_spend_must_be_push_only() {
    let redeem = Builder::new().push_int(1).into_script();
    let prev = crate::solver::p2sh_script(&redeem.script_hash());
    let spend = Builder::new()
        .push_int(1)
        .push_opcode(OP_DROP)
        .push_data(redeem.as_bytes())
        .into_script();
    assert_eq!(
        verify_script(&spend, &prev, &VerifyFlags::P2SH, &NoSignatureCheck),
        Err(Error::SigPushOnly)
    );
}

#[test]
fn cleanstack_detects_leftovers() {
    let flags = VerifyFlags::P2SH | VerifyFlags::CLEANSTACK;
    let sig = Builder::new().push_int(7).push_int(1).into_script();
    assert_eq!(
        verify_script(&sig, &Script::new(), &flags, &NoSignatureCheck),
        Err(Error::CleanStack)
    );
}

#[test]
fn minimaldata_flag_rejects_wide_pushes() {
    // PUSHDATA1 framing for two bytes is non-minimal.
    let script = Script::from_bytes(vec![0x4c, 0x02, 0xaa, 0xbb]);
    assert!(eval(&script, VerifyFlags::NONE).is_ok());
    assert_eq!(
        eval(&script, VerifyFlags::MINIMALDATA),
        Err(Error::MinimalData)
    );
}

#[test]
fn checkmultisig_null_dummy() {
    // 0-of-1 multisig succeeds trivially but the dummy is inspected.
    let pubkey = vec![0x02; 33];
    let prev = crate::solver::multisig_script(1, &[pubkey]);
    let spend_with_dummy = Builder::new().push_int(1).push_data(&[0x30]).into_script();

    // NoSignatureCheck accepts the signature; the nonzero dummy still fails
    // under NULLDUMMY.
    assert_eq!(
        verify_script(
            &spend_with_dummy,
            &prev,
            &(VerifyFlags::NULLDUMMY),
            &NoSignatureCheck
        ),
        Err(Error::SigNullDummy)
    );
    assert_eq!(
        verify_script(&spend_with_dummy, &prev, &VerifyFlags::NONE, &NoSignatureCheck),
        Ok(())
    );
}

#[test]
fn sig_count_bounds() {
    // More signatures than keys is malformed.
    let script = Builder::new()
        .push_int(0)
        .push_data(&[0x30])
        .push_data(&[0x31])
        .push_int(2)
        .push_data(&[0x02; 33])
        .push_int(1)
        .push_opcode(OP_CHECKMULTISIG)
        .into_script();
    assert_eq!(eval(&script, VerifyFlags::NONE), Err(Error::SigCount));

    let script = Builder::new()
        .push_int(0)
        .push_int(21)
        .push_opcode(OP_CHECKMULTISIG)
        .into_script();
    assert_eq!(eval(&script, VerifyFlags::NONE), Err(Error::PubkeyCount));
}

#[test]
fn pick_and_roll() {
    let script = Builder::new()
        .push_int(10)
        .push_int(20)
        .push_int(30)
        .push_int(2)
        .push_opcode(OP_PICK)
        .into_script();
    let stack = eval(&script, VerifyFlags::NONE).unwrap();
    assert_eq!(
        stack.into_data(),
        vec![vec![10], vec![20], vec![30], vec![10]]
    );

    let script = Builder::new()
        .push_int(10)
        .push_int(20)
        .push_int(30)
        .push_int(2)
        .push_opcode(OP_ROLL)
        .into_script();
    let stack = eval(&script, VerifyFlags::NONE).unwrap();
    assert_eq!(stack.into_data(), vec![vec![20], vec![30], vec![10]]);

    // Out-of-range depth.
    let script = Builder::new().push_int(1).push_int(5).push_opcode(OP_PICK).into_script();
    assert_eq!(
        eval(&script, VerifyFlags::NONE),
        Err(Error::InvalidStackOperation)
    );
}

#[test]
fn oversize_script_rejected() {
    let script = Script::from_bytes(vec![OP_NOP.to_u8(); crate::constants::MAX_SCRIPT_SIZE + 1]);
    assert_eq!(eval(&script, VerifyFlags::NONE), Err(Error::ScriptSize));
}
