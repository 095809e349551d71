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

use common::chain::Script;

use crate::error::Error;
use crate::opcodes::{all, Opcode};

/// A parsed script element: either a data push or a plain opcode.
/// Small-number opcodes are reported as `Op`; the interpreter turns them
/// into pushes itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction<'a> {
    PushBytes(&'a [u8]),
    Op(Opcode),
}

/// Iterator over a script's instructions. With `enforce_minimal` set, every
/// push must use the shortest possible encoding.
pub struct Instructions<'a> {
    data: &'a [u8],
    enforce_minimal: bool,
}

impl<'a> Instructions<'a> {
    /// Bytes not yet consumed; lets the caller compute the byte offset of
    /// the instruction stream (the interpreter tracks the position after the
    /// last OP_CODESEPARATOR this way).
    pub fn remaining_len(&self) -> usize {
        self.data.len()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.data.len() < len {
            // A push running past the end makes the whole script unparsable.
            self.data = &[];
            return Err(Error::BadOpcode);
        }
        let (head, rest) = self.data.split_at(len);
        self.data = rest;
        Ok(head)
    }

    fn next_push(&mut self, len: usize, minimal: bool) -> Result<Instruction<'a>, Error> {
        if self.enforce_minimal && !minimal {
            self.data = &[];
            return Err(Error::MinimalData);
        }
        Ok(Instruction::PushBytes(self.take(len)?))
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let opcode = Opcode(*self.data.first()?);
        self.data = &self.data[1..];

        let item = match opcode {
            op if op.0 >= 0x01 && op.0 <= all::OP_PUSHBYTES_75.0 => {
                let len = op.0 as usize;
                // Direct pushes are minimal by construction.
                self.next_push(len, true)
            }
            all::OP_PUSHDATA1 => match self.take(1) {
                Ok(n) => {
                    let len = n[0] as usize;
                    self.next_push(len, len > 75)
                }
                Err(e) => Err(e),
            },
            all::OP_PUSHDATA2 => match self.take(2) {
                Ok(n) => {
                    let len = u16::from_le_bytes([n[0], n[1]]) as usize;
                    self.next_push(len, len > 0xFF)
                }
                Err(e) => Err(e),
            },
            all::OP_PUSHDATA4 => match self.take(4) {
                Ok(n) => {
                    let len = u32::from_le_bytes([n[0], n[1], n[2], n[3]]) as usize;
                    self.next_push(len, len > 0xFFFF)
                }
                Err(e) => Err(e),
            },
            op => Ok(Instruction::Op(op)),
        };
        Some(item)
    }
}

/// Iterates a script's instructions without minimal-push enforcement.
pub fn instructions(script: &Script) -> Instructions<'_> {
    Instructions {
        data: script.as_bytes(),
        enforce_minimal: false,
    }
}

/// Iterates a script's instructions, rejecting non-minimal pushes.
pub fn instructions_minimal(script: &Script) -> Instructions<'_> {
    Instructions {
        data: script.as_bytes(),
        enforce_minimal: true,
    }
}

/// Whether the script consists solely of push operations (including the
/// small-number opcodes); required of every signature script under the
/// push-only rule and of all pay-to-script-hash spends.
pub fn is_push_only(script: &Script) -> bool {
    instructions(script).all(|res| match res {
        Ok(Instruction::PushBytes(_)) => true,
        Ok(Instruction::Op(op)) => op.is_push(),
        Err(_) => false,
    })
}

/// The data pushed by the final instruction, if the script is push-only and
/// non-empty. The pay-to-script-hash spend path executes this element as the
/// redeem script.
pub fn last_pushed_data(script: &Script) -> Option<Vec<u8>> {
    let mut last = None;
    for res in instructions(script) {
        match res.ok()? {
            Instruction::PushBytes(data) => last = Some(data.to_vec()),
            Instruction::Op(op) => match op.decode_pushnum() {
                Some(n) => last = Some(crate::num::ScriptNum::from(n).to_bytes()),
                None if op == all::OP_0 => last = Some(vec![]),
                None => return None,
            },
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(bytes: &[u8]) -> Script {
        Script::from_bytes(bytes.to_vec())
    }

    #[test]
    fn parse_direct_pushes_and_ops() {
        let s = script(&[0x02, 0xaa, 0xbb, 0x76]);
        let parsed: Vec<_> = instructions(&s).collect::<Result<_, _>>().unwrap();
        assert_eq!(
            parsed,
            vec![
                Instruction::PushBytes(&[0xaa, 0xbb]),
                Instruction::Op(all::OP_DUP)
            ]
        );
    }

    #[test]
    fn parse_pushdata_forms() {
        let mut bytes = vec![0x4c, 0x02, 0x01, 0x02]; // PUSHDATA1, len 2
        bytes.extend_from_slice(&[0x4d, 0x01, 0x00, 0xff]); // PUSHDATA2, len 1
        let s = script(&bytes);
        let parsed: Vec<_> = instructions(&s).collect::<Result<_, _>>().unwrap();
        assert_eq!(
            parsed,
            vec![
                Instruction::PushBytes(&[0x01, 0x02]),
                Instruction::PushBytes(&[0xff])
            ]
        );
    }

    #[test]
    fn truncated_push_is_an_error() {
        let s = script(&[0x05, 0xaa]);
        let mut iter = instructions(&s);
        assert_eq!(iter.next(), Some(Err(Error::BadOpcode)));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn minimal_enforcement() {
        // A 2-byte push via PUSHDATA1 is not minimal.
        let s = script(&[0x4c, 0x02, 0xaa, 0xbb]);
        assert!(instructions(&s).all(|r| r.is_ok()));
        assert_eq!(
            instructions_minimal(&s).next(),
            Some(Err(Error::MinimalData))
        );
    }

    #[test]
    fn push_only_classification() {
        assert!(is_push_only(&script(&[0x00, 0x51, 0x02, 0xaa, 0xbb])));
        assert!(!is_push_only(&script(&[0x76])));
        assert!(is_push_only(&script(&[])));
    }

    #[test]
    fn last_push_extraction() {
        let s = script(&[0x01, 0xaa, 0x02, 0xbb, 0xcc]);
        assert_eq!(last_pushed_data(&s), Some(vec![0xbb, 0xcc]));
        assert_eq!(last_pushed_data(&script(&[0x76])), None);
        assert_eq!(last_pushed_data(&script(&[])), None);
        // OP_16 pushes the number 16.
        assert_eq!(last_pushed_data(&script(&[0x60])), Some(vec![16]));
    }
}
