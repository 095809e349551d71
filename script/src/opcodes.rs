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

//! Script opcodes. Every byte value is an opcode; values up to
//! [`all::OP_PUSHBYTES_75`] push that many following bytes onto the stack.

/// A single opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Opcode(pub u8);

impl Opcode {
    pub const fn to_u8(self) -> u8 {
        self.0
    }

    /// Whether the opcode pushes data (including the small-integer and
    /// pushdata forms).
    pub fn is_push(self) -> bool {
        use all::*;
        self.0 <= OP_PUSHNUM_16.0 && self != OP_RESERVED
    }

    /// For `OP_1`..`OP_16` and `OP_1NEGATE`, the small number it pushes.
    pub fn decode_pushnum(self) -> Option<i64> {
        use all::*;
        match self {
            OP_1NEGATE => Some(-1),
            op if (OP_1.0..=OP_PUSHNUM_16.0).contains(&op.0) => {
                Some((op.0 - OP_1.0 + 1) as i64)
            }
            _ => None,
        }
    }

    /// Opcodes whose execution is forbidden anywhere in a script, even on a
    /// non-taken conditional branch.
    pub fn is_disabled(self) -> bool {
        use all::*;
        matches!(
            self,
            OP_CAT | OP_SUBSTR | OP_LEFT | OP_RIGHT | OP_INVERT | OP_AND | OP_OR | OP_XOR
                | OP_2MUL | OP_2DIV | OP_MUL | OP_DIV | OP_MOD | OP_LSHIFT | OP_RSHIFT
        )
    }

    /// The display name in script assembly; unknown bytes render as
    /// `OP_UNKNOWN`.
    pub fn name(self) -> &'static str {
        use all::*;
        match self {
            OP_0 => "0",
            OP_PUSHDATA1 => "OP_PUSHDATA1",
            OP_PUSHDATA2 => "OP_PUSHDATA2",
            OP_PUSHDATA4 => "OP_PUSHDATA4",
            OP_1NEGATE => "-1",
            OP_RESERVED => "OP_RESERVED",
            OP_1 => "1",
            OP_2 => "2",
            OP_3 => "3",
            OP_4 => "4",
            OP_5 => "5",
            OP_6 => "6",
            OP_7 => "7",
            OP_8 => "8",
            OP_9 => "9",
            OP_10 => "10",
            OP_11 => "11",
            OP_12 => "12",
            OP_13 => "13",
            OP_14 => "14",
            OP_15 => "15",
            OP_PUSHNUM_16 => "16",
            OP_NOP => "OP_NOP",
            OP_VER => "OP_VER",
            OP_IF => "OP_IF",
            OP_NOTIF => "OP_NOTIF",
            OP_VERIF => "OP_VERIF",
            OP_VERNOTIF => "OP_VERNOTIF",
            OP_ELSE => "OP_ELSE",
            OP_ENDIF => "OP_ENDIF",
            OP_VERIFY => "OP_VERIFY",
            OP_RETURN => "OP_RETURN",
            OP_TOALTSTACK => "OP_TOALTSTACK",
            OP_FROMALTSTACK => "OP_FROMALTSTACK",
            OP_2DROP => "OP_2DROP",
            OP_2DUP => "OP_2DUP",
            OP_3DUP => "OP_3DUP",
            OP_2OVER => "OP_2OVER",
            OP_2ROT => "OP_2ROT",
            OP_2SWAP => "OP_2SWAP",
            OP_IFDUP => "OP_IFDUP",
            OP_DEPTH => "OP_DEPTH",
            OP_DROP => "OP_DROP",
            OP_DUP => "OP_DUP",
            OP_NIP => "OP_NIP",
            OP_OVER => "OP_OVER",
            OP_PICK => "OP_PICK",
            OP_ROLL => "OP_ROLL",
            OP_ROT => "OP_ROT",
            OP_SWAP => "OP_SWAP",
            OP_TUCK => "OP_TUCK",
            OP_CAT => "OP_CAT",
            OP_SUBSTR => "OP_SUBSTR",
            OP_LEFT => "OP_LEFT",
            OP_RIGHT => "OP_RIGHT",
            OP_SIZE => "OP_SIZE",
            OP_INVERT => "OP_INVERT",
            OP_AND => "OP_AND",
            OP_OR => "OP_OR",
            OP_XOR => "OP_XOR",
            OP_EQUAL => "OP_EQUAL",
            OP_EQUALVERIFY => "OP_EQUALVERIFY",
            OP_RESERVED1 => "OP_RESERVED1",
            OP_RESERVED2 => "OP_RESERVED2",
            OP_1ADD => "OP_1ADD",
            OP_1SUB => "OP_1SUB",
            OP_2MUL => "OP_2MUL",
            OP_2DIV => "OP_2DIV",
            OP_NEGATE => "OP_NEGATE",
            OP_ABS => "OP_ABS",
            OP_NOT => "OP_NOT",
            OP_0NOTEQUAL => "OP_0NOTEQUAL",
            OP_ADD => "OP_ADD",
            OP_SUB => "OP_SUB",
            OP_MUL => "OP_MUL",
            OP_DIV => "OP_DIV",
            OP_MOD => "OP_MOD",
            OP_LSHIFT => "OP_LSHIFT",
            OP_RSHIFT => "OP_RSHIFT",
            OP_BOOLAND => "OP_BOOLAND",
            OP_BOOLOR => "OP_BOOLOR",
            OP_NUMEQUAL => "OP_NUMEQUAL",
            OP_NUMEQUALVERIFY => "OP_NUMEQUALVERIFY",
            OP_NUMNOTEQUAL => "OP_NUMNOTEQUAL",
            OP_LESSTHAN => "OP_LESSTHAN",
            OP_GREATERTHAN => "OP_GREATERTHAN",
            OP_LESSTHANOREQUAL => "OP_LESSTHANOREQUAL",
            OP_GREATERTHANOREQUAL => "OP_GREATERTHANOREQUAL",
            OP_MIN => "OP_MIN",
            OP_MAX => "OP_MAX",
            OP_WITHIN => "OP_WITHIN",
            OP_RIPEMD160 => "OP_RIPEMD160",
            OP_SHA1 => "OP_SHA1",
            OP_SHA256 => "OP_SHA256",
            OP_HASH160 => "OP_HASH160",
            OP_HASH256 => "OP_HASH256",
            OP_CODESEPARATOR => "OP_CODESEPARATOR",
            OP_CHECKSIG => "OP_CHECKSIG",
            OP_CHECKSIGVERIFY => "OP_CHECKSIGVERIFY",
            OP_CHECKMULTISIG => "OP_CHECKMULTISIG",
            OP_CHECKMULTISIGVERIFY => "OP_CHECKMULTISIGVERIFY",
            OP_NOP1 => "OP_NOP1",
            OP_CHECKLOCKTIMEVERIFY => "OP_CHECKLOCKTIMEVERIFY",
            OP_CHECKSEQUENCEVERIFY => "OP_CHECKSEQUENCEVERIFY",
            OP_NOP4 => "OP_NOP4",
            OP_NOP5 => "OP_NOP5",
            OP_NOP6 => "OP_NOP6",
            OP_NOP7 => "OP_NOP7",
            OP_NOP8 => "OP_NOP8",
            OP_NOP9 => "OP_NOP9",
            OP_NOP10 => "OP_NOP10",
            op if op.0 <= OP_PUSHBYTES_75.0 => "OP_PUSHBYTES",
            _ => "OP_UNKNOWN",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// All named opcode constants.
pub mod all {
    use super::Opcode;

    pub const OP_0: Opcode = Opcode(0x00);
    pub const OP_PUSHBYTES_75: Opcode = Opcode(0x4b);
    pub const OP_PUSHDATA1: Opcode = Opcode(0x4c);
    pub const OP_PUSHDATA2: Opcode = Opcode(0x4d);
    pub const OP_PUSHDATA4: Opcode = Opcode(0x4e);
    pub const OP_1NEGATE: Opcode = Opcode(0x4f);
    pub const OP_RESERVED: Opcode = Opcode(0x50);
    pub const OP_1: Opcode = Opcode(0x51);
    pub const OP_2: Opcode = Opcode(0x52);
    pub const OP_3: Opcode = Opcode(0x53);
    pub const OP_4: Opcode = Opcode(0x54);
    pub const OP_5: Opcode = Opcode(0x55);
    pub const OP_6: Opcode = Opcode(0x56);
    pub const OP_7: Opcode = Opcode(0x57);
    pub const OP_8: Opcode = Opcode(0x58);
    pub const OP_9: Opcode = Opcode(0x59);
    pub const OP_10: Opcode = Opcode(0x5a);
    pub const OP_11: Opcode = Opcode(0x5b);
    pub const OP_12: Opcode = Opcode(0x5c);
    pub const OP_13: Opcode = Opcode(0x5d);
    pub const OP_14: Opcode = Opcode(0x5e);
    pub const OP_15: Opcode = Opcode(0x5f);
    pub const OP_PUSHNUM_16: Opcode = Opcode(0x60);
    pub const OP_NOP: Opcode = Opcode(0x61);
    pub const OP_VER: Opcode = Opcode(0x62);
    pub const OP_IF: Opcode = Opcode(0x63);
    pub const OP_NOTIF: Opcode = Opcode(0x64);
    pub const OP_VERIF: Opcode = Opcode(0x65);
    pub const OP_VERNOTIF: Opcode = Opcode(0x66);
    pub const OP_ELSE: Opcode = Opcode(0x67);
    pub const OP_ENDIF: Opcode = Opcode(0x68);
    pub const OP_VERIFY: Opcode = Opcode(0x69);
    pub const OP_RETURN: Opcode = Opcode(0x6a);
    pub const OP_TOALTSTACK: Opcode = Opcode(0x6b);
    pub const OP_FROMALTSTACK: Opcode = Opcode(0x6c);
    pub const OP_2DROP: Opcode = Opcode(0x6d);
    pub const OP_2DUP: Opcode = Opcode(0x6e);
    pub const OP_3DUP: Opcode = Opcode(0x6f);
    pub const OP_2OVER: Opcode = Opcode(0x70);
    pub const OP_2ROT: Opcode = Opcode(0x71);
    pub const OP_2SWAP: Opcode = Opcode(0x72);
    pub const OP_IFDUP: Opcode = Opcode(0x73);
    pub const OP_DEPTH: Opcode = Opcode(0x74);
    pub const OP_DROP: Opcode = Opcode(0x75);
    pub const OP_DUP: Opcode = Opcode(0x76);
    pub const OP_NIP: Opcode = Opcode(0x77);
    pub const OP_OVER: Opcode = Opcode(0x78);
    pub const OP_PICK: Opcode = Opcode(0x79);
    pub const OP_ROLL: Opcode = Opcode(0x7a);
    pub const OP_ROT: Opcode = Opcode(0x7b);
    pub const OP_SWAP: Opcode = Opcode(0x7c);
    pub const OP_TUCK: Opcode = Opcode(0x7d);
    pub const OP_CAT: Opcode = Opcode(0x7e);
    pub const OP_SUBSTR: Opcode = Opcode(0x7f);
    pub const OP_LEFT: Opcode = Opcode(0x80);
    pub const OP_RIGHT: Opcode = Opcode(0x81);
    pub const OP_SIZE: Opcode = Opcode(0x82);
    pub const OP_INVERT: Opcode = Opcode(0x83);
    pub const OP_AND: Opcode = Opcode(0x84);
    pub const OP_OR: Opcode = Opcode(0x85);
    pub const OP_XOR: Opcode = Opcode(0x86);
    pub const OP_EQUAL: Opcode = Opcode(0x87);
    pub const OP_EQUALVERIFY: Opcode = Opcode(0x88);
    pub const OP_RESERVED1: Opcode = Opcode(0x89);
    pub const OP_RESERVED2: Opcode = Opcode(0x8a);
    pub const OP_1ADD: Opcode = Opcode(0x8b);
    pub const OP_1SUB: Opcode = Opcode(0x8c);
    pub const OP_2MUL: Opcode = Opcode(0x8d);
    pub const OP_2DIV: Opcode = Opcode(0x8e);
    pub const OP_NEGATE: Opcode = Opcode(0x8f);
    pub const OP_ABS: Opcode = Opcode(0x90);
    pub const OP_NOT: Opcode = Opcode(0x91);
    pub const OP_0NOTEQUAL: Opcode = Opcode(0x92);
    pub const OP_ADD: Opcode = Opcode(0x93);
    pub const OP_SUB: Opcode = Opcode(0x94);
    pub const OP_MUL: Opcode = Opcode(0x95);
    pub const OP_DIV: Opcode = Opcode(0x96);
    pub const OP_MOD: Opcode = Opcode(0x97);
    pub const OP_LSHIFT: Opcode = Opcode(0x98);
    pub const OP_RSHIFT: Opcode = Opcode(0x99);
    pub const OP_BOOLAND: Opcode = Opcode(0x9a);
    pub const OP_BOOLOR: Opcode = Opcode(0x9b);
    pub const OP_NUMEQUAL: Opcode = Opcode(0x9c);
    pub const OP_NUMEQUALVERIFY: Opcode = Opcode(0x9d);
    pub const OP_NUMNOTEQUAL: Opcode = Opcode(0x9e);
    pub const OP_LESSTHAN: Opcode = Opcode(0x9f);
    pub const OP_GREATERTHAN: Opcode = Opcode(0xa0);
    pub const OP_LESSTHANOREQUAL: Opcode = Opcode(0xa1);
    pub const OP_GREATERTHANOREQUAL: Opcode = Opcode(0xa2);
    pub const OP_MIN: Opcode = Opcode(0xa3);
    pub const OP_MAX: Opcode = Opcode(0xa4);
    pub const OP_WITHIN: Opcode = Opcode(0xa5);
    pub const OP_RIPEMD160: Opcode = Opcode(0xa6);
    pub const OP_SHA1: Opcode = Opcode(0xa7);
    pub const OP_SHA256: Opcode = Opcode(0xa8);
    pub const OP_HASH160: Opcode = Opcode(0xa9);
    pub const OP_HASH256: Opcode = Opcode(0xaa);
    pub const OP_CODESEPARATOR: Opcode = Opcode(0xab);
    pub const OP_CHECKSIG: Opcode = Opcode(0xac);
    pub const OP_CHECKSIGVERIFY: Opcode = Opcode(0xad);
    pub const OP_CHECKMULTISIG: Opcode = Opcode(0xae);
    pub const OP_CHECKMULTISIGVERIFY: Opcode = Opcode(0xaf);
    pub const OP_NOP1: Opcode = Opcode(0xb0);
    pub const OP_CHECKLOCKTIMEVERIFY: Opcode = Opcode(0xb1);
    pub const OP_CHECKSEQUENCEVERIFY: Opcode = Opcode(0xb2);
    pub const OP_NOP4: Opcode = Opcode(0xb3);
    pub const OP_NOP5: Opcode = Opcode(0xb4);
    pub const OP_NOP6: Opcode = Opcode(0xb5);
    pub const OP_NOP7: Opcode = Opcode(0xb6);
    pub const OP_NOP8: Opcode = Opcode(0xb7);
    pub const OP_NOP9: Opcode = Opcode(0xb8);
    pub const OP_NOP10: Opcode = Opcode(0xb9);
}

#[cfg(test)]
mod tests {
    use super::all::*;
    use super::*;

    #[test]
    fn pushnum_decoding() {
        assert_eq!(OP_1NEGATE.decode_pushnum(), Some(-1));
        assert_eq!(OP_1.decode_pushnum(), Some(1));
        assert_eq!(OP_PUSHNUM_16.decode_pushnum(), Some(16));
        assert_eq!(OP_0.decode_pushnum(), None);
        assert_eq!(OP_DUP.decode_pushnum(), None);
    }

    #[test]
    fn push_classification() {
        assert!(OP_0.is_push());
        assert!(OP_PUSHBYTES_75.is_push());
        assert!(OP_PUSHDATA4.is_push());
        assert!(OP_PUSHNUM_16.is_push());
        assert!(!OP_RESERVED.is_push());
        assert!(!OP_NOP.is_push());
    }

    #[test]
    fn names() {
        assert_eq!(OP_DUP.name(), "OP_DUP");
        assert_eq!(OP_0.name(), "0");
        assert_eq!(Opcode(0xff).name(), "OP_UNKNOWN");
    }
}
