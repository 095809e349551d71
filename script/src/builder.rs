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

use crate::num::ScriptNum;
use crate::opcodes::{all, Opcode};

/// Incremental script construction with minimal push encodings.
#[derive(Debug, Default, Clone)]
pub struct Builder {
    data: Vec<u8>,
}

impl Builder {
    pub fn new() -> Self {
        Builder::default()
    }

    pub fn push_opcode(mut self, opcode: Opcode) -> Self {
        self.data.push(opcode.to_u8());
        self
    }

    /// Pushes an integer using the smallest encoding: the dedicated opcodes
    /// for -1..=16, a minimal script number otherwise.
    pub fn push_int(self, value: i64) -> Self {
        match value {
            0 => self.push_opcode(all::OP_0),
            -1 => self.push_opcode(all::OP_1NEGATE),
            1..=16 => self.push_opcode(Opcode(all::OP_1.0 + (value as u8 - 1))),
            _ => self.push_data(&ScriptNum::from(value).to_bytes()),
        }
    }

    /// Pushes raw bytes with the shortest framing that fits.
    pub fn push_data(mut self, data: &[u8]) -> Self {
        match data.len() {
            len @ 0..=75 => self.data.push(len as u8),
            len @ 76..=255 => {
                self.data.push(all::OP_PUSHDATA1.to_u8());
                self.data.push(len as u8);
            }
            len @ 256..=65535 => {
                self.data.push(all::OP_PUSHDATA2.to_u8());
                self.data.extend_from_slice(&(len as u16).to_le_bytes());
            }
            len => {
                self.data.push(all::OP_PUSHDATA4.to_u8());
                self.data.extend_from_slice(&(len as u32).to_le_bytes());
            }
        }
        self.data.extend_from_slice(data);
        self
    }

    pub fn into_script(self) -> Script {
        Script::from_bytes(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_integers_use_opcodes() {
        assert_eq!(Builder::new().push_int(0).into_script().as_bytes(), &[0x00]);
        assert_eq!(Builder::new().push_int(-1).into_script().as_bytes(), &[0x4f]);
        assert_eq!(Builder::new().push_int(1).into_script().as_bytes(), &[0x51]);
        assert_eq!(Builder::new().push_int(16).into_script().as_bytes(), &[0x60]);
        assert_eq!(
            Builder::new().push_int(17).into_script().as_bytes(),
            &[0x01, 0x11]
        );
        assert_eq!(
            Builder::new().push_int(-2).into_script().as_bytes(),
            &[0x01, 0x82]
        );
    }

    #[test]
    fn push_framing_boundaries() {
        let direct = Builder::new().push_data(&[0xaa; 75]).into_script();
        assert_eq!(direct.as_bytes()[0], 75);

        let pushdata1 = Builder::new().push_data(&[0xaa; 76]).into_script();
        assert_eq!(&pushdata1.as_bytes()[..2], &[0x4c, 76]);

        let pushdata2 = Builder::new().push_data(&[0xaa; 256]).into_script();
        assert_eq!(&pushdata2.as_bytes()[..3], &[0x4d, 0x00, 0x01]);
    }

    #[test]
    fn chained_build() {
        let script = Builder::new()
            .push_int(3)
            .push_int(5)
            .push_opcode(all::OP_ADD)
            .into_script();
        assert_eq!(script.as_bytes(), &[0x53, 0x55, 0x93]);
    }
}
