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

use crate::instruction::{instructions, Instruction};
use crate::num::ScriptNum;

/// Renders a script in assembly form: opcode names, pushes of at most four
/// bytes as their numeric value, larger pushes as hex. An unparsable tail
/// renders as `[error]`.
pub fn to_asm_string(script: &Script) -> String {
    let mut parts: Vec<String> = Vec::new();
    for item in instructions(script) {
        match item {
            Ok(Instruction::PushBytes(data)) => {
                if data.len() <= ScriptNum::MAX_NUM_SIZE {
                    match ScriptNum::from_bytes(data, false, None) {
                        Ok(n) => parts.push(n.value().to_string()),
                        Err(_) => parts.push(hex::encode(data)),
                    }
                } else {
                    parts.push(hex::encode(data));
                }
            }
            Ok(Instruction::Op(op)) => parts.push(op.name().to_string()),
            Err(_) => {
                parts.push("[error]".to_string());
                break;
            }
        }
    }
    parts.join(" ")
}
