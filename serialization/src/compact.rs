// Copyright (c) 2022 RBB S.r.l
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

use crate::{take, Decode, Encode, Error};

/// The variable-length integer used for lengths and counts on the wire:
/// values below 0xFD occupy a single byte, larger values use a marker byte
/// followed by a little-endian u16/u32/u64. Decoding insists on the shortest
/// possible form; a value encoded with a wider marker than necessary is not
/// a valid encoding of anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CompactSize(pub u64);

impl Encode for CompactSize {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self.0 {
            0..=0xFC => dest.push(self.0 as u8),
            0xFD..=0xFFFF => {
                dest.push(0xFD);
                dest.extend_from_slice(&(self.0 as u16).to_le_bytes());
            }
            0x1_0000..=0xFFFF_FFFF => {
                dest.push(0xFE);
                dest.extend_from_slice(&(self.0 as u32).to_le_bytes());
            }
            _ => {
                dest.push(0xFF);
                dest.extend_from_slice(&self.0.to_le_bytes());
            }
        }
    }

    fn encoded_size(&self) -> usize {
        match self.0 {
            0..=0xFC => 1,
            0xFD..=0xFFFF => 3,
            0x1_0000..=0xFFFF_FFFF => 5,
            _ => 9,
        }
    }
}

impl Decode for CompactSize {
    fn decode(input: &mut &[u8]) -> Result<Self, Error> {
        let marker = take(input, 1)?[0];
        let value = match marker {
            0xFD => {
                let v = u16::decode(input)? as u64;
                if v < 0xFD {
                    return Err(Error::NonCanonicalCompactSize);
                }
                v
            }
            0xFE => {
                let v = u32::decode(input)? as u64;
                if v <= 0xFFFF {
                    return Err(Error::NonCanonicalCompactSize);
                }
                v
            }
            0xFF => {
                let v = u64::decode(input)?;
                if v <= 0xFFFF_FFFF {
                    return Err(Error::NonCanonicalCompactSize);
                }
                v
            }
            small => small as u64,
        };
        Ok(CompactSize(value))
    }
}
