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

use crate::{Decode, Encode};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("Wire decode error: {0}")]
    DecodeError(#[from] crate::Error),
    #[error("Hex decode error: {0}")]
    HexDecodeError(#[from] hex::FromHexError),
}

/// Hex form of the wire encoding; two lowercase digits per byte.
pub trait HexEncode: Encode + Sized {
    fn hex_encode(&self) -> String {
        hex::encode(self.encode())
    }
}

/// Decoding from the hex form. Rejects odd-length strings and non-hex
/// digits before looking at the wire bytes; requires the wire bytes to be
/// fully consumed.
pub trait HexDecode: Decode + Sized {
    fn hex_decode<T: AsRef<[u8]>>(data: T) -> Result<Self, HexError> {
        let unhexed = hex::decode(data)?;
        let decoded = Self::decode_all(unhexed.as_slice())?;
        Ok(decoded)
    }
}

impl<T: Encode> HexEncode for T {}
impl<T: Decode> HexDecode for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase() {
        let data: Vec<u8> = vec![0xAB, 0xCD, 0xEF];
        assert_eq!(data.hex_encode(), "03abcdef");
    }

    #[test]
    fn odd_length_rejected() {
        assert!(matches!(
            Vec::<u8>::hex_decode("03abcde"),
            Err(HexError::HexDecodeError(hex::FromHexError::OddLength))
        ));
    }

    #[test]
    fn non_hex_digit_rejected() {
        assert!(matches!(
            Vec::<u8>::hex_decode("03abcdzz"),
            Err(HexError::HexDecodeError(
                hex::FromHexError::InvalidHexCharacter { .. }
            ))
        ));
    }

    #[test]
    fn roundtrip() {
        let data: Vec<u8> = (0u8..32).collect();
        assert_eq!(Vec::<u8>::hex_decode(data.hex_encode()), Ok(data));
    }
}
