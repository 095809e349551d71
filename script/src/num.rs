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

//! Script integers: little-endian, sign-and-magnitude, at most four bytes on
//! input (five for the timelock opcodes). Results of arithmetic may exceed
//! the input range; they are re-encoded minimally on push.

use std::ops::{Add, Neg, Sub};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum NumError {
    #[error("Script number overflow")]
    Overflow,
    #[error("Non-minimally encoded script number")]
    NotMinimallyEncoded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScriptNum(i64);

impl<T: Into<i64>> From<T> for ScriptNum {
    fn from(value: T) -> Self {
        ScriptNum(value.into())
    }
}

impl ScriptNum {
    /// Numeric operands are limited to this many bytes.
    pub const MAX_NUM_SIZE: usize = 4;

    pub fn from_bytes(
        data: &[u8],
        require_minimal: bool,
        max_size: Option<usize>,
    ) -> Result<Self, NumError> {
        let max_size = max_size.unwrap_or(Self::MAX_NUM_SIZE);
        if data.len() > max_size {
            return Err(NumError::Overflow);
        }
        if data.is_empty() {
            return Ok(ScriptNum(0));
        }
        if require_minimal && !Self::is_minimally_encoded(data) {
            return Err(NumError::NotMinimallyEncoded);
        }

        let mut result: i64 = 0;
        for (i, &byte) in data.iter().enumerate() {
            result |= i64::from(byte) << (8 * i);
        }

        // The top bit of the last byte is the sign.
        let last = *data.last().expect("non-empty checked above");
        if last & 0x80 != 0 {
            let sign_bit = 0x80i64 << (8 * (data.len() - 1));
            Ok(ScriptNum(-(result & !sign_bit)))
        } else {
            Ok(ScriptNum(result))
        }
    }

    /// Minimal little-endian sign-and-magnitude encoding; zero is the empty
    /// vector.
    pub fn to_bytes(self) -> Vec<u8> {
        if self.0 == 0 {
            return vec![];
        }

        let negative = self.0 < 0;
        let mut magnitude = self.0.unsigned_abs();
        let mut result = Vec::with_capacity(9);
        while magnitude > 0 {
            result.push((magnitude & 0xff) as u8);
            magnitude >>= 8;
        }

        // If the top byte already uses the sign bit, a padding byte carries
        // the sign instead.
        if result.last().expect("non-zero value") & 0x80 != 0 {
            result.push(if negative { 0x80 } else { 0x00 });
        } else if negative {
            *result.last_mut().expect("non-zero value") |= 0x80;
        }

        result
    }

    fn is_minimally_encoded(data: &[u8]) -> bool {
        match data.last() {
            None => true,
            // A trailing byte that carries nothing but the (cleared) sign bit
            // is only allowed when the byte below needs its top bit.
            Some(&last) if last & 0x7f == 0 => {
                data.len() > 1 && data[data.len() - 2] & 0x80 != 0
            }
            Some(_) => true,
        }
    }

    pub fn value(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Self {
        ScriptNum(self.0.abs())
    }
}

impl Add for ScriptNum {
    type Output = Result<Self, NumError>;

    fn add(self, other: Self) -> Self::Output {
        self.0.checked_add(other.0).map(ScriptNum).ok_or(NumError::Overflow)
    }
}

impl Sub for ScriptNum {
    type Output = Result<Self, NumError>;

    fn sub(self, other: Self) -> Self::Output {
        self.0.checked_sub(other.0).map(ScriptNum).ok_or(NumError::Overflow)
    }
}

impl Neg for ScriptNum {
    type Output = Result<Self, NumError>;

    fn neg(self) -> Self::Output {
        self.0.checked_neg().map(ScriptNum).ok_or(NumError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "")]
    #[case(1, "01")]
    #[case(-1, "81")]
    #[case(127, "7f")]
    #[case(-127, "ff")]
    #[case(128, "8000")]
    #[case(-128, "8080")]
    #[case(256, "0001")]
    #[case(-256, "0081")]
    #[case(32767, "ff7f")]
    #[case(-32767, "ffff")]
    #[case(8388608, "00008000")]
    #[case(2147483647, "ffffff7f")]
    #[case(-2147483647, "ffffffff")]
    fn encode_decode(#[case] value: i64, #[case] hex_bytes: &str) {
        let bytes = hex::decode(hex_bytes).unwrap();
        assert_eq!(ScriptNum::from(value).to_bytes(), bytes);
        // Values that need at most 4 bytes parse back.
        if bytes.len() <= ScriptNum::MAX_NUM_SIZE {
            assert_eq!(
                ScriptNum::from_bytes(&bytes, true, None).map(ScriptNum::value),
                Ok(value)
            );
        }
    }

    #[rstest]
    #[case("00")]
    #[case("80")]
    #[case("0100")]
    #[case("7f00")]
    #[case("ff7f00")]
    fn non_minimal_rejected(#[case] hex_bytes: &str) {
        let bytes = hex::decode(hex_bytes).unwrap();
        assert_eq!(
            ScriptNum::from_bytes(&bytes, true, None),
            Err(NumError::NotMinimallyEncoded)
        );
        // Accepted when minimality is not demanded.
        assert!(ScriptNum::from_bytes(&bytes, false, None).is_ok());
    }

    #[test]
    fn padding_with_sign_bit_below_is_minimal() {
        // 0x80 0x00 encodes +128; the second byte is required.
        let n = ScriptNum::from_bytes(&[0x80, 0x00], true, None).unwrap();
        assert_eq!(n.value(), 128);
    }

    #[test]
    fn oversize_rejected() {
        assert_eq!(
            ScriptNum::from_bytes(&[1, 2, 3, 4, 5], true, None),
            Err(NumError::Overflow)
        );
        // The timelock opcodes allow five bytes.
        assert!(ScriptNum::from_bytes(&[1, 2, 3, 4, 5], true, Some(5)).is_ok());
    }

    #[test]
    fn checked_arithmetic() {
        let a = ScriptNum::from(5);
        let b = ScriptNum::from(3);
        assert_eq!((a + b).unwrap().value(), 8);
        assert_eq!((a - b).unwrap().value(), 2);
        assert_eq!((-a).unwrap().value(), -5);
        assert_eq!(
            ScriptNum::from(i64::MAX) + ScriptNum::from(1),
            Err(NumError::Overflow)
        );
    }
}
