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

//! Consensus wire codec.
//!
//! Fixed-width integers are little-endian; lengths are prefixed with the
//! compact-size encoding; sequences are a compact-size count followed by the
//! encoded items in order. Everything here is byte-exact: `decode ∘ encode`
//! is the identity for every valid value and `encode ∘ decode` is the
//! identity for every well-formed byte string.

mod compact;
pub mod hex_encoded;

pub use compact::CompactSize;
pub use hex_encoded::{HexDecode, HexEncode, HexError};

/// The largest length a decoded byte string or sequence is allowed to claim.
/// Anything above this cannot fit in a block, so a larger prefix is garbage
/// and is rejected before any allocation happens.
pub const MAX_DECODE_SIZE: usize = 1_000_000;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Compact size is not canonically encoded")]
    NonCanonicalCompactSize,
    #[error("Declared size {0} exceeds the decode limit {MAX_DECODE_SIZE}")]
    SizeTooLarge(u64),
    #[error("Input not fully consumed; {0} trailing bytes")]
    TrailingData(usize),
}

type Result<T> = std::result::Result<T, Error>;

/// Consensus encoding of a value.
pub trait Encode {
    fn encode_to(&self, dest: &mut Vec<u8>);

    fn encode(&self) -> Vec<u8> {
        let mut dest = Vec::new();
        self.encode_to(&mut dest);
        dest
    }

    /// Size of the encoding in bytes.
    fn encoded_size(&self) -> usize {
        self.encode().len()
    }
}

/// Consensus decoding of a value. The input slice is advanced past the bytes
/// that were consumed.
pub trait Decode: Sized {
    fn decode(input: &mut &[u8]) -> Result<Self>;

    /// Decodes a value and requires the input to be fully consumed.
    fn decode_all(mut input: &[u8]) -> Result<Self> {
        let value = Self::decode(&mut input)?;
        if !input.is_empty() {
            return Err(Error::TrailingData(input.len()));
        }
        Ok(value)
    }
}

pub(crate) fn take<'a>(input: &mut &'a [u8], len: usize) -> Result<&'a [u8]> {
    if input.len() < len {
        return Err(Error::UnexpectedEof);
    }
    let (head, rest) = input.split_at(len);
    *input = rest;
    Ok(head)
}

macro_rules! impl_int_codec {
    ($($ty:ty),*) => {
        $(
            impl Encode for $ty {
                fn encode_to(&self, dest: &mut Vec<u8>) {
                    dest.extend_from_slice(&self.to_le_bytes());
                }

                fn encoded_size(&self) -> usize {
                    std::mem::size_of::<$ty>()
                }
            }

            impl Decode for $ty {
                fn decode(input: &mut &[u8]) -> Result<Self> {
                    let bytes = take(input, std::mem::size_of::<$ty>())?;
                    Ok(<$ty>::from_le_bytes(bytes.try_into().expect("length checked above")))
                }
            }
        )*
    };
}

impl_int_codec!(u8, u16, u32, u64, i32, i64);

// A `Vec<u8>` goes through this impl as well: a compact-size count followed
// by the raw bytes, since each `u8` encodes to itself.
impl<T: Encode> Encode for Vec<T> {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        CompactSize(self.len() as u64).encode_to(dest);
        for item in self {
            item.encode_to(dest);
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        let count = CompactSize::decode(input)?.0;
        if count > MAX_DECODE_SIZE as u64 {
            return Err(Error::SizeTooLarge(count));
        }
        // Every item consumes at least one byte, so a count larger than the
        // remaining input is unsatisfiable and must not drive an allocation.
        if count > input.len() as u64 {
            return Err(Error::UnexpectedEof);
        }
        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            items.push(T::decode(input)?);
        }
        Ok(items)
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        dest.extend_from_slice(self);
    }

    fn encoded_size(&self) -> usize {
        N
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        let bytes = take(input, N)?;
        Ok(bytes.try_into().expect("length checked above"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0u32, &[0x00, 0x00, 0x00, 0x00])]
    #[case(1u32, &[0x01, 0x00, 0x00, 0x00])]
    #[case(0x12345678u32, &[0x78, 0x56, 0x34, 0x12])]
    #[case(u32::MAX, &[0xff, 0xff, 0xff, 0xff])]
    fn u32_little_endian(#[case] value: u32, #[case] encoded: &[u8]) {
        assert_eq!(value.encode(), encoded);
        assert_eq!(u32::decode_all(encoded), Ok(value));
    }

    #[test]
    fn i64_roundtrip() {
        for value in [0i64, 1, -1, i64::MIN, i64::MAX, 546] {
            assert_eq!(i64::decode_all(&value.encode()), Ok(value));
        }
    }

    #[test]
    fn byte_vector_roundtrip() {
        let data = vec![0xdeu8, 0xad, 0xbe, 0xef];
        let encoded = data.encode();
        assert_eq!(encoded, vec![0x04, 0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(Vec::<u8>::decode_all(&encoded), Ok(data));
    }

    #[test]
    fn truncated_input_is_eof() {
        assert_eq!(u64::decode_all(&[0x01, 0x02]), Err(Error::UnexpectedEof));
        // Count claims 4 items but only 2 bytes follow.
        assert_eq!(
            Vec::<u8>::decode_all(&[0x04, 0xaa, 0xbb]),
            Err(Error::UnexpectedEof)
        );
    }

    #[test]
    fn trailing_bytes_rejected() {
        assert_eq!(
            u8::decode_all(&[0x01, 0x02]),
            Err(Error::TrailingData(1))
        );
    }

    #[test]
    fn oversize_count_rejected_before_allocation() {
        let mut encoded = vec![0xff];
        encoded.extend_from_slice(&u64::MAX.to_le_bytes());
        assert_eq!(
            Vec::<u8>::decode_all(&encoded),
            Err(Error::SizeTooLarge(u64::MAX))
        );
    }
}
