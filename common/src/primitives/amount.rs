// Copyright (c) 2021-2022 RBB S.r.l
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

use serialization::{Decode, Encode, Error};

/// Atoms per whole coin in the fixed-point text form.
pub const COIN_DECIMALS: u32 = 8;
const COIN: i64 = 100_000_000;

/// A monetary value in the minimal currency unit. The wire type is a signed
/// 64-bit integer, so this type is signed as well; whether a negative value
/// is acceptable is decided by validation, not here. All arithmetic is
/// checked and returns `None` on overflow.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    atoms: i64,
}

impl Amount {
    pub const ZERO: Amount = Amount { atoms: 0 };

    /// The total money supply; per-output values and fee sums above this are
    /// never valid.
    pub const MAX_MONEY: Amount = Amount {
        atoms: 21_000_000 * COIN,
    };

    pub const fn from_atoms(atoms: i64) -> Self {
        Amount { atoms }
    }

    pub const fn into_atoms(self) -> i64 {
        self.atoms
    }

    pub const fn is_negative(self) -> bool {
        self.atoms < 0
    }

    /// True iff the value lies in `[0, MAX_MONEY]`.
    pub fn is_valid_money(self) -> bool {
        self.atoms >= 0 && self.atoms <= Self::MAX_MONEY.atoms
    }

    /// Renders the amount in whole-coin units with 8 decimal places,
    /// e.g. `1.50000000` for 150_000_000 atoms.
    pub fn into_fixed_decimal_str(self) -> String {
        let sign = if self.atoms < 0 { "-" } else { "" };
        let magnitude = self.atoms.unsigned_abs();
        format!(
            "{}{}.{:08}",
            sign,
            magnitude / COIN as u64,
            magnitude % COIN as u64
        )
    }

    /// Parses a non-negative decimal coin amount with up to 8 fractional
    /// digits, e.g. `"0.01"` -> 1_000_000 atoms. Returns `None` for negative
    /// values, malformed strings, too many decimals, and overflow.
    pub fn from_fixed_decimal_str(s: &str) -> Option<Self> {
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if frac_part.len() > COIN_DECIMALS as usize {
            return None;
        }
        let digits_only =
            |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
        if !int_part.is_empty() && !digits_only(int_part) {
            return None;
        }
        if !frac_part.is_empty() && !digits_only(frac_part) {
            return None;
        }

        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };
        let mut frac: i64 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().ok()?
        };
        for _ in 0..(COIN_DECIMALS as usize - frac_part.len()) {
            frac = frac.checked_mul(10)?;
        }

        let atoms = whole.checked_mul(COIN)?.checked_add(frac)?;
        Some(Amount { atoms })
    }
}

impl std::ops::Add for Amount {
    type Output = Option<Self>;

    fn add(self, other: Self) -> Option<Self> {
        self.atoms.checked_add(other.atoms).map(|atoms| Amount { atoms })
    }
}

impl std::ops::Sub for Amount {
    type Output = Option<Self>;

    fn sub(self, other: Self) -> Option<Self> {
        self.atoms.checked_sub(other.atoms).map(|atoms| Amount { atoms })
    }
}

impl std::ops::Mul<i64> for Amount {
    type Output = Option<Self>;

    fn mul(self, other: i64) -> Option<Self> {
        self.atoms.checked_mul(other).map(|atoms| Amount { atoms })
    }
}

impl std::ops::Div<i64> for Amount {
    type Output = Option<Self>;

    fn div(self, other: i64) -> Option<Self> {
        self.atoms.checked_div(other).map(|atoms| Amount { atoms })
    }
}

impl std::iter::Sum<Amount> for Option<Amount> {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Some(Amount::ZERO), |acc, x| acc.and_then(|a| a + x))
    }
}

impl Encode for Amount {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.atoms.encode_to(dest);
    }

    fn encoded_size(&self) -> usize {
        8
    }
}

impl Decode for Amount {
    fn decode(input: &mut &[u8]) -> Result<Self, Error> {
        i64::decode(input).map(Amount::from_atoms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", 0)]
    #[case("0.01", 1_000_000)]
    #[case("1", COIN)]
    #[case("1.5", 150_000_000)]
    #[case("0.00000001", 1)]
    #[case(".5", 50_000_000)]
    #[case("20999999.99999999", 21_000_000 * COIN - 1)]
    fn parse_fixed_decimal(#[case] s: &str, #[case] atoms: i64) {
        assert_eq!(
            Amount::from_fixed_decimal_str(s),
            Some(Amount::from_atoms(atoms))
        );
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("-1")]
    #[case("1.000000001")]
    #[case("1..1")]
    #[case("1e8")]
    #[case("abc")]
    #[case("99999999999999999999")]
    fn parse_fixed_decimal_rejects(#[case] s: &str) {
        assert_eq!(Amount::from_fixed_decimal_str(s), None);
    }

    #[test]
    fn format_fixed_decimal() {
        assert_eq!(Amount::from_atoms(0).into_fixed_decimal_str(), "0.00000000");
        assert_eq!(
            Amount::from_atoms(150_000_000).into_fixed_decimal_str(),
            "1.50000000"
        );
        assert_eq!(Amount::from_atoms(-1).into_fixed_decimal_str(), "-0.00000001");
    }

    #[test]
    fn checked_arithmetic() {
        let max = Amount::from_atoms(i64::MAX);
        assert_eq!(max + Amount::from_atoms(1), None);
        assert_eq!(Amount::from_atoms(i64::MIN) - Amount::from_atoms(1), None);
        assert_eq!(
            Amount::from_atoms(2) + Amount::from_atoms(3),
            Some(Amount::from_atoms(5))
        );
    }

    #[test]
    fn summing_overflow_is_none() {
        let values = vec![Amount::from_atoms(i64::MAX), Amount::from_atoms(1)];
        assert_eq!(values.into_iter().sum::<Option<Amount>>(), None);
    }

    #[test]
    fn money_range() {
        assert!(Amount::ZERO.is_valid_money());
        assert!(Amount::MAX_MONEY.is_valid_money());
        assert!(!Amount::from_atoms(-1).is_valid_money());
        assert!(!Amount::from_atoms(Amount::MAX_MONEY.into_atoms() + 1).is_valid_money());
    }
}
