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

use common::primitives::{hash256, H256};

/// Hash of an inner node over its two children.
pub(crate) fn hash_pair(left: &H256, right: &H256) -> H256 {
    let mut concatenated = Vec::with_capacity(64);
    concatenated.extend_from_slice(left.as_bytes());
    concatenated.extend_from_slice(right.as_bytes());
    hash256(&concatenated)
}

/// The Merkle root over the given leaves. A level of odd width pairs its
/// last node with itself; the root of a single leaf is the leaf. An empty
/// slice yields the zero hash (no valid block has zero transactions).
pub fn merkle_root(leaves: &[H256]) -> H256 {
    if leaves.is_empty() {
        return H256::zero();
    }

    let mut level = leaves.to_vec();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().expect("level is non-empty"));
        }
        level = level.chunks(2).map(|pair| hash_pair(&pair[0], &pair[1])).collect();
    }
    level[0]
}

#[cfg(test)]
pub(crate) fn test_leaf(hex_str: &str) -> H256 {
    let bytes: [u8; 32] = hex::decode(hex_str).unwrap().try_into().unwrap();
    H256(bytes)
}

/// The eight-leaf fixture shared across the tree and proof tests; the
/// expected root was computed with an independent implementation.
#[cfg(test)]
pub(crate) fn eight_leaves() -> Vec<H256> {
    [
        "18afbf37d136ff62644b231fcde72f1fb8edd04a798fb00cb06360da635da275",
        "30b19832a5f4b952e151de77d96139987492becc8b6e1e914c4103cfbb06c01e",
        "b94ed12902e35b29dd53cf25e665b4d0bc92f22adbc383ad90566584902b061d",
        "1920e5d8a10018dc65308bb4d1f11d30b5406c6499688443bfcd1ef364206b14",
        "048f3897c16bdc59ec1187aa080a4b4aa5ec1afcb4b776cf8b8a214b01990a7b",
        "266a660e2be5f2fdf41ae21d5a29c4db6270b2686dfe3902bd2dd3bca3626d7c",
        "17c3b888226ce70908303eaecb88ba02aa5ab858fade8576261b1203c6885528",
        "8a06d54b8b411e99b7e4d60c330b8cde4feb23d62edfc25047c4d837dfb5b253",
    ]
    .iter()
    .map(|s| test_leaf(s))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use super::{eight_leaves, test_leaf as leaf};

    #[test]
    fn single_leaf_is_its_own_root() {
        let l = leaf("18afbf37d136ff62644b231fcde72f1fb8edd04a798fb00cb06360da635da275");
        assert_eq!(merkle_root(&[l]), l);
    }

    #[test]
    fn empty_input_yields_zero() {
        assert_eq!(merkle_root(&[]), H256::zero());
    }

    #[test]
    fn eight_leaf_root() {
        assert_eq!(
            merkle_root(&eight_leaves()),
            leaf("1a51e46e7e5438658888f734cb24d646c642411628288e7cc5866ef8e2fde5bc")
        );
    }

    #[test]
    fn odd_width_duplicates_last() {
        let leaves = &eight_leaves()[..3];
        // Manually: level0 = [a b c c'], root = H(H(a,b), H(c,c)).
        let expected = hash_pair(
            &hash_pair(&leaves[0], &leaves[1]),
            &hash_pair(&leaves[2], &leaves[2]),
        );
        assert_eq!(merkle_root(leaves), expected);
    }

    #[test]
    fn root_depends_on_order() {
        let mut leaves = eight_leaves();
        let base = merkle_root(&leaves);
        leaves.swap(0, 1);
        assert_ne!(merkle_root(&leaves), base);
    }
}
