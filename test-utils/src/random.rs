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

pub use rand::{seq::SliceRandom, Rng, RngCore, SeedableRng};

/// The seed of a randomised test, printed on failure via rstest's `#[trace]`
/// so that failing runs can be replayed with `Seed(n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed(pub u64);

impl Seed {
    pub fn from_entropy() -> Self {
        Self(rand::random::<u64>())
    }

    pub const fn from_u64(v: u64) -> Self {
        Self(v)
    }
}

impl From<u64> for Seed {
    fn from(v: u64) -> Self {
        Seed(v)
    }
}

pub fn make_seedable_rng(seed: Seed) -> impl Rng {
    rand::rngs::StdRng::seed_from_u64(seed.0)
}
