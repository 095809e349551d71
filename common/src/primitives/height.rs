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

/// A position in the active chain; the genesis block is at height zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockHeight(u32);

impl BlockHeight {
    pub const fn new(height: u32) -> Self {
        BlockHeight(height)
    }

    pub const fn zero() -> Self {
        BlockHeight(0)
    }

    pub const fn into_int(self) -> u32 {
        self.0
    }

    pub fn checked_add(self, rhs: u32) -> Option<Self> {
        self.0.checked_add(rhs).map(BlockHeight)
    }

    pub fn checked_sub(self, rhs: u32) -> Option<Self> {
        self.0.checked_sub(rhs).map(BlockHeight)
    }

    pub fn next_height(self) -> Self {
        BlockHeight(self.0.checked_add(1).expect("height overflow"))
    }
}

impl std::fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for BlockHeight {
    fn from(height: u32) -> Self {
        BlockHeight(height)
    }
}
