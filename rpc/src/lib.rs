// Copyright (c) 2022-2023 RBB S.r.l
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

//! The raw-transaction command surface. Commands operate on parsed JSON
//! documents and return JSON documents; transport framing is someone
//! else's problem.

mod error;
mod node;
pub mod rawtx;
pub mod types;

pub use error::Error;
pub use node::{Node, NodeState, NullNetwork, PeerNetwork};
