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

/// Scripts above this size never execute.
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Largest single stack element.
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// Non-push operations allowed per script.
pub const MAX_OPS_PER_SCRIPT: usize = 201;

/// Combined main-stack plus alt-stack depth limit.
pub const MAX_STACK_SIZE: usize = 1_000;

/// Keys allowed in a single CHECKMULTISIG.
pub const MAX_PUBKEYS_PER_MULTISIG: usize = 20;
