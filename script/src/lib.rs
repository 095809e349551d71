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

//! The script engine: evaluation and verification of spending conditions,
//! signature-hash computation, signing against a key store, and the
//! standard-template tooling around them.

pub mod asm;
mod builder;
pub mod constants;
mod error;
pub mod instruction;
mod interpreter;
pub mod keystore;
mod num;
pub mod opcodes;
pub mod sighash;
pub mod sign;
pub mod signature_checker;
pub mod solver;
mod stack;
#[cfg(test)]
mod tests;

use bitflags::bitflags;

pub use builder::Builder;
pub use error::Error;
pub use interpreter::{eval_script, verify_script};
pub use num::{NumError, ScriptNum};
pub use stack::Stack;

bitflags! {
    /// Script verification flags. The mandatory set is consensus; the rest
    /// are the standardness rules applied to relayed transactions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VerifyFlags: u32 {
        const NONE = 0;
        const P2SH = 1 << 0;
        const STRICTENC = 1 << 1;
        const DERSIG = 1 << 2;
        const LOW_S = 1 << 3;
        const NULLDUMMY = 1 << 4;
        const SIGPUSHONLY = 1 << 5;
        const MINIMALDATA = 1 << 6;
        const DISCOURAGE_UPGRADABLE_NOPS = 1 << 7;
        const CLEANSTACK = 1 << 8;
        const CHECKLOCKTIMEVERIFY = 1 << 9;
        const CHECKSEQUENCEVERIFY = 1 << 10;
    }
}

/// Flags every block must satisfy.
pub const MANDATORY_VERIFY_FLAGS: VerifyFlags = VerifyFlags::P2SH;

/// Flags applied to transactions entering the memory pool.
pub const STANDARD_VERIFY_FLAGS: VerifyFlags = VerifyFlags::P2SH
    .union(VerifyFlags::STRICTENC)
    .union(VerifyFlags::DERSIG)
    .union(VerifyFlags::LOW_S)
    .union(VerifyFlags::NULLDUMMY)
    .union(VerifyFlags::MINIMALDATA)
    .union(VerifyFlags::DISCOURAGE_UPGRADABLE_NOPS)
    .union(VerifyFlags::CLEANSTACK)
    .union(VerifyFlags::CHECKLOCKTIMEVERIFY)
    .union(VerifyFlags::CHECKSEQUENCEVERIFY);
