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

use crate::primitives::Amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainType {
    Mainnet,
    Regtest,
}

/// Consensus and policy constants of a chain, collected in one place so no
/// magic number appears at a call site.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    chain_type: ChainType,
    max_block_size: usize,
    coinbase_maturity: u32,
    min_relay_fee_rate_per_kb: Amount,
    /// Fees above `min relay fee for the size × this factor` are considered
    /// a user error and rejected unless explicitly allowed.
    absurd_fee_multiplier: i64,
    p2pkh_address_prefix: u8,
    p2sh_address_prefix: u8,
    wif_key_prefix: u8,
}

impl ChainConfig {
    pub fn mainnet() -> Self {
        ChainConfig {
            chain_type: ChainType::Mainnet,
            max_block_size: 1_000_000,
            coinbase_maturity: 100,
            min_relay_fee_rate_per_kb: Amount::from_atoms(1_000),
            absurd_fee_multiplier: 10_000,
            p2pkh_address_prefix: 0x00,
            p2sh_address_prefix: 0x05,
            wif_key_prefix: 0x80,
        }
    }

    pub fn regtest() -> Self {
        ChainConfig {
            chain_type: ChainType::Regtest,
            p2pkh_address_prefix: 0x6f,
            p2sh_address_prefix: 0xc4,
            wif_key_prefix: 0xef,
            ..Self::mainnet()
        }
    }

    pub fn chain_type(&self) -> ChainType {
        self.chain_type
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    pub fn coinbase_maturity(&self) -> u32 {
        self.coinbase_maturity
    }

    pub fn min_relay_fee_rate_per_kb(&self) -> Amount {
        self.min_relay_fee_rate_per_kb
    }

    pub fn absurd_fee_multiplier(&self) -> i64 {
        self.absurd_fee_multiplier
    }

    pub fn p2pkh_address_prefix(&self) -> u8 {
        self.p2pkh_address_prefix
    }

    pub fn p2sh_address_prefix(&self) -> u8 {
        self.p2sh_address_prefix
    }

    pub fn wif_key_prefix(&self) -> u8 {
        self.wif_key_prefix
    }
}
