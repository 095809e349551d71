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

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chainstate::{InMemoryChainStore, TxIndex};
use common::chain::{config::ChainConfig, Block, Transaction};
use common::primitives::{Id, Idable};
use logging::log;
use mempool::Mempool;
use script::keystore::MemoryKeyStore;
use utxo::{Utxo, UtxoSource, UtxosStore};

/// The relay upcall into the gossip layer. A failed or absent network is
/// never fatal to a command.
pub trait PeerNetwork: Send + Sync {
    fn relay(&self, txid: &Id<Transaction>);
}

/// A network that goes nowhere; standalone nodes and tests.
pub struct NullNetwork;

impl PeerNetwork for NullNetwork {
    fn relay(&self, txid: &Id<Transaction>) {
        log::debug!("no peers configured, not relaying {txid}");
    }
}

/// Everything guarded by the `main` lock: the active chain, the chain-tip
/// utxo set and the optional transaction index.
pub struct NodeState {
    pub chain: InMemoryChainStore,
    pub coins: UtxosStore,
    pub tx_index: Option<TxIndex>,
}

/// The shared state a command handler works against. Lock order is fixed:
/// `chain` (the `main` domain) before `mempool` before `wallet`; handlers
/// never suspend while holding any of them.
pub struct Node {
    config: Arc<ChainConfig>,
    chain: RwLock<NodeState>,
    mempool: Mutex<Mempool>,
    wallet: Mutex<MemoryKeyStore>,
    network: Arc<dyn PeerNetwork>,
}

impl Node {
    pub fn new(config: ChainConfig, network: Arc<dyn PeerNetwork>) -> Self {
        let config = Arc::new(config);
        Node {
            chain: RwLock::new(NodeState {
                chain: InMemoryChainStore::new(),
                coins: UtxosStore::new(),
                tx_index: None,
            }),
            mempool: Mutex::new(Mempool::new(Arc::clone(&config))),
            wallet: Mutex::new(MemoryKeyStore::new()),
            network,
            config,
        }
    }

    /// Enables the transaction index; blocks connected from now on are
    /// indexed. Normally decided at startup.
    pub fn enable_tx_index(&self) {
        let mut state = self.chain.write();
        if state.tx_index.is_none() {
            state.tx_index = Some(TxIndex::new());
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn config_arc(&self) -> Arc<ChainConfig> {
        Arc::clone(&self.config)
    }

    pub(crate) fn chain_read(&self) -> RwLockReadGuard<'_, NodeState> {
        self.chain.read()
    }

    pub(crate) fn chain_write(&self) -> RwLockWriteGuard<'_, NodeState> {
        self.chain.write()
    }

    pub(crate) fn mempool_lock(&self) -> MutexGuard<'_, Mempool> {
        self.mempool.lock()
    }

    pub(crate) fn wallet_lock(&self) -> MutexGuard<'_, MemoryKeyStore> {
        self.wallet.lock()
    }

    pub(crate) fn network(&self) -> &dyn PeerNetwork {
        &*self.network
    }

    /// Wall-clock seconds used for lock-time finality decisions.
    pub(crate) fn current_time(&self) -> Duration {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
    }

    /// Connects a block to the tip: appends it to the chain, applies its
    /// transactions to the utxo set, indexes it if the tx-index is on, and
    /// evicts its transactions from the pool.
    pub fn connect_block(&self, block: Block) {
        let mut state = self.chain_write();
        let mut pool = self.mempool_lock();

        let height = state.chain.append_block(block.clone());
        for tx in &block.transactions {
            let txid = tx.get_id();
            if !tx.is_coinbase() {
                for input in tx.inputs() {
                    state.coins.remove_utxo(&input.outpoint);
                }
            }
            for (index, output) in tx.outputs().iter().enumerate() {
                state.coins.set_utxo(
                    common::chain::OutPoint::new(txid, index as u32),
                    Utxo::new(output.clone(), tx.is_coinbase(), UtxoSource::Blockchain(height)),
                );
            }
            pool.remove(&txid);
        }
        if let Some(tx_index) = state.tx_index.as_mut() {
            tx_index.index_block(&block);
        }

        log::info!("connected block {} at height {height}", block.get_id());
    }

    /// Direct access to the wallet key store, for key import.
    pub fn add_wallet_key(&self, key: script::keystore::PrivateKey) {
        self.wallet.lock().add_key(key);
    }

    pub fn add_wallet_redeem_script(&self, script: common::chain::Script) {
        self.wallet.lock().add_redeem_script(script);
    }
}
