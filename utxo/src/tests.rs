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

use common::chain::{OutPoint, Script, TxOut};
use common::primitives::{Amount, BlockHeight, Id, H256};
use rstest::rstest;
use test_utils::random::{make_seedable_rng, Rng, Seed};

use crate::{
    flush_to_base, DummyUtxosView, Error, FlushableUtxoView, Utxo, UtxosCache, UtxosStore,
    UtxosView,
};

fn random_outpoint(rng: &mut impl Rng) -> OutPoint {
    OutPoint::new(Id::new(H256(rng.gen())), rng.gen_range(0..4))
}

fn coin(value: i64) -> Utxo {
    Utxo::new_for_blockchain(
        TxOut::new(Amount::from_atoms(value), Script::from_bytes(vec![0x51])),
        false,
        BlockHeight::new(1),
    )
}

#[rstest]
#[trace]
#[case(Seed::from_entropy())]
fn add_then_read_back(#[case] seed: Seed) {
    let mut rng = make_seedable_rng(seed);
    let outpoint = random_outpoint(&mut rng);
    let mut cache = UtxosCache::new(DummyUtxosView);

    assert!(!cache.has_utxo(&outpoint));
    cache.add_utxo(&outpoint, coin(100), false).unwrap();
    assert_eq!(cache.utxo(&outpoint), Some(coin(100)));
    assert!(cache.has_utxo(&outpoint));
}

#[rstest]
#[trace]
#[case(Seed::from_entropy())]
fn overwrite_refused_unless_requested(#[case] seed: Seed) {
    let mut rng = make_seedable_rng(seed);
    let outpoint = random_outpoint(&mut rng);
    let mut cache = UtxosCache::new(DummyUtxosView);

    cache.add_utxo(&outpoint, coin(1), false).unwrap();
    assert_eq!(
        cache.add_utxo(&outpoint, coin(2), false),
        Err(Error::OverwritingUtxo)
    );
    cache.add_utxo(&outpoint, coin(2), true).unwrap();
    assert_eq!(cache.utxo(&outpoint), Some(coin(2)));
}

#[rstest]
#[trace]
#[case(Seed::from_entropy())]
fn spend_semantics(#[case] seed: Seed) {
    let mut rng = make_seedable_rng(seed);
    let outpoint = random_outpoint(&mut rng);

    // Spending an unknown coin.
    let mut cache = UtxosCache::new(DummyUtxosView);
    assert_eq!(cache.spend_utxo(&outpoint), Err(Error::NoUtxoFound));

    // Spending a fresh coin drops the entry entirely.
    cache.add_utxo(&outpoint, coin(10), false).unwrap();
    assert_eq!(cache.spend_utxo(&outpoint), Ok(coin(10)));
    assert!(!cache.has_utxo_in_cache(&outpoint));

    // Spending a parent coin records the spend in this layer and hides the
    // parent's copy.
    let mut store = UtxosStore::new();
    store.set_utxo(outpoint, coin(20));
    let mut cache = UtxosCache::new(&store);
    assert_eq!(cache.spend_utxo(&outpoint), Ok(coin(20)));
    assert!(cache.has_utxo_in_cache(&outpoint));
    assert!(!cache.has_utxo(&outpoint));
    assert_eq!(
        cache.spend_utxo(&outpoint),
        Err(Error::UtxoAlreadySpent(outpoint))
    );
    // The store itself is untouched until a flush.
    assert_eq!(store.utxo(&outpoint), Some(coin(20)));
}

#[rstest]
#[trace]
#[case(Seed::from_entropy())]
fn read_through_caches_parent_entry(#[case] seed: Seed) {
    let mut rng = make_seedable_rng(seed);
    let outpoint = random_outpoint(&mut rng);

    let mut store = UtxosStore::new();
    store.set_utxo(outpoint, coin(5));
    let mut cache = UtxosCache::new(&store);

    assert!(!cache.has_utxo_in_cache(&outpoint));
    // A mutating access memoizes the parent's entry in this layer.
    cache.spend_utxo(&outpoint).unwrap();
    assert!(cache.has_utxo_in_cache(&outpoint));
}

#[rstest]
#[trace]
#[case(Seed::from_entropy())]
fn flush_writes_spends_and_creations(#[case] seed: Seed) {
    let mut rng = make_seedable_rng(seed);
    let spent_outpoint = random_outpoint(&mut rng);
    let created_outpoint = random_outpoint(&mut rng);

    let mut store = UtxosStore::new();
    store.set_utxo(spent_outpoint, coin(1));

    let store_view = store.clone();
    let mut cache = UtxosCache::new(&store_view);
    cache.spend_utxo(&spent_outpoint).unwrap();
    cache.add_utxo(&created_outpoint, coin(2), false).unwrap();

    flush_to_base(cache, &mut store).unwrap();

    assert_eq!(store.utxo(&spent_outpoint), None);
    assert_eq!(store.utxo(&created_outpoint), Some(coin(2)));
}

#[rstest]
#[trace]
#[case(Seed::from_entropy())]
fn created_and_spent_in_child_never_reaches_parent(#[case] seed: Seed) {
    let mut rng = make_seedable_rng(seed);
    let outpoint = random_outpoint(&mut rng);

    let parent_store = UtxosStore::new();
    let mut parent = UtxosCache::new(&parent_store);
    let mut child = UtxosCache::new(&parent);

    // Churn entirely inside the child layer.
    child.add_utxo(&outpoint, coin(3), false).unwrap();
    child.spend_utxo(&outpoint).unwrap();
    let consumed = child.consume();

    parent.batch_write(consumed).unwrap();
    assert!(!parent.has_utxo_in_cache(&outpoint));
}

#[rstest]
#[trace]
#[case(Seed::from_entropy())]
fn misapplied_fresh_flag_detected_on_flush(#[case] seed: Seed) {
    let mut rng = make_seedable_rng(seed);
    let outpoint = random_outpoint(&mut rng);

    let mut parent = UtxosCache::new(DummyUtxosView);
    parent.add_utxo(&outpoint, coin(1), false).unwrap();

    // A child of an independent view creates the "same" coin fresh.
    let mut child = UtxosCache::new(DummyUtxosView);
    child.add_utxo(&outpoint, coin(2), false).unwrap();

    assert_eq!(
        parent.batch_write(child.consume()),
        Err(Error::FreshUtxoAlreadyExists)
    );
}

/// The associativity law: a batch of operations applied through a stacked
/// child layer and then flushed must leave the base in exactly the state it
/// would have reached had the operations been applied directly.
#[rstest]
#[trace]
#[case(Seed::from_entropy())]
fn cache_flush_associativity(#[case] seed: Seed) {
    let mut rng = make_seedable_rng(seed);

    for _ in 0..8 {
        // A shared starting population.
        let mut outpoints: Vec<OutPoint> = Vec::new();
        let mut base_direct = UtxosStore::new();
        for _ in 0..rng.gen_range(4..16) {
            let outpoint = random_outpoint(&mut rng);
            let value = rng.gen_range(1..1_000);
            base_direct.set_utxo(outpoint, coin(value));
            outpoints.push(outpoint);
        }
        let mut base_stacked = base_direct.clone();

        // A random batch of spends and creations, recorded as closures over
        // any UtxosCache so both sides replay identically.
        enum Op {
            Spend(OutPoint),
            Create(OutPoint, i64),
        }
        let ops: Vec<Op> = (0..rng.gen_range(1..24))
            .map(|_| {
                if rng.gen_bool(0.5) && !outpoints.is_empty() {
                    let i = rng.gen_range(0..outpoints.len());
                    Op::Spend(outpoints.swap_remove(i))
                } else {
                    let outpoint = random_outpoint(&mut rng);
                    outpoints.push(outpoint);
                    Op::Create(outpoint, rng.gen_range(1..1_000))
                }
            })
            .collect();

        let apply = |cache: &mut UtxosCache<&UtxosStore>| {
            for op in &ops {
                match op {
                    Op::Spend(outpoint) => {
                        let _ = cache.spend_utxo(outpoint);
                    }
                    Op::Create(outpoint, value) => {
                        let _ = cache.add_utxo(outpoint, coin(*value), false);
                    }
                }
            }
        };

        // Direct: one layer over the base.
        {
            let mut layer = UtxosCache::new(&base_direct);
            apply(&mut layer);
            let consumed = layer.consume();
            base_direct.batch_write(consumed).unwrap();
        }

        // Stacked: the same operations in a child of an intermediate layer,
        // flushed child-into-parent, then parent-into-base.
        {
            let parent = UtxosCache::new(&base_stacked);
            let mut child = UtxosCache::new(&parent);
            // The child applies ops against the same observable state.
            for op in &ops {
                match op {
                    Op::Spend(outpoint) => {
                        let _ = child.spend_utxo(outpoint);
                    }
                    Op::Create(outpoint, value) => {
                        let _ = child.add_utxo(outpoint, coin(*value), false);
                    }
                }
            }
            let child_consumed = child.consume();
            let mut parent = parent;
            parent.batch_write(child_consumed).unwrap();
            let consumed = parent.consume();
            base_stacked.batch_write(consumed).unwrap();
        }

        let collect = |store: &UtxosStore| -> Vec<(OutPoint, Utxo)> {
            store.iter().map(|(o, u)| (*o, u.clone())).collect()
        };
        assert_eq!(collect(&base_direct), collect(&base_stacked));
    }
}

#[test]
fn dummy_view_is_empty() {
    let outpoint = OutPoint::new(Id::new(H256::from_low_u64_be(1)), 0);
    assert_eq!(DummyUtxosView.utxo(&outpoint), None);
    assert!(!DummyUtxosView.has_utxo(&outpoint));
}

#[test]
fn mempool_source_has_no_height() {
    let utxo = Utxo::new_for_mempool(TxOut::new(Amount::from_atoms(1), Script::new()));
    assert!(utxo.source().is_mempool());
    assert_eq!(utxo.source().blockchain_height(), None);

    let utxo = coin(1);
    assert_eq!(
        utxo.source().blockchain_height(),
        Some(BlockHeight::new(1))
    );
}
