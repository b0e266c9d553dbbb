#![cfg(test)]

// Property tests for SlotTable kept inside the crate since the table is
// not part of the public surface.

use crate::slot_table::{Handle, Lookup, SlotTable};
use core::convert::Infallible;
use proptest::prelude::*;
use std::cell::Cell;
use std::collections::hash_map::RandomState;
use std::collections::{BTreeSet, HashMap};
use std::hash::{BuildHasher, Hasher};

type Key = (String, u8);

// Pool-indexed operations so failures shrink toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum Op {
    Get(usize, i32),
    FailedGet(usize),
    Remove(usize),
    Find(usize),
    Mutate(usize, i32),
    Iterate,
    Drain,
}

fn key_from(pool: &[Key], i: usize) -> Key {
    pool[i].clone()
}

fn arb_scenario() -> impl Strategy<Value = (Vec<Key>, Vec<Op>)> {
    proptest::collection::vec(("[a-z]{0,4}", 0u8..4), 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Get(i, v)),
            1 => idx.clone().prop_map(Op::FailedGet),
            3 => idx.clone().prop_map(Op::Remove),
            2 => idx.clone().prop_map(Op::Find),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => Just(Op::Iterate),
            1 => Just(Op::Drain),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_scenario<S: BuildHasher>(
    mut sut: SlotTable<Key, i32, S>,
    pool: Vec<Key>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();
    let mut live: HashMap<Key, Handle> = HashMap::new();
    let mut stale: Vec<Handle> = Vec::new();
    let creates = Cell::new(0usize);

    for op in ops {
        match op {
            Op::Get(i, v) => {
                let k = key_from(&pool, i);
                let already = model.contains_key(&k);
                let before = creates.get();
                let lookup = sut
                    .find_or_try_insert_with(k.clone(), |_| {
                        creates.set(creates.get() + 1);
                        Ok::<_, Infallible>(v)
                    })
                    .unwrap();
                match lookup {
                    Lookup::Found(h) => {
                        prop_assert!(already, "found only when present");
                        prop_assert_eq!(creates.get(), before, "no creation on a hit");
                        prop_assert_eq!(Some(&h), live.get(&k));
                    }
                    Lookup::Inserted(h) => {
                        prop_assert!(!already, "inserted only when absent");
                        prop_assert_eq!(creates.get(), before + 1);
                        live.insert(k.clone(), h);
                        model.insert(k, v);
                    }
                }
            }
            Op::FailedGet(i) => {
                let k = key_from(&pool, i);
                let len = sut.len();
                let r = sut.find_or_try_insert_with(k.clone(), |_| Err("refused"));
                if model.contains_key(&k) {
                    prop_assert!(matches!(r, Ok(Lookup::Found(_))));
                } else {
                    prop_assert_eq!(r, Err("refused"));
                    prop_assert!(!sut.contains_key(&k));
                }
                prop_assert_eq!(sut.len(), len);
            }
            Op::Remove(i) => {
                let k = key_from(&pool, i);
                if let Some(h) = live.remove(&k) {
                    let (kk, vv) = sut.remove(h).expect("live handle removes");
                    prop_assert!(kk == k);
                    prop_assert_eq!(Some(vv), model.remove(&k));
                    stale.push(h);
                } else {
                    prop_assert!(sut.find(&k).is_none());
                }
            }
            Op::Find(i) => {
                let k = key_from(&pool, i);
                let found = sut.find(&k);
                prop_assert_eq!(found.is_some(), model.contains_key(&k));
                if let Some(h) = found {
                    prop_assert_eq!(Some(&h), live.get(&k));
                    prop_assert_eq!(sut.value(h), model.get(&k));
                }
            }
            Op::Mutate(i, d) => {
                let k = key_from(&pool, i);
                if let Some(&h) = live.get(&k) {
                    let vr = sut.value_mut(h).expect("live handle resolves");
                    *vr = vr.saturating_add(d);
                    if let Some(mv) = model.get_mut(&k) {
                        *mv = mv.saturating_add(d);
                    }
                }
            }
            Op::Iterate => {
                let s_keys: BTreeSet<Key> = sut.iter().map(|(_, k, _)| k.clone()).collect();
                let m_keys: BTreeSet<Key> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
            Op::Drain => {
                let drained: HashMap<Key, i32> = sut.drain().collect();
                prop_assert_eq!(&drained, &model);
                model.clear();
                stale.extend(live.drain().map(|(_, h)| h));
            }
        }

        for &h in &stale {
            prop_assert!(sut.value(h).is_none());
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// - A hit never runs the constructor; a miss runs it exactly once.
// - A failed construction leaves the table unchanged.
// - Handles stay stable while live and never resolve after removal or drain.
// - `iter` and `drain` agree with the model's key set.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(SlotTable::with_capacity_and_hasher(0, RandomState::new()), pool, ops)?;
    }
}

#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: the same invariants when every key collides, so equality
// alone separates entries.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(SlotTable::with_capacity_and_hasher(0, ConstBuildHasher), pool, ops)?;
    }
}
