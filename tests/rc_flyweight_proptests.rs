use flyweight_cache::{from_fn, Flyweight, RcFlyweight, ReleaseError};
use proptest::prelude::*;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

// Model operations on RcFlyweight and assert counts, liveness, and
// creator/deleter call totals match a plain HashMap of claim counts.
proptest! {
    #[test]
    fn prop_rc_flyweight_matches_count_model(
        keys in 1u8..=5,
        ops in proptest::collection::vec((0u8..=4u8, 0u8..100u8), 1..120),
    ) {
        let created = Rc::new(Cell::new(0usize));
        let deleted = Rc::new(Cell::new(0usize));
        let (c, d) = (Rc::clone(&created), Rc::clone(&deleted));
        let mut rc = RcFlyweight::with_callbacks(
            from_fn(move |k: &(u8, char)| {
                c.set(c.get() + 1);
                u32::from(k.0) * 10
            }),
            move |_: &(u8, char), _: u32| d.set(d.get() + 1),
        );
        let mut model: HashMap<u8, i64> = HashMap::new();

        for (op, raw_k) in ops {
            let k = raw_k % keys;
            let key = (k, 'k');
            match op {
                // Claim
                0 | 1 => {
                    let before = created.get();
                    prop_assert_eq!(rc.get(key), Ok(&(u32::from(k) * 10)));
                    let n = model.entry(k).or_insert(0);
                    if *n == 0 {
                        prop_assert_eq!(created.get(), before + 1, "miss creates once");
                    } else {
                        prop_assert_eq!(created.get(), before, "hit never creates");
                    }
                    *n += 1;
                }
                // Lenient release, possibly past zero
                2 => {
                    let before = deleted.get();
                    let removed = rc.release(&key);
                    match model.get_mut(&k) {
                        Some(n) => {
                            *n -= 1;
                            let last = *n == 0;
                            if last {
                                model.remove(&k);
                            }
                            prop_assert_eq!(removed, last);
                            prop_assert_eq!(deleted.get(), before + usize::from(last));
                        }
                        None => {
                            prop_assert!(!removed);
                            prop_assert_eq!(deleted.get(), before);
                        }
                    }
                }
                // Strict release
                3 => {
                    let r = rc.try_release(&key);
                    match model.get_mut(&k) {
                        Some(n) => {
                            *n -= 1;
                            let last = *n == 0;
                            if last {
                                model.remove(&k);
                            }
                            prop_assert_eq!(r, Ok(last));
                        }
                        None => prop_assert_eq!(r, Err(ReleaseError::NotLoaded)),
                    }
                }
                // Clear ignores counts
                4 => {
                    let before = deleted.get();
                    rc.clear();
                    prop_assert_eq!(deleted.get(), before + model.len());
                    model.clear();
                }
                _ => unreachable!(),
            }

            // Invariants after each step
            let expected = model.get(&k).copied().unwrap_or(0);
            prop_assert!(rc.reference_count(&key) >= 0);
            prop_assert_eq!(rc.reference_count(&key), expected);
            prop_assert_eq!(rc.is_loaded(&key), expected > 0);
            prop_assert_eq!(rc.len(), model.len());
        }

        // Every created payload is deleted exactly once by the end.
        let live = model.len();
        drop(rc);
        prop_assert_eq!(deleted.get(), created.get());
        prop_assert!(live <= created.get());
    }
}

// Plain store: release always unloads, so liveness equals "got since the
// last release".
proptest! {
    #[test]
    fn prop_plain_flyweight_liveness(
        ops in proptest::collection::vec((any::<bool>(), 0u16..6), 1..100),
    ) {
        let mut store: Flyweight<u16, u64> = Flyweight::new();
        let mut loaded = [false; 6];
        for (get, k) in ops {
            if get {
                prop_assert_eq!(store.get(k), Ok(&u64::from(k)));
                loaded[usize::from(k)] = true;
            } else {
                let removed = store.release(&k);
                prop_assert_eq!(removed, loaded[usize::from(k)]);
                loaded[usize::from(k)] = false;
            }
            prop_assert_eq!(store.is_loaded(&k), loaded[usize::from(k)]);
            prop_assert_eq!(store.len(), loaded.iter().filter(|l| **l).count());
        }
    }
}
