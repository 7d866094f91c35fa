use super::*;

use crate::arena::path_len;
use proptest::prelude::*;
use proptest::sample::Index;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

fn validate_tree<K: Ord + fmt::Debug>(t: &PersistentSegTree<K>) {
    let issues = t.verify_integrity();
    assert!(issues.is_empty(), "integrity issues: {issues:#?}");
}

/// Brute-force multiset: key -> multiplicity.
type Multiset = BTreeMap<i64, u32>;

fn multiset_of(keys: &[i64]) -> Multiset {
    let mut m = Multiset::new();
    for &k in keys {
        *m.entry(k).or_default() += 1;
    }
    m
}

fn difference(hi: &Multiset, lo: &Multiset) -> Multiset {
    let mut out = Multiset::new();
    for (&k, &n) in hi {
        let n = n - lo.get(&k).copied().unwrap_or(0);
        if n > 0 {
            out.insert(k, n);
        }
    }
    out
}

fn descending(m: &Multiset) -> Vec<i64> {
    m.iter()
        .rev()
        .flat_map(|(&k, &n)| std::iter::repeat(k).take(n as usize))
        .collect()
}

const DOMAIN: i64 = 32;

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 4)]
    Push(#[proptest(strategy = "0i64..DOMAIN")] i64),
    Branch(Index, #[proptest(strategy = "0i64..DOMAIN")] i64),
    #[proptest(weight = 3)]
    Query(Index, Index, Index),
    Missing(#[proptest(strategy = "DOMAIN..2 * DOMAIN")] i64),
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_linear_matches_brute_force(
        keys in prop::collection::vec(-50i64..50, 1..200),
        queries in prop::collection::vec(
            (any::<Index>(), any::<Index>(), any::<Index>(), -60i64..60, -60i64..60),
            0..100,
        ),
    ) {
        let mut t = PersistentSegTree::new(keys.iter().copied()).unwrap();
        t.extend(&keys).unwrap();
        let n = keys.len();

        for v in 0..=n {
            prop_assert_eq!(t.len(v), Ok(v));
        }

        for (a, b, c, low, high) in queries {
            let (mut lo, mut hi) = (a.index(n + 1), b.index(n + 1));
            if lo > hi {
                std::mem::swap(&mut lo, &mut hi);
            }
            let window = multiset_of(&keys[lo..hi]);
            let sorted = descending(&window);

            prop_assert_eq!(t.window_len(lo, hi), Ok(hi - lo));
            prop_assert_eq!(t.count_in_range(lo, hi, ..), Ok((hi - lo) as u64));

            if sorted.is_empty() {
                prop_assert_eq!(
                    t.kth_largest(lo, hi, 1),
                    Err(Error::RankOutOfRange { k: 1, len: 0 })
                );
            } else {
                let k = c.index(sorted.len()) + 1;
                prop_assert_eq!(t.kth_largest(lo, hi, k), Ok(&sorted[k - 1]));
                prop_assert_eq!(t.kth_smallest(lo, hi, k), Ok(&sorted[sorted.len() - k]));
            }

            let expected = sorted.iter().filter(|&&x| low <= x && x <= high).count() as u64;
            prop_assert_eq!(t.count_in_range(lo, hi, low..=high), Ok(expected));

            let got: Vec<(i64, u32)> = t
                .entries(lo, hi)
                .unwrap()
                .into_iter()
                .map(|(k, n)| (*k, n))
                .collect();
            let want: Vec<(i64, u32)> = window.into_iter().collect();
            prop_assert_eq!(got, want);
        }

        validate_tree(&t);
    }

    #[test]
    fn prop_insert_shares_off_path_subtrees(
        keys in prop::collection::vec(0i64..1000, 1..150),
    ) {
        let mut t = PersistentSegTree::new(keys.iter().copied()).unwrap();
        let v_len = t.domain().len();

        for key in &keys {
            let prev = t.latest();
            let before_nodes = t.arena_len();
            let snapshot: Vec<Node> = t.arena.iter().map(|(_, n)| *n).collect();

            let next = t.push(key).unwrap();

            // Nothing that existed before was rewritten.
            let after: Vec<Node> = t.arena.iter().take(snapshot.len()).map(|(_, n)| *n).collect();
            prop_assert_eq!(&snapshot, &after);

            // Walk the inserted path in both versions.
            let position = t.domain().rank(key).unwrap();
            let (mut old, mut new) = (t.root(prev).unwrap(), t.root(next).unwrap());
            let (mut low, mut high) = (1usize, v_len);
            let mut depth = 1;
            while low < high {
                depth += 1;
                prop_assert!(new.index() >= before_nodes, "path node must be fresh");
                let (o, n) = (*t.node(old).unwrap(), *t.node(new).unwrap());
                prop_assert_eq!(n.count, o.count + 1);
                let mid = low + (high - low) / 2;
                if position <= mid {
                    prop_assert_eq!(n.right, o.right);
                    (old, new) = (o.left, n.left);
                    high = mid;
                } else {
                    prop_assert_eq!(n.left, o.left);
                    (old, new) = (o.right, n.right);
                    low = mid + 1;
                }
            }
            prop_assert!(new.index() >= before_nodes);
            // Exactly one new node per level of this key's path, never more
            // than the deepest path.
            prop_assert_eq!(t.arena_len() - before_nodes, depth);
            prop_assert!(depth <= path_len(v_len));
        }

        validate_tree(&t);
    }

    #[test]
    fn prop_branching_model(ops in prop::collection::vec(any::<Op>(), 0..300)) {
        let mut t = PersistentSegTree::new(0..DOMAIN).unwrap();
        let mut model: Vec<Multiset> = vec![Multiset::new()];
        let mut parents: Vec<usize> = vec![0];

        for op in ops {
            match op {
                Op::Push(key) => {
                    let base = model.len() - 1;
                    prop_assert_eq!(t.push(&key), Ok(model.len()));
                    let mut m = model[base].clone();
                    *m.entry(key).or_default() += 1;
                    model.push(m);
                    parents.push(base);
                }
                Op::Branch(base, key) => {
                    let base = base.index(model.len());
                    prop_assert_eq!(t.insert(base, &key), Ok(model.len()));
                    let mut m = model[base].clone();
                    *m.entry(key).or_default() += 1;
                    model.push(m);
                    parents.push(base);
                }
                Op::Query(a, b, c) => {
                    let (lo, hi) = (a.index(model.len()), b.index(model.len()));
                    let mut v = hi;
                    while v > lo {
                        v = parents[v];
                    }
                    if lo > hi || v != lo {
                        prop_assert_eq!(t.window_len(lo, hi), Err(Error::InvalidWindow { lo, hi }));
                        continue;
                    }
                    let window = difference(&model[hi], &model[lo]);
                    let sorted = descending(&window);
                    prop_assert_eq!(t.window_len(lo, hi), Ok(sorted.len()));
                    if !sorted.is_empty() {
                        let k = c.index(sorted.len()) + 1;
                        prop_assert_eq!(t.kth_largest(lo, hi, k), Ok(&sorted[k - 1]));
                    }
                    let got: Vec<(i64, u32)> = t
                        .entries(lo, hi)
                        .unwrap()
                        .into_iter()
                        .map(|(k, n)| (*k, n))
                        .collect();
                    prop_assert_eq!(got, window.into_iter().collect::<Vec<_>>());
                }
                Op::Missing(key) => {
                    let nodes = t.arena_len();
                    let rejected = matches!(t.push(&key), Err(Error::DomainLookup { .. }));
                    prop_assert!(rejected, "key {} is outside the domain", key);
                    prop_assert_eq!(t.arena_len(), nodes);
                }
            }

            prop_assert_eq!(t.version_count(), model.len());
        }

        // Historical versions still hold exactly what they held when built.
        for (v, m) in model.iter().enumerate() {
            prop_assert_eq!(t.len(v), Ok(m.values().map(|&n| n as usize).sum::<usize>()));
        }
        validate_tree(&t);
    }
}

#[test]
fn idempotent_reads() {
    let keys = [7i64, -3, 7, 12, 0, -3, 5];
    let mut t = PersistentSegTree::new(keys).unwrap();
    t.extend(&keys[..4]).unwrap();

    let answers = |t: &PersistentSegTree| -> Vec<Result<Vec<(i64, u32)>>> {
        (0..=4)
            .map(|v| {
                t.entries(0, v)
                    .map(|e| e.into_iter().map(|(k, n)| (*k, n)).collect())
            })
            .collect()
    };

    let first = answers(&t);
    assert_eq!(first, answers(&t));

    // Later inserts, including branches off old versions, leave them alone.
    t.extend(&keys[4..]).unwrap();
    t.insert(1, &12).unwrap();
    t.insert(3, &-3).unwrap();
    assert_eq!(first, answers(&t));
    validate_tree(&t);
}

#[test]
fn exhaustive_windows_small_sequence() {
    let keys = [3i64, 1, 4, 1, 5, 9, 2, 6];
    let mut t = PersistentSegTree::new(keys).unwrap();
    t.extend(&keys).unwrap();

    for lo in 0..=keys.len() {
        for hi in lo..=keys.len() {
            let mut window = keys[lo..hi].to_vec();
            window.sort_unstable_by(|a, b| b.cmp(a));
            for k in 1..=window.len() {
                assert_eq!(t.kth_largest(lo, hi, k), Ok(&window[k - 1]));
            }
            assert_eq!(
                t.kth_largest(lo, hi, window.len() + 1),
                Err(Error::RankOutOfRange {
                    k: window.len() + 1,
                    len: window.len()
                })
            );
            assert_eq!(t.count_in_range(lo, hi, ..), Ok((hi - lo) as u64));
        }
    }
}
