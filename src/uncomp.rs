//! Cheapest-literal-run queries.
//!
//! A min segment tree keyed by run start `j` stores
//! `cost[j] + (n - j) * slope`, so "cheapest run of length in
//! `[lo, hi]` ending at `i`" is one fold; the `(n - i) * slope`
//! constant cancels on the way out.

use crate::range::{Monoid, SegmentTree};
use crate::solver::INFINITE_COST;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LenCost {
    pub len: usize,
    pub cost: usize,
}

#[derive(Clone, Copy)]
pub(crate) struct IndexedCost {
    cost: usize,
    index: usize,
}

/// Minimum by cost; the smaller start index (the longer run) breaks
/// ties.
pub(crate) enum CostMin {}

impl Monoid for CostMin {
    type T = IndexedCost;
    fn iden() -> IndexedCost {
        IndexedCost {
            cost: INFINITE_COST,
            index: usize::MAX,
        }
    }
    fn op(l: IndexedCost, r: IndexedCost) -> IndexedCost {
        if l.cost < r.cost || (l.cost == r.cost && l.index < r.index) {
            l
        } else {
            r
        }
    }
}

pub struct UncompHelper {
    n: usize,
    slope: usize,
    tree: SegmentTree<CostMin>,
}

impl UncompHelper {
    /// `slope` is the per-byte cost of an uncompressed byte in the
    /// surrounding codec.
    pub fn new(size: usize, slope: usize) -> Self {
        UncompHelper {
            n: size,
            slope,
            tree: SegmentTree::new(size),
        }
    }

    /// Record that a literal run may start at `i` with accumulated cost
    /// `cost` (typically the solver's cost at vertex `i`).
    pub fn update(&mut self, i: usize, cost: usize) {
        self.tree.update(
            i,
            IndexedCost {
                cost: cost + (self.n - i) * self.slope,
                index: i,
            },
        );
    }

    pub fn reset(&mut self, i: usize) {
        self.tree.update(i, CostMin::iden());
    }

    pub fn reset_range(&mut self, begin: usize, end: usize) {
        for i in begin..end {
            self.reset(i);
        }
    }

    /// Cheapest literal run ending at `i` whose length lies in
    /// `[lo, hi]`, or `None` when every candidate start is still
    /// unreached. `lo` must be at least 1.
    pub fn find(&self, i: usize, lo: usize, hi: usize) -> Option<LenCost> {
        debug_assert!(lo >= 1);
        if i < lo {
            return None;
        }
        let hi = hi.min(i);
        let res = self.tree.fold(i - hi, i - lo + 1);
        if res.cost >= INFINITE_COST {
            return None;
        }
        Some(LenCost {
            len: i - res.index,
            cost: res.cost - (self.n - i) * self.slope,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn matches_a_linear_scan() {
        let mut rng = StdRng::seed_from_u64(21);
        let n = 120;
        let slope = 8;
        let mut helper = UncompHelper::new(n, slope);
        let mut cost = vec![INFINITE_COST; n];
        for i in 0..n {
            if rng.gen_bool(0.8) {
                cost[i] = rng.gen_range(0..1000);
                helper.update(i, cost[i]);
            }
            for &(lo, hi) in &[(1usize, 4usize), (2, 16), (5, 200)] {
                let i = i + 1;
                let mut want: Option<LenCost> = None;
                for len in lo..=hi.min(i) {
                    let j = i - len;
                    if cost[j] >= INFINITE_COST {
                        continue;
                    }
                    let c = cost[j] + len * slope;
                    let replace = match want {
                        None => true,
                        Some(w) => c < w.cost || (c == w.cost && len > w.len),
                    };
                    if replace {
                        want = Some(LenCost { len, cost: c });
                    }
                }
                assert_eq!(helper.find(i, lo, hi), want, "i={} lo={} hi={}", i, lo, hi);
            }
        }
    }
}
