//! Range-query structures backing the match search: a segment tree
//! parameterised by a monoid, and a wavelet matrix over the rank
//! permutation.

/// An associative operation with an identity, folded over tree ranges.
pub trait Monoid {
    type T: Copy;
    fn iden() -> Self::T;
    fn op(l: Self::T, r: Self::T) -> Self::T;
}

/// Sentinel for "no position stored yet" in the rank-indexed position
/// trees. Far enough below zero that adding any window size keeps it
/// out of range.
pub(crate) const NO_POS: i64 = i64::MIN / 2;

/// Maximum over stored source positions (`NO_POS` when unseen).
pub enum RankMax {}

impl Monoid for RankMax {
    type T = i64;
    fn iden() -> i64 {
        NO_POS
    }
    fn op(l: i64, r: i64) -> i64 {
        l.max(r)
    }
}

/// Minimum over common-prefix lengths.
pub enum LcpMin {}

impl Monoid for LcpMin {
    type T = u32;
    fn iden() -> u32 {
        u32::MAX
    }
    fn op(l: u32, r: u32) -> u32 {
        l.min(r)
    }
}

/// A 1-based complete-binary segment tree: leaves live at
/// `[width, width + n)`, unused leaves hold the identity.
pub struct SegmentTree<M: Monoid> {
    n: usize,
    width: usize,
    nodes: Vec<M::T>,
}

impl<M: Monoid> SegmentTree<M> {
    pub fn new(n: usize) -> Self {
        let width = n.next_power_of_two().max(1);
        SegmentTree {
            n,
            width,
            nodes: vec![M::iden(); 2 * width],
        }
    }

    /// Build in O(n) from initial leaf values.
    pub fn from_slice(init: &[M::T]) -> Self {
        let mut tree = Self::new(init.len());
        tree.nodes[tree.width..tree.width + init.len()].copy_from_slice(init);
        for k in (1..tree.width).rev() {
            tree.nodes[k] = M::op(tree.nodes[2 * k], tree.nodes[2 * k + 1]);
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize) -> M::T {
        self.nodes[self.width + i]
    }

    pub fn update(&mut self, i: usize, v: M::T) {
        self.nodes[self.width + i] = v;
        let mut k = (self.width + i) >> 1;
        while k >= 1 {
            self.nodes[k] = M::op(self.nodes[2 * k], self.nodes[2 * k + 1]);
            k >>= 1;
        }
    }

    /// Fold over the half-open range `[l, r)`.
    pub fn fold(&self, l: usize, r: usize) -> M::T {
        let mut l = l + self.width;
        let mut r = r + self.width;
        let mut acc_l = M::iden();
        let mut acc_r = M::iden();
        while l < r {
            if l & 1 == 1 {
                acc_l = M::op(acc_l, self.nodes[l]);
                l += 1;
            }
            if r & 1 == 1 {
                r -= 1;
                acc_r = M::op(self.nodes[r], acc_r);
            }
            l >>= 1;
            r >>= 1;
        }
        M::op(acc_l, acc_r)
    }

    /// Largest `r >= l` with `pred(fold(l, r))`. `pred` must be monotone
    /// in the fold (true on the identity, and once false it stays false
    /// as the range grows).
    pub fn max_right<P: Fn(M::T) -> bool>(&self, l: usize, pred: P) -> usize {
        debug_assert!(pred(M::iden()));
        let mut lo = l;
        let mut hi = self.n;
        while lo < hi {
            let mid = (lo + hi + 1) / 2;
            if pred(self.fold(l, mid)) {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        lo
    }

    /// Smallest `l <= r` with `pred(fold(l, r))`.
    pub fn min_left<P: Fn(M::T) -> bool>(&self, r: usize, pred: P) -> usize {
        debug_assert!(pred(M::iden()));
        let mut lo = 0;
        let mut hi = r;
        while lo < hi {
            let mid = (lo + hi) / 2;
            if pred(self.fold(mid, r)) {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        lo
    }

    /// The maximal interval `[a, b]` around `i` over which every prefix
    /// fold away from `i` still satisfies `pred`.
    pub fn find_range<P: Fn(M::T) -> bool + Copy>(&self, i: usize, pred: P) -> (usize, usize) {
        (self.min_left(i, pred), self.max_right(i, pred))
    }

    /// Raw node array (1-based, `2 * width` cells) for walk-based
    /// queries that traverse both this tree and a sibling of the same
    /// geometry in lockstep.
    pub(crate) fn nodes(&self) -> &[M::T] {
        &self.nodes
    }
}

/// Per-level bit vector with O(1) rank support (64-bit blocks, prefix
/// popcounts).
struct BitRank {
    blocks: Vec<u64>,
    prefix: Vec<u32>,
}

impl BitRank {
    fn build(bits: &[bool]) -> Self {
        let n_blocks = bits.len() / 64 + 1;
        let mut blocks = vec![0u64; n_blocks];
        for (i, &b) in bits.iter().enumerate() {
            if b {
                blocks[i / 64] |= 1 << (i % 64);
            }
        }
        let mut prefix = vec![0u32; n_blocks + 1];
        for i in 0..n_blocks {
            prefix[i + 1] = prefix[i] + blocks[i].count_ones();
        }
        BitRank { blocks, prefix }
    }

    /// Ones in `[0, i)`.
    fn rank1(&self, i: usize) -> usize {
        let block = i / 64;
        let rem = i % 64;
        self.prefix[block] as usize + (self.blocks[block] & ((1u64 << rem) - 1)).count_ones() as usize
    }
}

/// Wavelet matrix over a fixed sequence of small integers, built once;
/// answers order statistics on arbitrary index windows.
pub struct WaveletMatrix {
    len: usize,
    bits: usize,
    levels: Vec<BitRank>,
    zeros: Vec<usize>,
}

impl WaveletMatrix {
    pub fn new(values: &[u32]) -> Self {
        let len = values.len();
        let max_v = values.iter().copied().max().unwrap_or(0);
        let bits = (64 - u64::from(max_v).leading_zeros() as usize).max(1);
        let mut cur: Vec<u32> = values.to_vec();
        let mut levels = Vec::with_capacity(bits);
        let mut zeros = Vec::with_capacity(bits);
        for level in 0..bits {
            let p = bits - 1 - level;
            let bv: Vec<bool> = cur.iter().map(|&v| (v >> p) & 1 == 1).collect();
            let mut lo: Vec<u32> = Vec::with_capacity(len);
            let mut hi: Vec<u32> = Vec::with_capacity(len);
            for &v in &cur {
                if (v >> p) & 1 == 1 {
                    hi.push(v);
                } else {
                    lo.push(v);
                }
            }
            zeros.push(lo.len());
            levels.push(BitRank::build(&bv));
            lo.extend_from_slice(&hi);
            cur = lo;
        }
        WaveletMatrix {
            len,
            bits,
            levels,
            zeros,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of entries in `[l, r)` whose value is `< ub`.
    pub fn count_lt(&self, l: usize, r: usize, ub: u32) -> usize {
        if l >= r {
            return 0;
        }
        if self.bits < 32 && u64::from(ub) >= 1u64 << self.bits {
            return r - l;
        }
        let (mut l, mut r) = (l, r);
        let mut count = 0;
        for level in 0..self.bits {
            let p = self.bits - 1 - level;
            let ones_l = self.levels[level].rank1(l);
            let ones_r = self.levels[level].rank1(r);
            if (ub >> p) & 1 == 1 {
                count += (r - ones_r) - (l - ones_l);
                l = self.zeros[level] + ones_l;
                r = self.zeros[level] + ones_r;
            } else {
                l -= ones_l;
                r -= ones_r;
            }
            if l == r {
                break;
            }
        }
        count
    }

    /// Value of the `k`-th smallest entry (0-indexed) in `[l, r)`.
    pub fn kth(&self, l: usize, r: usize, k: usize) -> u32 {
        debug_assert!(k < r - l);
        let (mut l, mut r, mut k) = (l, r, k);
        let mut value = 0u32;
        for level in 0..self.bits {
            let p = self.bits - 1 - level;
            let ones_l = self.levels[level].rank1(l);
            let ones_r = self.levels[level].rank1(r);
            let zeros_in = (r - ones_r) - (l - ones_l);
            if k < zeros_in {
                l -= ones_l;
                r -= ones_r;
            } else {
                k -= zeros_in;
                value |= 1 << p;
                l = self.zeros[level] + ones_l;
                r = self.zeros[level] + ones_r;
            }
        }
        value
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn segment_tree_fold_matches_naive() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for &n in &[1usize, 2, 3, 7, 8, 60] {
            let mut tree = SegmentTree::<RankMax>::new(n);
            let mut plain = vec![NO_POS; n];
            for _ in 0..200 {
                let i = rng.gen_range(0..n);
                let v = rng.gen_range(-50i64..50);
                tree.update(i, v);
                plain[i] = v;
                let l = rng.gen_range(0..=n);
                let r = rng.gen_range(l..=n);
                let naive = plain[l..r].iter().copied().fold(NO_POS, i64::max);
                assert_eq!(tree.fold(l, r), naive);
            }
        }
    }

    #[test]
    fn find_range_is_the_maximal_interval() {
        // lcp-style data: entry j links j and j + 1
        let lcp: Vec<u32> = vec![3, 1, 4, 4, 2, 4, 4, 4, 0];
        let tree = SegmentTree::<LcpMin>::from_slice(&lcp);
        let (a, b) = tree.find_range(6, |v| v >= 4);
        assert_eq!((a, b), (5, 8));
        let (a, b) = tree.find_range(3, |v| v >= 2);
        assert_eq!((a, b), (2, 8));
        let (a, b) = tree.find_range(0, |v| v >= 5);
        assert_eq!((a, b), (0, 0));
    }

    #[test]
    fn wavelet_matrix_matches_scans() {
        let mut rng = StdRng::seed_from_u64(42);
        for &n in &[1usize, 5, 64, 200] {
            let values: Vec<u32> = (0..n).map(|_| rng.gen_range(0..n as u32)).collect();
            let wm = WaveletMatrix::new(&values);
            for _ in 0..200 {
                let l = rng.gen_range(0..=n);
                let r = rng.gen_range(l..=n);
                let ub = rng.gen_range(0..=n as u32 + 1);
                let naive = values[l..r].iter().filter(|&&v| v < ub).count();
                assert_eq!(wm.count_lt(l, r, ub), naive, "count_lt [{}, {}) < {}", l, r, ub);
                if l < r {
                    let mut sorted: Vec<u32> = values[l..r].to_vec();
                    sorted.sort_unstable();
                    let k = rng.gen_range(0..r - l);
                    assert_eq!(wm.kth(l, r, k), sorted[k], "kth [{}, {}) k={}", l, r, k);
                }
            }
        }
    }
}
