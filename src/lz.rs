//! Back-reference search over a suffix index.
//!
//! Every helper here pairs the rank / LCP tables of a [`SuffixArray`]
//! with one or more rank-indexed position trees: `add_element(i)`
//! stores position `i` at its suffix rank, so a later query at `pos`
//! only ever sees sources that were added before it. The transformed
//! variants glue a rewritten copy of the input behind a `-1` separator
//! and keep a second (or third) position tree for the copy, which makes
//! complemented, bit-reversed and reversed back-references fall out of
//! the same rank walk.

use crate::range::{LcpMin, RankMax, SegmentTree, WaveletMatrix};
use crate::solver::Vrange;
use crate::suffix::SuffixArray;

/// One back-reference candidate; `len == 0` means "no match".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Match {
    pub ofs: usize,
    pub len: usize,
}

impl Match {
    pub const NONE: Match = Match { ofs: 0, len: 0 };

    pub fn found(&self) -> bool {
        self.len > 0
    }

    /// Longer wins; the larger source offset breaks ties.
    pub(crate) fn better(&self, rhs: &Match) -> bool {
        self.len > rhs.len || (self.len == rhs.len && self.ofs > rhs.ofs)
    }
}

/// Shrink the running LCP bound by the visited node's value; reports
/// whether the bound just dropped below `min_len`, at which point no
/// candidate further along the walk can reach it.
#[inline]
fn drops_below(node: u32, bound: &mut usize, min_len: usize) -> bool {
    let v = node as usize;
    if v < *bound {
        *bound = v;
        v < min_len
    } else {
        false
    }
}

/// Walk the rank axis leftward from rank `i`, looking for the nearest
/// rank whose stored position lies inside the distance window, while
/// the minimum over skipped LCP entries bounds the attainable length.
/// `lcp_node` and `ofs_node` are the raw arrays of two segment trees of
/// identical geometry.
fn find_left(
    adr: usize,
    i: usize,
    d: usize,
    min_len: usize,
    lcp_node: &[u32],
    ofs_node: &[i64],
) -> Match {
    if i == 0 {
        return Match::NONE;
    }
    let width = lcp_node.len() / 2;
    let in_window = |k: usize| ofs_node[k] + d as i64 >= adr as i64;
    let mut bound = usize::MAX;
    let (mut lo, mut hi, mut k) = (i - 1, i, i - 1 + width);
    while lo > 0 && !in_window(k) {
        if drops_below(lcp_node[k], &mut bound, min_len) {
            return Match::NONE;
        }
        let diff = hi - lo;
        if k & 1 == 0 {
            hi = lo;
            lo -= 2 * diff;
            k = (k >> 1) - 1;
        } else {
            lo -= diff;
            hi -= diff;
            k -= 1;
        }
    }
    if lo == 0 && !in_window(k) {
        return Match::NONE;
    }
    while k < width {
        let mi = (lo + hi) >> 1;
        if in_window(2 * k + 1) {
            lo = mi;
            k = 2 * k + 1;
        } else {
            if drops_below(lcp_node[2 * k + 1], &mut bound, min_len) {
                return Match::NONE;
            }
            hi = mi;
            k = 2 * k;
        }
    }
    if drops_below(lcp_node[k], &mut bound, min_len) {
        return Match::NONE;
    }
    Match {
        ofs: ofs_node[lo + width] as usize,
        len: bound,
    }
}

/// Mirror image of [`find_left`] along the rank axis. The query rank's
/// own LCP entry is folded into the bound on the way out; the found
/// candidate's entry is not, since it links the candidate to the rank
/// beyond it.
fn find_right(
    adr: usize,
    i: usize,
    d: usize,
    min_len: usize,
    lcp_node: &[u32],
    ofs_node: &[i64],
) -> Match {
    let width = lcp_node.len() / 2;
    let in_window = |k: usize| ofs_node[k] + d as i64 >= adr as i64;
    let mut bound = usize::MAX;
    let (mut lo, mut hi, mut k) = (i, i + 1, i + width);
    while hi < width && !in_window(k) {
        if drops_below(lcp_node[k], &mut bound, min_len) {
            return Match::NONE;
        }
        let diff = hi - lo;
        if k & 1 == 1 {
            lo = hi;
            hi += 2 * diff;
            k = (k + 1) >> 1;
        } else {
            lo += diff;
            hi += diff;
            k += 1;
        }
    }
    if hi == width && !in_window(k) {
        return Match::NONE;
    }
    while k < width {
        let mi = (lo + hi) >> 1;
        if in_window(2 * k) {
            hi = mi;
            k = 2 * k;
        } else {
            if drops_below(lcp_node[2 * k], &mut bound, min_len) {
                return Match::NONE;
            }
            lo = mi;
            k = 2 * k + 1;
        }
    }
    Match {
        ofs: ofs_node[lo + width] as usize,
        len: bound,
    }
}

/// Longest match for the suffix ranked `rank`, source no further than
/// `max_dist` behind `adr`. On a length tie the left walk's candidate
/// is kept (the declared deterministic rule).
fn find_rank(
    adr: usize,
    rank: usize,
    max_dist: usize,
    min_len: usize,
    lcp_node: &[u32],
    ofs_node: &[i64],
) -> Match {
    let left = find_left(adr, rank, max_dist, min_len, lcp_node, ofs_node);
    let right = find_right(adr, rank, max_dist, min_len, lcp_node, ofs_node);
    if left.len >= right.len {
        left
    } else {
        right
    }
}

/// Like [`find_rank`], but caps the length at `max_len` and then picks
/// the numerically largest source offset among every rank whose prefix
/// still reaches the capped length.
fn find_closest_rank(
    adr: usize,
    rank: usize,
    max_dist: usize,
    min_len: usize,
    max_len: usize,
    lcp: &SegmentTree<LcpMin>,
    seg: &SegmentTree<RankMax>,
) -> Match {
    let mut ret = find_rank(adr, rank, max_dist, min_len, lcp.nodes(), seg.nodes());
    if ret.len > 0 {
        ret.len = ret.len.min(max_len);
        let need = ret.len;
        let (a, b) = lcp.find_range(rank, |v| v as usize >= need);
        ret.ofs = seg.fold(a, b + 1) as usize;
    }
    ret
}

/// Longest match whose source position lies in the window `[i, j)`,
/// located through the wavelet matrix: the nearest ranks below and
/// above the query rank that are present in the window are the only
/// two candidates worth folding.
fn find_in_window(
    i: usize,
    j: usize,
    rank: usize,
    wm: &WaveletMatrix,
    lcp: &SegmentTree<LcpMin>,
    sa: &SuffixArray,
) -> Match {
    if i >= j {
        return Match::NONE;
    }
    let k = wm.count_lt(i, j, rank as u32);
    let mut ret = Match::NONE;
    if k > 0 {
        let rank_l = wm.kth(i, j, k - 1) as usize;
        let len_l = lcp.fold(rank_l, rank) as usize;
        if len_l > ret.len {
            ret = Match {
                ofs: sa.position(rank_l),
                len: len_l,
            };
        }
    }
    if k < j - i {
        let rank_r = wm.kth(i, j, k) as usize;
        let len_r = lcp.fold(rank, rank_r) as usize;
        if len_r > ret.len {
            ret = Match {
                ofs: sa.position(rank_r),
                len: len_r,
            };
        }
    }
    ret
}

/// Longest match whose source range `[ofs, ofs + len)` ends at or
/// before `adr`. Overlap shortens a candidate to `adr - ofs`, and the
/// stabilising binary search over the window's right edge re-queries
/// `find_lz` until no longer candidate can appear. `prev`, the best
/// match of the previous position, warm-starts the search.
fn find_non_overlapping<F>(adr_l: usize, adr: usize, mut find_lz: F, prev: Match) -> Match
where
    F: FnMut(usize) -> Match,
{
    let overlapped = |i: usize, m: &Match| m.len > 0 && m.ofs + m.len > i;
    let mut prev = prev;
    if prev.len >= 1 {
        prev.len -= 1;
        prev.ofs += 1;
    }
    let mut ret = find_lz(adr - (prev.len.max(1) - 1));
    if !overlapped(adr, &ret) {
        return ret;
    }
    let mut len_hi = (adr - adr_l).min(ret.len);
    ret.len = adr - ret.ofs;
    while ret.len < len_hi {
        let len = (ret.len + len_hi + 1) / 2;
        let mut lz = find_lz(adr - (len - 1));
        if overlapped(adr, &lz) {
            lz.len = adr - lz.ofs;
        }
        if lz.better(&ret) {
            ret = lz;
        }
        if lz.len < len {
            len_hi = len - 1;
        }
    }
    ret
}

/// For offset classes sorted by widening distance cap, fill `dest[oi]`
/// with the best match reachable under each cap, reusing a wider
/// class's result whenever its source already fits the narrower cap.
pub fn find_all<F>(i: usize, offsets: &[Vrange], min_len: usize, dest: &mut [Match], mut find_lz: F)
where
    F: FnMut(usize) -> Match,
{
    let mut oi = offsets.len() as isize - 1;
    while oi >= 0 {
        let mut res = find_lz(oi as usize);
        if res.len < min_len {
            res = Match::NONE;
        }
        loop {
            dest[oi as usize] = res;
            oi -= 1;
            if oi < 0 || (res.len >= min_len && (i - res.ofs) > offsets[oi as usize].max) {
                break;
            }
        }
    }
}

/// Plain single-tree helper: longest (or closest) match against the
/// already-added prefix of the input.
pub struct LzHelper {
    rank: Vec<u32>,
    lcp: SegmentTree<LcpMin>,
    seg: SegmentTree<RankMax>,
}

impl LzHelper {
    pub fn new(input: &[u8]) -> Self {
        let sa = SuffixArray::new(input);
        let (lcp, rank) = sa.lcp_rank();
        let seg = SegmentTree::new(rank.len());
        LzHelper {
            rank,
            lcp: SegmentTree::from_slice(&lcp),
            seg,
        }
    }

    pub fn find(&self, pos: usize, max_dist: usize, min_len: usize) -> Match {
        find_rank(
            pos,
            self.rank[pos] as usize,
            max_dist,
            min_len,
            self.lcp.nodes(),
            self.seg.nodes(),
        )
    }

    pub fn find_closest(&self, pos: usize, max_dist: usize, min_len: usize, max_len: usize) -> Match {
        find_closest_rank(
            pos,
            self.rank[pos] as usize,
            max_dist,
            min_len,
            max_len,
            &self.lcp,
            &self.seg,
        )
    }

    pub fn add_element(&mut self, i: usize) {
        self.seg.update(self.rank[i] as usize, i as i64);
    }
}

/// Helper over the input glued to its bytewise complement; `find_c`
/// returns sources whose complemented bytes match the current suffix.
pub struct ComplementLzHelper {
    n: usize,
    rank: Vec<u32>,
    lcp: SegmentTree<LcpMin>,
    seg: SegmentTree<RankMax>,
    seg_c: SegmentTree<RankMax>,
}

impl ComplementLzHelper {
    pub fn new(input: &[u8]) -> Self {
        let n = input.len();
        let mut glued = Vec::with_capacity(2 * n + 1);
        glued.extend(input.iter().map(|&b| i16::from(b)));
        glued.push(-1);
        glued.extend(input.iter().map(|&b| i16::from(b ^ 0xff)));
        let sa = SuffixArray::from_i16(&glued);
        let (lcp, rank) = sa.lcp_rank();
        let seg = SegmentTree::new(rank.len());
        let seg_c = SegmentTree::new(rank.len());
        ComplementLzHelper {
            n,
            rank,
            lcp: SegmentTree::from_slice(&lcp),
            seg,
            seg_c,
        }
    }

    pub fn find(&self, pos: usize, max_dist: usize, min_len: usize) -> Match {
        find_rank(
            pos,
            self.rank[pos] as usize,
            max_dist,
            min_len,
            self.lcp.nodes(),
            self.seg.nodes(),
        )
    }

    pub fn find_c(&self, pos: usize, max_dist: usize, min_len: usize) -> Match {
        find_rank(
            pos,
            self.rank[pos] as usize,
            max_dist,
            min_len,
            self.lcp.nodes(),
            self.seg_c.nodes(),
        )
    }

    pub fn add_element(&mut self, i: usize) {
        self.seg.update(self.rank[i] as usize, i as i64);
        self.seg_c.update(self.rank[i + self.n + 1] as usize, i as i64);
    }
}

/// Helper over two glued texts: the bit-reversed copy (`find_h`) and
/// the sequence-reversed copy (`find_v`). A `find_v` result `{ofs, len}`
/// reads `input[ofs], input[ofs - 1], …`, so `len` never exceeds
/// `ofs + 1` by construction of the reversed copy.
pub struct FlipLzHelper {
    n: usize,
    rank_h: Vec<u32>,
    rank_v: Vec<u32>,
    lcp_h: SegmentTree<LcpMin>,
    lcp_v: SegmentTree<LcpMin>,
    seg: SegmentTree<RankMax>,
    seg_h: SegmentTree<RankMax>,
    seg_v: SegmentTree<RankMax>,
}

impl FlipLzHelper {
    pub fn new(input: &[u8]) -> Self {
        let n = input.len();
        let mut hflip = Vec::with_capacity(2 * n + 1);
        hflip.extend(input.iter().map(|&b| i16::from(b)));
        hflip.push(-1);
        hflip.extend(input.iter().map(|&b| i16::from(b.reverse_bits())));
        let mut vflip = Vec::with_capacity(2 * n + 1);
        vflip.extend(input.iter().map(|&b| i16::from(b)));
        vflip.push(-1);
        vflip.extend(input.iter().rev().map(|&b| i16::from(b)));

        let (lcp_h, rank_h) = SuffixArray::from_i16(&hflip).lcp_rank();
        let (lcp_v, rank_v) = SuffixArray::from_i16(&vflip).lcp_rank();
        let seg = SegmentTree::new(rank_h.len());
        let seg_h = SegmentTree::new(rank_h.len());
        let seg_v = SegmentTree::new(rank_v.len());
        FlipLzHelper {
            n,
            rank_h,
            rank_v,
            lcp_h: SegmentTree::from_slice(&lcp_h),
            lcp_v: SegmentTree::from_slice(&lcp_v),
            seg,
            seg_h,
            seg_v,
        }
    }

    pub fn find(&self, pos: usize, max_dist: usize, min_len: usize) -> Match {
        find_rank(
            pos,
            self.rank_h[pos] as usize,
            max_dist,
            min_len,
            self.lcp_h.nodes(),
            self.seg.nodes(),
        )
    }

    /// Longest source whose bit-reversed bytes match the suffix at `pos`.
    pub fn find_h(&self, pos: usize, max_dist: usize, min_len: usize) -> Match {
        find_rank(
            pos,
            self.rank_h[pos] as usize,
            max_dist,
            min_len,
            self.lcp_h.nodes(),
            self.seg_h.nodes(),
        )
    }

    /// Longest source readable backwards from `ofs` that matches the
    /// suffix at `pos`.
    pub fn find_v(&self, pos: usize, max_dist: usize, min_len: usize) -> Match {
        find_rank(
            pos,
            self.rank_v[pos] as usize,
            max_dist,
            min_len,
            self.lcp_v.nodes(),
            self.seg_v.nodes(),
        )
    }

    pub fn add_element(&mut self, i: usize) {
        self.seg.update(self.rank_h[i] as usize, i as i64);
        self.seg_h
            .update(self.rank_h[i + self.n + 1] as usize, i as i64);
        self.seg_v.update(self.rank_v[2 * self.n - i] as usize, i as i64);
    }
}

/// Helper for codecs whose copy must not read from the range it is
/// writing: the whole prefix is searchable (no `add_element`), and the
/// window's right edge excludes the destination.
pub struct NonOverlapLzHelper {
    sa: SuffixArray,
    rank: Vec<u32>,
    wm: WaveletMatrix,
    lcp: SegmentTree<LcpMin>,
}

impl NonOverlapLzHelper {
    pub fn new(input: &[u8]) -> Self {
        let sa = SuffixArray::new(input);
        let (lcp, rank) = sa.lcp_rank();
        let wm = WaveletMatrix::new(&rank);
        NonOverlapLzHelper {
            sa,
            rank,
            wm,
            lcp: SegmentTree::from_slice(&lcp),
        }
    }

    pub fn find(&self, adr: usize, max_dist: usize) -> Match {
        let adr_l = adr.saturating_sub(max_dist);
        find_in_window(adr_l, adr, self.rank[adr] as usize, &self.wm, &self.lcp, &self.sa)
    }

    /// Longest match with `ofs + len <= adr`; `prev` carries the
    /// previous position's result to warm-start the search.
    pub fn find_non_overlapping(&self, adr: usize, max_dist: usize, prev: Match) -> Match {
        let adr_l = adr.saturating_sub(max_dist);
        let rank = self.rank[adr] as usize;
        find_non_overlapping(
            adr_l,
            adr,
            |adr_r| find_in_window(adr_l, adr_r, rank, &self.wm, &self.lcp, &self.sa),
            prev,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn brute_best(input: &[u8], pos: usize, max_dist: usize, min_len: usize) -> usize {
        let lo = pos.saturating_sub(max_dist);
        let mut best = 0;
        for s in lo..pos {
            let mut l = 0;
            while pos + l < input.len() && input[s + l] == input[pos + l] {
                l += 1;
            }
            best = best.max(l);
        }
        if best >= min_len {
            best
        } else {
            0
        }
    }

    #[test]
    fn find_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(11);
        for &(n, sigma) in &[(40usize, 2u8), (120, 3), (200, 8)] {
            let input: Vec<u8> = (0..n).map(|_| rng.gen_range(0..sigma)).collect();
            let mut helper = LzHelper::new(&input);
            for pos in 0..n {
                for &(d, m) in &[(8usize, 2usize), (0x40, 3), (n, 2)] {
                    let res = helper.find(pos, d, m);
                    let want = brute_best(&input, pos, d, m);
                    assert_eq!(res.len, want, "pos={} d={} m={}", pos, d, m);
                    if res.found() {
                        assert!(pos - res.ofs <= d);
                        for k in 0..res.len {
                            assert_eq!(input[res.ofs + k], input[pos + k]);
                        }
                    }
                }
                helper.add_element(pos);
            }
        }
    }

    #[test]
    fn find_closest_picks_the_largest_offset() {
        let mut rng = StdRng::seed_from_u64(12);
        let input: Vec<u8> = (0..160).map(|_| rng.gen_range(0..2u8)).collect();
        let mut helper = LzHelper::new(&input);
        for pos in 0..input.len() {
            let res = helper.find_closest(pos, 64, 2, 6);
            if res.found() {
                // correct, inside the window, and no equally long source
                // sits closer
                assert!(pos - res.ofs <= 64);
                for k in 0..res.len {
                    assert_eq!(input[res.ofs + k], input[pos + k]);
                }
                for s in res.ofs + 1..pos {
                    let l = (0..input.len() - pos)
                        .take_while(|&k| input[s + k] == input[pos + k])
                        .count();
                    assert!(l < res.len, "closer source {} reaches {}", s, l);
                }
            }
            helper.add_element(pos);
        }
    }

    #[test]
    fn complement_matches_flipped_bytes() {
        let mut input = vec![0u8; 100];
        input.extend(vec![0xffu8; 100]);
        let mut helper = ComplementLzHelper::new(&input);
        for i in 0..100 {
            helper.add_element(i);
        }
        let res = helper.find_c(100, 100, 3);
        assert_eq!(res, Match { ofs: 0, len: 100 });
    }

    #[test]
    fn flip_helper_finds_mirrored_and_reversed_sources() {
        let input = b"abcba";
        let mut helper = FlipLzHelper::new(input);
        for i in 0..3 {
            helper.add_element(i);
        }
        let res = helper.find_v(3, 3, 2);
        assert_eq!(res, Match { ofs: 1, len: 2 });

        // bit-reversed: 0x0f mirrors to 0xf0
        let input = [0x0f, 0x0f, 0x0f, 0xf0, 0xf0, 0xf0];
        let mut helper = FlipLzHelper::new(&input);
        for i in 0..3 {
            helper.add_element(i);
        }
        let res = helper.find_h(3, 6, 2);
        assert_eq!(res.len, 3);
        assert_eq!(input[res.ofs].reverse_bits(), input[3]);
    }

    #[test]
    fn non_overlapping_never_crosses_the_destination() {
        let mut rng = StdRng::seed_from_u64(13);
        for &sigma in &[2u8, 4] {
            let input: Vec<u8> = (0..150).map(|_| rng.gen_range(0..sigma)).collect();
            let helper = NonOverlapLzHelper::new(&input);
            let mut prev = Match::NONE;
            for adr in 1..input.len() {
                let res = helper.find_non_overlapping(adr, 0x40, prev);
                if res.found() {
                    assert!(res.ofs + res.len <= adr, "adr={} {:?}", adr, res);
                    assert!(adr - res.ofs <= 0x40);
                    for k in 0..res.len {
                        assert_eq!(input[res.ofs + k], input[adr + k]);
                    }
                    // no longer non-overlapping source exists
                    let lo = adr.saturating_sub(0x40);
                    let mut best = 0;
                    for s in lo..adr {
                        let mut l = 0;
                        while adr + l < input.len() && s + l < adr && input[s + l] == input[adr + l] {
                            l += 1;
                        }
                        best = best.max(l);
                    }
                    assert_eq!(res.len, best, "adr={}", adr);
                }
                prev = res;
            }
        }
    }
}
