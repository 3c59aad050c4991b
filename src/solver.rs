//! The one-source shortest-path table behind every compressor.
//!
//! Vertices are input positions `0..=n`; an edge is one codec
//! primitive, costed in whatever additive unit the codec emits (bits
//! for flag-stream codecs, bytes for byte-aligned ones). Codec glue
//! relaxes edges position by position, then reads the winning command
//! chain back from the final vertex.

use crate::lz::Match;

/// Unreachable-vertex cost. Far below `usize::MAX` so that adding an
/// edge cost to it cannot wrap.
pub const INFINITE_COST: usize = usize::MAX / 2;

/// An edge-cost function `len -> (a * len + b) / div`, with its
/// monotone-prune eligibility carried as data: the range-relaxation
/// prune is sound only when the function is affine in `len` (and, for
/// strided relaxation, when the stride divides out the quotient).
#[derive(Debug, Clone, Copy)]
pub struct CostFn {
    a: usize,
    b: usize,
    div: usize,
}

impl CostFn {
    pub const fn linear(a: usize, b: usize) -> Self {
        CostFn { a, b, div: 1 }
    }

    pub const fn constant(b: usize) -> Self {
        CostFn { a: 0, b, div: 1 }
    }

    pub const fn linear_div(a: usize, b: usize, div: usize) -> Self {
        CostFn { a, b, div }
    }

    #[inline]
    pub fn at(&self, len: usize) -> usize {
        (self.a * len + self.b) / self.div
    }

    #[inline]
    fn affine(&self) -> bool {
        self.div == 1
    }

    #[inline]
    fn affine_k(&self, k: usize) -> bool {
        k % self.div == 0
    }
}

/// One row of a codec's stepped offset or length schema: values in
/// `[min, max]` are encoded in `bitlen` output bits, `val` carrying the
/// fixed prefix pattern the raw value is OR-ed into.
#[derive(Debug, Clone, Copy)]
pub struct Vrange {
    pub min: usize,
    pub max: usize,
    pub bitlen: usize,
    pub val: u64,
}

/// Build contiguous classes from `(min, bitlen, val)` rows; each row's
/// `max` is the next row's `min` minus one, the last row capped at
/// `max_value`.
pub fn to_vranges(rows: &[(usize, usize, u64)], max_value: usize) -> Vec<Vrange> {
    rows.iter()
        .enumerate()
        .map(|(i, &(min, bitlen, val))| Vrange {
            min,
            max: if i + 1 == rows.len() {
                max_value
            } else {
                rows[i + 1].0 - 1
            },
            bitlen,
            val,
        })
        .collect()
}

/// Tag carrying a length-class index; both fields take part in
/// equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagL<T> {
    pub tag: T,
    pub li: u16,
}

impl<T> TagL<T> {
    pub fn new(tag: T, li: usize) -> Self {
        TagL { tag, li: li as u16 }
    }
}

impl<T: PartialEq> PartialEq for TagL<T> {
    fn eq(&self, rhs: &Self) -> bool {
        self.tag == rhs.tag && self.li == rhs.li
    }
}

impl<T: Eq> Eq for TagL<T> {}

/// Tag carrying an offset-class index. The offset class never takes
/// part in equality: two edges differing only there are the same edge
/// kind to the monotone prune.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagO<T> {
    pub tag: T,
    pub oi: u16,
}

impl<T> TagO<T> {
    pub fn new(tag: T, oi: usize) -> Self {
        TagO { tag, oi: oi as u16 }
    }
}

impl<T: PartialEq> PartialEq for TagO<T> {
    fn eq(&self, rhs: &Self) -> bool {
        self.tag == rhs.tag
    }
}

impl<T: Eq> Eq for TagO<T> {}

/// Tag carrying both class indices; equality compares the primitive
/// and the length class only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagOl<T> {
    pub tag: T,
    pub oi: u16,
    pub li: u16,
}

impl<T> TagOl<T> {
    pub fn new(tag: T, oi: usize, li: usize) -> Self {
        TagOl {
            tag,
            oi: oi as u16,
            li: li as u16,
        }
    }
}

impl<T: PartialEq> PartialEq for TagOl<T> {
    fn eq(&self, rhs: &Self) -> bool {
        self.tag == rhs.tag && self.li == rhs.li
    }
}

impl<T: Eq> Eq for TagOl<T> {}

/// A solved vertex: the cheapest known way to reach this input
/// position. `len` is the byte span of the incoming edge, `arg` its
/// codec-specific argument (usually the back-reference source), `tag`
/// the primitive that produced it.
#[derive(Debug, Clone, Copy)]
pub struct Vertex<T> {
    pub cost: usize,
    pub len: usize,
    pub arg: usize,
    pub tag: T,
}

pub struct SsspSolver<T> {
    vertex: Vec<Vertex<T>>,
}

impl<T: Copy + Eq + Default> SsspSolver<T> {
    pub fn new(n: usize) -> Self {
        Self::starting_at(n, 0)
    }

    /// A solver whose source vertex is `begin` instead of 0; positions
    /// before it stay unreachable (used when a codec stores a verbatim
    /// prefix).
    pub fn starting_at(n: usize, begin: usize) -> Self {
        let mut vertex = vec![
            Vertex {
                cost: INFINITE_COST,
                len: 0,
                arg: 0,
                tag: T::default(),
            };
            n + 1
        ];
        if begin <= n {
            vertex[begin].cost = 0;
        }
        SsspSolver { vertex }
    }

    pub fn size(&self) -> usize {
        self.vertex.len()
    }

    pub fn get(&self, i: usize) -> &Vertex<T> {
        &self.vertex[i]
    }

    pub fn optimal_cost(&self) -> usize {
        self.vertex.last().unwrap().cost
    }

    /// Relax the single edge `adr - len -> adr` with total cost `cost`,
    /// keeping the target only on strict improvement.
    pub fn update(&mut self, adr: usize, len: usize, tag: T, cost: usize, arg: usize) {
        if adr < len {
            return;
        }
        let target = &mut self.vertex[adr];
        if cost >= target.cost {
            return;
        }
        *target = Vertex { cost, len, arg, tag };
    }

    /// Like [`update`](Self::update), but an equal cost also wins;
    /// needed where a later pass is expected to refine equal-cost ties.
    pub fn update_u(&mut self, adr: usize, len: usize, tag: T, cost: usize, arg: usize) {
        if adr < len {
            return;
        }
        let target = &mut self.vertex[adr];
        if cost > target.cost {
            return;
        }
        *target = Vertex { cost, len, arg, tag };
    }

    /// Relax the parallel edges `adr -> adr + l` for `l` in `[fr, to]`,
    /// costed `base + func(l)` (`base` defaults to the cost of `adr`).
    /// Iterates downward; once an affine `func` meets a target already
    /// carrying this tag, no smaller `l` can improve and the rest of
    /// the range is skipped.
    pub fn update_range(
        &mut self,
        adr: usize,
        fr: usize,
        to: usize,
        func: CostFn,
        tag: T,
        base_cost: Option<usize>,
        arg: usize,
    ) {
        let limit = if self.size() > adr {
            self.size() - 1 - adr
        } else {
            0
        };
        let to = to.min(limit);
        if to < fr {
            return;
        }
        let base = base_cost.unwrap_or(self.vertex[adr].cost);
        for i in (fr..=to).rev() {
            let cost = base + func.at(i);
            let target = &mut self.vertex[adr + i];
            if cost >= target.cost {
                if func.affine() && target.tag == tag {
                    break;
                }
                continue;
            }
            *target = Vertex {
                cost,
                len: i,
                arg,
                tag,
            };
        }
    }

    /// [`update_range`](Self::update_range) restricted to
    /// `l ≡ fr (mod k)`.
    pub fn update_k(
        &mut self,
        adr: usize,
        fr: usize,
        to: usize,
        k: usize,
        func: CostFn,
        tag: T,
        arg: usize,
    ) {
        debug_assert!(k > 0);
        let limit = if self.size() > adr {
            self.size() - 1 - adr
        } else {
            0
        };
        let to = to.min(limit);
        if to < fr {
            return;
        }
        let to = fr + (to - fr) / k * k;
        let base = self.vertex[adr].cost;
        let mut i = to;
        loop {
            let cost = base + func.at(i);
            let target = &mut self.vertex[adr + i];
            if cost >= target.cost {
                if func.affine_k(k) && target.tag == tag {
                    break;
                }
            } else {
                *target = Vertex {
                    cost,
                    len: i,
                    arg,
                    tag,
                };
            }
            if i == fr {
                break;
            }
            i -= k;
        }
    }

    /// Range relaxation clipped to a match: lengths beyond `lz.len`
    /// are unreachable, and the match source rides along as `arg`.
    pub fn update_lz(
        &mut self,
        adr: usize,
        fr: usize,
        to: usize,
        lz: Match,
        func: CostFn,
        tag: T,
        base_cost: Option<usize>,
    ) {
        self.update_range(adr, fr, to.min(lz.len), func, tag, base_cost, lz.ofs);
    }

    /// Relax every feasible (offset class, length class) pair at `adr`
    /// against stepped schemata. Walks the offset classes from widest
    /// to narrowest, tracking the cheapest class whose distance range
    /// contains the realised match distance, and lazily re-queries
    /// `find_lz` per class: narrowing the window may surface a closer
    /// source that unlocks a cheaper row. `extra_bits` is the fixed
    /// per-edge cost on top of both class widths (typically the tag
    /// bit).
    pub fn update_lz_matrix<F, G>(
        &mut self,
        adr: usize,
        offsets: &[Vrange],
        lens: &[Vrange],
        mut find_lz: F,
        tag: G,
        extra_bits: usize,
        base_cost: Option<usize>,
    ) where
        F: FnMut(usize) -> Match,
        G: Fn(usize, usize) -> T,
    {
        if offsets.is_empty() || lens.is_empty() {
            return;
        }
        let base = base_cost.unwrap_or(self.vertex[adr].cost);
        let lz_min_len = lens[0].min;
        let mut res_lz = find_lz(offsets.len() - 1);
        let mut best_oi = 0usize;
        let mut best_bitlen = usize::MAX;
        let mut best_lz = Match::NONE;
        let mut oi = offsets.len() as isize - 1;
        let mut li = lens.len() as isize - 1;
        loop {
            if res_lz.len < lz_min_len {
                break;
            }
            let d = adr - res_lz.ofs;
            while oi >= 0 && d < offsets[oi as usize].min {
                oi -= 1;
            }
            if oi < 0 {
                break;
            }
            if offsets[oi as usize].bitlen <= best_bitlen {
                best_oi = oi as usize;
                best_bitlen = offsets[best_oi].bitlen;
                best_lz = res_lz;
            }
            let next_lz = if oi == 0 {
                Match::NONE
            } else {
                find_lz(oi as usize - 1)
            };
            // relax the length classes reachable with this pair of
            // bounds; anything shorter is left for the narrower offset
            // classes still to come
            let min_len = next_lz.len + 1;
            let max_len = res_lz.len;
            while li >= 0 && max_len < lens[li as usize].min {
                li -= 1;
            }
            while li >= 0 && min_len <= lens[li as usize].max {
                let l = lens[li as usize];
                let cost = base + offsets[best_oi].bitlen + l.bitlen + extra_bits;
                self.update_lz(
                    adr,
                    min_len.max(l.min),
                    max_len.min(l.max),
                    best_lz,
                    CostFn::constant(0),
                    tag(best_oi, li as usize),
                    Some(cost),
                );
                if min_len > l.min {
                    break;
                }
                li -= 1;
            }
            oi -= 1;
            if oi < 0 {
                break;
            }
            res_lz = next_lz;
        }
    }

    /// Read the winning command chain back from the last vertex.
    /// Panics on a zero-length or out-of-range edge: that is a
    /// construction bug in the calling codec, never an input condition.
    pub fn commands(&self, start: usize) -> Vec<Vertex<T>> {
        let mut ret = Vec::new();
        let mut adr = self.size() - 1;
        while adr > start {
            let cmd = self.vertex[adr];
            assert!(
                cmd.len > 0 && cmd.len <= adr,
                "corrupt command chain at position {}",
                adr
            );
            adr -= cmd.len;
            ret.push(cmd);
        }
        assert_eq!(adr, start, "command chain missed the start position");
        ret.reverse();
        ret
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lz::Match;

    #[test]
    fn empty_input_solves_to_nothing() {
        let dp = SsspSolver::<u8>::new(0);
        assert_eq!(dp.optimal_cost(), 0);
        assert!(dp.commands(0).is_empty());
    }

    #[test]
    fn single_literal_chain() {
        let mut dp = SsspSolver::<u8>::new(1);
        dp.update_range(0, 1, 1, CostFn::constant(9), 1, None, 0);
        assert_eq!(dp.optimal_cost(), 9);
        let cmds = dp.commands(0);
        assert_eq!(cmds.len(), 1);
        assert_eq!((cmds[0].len, cmds[0].tag), (1, 1));
    }

    #[test]
    fn equal_cost_policy_differs_between_update_flavours() {
        let mut dp = SsspSolver::<u8>::new(4);
        dp.update(4, 2, 1, 10, 0);
        dp.update(4, 4, 2, 10, 0);
        assert_eq!(dp.get(4).tag, 1);
        dp.update_u(4, 4, 2, 10, 0);
        assert_eq!(dp.get(4).tag, 2);
    }

    #[test]
    fn range_prune_matches_per_edge_relaxation() {
        // same dp driven with and without the batched primitives
        let input: &[u8] = b"abcabcabcabcaaaaabcabc";
        let lz = |i: usize| -> Match {
            let mut best = Match::NONE;
            for s in 0..i {
                let mut l = 0;
                while i + l < input.len() && input[s + l] == input[i + l] {
                    l += 1;
                }
                if l > best.len {
                    best = Match { ofs: s, len: l };
                }
            }
            best
        };
        let mut a = SsspSolver::<u8>::new(input.len());
        let mut b = SsspSolver::<u8>::new(input.len());
        for i in 0..input.len() {
            a.update_range(i, 1, 1, CostFn::constant(9), 0, None, 0);
            b.update_range(i, 1, 1, CostFn::constant(9), 0, None, 0);
            let m = lz(i);
            a.update_lz(i, 2, 16, m, CostFn::linear(1, 17), 1, None);
            for l in 2..=16.min(m.len) {
                if i + l < b.size() {
                    let cost = b.get(i).cost + l + 17;
                    b.update(i + l, l, 1, cost, m.ofs);
                }
            }
        }
        assert_eq!(a.optimal_cost(), b.optimal_cost());
        for i in 0..=input.len() {
            assert_eq!(a.get(i).cost, b.get(i).cost, "vertex {}", i);
        }
    }

    #[test]
    fn strided_relaxation_only_touches_the_lattice() {
        let mut dp = SsspSolver::<u8>::new(10);
        dp.update_k(0, 2, 9, 2, CostFn::constant(5), 7, 0);
        for i in 0..=10 {
            let reached = dp.get(i).cost < INFINITE_COST;
            let expect = i == 0 || (i >= 2 && i <= 8 && i % 2 == 0);
            assert_eq!(reached, expect, "vertex {}", i);
        }
    }

    #[test]
    fn tag_equality_ignores_the_offset_class() {
        assert_eq!(TagOl::new(3u8, 0, 2), TagOl::new(3u8, 1, 2));
        assert_ne!(TagOl::new(3u8, 0, 2), TagOl::new(3u8, 0, 1));
        assert_eq!(TagO::new(3u8, 0), TagO::new(3u8, 5));
        assert_ne!(TagL::new(3u8, 0), TagL::new(3u8, 1));
    }

    #[test]
    #[should_panic(expected = "corrupt command chain")]
    fn zero_length_edge_is_fatal() {
        let mut dp = SsspSolver::<u8>::new(3);
        dp.update(3, 3, 1, 5, 0);
        // corrupt the middle of the chain: vertex 3 now claims len 0
        dp.update(3, 0, 1, 1, 0);
        let _ = dp.commands(0);
    }
}
