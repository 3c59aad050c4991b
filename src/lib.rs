//! Bit-optimal compressors for the bespoke LZ codecs embedded in
//! 16-bit console ROMs.
//!
//! Every codec here shares one backbone: compression is a shortest
//! path over input positions, where each outgoing edge is one codec
//! primitive (a literal run, a back-reference, a fill) priced at the
//! exact number of output bits or bytes it will cost. The pieces are
//! public because per-codec front-ends are thin:
//!
//! * [`SuffixArray`] — suffix array, inverse rank and LCP table, built
//!   once per input (or per transformed concatenation).
//! * [`SegmentTree`] / [`WaveletMatrix`] — the range structures the
//!   match queries fold over.
//! * [`LzHelper`] and friends — "longest match within a distance
//!   window" queries, including complemented ([`ComplementLzHelper`]),
//!   bit-reversed / reversed ([`FlipLzHelper`]) and non-overlapping
//!   ([`NonOverlapLzHelper`]) variants.
//! * [`UncompHelper`] — cheapest literal run of a length range ending
//!   at a position.
//! * [`SsspSolver`] — the shortest-path table with its batch
//!   relaxation primitives and command read-back.
//!
//! Ready-made codecs live in [`codecs`]; [`Encoder`] wraps them behind
//! a builder for reader/file inputs.
//!
//! ```
//! # use sfcpack::{Codec, compress};
//! let packed = compress(Codec::SuperRobotWars, b"abcabcabc")?;
//! # Ok::<(), sfcpack::PackError>(())
//! ```

mod encode;
mod errors;
mod lz;
mod range;
mod solver;
mod suffix;
mod uncomp;
mod writer;

pub mod codecs;

pub use crate::encode::{compress, Codec, Encoder};
pub use crate::errors::PackError;
pub use crate::lz::{
    find_all, ComplementLzHelper, FlipLzHelper, LzHelper, Match, NonOverlapLzHelper,
};
pub use crate::range::{LcpMin, Monoid, RankMax, SegmentTree, WaveletMatrix};
pub use crate::solver::{
    to_vranges, CostFn, SsspSolver, TagL, TagO, TagOl, Vertex, Vrange, INFINITE_COST,
};
pub use crate::suffix::SuffixArray;
pub use crate::uncomp::{LenCost, UncompHelper};
pub use crate::writer::{FlagWriter, Writer};
