//! HAL-style packet codecs: a 3-bit command and a length packed into a
//! 1-byte header (2 bytes past length 0x20, up to 0x400), then the
//! command payload, with 0xff closing the stream. Besides direct runs
//! and byte/word/incrementing fills, back-references come in three
//! flavours: plain, bit-reversed and backwards-reading. The `lz3`
//! variant swaps the incrementing fill for a zero fill and adds a
//! 1-byte relative form for sources at most 0x80 bytes back.

use smallvec::{smallvec, SmallVec};

use crate::errors::{check_size, PackError};
use crate::lz::{find_all, FlipLzHelper, Match};
use crate::solver::{CostFn, SsspSolver, TagOl, Vrange};
use crate::uncomp::UncompHelper;
use crate::writer::Writer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Kind {
    #[default]
    Uncomp,
    Rle,
    Rle16,
    RleInc,
    RleZero,
    Lz,
    LzBitRev,
    LzBackward,
}

impl Kind {
    fn command(self) -> usize {
        match self {
            Kind::Uncomp => 0,
            Kind::Rle => 1,
            Kind::Rle16 => 2,
            Kind::RleInc | Kind::RleZero => 3,
            Kind::Lz => 4,
            Kind::LzBitRev => 5,
            Kind::LzBackward => 6,
        }
    }
}

struct Layout {
    /// word fill emits two bytes per length unit
    double_word: bool,
    /// command 3 is a zero fill instead of an incrementing fill
    zero_fill: bool,
    /// sources at distance <= 0x80 get a 1-byte relative offset
    rel_ofs: bool,
    max_size: usize,
}

const HAL: Layout = Layout {
    double_word: true,
    zero_fill: false,
    rel_ofs: false,
    max_size: 0x10000,
};

const LZ3: Layout = Layout {
    double_word: false,
    zero_fill: true,
    rel_ofs: true,
    max_size: 0x8000,
};

pub fn hal(input: &[u8]) -> Result<Vec<u8>, PackError> {
    packet_core(input, &HAL)
}

pub fn lz3(input: &[u8]) -> Result<Vec<u8>, PackError> {
    packet_core(input, &LZ3)
}

fn packet_core(input: &[u8], layout: &Layout) -> Result<Vec<u8>, PackError> {
    check_size(input.len(), 0, layout.max_size)?;
    let n = input.len();

    // run[i]: equal bytes from i on; pair[i]: bytes alternating with
    // period 2; inc[i]: bytes counting up by one
    let mut run = vec![1usize; n];
    let mut inc = vec![1usize; n];
    for i in (0..n.saturating_sub(1)).rev() {
        if input[i] == input[i + 1] {
            run[i] = run[i + 1] + 1;
        }
        if input[i + 1] == input[i].wrapping_add(1) {
            inc[i] = inc[i + 1] + 1;
        }
    }
    let mut pair = vec![0usize; n];
    if n >= 1 {
        pair[n - 1] = 1;
    }
    for i in (0..n.saturating_sub(1)).rev() {
        pair[i] = if i + 2 < n && input[i] == input[i + 2] {
            pair[i + 1] + 1
        } else {
            (n - i).min(2)
        };
    }

    let offsets: SmallVec<[Vrange; 2]> = if layout.rel_ofs {
        smallvec![
            Vrange { min: 1, max: 0x80, bitlen: 1, val: 0 },
            Vrange { min: 1, max: layout.max_size, bitlen: 2, val: 0 },
        ]
    } else {
        smallvec![Vrange { min: 1, max: layout.max_size, bitlen: 2, val: 0 }]
    };

    let mut lz_helper = FlipLzHelper::new(input);
    let mut u_helper = UncompHelper::new(n, 1);
    let mut dp = SsspSolver::<TagOl<Kind>>::new(n);

    let kinds = [Kind::Lz, Kind::LzBitRev, Kind::LzBackward];
    for i in 0..n {
        u_helper.update(i, dp.get(i).cost);
        if let Some(u1) = u_helper.find(i + 1, 1, 0x20) {
            dp.update_u(i + 1, u1.len, TagOl::new(Kind::Uncomp, 0, 0), u1.cost + 1, 0);
        }
        if let Some(u2) = u_helper.find(i + 1, 0x21, 0x400) {
            dp.update_u(i + 1, u2.len, TagOl::new(Kind::Uncomp, 0, 1), u2.cost + 2, 0);
        }

        dp.update_range(i, 2, run[i].min(0x20), CostFn::constant(2), TagOl::new(Kind::Rle, 0, 0), None, 0);
        dp.update_range(i, 0x21, run[i].min(0x400), CostFn::constant(3), TagOl::new(Kind::Rle, 0, 1), None, 0);

        if layout.double_word {
            dp.update_k(i, 2, pair[i].min(0x40), 2, CostFn::constant(3), TagOl::new(Kind::Rle16, 0, 0), 0);
            dp.update_k(i, 0x42, pair[i].min(0x800), 2, CostFn::constant(4), TagOl::new(Kind::Rle16, 0, 1), 0);
        } else {
            dp.update_range(i, 2, pair[i].min(0x20), CostFn::constant(3), TagOl::new(Kind::Rle16, 0, 0), None, 0);
            dp.update_range(i, 0x21, pair[i].min(0x400), CostFn::constant(4), TagOl::new(Kind::Rle16, 0, 1), None, 0);
        }

        if layout.zero_fill {
            if input[i] == 0 {
                dp.update_range(i, 2, run[i].min(0x20), CostFn::constant(1), TagOl::new(Kind::RleZero, 0, 0), None, 0);
                dp.update_range(i, 0x21, run[i].min(0x400), CostFn::constant(2), TagOl::new(Kind::RleZero, 0, 1), None, 0);
            }
        } else {
            dp.update_range(i, 2, inc[i].min(0x20), CostFn::constant(2), TagOl::new(Kind::RleInc, 0, 0), None, 0);
            dp.update_range(i, 0x21, inc[i].min(0x400), CostFn::constant(3), TagOl::new(Kind::RleInc, 0, 1), None, 0);
        }

        for &kind in &kinds {
            let mut dest: SmallVec<[Match; 2]> = smallvec![Match::NONE; offsets.len()];
            find_all(i, &offsets, 2, &mut dest, |oi| match kind {
                Kind::LzBitRev => lz_helper.find_h(i, offsets[oi].max, 2),
                Kind::LzBackward => lz_helper.find_v(i, offsets[oi].max, 2),
                _ => lz_helper.find(i, offsets[oi].max, 2),
            });
            for (oi, &m) in dest.iter().enumerate() {
                let payload = offsets[oi].bitlen;
                dp.update_lz(i, 2, 0x20, m, CostFn::constant(1 + payload), TagOl::new(kind, oi, 0), None);
                dp.update_lz(i, 0x21, 0x400, m, CostFn::constant(2 + payload), TagOl::new(kind, oi, 1), None);
            }
        }

        lz_helper.add_element(i);
    }

    let mut ret = Writer::with_header(0);
    let mut adr = 0;
    for cmd in dp.commands(0) {
        let kind = cmd.tag.tag;
        let field = if kind == Kind::Rle16 && layout.double_word {
            cmd.len / 2
        } else {
            cmd.len
        };
        if field - 1 <= 0x1f {
            ret.byte(((kind.command() << 5) | (field - 1)) as u8);
        } else {
            ret.u16_be(((0b111 << 13) | (kind.command() << 10) | (field - 1)) as u16);
        }
        match kind {
            Kind::Uncomp => ret.bytes(&input[adr..adr + cmd.len]),
            Kind::Rle | Kind::RleInc => ret.byte(input[adr]),
            Kind::Rle16 => ret.bytes(&input[adr..adr + 2]),
            Kind::RleZero => {}
            Kind::Lz | Kind::LzBitRev | Kind::LzBackward => {
                if layout.rel_ofs && cmd.tag.oi == 0 {
                    let d = adr - cmd.arg;
                    ret.byte((0x80 | (d - 1)) as u8);
                } else {
                    ret.u16_be(cmd.arg as u16);
                }
            }
        }
        adr += cmd.len;
    }
    ret.byte(0xff);
    assert_eq!(adr, input.len());
    assert_eq!(dp.optimal_cost() + 1, ret.size());
    Ok(ret.into_vec())
}
