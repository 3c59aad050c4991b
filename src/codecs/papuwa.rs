//! Papuwa codec: byte-granular commands with a 2-byte little-endian
//! size header. Literal runs pay a 1- or 2-byte header amortised over
//! the run, so their relaxation goes through the cheapest-run helper
//! instead of per-byte edges.

use crate::errors::{check_size, PackError};
use crate::lz::LzHelper;
use crate::solver::{CostFn, SsspSolver};
use crate::uncomp::UncompHelper;
use crate::writer::Writer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Tag {
    #[default]
    Uncomp,
    UncompL,
    Lzs,
    Lzm,
    Lzls,
    Lzlm,
    Lzll,
}

pub fn papuwa(input: &[u8]) -> Result<Vec<u8>, PackError> {
    check_size(input.len(), 0, 0xffff)?;

    let mut lz_helper = LzHelper::new(input);
    let mut u_helper = UncompHelper::new(input.len(), 1);
    let mut dp = SsspSolver::<Tag>::new(input.len());

    for i in 0..input.len() {
        u_helper.update(i, dp.get(i).cost);
        if let Some(u1) = u_helper.find(i + 1, 1, 0x10) {
            dp.update_u(i + 1, u1.len, Tag::Uncomp, u1.cost + 1, 0);
        }
        if let Some(u2) = u_helper.find(i + 1, 0x11, 0x11 + 0x03ff) {
            dp.update_u(i + 1, u2.len, Tag::UncompL, u2.cost + 2, 0);
        }
        let res_lzs = lz_helper.find(i, 0x10, 3);
        dp.update_lz(i, 3, 6, res_lzs, CostFn::constant(1), Tag::Lzs, None);
        let res_lzm = lz_helper.find(i, 0x400, 7);
        dp.update_lz(i, 7, 22, res_lzm, CostFn::constant(2), Tag::Lzm, None);
        let res_lzl = lz_helper.find(i, 0x1000, 3);
        dp.update_lz(i, 3, 6, res_lzl, CostFn::constant(2), Tag::Lzls, None);
        dp.update_lz(i, 7, 0x206, res_lzl, CostFn::constant(3), Tag::Lzlm, None);
        dp.update_lz(i, 0x207, 0x8206, res_lzl, CostFn::constant(4), Tag::Lzll, None);
        lz_helper.add_element(i);
    }

    let mut ret = Writer::with_header(2);
    let mut adr = 0;
    for cmd in dp.commands(0) {
        let d = adr - cmd.arg;
        match cmd.tag {
            Tag::Uncomp => {
                ret.byte((0xe0 + cmd.len - 1) as u8);
                ret.bytes(&input[adr..adr + cmd.len]);
            }
            Tag::UncompL => {
                ret.u16_be((0xf800 + cmd.len - 0x11) as u16);
                ret.bytes(&input[adr..adr + cmd.len]);
            }
            Tag::Lzs => ret.byte(((cmd.len - 3) | ((d - 1) << 2)) as u8),
            Tag::Lzm => ret.u16_be((0x8000 | ((cmd.len - 7) << 10) | (d - 1)) as u16),
            Tag::Lzls => ret.u16_be(
                (0x4000 | (((d - 1) & 0x0f00) << 2) | ((cmd.len - 3) << 8) | ((d - 1) & 0x00ff))
                    as u16,
            ),
            Tag::Lzlm => ret.u24_be(
                (0xc0_0000
                    | (((cmd.len - 7) & 0x100) << 12)
                    | (((cmd.len - 7) & 0x00f) << 16)
                    | (((cmd.len - 7) & 0x0f0) << 8)
                    | (d - 1)) as u32,
            ),
            Tag::Lzll => ret.u32_be(
                (0xf000_0000usize
                    | (((cmd.len - 519) & 0x7000) << 12)
                    | (((cmd.len - 519) & 0x00ff) << 16)
                    | (((cmd.len - 519) & 0x0f00) << 4)
                    | (d - 1)) as u32,
            ),
        }
        adr += cmd.len;
    }
    ret.patch_u16_le(0, input.len() as u16);
    assert_eq!(dp.optimal_cost() + 2, ret.size());
    assert_eq!(adr, input.len());
    Ok(ret.into_vec())
}
