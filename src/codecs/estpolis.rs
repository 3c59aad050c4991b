//! Estpolis biography codec: the simplest flag-stream LZ shape in the
//! family. Literals cost 8 or 9 bits depending on their high bit,
//! short matches 17 bits (distance to 0x800, length to 0x11), long
//! matches 25 bits (distance to 0x2000, length to 0x42). A 2-byte
//! little-endian size header leads the stream.

use crate::errors::{check_size, PackError};
use crate::lz::LzHelper;
use crate::solver::{CostFn, SsspSolver};
use crate::writer::FlagWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Tag {
    #[default]
    Uncomp0,
    Uncomp1,
    Lzs,
    Lzl,
}

pub fn estpolis_biography(input: &[u8]) -> Result<Vec<u8>, PackError> {
    check_size(input.len(), 1, 0x10000)?;

    let mut lz_helper = LzHelper::new(input);
    let mut dp = SsspSolver::<Tag>::new(input.len());

    for i in 0..input.len() {
        if input[i] & 0x80 != 0 {
            dp.update_range(i, 1, 1, CostFn::constant(9), Tag::Uncomp1, None, 0);
        } else {
            dp.update_range(i, 1, 1, CostFn::constant(8), Tag::Uncomp0, None, 0);
        }
        let res_lzs = lz_helper.find(i, 0x800, 3);
        dp.update_lz(i, 3, 0x11, res_lzs, CostFn::constant(17), Tag::Lzs, None);
        let res_lzl = lz_helper.find(i, 0x2000, 3);
        dp.update_lz(i, 3, 0x42, res_lzl, CostFn::constant(25), Tag::Lzl, None);
        lz_helper.add_element(i);
    }

    let mut ret = FlagWriter::with_header(2);
    let mut adr = 0;
    for cmd in dp.commands(0) {
        let d = adr - cmd.arg;
        match cmd.tag {
            Tag::Uncomp0 => ret.byte(input[adr]),
            Tag::Uncomp1 => {
                ret.bit(false);
                ret.byte(input[adr]);
            }
            Tag::Lzs => {
                ret.bit(true);
                ret.u16_be((((0x1000 - d) << 4) | (cmd.len - 2)) as u16);
            }
            Tag::Lzl => {
                ret.bit(true);
                ret.u24_be(
                    ((((0x4000 - d) & !3) << 10) | (((0x4000 - d) & 3) << 6) | (cmd.len - 3))
                        as u32,
                );
            }
        }
        adr += cmd.len;
    }
    ret.patch_u16_le(0, input.len() as u16);
    assert_eq!(adr, input.len());
    assert_eq!(dp.optimal_cost() + 2 * 8, ret.bit_length());
    Ok(ret.into_vec())
}
