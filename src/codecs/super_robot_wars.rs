//! Three codecs sharing one bitstream shape: a `1` flag introduces a
//! literal, `00` a 4-bit short match against the last 0x100 bytes,
//! `01` a 16- or 24-bit long match against the last 0x2000, the wider
//! form distinguished by a zero length nibble in the shorter one. A
//! 26-bit zero long-match terminates the stream.

use crate::errors::{check_size, PackError};
use crate::lz::LzHelper;
use crate::solver::{CostFn, SsspSolver};
use crate::writer::FlagWriter;
use byteorder::{ByteOrder, LE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Tag {
    #[default]
    Uncomp,
    Lzs,
    Lzl,
    Lzll,
}

fn srw_core(
    input: &[u8],
    lz_max_len: usize,
    header_size: usize,
    skipped_size: usize,
) -> Result<Vec<u8>, PackError> {
    if skipped_size > input.len() {
        return Err(PackError::SkippedTooLong {
            skipped: skipped_size,
            size: input.len(),
        });
    }

    let mut lz_helper = LzHelper::new(input);
    let mut dp = SsspSolver::<Tag>::starting_at(input.len(), skipped_size);

    for i in 0..skipped_size {
        lz_helper.add_element(i);
    }

    for i in skipped_size..input.len() {
        dp.update_range(i, 1, 1, CostFn::constant(9), Tag::Uncomp, None, 0);
        let res_lzs = lz_helper.find(i, 0x100, 2);
        dp.update_lz(i, 2, 5, res_lzs, CostFn::constant(12), Tag::Lzs, None);
        let res_lzl = lz_helper.find(i, 0x2000, 3);
        dp.update_lz(i, 3, 9, res_lzl, CostFn::constant(18), Tag::Lzl, None);
        dp.update_lz(i, 10, lz_max_len, res_lzl, CostFn::constant(26), Tag::Lzll, None);
        lz_helper.add_element(i);
    }

    let mut ret = FlagWriter::with_header(header_size);
    ret.bytes(&input[..skipped_size]);

    let mut adr = skipped_size;
    for cmd in dp.commands(skipped_size) {
        let d = adr - cmd.arg;
        match cmd.tag {
            Tag::Uncomp => {
                ret.bit(true);
                ret.byte(input[adr]);
            }
            Tag::Lzs => {
                ret.bits(4, cmd.len - 2);
                ret.byte((0x100 - d) as u8);
            }
            Tag::Lzl => {
                ret.bit(false);
                ret.bit(true);
                ret.u16_be((((0x2000 - d) << 3) | (cmd.len - 2)) as u16);
            }
            Tag::Lzll => {
                ret.bit(false);
                ret.bit(true);
                ret.u24_be((((0x2000 - d) << 11) | (cmd.len - (lz_max_len - 0xff))) as u32);
            }
        }
        adr += cmd.len;
    }
    ret.bit(false);
    ret.bit(true);
    ret.u24_be(0);
    assert_eq!(adr, input.len());
    assert_eq!(
        dp.optimal_cost() + 2 + 3 * 8 + (header_size + skipped_size) * 8,
        ret.bit_length()
    );
    Ok(ret.into_vec())
}

pub fn super_robot_wars(input: &[u8]) -> Result<Vec<u8>, PackError> {
    srw_core(input, 256, 0, 0)
}

pub fn tactics_ogre_2(input: &[u8]) -> Result<Vec<u8>, PackError> {
    srw_core(input, 264, 0, 0)
}

pub fn tenchi_souzou(input: &[u8]) -> Result<Vec<u8>, PackError> {
    check_size(input.len(), 1, 0x10000)?;
    let mut ret = srw_core(input, 256, 3, 1)?;
    ret[0] = 0; // unknown field upstream; kept 0 until documented
    LE::write_u16(&mut ret[1..3], input.len() as u16);
    Ok(ret)
}
