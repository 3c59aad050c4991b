//! A vpk-style method-0 bitstream with a fixed pair of bit-width
//! trees.
//!
//! The 9-byte header ("vpk0", decompressed size, method) is followed
//! by two linearly encoded trees whose leaves give the field widths
//! for offsets and lengths, then the data: a `0` bit introduces a
//! literal byte, a `1` bit a back-reference whose distance and length
//! are each a tree prefix code plus a raw field of the coded width.
//! The width tables double as the solver's stepped schemata, so the
//! parse is bit-optimal for the declared trees.

use bitstream_io::{BigEndian, BitWrite, BitWriter};
use std::io;

use crate::errors::{check_size, PackError};
use crate::lz::LzHelper;
use crate::solver::{to_vranges, CostFn, SsspSolver, TagOl};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Tag {
    #[default]
    Uncomp,
    Lz,
}

/// Field widths of the offset and length trees, leaf order matching
/// the right-nested chain `(a, (b, (c, d)))`, whose prefix codes are
/// `0`, `10`, `110`, `111`.
const OFFSET_WIDTHS: [u8; 4] = [8, 10, 13, 16];
const LENGTH_WIDTHS: [u8; 4] = [2, 4, 6, 8];

/// 9 header bytes plus two 40-bit trees.
const HEADER_BITS: usize = 9 * 8 + 2 * 40;

fn write_tree<W: io::Write>(out: &mut BitWriter<W, BigEndian>, widths: &[u8]) -> io::Result<()> {
    for &w in widths {
        out.write_bit(false)?;
        out.write(8, u32::from(w))?;
    }
    for _ in 1..widths.len() {
        out.write_bit(true)?;
    }
    out.write_bit(true)
}

pub fn vpk_one_sample(input: &[u8]) -> Result<Vec<u8>, PackError> {
    check_size(input.len(), 1, 1 << 24)?;

    let offsets = to_vranges(
        &[
            (1, 1 + 8, 0),
            (0x100, 2 + 10, 0b10 << 10),
            (0x400, 3 + 13, 0b110 << 13),
            (0x2000, 3 + 16, 0b111 << 16),
        ],
        0xffff,
    );
    let lens = to_vranges(
        &[
            (3, 1 + 2, 0),
            (4, 2 + 4, 0b10 << 4),
            (16, 3 + 6, 0b110 << 6),
            (64, 3 + 8, 0b111 << 8),
        ],
        0xff,
    );

    let mut lz_helper = LzHelper::new(input);
    let mut dp = SsspSolver::<TagOl<Tag>>::new(input.len());

    for i in 0..input.len() {
        dp.update_range(i, 1, 1, CostFn::constant(9), TagOl::new(Tag::Uncomp, 0, 0), None, 0);
        dp.update_lz_matrix(
            i,
            &offsets,
            &lens,
            |oi| lz_helper.find(i, offsets[oi].max, 3),
            |oi, li| TagOl::new(Tag::Lz, oi, li),
            1,
            None,
        );
        lz_helper.add_element(i);
    }

    let mut out = BitWriter::endian(Vec::new(), BigEndian);
    out.write_bytes(b"vpk0")?;
    out.write(32, input.len() as u32)?;
    out.write(8, 0u32)?;
    write_tree(&mut out, &OFFSET_WIDTHS)?;
    write_tree(&mut out, &LENGTH_WIDTHS)?;

    let mut bits = HEADER_BITS;
    let mut adr = 0;
    for cmd in dp.commands(0) {
        match cmd.tag.tag {
            Tag::Uncomp => {
                out.write_bit(false)?;
                out.write(8, u32::from(input[adr]))?;
                bits += 9;
            }
            Tag::Lz => {
                let d = adr - cmd.arg;
                let o = offsets[cmd.tag.oi as usize];
                let l = lens[cmd.tag.li as usize];
                debug_assert!(o.min <= d && d <= o.max);
                debug_assert!(l.min <= cmd.len && cmd.len <= l.max);
                out.write_bit(true)?;
                out.write(o.bitlen as u32, (o.val | d as u64) as u32)?;
                out.write(l.bitlen as u32, (l.val | cmd.len as u64) as u32)?;
                bits += 1 + o.bitlen + l.bitlen;
            }
        }
        adr += cmd.len;
    }
    out.byte_align()?;
    let ret = out.into_writer();
    assert_eq!(adr, input.len());
    assert_eq!(dp.optimal_cost() + HEADER_BITS, bits);
    assert_eq!((bits + 7) / 8, ret.len());
    Ok(ret)
}
