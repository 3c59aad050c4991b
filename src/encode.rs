use crate::{codecs, errors::PackError};
use std::{
    fs::File,
    io::Write,
    io::{BufReader, BufWriter, Cursor, Read},
    path::Path,
};

type LogWtr<'a> = &'a mut dyn Write;

/// Which target decompressor the output must feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Codec {
    EstpolisBiography,
    SuperRobotWars,
    TacticsOgre2,
    TenchiSouzou,
    Papuwa,
    Hal,
    Lz3,
    VpkOneSample,
}

impl Codec {
    fn run(self, input: &[u8]) -> Result<Vec<u8>, PackError> {
        match self {
            Codec::EstpolisBiography => codecs::estpolis_biography(input),
            Codec::SuperRobotWars => codecs::super_robot_wars(input),
            Codec::TacticsOgre2 => codecs::tactics_ogre_2(input),
            Codec::TenchiSouzou => codecs::tenchi_souzou(input),
            Codec::Papuwa => codecs::papuwa(input),
            Codec::Hal => codecs::hal(input),
            Codec::Lz3 => codecs::lz3(input),
            Codec::VpkOneSample => codecs::vpk_one_sample(input),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Codec::EstpolisBiography => "estpolis-biography",
            Codec::SuperRobotWars => "super-robot-wars",
            Codec::TacticsOgre2 => "tactics-ogre-2",
            Codec::TenchiSouzou => "tenchi-souzou",
            Codec::Papuwa => "papuwa",
            Codec::Hal => "hal",
            Codec::Lz3 => "lz3",
            Codec::VpkOneSample => "vpk-one-sample",
        }
    }
}

/// Pick a codec, feed it input, collect the compressed stream.
///
/// To create a new `Encoder`, use [`for_reader()`], [`for_file()`], or
/// [`for_bytes()`], select the target with [`codec()`], then produce
/// the output with [`encode_to_writer()`], [`encode_to_file()`], or
/// [`encode_to_vec()`].
/// ```
/// # use sfcpack::{Codec, Encoder};
/// let input = b"ABBACABBCADFEGABA";
/// let compressed = Encoder::for_bytes(input)
///     .codec(Codec::SuperRobotWars)
///     .encode_to_vec();
/// ```
///
/// [`for_reader()`]: Encoder::for_reader
/// [`for_file()`]: Encoder::for_file
/// [`for_bytes()`]: Encoder::for_bytes
/// [`codec()`]: Encoder::codec
/// [`encode_to_writer()`]: Encoder::encode_to_writer
/// [`encode_to_file()`]: Encoder::encode_to_file
/// [`encode_to_vec()`]: Encoder::encode_to_vec
pub struct Encoder<'a, R> {
    rdr: R,
    codec: Codec,
    log: Option<LogWtr<'a>>,
}

impl<'a, R: Read> Encoder<'a, R> {
    /// Create a new `Encoder` for the data in `rdr`.
    #[inline]
    pub fn for_reader(rdr: R) -> Self {
        Self {
            rdr,
            codec: Codec::EstpolisBiography,
            log: None,
        }
    }

    /// Set the target codec.
    #[inline]
    pub fn codec(&mut self, codec: Codec) -> &mut Self {
        self.codec = codec;
        self
    }

    /// Write a line of diagnostics (codec, sizes, ratio) to `log` after
    /// each encode.
    #[inline]
    pub fn with_logging<L: Write>(&mut self, log: &'a mut L) -> &mut Self {
        self.log = Some(log as &'a mut dyn Write);
        self
    }

    /// Start the encoding and write the compressed data out to `wtr`.
    pub fn encode_to_writer<W: Write>(&mut self, mut wtr: W) -> Result<(), PackError> {
        let mut input = Vec::new();
        self.rdr.read_to_end(&mut input)?;
        let out = self.codec.run(&input)?;
        if let Some(log) = self.log.as_mut() {
            writeln!(
                log,
                "{}: {} -> {} bytes ({:.1}%)",
                self.codec.name(),
                input.len(),
                out.len(),
                if input.is_empty() {
                    100.0
                } else {
                    100.0 * out.len() as f64 / input.len() as f64
                },
            )?;
        }
        wtr.write_all(&out)?;
        Ok(())
    }

    /// Start the encoding and write the compressed data out to the
    /// newly created `File` `f`.
    #[inline]
    pub fn encode_to_file<P: AsRef<Path>>(&mut self, f: P) -> Result<(), PackError> {
        let wtr = BufWriter::new(File::create(f)?);
        self.encode_to_writer(wtr)
    }

    /// Start the encoding and return the compressed data in a `Vec<u8>`.
    #[inline]
    pub fn encode_to_vec(&mut self) -> Result<Vec<u8>, PackError> {
        let mut csr = Cursor::new(Vec::new());
        self.encode_to_writer(&mut csr).map(|_| csr.into_inner())
    }
}

impl<'a> Encoder<'a, BufReader<File>> {
    /// Create a new `Encoder` for the file at `p`.
    #[inline]
    pub fn for_file<P: AsRef<Path>>(p: P) -> Result<Self, PackError> {
        let rdr = BufReader::new(File::open(p)?);
        Ok(Self::for_reader(rdr))
    }
}

impl<'a> Encoder<'a, Cursor<&'a [u8]>> {
    /// Create a new `Encoder` for the data in the `bytes` slice.
    #[inline]
    pub fn for_bytes(bytes: &'a [u8]) -> Self {
        Self::for_reader(Cursor::new(bytes))
    }
}

/// Compress a byte slice with `codec`.
///
/// This is a convenience function for callers that do not need the
/// builder.
pub fn compress(codec: Codec, input: &[u8]) -> Result<Vec<u8>, PackError> {
    codec.run(input)
}
