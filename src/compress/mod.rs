use byteorder::{LittleEndian, ReadBytesExt};
use std::{
    fmt,
    io::{self, Read, Write},
};
use thiserror::Error;

pub mod bits;
pub mod code_table;
pub mod frequency;
pub mod huffman;
pub mod lzw;
pub mod tree;
pub mod tree_codec;

/// The `CompressOptions` struct configures how a [Compressor] treats its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    /// Refuse to produce an encoding that is not smaller than the input, failing with
    /// [CodecErr::NoGain] instead
    pub require_gain: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self { require_gain: true }
    }
}

impl CompressOptions {
    /// Options that always produce an encoding, even when it is larger than the input
    pub const fn allow_expansion() -> Self {
        Self {
            require_gain: false,
        }
    }

    /// Check an encoded size against the original size using these options
    pub(crate) fn check_gain(&self, original: usize, encoded: usize) -> CodecResult<()> {
        if self.require_gain && encoded >= original {
            tracing::debug!(original, encoded, "encoding offers no size reduction");
            return Err(CodecErr::NoGain { original, encoded });
        }
        Ok(())
    }
}

/// Any error that can occur when compressing or decompressing with one of the codecs
#[derive(Error, Debug)]
pub enum CodecErr {
    #[error("Cannot compress an empty input")]
    EmptyInput,

    #[error("Compression offers no gain: {original} input bytes would encode to {encoded} bytes")]
    NoGain { original: usize, encoded: usize },

    #[error("The serialized tree is corrupt: {0}")]
    CorruptTree(String),

    #[error("Code {code} is not in the dictionary, which holds {dict_len} entries")]
    UnknownCode { code: u32, dict_len: usize },

    #[error("Expected {expected} decoded bytes but the payload produced {actual}")]
    PayloadLengthMismatch { expected: u64, actual: u64 },

    #[error("The packed payload does not start with a sentinel bit")]
    MissingSentinel,

    #[error("A code width of {0} bits is outside the supported range of 1 to 31 bits")]
    InvalidCodeWidth(u32),

    #[error("The input ended before the {0} could be read")]
    Truncated(&'static str),

    #[error("An internal Input/Output error occurred: {0}")]
    Io(#[from] io::Error),
}

/// The `CodecResult<T>` type is a result with an Err variant of [CodecErr]
pub type CodecResult<T> = Result<T, CodecErr>;

/// Turn an end of file while reading a container field into a [CodecErr::Truncated] naming it
fn truncated(what: &'static str) -> impl FnOnce(io::Error) -> CodecErr {
    move |e| match e.kind() {
        io::ErrorKind::UnexpectedEof => CodecErr::Truncated(what),
        _ => CodecErr::Io(e),
    }
}

/// Reading helpers for container headers that report which field was cut short
pub(crate) trait ReadFieldExt: Read {
    /// Fill a buffer completely
    fn field(&mut self, buf: &mut [u8], what: &'static str) -> CodecResult<()> {
        self.read_exact(buf).map_err(truncated(what))
    }

    fn u16_field(&mut self, what: &'static str) -> CodecResult<u16> {
        self.read_u16::<LittleEndian>().map_err(truncated(what))
    }

    fn u64_field(&mut self, what: &'static str) -> CodecResult<u64> {
        self.read_u64::<LittleEndian>().map_err(truncated(what))
    }
}

impl<R: Read + ?Sized> ReadFieldExt for R {}

/// The `Compressor` trait allows a caller to use the different compression methods with one
/// simple API. A compressor turns bytes into its in-memory compressed form and back, and
/// reads and writes that form using its container byte layout.
pub trait Compressor {
    /// The compressed form produced by this codec
    type Compressed;

    /// Compress some input data into its compressed form
    fn compress(data: &[u8], opts: &CompressOptions) -> CodecResult<Self::Compressed>;

    /// Reconstruct the exact original bytes from a compressed form
    fn decompress(compressed: &Self::Compressed) -> CodecResult<Vec<u8>>;

    /// Write the container bytes of a compressed form to a type implementing `Write`
    fn encode<W: Write>(compressed: &Self::Compressed, writer: &mut W) -> CodecResult<()>;

    /// Read a compressed form from its container bytes
    fn decode<R: Read>(reader: &mut R) -> CodecResult<Self::Compressed>;

    /// Compress input data straight into container bytes, convenience wrapper for the
    /// `compress` and `encode` methods
    fn compress_vec(data: &[u8], opts: &CompressOptions) -> CodecResult<Vec<u8>> {
        let compressed = Self::compress(data, opts)?;
        let mut vec = vec![];
        Self::encode(&compressed, &mut vec)?;
        Ok(vec)
    }

    /// Decompress container bytes, convenience wrapper for the `decode` and `decompress` methods
    fn decompress_slice(mut bytes: &[u8]) -> CodecResult<Vec<u8>> {
        let compressed = Self::decode(&mut bytes)?;
        Self::decompress(&compressed)
    }
}

/// The `Algorithm` enum represents every codec that data can be compressed with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Frequency based prefix codes
    Huffman,
    /// Adaptive dictionary substitution
    Lzw,
}

impl Algorithm {
    /// Compress a buffer into container bytes with this algorithm
    pub fn compress(&self, data: &[u8], opts: &CompressOptions) -> CodecResult<Vec<u8>> {
        match self {
            Self::Huffman => huffman::Huffman::compress_vec(data, opts),
            Self::Lzw => lzw::Lzw::compress_vec(data, opts),
        }
    }

    /// Decompress container bytes that were produced with this algorithm
    pub fn decompress(&self, bytes: &[u8]) -> CodecResult<Vec<u8>> {
        match self {
            Self::Huffman => huffman::Huffman::decompress_slice(bytes),
            Self::Lzw => lzw::Lzw::decompress_slice(bytes),
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "huffman" | "huff" => Ok(Self::Huffman),
            "lzw" => Ok(Self::Lzw),
            other => Err(format!("Unknown compression algorithm {}", other)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Huffman => write!(f, "huffman"),
            Self::Lzw => write!(f, "lzw"),
        }
    }
}
