//! LZW compression with a code width picked after the input has been encoded.
//!
//! Container layout: `[u64 code count]` followed by a bitstream of a 5 bit code width and then
//! every code in that many bits, most significant bit first, zero padded to a whole byte.

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Read, Write};

pub mod dict;

pub use dict::Dictionary;

use super::{CodecErr, CodecResult, CompressOptions, Compressor, ReadFieldExt};

/// Number of bits in the code width header field
pub const WIDTH_BITS: u32 = 5;

/// Largest code width the header field can describe
pub const MAX_CODE_WIDTH: u32 = (1 << WIDTH_BITS) - 1;

/// Return the number of bits needed to write a code, at least one
#[inline]
pub fn bits_needed(code: u32) -> u32 {
    (32 - code.leading_zeros()).max(1)
}

/// The `CompressedLzw` struct holds the codes produced by the LZW encoder and the width every
/// code is stored with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedLzw {
    code_width: u32,
    codes: Vec<u32>,
}

impl CompressedLzw {
    /// Wrap encoded codes, choosing the smallest width that fits the largest code
    pub fn new(codes: Vec<u32>) -> CodecResult<Self> {
        let width = bits_needed(codes.iter().copied().max().unwrap_or(0));
        Self::with_width(width, codes)
    }

    /// Wrap codes with an explicit width, every code must fit in it
    pub fn with_width(code_width: u32, codes: Vec<u32>) -> CodecResult<Self> {
        if code_width == 0 || code_width > MAX_CODE_WIDTH {
            return Err(CodecErr::InvalidCodeWidth(code_width));
        }
        if let Some(&code) = codes.iter().find(|&&c| bits_needed(c) > code_width) {
            return Err(CodecErr::InvalidCodeWidth(bits_needed(code)));
        }
        Ok(Self { code_width, codes })
    }

    /// Number of bits every code is stored with
    #[inline]
    pub fn code_width(&self) -> u32 {
        self.code_width
    }

    #[inline]
    pub fn codes(&self) -> &[u32] {
        &self.codes
    }

    /// Return the number of bytes [write_to](fn@CompressedLzw::write_to) produces
    pub fn encoded_len(&self) -> usize {
        let bits = WIDTH_BITS as u64 + self.code_width as u64 * self.codes.len() as u64;
        8 + ((bits + 7) / 8) as usize
    }

    /// Write the container bytes
    pub fn write_to<W: Write>(&self, writer: &mut W) -> CodecResult<()> {
        writer.write_u64::<LittleEndian>(self.codes.len() as u64)?;
        let mut bits = BitWriter::endian(writer, BigEndian);
        bits.write(WIDTH_BITS, self.code_width)?;
        for &code in &self.codes {
            bits.write(self.code_width, code)?;
        }
        bits.byte_align()?;
        Ok(())
    }

    /// Read container bytes written by [write_to](fn@CompressedLzw::write_to)
    pub fn read_from<R: Read>(reader: &mut R) -> CodecResult<Self> {
        let count = reader.u64_field("code count")?;
        let mut packed = Vec::new();
        reader.read_to_end(&mut packed)?;
        if packed.is_empty() {
            return Err(CodecErr::Truncated("code width"));
        }

        let mut bits = BitReader::endian(&packed[..], BigEndian);
        let code_width = bits.read::<u32>(WIDTH_BITS)?;
        if code_width == 0 {
            return Err(CodecErr::InvalidCodeWidth(code_width));
        }
        let available = (packed.len() as u64 * 8 - WIDTH_BITS as u64) / code_width as u64;
        if count > available {
            return Err(CodecErr::Truncated("codes"));
        }

        let codes = (0..count)
            .map(|_| bits.read::<u32>(code_width))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { code_width, codes })
    }
}

/// Run the LZW encoder over some data, growing `dict` by one pattern for every code emitted
/// except the last
pub fn encode_with(data: &[u8], dict: &mut Dictionary) -> Vec<u32> {
    let mut codes = Vec::new();
    // Code of the longest known pattern that matches the input so far
    let mut current: Option<u32> = None;

    for &byte in data {
        current = Some(match current {
            None => byte as u32,
            Some(prefix) => match dict.find(prefix, byte) {
                Some(code) => code,
                None => {
                    codes.push(prefix);
                    dict.insert(prefix, byte);
                    byte as u32
                }
            },
        });
    }

    if let Some(code) = current {
        codes.push(code);
    }
    codes
}

/// Run the LZW decoder over some codes, rebuilding `dict` in lockstep with the encoder
pub fn decode_with(codes: &[u32], dict: &mut Dictionary) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut prev: Option<u32> = None;

    for &code in codes {
        let first = match prev {
            _ if dict.contains(code) => dict.first_byte(code),
            // The encoder emitted the pattern it created in the same step, which is the
            // previous pattern followed by its own first byte
            Some(prev) if code == dict.next_code() => dict.first_byte(prev),
            _ => None,
        }
        .ok_or(CodecErr::UnknownCode {
            code,
            dict_len: dict.len(),
        })?;

        if let Some(prev) = prev {
            dict.insert(prev, first);
        }
        if !dict.append_pattern(code, &mut out) {
            return Err(CodecErr::UnknownCode {
                code,
                dict_len: dict.len(),
            });
        }
        prev = Some(code);
    }
    Ok(out)
}

/// Compress bytes into LZW codes
pub fn compress(data: &[u8], opts: &CompressOptions) -> CodecResult<CompressedLzw> {
    if data.is_empty() {
        return Err(CodecErr::EmptyInput);
    }

    let mut dict = Dictionary::new();
    let codes = encode_with(data, &mut dict);
    let compressed = CompressedLzw::new(codes)?;
    opts.check_gain(data.len(), compressed.encoded_len())?;

    tracing::debug!(
        input = data.len(),
        codes = compressed.codes.len(),
        dictionary = dict.len(),
        code_width = compressed.code_width,
        "lzw compressed"
    );
    Ok(compressed)
}

/// Decode LZW codes back into the original bytes
pub fn decompress(compressed: &CompressedLzw) -> CodecResult<Vec<u8>> {
    let mut dict = Dictionary::new();
    let out = decode_with(&compressed.codes, &mut dict)?;
    tracing::debug!(
        codes = compressed.codes.len(),
        dictionary = dict.len(),
        output = out.len(),
        "lzw decompressed"
    );
    Ok(out)
}

/// The `Lzw` struct gives the LZW codec an implementation of [Compressor]
pub struct Lzw;

impl Compressor for Lzw {
    type Compressed = CompressedLzw;

    fn compress(data: &[u8], opts: &CompressOptions) -> CodecResult<CompressedLzw> {
        compress(data, opts)
    }

    fn decompress(compressed: &CompressedLzw) -> CodecResult<Vec<u8>> {
        decompress(compressed)
    }

    fn encode<W: Write>(compressed: &CompressedLzw, writer: &mut W) -> CodecResult<()> {
        compressed.write_to(writer)
    }

    fn decode<R: Read>(reader: &mut R) -> CodecResult<CompressedLzw> {
        CompressedLzw::read_from(reader)
    }
}
