//! Bitwise packing of prefix codes into bytes.
//!
//! A packed payload is `[0..7 zero bits][1][payload bits]`, most significant bit first. The zero
//! padding goes in front so that the payload ends exactly on a byte boundary, and the sentinel
//! `1` marks where the padding stops.

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use std::io::{self, Write};

use super::{
    code_table::Code,
    tree::{Node, Tree},
    CodecErr, CodecResult,
};

/// Number of zero bits needed in front of the sentinel
#[inline(always)]
fn padding(payload_bits: u64) -> u64 {
    (8 - (payload_bits + 1) % 8) % 8
}

/// Return the number of bytes a payload of `payload_bits` bits packs into
pub fn packed_len(payload_bits: u64) -> usize {
    ((payload_bits + 1 + padding(payload_bits)) / 8) as usize
}

/// The `BitPacker` writes codes bit by bit into a writer, it must be told how many payload bits
/// will follow so that it can write the padding and sentinel first
pub struct BitPacker<W: Write> {
    bits: BitWriter<W, BigEndian>,
    /// Number of payload bits declared when the packer was created
    expected: u64,
    written: u64,
}

impl<W: Write> BitPacker<W> {
    /// Start a payload of `payload_bits` bits, writing the padding and the sentinel bit
    pub fn new(writer: W, payload_bits: u64) -> CodecResult<Self> {
        let mut bits = BitWriter::endian(writer, BigEndian);
        for _ in 0..padding(payload_bits) {
            bits.write_bit(false)?;
        }
        bits.write_bit(true)?;
        Ok(Self {
            bits,
            expected: payload_bits,
            written: 0,
        })
    }

    /// Append one code to the payload
    pub fn push(&mut self, code: &Code) -> CodecResult<()> {
        for &bit in code.bits() {
            self.bits.write_bit(bit)?;
        }
        self.written += code.len() as u64;
        Ok(())
    }

    /// Finish the payload and return the underlying writer. Fails if the number of bits pushed
    /// differs from the number declared in [new](fn@BitPacker::new)
    pub fn finish(mut self) -> CodecResult<W> {
        if self.written != self.expected {
            return Err(CodecErr::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "packed {} bits into a payload declared as {} bits",
                    self.written, self.expected
                ),
            )));
        }
        self.bits.byte_align()?;
        Ok(self.bits.into_writer())
    }
}

/// The `BitUnpacker` reads the bits of a packed payload back, skipping the padding and sentinel
pub struct BitUnpacker<'a> {
    bits: BitReader<&'a [u8], BigEndian>,
    /// Payload bits left to read
    remaining: u64,
}

impl<'a> BitUnpacker<'a> {
    /// Open a packed payload, the sentinel bit must be somewhere in the first byte
    pub fn new(payload: &'a [u8]) -> CodecResult<Self> {
        let mut bits = BitReader::endian(payload, BigEndian);
        let mut remaining = payload.len() as u64 * 8;
        for _ in 0..8u64.min(remaining) {
            remaining -= 1;
            if bits.read_bit()? {
                return Ok(Self { bits, remaining });
            }
        }
        Err(CodecErr::MissingSentinel)
    }

    /// Return the number of payload bits that have not been read yet
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Read the next payload bit, `None` once the payload is exhausted
    pub fn next_bit(&mut self) -> CodecResult<Option<bool>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        Ok(Some(self.bits.read_bit()?))
    }

    /// Walk a tree from the root using payload bits until a leaf is reached, returning its
    /// value. A tree that is a single leaf consumes one bit per symbol. Returns `None` if the
    /// payload runs out before a leaf is reached
    pub fn decode_symbol(&mut self, tree: &Tree) -> CodecResult<Option<u8>> {
        let mut node = tree.root();
        if let Node::Leaf { value, .. } = node {
            return Ok(self.next_bit()?.map(|_| *value));
        }
        loop {
            match node {
                Node::Leaf { value, .. } => return Ok(Some(*value)),
                Node::Internal { left, right, .. } => {
                    node = match self.next_bit()? {
                        Some(false) => &**left,
                        Some(true) => &**right,
                        None => return Ok(None),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::{code_table::CodeTable, frequency::Frequencies};

    fn code(bits: &str) -> Code {
        Code::from(bits.chars().map(|c| c == '1').collect::<Vec<_>>())
    }

    #[test]
    fn aligned_payload() {
        // AAAAABBBCC with A=0, B=11, C=10 is 15 bits, so the sentinel fills the byte exactly
        let mut packer = BitPacker::new(Vec::new(), 15).unwrap();
        for c in ["0", "0", "0", "0", "0", "11", "11", "11", "10", "10"].iter() {
            packer.push(&code(c)).unwrap();
        }
        let out = packer.finish().unwrap();
        assert_eq!(out, vec![0b1000_0011, 0b1111_1010]);
        assert_eq!(packed_len(15), 2);
    }

    #[test]
    fn padded_payload() {
        let mut packer = BitPacker::new(Vec::new(), 3).unwrap();
        for _ in 0..3 {
            packer.push(&code("0")).unwrap();
        }
        assert_eq!(packer.finish().unwrap(), vec![0b0000_1000]);
        assert_eq!(packed_len(3), 1);
        assert_eq!(packed_len(0), 1);
        assert_eq!(packed_len(7), 1);
        assert_eq!(packed_len(8), 2);

        let mut bits = BitUnpacker::new(&[0b0000_1000]).unwrap();
        assert_eq!(bits.remaining(), 3);
        for _ in 0..3 {
            assert_eq!(bits.next_bit().unwrap(), Some(false));
        }
        assert_eq!(bits.next_bit().unwrap(), None);
    }

    #[test]
    fn wrong_bit_count() {
        let mut packer = BitPacker::new(Vec::new(), 3).unwrap();
        packer.push(&code("10")).unwrap();
        assert!(packer.finish().is_err());
    }

    #[test]
    fn missing_sentinel() {
        assert!(matches!(BitUnpacker::new(&[]), Err(CodecErr::MissingSentinel)));
        assert!(matches!(
            BitUnpacker::new(&[0, 0xff]),
            Err(CodecErr::MissingSentinel)
        ));
    }

    #[test]
    fn decode_with_tree() {
        let data = b"AAAAABBBCC";
        let tree = Tree::from_frequencies(&Frequencies::count(data)).unwrap();
        let mut bits = BitUnpacker::new(&[0b1000_0011, 0b1111_1010]).unwrap();
        let mut out = Vec::new();
        while let Some(byte) = bits.decode_symbol(&tree).unwrap() {
            out.push(byte);
        }
        assert_eq!(out, data.to_vec());
    }

    #[test]
    fn decode_one_leaf_tree() {
        let data = [9u8; 12];
        let freq = Frequencies::count(&data);
        let tree = Tree::from_frequencies(&freq).unwrap();
        let codes = CodeTable::from_tree(&tree);
        let mut packer = BitPacker::new(Vec::new(), codes.encoded_bits(&freq)).unwrap();
        for &byte in data.iter() {
            packer.push(codes.get(byte).unwrap()).unwrap();
        }
        let packed = packer.finish().unwrap();
        assert_eq!(packed.len(), 2);

        let mut bits = BitUnpacker::new(&packed).unwrap();
        let mut count = 0;
        while let Some(byte) = bits.decode_symbol(&tree).unwrap() {
            assert_eq!(byte, 9);
            count += 1;
        }
        assert_eq!(count, 12);
    }
}
