//! Huffman compression with the code tree stored next to the payload.
//!
//! Container layout: `[u16 N][N inorder][N preorder][u64 original length][packed payload]`,
//! see [tree_codec](super::tree_codec) for the traversals and [bits](super::bits) for the
//! payload.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Read, Write};

use super::{
    bits::{packed_len, BitPacker, BitUnpacker},
    code_table::CodeTable,
    frequency::Frequencies,
    tree::Tree,
    tree_codec::SerializedTree,
    CodecErr, CodecResult, CompressOptions, Compressor, ReadFieldExt,
};

/// The `CompressedHuffman` struct is everything needed to reconstruct Huffman compressed data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedHuffman {
    /// The code tree the payload was packed with
    pub tree: SerializedTree,

    /// Packed prefix codes of every input byte, see [BitPacker]
    pub payload: Vec<u8>,

    /// The number of bytes the payload decodes to
    pub original_length: u64,
}

impl CompressedHuffman {
    #[inline]
    pub fn inorder(&self) -> &[u8] {
        self.tree.inorder()
    }

    #[inline]
    pub fn preorder(&self) -> &[u8] {
        self.tree.preorder()
    }

    /// Return the number of bytes [write_to](fn@CompressedHuffman::write_to) produces
    pub fn encoded_len(&self) -> usize {
        self.tree.encoded_len() + 8 + self.payload.len()
    }

    /// Write the container bytes
    pub fn write_to<W: Write>(&self, writer: &mut W) -> CodecResult<()> {
        self.tree.write_to(writer)?;
        writer.write_u64::<LittleEndian>(self.original_length)?;
        writer.write_all(&self.payload)?;
        Ok(())
    }

    /// Read container bytes, the payload is everything after the length field
    pub fn read_from<R: Read>(reader: &mut R) -> CodecResult<Self> {
        let tree = SerializedTree::read_from(reader)?;
        let original_length = reader.u64_field("original length")?;
        let mut payload = Vec::new();
        reader.read_to_end(&mut payload)?;
        Ok(Self {
            tree,
            payload,
            original_length,
        })
    }
}

/// Compress bytes with a Huffman code built from their frequencies
pub fn compress(data: &[u8], opts: &CompressOptions) -> CodecResult<CompressedHuffman> {
    if data.is_empty() {
        return Err(CodecErr::EmptyInput);
    }

    let freq = Frequencies::count(data);
    let tree = Tree::from_frequencies(&freq)?;
    let codes = CodeTable::from_tree(&tree);
    let serialized = SerializedTree::serialize(&tree);

    let payload_bits = codes.encoded_bits(&freq);
    let payload_len = packed_len(payload_bits);
    opts.check_gain(data.len(), serialized.encoded_len() + 8 + payload_len)?;

    let mut packer = BitPacker::new(Vec::with_capacity(payload_len), payload_bits)?;
    for &byte in data {
        match codes.get(byte) {
            Some(code) => packer.push(code)?,
            None => unreachable!("every counted byte has a leaf in the tree"),
        }
    }
    let payload = packer.finish()?;

    tracing::debug!(
        input = data.len(),
        distinct = freq.distinct(),
        tree_bytes = serialized.encoded_len(),
        payload_bits,
        payload = payload.len(),
        "huffman compressed"
    );

    Ok(CompressedHuffman {
        tree: serialized,
        payload,
        original_length: data.len() as u64,
    })
}

/// Rebuild the code tree and decode exactly `original_length` bytes from the payload
pub fn decompress(compressed: &CompressedHuffman) -> CodecResult<Vec<u8>> {
    let tree = compressed.tree.deserialize()?;
    let expected = compressed.original_length;
    let mut bits = BitUnpacker::new(&compressed.payload)?;

    // Every symbol takes at least one bit, so a corrupt length cannot over-allocate
    let mut out = Vec::with_capacity(expected.min(bits.remaining()) as usize);
    while (out.len() as u64) < expected {
        match bits.decode_symbol(&tree)? {
            Some(byte) => out.push(byte),
            None => {
                return Err(CodecErr::PayloadLengthMismatch {
                    expected,
                    actual: out.len() as u64,
                })
            }
        }
    }

    if bits.remaining() > 0 {
        let mut actual = expected;
        while bits.decode_symbol(&tree)?.is_some() {
            actual += 1;
        }
        return Err(CodecErr::PayloadLengthMismatch { expected, actual });
    }

    tracing::debug!(
        payload = compressed.payload.len(),
        output = out.len(),
        "huffman decompressed"
    );
    Ok(out)
}

/// The `Huffman` struct gives the Huffman codec an implementation of [Compressor]
pub struct Huffman;

impl Compressor for Huffman {
    type Compressed = CompressedHuffman;

    fn compress(data: &[u8], opts: &CompressOptions) -> CodecResult<CompressedHuffman> {
        compress(data, opts)
    }

    fn decompress(compressed: &CompressedHuffman) -> CodecResult<Vec<u8>> {
        decompress(compressed)
    }

    fn encode<W: Write>(compressed: &CompressedHuffman, writer: &mut W) -> CodecResult<()> {
        compressed.write_to(writer)
    }

    fn decode<R: Read>(reader: &mut R) -> CodecResult<CompressedHuffman> {
        CompressedHuffman::read_from(reader)
    }
}
