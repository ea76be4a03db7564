//! Byte-stream compression with two interchangeable codecs: Huffman prefix codes and LZW
//! dictionary substitution. Each turns a byte buffer into a smaller self-describing form and
//! reconstructs the exact original bytes from it.
//!
//! ```
//! use lzhuff::{Algorithm, CompressOptions};
//!
//! let data = b"to be or not to be, that is the question. to be or not to be".repeat(4);
//! for alg in [Algorithm::Huffman, Algorithm::Lzw].iter() {
//!     let packed = alg.compress(&data, &CompressOptions::default()).unwrap();
//!     assert!(packed.len() < data.len());
//!     assert_eq!(alg.decompress(&packed).unwrap(), data);
//! }
//! ```

pub mod compress;
pub mod file;

pub use compress::{
    huffman::{CompressedHuffman, Huffman},
    lzw::{CompressedLzw, Lzw},
    Algorithm, CodecErr, CodecResult, CompressOptions, Compressor,
};
pub use file::{compress_file, decompress_file, FileReport};
