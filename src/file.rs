//! Whole-file compression and decompression, the input is read into memory at once

use std::{fs, path::Path};

use crate::compress::{Algorithm, CodecErr, CodecResult, CompressOptions};

/// Sizes of the input and output of one file operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileReport {
    pub input_len: usize,
    pub output_len: usize,
}

impl FileReport {
    /// Output size as a fraction of the input size
    pub fn ratio(&self) -> f64 {
        self.output_len as f64 / self.input_len.max(1) as f64
    }
}

/// Compress the file at `input` and write the container bytes to `output`. Nothing is written
/// if compression fails
pub fn compress_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    algorithm: Algorithm,
    opts: &CompressOptions,
) -> CodecResult<FileReport> {
    let data = fs::read(input.as_ref())?;
    if data.is_empty() {
        return Err(CodecErr::EmptyInput);
    }
    let packed = algorithm.compress(&data, opts)?;
    fs::write(output.as_ref(), &packed)?;
    tracing::info!(
        input = %input.as_ref().display(),
        output = %output.as_ref().display(),
        %algorithm,
        from = data.len(),
        to = packed.len(),
        "compressed file"
    );
    Ok(FileReport {
        input_len: data.len(),
        output_len: packed.len(),
    })
}

/// Decompress the container file at `input` and write the original bytes to `output`
pub fn decompress_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    algorithm: Algorithm,
) -> CodecResult<FileReport> {
    let packed = fs::read(input.as_ref())?;
    let data = algorithm.decompress(&packed)?;
    fs::write(output.as_ref(), &data)?;
    tracing::info!(
        input = %input.as_ref().display(),
        output = %output.as_ref().display(),
        %algorithm,
        from = packed.len(),
        to = data.len(),
        "decompressed file"
    );
    Ok(FileReport {
        input_len: packed.len(),
        output_len: data.len(),
    })
}
