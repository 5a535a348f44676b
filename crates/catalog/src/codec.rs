//! Transparent decompression of asset files.

use bzip2::read::BzDecoder;
use exn::ResultExt;
use flate2::read::GzDecoder;
use std::io::Read;

use crate::error::{ErrorKind, Result};

/// Compression applied to an asset file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Uncompressed
    #[default]
    None,
    /// Bzip2 compression (.bz2)
    Bzip2,
    /// Gzip compression (.gz)
    Gzip,
}
impl Compression {
    /// Every format, in the order a data directory is searched.
    pub const ALL: [Compression; 3] = [Compression::None, Compression::Gzip, Compression::Bzip2];

    /// File name suffix appended after `.json`.
    pub fn suffix(&self) -> &'static str {
        match self {
            Compression::None => "",
            Compression::Bzip2 => ".bz2",
            Compression::Gzip => ".gz",
        }
    }

    /// Decompress a byte slice in memory. `name` is only used in errors.
    pub fn decompress(&self, name: &str, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let read = match self {
            Compression::None => {
                output.extend_from_slice(input);
                Ok(input.len())
            },
            Compression::Bzip2 => BzDecoder::new(input).read_to_end(&mut output),
            Compression::Gzip => GzDecoder::new(input).read_to_end(&mut output),
        };
        let size = read.or_raise(|| ErrorKind::Decompression(name.to_string()))?;
        tracing::trace!(format = ?self, input_size = input.len(), output_size = size, "Decompressed asset");
        Ok(output)
    }
}
