//! Payload decompression.
//!
//! The general header advertises how the payload archive was compressed;
//! this module maps that onto a forward-only [`Read`] decoder. Old
//! packages omit the tag, in which case the first bytes are sniffed for
//! the gzip magic and anything else is passed through uncompressed.
//!
//! Each algorithm lives behind a cargo feature of the same name (gzip is
//! always built in, as the sniffing default). Enabling a feature pulls in
//! the corresponding decoder crate; a payload that needs a disabled
//! algorithm fails with [`Error::UnsupportedCompression`].

use std::io::{BufRead, Read};

use crate::error::{Error, Result};
use crate::header::RpmHeader;
use crate::tags;

/// Payload compression methods known to the RPM format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CompressionMethod {
    /// gzip (the historical default).
    Gzip,
    /// bzip2.
    Bzip2,
    /// xz container.
    Xz,
    /// Legacy compressor name; decoded identically to [`Xz`](Self::Xz).
    Lzma,
    /// Zstandard.
    Zstd,
    /// No compression.
    Uncompressed,
}

impl CompressionMethod {
    /// Maps a `PAYLOADCOMPRESSOR` value onto a method.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(match name {
            "gzip" => Self::Gzip,
            "bzip2" => Self::Bzip2,
            "xz" => Self::Xz,
            "lzma" => Self::Lzma,
            "zstd" => Self::Zstd,
            "uncompressed" => Self::Uncompressed,
            other => return Err(Error::UnsupportedCompression(other.to_owned())),
        })
    }

    /// The `PAYLOADCOMPRESSOR` spelling of this method.
    pub fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
            Self::Lzma => "lzma",
            Self::Zstd => "zstd",
            Self::Uncompressed => "uncompressed",
        }
    }
}

/// Picks the payload method for a package.
///
/// `PAYLOADFORMAT` must name a cpio archive when present. A missing
/// `PAYLOADCOMPRESSOR` falls back to sniffing `stream` for the gzip
/// magic; no bytes are consumed.
pub fn payload_method<R: BufRead>(
    header: &RpmHeader,
    stream: &mut R,
) -> Result<CompressionMethod> {
    if header.has_tag(tags::PAYLOADFORMAT) {
        let format = header.get_string(tags::PAYLOADFORMAT)?;
        if format != "cpio" {
            return Err(Error::UnsupportedPayloadFormat(format));
        }
    }

    if header.has_tag(tags::PAYLOADCOMPRESSOR) {
        return CompressionMethod::from_name(&header.get_string(tags::PAYLOADCOMPRESSOR)?);
    }

    let head = stream.fill_buf()?;
    if head.len() >= 2 && head[0] == 0x1f && head[1] == 0x8b {
        Ok(CompressionMethod::Gzip)
    } else {
        Ok(CompressionMethod::Uncompressed)
    }
}

/// Wraps a raw payload stream with the decoder for `method`.
///
/// The result is forward-only; bytes past the logical end of the
/// compressed stream are left unread, which tolerates the trailing
/// padding some producers emit.
pub fn decompressor<'a, R: BufRead + 'a>(
    method: CompressionMethod,
    stream: R,
) -> Result<Box<dyn Read + 'a>> {
    match method {
        CompressionMethod::Gzip => Ok(Box::new(flate2::bufread::GzDecoder::new(stream))),
        CompressionMethod::Uncompressed => Ok(Box::new(stream)),

        #[cfg(feature = "bzip2")]
        CompressionMethod::Bzip2 => Ok(Box::new(bzip2::bufread::BzDecoder::new(stream))),

        #[cfg(feature = "xz")]
        CompressionMethod::Xz | CompressionMethod::Lzma => {
            Ok(Box::new(xz2::bufread::XzDecoder::new(stream)))
        }

        #[cfg(feature = "zstd")]
        CompressionMethod::Zstd => Ok(Box::new(zstd::stream::read::Decoder::with_buffer(stream)?)),

        #[allow(unreachable_patterns)]
        disabled => Err(Error::UnsupportedCompression(disabled.name().to_owned())),
    }
}

/// Selects and applies the right decoder for a package's payload.
pub fn payload_decompressor<'a, R: BufRead + 'a>(
    header: &RpmHeader,
    mut stream: R,
) -> Result<Box<dyn Read + 'a>> {
    let method = payload_method(header, &mut stream)?;
    decompressor(method, stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_method_names_round_trip() {
        for name in ["gzip", "bzip2", "xz", "lzma", "zstd", "uncompressed"] {
            assert_eq!(CompressionMethod::from_name(name).unwrap().name(), name);
        }
        assert!(matches!(
            CompressionMethod::from_name("lz4"),
            Err(Error::UnsupportedCompression(name)) if name == "lz4"
        ));
    }

    #[test]
    fn test_gzip_round_trip() {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"payload data").unwrap();
        let compressed = encoder.finish().unwrap();

        let mut decoder = decompressor(CompressionMethod::Gzip, &compressed[..]).unwrap();
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"payload data");
    }

    #[test]
    fn test_gzip_ignores_trailing_bytes() {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"payload data").unwrap();
        let mut compressed = encoder.finish().unwrap();
        compressed.extend_from_slice(&[0u8; 64]);

        let mut decoder = decompressor(CompressionMethod::Gzip, &compressed[..]).unwrap();
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"payload data");
    }

    #[cfg(feature = "zstd")]
    #[test]
    fn test_zstd_round_trip() {
        let compressed = zstd::stream::encode_all(&b"payload data"[..], 3).unwrap();
        let mut decoder = decompressor(CompressionMethod::Zstd, &compressed[..]).unwrap();
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"payload data");
    }

    #[cfg(feature = "bzip2")]
    #[test]
    fn test_bzip2_round_trip() {
        let mut encoder =
            bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        encoder.write_all(b"payload data").unwrap();
        let compressed = encoder.finish().unwrap();
        let mut decoder = decompressor(CompressionMethod::Bzip2, &compressed[..]).unwrap();
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"payload data");
    }

    #[cfg(feature = "xz")]
    #[test]
    fn test_xz_round_trip() {
        let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
        encoder.write_all(b"payload data").unwrap();
        let compressed = encoder.finish().unwrap();
        let mut decoder = decompressor(CompressionMethod::Xz, &compressed[..]).unwrap();
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"payload data");
    }

    #[cfg(feature = "xz")]
    #[test]
    fn test_lzma_name_decodes_like_xz() {
        let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
        encoder.write_all(b"payload data").unwrap();
        let compressed = encoder.finish().unwrap();
        // Packages tagged "lzma" go through the same decoder as "xz".
        let mut decoder = decompressor(CompressionMethod::Lzma, &compressed[..]).unwrap();
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"payload data");
    }
}
