//! Error types for RPM package operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when reading, verifying, or signing RPM packages, along
//! with a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. You can
//! handle errors using pattern matching or the `?` operator:
//!
//! ```rust,no_run
//! use rpmseal::{Rpm, Result};
//!
//! fn package_name(path: &str) -> Result<String> {
//!     let file = std::fs::File::open(path)?;
//!     let rpm = Rpm::read(std::io::BufReader::new(file))?;
//!     Ok(rpm.header().nevra()?.name)
//! }
//! ```
//!
//! ## Matching Specific Failures
//!
//! ```rust
//! use rpmseal::Error;
//!
//! fn describe(err: &Error) {
//!     match err {
//!         Error::NotAnRpm => println!("The file is not an RPM package."),
//!         Error::HeaderDigestMismatch { .. } | Error::PayloadDigestMismatch { .. } => {
//!             println!("Integrity check failed. The file may be corrupted.");
//!         }
//!         Error::KeyNotFound { .. } => println!("No public key available for this signature."),
//!         Error::UnsupportedCompression(name) => {
//!             println!("Payload uses unsupported compression: {}", name);
//!         }
//!         other => println!("Error: {}", other),
//!     }
//! }
//! ```

use std::io;

/// The main error type for RPM operations.
///
/// This enum represents all possible errors that can occur when reading,
/// verifying, signing, or extracting RPM packages. Each variant includes
/// relevant context to help diagnose the issue.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io] | File system and stream operations |
/// | Container | [`NotAnRpm`][Self::NotAnRpm], [`BadHeaderMagic`][Self::BadHeaderMagic], [`HeaderTruncated`][Self::HeaderTruncated] | Invalid package data |
/// | Header | [`TagTruncated`][Self::TagTruncated], [`NoSuchTag`][Self::NoSuchTag], [`UnsupportedDataType`][Self::UnsupportedDataType] | Malformed or missing tag entries |
/// | Integrity | [`HeaderDigestMismatch`][Self::HeaderDigestMismatch], [`PayloadDigestMismatch`][Self::PayloadDigestMismatch] | Data corruption |
/// | Payload | [`CpioBadMagic`][Self::CpioBadMagic], [`InvalidPayloadFile`][Self::InvalidPayloadFile] | Archive/metadata disagreement |
/// | Signatures | [`NoPgpSignature`][Self::NoPgpSignature], [`KeyNotFound`][Self::KeyNotFound], [`SignatureInvalid`][Self::SignatureInvalid] | PGP verification |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading or writing package data.
    ///
    /// This wraps [`std::io::Error`] and is returned when stream or file
    /// operations fail: short reads, disk errors, broken pipes.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file does not start with the RPM lead magic.
    #[error("file is not an RPM")]
    NotAnRpm,

    /// A header blob does not start with the header intro magic.
    #[error("bad magic for header")]
    BadHeaderMagic,

    /// A header blob ended before its declared index table or data area.
    #[error("header truncated: {0}")]
    HeaderTruncated(&'static str),

    /// A header declares a size beyond the configured limit.
    ///
    /// Headers are read fully into memory, so their declared size is
    /// bounded to defend against adversarial inputs. The default limit is
    /// 64 MiB, see [`ReadLimits`](crate::ReadLimits).
    #[error("header too large: {size} bytes (limit {limit})")]
    HeaderTooLarge {
        /// Declared on-disk size of the header.
        size: u64,
        /// The configured limit that was exceeded.
        limit: u64,
    },

    /// A tag entry points outside the header data area, or a string entry
    /// is missing its NUL terminator.
    #[error("tag {0} is truncated")]
    TagTruncated(i32),

    /// A tag entry uses a data type code this crate does not recognize, or
    /// a typed accessor was called on an entry of an incompatible type.
    #[error("unsupported data type {data_type} for tag {tag}")]
    UnsupportedDataType {
        /// The on-disk data type code.
        data_type: i32,
        /// The tag carrying it.
        tag: i32,
    },

    /// The same tag appeared twice in one header index table.
    #[error("duplicate tag {0} in header")]
    DuplicateTag(i32),

    /// A required tag is not present in the header.
    #[error("no such tag {0}")]
    NoSuchTag(i32),

    /// A scalar accessor found a tag with other than one value.
    #[error("tag {tag} has {count} values, expected one")]
    UnexpectedCount {
        /// The tag queried.
        tag: i32,
        /// The number of values it actually holds.
        count: usize,
    },

    /// The digest stored in the signature header does not match the
    /// general header bytes.
    #[error("header {algo} digest mismatch")]
    HeaderDigestMismatch {
        /// Name of the digest algorithm that failed.
        algo: &'static str,
    },

    /// The payload is compressed with an algorithm this crate does not
    /// support (or support was compiled out).
    #[error("unsupported compression \"{0}\"")]
    UnsupportedCompression(String),

    /// The payload is not a cpio archive.
    #[error("unsupported payload format \"{0}\"")]
    UnsupportedPayloadFormat(String),

    /// A cpio entry does not start with the newc magic.
    #[error("bad cpio magic")]
    CpioBadMagic,

    /// The cpio stream ended in the middle of an entry.
    #[error("short read in cpio stream")]
    CpioShortRead,

    /// The payload contains a file that the header's file list does not
    /// mention.
    #[error("invalid file \"{0}\" in payload")]
    InvalidPayloadFile(String),

    /// A hard-link group's content entry never appeared in the payload.
    #[error("hard link group for inode {0} has no content entry")]
    HardLinksMissing(u64),

    /// The payload digest did not match the stored value.
    #[error("payload {algo} digest mismatch")]
    PayloadDigestMismatch {
        /// Name of the digest algorithm that failed.
        algo: &'static str,
    },

    /// The package carries no digest that covers the payload.
    #[error("no usable payload digest found")]
    NoPayloadDigest,

    /// A signature tag does not contain a supported PGP signature packet.
    #[error("no supported PGP signature packet found")]
    NoPgpSignature,

    /// Extra bytes follow the PGP signature packet in a signature tag.
    #[error("trailing garbage after PGP signature packet")]
    TrailingGarbage,

    /// The public key needed to validate a signature is not in the
    /// verifier's key set.
    #[error("{}", key_not_found_message(.key_id, .fingerprint))]
    KeyNotFound {
        /// The 64-bit key ID named by the signature, if any.
        key_id: Option<u64>,
        /// The issuer fingerprint named by the signature, if any.
        fingerprint: Option<Vec<u8>>,
    },

    /// The signature is cryptographically invalid.
    #[error("PGP signature verification failed: {0}")]
    SignatureInvalid(String),
}

/// Formats the KeyNotFound message, preferring the fingerprint.
fn key_not_found_message(key_id: &Option<u64>, fingerprint: &Option<Vec<u8>>) -> String {
    match (key_id, fingerprint) {
        (_, Some(fp)) if !fp.is_empty() => {
            let hex: String = fp.iter().map(|b| format!("{:02x}", b)).collect();
            format!("key with fingerprint {} not found", hex)
        }
        (Some(id), _) => format!("keyid {:016x} not found", id),
        _ => "signing key not found".to_owned(),
    }
}

impl Error {
    /// Returns true if this error indicates corrupted package data rather
    /// than an environmental failure.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::BadHeaderMagic
                | Self::HeaderTruncated(_)
                | Self::TagTruncated(_)
                | Self::DuplicateTag(_)
                | Self::HeaderDigestMismatch { .. }
                | Self::CpioBadMagic
                | Self::CpioShortRead
                | Self::PayloadDigestMismatch { .. }
        )
    }

    /// Wraps an I/O error with a short context message.
    pub(crate) fn io_context(context: &str, err: io::Error) -> Self {
        Self::Io(io::Error::new(err.kind(), format!("{}: {}", context, err)))
    }
}

/// A specialized result type for RPM operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_found_display() {
        let err = Error::KeyNotFound {
            key_id: Some(0x1122334455667788),
            fingerprint: None,
        };
        assert_eq!(err.to_string(), "keyid 1122334455667788 not found");

        let err = Error::KeyNotFound {
            key_id: Some(1),
            fingerprint: Some(vec![0xab, 0xcd]),
        };
        assert_eq!(err.to_string(), "key with fingerprint abcd not found");
    }

    #[test]
    fn test_corruption_classification() {
        assert!(Error::CpioBadMagic.is_corruption());
        assert!(Error::TagTruncated(1027).is_corruption());
        assert!(!Error::NoSuchTag(1000).is_corruption());
        assert!(!Error::NotAnRpm.is_corruption());
    }

    #[test]
    fn test_io_context() {
        let inner = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        let err = Error::io_context("reading lead", inner);
        assert!(err.to_string().contains("reading lead"));
    }
}
