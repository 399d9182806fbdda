//! Streaming digest computation.
//!
//! RPM packages carry digests in several algorithms chosen at build time,
//! so hashing is dispatched at runtime through [`DigestAlgo`] and the
//! [`Hasher`] wrapper. `Hasher` implements [`std::io::Write`] so it can sit
//! in a fan-out of sinks while a payload streams through once.
//!
//! # Example
//!
//! ```rust
//! use rpmseal::digest::DigestAlgo;
//!
//! let mut hasher = DigestAlgo::Sha256.hasher();
//! hasher.update(b"Hello, ");
//! hasher.update(b"World!");
//! assert_eq!(
//!     hasher.finalize_hex(),
//!     "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
//! );
//! ```

use std::io::{self, Write};

use digest::DynDigest;

use crate::tags;

/// A digest algorithm known to the RPM format.
///
/// The discriminants are not the on-disk codes; use
/// [`from_rpm_code`](Self::from_rpm_code) and [`rpm_code`](Self::rpm_code)
/// to translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DigestAlgo {
    /// MD5 (legacy, still used by the SIG_MD5 tag).
    Md5,
    /// SHA1 (legacy header digest).
    Sha1,
    /// SHA224.
    Sha224,
    /// SHA256 (the default for modern packages).
    Sha256,
    /// SHA384.
    Sha384,
    /// SHA512.
    Sha512,
}

impl DigestAlgo {
    /// Maps an RPM/PGP digest algorithm code to an algorithm.
    ///
    /// The codes are shared by `PAYLOADDIGESTALGO`, `FILEDIGESTALGO` and
    /// PGP signature packets.
    pub fn from_rpm_code(code: i32) -> Option<Self> {
        Some(match code {
            tags::HASH_MD5 => Self::Md5,
            tags::HASH_SHA1 => Self::Sha1,
            tags::HASH_SHA224 => Self::Sha224,
            tags::HASH_SHA256 => Self::Sha256,
            tags::HASH_SHA384 => Self::Sha384,
            tags::HASH_SHA512 => Self::Sha512,
            _ => return None,
        })
    }

    /// Returns the RPM/PGP algorithm code.
    pub fn rpm_code(self) -> i32 {
        match self {
            Self::Md5 => tags::HASH_MD5,
            Self::Sha1 => tags::HASH_SHA1,
            Self::Sha224 => tags::HASH_SHA224,
            Self::Sha256 => tags::HASH_SHA256,
            Self::Sha384 => tags::HASH_SHA384,
            Self::Sha512 => tags::HASH_SHA512,
        }
    }

    /// Canonical lowercase name, as used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Digest output length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Creates a streaming hasher for this algorithm.
    pub fn hasher(self) -> Hasher {
        let inner: Box<dyn DynDigest + Send> = match self {
            Self::Md5 => Box::new(md5::Md5::default()),
            Self::Sha1 => Box::new(sha1::Sha1::default()),
            Self::Sha224 => Box::new(sha2::Sha224::default()),
            Self::Sha256 => Box::new(sha2::Sha256::default()),
            Self::Sha384 => Box::new(sha2::Sha384::default()),
            Self::Sha512 => Box::new(sha2::Sha512::default()),
        };
        Hasher { algo: self, inner }
    }

    /// Computes the digest of a single slice in one call.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        let mut hasher = self.hasher();
        hasher.update(data);
        hasher.finalize()
    }

    /// Computes the hex digest of a single slice in one call.
    pub fn digest_hex(self, data: &[u8]) -> String {
        hex::encode(self.digest(data))
    }
}

/// A streaming hasher for a runtime-selected [`DigestAlgo`].
pub struct Hasher {
    algo: DigestAlgo,
    inner: Box<dyn DynDigest + Send>,
}

impl std::fmt::Debug for Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hasher").field("algo", &self.algo).finish()
    }
}

impl Hasher {
    /// The algorithm this hasher computes.
    pub fn algo(&self) -> DigestAlgo {
        self.algo
    }

    /// Feeds data into the hasher.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Consumes the hasher and returns the digest bytes.
    pub fn finalize(self) -> Vec<u8> {
        self.inner.finalize().into_vec()
    }

    /// Consumes the hasher and returns the hex-encoded digest.
    pub fn finalize_hex(self) -> String {
        hex::encode(self.finalize())
    }
}

impl Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A writer that forwards every byte to a set of hashers and counts the
/// total.
///
/// This is the fan-out sink of the verify pipeline: the payload is copied
/// through it once and every registered digest observes the same bytes in
/// stream order.
#[derive(Debug, Default)]
pub struct HasherSet {
    hashers: Vec<Hasher>,
    bytes_written: u64,
}

impl HasherSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a hasher to the fan-out.
    pub fn push(&mut self, hasher: Hasher) {
        self.hashers.push(hasher);
    }

    /// Number of registered hashers.
    pub fn len(&self) -> usize {
        self.hashers.len()
    }

    /// Returns true if no hashers are registered.
    pub fn is_empty(&self) -> bool {
        self.hashers.is_empty()
    }

    /// Total bytes written through the set.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Consumes the set and returns the hashers in insertion order.
    pub fn into_inner(self) -> Vec<Hasher> {
        self.hashers
    }
}

impl Write for HasherSet {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for hasher in &mut self.hashers {
            hasher.update(buf);
        }
        self.bytes_written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
