//! PGP capability seams.
//!
//! The core of this crate parses containers and hashes streams; it does no
//! public-key cryptography itself. Signature parsing and the actual
//! RSA/EdDSA math live behind the [`Verifier`] and [`Signer`] traits, so
//! backends can be swapped without touching the parsing state machines.
//! The crate ships one backend, [`pgp`][self::pgp], built on the rPGP
//! crate and enabled by the `pgp` cargo feature.
//!
//! A [`Verifier`] turns a signature tag's bytes into metadata plus a
//! deferred validation step. The verify pipeline feeds the package bytes
//! into a hasher while streaming, then hands the finished hasher to the
//! validator; this is what keeps verification single-pass.

#[cfg(feature = "pgp")]
pub mod pgp;

use std::time::SystemTime;

use crate::digest::{DigestAlgo, Hasher};
use crate::error::Result;

/// Metadata of one PGP signature found in a package.
#[derive(Debug, Clone)]
pub struct SignatureInfo {
    /// Digest algorithm the signature is computed over.
    pub hash: DigestAlgo,
    /// When the signature was created.
    pub creation_time: SystemTime,
    /// The signing key's 64-bit id, when the packet names one.
    pub key_id: Option<u64>,
    /// The signing key's fingerprint, when the packet names one.
    pub key_fingerprint: Option<Vec<u8>>,
    /// Identity of the validated signer (hex fingerprint of the matched
    /// primary key). `None` until validation succeeds against a known key.
    pub signer: Option<String>,
    /// True for signatures covering only the general header; false for
    /// those covering the general header plus payload.
    pub header_only: bool,
}

/// The deferred validation step of a parsed signature.
pub trait SignatureValidator: Send {
    /// Checks the signature against the finished digest state.
    ///
    /// `hasher` has been fed exactly the bytes the signature covers. On
    /// success implementations may record the signer identity in `info`.
    fn validate(self: Box<Self>, hasher: Hasher, info: &mut SignatureInfo) -> Result<()>;
}

/// A signature parsed out of a signature-header tag.
pub struct ParsedSignature {
    /// The extracted metadata.
    pub info: SignatureInfo,
    /// The validation step to run once hashing completes.
    pub validator: Box<dyn SignatureValidator>,
}

impl std::fmt::Debug for ParsedSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedSignature")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Parses PGP signatures during verification.
pub trait Verifier {
    /// Parses one signature tag.
    ///
    /// Returning `Ok(None)` skips the tag entirely; the digest checks
    /// still run. Backends return
    /// [`Error::NoPgpSignature`](crate::Error::NoPgpSignature) for
    /// unsupported packets and
    /// [`Error::TrailingGarbage`](crate::Error::TrailingGarbage) when
    /// extra bytes follow the packet.
    fn parse_signature(&self, blob: &[u8]) -> Result<Option<ParsedSignature>>;
}

/// Produces PGP signatures while signing.
pub trait Signer {
    /// Signs the finished digest state, returning a serialized signature
    /// packet. The digest algorithm is the hasher's own.
    fn sign(&self, hasher: Hasher, creation_time: SystemTime) -> Result<Vec<u8>>;
}

/// A verifier that checks the package's plain digests but skips PGP
/// entirely: every signature tag parses to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestOnlyVerifier;

impl Verifier for DigestOnlyVerifier {
    fn parse_signature(&self, _blob: &[u8]) -> Result<Option<ParsedSignature>> {
        Ok(None)
    }
}
