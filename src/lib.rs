//! # rpmseal
//!
//! A pure-Rust library for reading, verifying, and signing RPM packages.
//!
//! An RPM file is a fixed 96-byte lead, two tagged metadata headers (the
//! signature header and the general header), and a compressed cpio
//! archive of the package's files. This crate parses that container,
//! exposes the metadata through typed accessors, streams the payload,
//! checks every integrity digest and PGP signature in a single forward
//! pass, and can re-sign a package, rewriting the signature header in
//! place without disturbing the rest of the file.
//!
//! ## Reading a Package
//!
//! ```rust,no_run
//! use rpmseal::{Rpm, Result};
//!
//! fn main() -> Result<()> {
//!     let file = std::fs::File::open("simple-1.0.1-1.i386.rpm")?;
//!     let mut rpm = Rpm::read(std::io::BufReader::new(file))?;
//!
//!     let nevra = rpm.header().nevra()?;
//!     println!("{}", nevra);
//!
//!     for file in rpm.header().files()? {
//!         println!("{} ({} bytes)", file.name, file.size);
//!     }
//!
//!     // Extract everything under ./output, with traversal defense.
//!     rpm.expand_payload("./output")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Verifying Signatures and Digests
//!
//! ```rust,no_run
//! # #[cfg(feature = "pgp")]
//! use rpmseal::{signature::pgp::PgpVerifier, verify_stream, Result};
//!
//! # #[cfg(feature = "pgp")]
//! fn main() -> Result<()> {
//!     let mut verifier = PgpVerifier::parse_only();
//!     verifier.add_armored_key(&std::fs::read_to_string("distro-key.asc")?)?;
//!
//!     let mut file = std::fs::File::open("simple-1.0.1-1.i386.rpm")?;
//!     let (header, signatures) = verify_stream(&mut file, &verifier)?;
//!     for sig in &signatures {
//!         println!(
//!             "{} signature by {:016x}",
//!             if sig.header_only { "header" } else { "package" },
//!             sig.key_id.unwrap_or(0),
//!         );
//!     }
//!     println!("verified {}", header.nevra()?);
//!     Ok(())
//! }
//! # #[cfg(not(feature = "pgp"))]
//! # fn main() {}
//! ```
//!
//! ## Signing
//!
//! ```rust,no_run
//! # #[cfg(feature = "pgp")]
//! use rpmseal::{signature::pgp::PgpSigner, sign_file, SignatureOptions, Result};
//!
//! # #[cfg(feature = "pgp")]
//! fn main() -> Result<()> {
//!     let signer = PgpSigner::from_armored(&std::fs::read_to_string("signing-key.asc")?)?;
//!     let mut file = std::fs::File::open("simple-1.0.1-1.i386.rpm")?;
//!     // Signing the file onto its own path rewrites the signature
//!     // header in place, keeping all byte offsets stable.
//!     sign_file(
//!         &mut file,
//!         "simple-1.0.1-1.i386.rpm",
//!         &signer,
//!         &SignatureOptions::default(),
//!     )?;
//!     Ok(())
//! }
//! # #[cfg(not(feature = "pgp"))]
//! # fn main() {}
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `bzip2` | Yes | bzip2 payload decompression |
//! | `xz` | Yes | xz and lzma payload decompression |
//! | `zstd` | Yes | Zstandard payload decompression |
//! | `pgp` | Yes | The rPGP-backed signature verifier and signer |
//!
//! gzip and uncompressed payloads are always supported. With `pgp`
//! disabled, verification still enforces the package digests through
//! [`DigestOnlyVerifier`], and any [`Verifier`]/[`Signer`]
//! implementation can be injected instead.
//!
//! ## Safety Properties
//!
//! - Headers are length-checked entry by entry; a tag can never read
//!   outside its header's data area ([`ReadLimits`] bounds the whole
//!   header).
//! - Verification is one forward pass: digests are checked before any
//!   signature verdict, so a corrupt payload is never reported as a
//!   signature problem.
//! - Extraction rebuilds every target path from its normal components;
//!   `..` and absolute names cannot escape the destination.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod cpio;
pub mod digest;
pub mod error;
pub mod signature;
pub mod tags;

mod codec;
mod fileinfo;
mod header;
mod nevra;
mod payload;
mod rpm;
mod sign;
mod vercmp;
mod verify;

pub use codec::{decompressor, payload_decompressor, payload_method, CompressionMethod};
pub use digest::{DigestAlgo, Hasher};
pub use error::{Error, Result};
pub use fileinfo::{FileInfo, FileType};
pub use header::{Header, HeaderBuilder, ReadLimits, RpmHeader, TagEntry, TagValue, LEAD_SIZE};
pub use nevra::{sort_by_version, Nevra};
pub use payload::PayloadReader;
pub use rpm::{read_header, Rpm};
pub use sign::{rewrite_rpm, rewrite_with_signatures, sign_file, sign_stream, SignatureOptions};
pub use signature::{
    DigestOnlyVerifier, ParsedSignature, SignatureInfo, SignatureValidator, Signer, Verifier,
};
pub use vercmp::vercmp;
pub use verify::{verify_stream, verify_stream_with_limits};
