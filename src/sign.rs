//! Signing packages and rewriting their signature headers.
//!
//! Signing is a read: the stream is consumed once, hashing the general
//! header into two digests (header-only and header-plus-payload) while the
//! payload's own integrity digest is cross-checked, and the [`Signer`]
//! capability turns the finished digests into PGP signature packets. The
//! result is an updated signature header; nothing about the general
//! header or payload ever changes.
//!
//! Writing the new header back prefers an in-place overwrite that keeps
//! every byte offset in the file stable (repository indexes point into
//! RPMs by offset), absorbing any size difference into a reserved-space
//! padding entry. When the padding cannot make the sizes meet, the whole
//! file is rewritten next to the target and renamed over it.

use std::fs;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::SystemTime;

use crate::digest::{DigestAlgo, HasherSet};
use crate::error::{Error, Result};
use crate::header::{pad_sig_to_original, Header, RpmHeader, LEAD_SIZE};
use crate::signature::Signer;
use crate::tags;
use crate::verify::{payload_digest_check, PayloadCheck};

/// Options controlling signature creation.
#[derive(Debug, Clone, Copy)]
pub struct SignatureOptions {
    /// Digest algorithm for both signatures.
    pub hash: DigestAlgo,
    /// Creation time embedded in the signature packets.
    pub creation_time: SystemTime,
}

impl Default for SignatureOptions {
    /// SHA-256, created now.
    fn default() -> Self {
        Self {
            hash: DigestAlgo::Sha256,
            creation_time: SystemTime::now(),
        }
    }
}

/// Reads an RPM from `stream` and produces fresh signatures for it.
///
/// The returned header carries the new `SIG_PGP` (header plus payload)
/// and `SIG_RSA` (header only) entries; old `SIG_GPG`, `SIG_DSA` and
/// reserved-space entries are dropped. The payload's stored digest is
/// cross-checked while hashing, so a corrupted package is never signed.
pub fn sign_stream<R: Read + ?Sized>(
    stream: &mut R,
    signer: &dyn Signer,
    opts: &SignatureOptions,
) -> Result<RpmHeader> {
    let mut header = RpmHeader::read(stream)?;

    let mut header_hasher = opts.hash.hasher();
    header_hasher.update(header.general_header().orig());
    let mut combined_hasher = opts.hash.hasher();
    combined_hasher.update(header.general_header().orig());

    // An unsigned ancient package may carry no payload digest at all; in
    // that case there is nothing to cross-check.
    let check = match payload_digest_check(&header) {
        Ok(check) => Some(check),
        Err(Error::NoPayloadDigest) => None,
        Err(e) => return Err(e),
    };

    let mut sinks = HasherSet::new();
    sinks.push(combined_hasher);
    if let Some(check) = &check {
        let digester = match check {
            PayloadCheck::PayloadOnly { algo, .. } => algo.hasher(),
            PayloadCheck::LegacyMd5 { .. } => {
                let mut hasher = DigestAlgo::Md5.hasher();
                hasher.update(header.general_header().orig());
                hasher
            }
        };
        sinks.push(digester);
    }

    io::copy(stream, &mut sinks)?;
    let mut hashers = sinks.into_inner();
    let combined_hasher = hashers.remove(0);

    if let Some(check) = check {
        let digester = hashers.remove(0);
        match check {
            PayloadCheck::PayloadOnly { algo, expected_hex } => {
                if digester.finalize_hex() != expected_hex {
                    return Err(Error::PayloadDigestMismatch { algo: algo.name() });
                }
            }
            PayloadCheck::LegacyMd5 { expected } => {
                if digester.finalize() != expected {
                    return Err(Error::PayloadDigestMismatch { algo: "md5" });
                }
            }
        }
    }

    let sig_pgp = signer.sign(combined_hasher, opts.creation_time)?;
    let sig_rsa = signer.sign(header_hasher, opts.creation_time)?;
    insert_signatures(header.signature_header_mut(), sig_pgp, sig_rsa);
    Ok(header)
}

/// Signs `infile` and writes the result to `out_path`.
///
/// See [`rewrite_rpm`] for how the output path is interpreted.
pub fn sign_file(
    infile: &mut fs::File,
    out_path: impl AsRef<Path>,
    signer: &dyn Signer,
    opts: &SignatureOptions,
) -> Result<RpmHeader> {
    let mut header = sign_stream(infile, signer, opts)?;
    rewrite_rpm(infile, out_path, &mut header)?;
    Ok(header)
}

/// Installs externally produced signatures into a package on disk.
///
/// For detached signing flows: the signatures were computed elsewhere
/// (see [`RpmHeader::dump_signature_header`] for the byte ranges they
/// cover) and only the signature header needs updating here.
pub fn rewrite_with_signatures(
    infile: &mut fs::File,
    out_path: impl AsRef<Path>,
    sig_pgp: Vec<u8>,
    sig_rsa: Vec<u8>,
) -> Result<RpmHeader> {
    infile.seek(SeekFrom::Start(0))?;
    let mut header = RpmHeader::read(infile)?;
    insert_signatures(header.signature_header_mut(), sig_pgp, sig_rsa);
    rewrite_rpm(infile, out_path, &mut header)?;
    Ok(header)
}

fn insert_signatures(signature: &mut Header, sig_pgp: Vec<u8>, sig_rsa: Vec<u8>) {
    signature.insert_bin(tags::SIG_PGP - tags::SIG_TAG_BASE, sig_pgp);
    signature.insert_bin(tags::SIG_RSA, sig_rsa);
    signature.remove(tags::SIG_GPG - tags::SIG_TAG_BASE);
    signature.remove(tags::SIG_DSA);
    signature.remove(tags::SIG_RESERVEDSPACE - tags::SIG_TAG_BASE);
}

/// Writes a package with an updated signature header to `out_path`.
///
/// Three forms of output are supported:
/// - `-` streams the package to standard output;
/// - when `out_path` is the input file itself (same device and inode,
///   link count 1), the signature header is rewritten in place, padded
///   with reserved space so the file's byte layout is preserved; if the
///   new header cannot fit, the file is rewritten via a temporary
///   neighbor and renamed over the target;
/// - any other path gets the full package written to it (directly for
///   pipes and devices, write-rename for regular files).
pub fn rewrite_rpm(
    infile: &mut fs::File,
    out_path: impl AsRef<Path>,
    header: &mut RpmHeader,
) -> Result<()> {
    let out_path = out_path.as_ref();
    // Reserved space never survives a rewrite; in-place re-adds what fits.
    header
        .signature_header_mut()
        .remove(tags::SIG_RESERVEDSPACE - tags::SIG_TAG_BASE);

    if out_path.as_os_str() == "-" {
        let stdout = io::stdout();
        return write_rpm(infile, &mut stdout.lock(), header);
    }

    match fs::symlink_metadata(out_path) {
        Ok(out_meta) => {
            let in_meta = infile.metadata()?;
            if can_overwrite(&in_meta, &out_meta) {
                if write_in_place(out_path, header)? {
                    return Ok(());
                }
                // Did not fit; fall through to write-rename.
            } else if !out_meta.is_file() {
                // A pipe or device: stream straight into it.
                let mut out = fs::OpenOptions::new().write(true).open(out_path)?;
                return write_rpm(infile, &mut out, header);
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io_context("inspecting output path", e)),
    }

    let dir = out_path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut temp = tempfile::NamedTempFile::new_in(dir.unwrap_or(Path::new(".")))?;
    write_rpm(infile, temp.as_file_mut(), header)?;
    set_output_permissions(temp.as_file());
    temp.persist(out_path)
        .map_err(|e| Error::io_context("renaming output", e.error))?;
    Ok(())
}

/// True when `out` is the very file we read from and nothing else links
/// to it, so overwriting in place cannot clobber an unrelated path.
fn can_overwrite(input: &fs::Metadata, out: &fs::Metadata) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        out.is_file()
            && input.dev() == out.dev()
            && input.ino() == out.ino()
            && out.nlink() == 1
    }
    #[cfg(not(unix))]
    {
        let _ = (input, out);
        false
    }
}

/// Attempts the in-place overwrite. `Ok(false)` means the encoded header
/// cannot occupy exactly the original footprint.
fn write_in_place(path: &Path, header: &RpmHeader) -> Result<bool> {
    let encoded = header.dump_signature_header(false);
    let target = header.signature_header().orig_size();
    let padded = match pad_sig_to_original(header.signature_header(), encoded, target) {
        Some(padded) => padded,
        None => return Ok(false),
    };

    let mut out = fs::OpenOptions::new().write(true).open(path)?;
    out.seek(SeekFrom::Start(LEAD_SIZE as u64))?;
    out.write_all(&padded)?;
    Ok(true)
}

/// Writes lead, new signature header, and the remainder of the input.
fn write_rpm<W: Write>(infile: &mut fs::File, out: &mut W, header: &RpmHeader) -> Result<()> {
    out.write_all(header.lead())?;
    out.write_all(&header.dump_signature_header(false))?;
    let body_start = (LEAD_SIZE + header.signature_header().orig_size()) as u64;
    infile.seek(SeekFrom::Start(body_start))?;
    io::copy(infile, out)?;
    Ok(())
}

fn set_output_permissions(file: &fs::File) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = file.set_permissions(fs::Permissions::from_mode(0o644)) {
            log::warn!("failed to set mode on output file: {}", e);
        }
    }
    #[cfg(not(unix))]
    let _ = file;
}
