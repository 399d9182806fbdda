//! The digest and signature verification pipeline.
//!
//! Everything a package can prove about itself is checked in one forward
//! pass: the general header digest is checked while the header is read,
//! every PGP signature's hasher and the payload digester are registered up
//! front, the payload is streamed once through the fan-out, and only after
//! the digests match is the verifier's key-checking step invoked. A
//! corrupted payload is therefore always reported as corruption, never as
//! a signature result.

use std::io::{self, Read};

use crate::digest::{DigestAlgo, Hasher, HasherSet};
use crate::error::{Error, Result};
use crate::header::{ReadLimits, RpmHeader};
use crate::signature::{ParsedSignature, SignatureInfo, SignatureValidator, Verifier};
use crate::tags;

/// Signature tags covering the general header only, in report order.
const HEADER_SIG_TAGS: [i32; 2] = [tags::SIG_RSA, tags::SIG_DSA];
/// Signature tags covering the general header plus payload, in report
/// order.
const PAYLOAD_SIG_TAGS: [i32; 2] = [tags::SIG_PGP, tags::SIG_GPG];

/// Verifies a package read from `stream`.
///
/// All integrity digests are enforced; every PGP signature present is
/// parsed by `verifier` and validated against its keys. The returned
/// signatures are ordered SIG_RSA, SIG_DSA, SIG_PGP, SIG_GPG, filtered to
/// those present.
pub fn verify_stream<R: Read + ?Sized>(
    stream: &mut R,
    verifier: &dyn Verifier,
) -> Result<(RpmHeader, Vec<SignatureInfo>)> {
    verify_stream_with_limits(stream, verifier, &ReadLimits::default())
}

/// Like [`verify_stream`] with explicit header limits.
pub fn verify_stream_with_limits<R: Read + ?Sized>(
    stream: &mut R,
    verifier: &dyn Verifier,
    limits: &ReadLimits,
) -> Result<(RpmHeader, Vec<SignatureInfo>)> {
    let header = RpmHeader::read_with_limits(stream, limits)?;

    let mut pending = Vec::new();
    setup_signatures(&header, verifier, &mut pending)?;

    // Hashers that must see the payload ride in the fan-out set; the
    // payload digester is pushed last.
    let mut sinks = HasherSet::new();
    let mut sink_slots = Vec::new();
    for sig in &mut pending {
        if !sig.info.header_only {
            sink_slots.push(sinks.len());
            sinks.push(sig.hasher.take().expect("payload hasher registered twice"));
        } else {
            sink_slots.push(usize::MAX);
        }
    }

    let check = payload_digest_check(&header)?;
    let digester = match &check {
        PayloadCheck::PayloadOnly { algo, .. } => algo.hasher(),
        PayloadCheck::LegacyMd5 { .. } => {
            let mut hasher = DigestAlgo::Md5.hasher();
            hasher.update(header.general_header().orig());
            hasher
        }
    };
    let digester_slot = sinks.len();
    sinks.push(digester);

    io::copy(stream, &mut sinks)?;
    let mut hashers: Vec<Option<Hasher>> = sinks.into_inner().into_iter().map(Some).collect();

    // Digest comparison comes first; a bad payload must never surface as
    // a signature verdict.
    let hasher = hashers[digester_slot].take().expect("digester slot");
    match &check {
        PayloadCheck::PayloadOnly { algo, expected_hex } => {
            if hasher.finalize_hex() != *expected_hex {
                return Err(Error::PayloadDigestMismatch { algo: algo.name() });
            }
        }
        PayloadCheck::LegacyMd5 { expected } => {
            if hasher.finalize() != *expected {
                return Err(Error::PayloadDigestMismatch { algo: "md5" });
            }
        }
    }

    let mut results = Vec::with_capacity(pending.len());
    for (i, sig) in pending.into_iter().enumerate() {
        let PendingSignature {
            mut info,
            validator,
            hasher,
        } = sig;
        let hasher = match hasher {
            Some(hasher) => hasher,
            None => hashers[sink_slots[i]].take().expect("signature slot"),
        };
        validator.validate(hasher, &mut info)?;
        results.push(info);
    }

    Ok((header, results))
}

struct PendingSignature {
    info: SignatureInfo,
    validator: Box<dyn SignatureValidator>,
    /// Present for header-only signatures; payload signatures hand their
    /// hasher to the fan-out set and take it back after the copy.
    hasher: Option<Hasher>,
}

fn setup_signatures(
    header: &RpmHeader,
    verifier: &dyn Verifier,
    pending: &mut Vec<PendingSignature>,
) -> Result<()> {
    for (tag_set, header_only) in [(HEADER_SIG_TAGS, true), (PAYLOAD_SIG_TAGS, false)] {
        for tag in tag_set {
            if !header.has_tag(tag) {
                continue;
            }
            let blob = header.get_bytes(tag)?;
            let ParsedSignature {
                mut info,
                validator,
            } = match verifier.parse_signature(&blob)? {
                Some(parsed) => parsed,
                None => continue,
            };
            info.header_only = header_only;
            let mut hasher = info.hash.hasher();
            hasher.update(header.general_header().orig());
            pending.push(PendingSignature {
                info,
                validator,
                hasher: Some(hasher),
            });
        }
    }
    Ok(())
}

/// Which digest protects the payload of this package.
pub(crate) enum PayloadCheck {
    /// Modern: `PAYLOADDIGEST` covers the stored payload bytes only.
    PayloadOnly {
        algo: DigestAlgo,
        expected_hex: String,
    },
    /// Legacy: `SIG_MD5` covers the general header plus payload. For old
    /// packages without a payload digest this is the only integrity check
    /// available short of the PGP signatures themselves.
    LegacyMd5 { expected: Vec<u8> },
}

pub(crate) fn payload_digest_check(header: &RpmHeader) -> Result<PayloadCheck> {
    if header.has_tag(tags::PAYLOADDIGEST) && header.has_tag(tags::PAYLOADDIGESTALGO) {
        let code = header.get_int(tags::PAYLOADDIGESTALGO)?;
        let algo = DigestAlgo::from_rpm_code(code as i32).ok_or(Error::NoPayloadDigest)?;
        let digests = header.get_strings(tags::PAYLOADDIGEST)?;
        let expected_hex = digests.first().ok_or(Error::NoPayloadDigest)?.clone();
        return Ok(PayloadCheck::PayloadOnly { algo, expected_hex });
    }
    if header.has_tag(tags::SIG_MD5) {
        return Ok(PayloadCheck::LegacyMd5 {
            expected: header.get_bytes(tags::SIG_MD5)?,
        });
    }
    Err(Error::NoPayloadDigest)
}
