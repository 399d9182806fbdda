//! Header reading over synthetic packages.

mod common;

use common::{build_rpm, simple_files, HalfReader};
use rpmseal::{tags, Error, ReadLimits, Rpm, RpmHeader};

#[test]
fn read_header_reports_nevra_and_files() {
    let rpm = build_rpm(&simple_files(), "gzip");
    let header = RpmHeader::read(&mut HalfReader::new(&rpm[..])).unwrap();

    let nevra = header.nevra().unwrap();
    assert_eq!(nevra.name, "simple");
    assert_eq!(nevra.epoch, "0");
    assert_eq!(nevra.version, "1.0.1");
    assert_eq!(nevra.release, "1");
    assert_eq!(nevra.arch, "i386");

    let files = header.files().unwrap();
    assert_eq!(files.len(), 3);
    assert_eq!(files[0].name, "/config");
    assert_eq!(files[0].size, 7);
    assert_eq!(files[0].user_name, "root");
    assert_eq!(files[2].name, "/usr/data");
}

#[test]
fn header_range_matches_layout() {
    let rpm = build_rpm(&simple_files(), "gzip");
    let header = RpmHeader::read(&mut &rpm[..]).unwrap();

    let range = header.header_range();
    // The signature header runs from the lead to the range start, 8-byte
    // aligned; the general header fills the rest of the range.
    assert!(range.start > 96);
    assert_eq!((range.start - 96) % 8, 0);
    assert!(range.end > range.start);

    // Both headers start with the header magic at their range boundary.
    assert_eq!(&rpm[96..99], &[0x8e, 0xad, 0xe8]);
    let gen_start = range.start as usize;
    assert_eq!(&rpm[gen_start..gen_start + 3], &[0x8e, 0xad, 0xe8]);
    // The payload (gzip here) begins right where the range ends.
    let payload_start = range.end as usize;
    assert_eq!(&rpm[payload_start..payload_start + 2], &[0x1f, 0x8b]);
}

#[test]
fn shifted_tags_route_to_signature_header() {
    let rpm = build_rpm(&simple_files(), "gzip");
    let header = RpmHeader::read(&mut &rpm[..]).unwrap();

    assert!(header.has_tag(tags::SIG_MD5));
    assert_eq!(header.get_bytes(tags::SIG_MD5).unwrap().len(), 16);
    assert!(header.has_tag(tags::SIG_SHA256));
    // The general header is still reachable through the same namespace.
    assert_eq!(header.get_string(tags::NAME).unwrap(), "simple");
    assert!(matches!(
        header.get_string(9999),
        Err(Error::NoSuchTag(9999))
    ));
}

#[test]
fn size_fallback_prefers_wide_tag() {
    let rpm = build_rpm(&simple_files(), "gzip");
    let header = RpmHeader::read(&mut &rpm[..]).unwrap();

    let total: u64 = simple_files().iter().map(|f| f.body.len() as u64).sum();
    assert_eq!(
        header.get_uint64_fallback(tags::SIZE, tags::LONGSIZE).unwrap(),
        total
    );
    // The narrow sig tag exists, the wide one does not: fallback path.
    assert!(header
        .get_uint64_fallback(tags::SIG_SIZE, tags::SIG_LONGSIGSIZE)
        .is_ok());
}

#[test]
fn header_limit_is_enforced() {
    let rpm = build_rpm(&simple_files(), "gzip");
    let limits = ReadLimits {
        max_header_bytes: 64,
    };
    let err = RpmHeader::read_with_limits(&mut &rpm[..], &limits);
    assert!(matches!(err, Err(Error::HeaderTooLarge { limit: 64, .. })));
}

#[test]
fn not_an_rpm_is_detected() {
    let garbage = vec![0x7f, b'E', b'L', b'F', 0, 0, 0, 0];
    assert!(matches!(
        Rpm::read(&garbage[..]),
        Err(Error::NotAnRpm) | Err(Error::Io(_))
    ));
}

#[test]
fn corrupted_general_header_fails_digest_check() {
    let mut rpm = build_rpm(&simple_files(), "gzip");
    let header = RpmHeader::read(&mut &rpm[..]).unwrap();
    // Flip one byte inside the general header's data area.
    let pos = header.header_range().end as usize - 1;
    rpm[pos] ^= 0xff;
    let err = RpmHeader::read(&mut &rpm[..]);
    assert!(matches!(
        err,
        Err(Error::HeaderDigestMismatch { algo: "sha256" })
    ));
}
