//! Extraction to disk, including path-traversal containment.

mod common;

use common::{build_cpio, build_rpm, simple_files, HalfReader, PkgFile};
use rpmseal::{cpio, Rpm};
use std::fs;

#[test]
fn expand_payload_twice_into_same_directory() {
    let rpm_bytes = build_rpm(&simple_files(), "gzip");
    let dir = tempfile::tempdir().unwrap();

    let mut rpm = Rpm::read(HalfReader::new(&rpm_bytes[..])).unwrap();
    rpm.expand_payload(dir.path()).unwrap();
    assert_eq!(fs::read(dir.path().join("config")).unwrap(), b"content");
    assert_eq!(
        fs::read(dir.path().join("usr/data")).unwrap(),
        b"hello world\n"
    );

    // Extraction over the populated tree succeeds as well.
    let mut rpm = Rpm::read(HalfReader::new(&rpm_bytes[..])).unwrap();
    rpm.expand_payload(dir.path()).unwrap();
}

#[test]
fn dotdot_entry_stays_under_destination() {
    let archive = build_cpio(&[PkgFile::reg("/../aaaaaaaaa", b"escape attempt")], false);
    let dir = tempfile::tempdir().unwrap();
    cpio::extract(&archive[..], dir.path()).unwrap();

    // The traversal component is dropped: the file lands inside the
    // destination and nothing appears outside it.
    assert!(dir.path().join("aaaaaaaaa").is_file());
    assert!(!dir.path().parent().unwrap().join("aaaaaaaaa").exists());
}

#[test]
fn expand_payload_with_traversal_name() {
    let files = vec![PkgFile::reg("/../aaaaaaaaa", b"escape attempt")];
    let rpm_bytes = build_rpm(&files, "gzip");
    let dir = tempfile::tempdir().unwrap();

    let mut rpm = Rpm::read(&rpm_bytes[..]).unwrap();
    rpm.expand_payload(dir.path()).unwrap();
    assert!(dir.path().join("aaaaaaaaa").is_file());
    assert!(!dir.path().parent().unwrap().join("aaaaaaaaa").exists());
}

#[cfg(unix)]
#[test]
fn hard_link_groups_share_an_inode_after_extraction() {
    use std::os::unix::fs::MetadataExt;

    let files = vec![
        PkgFile::hard_link("/a", b"", 77, 3),
        PkgFile::hard_link("/b", b"", 77, 3),
        PkgFile::hard_link("/c", b"shared body", 77, 3),
    ];
    let rpm_bytes = build_rpm(&files, "gzip");
    let dir = tempfile::tempdir().unwrap();

    let mut rpm = Rpm::read(&rpm_bytes[..]).unwrap();
    rpm.expand_payload(dir.path()).unwrap();

    let inode_a = fs::metadata(dir.path().join("a")).unwrap().ino();
    let inode_b = fs::metadata(dir.path().join("b")).unwrap().ino();
    let inode_c = fs::metadata(dir.path().join("c")).unwrap().ino();
    assert_eq!(inode_a, inode_c);
    assert_eq!(inode_b, inode_c);
    assert_eq!(fs::read(dir.path().join("a")).unwrap(), b"shared body");
}

#[test]
fn cpio_to_tar_round_trip() {
    let archive = build_cpio(&simple_files(), false);
    let mut tarball = Vec::new();
    cpio::cpio_to_tar(&archive[..], &mut tarball).unwrap();

    let mut names = Vec::new();
    let mut tar = tar::Archive::new(&tarball[..]);
    for entry in tar.entries().unwrap() {
        names.push(
            entry
                .unwrap()
                .path()
                .unwrap()
                .to_string_lossy()
                .into_owned(),
        );
    }
    assert_eq!(names, ["./config", "./usr", "./usr/data"]);
}
