//! Shared helpers for integration tests: synthetic package fixtures.
//!
//! No binary fixtures live in the tree; every test package is assembled
//! here from the crate's own header encoder plus a hand-rolled newc
//! writer, then read back through the public API.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test
//! file compiles as a separate crate and may only use a subset of these
//! helpers.

#![allow(dead_code)]

use std::io::{Read, Write};

use rpmseal::digest::DigestAlgo;
use rpmseal::{tags, Header, HeaderBuilder};

/// One file of a synthetic package.
#[derive(Debug, Clone)]
pub struct PkgFile {
    pub name: &'static str,
    pub mode: u32,
    pub body: &'static [u8],
    pub link_to: &'static str,
    pub ino: u32,
    pub nlink: u32,
}

impl PkgFile {
    pub fn reg(name: &'static str, body: &'static [u8]) -> Self {
        Self {
            name,
            mode: 0o100644,
            body,
            link_to: "",
            ino: 0,
            nlink: 1,
        }
    }

    pub fn dir(name: &'static str) -> Self {
        Self {
            name,
            mode: 0o040755,
            body: b"",
            link_to: "",
            ino: 0,
            nlink: 1,
        }
    }

    pub fn symlink(name: &'static str, target: &'static str) -> Self {
        Self {
            name,
            mode: 0o120777,
            body: b"",
            link_to: target,
            ino: 0,
            nlink: 1,
        }
    }

    pub fn hard_link(name: &'static str, body: &'static [u8], ino: u32, nlink: u32) -> Self {
        Self {
            name,
            mode: 0o100644,
            body,
            link_to: "",
            ino,
            nlink,
        }
    }
}

/// The three-file package used by most read tests.
pub fn simple_files() -> Vec<PkgFile> {
    vec![
        PkgFile::reg("/config", b"content"),
        PkgFile::dir("/usr"),
        PkgFile::reg("/usr/data", b"hello world\n"),
    ]
}

/// Builds a complete package: lead, signature header, general header,
/// compressed payload.
pub fn build_rpm(files: &[PkgFile], compressor: &str) -> Vec<u8> {
    let payload = compress(&build_cpio(files, false), compressor);
    assemble_rpm(files, compressor, &payload)
}

/// Same package, but with a stripped payload (every entry named `.`).
pub fn build_stripped_rpm(files: &[PkgFile], compressor: &str) -> Vec<u8> {
    let payload = compress(&build_cpio(files, true), compressor);
    assemble_rpm(files, compressor, &payload)
}

fn assemble_rpm(files: &[PkgFile], compressor: &str, payload: &[u8]) -> Vec<u8> {
    let general = general_header(files, compressor, payload);

    let mut md5 = DigestAlgo::Md5.hasher();
    md5.update(general.orig());
    md5.update(payload);
    let signature = HeaderBuilder::new()
        .string(
            tags::SIG_SHA256,
            &DigestAlgo::Sha256.digest_hex(general.orig()),
        )
        .bin(tags::SIG_MD5 - tags::SIG_TAG_BASE, &md5.finalize())
        .int32s(
            tags::SIG_SIZE - tags::SIG_TAG_BASE,
            &[(general.orig().len() + payload.len()) as u32],
        )
        .bin(tags::SIG_RESERVEDSPACE - tags::SIG_TAG_BASE, &[0u8; 1024])
        .build(tags::RPMTAG_HEADERSIGNATURES, true)
        .unwrap();

    let mut rpm = lead();
    rpm.extend_from_slice(signature.orig());
    rpm.extend_from_slice(general.orig());
    rpm.extend_from_slice(payload);
    rpm
}

fn general_header(files: &[PkgFile], compressor: &str, payload: &[u8]) -> Header {
    let names: Vec<&str> = files.iter().map(|f| f.name).collect();
    let sizes: Vec<u32> = files.iter().map(body_size).collect();
    let users: Vec<&str> = files.iter().map(|_| "root").collect();
    let modes: Vec<u16> = files.iter().map(|f| f.mode as u16).collect();
    let links: Vec<&str> = files.iter().map(|f| f.link_to).collect();
    let digests: Vec<String> = files
        .iter()
        .map(|f| {
            if f.mode & !0o7777 == 0o100000 && !(f.nlink > 1 && f.body.is_empty()) {
                DigestAlgo::Sha256.digest_hex(f.body)
            } else {
                String::new()
            }
        })
        .collect();
    let digests: Vec<&str> = digests.iter().map(String::as_str).collect();
    let inodes: Vec<u32> = files
        .iter()
        .enumerate()
        .map(|(i, f)| if f.ino != 0 { f.ino } else { 1000 + i as u32 })
        .collect();

    HeaderBuilder::new()
        .string(tags::NAME, "simple")
        .string(tags::VERSION, "1.0.1")
        .string(tags::RELEASE, "1")
        .string(tags::ARCH, "i386")
        .string(tags::OS, "linux")
        .string(tags::SUMMARY, "a simple test package")
        .string_array(tags::OLDFILENAMES, &names)
        .int32s(tags::FILESIZES, &sizes)
        .string_array(tags::FILEUSERNAME, &users)
        .string_array(tags::FILEGROUPNAME, &users)
        .int32s(tags::FILEFLAGS, &vec![0; files.len()])
        .int32s(tags::FILEMTIMES, &vec![1_600_000_000; files.len()])
        .string_array(tags::FILEDIGESTS, &digests)
        .int16s(tags::FILEMODES, &modes)
        .string_array(tags::FILELINKTOS, &links)
        .int32s(tags::FILEDEVICES, &vec![1; files.len()])
        .int32s(tags::FILEINODES, &inodes)
        .int64s(tags::LONGSIZE, &[files.iter().map(|f| f.body.len() as u64).sum()])
        .string(tags::PAYLOADFORMAT, "cpio")
        .string(tags::PAYLOADCOMPRESSOR, compressor)
        .string_array(
            tags::PAYLOADDIGEST,
            &[DigestAlgo::Sha256.digest_hex(payload).as_str()],
        )
        .int32s(tags::PAYLOADDIGESTALGO, &[8])
        .build(tags::RPMTAG_HEADERIMMUTABLE, false)
        .unwrap()
}

fn body_size(f: &PkgFile) -> u32 {
    match f.mode & !0o7777 {
        0o100000 => f.body.len() as u32,
        0o120000 => f.link_to.len() as u32,
        _ => 0,
    }
}

/// A valid 96-byte lead for a binary package.
pub fn lead() -> Vec<u8> {
    let mut lead = vec![0u8; 96];
    lead[0..4].copy_from_slice(&0xedab_eedbu32.to_be_bytes());
    lead[4] = 3; // version 3.0
    // type 0 (binary), archnum 1 (i386)
    lead[9] = 1;
    let name = b"simple-1.0.1-1";
    lead[10..10 + name.len()].copy_from_slice(name);
    // osnum 1, signature type 5 (header-style)
    lead[83] = 1;
    lead[85] = 5;
    lead
}

/// Builds a newc archive of the files, optionally stripped.
pub fn build_cpio(files: &[PkgFile], stripped: bool) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, f) in files.iter().enumerate() {
        let is_reg = f.mode & !0o7777 == 0o100000;
        let is_link_member = is_reg && f.nlink > 1 && f.body.is_empty();
        let body: &[u8] = if f.mode & !0o7777 == 0o120000 {
            f.link_to.as_bytes()
        } else {
            f.body
        };
        let name = if stripped {
            ".".to_string()
        } else {
            format!(".{}", f.name)
        };
        let filesize = if stripped || is_link_member {
            0
        } else {
            body.len() as u32
        };
        let ino = if f.ino != 0 { f.ino } else { 1000 + i as u32 };
        write_newc_entry(&mut out, &name, f.mode, ino, f.nlink, filesize, body);
    }
    write_newc_entry(&mut out, "TRAILER!!!", 0, 0, 1, 0, b"");
    out
}

fn write_newc_entry(
    out: &mut Vec<u8>,
    name: &str,
    mode: u32,
    ino: u32,
    nlink: u32,
    filesize: u32,
    body: &[u8],
) {
    out.extend_from_slice(b"070701");
    for field in [
        ino,
        mode,
        0, // uid
        0, // gid
        nlink,
        1_600_000_000, // mtime
        filesize,
        8, // devmajor
        1, // devminor
        0, // rdevmajor
        0, // rdevminor
        name.len() as u32 + 1,
        0, // check
    ] {
        out.extend_from_slice(format!("{:08X}", field).as_bytes());
    }
    out.extend_from_slice(name.as_bytes());
    out.push(0);
    pad4(out);
    out.extend_from_slice(body);
    pad4(out);
}

fn pad4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

/// Compresses payload bytes with the named method.
pub fn compress(data: &[u8], compressor: &str) -> Vec<u8> {
    match compressor {
        "gzip" => {
            let mut encoder =
                flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }
        "uncompressed" => data.to_vec(),
        #[cfg(feature = "bzip2")]
        "bzip2" => {
            let mut encoder =
                bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }
        // "lzma" is a legacy compressor name; the decoder treats it as xz,
        // so the fixture carries the same stream format.
        #[cfg(feature = "xz")]
        "xz" | "lzma" => {
            let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }
        #[cfg(feature = "zstd")]
        "zstd" => zstd::stream::encode_all(data, 3).unwrap(),
        other => panic!("compressor {} not enabled in this build", other),
    }
}

/// A reader that returns at most half the requested bytes (minimum one),
/// for exercising single-pass streaming over short reads.
pub struct HalfReader<R> {
    inner: R,
}

impl<R> HalfReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> Read for HalfReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let half = (buf.len() / 2).max(1).min(buf.len());
        self.inner.read(&mut buf[..half])
    }
}
