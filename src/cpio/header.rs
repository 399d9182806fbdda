//! The 110-byte newc entry header.

use std::io;

use crate::error::{Error, Result};

/// Length of a newc header on disk.
pub(crate) const NEWC_HEADER_LEN: usize = 110;

/// Magic string opening every newc header.
pub(crate) const NEWC_MAGIC: &[u8; 6] = b"070701";

/// The numeric fields of one newc entry header.
///
/// All fields are stored as 8-character ASCII-hex numerals and widen to
/// u32. The file name follows the header and is not part of this struct;
/// see [`CpioEntry`](super::CpioEntry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpioHeader {
    /// Inode number; meaningful only within the archive.
    pub ino: u32,
    /// Full mode bits: file type plus permissions.
    pub mode: u32,
    /// Owning user id.
    pub uid: u32,
    /// Owning group id.
    pub gid: u32,
    /// Number of hard links to the inode.
    pub nlink: u32,
    /// Modification time, seconds since the epoch.
    pub mtime: u32,
    /// Body length in bytes.
    pub filesize: u32,
    /// Device major number.
    pub devmajor: u32,
    /// Device minor number.
    pub devminor: u32,
    /// Special-file device major number.
    pub rdevmajor: u32,
    /// Special-file device minor number.
    pub rdevminor: u32,
    /// File name length including the trailing NUL.
    pub namesize: u32,
    /// Header checksum field; always zero in newc.
    pub check: u32,
}

impl CpioHeader {
    /// Parses a header from its 110 on-disk bytes.
    pub(crate) fn parse(buf: &[u8; NEWC_HEADER_LEN]) -> Result<Self> {
        if &buf[..6] != NEWC_MAGIC {
            return Err(Error::CpioBadMagic);
        }
        let mut fields = [0u32; 13];
        for (i, field) in fields.iter_mut().enumerate() {
            *field = hex_field(&buf[6 + i * 8..6 + (i + 1) * 8])?;
        }
        Ok(Self {
            ino: fields[0],
            mode: fields[1],
            uid: fields[2],
            gid: fields[3],
            nlink: fields[4],
            mtime: fields[5],
            filesize: fields[6],
            devmajor: fields[7],
            devminor: fields[8],
            rdevmajor: fields[9],
            rdevminor: fields[10],
            namesize: fields[11],
            check: fields[12],
        })
    }
}

fn hex_field(chars: &[u8]) -> Result<u32> {
    let mut value: u32 = 0;
    for &c in chars {
        let digit = match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'f' => c - b'a' + 10,
            b'A'..=b'F' => c - b'A' + 10,
            _ => {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "invalid hex numeral in cpio header",
                )));
            }
        };
        value = (value << 4) | u32::from(digit);
    }
    Ok(value)
}

/// Serializes a header back to its on-disk form. Test-only: this crate
/// reads cpio archives but never produces them outside of fixtures.
#[cfg(test)]
pub(crate) fn encode(header: &CpioHeader) -> Vec<u8> {
    let mut out = Vec::with_capacity(NEWC_HEADER_LEN);
    out.extend_from_slice(NEWC_MAGIC);
    for field in [
        header.ino,
        header.mode,
        header.uid,
        header.gid,
        header.nlink,
        header.mtime,
        header.filesize,
        header.devmajor,
        header.devminor,
        header.rdevmajor,
        header.rdevminor,
        header.namesize,
        header.check,
    ] {
        out.extend_from_slice(format!("{:08X}", field).as_bytes());
    }
    out
}
