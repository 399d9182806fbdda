//! Per-file metadata projected out of the general header.
//!
//! The general header stores file attributes as parallel arrays, one tag
//! per column. [`file_infos`] joins them by index into a list of
//! [`FileInfo`] values, resolving the legacy `OLDFILENAMES` form and the
//! 64-bit size fallback on the way.

use crate::error::{Error, Result};
use crate::header::RpmHeader;
use crate::tags;

/// Unix file type selected from the high bits of a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FileType {
    /// Regular file.
    Reg,
    /// Directory.
    Dir,
    /// Symbolic link.
    Lnk,
    /// Named pipe.
    Fifo,
    /// Character device.
    Chr,
    /// Block device.
    Blk,
    /// Unix socket.
    Sock,
    /// Anything else; never produced by rpmbuild.
    Unknown,
}

impl FileType {
    /// Selects the type from full mode bits.
    pub fn from_mode(mode: u32) -> Self {
        match mode & !0o7777 {
            0o100000 => Self::Reg,
            0o040000 => Self::Dir,
            0o120000 => Self::Lnk,
            0o010000 => Self::Fifo,
            0o020000 => Self::Chr,
            0o060000 => Self::Blk,
            0o140000 => Self::Sock,
            _ => Self::Unknown,
        }
    }
}

/// Metadata of one file carried by a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Absolute path of the file.
    pub name: String,
    /// Content size in bytes.
    pub size: u64,
    /// Owning user name.
    pub user_name: String,
    /// Owning group name.
    pub group_name: String,
    /// `RPMFILE_*` flag bitmask.
    pub flags: i64,
    /// Modification time, seconds since the epoch.
    pub mtime: i64,
    /// Hex content digest; empty for non-regular files.
    pub digest: String,
    /// Full mode bits: file type plus permissions.
    pub mode: u32,
    /// Symlink target; empty unless the file is a symlink.
    pub link_to: String,
    /// Device number of the owning filesystem entry.
    pub device: u32,
    /// Inode number within the payload's private namespace.
    pub inode: u32,
}

impl FileInfo {
    /// The file type encoded in the mode bits.
    pub fn file_type(&self) -> FileType {
        FileType::from_mode(self.mode)
    }

    /// Permission bits only.
    pub fn permissions(&self) -> u32 {
        self.mode & 0o7777
    }

    /// Hard-link identity: device and inode combined.
    ///
    /// Two files with the same nonzero `inode64` are members of one
    /// hard-link group.
    pub fn inode64(&self) -> u64 {
        (u64::from(self.device) << 32) | u64::from(self.inode)
    }
}

/// Joins the file attribute arrays of the general header.
///
/// Every array must have the same length as the file name list; a mismatch
/// is reported as truncation of the offending tag.
pub(crate) fn file_infos(header: &RpmHeader) -> Result<Vec<FileInfo>> {
    let names = header.get_strings(tags::OLDFILENAMES)?;
    let n = names.len();

    let sizes: Vec<u64> = if header.has_tag(tags::LONGFILESIZES) {
        column(header, tags::LONGFILESIZES, n, RpmHeader::get_uint64s)?
    } else {
        column(header, tags::FILESIZES, n, RpmHeader::get_uint64s)?
    };
    let users = column(header, tags::FILEUSERNAME, n, RpmHeader::get_strings)?;
    let groups = column(header, tags::FILEGROUPNAME, n, RpmHeader::get_strings)?;
    let flags = column(header, tags::FILEFLAGS, n, RpmHeader::get_ints)?;
    let mtimes = column(header, tags::FILEMTIMES, n, RpmHeader::get_ints)?;
    let digests = column(header, tags::FILEDIGESTS, n, RpmHeader::get_strings)?;
    let modes = column(header, tags::FILEMODES, n, RpmHeader::get_ints)?;
    let link_tos = column(header, tags::FILELINKTOS, n, RpmHeader::get_strings)?;
    let devices = column(header, tags::FILEDEVICES, n, RpmHeader::get_ints)?;
    let inodes = column(header, tags::FILEINODES, n, RpmHeader::get_ints)?;

    let mut files = Vec::with_capacity(n);
    for i in 0..n {
        files.push(FileInfo {
            name: names[i].clone(),
            size: sizes[i],
            user_name: users[i].clone(),
            group_name: groups[i].clone(),
            flags: flags[i],
            mtime: mtimes[i],
            digest: digests[i].clone(),
            mode: modes[i] as u32 & 0o177777,
            link_to: link_tos[i].clone(),
            device: devices[i] as u32,
            inode: inodes[i] as u32,
        });
    }
    Ok(files)
}

fn column<T>(
    header: &RpmHeader,
    tag: i32,
    expected_len: usize,
    get: impl Fn(&RpmHeader, i32) -> Result<Vec<T>>,
) -> Result<Vec<T>> {
    let values = get(header, tag)?;
    if values.len() != expected_len {
        return Err(Error::TagTruncated(tag));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_selection() {
        assert_eq!(FileType::from_mode(0o100644), FileType::Reg);
        assert_eq!(FileType::from_mode(0o040755), FileType::Dir);
        assert_eq!(FileType::from_mode(0o120777), FileType::Lnk);
        assert_eq!(FileType::from_mode(0o010644), FileType::Fifo);
        assert_eq!(FileType::from_mode(0o020660), FileType::Chr);
        assert_eq!(FileType::from_mode(0o060660), FileType::Blk);
        assert_eq!(FileType::from_mode(0o140755), FileType::Sock);
        assert_eq!(FileType::from_mode(0), FileType::Unknown);
    }

    #[test]
    fn test_inode64_combines_device() {
        let file = FileInfo {
            name: "/a".into(),
            size: 0,
            user_name: "root".into(),
            group_name: "root".into(),
            flags: 0,
            mtime: 0,
            digest: String::new(),
            mode: 0o100644,
            link_to: String::new(),
            device: 2,
            inode: 7,
        };
        assert_eq!(file.inode64(), (2u64 << 32) | 7);
        assert_eq!(file.permissions(), 0o644);
        assert_eq!(file.file_type(), FileType::Reg);
    }
}
