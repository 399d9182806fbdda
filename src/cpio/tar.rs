//! Conversion of cpio streams into tar archives.
//!
//! Useful for feeding RPM payloads to tooling that only speaks tar.
//! Hard-link members become tar link entries pointing at the group member
//! that carried the content; since cpio puts the content on the last
//! member, the link entries are emitted after the walk completes.

use std::collections::HashMap;
use std::io::{Read, Write};

use super::reader::CpioReader;
use crate::error::{Error, Result};
use crate::fileinfo::FileType;

/// Translates a cpio stream into a tar archive written to `out`.
pub fn cpio_to_tar<R: Read, W: Write>(stream: R, out: W) -> Result<()> {
    let mut reader = CpioReader::new(stream);
    let mut builder = tar::Builder::new(out);
    let mut pending_links: HashMap<u32, Vec<String>> = HashMap::new();
    let mut content_names: HashMap<u32, String> = HashMap::new();

    while let Some(entry) = reader.next_entry()? {
        let mut header = tar::Header::new_gnu();
        header.set_mode(entry.header.mode & 0o7777);
        header.set_uid(u64::from(entry.header.uid));
        header.set_gid(u64::from(entry.header.gid));
        header.set_mtime(u64::from(entry.header.mtime));
        header.set_size(0);

        match FileType::from_mode(entry.header.mode) {
            FileType::Dir => {
                header.set_entry_type(tar::EntryType::Directory);
                builder.append_data(&mut header, &entry.name, std::io::empty())?;
            }
            FileType::Fifo => {
                header.set_entry_type(tar::EntryType::Fifo);
                builder.append_data(&mut header, &entry.name, std::io::empty())?;
            }
            FileType::Chr | FileType::Blk => {
                header.set_entry_type(if entry.header.mode & !0o7777 == 0o020000 {
                    tar::EntryType::Char
                } else {
                    tar::EntryType::Block
                });
                header.set_device_major(entry.header.rdevmajor)?;
                header.set_device_minor(entry.header.rdevminor)?;
                builder.append_data(&mut header, &entry.name, std::io::empty())?;
            }
            FileType::Lnk => {
                let mut target = String::new();
                reader.read_to_string(&mut target)?;
                header.set_entry_type(tar::EntryType::Symlink);
                builder.append_link(&mut header, &entry.name, target.as_str())?;
            }
            FileType::Reg => {
                if entry.header.nlink > 1 && entry.size == 0 {
                    pending_links
                        .entry(entry.header.ino)
                        .or_default()
                        .push(entry.name);
                    continue;
                }
                header.set_entry_type(tar::EntryType::Regular);
                header.set_size(entry.size);
                let name = entry.name.clone();
                builder.append_data(&mut header, &name, &mut reader)?;
                content_names.insert(entry.header.ino, entry.name);
            }
            FileType::Sock | FileType::Unknown => {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!(
                        "unknown file mode 0{:o} for {}",
                        entry.header.mode, entry.name
                    ),
                )));
            }
        }
    }

    for (inode, links) in pending_links {
        let target = content_names
            .get(&inode)
            .ok_or(Error::HardLinksMissing(u64::from(inode)))?;
        for link in links {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Link);
            header.set_size(0);
            builder.append_link(&mut header, &link, target.as_str())?;
        }
    }

    builder.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpio::testutil::{build_archive, TestEntry};

    #[test]
    fn test_converts_files_and_dirs() {
        let archive = build_archive(&[
            TestEntry::dir("./etc", 0o755),
            TestEntry::file("./etc/config", 0o100644, b"content"),
            TestEntry::symlink("./etc/link", "config"),
        ]);
        let mut tarball = Vec::new();
        cpio_to_tar(&archive[..], &mut tarball).unwrap();

        let mut archive = tar::Archive::new(&tarball[..]);
        let mut seen = Vec::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let path = entry.path().unwrap().to_string_lossy().into_owned();
            let kind = entry.header().entry_type();
            if kind == tar::EntryType::Regular {
                let mut body = Vec::new();
                entry.read_to_end(&mut body).unwrap();
                assert_eq!(body, b"content");
            }
            if kind == tar::EntryType::Symlink {
                assert_eq!(
                    entry.link_name().unwrap().unwrap().to_string_lossy(),
                    "config"
                );
            }
            seen.push((path, kind));
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_hard_links_become_tar_links() {
        let archive = build_archive(&[
            TestEntry::file("first", 0o100644, b"").with_link(7, 2),
            TestEntry::file("second", 0o100644, b"shared").with_link(7, 2),
        ]);
        let mut tarball = Vec::new();
        cpio_to_tar(&archive[..], &mut tarball).unwrap();

        let mut archive = tar::Archive::new(&tarball[..]);
        let mut links = 0;
        for entry in archive.entries().unwrap() {
            let entry = entry.unwrap();
            if entry.header().entry_type() == tar::EntryType::Link {
                assert_eq!(
                    entry.link_name().unwrap().unwrap().to_string_lossy(),
                    "second"
                );
                links += 1;
            }
        }
        assert_eq!(links, 1);
    }
}
