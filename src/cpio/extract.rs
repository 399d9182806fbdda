//! Extraction of cpio streams to disk.
//!
//! Entry names come from untrusted archives, so every target path is
//! rebuilt from its normal components under the destination root: `..`,
//! absolute prefixes and empty components are dropped. Hard links are
//! deferred until the group member carrying the content has been written,
//! then created against it. Character and block devices are skipped;
//! creating device nodes is the package manager's business, not this
//! crate's.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use super::reader::CpioReader;
use crate::error::{Error, Result};
use crate::fileinfo::FileType;

/// Extracts a raw cpio stream under `dest`.
///
/// `dest` must already exist. Extracting into a non-empty directory
/// overwrites files that are present from an earlier extraction.
pub fn extract<R: Read>(stream: R, dest: &Path) -> Result<()> {
    let mut reader = CpioReader::new(stream);
    // Hard-link members wait here until their content arrives.
    let mut pending_links: HashMap<u32, Vec<PathBuf>> = HashMap::new();

    while let Some(entry) = reader.next_entry()? {
        let target = sanitize_join(dest, &entry.name);
        ensure_parent_dir(&target)?;

        match FileType::from_mode(entry.header.mode) {
            FileType::Chr | FileType::Blk => {
                log::debug!("skipping device node {}", entry.name);
            }
            FileType::Dir => {
                log::debug!("unpacking dir {}", entry.name);
                make_dir(&target)?;
                set_unix_permissions(&target, entry.header.mode & 0o7777);
            }
            FileType::Fifo => {
                log::debug!("unpacking named pipe {}", entry.name);
                make_fifo(&target, entry.header.mode & 0o7777)?;
            }
            FileType::Lnk => {
                log::debug!("unpacking symlink {}", entry.name);
                let mut link_target = String::new();
                reader.read_to_string(&mut link_target)?;
                make_symlink(&target, &link_target)?;
            }
            FileType::Reg => {
                if entry.header.nlink > 1 && entry.size == 0 {
                    // All but the last member of a link group carry no
                    // content; record them until it shows up.
                    log::debug!("deferring hard link {}", entry.name);
                    pending_links
                        .entry(entry.header.ino)
                        .or_default()
                        .push(target);
                    continue;
                }
                log::debug!("unpacking file {}", entry.name);
                write_regular(&mut reader, &target, entry.size)?;
                set_unix_permissions(&target, entry.header.mode & 0o7777);

                if entry.header.nlink > 1 {
                    let links = pending_links
                        .remove(&entry.header.ino)
                        .ok_or(Error::HardLinksMissing(u64::from(entry.header.ino)))?;
                    for link in links {
                        make_hard_link(&target, &link)?;
                    }
                }
            }
            FileType::Sock | FileType::Unknown => {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "unknown file mode 0{:o} for {}",
                        entry.header.mode, entry.name
                    ),
                )));
            }
        }
    }

    if let Some(&inode) = pending_links.keys().next() {
        return Err(Error::HardLinksMissing(u64::from(inode)));
    }
    Ok(())
}

/// Joins an archive entry name under a destination root.
///
/// Only normal components survive: `..`, `.`, root and prefix components
/// are dropped, so the result always stays inside `dest`.
pub(crate) fn sanitize_join(dest: &Path, name: &str) -> PathBuf {
    let mut target = dest.to_path_buf();
    for component in Path::new(name).components() {
        if let Component::Normal(part) = component {
            target.push(part);
        }
    }
    target
}

/// Creates the parent directory of a target if it is missing.
pub(crate) fn ensure_parent_dir(target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Applies permission bits, logging instead of failing: extraction should
/// not abort because the filesystem refuses a mode.
pub(crate) fn set_unix_permissions(target: &Path, mode: u32) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = fs::set_permissions(target, fs::Permissions::from_mode(mode)) {
            log::warn!("failed to set permissions on '{}': {}", target.display(), e);
        }
    }
    #[cfg(not(unix))]
    let _ = (target, mode);
}

pub(crate) fn make_dir(target: &Path) -> Result<()> {
    match fs::create_dir(target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && target.is_dir() => Ok(()),
        Err(e) => Err(Error::io_context("creating directory", e)),
    }
}

pub(crate) fn write_regular<R: Read>(body: &mut R, target: &Path, size: u64) -> Result<()> {
    let mut file = fs::File::create(target)?;
    let written = io::copy(body, &mut file)?;
    if written != size {
        return Err(Error::CpioShortRead);
    }
    Ok(())
}

pub(crate) fn make_symlink(target: &Path, link_target: &str) -> Result<()> {
    // Re-extraction replaces an existing link.
    if target.symlink_metadata().is_ok() {
        fs::remove_file(target)?;
    }
    #[cfg(unix)]
    std::os::unix::fs::symlink(link_target, target)?;
    #[cfg(not(unix))]
    {
        log::warn!(
            "cannot create symlink '{}' -> '{}' on this platform",
            target.display(),
            link_target
        );
    }
    Ok(())
}

pub(crate) fn make_hard_link(content: &Path, link: &Path) -> Result<()> {
    if link.symlink_metadata().is_ok() {
        fs::remove_file(link)?;
    }
    fs::hard_link(content, link)?;
    Ok(())
}

#[cfg(unix)]
pub(crate) fn make_fifo(target: &Path, mode: u32) -> Result<()> {
    use nix::sys::stat::Mode;
    if target.symlink_metadata().is_ok() {
        fs::remove_file(target)?;
    }
    nix::unistd::mkfifo(target, Mode::from_bits_truncate(mode))
        .map_err(|e| Error::Io(io::Error::from(e)))?;
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn make_fifo(target: &Path, _mode: u32) -> Result<()> {
    log::warn!("skipping fifo '{}' on this platform", target.display());
    Ok(())
}
