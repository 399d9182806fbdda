//! The package facade: header plus payload stream.

use std::collections::HashMap;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::codec;
use crate::cpio::{
    ensure_parent_dir, make_dir, make_fifo, make_hard_link, make_symlink, sanitize_join,
    set_unix_permissions, write_regular,
};
use crate::error::{Error, Result};
use crate::fileinfo::FileType;
use crate::header::{ReadLimits, RpmHeader};
use crate::payload::PayloadReader;

/// Reads the lead and both headers from a stream, leaving the payload
/// unread.
///
/// Shorthand for [`RpmHeader::read`]; use [`Rpm::read`] instead when the
/// payload will be consumed afterwards.
pub fn read_header<R: Read + ?Sized>(stream: &mut R) -> Result<RpmHeader> {
    RpmHeader::read(stream)
}

/// An open package: parsed metadata plus the not-yet-consumed payload.
pub struct Rpm<R> {
    header: RpmHeader,
    stream: BufReader<R>,
}

impl<R: Read> Rpm<R> {
    /// Parses the package metadata, taking ownership of the stream.
    pub fn read(stream: R) -> Result<Self> {
        Self::read_with_limits(stream, &ReadLimits::default())
    }

    /// Like [`read`](Self::read) with explicit header limits.
    pub fn read_with_limits(stream: R, limits: &ReadLimits) -> Result<Self> {
        let mut stream = BufReader::new(stream);
        let header = RpmHeader::read_with_limits(&mut stream, limits)?;
        Ok(Self { header, stream })
    }

    /// The package metadata.
    pub fn header(&self) -> &RpmHeader {
        &self.header
    }

    /// Discards the payload and keeps the metadata.
    pub fn into_header(self) -> RpmHeader {
        self.header
    }

    /// Opens the payload for iteration.
    ///
    /// The payload is a forward-only stream, so this can be done once per
    /// package; iterate the result to completion before dropping it.
    pub fn payload_reader(&mut self) -> Result<PayloadReader<Box<dyn Read + '_>>> {
        let files = self.header.files()?;
        let decoder = codec::payload_decompressor(&self.header, &mut self.stream)?;
        Ok(PayloadReader::new(decoder, files))
    }

    /// Extracts the payload under `dest`.
    ///
    /// Targets are joined with path-traversal defense, character and
    /// block devices are skipped, and hard-link groups are materialized
    /// by linking the waiting members once the content member has been
    /// written. Extraction over an existing tree replaces files.
    pub fn expand_payload(&mut self, dest: impl AsRef<Path>) -> Result<()> {
        let dest = dest.as_ref();
        let mut reader = self.payload_reader()?;
        let mut pending_links: HashMap<u64, Vec<PathBuf>> = HashMap::new();

        while let Some(file) = reader.next()? {
            let target = sanitize_join(dest, &file.name);
            ensure_parent_dir(&target)?;

            match file.file_type() {
                FileType::Chr | FileType::Blk => {
                    log::debug!("skipping device node {}", file.name);
                }
                FileType::Dir => {
                    make_dir(&target)?;
                    set_unix_permissions(&target, file.permissions());
                }
                FileType::Fifo => {
                    make_fifo(&target, file.permissions())?;
                }
                FileType::Lnk => {
                    // The header's link target is authoritative; the
                    // archive body is skipped.
                    make_symlink(&target, &file.link_to)?;
                }
                FileType::Reg => {
                    if reader.is_link() {
                        pending_links
                            .entry(file.inode64())
                            .or_default()
                            .push(target);
                        continue;
                    }
                    write_regular(&mut reader, &target, file.size)?;
                    set_unix_permissions(&target, file.permissions());
                    if let Some(links) = pending_links.remove(&file.inode64()) {
                        for link in links {
                            make_hard_link(&target, &link)?;
                        }
                    }
                }
                FileType::Sock | FileType::Unknown => {
                    return Err(Error::Io(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("unknown file mode 0{:o} for {}", file.mode, file.name),
                    )));
                }
            }
        }

        if let Some(&inode) = pending_links.keys().next() {
            return Err(Error::HardLinksMissing(inode));
        }
        Ok(())
    }
}

impl<R> std::fmt::Debug for Rpm<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rpm")
            .field("header", &self.header.header_range())
            .finish_non_exhaustive()
    }
}
