//! Payload iteration: cpio entries correlated with header metadata.
//!
//! The general header, not the cpio stream, is the authority on file
//! metadata. [`PayloadReader`] walks the archive and matches every entry
//! back to its [`FileInfo`] (by name for ordinary payloads, by position
//! for stripped ones), flagging the hard-link members whose content
//! lives on another entry.

use std::collections::HashMap;
use std::io::{self, Read};

use crate::cpio::CpioReader;
use crate::error::{Error, Result};
use crate::fileinfo::{FileInfo, FileType};

/// Iterates payload files and serves their contents.
///
/// After [`next`](Self::next) yields a file, the reader itself serves
/// that file's bytes through [`Read`], bounded to the entry. When
/// [`is_link`](Self::is_link) is true the entry carries no content and
/// reads return EOF immediately; the content lives on the last member of
/// the hard-link group.
pub struct PayloadReader<R> {
    reader: CpioReader<R>,
    files: Vec<FileInfo>,
    name_index: HashMap<String, usize>,
    is_link: Vec<bool>,
    current: Option<usize>,
}

impl<R: Read> PayloadReader<R> {
    /// Wraps a decompressed payload stream.
    ///
    /// `files` must be the file list of the same package, in header
    /// order; stripped payloads are resolved positionally against it.
    pub fn new(stream: R, files: Vec<FileInfo>) -> Self {
        let n = files.len();
        let mut sizes = vec![0u64; n];
        let mut is_link = vec![false; n];
        let mut name_index = HashMap::with_capacity(n);
        let mut last_inode = 0u64;

        for (i, file) in files.iter().enumerate() {
            name_index.insert(file.name.clone(), i);
            match file.file_type() {
                FileType::Reg => {
                    sizes[i] = file.size;
                    // All but the last member of a link group carry no
                    // payload; flag them so nobody waits on their bytes.
                    let inode = file.inode64();
                    if inode == last_inode && inode != 0 {
                        is_link[i - 1] = true;
                        sizes[i - 1] = 0;
                    }
                    last_inode = inode;
                }
                FileType::Lnk => {
                    sizes[i] = file.link_to.len() as u64;
                }
                _ => {}
            }
        }

        Self {
            reader: CpioReader::with_sizes(stream, sizes),
            files,
            name_index,
            is_link,
            current: None,
        }
    }

    /// Advances to the next payload file.
    ///
    /// Returns `Ok(None)` at the end of the archive.
    pub fn next(&mut self) -> Result<Option<FileInfo>> {
        let entry = match self.reader.next_entry()? {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let index = if entry.is_stripped {
            entry.index
        } else {
            // Payload names carry a leading "./" that the header's
            // absolute paths do not.
            let name = entry.name.strip_prefix('.').filter(|n| n.starts_with('/'));
            let name = name.unwrap_or(&entry.name);
            *self
                .name_index
                .get(name)
                .ok_or_else(|| Error::InvalidPayloadFile(name.to_owned()))?
        };
        if index >= self.files.len() {
            return Err(Error::InvalidPayloadFile(entry.name));
        }

        self.current = Some(index);
        Ok(Some(self.files[index].clone()))
    }

    /// True when the current entry is a hard-link member whose content
    /// lives on a later entry. Consumers should skip reading it.
    pub fn is_link(&self) -> bool {
        self.current.map(|i| self.is_link[i]).unwrap_or(false)
    }

    /// The metadata of the current entry.
    pub fn current(&self) -> Option<&FileInfo> {
        self.current.map(|i| &self.files[i])
    }
}

impl<R: Read> Read for PayloadReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}
