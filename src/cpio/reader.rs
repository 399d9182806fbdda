//! Streaming cpio entry reader.

use std::io::{self, Read};

use super::header::{CpioHeader, NEWC_HEADER_LEN};
use crate::error::{Error, Result};

/// Name of the terminating entry of every cpio archive.
pub const TRAILER: &str = "TRAILER!!!";

/// Scratch size for skipping padding on non-seekable inputs.
const SKIP_BUFFER_SIZE: usize = 8192;

/// One archive entry yielded by [`CpioReader::next_entry`].
#[derive(Debug, Clone)]
pub struct CpioEntry {
    /// The parsed newc header fields.
    pub header: CpioHeader,
    /// Entry file name. In stripped payloads this is the literal `.`.
    pub name: String,
    /// Authoritative body length: the header's filesize, or the caller's
    /// size list in stripped mode.
    pub size: u64,
    /// True when the entry comes from a stripped payload and is only
    /// identified by [`index`](Self::index).
    pub is_stripped: bool,
    /// Zero-based sequence number of the entry.
    pub index: usize,
}

/// Reads cpio entries and their bodies from a forward-only stream.
///
/// After [`next_entry`](Self::next_entry) returns an entry, the reader
/// itself serves that entry's body through [`Read`], bounded to the
/// entry's size. The body may be left unread; the next call skips it.
///
/// # Stripped payloads
///
/// rpm can strip cpio metadata that duplicates the package header, leaving
/// every entry named `.` with a zero size field. [`with_sizes`]
/// (Self::with_sizes) supplies the authoritative sizes; entries then
/// match up with the caller's list by position.
pub struct CpioReader<R> {
    inner: CountingReader<R>,
    /// Stream position where the next header starts.
    next_pos: u64,
    /// Unread bytes of the current entry body.
    remaining: u64,
    /// Size list for stripped entries, with a cursor.
    sizes: Option<Vec<u64>>,
    next_size: usize,
    next_index: usize,
    done: bool,
}

impl<R: Read> CpioReader<R> {
    /// Creates a reader over a plain cpio stream.
    pub fn new(stream: R) -> Self {
        Self {
            inner: CountingReader::new(stream),
            next_pos: 0,
            remaining: 0,
            sizes: None,
            next_size: 0,
            next_index: 0,
            done: false,
        }
    }

    /// Creates a reader that resolves stripped entries against `sizes`.
    pub fn with_sizes(stream: R, sizes: Vec<u64>) -> Self {
        let mut reader = Self::new(stream);
        reader.sizes = Some(sizes);
        reader
    }

    /// Advances to the next entry.
    ///
    /// Returns `Ok(None)` once the trailer entry is reached. Any unread
    /// remainder of the previous entry's body is discarded.
    pub fn next_entry(&mut self) -> Result<Option<CpioEntry>> {
        if self.done {
            return Ok(None);
        }

        if self.next_pos != self.inner.position {
            log::debug!(
                "cpio: skipping {} bytes to next entry",
                self.next_pos - self.inner.position
            );
            self.inner.skip(self.next_pos - self.inner.position)?;
        }
        self.remaining = 0;

        let mut raw = [0u8; NEWC_HEADER_LEN];
        self.inner
            .read_exact(&mut raw)
            .map_err(|_| Error::CpioShortRead)?;
        let header = CpioHeader::parse(&raw)?;

        if header.namesize == 0 {
            return Err(Error::CpioShortRead);
        }
        let mut name_buf = vec![0u8; header.namesize as usize];
        self.inner
            .read_exact(&mut name_buf)
            .map_err(|_| Error::CpioShortRead)?;
        name_buf.pop(); // trailing NUL
        let name = String::from_utf8_lossy(&name_buf).into_owned();

        // The body starts at the next 4-byte boundary after the header
        // and name.
        let header_span = (NEWC_HEADER_LEN + header.namesize as usize) as u64;
        let pad = pad4(header_span) - header_span;
        if pad > 0 {
            self.inner.skip(pad)?;
        }

        if name == TRAILER {
            self.done = true;
            return Ok(None);
        }

        let index = self.next_index;
        self.next_index += 1;

        let is_stripped = name == ".";
        let size = if is_stripped {
            let sizes = self.sizes.as_ref().ok_or_else(|| {
                Error::InvalidPayloadFile(".".to_owned())
            })?;
            let size = *sizes.get(self.next_size).ok_or(Error::CpioShortRead)?;
            self.next_size += 1;
            size
        } else {
            u64::from(header.filesize)
        };

        self.remaining = size;
        self.next_pos = pad4(self.inner.position + size);

        Ok(Some(CpioEntry {
            header,
            name,
            size,
            is_stripped,
            index,
        }))
    }
}

impl<R: Read> Read for CpioReader<R> {
    /// Reads from the current entry's body; EOF at the entry boundary.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Ok(0);
        }
        let want = buf.len().min(self.remaining as usize);
        let n = self.inner.read(&mut buf[..want])?;
        if n == 0 && want > 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "cpio entry body truncated",
            ));
        }
        self.remaining -= n as u64;
        Ok(n)
    }
}

fn pad4(n: u64) -> u64 {
    (n + 3) & !3
}

/// A reader that tracks its stream position and can discard ranges, which
/// stands in for seeking on pipes and decompressor outputs.
struct CountingReader<R> {
    stream: R,
    position: u64,
}

impl<R: Read> CountingReader<R> {
    fn new(stream: R) -> Self {
        Self {
            stream,
            position: 0,
        }
    }

    fn skip(&mut self, mut count: u64) -> Result<()> {
        let mut scratch = [0u8; SKIP_BUFFER_SIZE];
        while count > 0 {
            let want = count.min(SKIP_BUFFER_SIZE as u64) as usize;
            let n = self.read(&mut scratch[..want]).map_err(Error::Io)?;
            if n == 0 {
                return Err(Error::CpioShortRead);
            }
            count -= n as u64;
        }
        Ok(())
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.stream.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}
