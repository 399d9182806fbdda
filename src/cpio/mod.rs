//! The cpio "new ASCII" (newc) archive format.
//!
//! RPM payloads are cpio archives in the newc variant: each entry is a
//! 110-byte header of ASCII-hex fields, a NUL-terminated file name, and
//! the file body, everything padded to 4-byte boundaries. The archive ends
//! with an entry named [`TRAILER`].
//!
//! [`CpioReader`] walks a stream entry by entry without seeking, which is
//! what lets the verify pipeline work on non-seekable decompressed
//! payloads. [`extract`] writes a stream's contents to disk and
//! [`cpio_to_tar`] translates one into a tar archive.

mod extract;
mod header;
mod reader;
mod tar;

pub use extract::extract;
pub use header::CpioHeader;
pub use reader::{CpioEntry, CpioReader, TRAILER};
pub use tar::cpio_to_tar;

pub(crate) use extract::{
    ensure_parent_dir, make_dir, make_fifo, make_hard_link, make_symlink, sanitize_join,
    set_unix_permissions, write_regular,
};
