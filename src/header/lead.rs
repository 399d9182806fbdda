//! The 96-byte RPM lead and the signature header that follows it.

use std::io::Read;

use super::{Header, ReadLimits, LEAD_SIZE};
use crate::error::{Error, Result};

/// Magic number opening the lead.
const LEAD_MAGIC: u32 = 0xedab_eedb;

/// The preserved lead of a package.
///
/// Only the magic and the source/binary flag are interpreted; the rest is
/// kept verbatim so rewrites can reproduce it byte for byte.
#[derive(Debug, Clone)]
pub(crate) struct Lead {
    pub bytes: Vec<u8>,
    pub is_source: bool,
}

/// Reads the lead and the signature header.
pub(crate) fn read_signature_header<R: Read + ?Sized>(
    r: &mut R,
    limits: &ReadLimits,
) -> Result<(Lead, Header)> {
    let mut bytes = vec![0u8; LEAD_SIZE];
    r.read_exact(&mut bytes)
        .map_err(|e| Error::io_context("reading lead", e))?;

    let magic = u32::from_be_bytes(bytes[0..4].try_into().unwrap());
    if magic != LEAD_MAGIC {
        return Err(Error::NotAnRpm);
    }
    let is_source = u16::from_be_bytes(bytes[6..8].try_into().unwrap()) == 1;

    let signature = Header::decode(r, None, true, limits)?;
    Ok((Lead { bytes, is_source }, signature))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_lead(is_source: bool) -> Vec<u8> {
        let mut lead = vec![0u8; LEAD_SIZE];
        lead[0..4].copy_from_slice(&LEAD_MAGIC.to_be_bytes());
        lead[4] = 3; // version major
        lead[6..8].copy_from_slice(&(is_source as u16).to_be_bytes());
        lead
    }

    #[test]
    fn test_rejects_non_rpm() {
        let data = vec![0u8; 200];
        let err = read_signature_header(&mut &data[..], &ReadLimits::default());
        assert!(matches!(err, Err(Error::NotAnRpm)));
    }

    #[test]
    fn test_short_lead_is_io_error() {
        let data = vec![0u8; 10];
        let err = read_signature_header(&mut &data[..], &ReadLimits::default());
        assert!(matches!(err, Err(Error::Io(_))));
    }

    #[test]
    fn test_source_flag() {
        let mut data = sample_lead(true);
        // Minimal empty signature header: magic + zero entries + zero size.
        data.extend_from_slice(&super::super::HEADER_MAGIC.to_be_bytes());
        data.extend_from_slice(&[0u8; 8]);
        let (lead, header) = read_signature_header(&mut &data[..], &ReadLimits::default()).unwrap();
        assert!(lead.is_source);
        assert_eq!(lead.bytes.len(), LEAD_SIZE);
        assert_eq!(header.orig_size(), 16);
    }
}
