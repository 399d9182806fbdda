//! The RPM header codec.
//!
//! Both metadata blocks of an RPM (the signature header and the general
//! header) share one binary encoding: a 16-byte intro, an index table of
//! 16-byte rows, and a data area the rows point into. [`Header`] is the
//! decoded form of one block; [`RpmHeader`] couples the two blocks with
//! the lead and routes the public tag namespace between them.
//!
//! Decoding is strict: every entry must lie inside the data area, tags
//! must be unique, and the declared size is bounded by [`ReadLimits`].

mod encode;
mod entry;
mod lead;

pub use entry::{TagEntry, TagValue};
pub(crate) use lead::read_signature_header;

use std::collections::BTreeMap;
use std::io::Read;
use std::ops::Range;

use crate::digest::DigestAlgo;
use crate::error::{Error, Result};
use crate::fileinfo::FileInfo;
use crate::nevra::Nevra;
use crate::tags::{self, TagType};

/// Size of the RPM lead in bytes.
pub const LEAD_SIZE: usize = 96;

/// Magic number opening every header blob.
pub(crate) const HEADER_MAGIC: u32 = 0x8ead_e801;

/// Limits applied while reading headers from untrusted input.
///
/// A header's declared size is honored by allocating a buffer for it, so
/// adversarial inputs could otherwise demand arbitrary memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadLimits {
    /// Maximum combined size of a header's index table and data area.
    pub max_header_bytes: u64,
}

impl Default for ReadLimits {
    /// 64 MiB, enough for any real-world package metadata.
    fn default() -> Self {
        Self {
            max_header_bytes: 64 * 1024 * 1024,
        }
    }
}

/// An expected digest over a header's on-disk bytes.
#[derive(Debug, Clone)]
pub(crate) struct ExpectedDigest {
    pub algo: DigestAlgo,
    pub hex: String,
}

/// One decoded header blob.
#[derive(Debug, Clone)]
pub struct Header {
    entries: BTreeMap<i32, TagEntry>,
    /// The exact on-disk bytes: intro, index table, data area, and for
    /// signature headers the trailing alignment pad. Signatures and the
    /// header digest are computed over this byte sequence.
    orig: Vec<u8>,
}

impl Header {
    /// Decodes a header blob from a stream.
    ///
    /// When `expected` is given, the digest over intro + table + data is
    /// recomputed and compared. Signature blocks (`is_sig_block`) consume
    /// the 0–7 pad bytes that align the following data to 8 bytes.
    pub(crate) fn decode<R: Read + ?Sized>(
        r: &mut R,
        expected: Option<&ExpectedDigest>,
        is_sig_block: bool,
        limits: &ReadLimits,
    ) -> Result<Self> {
        let mut intro = [0u8; 16];
        r.read_exact(&mut intro)
            .map_err(|e| Error::io_context("reading header intro", e))?;
        let magic = u32::from_be_bytes(intro[0..4].try_into().unwrap());
        if magic != HEADER_MAGIC {
            return Err(Error::BadHeaderMagic);
        }
        let num_entries = u32::from_be_bytes(intro[8..12].try_into().unwrap());
        let size = u32::from_be_bytes(intro[12..16].try_into().unwrap());

        let declared = num_entries as u64 * 16 + size as u64;
        if declared > limits.max_header_bytes {
            return Err(Error::HeaderTooLarge {
                size: declared,
                limit: limits.max_header_bytes,
            });
        }

        let mut table = vec![0u8; num_entries as usize * 16];
        r.read_exact(&mut table)
            .map_err(|_| Error::HeaderTruncated("index table"))?;

        // The signature block's data area is padded to the next 8-byte
        // boundary; the pad is on disk but not part of the declared size.
        let data_len = if is_sig_block {
            (size as usize + 7) / 8 * 8
        } else {
            size as usize
        };
        let mut data = vec![0u8; data_len];
        r.read_exact(&mut data)
            .map_err(|_| Error::HeaderTruncated("data area"))?;

        if let Some(expected) = expected {
            let mut hasher = expected.algo.hasher();
            hasher.update(&intro);
            hasher.update(&table);
            hasher.update(&data);
            if hasher.finalize_hex() != expected.hex {
                return Err(Error::HeaderDigestMismatch {
                    algo: expected.algo.name(),
                });
            }
        }

        let mut entries = BTreeMap::new();
        for row in table.chunks_exact(16) {
            let tag = i32::from_be_bytes(row[0..4].try_into().unwrap());
            let type_code = i32::from_be_bytes(row[4..8].try_into().unwrap());
            let offset = i32::from_be_bytes(row[8..12].try_into().unwrap());
            let count = i32::from_be_bytes(row[12..16].try_into().unwrap());

            let ty = TagType::from_code(type_code).ok_or(Error::UnsupportedDataType {
                data_type: type_code,
                tag,
            })?;
            if offset < 0 || count < 0 {
                return Err(Error::TagTruncated(tag));
            }
            let offset = offset as usize;
            let count = count as u32;
            if offset > data.len() {
                return Err(Error::TagTruncated(tag));
            }

            let end = match ty.fixed_size() {
                Some(width) => {
                    let end = offset as u64 + count as u64 * width as u64;
                    if end > data.len() as u64 {
                        return Err(Error::TagTruncated(tag));
                    }
                    end as usize
                }
                None => {
                    // String families run to the count-th NUL terminator.
                    let mut end = offset;
                    for _ in 0..count {
                        let next = data[end..]
                            .iter()
                            .position(|&c| c == 0)
                            .ok_or(Error::TagTruncated(tag))?;
                        end += next + 1;
                    }
                    end
                }
            };

            let entry = TagEntry {
                ty,
                count,
                data: data[offset..end].to_vec(),
            };
            if entries.insert(tag, entry).is_some() {
                return Err(Error::DuplicateTag(tag));
            }
        }

        let mut orig = Vec::with_capacity(16 + table.len() + data.len());
        orig.extend_from_slice(&intro);
        orig.extend_from_slice(&table);
        orig.extend_from_slice(&data);

        Ok(Self { entries, orig })
    }

    /// The header's on-disk footprint in bytes, alignment pad included.
    pub fn orig_size(&self) -> usize {
        self.orig.len()
    }

    /// The exact bytes this header occupied on disk.
    pub fn orig(&self) -> &[u8] {
        &self.orig
    }

    /// Membership test.
    pub fn has_tag(&self, tag: i32) -> bool {
        self.entries.contains_key(&tag)
    }

    fn entry(&self, tag: i32) -> Result<&TagEntry> {
        self.entries.get(&tag).ok_or(Error::NoSuchTag(tag))
    }

    /// Returns a tag's value in tagged form.
    pub fn value(&self, tag: i32) -> Result<TagValue> {
        self.entry(tag)?.value(tag)
    }

    /// Returns the strings of a string-family tag.
    ///
    /// `OLDFILENAMES` is synthesized from `DIRNAMES`, `DIRINDEXES` and
    /// `BASENAMES` when the legacy tag is absent.
    pub fn get_strings(&self, tag: i32) -> Result<Vec<String>> {
        match self.entries.get(&tag) {
            Some(entry) => entry.strings(tag),
            None if tag == tags::OLDFILENAMES => self.synthesize_old_filenames(),
            None => Err(Error::NoSuchTag(tag)),
        }
    }

    fn synthesize_old_filenames(&self) -> Result<Vec<String>> {
        let dirs = self.get_strings(tags::DIRNAMES)?;
        let dir_indexes = self.get_ints(tags::DIRINDEXES)?;
        let base_names = self.get_strings(tags::BASENAMES)?;
        if dir_indexes.len() != base_names.len() {
            return Err(Error::TagTruncated(tags::DIRINDEXES));
        }
        let mut paths = Vec::with_capacity(base_names.len());
        for (base, &idx) in base_names.iter().zip(&dir_indexes) {
            let dir = usize::try_from(idx)
                .ok()
                .and_then(|i| dirs.get(i))
                .ok_or(Error::TagTruncated(tags::DIRINDEXES))?;
            // DIRNAMES entries carry their trailing slash.
            paths.push(format!("{}{}", dir, base));
        }
        Ok(paths)
    }

    /// Returns a single string; the tag must carry exactly one value.
    pub fn get_string(&self, tag: i32) -> Result<String> {
        let mut vals = self.get_strings(tag)?;
        if vals.len() != 1 {
            return Err(Error::UnexpectedCount {
                tag,
                count: vals.len(),
            });
        }
        Ok(vals.remove(0))
    }

    /// Returns INT8/INT16/INT32 elements widened to i64.
    pub fn get_ints(&self, tag: i32) -> Result<Vec<i64>> {
        self.entry(tag)?.ints(tag)
    }

    /// Returns a single integer; the tag must carry exactly one value.
    pub fn get_int(&self, tag: i32) -> Result<i64> {
        let vals = self.get_ints(tag)?;
        if vals.len() != 1 {
            return Err(Error::UnexpectedCount {
                tag,
                count: vals.len(),
            });
        }
        Ok(vals[0])
    }

    /// Returns integer elements of any width as unsigned 64-bit values.
    pub fn get_uint64s(&self, tag: i32) -> Result<Vec<u64>> {
        self.entry(tag)?.uints(tag)
    }

    /// Returns the bytes of a CHAR or BIN tag.
    pub fn get_bytes(&self, tag: i32) -> Result<&[u8]> {
        self.entry(tag)?.bytes(tag)
    }

    /// Inserts (or replaces) a BIN entry.
    pub(crate) fn insert_bin(&mut self, tag: i32, data: Vec<u8>) {
        self.entries.insert(tag, TagEntry::bin(data));
    }

    /// Removes an entry if present.
    pub(crate) fn remove(&mut self, tag: i32) {
        self.entries.remove(&tag);
    }

    pub(crate) fn entries(&self) -> &BTreeMap<i32, TagEntry> {
        &self.entries
    }

    /// Serializes the header with a fresh region trailer.
    pub fn encode(&self, region_tag: i32, is_sig_block: bool) -> Vec<u8> {
        encode::encode_header(&self.entries, region_tag, is_sig_block)
    }
}

/// The metadata of an RPM package: lead, signature header, general header.
///
/// Tags are addressed in a single namespace: general-header tags keep
/// their values (1000 and up), signature-header tags are shifted by
/// [`tags::SIG_TAG_BASE`] (or sit below 1000 for the legacy `SIG_BASE`
/// range) and route to the signature header automatically.
#[derive(Debug, Clone)]
pub struct RpmHeader {
    lead: Vec<u8>,
    signature: Header,
    general: Header,
    is_source: bool,
}

impl RpmHeader {
    /// Reads the lead and both headers from a stream, leaving it
    /// positioned at the first payload byte.
    pub fn read<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        Self::read_with_limits(r, &ReadLimits::default())
    }

    /// Like [`read`](Self::read) with explicit limits.
    pub fn read_with_limits<R: Read + ?Sized>(r: &mut R, limits: &ReadLimits) -> Result<Self> {
        let (lead, signature) = read_signature_header(r, limits)?;
        let expected = expected_header_digest(&signature);
        let general = Header::decode(r, expected.as_ref(), false, limits)?;
        Ok(Self {
            lead: lead.bytes,
            signature,
            general,
            is_source: lead.is_source,
        })
    }

    /// True for source packages (src.rpm).
    pub fn is_source(&self) -> bool {
        self.is_source
    }

    /// The preserved 96-byte lead.
    pub(crate) fn lead(&self) -> &[u8] {
        &self.lead
    }

    pub(crate) fn signature_header(&self) -> &Header {
        &self.signature
    }

    pub(crate) fn signature_header_mut(&mut self) -> &mut Header {
        &mut self.signature
    }

    pub(crate) fn general_header(&self) -> &Header {
        &self.general
    }

    /// Resolves a namespaced tag to the header holding it plus the local
    /// tag value.
    fn resolve(&self, tag: i32) -> (&Header, i32) {
        if tag >= tags::SIG_TAG_BASE {
            (&self.signature, tag - tags::SIG_TAG_BASE)
        } else if tag < tags::GENERAL_TAG_BASE {
            (&self.signature, tag)
        } else {
            (&self.general, tag)
        }
    }

    fn map_tag_err(err: Error, tag: i32) -> Error {
        // Report the caller's namespaced tag, not the local one.
        match err {
            Error::NoSuchTag(_) => Error::NoSuchTag(tag),
            Error::TagTruncated(local) if local + tags::SIG_TAG_BASE == tag => {
                Error::TagTruncated(tag)
            }
            other => other,
        }
    }

    /// Membership test in the combined tag namespace.
    pub fn has_tag(&self, tag: i32) -> bool {
        let (header, local) = self.resolve(tag);
        header.has_tag(local)
    }

    /// Returns a tag's value in tagged form.
    pub fn value(&self, tag: i32) -> Result<TagValue> {
        let (header, local) = self.resolve(tag);
        header.value(local).map_err(|e| Self::map_tag_err(e, tag))
    }

    /// Returns the strings of a string-family tag.
    pub fn get_strings(&self, tag: i32) -> Result<Vec<String>> {
        let (header, local) = self.resolve(tag);
        header
            .get_strings(local)
            .map_err(|e| Self::map_tag_err(e, tag))
    }

    /// Returns a single string value.
    pub fn get_string(&self, tag: i32) -> Result<String> {
        let (header, local) = self.resolve(tag);
        header
            .get_string(local)
            .map_err(|e| Self::map_tag_err(e, tag))
    }

    /// Returns integer values widened to i64.
    pub fn get_ints(&self, tag: i32) -> Result<Vec<i64>> {
        let (header, local) = self.resolve(tag);
        header
            .get_ints(local)
            .map_err(|e| Self::map_tag_err(e, tag))
    }

    /// Returns a single integer value.
    pub fn get_int(&self, tag: i32) -> Result<i64> {
        let (header, local) = self.resolve(tag);
        header.get_int(local).map_err(|e| Self::map_tag_err(e, tag))
    }

    /// Returns integer values of any width as u64.
    pub fn get_uint64s(&self, tag: i32) -> Result<Vec<u64>> {
        let (header, local) = self.resolve(tag);
        header
            .get_uint64s(local)
            .map_err(|e| Self::map_tag_err(e, tag))
    }

    /// Reads a size that may be stored in either a 64-bit tag or a legacy
    /// 32-bit tag, preferring the wide one.
    ///
    /// Used for `SIZE`/`LONGSIZE` and
    /// `SIG_PAYLOADSIZE`/`SIG_LONGARCHIVESIZE`.
    pub fn get_uint64_fallback(&self, narrow_tag: i32, wide_tag: i32) -> Result<u64> {
        let vals = match self.get_uint64s(wide_tag) {
            Err(Error::NoSuchTag(_)) => self.get_uint64s(narrow_tag)?,
            other => other?,
        };
        match vals.len() {
            1 => Ok(vals[0]),
            n => Err(Error::UnexpectedCount {
                tag: wide_tag,
                count: n,
            }),
        }
    }

    /// Returns the bytes of a CHAR or BIN tag.
    pub fn get_bytes(&self, tag: i32) -> Result<Vec<u8>> {
        let (header, local) = self.resolve(tag);
        header
            .get_bytes(local)
            .map(<[u8]>::to_vec)
            .map_err(|e| Self::map_tag_err(e, tag))
    }

    /// Composes the package identity. A missing `EPOCH` reports `"0"`.
    pub fn nevra(&self) -> Result<Nevra> {
        let epoch = match self.get_string(tags::EPOCH) {
            Ok(e) => e,
            Err(Error::NoSuchTag(_)) => "0".to_owned(),
            Err(Error::UnsupportedDataType { .. }) => {
                // Most packages store the epoch as INT32.
                self.get_int(tags::EPOCH)?.to_string()
            }
            Err(e) => return Err(e),
        };
        Ok(Nevra {
            name: self.get_string(tags::NAME)?,
            epoch,
            version: self.get_string(tags::VERSION)?,
            release: self.get_string(tags::RELEASE)?,
            arch: self.get_string(tags::ARCH)?,
        })
    }

    /// Projects the general header into a per-file metadata list.
    pub fn files(&self) -> Result<Vec<FileInfo>> {
        crate::fileinfo::file_infos(self)
    }

    /// The byte range the general header occupies within the original
    /// file. The signature header occupies `LEAD_SIZE..range.start`.
    pub fn header_range(&self) -> Range<u64> {
        let start = (LEAD_SIZE + self.signature.orig_size()) as u64;
        start..start + self.general.orig_size() as u64
    }

    /// Serializes the signature header with a fresh region trailer.
    ///
    /// With `preserve_size`, the result is padded with a reserved-space
    /// entry so that its length matches the original on-disk footprint,
    /// keeping all later byte offsets valid; if the original size cannot
    /// be hit exactly, the unpadded encoding is returned instead.
    ///
    /// The result is always a multiple of 8 bytes long.
    pub fn dump_signature_header(&self, preserve_size: bool) -> Vec<u8> {
        let encoded = self.signature.encode(tags::RPMTAG_HEADERSIGNATURES, true);
        if !preserve_size {
            return encoded;
        }
        let target = self.signature.orig_size();
        pad_sig_to_original(&self.signature, encoded.clone(), target).unwrap_or(encoded)
    }
}

/// Re-encodes a signature header padded with a reserved-space entry so
/// the result hits `target` bytes exactly.
///
/// Returns `None` when no nonnegative padding can make the sizes meet,
/// in which case callers fall back to rewriting the whole file. The
/// 16-byte overhead is the padding entry's own index row.
pub(crate) fn pad_sig_to_original(
    signature: &Header,
    encoded: Vec<u8>,
    target: usize,
) -> Option<Vec<u8>> {
    if encoded.len() == target {
        return Some(encoded);
    }
    if encoded.len() + 16 > target {
        return None;
    }
    let padding = target - encoded.len() - 16;
    let mut entries = signature.entries().clone();
    entries.insert(
        tags::SIG_RESERVEDSPACE - tags::SIG_TAG_BASE,
        TagEntry::bin(vec![0u8; padding]),
    );
    let padded = encode::encode_header(&entries, tags::RPMTAG_HEADERSIGNATURES, true);
    // Alignment shifts inside the data area can still defeat the
    // arithmetic; only an exact hit is usable.
    (padded.len() == target).then_some(padded)
}

/// Builds a [`Header`] from scratch.
///
/// Reading and signing never need this; they only mutate headers that
/// came off disk. Tooling and test fixtures construct headers directly,
/// so the builder is public. Values are staged per tag and
/// serialized by [`build`](Self::build) with the same encoder used for
/// rewriting signature headers.
///
/// # Example
///
/// ```rust
/// use rpmseal::{tags, HeaderBuilder};
///
/// let header = HeaderBuilder::new()
///     .string(tags::NAME, "simple")
///     .string(tags::VERSION, "1.0.1")
///     .build(tags::RPMTAG_HEADERIMMUTABLE, false)?;
/// assert_eq!(header.get_string(tags::NAME)?, "simple");
/// # Ok::<(), rpmseal::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeaderBuilder {
    entries: BTreeMap<i32, TagEntry>,
}

impl HeaderBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a STRING entry.
    pub fn string(mut self, tag: i32, value: &str) -> Self {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        self.entries.insert(
            tag,
            TagEntry {
                ty: TagType::String,
                count: 1,
                data,
            },
        );
        self
    }

    /// Stages a STRING_ARRAY entry.
    pub fn string_array(mut self, tag: i32, values: &[&str]) -> Self {
        let mut data = Vec::new();
        for value in values {
            data.extend_from_slice(value.as_bytes());
            data.push(0);
        }
        self.entries.insert(
            tag,
            TagEntry {
                ty: TagType::StringArray,
                count: values.len() as u32,
                data,
            },
        );
        self
    }

    /// Stages an INT16 entry.
    pub fn int16s(mut self, tag: i32, values: &[u16]) -> Self {
        let data = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        self.entries.insert(
            tag,
            TagEntry {
                ty: TagType::Int16,
                count: values.len() as u32,
                data,
            },
        );
        self
    }

    /// Stages an INT32 entry.
    pub fn int32s(mut self, tag: i32, values: &[u32]) -> Self {
        let data = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        self.entries.insert(
            tag,
            TagEntry {
                ty: TagType::Int32,
                count: values.len() as u32,
                data,
            },
        );
        self
    }

    /// Stages an INT64 entry.
    pub fn int64s(mut self, tag: i32, values: &[u64]) -> Self {
        let data = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        self.entries.insert(
            tag,
            TagEntry {
                ty: TagType::Int64,
                count: values.len() as u32,
                data,
            },
        );
        self
    }

    /// Stages a BIN entry.
    pub fn bin(mut self, tag: i32, data: &[u8]) -> Self {
        self.entries.insert(tag, TagEntry::bin(data.to_vec()));
        self
    }

    /// Serializes the staged entries and decodes them back, yielding a
    /// header whose `orig` bytes are its own canonical encoding.
    pub fn build(self, region_tag: i32, is_sig_block: bool) -> Result<Header> {
        let blob = encode::encode_header(&self.entries, region_tag, is_sig_block);
        Header::decode(&mut &blob[..], None, is_sig_block, &ReadLimits::default())
    }
}

/// A minimal valid lead for fixtures built inside this crate's tests.
#[cfg(test)]
pub(crate) fn test_lead() -> Vec<u8> {
    let mut lead = vec![0u8; LEAD_SIZE];
    lead[0..4].copy_from_slice(&0xedab_eedbu32.to_be_bytes());
    lead[4] = 3;
    lead
}

/// Picks the strongest header digest advertised by a signature header.
pub(crate) fn expected_header_digest(signature: &Header) -> Option<ExpectedDigest> {
    if let Ok(hex) = signature.get_string(tags::SIG_SHA256) {
        return Some(ExpectedDigest {
            algo: DigestAlgo::Sha256,
            hex,
        });
    }
    if let Ok(hex) = signature.get_string(tags::SIG_SHA1) {
        return Some(ExpectedDigest {
            algo: DigestAlgo::Sha1,
            hex,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a header blob by hand: NAME = "simple", FILESIZES = [7].
    fn sample_blob() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(b"simple\0");
        data.push(0); // align FILESIZES to 4
        data.extend_from_slice(&7u32.to_be_bytes());

        let mut table = Vec::new();
        for (tag, ty, offset, count) in [
            (tags::NAME, 6i32, 0i32, 1i32),
            (tags::FILESIZES, 4, 8, 1),
        ] {
            table.extend_from_slice(&tag.to_be_bytes());
            table.extend_from_slice(&ty.to_be_bytes());
            table.extend_from_slice(&offset.to_be_bytes());
            table.extend_from_slice(&count.to_be_bytes());
        }

        let mut blob = Vec::new();
        blob.extend_from_slice(&HEADER_MAGIC.to_be_bytes());
        blob.extend_from_slice(&0u32.to_be_bytes());
        blob.extend_from_slice(&2u32.to_be_bytes());
        blob.extend_from_slice(&(data.len() as u32).to_be_bytes());
        blob.extend_from_slice(&table);
        blob.extend_from_slice(&data);
        blob
    }

    #[test]
    fn test_decode_sample() {
        let blob = sample_blob();
        let header =
            Header::decode(&mut &blob[..], None, false, &ReadLimits::default()).unwrap();
        assert_eq!(header.get_string(tags::NAME).unwrap(), "simple");
        assert_eq!(header.get_ints(tags::FILESIZES).unwrap(), vec![7]);
        assert_eq!(header.orig_size(), blob.len());
        assert_eq!(header.orig(), &blob[..]);
    }

    #[test]
    fn test_decode_rejects_bad_magic() {
        let mut blob = sample_blob();
        blob[0] = 0;
        let err = Header::decode(&mut &blob[..], None, false, &ReadLimits::default());
        assert!(matches!(err, Err(Error::BadHeaderMagic)));
    }

    #[test]
    fn test_decode_rejects_truncated_entry() {
        let mut blob = sample_blob();
        // Point FILESIZES past the end of the data area.
        let offset_pos = 16 + 16 + 8;
        blob[offset_pos..offset_pos + 4].copy_from_slice(&1000i32.to_be_bytes());
        let err = Header::decode(&mut &blob[..], None, false, &ReadLimits::default());
        assert!(matches!(err, Err(Error::TagTruncated(t)) if t == tags::FILESIZES));
    }

    #[test]
    fn test_decode_rejects_duplicates() {
        let mut blob = sample_blob();
        // Rewrite the second row's tag to NAME.
        let tag_pos = 16 + 16;
        blob[tag_pos..tag_pos + 4].copy_from_slice(&tags::NAME.to_be_bytes());
        // Re-type it as STRING so the row itself stays valid.
        blob[tag_pos + 4..tag_pos + 8].copy_from_slice(&6i32.to_be_bytes());
        blob[tag_pos + 8..tag_pos + 12].copy_from_slice(&0i32.to_be_bytes());
        let err = Header::decode(&mut &blob[..], None, false, &ReadLimits::default());
        assert!(matches!(err, Err(Error::DuplicateTag(t)) if t == tags::NAME));
    }

    #[test]
    fn test_decode_enforces_limit() {
        let blob = sample_blob();
        let limits = ReadLimits {
            max_header_bytes: 8,
        };
        let err = Header::decode(&mut &blob[..], None, false, &limits);
        assert!(matches!(err, Err(Error::HeaderTooLarge { .. })));
    }

    #[test]
    fn test_digest_check() {
        let blob = sample_blob();
        let good = ExpectedDigest {
            algo: DigestAlgo::Sha256,
            hex: DigestAlgo::Sha256.digest_hex(&blob),
        };
        assert!(Header::decode(&mut &blob[..], Some(&good), false, &ReadLimits::default()).is_ok());

        let bad = ExpectedDigest {
            algo: DigestAlgo::Sha256,
            hex: "00".repeat(32),
        };
        let err = Header::decode(&mut &blob[..], Some(&bad), false, &ReadLimits::default());
        assert!(matches!(err, Err(Error::HeaderDigestMismatch { algo: "sha256" })));
    }

    #[test]
    fn test_sig_block_consumes_pad() {
        let blob = sample_blob();
        let size = blob.len() - 32 - 16; // data area length
        let pad = (8 - size % 8) % 8;
        let mut padded = blob.clone();
        padded.extend(std::iter::repeat(0).take(pad));
        padded.extend_from_slice(b"PAYLOAD");

        let mut cursor = &padded[..];
        let header = Header::decode(&mut cursor, None, true, &ReadLimits::default()).unwrap();
        assert_eq!(header.orig_size() % 8, 0);
        assert_eq!(cursor, b"PAYLOAD");
    }

    #[test]
    fn test_old_filenames_synthesis() {
        let mut header = Header {
            entries: BTreeMap::new(),
            orig: Vec::new(),
        };
        header.entries.insert(
            tags::DIRNAMES,
            TagEntry {
                ty: TagType::StringArray,
                count: 2,
                data: b"/etc/\0/usr/bin/\0".to_vec(),
            },
        );
        header.entries.insert(
            tags::BASENAMES,
            TagEntry {
                ty: TagType::StringArray,
                count: 2,
                data: b"config\0tool\0".to_vec(),
            },
        );
        header.entries.insert(
            tags::DIRINDEXES,
            TagEntry {
                ty: TagType::Int32,
                count: 2,
                data: [0u32.to_be_bytes(), 1u32.to_be_bytes()].concat(),
            },
        );
        assert_eq!(
            header.get_strings(tags::OLDFILENAMES).unwrap(),
            vec!["/etc/config", "/usr/bin/tool"]
        );

        // Out-of-range directory index is corruption, not a panic.
        header.entries.insert(
            tags::DIRINDEXES,
            TagEntry {
                ty: TagType::Int32,
                count: 2,
                data: [0u32.to_be_bytes(), 9u32.to_be_bytes()].concat(),
            },
        );
        let err = header.get_strings(tags::OLDFILENAMES);
        assert!(matches!(err, Err(Error::TagTruncated(t)) if t == tags::DIRINDEXES));
    }
}
