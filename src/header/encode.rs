//! Header blob serialization.
//!
//! The encoder rebuilds the intro, index table and data area from a set of
//! entries. The first index row is always a region marker: a BIN entry of
//! count 16 pointing at a trailer placed in the last 16 bytes of the data
//! area, which carries the region tag and the negated index-table size.
//! This self-referential pair is what rpm itself emits, and signatures are
//! computed over the exact bytes produced here.
//!
//! Layout rules:
//! - index rows after the region marker are in ascending tag order;
//! - the data area holds string/bin entries first (in index order), then
//!   integer entries grouped by decreasing alignment so every integer is
//!   naturally aligned;
//! - a signature block is padded with NULs to the next 8-byte boundary,
//!   and the pad is part of the returned bytes.

use std::collections::BTreeMap;

use super::entry::TagEntry;
use super::HEADER_MAGIC;
use crate::tags::{self, TagType};

/// Serializes a header from its entries.
pub(crate) fn encode_header(
    entries: &BTreeMap<i32, TagEntry>,
    region_tag: i32,
    is_sig_block: bool,
) -> Vec<u8> {
    // Any decoded region entry is regenerated, never copied through.
    let ordinary: Vec<(i32, &TagEntry)> = entries
        .iter()
        .filter(|(tag, _)| {
            !(tags::RPMTAG_HEADERSIGNATURES..=tags::RPMTAG_HEADERREGIONS).contains(tag)
        })
        .map(|(tag, entry)| (*tag, entry))
        .collect();

    let mut data = Vec::new();
    let mut offsets: BTreeMap<i32, usize> = BTreeMap::new();

    for (tag, entry) in &ordinary {
        if !is_integer(entry.ty) {
            offsets.insert(*tag, data.len());
            data.extend_from_slice(&entry.data);
        }
    }
    for ty in [TagType::Int64, TagType::Int32, TagType::Int16, TagType::Int8] {
        for (tag, entry) in &ordinary {
            if entry.ty == ty {
                let align = ty.alignment();
                while data.len() % align != 0 {
                    data.push(0);
                }
                offsets.insert(*tag, data.len());
                data.extend_from_slice(&entry.data);
            }
        }
    }

    let index_rows = ordinary.len() + 1;
    let trailer_offset = data.len();
    push_row(
        &mut data,
        region_tag,
        TagType::Bin as i32,
        -(index_rows as i32 * 16),
        16,
    );

    let mut table = Vec::with_capacity(index_rows * 16);
    push_row(
        &mut table,
        region_tag,
        TagType::Bin as i32,
        trailer_offset as i32,
        16,
    );
    for (tag, entry) in &ordinary {
        push_row(
            &mut table,
            *tag,
            entry.ty as i32,
            offsets[tag] as i32,
            entry.count as i32,
        );
    }

    let mut out = Vec::with_capacity(16 + table.len() + data.len());
    out.extend_from_slice(&HEADER_MAGIC.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&(index_rows as u32).to_be_bytes());
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(&table);
    out.extend_from_slice(&data);

    if is_sig_block {
        while out.len() % 8 != 0 {
            out.push(0);
        }
    }
    out
}

fn is_integer(ty: TagType) -> bool {
    matches!(
        ty,
        TagType::Int8 | TagType::Int16 | TagType::Int32 | TagType::Int64
    )
}

fn push_row(out: &mut Vec<u8>, tag: i32, ty: i32, offset: i32, count: i32) {
    out.extend_from_slice(&tag.to_be_bytes());
    out.extend_from_slice(&ty.to_be_bytes());
    out.extend_from_slice(&offset.to_be_bytes());
    out.extend_from_slice(&count.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{Header, ReadLimits};
    use crate::tags;

    fn sample_entries() -> BTreeMap<i32, TagEntry> {
        let mut entries = BTreeMap::new();
        entries.insert(
            tags::NAME,
            TagEntry {
                ty: TagType::String,
                count: 1,
                data: b"simple\0".to_vec(),
            },
        );
        entries.insert(
            tags::FILESIZES,
            TagEntry {
                ty: TagType::Int32,
                count: 3,
                data: [7u32, 0, 12]
                    .iter()
                    .flat_map(|v| v.to_be_bytes())
                    .collect(),
            },
        );
        entries.insert(
            tags::FILEMODES,
            TagEntry {
                ty: TagType::Int16,
                count: 3,
                data: [0o100644u16, 0o100644, 0o120777]
                    .iter()
                    .flat_map(|v| v.to_be_bytes())
                    .collect(),
            },
        );
        entries.insert(
            tags::LONGSIZE,
            TagEntry {
                ty: TagType::Int64,
                count: 1,
                data: 19u64.to_be_bytes().to_vec(),
            },
        );
        entries
    }

    #[test]
    fn test_region_marker_shape() {
        let blob = encode_header(&sample_entries(), tags::RPMTAG_HEADERIMMUTABLE, false);
        let rows = u32::from_be_bytes(blob[8..12].try_into().unwrap());
        let size = u32::from_be_bytes(blob[12..16].try_into().unwrap()) as usize;
        assert_eq!(rows, 5);

        // First row is the region marker pointing at the last 16 data bytes.
        let tag = i32::from_be_bytes(blob[16..20].try_into().unwrap());
        let ty = i32::from_be_bytes(blob[20..24].try_into().unwrap());
        let offset = i32::from_be_bytes(blob[24..28].try_into().unwrap());
        let count = i32::from_be_bytes(blob[28..32].try_into().unwrap());
        assert_eq!(tag, tags::RPMTAG_HEADERIMMUTABLE);
        assert_eq!(ty, TagType::Bin as i32);
        assert_eq!(offset as usize, size - 16);
        assert_eq!(count, 16);

        // The trailer carries the tag again and the negated table size.
        let data_start = 16 + rows as usize * 16;
        let trailer = &blob[data_start + size - 16..data_start + size];
        assert_eq!(
            i32::from_be_bytes(trailer[0..4].try_into().unwrap()),
            tags::RPMTAG_HEADERIMMUTABLE
        );
        assert_eq!(
            i32::from_be_bytes(trailer[8..12].try_into().unwrap()),
            -(rows as i32 * 16)
        );
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let entries = sample_entries();
        let blob = encode_header(&entries, tags::RPMTAG_HEADERIMMUTABLE, false);
        let decoded =
            Header::decode(&mut &blob[..], None, false, &ReadLimits::default()).unwrap();
        assert_eq!(decoded.get_string(tags::NAME).unwrap(), "simple");
        assert_eq!(decoded.get_ints(tags::FILESIZES).unwrap(), vec![7, 0, 12]);
        assert_eq!(
            decoded.get_ints(tags::FILEMODES).unwrap(),
            vec![0o100644, 0o100644, 0o120777]
        );
        assert_eq!(decoded.get_uint64s(tags::LONGSIZE).unwrap(), vec![19]);

        // Re-encoding the decoded header is stable.
        let again = decoded.encode(tags::RPMTAG_HEADERIMMUTABLE, false);
        assert_eq!(blob, again);
    }

    #[test]
    fn test_integer_alignment() {
        let blob = encode_header(&sample_entries(), tags::RPMTAG_HEADERIMMUTABLE, false);
        let rows = u32::from_be_bytes(blob[8..12].try_into().unwrap()) as usize;
        for row in blob[16..16 + rows * 16].chunks_exact(16) {
            let ty = i32::from_be_bytes(row[4..8].try_into().unwrap());
            let offset = i32::from_be_bytes(row[8..12].try_into().unwrap());
            if offset < 0 {
                continue;
            }
            let align = TagType::from_code(ty).unwrap().alignment();
            assert_eq!(offset as usize % align, 0, "type {} misaligned", ty);
        }
    }

    #[test]
    fn test_sig_block_is_8_aligned() {
        for extra in 0..8usize {
            let mut entries = sample_entries();
            entries.insert(tags::SIG_MD5 - tags::SIG_TAG_BASE, TagEntry::bin(vec![0xaa; 16 + extra]));
            let blob = encode_header(&entries, tags::RPMTAG_HEADERSIGNATURES, true);
            assert_eq!(blob.len() % 8, 0, "pad failed for extra={}", extra);

            // Decoding as a signature block consumes the pad exactly.
            let decoded =
                Header::decode(&mut &blob[..], None, true, &ReadLimits::default()).unwrap();
            assert_eq!(decoded.orig_size(), blob.len());
        }
    }
}
