//! Decoded header tag entries.

use crate::error::{Error, Result};
use crate::tags::TagType;

/// One decoded tag entry: the index-table row plus its slice of the data
/// area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    /// Data type of the entry.
    pub ty: TagType,
    /// Element count from the index row.
    pub count: u32,
    /// The entry's bytes, copied out of the header data area.
    ///
    /// For fixed-width types this is `count * width` bytes, big-endian.
    /// For string families it runs up to and including the count-th NUL.
    pub data: Vec<u8>,
}

impl TagEntry {
    /// Creates a BIN entry, the form used for signatures and padding.
    pub fn bin(data: Vec<u8>) -> Self {
        Self {
            ty: TagType::Bin,
            count: data.len() as u32,
            data,
        }
    }

    /// Decodes the strings of a STRING/STRING_ARRAY/I18NSTRING entry.
    pub(crate) fn strings(&self, tag: i32) -> Result<Vec<String>> {
        if !self.ty.is_string() {
            return Err(Error::UnsupportedDataType {
                data_type: self.ty as i32,
                tag,
            });
        }
        let mut out = Vec::with_capacity(self.count as usize);
        let mut rest = &self.data[..];
        for _ in 0..self.count {
            let nul = rest
                .iter()
                .position(|&c| c == 0)
                .ok_or(Error::TagTruncated(tag))?;
            out.push(String::from_utf8_lossy(&rest[..nul]).into_owned());
            rest = &rest[nul + 1..];
        }
        Ok(out)
    }

    /// Decodes INT8/INT16/INT32 elements, widened to i64.
    pub(crate) fn ints(&self, tag: i32) -> Result<Vec<i64>> {
        self.integer_elements(tag, false)
    }

    /// Decodes INT8/INT16/INT32/INT64 elements as unsigned values.
    pub(crate) fn uints(&self, tag: i32) -> Result<Vec<u64>> {
        Ok(self
            .integer_elements(tag, true)?
            .into_iter()
            .map(|v| v as u64)
            .collect())
    }

    fn integer_elements(&self, tag: i32, allow64: bool) -> Result<Vec<i64>> {
        let width = match self.ty {
            TagType::Int8 => 1,
            TagType::Int16 => 2,
            TagType::Int32 => 4,
            TagType::Int64 if allow64 => 8,
            _ => {
                return Err(Error::UnsupportedDataType {
                    data_type: self.ty as i32,
                    tag,
                });
            }
        };
        let count = self.count as usize;
        if self.data.len() < count * width {
            return Err(Error::TagTruncated(tag));
        }
        let mut out = Vec::with_capacity(count);
        for chunk in self.data.chunks_exact(width).take(count) {
            let value = match width {
                1 => chunk[0] as i64,
                2 => u16::from_be_bytes([chunk[0], chunk[1]]) as i64,
                4 => u32::from_be_bytes(chunk.try_into().unwrap()) as i64,
                _ => u64::from_be_bytes(chunk.try_into().unwrap()) as i64,
            };
            out.push(value);
        }
        Ok(out)
    }

    /// Returns the raw bytes of a CHAR or BIN entry.
    pub(crate) fn bytes(&self, tag: i32) -> Result<&[u8]> {
        match self.ty {
            TagType::Char | TagType::Bin => Ok(&self.data),
            _ => Err(Error::UnsupportedDataType {
                data_type: self.ty as i32,
                tag,
            }),
        }
    }
}

/// A tag's value in tagged form, for callers that do not know the type
/// up front.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TagValue {
    /// A NULL entry.
    Null,
    /// One or more strings.
    Strings(Vec<String>),
    /// Integers of any width up to 64 bits.
    Ints(Vec<i64>),
    /// CHAR or BIN data.
    Bytes(Vec<u8>),
}

impl TagEntry {
    /// Decodes the entry into its tagged form.
    pub(crate) fn value(&self, tag: i32) -> Result<TagValue> {
        Ok(match self.ty {
            TagType::Null => TagValue::Null,
            TagType::String | TagType::StringArray | TagType::I18nString => {
                TagValue::Strings(self.strings(tag)?)
            }
            TagType::Int8 | TagType::Int16 | TagType::Int32 => TagValue::Ints(self.ints(tag)?),
            TagType::Int64 => TagValue::Ints(
                self.uints(tag)?.into_iter().map(|v| v as i64).collect(),
            ),
            TagType::Char | TagType::Bin => TagValue::Bytes(self.data.clone()),
        })
    }
}
