//! The chunked section codec shared by the PSK and PSA formats.
//!
//! Every section is a 32-byte header followed by `data_size * data_count`
//! bytes of packed records. Sections carry no ordering guarantees and readers
//! must skip tags they do not recognize, which keeps the format forward
//! compatible.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::{FormatError, Result};
use crate::io_ext::WriteExt;

/// Magic value every section header carries in its type-flags field
pub const SECTION_TYPE_FLAGS: i32 = 1999801;

/// Length of the fixed ASCII tag at the start of a section header
pub const SECTION_NAME_LEN: usize = 20;

/// Total size of a section header on the wire
pub const SECTION_HEADER_SIZE: usize = 32;

/// A section header: fixed tag, magic type flags, element size and count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    /// NUL-padded ASCII tag, e.g. `PNTS0000`
    pub name: [u8; SECTION_NAME_LEN],
    /// Must equal [`SECTION_TYPE_FLAGS`] for the file to be well formed
    pub type_flags: i32,
    /// Size of one payload record in bytes
    pub data_size: i32,
    /// Number of payload records
    pub data_count: i32,
}

impl SectionHeader {
    /// Create a header for `data_count` records of `data_size` bytes each.
    ///
    /// The tag is padded with NULs (or truncated) to the fixed tag length.
    pub fn new(tag: &[u8], data_size: usize, data_count: usize) -> Self {
        let mut name = [0u8; SECTION_NAME_LEN];
        let len = tag.len().min(SECTION_NAME_LEN);
        name[..len].copy_from_slice(&tag[..len]);
        Self {
            name,
            type_flags: SECTION_TYPE_FLAGS,
            data_size: data_size as i32,
            data_count: data_count as i32,
        }
    }

    /// Read the next section header from the stream.
    ///
    /// Returns `Ok(None)` at a clean end of stream. A partial header is a
    /// [`FormatError::TruncatedHeader`]; a type-flags mismatch is a
    /// [`FormatError::TypeFlagsMismatch`].
    pub fn read_next<R: Read>(reader: &mut R) -> Result<Option<Self>> {
        let mut buf = [0u8; SECTION_HEADER_SIZE];
        let mut filled = 0;
        while filled < SECTION_HEADER_SIZE {
            let n = reader.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled == 0 {
            return Ok(None);
        }
        if filled < SECTION_HEADER_SIZE {
            return Err(FormatError::TruncatedHeader {
                expected: SECTION_HEADER_SIZE,
                actual: filled,
            });
        }

        let mut name = [0u8; SECTION_NAME_LEN];
        name.copy_from_slice(&buf[..SECTION_NAME_LEN]);
        let type_flags = i32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]);
        let data_size = i32::from_le_bytes([buf[24], buf[25], buf[26], buf[27]]);
        let data_count = i32::from_le_bytes([buf[28], buf[29], buf[30], buf[31]]);

        let header = Self {
            name,
            type_flags,
            data_size,
            data_count,
        };

        if header.type_flags != SECTION_TYPE_FLAGS {
            return Err(FormatError::TypeFlagsMismatch {
                section: header.tag_lossy(),
                expected: SECTION_TYPE_FLAGS,
                actual: header.type_flags,
            });
        }

        Ok(Some(header))
    }

    /// Write the header to a writer
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.name)?;
        writer.write_i32_le(self.type_flags)?;
        writer.write_i32_le(self.data_size)?;
        writer.write_i32_le(self.data_count)?;
        Ok(())
    }

    /// The tag bytes up to the first NUL
    pub fn tag(&self) -> &[u8] {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(SECTION_NAME_LEN);
        &self.name[..end]
    }

    /// The tag as a lossy UTF-8 string, for diagnostics
    pub fn tag_lossy(&self) -> String {
        String::from_utf8_lossy(self.tag()).to_string()
    }

    /// Validate the declared element size against the expected record layout
    pub fn expect_size(&self, expected: usize) -> Result<()> {
        if self.data_size as usize != expected {
            return Err(FormatError::ElementSizeMismatch {
                section: self.tag_lossy(),
                expected,
                actual: self.data_size,
            });
        }
        Ok(())
    }

    /// Total payload length in bytes
    pub fn payload_len(&self) -> u64 {
        self.data_size.max(0) as u64 * self.data_count.max(0) as u64
    }
}

/// Skip a section's payload without knowing its internal layout
pub fn skip_payload<R: Read + Seek>(reader: &mut R, header: &SectionHeader) -> Result<()> {
    log::debug!(
        "skipping section '{}' ({} bytes)",
        header.tag_lossy(),
        header.payload_len()
    );
    reader.seek(SeekFrom::Current(header.payload_len() as i64))?;
    Ok(())
}

/// Read a section's records after validating the declared element size
pub fn read_records<T, R, F>(
    reader: &mut R,
    header: &SectionHeader,
    record_size: usize,
    mut parse_fn: F,
) -> Result<Vec<T>>
where
    R: Read,
    F: FnMut(&mut R) -> Result<T>,
{
    header.expect_size(record_size)?;
    let count = header.data_count.max(0) as usize;
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        records.push(parse_fn(reader)?);
    }
    Ok(records)
}

/// Write a section header followed by its packed records
pub fn write_section<T, W, F>(
    writer: &mut W,
    tag: &[u8],
    record_size: usize,
    records: &[T],
    mut write_fn: F,
) -> Result<()>
where
    W: Write,
    F: FnMut(&mut W, &T) -> Result<()>,
{
    SectionHeader::new(tag, record_size, records.len()).write(writer)?;
    for record in records {
        write_fn(writer, record)?;
    }
    Ok(())
}

/// Write a zero-payload marker section such as `ACTRHEAD` or `ANIMHEAD`
pub fn write_marker<W: Write>(writer: &mut W, tag: &[u8]) -> Result<()> {
    SectionHeader::new(tag, 0, 0).write(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header_bytes(tag: &[u8], type_flags: i32, size: i32, count: i32) -> Vec<u8> {
        let mut bytes = vec![0u8; SECTION_NAME_LEN];
        bytes[..tag.len()].copy_from_slice(tag);
        bytes.extend_from_slice(&type_flags.to_le_bytes());
        bytes.extend_from_slice(&size.to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes
    }

    #[test]
    fn test_header_roundtrip() {
        let header = SectionHeader::new(b"PNTS0000", 12, 7);
        let mut cursor = Cursor::new(Vec::new());
        header.write(&mut cursor).unwrap();

        let data = cursor.into_inner();
        assert_eq!(data.len(), SECTION_HEADER_SIZE);

        let mut cursor = Cursor::new(data);
        let parsed = SectionHeader::read_next(&mut cursor).unwrap().unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.tag(), b"PNTS0000");
        assert_eq!(parsed.data_size, 12);
        assert_eq!(parsed.data_count, 7);
    }

    #[test]
    fn test_clean_eof_returns_none() {
        let mut cursor = Cursor::new(Vec::new());
        assert!(SectionHeader::read_next(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn test_partial_header_is_truncated() {
        let bytes = header_bytes(b"PNTS0000", SECTION_TYPE_FLAGS, 12, 1);
        let mut cursor = Cursor::new(bytes[..16].to_vec());
        let err = SectionHeader::read_next(&mut cursor).unwrap_err();
        assert!(matches!(
            err,
            FormatError::TruncatedHeader { actual: 16, .. }
        ));
    }

    #[test]
    fn test_bad_type_flags_rejected() {
        let bytes = header_bytes(b"PNTS0000", 12345, 12, 1);
        let mut cursor = Cursor::new(bytes);
        let err = SectionHeader::read_next(&mut cursor).unwrap_err();
        assert!(matches!(err, FormatError::TypeFlagsMismatch { .. }));
    }

    #[test]
    fn test_expect_size_mismatch() {
        let header = SectionHeader::new(b"FACE0000", 10, 3);
        assert!(header.expect_size(10).is_ok());
        let err = header.expect_size(12).unwrap_err();
        assert!(matches!(
            err,
            FormatError::ElementSizeMismatch { expected: 12, .. }
        ));
    }

    #[test]
    fn test_skip_payload_advances_past_unknown_section() {
        let mut bytes = header_bytes(b"MYSTERY0", SECTION_TYPE_FLAGS, 4, 3);
        bytes.extend_from_slice(&[0xAA; 12]);
        bytes.extend(header_bytes(b"NEXT0000", SECTION_TYPE_FLAGS, 0, 0));

        let mut cursor = Cursor::new(bytes);
        let unknown = SectionHeader::read_next(&mut cursor).unwrap().unwrap();
        assert_eq!(unknown.tag(), b"MYSTERY0");
        skip_payload(&mut cursor, &unknown).unwrap();

        let next = SectionHeader::read_next(&mut cursor).unwrap().unwrap();
        assert_eq!(next.tag(), b"NEXT0000");
    }

    #[test]
    fn test_write_section_packs_records() {
        let mut cursor = Cursor::new(Vec::new());
        write_section(&mut cursor, b"TEST0000", 4, &[1u32, 2, 3], |w, n| {
            w.write_u32_le(*n)?;
            Ok(())
        })
        .unwrap();

        let data = cursor.into_inner();
        assert_eq!(data.len(), SECTION_HEADER_SIZE + 12);

        let mut cursor = Cursor::new(data);
        let header = SectionHeader::read_next(&mut cursor).unwrap().unwrap();
        let records = read_records(&mut cursor, &header, 4, |r| {
            use crate::io_ext::ReadExt;
            Ok(r.read_u32_le()?)
        })
        .unwrap();
        assert_eq!(records, vec![1, 2, 3]);
    }
}
