//! Element extraction by byte offset.
//!
//! Given the offset of a record's opening tag, the extractor streams
//! fixed-size chunks until the matching closing tag appears, then hands
//! back the exact substring for that one record. File size is irrelevant;
//! only the record's own length matters.

use std::io::{Read, Seek, SeekFrom};

use super::helpers::find_subslice;
use super::{MzMLError, RecordKind};

/// Chunk size for element extraction reads
const READ_CHUNK: usize = 1024;

/// Extract one record element, from `offset` through its closing tag.
///
/// Bytes read past the closing tag are rewound, so the cursor ends exactly
/// after the record. Reaching end of file first means the record is
/// truncated, which is a corrupt-file condition.
pub(super) fn extract_element<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    kind: RecordKind,
    id: &str,
) -> Result<Vec<u8>, MzMLError> {
    reader.seek(SeekFrom::Start(offset))?;

    let close = kind.closing_tag();
    let mut buf = Vec::with_capacity(4 * READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            return Err(MzMLError::CorruptElement {
                id: id.to_string(),
                offset,
            });
        }

        // Re-scan only the bytes that could complete a closing tag split
        // across the previous chunk boundary.
        let search_from = buf.len().saturating_sub(close.len() - 1);
        buf.extend_from_slice(&chunk[..n]);

        if let Some(rel) = find_subslice(&buf[search_from..], close) {
            let end = search_from + rel + close.len();
            let extra = buf.len() - end;
            if extra > 0 {
                reader.seek(SeekFrom::Current(-(extra as i64)))?;
            }
            buf.truncate(end);
            return Ok(buf);
        }
    }
}
