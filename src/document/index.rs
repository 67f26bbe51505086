//! Byte-offset index resolution.
//!
//! Indexed mzML files carry a trailing `<indexList>` whose position is
//! announced by an `<indexListOffset>` marker near end of file. That index
//! is an optimization, not a semantic input: when it is absent, malformed,
//! or lies about its offsets, the document is re-indexed by a single linear
//! scan for record opening tags. Only a document with no records at all is
//! unreadable.

use std::io::{Read, Seek, SeekFrom};

use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::helpers::get_attribute;
use super::{MzMLError, RecordKind};
use crate::models::{IndexEntry, RunIndex};

/// Tail window searched for the index-offset marker
const TAIL_WINDOW: u64 = 200;

/// Chunk size for the fallback forward scan
const SCAN_CHUNK: usize = 8 * 1024;

const OFFSET_MARKER_OPEN: &str = "<indexListOffset>";
const OFFSET_MARKER_CLOSE: &str = "</indexListOffset>";

/// Resolve the record index for an open file.
///
/// Prefers the trailing index; falls back to a full scan whenever the
/// trailing block is missing, unparsable, empty, or fails offset
/// verification.
pub(super) fn resolve<R: Read + Seek>(reader: &mut R) -> Result<RunIndex, MzMLError> {
    match read_trailing_index(reader)? {
        Some(index) if !index.is_empty() => {
            if verify_offsets(reader, &index)? {
                debug!(
                    "trailing index: {} spectra, {} chromatograms",
                    index.spectrum_count(),
                    index.chromatogram_count()
                );
                return Ok(index);
            }
            debug!("trailing index failed offset verification, re-scanning");
        }
        _ => debug!("no usable trailing index, scanning for records"),
    }
    scan_for_records(reader)
}

/// Locate and parse the trailing index block, if any.
///
/// Returns `Ok(None)` for every recoverable defect (no marker, bad offset,
/// unparsable block); only I/O failures propagate.
fn read_trailing_index<R: Read + Seek>(reader: &mut R) -> Result<Option<RunIndex>, MzMLError> {
    let file_size = reader.seek(SeekFrom::End(0))?;
    let window = file_size.min(TAIL_WINDOW) as usize;
    reader.seek(SeekFrom::End(-(window as i64)))?;

    let mut tail = vec![0u8; window];
    reader.read_exact(&mut tail)?;
    let tail = String::from_utf8_lossy(&tail);

    let Some(marker) = tail.find(OFFSET_MARKER_OPEN) else {
        return Ok(None);
    };
    let start = marker + OFFSET_MARKER_OPEN.len();
    let Some(end) = tail[start..].find(OFFSET_MARKER_CLOSE) else {
        return Ok(None);
    };
    let Ok(offset) = tail[start..start + end].trim().parse::<u64>() else {
        return Ok(None);
    };
    if offset >= file_size {
        return Ok(None);
    }

    reader.seek(SeekFrom::Start(offset))?;
    let mut block = Vec::new();
    reader.read_to_end(&mut block)?;

    Ok(parse_index_block(&block))
}

/// Parse an `<indexList>` block into a [`RunIndex`]. Any structural defect
/// yields `None` so the caller can fall back to scanning.
fn parse_index_block(data: &[u8]) -> Option<RunIndex> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut spectra = Vec::new();
    let mut chromatograms = Vec::new();
    let mut current_kind: Option<RecordKind> = None;
    let mut current_id: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"index" => {
                    current_kind = match get_attribute(e, "name").ok()?.as_deref() {
                        Some("spectrum") => Some(RecordKind::Spectrum),
                        Some("chromatogram") => Some(RecordKind::Chromatogram),
                        _ => None,
                    };
                }
                b"offset" => {
                    current_id = get_attribute(e, "idRef").ok()?;
                }
                _ => {}
            },
            Ok(Event::Text(ref t)) => {
                if let Some(id) = current_id.take() {
                    let offset = t.unescape().ok()?.trim().parse::<u64>().ok()?;
                    let entry = IndexEntry { id, offset };
                    match current_kind {
                        Some(RecordKind::Spectrum) => spectra.push(entry),
                        Some(RecordKind::Chromatogram) => chromatograms.push(entry),
                        None => {}
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"index" => current_kind = None,
                b"indexList" => break,
                _ => {}
            },
            // The block runs to end of file, past the document's own
            // closing tags; stopping at </indexList> avoids them.
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }

    Some(RunIndex::new(spectra, chromatograms))
}

/// Spot-check a parsed trailing index: the first offset of each kind must
/// land exactly on the matching opening tag.
fn verify_offsets<R: Read + Seek>(reader: &mut R, index: &RunIndex) -> Result<bool, MzMLError> {
    let probes = index
        .spectrum_entries()
        .first()
        .map(|e| (e, RecordKind::Spectrum))
        .into_iter()
        .chain(
            index
                .chromatogram_entries()
                .first()
                .map(|e| (e, RecordKind::Chromatogram)),
        );

    for (entry, kind) in probes {
        let open = kind.opening_tag();
        reader.seek(SeekFrom::Start(entry.offset))?;
        let mut probe = [0u8; 16];
        if reader.read_exact(&mut probe).is_err() {
            return Ok(false);
        }
        let after = probe[open.len()];
        if !probe.starts_with(open) || !after.is_ascii_whitespace() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Outcome of classifying one `<` position during the scan
enum TagScan {
    /// Not a record opening tag; resume after the `<`
    NotRecord,
    /// The buffer ends before the tag can be classified
    NeedMore,
    /// A record opening tag with its ID
    Record {
        kind: RecordKind,
        id: String,
        head_len: usize,
    },
}

/// Rebuild the index by scanning the whole file forward in bounded chunks,
/// recording the byte offset of every record opening tag.
fn scan_for_records<R: Read + Seek>(reader: &mut R) -> Result<RunIndex, MzMLError> {
    reader.seek(SeekFrom::Start(0))?;

    let mut spectra = Vec::new();
    let mut chromatograms = Vec::new();
    let mut buf: Vec<u8> = Vec::with_capacity(2 * SCAN_CHUNK);
    let mut chunk = vec![0u8; SCAN_CHUNK];
    // Absolute file offset of buf[0]
    let mut base: u64 = 0;
    let mut at_eof = false;

    while !at_eof {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            at_eof = true;
        } else {
            buf.extend_from_slice(&chunk[..n]);
        }

        let mut pos = 0;
        let mut pending: Option<usize> = None;
        while let Some(rel) = buf[pos..].iter().position(|&b| b == b'<') {
            let p = pos + rel;
            match classify_tag(&buf[p..], at_eof) {
                TagScan::NotRecord => pos = p + 1,
                TagScan::NeedMore => {
                    pending = Some(p);
                    break;
                }
                TagScan::Record { kind, id, head_len } => {
                    let entry = IndexEntry {
                        id,
                        offset: base + p as u64,
                    };
                    match kind {
                        RecordKind::Spectrum => spectra.push(entry),
                        RecordKind::Chromatogram => chromatograms.push(entry),
                    }
                    pos = p + head_len;
                }
            }
        }

        let keep_from = pending.unwrap_or(buf.len());
        base += keep_from as u64;
        buf.drain(..keep_from);
    }

    debug!(
        "scan indexed {} spectra, {} chromatograms",
        spectra.len(),
        chromatograms.len()
    );
    Ok(RunIndex::new(spectra, chromatograms))
}

/// Classify the tag starting at a `<`. `at_eof` turns would-be partial
/// matches into non-matches, since no more bytes are coming.
fn classify_tag(s: &[u8], at_eof: bool) -> TagScan {
    for kind in [RecordKind::Spectrum, RecordKind::Chromatogram] {
        let open = kind.opening_tag();
        if s.len() <= open.len() {
            if open.starts_with(s) {
                return if at_eof {
                    TagScan::NotRecord
                } else {
                    TagScan::NeedMore
                };
            }
            continue;
        }
        // The whitespace check excludes <spectrumList>/<chromatogramList>
        if s.starts_with(open) && s[open.len()].is_ascii_whitespace() {
            let Some(gt) = s.iter().position(|&b| b == b'>') else {
                return if at_eof {
                    TagScan::NotRecord
                } else {
                    TagScan::NeedMore
                };
            };
            return match id_attribute(&s[..gt]) {
                Some(id) => TagScan::Record {
                    kind,
                    id,
                    head_len: gt + 1,
                },
                None => TagScan::NotRecord,
            };
        }
    }
    TagScan::NotRecord
}

/// Extract the value of the `id` attribute from a tag head (the bytes
/// between `<` and `>`).
fn id_attribute(head: &[u8]) -> Option<String> {
    let mut i = 1;
    while i + 4 <= head.len() {
        if head[i..].starts_with(b"id=") && head[i - 1].is_ascii_whitespace() {
            let quote = head[i + 3];
            if quote == b'"' || quote == b'\'' {
                let rest = &head[i + 4..];
                let end = rest.iter().position(|&b| b == quote)?;
                return std::str::from_utf8(&rest[..end]).ok().map(str::to_owned);
            }
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn record(kind: &str, id: &str) -> String {
        format!("<{kind} index=\"0\" id=\"{id}\" defaultArrayLength=\"0\"></{kind}>")
    }

    fn body_with_records() -> String {
        let mut body = String::from("<?xml version=\"1.0\"?><mzML><run id=\"r\"><spectrumList count=\"2\">");
        body.push_str(&record("spectrum", "scan=1"));
        body.push_str(&record("spectrum", "scan=2"));
        body.push_str("</spectrumList><chromatogramList count=\"1\">");
        body.push_str(&record("chromatogram", "TIC"));
        body.push_str("</chromatogramList></run></mzML>");
        body
    }

    fn expected_offsets(body: &str) -> (Vec<u64>, u64) {
        let spectra = body
            .match_indices("<spectrum ")
            .map(|(i, _)| i as u64)
            .collect();
        let chromatogram = body
            .find("<chromatogram ")
            .map(|i| i as u64)
            .expect("fixture has a chromatogram");
        (spectra, chromatogram)
    }

    fn with_trailing_index(body: &str) -> String {
        let (spectra, chromatogram) = expected_offsets(body);
        let mut doc = body.to_string();
        let index_offset = doc.len();
        doc.push_str("<indexList count=\"2\"><index name=\"spectrum\">");
        for (i, offset) in spectra.iter().enumerate() {
            doc.push_str(&format!(
                "<offset idRef=\"scan={}\">{offset}</offset>",
                i + 1
            ));
        }
        doc.push_str("</index><index name=\"chromatogram\">");
        doc.push_str(&format!("<offset idRef=\"TIC\">{chromatogram}</offset>"));
        doc.push_str("</index></indexList>");
        doc.push_str(&format!("<indexListOffset>{index_offset}</indexListOffset>"));
        doc
    }

    #[test]
    fn test_scan_finds_records_in_file_order() {
        let body = body_with_records();
        let (spectra, chromatogram) = expected_offsets(&body);

        let index = scan_for_records(&mut Cursor::new(body.as_bytes())).unwrap();

        let ids: Vec<&str> = index.spectrum_ids().collect();
        assert_eq!(ids, ["scan=1", "scan=2"]);
        let offsets: Vec<u64> = index.spectrum_entries().iter().map(|e| e.offset).collect();
        assert_eq!(offsets, spectra);
        assert_eq!(index.chromatogram_entries()[0].offset, chromatogram);
    }

    #[test]
    fn test_list_tags_are_not_records() {
        let body = "<spectrumList count=\"0\"></spectrumList><chromatogramList count=\"0\"></chromatogramList>";
        let index = scan_for_records(&mut Cursor::new(body.as_bytes())).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_scan_handles_tag_straddling_chunk_boundary() {
        // Place the opening tag so it is split by the first chunk read
        let mut body = " ".repeat(SCAN_CHUNK - 5);
        let offset = body.len() as u64;
        body.push_str(&record("spectrum", "scan=7"));

        let index = scan_for_records(&mut Cursor::new(body.as_bytes())).unwrap();

        assert_eq!(index.spectrum_count(), 1);
        assert_eq!(index.spectrum_entries()[0].id, "scan=7");
        assert_eq!(index.spectrum_entries()[0].offset, offset);
    }

    #[test]
    fn test_single_quoted_id_attribute() {
        let body = "<spectrum index='0' id='scan=3' defaultArrayLength='0'></spectrum>";
        let index = scan_for_records(&mut Cursor::new(body.as_bytes())).unwrap();
        assert_eq!(index.spectrum_entries()[0].id, "scan=3");
    }

    #[test]
    fn test_trailing_index_is_used() {
        let doc = with_trailing_index(&body_with_records());
        let index = resolve(&mut Cursor::new(doc.as_bytes())).unwrap();

        let ids: Vec<&str> = index.spectrum_ids().collect();
        assert_eq!(ids, ["scan=1", "scan=2"]);
        assert_eq!(index.chromatogram_entries()[0].id, "TIC");
    }

    #[test]
    fn test_lying_trailing_index_falls_back_to_scan() {
        let body = body_with_records();
        let (spectra, _) = expected_offsets(&body);

        let mut doc = body.clone();
        let index_offset = doc.len();
        // Offsets point one byte early, so verification must reject them
        doc.push_str("<indexList count=\"1\"><index name=\"spectrum\">");
        doc.push_str(&format!(
            "<offset idRef=\"scan=1\">{}</offset>",
            spectra[0] - 1
        ));
        doc.push_str("</index></indexList>");
        doc.push_str(&format!("<indexListOffset>{index_offset}</indexListOffset>"));

        let index = resolve(&mut Cursor::new(doc.as_bytes())).unwrap();

        let offsets: Vec<u64> = index.spectrum_entries().iter().map(|e| e.offset).collect();
        assert_eq!(offsets, spectra);
        assert_eq!(index.spectrum_count(), 2);
    }

    #[test]
    fn test_garbage_index_offset_falls_back_to_scan() {
        let mut doc = body_with_records();
        // Marker points at the XML declaration, which is not an indexList
        doc.push_str("<indexListOffset>2</indexListOffset>");

        let index = resolve(&mut Cursor::new(doc.as_bytes())).unwrap();
        assert_eq!(index.spectrum_count(), 2);
        assert_eq!(index.chromatogram_count(), 1);
    }

    #[test]
    fn test_no_records_yields_empty_index() {
        let index = resolve(&mut Cursor::new(b"<mzML></mzML>".as_slice())).unwrap();
        assert!(index.is_empty());
    }
}
