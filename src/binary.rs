//! Binary data decoding for mzML
//!
//! mzML stores numerical arrays (m/z, intensity, time) as Base64-encoded
//! binary data, optionally compressed with zlib. The decoding pipeline is:
//!
//! 1. Base64 decode the text payload
//! 2. Decompress if a compression term is present (zlib)
//! 3. Interpret bytes as float32 or float64 (little-endian)
//!
//! The sibling cvParams of a `<binaryDataArray>` determine precision,
//! compression, and the semantic role of the decoded values.

use std::io::Read;

use base64::prelude::*;
use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;
use log::warn;

use crate::cv_params::{accessions, CvParam};

/// Compression applied to a binary data array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// No compression (raw binary)
    #[default]
    None,
    /// zlib (deflate) compression
    Zlib,
}

impl Compression {
    /// Determine compression from a CV accession
    pub fn from_cv_accession(accession: &str) -> Option<Self> {
        match accession {
            accessions::ZLIB_COMPRESSION => Some(Compression::Zlib),
            accessions::NO_COMPRESSION => Some(Compression::None),
            _ => None,
        }
    }
}

/// Binary encoding precision. mzML defaults to 32-bit unless the
/// 64-bit float term is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinaryEncoding {
    /// 32-bit floating point (MS:1000521)
    #[default]
    Float32,
    /// 64-bit floating point (MS:1000523)
    Float64,
}

impl BinaryEncoding {
    /// Determine encoding from a CV accession
    pub fn from_cv_accession(accession: &str) -> Option<Self> {
        match accession {
            accessions::FLOAT_32_BIT => Some(BinaryEncoding::Float32),
            accessions::FLOAT_64_BIT => Some(BinaryEncoding::Float64),
            _ => None,
        }
    }

    /// Byte width of one encoded value
    pub fn byte_size(&self) -> usize {
        match self {
            BinaryEncoding::Float32 => 4,
            BinaryEncoding::Float64 => 8,
        }
    }
}

/// Semantic role of a decoded array within its record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayRole {
    /// m/z values (spectra)
    Mz,
    /// Intensity values (spectra and chromatograms)
    Intensity,
    /// Time points (chromatograms)
    Time,
}

impl ArrayRole {
    /// Determine the role from a CV accession
    pub fn from_cv_accession(accession: &str) -> Option<Self> {
        match accession {
            accessions::MZ_ARRAY => Some(ArrayRole::Mz),
            accessions::INTENSITY_ARRAY => Some(ArrayRole::Intensity),
            accessions::TIME_ARRAY => Some(ArrayRole::Time),
            _ => None,
        }
    }
}

/// Errors that can occur during binary decoding
#[derive(Debug, thiserror::Error)]
pub enum BinaryDecodeError {
    /// The Base64 payload is malformed
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The compressed stream is corrupt or truncated
    #[error("decompression error: {0}")]
    Decompression(#[from] std::io::Error),

    /// The byte payload is not a whole number of encoded values
    #[error("payload of {actual} bytes is not a multiple of the {width}-byte element width")]
    MisalignedPayload {
        /// Decoded (and decompressed) payload size in bytes
        actual: usize,
        /// Element width implied by the precision term
        width: usize,
    },
}

/// One fully decoded binary data array
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryArray {
    /// Semantic role, when a role term was present
    pub role: Option<ArrayRole>,
    /// Unit name of the role term (meaningful for time arrays)
    pub unit_name: Option<String>,
    /// Source precision
    pub encoding: BinaryEncoding,
    /// Decoded values, widened to f64
    pub values: Vec<f64>,
}

/// Decoder for mzML binary data arrays
pub struct BinaryDecoder;

impl BinaryDecoder {
    /// Decode one `<binaryDataArray>` given its cvParams and Base64 payload.
    ///
    /// Precision, compression, and role are read from the sibling cvParams.
    /// A decoded length that differs from the record's declared array length
    /// is logged as a warning; the decoded values are still returned.
    pub fn decode_array(
        cv_params: &[CvParam],
        base64_data: &str,
        declared_length: usize,
    ) -> Result<BinaryArray, BinaryDecodeError> {
        let mut encoding = BinaryEncoding::default();
        let mut compression = Compression::default();
        let mut role = None;
        let mut unit_name = None;

        for cv in cv_params {
            if let Some(e) = BinaryEncoding::from_cv_accession(&cv.accession) {
                encoding = e;
            }
            if let Some(c) = Compression::from_cv_accession(&cv.accession) {
                compression = c;
            }
            if let Some(r) = ArrayRole::from_cv_accession(&cv.accession) {
                role = Some(r);
                unit_name = cv.unit_name.clone();
            }
        }

        let values = Self::decode(base64_data, encoding, compression)?;
        if values.len() != declared_length {
            warn!(
                "decoded {} values where the record declares {}",
                values.len(),
                declared_length
            );
        }

        Ok(BinaryArray {
            role,
            unit_name,
            encoding,
            values,
        })
    }

    /// Decode a Base64-encoded binary payload into f64 values.
    ///
    /// An empty payload decodes to an empty array. Malformed Base64 and
    /// corrupt or truncated compressed streams are fatal decode errors.
    pub fn decode(
        base64_data: &str,
        encoding: BinaryEncoding,
        compression: Compression,
    ) -> Result<Vec<f64>, BinaryDecodeError> {
        let trimmed = base64_data.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let decoded = BASE64_STANDARD.decode(trimmed)?;

        let uncompressed = match compression {
            Compression::None => decoded,
            Compression::Zlib => {
                let mut decoder = ZlibDecoder::new(&decoded[..]);
                let mut uncompressed = Vec::new();
                decoder.read_to_end(&mut uncompressed)?;
                uncompressed
            }
        };

        Self::bytes_to_floats(&uncompressed, encoding)
    }

    /// Unpack little-endian bytes into f64 values at the given precision
    fn bytes_to_floats(
        bytes: &[u8],
        encoding: BinaryEncoding,
    ) -> Result<Vec<f64>, BinaryDecodeError> {
        let width = encoding.byte_size();
        if bytes.len() % width != 0 {
            return Err(BinaryDecodeError::MisalignedPayload {
                actual: bytes.len(),
                width,
            });
        }

        let count = bytes.len() / width;
        let mut values = Vec::with_capacity(count);
        let mut cursor = std::io::Cursor::new(bytes);

        match encoding {
            BinaryEncoding::Float32 => {
                for _ in 0..count {
                    values.push(cursor.read_f32::<LittleEndian>()? as f64);
                }
            }
            BinaryEncoding::Float64 => {
                for _ in 0..count {
                    values.push(cursor.read_f64::<LittleEndian>()?);
                }
            }
        }

        Ok(values)
    }
}
