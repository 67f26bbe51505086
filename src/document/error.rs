use std::path::PathBuf;

/// Errors surfaced by the document reader
#[derive(Debug, thiserror::Error)]
pub enum MzMLError {
    /// The file does not carry the mzML extension
    #[error("unsupported file format: {} (expected an .mzML file)", .path.display())]
    UnsupportedFormat {
        /// Path that was rejected
        path: PathBuf,
    },

    /// The requested record ID is not in the index
    #[error("invalid identifier '{id}'")]
    BadIdentifier {
        /// The ID that missed
        id: String,
    },

    /// A record's closing tag was not found before end of file
    #[error("corrupt record '{id}' at offset {offset}: no closing tag before end of file")]
    CorruptElement {
        /// Native ID of the record being extracted
        id: String,
        /// Byte offset the extraction started from
        offset: u64,
    },

    /// Neither the trailing index nor a full scan found any records
    #[error("no spectrum or chromatogram records found in {}", .path.display())]
    NoRecords {
        /// Path of the offending file
        path: PathBuf,
    },

    /// Error decoding a binary data array
    #[error("binary decode error: {0}")]
    Decode(#[from] crate::binary::BinaryDecodeError),

    /// Error parsing XML
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required XML attribute is missing
    #[error("missing required attribute: {0}")]
    MissingAttribute(String),

    /// Invalid mzML document structure
    #[error("invalid mzML structure: {0}")]
    InvalidStructure(String),

    /// UTF-8 encoding error in text content
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}
