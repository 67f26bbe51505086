//! # mzseek - Indexed Random Access to mzML Files
//!
//! `mzseek` reads mzML, the XML-based community standard for mass
//! spectrometry data defined by HUPO-PSI, without ever loading a whole file
//! into memory. It resolves (or reconstructs) the byte-offset index that
//! indexed mzML files carry near end of file, then materializes individual
//! spectra and chromatograms on demand by seeking straight to them.
//!
//! ## Design Goals
//!
//! - **Random access**: Fetch any record by its native ID with O(1) seeks
//!   once the index is resolved.
//! - **Lazy**: A record is parsed and its binary arrays decoded only when
//!   asked for; fetched records are plain immutable values.
//! - **Index-optional**: A missing or malformed trailing index degrades to
//!   a single linear scan, never to a failure. Index presence changes
//!   performance, not results.
//! - **Bounded memory**: Indexing and extraction both stream fixed-size
//!   chunks, so memory scales with one record, not the file.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mzseek::Document;
//!
//! let mut doc = Document::open("run.mzML")?;
//!
//! // Random access by native ID
//! let ids: Vec<String> = doc.spectrum_ids().map(str::to_owned).collect();
//! let spectrum = doc.spectrum(&ids[0])?;
//! println!(
//!     "{}: MS{} with {} peaks",
//!     spectrum.id,
//!     spectrum.ms_level,
//!     spectrum.peak_count()
//! );
//!
//! // Lazy sequential iteration in file order
//! for spectrum in doc.spectra() {
//!     let spectrum = spectrum?;
//!     if let Some(precursor) = &spectrum.precursor {
//!         println!("precursor m/z: {:?}", precursor.selected_ion_mz);
//!     }
//! }
//!
//! // Chromatograms work the same way
//! let tic = doc.chromatogram("TIC")?;
//! assert_eq!(tic.time.len(), tic.intensity.len());
//! # Ok::<(), mzseek::MzMLError>(())
//! ```
//!
//! ## mzML Structure
//!
//! ```text
//! indexedmzML (optional wrapper)
//! └── mzML
//!     └── run
//!         ├── spectrumList
//!         │   └── spectrum* (many)
//!         │       ├── cvParam*
//!         │       ├── scanList
//!         │       ├── precursorList (for MS2+)
//!         │       └── binaryDataArrayList
//!         │           └── binaryDataArray*
//!         │               ├── cvParam* (precision, compression, role)
//!         │               └── binary (base64 payload)
//!         └── chromatogramList (optional)
//! ├── indexList (byte offsets keyed by record ID)
//! └── indexListOffset
//! ```
//!
//! ## Concurrency
//!
//! A `Document` owns a single file cursor, so its fetching methods take
//! `&mut self` and are not meant for concurrent use on one instance. Open
//! one `Document` per thread instead; fetched records are immutable and
//! freely shareable.

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod binary;
pub mod cv_params;
pub mod document;
pub mod models;

pub use binary::{ArrayRole, BinaryArray, BinaryDecodeError, BinaryDecoder, BinaryEncoding, Compression};
pub use cv_params::CvParam;
pub use document::{Document, MzMLError, SpectrumIter};
pub use models::{scan_number, Chromatogram, IndexEntry, Precursor, RunIndex, Spectrum};
