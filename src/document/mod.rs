//! The document handle: random access to one mzML file.
//!
//! A [`Document`] owns its file handle and the byte-offset index built at
//! open time. Records are materialized on request: look the ID up in the
//! index, seek to its offset, stream the element's exact substring, and
//! parse that substring once into an immutable value. Repeated fetches
//! re-parse; nothing is cached.
//!
//! The index is computed once and never mutated. Methods that fetch take
//! `&mut self` because seek-then-read on the shared cursor is a two-step
//! sequence; open a second `Document` on the same path for concurrent use.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::models::{Chromatogram, RunIndex, Spectrum};

pub use error::MzMLError;
pub use iterators::SpectrumIter;

mod chromatogram;
mod error;
mod extract;
mod helpers;
mod index;
mod iterators;
mod spectrum;


/// The two record kinds an mzML run contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecordKind {
    Spectrum,
    Chromatogram,
}

impl RecordKind {
    /// Opening tag name, `<` included
    pub(crate) fn opening_tag(self) -> &'static [u8] {
        match self {
            RecordKind::Spectrum => b"<spectrum",
            RecordKind::Chromatogram => b"<chromatogram",
        }
    }

    /// Full closing tag
    pub(crate) fn closing_tag(self) -> &'static [u8] {
        match self {
            RecordKind::Spectrum => b"</spectrum>",
            RecordKind::Chromatogram => b"</chromatogram>",
        }
    }
}

/// An open, indexed mzML document
#[derive(Debug)]
pub struct Document {
    file: File,
    path: PathBuf,
    index: RunIndex,
}

impl Document {
    /// Open an mzML file and build its record index.
    ///
    /// Fails with [`MzMLError::UnsupportedFormat`] when the path does not
    /// carry the `.mzML` extension, and with [`MzMLError::NoRecords`] when
    /// neither the trailing index nor a full scan finds any records.
    ///
    /// # Example
    /// ```rust,no_run
    /// use mzseek::Document;
    ///
    /// let doc = Document::open("run.mzML")?;
    /// println!("{} spectra", doc.spectrum_count());
    /// # Ok::<(), mzseek::MzMLError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MzMLError> {
        let path = path.as_ref();
        let recognized = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("mzml"));
        if !recognized {
            return Err(MzMLError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }

        let mut file = File::open(path)?;
        let index = index::resolve(&mut file)?;
        if index.is_empty() {
            return Err(MzMLError::NoRecords {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
            index,
        })
    }

    /// Path this document was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The byte-offset index built at open time
    pub fn index(&self) -> &RunIndex {
        &self.index
    }

    /// Number of indexed spectra
    pub fn spectrum_count(&self) -> usize {
        self.index.spectrum_count()
    }

    /// Number of indexed chromatograms
    pub fn chromatogram_count(&self) -> usize {
        self.index.chromatogram_count()
    }

    /// Spectrum IDs in file-occurrence order
    pub fn spectrum_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.index.spectrum_ids()
    }

    /// Chromatogram IDs in file-occurrence order
    pub fn chromatogram_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.index.chromatogram_ids()
    }

    /// Fetch one spectrum by its native ID.
    ///
    /// An unknown ID fails with [`MzMLError::BadIdentifier`] and leaves the
    /// document usable.
    pub fn spectrum(&mut self, id: &str) -> Result<Spectrum, MzMLError> {
        let (offset, position) =
            self.index
                .spectrum_entry(id)
                .ok_or_else(|| MzMLError::BadIdentifier {
                    id: id.to_string(),
                })?;
        let element =
            extract::extract_element(&mut self.file, offset, RecordKind::Spectrum, id)?;
        spectrum::build_spectrum(&element, position as i64)
    }

    /// Fetch one chromatogram by its native ID.
    pub fn chromatogram(&mut self, id: &str) -> Result<Chromatogram, MzMLError> {
        let (offset, position) =
            self.index
                .chromatogram_entry(id)
                .ok_or_else(|| MzMLError::BadIdentifier {
                    id: id.to_string(),
                })?;
        let element =
            extract::extract_element(&mut self.file, offset, RecordKind::Chromatogram, id)?;
        chromatogram::build_chromatogram(&element, position as i64)
    }

    /// Iterate over all spectra lazily, in file-occurrence order.
    ///
    /// Calling this again restarts from the first identifier, independent
    /// of any previous partial iteration.
    ///
    /// # Example
    /// ```rust,no_run
    /// use mzseek::Document;
    ///
    /// let mut doc = Document::open("run.mzML")?;
    /// for spectrum in doc.spectra() {
    ///     let spectrum = spectrum?;
    ///     println!("{}: {} peaks", spectrum.id, spectrum.peak_count());
    /// }
    /// # Ok::<(), mzseek::MzMLError>(())
    /// ```
    pub fn spectra(&mut self) -> SpectrumIter<'_> {
        SpectrumIter {
            document: self,
            position: 0,
        }
    }
}
