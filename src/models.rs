//! Data models for mzML records
//!
//! These models are immutable value snapshots: once a builder returns one,
//! it holds no reference to the source document or its file handle.

use std::collections::HashMap;

use crate::cv_params::CvParam;

/// A single spectrum, fully decoded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spectrum {
    /// Native spectrum ID from the file
    pub id: String,

    /// Positional index (0-based order of occurrence)
    pub index: i64,

    /// Declared array length (number of peaks)
    pub default_array_length: usize,

    /// MS level (1 for MS1, 2 for MS2, ...)
    pub ms_level: i16,

    /// Lowest observed m/z
    pub lowest_mz: Option<f64>,

    /// Highest observed m/z
    pub highest_mz: Option<f64>,

    /// Total ion current
    pub total_ion_current: Option<i64>,

    /// Base peak m/z
    pub base_peak_mz: Option<f64>,

    /// Base peak intensity
    pub base_peak_intensity: Option<f64>,

    /// Retention time, as declared by the scan
    pub retention_time: Option<f64>,

    /// Unit of the retention time (e.g. "second", "minute")
    pub retention_time_unit: Option<String>,

    /// Precursor information. `None` when the spectrum has no precursor
    /// list; never defaulted to zeroes.
    pub precursor: Option<Precursor>,

    /// m/z values
    pub mz: Vec<f64>,

    /// Intensity values, index-aligned with `mz`
    pub intensity: Vec<f64>,

    /// All CV parameters attached directly to the spectrum element
    pub cv_params: Vec<CvParam>,
}

impl Spectrum {
    /// Number of decoded peaks
    pub fn peak_count(&self) -> usize {
        self.mz.len()
    }

    /// Whether precursor information is present
    pub fn has_precursor(&self) -> bool {
        self.precursor.is_some()
    }

    /// The scan number embedded in the native ID, if any
    pub fn scan_number(&self) -> Option<i64> {
        scan_number(&self.id)
    }
}

/// Parse the scan number out of a native spectrum ID.
///
/// Common shapes:
/// - `scan=12345`
/// - `controllerType=0 controllerNumber=1 scan=12345`
/// - `S12345`
///
/// Identifiers without a recognizable scan suffix yield `None`; no ordering
/// beyond file occurrence is implied for them.
pub fn scan_number(id: &str) -> Option<i64> {
    if let Some(pos) = id.find("scan=") {
        let start = pos + 5;
        let end = id[start..]
            .find(|c: char| !c.is_ascii_digit())
            .map(|i| start + i)
            .unwrap_or(id.len());
        id[start..end].parse().ok()
    } else if let Some(rest) = id.strip_prefix('S') {
        rest.parse().ok()
    } else {
        None
    }
}

/// Precursor ion information for MS2+ spectra.
///
/// Fields stay `None` when the file does not state them; absence is
/// meaningful to consumers that skip non-precursor records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Precursor {
    /// Native ID of the parent spectrum, when referenced
    pub spectrum_ref: Option<String>,

    /// Selected ion m/z
    pub selected_ion_mz: Option<f64>,

    /// Selected ion intensity
    pub selected_ion_intensity: Option<f64>,
}

/// A single chromatogram, fully decoded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chromatogram {
    /// Native chromatogram ID from the file
    pub id: String,

    /// Positional index (0-based order of occurrence)
    pub index: i64,

    /// Declared array length (number of time points)
    pub default_array_length: usize,

    /// Unit of the time axis (e.g. "second", "minute")
    pub time_unit: Option<String>,

    /// Time points
    pub time: Vec<f64>,

    /// Intensity values, index-aligned with `time`
    pub intensity: Vec<f64>,

    /// All CV parameters attached directly to the chromatogram element
    pub cv_params: Vec<CvParam>,
}

/// One entry of the byte-offset index: a native ID and the offset of the
/// record's opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Native record ID
    pub id: String,
    /// Byte offset of the `<` of the opening tag
    pub offset: u64,
}

/// The byte-offset index of one open document: spectrum and chromatogram
/// entries in file-occurrence order, with ID lookup tables built once.
///
/// Immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct RunIndex {
    spectra: Vec<IndexEntry>,
    chromatograms: Vec<IndexEntry>,
    spectrum_lookup: HashMap<String, usize>,
    chromatogram_lookup: HashMap<String, usize>,
}

impl RunIndex {
    pub(crate) fn new(spectra: Vec<IndexEntry>, chromatograms: Vec<IndexEntry>) -> Self {
        let mut spectrum_lookup = HashMap::with_capacity(spectra.len());
        for (pos, entry) in spectra.iter().enumerate() {
            spectrum_lookup.entry(entry.id.clone()).or_insert(pos);
        }
        let mut chromatogram_lookup = HashMap::with_capacity(chromatograms.len());
        for (pos, entry) in chromatograms.iter().enumerate() {
            chromatogram_lookup.entry(entry.id.clone()).or_insert(pos);
        }
        Self {
            spectra,
            chromatograms,
            spectrum_lookup,
            chromatogram_lookup,
        }
    }

    /// Spectrum entries in file-occurrence order
    pub fn spectrum_entries(&self) -> &[IndexEntry] {
        &self.spectra
    }

    /// Chromatogram entries in file-occurrence order
    pub fn chromatogram_entries(&self) -> &[IndexEntry] {
        &self.chromatograms
    }

    /// Spectrum IDs in file-occurrence order
    pub fn spectrum_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.spectra.iter().map(|e| e.id.as_str())
    }

    /// Chromatogram IDs in file-occurrence order
    pub fn chromatogram_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.chromatograms.iter().map(|e| e.id.as_str())
    }

    /// Number of indexed spectra
    pub fn spectrum_count(&self) -> usize {
        self.spectra.len()
    }

    /// Number of indexed chromatograms
    pub fn chromatogram_count(&self) -> usize {
        self.chromatograms.len()
    }

    /// Whether the index holds no records of either kind
    pub fn is_empty(&self) -> bool {
        self.spectra.is_empty() && self.chromatograms.is_empty()
    }

    /// Byte offset and position of a spectrum, by ID
    pub(crate) fn spectrum_entry(&self, id: &str) -> Option<(u64, usize)> {
        let pos = *self.spectrum_lookup.get(id)?;
        Some((self.spectra[pos].offset, pos))
    }

    /// Byte offset and position of a chromatogram, by ID
    pub(crate) fn chromatogram_entry(&self, id: &str) -> Option<(u64, usize)> {
        let pos = *self.chromatogram_lookup.get(id)?;
        Some((self.chromatograms[pos].offset, pos))
    }
}
