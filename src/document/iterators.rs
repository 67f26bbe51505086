use super::{Document, MzMLError};
use crate::models::Spectrum;

/// Lazy iterator over all spectra of a [`Document`], in file-occurrence
/// order.
///
/// Each step seeks, extracts, and builds one spectrum; nothing is cached.
/// Obtain a fresh iterator from [`Document::spectra`] to restart from the
/// first identifier.
pub struct SpectrumIter<'a> {
    pub(super) document: &'a mut Document,
    pub(super) position: usize,
}

impl Iterator for SpectrumIter<'_> {
    type Item = Result<Spectrum, MzMLError>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self
            .document
            .index()
            .spectrum_entries()
            .get(self.position)?
            .id
            .clone();
        self.position += 1;
        Some(self.document.spectrum(&id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .document
            .index()
            .spectrum_count()
            .saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SpectrumIter<'_> {}
