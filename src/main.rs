//! # mzml2mgf
//!
//! A command-line tool that renders the MS2+ spectra of an mzML file as an
//! MGF peak list on standard output.
//!
//! Spectra are emitted in scan-number order (the numeric suffix of the
//! native ID), matching the ordering of common converters. Spectra without
//! precursor information are skipped, as MGF describes fragment spectra.
//!
//! ## Usage
//!
//! ```bash
//! mzml2mgf input.mzML > output.mgf
//! ```

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use mzseek::{scan_number, Document};

/// Render the MS2+ spectra of an mzML file as an MGF peak list
#[derive(Parser)]
#[command(name = "mzml2mgf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input mzML file path
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut doc = Document::open(&cli.input)
        .with_context(|| format!("failed to open {}", cli.input.display()))?;
    info!(
        "{}: {} spectra, {} chromatograms",
        cli.input.display(),
        doc.spectrum_count(),
        doc.chromatogram_count()
    );

    let mut ids: Vec<String> = doc.spectrum_ids().map(str::to_owned).collect();
    ids.sort_by_key(|id| scan_number(id));

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut written = 0usize;

    for id in &ids {
        let spectrum = doc
            .spectrum(id)
            .with_context(|| format!("failed to read spectrum '{id}'"))?;

        let Some(precursor) = &spectrum.precursor else {
            continue;
        };

        writeln!(out, "BEGIN IONS")?;
        writeln!(out, "TITLE={}", spectrum.id)?;
        if let Some(rt) = spectrum.retention_time {
            writeln!(out, "RTINSECONDS={rt}")?;
        }
        if let Some(mass) = precursor.selected_ion_mz {
            match precursor.selected_ion_intensity {
                Some(intensity) => writeln!(out, "PEPMASS={mass} {intensity}")?,
                None => writeln!(out, "PEPMASS={mass}")?,
            }
        }
        for (mz, intensity) in spectrum.mz.iter().zip(&spectrum.intensity) {
            writeln!(out, "{mz} {intensity}")?;
        }
        writeln!(out, "END IONS")?;
        written += 1;
    }

    out.flush()?;
    info!("wrote {written} MGF entries");
    Ok(())
}
