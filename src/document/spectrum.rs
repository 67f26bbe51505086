//! Spectrum builder: one extracted `<spectrum>` element in, one immutable
//! [`Spectrum`] out.
//!
//! The element is walked exactly once. cvParams are routed by the
//! substructure they belong to (spectrum, scan, selected ion, binary
//! array), numeric fields are coerced at their use site, and binary
//! arrays are decoded as their closing tag is reached.

use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::helpers::{get_attribute, parse_cv_param, require_attribute};
use super::MzMLError;
use crate::binary::{ArrayRole, BinaryDecoder};
use crate::cv_params::{accessions, f64_by_accession, lookup, param_by_accession, CvParam};
use crate::models::{Precursor, Spectrum};

/// cvParams and Base64 payload of one `<binaryDataArray>` being collected
#[derive(Debug, Default)]
pub(super) struct BinaryArrayContext {
    pub(super) cv_params: Vec<CvParam>,
    pub(super) base64_data: String,
}

/// Build a [`Spectrum`] from one extracted element.
///
/// `fallback_index` is the record's position in the document index, used
/// when the element lacks an `index` attribute.
pub(super) fn build_spectrum(xml: &[u8], fallback_index: i64) -> Result<Spectrum, MzMLError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let start = loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"spectrum" => break e.to_owned(),
            Event::Eof => {
                return Err(MzMLError::InvalidStructure(
                    "expected a <spectrum> element".to_string(),
                ))
            }
            _ => {}
        }
    };

    let id = require_attribute(&start, "id")?;
    let index = get_attribute(&start, "index")?
        .and_then(|s| s.parse().ok())
        .unwrap_or(fallback_index);
    let default_array_length = get_attribute(&start, "defaultArrayLength")?
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    let mut cv_params: Vec<CvParam> = Vec::new();
    let mut scan_params: Vec<CvParam> = Vec::new();
    let mut selected_ion_params: Vec<CvParam> = Vec::new();
    let mut spectrum_ref: Option<String> = None;
    let mut saw_precursor_list = false;

    let mut mz: Vec<f64> = Vec::new();
    let mut intensity: Vec<f64> = Vec::new();

    let mut depth = 1;
    let mut in_scan_list = false;
    let mut in_precursor_list = false;
    let mut in_selected_ion = false;
    let mut current_binary: Option<BinaryArrayContext> = None;

    buf.clear();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                depth += 1;
                match e.name().as_ref() {
                    b"cvParam" => {
                        let cv = parse_cv_param(e)?;
                        route_cv_param(
                            cv,
                            &mut current_binary,
                            in_selected_ion,
                            in_precursor_list,
                            in_scan_list,
                            &mut scan_params,
                            &mut selected_ion_params,
                            &mut cv_params,
                        );
                    }
                    b"scanList" => in_scan_list = true,
                    b"precursorList" => {
                        saw_precursor_list = true;
                        in_precursor_list = true;
                    }
                    b"precursor" => {
                        if spectrum_ref.is_none() {
                            spectrum_ref = get_attribute(e, "spectrumRef")?;
                        }
                    }
                    b"selectedIon" => in_selected_ion = true,
                    b"binaryDataArray" => {
                        current_binary = Some(BinaryArrayContext::default());
                    }
                    _ => {}
                }
            }
            Event::Empty(ref e) => match e.name().as_ref() {
                b"cvParam" => {
                    let cv = parse_cv_param(e)?;
                    route_cv_param(
                        cv,
                        &mut current_binary,
                        in_selected_ion,
                        in_precursor_list,
                        in_scan_list,
                        &mut scan_params,
                        &mut selected_ion_params,
                        &mut cv_params,
                    );
                }
                b"precursorList" => saw_precursor_list = true,
                _ => {}
            },
            Event::Text(ref t) => {
                if let Some(ref mut ctx) = current_binary {
                    // Base64 payloads may arrive as several text events
                    ctx.base64_data.push_str(&t.unescape()?);
                }
            }
            Event::End(ref e) => {
                depth -= 1;
                match e.name().as_ref() {
                    b"spectrum" => {
                        if depth == 0 {
                            break;
                        }
                    }
                    b"scanList" => in_scan_list = false,
                    b"precursorList" => in_precursor_list = false,
                    b"selectedIon" => in_selected_ion = false,
                    b"binaryDataArray" => {
                        if let Some(ctx) = current_binary.take() {
                            let array = BinaryDecoder::decode_array(
                                &ctx.cv_params,
                                &ctx.base64_data,
                                default_array_length,
                            )?;
                            match array.role {
                                Some(ArrayRole::Mz) => mz = array.values,
                                Some(ArrayRole::Intensity) => intensity = array.values,
                                other => {
                                    debug!("spectrum '{id}': ignoring array with role {other:?}")
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => {
                return Err(MzMLError::InvalidStructure(format!(
                    "unterminated <spectrum> element '{id}'"
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    let ms_level = lookup(&cv_params, "ms level", accessions::MS_LEVEL)
        .and_then(CvParam::value_as_i64)
        .ok_or_else(|| {
            MzMLError::InvalidStructure(format!("spectrum '{id}' is missing its ms level"))
        })? as i16;

    let lowest_mz = lookup(&cv_params, "lowest observed m/z", accessions::LOWEST_OBSERVED_MZ)
        .and_then(CvParam::value_as_f64);
    let highest_mz = lookup(
        &cv_params,
        "highest observed m/z",
        accessions::HIGHEST_OBSERVED_MZ,
    )
    .and_then(CvParam::value_as_f64);
    let total_ion_current = lookup(&cv_params, "total ion current", accessions::TOTAL_ION_CURRENT)
        .and_then(CvParam::value_as_f64)
        .map(|v| v as i64);
    let base_peak_mz =
        lookup(&cv_params, "base peak m/z", accessions::BASE_PEAK_MZ).and_then(CvParam::value_as_f64);
    let base_peak_intensity = lookup(
        &cv_params,
        "base peak intensity",
        accessions::BASE_PEAK_INTENSITY,
    )
    .and_then(CvParam::value_as_f64);

    let scan_time = param_by_accession(&scan_params, accessions::SCAN_START_TIME);
    let retention_time = scan_time.and_then(CvParam::value_as_f64);
    let retention_time_unit = scan_time.and_then(|p| p.unit_name.clone());

    let precursor = if saw_precursor_list {
        Some(Precursor {
            spectrum_ref,
            selected_ion_mz: f64_by_accession(&selected_ion_params, accessions::SELECTED_ION_MZ),
            selected_ion_intensity: f64_by_accession(
                &selected_ion_params,
                accessions::PEAK_INTENSITY,
            ),
        })
    } else {
        None
    };

    Ok(Spectrum {
        id,
        index,
        default_array_length,
        ms_level,
        lowest_mz,
        highest_mz,
        total_ion_current,
        base_peak_mz,
        base_peak_intensity,
        retention_time,
        retention_time_unit,
        precursor,
        mz,
        intensity,
        cv_params,
    })
}

/// Route a cvParam to the substructure it annotates. Innermost scope wins;
/// precursor-level params outside the selected ion (isolation window,
/// activation) are not modeled and are dropped.
#[allow(clippy::too_many_arguments)]
fn route_cv_param(
    cv: CvParam,
    current_binary: &mut Option<BinaryArrayContext>,
    in_selected_ion: bool,
    in_precursor_list: bool,
    in_scan_list: bool,
    scan_params: &mut Vec<CvParam>,
    selected_ion_params: &mut Vec<CvParam>,
    spectrum_params: &mut Vec<CvParam>,
) {
    if let Some(ctx) = current_binary {
        ctx.cv_params.push(cv);
    } else if in_selected_ion {
        selected_ion_params.push(cv);
    } else if in_precursor_list {
        // not modeled
    } else if in_scan_list {
        scan_params.push(cv);
    } else {
        spectrum_params.push(cv);
    }
}
