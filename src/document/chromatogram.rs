//! Chromatogram builder, the spectrum builder's simpler sibling: no scan
//! or precursor substructure, and the time array's unit is captured from
//! its role term.

use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::helpers::{get_attribute, parse_cv_param, require_attribute};
use super::spectrum::BinaryArrayContext;
use super::MzMLError;
use crate::binary::{ArrayRole, BinaryDecoder};
use crate::cv_params::CvParam;
use crate::models::Chromatogram;

/// Build a [`Chromatogram`] from one extracted element.
pub(super) fn build_chromatogram(
    xml: &[u8],
    fallback_index: i64,
) -> Result<Chromatogram, MzMLError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let start = loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"chromatogram" => break e.to_owned(),
            Event::Eof => {
                return Err(MzMLError::InvalidStructure(
                    "expected a <chromatogram> element".to_string(),
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
    let mut time: Vec<f64> = Vec::new();
    let mut intensity: Vec<f64> = Vec::new();
    let mut time_unit: Option<String> = None;

    let mut depth = 1;
    let mut current_binary: Option<BinaryArrayContext> = None;

    buf.clear();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                depth += 1;
                match e.name().as_ref() {
                    b"cvParam" => {
                        let cv = parse_cv_param(e)?;
                        match current_binary {
                            Some(ref mut ctx) => ctx.cv_params.push(cv),
                            None => cv_params.push(cv),
                        }
                    }
                    b"binaryDataArray" => {
                        current_binary = Some(BinaryArrayContext::default());
                    }
                    _ => {}
                }
            }
            Event::Empty(ref e) => {
                if e.name().as_ref() == b"cvParam" {
                    let cv = parse_cv_param(e)?;
                    match current_binary {
                        Some(ref mut ctx) => ctx.cv_params.push(cv),
                        None => cv_params.push(cv),
                    }
                }
            }
            Event::Text(ref t) => {
                if let Some(ref mut ctx) = current_binary {
                    ctx.base64_data.push_str(&t.unescape()?);
                }
            }
            Event::End(ref e) => {
                depth -= 1;
                match e.name().as_ref() {
                    b"chromatogram" => {
                        if depth == 0 {
                            break;
                        }
                    }
                    b"binaryDataArray" => {
                        if let Some(ctx) = current_binary.take() {
                            let array = BinaryDecoder::decode_array(
                                &ctx.cv_params,
                                &ctx.base64_data,
                                default_array_length,
                            )?;
                            match array.role {
                                Some(ArrayRole::Time) => {
                                    time_unit = array.unit_name;
                                    time = array.values;
                                }
                                Some(ArrayRole::Intensity) => intensity = array.values,
                                other => {
                                    debug!(
                                        "chromatogram '{id}': ignoring array with role {other:?}"
                                    )
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => {
                return Err(MzMLError::InvalidStructure(format!(
                    "unterminated <chromatogram> element '{id}'"
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(Chromatogram {
        id,
        index,
        default_array_length,
        time_unit,
        time,
        intensity,
        cv_params,
    })
}
