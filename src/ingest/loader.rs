//! CSV reader and per-field normalization.
//!
//! Columns are located by header name so column order in the source file does
//! not matter. Date and currency parsing failures are handled per record
//! according to [`MalformedPolicy`]; everything else passes through untouched.

use super::models::{LoadSummary, MalformedPolicy, NormalizedMovie};
use crate::error::EtlError;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// Headers the source file must carry, matched exactly.
pub const REQUIRED_HEADERS: [&str; 8] = [
    "Title",
    "Release_Date",
    "Genre",
    "Director1",
    "Cast1",
    "Cast2",
    "Budget",
    "Revenue",
];

/// Day-month-year formats accepted for Release_Date.
const DATE_FORMATS: [&str; 2] = ["%d-%m-%Y", "%d/%m/%Y"];

/// Currency symbols stripped from the front of Budget/Revenue values.
const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '₹'];

/// Read `csv_path` and normalize every record, preserving file order.
pub fn load_movies(
    csv_path: &Path,
    policy: MalformedPolicy,
) -> Result<(Vec<NormalizedMovie>, LoadSummary)> {
    let file = File::open(csv_path)
        .with_context(|| format!("Failed to open movie CSV: {:?}", csv_path))?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV headers: {:?}", csv_path))?
        .clone();
    let header_map = build_header_map(&headers);

    for name in REQUIRED_HEADERS {
        if !header_map.contains_key(name) {
            bail!("CSV {:?} is missing required column '{}'", csv_path, name);
        }
    }

    let mut movies = Vec::new();
    let mut summary = LoadSummary::default();

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1, so the first record is line 2.
        let line = idx + 2;
        let record =
            result.with_context(|| format!("CSV parse error at {:?} line {}", csv_path, line))?;
        summary.rows_read += 1;

        let movie = normalize_record(&record, &header_map, line, policy, &mut summary)?;
        movies.push(movie);
    }

    debug!(
        rows = summary.rows_read,
        malformed = summary.malformed_fields(),
        "finished reading {:?}",
        csv_path
    );
    Ok((movies, summary))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        // Excel-style UTF-8 exports can prefix the first header with a BOM.
        .map(|(idx, name)| (name.trim_start_matches('\u{feff}').to_string(), idx))
        .collect()
}

fn field<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> &'a str {
    header_map
        .get(name)
        .and_then(|idx| record.get(*idx))
        .unwrap_or("")
}

fn normalize_record(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    line: usize,
    policy: MalformedPolicy,
    summary: &mut LoadSummary,
) -> Result<NormalizedMovie> {
    let release_date = match parse_release_date(field(record, header_map, "Release_Date"), line) {
        Ok(date) => date,
        Err(e) => {
            if policy == MalformedPolicy::Reject {
                return Err(e.into());
            }
            warn!("{e}; storing NULL");
            summary.malformed_dates += 1;
            None
        }
    };

    let budget = match parse_amount(field(record, header_map, "Budget"), "Budget", line) {
        Ok(amount) => amount,
        Err(e) => {
            if policy == MalformedPolicy::Reject {
                return Err(e.into());
            }
            warn!("{e}; storing NULL");
            summary.malformed_budgets += 1;
            None
        }
    };

    let revenue = match parse_amount(field(record, header_map, "Revenue"), "Revenue", line) {
        Ok(amount) => amount,
        Err(e) => {
            if policy == MalformedPolicy::Reject {
                return Err(e.into());
            }
            warn!("{e}; storing NULL");
            summary.malformed_revenues += 1;
            None
        }
    };

    Ok(NormalizedMovie {
        title: field(record, header_map, "Title").to_string(),
        release_date,
        genre: field(record, header_map, "Genre").to_string(),
        director1: field(record, header_map, "Director1").to_string(),
        cast1: field(record, header_map, "Cast1").to_string(),
        cast2: field(record, header_map, "Cast2").to_string(),
        budget,
        revenue,
    })
}

/// Parse a day-month-year date. An empty value is missing, not malformed.
fn parse_release_date(value: &str, line: usize) -> Result<Option<NaiveDate>, EtlError> {
    if value.is_empty() {
        return Ok(None);
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(Some(date));
        }
    }
    Err(EtlError::MalformedDate {
        line,
        value: value.to_string(),
    })
}

/// Parse a currency amount like `$1,234,567` into its numeric value.
///
/// An empty value is missing, not malformed. The result must be a finite,
/// non-negative number.
fn parse_amount(
    value: &str,
    field: &'static str,
    line: usize,
) -> Result<Option<f64>, EtlError> {
    if value.is_empty() {
        return Ok(None);
    }

    let stripped: String = value
        .strip_prefix(&CURRENCY_SYMBOLS[..])
        .unwrap_or(value)
        .chars()
        .filter(|c| *c != ',')
        .collect();

    match stripped.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(Some(amount)),
        _ => Err(EtlError::MalformedCurrency {
            line,
            field,
            value: value.to_string(),
        }),
    }
}
