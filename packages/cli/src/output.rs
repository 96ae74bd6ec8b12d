//! CSV writers for the pipeline's artifacts.
//!
//! Every stage ends in a flat CSV so its output can be inspected, or
//! fed back into a later stage, without rerunning the pipeline. Cells
//! use Rust's default float formatting, so whole-number counts print
//! without a decimal point.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use brew_map_geocoder::LocationRecord;
use brew_map_geography_models::{CountryCodes, StateCodes};
use brew_map_provenance::{MonthlyMatrix, ProvenanceRow, StateMatrix, WORLD};
use brew_map_review_models::OpeningCount;
use serde::{Deserialize, Serialize};

/// One row of the resolved-location table.
#[derive(Debug, Serialize, Deserialize)]
struct LocationRow {
    location: String,
    address: String,
    latitude: f64,
    longitude: f64,
}

/// Writes the resolved-location table, one row per location string.
///
/// # Errors
///
/// Returns an error if the destination cannot be created or written.
pub fn write_locations(
    path: &Path,
    records: &BTreeMap<String, LocationRecord>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    write_locations_to(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

fn write_locations_to<W: io::Write>(
    writer: &mut csv::Writer<W>,
    records: &BTreeMap<String, LocationRecord>,
) -> Result<(), csv::Error> {
    for (location, record) in records {
        writer.serialize(LocationRow {
            location: location.clone(),
            address: record.address.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
        })?;
    }
    Ok(())
}

/// Reads a resolved-location table back into memory.
///
/// Rows that fail to parse are skipped and counted, the same treatment
/// the loaders give the raw exports.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub fn read_locations(
    path: &Path,
) -> Result<BTreeMap<String, LocationRecord>, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    Ok(read_locations_from(&mut reader))
}

fn read_locations_from<R: io::Read>(
    reader: &mut csv::Reader<R>,
) -> BTreeMap<String, LocationRecord> {
    let mut records = BTreeMap::new();
    let mut malformed = 0u64;
    for row in reader.deserialize::<LocationRow>() {
        match row {
            Ok(row) => {
                records.insert(
                    row.location,
                    LocationRecord {
                        address: row.address,
                        latitude: row.latitude,
                        longitude: row.longitude,
                    },
                );
            }
            Err(e) => {
                log::debug!("  skipping malformed location row: {e}");
                malformed += 1;
            }
        }
    }
    if malformed > 0 {
        log::warn!("skipped {malformed} malformed location rows");
    }
    records
}

/// Writes an adjacency matrix as `state,<states...>` plus a trailing
/// `World` column when the matrix carries one. With `codes`, a postal
/// abbreviation column follows the state name.
///
/// # Errors
///
/// Returns an error if the destination cannot be created or written.
pub fn write_matrix(
    path: &Path,
    matrix: &StateMatrix,
    codes: Option<&StateCodes>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    write_matrix_to(&mut writer, matrix, codes)?;
    writer.flush()?;
    Ok(())
}

fn write_matrix_to<W: io::Write>(
    writer: &mut csv::Writer<W>,
    matrix: &StateMatrix,
    codes: Option<&StateCodes>,
) -> Result<(), csv::Error> {
    let mut header = vec!["state".to_string()];
    if codes.is_some() {
        header.push("code".to_string());
    }
    header.extend(matrix.states().iter().cloned());
    if matrix.has_world() {
        header.push(WORLD.to_string());
    }
    writer.write_record(&header)?;

    for state in matrix.states() {
        let mut record = vec![state.clone()];
        if let Some(codes) = codes {
            record.push(codes.code(state).unwrap_or_default().to_string());
        }
        let row = matrix.row(state).unwrap_or_default();
        record.extend(row.iter().map(ToString::to_string));
        writer.write_record(&record)?;
    }
    Ok(())
}

/// Writes a monthly series in long format: one row per month and
/// reviewer state, columns `month,state,<states...>,World`.
///
/// Every matrix in a series shares one label set, so the header comes
/// from the first entry. An empty series writes an empty file.
///
/// # Errors
///
/// Returns an error if the destination cannot be created or written.
pub fn write_monthly(
    path: &Path,
    months: &[MonthlyMatrix],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    write_monthly_to(&mut writer, months)?;
    writer.flush()?;
    Ok(())
}

fn write_monthly_to<W: io::Write>(
    writer: &mut csv::Writer<W>,
    months: &[MonthlyMatrix],
) -> Result<(), csv::Error> {
    let Some(first) = months.first() else {
        return Ok(());
    };

    let mut header = vec!["month".to_string(), "state".to_string()];
    header.extend(first.matrix.states().iter().cloned());
    if first.matrix.has_world() {
        header.push(WORLD.to_string());
    }
    writer.write_record(&header)?;

    for entry in months {
        let month = entry.month.to_string();
        for state in entry.matrix.states() {
            let mut record = vec![month.clone(), state.clone()];
            let row = entry.matrix.row(state).unwrap_or_default();
            record.extend(row.iter().map(ToString::to_string));
            writer.write_record(&record)?;
        }
    }
    Ok(())
}

/// Writes provenance rows as
/// `<label>,local_count,national_count,foreign_count`. The label
/// column is named by the caller since rows may be keyed by state or
/// by month. With `codes`, a postal abbreviation column follows the
/// label.
///
/// # Errors
///
/// Returns an error if the destination cannot be created or written.
pub fn write_counts(
    path: &Path,
    label_header: &str,
    rows: &[ProvenanceRow],
    codes: Option<&StateCodes>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    write_counts_to(&mut writer, label_header, rows, codes)?;
    writer.flush()?;
    Ok(())
}

fn write_counts_to<W: io::Write>(
    writer: &mut csv::Writer<W>,
    label_header: &str,
    rows: &[ProvenanceRow],
    codes: Option<&StateCodes>,
) -> Result<(), csv::Error> {
    let mut header = vec![label_header.to_string()];
    if codes.is_some() {
        header.push("code".to_string());
    }
    header.extend(["local_count", "national_count", "foreign_count"].map(String::from));
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.label.clone()];
        if let Some(codes) = codes {
            record.push(codes.code(&row.label).unwrap_or_default().to_string());
        }
        record.push(row.local_count.to_string());
        record.push(row.national_count.to_string());
        record.push(row.foreign_count.to_string());
        writer.write_record(&record)?;
    }
    Ok(())
}

/// Writes the brewery opening series as `month,count,cumulative`.
///
/// # Errors
///
/// Returns an error if the destination cannot be created or written.
pub fn write_openings(
    path: &Path,
    counts: &[OpeningCount],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    write_openings_to(&mut writer, counts)?;
    writer.flush()?;
    Ok(())
}

fn write_openings_to<W: io::Write>(
    writer: &mut csv::Writer<W>,
    counts: &[OpeningCount],
) -> Result<(), csv::Error> {
    writer.write_record(["month", "count", "cumulative"])?;
    for entry in counts {
        writer.write_record([
            entry.month.to_string(),
            entry.count.to_string(),
            entry.cumulative.to_string(),
        ])?;
    }
    Ok(())
}

/// Writes the country breakdown behind the `World` column as
/// `country,code,reviews`, the code an ISO 3166-1 alpha-3 where the
/// country is recognized and blank otherwise.
///
/// # Errors
///
/// Returns an error if the destination cannot be created or written.
pub fn write_countries(
    path: &Path,
    counts: &BTreeMap<String, u64>,
    codes: &CountryCodes,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    write_countries_to(&mut writer, counts, codes)?;
    writer.flush()?;
    Ok(())
}

fn write_countries_to<W: io::Write>(
    writer: &mut csv::Writer<W>,
    counts: &BTreeMap<String, u64>,
    codes: &CountryCodes,
) -> Result<(), csv::Error> {
    writer.write_record(["country", "code", "reviews"])?;
    for (country, reviews) in counts {
        writer.write_record([
            country.clone(),
            codes.alpha3(country).unwrap_or_default().to_string(),
            reviews.to_string(),
        ])?;
    }
    Ok(())
}
