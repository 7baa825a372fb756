use crate::config::AppConfig;
use crate::error::LoadError;
use crate::geometry::parse_geometry;
use crate::types::{Observation, RawObservation};
use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use rayon::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

const COUNT_COLUMN: &str = "count";
const GEOMETRY_COLUMN: &str = "geometry";
const EMPTY_CELL: &Data = &Data::Empty;

pub fn load_data(config: &AppConfig) -> Result<Vec<Observation>> {
    info!("Loading observations from {:?}", config.input.data);
    let observations = load_observations(&config.input.data)
        .with_context(|| format!("Failed to load observations from {:?}", config.input.data))?;
    info!("Loaded {} observations", observations.len());
    Ok(observations)
}

// A single malformed row fails the whole load.
pub fn load_observations(path: &Path) -> Result<Vec<Observation>, LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    let rows = match extension.as_str() {
        "csv" => read_csv(path)?,
        "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => read_spreadsheet(path)?,
        _ => return Err(LoadError::UnsupportedFormat(extension)),
    };
    debug!("Read {} raw rows", rows.len());

    parse_rows(rows)
}

// Rows carry their 1-based sheet row number (the header is row 1).
type NumberedRow = (usize, RawObservation);

fn parse_rows(rows: Vec<NumberedRow>) -> Result<Vec<Observation>, LoadError> {
    rows.into_par_iter()
        .map(|(row, raw)| {
            parse_geometry(&raw.geometry)
                .map(|point| Observation {
                    count: raw.count,
                    point,
                })
                .map_err(|source| (row, source))
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|(row, source)| LoadError::Geometry { row, source })
}

fn read_csv(path: &Path) -> Result<Vec<NumberedRow>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(file);
    let headers = rdr.headers()?.clone();

    let count_idx = column_index(headers.iter(), COUNT_COLUMN)?;
    let geometry_idx = column_index(headers.iter(), GEOMETRY_COLUMN)?;

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 2;
        let count = record.get(count_idx).unwrap_or("").trim();
        let geometry = record.get(geometry_idx).unwrap_or("");

        if count.is_empty() && geometry.trim().is_empty() {
            continue;
        }

        rows.push((
            row,
            RawObservation {
                count: parse_count(row, count)?,
                geometry: geometry.to_string(),
            },
        ));
    }

    Ok(rows)
}

fn read_spreadsheet(path: &Path) -> Result<Vec<NumberedRow>, LoadError> {
    // calamine folds a missing file into its own error type; check first so
    // the caller sees which path was wrong.
    std::fs::metadata(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)??;

    // The range begins at the first used cell, not necessarily A1.
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);
    let mut sheet_rows = range.rows();
    let header: Vec<String> = sheet_rows
        .next()
        .map(|cells| cells.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();

    let count_idx = column_index(header.iter().map(String::as_str), COUNT_COLUMN)?;
    let geometry_idx = column_index(header.iter().map(String::as_str), GEOMETRY_COLUMN)?;

    let mut rows = Vec::new();
    for (i, cells) in sheet_rows.enumerate() {
        let row = first_row + i + 2;
        let count_cell = cells.get(count_idx).unwrap_or(EMPTY_CELL);
        let geometry_cell = cells.get(geometry_idx).unwrap_or(EMPTY_CELL);

        if matches!(count_cell, Data::Empty) && matches!(geometry_cell, Data::Empty) {
            continue;
        }

        let count = match count_cell {
            Data::Int(n) => *n,
            Data::Float(f) if f.fract() == 0.0 => *f as i64,
            Data::String(s) => parse_count(row, s.trim())?,
            other => {
                return Err(LoadError::InvalidCount {
                    row,
                    value: other.to_string(),
                })
            }
        };
        let geometry = match geometry_cell {
            Data::String(s) => s.clone(),
            other => other.to_string(),
        };

        rows.push((row, RawObservation { count, geometry }));
    }

    Ok(rows)
}

fn column_index<'a>(
    mut headers: impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<usize, LoadError> {
    headers
        .position(|h| h.trim() == name)
        .ok_or(LoadError::MissingColumn(name))
}

fn parse_count(row: usize, value: &str) -> Result<i64, LoadError> {
    let invalid = || LoadError::InvalidCount {
        row,
        value: value.to_string(),
    };
    if let Ok(n) = value.parse::<i64>() {
        return Ok(n);
    }
    // Spreadsheet exports sometimes write integers as "3.0".
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        _ => Err(invalid()),
    }
}
