use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("geometry {0:?} has no comma separating longitude and latitude")]
    MissingComma(String),
    #[error("{field} value {value:?} is not a number")]
    InvalidNumber { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open data file {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read CSV data")]
    Csv(#[from] csv::Error),
    #[error("failed to read spreadsheet")]
    Spreadsheet(#[from] calamine::Error),
    #[error("unsupported data format {0:?} (expected csv, xls, xlsx, xlsm, xlsb or ods)")]
    UnsupportedFormat(String),
    #[error("spreadsheet has no worksheet")]
    NoWorksheet,
    #[error("required column '{0}' not found")]
    MissingColumn(&'static str),
    #[error("row {row}: count {value:?} is not an integer")]
    InvalidCount { row: usize, value: String },
    #[error("row {row}: invalid geometry")]
    Geometry {
        row: usize,
        #[source]
        source: ParseError,
    },
}
