use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("failed to fetch injury report: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid report URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("config file {} not found", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid page selection: {0}")]
    InvalidPageSelection(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("no pages available after applying selection")]
    NoPagesSelected,

    #[error("page {page} has {columns} distinct column positions, expected at most 7")]
    AmbiguousColumnGrid { page: u32, columns: usize },

    #[error("page {page} shows only {columns} of 7 column positions")]
    IncompleteColumnGrid { page: u32, columns: usize },

    #[error("page {page} has a fragment at x0={x0} outside the column grid")]
    UnknownColumn { page: u32, x0: f32 },

    #[error("malformed row {row} on page {page}: {source}")]
    MalformedRow {
        page: u32,
        row: usize,
        #[source]
        source: RowError,
    },

    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// Defects local to one visual row. Recoverable: the row is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("two fragments map to the {column} column")]
    DuplicateColumn { column: &'static str },

    #[error("no matchup is available to check for a fused team column")]
    MissingMatchup,

    #[error("fused matchup text '{0}' has no space to split on")]
    UnsplittableMatchup(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("weekday cannot be less than 0 or greater than 6 (got {0})")]
    InvalidWeekday(u32),

    #[error("invalid month {month} of {year}")]
    InvalidMonth { month: u32, year: i32 },

    #[error("there is no {n}th {weekday} of {month}/{year}")]
    NoSuchWeekday {
        n: u32,
        weekday: &'static str,
        month: u32,
        year: i32,
    },
}
