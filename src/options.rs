use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::ReportError;

/// What to do with rows and pages that cannot be reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityMode {
    /// Drop the offending row or page, record a warning and keep going.
    #[default]
    BestEffort,
    /// Fail the whole document on the first defect.
    Strict,
}

/// Which fragments the column grid is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridScope {
    PerPage,
    #[default]
    Document,
}

impl FromStr for GridScope {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "page" | "per-page" => Ok(Self::PerPage),
            "document" | "doc" => Ok(Self::Document),
            other => Err(format!(
                "unknown grid scope '{other}', expected 'page' or 'document'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown output format '{other}', expected 'csv' or 'json'"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    pages: BTreeSet<u32>,
}

impl PageSelection {
    /// Parses `1-3,5` style selections.
    pub fn parse(spec: &str) -> Result<Self, ReportError> {
        spec.parse().map_err(ReportError::InvalidPageSelection)
    }

    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut pages = BTreeSet::new();
        for token in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((start, end)) = token.split_once('-') {
                let start: u32 = start
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range start: '{start}'"))?;
                let end: u32 = end
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range end: '{end}'"))?;
                if start == 0 || end == 0 {
                    return Err("pages are 1-based".to_string());
                }
                if end < start {
                    return Err(format!(
                        "invalid range '{token}': end is smaller than start"
                    ));
                }
                pages.extend(start..=end);
            } else {
                let page: u32 = token
                    .parse()
                    .map_err(|_| format!("invalid page number: '{token}'"))?;
                if page == 0 {
                    return Err("pages are 1-based".to_string());
                }
                pages.insert(page);
            }
        }

        if pages.is_empty() {
            return Err("page selection cannot be empty".to_string());
        }

        Ok(Self { pages })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub pages: Option<PageSelection>,
    pub delimiter: u8,
    pub quality_mode: QualityMode,
    pub grid_scope: GridScope,
}

impl ParseOptions {
    pub fn validate(&self) -> Result<(), ReportError> {
        if matches!(self.delimiter, b'"' | b'\n' | b'\r') {
            return Err(ReportError::InvalidOption(format!(
                "delimiter {:?} cannot separate CSV cells",
                char::from(self.delimiter)
            )));
        }
        if self.pages.as_ref().is_some_and(PageSelection::is_empty) {
            return Err(ReportError::NoPagesSelected);
        }
        Ok(())
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            pages: None,
            delimiter: b',',
            quality_mode: QualityMode::BestEffort,
            grid_scope: GridScope::Document,
        }
    }
}
