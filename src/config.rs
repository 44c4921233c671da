//! Output locations loaded from a TOML file.
//!
//! ```toml
//! [dirs]
//! injury_reports = "$HOME/nba/injury"
//!
//! [paths]
//! latest_injury_report = "${HOME}/nba/latest.csv"
//! ```

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};
use serde::Deserialize;

use crate::error::ReportError;

static VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{(?P<braced>[A-Za-z_][A-Za-z0-9_]*)\}|(?P<bare>[A-Za-z_][A-Za-z0-9_]*))")
        .expect("hardcoded variable regex is valid")
});

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    dirs: DirsSection,
    #[serde(default)]
    paths: PathsSection,
}

#[derive(Debug, Clone, Deserialize)]
struct DirsSection {
    injury_reports: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PathsSection {
    #[serde(default)]
    latest_injury_report: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Directory that receives downloaded reports and their CSV exports.
    pub injury_report_dir: PathBuf,
    /// Fixed path that always holds a copy of the newest CSV export.
    pub latest_report_path: Option<PathBuf>,
}

impl ReportConfig {
    /// Reads `path`, expanding `$VAR` and `${VAR}` from the process environment.
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        if !path.exists() {
            return Err(ReportError::ConfigNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, |name| std::env::var(name).ok())
    }

    pub fn from_toml_str(
        content: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ReportError> {
        let file: ConfigFile = toml::from_str(content)?;
        let latest_report_path = file
            .paths
            .latest_injury_report
            .map(|raw| expand_vars(&raw, &lookup))
            .filter(|expanded| !expanded.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            injury_report_dir: PathBuf::from(expand_vars(&file.dirs.injury_reports, &lookup)),
            latest_report_path,
        })
    }
}

/// Replaces `$NAME` and `${NAME}` with `lookup(NAME)`; unknown names stay verbatim.
pub fn expand_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    VAR_RE
        .replace_all(input, |captures: &Captures<'_>| {
            let name = captures
                .name("braced")
                .or_else(|| captures.name("bare"))
                .map_or("", |name| name.as_str());
            lookup(name).unwrap_or_else(|| captures[0].to_string())
        })
        .into_owned()
}

/// Inserts `date` as `YYYYMMDD` before the file extension: `app.log` becomes
/// `app.20240310.log`; a name without an extension gets it appended.
#[must_use]
pub fn add_date_to_file_name(file_name: &str, date: NaiveDate) -> String {
    let stamp = date.format("%Y%m%d");
    match file_name.rsplit_once('.') {
        Some((stem, extension)) => format!("{stem}.{stamp}.{extension}"),
        None => format!("{file_name}.{stamp}"),
    }
}
