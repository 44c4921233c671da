use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Utc};
use reqwest::blocking::Client;
use tracing::{debug, info};
use url::Url;

use crate::calendar::nth_weekday_in_month;
use crate::error::ReportError;

pub const REPORT_URL_PREFIX: &str = "https://ak-static.cms.nba.com/referee/injury/Injury-Report_";
const USER_AGENT: &str = concat!("nba-injury-report/", env!("CARGO_PKG_VERSION"));
const SUNDAY: u32 = 6;

/// US Eastern offset in effect at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EasternOffset {
    Est,
    Edt,
}

impl EasternOffset {
    #[must_use]
    pub const fn utc_offset_hours(self) -> i64 {
        match self {
            Self::Est => -5,
            Self::Edt => -4,
        }
    }

    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Est => "EST",
            Self::Edt => "EDT",
        }
    }
}

/// Daylight time starts at 02:00 EST on the second Sunday of March and ends
/// at 02:00 EDT on the first Sunday of November.
pub fn eastern_offset(utc: DateTime<Utc>) -> Result<EasternOffset, ReportError> {
    let year = (utc.naive_utc() + TimeDelta::hours(EasternOffset::Est.utc_offset_hours())).year();
    let edt_starts = nth_weekday_in_month(2, SUNDAY, 3, year)?.and_time(NaiveTime::MIN)
        + TimeDelta::hours(2 - EasternOffset::Est.utc_offset_hours());
    let est_starts = nth_weekday_in_month(1, SUNDAY, 11, year)?.and_time(NaiveTime::MIN)
        + TimeDelta::hours(2 - EasternOffset::Edt.utc_offset_hours());

    let now = utc.naive_utc();
    if now >= edt_starts && now < est_starts {
        Ok(EasternOffset::Edt)
    } else {
        Ok(EasternOffset::Est)
    }
}

/// Eastern wall-clock time of `utc`.
pub fn to_eastern(utc: DateTime<Utc>) -> Result<NaiveDateTime, ReportError> {
    let offset = eastern_offset(utc)?;
    Ok(utc.naive_utc() + TimeDelta::hours(offset.utc_offset_hours()))
}

/// Hour of the most recent report that should already be published.
///
/// Reports go out on the hour; before half past, the previous hour's report
/// is the latest one.
pub fn latest_report_time(utc: DateTime<Utc>) -> Result<NaiveDateTime, ReportError> {
    let eastern = to_eastern(utc)?;
    let on_the_hour = eastern
        - TimeDelta::minutes(i64::from(eastern.minute()))
        - TimeDelta::seconds(i64::from(eastern.second()))
        - TimeDelta::nanoseconds(i64::from(eastern.nanosecond()));

    if eastern.minute() < 30 {
        Ok(on_the_hour - TimeDelta::hours(1))
    } else {
        Ok(on_the_hour)
    }
}

/// `2024-03-10_07PM`: the tag used in report URLs and file names.
#[must_use]
pub fn report_timestamp(report_time: &NaiveDateTime) -> String {
    report_time.format("%Y-%m-%d_%I%p").to_string()
}

#[must_use]
pub fn report_url(report_time: &NaiveDateTime) -> String {
    format!("{REPORT_URL_PREFIX}{}.pdf", report_timestamp(report_time))
}

#[must_use]
pub fn report_file_name(report_time: &NaiveDateTime) -> String {
    format!("NBAInjuryReport_{}.pdf", report_timestamp(report_time))
}

#[must_use]
pub fn csv_file_name(report_time: &NaiveDateTime) -> String {
    format!("NBAInjuryReport_{}.csv", report_timestamp(report_time))
}

pub fn fetch_report_bytes(report_url: &str) -> Result<Vec<u8>, ReportError> {
    let parsed = Url::parse(report_url)?;
    let client = Client::builder().user_agent(USER_AGENT).build()?;

    debug!(url = %parsed, "fetching injury report");
    let response = client.get(parsed).send()?;
    let status = response.status();
    if status.as_u16() >= 400 {
        return Err(ReportError::Upstream(format!(
            "failed to fetch injury report: status {status}"
        )));
    }

    let bytes = response.bytes()?;
    if bytes.is_empty() {
        return Err(ReportError::Upstream("fetched injury report is empty".to_string()));
    }
    Ok(bytes.to_vec())
}

/// Downloads the report for `report_time` into `dir`, returning its path.
pub fn download_report(dir: &Path, report_time: &NaiveDateTime) -> Result<PathBuf, ReportError> {
    let bytes = fetch_report_bytes(&report_url(report_time))?;
    fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(report_time));
    fs::write(&path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "saved injury report");
    Ok(path)
}
