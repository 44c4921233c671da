use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::WriterBuilder;

use crate::error::ReportError;
use crate::model::{Column, Record};

fn header() -> Vec<&'static str> {
    Column::ALL.iter().map(|column| column.label()).collect()
}

fn write_table<W: Write>(writer: &mut csv::Writer<W>, records: &[Record]) -> Result<(), ReportError> {
    writer.write_record(header())?;
    for record in records {
        writer.write_record(record.to_row())?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_csv(path: &Path, records: &[Record], delimiter: u8) -> Result<(), ReportError> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    write_table(&mut writer, records)
}

pub(crate) fn write_csv_to_string(records: &[Record], delimiter: u8) -> Result<String, ReportError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::<u8>::new());
    write_table(&mut writer, records)?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ReportError::Io(error.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|error| ReportError::InvalidOption(format!("invalid utf-8 csv output: {error}")))
}

pub(crate) fn write_json(path: &Path, records: &[Record]) -> Result<(), ReportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_json_to_string(records: &[Record]) -> Result<String, ReportError> {
    let mut json = serde_json::to_string_pretty(records)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::{write_csv, write_csv_to_string, write_json_to_string};
    use crate::model::Record;

    fn record() -> Record {
        Record {
            game_date: Some("03/10/24".to_string()),
            game_time: Some("07:00 (ET)".to_string()),
            matchup: Some("BOS@NYK".to_string()),
            team: Some("Boston Celtics".to_string()),
            player_name: Some("Doe, John".to_string()),
            current_status: Some("Out".to_string()),
            reason: Some("Injury/Illness - Left Ankle; Sprain".to_string()),
        }
    }

    #[test]
    fn writes_header_even_without_records() {
        let csv = write_csv_to_string(&[], b',').expect("csv");
        assert_eq!(
            csv,
            "Game Date,Game Time,Matchup,Team,Player Name,Current Status,Reason\n"
        );
    }

    #[test]
    fn quotes_cells_containing_the_delimiter() {
        let csv = write_csv_to_string(&[record()], b',').expect("csv");
        let line = csv.lines().nth(1).expect("data line");
        assert_eq!(
            line,
            "03/10/24,07:00 (ET),BOS@NYK,Boston Celtics,\"Doe, John\",Out,Injury/Illness - Left Ankle; Sprain"
        );
    }

    #[test]
    fn honours_custom_delimiter_and_writes_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.csv");
        write_csv(&path, &[record()], b';').expect("write csv");
        let written = std::fs::read_to_string(&path).expect("read back");
        assert!(written.starts_with("Game Date;Game Time;"));
        assert!(written.contains(";\"Injury/Illness - Left Ankle; Sprain\""));
    }

    #[test]
    fn absent_fields_are_null_in_json() {
        let json = write_json_to_string(&[Record {
            player_name: Some("Doe, John".to_string()),
            ..Record::default()
        }])
        .expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse back");
        assert_eq!(value[0]["player_name"], "Doe, John");
        assert!(value[0]["matchup"].is_null());
    }
}
