use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::TableError;
use crate::model::OutputRow;

fn write_json_to<W: Write>(writer: W, rows: &[OutputRow]) -> Result<(), TableError> {
    let mut serializer = Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"    "));
    rows.serialize(&mut serializer)?;
    Ok(())
}

pub fn write_json(path: &Path, rows: &[OutputRow]) -> Result<(), TableError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_json_to(&mut writer, rows)?;
    writer.flush()?;
    Ok(())
}

pub fn write_json_to_string(rows: &[OutputRow]) -> Result<String, TableError> {
    let mut bytes = Vec::new();
    write_json_to(&mut bytes, rows)?;
    String::from_utf8(bytes)
        .map_err(|error| TableError::InvalidConfig(format!("invalid utf-8 json output: {error}")))
}

fn csv_header(columns: &[String]) -> Vec<&str> {
    columns
        .iter()
        .map(String::as_str)
        .chain(["x", "y"])
        .collect()
}

fn csv_record(row: &OutputRow, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|column| row.get(column).unwrap_or_default().to_string())
        .chain([row.x.to_string(), row.y.to_string()])
        .collect()
}

pub fn write_csv(
    path: &Path,
    rows: &[OutputRow],
    columns: &[String],
    delimiter: u8,
) -> Result<(), TableError> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    writer.write_record(csv_header(columns))?;
    for row in rows {
        writer.write_record(csv_record(row, columns))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_csv_to_string(
    rows: &[OutputRow],
    columns: &[String],
    delimiter: u8,
) -> Result<String, TableError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::<u8>::new());
    writer.write_record(csv_header(columns))?;
    for row in rows {
        writer.write_record(csv_record(row, columns))?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|error| TableError::Csv(error.into_error().into()))?;
    String::from_utf8(bytes)
        .map_err(|error| TableError::InvalidConfig(format!("invalid utf-8 csv output: {error}")))
}
