//! In-memory zip assembly shared by the docx encoder and zip bundling.

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes entries in call order with a fixed modification time, so the same entries and
/// timestamp always produce the same bytes.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    names: HashSet<String>,
}

impl ArchiveBuilder {
    pub fn new(modified_at: DateTime<Utc>) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip_timestamp(modified_at));
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options,
            names: HashSet::new(),
        }
    }

    /// Adds an entry and returns the name it was stored under. A name already present
    /// in the archive gets a ` (n)` suffix before its extension.
    pub fn add(&mut self, name: &str, bytes: &[u8]) -> Result<String, ZipError> {
        let name = self.unique_name(name);
        self.writer.start_file(name.as_str(), self.options)?;
        self.writer.write_all(bytes)?;
        self.names.insert(name.clone());
        Ok(name)
    }

    pub fn finish(self) -> Result<Vec<u8>, ZipError> {
        Ok(self.writer.finish()?.into_inner())
    }

    fn unique_name(&self, name: &str) -> String {
        if !self.names.contains(name) {
            return name.to_string();
        }
        let (stem, ext) = match name.rfind('.') {
            Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
            _ => (name, ""),
        };
        (1..)
            .map(|n| format!("{stem} ({n}){ext}"))
            .find(|candidate| !self.names.contains(candidate))
            .unwrap_or_else(|| name.to_string())
    }
}

/// Zip stores local DOS time with a 1980 floor; earlier instants clamp to the floor.
fn zip_timestamp(at: DateTime<Utc>) -> zip::DateTime {
    let year = u16::try_from(at.year()).unwrap_or(1980);
    zip::DateTime::from_date_and_time(
        year,
        at.month() as u8,
        at.day() as u8,
        at.hour() as u8,
        at.minute() as u8,
        at.second() as u8,
    )
    .unwrap_or_default()
}
