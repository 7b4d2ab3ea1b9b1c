//! CSV ingestion - reads raw sales exports into positional rows

use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

use crate::error::{Result, SalesError};

/// One input row as an ordered list of text fields.
pub type InputRecord = Vec<String>;

/// Reads a sales export, skipping the header row. Rows may have any number
/// of fields; classification decides what to do with short ones.
pub struct SalesCsvReader<R: Read> {
    reader: csv::Reader<R>,
    record: StringRecord,
}

impl SalesCsvReader<File> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SalesError::InputNotFound(path.to_path_buf()),
            _ => SalesError::Io(e),
        })?;
        debug!(path = %path.display(), "opened sales export");
        Ok(Self::new(file))
    }
}

impl<R: Read> SalesCsvReader<R> {
    pub fn new(input: R) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);

        Self {
            reader,
            record: StringRecord::new(),
        }
    }

    /// Read the next data row, or `None` at end of input.
    pub fn next_record(&mut self) -> Result<Option<InputRecord>> {
        match self.reader.read_record(&mut self.record) {
            Ok(true) => Ok(Some(self.record.iter().map(str::to_string).collect())),
            Ok(false) => Ok(None),
            Err(e) => Err(decode_error(e)),
        }
    }

    /// Read every remaining row.
    pub fn read_all(mut self) -> Result<Vec<InputRecord>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_record()? {
            rows.push(row);
        }
        Ok(rows)
    }
}

impl<R: Read> Iterator for SalesCsvReader<R> {
    type Item = Result<InputRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

fn decode_error(err: csv::Error) -> SalesError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => SalesError::Io(e),
        _ => SalesError::Decode { line, message },
    }
}
