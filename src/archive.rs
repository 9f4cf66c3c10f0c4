use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{Result, StatsError};
use crate::record::ColumnMap;

/// A user's export archive.
pub struct TweetArchive<R: Read + Seek> {
    zip: ZipArchive<R>,
}

impl TweetArchive<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let f = File::open(path)?;
        Self::from_reader(BufReader::new(f))
    }
}

impl<R: Read + Seek> TweetArchive<R> {
    pub fn from_reader(reader: R) -> Result<Self> {
        Ok(Self { zip: ZipArchive::new(reader)? })
    }

    pub fn entry_names(&self) -> Vec<String> {
        self.zip.file_names().map(str::to_string).collect()
    }

    /// Stream the CSV rows of entry `name`. The header row is consumed here
    /// and used to locate columns.
    pub fn rows(&mut self, name: &str) -> Result<RowReader<'_>> {
        let entry = match self.zip.by_name(name) {
            Ok(e) => e,
            Err(ZipError::FileNotFound) => return Err(StatsError::MissingEntry(name.to_string())),
            Err(e) => return Err(e.into()),
        };
        // short rows must reach the engine to be counted, not fail the read
        let mut reader = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(entry);
        let columns = ColumnMap::from_headers(reader.headers()?);
        Ok(RowReader { reader, columns })
    }
}

pub struct RowReader<'a> {
    reader: csv::Reader<ZipFile<'a>>,
    columns: ColumnMap,
}

impl<'a> RowReader<'a> {
    pub fn columns(&self) -> ColumnMap {
        self.columns
    }

    /// Read the next row into `row`; `false` at end of entry.
    pub fn next_row(&mut self, row: &mut StringRecord) -> Result<bool> {
        Ok(self.reader.read_record(row)?)
    }
}
