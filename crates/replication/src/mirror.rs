// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The spreadsheet mirror.
//!
//! A mirror is a set of named sheets. Each sheet has a header row whose
//! first column holds the row key (the entity ID for pushed sheets). Writes
//! address rows by key, never by position, so rows inserted or removed by
//! people editing the sheet cannot redirect a write to the wrong row.

use crate::error::MirrorError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// One mirror row as ordered `(column, value)` cells.
///
/// The first cell is the row key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MirrorRow {
    cells: Vec<(String, String)>,
}

impl MirrorRow {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Returns the row with `column` set to `value`.
    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    /// Sets `column`, replacing an existing value.
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        let value: String = value.into();
        match self.cells.iter_mut().find(|(name, _)| name == column) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((column.to_string(), value)),
        }
    }

    /// The value of `column`, if the row has it.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// The row key.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.cells.first().map(|(_, value)| value.as_str())
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    /// Number of cells.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no cells.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A sheet held as a header plus positional rows.
///
/// Writing a row with a column the sheet does not have yet adds the column
/// to the header and leaves it empty in existing rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sheet {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Builds a sheet from a header and raw rows. Short rows are padded.
    #[must_use]
    pub fn from_parts(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width: usize = header.len();
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width.max(row.len()), String::new());
                row
            })
            .collect();
        Self { header, rows }
    }

    /// Builds a sheet by appending `rows` in order.
    #[must_use]
    pub fn from_rows(rows: Vec<MirrorRow>) -> Self {
        let mut sheet: Self = Self::default();
        for row in rows {
            sheet.append(&row);
        }
        sheet
    }

    /// Column names.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Raw rows aligned with the header.
    #[must_use]
    pub fn raw_rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the sheet has no data rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first row whose key equals `key`.
    #[must_use]
    pub fn locate(&self, key: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.first().is_some_and(|cell| cell == key))
    }

    /// Adds `row` at the end.
    pub fn append(&mut self, row: &MirrorRow) {
        let values: Vec<String> = self.align(row);
        self.rows.push(values);
    }

    /// Replaces the row keyed `key`, appending `row` if there is none.
    ///
    /// Returns whether an existing row was replaced.
    pub fn upsert(&mut self, key: &str, row: &MirrorRow) -> bool {
        let values: Vec<String> = self.align(row);
        match self.locate(key) {
            Some(index) => {
                self.rows[index] = values;
                true
            }
            None => {
                self.rows.push(values);
                false
            }
        }
    }

    /// Removes every row keyed `key`. Returns whether any was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let before: usize = self.rows.len();
        self.rows
            .retain(|row| row.first().is_none_or(|cell| cell != key));
        self.rows.len() != before
    }

    /// Every row with its column names.
    #[must_use]
    pub fn rows(&self) -> Vec<MirrorRow> {
        self.rows
            .iter()
            .map(|values| {
                let mut row: MirrorRow = MirrorRow::new();
                for (column, value) in self.header.iter().zip(values) {
                    row.set(column, value.clone());
                }
                row
            })
            .collect()
    }

    fn align(&mut self, row: &MirrorRow) -> Vec<String> {
        for column in row.columns() {
            if !self.header.iter().any(|h| h == column) {
                self.header.push(column.to_string());
                for existing in &mut self.rows {
                    existing.push(String::new());
                }
            }
        }

        self.header
            .iter()
            .map(|column| row.get(column).unwrap_or_default().to_string())
            .collect()
    }
}

/// A spreadsheet-like mirror.
///
/// Every call may fail transiently; callers own retries.
#[async_trait]
pub trait Mirror: Send + Sync {
    /// Adds a row at the end of `sheet`.
    async fn append(&self, sheet: &str, row: MirrorRow) -> Result<(), MirrorError>;

    /// Position of the row keyed `key`, if present.
    async fn locate(&self, sheet: &str, key: &str) -> Result<Option<usize>, MirrorError>;

    /// Replaces the row keyed `key`, or appends `row` when there is none.
    ///
    /// Finding and writing the row is one step: no other write to the
    /// sheet can land in between.
    async fn upsert(&self, sheet: &str, key: &str, row: MirrorRow) -> Result<(), MirrorError>;

    /// Removes the row keyed `key`. Returns whether a row was removed.
    async fn delete(&self, sheet: &str, key: &str) -> Result<bool, MirrorError>;

    /// Every row of `sheet`. A missing sheet reads as empty.
    async fn read_all(&self, sheet: &str) -> Result<Vec<MirrorRow>, MirrorError>;
}

/// A mirror held in memory.
///
/// Failures can be queued with [`InMemoryMirror::fail_next`]; each queued
/// failure is returned by the next call instead of performing it.
#[derive(Debug, Default)]
pub struct InMemoryMirror {
    sheets: Mutex<HashMap<String, Sheet>>,
    failures: Mutex<VecDeque<MirrorError>>,
}

impl InMemoryMirror {
    /// Creates an empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call fail with `error`.
    pub async fn fail_next(&self, error: MirrorError) {
        self.failures.lock().await.push_back(error);
    }

    /// Replaces `sheet` with `rows`.
    pub async fn load_sheet(&self, sheet: &str, rows: Vec<MirrorRow>) {
        self.sheets
            .lock()
            .await
            .insert(sheet.to_string(), Sheet::from_rows(rows));
    }

    /// A copy of `sheet`.
    pub async fn sheet(&self, sheet: &str) -> Sheet {
        self.sheets
            .lock()
            .await
            .get(sheet)
            .cloned()
            .unwrap_or_default()
    }

    async fn injected_failure(&self) -> Result<(), MirrorError> {
        self.failures.lock().await.pop_front().map_or(Ok(()), Err)
    }
}

#[async_trait]
impl Mirror for InMemoryMirror {
    async fn append(&self, sheet: &str, row: MirrorRow) -> Result<(), MirrorError> {
        self.injected_failure().await?;
        self.sheets
            .lock()
            .await
            .entry(sheet.to_string())
            .or_default()
            .append(&row);
        Ok(())
    }

    async fn locate(&self, sheet: &str, key: &str) -> Result<Option<usize>, MirrorError> {
        self.injected_failure().await?;
        Ok(self
            .sheets
            .lock()
            .await
            .get(sheet)
            .and_then(|s| s.locate(key)))
    }

    async fn upsert(&self, sheet: &str, key: &str, row: MirrorRow) -> Result<(), MirrorError> {
        self.injected_failure().await?;
        self.sheets
            .lock()
            .await
            .entry(sheet.to_string())
            .or_default()
            .upsert(key, &row);
        Ok(())
    }

    async fn delete(&self, sheet: &str, key: &str) -> Result<bool, MirrorError> {
        self.injected_failure().await?;
        Ok(self
            .sheets
            .lock()
            .await
            .get_mut(sheet)
            .is_some_and(|s| s.delete(key)))
    }

    async fn read_all(&self, sheet: &str) -> Result<Vec<MirrorRow>, MirrorError> {
        self.injected_failure().await?;
        Ok(self
            .sheets
            .lock()
            .await
            .get(sheet)
            .map(Sheet::rows)
            .unwrap_or_default())
    }
}

/// A mirror stored as one CSV file per sheet in a directory.
///
/// File access runs on the blocking pool. Calls are serialized so a
/// read-modify-write of one sheet never interleaves with another.
#[derive(Debug)]
pub struct CsvMirror {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl CsvMirror {
    /// Creates a mirror rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::Unavailable` if the directory cannot be created.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, MirrorError> {
        let dir: PathBuf = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| {
            MirrorError::Unavailable(format!("cannot create {}: {e}", dir.display()))
        })?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    /// Path of the file backing `sheet`.
    #[must_use]
    pub fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{sheet}.csv"))
    }

    async fn read(&self, sheet: &str) -> Result<Sheet, MirrorError> {
        let _guard = self.lock.lock().await;
        let path: PathBuf = self.sheet_path(sheet);
        tokio::task::spawn_blocking(move || read_sheet(&path))
            .await
            .map_err(|e| MirrorError::Unavailable(e.to_string()))?
    }

    /// Applies `change` to `sheet`, writing the file only if `change`
    /// reports that it modified the sheet.
    async fn edit<F>(&self, sheet: &str, change: F) -> Result<bool, MirrorError>
    where
        F: FnOnce(&mut Sheet) -> bool + Send + 'static,
    {
        let _guard = self.lock.lock().await;
        let path: PathBuf = self.sheet_path(sheet);
        let name: String = sheet.to_string();
        tokio::task::spawn_blocking(move || {
            let mut data: Sheet = read_sheet(&path)?;
            if !change(&mut data) {
                return Ok(false);
            }
            write_sheet(&path, &data)?;
            debug!(sheet = %name, rows = data.len(), "Wrote mirror sheet");
            Ok(true)
        })
        .await
        .map_err(|e| MirrorError::Unavailable(e.to_string()))?
    }
}

fn csv_error(path: &Path, error: &csv::Error) -> MirrorError {
    MirrorError::Unavailable(format!("{}: {error}", path.display()))
}

fn read_sheet(path: &Path) -> Result<Sheet, MirrorError> {
    if !path.exists() {
        return Ok(Sheet::default());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, &e))?;

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, &e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record: csv::StringRecord = record.map_err(|e| csv_error(path, &e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Sheet::from_parts(header, rows))
}

fn write_sheet(path: &Path, sheet: &Sheet) -> Result<(), MirrorError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, &e))?;

    if !sheet.header().is_empty() {
        writer
            .write_record(sheet.header())
            .map_err(|e| csv_error(path, &e))?;
    }
    for row in sheet.raw_rows() {
        writer.write_record(row).map_err(|e| csv_error(path, &e))?;
    }
    writer
        .flush()
        .map_err(|e| MirrorError::Unavailable(format!("{}: {e}", path.display())))
}

#[async_trait]
impl Mirror for CsvMirror {
    async fn append(&self, sheet: &str, row: MirrorRow) -> Result<(), MirrorError> {
        self.edit(sheet, move |data| {
            data.append(&row);
            true
        })
        .await
        .map(|_| ())
    }

    async fn locate(&self, sheet: &str, key: &str) -> Result<Option<usize>, MirrorError> {
        Ok(self.read(sheet).await?.locate(key))
    }

    async fn upsert(&self, sheet: &str, key: &str, row: MirrorRow) -> Result<(), MirrorError> {
        let key: String = key.to_string();
        self.edit(sheet, move |data| {
            data.upsert(&key, &row);
            true
        })
        .await
        .map(|_| ())
    }

    async fn delete(&self, sheet: &str, key: &str) -> Result<bool, MirrorError> {
        let key: String = key.to_string();
        self.edit(sheet, move |data| data.delete(&key)).await
    }

    async fn read_all(&self, sheet: &str) -> Result<Vec<MirrorRow>, MirrorError> {
        Ok(self.read(sheet).await?.rows())
    }
}
