//! Workbook model.
//!
//! A workbook is a directory of CSV sheets: each `<Sheet Name>.csv` file
//! is one sheet, the file stem is the sheet name. Reads return every cell
//! as a string; typed conversion happens downstream in `reader`. Writes
//! replace one sheet file in place after the whole run has been computed
//! in memory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AllocError;
use crate::AllocResult;

/// A sheet as read: header row plus data rows, all cells as strings.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Index of a header, if present.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of a required header.
    pub fn require_column(&self, name: &str) -> AllocResult<usize> {
        self.column(name).ok_or_else(|| AllocError::MissingColumn {
            column: name.to_string(),
            sheet: self.name.clone(),
        })
    }

    /// Cell at (row, col); short rows read as empty cells.
    pub fn cell<'a>(&'a self, row: &'a [String], col: usize) -> &'a str {
        row.get(col).map(String::as_str).unwrap_or("")
    }

    /// Drop columns for which `strip` returns true (headers and cells).
    pub fn retain_columns(&mut self, mut keep: impl FnMut(&str) -> bool) {
        let kept: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| keep(h))
            .map(|(i, _)| i)
            .collect();
        self.headers = kept.iter().map(|&i| self.headers[i].clone()).collect();
        for row in &mut self.rows {
            *row = kept
                .iter()
                .map(|&i| row.get(i).cloned().unwrap_or_default())
                .collect();
        }
    }
}

pub struct Workbook {
    dir: PathBuf,
}

impl Workbook {
    /// Open a workbook directory.
    pub fn open(path: impl AsRef<Path>) -> AllocResult<Self> {
        let dir = path.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(AllocError::WorkbookNotFound(dir.display().to_string()));
        }
        Ok(Workbook { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// All sheet names in the workbook.
    pub fn sheet_names(&self) -> AllocResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Locate a sheet whose name contains every keyword, case-insensitive.
    pub fn find_sheet(&self, keywords: &[&str]) -> AllocResult<String> {
        let names = self.sheet_names()?;
        for name in &names {
            let lname = name.to_lowercase();
            if keywords.iter().all(|k| lname.contains(&k.to_lowercase())) {
                return Ok(name.clone());
            }
        }
        Err(AllocError::MissingSource {
            workbook: self.dir.display().to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        })
    }

    /// Read one sheet: first row is the header, everything as strings.
    pub fn read_sheet(&self, name: &str) -> AllocResult<Sheet> {
        let path = self.sheet_path(name);
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)?;

        let mut records = rdr.records();
        let headers: Vec<String> = match records.next() {
            Some(rec) => rec?.iter().map(|c| c.trim().to_string()).collect(),
            None => Vec::new(),
        };
        let mut rows = Vec::new();
        for rec in records {
            let rec = rec?;
            rows.push(rec.iter().map(|c| c.to_string()).collect());
        }
        debug!(sheet = name, rows = rows.len(), cols = headers.len(), "read sheet");
        Ok(Sheet {
            name: name.to_string(),
            headers,
            rows,
        })
    }

    /// Replace (or create) a sheet with a raw cell grid. Used for the
    /// distribution output, which is a sequence of titled blocks rather
    /// than a single table.
    pub fn write_grid(&self, name: &str, grid: &[Vec<String>]) -> AllocResult<()> {
        let path = self.sheet_path(name);
        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(&path)?;
        for row in grid {
            // pad short rows so every record has the same width
            let mut record: Vec<&str> = row.iter().map(String::as_str).collect();
            record.resize(width, "");
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        debug!(sheet = name, rows = grid.len(), "wrote sheet");
        Ok(())
    }

    fn sheet_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }
}
