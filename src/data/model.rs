use std::fmt;
use std::path::PathBuf;

use arrow::record_batch::RecordBatch;

// ---------------------------------------------------------------------------
// SubjectFolder – one NF*/PF* directory and its recordings
// ---------------------------------------------------------------------------

/// A subject directory found under the dataset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectFolder {
    /// Directory name, e.g. `NF031`.
    pub name: String,
    pub path: PathBuf,
    /// Recording files inside the folder, sorted by file name.
    pub recordings: Vec<PathBuf>,
}

impl SubjectFolder {
    /// The configured prefix this folder matched, if any.
    pub fn prefix<'a>(&self, prefixes: &'a [String]) -> Option<&'a str> {
        prefixes
            .iter()
            .find(|p| self.name.starts_with(p.as_str()))
            .map(String::as_str)
    }
}

/// Total number of recording files across all folders.
pub fn recording_count(folders: &[SubjectFolder]) -> usize {
    folders.iter().map(|f| f.recordings.len()).sum()
}

// ---------------------------------------------------------------------------
// TableShape – (rows, columns)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableShape {
    pub rows: usize,
    pub columns: usize,
}

impl TableShape {
    pub fn of(table: &RecordBatch) -> Self {
        TableShape {
            rows: table.num_rows(),
            columns: table.num_columns(),
        }
    }
}

impl fmt::Display for TableShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.rows, self.columns)
    }
}

// ---------------------------------------------------------------------------
// MissingCounts – per-column count of missing cells
// ---------------------------------------------------------------------------

/// Missing-value count per column, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingCounts {
    pub entries: Vec<(String, usize)>,
}

impl MissingCounts {
    pub fn get(&self, column: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, n)| *n)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }
}

impl fmt::Display for MissingCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self.entries.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
        let count_width = self
            .entries
            .iter()
            .map(|(_, c)| c.to_string().len())
            .max()
            .unwrap_or(1);
        for (i, (name, count)) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{name:<name_width$}    {count:>count_width$}")?;
        }
        Ok(())
    }
}
