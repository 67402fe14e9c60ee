//! Table output — serialize enriched results to CSV
//!
//! The table is written once, at pipeline completion, with one row per
//! [`FetchResult`] in result order. Columns: `project, section, last_commit,
//! url, description, github, cran, repo`. A missing activity date renders as
//! an empty cell.

use crate::error::Result;
use crate::types::FetchResult;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// One output row, in column order
#[derive(Debug, Serialize)]
struct Row<'a> {
    project: &'a str,
    section: &'a str,
    last_commit: String,
    url: &'a str,
    description: &'a str,
    github: bool,
    cran: bool,
    repo: &'a str,
}

impl<'a> From<&'a FetchResult> for Row<'a> {
    fn from(result: &'a FetchResult) -> Self {
        Self {
            project: &result.entry.name,
            section: &result.entry.section,
            last_commit: result
                .last_activity
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            url: &result.entry.url,
            description: &result.entry.description,
            github: result.is_git_repo,
            cran: result.is_registry,
            repo: &result.repo,
        }
    }
}

/// Write results as CSV to the given writer
///
/// # Errors
///
/// Returns an error if serialization or the underlying writer fails.
pub fn write_csv_to<W: Write>(writer: W, results: &[FetchResult]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for result in results {
        csv_writer.serialize(Row::from(result))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write results as a CSV file at `path`
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_csv(path: &Path, results: &[FetchResult]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv_to(file, results)
}
