//! Budget exporters.
//!
//! Both formats are rendered to bytes first, so they can be tested in memory,
//! and then written with [`write_artifact`].

pub mod csv_report;
pub mod pdf_report;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

pub use csv_report::BudgetCsvRow;

pub const PDF_FILENAME: &str = "orcamento.pdf";
pub const CSV_FILENAME: &str = "orcamento.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// printpdf reports failures as opaque errors; only the message is kept.
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("cannot write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes `bytes` to `dir/name`, creating `dir` if needed, and returns the
/// full path. An existing file is overwritten.
pub fn write_artifact(
    dir: &Path,
    name: &str,
    bytes: &[u8],
) -> Result<PathBuf, ExportError> {
    let path = dir.join(name);
    let io_err = |source| ExportError::Io {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_err)?;
    fs::write(&path, bytes).map_err(io_err)?;
    info!(path = %path.display(), bytes = bytes.len(), "exported budget");
    Ok(path)
}
