// File I/O operations

pub mod csv;
pub mod export;

use std::path::{Path, PathBuf};

use gridex_core::GridError;
use thiserror::Error;

pub use export::{export_file, render, ExportOptions, Format};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: std::io::Error },
    #[error("cannot save {}: {source}", path.display())]
    Save { path: PathBuf, source: std::io::Error },
    #[error("malformed delimited data: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("unknown export format for {}", .0.display())]
    UnknownFormat(PathBuf),
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl IoError {
    pub(crate) fn open(path: &Path, source: std::io::Error) -> Self {
        Self::Open { path: path.to_path_buf(), source }
    }

    pub(crate) fn save(path: &Path, source: std::io::Error) -> Self {
        Self::Save { path: path.to_path_buf(), source }
    }
}

/// Collapse into the grid error kinds a controller reports.
impl From<IoError> for GridError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Grid(inner) => inner,
            IoError::Save { .. } | IoError::UnknownFormat(_) => GridError::FileSave(err.to_string()),
            IoError::Open { .. } | IoError::Csv(_) => GridError::FileOpen(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, IoError>;
