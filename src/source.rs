//! Loading the collision table from CSV or Parquet files.

use std::path::Path;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;

/// Supported input formats, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Parquet,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(FileFormat::Csv),
            Some("parquet") | Some("pq") => Ok(FileFormat::Parquet),
            _ => Err(eyre!(
                "unsupported file type: {} (expected .csv or .parquet)",
                path.display()
            )),
        }
    }
}

/// Reads the whole file into memory. The engine holds the table eagerly for
/// the lifetime of the process and filters lazy views of it per request.
pub fn load_table(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let lf = match FileFormat::from_path(path)? {
        FileFormat::Csv => scan_csv(path, infer_schema_length)?,
        FileFormat::Parquet => scan_parquet(path)?,
    };
    Ok(lf.collect()?)
}

pub fn scan_csv(path: &Path, infer_schema_length: usize) -> Result<LazyFrame> {
    let pl_path = PlPath::Local(path.into());
    let lf = LazyCsvReader::new(pl_path)
        .with_infer_schema_length(Some(infer_schema_length))
        .finish()?;
    Ok(lf)
}

pub fn scan_parquet(path: &Path) -> Result<LazyFrame> {
    let pl_path = PlPath::Local(path.into());
    let lf = LazyFrame::scan_parquet(pl_path, ScanArgsParquet::default())?;
    Ok(lf)
}
