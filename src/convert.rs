//! One-shot conversion of a CSV export to Parquet, so subsequent loads skip
//! CSV parsing and schema inference.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use color_eyre::Result;
use polars::prelude::*;

use crate::source;

/// Converts `input` CSV to Parquet at `output`, returning the row count.
pub fn csv_to_parquet(input: &Path, output: &Path, infer_schema_length: usize) -> Result<usize> {
    let mut df = source::scan_csv(input, infer_schema_length)?.collect()?;
    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    ParquetWriter::new(&mut writer).finish(&mut df)?;
    Ok(df.height())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn round_trips_csv_through_parquet() -> color_eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let csv_path = dir.path().join("crashes.csv");
        let parquet_path = dir.path().join("crashes.parquet");
        let mut file = File::create(&csv_path)?;
        writeln!(file, "collision_id,borough")?;
        writeln!(file, "1,BROOKLYN")?;
        writeln!(file, "2,QUEENS")?;
        writeln!(file, "3,BRONX")?;
        drop(file);

        let rows = csv_to_parquet(&csv_path, &parquet_path, 100)?;
        assert_eq!(rows, 3);

        let loaded = source::load_table(&parquet_path, 100)?;
        assert_eq!(loaded.height(), 3);
        assert_eq!(loaded.get_column_names_str(), vec!["collision_id", "borough"]);
        Ok(())
    }
}
