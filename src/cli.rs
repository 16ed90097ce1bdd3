//! Command-line definitions.

use std::path::PathBuf;

use clap::Parser;

use crate::criteria::FilterCriteria;

/// Command-line arguments for crashlens
#[derive(Clone, Parser, Debug)]
#[command(
    name = "crashlens",
    version,
    about = "Query engine for interactive exploration of vehicle-collision records"
)]
pub struct Args {
    /// Path to the collision data file (.csv or .parquet)
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Convert the input CSV to Parquet at this path and exit
    #[arg(long = "convert", value_name = "OUTPUT")]
    pub convert: Option<PathBuf>,

    /// Print the detected column mapping and exit
    #[arg(long = "show-schema", action)]
    pub show_schema: bool,

    /// Print the selectable values for each filter and exit
    #[arg(long = "list-options", action)]
    pub list_options: bool,

    /// Restrict the report to this borough (repeatable)
    #[arg(long = "borough", value_name = "NAME")]
    pub boroughs: Vec<String>,

    /// Restrict the report to this crash year (repeatable)
    #[arg(long = "year", value_name = "YEAR")]
    pub years: Vec<i32>,

    /// Restrict the report to this vehicle type (repeatable)
    #[arg(long = "vehicle", value_name = "TYPE")]
    pub vehicle_types: Vec<String>,

    /// Restrict the report to this contributing factor (repeatable)
    #[arg(long = "factor", value_name = "FACTOR")]
    pub factors: Vec<String>,

    /// Restrict the report to this age group (repeatable)
    #[arg(long = "age-group", value_name = "GROUP")]
    pub age_groups: Vec<String>,

    /// Keyword search across the text columns; any keyword matches
    #[arg(long = "search", value_name = "QUERY", default_value = "")]
    pub search: String,

    /// Emit the report as JSON instead of text
    #[arg(long = "json", action)]
    pub json: bool,

    /// Number of rows to use when inferring CSV schema
    #[arg(long = "infer-schema-length", value_name = "N")]
    pub infer_schema_length: Option<usize>,

    /// Read configuration from this file instead of the default location
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl From<&Args> for FilterCriteria {
    fn from(args: &Args) -> Self {
        FilterCriteria {
            boroughs: args.boroughs.clone(),
            years: args.years.clone(),
            vehicle_types: args.vehicle_types.clone(),
            factors: args.factors.clone(),
            age_groups: args.age_groups.clone(),
            search: args.search.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_map_onto_criteria() {
        let args = Args::parse_from([
            "crashlens",
            "crashes.csv",
            "--borough",
            "BROOKLYN",
            "--borough",
            "QUEENS",
            "--year",
            "2022",
            "--search",
            "sedan",
        ]);
        let criteria: FilterCriteria = (&args).into();
        assert_eq!(criteria.boroughs, vec!["BROOKLYN", "QUEENS"]);
        assert_eq!(criteria.years, vec![2022]);
        assert_eq!(criteria.search, "sedan");
        assert!(criteria.vehicle_types.is_empty());
    }

    #[test]
    fn defaults_are_unrestricted() {
        let args = Args::parse_from(["crashlens", "crashes.csv"]);
        let criteria: FilterCriteria = (&args).into();
        assert!(criteria.is_unrestricted());
        assert!(!args.json);
        assert!(args.convert.is_none());
    }
}
