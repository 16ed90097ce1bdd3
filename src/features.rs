//! Load-time feature derivation: crash year and weekday from the date column,
//! age-group binning, and injury null-filling.
//!
//! Everything here runs exactly once when the table is loaded; queries never
//! recompute or overwrite these columns.

use color_eyre::Result;
use polars::prelude::*;

use crate::schema::{ResolvedSchema, Role};

/// Name of the year column derived from the crash date.
pub const YEAR_COLUMN: &str = "crash_year";
/// Name of the weekday column derived from the crash date.
pub const WEEKDAY_COLUMN: &str = "crash_weekday";
/// Name of the age-group column. Always present after derivation.
pub const AGE_GROUP_COLUMN: &str = "age_group";

/// Sentinel written into the injury column where the source value is null.
pub const UNKNOWN_INJURY: &str = "UNKNOWN";
/// Constant age group used when no age column was resolved.
pub const UNKNOWN_AGE_GROUP: &str = "Unknown";

/// The five age-group labels, in bin order.
pub const AGE_GROUP_LABELS: [&str; 5] = ["<18", "18–30", "31–45", "46–60", "60+"];

/// Derives the computed columns and records the ones it created in the schema.
///
/// - The date column is parsed in place when it is not already temporal;
///   unparsable values become null rather than failing the load.
/// - `crash_year` and `crash_weekday` are derived from the date only for roles
///   that did not resolve to an existing column.
/// - `age_group` is always added: binned from the age column when resolved,
///   otherwise the constant `"Unknown"`.
/// - The injury column has nulls replaced by `"UNKNOWN"`.
///
/// The input frame is consumed; callers keep the result as the immutable base
/// table for the lifetime of the process.
pub fn derive_features(df: DataFrame, schema: &mut ResolvedSchema) -> Result<DataFrame> {
    let date_needs_parse = match schema.column(Role::Date) {
        Some(name) => !matches!(
            df.column(name)?.dtype(),
            DataType::Date | DataType::Datetime(_, _)
        ),
        None => false,
    };

    let mut lf = df.lazy();

    if let Some(date_col) = schema.column(Role::Date).map(str::to_string) {
        if date_needs_parse {
            lf = lf.with_column(
                col(&date_col)
                    .cast(DataType::String)
                    .str()
                    .to_date(StrptimeOptions {
                        strict: false,
                        ..Default::default()
                    })
                    .alias(&date_col),
            );
        }
        if !schema.is_resolved(Role::Year) {
            lf = lf.with_column(col(&date_col).dt().year().alias(YEAR_COLUMN));
            schema.set(Role::Year, YEAR_COLUMN);
        }
        if !schema.is_resolved(Role::Weekday) {
            lf = lf.with_column(col(&date_col).dt().to_string("%A").alias(WEEKDAY_COLUMN));
            schema.set(Role::Weekday, WEEKDAY_COLUMN);
        }
    }

    let age_group = match schema.column(Role::Age) {
        Some(age_col) => age_group_expr(age_col),
        None => lit(UNKNOWN_AGE_GROUP).alias(AGE_GROUP_COLUMN),
    };
    lf = lf.with_column(age_group);

    if let Some(injury_col) = schema.column(Role::Injury).map(str::to_string) {
        lf = lf.with_column(
            col(&injury_col)
                .cast(DataType::String)
                .fill_null(lit(UNKNOWN_INJURY))
                .alias(&injury_col),
        );
    }

    Ok(lf.collect()?)
}

/// Bins ages into the five fixed groups. Null ages and ages outside 0..=120
/// map to null, which downstream string handling renders as unknown.
fn age_group_expr(age_col: &str) -> Expr {
    let age = col(age_col);
    when(
        age.clone()
            .is_null()
            .or(age.clone().lt(lit(0)))
            .or(age.clone().gt(lit(120))),
    )
    .then(lit(NULL))
    .when(age.clone().lt_eq(lit(17)))
    .then(lit(AGE_GROUP_LABELS[0]))
    .when(age.clone().lt_eq(lit(30)))
    .then(lit(AGE_GROUP_LABELS[1]))
    .when(age.clone().lt_eq(lit(45)))
    .then(lit(AGE_GROUP_LABELS[2]))
    .when(age.lt_eq(lit(60)))
    .then(lit(AGE_GROUP_LABELS[3]))
    .otherwise(lit(AGE_GROUP_LABELS[4]))
    .alias(AGE_GROUP_COLUMN)
}
