//! The five chart-ready reducers computed from a filtered view.
//!
//! Each reducer is a pure function of the filtered view and the resolved
//! schema. None of them fail on missing roles: an unresolved role yields a
//! `Placeholder` describing what is missing, so every branch is total.

use color_eyre::Result;
use polars::prelude::*;
use serde::Serialize;

use crate::schema::{ResolvedSchema, Role};

/// Cap on geolocated points returned per report.
pub const GEO_SAMPLE_SIZE: usize = 5_000;
/// Seed that keeps the geo subsample reproducible across calls.
pub const GEO_SAMPLE_SEED: u64 = 42;

const COUNT_COLUMN: &str = "crash_count";

const WEEKDAY_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A chart-ready summary, or the documented reason none could be produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AggregateResult<T> {
    Ready(T),
    Placeholder(String),
}

impl<T> AggregateResult<T> {
    pub fn placeholder(reason: impl Into<String>) -> Self {
        AggregateResult::Placeholder(reason.into())
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, AggregateResult::Placeholder(_))
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            AggregateResult::Ready(value) => Some(value),
            AggregateResult::Placeholder(_) => None,
        }
    }
}

/// One bar or pie slice: a category label and its count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: u32,
}

/// One point of the yearly trend line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub count: u32,
}

/// Crash counts indexed by weekday (rows) and hour of day (columns).
/// Absent combinations hold 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourWeekdayMatrix {
    pub weekdays: Vec<String>,
    pub hours: Vec<i64>,
    pub counts: Vec<Vec<u32>>,
}

/// One plottable crash location with its hover metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
    pub collision_id: Option<String>,
    pub factor: Option<String>,
}

/// The geolocated subset of the filtered view, subsampled when oversized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoSample {
    pub points: Vec<GeoPoint>,
    /// Rows that had both coordinates before sampling.
    pub total_located: usize,
    pub sampled: bool,
}

/// Counting unit shared by the grouped reducers: distinct collision ids when
/// the id column resolved, plain row counts otherwise.
fn count_expr(schema: &ResolvedSchema) -> Expr {
    match schema.column(Role::CollisionId) {
        Some(id) => col(id).n_unique(),
        None => len(),
    }
    .alias(COUNT_COLUMN)
}

/// Crashes per borough, sorted by count descending. Ties keep the order in
/// which the groups first appear in the view.
pub fn borough_counts(
    view: &DataFrame,
    schema: &ResolvedSchema,
) -> Result<AggregateResult<Vec<CategoryCount>>> {
    let Some(borough) = schema.column(Role::Borough) else {
        return Ok(AggregateResult::placeholder("Borough column not found"));
    };
    let grouped = view
        .clone()
        .lazy()
        .filter(col(borough).is_not_null())
        .group_by_stable([col(borough)])
        .agg([count_expr(schema)])
        .sort_by_exprs(
            [col(COUNT_COLUMN)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;
    Ok(AggregateResult::Ready(category_counts(&grouped, borough)?))
}

/// Crashes per year, sorted ascending by year.
pub fn yearly_trend(
    view: &DataFrame,
    schema: &ResolvedSchema,
) -> Result<AggregateResult<Vec<TrendPoint>>> {
    let Some(year) = schema.column(Role::Year) else {
        return Ok(AggregateResult::placeholder("Year column not found"));
    };
    let grouped = view
        .clone()
        .lazy()
        .filter(col(year).is_not_null())
        .group_by_stable([col(year)])
        .agg([count_expr(schema)])
        .sort_by_exprs([col(year)], SortMultipleOptions::default())
        .collect()?;

    let years = grouped
        .column(year)?
        .as_materialized_series()
        .cast(&DataType::Int32)?;
    let years = years.i32()?;
    let counts = counts_column(&grouped)?;
    let points = years
        .into_iter()
        .zip(counts)
        .filter_map(|(year, count)| year.map(|year| TrendPoint { year, count }))
        .collect();
    Ok(AggregateResult::Ready(points))
}

/// Distinct-crash counts by weekday and hour of day. Rows missing either value
/// are dropped; absent combinations are filled with 0.
pub fn hour_weekday_matrix(
    view: &DataFrame,
    schema: &ResolvedSchema,
) -> Result<AggregateResult<HourWeekdayMatrix>> {
    let (Some(hour), Some(weekday)) = (schema.column(Role::Hour), schema.column(Role::Weekday))
    else {
        return Ok(AggregateResult::placeholder(
            "Hour / weekday columns not found",
        ));
    };
    let grouped = view
        .clone()
        .lazy()
        .filter(col(hour).is_not_null().and(col(weekday).is_not_null()))
        .group_by_stable([col(weekday), col(hour)])
        .agg([count_expr(schema)])
        .collect()?;
    if grouped.height() == 0 {
        return Ok(AggregateResult::placeholder("No data for hour/weekday"));
    }

    let weekday_col = grouped.column(weekday)?;
    let hour_series = grouped
        .column(hour)?
        .as_materialized_series()
        .cast(&DataType::Int64)?;
    let hour_values = hour_series.i64()?;
    let counts = counts_column(&grouped)?;

    let mut cells: Vec<(String, i64, u32)> = Vec::with_capacity(grouped.height());
    for (idx, count) in counts.into_iter().enumerate() {
        if let Some(hour_value) = hour_values.get(idx) {
            cells.push((label_at(weekday_col, idx), hour_value, count));
        }
    }

    // Weekday rows in calendar order, then any non-calendar labels as seen.
    let mut weekdays: Vec<String> = WEEKDAY_ORDER
        .iter()
        .filter(|day| cells.iter().any(|(label, _, _)| label == *day))
        .map(|day| day.to_string())
        .collect();
    for (label, _, _) in &cells {
        if !weekdays.contains(label) {
            weekdays.push(label.clone());
        }
    }
    let mut hours: Vec<i64> = cells.iter().map(|(_, hour, _)| *hour).collect();
    hours.sort_unstable();
    hours.dedup();

    let mut matrix = vec![vec![0u32; hours.len()]; weekdays.len()];
    for (label, hour_value, count) in cells {
        let row = weekdays.iter().position(|day| *day == label);
        let column = hours.binary_search(&hour_value);
        if let (Some(row), Ok(column)) = (row, column) {
            matrix[row][column] = count;
        }
    }

    Ok(AggregateResult::Ready(HourWeekdayMatrix {
        weekdays,
        hours,
        counts: matrix,
    }))
}

/// Crash locations with hover metadata. When more than `sample_size` rows have
/// both coordinates, a deterministic fixed-seed subsample of exactly
/// `sample_size` rows is returned, so repeated calls on an identical view
/// yield an identical sample.
pub fn geo_sample(
    view: &DataFrame,
    schema: &ResolvedSchema,
    sample_size: usize,
    seed: u64,
) -> Result<AggregateResult<GeoSample>> {
    let (Some(lat), Some(lon)) = (
        schema.column(Role::Latitude),
        schema.column(Role::Longitude),
    ) else {
        return Ok(AggregateResult::placeholder("No location columns found"));
    };
    let located = view
        .clone()
        .lazy()
        .filter(col(lat).is_not_null().and(col(lon).is_not_null()))
        .collect()?;
    let total_located = located.height();
    let sampled = total_located > sample_size;
    let plotted = if sampled {
        sample_rows(&located, sample_size, seed)?
    } else {
        located
    };

    let lat_series = plotted
        .column(lat)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let lon_series = plotted
        .column(lon)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let lat_values = lat_series.f64()?;
    let lon_values = lon_series.f64()?;

    let label_column = schema
        .column(Role::Borough)
        .or_else(|| schema.column(Role::CollisionId));
    let id_column = schema.column(Role::CollisionId);
    let factor_column = schema.column(Role::Factor);

    let mut points = Vec::with_capacity(plotted.height());
    for idx in 0..plotted.height() {
        let (Some(latitude), Some(longitude)) = (lat_values.get(idx), lon_values.get(idx)) else {
            continue;
        };
        points.push(GeoPoint {
            latitude,
            longitude,
            label: opt_label(&plotted, label_column, idx).unwrap_or_default(),
            collision_id: opt_label(&plotted, id_column, idx),
            factor: opt_label(&plotted, factor_column, idx),
        });
    }

    Ok(AggregateResult::Ready(GeoSample {
        points,
        total_located,
        sampled,
    }))
}

/// Person records per injury category. The injury column was null-filled at
/// load, so every row lands in a category.
pub fn injury_distribution(
    view: &DataFrame,
    schema: &ResolvedSchema,
) -> Result<AggregateResult<Vec<CategoryCount>>> {
    let Some(injury) = schema.column(Role::Injury) else {
        return Ok(AggregateResult::placeholder("Injury column not found"));
    };
    let grouped = view
        .clone()
        .lazy()
        .group_by_stable([col(injury)])
        .agg([len().alias(COUNT_COLUMN)])
        .collect()?;
    Ok(AggregateResult::Ready(category_counts(&grouped, injury)?))
}

/// Deterministic subsample of exactly `sample_size` rows: evenly strided
/// indices with a seed-derived offset, so the same input always produces the
/// same rows.
fn sample_rows(df: &DataFrame, sample_size: usize, seed: u64) -> Result<DataFrame> {
    let total = df.height();
    if total <= sample_size {
        return Ok(df.clone());
    }
    let step = total / sample_size;
    let start_offset = (seed as usize) % step;
    let indices: Vec<u32> = (0..sample_size)
        .map(|i| ((start_offset + i * step).min(total - 1)) as u32)
        .collect();
    let indices = UInt32Chunked::new("indices".into(), indices);
    Ok(df.take(&indices)?)
}

fn category_counts(grouped: &DataFrame, label_column: &str) -> Result<Vec<CategoryCount>> {
    let labels = grouped.column(label_column)?;
    let counts = counts_column(grouped)?;
    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| CategoryCount {
            label: label_at(labels, idx),
            count,
        })
        .collect())
}

fn counts_column(grouped: &DataFrame) -> Result<Vec<u32>> {
    let series = grouped
        .column(COUNT_COLUMN)?
        .as_materialized_series()
        .cast(&DataType::UInt32)?;
    Ok(series
        .u32()?
        .into_iter()
        .map(|value| value.unwrap_or(0))
        .collect())
}

fn label_at(column: &Column, idx: usize) -> String {
    match column.get(idx) {
        Ok(AnyValue::Null) | Err(_) => String::new(),
        Ok(value) => value.str_value().to_string(),
    }
}

fn opt_label(df: &DataFrame, column: Option<&str>, idx: usize) -> Option<String> {
    let column = df.column(column?).ok()?;
    match column.get(idx) {
        Ok(AnyValue::Null) | Err(_) => None,
        Ok(value) => Some(value.str_value().to_string()),
    }
}
