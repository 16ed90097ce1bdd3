//! The report engine: owns the loaded table and its resolved schema, and turns
//! filter criteria into a bundle of chart-ready results.

use color_eyre::Result;
use polars::prelude::*;
use serde::Serialize;

use crate::aggregate::{
    self, AggregateResult, CategoryCount, GeoSample, HourWeekdayMatrix, TrendPoint,
    GEO_SAMPLE_SEED, GEO_SAMPLE_SIZE,
};
use crate::criteria::{self, FilterCriteria};
use crate::features::{derive_features, AGE_GROUP_COLUMN, AGE_GROUP_LABELS, UNKNOWN_AGE_GROUP};
use crate::kpi::{kpi_summary, KpiSummary};
use crate::schema::{ResolvedSchema, Role};

/// Shown in every chart slot when the filters match nothing.
pub const NO_DATA_MESSAGE: &str = "No data for the selected filters and search query.";

/// A loaded table with its resolved schema and derived columns, ready to
/// answer generate-report requests. The table is immutable once constructed;
/// every evaluation filters a fresh lazy view of it.
pub struct Dashboard {
    table: DataFrame,
    schema: ResolvedSchema,
    geo_sample_size: usize,
    geo_sample_seed: u64,
}

/// Everything one generate-report request produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultBundle {
    pub borough_counts: AggregateResult<Vec<CategoryCount>>,
    pub yearly_trend: AggregateResult<Vec<TrendPoint>>,
    pub hour_weekday: AggregateResult<HourWeekdayMatrix>,
    pub geo: AggregateResult<GeoSample>,
    pub injuries: AggregateResult<Vec<CategoryCount>>,
    pub kpi: KpiSummary,
    /// Rows of the filtered view the bundle was computed from.
    pub matched_records: usize,
}

impl ResultBundle {
    /// The bundle returned for an empty filtered view: every chart slot holds
    /// the no-data message and the KPI figures are zero.
    pub fn no_data() -> Self {
        ResultBundle {
            borough_counts: AggregateResult::placeholder(NO_DATA_MESSAGE),
            yearly_trend: AggregateResult::placeholder(NO_DATA_MESSAGE),
            hour_weekday: AggregateResult::placeholder(NO_DATA_MESSAGE),
            geo: AggregateResult::placeholder(NO_DATA_MESSAGE),
            injuries: AggregateResult::placeholder(NO_DATA_MESSAGE),
            kpi: KpiSummary {
                distinct_collisions: 0,
                total_records: 0,
                mean_age: None,
            },
            matched_records: 0,
        }
    }

    /// The headline sentence, or the no-data message for an empty view.
    pub fn kpi_sentence(&self) -> String {
        if self.matched_records == 0 {
            NO_DATA_MESSAGE.to_string()
        } else {
            self.kpi.sentence()
        }
    }
}

impl Dashboard {
    /// Resolves the schema of `table`, derives the computed columns, and
    /// returns an engine using the default geo sampling parameters.
    pub fn new(table: DataFrame) -> Result<Self> {
        Self::with_sampling(table, GEO_SAMPLE_SIZE, GEO_SAMPLE_SEED)
    }

    pub fn with_sampling(table: DataFrame, geo_sample_size: usize, geo_sample_seed: u64) -> Result<Self> {
        let mut schema = ResolvedSchema::from_frame(&table);
        let table = derive_features(table, &mut schema)?;
        Ok(Dashboard {
            table,
            schema,
            geo_sample_size,
            geo_sample_seed,
        })
    }

    pub fn schema(&self) -> &ResolvedSchema {
        &self.schema
    }

    /// Rows in the base table.
    pub fn total_records(&self) -> usize {
        self.table.height()
    }

    /// Evaluates one generate-report request against the base table.
    pub fn evaluate(&self, criteria: &FilterCriteria) -> Result<ResultBundle> {
        let view = criteria::apply(self.table.clone().lazy(), criteria, &self.schema).collect()?;
        if view.height() == 0 {
            return Ok(ResultBundle::no_data());
        }
        Ok(ResultBundle {
            borough_counts: aggregate::borough_counts(&view, &self.schema)?,
            yearly_trend: aggregate::yearly_trend(&view, &self.schema)?,
            hour_weekday: aggregate::hour_weekday_matrix(&view, &self.schema)?,
            geo: aggregate::geo_sample(
                &view,
                &self.schema,
                self.geo_sample_size,
                self.geo_sample_seed,
            )?,
            injuries: aggregate::injury_distribution(&view, &self.schema)?,
            kpi: kpi_summary(&view, &self.schema)?,
            matched_records: view.height(),
        })
    }

    /// Distinct non-null values of the column a role resolved to, sorted.
    /// Empty for unresolved roles.
    pub fn options(&self, role: Role) -> Result<Vec<String>> {
        let Some(column) = self.schema.column(role) else {
            return Ok(Vec::new());
        };
        self.distinct_strings(column)
    }

    /// Distinct years present in the table, sorted ascending.
    pub fn year_options(&self) -> Result<Vec<i32>> {
        let Some(column) = self.schema.column(Role::Year) else {
            return Ok(Vec::new());
        };
        let unique = self
            .table
            .column(column)?
            .as_materialized_series()
            .unique()?
            .cast(&DataType::Int32)?;
        let mut years: Vec<i32> = unique.i32()?.into_iter().flatten().collect();
        years.sort_unstable();
        Ok(years)
    }

    /// Distinct age groups present in the table, in bin order with the
    /// unknown group last.
    pub fn age_group_options(&self) -> Result<Vec<String>> {
        let present = self.distinct_strings(AGE_GROUP_COLUMN)?;
        let mut ordered: Vec<String> = AGE_GROUP_LABELS
            .iter()
            .map(|label| label.to_string())
            .filter(|label| present.contains(label))
            .collect();
        if present.iter().any(|label| label == UNKNOWN_AGE_GROUP) {
            ordered.push(UNKNOWN_AGE_GROUP.to_string());
        }
        Ok(ordered)
    }

    fn distinct_strings(&self, column: &str) -> Result<Vec<String>> {
        let unique = self
            .table
            .column(column)?
            .as_materialized_series()
            .unique()?
            .cast(&DataType::String)?;
        let mut values: Vec<String> = unique
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        values.sort();
        Ok(values)
    }
}
