//! Headline figures for the filtered view.

use color_eyre::Result;
use polars::prelude::*;
use serde::Serialize;

use crate::schema::{ResolvedSchema, Role};

/// Distinct collisions, person records, and mean age of the filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub distinct_collisions: usize,
    pub total_records: usize,
    /// Mean of the age column over non-null rows; None when the age column is
    /// unresolved or entirely null.
    pub mean_age: Option<f64>,
}

impl KpiSummary {
    /// The one-sentence report header. The mean age renders as `N/A` when
    /// unavailable.
    pub fn sentence(&self) -> String {
        let age = match self.mean_age {
            Some(mean) => format!("{:.1}", mean),
            None => "N/A".to_string(),
        };
        format!(
            "Report generated from {} distinct collisions and {} person records. \
             Average age of involved persons: {}.",
            self.distinct_collisions, self.total_records, age
        )
    }
}

/// Computes the KPI figures. With no collision id column, every row counts as
/// its own collision.
pub fn kpi_summary(view: &DataFrame, schema: &ResolvedSchema) -> Result<KpiSummary> {
    let total_records = view.height();
    let distinct_collisions = match schema.column(Role::CollisionId) {
        Some(id) => view.column(id)?.as_materialized_series().n_unique()?,
        None => total_records,
    };
    let mean_age = match schema.column(Role::Age) {
        Some(age) => view
            .column(age)?
            .as_materialized_series()
            .cast(&DataType::Float64)?
            .mean(),
        None => None,
    };
    Ok(KpiSummary {
        distinct_collisions,
        total_records,
        mean_age,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_distinct_collisions_and_rows() -> color_eyre::Result<()> {
        let df = df!(
            "collision_id" => ["1", "1", "2"],
            "person_age" => [Some(20i32), Some(40), None],
        )?;
        let schema = ResolvedSchema::from_frame(&df);
        let kpi = kpi_summary(&df, &schema)?;
        assert_eq!(kpi.distinct_collisions, 2);
        assert_eq!(kpi.total_records, 3);
        assert_eq!(kpi.mean_age, Some(30.0));
        Ok(())
    }

    #[test]
    fn rows_count_as_collisions_without_id_column() -> color_eyre::Result<()> {
        let df = df!("borough" => ["BROOKLYN", "QUEENS"])?;
        let schema = ResolvedSchema::from_frame(&df);
        let kpi = kpi_summary(&df, &schema)?;
        assert_eq!(kpi.distinct_collisions, 2);
        assert_eq!(kpi.total_records, 2);
        assert_eq!(kpi.mean_age, None);
        Ok(())
    }

    #[test]
    fn sentence_formats_mean_age_to_one_decimal() {
        let kpi = KpiSummary {
            distinct_collisions: 2,
            total_records: 3,
            mean_age: Some(30.25),
        };
        assert_eq!(
            kpi.sentence(),
            "Report generated from 2 distinct collisions and 3 person records. \
             Average age of involved persons: 30.2."
        );
    }

    #[test]
    fn sentence_uses_na_without_mean_age() {
        let kpi = KpiSummary {
            distinct_collisions: 0,
            total_records: 0,
            mean_age: None,
        };
        assert!(kpi.sentence().ends_with("Average age of involved persons: N/A."));
    }
}
