//! Filter criteria and predicate construction.
//!
//! Selections combine with AND across roles and OR across the values selected
//! within a role. The keyword search ORs across tokens and searchable columns:
//! a multi-word query matches rows satisfying any one keyword, not all of them.
//! That is how the original dashboard behaves and it is reproduced here
//! verbatim; see DESIGN.md.

use polars::prelude::*;

use crate::features::AGE_GROUP_COLUMN;
use crate::schema::{ResolvedSchema, Role};

/// One generate-report request: selected values per dropdown role plus the
/// free-text search string. An empty selection imposes no restriction on that
/// role, and a blank search string imposes none at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub boroughs: Vec<String>,
    pub years: Vec<i32>,
    pub vehicle_types: Vec<String>,
    pub factors: Vec<String>,
    pub age_groups: Vec<String>,
    pub search: String,
}

impl FilterCriteria {
    /// True when evaluating these criteria returns the full table.
    pub fn is_unrestricted(&self) -> bool {
        self.boroughs.is_empty()
            && self.years.is_empty()
            && self.vehicle_types.is_empty()
            && self.factors.is_empty()
            && self.age_groups.is_empty()
            && self.search.split_whitespace().next().is_none()
    }
}

/// Applies the criteria to a lazy view of the base table.
pub fn apply(lf: LazyFrame, criteria: &FilterCriteria, schema: &ResolvedSchema) -> LazyFrame {
    match filter_expr(criteria, schema) {
        Some(predicate) => lf.filter(predicate),
        None => lf,
    }
}

/// Builds the combined filter predicate, or None when the criteria impose no
/// restriction. A selection on a role whose column is unresolved is ignored
/// rather than failing.
pub fn filter_expr(criteria: &FilterCriteria, schema: &ResolvedSchema) -> Option<Expr> {
    let mut combined: Option<Expr> = None;

    if let Some(column) = schema.column(Role::Borough) {
        combined = and_opt(combined, string_membership(column, &criteria.boroughs));
    }
    if let Some(column) = schema.column(Role::Year) {
        combined = and_opt(
            combined,
            any_of(criteria.years.iter().map(|y| col(column).eq(lit(*y)))),
        );
    }
    if let Some(column) = schema.column(Role::VehicleType) {
        combined = and_opt(combined, string_membership(column, &criteria.vehicle_types));
    }
    if let Some(column) = schema.column(Role::Factor) {
        combined = and_opt(combined, string_membership(column, &criteria.factors));
    }
    // age_group is derived at load and always present.
    combined = and_opt(
        combined,
        string_membership(AGE_GROUP_COLUMN, &criteria.age_groups),
    );

    and_opt(combined, search_expr(&criteria.search, schema))
}

/// The keyword-search predicate: for each whitespace token, a row matches if
/// any searchable column's string form contains the token case-insensitively
/// (nulls never match); tokens combine with OR. Returns None for a blank
/// search string.
pub(crate) fn search_expr(search: &str, schema: &ResolvedSchema) -> Option<Expr> {
    let columns = searchable_columns(schema);
    let token_match = |token: &str| {
        let needle = token.to_lowercase();
        any_of(columns.iter().map(|column| {
            col(column.as_str())
                .cast(DataType::String)
                .str()
                .to_lowercase()
                .str()
                .contains_literal(lit(needle.clone()))
                .fill_null(lit(false))
        }))
    };
    any_of(search.split_whitespace().filter_map(token_match))
}

/// Columns the free-text search scans: the resolved borough, factor, vehicle
/// type and injury columns, the derived age group, and the year column.
fn searchable_columns(schema: &ResolvedSchema) -> Vec<String> {
    let mut columns: Vec<String> = [Role::Borough, Role::Factor, Role::VehicleType, Role::Injury]
        .iter()
        .filter_map(|role| schema.column(*role).map(str::to_string))
        .collect();
    columns.push(AGE_GROUP_COLUMN.to_string());
    if let Some(year) = schema.column(Role::Year) {
        columns.push(year.to_string());
    }
    columns
}

fn string_membership(column: &str, selected: &[String]) -> Option<Expr> {
    any_of(
        selected
            .iter()
            .map(|value| col(column).cast(DataType::String).eq(lit(value.as_str()))),
    )
}

fn any_of(exprs: impl Iterator<Item = Expr>) -> Option<Expr> {
    exprs.reduce(|acc, e| acc.or(e))
}

fn and_opt(acc: Option<Expr>, next: Option<Expr>) -> Option<Expr> {
    match (acc, next) {
        (Some(a), Some(b)) => Some(a.and(b)),
        (some, None) => some,
        (None, some) => some,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::derive_features;

    fn filtered(df: DataFrame, criteria: &FilterCriteria) -> DataFrame {
        let mut schema = ResolvedSchema::from_frame(&df);
        let table = derive_features(df, &mut schema).unwrap();
        apply(table.lazy(), criteria, &schema).collect().unwrap()
    }

    fn sample() -> DataFrame {
        df!(
            "collision_id" => ["1", "2", "3", "4"],
            "borough" => [Some("BROOKLYN"), Some("QUEENS"), Some("BROOKLYN"), None],
            "crash_year" => [2022i32, 2019, 2020, 2022],
            "vehicle_type_code_1" => ["Sedan", "Bike", "Taxi", "Sedan"],
        )
        .unwrap()
    }

    #[test]
    fn empty_criteria_keep_all_rows() {
        let criteria = FilterCriteria::default();
        assert!(criteria.is_unrestricted());
        assert_eq!(filtered(sample(), &criteria).height(), 4);
    }

    #[test]
    fn whitespace_only_search_is_unrestricted() {
        let criteria = FilterCriteria {
            search: "   ".into(),
            ..Default::default()
        };
        assert!(criteria.is_unrestricted());
        assert_eq!(filtered(sample(), &criteria).height(), 4);
    }

    #[test]
    fn roles_combine_conjunctively() {
        let criteria = FilterCriteria {
            boroughs: vec!["BROOKLYN".into()],
            years: vec![2022],
            ..Default::default()
        };
        let out = filtered(sample(), &criteria);
        assert_eq!(out.height(), 1);
    }

    #[test]
    fn values_within_a_role_combine_disjunctively() {
        let criteria = FilterCriteria {
            years: vec![2019, 2020],
            ..Default::default()
        };
        assert_eq!(filtered(sample(), &criteria).height(), 2);
    }

    #[test]
    fn selection_on_unresolved_role_is_ignored() {
        let df = df!("crash_year" => [2022i32, 2019]).unwrap();
        let criteria = FilterCriteria {
            boroughs: vec!["BROOKLYN".into()],
            ..Default::default()
        };
        assert_eq!(filtered(df, &criteria).height(), 2);
    }

    #[test]
    fn multi_keyword_search_matches_any_token() {
        // Row 1 matches "Brooklyn", row 2 matches "2019": both are kept.
        let criteria = FilterCriteria {
            search: "Brooklyn 2019".into(),
            ..Default::default()
        };
        let out = filtered(sample(), &criteria);
        assert_eq!(out.height(), 3); // two BROOKLYN rows plus the 2019 row
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let criteria = FilterCriteria {
            search: "sEdA".into(),
            ..Default::default()
        };
        assert_eq!(filtered(sample(), &criteria).height(), 2);
    }

    #[test]
    fn null_values_never_match_search() {
        let criteria = FilterCriteria {
            search: "null".into(),
            ..Default::default()
        };
        assert_eq!(filtered(sample(), &criteria).height(), 0);
    }

    #[test]
    fn no_token_matches_yields_empty_view() {
        let criteria = FilterCriteria {
            search: "zzzz".into(),
            ..Default::default()
        };
        assert_eq!(filtered(sample(), &criteria).height(), 0);
    }
}
