//! Resolution of semantic roles onto the physical columns of a loaded table.
//!
//! Column names in collision exports vary between vintages of the dataset, so
//! each role carries an ordered list of candidate names. Resolution runs once
//! at load and the resulting mapping is passed explicitly into every
//! downstream function.

use std::collections::HashMap;
use std::fmt;

use polars::prelude::DataFrame;

/// A fixed semantic field the dashboard understands. A role may or may not map
/// to an actual column of the loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    CollisionId,
    Borough,
    Year,
    Date,
    Factor,
    VehicleType,
    Age,
    Injury,
    Latitude,
    Longitude,
    Hour,
    Weekday,
}

impl Role {
    pub const ALL: [Role; 12] = [
        Role::CollisionId,
        Role::Borough,
        Role::Year,
        Role::Date,
        Role::Factor,
        Role::VehicleType,
        Role::Age,
        Role::Injury,
        Role::Latitude,
        Role::Longitude,
        Role::Hour,
        Role::Weekday,
    ];

    /// Candidate column names, most specific first.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Role::CollisionId => &["collision_id"],
            Role::Borough => &["borough"],
            Role::Year => &["crash_year", "year"],
            Role::Date => &["crash_date_crash", "crash_date"],
            Role::Factor => &["contributing_factor_vehicle_1", "contributing_factor"],
            Role::VehicleType => &["vehicle_type_code_1", "vehicle_type"],
            Role::Age => &["person_age_imputed", "person_age"],
            Role::Injury => &["person_injury_clean", "person_injury"],
            Role::Latitude => &["latitude", "lat"],
            Role::Longitude => &["longitude", "lon", "long"],
            Role::Hour => &["crash_hour", "hour"],
            Role::Weekday => &["crash_weekday"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::CollisionId => "collision_id",
            Role::Borough => "borough",
            Role::Year => "year",
            Role::Date => "date",
            Role::Factor => "factor",
            Role::VehicleType => "vehicle_type",
            Role::Age => "age",
            Role::Injury => "injury",
            Role::Latitude => "latitude",
            Role::Longitude => "longitude",
            Role::Hour => "hour",
            Role::Weekday => "weekday",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The role-to-column mapping computed once at load. Roles without a matching
/// column are absent from the map and every consumer degrades to a placeholder.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSchema {
    columns: HashMap<Role, String>,
}

impl ResolvedSchema {
    /// Resolves each role against the table's column names.
    ///
    /// Two passes per role: first an exact (case-sensitive) match against the
    /// candidates in candidate order, then a scan of the columns in their
    /// original order returning the first whose name contains any candidate as
    /// a case-insensitive substring. Deterministic for a given column list.
    pub fn resolve<S: AsRef<str>>(column_names: &[S]) -> Self {
        let mut columns = HashMap::new();
        for role in Role::ALL {
            if let Some(found) = guess_column(column_names, role.candidates()) {
                columns.insert(role, found);
            }
        }
        Self { columns }
    }

    pub fn from_frame(df: &DataFrame) -> Self {
        Self::resolve(&df.get_column_names_str())
    }

    /// The resolved column for a role, or None when unresolved.
    pub fn column(&self, role: Role) -> Option<&str> {
        self.columns.get(&role).map(String::as_str)
    }

    pub fn is_resolved(&self, role: Role) -> bool {
        self.columns.contains_key(&role)
    }

    /// Records a derived column for a previously unresolved role.
    pub(crate) fn set(&mut self, role: Role, column: impl Into<String>) {
        self.columns.insert(role, column.into());
    }
}

impl fmt::Display for ResolvedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Detected columns:")?;
        for role in Role::ALL {
            match self.column(role) {
                Some(column) => writeln!(f, "  {}: {}", role, column)?,
                None => writeln!(f, "  {}: (not found)", role)?,
            }
        }
        Ok(())
    }
}

fn guess_column<S: AsRef<str>>(column_names: &[S], candidates: &[&str]) -> Option<String> {
    for candidate in candidates {
        if let Some(name) = column_names
            .iter()
            .map(AsRef::as_ref)
            .find(|name| name == candidate)
        {
            return Some(name.to_string());
        }
    }
    for name in column_names {
        let lower = name.as_ref().to_lowercase();
        for candidate in candidates {
            if lower.contains(&candidate.to_lowercase()) {
                return Some(name.as_ref().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_wins_over_substring() {
        let columns = ["the_crash_year_of_it", "year"];
        let schema = ResolvedSchema::resolve(&columns);
        assert_eq!(schema.column(Role::Year), Some("year"));
    }

    #[test]
    fn candidates_tried_in_order_for_exact_match() {
        let columns = ["year", "crash_year"];
        let schema = ResolvedSchema::resolve(&columns);
        assert_eq!(schema.column(Role::Year), Some("crash_year"));
    }

    #[test]
    fn substring_match_is_case_insensitive_and_column_ordered() {
        let columns = ["id", "BOROUGH_NAME", "borough_code"];
        let schema = ResolvedSchema::resolve(&columns);
        assert_eq!(schema.column(Role::Borough), Some("BOROUGH_NAME"));
    }

    #[test]
    fn unresolved_role_is_absent() {
        let columns = ["foo", "bar"];
        let schema = ResolvedSchema::resolve(&columns);
        assert!(!schema.is_resolved(Role::Latitude));
        assert_eq!(schema.column(Role::Latitude), None);
    }

    #[test]
    fn resolution_is_deterministic() {
        let columns = ["collision_id", "borough", "crash_date", "LATITUDE"];
        let a = ResolvedSchema::resolve(&columns);
        let b = ResolvedSchema::resolve(&columns);
        for role in Role::ALL {
            assert_eq!(a.column(role), b.column(role));
        }
    }

    #[test]
    fn longitude_candidates_do_not_grab_latitude() {
        // "lat" is a substring of "latitude" only; "lon" matches "longitude".
        let columns = ["latitude", "longitude"];
        let schema = ResolvedSchema::resolve(&columns);
        assert_eq!(schema.column(Role::Latitude), Some("latitude"));
        assert_eq!(schema.column(Role::Longitude), Some("longitude"));
    }
}
