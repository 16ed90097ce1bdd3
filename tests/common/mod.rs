//! Shared fixtures for integration tests.

use polars::prelude::*;

/// A small person-level collision table exercising every resolvable role,
/// including null coordinates, a null borough, and an unparsable date.
pub fn collision_frame() -> DataFrame {
    df!(
        "collision_id" => ["c1", "c1", "c2", "c3", "c4"],
        "borough" => [Some("BROOKLYN"), Some("BROOKLYN"), Some("QUEENS"), None, Some("BRONX")],
        "crash_date" => ["2022-01-03", "2022-01-03", "2019-06-14", "2020-03-02", "bad date"],
        "crash_hour" => [Some(8i64), Some(8), Some(17), None, Some(3)],
        "contributing_factor_vehicle_1" => [
            Some("Driver Inattention"),
            Some("Driver Inattention"),
            Some("Alcohol Involvement"),
            None,
            Some("Unspecified"),
        ],
        "vehicle_type_code_1" => ["Sedan", "Sedan", "Bike", "Taxi", "Sedan"],
        "person_age" => [Some(25i32), Some(40), Some(70), None, Some(16)],
        "person_injury" => [Some("Injured"), None, Some("Killed"), Some("Unspecified"), None],
        "latitude" => [Some(40.1f64), Some(40.1), None, Some(40.3), Some(40.4)],
        "longitude" => [Some(-73.9f64), Some(-73.9), Some(-73.8), None, Some(-73.7)],
    )
    .unwrap()
}

/// A table whose geolocated rows far exceed the sampling cap.
pub fn large_geo_frame(rows: usize) -> DataFrame {
    let ids: Vec<String> = (0..rows).map(|i| format!("c{}", i)).collect();
    let lat: Vec<f64> = (0..rows).map(|i| 40.0 + i as f64 * 1e-5).collect();
    let lon: Vec<f64> = (0..rows).map(|i| -74.0 + i as f64 * 1e-5).collect();
    df!(
        "collision_id" => ids,
        "latitude" => lat,
        "longitude" => lon,
    )
    .unwrap()
}
