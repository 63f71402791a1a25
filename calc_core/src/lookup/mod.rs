//! # Lookup Tables
//!
//! Static reference data for coil-processing machinery: material properties,
//! reel and straightener model dimensions, feed-head drive specs and bills of
//! elements, motor inertia ratings, and the reel holddown/brake matrices.
//!
//! All tables are JSON embedded in the binary and parsed once on first use.
//! They are read-only for the process lifetime and safe to share across
//! threads without locking. Accessors uppercase their model/material keys
//! before lookup; a missing key always fails with
//! [`CalcError::LookupNotFound`](crate::errors::CalcError) naming the table
//! and the key, identically on every call.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::lookup::materials;
//!
//! let steel = materials::get_material("steel").unwrap();
//! assert_eq!(steel.density, 0.283);
//! ```

pub mod feeds;
pub mod materials;
pub mod motors;
pub mod reels;
pub mod straighteners;

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::errors::{CalcError, CalcResult};

/// The full contents of `data/lookup_tables.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawTables {
    pub materials: BTreeMap<String, materials::MaterialProperties>,
    pub reels: BTreeMap<String, reels::ReelDimensions>,
    pub model_families: BTreeMap<String, reels::ModelFamilies>,
    pub holddown_sort: BTreeMap<String, reels::HolddownSort>,
    pub brake_types: BTreeMap<String, reels::BrakeType>,
    pub holddown_matrix: Vec<reels::HolddownMatrixEntry>,
    pub drive_torque: BTreeMap<String, reels::DriveTorque>,
    pub motor_inertia: BTreeMap<String, motors::MotorInertia>,
    pub type_of_line: BTreeMap<String, reels::LineType>,
    pub fpm_buffer: BTreeMap<String, f64>,
    pub str_models: BTreeMap<String, straighteners::StraightenerModel>,
}

pub(crate) static TABLES: Lazy<RawTables> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../data/lookup_tables.json"))
        .expect("embedded lookup_tables.json is well-formed")
});

/// Look up `key` verbatim in `map`, failing with the table name.
pub(crate) fn fetch<'a, T>(
    table: &'static str,
    map: &'a BTreeMap<String, T>,
    key: &str,
) -> CalcResult<&'a T> {
    map.get(key)
        .ok_or_else(|| CalcError::lookup_not_found(table, key))
}

/// Look up `key` after uppercasing, failing with the table name.
pub(crate) fn fetch_upper<'a, T>(
    table: &'static str,
    map: &'a BTreeMap<String, T>,
    key: &str,
) -> CalcResult<&'a T> {
    let upper = key.to_uppercase();
    map.get(&upper)
        .ok_or_else(|| CalcError::lookup_not_found(table, upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_parse() {
        // Force the Lazy to evaluate; a malformed data file fails here.
        assert!(!TABLES.materials.is_empty());
        assert!(!TABLES.reels.is_empty());
        assert!(!TABLES.str_models.is_empty());
        assert!(!TABLES.holddown_matrix.is_empty());
    }

    #[test]
    fn test_missing_key_is_deterministic() {
        let first = fetch_upper("materials", &TABLES.materials, "unobtainium").unwrap_err();
        let second = fetch_upper("materials", &TABLES.materials, "unobtainium").unwrap_err();
        assert_eq!(first, second);
        assert_eq!(first.error_code(), "LOOKUP_NOT_FOUND");
    }
}
