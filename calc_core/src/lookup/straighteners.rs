//! Straightener model geometry and gear train data.

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::lookup::{fetch_upper, TABLES};

/// Geometry and drive constants for one straightener model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StraightenerModel {
    /// Straightener roll diameter (in)
    pub roll_diameter: f64,
    /// Roll center distance (in)
    pub center_distance: f64,
    /// Pinch roll diameter (in)
    pub pinch_roll_dia: f64,
    /// Jack force available (lbs)
    pub jack_force_avail: f64,
    /// Maximum roll depth without material (in)
    pub min_roll_depth: f64,
    /// Straightener gear torque constant
    pub str_gear_torq: f64,
    /// Pinch roll gear tooth count
    pub pr_teeth: u32,
    /// Pinch roll gear diametral pitch
    pub proll_dp: f64,
    /// Straightener roll gear tooth count
    pub sroll_teeth: u32,
    /// Straightener roll gear diametral pitch
    pub sroll_dp: f64,
    /// Gear face width (in)
    pub face_width: f64,
    /// Backbend top correction factor (first/last stage)
    pub top: f64,
    /// Backbend bottom correction factor (first/last stage)
    pub bottom: f64,
}

/// Look up the full record for a straightener model.
pub fn get_str_model(model: &str) -> CalcResult<&'static StraightenerModel> {
    fetch_upper("str_models", &TABLES.str_models, model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_lookup() {
        let model = get_str_model("cpps-250").unwrap();
        assert_eq!(model.roll_diameter, 2.5);
        assert_eq!(model.center_distance, 3.0);
    }

    #[test]
    fn test_unknown_model() {
        let err = get_str_model("CPPS-999").unwrap_err();
        assert_eq!(err.error_code(), "LOOKUP_NOT_FOUND");
        assert!(err.to_string().contains("str_models"));
    }
}
