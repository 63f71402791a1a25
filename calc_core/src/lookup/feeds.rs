//! Feed-head model tables: servo drive specs and the bill of elements that
//! drives the reflected-inertia summation.
//!
//! Three tables exist, one per product line (sigma-five, sigma-five with
//! pull-thru straightener, Allen-Bradley). Each model record carries an
//! explicit [`FeedFamily`] tag; element-length rules branch on the family,
//! never on substrings of the model name.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::lookup::fetch_upper;

/// Size family of a feed head. Determines the element-length geometry
/// rules in the reflected-inertia engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFamily {
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    S8,
}

/// Geometry rule group shared by several families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyGroup {
    /// S1/S2: fixed overhang per element, roll width flag ignored
    S1S2,
    /// S3-S5: per-model overhangs and tapered-port rules
    S3S5,
    /// S6-S8: split upper/lower roll pairs
    S6S8,
}

impl FeedFamily {
    pub fn group(self) -> FamilyGroup {
        match self {
            FeedFamily::S1 | FeedFamily::S2 => FamilyGroup::S1S2,
            FeedFamily::S3 | FeedFamily::S4 | FeedFamily::S5 => FamilyGroup::S3S5,
            FeedFamily::S6 | FeedFamily::S7 | FeedFamily::S8 => FamilyGroup::S6S8,
        }
    }
}

/// Servo drive constants for one feed model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedDriveSpecs {
    /// Maximum motor speed (rpm)
    pub max_motor_rpm: f64,
    /// Motor rotor inertia
    pub motor_inertia: f64,
    /// Motor peak torque (in-lbs)
    pub motor_peak_torque: f64,
    /// Motor continuous (RMS) torque rating (in-lbs)
    pub motor_rms_torque: f64,
    /// Upper feed roll diameter (in)
    pub u_roll: f64,
    /// Lower feed roll diameter (in)
    pub l_roll: f64,
    /// Overall gear ratio, motor to roll
    pub ratio: f64,
    /// Drive train efficiency
    pub efficiency: f64,
    /// Settle torque (in-lbs)
    pub settle_torque: f64,
    /// Constant friction torque at the motor (in-lbs); absent for
    /// Allen-Bradley drives
    #[serde(default)]
    pub friction_torque: f64,
    /// Servo winding losses (W)
    pub watts_lost: f64,
    /// Regen capacitor energy (J)
    pub ec: f64,
    /// Pull-thru straightener roll center distance (in); zero for
    /// non-pull-thru models
    #[serde(default)]
    pub center_distance: f64,
}

/// One element of a feed head's bill of elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedElement {
    /// Outer diameter (in)
    pub o_dia: f64,
    /// Inner diameter (in), 0 for solid
    pub i_dia: f64,
    /// Density (lb/in³)
    pub density: f64,
    /// Element gear ratio; 0 means "reflected through the feed ratio"
    pub ratio: f64,
    /// Quantity of this element
    pub qty: u32,
    /// Default length (in) where no geometry rule applies
    #[serde(default)]
    pub length: f64,
    /// Rated inertia for gearbox elements
    #[serde(default)]
    pub inertia: f64,
}

/// Full record for one feed model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedModelConfig {
    pub family: FeedFamily,
    pub drive: FeedDriveSpecs,
    pub elements: BTreeMap<String, FeedElement>,
}

/// Which feed product line a model belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedTable {
    SigmaFive,
    SigmaFivePullThru,
    AllenBradley,
}

impl FeedTable {
    fn name(self) -> &'static str {
        match self {
            FeedTable::SigmaFive => "sigma_five_feed_models",
            FeedTable::SigmaFivePullThru => "sigma_five_pullthru_models",
            FeedTable::AllenBradley => "allen_bradley_models",
        }
    }
}

static SIGMA_FIVE: Lazy<BTreeMap<String, FeedModelConfig>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../data/sigma_five_feed_models.json"))
        .expect("embedded sigma_five_feed_models.json is well-formed")
});

static SIGMA_FIVE_PT: Lazy<BTreeMap<String, FeedModelConfig>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../data/sigma_five_pullthru_models.json"))
        .expect("embedded sigma_five_pullthru_models.json is well-formed")
});

static ALLEN_BRADLEY: Lazy<BTreeMap<String, FeedModelConfig>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../data/allen_bradley_models.json"))
        .expect("embedded allen_bradley_models.json is well-formed")
});

fn table(which: FeedTable) -> &'static BTreeMap<String, FeedModelConfig> {
    match which {
        FeedTable::SigmaFive => &SIGMA_FIVE,
        FeedTable::SigmaFivePullThru => &SIGMA_FIVE_PT,
        FeedTable::AllenBradley => &ALLEN_BRADLEY,
    }
}

/// Look up a feed model in a specific product-line table.
pub fn get_feed_model(which: FeedTable, model: &str) -> CalcResult<&'static FeedModelConfig> {
    fetch_upper(which.name(), table(which), model)
}

/// Look up a feed model across all three product-line tables.
pub fn find_feed_model(model: &str) -> CalcResult<&'static FeedModelConfig> {
    let upper = model.to_uppercase();
    for which in [
        FeedTable::SigmaFive,
        FeedTable::SigmaFivePullThru,
        FeedTable::AllenBradley,
    ] {
        if let Some(config) = table(which).get(&upper) {
            return Ok(config);
        }
    }
    Err(CalcError::lookup_not_found("feed_models", upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_lookup() {
        let model = get_feed_model(FeedTable::SigmaFive, "cprf-s3").unwrap();
        assert_eq!(model.family, FeedFamily::S3);
        assert!(model.elements.contains_key("u_roll_1"));
        assert!(model.elements.contains_key("g_box"));
    }

    #[test]
    fn test_family_groups() {
        assert_eq!(FeedFamily::S2.group(), FamilyGroup::S1S2);
        assert_eq!(FeedFamily::S4.group(), FamilyGroup::S3S5);
        assert_eq!(FeedFamily::S8.group(), FamilyGroup::S6S8);
    }

    #[test]
    fn test_plain_six_is_family_tagged() {
        // "CPRF-6" carries no "S6" substring; the family tag in the
        // table is what places it in the S6-S8 geometry group.
        let model = get_feed_model(FeedTable::SigmaFive, "CPRF-6").unwrap();
        assert_eq!(model.family.group(), FamilyGroup::S6S8);
    }

    #[test]
    fn test_find_searches_all_tables() {
        assert!(find_feed_model("CPRF-S3 ES").is_ok());
        assert!(find_feed_model("CPRF-S3 MPL").is_ok());
        let err = find_feed_model("CPRF-S99").unwrap_err();
        assert!(err.to_string().contains("feed_models"));
    }

    #[test]
    fn test_allen_bradley_has_no_friction_torque() {
        let model = get_feed_model(FeedTable::AllenBradley, "CPRF-S3 MPL").unwrap();
        assert_eq!(model.drive.friction_torque, 0.0);
    }

    #[test]
    fn test_pull_thru_center_distance() {
        let model = get_feed_model(FeedTable::SigmaFivePullThru, "CPRF-S4 HS").unwrap();
        assert!(model.drive.center_distance > 0.0);
    }
}
