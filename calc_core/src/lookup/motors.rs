//! Motor rotor inertia by horsepower rating.

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::lookup::{fetch, TABLES};

/// Rotor inertia record for one motor frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotorInertia {
    pub motor_inertia: f64,
}

/// The table key for a horsepower value. 7.5 HP is the one fractional
/// frame; every other rating is keyed by its integer value.
pub fn hp_label(horsepower: f64) -> String {
    if (horsepower - 7.5).abs() < f64::EPSILON {
        "7.5".to_string()
    } else {
        format!("{}", horsepower as i64)
    }
}

/// Rotor inertia for a motor horsepower rating.
pub fn get_motor_inertia(horsepower: f64) -> CalcResult<f64> {
    Ok(fetch("motor_inertia", &TABLES.motor_inertia, &hp_label(horsepower))?.motor_inertia)
}
