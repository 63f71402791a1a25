//! # Machine Calculations
//!
//! One orchestrator per machine type. Each calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable)
//! - `calculate(input) -> CalcResult<*Result>` - Pure calculation function
//!
//! Every orchestrator resolves its lookups fail-fast (the first missing key
//! aborts the whole calculation), computes a linear chain of intermediate
//! quantities, rounds reported floats to 3 decimal places (4 where the
//! ratio-like quantities need it), and derives its pass/fail check strings
//! by threshold comparison.
//!
//! ## Available Calculations
//!
//! - [`material_specs`] - Coil material derived figures (bend radius, loop length, OD)
//! - [`tddbhd`] - Reel brake and holddown sizing
//! - [`reel_drive`] - Motorized reel drive sizing
//! - [`str_utility`] - Powered straightener sizing
//! - [`backbend`] - Roll straightener backbend solver
//! - [`feed`] - Servo feed sizing (sigma-five, pull-thru, Allen-Bradley)
//! - [`hyd_shear`] - Hydraulic shear sizing (single-rake, bow-tie)
//! - [`zig_zag`] - Zig-zag drive sizing

pub mod backbend;
pub mod feed;
pub mod hyd_shear;
pub mod material_specs;
pub mod reel_drive;
pub mod str_utility;
pub mod tddbhd;
pub mod zig_zag;

use crate::errors::{CalcError, CalcResult};

/// Round to 3 decimal places for reported values.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Round to 4 decimal places for ratio-like reported values.
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10000.0).round() / 10000.0
}

/// Parse a yes/no flag. Anything other than yes/y/no/n (case-insensitive)
/// is a configuration mismatch, never a silent default.
pub(crate) fn parse_yes_no(field: &str, value: &str) -> CalcResult<bool> {
    match value.to_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        _ => Err(CalcError::configuration_mismatch(field, value)),
    }
}

/// "OK" / "NOT OK" from a pass condition.
pub(crate) fn check(pass: bool) -> String {
    if pass { "OK" } else { "NOT OK" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding() {
        assert_eq!(round3(1.23456), 1.235);
        assert_eq!(round4(0.123449), 0.1234);
    }

    #[test]
    fn test_parse_yes_no() {
        assert!(parse_yes_no("loop_pit", "Yes").unwrap());
        assert!(!parse_yes_no("loop_pit", "n").unwrap());
        let err = parse_yes_no("loop_pit", "maybe").unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_MISMATCH");
    }
}
