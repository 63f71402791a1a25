//! # Material Specifications
//!
//! Derived figures for a coil material variant: minimum bend radius,
//! minimum loop length, and the coil OD implied by weight, width, and ID.
//! Also the feed-speed helper (FPM from feed length and strokes/minute).

use serde::{Deserialize, Serialize};

use crate::calculations::round4;
use crate::errors::{CalcError, CalcResult};
use crate::lookup::materials;

/// Input parameters for one material variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialSpecsInput {
    /// Material type name for the property lookup
    pub material_type: String,
    /// Material thickness (in)
    pub material_thickness: f64,
    /// Yield strength (psi)
    pub yield_strength: f64,
    /// Coil width (in)
    pub coil_width: f64,
    /// Coil weight (lbs)
    pub coil_weight: f64,
    /// Coil inner diameter (in)
    pub coil_id: f64,
}

/// Derived figures for one material variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialSpecsResult {
    /// Minimum bend radius before yielding (in)
    pub min_bend_radius: f64,
    /// Minimum free-loop length (ft)
    pub min_loop_length: f64,
    /// Coil OD implied by weight/width/ID, rounded up to a whole inch
    pub coil_od_calculated: f64,
}

/// Calculate derived material figures.
pub fn calculate(input: &MaterialSpecsInput) -> CalcResult<MaterialSpecsResult> {
    let material = materials::get_material(&input.material_type)?;

    // r_min = E * (t/2) / sigma_y; zero thickness or yield means the
    // variant is not yet filled in, so the derived figures stay zero.
    let min_bend_radius = if input.material_thickness > 0.0 && input.yield_strength > 0.0 {
        round4((material.modulus * (input.material_thickness / 2.0)) / input.yield_strength)
    } else {
        0.0
    };

    // Four bend radii of free loop, reported in feet.
    let min_loop_length = if min_bend_radius > 0.0 {
        round4((min_bend_radius * 4.0) / 12.0)
    } else {
        0.0
    };

    let coil_od_calculated = if input.coil_weight > 0.0 {
        if material.density <= 0.0 || input.coil_width <= 0.0 {
            return Err(CalcError::domain_invalid(
                "coil_od",
                "density and coil width must be positive to derive a coil OD",
            ));
        }
        let area_term =
            input.coil_weight / (material.density * std::f64::consts::PI * input.coil_width);
        let radius_term = (input.coil_id / 2.0).powi(2);
        ((area_term + radius_term).sqrt() * 2.0).ceil()
    } else {
        input.coil_id.ceil()
    };

    Ok(MaterialSpecsResult {
        min_bend_radius,
        min_loop_length,
        coil_od_calculated,
    })
}

/// Input to the feed-speed helper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FpmInput {
    /// Feed length (in)
    pub feed_length: f64,
    /// Strokes per minute
    pub spm: f64,
}

/// Feed speed (ft/min), or `None` when either input is not yet filled in.
pub fn calculate_fpm(input: &FpmInput) -> Option<f64> {
    if input.feed_length > 0.0 && input.spm > 0.0 {
        Some(((input.feed_length * input.spm) / 12.0 * 100.0).round() / 100.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_input() -> MaterialSpecsInput {
        MaterialSpecsInput {
            material_type: "STEEL".to_string(),
            material_thickness: 0.06,
            yield_strength: 60_000.0,
            coil_width: 36.0,
            coil_weight: 10_000.0,
            coil_id: 20.0,
        }
    }

    #[test]
    fn test_min_bend_radius() {
        let result = calculate(&test_input()).unwrap();
        // 29e6 * 0.03 / 60000 = 14.5
        assert!((result.min_bend_radius - 14.5).abs() < 1e-9);
        assert!((result.min_loop_length - round4(14.5 * 4.0 / 12.0)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_weight_od_is_coil_id() {
        let mut input = test_input();
        input.coil_weight = 0.0;
        let result = calculate(&input).unwrap();
        assert_eq!(result.coil_od_calculated, 20.0);
    }

    #[test]
    fn test_od_grows_with_weight() {
        let light = calculate(&test_input()).unwrap();
        let mut input = test_input();
        input.coil_weight = 30_000.0;
        let heavy = calculate(&input).unwrap();
        assert!(heavy.coil_od_calculated > light.coil_od_calculated);
    }

    #[test]
    fn test_unknown_material_fails() {
        let mut input = test_input();
        input.material_type = "KRYPTONITE".to_string();
        assert!(calculate(&input).is_err());
    }

    #[test]
    fn test_fpm_roundtrip() {
        // 12 in at 60 spm is exactly 60 ft/min.
        let fpm = calculate_fpm(&FpmInput {
            feed_length: 12.0,
            spm: 60.0,
        });
        assert_eq!(fpm, Some(60.0));
    }

    #[test]
    fn test_fpm_empty_inputs() {
        assert_eq!(
            calculate_fpm(&FpmInput {
                feed_length: 0.0,
                spm: 60.0
            }),
            None
        );
    }
}
