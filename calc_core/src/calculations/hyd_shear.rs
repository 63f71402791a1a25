//! # Hydraulic Shear Sizing
//!
//! Cut force and cylinder hydraulics for the single-rake and bow-tie shear
//! configurations. The blade angle follows from the rake per foot; the
//! initial cut area from thickness and blade angle (a bow-tie blade engages
//! from both ends at once, doubling the cut area); the cylinders from bore,
//! rod, stroke, and system pressure.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Shear blade configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShearVariant {
    SingleRake,
    BowTie,
}

/// Input parameters for the hydraulic shear calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydShearInput {
    /// Material thickness to cut (in)
    pub material_thickness: f64,
    /// Coil width (in)
    pub coil_width: f64,
    /// Material ultimate tensile strength (psi)
    pub material_tensile: f64,

    /// Blade rake (in per ft)
    pub rake_of_blade: f64,
    /// Blade overlap at the end of the stroke (in)
    pub overlap: f64,
    /// Blade opening above the material (in)
    pub blade_opening: f64,
    /// Fraction of thickness the blade penetrates before fracture
    pub percent_of_penetration: f64,

    /// Cylinder bore (in)
    pub bore_size: f64,
    /// Cylinder rod diameter (in)
    pub rod_dia: f64,
    /// Cylinder stroke (in)
    pub stroke: f64,
    /// Hydraulic system pressure (psi)
    pub pressure: f64,

    /// Down-stroke time (s)
    pub time_for_down_stroke: f64,
    /// Dwell between parts (s)
    pub dwell_time: f64,
}

impl HydShearInput {
    fn validate(&self) -> CalcResult<()> {
        if self.material_thickness <= 0.0 {
            return Err(CalcError::domain_invalid(
                "material_thickness",
                "material thickness must be positive",
            ));
        }
        if self.rake_of_blade <= 0.0 {
            return Err(CalcError::domain_invalid(
                "rake_of_blade",
                "blade rake must be positive",
            ));
        }
        if self.bore_size <= self.rod_dia {
            return Err(CalcError::domain_invalid(
                "bore_size",
                "cylinder bore must exceed the rod diameter",
            ));
        }
        if self.time_for_down_stroke <= 0.0 {
            return Err(CalcError::domain_invalid(
                "time_for_down_stroke",
                "down-stroke time must be positive",
            ));
        }
        Ok(())
    }
}

/// Results of the hydraulic shear calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydShearResult {
    /// Shear strength, 75% of tensile (psi)
    pub shear_strength: f64,

    /// Blade angle from rake (degrees)
    pub angle_of_blade: f64,
    /// Length of blade engaged at first contact (in)
    pub length_of_init_cut: f64,
    /// Cut cross-section at first contact (in²)
    pub area_of_cut: f64,

    /// Stroke needed for the blade to clear the cut (in)
    pub min_stroke_for_blade: f64,
    /// Stroke needed including the opening (in)
    pub min_stroke_req_for_opening: f64,
    /// Opening above the thickest material (in)
    pub actual_opening_above_max_material: f64,

    /// Annular cylinder area (in²)
    pub cylinder_area: f64,
    /// Swept cylinder volume (in³)
    pub cylinder_volume: f64,
    /// Oil velocity in the cylinder (ft/s)
    pub fluid_velocity: f64,

    pub force_per_cylinder: f64,
    pub total_force_applied_lbs: f64,
    pub force_req_to_shear: f64,
    pub force_req_to_shear_check: String,
    pub total_force_applied_tons: f64,
    pub safety_factor: f64,

    pub instant_gallons_per_minute_req: f64,
    pub averaged_gallons_per_minute_req: f64,
    pub shear_strokes_per_minute: f64,
    pub parts_per_minute: f64,
    pub parts_per_hour: f64,
}

/// Calculate hydraulic shear sizing for either blade configuration.
pub fn calculate(input: &HydShearInput, variant: ShearVariant) -> CalcResult<HydShearResult> {
    input.validate()?;

    let pi = std::f64::consts::PI;

    let shear_strength = input.material_tensile * 0.75;

    let angle_of_blade = (input.rake_of_blade / 12.0).atan() / pi * 180.0;
    let angle_rad = angle_of_blade.to_radians();
    let length_of_init_cut = input.material_thickness / angle_rad.tan();

    // A bow-tie blade cuts from both ends toward the middle.
    let area_of_cut = match variant {
        ShearVariant::SingleRake => (input.material_thickness * length_of_init_cut) / 2.0,
        ShearVariant::BowTie => input.material_thickness * length_of_init_cut,
    };

    let min_stroke_for_blade =
        input.coil_width * angle_rad + input.material_thickness + input.overlap;
    let min_stroke_req_for_opening = min_stroke_for_blade + input.blade_opening;

    let actual_opening_above_max_material = match variant {
        ShearVariant::SingleRake => input.stroke - min_stroke_for_blade,
        ShearVariant::BowTie => input.coil_width / 2.0 * angle_rad + input.overlap,
    };

    let cylinder_area =
        (input.bore_size / 2.0).powi(2) * pi - (input.rod_dia / 2.0).powi(2) * pi;
    let cylinder_volume = cylinder_area * input.stroke;

    let force_per_cylinder = cylinder_area * input.pressure / 2.0;
    let total_force_applied_lbs = force_per_cylinder * 2.0;
    let force_req_to_shear = area_of_cut * shear_strength * (1.0 - input.percent_of_penetration);
    let total_force_applied_tons = total_force_applied_lbs * 0.0005;
    if force_req_to_shear <= 0.0 {
        return Err(CalcError::domain_invalid(
            "force_req_to_shear",
            "shear force requirement must be positive",
        ));
    }
    let safety_factor = total_force_applied_lbs / force_req_to_shear;

    let instant_gallons_per_minute_req =
        ((cylinder_volume / 231.0) * 60.0) / input.time_for_down_stroke;
    let shear_strokes_per_minute = (1.0 / (input.time_for_down_stroke * 2.0)) * 60.0;
    let parts_per_minute =
        1.0 / (input.time_for_down_stroke * 2.0 + input.dwell_time) * 60.0;
    let parts_per_hour = parts_per_minute * 60.0;
    let averaged_gallons_per_minute_req =
        instant_gallons_per_minute_req * parts_per_minute / shear_strokes_per_minute;

    let fluid_velocity = instant_gallons_per_minute_req / (3.117 * cylinder_area);

    // Sized against a 15% margin over the cut requirement.
    let force_req_to_shear_check = if total_force_applied_lbs > force_req_to_shear * 1.15 {
        "OK"
    } else {
        "NOT OK"
    }
    .to_string();

    Ok(HydShearResult {
        shear_strength,
        angle_of_blade,
        length_of_init_cut,
        area_of_cut,
        min_stroke_for_blade,
        min_stroke_req_for_opening,
        actual_opening_above_max_material,
        cylinder_area,
        cylinder_volume,
        fluid_velocity,
        force_per_cylinder,
        total_force_applied_lbs,
        force_req_to_shear,
        force_req_to_shear_check,
        total_force_applied_tons,
        safety_factor,
        instant_gallons_per_minute_req,
        averaged_gallons_per_minute_req,
        shear_strokes_per_minute,
        parts_per_minute,
        parts_per_hour,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_input() -> HydShearInput {
        HydShearInput {
            material_thickness: 0.25,
            coil_width: 48.0,
            material_tensile: 60_000.0,
            rake_of_blade: 0.5,
            overlap: 0.125,
            blade_opening: 2.0,
            percent_of_penetration: 0.35,
            bore_size: 4.0,
            rod_dia: 2.0,
            stroke: 6.0,
            pressure: 2000.0,
            time_for_down_stroke: 1.5,
            dwell_time: 2.0,
        }
    }

    #[test]
    fn test_shear_strength_is_three_quarters_tensile() {
        // 0.75 * 60000 = 45000, independent of blade configuration.
        let single = calculate(&test_input(), ShearVariant::SingleRake).unwrap();
        let bow = calculate(&test_input(), ShearVariant::BowTie).unwrap();
        assert_eq!(single.shear_strength, 45_000.0);
        assert_eq!(bow.shear_strength, 45_000.0);
    }

    #[test]
    fn test_bow_tie_doubles_cut_area() {
        let single = calculate(&test_input(), ShearVariant::SingleRake).unwrap();
        let bow = calculate(&test_input(), ShearVariant::BowTie).unwrap();
        assert!((bow.area_of_cut - single.area_of_cut * 2.0).abs() < 1e-9);
        assert!(bow.force_req_to_shear > single.force_req_to_shear);
    }

    #[test]
    fn test_cylinder_hydraulics() {
        let result = calculate(&test_input(), ShearVariant::SingleRake).unwrap();
        let pi = std::f64::consts::PI;
        let expected_area = 4.0 * pi - pi;
        assert!((result.cylinder_area - expected_area).abs() < 1e-9);
        assert!((result.cylinder_volume - expected_area * 6.0).abs() < 1e-9);
        assert!(result.fluid_velocity > 0.0);
    }

    #[test]
    fn test_force_balance() {
        let result = calculate(&test_input(), ShearVariant::SingleRake).unwrap();
        assert!(
            (result.total_force_applied_lbs - result.force_per_cylinder * 2.0).abs() < 1e-9
        );
        assert!(
            (result.safety_factor
                - result.total_force_applied_lbs / result.force_req_to_shear)
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn test_cycle_rates() {
        let result = calculate(&test_input(), ShearVariant::SingleRake).unwrap();
        // 1.5 s down, 1.5 s up: 20 strokes/min; 2 s dwell: 12 parts/min.
        assert!((result.shear_strokes_per_minute - 20.0).abs() < 1e-9);
        assert!((result.parts_per_minute - 12.0).abs() < 1e-9);
        assert!((result.parts_per_hour - 720.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let mut input = test_input();
        input.rod_dia = 4.5;
        assert_eq!(
            calculate(&input, ShearVariant::SingleRake)
                .unwrap_err()
                .error_code(),
            "DOMAIN_INVALID"
        );
        let mut input = test_input();
        input.rake_of_blade = 0.0;
        assert!(calculate(&input, ShearVariant::SingleRake).is_err());
    }
}
