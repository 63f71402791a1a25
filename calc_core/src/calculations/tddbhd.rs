//! # TDDBHD - Reel Brake and Holddown Sizing
//!
//! Tension, drag-brake, disc-brake, and holddown sizing for a coil reel:
//! web tension from yield strength, coil weight and OD from geometry and
//! density (capped at the reel's rated weight), holddown force through the
//! elastic/plastic bent-beam branch, drag-brake press requirement by brake
//! stage count, and the failsafe holding force.

use serde::{Deserialize, Serialize};

use crate::calculations::{check, round3};
use crate::errors::{CalcError, CalcResult};
use crate::lookup::{materials, reels};

/// Number of pads per brake caliper.
const NUM_BRAKEPADS: f64 = 2.0;
/// Effective brake disc radius (in).
const BRAKE_DISTANCE: f64 = 12.0;
/// Brake cylinder rod diameter (in).
const CYLINDER_ROD: f64 = 1.0;
/// Static friction coefficient between mandrel and coil.
const STATIC_FRICTION: f64 = 0.5;

/// Input parameters for the TDDBHD calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TddbhdInput {
    /// Type-of-line label (drives the reel drive style)
    pub type_of_line: String,
    /// Reel drive torque with an empty mandrel (in-lbs); required for
    /// motorized lines
    pub reel_drive_torque_empty: Option<f64>,

    /// Material yield strength (psi)
    pub yield_strength: f64,
    /// Material thickness (in)
    pub thickness: f64,
    /// Material width (in)
    pub width: f64,
    /// Coil inner diameter (in)
    pub coil_id: f64,
    /// Coil outer diameter (in)
    pub coil_od: f64,

    /// Required deceleration rate (ft/s²)
    pub decel: f64,
    /// Brake pad friction coefficient
    pub friction: f64,
    /// Shop air pressure available (psi)
    pub air_pressure: f64,

    /// Number of brake calipers (1-4)
    pub brake_qty: u32,
    /// Brake model ("Single Stage", "Double Stage", "Triple Stage",
    /// "Failsafe - Single Stage", "Failsafe - Double Stage")
    pub brake_model: String,

    /// Holddown cylinder type
    pub cylinder: String,
    /// Holddown assembly name
    pub hold_down_assy: String,
    /// Hydraulic threading drive selection ("None" when absent)
    pub hyd_threading_drive: String,
    /// Air clutch fitted ("Yes"/"No")
    pub air_clutch: String,

    /// Material type name for the property lookup
    pub material_type: String,
    /// Reel model name
    pub reel_model: String,
}

/// Results of the TDDBHD calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TddbhdResult {
    pub friction: f64,
    /// Web tension (psi)
    pub web_tension_psi: f64,
    /// Web tension (lbs)
    pub web_tension_lbs: f64,
    /// Coil weight from geometry, capped at the reel rating (lbs)
    pub calculated_coil_weight: f64,
    /// Coil OD back-computed from the capped weight (in)
    pub coil_od: f64,
    /// Threading drive motor displacement (cu in)
    pub disp_reel_mtr: f64,
    /// Brake cylinder bore (in)
    pub cylinder_bore: f64,
    /// Torque available at the mandrel (in-lbs)
    pub torque_at_mandrel: f64,
    /// Torque to rewind against web tension (in-lbs)
    pub rewind_torque: f64,
    /// Holddown working pressure (psi)
    pub holddown_pressure: f64,
    pub hold_down_force_available: f64,
    pub hold_down_force_required: f64,
    /// Narrowest material the holddown can clamp (in)
    pub min_material_width: f64,
    /// Brake torque required to stop the coil (in-lbs)
    pub torque_required: f64,
    /// Brake pressure required per caliper (psi)
    pub brake_press_required: f64,
    /// Holding force of failsafe brakes when de-energized (lbs)
    pub failsafe_holding_force: f64,

    pub min_material_width_check: String,
    pub rewind_torque_check: String,
    pub hold_down_force_check: String,
    pub brake_press_check: String,
    pub torque_required_check: String,
    pub tddbhd_check: String,
}

impl TddbhdInput {
    fn validate(&self) -> CalcResult<()> {
        if self.thickness <= 0.0 {
            return Err(CalcError::domain_invalid(
                "thickness",
                "material thickness must be positive",
            ));
        }
        if self.width <= 0.0 {
            return Err(CalcError::domain_invalid(
                "width",
                "material width must be positive",
            ));
        }
        if self.coil_id <= 0.0 {
            return Err(CalcError::domain_invalid(
                "coil_id",
                "coil inner diameter must be positive",
            ));
        }
        if self.friction <= 0.0 {
            return Err(CalcError::domain_invalid(
                "friction",
                "brake friction coefficient must be positive",
            ));
        }
        if self.brake_qty < 1 || self.brake_qty > 4 {
            return Err(CalcError::domain_invalid(
                "brake_qty",
                "brake quantity must be between 1 and 4",
            ));
        }
        Ok(())
    }
}

/// Threading drive displacement from the selection string. The leading
/// digits name the nominal displacement; the 22 cu in drive actually
/// displaces 22.6.
fn displacement(hyd_threading_drive: &str) -> CalcResult<f64> {
    if hyd_threading_drive == "None" {
        return Ok(0.0);
    }
    let digits: String = hyd_threading_drive
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return Err(CalcError::configuration_mismatch(
            "hyd_threading_drive",
            hyd_threading_drive,
        ));
    }
    let nominal: f64 = digits
        .parse()
        .map_err(|_| CalcError::configuration_mismatch("hyd_threading_drive", hyd_threading_drive))?;
    Ok(match nominal as i64 {
        22 => 22.6,
        _ => nominal,
    })
}

/// Cylinder area term for the brake press formula, by brake stage count.
fn brake_area_term(brake_model: &str, bore: f64, rod: f64) -> CalcResult<f64> {
    match brake_model {
        "Single Stage" | "Failsafe - Single Stage" => Ok(bore.powi(2)),
        "Double Stage" | "Failsafe - Double Stage" => Ok(2.0 * bore.powi(2) - rod.powi(2)),
        "Triple Stage" => Ok(3.0 * bore.powi(2) - 2.0 * rod.powi(2)),
        other => Err(CalcError::configuration_mismatch("brake_model", other)),
    }
}

/// De-energized holding force per unit friction for failsafe brakes.
fn failsafe_hold_force(brake_model: &str) -> f64 {
    match brake_model {
        "Failsafe - Single Stage" => 1000.0,
        "Failsafe - Double Stage" => 2385.0,
        _ => 0.0,
    }
}

/// Calculate TDDBHD sizing.
pub fn calculate(input: &TddbhdInput) -> CalcResult<TddbhdResult> {
    input.validate()?;

    // Lookups, fail-fast.
    let material = materials::get_material(&input.material_type)?;
    let max_weight = reels::get_reel_max_weight(&input.reel_model)?;
    let cylinder_bore = reels::get_cylinder_bore(&input.brake_model)?;
    let holddown_key = reels::holddown_key(&input.reel_model, &input.hold_down_assy, &input.cylinder)?;
    let holddown = reels::get_holddown_entry(&holddown_key)?;
    let reel_type = reels::get_type_of_line(&input.type_of_line)?.reel_type.clone();
    let drive_key = reels::drive_key(&input.reel_model, &input.air_clutch, &input.hyd_threading_drive)?;
    let drive_torque = reels::get_drive_torque(&drive_key)?;

    let density = material.density;
    let modulus = material.modulus;
    if density <= 0.0 {
        return Err(CalcError::domain_invalid(
            "density",
            "material density must be positive",
        ));
    }

    let holddown_pressure = holddown.pressure_psi(input.air_pressure);
    let hold_down_force_available = holddown.force_available(holddown_pressure);
    let min_material_width = holddown.min_width;

    let half_id = input.coil_id / 2.0;

    // Bent-beam moment about the mandrel and moment at first yield.
    let m = (modulus * input.width * input.thickness.powi(3)) / (12.0 * half_id);
    let m_y = (input.width * input.thickness.powi(2) * input.yield_strength) / 6.0;
    let y = (input.thickness * half_id) / (2.0 * ((input.thickness * modulus) / (2.0 * input.yield_strength)));

    // Web tension.
    let web_tension_psi = input.yield_strength / 800.0;
    let web_tension_lbs = input.thickness * input.width * web_tension_psi;

    // Coil weight from geometry, capped at the reel rating.
    let calculated_cw = ((input.coil_od.powi(2) - input.coil_id.powi(2)) / 4.0)
        * std::f64::consts::PI
        * input.width
        * density;
    let coil_weight = calculated_cw.min(max_weight);

    // Coil OD back-computed from the capped weight.
    let od_denominator = density * input.width * std::f64::consts::PI;
    let od_calc = ((4.0 * coil_weight) / od_denominator + input.coil_id.powi(2)).sqrt();
    let coil_od = od_calc.min(input.coil_od);
    if coil_od <= 0.0 {
        return Err(CalcError::domain_invalid(
            "coil_od",
            "coil outer diameter must be positive",
        ));
    }

    let disp_reel_mtr = displacement(&input.hyd_threading_drive)?;

    // Pulloff reels hold tension with the threading drive; motorized reels
    // with the reel drive itself.
    let torque_at_mandrel = if reel_type.to_uppercase() == "PULLOFF" {
        drive_torque
    } else {
        input.reel_drive_torque_empty.ok_or_else(|| {
            CalcError::domain_invalid(
                "reel_drive_torque_empty",
                "motorized line requires the reel drive empty torque",
            )
        })?
    };

    let rewind_torque = web_tension_lbs * coil_od / 2.0;

    // Holddown force, elastic vs plastic regime.
    let hold_down_denominator = STATIC_FRICTION * half_id;
    let hold_down_force_required = if m < m_y {
        m / hold_down_denominator
    } else {
        (((input.width * input.thickness.powi(2)) / 4.0)
            * input.yield_strength
            * (1.0 - (1.0 / 3.0) * (y / (input.thickness / 2.0)).powi(2)))
            / hold_down_denominator
    };

    // Brake torque to stop the coil at the required decel, plus rewind.
    let torque_required = (3.0 * input.decel * coil_weight
        * (coil_od.powi(2) + input.coil_id.powi(2)))
        / (386.0 * coil_od)
        + rewind_torque;

    // Brake pressure per caliper.
    let area_term = brake_area_term(&input.brake_model, cylinder_bore, CYLINDER_ROD)?;
    let press_denominator =
        std::f64::consts::PI * input.friction * BRAKE_DISTANCE * NUM_BRAKEPADS * area_term;
    let press_required = (4.0 * torque_required) / press_denominator;
    let brake_press_required = press_required / input.brake_qty as f64;

    let failsafe_holding_force = failsafe_hold_force(&input.brake_model)
        * input.friction
        * NUM_BRAKEPADS
        * BRAKE_DISTANCE
        * input.brake_qty as f64;

    // Threshold checks.
    let min_material_width_check = check(input.width >= min_material_width);
    let rewind_torque_check = check(rewind_torque <= torque_at_mandrel);
    let hold_down_force_check = check(hold_down_force_required <= hold_down_force_available);
    let brake_press_check = check(brake_press_required <= input.air_pressure);
    let is_failsafe = input.brake_model.starts_with("Failsafe");
    let torque_required_check = check(!is_failsafe || torque_required <= failsafe_holding_force);
    let all_ok = [
        &min_material_width_check,
        &rewind_torque_check,
        &hold_down_force_check,
        &brake_press_check,
        &torque_required_check,
    ]
    .iter()
    .all(|c| c.as_str() == "OK");
    let tddbhd_check = check(all_ok);

    Ok(TddbhdResult {
        friction: round3(input.friction),
        web_tension_psi: round3(web_tension_psi),
        web_tension_lbs: round3(web_tension_lbs),
        calculated_coil_weight: round3(coil_weight),
        coil_od: round3(coil_od),
        disp_reel_mtr,
        cylinder_bore: round3(cylinder_bore),
        torque_at_mandrel: round3(torque_at_mandrel),
        rewind_torque: round3(rewind_torque),
        holddown_pressure: round3(holddown_pressure),
        hold_down_force_available: round3(hold_down_force_available),
        hold_down_force_required: round3(hold_down_force_required),
        min_material_width: round3(min_material_width),
        torque_required: round3(torque_required),
        brake_press_required: round3(brake_press_required),
        failsafe_holding_force: round3(failsafe_holding_force),
        min_material_width_check,
        rewind_torque_check,
        hold_down_force_check,
        brake_press_check,
        torque_required_check,
        tddbhd_check,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_input() -> TddbhdInput {
        TddbhdInput {
            type_of_line: "Conventional".to_string(),
            reel_drive_torque_empty: None,
            yield_strength: 60_000.0,
            thickness: 0.05,
            width: 40.0,
            coil_id: 20.0,
            coil_od: 60.0,
            decel: 1.0,
            friction: 0.35,
            air_pressure: 80.0,
            brake_qty: 1,
            brake_model: "Single Stage".to_string(),
            cylinder: "Hydraulic".to_string(),
            hold_down_assy: "SD".to_string(),
            hyd_threading_drive: "22 cu in (D-12689)".to_string(),
            air_clutch: "Yes".to_string(),
            material_type: "STEEL".to_string(),
            reel_model: "CPR-040".to_string(),
        }
    }

    #[test]
    fn test_web_tension_exact() {
        let result = calculate(&test_input()).unwrap();
        // 60000 / 800 = 75 psi; 0.05 * 40 * 75 = 150 lbs.
        assert_eq!(result.web_tension_psi, 75.0);
        assert_eq!(result.web_tension_lbs, 150.0);
    }

    #[test]
    fn test_coil_weight_capped_at_reel_rating() {
        let result = calculate(&test_input()).unwrap();
        assert_eq!(result.calculated_coil_weight, 4000.0);
        // The OD implied by the capped weight is far below the entered OD.
        assert!(result.coil_od < 60.0);
    }

    #[test]
    fn test_coil_od_boundary() {
        // With no material on the mandrel (OD = ID) the computed weight is
        // zero and the back-computed OD reduces to exactly the coil ID.
        let mut input = test_input();
        input.coil_od = 20.0;
        let result = calculate(&input).unwrap();
        assert_eq!(result.calculated_coil_weight, 0.0);
        assert_eq!(result.coil_od, 20.0);
    }

    #[test]
    fn test_brake_area_terms() {
        let bore = 2.0;
        let rod = 1.0;
        assert_eq!(brake_area_term("Single Stage", bore, rod).unwrap(), 4.0);
        assert_eq!(brake_area_term("Double Stage", bore, rod).unwrap(), 7.0);
        assert_eq!(brake_area_term("Triple Stage", bore, rod).unwrap(), 10.0);
        let err = brake_area_term("Quad Stage", bore, rod).unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_MISMATCH");
    }

    #[test]
    fn test_invalid_brake_model_propagates() {
        let mut input = test_input();
        // Still a valid bore lookup, invalid stage count.
        input.brake_model = "Failsafe - Double Stage".to_string();
        assert!(calculate(&input).is_ok());
        input.brake_model = "Quint Stage".to_string();
        assert!(calculate(&input).is_err());
    }

    #[test]
    fn test_brake_qty_range() {
        let mut input = test_input();
        input.brake_qty = 0;
        assert_eq!(
            calculate(&input).unwrap_err().error_code(),
            "DOMAIN_INVALID"
        );
        input.brake_qty = 5;
        assert!(calculate(&input).is_err());
    }

    #[test]
    fn test_more_calipers_need_less_pressure() {
        let one = calculate(&test_input()).unwrap();
        let mut input = test_input();
        input.brake_qty = 2;
        let two = calculate(&input).unwrap();
        assert!((two.brake_press_required - one.brake_press_required / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_motorized_line_needs_drive_torque() {
        let mut input = test_input();
        input.type_of_line = "Reel-Motorized".to_string();
        assert!(calculate(&input).is_err());
        input.reel_drive_torque_empty = Some(5000.0);
        let result = calculate(&input).unwrap();
        assert_eq!(result.torque_at_mandrel, 5000.0);
    }

    #[test]
    fn test_pulloff_uses_threading_drive_torque() {
        let result = calculate(&test_input()).unwrap();
        assert_eq!(result.torque_at_mandrel, 8250.0);
        assert_eq!(result.disp_reel_mtr, 22.6);
    }

    #[test]
    fn test_no_threading_drive() {
        let mut input = test_input();
        input.hyd_threading_drive = "None".to_string();
        let result = calculate(&input).unwrap();
        assert_eq!(result.disp_reel_mtr, 0.0);
    }

    #[test]
    fn test_failsafe_holding_force() {
        let mut input = test_input();
        input.brake_model = "Failsafe - Single Stage".to_string();
        let result = calculate(&input).unwrap();
        let expected = 1000.0 * 0.35 * 2.0 * 12.0 * 1.0;
        assert!((result.failsafe_holding_force - expected).abs() < 1e-6);
    }

    #[test]
    fn test_overall_check_requires_all() {
        let mut input = test_input();
        // A 4" wide strip is below the SD holddown's 6" minimum.
        input.width = 4.0;
        let result = calculate(&input).unwrap();
        assert_eq!(result.min_material_width_check, "NOT OK");
        assert_eq!(result.tddbhd_check, "NOT OK");
    }
}
