//! # Straightener Utility Sizing
//!
//! Powered straightener analysis: straightening force and torque, coil
//! inertia under the max and min OD scenarios, Lewis-factor gear ratings for
//! the pinch and straightener roll gear trains, horsepower, and the combined
//! pass/fail check set.

use serde::{Deserialize, Serialize};

use crate::calculations::{check, round3};
use crate::errors::{CalcError, CalcResult};
use crate::lookup::{materials, motors, straighteners};

/// Straightener drive motor base speed (rpm).
const MOTOR_RPM: f64 = 1750.0;
/// Drive train efficiency.
const EFFICIENCY: f64 = 0.85;
/// Number of pinch rolls.
const PINCH_ROLL_QTY: f64 = 4.0;
/// Length of web between straightener and loop (in).
const MAT_LENGTH: f64 = 96.0;
/// Contact angle constant (degrees).
const CONT_ANGLE: f64 = 20.0;
/// Feed-rate sizing buffer.
const FEED_RATE_BUFFER: f64 = 1.2;
/// Density of roll stock (lb/in³).
const STEEL_DENSITY: f64 = 0.283;

/// Lewis form factor by gear tooth count (20° full-depth involute).
fn lewis_factor(teeth: u32) -> CalcResult<f64> {
    let factor = match teeth {
        12 => 0.245,
        13 => 0.261,
        14 => 0.277,
        15 => 0.29,
        16 => 0.296,
        17 => 0.302,
        18 => 0.314,
        19 => 0.314,
        20 => 0.321,
        21 => 0.327,
        22 => 0.33,
        24 => 0.337,
        25 => 0.341,
        26 => 0.346,
        27 => 0.348,
        28 => 0.352,
        30 => 0.359,
        31 => 0.362,
        32 => 0.365,
        34 => 0.37,
        _ => {
            return Err(CalcError::configuration_mismatch(
                "gear_teeth",
                teeth.to_string(),
            ))
        }
    };
    Ok(factor)
}

/// Input parameters for the straightener utility calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrUtilityInput {
    /// Maximum coil weight (lbs)
    pub max_coil_weight: f64,
    /// Coil inner diameter (in)
    pub coil_id: f64,
    /// Coil outer diameter (in)
    pub coil_od: f64,
    /// Coil width (in)
    pub coil_width: f64,
    /// Material thickness (in)
    pub material_thickness: f64,
    /// Yield strength (psi)
    pub yield_strength: f64,
    /// Material type name for the property lookup
    pub material_type: String,
    /// Backbend yield flag carried over from the backbend solver
    /// ("OK" when the first-stage yielded fraction is acceptable)
    pub yield_met: String,

    /// Straightener model name
    pub str_model: String,
    /// Straightener width (in)
    pub str_width: f64,
    /// Drive motor horsepower
    pub horsepower: f64,

    /// Line feed rate (ft/min)
    pub feed_rate: f64,
    /// Maximum feed rate the line is quoted at (ft/min)
    pub max_feed_rate: f64,
    /// Whether the coil brake compensates automatically as the coil pays
    /// down ("Yes"/"No")
    pub auto_brake_compensation: String,
    /// Acceleration rate (ft/s²)
    pub acceleration: f64,
    /// Number of straightener rolls
    pub num_str_rolls: u32,
}

impl StrUtilityInput {
    fn validate(&self) -> CalcResult<()> {
        if self.material_thickness <= 0.0 {
            return Err(CalcError::domain_invalid(
                "material_thickness",
                "material thickness must be positive",
            ));
        }
        if self.coil_width <= 0.0 {
            return Err(CalcError::domain_invalid(
                "coil_width",
                "coil width must be positive",
            ));
        }
        if self.coil_id <= 0.0 {
            return Err(CalcError::domain_invalid(
                "coil_id",
                "coil inner diameter must be positive",
            ));
        }
        if self.feed_rate <= 0.0 {
            return Err(CalcError::domain_invalid(
                "feed_rate",
                "feed rate must be positive",
            ));
        }
        if self.acceleration <= 0.0 {
            return Err(CalcError::domain_invalid(
                "acceleration",
                "acceleration rate must be positive",
            ));
        }
        Ok(())
    }
}

/// Results of the straightener utility calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrUtilityResult {
    pub required_force: f64,
    pub pinch_roll_dia: f64,
    pub pinch_roll_req_torque: f64,
    pub pinch_roll_rated_torque: f64,
    pub str_roll_dia: f64,
    pub str_roll_req_torque: f64,
    pub str_roll_rated_torque: f64,
    pub horsepower_required: f64,

    pub center_dist: f64,
    pub jack_force_available: f64,
    pub max_roll_depth: f64,
    pub modulus: f64,
    pub pinch_roll_teeth: u32,
    pub pinch_roll_dp: f64,
    pub str_roll_teeth: u32,
    pub str_roll_dp: f64,

    pub cont_angle: f64,
    pub face_width: f64,
    pub actual_coil_weight: f64,
    pub coil_od: f64,
    pub str_torque: f64,
    pub acceleration_torque: f64,
    pub brake_torque: f64,

    pub backup_rolls_recommended: String,
    pub required_force_check: String,
    pub pinch_roll_check: String,
    pub str_roll_check: String,
    pub horsepower_check: String,
    pub fpm_check: String,
    pub feed_rate_check: String,
}

/// Roll-count coefficient for the straightening torque.
fn roll_count_coefficient(num_str_rolls: u32) -> f64 {
    let q = num_str_rolls as f64;
    if num_str_rolls < 7 {
        q / 3.5 + 0.1
    } else if num_str_rolls < 9 {
        q / 3.5
    } else if num_str_rolls < 11 {
        q / 3.5 - 0.1
    } else {
        3.0
    }
}

/// Gear ultimate tensile strength: the heavy frames carry 4140 gears.
fn gear_ultimate_tensile(str_model: &str) -> f64 {
    match str_model.to_uppercase().as_str() {
        "SPGPS-810" | "CPPS-306" | "CPPS-406" | "CPPS-507" => 165_100.0,
        _ => 128_000.0,
    }
}

/// Calculate straightener utility sizing.
pub fn calculate(input: &StrUtilityInput) -> CalcResult<StrUtilityResult> {
    input.validate()?;

    let model = straighteners::get_str_model(&input.str_model)?;
    let material = materials::get_material(&input.material_type)?;
    let motor_inertia = motors::get_motor_inertia(input.horsepower)?;

    let density = material.density;
    if density <= 0.0 {
        return Err(CalcError::domain_invalid(
            "density",
            "material density must be positive",
        ));
    }

    let pi = std::f64::consts::PI;
    let k_cons = roll_count_coefficient(input.num_str_rolls);
    let ult_tensile_strength = gear_ultimate_tensile(&input.str_model);

    let lewis_factor_pinch = lewis_factor(model.pr_teeth)?;
    let lewis_factor_str = lewis_factor(model.sroll_teeth)?;

    let safe_working_stress = ult_tensile_strength / 3.0;
    let accel_time = (input.feed_rate / 60.0) / input.acceleration;

    // Straightening force, with a 19% allowance for backup roll drag.
    let base_force = 16.0 * input.yield_strength * input.coil_width
        * input.material_thickness.powi(2)
        / (15.0 * model.center_distance);
    let required_force = base_force + base_force * 0.19;

    // Coil OD bounded by what the entered weight can actually build.
    let coil_od_measured = (input.coil_id.powi(2)
        + (input.max_coil_weight * 4.0) / (pi * density * input.coil_width))
        .sqrt();
    let coil_od = coil_od_measured.min(input.coil_od);

    // Pinch roll train inertia.
    let pinch_roll_length = input.str_width + 2.0;
    let pinch_roll_lbs = (model.pinch_roll_dia.powi(2) / 4.0)
        * pi
        * pinch_roll_length
        * PINCH_ROLL_QTY
        * STEEL_DENSITY;
    let pinch_roll_inertia =
        (pinch_roll_lbs / 32.3) * 0.5 * ((model.pinch_roll_dia * 0.5).powi(2) / 144.0) * 12.0;
    let pinch_ratio = MOTOR_RPM / ((input.feed_rate * 12.0) / (model.pinch_roll_dia * pi));
    let pinch_roll_refl_inertia = pinch_roll_inertia / pinch_ratio.powi(2);

    // Straightener roll train inertia.
    let str_roll_length = input.str_width + 2.0;
    let str_roll_lbs = (model.roll_diameter.powi(2) / 4.0)
        * pi
        * str_roll_length
        * input.num_str_rolls as f64
        * STEEL_DENSITY;
    let str_roll_inertia =
        (str_roll_lbs / 32.3) * 0.5 * ((model.roll_diameter * 0.5).powi(2) / 144.0) * 12.0;
    let str_ratio = MOTOR_RPM / ((input.feed_rate * 12.0) / (model.roll_diameter * pi));
    let str_roll_refl_inertia = str_roll_inertia / str_ratio.powi(2);

    // Web between straightener and loop, carried at the pinch roll.
    let mat_length_lbs = input.material_thickness * input.coil_width * density * MAT_LENGTH;
    let mat_length_inertia =
        (mat_length_lbs / 32.3) * ((model.pinch_roll_dia * 0.5).powi(2) / 144.0) * 12.0;
    let mat_length_refl_inertia = mat_length_inertia / pinch_ratio.powi(2);

    // Coil inertia at the extremes of its life.
    let max_od_inertia = ((coil_od.powi(2) / 4.0) * pi * input.coil_width * density / 32.3)
        * 0.5
        * ((coil_od * 0.5).powi(2) / 144.0)
        * 12.0;
    let min_od_inertia =
        ((input.coil_id.powi(2) / 4.0) * pi * input.coil_width * density / 32.3)
            * 0.5
            * ((input.coil_id * 0.5).powi(2) / 144.0)
            * 12.0;

    let max_od_ratio = (coil_od / model.pinch_roll_dia) * pinch_ratio;
    let min_od_ratio = (input.coil_id / model.pinch_roll_dia) * pinch_ratio;

    let max_od_refl_inertia = max_od_inertia / max_od_ratio.powi(2);
    let min_od_refl_inertia = min_od_inertia / min_od_ratio.powi(2);

    let max_od_total_inertia = pinch_roll_refl_inertia
        + str_roll_refl_inertia
        + mat_length_refl_inertia
        + max_od_refl_inertia;
    let min_od_total_inertia = pinch_roll_refl_inertia
        + str_roll_refl_inertia
        + mat_length_refl_inertia
        + min_od_refl_inertia;

    // Straightening torque at the motor.
    let str_torque = ((((0.667 * input.yield_strength * input.coil_width
        * input.material_thickness.powi(2))
        / model.center_distance)
        * 0.35
        * input.feed_rate
        * k_cons)
        / 33000.0)
        * 5250.0
        / MOTOR_RPM
        * 12.0
        / EFFICIENCY;

    // Coil brake torque, decelerating the payed-out coil.
    let coil_brake_torque = (((coil_od.powi(2) / 4.0) * pi * input.coil_width * density / 32.3
        * 0.5
        * ((coil_od * 0.5).powi(2) / 144.0))
        * 12.0)
        * ((input.feed_rate * 12.0) / (coil_od * pi))
        / (9.55 * accel_time);

    let max_od_brake_torque =
        (coil_brake_torque / ((coil_od / model.pinch_roll_dia) * pinch_ratio)) / EFFICIENCY;
    let min_od_brake_torque =
        (coil_brake_torque / ((input.coil_id / model.pinch_roll_dia) * pinch_ratio)) / EFFICIENCY;

    let max_od_accel_torque = (max_od_total_inertia * MOTOR_RPM) / (9.55 * accel_time)
        * (1.0 / EFFICIENCY)
        + (motor_inertia * MOTOR_RPM) / (9.55 * accel_time);
    let min_od_accel_torque = (min_od_total_inertia * MOTOR_RPM) / (9.55 * accel_time)
        * (1.0 / EFFICIENCY)
        + (motor_inertia * MOTOR_RPM) / (9.55 * accel_time);

    let max_od_pk_torque = str_torque + max_od_accel_torque + max_od_brake_torque;
    let min_od_pk_torque = str_torque + min_od_accel_torque + min_od_brake_torque;

    // Lewis gear ratings for both trains.
    let rpm_at_roller_pinch = (input.feed_rate * 12.0) / (pi * model.pinch_roll_dia);
    let pitch_dia_pinch = model.pr_teeth as f64 / model.proll_dp;
    let pitch_line_vel_pinch = (pi * rpm_at_roller_pinch * pitch_dia_pinch) / 12.0;
    let force_pitchline_pinch = (safe_working_stress * model.face_width * lewis_factor_pinch
        * 600.0)
        / (model.proll_dp * (600.0 + pitch_line_vel_pinch));
    let horsepower_rated_pinch = (force_pitchline_pinch * pitch_line_vel_pinch) / 33000.0;

    let rpm_at_roller_str = (input.feed_rate * 12.0) / (pi * model.roll_diameter);
    let pitch_dia_str = model.sroll_teeth as f64 / model.sroll_dp;
    let pitch_line_vel_str = (pi * rpm_at_roller_str * pitch_dia_str) / 12.0;
    let force_pitchline_str = (safe_working_stress * model.face_width * lewis_factor_str * 600.0)
        / (model.sroll_dp * (600.0 + pitch_line_vel_str));
    let horsepower_rated_str = (force_pitchline_str * pitch_line_vel_str) / 33000.0;

    // The brake-compensation flag selects which coil scenario sizes the
    // motor.
    let brake_compensation = match input.auto_brake_compensation.to_lowercase().as_str() {
        "yes" => true,
        "no" => false,
        other => {
            return Err(CalcError::configuration_mismatch(
                "auto_brake_compensation",
                other,
            ))
        }
    };
    let (horsepower_required, acceleration_torque, brake_torque) = if brake_compensation {
        (
            (max_od_pk_torque * MOTOR_RPM) / 63000.0,
            max_od_accel_torque,
            max_od_brake_torque,
        )
    } else {
        (
            (min_od_pk_torque * MOTOR_RPM) / 63000.0,
            min_od_accel_torque,
            min_od_brake_torque,
        )
    };

    let pinch_roll_req_torque = str_torque * pinch_ratio / model.str_gear_torq
        + min_od_brake_torque / 2.0 * pinch_ratio
        + ((max_od_total_inertia * MOTOR_RPM) / (9.55 * accel_time)) * (1.0 / EFFICIENCY)
            * pinch_ratio
            / 2.0;
    let pinch_roll_rated_torque = (63025.0 * horsepower_rated_pinch) / rpm_at_roller_pinch;

    let str_roll_req_torque = str_torque * str_ratio / model.str_gear_torq
        + ((max_od_total_inertia * MOTOR_RPM) / (9.55 * accel_time)) * (1.0 / EFFICIENCY)
            * str_ratio
            / 2.0
            * 7.0
            / 11.0;
    let str_roll_rated_torque = (63025.0 * horsepower_rated_str) / rpm_at_roller_str;

    let actual_coil_weight = ((coil_od.powi(2) - input.coil_id.powi(2)) / 4.0)
        * pi
        * input.coil_width
        * density;

    // Checks.
    let required_force_check = check(model.jack_force_avail > required_force);
    let backup_rolls_recommended = if required_force >= model.jack_force_avail * 0.6 {
        "Back Up Rolls Recommended"
    } else {
        "Not Recommended"
    }
    .to_string();
    let pinch_roll_check = check(pinch_roll_rated_torque > pinch_roll_req_torque);
    let str_roll_check = check(str_roll_rated_torque > str_roll_req_torque);
    let horsepower_check = check(input.horsepower > horsepower_required);
    let fpm_check = if input.feed_rate >= input.max_feed_rate * FEED_RATE_BUFFER {
        "FPM SUFFICIENT"
    } else {
        "FPM INSUFFICIENT"
    }
    .to_string();

    let feed_rate_check = check(
        fpm_check == "FPM SUFFICIENT"
            && required_force_check == "OK"
            && pinch_roll_check == "OK"
            && str_roll_check == "OK"
            && horsepower_check == "OK"
            && input.yield_met == "OK",
    );

    Ok(StrUtilityResult {
        required_force: round3(required_force),
        pinch_roll_dia: round3(model.pinch_roll_dia),
        pinch_roll_req_torque: round3(pinch_roll_req_torque),
        pinch_roll_rated_torque: round3(pinch_roll_rated_torque),
        str_roll_dia: round3(model.roll_diameter),
        str_roll_req_torque: round3(str_roll_req_torque),
        str_roll_rated_torque: round3(str_roll_rated_torque),
        horsepower_required: round3(horsepower_required),
        center_dist: round3(model.center_distance),
        jack_force_available: round3(model.jack_force_avail),
        max_roll_depth: round3(model.min_roll_depth),
        modulus: round3(material.modulus),
        pinch_roll_teeth: model.pr_teeth,
        pinch_roll_dp: round3(model.proll_dp),
        str_roll_teeth: model.sroll_teeth,
        str_roll_dp: round3(model.sroll_dp),
        cont_angle: CONT_ANGLE,
        face_width: round3(model.face_width),
        actual_coil_weight: round3(actual_coil_weight),
        coil_od: round3(coil_od),
        str_torque: round3(str_torque),
        acceleration_torque: round3(acceleration_torque),
        brake_torque: round3(brake_torque),
        backup_rolls_recommended,
        required_force_check,
        pinch_roll_check,
        str_roll_check,
        horsepower_check,
        fpm_check,
        feed_rate_check,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_input() -> StrUtilityInput {
        StrUtilityInput {
            max_coil_weight: 10_000.0,
            coil_id: 20.0,
            coil_od: 60.0,
            coil_width: 36.0,
            material_thickness: 0.06,
            yield_strength: 55_000.0,
            material_type: "COLD ROLLED STEEL".to_string(),
            yield_met: "OK".to_string(),
            str_model: "CPPS-406".to_string(),
            str_width: 42.0,
            horsepower: 20.0,
            feed_rate: 120.0,
            max_feed_rate: 100.0,
            auto_brake_compensation: "Yes".to_string(),
            acceleration: 10.0,
            num_str_rolls: 7,
        }
    }

    #[test]
    fn test_roll_count_coefficient() {
        assert!((roll_count_coefficient(5) - (5.0 / 3.5 + 0.1)).abs() < 1e-12);
        assert!((roll_count_coefficient(7) - 2.0).abs() < 1e-12);
        assert!((roll_count_coefficient(9) - (9.0 / 3.5 - 0.1)).abs() < 1e-12);
        assert_eq!(roll_count_coefficient(11), 3.0);
    }

    #[test]
    fn test_gear_tensile_selection() {
        assert_eq!(gear_ultimate_tensile("CPPS-406"), 165_100.0);
        assert_eq!(gear_ultimate_tensile("CPPS-250"), 128_000.0);
    }

    #[test]
    fn test_lewis_factors() {
        assert_eq!(lewis_factor(12).unwrap(), 0.245);
        assert_eq!(lewis_factor(34).unwrap(), 0.37);
        assert!(lewis_factor(23).is_err());
    }

    #[test]
    fn test_calculation_runs() {
        let result = calculate(&test_input()).unwrap();
        assert!(result.required_force > 0.0);
        assert!(result.str_torque > 0.0);
        assert!(result.horsepower_required > 0.0);
        assert_eq!(result.fpm_check, "FPM SUFFICIENT");
    }

    #[test]
    fn test_brake_compensation_selects_scenario() {
        let with = calculate(&test_input()).unwrap();
        let mut input = test_input();
        input.auto_brake_compensation = "No".to_string();
        let without = calculate(&input).unwrap();
        // Max-OD scenario needs at least as much motor as min-OD.
        assert!(with.horsepower_required >= without.horsepower_required);
    }

    #[test]
    fn test_invalid_brake_compensation() {
        let mut input = test_input();
        input.auto_brake_compensation = "Sometimes".to_string();
        let err = calculate(&input).unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_MISMATCH");
    }

    #[test]
    fn test_yield_not_met_fails_feed_rate_check() {
        let mut input = test_input();
        input.yield_met = "BACKBEND YIELD NOT OK".to_string();
        let result = calculate(&input).unwrap();
        assert_eq!(result.feed_rate_check, "NOT OK");
    }

    #[test]
    fn test_coil_od_bounded_by_weight() {
        let mut input = test_input();
        input.max_coil_weight = 1000.0;
        let result = calculate(&input).unwrap();
        assert!(result.coil_od < 60.0);
    }
}
