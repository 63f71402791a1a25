//! # Reel Drive Sizing
//!
//! Motorized reel drive analysis: reflected inertia of the mandrel,
//! backplate, chain sprocket, reducer, and coil; torque and horsepower for
//! the empty and full conditions; bearing friction; regenerative power; and
//! the pulloff recommendation.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::lookup::{materials, motors, reels};

/// Chain drive ratio between reducer and mandrel.
const CHAIN_RATIO: f64 = 4.0;
/// Chain sprocket outer diameter (in).
const CHAIN_SPRKT_OD: f64 = 31.0;
/// Chain sprocket thickness (in).
const CHAIN_SPRKT_THICKNESS: f64 = 1.3;
/// Reducer efficiency when driving.
const REDUCER_DRIVING: f64 = 0.85;
/// Reducer efficiency when backdriven.
const REDUCER_BACKDRIVING: f64 = 0.5;
/// Reducer internal inertia at its input shaft.
const REDUCER_INERTIA: f64 = 0.1;
/// Motor base speed (rpm).
const MOTOR_RPM: f64 = 1750.0;
/// Line acceleration rate (ft/s per second).
const ACCEL_RATE: f64 = 1.0;
/// Density of the steel mandrel/backplate/sprocket stock (lb/in³).
const STEEL_DENSITY: f64 = 0.283;

/// Input parameters for the reel drive calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelDriveInput {
    /// Reel model name
    pub model: String,
    /// Material type name for the density lookup
    pub material_type: String,
    /// Coil inner diameter (in)
    pub coil_id: f64,
    /// Coil outer diameter (in)
    pub coil_od: f64,
    /// Reel width (in)
    pub reel_width: f64,
    /// Backplate diameter (in)
    pub backplate_diameter: f64,
    /// Motor horsepower rating
    pub motor_hp: f64,
    /// Type-of-line label
    pub type_of_line: String,
    /// Required line speed (ft/min)
    pub required_max_fpm: f64,
}

/// A rotating component's weight, inertia, and reflected inertia.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotatingComponent {
    pub weight: f64,
    pub inertia: f64,
    pub refl_inertia: f64,
}

/// Results of the reel drive calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelDriveResult {
    /// Reel capacity (lbs) and bearing geometry
    pub reel_size: f64,
    pub bearing_dist: f64,
    pub front_bearing_dia: f64,
    pub rear_bearing_dia: f64,

    /// Mandrel geometry and inertia
    pub mandrel_dia: f64,
    pub mandrel_length: f64,
    pub mandrel_max_rpm: f64,
    pub mandrel_full_rpm: f64,
    pub mandrel: RotatingComponent,

    /// Backplate inertia
    pub backplate_thickness: f64,
    pub backplate: RotatingComponent,

    /// Coil width implied by capacity, and coil inertia
    pub coil_width: f64,
    pub coil: RotatingComponent,

    /// Chain sprocket inertia
    pub chain: RotatingComponent,

    /// Reducer ratio (total ratio through the chain stage)
    pub reducer_ratio: f64,
    pub reducer_inertia: f64,

    /// Total gear ratio, motor to mandrel
    pub total_ratio: f64,
    pub total_refl_inertia_empty: f64,
    pub total_refl_inertia_full: f64,

    pub motor_inertia: f64,
    pub motor_base_rpm: f64,
    pub motor_rpm_full: f64,

    /// Bearing friction torques (in-lbs)
    pub friction_rear_mandrel: f64,
    pub friction_front_mandrel: f64,
    pub friction_rear_coil: f64,
    pub friction_front_coil: f64,
    pub friction_total_empty: f64,
    pub friction_total_full: f64,
    pub friction_refl_empty: f64,
    pub friction_refl_full: f64,

    /// Operating speed with buffer (ft/min) and acceleration
    pub speed: f64,
    pub accel_rate: f64,
    pub accel_time: f64,

    pub torque_empty: f64,
    pub torque_full: f64,
    pub hp_required_empty: f64,
    pub hp_required_full: f64,
    pub hp_status_empty: String,
    pub hp_status_full: String,

    /// Regenerative power during deceleration (W)
    pub regen_empty: f64,
    pub regen_full: f64,

    pub use_pulloff: String,
}

impl ReelDriveInput {
    fn validate(&self) -> CalcResult<()> {
        if self.coil_id <= 0.0 {
            return Err(CalcError::domain_invalid(
                "coil_id",
                "coil inner diameter must be positive",
            ));
        }
        if self.coil_od <= 0.0 {
            return Err(CalcError::domain_invalid(
                "coil_od",
                "coil outer diameter must be positive",
            ));
        }
        if self.required_max_fpm <= 0.0 {
            return Err(CalcError::domain_invalid(
                "required_max_fpm",
                "required line speed must be positive",
            ));
        }
        Ok(())
    }
}

fn reflected(inertia: f64, total_ratio: f64) -> f64 {
    if total_ratio != 0.0 {
        inertia / total_ratio.powi(2)
    } else {
        0.0
    }
}

/// Solid-cylinder inertia in the lb-in² drive-sizing convention.
fn disk_inertia(weight: f64, dia: f64) -> f64 {
    weight / 32.3 / 2.0 * ((dia / 2.0).powi(2) / 144.0) * 12.0
}

/// Calculate reel drive sizing.
pub fn calculate(input: &ReelDriveInput) -> CalcResult<ReelDriveResult> {
    input.validate()?;

    let reel = reels::get_reel_dimensions(&input.model)?;
    let material = materials::get_material(&input.material_type)?;
    let motor_inertia = motors::get_motor_inertia(input.motor_hp)?;
    let reel_type = reels::get_type_of_line(&input.type_of_line)?.reel_type.clone();
    let fpm_buffer = reels::get_fpm_buffer("DEFAULT")?;

    if material.density <= 0.0 {
        return Err(CalcError::domain_invalid(
            "density",
            "material density must be positive",
        ));
    }

    let pi = std::f64::consts::PI;

    // Operating speed with the safety buffer, and time to reach it.
    let speed = input.required_max_fpm * fpm_buffer;
    let accel_time = speed / 60.0 / ACCEL_RATE;

    // Mandrel speed bounds over the coil's life.
    let mandrel_max_rpm = speed * 12.0 / input.coil_id / pi;
    let mandrel_full_rpm = speed * 12.0 / input.coil_od / pi;
    let total_ratio = MOTOR_RPM / mandrel_max_rpm;

    let reel_size = reel.coil_weight;
    let brg_dist = reel.bearing_dist;

    // Mandrel as a solid steel cylinder spanning reel width plus clearance
    // to the bearings.
    let mandrel_dia = reel.mandrel_dia;
    let mandrel_length = input.reel_width + 17.0 + brg_dist;
    let mandrel_weight = (mandrel_dia / 2.0).powi(2) * pi * mandrel_length * STEEL_DENSITY;
    let mandrel_inertia = disk_inertia(mandrel_weight, mandrel_dia);
    let mandrel_refl = reflected(mandrel_inertia, total_ratio);

    // Backplate as a steel disk; its inertia acts at the mandrel radius.
    let backplate_weight = (input.backplate_diameter / 2.0).powi(2) * pi * STEEL_DENSITY;
    let backplate_inertia = disk_inertia(backplate_weight, mandrel_dia);
    let backplate_refl = reflected(backplate_inertia, total_ratio);

    // Full-capacity coil as a hollow cylinder.
    let coil_width = reel_size
        / material.density
        / ((input.coil_od.powi(2) - input.coil_id.powi(2)) / 4.0)
        / pi;
    let coil_inertia = reel_size / 32.3 / 2.0
        * ((input.coil_od / 2.0).powi(2) + (input.coil_id / 2.0).powi(2))
        / 144.0
        * 12.0;
    let coil_refl = reflected(coil_inertia, total_ratio);

    let reducer_ratio = total_ratio / CHAIN_RATIO;

    let chain_weight = (CHAIN_SPRKT_OD / 2.0).powi(2) * pi * CHAIN_SPRKT_THICKNESS * STEEL_DENSITY;
    let chain_inertia = disk_inertia(chain_weight, CHAIN_SPRKT_OD);
    let chain_refl = reflected(chain_inertia, total_ratio);

    let total_refl_empty = mandrel_refl + backplate_refl + REDUCER_INERTIA + chain_refl;
    let total_refl_full = total_refl_empty + coil_refl;

    let motor_rpm_full = speed * 12.0 / input.coil_od / pi * total_ratio;

    // Bearing friction: load moments resolved at each bearing, times the
    // 0.002 journal friction coefficient, times the bearing radius.
    let friction_arm = input.reel_width / 2.0 + 13.0;
    let r_brg_mand = mandrel_weight * friction_arm / brg_dist * 0.002 * reel.rbearing_dia / 2.0;
    let f_brg_mand = (mandrel_weight + mandrel_weight * friction_arm / brg_dist)
        * 0.002
        * reel.fbearing_dia
        / 2.0;
    let r_brg_coil = reel_size * friction_arm / brg_dist * 0.002 * reel.rbearing_dia / 2.0;
    let f_brg_coil =
        (reel_size + reel_size * friction_arm / brg_dist) * 0.002 * reel.fbearing_dia / 2.0;

    let friction_total_empty = r_brg_mand + f_brg_mand;
    let friction_total_full = friction_total_empty + r_brg_coil + f_brg_coil;

    let friction_refl_empty = friction_total_empty / total_ratio / REDUCER_DRIVING;
    let friction_refl_full = friction_total_full / total_ratio / REDUCER_DRIVING;

    // Torque = inertia torque through the reducer, plus motor inertia
    // torque, plus reflected friction.
    let torque_empty = (((total_refl_empty * MOTOR_RPM) / (9.55 * accel_time)) / REDUCER_DRIVING
        + (motor_inertia * MOTOR_RPM) / (9.55 * accel_time))
        + friction_refl_empty;
    let torque_full = (((total_refl_full * motor_rpm_full) / (9.55 * accel_time)) / REDUCER_DRIVING
        + (motor_inertia * motor_rpm_full) / (9.55 * accel_time))
        + friction_refl_full;

    let hp_required_empty = torque_empty * MOTOR_RPM / 63000.0;
    let hp_required_full = torque_full * MOTOR_RPM / 63000.0;

    let hp_status_empty = if input.motor_hp > hp_required_empty {
        "valid"
    } else {
        "too small"
    }
    .to_string();
    let hp_status_full = if input.motor_hp > hp_required_full {
        "valid"
    } else {
        "too small"
    }
    .to_string();

    // Regen: inertia power minus backdriven friction, converted to watts.
    let regen_empty = (((total_refl_empty * MOTOR_RPM) / (9.55 * accel_time)
        + (motor_inertia * MOTOR_RPM) / (9.55 * accel_time))
        - friction_total_empty / total_ratio / REDUCER_BACKDRIVING)
        * MOTOR_RPM
        / 63000.0
        * 746.0;
    let regen_full = (((total_refl_full * motor_rpm_full) / (9.55 * accel_time)
        + (motor_inertia * motor_rpm_full) / (9.55 * accel_time))
        - friction_total_full / total_ratio / REDUCER_BACKDRIVING)
        * motor_rpm_full
        / 63000.0
        * 746.0;

    let use_pulloff = if reel_type == "Motorized" {
        if input.motor_hp > hp_required_empty && input.motor_hp > hp_required_full {
            "OK"
        } else {
            "NOT OK"
        }
    } else {
        "USE PULLOFF"
    }
    .to_string();

    Ok(ReelDriveResult {
        reel_size,
        bearing_dist: brg_dist,
        front_bearing_dia: reel.fbearing_dia,
        rear_bearing_dia: reel.rbearing_dia,
        mandrel_dia,
        mandrel_length,
        mandrel_max_rpm,
        mandrel_full_rpm,
        mandrel: RotatingComponent {
            weight: mandrel_weight,
            inertia: mandrel_inertia,
            refl_inertia: mandrel_refl,
        },
        backplate_thickness: reel.backplate_thickness,
        backplate: RotatingComponent {
            weight: backplate_weight,
            inertia: backplate_inertia,
            refl_inertia: backplate_refl,
        },
        coil_width,
        coil: RotatingComponent {
            weight: reel_size,
            inertia: coil_inertia,
            refl_inertia: coil_refl,
        },
        chain: RotatingComponent {
            weight: chain_weight,
            inertia: chain_inertia,
            refl_inertia: chain_refl,
        },
        reducer_ratio,
        reducer_inertia: REDUCER_INERTIA,
        total_ratio,
        total_refl_inertia_empty: total_refl_empty,
        total_refl_inertia_full: total_refl_full,
        motor_inertia,
        motor_base_rpm: MOTOR_RPM,
        motor_rpm_full,
        friction_rear_mandrel: r_brg_mand,
        friction_front_mandrel: f_brg_mand,
        friction_rear_coil: r_brg_coil,
        friction_front_coil: f_brg_coil,
        friction_total_empty,
        friction_total_full,
        friction_refl_empty,
        friction_refl_full,
        speed,
        accel_rate: ACCEL_RATE,
        accel_time,
        torque_empty,
        torque_full,
        hp_required_empty,
        hp_required_full,
        hp_status_empty,
        hp_status_full,
        regen_empty,
        regen_full,
        use_pulloff,
    })
}
