//! # Zig-Zag Drive Sizing
//!
//! Blank-saving zig-zag drive analysis: reflected inertia of the fixed
//! parts list (lead screw, 42- and 24-tooth sheave/bushing sets, gearbox),
//! the torque stack to accelerate carriage and web, and a swept time table
//! with the carriage rotation angle per move.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Maximum motor speed (rpm).
const MAX_MOTOR_SPEED: f64 = 2000.0;
/// Motor rotor inertia.
const MOTOR_INERTIA: f64 = 0.0062;
/// Motor peak torque (in-lbs).
const MOTOR_PEAK_TORQUE: f64 = 240.0;
/// Motor continuous torque rating (in-lbs).
const MOTOR_RMS_TORQUE: f64 = 87.0;
/// Maximum acceleration rate (ft/s²).
const MAX_ACCEL_RATE: f64 = 7.0;
/// Lead screw lead (in/rev).
const SCREW_LEAD: f64 = 1.0;
/// Acme screw drive (a ball screw would change the torque constant).
const BALL_SCREW: bool = false;
/// Settle torque (in-lbs).
const SETTLE_TORQUE: f64 = 50.0;
/// Settle time (s).
const SETTLE_TIME: f64 = 0.045;
/// Carriage weight to accelerate (lbs).
const WEIGHT_TO_ACCEL: f64 = 1000.0;
/// Carriage way friction coefficient.
const COEF_OF_FRICTION: f64 = 0.1;

/// One cylindrical part of the drive train.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct PartGeometry {
    o_dia: f64,
    i_dia: f64,
    length: f64,
    density: f64,
}

/// A toothed sheave with its two bushings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
struct SheaveSet {
    drive_sheave: PartGeometry,
    bush_1: PartGeometry,
    bush_2: PartGeometry,
}

/// The drive gearbox.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
struct GearBox {
    ratio: f64,
    inertia: f64,
    qty: u32,
    efficiency: f64,
}

#[derive(Debug, Deserialize)]
struct ZigZagParts {
    tooth_42: SheaveSet,
    tooth_24: SheaveSet,
    g_box: GearBox,
}

static PARTS: Lazy<ZigZagParts> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../data/zig_zag_parts.json"))
        .expect("embedded zig_zag_parts.json is well-formed")
});

/// Input parameters for the zig-zag calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZigZagInput {
    /// Material width (in)
    pub material_width: f64,
    /// Material thickness (in)
    pub material_thickness: f64,
    /// Flat length of web the carriage drags (in)
    pub material_length_flat: f64,
    /// Material density (lb/in³)
    pub material_density: f64,
    /// Loop height selection (in); sets the supported loop length
    pub loop_height: f64,

    /// Pivot-to-screw distance (in); 0 for a linear slide
    pub pivot_to_screw: f64,
    /// Total carried load for pivoted carriages (lbs)
    pub total_load: f64,
    /// Drive efficiency
    pub efficiency: f64,
    /// Feed angle (degrees) or dwell (s) for slow lines
    pub feed_angle: f64,
    /// Miscellaneous friction at the motor (in-lbs)
    pub misc_friction_at_motor: f64,

    /// Lead screw outer diameter (in)
    pub lead_screw_o_dia: f64,
    /// Lead screw inner diameter (in), 0 for solid
    pub lead_screw_i_dia: f64,
    /// Lead screw length (in)
    pub lead_screw_length: f64,
    /// Lead screw density (lb/in³)
    pub lead_screw_density: f64,

    /// Chart minimum move (in)
    pub min_length: f64,
    /// Chart move increment (in)
    pub increment: f64,
}

impl ZigZagInput {
    fn validate(&self) -> CalcResult<()> {
        if self.efficiency <= 0.0 {
            return Err(CalcError::domain_invalid(
                "efficiency",
                "drive efficiency must be positive",
            ));
        }
        if self.lead_screw_o_dia <= 0.0 {
            return Err(CalcError::domain_invalid(
                "lead_screw_o_dia",
                "lead screw diameter must be positive",
            ));
        }
        if self.feed_angle < 0.0 {
            return Err(CalcError::domain_invalid(
                "feed_angle",
                "feed angle must not be negative",
            ));
        }
        Ok(())
    }
}

/// A drive part's weight, inertia, and reflected inertia.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZigZagComponent {
    pub lbs: f64,
    pub inertia: f64,
    pub refl_inertia: f64,
    pub o_dia: f64,
    pub i_dia: f64,
    pub length: f64,
    pub density: f64,
}

/// One row of the zig-zag move table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZigZagRow {
    pub index: usize,
    pub length: f64,
    pub accel_time: f64,
    pub run_time: f64,
    pub move_time: f64,
    pub cycle_time: f64,
    pub strokes_per_minute: f64,
    pub dwell_time: f64,
    pub rms_torque: f64,
    /// Carriage rotation for pivoted slides (degrees)
    pub deg_of_rotation: f64,
}

/// Results of the zig-zag calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZigZagResult {
    pub ratio: f64,
    pub max_motor_speed: f64,
    pub motor_inertia: f64,
    pub motor_peak_torque: f64,
    pub motor_rms_torque: f64,
    pub max_accel_rate: f64,
    /// Carriage velocity at full motor speed (ft/s)
    pub max_velocity: f64,
    pub loop_torque: f64,
    pub settle_torque: f64,
    pub settle_time: f64,
    pub screw_lead: f64,
    pub ball_screw: bool,
    pub weight_to_accel: f64,
    pub coef_of_friction: f64,
    pub weight_drag: f64,
    pub screw_axial_load: f64,
    pub screw_rpm: f64,

    pub refl_inertia: f64,
    pub inertia_match: f64,
    pub peak_torque: f64,
    pub rms_torque: f64,
    pub accel_torque: f64,

    pub table: Vec<ZigZagRow>,

    pub lead_screw: ZigZagComponent,
    pub drive_42_sheave: ZigZagComponent,
    pub bush_1_42: ZigZagComponent,
    pub bush_2_42: ZigZagComponent,
    pub drive_24_sheave: ZigZagComponent,
    pub bush_1_24: ZigZagComponent,
    pub bush_2_24: ZigZagComponent,
    pub gearbox_refl_inertia: f64,
    pub material: BTreeMap<String, f64>,

    pub torque_to_accel_drag: f64,
    pub torque_to_accel_refl_inertia: f64,
    pub torque_to_accel_weight: f64,
    pub torque_to_accel_motor: f64,
    pub torque_not_used: f64,
    pub torque_constant_out: f64,
}

/// Weight, inertia, and gearbox-reflected inertia for one part.
fn component(part: PartGeometry) -> ZigZagComponent {
    let pi = std::f64::consts::PI;
    let (lbs, inertia) = if part.i_dia == 0.0 {
        let lbs = (part.o_dia.powi(2) / 4.0) * pi * part.length * part.density;
        let inertia = (lbs / 32.3) * 0.5 * ((part.o_dia * 0.5).powi(2) / 144.0) * 12.0;
        (lbs, inertia)
    } else {
        let lbs =
            ((part.o_dia.powi(2) - part.i_dia.powi(2)) / 4.0) * pi * part.length * part.density;
        let inertia = (lbs / 32.3)
            * 0.5
            * (((part.o_dia * 0.5).powi(2) + (part.i_dia * 0.5).powi(2)) / 144.0)
            * 12.0;
        (lbs, inertia)
    };
    ZigZagComponent {
        lbs,
        inertia,
        refl_inertia: inertia / PARTS.g_box.ratio.powi(2),
        o_dia: part.o_dia,
        i_dia: part.i_dia,
        length: part.length,
        density: part.density,
    }
}

/// Supported loop length (in) by loop height selection.
fn material_loop_length(loop_height: f64) -> f64 {
    match loop_height as i64 {
        12 => 80.0,
        18 => 60.0,
        24 => 40.0,
        _ => 0.0,
    }
}

/// Move/cycle bookkeeping for one row.
#[allow(clippy::too_many_arguments)]
fn row_values(
    index: usize,
    length: f64,
    accel_time: f64,
    run_time: f64,
    feed_angle: f64,
    peak_torque: f64,
    accel_torque: f64,
    torque_to_accel_drag: f64,
    friction_at_motor: f64,
    loop_torque: f64,
    pivot_to_screw: f64,
) -> ZigZagRow {
    let move_time = accel_time * 2.0 + run_time + SETTLE_TIME;

    // Angles over 20 are press windows; smaller values are dwell seconds.
    let cycle_time = if feed_angle > 20.0 {
        move_time * (360.0 / feed_angle)
    } else {
        move_time + feed_angle
    };
    let strokes_per_minute = 60.0 / cycle_time;
    let dwell_time = cycle_time - move_time;

    let rms_torque = ((peak_torque.powi(2) * accel_time
        + accel_torque.powi(2) * accel_time
        + (torque_to_accel_drag + friction_at_motor + loop_torque).powi(2) * run_time
        + SETTLE_TORQUE.powi(2) * SETTLE_TIME
        + loop_torque.powi(2) * dwell_time)
        / cycle_time)
        .sqrt();

    let deg_of_rotation = if pivot_to_screw > 0.0 {
        ((length / 2.0) / pivot_to_screw).atan() * 360.0 / 2.0 / std::f64::consts::PI * 2.0
    } else {
        0.0
    };

    ZigZagRow {
        index,
        length,
        accel_time,
        run_time,
        move_time,
        cycle_time,
        strokes_per_minute,
        dwell_time,
        rms_torque,
        deg_of_rotation,
    }
}

/// Calculate zig-zag drive sizing.
pub fn calculate(input: &ZigZagInput) -> CalcResult<ZigZagResult> {
    input.validate()?;

    let parts = &*PARTS;
    if parts.g_box.ratio == 0.0 {
        return Err(CalcError::domain_invalid(
            "gearbox_ratio",
            "gearbox ratio must be non-zero",
        ));
    }

    // Overall ratio through the gearbox and timing belt stage.
    let ratio =
        parts.g_box.ratio * parts.tooth_42.drive_sheave.o_dia / parts.tooth_24.drive_sheave.o_dia;

    // Carriage velocity at full motor speed (ft/s).
    let max_velocity = MAX_MOTOR_SPEED / ratio * SCREW_LEAD / 12.0 / 60.0;

    // Supported web between the loop and the carriage.
    let material_loop = material_loop_length(input.loop_height);
    let material_lbs =
        input.material_width * input.material_thickness * input.material_density * material_loop;
    let material_inertia = ((input.material_width
        * input.material_thickness
        * input.material_length_flat
        * input.material_density)
        / 32.3)
        * ((parts.tooth_42.drive_sheave.o_dia * 0.5).powi(2) / 144.0)
        * 12.0;
    let material_refl_inertia = material_inertia / ratio.powi(2);

    let loop_torque =
        ((material_lbs * (input.lead_screw_o_dia * 0.5)) / ratio) / parts.g_box.efficiency;

    // Drag and axial load depend on whether the carriage pivots.
    let weight_drag = if input.pivot_to_screw == 0.0 {
        WEIGHT_TO_ACCEL * COEF_OF_FRICTION
    } else {
        COEF_OF_FRICTION * input.total_load
    };
    let screw_axial_load = if input.pivot_to_screw == 0.0 {
        WEIGHT_TO_ACCEL / 32.3 * MAX_ACCEL_RATE + weight_drag
    } else {
        WEIGHT_TO_ACCEL + weight_drag
    };
    let screw_rpm = MAX_MOTOR_SPEED / ratio;

    // Drive train parts.
    let lead_screw = component(PartGeometry {
        o_dia: input.lead_screw_o_dia,
        i_dia: input.lead_screw_i_dia,
        length: input.lead_screw_length,
        density: input.lead_screw_density,
    });
    let drive_42_sheave = component(parts.tooth_42.drive_sheave);
    let bush_1_42 = component(parts.tooth_42.bush_1);
    let bush_2_42 = component(parts.tooth_42.bush_2);
    let drive_24_sheave = component(parts.tooth_24.drive_sheave);
    let bush_1_24 = component(parts.tooth_24.bush_1);
    let bush_2_24 = component(parts.tooth_24.bush_2);
    let gearbox_refl_inertia = parts.g_box.inertia * parts.g_box.qty as f64;

    let refl_inertia = lead_screw.refl_inertia
        + drive_42_sheave.refl_inertia
        + bush_1_42.refl_inertia
        + bush_2_42.refl_inertia
        + drive_24_sheave.refl_inertia
        + bush_1_24.refl_inertia
        + bush_2_24.refl_inertia
        + gearbox_refl_inertia;

    let inertia_match = refl_inertia / MOTOR_INERTIA;

    // Screw torque constant: force out per unit torque in.
    let torque_constant_out = if BALL_SCREW {
        0.3 * SCREW_LEAD
    } else {
        SCREW_LEAD * 0.177
    };

    // Longest purely-accelerating move, and its acceleration time.
    let init_length = (max_velocity / MAX_ACCEL_RATE) * max_velocity * 12.0;
    let init_accel_time = max_velocity / MAX_ACCEL_RATE;
    let init_run_time = if (init_length - (MOTOR_PEAK_TORQUE * init_accel_time * 12.0) / 12.0)
        / MOTOR_PEAK_TORQUE
        > 0.0
    {
        ((init_length - MOTOR_PEAK_TORQUE * init_accel_time * 12.0) / 12.0) / MOTOR_PEAK_TORQUE
    } else {
        0.0
    };

    // Torque stack at the init-move acceleration.
    let temp = MAX_MOTOR_SPEED / 60.0 * 2.0 * std::f64::consts::PI / init_accel_time;
    let torque_to_accel_drag = weight_drag * torque_constant_out / ratio / input.efficiency;
    let torque_to_accel_refl_inertia = temp * refl_inertia / input.efficiency;
    let torque_to_accel_weight = if input.pivot_to_screw == 0.0 {
        ((WEIGHT_TO_ACCEL / 32.3 * MAX_ACCEL_RATE) * WEIGHT_TO_ACCEL) / ratio / input.efficiency
    } else {
        WEIGHT_TO_ACCEL / ratio * torque_constant_out / input.efficiency
    };
    let torque_to_accel_motor = temp * MOTOR_INERTIA;

    let accel_torque = torque_to_accel_drag
        + torque_to_accel_refl_inertia
        + torque_to_accel_weight
        + torque_to_accel_motor;
    let peak_torque = accel_torque + input.misc_friction_at_motor + loop_torque;
    let torque_not_used = accel_torque - torque_to_accel_motor;

    // Move table: the init row plus 22 swept rows.
    let init_row = row_values(
        0,
        init_length,
        init_accel_time,
        init_run_time,
        input.feed_angle,
        peak_torque,
        accel_torque,
        torque_to_accel_drag,
        input.misc_friction_at_motor,
        loop_torque,
        input.pivot_to_screw,
    );

    let mut table = vec![init_row];
    for i in 1..=22 {
        let length = input.min_length + input.increment * i as f64;
        let (accel_time, run_time) = if length > init_length {
            (init_accel_time, ((length - init_length) / 12.0) / max_velocity)
        } else {
            (((length / 12.0) / MAX_ACCEL_RATE).sqrt(), 0.0)
        };
        table.push(row_values(
            i,
            length,
            accel_time,
            run_time,
            input.feed_angle,
            peak_torque,
            accel_torque,
            torque_to_accel_drag,
            input.misc_friction_at_motor,
            loop_torque,
            input.pivot_to_screw,
        ));
    }

    // Motor duty over the init cycle.
    let rms_torque = ((MOTOR_PEAK_TORQUE.powi(2) * init_accel_time
        + accel_torque.powi(2) * init_accel_time
        + SETTLE_TORQUE.powi(2) * SETTLE_TIME
        + loop_torque.powi(2) * table[0].dwell_time)
        / table[0].cycle_time)
        .sqrt();

    let mut material = BTreeMap::new();
    material.insert("lbs".to_string(), material_lbs);
    material.insert("inertia".to_string(), material_inertia);
    material.insert("refl_inertia".to_string(), material_refl_inertia);
    material.insert("width".to_string(), input.material_width);
    material.insert("thickness".to_string(), input.material_thickness);
    material.insert("length_flat".to_string(), input.material_length_flat);
    material.insert("density".to_string(), input.material_density);

    Ok(ZigZagResult {
        ratio,
        max_motor_speed: MAX_MOTOR_SPEED,
        motor_inertia: MOTOR_INERTIA,
        motor_peak_torque: MOTOR_PEAK_TORQUE,
        motor_rms_torque: MOTOR_RMS_TORQUE,
        max_accel_rate: MAX_ACCEL_RATE,
        max_velocity,
        loop_torque,
        settle_torque: SETTLE_TORQUE,
        settle_time: SETTLE_TIME,
        screw_lead: SCREW_LEAD,
        ball_screw: BALL_SCREW,
        weight_to_accel: WEIGHT_TO_ACCEL,
        coef_of_friction: COEF_OF_FRICTION,
        weight_drag,
        screw_axial_load,
        screw_rpm,
        refl_inertia,
        inertia_match,
        peak_torque,
        rms_torque,
        accel_torque,
        table,
        lead_screw,
        drive_42_sheave,
        bush_1_42,
        bush_2_42,
        drive_24_sheave,
        bush_1_24,
        bush_2_24,
        gearbox_refl_inertia,
        material,
        torque_to_accel_drag,
        torque_to_accel_refl_inertia,
        torque_to_accel_weight,
        torque_to_accel_motor,
        torque_not_used,
        torque_constant_out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_input() -> ZigZagInput {
        ZigZagInput {
            material_width: 24.0,
            material_thickness: 0.06,
            material_length_flat: 60.0,
            material_density: 0.283,
            loop_height: 18.0,
            pivot_to_screw: 40.0,
            total_load: 1200.0,
            efficiency: 0.85,
            feed_angle: 180.0,
            misc_friction_at_motor: 5.0,
            lead_screw_o_dia: 1.5,
            lead_screw_i_dia: 0.0,
            lead_screw_length: 60.0,
            lead_screw_density: 0.283,
            min_length: 2.0,
            increment: 1.0,
        }
    }

    #[test]
    fn test_table_shape() {
        let result = calculate(&test_input()).unwrap();
        assert_eq!(result.table.len(), 23);
        assert_eq!(result.table[0].index, 0);
        // Swept rows climb by the increment.
        for i in 2..=22 {
            let delta = result.table[i].length - result.table[i - 1].length;
            assert!((delta - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ratio_from_parts() {
        let result = calculate(&test_input()).unwrap();
        // 5.0 gearbox * 8.4 / 4.8 sheave diameters.
        assert!((result.ratio - 8.75).abs() < 1e-9);
        assert!((result.screw_rpm - 2000.0 / 8.75).abs() < 1e-9);
    }

    #[test]
    fn test_total_refl_inertia_is_sum() {
        let result = calculate(&test_input()).unwrap();
        let sum = result.lead_screw.refl_inertia
            + result.drive_42_sheave.refl_inertia
            + result.bush_1_42.refl_inertia
            + result.bush_2_42.refl_inertia
            + result.drive_24_sheave.refl_inertia
            + result.bush_1_24.refl_inertia
            + result.bush_2_24.refl_inertia
            + result.gearbox_refl_inertia;
        assert!((result.refl_inertia - sum).abs() < 1e-12);
    }

    #[test]
    fn test_accel_torque_composition() {
        let result = calculate(&test_input()).unwrap();
        let sum = result.torque_to_accel_drag
            + result.torque_to_accel_refl_inertia
            + result.torque_to_accel_weight
            + result.torque_to_accel_motor;
        assert!((result.accel_torque - sum).abs() < 1e-12);
        assert!(
            (result.torque_not_used - (result.accel_torque - result.torque_to_accel_motor)).abs()
                < 1e-12
        );
    }

    #[test]
    fn test_pivoted_carriage_rotates() {
        let result = calculate(&test_input()).unwrap();
        assert!(result.table[1].deg_of_rotation > 0.0);

        let mut input = test_input();
        input.pivot_to_screw = 0.0;
        let linear = calculate(&input).unwrap();
        assert_eq!(linear.table[1].deg_of_rotation, 0.0);
    }

    #[test]
    fn test_loop_height_selects_loop_length() {
        assert_eq!(material_loop_length(12.0), 80.0);
        assert_eq!(material_loop_length(18.0), 60.0);
        assert_eq!(material_loop_length(24.0), 40.0);
        assert_eq!(material_loop_length(0.0), 0.0);
    }

    #[test]
    fn test_zero_efficiency_rejected() {
        let mut input = test_input();
        input.efficiency = 0.0;
        assert_eq!(
            calculate(&input).unwrap_err().error_code(),
            "DOMAIN_INVALID"
        );
    }
}
