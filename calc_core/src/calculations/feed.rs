//! # Servo Feed Sizing
//!
//! Feed head analysis for the three product lines: sigma-five, sigma-five
//! with pull-thru straightener, and Allen-Bradley. The shared engine pulls
//! the model's drive specs and bill of elements, computes reflected inertia
//! and the torque stack, sweeps the time/motion table at both configured
//! feed angles, and sizes regen.

use serde::{Deserialize, Serialize};

use crate::calculations::parse_yes_no;
use crate::errors::{CalcError, CalcResult};
use crate::lookup::feeds::{get_feed_model, FeedTable};
use crate::lookup::{materials, reels};
use crate::physics::inertia::{total_reflected_inertia, InertiaInput};
use crate::physics::motion::{feed_time_table, MotionInput, MotionRow};
use crate::physics::regen::{calculate_regen, RegenInput};

/// Payoff speed sizing buffer for pull-thru lines.
const FPM_BUFFER: f64 = 1.2;

/// Which feed product line is being calculated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedVariant {
    SigmaFive,
    SigmaFivePullThru,
    AllenBradley,
}

impl FeedVariant {
    fn table(self) -> FeedTable {
        match self {
            FeedVariant::SigmaFive => FeedTable::SigmaFive,
            FeedVariant::SigmaFivePullThru => FeedTable::SigmaFivePullThru,
            FeedVariant::AllenBradley => FeedTable::AllenBradley,
        }
    }
}

/// Input parameters shared by all feed calculations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedInput {
    /// Feed model name
    pub feed_model: String,
    /// Machine width (in)
    pub machine_width: f64,
    /// Loop pit fitted ("Yes"/"No"); doubles the supported material loop
    pub loop_pit: String,
    /// Material type name for the density lookup
    pub material_type: String,
    /// Line application label ("Press Feed" scales cycles by feed angle)
    pub application: String,
    /// Type-of-line label (drives the straightener-speed cap)
    pub type_of_line: String,
    /// Full-width rolls fitted ("Yes"/"No")
    pub roll_width: String,
    /// Straightener feed rate (ft/min)
    pub feed_rate: f64,
    /// Material width (in)
    pub material_width: f64,
    /// Material thickness (in)
    pub material_thickness: f64,
    /// Press bed length (in)
    pub press_bed_length: f64,
    /// Friction drag in the die (lbs)
    pub friction_in_die: f64,
    /// Acceleration rate (ft/s²)
    pub acceleration_rate: f64,
    /// Chart minimum feed length (in)
    pub chart_min_length: f64,
    /// Chart length increment (in)
    pub length_increment: f64,
    /// First feed angle (degrees, or dwell seconds off press lines)
    pub feed_angle_1: f64,
    /// Second feed angle
    pub feed_angle_2: f64,
}

/// Additional inputs for a feed with a pull-thru straightener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedWPullThruInput {
    #[serde(flatten)]
    pub feed: FeedInput,
    /// Number of straightening rolls in the pull-thru head
    pub straightening_rolls: u32,
    /// Material yield strength (psi)
    pub yield_strength: f64,
    /// Straightener pinch rolls fitted ("Yes"/"No")
    pub str_pinch_rolls: String,
    /// Required maximum line speed (ft/min)
    pub req_max_fpm: f64,
}

/// One row of the merged two-angle chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedTableRow {
    pub length: f64,
    pub rms_torque_fa1: f64,
    pub rms_torque_fa2: f64,
    pub spm_at_fa1: f64,
    pub fpm_fa1: f64,
    pub index_time_fa1: f64,
    pub spm_at_fa2: f64,
    pub fpm_fa2: f64,
    pub index_time_fa2: f64,
}

/// Results of a feed calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResult {
    pub max_motor_rpm: f64,
    pub motor_inertia: f64,
    /// Top line speed the drive can sustain (ft/min)
    pub max_velocity_fpm: f64,
    pub settle_time: f64,
    pub ratio: f64,
    pub motor_peak_torque: f64,
    pub motor_rms_torque: f64,
    pub frictional_torque: f64,
    pub loop_torque: f64,
    pub settle_torque: f64,
    /// Average regen power (W)
    pub regen: f64,
    pub refl_inertia: f64,
    /// Load-to-motor inertia match ratio
    pub inertia_match: f64,
    pub peak_torque: f64,
    pub rms_torque_fa1: f64,
    pub rms_torque_fa2: f64,
    pub acceleration_torque: f64,
    pub table: Vec<FeedTableRow>,
}

/// Results of a pull-thru feed calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedWPullThruResult {
    #[serde(flatten)]
    pub feed: FeedResult,
    pub pinch_rolls: u32,
    /// Torque to pull stock through the straightener (in-lbs)
    pub straightener_torque: f64,
    /// Payoff speed the reel must follow (ft/min)
    pub payoff_max_speed: f64,
}

fn merge_tables(fa1: &[MotionRow], fa2: &[MotionRow]) -> Vec<FeedTableRow> {
    fa1.iter()
        .zip(fa2.iter())
        .map(|(a, b)| FeedTableRow {
            length: a.length,
            rms_torque_fa1: a.rms_torque,
            rms_torque_fa2: b.rms_torque,
            spm_at_fa1: a.strokes_per_minute,
            fpm_fa1: (a.length * a.strokes_per_minute) / 12.0,
            index_time_fa1: a.index_time,
            spm_at_fa2: b.strokes_per_minute,
            fpm_fa2: (b.length * b.strokes_per_minute) / 12.0,
            index_time_fa2: b.index_time,
        })
        .collect()
}

/// Row-0 closed-form RMS torque for one angle's table.
fn closed_form_rms(
    peak_torque: f64,
    acceleration_torque: f64,
    settle_torque: f64,
    settle_time: f64,
    loop_torque: f64,
    row0: &MotionRow,
) -> f64 {
    ((peak_torque.powi(2) * row0.acceleration_time
        + acceleration_torque.powi(2) * row0.acceleration_time
        + settle_torque.powi(2) * settle_time
        + loop_torque.powi(2) * row0.dwell_time)
        / row0.cycle_time)
        .sqrt()
}

/// Shared feed engine for all three variants.
fn run_feed(input: &FeedInput, variant: FeedVariant) -> CalcResult<FeedResult> {
    let density = materials::get_material_density(&input.material_type)?;
    let str_used = reels::get_selected_str_used(&input.type_of_line)?;
    let config = get_feed_model(variant.table(), &input.feed_model)?;
    let drive = &config.drive;

    if drive.ratio == 0.0 {
        return Err(CalcError::domain_invalid(
            "ratio",
            "feed gear ratio must be non-zero",
        ));
    }
    if drive.efficiency <= 0.0 {
        return Err(CalcError::domain_invalid(
            "efficiency",
            "drive efficiency must be positive",
        ));
    }
    if drive.motor_inertia <= 0.0 {
        return Err(CalcError::domain_invalid(
            "motor_inertia",
            "motor inertia must be positive",
        ));
    }

    let pi = std::f64::consts::PI;

    // Top sustained line speed (ft/min).
    let max_velocity_fpm = drive.max_motor_rpm / drive.ratio * (drive.l_roll * pi / 720.0) * 60.0;

    // Friction at the motor: die drag through the roll radius, plus the
    // sigma-five drive's constant friction term.
    let frictional_torque = match variant {
        FeedVariant::SigmaFive => {
            (drive.u_roll * 0.5 * input.friction_in_die) / drive.ratio + drive.friction_torque
        }
        _ => (drive.u_roll * 0.5 * input.friction_in_die) / drive.ratio,
    };

    // Supported loop of material; a loop pit doubles it.
    let loop_pit = parse_yes_no("loop_pit", &input.loop_pit)?;
    let material_loop = if loop_pit {
        input.material_thickness * 360.0 * pi * 2.0
    } else {
        input.material_thickness * 360.0 * pi
    };
    let loop_torque = ((input.material_width * input.material_thickness * density * material_loop
        * 0.5)
        * drive.u_roll
        * 0.5)
        / drive.ratio
        / drive.efficiency;

    let full_width_rolls = parse_yes_no("roll_width", &input.roll_width)?;
    let refl_inertia = total_reflected_inertia(&InertiaInput {
        config,
        machine_width: input.machine_width,
        material_width: input.material_width,
        material_thickness: input.material_thickness,
        material_density: density,
        press_bed_length: input.press_bed_length,
        feed_ratio: drive.ratio,
        full_width_rolls,
    })?;

    // Poorly matched loads settle slower.
    let inertia_match = refl_inertia / drive.motor_inertia;
    let settle_time = if inertia_match < 10.0 { 0.035 } else { 0.06 };

    let velocity = drive.max_motor_rpm / drive.ratio * (drive.l_roll * pi / 720.0);
    let rpm = velocity * 720.0 / (drive.u_roll * pi) * drive.ratio;

    // The straightener caps chart speeds only on sigma-five lines that
    // carry one.
    let str_max_sp_inch = if variant == FeedVariant::SigmaFive {
        let str_max_sp = if parse_yes_no("str_used", str_used)? {
            input.feed_rate
        } else {
            max_velocity_fpm
        };
        str_max_sp * 12.0
    } else {
        0.0
    };

    let motion = MotionInput {
        acceleration: input.acceleration_rate,
        press_feed: input.application.to_lowercase() == "press feed",
        frictional_torque,
        increment: input.length_increment,
        loop_torque,
        min_length: input.chart_min_length,
        motor_inertia: drive.motor_inertia,
        motor_peak_torque: drive.motor_peak_torque,
        efficiency: drive.efficiency,
        refl_inertia,
        rpm,
        settle_time,
        settle_torque: drive.settle_torque,
        str_max_sp_inch,
        velocity,
    };

    let fa1 = feed_time_table(&motion, input.feed_angle_1)?;
    let fa2 = feed_time_table(&motion, input.feed_angle_2)?;
    let table = merge_tables(&fa1, &fa2);

    let acceleration_torque = ((refl_inertia * rpm) / (9.55 * fa1[0].acceleration_time))
        / drive.efficiency
        + (drive.motor_inertia * rpm) / (9.55 * fa1[0].acceleration_time);
    let peak_torque = acceleration_torque + frictional_torque + loop_torque;

    // Pull-thru drives are sized on the worst chart row; the others on the
    // row-0 cycle.
    let (rms_torque_fa1, rms_torque_fa2) = if variant == FeedVariant::SigmaFivePullThru {
        let max_rms = |rows: &[MotionRow]| {
            rows.iter()
                .map(|r| r.rms_torque)
                .fold(0.0_f64, |a, b| a.max(b))
        };
        (max_rms(&fa1), max_rms(&fa2))
    } else {
        (
            closed_form_rms(
                peak_torque,
                acceleration_torque,
                drive.settle_torque,
                settle_time,
                loop_torque,
                &fa1[0],
            ),
            closed_form_rms(
                peak_torque,
                acceleration_torque,
                drive.settle_torque,
                settle_time,
                loop_torque,
                &fa2[0],
            ),
        )
    };

    let regen = calculate_regen(&RegenInput {
        inertia_match,
        motor_inertia: drive.motor_inertia,
        rpm,
        acceleration_time: fa1[0].acceleration_time,
        cycle_time: fa1[0].cycle_time,
        watts_lost: drive.watts_lost,
        ec: drive.ec,
    })?;

    Ok(FeedResult {
        max_motor_rpm: drive.max_motor_rpm,
        motor_inertia: drive.motor_inertia,
        max_velocity_fpm,
        settle_time,
        ratio: drive.ratio,
        motor_peak_torque: drive.motor_peak_torque,
        motor_rms_torque: drive.motor_rms_torque,
        frictional_torque,
        loop_torque,
        settle_torque: drive.settle_torque,
        regen,
        refl_inertia,
        inertia_match,
        peak_torque,
        rms_torque_fa1,
        rms_torque_fa2,
        acceleration_torque,
        table,
    })
}

/// Calculate a sigma-five feed.
pub fn calculate_sigma_five(input: &FeedInput) -> CalcResult<FeedResult> {
    run_feed(input, FeedVariant::SigmaFive)
}

/// Calculate an Allen-Bradley feed.
pub fn calculate_allen_bradley(input: &FeedInput) -> CalcResult<FeedResult> {
    run_feed(input, FeedVariant::AllenBradley)
}

/// Calculate a sigma-five feed with a pull-thru straightener.
pub fn calculate_sigma_five_pull_thru(
    input: &FeedWPullThruInput,
) -> CalcResult<FeedWPullThruResult> {
    let config = get_feed_model(FeedTable::SigmaFivePullThru, &input.feed.feed_model)?;
    let drive = &config.drive;
    if drive.center_distance <= 0.0 {
        return Err(CalcError::domain_invalid(
            "center_distance",
            "pull-thru model must carry a roll center distance",
        ));
    }

    let pinch_rolls = if parse_yes_no("str_pinch_rolls", &input.str_pinch_rolls)? {
        2
    } else {
        0
    };

    let rolls = input.straightening_rolls as f64;
    let k_const = match input.straightening_rolls {
        5 => rolls / 3.5 + 0.1,
        7 => rolls / 3.5,
        9 => rolls / 3.5 - 0.1,
        _ => 3.0,
    };

    let straightener_torque = (0.667
        * input.yield_strength
        * input.feed.material_width
        * input.feed.material_thickness.powi(2)
        / drive.center_distance)
        * k_const
        * drive.u_roll
        * 0.125
        / drive.ratio
        / drive.efficiency;

    let payoff_max_speed = input.req_max_fpm * FPM_BUFFER;

    let feed = run_feed(&input.feed, FeedVariant::SigmaFivePullThru)?;

    Ok(FeedWPullThruResult {
        feed,
        pinch_rolls,
        straightener_torque,
        payoff_max_speed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_input() -> FeedInput {
        FeedInput {
            feed_model: "CPRF-S3".to_string(),
            machine_width: 24.0,
            loop_pit: "No".to_string(),
            material_type: "STEEL".to_string(),
            application: "Press Feed".to_string(),
            type_of_line: "Conventional".to_string(),
            roll_width: "Yes".to_string(),
            feed_rate: 60.0,
            material_width: 20.0,
            material_thickness: 0.06,
            press_bed_length: 60.0,
            friction_in_die: 10.0,
            acceleration_rate: 20.0,
            chart_min_length: 3.0,
            length_increment: 2.0,
            feed_angle_1: 180.0,
            feed_angle_2: 120.0,
        }
    }

    fn pull_thru_input() -> FeedWPullThruInput {
        let mut feed = test_input();
        feed.feed_model = "CPRF-S3 ES".to_string();
        FeedWPullThruInput {
            feed,
            straightening_rolls: 7,
            yield_strength: 55_000.0,
            str_pinch_rolls: "Yes".to_string(),
            req_max_fpm: 100.0,
        }
    }

    #[test]
    fn test_sigma_five_runs() {
        let result = calculate_sigma_five(&test_input()).unwrap();
        assert_eq!(result.table.len(), 22);
        assert!(result.refl_inertia > 0.0);
        assert!(result.peak_torque > result.acceleration_torque);
        assert!(result.max_velocity_fpm > 0.0);
    }

    #[test]
    fn test_table_fpm_consistency() {
        let result = calculate_sigma_five(&test_input()).unwrap();
        for row in &result.table {
            assert!(
                (row.fpm_fa1 - row.length * row.spm_at_fa1 / 12.0).abs() < 1e-9
            );
            assert!(
                (row.fpm_fa2 - row.length * row.spm_at_fa2 / 12.0).abs() < 1e-9
            );
        }
    }

    #[test]
    fn test_loop_pit_doubles_loop_torque() {
        let dry = calculate_sigma_five(&test_input()).unwrap();
        let mut input = test_input();
        input.loop_pit = "Yes".to_string();
        let pit = calculate_sigma_five(&input).unwrap();
        assert!((pit.loop_torque - dry.loop_torque * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_allen_bradley_has_no_constant_friction() {
        let mut input = test_input();
        input.feed_model = "CPRF-S3 MPL".to_string();
        input.friction_in_die = 0.0;
        let result = calculate_allen_bradley(&input).unwrap();
        assert_eq!(result.frictional_torque, 0.0);
    }

    #[test]
    fn test_pull_thru_adds_straightener_fields() {
        let result = calculate_sigma_five_pull_thru(&pull_thru_input()).unwrap();
        assert_eq!(result.pinch_rolls, 2);
        assert!(result.straightener_torque > 0.0);
        assert!((result.payoff_max_speed - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_pull_thru_rms_is_table_max() {
        let result = calculate_sigma_five_pull_thru(&pull_thru_input()).unwrap();
        let table_max = result
            .feed
            .table
            .iter()
            .map(|r| r.rms_torque_fa1)
            .fold(0.0_f64, |a, b| a.max(b));
        assert!((result.feed.rms_torque_fa1 - table_max).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_model_fails() {
        let mut input = test_input();
        input.feed_model = "CPRF-S99".to_string();
        assert_eq!(
            calculate_sigma_five(&input).unwrap_err().error_code(),
            "LOOKUP_NOT_FOUND"
        );
    }

    #[test]
    fn test_bad_loop_pit_flag() {
        let mut input = test_input();
        input.loop_pit = "maybe".to_string();
        assert_eq!(
            calculate_sigma_five(&input).unwrap_err().error_code(),
            "CONFIGURATION_MISMATCH"
        );
    }
}
