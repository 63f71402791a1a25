//! Swept time/motion tables for servo feed moves.
//!
//! For a feed length the move is either acceleration-limited (triangle
//! profile) or has a constant-velocity run phase (trapezoid). Row 0 of a
//! table is the longest purely-accelerating move; rows 1..=21 sweep feed
//! length up from the chart minimum by a fixed increment.
//!
//! Cycle time depends on the line application: a press feed's cycle is the
//! move time scaled to the full 360° press cycle from the feed window angle;
//! any other line adds a fixed dwell (seconds) to the move instead.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Motion profile and torque parameters for one feed drive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionInput {
    /// Acceleration rate (ft/s²)
    pub acceleration: f64,
    /// Press-feed cycle semantics (move time scaled by 360/angle) vs
    /// dwell-constant semantics (angle value is a dwell in seconds)
    pub press_feed: bool,
    /// Constant friction torque at the motor (in-lbs)
    pub frictional_torque: f64,
    /// Feed length increment between swept rows (in)
    pub increment: f64,
    /// Loop torque from supported material (in-lbs)
    pub loop_torque: f64,
    /// Chart minimum feed length (in)
    pub min_length: f64,
    /// Motor rotor inertia
    pub motor_inertia: f64,
    /// Motor peak torque (in-lbs)
    pub motor_peak_torque: f64,
    /// Drive train efficiency
    pub efficiency: f64,
    /// Reflected load inertia at the motor
    pub refl_inertia: f64,
    /// Motor speed at feed velocity (rpm)
    pub rpm: f64,
    /// Settle time (s)
    pub settle_time: f64,
    /// Settle torque (in-lbs)
    pub settle_torque: f64,
    /// Straightener speed cap (in/min); 0 when no straightener limits the
    /// line
    pub str_max_sp_inch: f64,
    /// Feed velocity (ft/s)
    pub velocity: f64,
}

impl MotionInput {
    fn validate(&self, feed_angle: f64) -> CalcResult<()> {
        if self.acceleration <= 0.0 {
            return Err(CalcError::domain_invalid(
                "acceleration",
                "acceleration rate must be positive",
            ));
        }
        if self.velocity <= 0.0 {
            return Err(CalcError::domain_invalid(
                "velocity",
                "feed velocity must be positive",
            ));
        }
        if self.efficiency <= 0.0 {
            return Err(CalcError::domain_invalid(
                "efficiency",
                "drive efficiency must be positive",
            ));
        }
        if self.min_length <= 0.0 {
            return Err(CalcError::domain_invalid(
                "min_length",
                "chart minimum length must be positive",
            ));
        }
        if self.motor_peak_torque <= 0.0 {
            return Err(CalcError::domain_invalid(
                "motor_peak_torque",
                "motor peak torque must be positive",
            ));
        }
        if self.press_feed && feed_angle <= 0.0 {
            return Err(CalcError::domain_invalid(
                "feed_angle",
                "press feed requires a positive feed angle",
            ));
        }
        if !self.press_feed && feed_angle < 0.0 {
            return Err(CalcError::domain_invalid(
                "feed_angle",
                "dwell time must not be negative",
            ));
        }
        Ok(())
    }
}

/// One row of a time/motion table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionRow {
    pub index: usize,
    /// Feed length (in)
    pub length: f64,
    /// Acceleration phase duration (s)
    pub acceleration_time: f64,
    /// Acceleration torque (in-lbs)
    pub acceleration_torque: f64,
    /// Peak torque during the move (in-lbs)
    pub peak_torque: f64,
    /// Constant-velocity run duration (s)
    pub run_time: f64,
    /// Total move time (s)
    pub index_time: f64,
    /// Full cycle time (s)
    pub cycle_time: f64,
    pub strokes_per_minute: f64,
    /// Idle portion of the cycle (s)
    pub dwell_time: f64,
    /// RMS torque over one cycle (in-lbs)
    pub rms_torque: f64,
}

fn acceleration_torque(input: &MotionInput, acceleration_time: f64) -> f64 {
    ((input.refl_inertia * input.rpm) / (9.55 * acceleration_time)) / input.efficiency
        + (input.motor_inertia * input.rpm) / (9.55 * acceleration_time)
}

fn cycle_time(input: &MotionInput, index_time: f64, feed_angle: f64) -> f64 {
    if input.press_feed {
        index_time * (360.0 / feed_angle)
    } else {
        index_time + feed_angle
    }
}

fn rms_torque(
    input: &MotionInput,
    peak_torque: f64,
    acceleration_torque: f64,
    acceleration_time: f64,
    run_time: f64,
    dwell_time: f64,
    cycle_time: f64,
) -> f64 {
    ((peak_torque.powi(2) * acceleration_time
        + acceleration_torque.powi(2) * acceleration_time
        + (input.frictional_torque + input.loop_torque).powi(2) * run_time
        + input.settle_torque.powi(2) * input.settle_time
        + input.loop_torque.powi(2) * dwell_time)
        / cycle_time)
        .sqrt()
}

/// Row 0: the longest move that finishes within the acceleration phase.
fn init_row(input: &MotionInput, feed_angle: f64) -> MotionRow {
    let length = (input.velocity / input.acceleration) * input.velocity * 12.0;
    let acceleration_time = input.velocity / input.acceleration;
    let accel_torque = acceleration_torque(input, acceleration_time);
    let peak_torque = accel_torque + input.frictional_torque + input.loop_torque;

    let run_time = if (length - (input.motor_peak_torque * acceleration_time * 12.0) / 12.0)
        / input.motor_peak_torque
        > 0.0
    {
        ((length - input.motor_peak_torque * acceleration_time * 12.0) / 12.0)
            / input.motor_peak_torque
    } else {
        0.0
    };

    let index_time = acceleration_time * 2.0 + run_time + input.settle_time;
    let cycle = cycle_time(input, index_time, feed_angle);
    let strokes_per_minute = 60.0 / cycle;
    let dwell_time = cycle - index_time;
    let rms = rms_torque(
        input,
        peak_torque,
        accel_torque,
        acceleration_time,
        run_time,
        dwell_time,
        cycle,
    );

    MotionRow {
        index: 0,
        length,
        acceleration_time,
        acceleration_torque: accel_torque,
        peak_torque,
        run_time,
        index_time,
        cycle_time: cycle,
        strokes_per_minute,
        dwell_time,
        rms_torque: rms,
    }
}

/// Rows 1..=21: feed length swept up from the chart minimum.
fn swept_row(input: &MotionInput, init: &MotionRow, feed_angle: f64, index: usize) -> MotionRow {
    let length = input.min_length + input.increment * (index as f64 - 1.0);

    let (acceleration_time, run_time) = if length > init.length {
        (
            init.acceleration_time,
            ((length - init.length) / 12.0) / input.velocity,
        )
    } else {
        (((length / 12.0) / input.acceleration).sqrt(), 0.0)
    };

    let accel_torque = acceleration_torque(input, acceleration_time);
    let peak_torque = accel_torque + input.frictional_torque + input.loop_torque;

    let index_time = acceleration_time * 2.0 + run_time + input.settle_time;
    let cycle = cycle_time(input, index_time, feed_angle);
    let dwell_time = cycle - index_time;
    let rms = rms_torque(
        input,
        peak_torque,
        accel_torque,
        acceleration_time,
        run_time,
        dwell_time,
        cycle,
    );

    let strokes_per_minute = if input.str_max_sp_inch > 0.0 {
        if 60.0 / cycle * length < input.str_max_sp_inch {
            (60.0 / cycle).floor()
        } else {
            (input.str_max_sp_inch / length).floor()
        }
    } else {
        (60.0 / cycle).floor()
    };

    MotionRow {
        index,
        length,
        acceleration_time,
        acceleration_torque: accel_torque,
        peak_torque,
        run_time,
        index_time,
        cycle_time: cycle,
        strokes_per_minute,
        dwell_time,
        rms_torque: rms,
    }
}

/// Generate the 22-row time/motion table for one feed angle.
pub fn feed_time_table(input: &MotionInput, feed_angle: f64) -> CalcResult<Vec<MotionRow>> {
    input.validate(feed_angle)?;

    let init = init_row(input, feed_angle);
    let mut rows = Vec::with_capacity(22);
    for index in 1..=21 {
        rows.push(swept_row(input, &init, feed_angle, index));
    }
    let mut table = vec![init];
    table.append(&mut rows);
    Ok(table)
}
