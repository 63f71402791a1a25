//! Regenerative power returned to the servo drive during deceleration.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Inputs to the regen computation for one feed cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenInput {
    /// Load-to-motor inertia match ratio
    pub inertia_match: f64,
    /// Motor rotor inertia
    pub motor_inertia: f64,
    /// Motor speed at feed velocity (rpm)
    pub rpm: f64,
    /// Acceleration (= deceleration) time (s)
    pub acceleration_time: f64,
    /// Full cycle time (s)
    pub cycle_time: f64,
    /// Servo winding losses (W)
    pub watts_lost: f64,
    /// Energy absorbed by the drive's capacitor bank (J)
    pub ec: f64,
}

/// Average regenerative power (W) that the external resistor must absorb.
pub fn calculate_regen(input: &RegenInput) -> CalcResult<f64> {
    if input.cycle_time <= 0.0 {
        return Err(CalcError::domain_invalid(
            "cycle_time",
            "cycle time must be positive",
        ));
    }

    // Rotational energy of motor plus matched load (J).
    let motor_rotor_inertia = input.motor_inertia * 0.112943;
    let total_inertia = motor_rotor_inertia + motor_rotor_inertia * input.inertia_match;
    let es = (total_inertia * input.rpm.powi(2)) / 182.0;

    // Energy burned in the servo windings while decelerating (J).
    let deceleration_time = input.acceleration_time;
    let em = deceleration_time * input.watts_lost;

    // What the windings and capacitor bank don't absorb goes to the
    // resistor.
    let ek = es - (em + input.ec);

    Ok(ek / input.cycle_time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_input() -> RegenInput {
        RegenInput {
            inertia_match: 8.0,
            motor_inertia: 0.61,
            rpm: 1400.0,
            acceleration_time: 0.12,
            cycle_time: 0.8,
            watts_lost: 60.0,
            ec: 26.0,
        }
    }

    #[test]
    fn test_regen_positive_for_large_loads() {
        let regen = calculate_regen(&test_input()).unwrap();
        assert!(regen > 0.0);
    }

    #[test]
    fn test_regen_formula() {
        let input = test_input();
        let j = input.motor_inertia * 0.112943 * (1.0 + input.inertia_match);
        let es = j * input.rpm.powi(2) / 182.0;
        let ek = es - (input.acceleration_time * input.watts_lost + input.ec);
        let expected = ek / input.cycle_time;
        assert!((calculate_regen(&input).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_cycle_time_rejected() {
        let mut input = test_input();
        input.cycle_time = 0.0;
        assert!(calculate_regen(&input).is_err());
    }
}
