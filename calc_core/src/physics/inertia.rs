//! Reflected inertia of a feed head as seen from the motor shaft.
//!
//! Sums per-element reflected inertia (roll cylinders, tapered ports,
//! gearboxes) for a feed model's bill of elements, plus the material web's
//! own reflected inertia. Element lengths come from an explicit
//! family × roll-width × element decision table; gearboxes contribute their
//! rated inertia directly.
//!
//! ## Units
//!
//! Diameters and lengths in inches, density in lb/in³, inertia in the
//! lb-in² convention the drive-sizing formulas expect (the 386.4 in/s²
//! gravity constant folds the mass conversion in).

use serde::Serialize;

use crate::errors::{CalcError, CalcResult};
use crate::lookup::feeds::{FamilyGroup, FeedElement, FeedFamily, FeedModelConfig};

/// Inputs to the reflected-inertia summation for one feed head.
#[derive(Debug, Clone, Serialize)]
pub struct InertiaInput<'a> {
    /// Feed model record (drive specs + bill of elements)
    #[serde(skip)]
    pub config: &'a FeedModelConfig,
    /// Machine width (in); drives roll body lengths
    pub machine_width: f64,
    /// Coil material width (in)
    pub material_width: f64,
    /// Material thickness (in)
    pub material_thickness: f64,
    /// Material density (lb/in³)
    pub material_density: f64,
    /// Press bed length (in); the span of web the feed accelerates
    pub press_bed_length: f64,
    /// Overall feed gear ratio, motor to roll
    pub feed_ratio: f64,
    /// Whether the head is built with full-width rolls
    pub full_width_rolls: bool,
}

/// Weight (lbs) of a hollow cylinder element.
pub fn cylinder_weight(o_dia: f64, i_dia: f64, length: f64, density: f64, qty: u32) -> f64 {
    (std::f64::consts::PI * length * density / 4.0) * (o_dia.powi(2) - i_dia.powi(2)) * qty as f64
}

/// Rotational inertia of a hollow cylinder about its axis.
pub fn cylinder_inertia(weight_lbs: f64, o_dia: f64, i_dia: f64) -> f64 {
    (weight_lbs / 386.4) * (o_dia.powi(2) + i_dia.powi(2)) / 8.0
}

/// Inertia reflected through a gear ratio.
pub fn reflect(inertia: f64, ratio: f64) -> CalcResult<f64> {
    if ratio == 0.0 {
        return Err(CalcError::domain_invalid(
            "gear_ratio",
            "gear ratio must be non-zero to reflect inertia",
        ));
    }
    Ok(inertia / ratio.powi(2))
}

/// Body length (in) of one element for a given family and roll-width build.
///
/// This is the geometry decision table: one row per
/// (family group, full-width flag, element name) combination, with the
/// element's default length as the fallback.
pub fn element_length(
    family: FeedFamily,
    full_width_rolls: bool,
    element: &str,
    width: f64,
    default_length: f64,
) -> CalcResult<f64> {
    if width < 0.0 {
        return Err(CalcError::domain_invalid(
            "machine_width",
            "machine width must not be negative",
        ));
    }

    let length = match (family.group(), full_width_rolls) {
        (FamilyGroup::S1S2, _) => match element {
            "u_roll" => width + 0.75,
            "l_roll" => width + 2.5,
            "s_roll" | "sp_roll" => width + 1.75,
            _ => default_length,
        },
        (FamilyGroup::S3S5, true) => match element {
            "u_roll" | "u_roll_contact" | "u_roll_1" => {
                if family == FeedFamily::S5 {
                    width + 1.725
                } else {
                    width + 1.99
                }
            }
            "l_roll" | "l_roll_contact" | "l_roll_1" => {
                width + if family == FeedFamily::S5 { 1.0 } else { 0.5 }
            }
            "l_roll_2" => match family {
                FeedFamily::S3 => 6.14,
                FeedFamily::S4 => 4.24,
                _ => 4.92,
            },
            "u_tappered_port" => default_length,
            "l_tappered_port" => match family {
                FeedFamily::S3 => 6.14,
                FeedFamily::S4 => 4.24,
                FeedFamily::S5 => 3.906,
                _ => default_length,
            },
            "s_roll" | "sp_roll" => {
                width + if family == FeedFamily::S3 { 1.75 } else { 1.625 }
            }
            _ => default_length,
        },
        (FamilyGroup::S3S5, false) => match element {
            "u_roll" | "l_roll" | "u_roll_contact" | "l_roll_contact" | "u_roll_1"
            | "l_roll_1" => width * 0.5,
            "u_roll_2" => match family {
                FeedFamily::S3 => width * 0.5,
                FeedFamily::S4 => 4.74 + width * 0.5,
                FeedFamily::S5 => (width + 5.92) - width * 0.5,
                _ => default_length,
            },
            "u_tappered_port" => width * 0.5 + 1.99,
            "l_tappered_port" => {
                width * 0.5
                    + match family {
                        FeedFamily::S4 => 4.74,
                        FeedFamily::S5 => 5.657,
                        _ => 0.0,
                    }
            }
            "s_roll" | "sp_roll" => {
                width + if family == FeedFamily::S3 { 1.75 } else { 1.625 }
            }
            _ => default_length,
        },
        (FamilyGroup::S6S8, true) => match element {
            "u_roll_1" => width + 1.725,
            "l_roll_1" => width + 1.0,
            "l_roll_2" => 4.92,
            "s_roll" | "sp_roll" => width + 1.625,
            _ => default_length,
        },
        (FamilyGroup::S6S8, false) => match element {
            "u_roll" | "l_roll" | "u_roll_1" | "l_roll_1" => width * 0.5,
            "u_roll_2" => (width + 1.1725) - width * 0.5,
            "l_roll_2" => (width + 5.92) - width * 0.5,
            "s_roll" | "sp_roll" => width + 1.625,
            _ => default_length,
        },
    };

    Ok(length)
}

/// The upper contact roll element, whose OD sets both slave-roll ratios and
/// the effective diameter the material web is accelerated at.
fn upper_roll(config: &FeedModelConfig) -> CalcResult<&FeedElement> {
    config
        .elements
        .get("u_roll")
        .or_else(|| config.elements.get("u_roll_1"))
        .ok_or_else(|| {
            CalcError::domain_invalid("feed_elements", "feed model has no upper roll element")
        })
}

/// Total reflected inertia at the motor for a feed head and its web.
pub fn total_reflected_inertia(input: &InertiaInput<'_>) -> CalcResult<f64> {
    if input.feed_ratio == 0.0 {
        return Err(CalcError::domain_invalid(
            "feed_ratio",
            "feed gear ratio must be non-zero",
        ));
    }

    let upper_roll_dia = upper_roll(input.config)?.o_dia;
    let mut total = 0.0;

    for (name, element) in &input.config.elements {
        if name.contains("g_box") {
            if element.qty > 0 {
                total += element.qty as f64 * element.inertia;
            }
            continue;
        }

        let length = element_length(
            input.config.family,
            input.full_width_rolls,
            name,
            input.machine_width,
            element.length,
        )?;

        // Slave rolls with no ratio of their own follow the upper roll
        // through the feed ratio, scaled by their diameter ratio.
        let ratio = if element.ratio == 0.0 {
            if name == "s_roll" || name == "sp_roll" {
                (element.o_dia / upper_roll_dia) * input.feed_ratio
            } else {
                input.feed_ratio
            }
        } else {
            element.ratio
        };

        let weight = cylinder_weight(element.o_dia, element.i_dia, length, element.density, element.qty);
        let inertia = cylinder_inertia(weight, element.o_dia, element.i_dia);
        total += reflect(inertia, ratio)?;
    }

    // Material web reflected through the upper roll.
    let web_inertia = ((input.material_width
        * input.material_thickness
        * input.press_bed_length
        * input.material_density)
        / 32.3)
        * ((upper_roll_dia * 0.5).powi(2) / 144.0)
        * 12.0;
    total += reflect(web_inertia, input.feed_ratio)?;

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::feeds::{FeedDriveSpecs, FeedTable};
    use std::collections::BTreeMap;

    fn synthetic_drive() -> FeedDriveSpecs {
        FeedDriveSpecs {
            max_motor_rpm: 3000.0,
            motor_inertia: 0.5,
            motor_peak_torque: 100.0,
            motor_rms_torque: 30.0,
            u_roll: 4.0,
            l_roll: 4.0,
            ratio: 1.0,
            efficiency: 0.85,
            settle_torque: 5.0,
            friction_torque: 0.0,
            watts_lost: 50.0,
            ec: 26.0,
            center_distance: 0.0,
        }
    }

    fn synthetic_config(elements: BTreeMap<String, FeedElement>) -> FeedModelConfig {
        FeedModelConfig {
            family: FeedFamily::S1,
            drive: synthetic_drive(),
            elements,
        }
    }

    fn element(o_dia: f64, i_dia: f64, ratio: f64, length: f64) -> FeedElement {
        FeedElement {
            o_dia,
            i_dia,
            density: 0.283,
            ratio,
            qty: 1,
            length,
            inertia: 0.0,
        }
    }

    #[test]
    fn test_single_element_unity_ratio_is_unreflected() {
        // One element with ratio 1: total reflected inertia must equal the
        // element's plain inertia plus nothing else (no web).
        let mut elements = BTreeMap::new();
        elements.insert("u_roll".to_string(), element(4.0, 1.0, 1.0, 0.0));
        let config = synthetic_config(elements);

        let input = InertiaInput {
            config: &config,
            machine_width: 10.0,
            material_width: 0.0,
            material_thickness: 0.0,
            material_density: 0.0,
            press_bed_length: 0.0,
            feed_ratio: 1.0,
            full_width_rolls: false,
        };

        let total = total_reflected_inertia(&input).unwrap();
        let length = element_length(FeedFamily::S1, false, "u_roll", 10.0, 0.0).unwrap();
        let weight = cylinder_weight(4.0, 1.0, length, 0.283, 1);
        let plain = cylinder_inertia(weight, 4.0, 1.0);
        assert!((total - plain).abs() < 1e-12);
    }

    #[test]
    fn test_total_is_sum_of_parts() {
        let mut elements = BTreeMap::new();
        elements.insert("u_roll".to_string(), element(4.0, 1.0, 0.0, 0.0));
        elements.insert("l_roll".to_string(), element(4.0, 1.0, 0.0, 0.0));
        elements.insert(
            "g_box".to_string(),
            FeedElement {
                o_dia: 0.0,
                i_dia: 0.0,
                density: 0.0,
                ratio: 0.0,
                qty: 2,
                length: 0.0,
                inertia: 0.1,
            },
        );
        let config = synthetic_config(elements);

        let input = InertiaInput {
            config: &config,
            machine_width: 12.0,
            material_width: 24.0,
            material_thickness: 0.06,
            material_density: 0.283,
            press_bed_length: 48.0,
            feed_ratio: 4.0,
            full_width_rolls: false,
        };

        let total = total_reflected_inertia(&input).unwrap();

        let mut expected = 0.0;
        for name in ["u_roll", "l_roll"] {
            let el = config.elements[name];
            let len = element_length(FeedFamily::S1, false, name, 12.0, el.length).unwrap();
            let w = cylinder_weight(el.o_dia, el.i_dia, len, el.density, el.qty);
            expected += cylinder_inertia(w, el.o_dia, el.i_dia) / 16.0;
        }
        expected += 2.0 * 0.1;
        let web = ((24.0 * 0.06 * 48.0 * 0.283) / 32.3) * ((4.0_f64 * 0.5).powi(2) / 144.0) * 12.0;
        expected += web / 16.0;

        assert!((total - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_feed_ratio_rejected() {
        let mut elements = BTreeMap::new();
        elements.insert("u_roll".to_string(), element(4.0, 1.0, 0.0, 0.0));
        let config = synthetic_config(elements);
        let input = InertiaInput {
            config: &config,
            machine_width: 10.0,
            material_width: 0.0,
            material_thickness: 0.0,
            material_density: 0.0,
            press_bed_length: 0.0,
            feed_ratio: 0.0,
            full_width_rolls: false,
        };
        let err = total_reflected_inertia(&input).unwrap_err();
        assert_eq!(err.error_code(), "DOMAIN_INVALID");
    }

    #[test]
    fn test_element_length_table() {
        // S1/S2 overhangs
        assert_eq!(
            element_length(FeedFamily::S1, false, "u_roll", 10.0, 0.0).unwrap(),
            10.75
        );
        assert_eq!(
            element_length(FeedFamily::S2, true, "l_roll", 10.0, 0.0).unwrap(),
            12.5
        );
        // S5 full-width upper roll
        assert!(
            (element_length(FeedFamily::S5, true, "u_roll_1", 10.0, 0.0).unwrap() - 11.725).abs()
                < 1e-12
        );
        // S4 narrow lower tapered port
        assert!(
            (element_length(FeedFamily::S4, false, "l_tappered_port", 10.0, 0.0).unwrap() - 9.74)
                .abs()
                < 1e-12
        );
        // S6 narrow upper roll half-pair
        assert!(
            (element_length(FeedFamily::S6, false, "u_roll_2", 10.0, 0.0).unwrap() - 6.1725)
                .abs()
                < 1e-12
        );
        // Unknown element falls back to the default
        assert_eq!(
            element_length(FeedFamily::S7, true, "idler", 10.0, 3.5).unwrap(),
            3.5
        );
    }

    #[test]
    fn test_real_model_inertia_is_positive() {
        let config =
            crate::lookup::feeds::get_feed_model(FeedTable::SigmaFive, "CPRF-S3").unwrap();
        let input = InertiaInput {
            config,
            machine_width: 24.0,
            material_width: 20.0,
            material_thickness: 0.06,
            material_density: 0.283,
            press_bed_length: 60.0,
            feed_ratio: config.drive.ratio,
            full_width_rolls: true,
        };
        let total = total_reflected_inertia(&input).unwrap();
        assert!(total > 0.0);
    }
}
