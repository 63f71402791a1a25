//! Reel model dimensions, brake types, the holddown matrix, drive torque
//! ratings, line types, and the FPM buffer.
//!
//! The holddown matrix is addressed by an explicit [`HolddownKey`] struct
//! built from three sub-lookups (model family, assembly sort order, assembly
//! name) plus the cylinder type. The `+`-joined string form exists only in
//! the JSON key space.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::lookup::{fetch, fetch_upper, TABLES};

/// Dimensional constants for one reel model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReelDimensions {
    /// Nominal reel size (in)
    pub size: f64,
    /// Distance between mandrel bearings (in)
    pub bearing_dist: f64,
    /// Front bearing diameter (in)
    pub fbearing_dia: f64,
    /// Rear bearing diameter (in)
    pub rbearing_dia: f64,
    /// Maximum coil weight capacity (lbs)
    pub coil_weight: f64,
    /// Mandrel diameter (in)
    pub mandrel_dia: f64,
    /// Standard backplate diameter (in)
    pub backplate: f64,
    /// Full-OD backplate diameter (in)
    pub full_od_backplate: f64,
    /// Backplate thickness (in)
    pub backplate_thickness: f64,
}

/// Holddown and drive family labels for a reel model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFamilies {
    pub holddown_family: String,
    pub drive_family: String,
}

/// Sort order of a holddown assembly within its family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HolddownSort {
    pub sort: u32,
}

/// Brake cylinder bore by brake model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrakeType {
    pub cylinder_bore: f64,
}

/// One row of the holddown matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolddownMatrixEntry {
    pub key: String,
    pub pressure_label: String,
    pub max_psi: f64,
    pub psi: f64,
    pub force_factor: f64,
    pub min_width: f64,
}

impl HolddownMatrixEntry {
    /// Working pressure for this holddown.
    ///
    /// Air-operated assemblies run at shop air capped at the assembly
    /// rating; everything else runs at the rated pressure.
    pub fn pressure_psi(&self, air_pressure: f64) -> f64 {
        if self.pressure_label.contains("psi Air") {
            air_pressure.min(self.max_psi)
        } else {
            self.psi
        }
    }

    /// Clamping force available at a given working pressure.
    pub fn force_available(&self, pressure_psi: f64) -> f64 {
        self.force_factor * pressure_psi
    }
}

/// Mandrel drive torque rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveTorque {
    pub torque: f64,
}

/// Line type characteristics: how the reel is driven and whether the line
/// carries a straightener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineType {
    pub reel_type: String,
    pub str_used: String,
}

/// Composite key into the holddown matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HolddownKey {
    pub family: String,
    pub sort: u32,
    pub assembly: String,
    pub cylinder: String,
}

impl HolddownKey {
    /// The `+`-joined form used as the key in the JSON table.
    pub fn json_key(&self) -> String {
        format!(
            "{}+{}+{}+{}",
            self.family, self.sort, self.assembly, self.cylinder
        )
    }
}

/// Full dimension record for a reel model.
pub fn get_reel_dimensions(model: &str) -> CalcResult<&'static ReelDimensions> {
    fetch_upper("reels", &TABLES.reels, model)
}

/// Maximum coil weight capacity (lbs) for a reel model.
pub fn get_reel_max_weight(model: &str) -> CalcResult<f64> {
    Ok(get_reel_dimensions(model)?.coil_weight)
}

/// Speed safety buffer factor.
pub fn get_fpm_buffer(key: &str) -> CalcResult<f64> {
    fetch_upper("fpm_buffer", &TABLES.fpm_buffer, key).copied()
}

/// Brake cylinder bore (in) by brake model.
pub fn get_cylinder_bore(brake_model: &str) -> CalcResult<f64> {
    Ok(fetch("brake_types", &TABLES.brake_types, brake_model)?.cylinder_bore)
}

/// Build the holddown matrix key from the reel model, assembly, and cylinder.
pub fn holddown_key(model: &str, hold_down_assy: &str, cylinder: &str) -> CalcResult<HolddownKey> {
    let families = fetch_upper("model_families", &TABLES.model_families, model)?;
    let sort = fetch("holddown_sort", &TABLES.holddown_sort, hold_down_assy)?;
    Ok(HolddownKey {
        family: families.holddown_family.clone(),
        sort: sort.sort,
        assembly: hold_down_assy.to_string(),
        cylinder: cylinder.to_string(),
    })
}

/// Look up the holddown matrix row for a composite key.
pub fn get_holddown_entry(key: &HolddownKey) -> CalcResult<&'static HolddownMatrixEntry> {
    let json_key = key.json_key();
    TABLES
        .holddown_matrix
        .iter()
        .find(|entry| entry.key == json_key)
        .ok_or_else(|| CalcError::lookup_not_found("holddown_matrix", json_key))
}

/// Build the drive key from the reel model, air clutch flag, and hydraulic
/// threading drive selection.
pub fn drive_key(model: &str, air_clutch: &str, hyd_threading_drive: &str) -> CalcResult<String> {
    let families = fetch_upper("model_families", &TABLES.model_families, model)?;
    Ok(format!(
        "{}+{}+{}",
        families.drive_family, air_clutch, hyd_threading_drive
    ))
}

/// Torque at the mandrel (in-lbs) for a drive key.
pub fn get_drive_torque(key: &str) -> CalcResult<f64> {
    Ok(fetch("drive_torque", &TABLES.drive_torque, key)?.torque)
}

/// Line type record for a type-of-line label.
pub fn get_type_of_line(type_of_line: &str) -> CalcResult<&'static LineType> {
    fetch("type_of_line", &TABLES.type_of_line, type_of_line)
}

/// Whether the line type carries a straightener ("Yes"/"No").
pub fn get_selected_str_used(type_of_line: &str) -> CalcResult<&'static str> {
    Ok(get_type_of_line(type_of_line)?.str_used.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reel_lookup() {
        let reel = get_reel_dimensions("cpr-040").unwrap();
        assert_eq!(reel.coil_weight, 4000.0);
        assert_eq!(reel.mandrel_dia, 8.75);
    }

    #[test]
    fn test_unknown_reel() {
        let err = get_reel_max_weight("CPR-999").unwrap_err();
        assert!(err.to_string().contains("CPR-999"));
    }

    #[test]
    fn test_holddown_key_roundtrip() {
        let key = holddown_key("CPR-040", "SD", "Hydraulic").unwrap();
        assert_eq!(key.json_key(), "CPR100+1+SD+Hydraulic");
        let entry = get_holddown_entry(&key).unwrap();
        assert_eq!(entry.min_width, 6.0);
    }

    #[test]
    fn test_air_pressure_capped() {
        let key = holddown_key("CPR-040", "SD", "Air").unwrap();
        let entry = get_holddown_entry(&key).unwrap();
        assert_eq!(entry.pressure_psi(120.0), 80.0);
        assert_eq!(entry.pressure_psi(60.0), 60.0);
    }

    #[test]
    fn test_hydraulic_pressure_is_rated() {
        let key = holddown_key("CPR-150", "MD", "Hydraulic").unwrap();
        let entry = get_holddown_entry(&key).unwrap();
        assert_eq!(entry.pressure_psi(80.0), 1000.0);
        assert_eq!(entry.force_available(1000.0), entry.force_factor * 1000.0);
    }

    #[test]
    fn test_drive_key_and_torque() {
        let key = drive_key("CPR-040", "Yes", "22 cu in (D-12689)").unwrap();
        assert_eq!(key, "D100+Yes+22 cu in (D-12689)");
        assert_eq!(get_drive_torque(&key).unwrap(), 8250.0);
    }

    #[test]
    fn test_type_of_line() {
        let line = get_type_of_line("Conventional").unwrap();
        assert_eq!(line.reel_type, "Pulloff");
        assert_eq!(get_selected_str_used("Conventional").unwrap(), "Yes");
    }

    #[test]
    fn test_fpm_buffer() {
        assert_eq!(get_fpm_buffer("default").unwrap(), 1.2);
    }
}
