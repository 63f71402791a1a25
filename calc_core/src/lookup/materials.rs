//! Material property table.
//!
//! Density (lb/in³), elastic modulus (psi), and typical yield strength (psi)
//! for the coil materials the machinery is quoted against. Keys are
//! case-insensitive material names ("Cold Rolled Steel", "ALUMINUM", ...).

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::lookup::{fetch_upper, TABLES};

/// Reference properties for one coil material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// Typical yield strength (psi)
    #[serde(rename = "yield")]
    pub yield_psi: f64,
    /// Elastic modulus (psi)
    pub modulus: f64,
    /// Density (lb/in³)
    pub density: f64,
}

/// Look up the full property record for a material.
pub fn get_material(material: &str) -> CalcResult<&'static MaterialProperties> {
    fetch_upper("materials", &TABLES.materials, material)
}

/// Density (lb/in³) for a material.
pub fn get_material_density(material: &str) -> CalcResult<f64> {
    Ok(get_material(material)?.density)
}

/// Elastic modulus (psi) for a material.
pub fn get_material_modulus(material: &str) -> CalcResult<f64> {
    Ok(get_material(material)?.modulus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steel_lookup() {
        let steel = get_material("STEEL").unwrap();
        assert_eq!(steel.density, 0.283);
        assert_eq!(steel.modulus, 29_000_000.0);
    }

    #[test]
    fn test_case_insensitive() {
        let a = get_material("cold rolled steel").unwrap();
        let b = get_material("COLD ROLLED STEEL").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_aluminum_properties() {
        let al = get_material("Aluminum").unwrap();
        assert_eq!(al.modulus, 10_600_000.0);
        assert_eq!(al.density, 0.098);
    }

    #[test]
    fn test_unknown_material() {
        let err = get_material_density("MYSTERY METAL").unwrap_err();
        assert_eq!(err.error_code(), "LOOKUP_NOT_FOUND");
        assert!(err.to_string().contains("MYSTERY METAL"));
    }
}
