//! # calc_core - Coil-Processing Performance Calculation Engine
//!
//! `calc_core` computes the mechanical-engineering performance figures
//! (torque, inertia, force, regenerative power, straightener backbend
//! geometry) quoted for coil-processing machinery: servo feeds, reels,
//! powered straighteners, hydraulic shears, and zig-zag drives.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: every calculation is a pure function of its input plus
//!   the read-only lookup tables loaded at first use
//! - **JSON-First**: all inputs, results, and errors implement
//!   Serialize/Deserialize
//! - **Rich Errors**: structured error types naming the failed lookup or
//!   violated precondition, not just strings
//! - **Fail-Fast**: the first failed lookup or domain violation aborts an
//!   orchestrator; there are no partial results
//!
//! ## Quick Start
//!
//! ```rust
//! use calc_core::calculations::hyd_shear::{calculate, HydShearInput, ShearVariant};
//!
//! let input = HydShearInput {
//!     material_thickness: 0.25,
//!     coil_width: 48.0,
//!     material_tensile: 60_000.0,
//!     rake_of_blade: 0.5,
//!     overlap: 0.125,
//!     blade_opening: 2.0,
//!     percent_of_penetration: 0.35,
//!     bore_size: 4.0,
//!     rod_dia: 2.0,
//!     stroke: 6.0,
//!     pressure: 2000.0,
//!     time_for_down_stroke: 1.5,
//!     dwell_time: 2.0,
//! };
//!
//! let result = calculate(&input, ShearVariant::SingleRake).unwrap();
//! assert_eq!(result.shear_strength, 45_000.0);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - One orchestrator per machine type
//! - [`physics`] - Shared inertia/motion/regen engines
//! - [`lookup`] - Static machine and material reference tables
//! - [`errors`] - Structured error types
//! - [`rfq`] - File-backed RFQ record store

pub mod calculations;
pub mod errors;
pub mod lookup;
pub mod physics;
pub mod rfq;

// Re-export commonly used types at crate root for convenience
pub use errors::{CalcError, CalcResult};
pub use rfq::{RfqRecord, RfqStore};
