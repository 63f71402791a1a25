//! # Coilcalc Batch Driver
//!
//! Reads one JSON document describing an RFQ (from a file argument or
//! stdin), maps its nested fields into the calculation inputs with typed
//! defaults, runs every orchestrator in a fixed order, and prints one
//! aggregated JSON document. Sections that fail carry their structured
//! error in place of a result.
//!
//! When the document carries an `rfq.reference`, each section is also
//! upserted into the file-backed RFQ store under `./outputs/`.

use std::io::Read;

use serde_json::{json, Value};

use calc_core::calculations::backbend::{self, BackbendInput};
use calc_core::calculations::feed::{self, FeedInput, FeedWPullThruInput};
use calc_core::calculations::hyd_shear::{self, HydShearInput, ShearVariant};
use calc_core::calculations::material_specs::{self, FpmInput, MaterialSpecsInput};
use calc_core::calculations::reel_drive::{self, ReelDriveInput};
use calc_core::calculations::str_utility::{self, StrUtilityInput};
use calc_core::calculations::tddbhd::{self, TddbhdInput};
use calc_core::calculations::zig_zag::{self, ZigZagInput};
use calc_core::errors::CalcResult;
use calc_core::RfqStore;

/// Where persisted RFQ records land.
const OUTPUT_DIR: &str = "./outputs";

/// Typed field extraction over the input document, with the load-bearing
/// defaults applied where the document is silent.
struct Doc {
    root: Value,
}

impl Doc {
    fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn f64(&self, path: &str, default: f64) -> f64 {
        self.get(path).and_then(Value::as_f64).unwrap_or(default)
    }

    fn u32(&self, path: &str, default: u32) -> u32 {
        self.get(path)
            .and_then(Value::as_u64)
            .map(|v| v as u32)
            .unwrap_or(default)
    }

    fn string(&self, path: &str, default: &str) -> String {
        self.get(path)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }
}

fn material_specs_input(doc: &Doc) -> MaterialSpecsInput {
    MaterialSpecsInput {
        material_type: doc.string("material.material_type", "COLD ROLLED STEEL"),
        material_thickness: doc.f64("material.material_thickness", 0.0),
        yield_strength: doc.f64("material.yield_strength", 0.0),
        coil_width: doc.f64("material.coil_width", 0.0),
        coil_weight: doc.f64("material.coil_weight", 0.0),
        coil_id: doc.f64("material.coil_id", 0.0),
    }
}

fn tddbhd_input(doc: &Doc) -> TddbhdInput {
    TddbhdInput {
        type_of_line: doc.string("feed.type_of_line", "Conventional"),
        reel_drive_torque_empty: doc.get("reel.drive_torque_empty").and_then(Value::as_f64),
        yield_strength: doc.f64("material.yield_strength", 0.0),
        thickness: doc.f64("material.material_thickness", 0.0),
        width: doc.f64("material.coil_width", 0.0),
        coil_id: doc.f64("material.coil_id", 0.0),
        coil_od: doc.f64("material.max_coil_od", 0.0),
        decel: doc.f64("reel.required_decel_rate", 0.0),
        friction: doc.f64("reel.coefficient_of_friction", 0.5),
        air_pressure: doc.f64("reel.air_pressure_available", 0.0),
        brake_qty: doc.u32("reel.drag_brake_quantity", 1),
        brake_model: doc.string("reel.drag_brake_model", "Single Stage"),
        cylinder: doc.string("reel.holddown_cylinder", "Hydraulic"),
        hold_down_assy: doc.string("reel.holddown_assy", "SD"),
        hyd_threading_drive: doc.string("reel.threading_drive_hyd", "22 cu in (D-12689)"),
        air_clutch: doc.string("reel.threading_drive_air_clutch", "Yes"),
        material_type: doc.string("material.material_type", "COLD ROLLED STEEL"),
        reel_model: doc.string("reel.model", "CPR-040"),
    }
}

fn reel_drive_input(doc: &Doc) -> ReelDriveInput {
    ReelDriveInput {
        model: doc.string("reel.model", "CPR-040"),
        material_type: doc.string("material.material_type", "COLD ROLLED STEEL"),
        coil_id: doc.f64("material.coil_id", 0.0),
        coil_od: doc.f64("material.max_coil_od", 0.0),
        reel_width: doc.f64("reel.width", 0.0),
        backplate_diameter: doc.f64("reel.backplate_diameter", 0.0),
        motor_hp: doc.f64("reel.horsepower", 0.0),
        type_of_line: doc.string("feed.type_of_line", "Conventional"),
        required_max_fpm: doc.f64("feed.average_fpm", 0.0),
    }
}

fn backbend_input(doc: &Doc) -> BackbendInput {
    BackbendInput {
        yield_strength: doc.f64("material.yield_strength", 0.0),
        thickness: doc.f64("material.material_thickness", 0.0),
        width: doc.f64("material.coil_width", 0.0),
        material_type: doc.string("material.material_type", "COLD ROLLED STEEL"),
        str_model: doc.string("straightener.model", "CPPS-250"),
        num_str_rolls: doc.u32("straightener.number_of_rolls", 7),
    }
}

fn str_utility_input(doc: &Doc, yield_met: String) -> StrUtilityInput {
    StrUtilityInput {
        max_coil_weight: doc.f64("material.max_coil_weight", 0.0),
        coil_id: doc.f64("material.coil_id", 0.0),
        coil_od: doc.f64("material.max_coil_od", 0.0),
        coil_width: doc.f64("material.coil_width", 0.0),
        material_thickness: doc.f64("material.material_thickness", 0.0),
        yield_strength: doc.f64("material.yield_strength", 0.0),
        material_type: doc.string("material.material_type", "COLD ROLLED STEEL"),
        yield_met,
        str_model: doc.string("straightener.model", "CPPS-250"),
        str_width: doc.f64("straightener.width", 0.0),
        horsepower: doc.f64("straightener.horsepower", 0.0),
        feed_rate: doc.f64("straightener.feed_rate", 0.0),
        max_feed_rate: doc.f64("straightener.max_feed_rate", 0.0),
        auto_brake_compensation: doc.string("straightener.auto_brake_compensation", "Yes"),
        acceleration: doc.f64("straightener.acceleration", 0.0),
        num_str_rolls: doc.u32("straightener.number_of_rolls", 7),
    }
}

fn feed_input(doc: &Doc) -> FeedInput {
    FeedInput {
        feed_model: doc.string("feed.model", "CPRF-S3"),
        machine_width: doc.f64("feed.machine_width", 0.0),
        loop_pit: doc.string("feed.loop_pit", "No"),
        material_type: doc.string("material.material_type", "COLD ROLLED STEEL"),
        application: doc.string("feed.application", "Press Feed"),
        type_of_line: doc.string("feed.type_of_line", "Conventional"),
        roll_width: doc.string("feed.roll_width", "No"),
        feed_rate: doc.f64("straightener.feed_rate", 0.0),
        material_width: doc.f64("material.coil_width", 0.0),
        material_thickness: doc.f64("material.material_thickness", 0.0),
        press_bed_length: doc.f64("press.bed_length", 0.0),
        friction_in_die: doc.f64("feed.friction_in_die", 0.0),
        acceleration_rate: doc.f64("feed.acceleration_rate", 0.0),
        chart_min_length: doc.f64("feed.chart_min_length", 0.0),
        length_increment: doc.f64("feed.length_increment", 0.0),
        feed_angle_1: doc.f64("feed.feed_angle_1", 0.0),
        feed_angle_2: doc.f64("feed.feed_angle_2", 0.0),
    }
}

fn pull_thru_input(doc: &Doc) -> FeedWPullThruInput {
    FeedWPullThruInput {
        feed: feed_input(doc),
        straightening_rolls: doc.u32("feed.straightener_rolls", 7),
        yield_strength: doc.f64("material.yield_strength", 0.0),
        str_pinch_rolls: doc.string("feed.pinch_rolls", "No"),
        req_max_fpm: doc.f64("feed.average_fpm", 0.0),
    }
}

fn hyd_shear_input(doc: &Doc) -> HydShearInput {
    HydShearInput {
        material_thickness: doc.f64("material.material_thickness", 0.0),
        coil_width: doc.f64("material.coil_width", 0.0),
        material_tensile: doc.f64("shear.strength", 0.0),
        rake_of_blade: doc.f64("shear.rake_of_blade_per_foot", 0.0),
        overlap: doc.f64("shear.overlap", 0.0),
        blade_opening: doc.f64("shear.blade_opening", 0.0),
        percent_of_penetration: doc.f64("shear.percent_of_penetration", 0.0),
        bore_size: doc.f64("shear.bore_size", 0.0),
        rod_dia: doc.f64("shear.rod_diameter", 0.0),
        stroke: doc.f64("shear.stroke", 0.0),
        pressure: doc.f64("shear.hydraulic_pressure", 0.0),
        time_for_down_stroke: doc.f64("shear.time_for_downward_stroke", 0.0),
        dwell_time: doc.f64("shear.dwell_time", 0.0),
    }
}

fn zig_zag_input(doc: &Doc) -> ZigZagInput {
    ZigZagInput {
        material_width: doc.f64("material.coil_width", 0.0),
        material_thickness: doc.f64("material.material_thickness", 0.0),
        material_length_flat: doc.f64("zig_zag.material_length_flat", 0.0),
        material_density: doc.f64("zig_zag.material_density", 0.283),
        loop_height: doc.f64("zig_zag.loop_height", 0.0),
        pivot_to_screw: doc.f64("zig_zag.pivot_to_screw", 0.0),
        total_load: doc.f64("zig_zag.total_load", 0.0),
        efficiency: doc.f64("zig_zag.efficiency", 0.85),
        feed_angle: doc.f64("zig_zag.feed_angle", 0.0),
        misc_friction_at_motor: doc.f64("zig_zag.misc_friction_at_motor", 0.0),
        lead_screw_o_dia: doc.f64("zig_zag.lead_screw_o_dia", 1.5),
        lead_screw_i_dia: doc.f64("zig_zag.lead_screw_i_dia", 0.0),
        lead_screw_length: doc.f64("zig_zag.lead_screw_length", 0.0),
        lead_screw_density: doc.f64("zig_zag.lead_screw_density", 0.283),
        min_length: doc.f64("zig_zag.min_length", 0.0),
        increment: doc.f64("zig_zag.increment", 0.0),
    }
}

/// Render a calculation outcome as a JSON section: the result on success,
/// the structured error otherwise.
fn section<T: serde::Serialize>(outcome: CalcResult<T>) -> Value {
    match outcome {
        Ok(result) => serde_json::to_value(result).unwrap_or(Value::Null),
        Err(error) => json!({ "error": error }),
    }
}

fn read_document() -> Result<String, String> {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1) {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {path}: {e}")),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("cannot read stdin: {e}"))?;
            Ok(buffer)
        }
    }
}

fn main() {
    let raw = match read_document() {
        Ok(raw) => raw,
        Err(message) => {
            eprintln!("Error: {message}");
            std::process::exit(1);
        }
    };

    let root: Value = match serde_json::from_str(&raw) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error: input is not valid JSON: {e}");
            std::process::exit(1);
        }
    };
    let doc = Doc { root };

    let mut output = serde_json::Map::new();

    output.insert(
        "material_specs".to_string(),
        section(material_specs::calculate(&material_specs_input(&doc))),
    );

    let fpm = material_specs::calculate_fpm(&FpmInput {
        feed_length: doc.f64("feed.average_length", 0.0),
        spm: doc.f64("feed.average_spm", 0.0),
    });
    output.insert("average_fpm".to_string(), json!(fpm));

    output.insert(
        "tddbhd".to_string(),
        section(tddbhd::calculate(&tddbhd_input(&doc))),
    );

    output.insert(
        "reel_drive".to_string(),
        section(reel_drive::calculate(&reel_drive_input(&doc))),
    );

    // The backbend result carries the yielded fraction the straightener
    // utility check consumes.
    let backbend_outcome = backbend::calculate(&backbend_input(&doc));
    let yield_met = match &backbend_outcome {
        Ok(result) => result
            .carryover(doc.get("straightener.yield_confirmed").is_some())
            .yield_met(),
        Err(_) => "NOT OK".to_string(),
    };
    output.insert("roll_str_backbend".to_string(), section(backbend_outcome));

    output.insert(
        "str_utility".to_string(),
        section(str_utility::calculate(&str_utility_input(&doc, yield_met))),
    );

    let feed_section = match doc.string("feed.type", "sigma_five").as_str() {
        "sigma_five_pull_thru" => section(feed::calculate_sigma_five_pull_thru(&pull_thru_input(
            &doc,
        ))),
        "allen_bradley" => section(feed::calculate_allen_bradley(&feed_input(&doc))),
        _ => section(feed::calculate_sigma_five(&feed_input(&doc))),
    };
    output.insert("feed".to_string(), feed_section);

    let shear_variant = match doc.string("shear.model", "single_rake").as_str() {
        "bow_tie" => ShearVariant::BowTie,
        _ => ShearVariant::SingleRake,
    };
    output.insert(
        "hyd_shear".to_string(),
        section(hyd_shear::calculate(&hyd_shear_input(&doc), shear_variant)),
    );

    output.insert(
        "zig_zag".to_string(),
        section(zig_zag::calculate(&zig_zag_input(&doc))),
    );

    // Persist each section when the document names a reference.
    let reference = doc.string("rfq.reference", "");
    if !reference.is_empty() {
        let store = RfqStore::new(OUTPUT_DIR);
        for (label, value) in &output {
            if let Err(e) = store.upsert(&reference, label, value.clone()) {
                eprintln!("Warning: failed to persist '{label}': {e}");
            }
        }
    }

    match serde_json::to_string_pretty(&Value::Object(output)) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => {
            eprintln!("Error: cannot render output: {e}");
            std::process::exit(1);
        }
    }
}
