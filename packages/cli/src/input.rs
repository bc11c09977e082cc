//! Semicolon-delimited CSV input tables.
//!
//! Column validation happens here, at the ingestion boundary, so the
//! core computation only ever sees well-formed records. Negative axis
//! measures are clamped to zero with a warning; rows with missing
//! coordinates keep the `(0, 0)` "missing" marker and are handled by
//! the registry's averaging rules.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use camera_map_placement_models::{
    AxisScores, EquipmentPoint, IntersectionRaw, StreetAttributes,
};
use camera_map_registry::StreetDirectory;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct StreetRow {
    street_id: u32,
    name: String,
    safety: Option<f64>,
    transit: Option<f64>,
    commercial: Option<f64>,
    mobility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct IntersectionRow {
    street_id_a: u32,
    street_id_b: u32,
    name_a: Option<String>,
    name_b: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EquipmentRow {
    kind: Option<String>,
    street: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    weight: Option<f64>,
}

/// Loads the street attribute table into a directory.
pub fn load_streets(path: &Path) -> Result<StreetDirectory, Box<dyn std::error::Error>> {
    let file =
        File::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    let directory = parse_streets(file)?;
    log::info!("Loaded {} streets from {}", directory.len(), path.display());
    Ok(directory)
}

fn parse_streets(reader: impl Read) -> Result<StreetDirectory, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_reader(reader);

    let mut streets = Vec::new();
    for row in csv_reader.deserialize() {
        let row: StreetRow = row?;
        streets.push(StreetAttributes {
            id: row.street_id,
            name: row.name,
            scores: AxisScores {
                safety: measure(row.safety, row.street_id, "safety"),
                transit: measure(row.transit, row.street_id, "transit"),
                commercial: measure(row.commercial, row.street_id, "commercial"),
                mobility: measure(row.mobility, row.street_id, "mobility"),
            },
        });
    }
    Ok(StreetDirectory::from_streets(streets))
}

/// Missing measures default to zero; negative ones are clamped.
fn measure(value: Option<f64>, street_id: u32, axis: &str) -> f64 {
    let value = value.unwrap_or(0.0);
    if value < 0.0 {
        log::warn!("Street {street_id}: negative {axis} measure {value} clamped to 0");
        0.0
    } else {
        value
    }
}

/// Loads the raw intersection table.
pub fn load_intersections(path: &Path) -> Result<Vec<IntersectionRaw>, Box<dyn std::error::Error>> {
    let file =
        File::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    let records = parse_intersections(file)?;
    log::info!(
        "Loaded {} intersection rows from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

fn parse_intersections(reader: impl Read) -> Result<Vec<IntersectionRaw>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize() {
        let row: IntersectionRow = row?;
        records.push(IntersectionRaw {
            street_a: row.street_id_a,
            street_b: row.street_id_b,
            name_a: row.name_a.unwrap_or_default(),
            name_b: row.name_b.unwrap_or_default(),
            lat: row.lat.unwrap_or(0.0),
            lon: row.lon.unwrap_or(0.0),
        });
    }
    Ok(records)
}

/// Loads the equipment overlay table, keeping only rows with usable
/// coordinates and a weight at or above the display threshold.
pub fn load_equipment(
    path: &Path,
    min_weight: f64,
) -> Result<Vec<EquipmentPoint>, Box<dyn std::error::Error>> {
    let file =
        File::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    let points = parse_equipment(file, min_weight)?;
    log::info!(
        "Loaded {} equipment points (weight >= {min_weight}) from {}",
        points.len(),
        path.display()
    );
    Ok(points)
}

fn parse_equipment(reader: impl Read, min_weight: f64) -> Result<Vec<EquipmentPoint>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_reader(reader);

    let mut points = Vec::new();
    for row in csv_reader.deserialize() {
        let row: EquipmentRow = row?;
        let (Some(lat), Some(lon)) = (row.lat, row.lon) else {
            continue;
        };
        let point = EquipmentPoint {
            kind: row.kind.unwrap_or_default(),
            street: row.street.unwrap_or_default(),
            lat,
            lon,
            weight: row.weight.unwrap_or(0.0),
        };
        if point.meets_threshold(min_weight) {
            points.push(point);
        }
    }
    Ok(points)
}
