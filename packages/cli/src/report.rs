//! JSON plan report assembly and output.

use std::path::Path;

use camera_map_placement_models::{
    AllocationResult, AxisCoverage, CameraKind, EquipmentPoint, LimitingFactor, PlanParams,
    RankedSet, pricing::CostEstimate,
};
use serde::Serialize;

/// Counts from the ingestion pass, surfaced for diagnostics.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    /// Streets in the directory.
    pub streets: usize,
    /// Raw intersection rows read.
    pub rows: usize,
    /// Rows rejected for unresolvable street references.
    pub rejected: usize,
}

/// One selected site in the report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSummary {
    /// Intersection id.
    pub id: u32,
    /// Human-readable street pair.
    pub streets: String,
    /// Suggested camera kind.
    pub camera: CameraKind,
    /// Combined priority score.
    pub score: f64,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

/// The full plan report written as JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    /// Ingestion counts.
    pub ingest: IngestSummary,
    /// Intersections that entered the ranking.
    pub intersections: usize,
    /// Dataset-wide priority mass.
    pub total_score: f64,
    /// Parameters the allocation ran with.
    pub params: PlanParams,
    /// Selected sites in selection order.
    pub sites: Vec<SiteSummary>,
    /// Intersections covered by the selection.
    pub covered_count: usize,
    /// Realized coverage fraction.
    pub coverage_real: f64,
    /// Whether the coverage target was met.
    pub target_met: bool,
    /// What cut the run short, if anything.
    pub limiting: Option<LimitingFactor>,
    /// Covered share per axis.
    pub axis_coverage: AxisCoverage,
    /// Hardware cost roll-up for the selection.
    pub cost: CostEstimate,
    /// Equipment overlay points passing the display threshold.
    pub equipment_overlay: Vec<EquipmentPoint>,
}

impl PlanReport {
    /// Assembles the report from the pipeline outputs.
    #[must_use]
    pub fn assemble(
        ranked: &RankedSet,
        params: &PlanParams,
        result: &AllocationResult,
        cost: CostEstimate,
        equipment_overlay: Vec<EquipmentPoint>,
        ingest: IngestSummary,
    ) -> Self {
        let sites = result
            .selected
            .iter()
            .map(|site| SiteSummary {
                id: site.intersection.id,
                streets: format!("{} x {}", site.intersection.name_a, site.intersection.name_b),
                camera: site.camera,
                score: site.score,
                lat: site.intersection.lat,
                lon: site.intersection.lon,
            })
            .collect();

        Self {
            ingest,
            intersections: ranked.len(),
            total_score: ranked.total_score,
            params: *params,
            sites,
            covered_count: result.covered_count,
            coverage_real: result.coverage_real,
            target_met: result.target_met,
            limiting: result.limiting,
            axis_coverage: result.axis_coverage,
            cost,
            equipment_overlay,
        }
    }
}

/// Writes the report as pretty JSON to `path`, or to stdout when no
/// path is given.
pub fn write(path: Option<&Path>, report: &PlanReport) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(report)?;
    match path {
        Some(path) => {
            std::fs::write(path, json)
                .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
            log::info!("Wrote plan report to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_map_placement_models::pricing::CameraPricing;

    #[test]
    fn report_serializes_with_camel_case_keys() {
        let ranked = RankedSet::default();
        let params = PlanParams {
            target_coverage: 0.4,
            min_separation_m: 150.0,
            coverage_radius_m: 0.0,
            max_sites: None,
            street_cap: None,
        };
        let result = AllocationResult {
            selected: Vec::new(),
            covered_count: 0,
            coverage_real: 1.0,
            target_met: true,
            limiting: None,
            axis_coverage: AxisCoverage::default(),
        };
        let cost = CostEstimate::for_sites(&[], &CameraPricing::default());

        let report = PlanReport::assemble(
            &ranked,
            &params,
            &result,
            cost,
            Vec::new(),
            IngestSummary {
                streets: 0,
                rows: 0,
                rejected: 0,
            },
        );
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("\"coverageReal\":1.0"));
        assert!(json.contains("\"targetMet\":true"));
        assert!(json.contains("\"axisCoverage\""));
        assert!(json.contains("\"minSeparationM\":150.0"));
    }
}
