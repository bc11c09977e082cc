#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the camera placement toolchain.
//!
//! Loads street attributes and raw intersection rows from semicolon-
//! delimited CSV tables, scores and ranks every intersection, and either
//! exports the full ranking (`rank`) or additionally runs the
//! constrained greedy site allocation and writes a JSON plan report
//! (`plan`).

mod export;
mod input;
mod report;

use std::path::PathBuf;

use camera_map_placement_models::{
    AxisWeights, PlanParams, RankedSet,
    pricing::{CameraPricing, CostEstimate},
};
use camera_map_registry::IntersectionRegistry;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "camera_map_cli", about = "Intersection priority and camera placement tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Input tables and ranking weights shared by every subcommand.
#[derive(Args)]
struct RankingArgs {
    /// Street attributes CSV (street_id;name;safety;transit;commercial;mobility)
    #[arg(long)]
    streets: PathBuf,
    /// Raw intersections CSV (street_id_a;street_id_b;name_a;name_b;lat;lon)
    #[arg(long)]
    intersections: PathBuf,
    /// Weight of the safety axis
    #[arg(long, default_value = "50")]
    weight_safety: f64,
    /// Weight of the transit axis
    #[arg(long, default_value = "20")]
    weight_transit: f64,
    /// Weight of the commercial axis
    #[arg(long, default_value = "15")]
    weight_commercial: f64,
    /// Weight of the mobility axis
    #[arg(long, default_value = "15")]
    weight_mobility: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Score and rank every intersection, exporting the full ranking
    Rank {
        #[command(flatten)]
        ranking: RankingArgs,
        /// Output CSV path for the ranked export
        #[arg(long)]
        out: PathBuf,
    },
    /// Rank, then allocate camera sites under the placement constraints
    Plan {
        #[command(flatten)]
        ranking: RankingArgs,
        /// Fraction of total priority mass to cover (0-1)
        #[arg(long, default_value = "0.4")]
        target_coverage: f64,
        /// Minimum distance in meters between sites sharing a street (0 disables)
        #[arg(long, default_value = "150")]
        min_separation: f64,
        /// Distance in meters within which a site also covers street neighbors
        #[arg(long, default_value = "0")]
        coverage_radius: f64,
        /// Optional ceiling on the number of selected sites
        #[arg(long)]
        max_sites: Option<usize>,
        /// Optional cap on the fraction of a street's mass selections may claim (0-1)
        #[arg(long)]
        street_cap: Option<f64>,
        /// Existing equipment overlay CSV (kind;street;lat;lon;weight)
        #[arg(long)]
        equipment: Option<PathBuf>,
        /// Minimum equipment weight to keep in the overlay
        #[arg(long, default_value = "4")]
        min_equipment_weight: f64,
        /// Unit price of a PTZ camera
        #[arg(long, default_value = "25000")]
        price_ptz: u64,
        /// Unit price of a 360-degree dome camera
        #[arg(long, default_value = "20000")]
        price_dome360: u64,
        /// Unit price of a fixed camera
        #[arg(long, default_value = "8000")]
        price_fixed: u64,
        /// Unit price of a license plate reader
        #[arg(long, default_value = "15000")]
        price_lpr: u64,
        /// Output CSV path for the ranked export with selection flags
        #[arg(long)]
        out: PathBuf,
        /// Output path for the JSON plan report (stdout when omitted)
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Rank { ranking, out } => {
            let (ranked, _) = build_ranking(&ranking)?;
            export::write_ranked_csv(&out, &ranked, &[])?;
            println!("Ranked {} intersections -> {}", ranked.len(), out.display());
        }
        Commands::Plan {
            ranking,
            target_coverage,
            min_separation,
            coverage_radius,
            max_sites,
            street_cap,
            equipment,
            min_equipment_weight,
            price_ptz,
            price_dome360,
            price_fixed,
            price_lpr,
            out,
            report,
        } => {
            let (ranked, ingest) = build_ranking(&ranking)?;

            let params = PlanParams {
                target_coverage,
                min_separation_m: min_separation,
                coverage_radius_m: coverage_radius,
                max_sites,
                street_cap,
            };
            let result = camera_map_placement::allocate(&ranked, &params)?;

            let overlay = match equipment {
                Some(path) => input::load_equipment(&path, min_equipment_weight)?,
                None => Vec::new(),
            };

            let pricing = CameraPricing {
                ptz: price_ptz,
                dome360: price_dome360,
                fixed: price_fixed,
                lpr: price_lpr,
            };
            let cost = CostEstimate::for_sites(&result.selected, &pricing);

            let selected_ids: Vec<u32> = result
                .selected
                .iter()
                .map(|site| site.intersection.id)
                .collect();
            export::write_ranked_csv(&out, &ranked, &selected_ids)?;

            let plan_report =
                report::PlanReport::assemble(&ranked, &params, &result, cost, overlay, ingest);
            report::write(report.as_deref(), &plan_report)?;

            println!(
                "Selected {}/{} intersections, coverage {:.1}% (target {:.1}%, met: {})",
                result.selected.len(),
                ranked.len(),
                result.coverage_real * 100.0,
                target_coverage * 100.0,
                result.target_met
            );
        }
    }

    Ok(())
}

/// Loads the input tables, registers intersections, and ranks them.
fn build_ranking(
    args: &RankingArgs,
) -> Result<(RankedSet, report::IngestSummary), Box<dyn std::error::Error>> {
    let weights = AxisWeights {
        safety: args.weight_safety,
        transit: args.weight_transit,
        commercial: args.weight_commercial,
        mobility: args.weight_mobility,
    };
    if weights.safety < 0.0
        || weights.transit < 0.0
        || weights.commercial < 0.0
        || weights.mobility < 0.0
    {
        return Err("axis weights must be non-negative".into());
    }

    let directory = input::load_streets(&args.streets)?;
    let street_count = directory.len();
    let records = input::load_intersections(&args.intersections)?;
    let row_count = records.len();

    let mut registry = IntersectionRegistry::new(directory);
    let ingest = registry.register_all(records);
    for error in &ingest.errors {
        log::warn!("Rejected intersection row: {error}");
    }

    let summary = report::IngestSummary {
        streets: street_count,
        rows: row_count,
        rejected: ingest.errors.len(),
    };

    let (intersections, directory) = registry.into_parts();
    let scored = camera_map_scoring::score_all(&intersections, &directory, &weights);
    Ok((camera_map_scoring::rank(scored), summary))
}
