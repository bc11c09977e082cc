//! Ranked CSV export with per-row selection flags.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use camera_map_placement_models::RankedSet;

const HEADER: &[&str] = &[
    "id",
    "street_id_a",
    "street_a",
    "street_id_b",
    "street_b",
    "lat",
    "lon",
    "street_a_score",
    "street_b_score",
    "score",
    "score_share",
    "cumulative_share",
    "camera",
    "selected",
];

/// Writes the full ranked set, flagging the rows whose intersection ids
/// are in `selected_ids`.
pub fn write_ranked_csv(
    path: &Path,
    ranked: &RankedSet,
    selected_ids: &[u32],
) -> Result<(), Box<dyn std::error::Error>> {
    let file =
        File::create(path).map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
    write_ranked(file, ranked, selected_ids)?;
    log::info!(
        "Exported {} ranked intersections to {}",
        ranked.len(),
        path.display()
    );
    Ok(())
}

fn write_ranked(
    writer: impl Write,
    ranked: &RankedSet,
    selected_ids: &[u32],
) -> Result<(), Box<dyn std::error::Error>> {
    let selected: BTreeSet<u32> = selected_ids.iter().copied().collect();
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(writer);

    csv_writer.write_record(HEADER)?;

    for (entry, cumulative) in ranked.entries.iter().zip(&ranked.cumulative_share) {
        let score_share = if ranked.total_score > 0.0 {
            entry.score / ranked.total_score
        } else {
            0.0
        };
        let intersection = &entry.intersection;

        csv_writer.write_record([
            intersection.id.to_string(),
            intersection.street_a.to_string(),
            intersection.name_a.clone(),
            intersection.street_b.to_string(),
            intersection.name_b.clone(),
            intersection.lat.to_string(),
            intersection.lon.to_string(),
            format!("{:.6}", entry.street_a_score),
            format!("{:.6}", entry.street_b_score),
            format!("{:.6}", entry.score),
            format!("{score_share:.6}"),
            format!("{cumulative:.6}"),
            entry.camera.to_string(),
            u8::from(selected.contains(&intersection.id)).to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
