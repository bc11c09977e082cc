//! Unit pricing per camera kind and cost roll-ups for a selection.

use serde::{Deserialize, Serialize};

use crate::{CameraKind, ScoredIntersection};

/// Unit price per camera kind, in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraPricing {
    /// Price of a PTZ unit.
    pub ptz: u64,
    /// Price of a 360-degree dome unit.
    pub dome360: u64,
    /// Price of a fixed unit.
    pub fixed: u64,
    /// Price of a license plate reader unit.
    pub lpr: u64,
}

impl Default for CameraPricing {
    fn default() -> Self {
        Self {
            ptz: 25_000,
            dome360: 20_000,
            fixed: 8_000,
            lpr: 15_000,
        }
    }
}

impl CameraPricing {
    /// Unit price for one camera kind.
    #[must_use]
    pub const fn price(&self, kind: CameraKind) -> u64 {
        match kind {
            CameraKind::Ptz => self.ptz,
            CameraKind::Dome360 => self.dome360,
            CameraKind::Fixed => self.fixed,
            CameraKind::Lpr => self.lpr,
        }
    }
}

/// Count and subtotal for one camera kind within a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostLine {
    /// Camera kind.
    pub camera: CameraKind,
    /// Number of selected sites suggesting this kind.
    pub count: usize,
    /// `count` times the unit price.
    pub subtotal: u64,
}

/// Estimated hardware cost for a selection, broken down by camera kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    /// One line per camera kind, in [`CameraKind::ALL`] order.
    pub lines: Vec<CostLine>,
    /// Total number of cameras.
    pub total_count: usize,
    /// Grand total cost.
    pub total: u64,
}

impl CostEstimate {
    /// Prices a selection of sites against the given unit prices.
    #[must_use]
    pub fn for_sites(sites: &[ScoredIntersection], pricing: &CameraPricing) -> Self {
        let mut lines = Vec::with_capacity(CameraKind::ALL.len());
        let mut total = 0;
        let mut total_count = 0;

        for &kind in CameraKind::ALL {
            let count = sites.iter().filter(|s| s.camera == kind).count();
            let subtotal = count as u64 * pricing.price(kind);
            total += subtotal;
            total_count += count;
            lines.push(CostLine {
                camera: kind,
                count,
                subtotal,
            });
        }

        Self {
            lines,
            total_count,
            total,
        }
    }
}
