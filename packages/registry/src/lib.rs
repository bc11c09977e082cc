#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Street directory and intersection entity registry.
//!
//! Raw source rows list the same physical intersection multiple times,
//! once per direction and sometimes with slightly different coordinates.
//! The registry canonicalizes each `(street, street)` pair by numeric
//! ordering, assigns stable sequential ids in first-seen order, and
//! running-averages the coordinates of duplicate rows.

use std::collections::BTreeMap;

use camera_map_placement_models::{Intersection, IntersectionRaw, StreetAttributes};
use thiserror::Error;

/// Errors raised while registering intersection records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A record referenced a street id that is not in the directory.
    /// The record is rejected; the rest of the batch proceeds.
    #[error("Unknown street id {street_id}")]
    UnknownStreet {
        /// The unresolvable street id.
        street_id: u32,
    },
}

/// Lookup table of street attributes keyed by street id.
#[derive(Debug, Clone, Default)]
pub struct StreetDirectory {
    streets: BTreeMap<u32, StreetAttributes>,
}

impl StreetDirectory {
    /// Builds a directory from street records. A duplicate id replaces
    /// the earlier record, matching last-row-wins source semantics.
    #[must_use]
    pub fn from_streets(streets: impl IntoIterator<Item = StreetAttributes>) -> Self {
        let mut directory = Self::default();
        for street in streets {
            if directory.insert(street).is_some() {
                log::warn!("Duplicate street id in directory; keeping the later record");
            }
        }
        directory
    }

    /// Inserts a street, returning the previous record for that id.
    pub fn insert(&mut self, street: StreetAttributes) -> Option<StreetAttributes> {
        self.streets.insert(street.id, street)
    }

    /// Looks up a street by id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&StreetAttributes> {
        self.streets.get(&id)
    }

    /// Whether a street id is present.
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.streets.contains_key(&id)
    }

    /// Number of streets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.streets.len()
    }

    /// Whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streets.is_empty()
    }
}

/// Summary of a batch registration pass.
///
/// Per-record failures are collected here rather than aborting the batch,
/// so one malformed row never discards the rest of the input.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Rows that created a new intersection entity.
    pub created: usize,
    /// Rows that merged into an existing entity.
    pub merged: usize,
    /// Rejected rows with the error for each.
    pub errors: Vec<RegistryError>,
}

/// Deduplicating registry of intersection entities.
///
/// Owns the street directory used to resolve record references. Ids grow
/// monotonically within one registry instance; nothing is shared between
/// instances, so concurrent computations each build their own.
#[derive(Debug, Clone)]
pub struct IntersectionRegistry {
    directory: StreetDirectory,
    by_pair: BTreeMap<(u32, u32), usize>,
    entries: Vec<Intersection>,
    next_id: u32,
}

impl IntersectionRegistry {
    /// Creates an empty registry over the given street directory.
    #[must_use]
    pub const fn new(directory: StreetDirectory) -> Self {
        Self {
            directory,
            by_pair: BTreeMap::new(),
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Registers one raw record, returning the id of the canonical
    /// intersection it maps to.
    ///
    /// The pair is canonicalized by numeric street order. The first
    /// occurrence creates the entity and fixes its names and coordinates;
    /// a repeat occurrence with a usable coordinate pair replaces the
    /// stored location with the mean of the stored and incoming values.
    /// That running average weights the newest row 50/50 against the
    /// accumulated value rather than producing a true centroid; downstream
    /// geometry depends on this exact behavior.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownStreet`] when either street id is
    /// not in the directory.
    pub fn register(
        &mut self,
        street_a: u32,
        street_b: u32,
        name_a: &str,
        name_b: &str,
        lat: f64,
        lon: f64,
    ) -> Result<u32, RegistryError> {
        for street_id in [street_a, street_b] {
            if !self.directory.contains(street_id) {
                return Err(RegistryError::UnknownStreet { street_id });
            }
        }

        let (lo, hi, name_lo, name_hi) = if street_a <= street_b {
            (street_a, street_b, name_a, name_b)
        } else {
            (street_b, street_a, name_b, name_a)
        };

        if let Some(&slot) = self.by_pair.get(&(lo, hi)) {
            let entry = &mut self.entries[slot];
            if lat != 0.0 && lon != 0.0 {
                entry.lat = (entry.lat + lat) / 2.0;
                entry.lon = (entry.lon + lon) / 2.0;
            }
            return Ok(entry.id);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.by_pair.insert((lo, hi), self.entries.len());
        self.entries.push(Intersection {
            id,
            street_a: lo,
            name_a: name_lo.to_string(),
            street_b: hi,
            name_b: name_hi.to_string(),
            lat,
            lon,
        });
        Ok(id)
    }

    /// Registers a batch of raw records, collecting per-record errors.
    pub fn register_all(
        &mut self,
        records: impl IntoIterator<Item = IntersectionRaw>,
    ) -> IngestReport {
        let mut report = IngestReport::default();

        for record in records {
            let known = self.entries.len();
            match self.register(
                record.street_a,
                record.street_b,
                &record.name_a,
                &record.name_b,
                record.lat,
                record.lon,
            ) {
                Ok(_) if self.entries.len() > known => report.created += 1,
                Ok(_) => report.merged += 1,
                Err(error) => report.errors.push(error),
            }
        }

        log::info!(
            "Registered {} unique intersections from {} rows ({} merged, {} rejected)",
            self.entries.len(),
            report.created + report.merged + report.errors.len(),
            report.merged,
            report.errors.len()
        );
        report
    }

    /// The canonical intersections in first-seen order.
    #[must_use]
    pub fn intersections(&self) -> &[Intersection] {
        &self.entries
    }

    /// The street directory backing this registry.
    #[must_use]
    pub const fn directory(&self) -> &StreetDirectory {
        &self.directory
    }

    /// Consumes the registry, yielding the entities and the directory.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Intersection>, StreetDirectory) {
        (self.entries, self.directory)
    }
}
