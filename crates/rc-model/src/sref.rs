//! Spatial reference descriptors and the coordinate systems the service knows.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of spatial reference held in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SrefKind {
    /// Grid reference such as `SM123456`.
    Grid,
    /// Easting and northing in metres.
    EastingNorthing,
    /// Longitude and latitude in decimal degrees.
    LonLat,
}

impl SrefKind {
    pub fn label(&self) -> &'static str {
        match self {
            SrefKind::Grid => "Grid Reference",
            SrefKind::EastingNorthing => "Easting and Northing",
            SrefKind::LonLat => "Lat/Lon",
        }
    }

    /// Coordinate systems valid for this kind, as `(srid, label)`.
    pub fn systems(&self) -> &'static [(u32, &'static str)] {
        match self {
            SrefKind::Grid => GRID_SYSTEMS,
            SrefKind::EastingNorthing => EN_SYSTEMS,
            SrefKind::LonLat => LATLON_SYSTEMS,
        }
    }

    pub fn system_label(&self, srid: u32) -> Option<&'static str> {
        self.systems()
            .iter()
            .find(|(id, _)| *id == srid)
            .map(|(_, label)| *label)
    }
}

impl fmt::Display for SrefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const GRID_SYSTEMS: &[(u32, &str)] = &[
    (0, "British, Irish, or Channel Islands"),
    (27700, "British"),
    (29903, "Irish"),
    (23030, "Channel Islands"),
];

pub const EN_SYSTEMS: &[(u32, &str)] = &[(27700, "British"), (29903, "Irish")];

pub const LATLON_SYSTEMS: &[(u32, &str)] = &[(4326, "WGS84")];

/// Manual precision offered when none has been chosen.
pub const DEFAULT_PRECISION: &str = "1000";

/// How many input columns hold the coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateColumns {
    /// Both coordinates in one cell, separated by a comma or a space.
    One,
    Two,
}

impl CoordinateColumns {
    pub fn count(&self) -> usize {
        match self {
            CoordinateColumns::One => 1,
            CoordinateColumns::Two => 2,
        }
    }
}

/// Configured spatial reference of a session.
///
/// The precision source lives on the field mapping next to the other
/// column selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrefDescriptor {
    pub kind: SrefKind,
    pub srid: u32,
    pub nr_coords: CoordinateColumns,
}

impl SrefDescriptor {
    pub fn grid(srid: u32) -> Self {
        Self {
            kind: SrefKind::Grid,
            srid,
            nr_coords: CoordinateColumns::One,
        }
    }

    pub fn is_known_system(&self) -> bool {
        self.kind.system_label(self.srid).is_some()
    }
}
