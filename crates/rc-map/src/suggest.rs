//! Header-based selection suggestions.
//!
//! Uses Jaro-Winkler similarity between normalized header names and the
//! usual names of each field. Each column is suggested for at most one
//! field; fields are filled in priority order.

use rapidfuzz::distance::jaro_winkler;
use rc_model::{CoordinateColumns, SrefDescriptor, SrefKind, TaxonKind};
use tracing::debug;

use crate::selection::{FieldSelections, Selection, Sentinel};

/// Minimum similarity for a header to be suggested.
pub const MIN_SIMILARITY: f64 = 0.9;

const ID_NAMES: &[&str] = &["id", "record id", "record key", "occurrence id", "key"];
const DATE_NAMES: &[&str] = &["date", "record date", "observation date", "event date"];
const TVK_NAMES: &[&str] = &["tvk", "taxon version key", "preferred tvk"];
const TAXON_NAMES: &[&str] = &["taxon", "taxon name", "species", "scientific name", "name"];
const VC_NAMES: &[&str] = &["vc", "vice county", "vice county number"];
const STAGE_NAMES: &[&str] = &["stage", "life stage"];
const GRID_NAMES: &[&str] = &["grid ref", "grid reference", "gridref", "sref", "osgr"];
const EASTING_NAMES: &[&str] = &["easting", "x"];
const NORTHING_NAMES: &[&str] = &["northing", "y"];
const LONGITUDE_NAMES: &[&str] = &["longitude", "lon", "long", "decimal longitude"];
const LATITUDE_NAMES: &[&str] = &["latitude", "lat", "decimal latitude"];
const PRECISION_NAMES: &[&str] = &["precision", "accuracy", "coordinate uncertainty in meters"];

fn normalize(header: &str) -> String {
    let mut normalized = String::with_capacity(header.len());
    let mut previous_lower = false;
    for ch in header.trim().chars() {
        if ch == '_' || ch == '-' || ch == '.' || ch.is_whitespace() {
            normalized.push(' ');
            previous_lower = false;
            continue;
        }
        if ch.is_uppercase() && previous_lower {
            normalized.push(' ');
        }
        previous_lower = ch.is_lowercase();
        normalized.extend(ch.to_lowercase());
    }
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct Matcher {
    headers: Vec<String>,
    taken: Vec<bool>,
}

impl Matcher {
    fn new(headers: &[String]) -> Self {
        Self {
            headers: headers.iter().map(|header| normalize(header)).collect(),
            taken: vec![false; headers.len()],
        }
    }

    fn best(&self, names: &[&str]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (index, header) in self.headers.iter().enumerate() {
            if self.taken[index] || header.is_empty() {
                continue;
            }
            for name in names {
                let score = jaro_winkler::similarity(header.chars(), name.chars());
                if score >= MIN_SIMILARITY && best.is_none_or(|(_, top)| score > top) {
                    best = Some((index, score));
                }
            }
        }
        best
    }

    fn take(&mut self, names: &[&str]) -> Option<Selection> {
        let (index, score) = self.best(names)?;
        self.taken[index] = true;
        debug!(column = index, score, field = names[0], "suggested column");
        Some(Selection::Index(index))
    }

    fn peek(&self, names: &[&str]) -> bool {
        self.best(names).is_some()
    }
}

/// Suggest selections for a file with `headers`.
///
/// The spatial reference kind follows the columns found: a grid reference
/// column wins, then an easting/northing pair, then a longitude/latitude
/// pair. The id falls back to auto numbering and the precision to the
/// manual default.
pub fn suggest_selections(headers: &[String]) -> FieldSelections {
    let mut matcher = Matcher::new(headers);

    let date = matcher.take(DATE_NAMES);
    let (taxon_kind, taxon) = match matcher.take(TVK_NAMES) {
        Some(selection) => (TaxonKind::Tvk, Some(selection)),
        None => (TaxonKind::Name, matcher.take(TAXON_NAMES)),
    };
    let vc = matcher.take(VC_NAMES);
    let stage = matcher.take(STAGE_NAMES);

    let mut selections = if matcher.peek(GRID_NAMES) {
        let mut selections = FieldSelections::new(taxon_kind, SrefDescriptor::grid(0));
        selections.coord1 = matcher.take(GRID_NAMES);
        selections
    } else if matcher.peek(EASTING_NAMES) && matcher.peek(NORTHING_NAMES) {
        two_columns(&mut matcher, taxon_kind, SrefKind::EastingNorthing, 27700, EASTING_NAMES, NORTHING_NAMES)
    } else if matcher.peek(LONGITUDE_NAMES) && matcher.peek(LATITUDE_NAMES) {
        two_columns(&mut matcher, taxon_kind, SrefKind::LonLat, 4326, LONGITUDE_NAMES, LATITUDE_NAMES)
    } else {
        FieldSelections::new(taxon_kind, SrefDescriptor::grid(0))
    };

    selections.id = Some(
        matcher
            .take(ID_NAMES)
            .unwrap_or(Selection::Sentinel(Sentinel::Auto)),
    );
    selections.date = date;
    selections.taxon = taxon;
    selections.vc = vc;
    selections.stage = stage;
    selections
}

fn two_columns(
    matcher: &mut Matcher,
    taxon_kind: TaxonKind,
    kind: SrefKind,
    srid: u32,
    first: &[&str],
    second: &[&str],
) -> FieldSelections {
    let sref = SrefDescriptor {
        kind,
        srid,
        nr_coords: CoordinateColumns::Two,
    };
    let mut selections = FieldSelections::new(taxon_kind, sref);
    selections.coord1 = matcher.take(first);
    selections.coord2 = matcher.take(second);
    selections.precision = Some(
        matcher
            .take(PRECISION_NAMES)
            .unwrap_or(Selection::Sentinel(Sentinel::Manual)),
    );
    selections
}
