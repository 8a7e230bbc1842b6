//! Snapshot ordering policies.

use super::entry::{CacheEntry, CurveKind};
use super::SnapshotItem;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

/// Display order of active spectra
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortMode {
    /// Insertion order
    #[default]
    Additive,
    AdditiveReversed,
    Alphabetical,
    AlphabeticalReversed,
    /// Excitation peak wavelength, ties by name
    Excitation,
    ExcitationReversed,
    /// Emission peak wavelength, ties by name
    Emission,
    EmissionReversed,
}

impl SortMode {
    pub const ALL: [SortMode; 8] = [
        SortMode::Additive,
        SortMode::AdditiveReversed,
        SortMode::Alphabetical,
        SortMode::AlphabeticalReversed,
        SortMode::Excitation,
        SortMode::ExcitationReversed,
        SortMode::Emission,
        SortMode::EmissionReversed,
    ];

    pub fn is_reversed(self) -> bool {
        matches!(
            self,
            SortMode::AdditiveReversed
                | SortMode::AlphabeticalReversed
                | SortMode::ExcitationReversed
                | SortMode::EmissionReversed
        )
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Additive => write!(f, "Additive"),
            SortMode::AdditiveReversed => write!(f, "Additive (reversed)"),
            SortMode::Alphabetical => write!(f, "Alphabetical"),
            SortMode::AlphabeticalReversed => write!(f, "Alphabetical (reversed)"),
            SortMode::Excitation => write!(f, "Excitation max"),
            SortMode::ExcitationReversed => write!(f, "Excitation max (reversed)"),
            SortMode::Emission => write!(f, "Emission max"),
            SortMode::EmissionReversed => write!(f, "Emission max (reversed)"),
        }
    }
}

/// Active item paired with its resolved entry
pub(crate) struct Row<'a> {
    pub item: SnapshotItem,
    pub entry: &'a CacheEntry,
}

/// Order `rows` (given in identifier order) according to `mode`.
pub(crate) fn sort_rows(rows: &mut [Row<'_>], mode: SortMode) {
    profiling::scope!("sort_rows");

    match mode {
        SortMode::Additive => rows.sort_by_key(|r| r.entry.index()),
        SortMode::AdditiveReversed => rows.sort_by_key(|r| Reverse(r.entry.index())),
        SortMode::Alphabetical => rows.sort_by(|a, b| a.item.name.cmp(&b.item.name)),
        SortMode::AlphabeticalReversed => rows.sort_by(|a, b| b.item.name.cmp(&a.item.name)),
        SortMode::Excitation => by_peak(rows, CurveKind::Excitation, false),
        SortMode::ExcitationReversed => by_peak(rows, CurveKind::Excitation, true),
        SortMode::Emission => by_peak(rows, CurveKind::Emission, false),
        SortMode::EmissionReversed => by_peak(rows, CurveKind::Emission, true),
    }
}

/// Stable peak sort on top of an alphabetical pre-sort, so equal peaks always
/// come out name-ordered regardless of direction.
fn by_peak(rows: &mut [Row<'_>], kind: CurveKind, reversed: bool) {
    rows.sort_by(|a, b| a.item.name.cmp(&b.item.name));
    if reversed {
        rows.sort_by(|a, b| b.entry.peak(kind).total_cmp(&a.entry.peak(kind)));
    } else {
        rows.sort_by(|a, b| a.entry.peak(kind).total_cmp(&b.entry.peak(kind)));
    }
}
