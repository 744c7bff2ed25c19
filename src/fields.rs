//! Input tables and canonical field resolution.
//!
//! Localization exports name their columns inconsistently (`x [nm]`, `x_nm`,
//! `frame`, `t`, …). Columns are mapped onto canonical [`FieldRole`]s through
//! a pluggable [`FieldResolver`]; the default [`EditDistanceResolver`] picks
//! the column whose normalized name is closest to one of the role's aliases.

use crate::error::InputError;
use crate::types::{Localization, LocalizationSet};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical column roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    Frame,
    X,
    Y,
    Intensity,
    Id,
    Z,
}

impl FieldRole {
    /// Resolution order: required roles first so optional ones cannot steal
    /// their columns.
    pub const ALL: [FieldRole; 6] = [
        FieldRole::Frame,
        FieldRole::X,
        FieldRole::Y,
        FieldRole::Intensity,
        FieldRole::Id,
        FieldRole::Z,
    ];

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            FieldRole::Frame | FieldRole::X | FieldRole::Y | FieldRole::Intensity
        )
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            FieldRole::Frame => &["frame", "frames", "frameindex", "t", "time"],
            FieldRole::X => &["x", "xnm", "xnano", "xpos", "positionx", "xcoord"],
            FieldRole::Y => &["y", "ynm", "ynano", "ypos", "positiony", "ycoord"],
            FieldRole::Intensity => &[
                "intensity",
                "intensityphoton",
                "photons",
                "amplitude",
                "brightness",
                "counts",
            ],
            FieldRole::Id => &["id", "index", "localizationid"],
            FieldRole::Z => &["z", "znm", "znano", "zpos", "positionz"],
        }
    }
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldRole::Frame => "frame",
            FieldRole::X => "x",
            FieldRole::Y => "y",
            FieldRole::Intensity => "intensity",
            FieldRole::Id => "id",
            FieldRole::Z => "z",
        };
        f.write_str(name)
    }
}

/// Maps a canonical role onto one of the still-unassigned columns.
pub trait FieldResolver {
    /// `candidates` holds `(column_index, column_name)` pairs; returns the
    /// chosen column index.
    fn resolve(&self, role: FieldRole, candidates: &[(usize, &str)]) -> Option<usize>;
}

/// Nearest-name resolver based on Levenshtein distance between normalized
/// column names and role aliases.
#[derive(Clone, Debug)]
pub struct EditDistanceResolver {
    /// Maximum edit distance as a fraction of the longer of the two names.
    /// Kept below 1/3 so `xnm` and `ynm` never stand in for each other.
    pub max_relative_distance: f64,
}

impl Default for EditDistanceResolver {
    fn default() -> Self {
        Self {
            max_relative_distance: 0.3,
        }
    }
}

impl FieldResolver for EditDistanceResolver {
    fn resolve(&self, role: FieldRole, candidates: &[(usize, &str)]) -> Option<usize> {
        let mut best: Option<(f64, usize)> = None;
        for &(index, name) in candidates {
            let normalized = normalize_name(name);
            if normalized.is_empty() {
                continue;
            }
            for alias in role.aliases() {
                let dist = levenshtein(&normalized, alias);
                let longest = normalized.chars().count().max(alias.len());
                let score = dist as f64 / longest as f64;
                if score > self.max_relative_distance {
                    continue;
                }
                let better = match best {
                    None => true,
                    Some((s, i)) => score < s || (score == s && index < i),
                };
                if better {
                    best = Some((score, index));
                }
            }
        }
        best.map(|(_, index)| index)
    }
}

/// Lowercases and strips everything but ASCII letters and digits.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Classic two-row dynamic-programming edit distance.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Column indices assigned to each role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMap {
    pub frame: usize,
    pub x: usize,
    pub y: usize,
    pub intensity: usize,
    pub id: Option<usize>,
    pub z: Option<usize>,
    /// Unassigned columns, in input order.
    pub extra: Vec<usize>,
}

impl ColumnMap {
    /// Resolves every role against `columns`; fails on the first required
    /// role that has no match.
    pub fn resolve(columns: &[String], resolver: &dyn FieldResolver) -> Result<Self, InputError> {
        let mut taken = vec![false; columns.len()];
        let mut found: [Option<usize>; 6] = [None; 6];
        for (slot, role) in FieldRole::ALL.iter().enumerate() {
            let candidates: Vec<(usize, &str)> = columns
                .iter()
                .enumerate()
                .filter(|(i, _)| !taken[*i])
                .map(|(i, c)| (i, c.as_str()))
                .collect();
            match resolver.resolve(*role, &candidates) {
                Some(index) if index < columns.len() && !taken[index] => {
                    debug!("field `{role}` resolved to column `{}`", columns[index]);
                    taken[index] = true;
                    found[slot] = Some(index);
                }
                _ if role.is_required() => {
                    return Err(InputError::UnresolvedField {
                        role: *role,
                        columns: columns.to_vec(),
                    });
                }
                _ => {}
            }
        }
        let required = |slot: usize| {
            found[slot].ok_or_else(|| InputError::UnresolvedField {
                role: FieldRole::ALL[slot],
                columns: columns.to_vec(),
            })
        };
        Ok(Self {
            frame: required(0)?,
            x: required(1)?,
            y: required(2)?,
            intensity: required(3)?,
            id: found[4],
            z: found[5],
            extra: (0..columns.len()).filter(|i| !taken[*i]).collect(),
        })
    }
}

/// Raw numeric table with named columns, as exported by localization software.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LocalizationTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl LocalizationTable {
    /// Resolves the columns and converts every row into a [`Localization`].
    pub fn into_localizations(
        self,
        resolver: &dyn FieldResolver,
    ) -> Result<LocalizationSet, InputError> {
        let map = ColumnMap::resolve(&self.columns, resolver)?;
        let width = self.columns.len();
        let mut localizations = Vec::with_capacity(self.rows.len());
        for (row_index, row) in self.rows.iter().enumerate() {
            if row.len() != width {
                return Err(InputError::RowWidth {
                    row: row_index,
                    expected: width,
                    found: row.len(),
                });
            }
            let frame_value = row[map.frame];
            if !(frame_value >= 0.0 && frame_value.fract() == 0.0 && frame_value <= u32::MAX as f64)
            {
                return Err(InputError::InvalidFrame {
                    row: row_index,
                    value: frame_value,
                });
            }
            let id = map
                .id
                .map(|c| row[c] as u64)
                .unwrap_or(row_index as u64);
            let mut loc = Localization::new(
                id,
                frame_value as u32,
                row[map.x],
                row[map.y],
                row[map.intensity],
            );
            loc.z = map.z.map(|c| row[c]);
            loc.extra = map.extra.iter().map(|&c| row[c]).collect();
            localizations.push(loc);
        }
        let extra_columns = map.extra.iter().map(|&c| self.columns[c].clone()).collect();
        Ok(LocalizationSet::new(localizations, extra_columns))
    }
}
