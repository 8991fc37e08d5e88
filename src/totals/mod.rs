// src/totals/mod.rs
//! Summary-tab rows → normalized label/value map.

use std::{collections::BTreeMap, fmt, str::FromStr};

use anyhow::bail;
use serde::Serialize;
use tracing::{debug, trace};

use crate::process::{
    tokenize::{is_blank, parse_csv, TokenizerMode},
    utils::{coerce_number, normalize_key, parse_number},
};

/// Normalized label → value. First value seen for a label is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TotalsMap {
    values: BTreeMap<String, f64>,
}

impl TotalsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the (normalized) key is already present.
    /// Returns `true` when the value was stored.
    pub fn insert_first(&mut self, key: &str, value: f64) -> bool {
        let key = normalize_key(key);
        if key.is_empty() || self.values.contains_key(&key) {
            return false;
        }
        let value = if value.is_finite() { value } else { 0.0 };
        self.values.insert(key, value);
        true
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.values.get(&normalize_key(label)).copied()
    }

    /// Value of the first candidate label present in the map.
    /// `None` means none of them exist, which is distinct from a stored zero.
    pub fn lookup<S: AsRef<str>>(&self, candidates: &[S]) -> Option<f64> {
        candidates.iter().find_map(|c| self.get(c.as_ref()))
    }

    /// Renderer shorthand: a missing label reads as zero.
    pub fn get_or_zero(&self, label: &str) -> f64 {
        self.get(label).unwrap_or(0.0)
    }

    /// Look up a combined total, falling back to the sum of whichever
    /// component labels are present. `None` if nothing matched at all.
    pub fn lookup_or_sum<S: AsRef<str>, T: AsRef<str>>(
        &self,
        candidates: &[S],
        components: &[T],
    ) -> Option<f64> {
        if let Some(v) = self.lookup(candidates) {
            return Some(v);
        }
        let present: Vec<f64> = components
            .iter()
            .filter_map(|c| self.get(c.as_ref()))
            .collect();
        if present.is_empty() {
            None
        } else {
            Some(present.iter().sum())
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// How a row's label(s) are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TotalsStrategy {
    /// Explicit key column, falling back to the colon-truncated label column.
    #[default]
    KeyColumn,
    /// Every non-numeric cell in the row is an alias for the row's value.
    Aliases,
}

impl FromStr for TotalsStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "key-column" | "key_column" | "key" => Ok(Self::KeyColumn),
            "aliases" | "alias" => Ok(Self::Aliases),
            other => bail!(
                "unknown totals strategy {:?} (expected key-column|aliases)",
                other
            ),
        }
    }
}

impl fmt::Display for TotalsStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyColumn => f.write_str("key-column"),
            Self::Aliases => f.write_str("aliases"),
        }
    }
}

/// Column roles for the summary tab. Defaults follow the published sheet:
/// A = label (`"Total Behaviour: 42"` or `"Total Behaviour"`), B = value,
/// C = optional explicit key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalsResolver {
    pub strategy: TotalsStrategy,
    pub label_column: usize,
    pub value_column: usize,
    pub key_column: usize,
}

impl Default for TotalsResolver {
    fn default() -> Self {
        Self {
            strategy: TotalsStrategy::default(),
            label_column: 0,
            value_column: 1,
            key_column: 2,
        }
    }
}

impl TotalsResolver {
    pub fn with_strategy(strategy: TotalsStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Tokenize and resolve in one go.
    pub fn resolve_csv(&self, text: &str, mode: TokenizerMode) -> TotalsMap {
        self.resolve(&parse_csv(text, mode))
    }

    #[tracing::instrument(level = "debug", skip(self, rows), fields(rows = rows.len(), strategy = %self.strategy))]
    pub fn resolve(&self, rows: &[Vec<String>]) -> TotalsMap {
        let mut map = TotalsMap::new();
        let mut skipped = 0usize;

        for (idx, row) in rows.iter().enumerate() {
            if is_blank(row) {
                continue;
            }
            let value = self.row_value(row);
            let keys = self.row_keys(row);
            if keys.is_empty() {
                skipped += 1;
                continue;
            }
            for key in keys {
                if !map.insert_first(&key, value) {
                    trace!(row = idx, key = %key, "duplicate label, keeping first value");
                }
            }
        }

        debug!(labels = map.len(), skipped, "resolved totals");
        map
    }

    fn row_keys(&self, row: &[String]) -> Vec<String> {
        match self.strategy {
            TotalsStrategy::KeyColumn => {
                let explicit = row
                    .get(self.key_column)
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("key"));
                let key = match explicit {
                    Some(k) => normalize_key(k),
                    None => normalize_key(row.get(self.label_column).map_or("", String::as_str)),
                };
                if key.is_empty() {
                    Vec::new()
                } else {
                    vec![key]
                }
            }
            TotalsStrategy::Aliases => {
                let mut keys: Vec<String> = Vec::new();
                for cell in row {
                    if parse_number(cell).is_some() {
                        continue;
                    }
                    let key = normalize_key(cell);
                    if !key.is_empty() && !keys.contains(&key) {
                        keys.push(key);
                    }
                }
                keys
            }
        }
    }

    /// Value column if it is non-zero, else the first non-zero (or literal
    /// `"0"`) cell scanning left to right, else the number after the colon of
    /// a `"Label: 42"` cell, else zero.
    fn row_value(&self, row: &[String]) -> f64 {
        let preferred = row
            .get(self.value_column)
            .map_or(0.0, |c| coerce_number(c));
        if preferred != 0.0 {
            return preferred;
        }
        row.iter()
            .find_map(|cell| {
                let n = coerce_number(cell);
                if n != 0.0 {
                    Some(n)
                } else if cell.trim() == "0" {
                    Some(0.0)
                } else {
                    None
                }
            })
            .or_else(|| {
                row.get(self.label_column)
                    .and_then(|label| label.split_once(':'))
                    .and_then(|(_, rest)| parse_number(rest))
            })
            .unwrap_or(0.0)
    }
}
