// src/compliance/mod.rs

use serde::Serialize;
use tracing::debug;

use crate::process::{
    tokenize::{parse_csv, RawRow, TokenizerMode},
    utils::parse_days,
};

/// Days-remaining threshold at or below which an item needs attention.
pub const WARNING_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComplianceStatus {
    Expired,
    Warning,
    #[serde(rename = "OK")]
    Ok,
}

impl ComplianceStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Expired => "Expired",
            Self::Warning => "Warning",
            Self::Ok => "OK",
        }
    }

    /// Pill class used by the dashboard table.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Expired => "bad",
            Self::Warning => "warn",
            Self::Ok => "ok",
        }
    }
}

/// `< 0` expired, `0..=30` warning, otherwise OK.
pub fn classify(days: i64) -> ComplianceStatus {
    match days {
        d if d < 0 => ComplianceStatus::Expired,
        0..=WARNING_DAYS => ComplianceStatus::Warning,
        _ => ComplianceStatus::Ok,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiryEntry {
    pub item: String,
    pub days: i64,
}

impl ExpiryEntry {
    pub fn status(&self) -> ComplianceStatus {
        classify(self.days)
    }
}

/// `Item | Expiry (Days Left)` rows, header skipped, soonest first.
/// Rows without an item name are dropped; equal days keep sheet order.
pub fn parse_expiries(rows: &[RawRow]) -> Vec<ExpiryEntry> {
    let mut out: Vec<ExpiryEntry> = rows
        .iter()
        .skip(1)
        .filter_map(|r| {
            let item = r.first().map(|s| s.trim()).unwrap_or_default();
            if item.is_empty() {
                return None;
            }
            let days = r.get(1).map_or(0, |d| parse_days(d));
            Some(ExpiryEntry {
                item: item.to_string(),
                days,
            })
        })
        .collect();
    // stable: ties keep row order
    out.sort_by_key(|e| e.days);
    debug!(entries = out.len(), "parsed compliance expiries");
    out
}

pub fn expiries_from_csv(text: &str, mode: TokenizerMode) -> Vec<ExpiryEntry> {
    parse_expiries(&parse_csv(text, mode))
}
