use std::{fmt, str::FromStr};

use anyhow::bail;
use tracing::trace;

use crate::process::utils::clean_str;

/// One tokenized line: quote-stripped, trimmed cells.
pub type RawRow = Vec<String>;

/// How a line is split into cells.
///
/// Neither variant supports quoted cells spanning several lines or escaped
/// quotes (`""`) inside a quoted cell. Sources that need those should go
/// through a full CSV reader instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenizerMode {
    /// Split on every comma, then strip a quote pair wrapping the whole cell.
    /// `a,"b,c",d` splits into four cells.
    Naive,
    /// Split only on commas outside double quotes. Every `"` only toggles
    /// quoting and is never kept, so a stray mid-cell quote (`a"b` → `ab`)
    /// is dropped where `Naive` keeps it. The two modes agree whenever quotes
    /// only wrap whole cells.
    #[default]
    QuoteAware,
}

impl FromStr for TokenizerMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "naive" => Ok(Self::Naive),
            "quote-aware" | "quote_aware" | "quoted" => Ok(Self::QuoteAware),
            other => bail!("unknown tokenizer mode {:?} (expected naive|quote-aware)", other),
        }
    }
}

impl fmt::Display for TokenizerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Naive => f.write_str("naive"),
            Self::QuoteAware => f.write_str("quote-aware"),
        }
    }
}

/// Split a single line (without its line terminator) into cells.
pub fn split_line(line: &str, mode: TokenizerMode) -> RawRow {
    match mode {
        TokenizerMode::Naive => line.split(',').map(clean_str).collect(),
        TokenizerMode::QuoteAware => split_quote_aware(line),
    }
}

fn split_quote_aware(line: &str) -> RawRow {
    let mut cells = Vec::new();
    let mut current = String::with_capacity(line.len());
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                cells.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

/// Tokenize a whole CSV body into rows, one per line.
///
/// Surrounding whitespace of the body is dropped first, so a trailing newline
/// does not yield a phantom row. Interior blank lines are kept as `[""]` and
/// left for the consumers to skip.
pub fn parse_csv(text: &str, mode: TokenizerMode) -> Vec<RawRow> {
    let body = text.trim();
    if body.is_empty() {
        return Vec::new();
    }
    let rows: Vec<RawRow> = body
        .split('\n')
        .map(|line| split_line(line.strip_suffix('\r').unwrap_or(line), mode))
        .collect();
    trace!(rows = rows.len(), %mode, "tokenized csv");
    rows
}

/// True when every cell of the row is empty.
pub fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.is_empty())
}
