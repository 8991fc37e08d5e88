// src/series/mod.rs
//! Month-per-row sheets: header row of metric names, one data row per period.

use anyhow::{anyhow, Result};
use tracing::{debug, warn};

use crate::process::{
    tokenize::{is_blank, parse_csv, RawRow, TokenizerMode},
    utils::coerce_number,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesTable {
    /// Column names, from the first row of the sheet.
    pub headers: Vec<String>,
    /// Data rows in sheet order; row order is period order.
    pub rows: Vec<RawRow>,
    /// Index of the column holding the period label ("Month").
    pub period_column: usize,
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map_or("", String::as_str)
}

impl TimeSeriesTable {
    /// First row is the header; blank rows are dropped, order is kept.
    pub fn from_rows(rows: Vec<RawRow>) -> Self {
        let mut iter = rows.into_iter().filter(|r| !is_blank(r));
        let headers = iter.next().unwrap_or_default();
        let rows: Vec<RawRow> = iter.collect();
        debug!(columns = headers.len(), rows = rows.len(), "built time series table");
        Self {
            headers,
            rows,
            period_column: 0,
        }
    }

    pub fn from_csv(text: &str, mode: TokenizerMode) -> Self {
        Self::from_rows(parse_csv(text, mode))
    }

    /// Use the named column as the period label column.
    pub fn with_period_column(mut self, name: &str) -> Result<Self> {
        self.period_column = self.require_index(name)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact, case-sensitive header match.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require_index(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            anyhow!(
                "column {:?} not found in header [{}]",
                name,
                self.headers.join(", ")
            )
        })
    }

    /// Numeric values of `name`, one per row. Missing column is an error.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.require_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|r| coerce_number(cell(r, idx)))
            .collect())
    }

    /// Like [`column`](Self::column) but a missing column yields zeros.
    pub fn column_or_zero(&self, name: &str) -> Vec<f64> {
        match self.column(name) {
            Ok(values) => values,
            Err(_) => {
                warn!(column = name, "column missing, filling with zeros");
                vec![0.0; self.rows.len()]
            }
        }
    }

    /// Raw string values of `name` (dates, labels).
    pub fn column_strings(&self, name: &str) -> Result<Vec<String>> {
        let idx = self.require_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|r| cell(r, idx).to_string())
            .collect())
    }

    /// Period labels from the designated period column.
    pub fn periods(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| cell(r, self.period_column).to_string())
            .collect()
    }

    /// Inclusive slice of rows from the first row labelled `start` to the
    /// first row labelled `end`. An unset or unknown `start` clamps to the
    /// first row, an unset or unknown `end` to the last. If `end` comes
    /// before `start` the result has no rows.
    pub fn filter_range(&self, start: Option<&str>, end: Option<&str>) -> Self {
        let mut out = Self {
            headers: self.headers.clone(),
            rows: Vec::new(),
            period_column: self.period_column,
        };
        if self.rows.is_empty() {
            return out;
        }

        let periods = self.periods();
        let last = self.rows.len() - 1;
        let find = |label: Option<&str>| label.and_then(|l| periods.iter().position(|p| p == l));
        let from = find(start).unwrap_or(0);
        let to = find(end).unwrap_or(last);

        if to >= from {
            out.rows = self.rows[from..=to].to_vec();
        }
        debug!(?start, ?end, from, to, rows = out.rows.len(), "filtered range");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    fn init_test_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,sheetkpi=debug")),
            )
            .with_test_writer()
            .try_init();
    }

    const SAMPLE: &str = "Month,Widgets\nJan,3\nFeb,5\n";

    fn quarter() -> TimeSeriesTable {
        TimeSeriesTable::from_csv(
            "Month,Incidents,Hours\nJan,1,\"1,200\"\nFeb,0,900\nMar,4,\nApr,2,1000\n",
            TokenizerMode::QuoteAware,
        )
    }

    #[test]
    fn test_end_to_end_sample() -> Result<()> {
        init_test_logging();
        let table = TimeSeriesTable::from_csv(SAMPLE, TokenizerMode::QuoteAware);
        assert_eq!(table.periods(), vec!["Jan", "Feb"]);
        assert_eq!(table.column("Widgets")?, vec![3.0, 5.0]);

        let feb = table.filter_range(Some("Feb"), Some("Feb"));
        assert_eq!(feb.periods(), vec!["Feb"]);
        assert_eq!(feb.column("Widgets")?, vec![5.0]);
        // source table untouched
        assert_eq!(table.len(), 2);
        Ok(())
    }

    #[test]
    fn test_column_lookup_is_case_sensitive() {
        init_test_logging();
        let table = TimeSeriesTable::from_csv(SAMPLE, TokenizerMode::QuoteAware);
        assert!(table.column("widgets").is_err());
        assert_eq!(table.column_or_zero("widgets"), vec![0.0, 0.0]);
    }

    #[test]
    fn test_string_mode_and_short_rows() -> Result<()> {
        init_test_logging();
        let table = quarter();
        assert_eq!(table.column_strings("Hours")?, vec!["1,200", "900", "", "1000"]);
        assert_eq!(table.column("Hours")?, vec![1200.0, 900.0, 0.0, 1000.0]);

        let ragged = TimeSeriesTable::from_csv("Month,A,B\nJan,1\n", TokenizerMode::Naive);
        assert_eq!(ragged.column("B")?, vec![0.0]);
        Ok(())
    }

    #[test]
    fn test_filter_range_clamps() -> Result<()> {
        init_test_logging();
        let table = quarter();
        assert_eq!(table.filter_range(Some("Feb"), Some("Mar")).periods(), vec!["Feb", "Mar"]);
        assert_eq!(table.filter_range(Some("Dec"), Some("Feb")).periods(), vec!["Jan", "Feb"]);
        assert_eq!(table.filter_range(Some("Mar"), Some("Dec")).periods(), vec!["Mar", "Apr"]);
        assert_eq!(table.filter_range(None, None).len(), 4);
        assert!(table.filter_range(Some("Apr"), Some("Jan")).is_empty());
        assert_eq!(
            table.filter_range(Some("Feb"), Some("Apr")).column("Incidents")?,
            vec![0.0, 4.0, 2.0]
        );
        Ok(())
    }

    #[test]
    fn test_unset_bounds_ignore_blank_period_cells() -> Result<()> {
        init_test_logging();
        let table =
            TimeSeriesTable::from_csv("Month,X\nJan,1\n,2\nFeb,3\nMar,4\n", TokenizerMode::QuoteAware);
        let tail = table.filter_range(Some("Feb"), None);
        assert_eq!(tail.periods(), vec!["Feb", "Mar"]);
        assert_eq!(tail.column("X")?, vec![3.0, 4.0]);

        let head = table.filter_range(None, Some("Feb"));
        assert_eq!(head.periods(), vec!["Jan", "", "Feb"]);
        assert_eq!(head.column("X")?, vec![1.0, 2.0, 3.0]);

        assert_eq!(table.filter_range(None, None).len(), 4);
        Ok(())
    }

    #[test]
    fn test_duplicate_period_uses_first_match() {
        init_test_logging();
        let table = TimeSeriesTable::from_csv(
            "Month,X\nJan,1\nFeb,2\nJan,3\n",
            TokenizerMode::QuoteAware,
        );
        assert_eq!(table.filter_range(Some("Jan"), Some("Feb")).len(), 2);
    }

    #[test]
    fn test_empty_table() {
        init_test_logging();
        let table = TimeSeriesTable::from_csv("", TokenizerMode::QuoteAware);
        assert!(table.headers.is_empty());
        assert!(table.filter_range(Some("Jan"), Some("Feb")).is_empty());
        assert!(table.periods().is_empty());
    }

    #[test]
    fn test_period_column_by_name() -> Result<()> {
        init_test_logging();
        let table = TimeSeriesTable::from_csv(
            "Site,Period,Count\nA,Q1,4\nA,Q2,6\n",
            TokenizerMode::QuoteAware,
        )
        .with_period_column("Period")?;
        assert_eq!(table.periods(), vec!["Q1", "Q2"]);
        assert_eq!(table.filter_range(Some("Q2"), Some("Q2")).column("Count")?, vec![6.0]);
        assert!(quarter().with_period_column("Week").is_err());
        Ok(())
    }
}
