// src/config.rs

use std::collections::HashMap;

use anyhow::{Context, Result};
use url::Url;

use crate::{fetch::source_url, process::tokenize::TokenizerMode, totals::TotalsStrategy};

/// Published "Company Totals" tab.
pub const DEFAULT_TOTALS_CSV: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vTXQVIPN42E20By0btiM2IFinhYkeNeYuz66b7bA5QEukcD_gLN-g7LGyArw05zaMJssbMxJm68DAkX/pub?gid=1080547954&single=true&output=csv";
/// Compliance expiries tab; blank hides the section.
pub const DEFAULT_EXPIRIES_CSV: &str = "";
/// Monthly series tab; blank disables the series pipeline.
pub const DEFAULT_SERIES_CSV: &str = "";

pub const ENV_TOTALS_CSV: &str = "SHEETKPI_TOTALS_CSV";
pub const ENV_EXPIRIES_CSV: &str = "SHEETKPI_EXPIRIES_CSV";
pub const ENV_SERIES_CSV: &str = "SHEETKPI_SERIES_CSV";
pub const ENV_TOKENIZER: &str = "SHEETKPI_TOKENIZER";
pub const ENV_TOTALS_STRATEGY: &str = "SHEETKPI_TOTALS_STRATEGY";
pub const ENV_SERIES_COLUMNS: &str = "SHEETKPI_SERIES_COLUMNS";
pub const ENV_PERIOD_COLUMN: &str = "SHEETKPI_PERIOD_COLUMN";
pub const ENV_FROM: &str = "SHEETKPI_FROM";
pub const ENV_TO: &str = "SHEETKPI_TO";

/// Source of configuration variables.
pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
pub struct ProcessEnv;

impl Env for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Env for HashMap<&str, &str> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub totals_csv: Option<Url>,
    pub expiries_csv: Option<Url>,
    pub series_csv: Option<Url>,
    pub tokenizer: TokenizerMode,
    pub totals_strategy: TotalsStrategy,
    /// Series to extract; empty means every header except the period column.
    pub series_columns: Vec<String>,
    /// Period label column by name; `None` means the first column.
    pub period_column: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            totals_csv: source_url(DEFAULT_TOTALS_CSV),
            expiries_csv: source_url(DEFAULT_EXPIRIES_CSV),
            series_csv: source_url(DEFAULT_SERIES_CSV),
            tokenizer: TokenizerMode::default(),
            totals_strategy: TotalsStrategy::default(),
            series_columns: Vec::new(),
            period_column: None,
            from: None,
            to: None,
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_source(&ProcessEnv)
    }

    /// Constants, overridden by whichever variables `env` defines.
    /// A set-but-blank URL variable switches that source off.
    pub fn from_source(env: &impl Env) -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(raw) = env.var(ENV_TOTALS_CSV) {
            cfg.totals_csv = source_url(&raw);
        }
        if let Some(raw) = env.var(ENV_EXPIRIES_CSV) {
            cfg.expiries_csv = source_url(&raw);
        }
        if let Some(raw) = env.var(ENV_SERIES_CSV) {
            cfg.series_csv = source_url(&raw);
        }
        if let Some(raw) = non_empty(env.var(ENV_TOKENIZER)) {
            cfg.tokenizer = raw
                .parse::<TokenizerMode>()
                .with_context(|| format!("invalid {}", ENV_TOKENIZER))?;
        }
        if let Some(raw) = non_empty(env.var(ENV_TOTALS_STRATEGY)) {
            cfg.totals_strategy = raw
                .parse::<TotalsStrategy>()
                .with_context(|| format!("invalid {}", ENV_TOTALS_STRATEGY))?;
        }
        if let Some(raw) = non_empty(env.var(ENV_SERIES_COLUMNS)) {
            cfg.series_columns = raw
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect();
        }
        cfg.period_column = non_empty(env.var(ENV_PERIOD_COLUMN));
        cfg.from = non_empty(env.var(ENV_FROM));
        cfg.to = non_empty(env.var(ENV_TO));

        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::from_source(&HashMap::<&str, &str>::new()).unwrap();
        assert!(cfg.totals_csv.is_some());
        assert!(cfg.expiries_csv.is_none());
        assert!(cfg.series_csv.is_none());
        assert_eq!(cfg.tokenizer, TokenizerMode::QuoteAware);
        assert_eq!(cfg.totals_strategy, TotalsStrategy::KeyColumn);
        assert!(cfg.series_columns.is_empty());
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let env = HashMap::from([
            (ENV_TOTALS_CSV, ""),
            (ENV_EXPIRIES_CSV, "https://example.com/exp.csv"),
            (ENV_TOKENIZER, "naive"),
            (ENV_TOTALS_STRATEGY, "aliases"),
            (ENV_SERIES_COLUMNS, " Incidents, Hours ,,"),
            (ENV_PERIOD_COLUMN, "Month"),
            (ENV_FROM, "Feb"),
            (ENV_TO, "  "),
        ]);
        let cfg = Config::from_source(&env)?;
        assert!(cfg.totals_csv.is_none());
        assert_eq!(
            cfg.expiries_csv.as_ref().map(Url::as_str),
            Some("https://example.com/exp.csv")
        );
        assert_eq!(cfg.tokenizer, TokenizerMode::Naive);
        assert_eq!(cfg.totals_strategy, TotalsStrategy::Aliases);
        assert_eq!(cfg.series_columns, vec!["Incidents", "Hours"]);
        assert_eq!(cfg.period_column.as_deref(), Some("Month"));
        assert_eq!(cfg.from.as_deref(), Some("Feb"));
        assert_eq!(cfg.to, None);
        Ok(())
    }

    #[test]
    fn test_bad_enum_value() {
        let env = HashMap::from([(ENV_TOTALS_STRATEGY, "guess")]);
        let err = Config::from_source(&env).unwrap_err();
        assert!(format!("{:#}", err).contains(ENV_TOTALS_STRATEGY));
    }
}
