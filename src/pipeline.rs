// src/pipeline.rs

use anyhow::{anyhow, Result};
use reqwest::Client;
use tracing::{info, trace, warn};

use crate::{
    compliance::{expiries_from_csv, ExpiryEntry},
    config::{Config, ENV_SERIES_CSV, ENV_TOTALS_CSV},
    dashboard::{Dashboard, SeriesPayload},
    fetch::{fetch_csv, fetch_optional_csv},
    series::TimeSeriesTable,
    totals::{TotalsMap, TotalsResolver},
};

/// Shown to the user when a primary source cannot be loaded.
pub const LOAD_FAILURE_MESSAGE: &str =
    "Could not load data. Check the CSV publish link(s) and sharing settings.";

pub fn totals_from_text(text: &str, cfg: &Config) -> TotalsMap {
    TotalsResolver::with_strategy(cfg.totals_strategy).resolve_csv(text, cfg.tokenizer)
}

/// Fetch + resolve the summary tab. A fetch failure is fatal.
#[tracing::instrument(level = "info", skip_all)]
pub async fn load_totals(client: &Client, cfg: &Config) -> Result<TotalsMap> {
    let url = cfg
        .totals_csv
        .as_ref()
        .ok_or_else(|| anyhow!("no totals source configured (set {})", ENV_TOTALS_CSV))?;
    let text = fetch_csv(client, url).await?;
    let totals = totals_from_text(&text, cfg);
    if totals.is_empty() {
        warn!("totals sheet produced no labels");
    }
    for (label, value) in totals.iter() {
        trace!(label, value, "total");
    }
    info!(labels = totals.len(), "totals ready");
    Ok(totals)
}

/// Fetch + parse the optional expiries tab. `None` hides the section.
#[tracing::instrument(level = "info", skip_all)]
pub async fn load_expiries(client: &Client, cfg: &Config) -> Option<Vec<ExpiryEntry>> {
    let text = fetch_optional_csv(client, cfg.expiries_csv.as_ref()).await?;
    let entries = expiries_from_csv(&text, cfg.tokenizer);
    info!(entries = entries.len(), "expiries ready");
    Some(entries)
}

pub async fn run_dashboard(client: &Client, cfg: &Config) -> Result<Dashboard> {
    let totals = load_totals(client, cfg).await?;
    let expiries = load_expiries(client, cfg).await;
    Ok(Dashboard::build(&totals, expiries.as_deref()))
}

/// Fetch the monthly tab once; filtering reuses the returned table.
#[tracing::instrument(level = "info", skip_all)]
pub async fn load_series(client: &Client, cfg: &Config) -> Result<TimeSeriesTable> {
    let url = cfg
        .series_csv
        .as_ref()
        .ok_or_else(|| anyhow!("no series source configured (set {})", ENV_SERIES_CSV))?;
    let text = fetch_csv(client, url).await?;
    series_from_text(&text, cfg)
}

pub fn series_from_text(text: &str, cfg: &Config) -> Result<TimeSeriesTable> {
    let table = TimeSeriesTable::from_csv(text, cfg.tokenizer);
    match &cfg.period_column {
        Some(name) => table.with_period_column(name),
        None => Ok(table),
    }
}

/// Apply the configured period range (if any) and extract the series.
pub fn series_payload(table: &TimeSeriesTable, cfg: &Config) -> SeriesPayload {
    let view = match (&cfg.from, &cfg.to) {
        (None, None) => table.clone(),
        (from, to) => table.filter_range(from.as_deref(), to.as_deref()),
    };
    if view.is_empty() && !table.is_empty() {
        warn!(from = ?cfg.from, to = ?cfg.to, "period range selects no rows");
    }
    SeriesPayload::build(&view, &cfg.series_columns)
}
