use anyhow::Result;
use reqwest::Client;
use sheetkpi::{
    config::Config,
    pipeline::{load_series, series_payload, LOAD_FAILURE_MESSAGE},
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cfg = Config::from_env()?;
    info!(
        source = ?cfg.series_csv.as_ref().map(|u| u.as_str()),
        columns = ?cfg.series_columns,
        from = ?cfg.from,
        to = ?cfg.to,
        "series config"
    );

    let client = Client::new();
    let table = match load_series(&client, &cfg).await {
        Ok(t) => t,
        Err(e) => {
            error!(error = %format!("{:#}", e), "series pipeline failed");
            eprintln!("{}", LOAD_FAILURE_MESSAGE);
            std::process::exit(1);
        }
    };
    info!(rows = table.len(), columns = table.headers.len(), "series loaded");

    let payload = series_payload(&table, &cfg);
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
