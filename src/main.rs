use anyhow::Result;
use reqwest::Client;
use sheetkpi::{
    config::Config,
    pipeline::{run_dashboard, LOAD_FAILURE_MESSAGE},
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ─── 1) init logging (stderr; stdout carries the payload) ───────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) configure sources ───────────────────────────────────────
    let cfg = Config::from_env()?;
    info!(
        totals = ?cfg.totals_csv.as_ref().map(|u| u.as_str()),
        expiries = ?cfg.expiries_csv.as_ref().map(|u| u.as_str()),
        tokenizer = %cfg.tokenizer,
        strategy = %cfg.totals_strategy,
        "config loaded"
    );

    // ─── 3) fetch, map, hand off ────────────────────────────────────
    let client = Client::new();
    let dashboard = match run_dashboard(&client, &cfg).await {
        Ok(d) => d,
        Err(e) => {
            error!(error = %format!("{:#}", e), "dashboard pipeline failed");
            eprintln!("{}", LOAD_FAILURE_MESSAGE);
            std::process::exit(1);
        }
    };

    println!("{}", serde_json::to_string_pretty(&dashboard)?);
    info!("all done");
    Ok(())
}
