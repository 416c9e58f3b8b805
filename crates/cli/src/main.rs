use chrono::Local;
use dotenvy::dotenv;
use std::{env, fs, process};
use tracing::{debug, info, warn};

use common::config::AppConfig;
use common::logger;
use extraction::GeminiClient;
use storage::TradeJournal;

use crate::pipeline::TradePipeline;

mod pipeline;

const EXAMPLE: &str =
    "Bought 100 shares of AAPL at 150, sold at 155, made good profit due to earnings report";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let Some(description) = description_from_args(env::args()) else {
        let program = env::args().next().unwrap_or_else(|| "trade-journal".to_string());
        eprintln!("Usage: {} \"<trade description>\"", program);
        eprintln!("Example: {} \"{}\"", program, EXAMPLE);
        process::exit(1);
    };

    dotenv().ok();
    logger::setup_logger();

    let cfg = AppConfig::from_env();
    debug!("Loaded {:?}", cfg);

    let journal = TradeJournal::new(cfg.journal.path.clone());
    let client = GeminiClient::new(cfg.gemini);
    info!("Using Gemini model {}", client.model());
    let pipeline = TradePipeline::new(client, journal);

    println!("Processing trade data...");
    let trade = pipeline
        .record_trade(&description, Local::now().date_naive())
        .await?;
    println!("Trade data successfully added to CSV!");

    println!("\nProcessed Trade Data:");
    println!("{}", serde_json::to_string_pretty(&trade)?);

    let path = pipeline.journal().path();
    let shown = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    println!("\nData saved to: {}", shown.display());

    match pipeline.journal().row_count() {
        Ok(rows) => debug!("Journal now holds {} rows", rows),
        Err(e) => warn!("Could not count journal rows: {}", e),
    }

    Ok(())
}

/// First positional argument, if it holds anything but whitespace.
fn description_from_args<I>(args: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .nth(1)
        .filter(|description| !description.trim().is_empty())
}
