use anyhow::{Context, Result};
use chrono::NaiveDate;
use common::models::TradeRecord;
use extraction::{TextGenerator, build_prompt, extract_json};
use storage::TradeJournal;
use tracing::{error, info};

/// Description in, journal row out. A row is only written once the trade validates.
pub struct TradePipeline<G> {
    generator: G,
    journal: TradeJournal,
}

impl<G: TextGenerator> TradePipeline<G> {
    pub fn new(generator: G, journal: TradeJournal) -> Self {
        Self { generator, journal }
    }

    pub fn journal(&self) -> &TradeJournal {
        &self.journal
    }

    pub async fn process_trade(&self, description: &str, today: NaiveDate) -> Result<TradeRecord> {
        let prompt = build_prompt(description, today);

        let text = match self.generator.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!("Error processing trade with AI: {}", e);
                return Err(e).context("AI request failed");
            }
        };

        let value = extract_json(&text).inspect_err(|e| error!("{}", e))?;
        let trade = TradeRecord::from_json(value).inspect_err(|e| error!("{}", e))?;

        info!(
            "Extracted {} {} trade on {}",
            trade.direction, trade.symbol, trade.date
        );
        Ok(trade)
    }

    pub async fn record_trade(&self, description: &str, today: NaiveDate) -> Result<TradeRecord> {
        let trade = self.process_trade(description, today).await?;
        self.journal
            .append(&trade)
            .with_context(|| format!("writing to {}", self.journal.path().display()))?;
        Ok(trade)
    }
}
