use chrono::NaiveDate;
use common::models::{DATE_FORMAT, Direction, TradeRecord};
use serde::Deserialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const HEADERS: [&str; 8] = [
    "Date",
    "Symbol",
    "Entry Price",
    "Exit Price",
    "Position Size",
    "Direction",
    "Profit/Loss",
    "Notes",
];

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("journal I/O failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("journal CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Deserialize)]
struct JournalRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Entry Price")]
    entry_price: f64,
    #[serde(rename = "Exit Price")]
    exit_price: f64,
    #[serde(rename = "Position Size")]
    position_size: f64,
    #[serde(rename = "Direction")]
    direction: Direction,
    #[serde(rename = "Profit/Loss")]
    profit_loss: f64,
    #[serde(rename = "Notes")]
    notes: String,
}

impl From<JournalRow> for TradeRecord {
    fn from(row: JournalRow) -> Self {
        TradeRecord {
            date: row.date,
            symbol: row.symbol,
            entry_price: row.entry_price,
            exit_price: row.exit_price,
            position_size: row.position_size,
            direction: row.direction,
            profit_loss: row.profit_loss,
            notes: row.notes,
        }
    }
}

/// Append-only CSV log of trades. No locking: concurrent writers may interleave.
#[derive(Debug, Clone)]
pub struct TradeJournal {
    path: PathBuf,
}

impl TradeJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the header row if the file is missing or empty. Returns whether it did.
    pub fn ensure_header(&self) -> Result<bool, JournalError> {
        let has_data = fs::metadata(&self.path)
            .map(|m| m.len() > 0)
            .unwrap_or(false);
        if has_data {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);
        wtr.write_record(HEADERS)?;
        wtr.flush().map_err(|e| self.io_error(e))?;

        info!("Created trade journal at {}", self.path.display());
        Ok(true)
    }

    pub fn append(&self, trade: &TradeRecord) -> Result<(), JournalError> {
        self.ensure_header()?;

        let mut line = format_row(trade);
        line.push('\n');

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| self.io_error(e))?;
        file.flush().map_err(|e| self.io_error(e))?;

        debug!("Appended {} trade on {}", trade.symbol, trade.date);
        Ok(())
    }

    /// Reads every row back. A journal that does not exist yet holds no trades.
    pub fn read_all(&self) -> Result<Vec<TradeRecord>, JournalError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut rdr = csv::Reader::from_path(&self.path)?;
        let rows = rdr
            .deserialize::<JournalRow>()
            .map(|row| row.map(TradeRecord::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Number of data rows, without validating their fields. Rows written by older
    /// tools still count.
    pub fn row_count(&self) -> Result<usize, JournalError> {
        if !self.path.exists() {
            return Ok(0);
        }

        let mut rdr = csv::Reader::from_path(&self.path)?;
        let mut count = 0;
        for record in rdr.records() {
            record?;
            count += 1;
        }
        Ok(count)
    }

    fn io_error(&self, source: io::Error) -> JournalError {
        JournalError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// One journal line without the terminator. Only the notes column is quoted; every
/// other column is a date, a number, an enum or a validated symbol.
pub fn format_row(trade: &TradeRecord) -> String {
    [
        trade.date.format(DATE_FORMAT).to_string(),
        trade.symbol.clone(),
        trade.entry_price.to_string(),
        trade.exit_price.to_string(),
        trade.position_size.to_string(),
        trade.direction.to_string(),
        trade.profit_loss.to_string(),
        quote_field(&trade.notes),
    ]
    .join(",")
}

pub fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
