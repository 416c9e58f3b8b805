pub mod journal;

pub use journal::{JournalError, TradeJournal};
