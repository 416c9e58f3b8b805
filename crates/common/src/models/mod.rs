pub mod trade;

pub use trade::{DATE_FORMAT, Direction, TradeRecord, ValidationError};
