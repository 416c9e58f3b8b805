use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "LONG",
            Self::Short => "SHORT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One trade as extracted from a free-text description.
///
/// Deserialization is the validation step: every field must be present and well typed,
/// otherwise the record is rejected instead of flowing on half-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    #[serde(deserialize_with = "parse_date")]
    pub date: NaiveDate,
    #[serde(deserialize_with = "parse_symbol")]
    pub symbol: String,
    #[serde(deserialize_with = "parse_finite_number")]
    pub entry_price: f64,
    #[serde(deserialize_with = "parse_finite_number")]
    pub exit_price: f64,
    #[serde(deserialize_with = "parse_finite_number")]
    pub position_size: f64,
    #[serde(deserialize_with = "parse_direction")]
    pub direction: Direction,
    #[serde(deserialize_with = "parse_finite_number")]
    pub profit_loss: f64,
    pub notes: String,
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("expected a JSON object describing the trade, got {0}")]
    NotAnObject(&'static str),
    #[error("trade fields failed validation: {0}")]
    InvalidFields(#[source] serde_json::Error),
}

impl TradeRecord {
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValidationError> {
        if !value.is_object() {
            return Err(ValidationError::NotAnObject(json_kind(&value)));
        }
        serde_json::from_value(value).map_err(ValidationError::InvalidFields)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn parse_finite_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => n,
        NumberOrText::Text(s) => {
            let trimmed = s.trim();
            match trimmed.parse::<f64>() {
                Ok(n) => n,
                Err(_) => {
                    return Err(de::Error::custom(format!("`{}` is not a number", trimmed)));
                }
            }
        }
    };

    if !value.is_finite() {
        return Err(de::Error::custom(format!("{} is not a finite number", value)));
    }
    Ok(value)
}

fn parse_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = String::deserialize(deserializer)?;
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|e| de::Error::custom(format!("date `{}` is not YYYY-MM-DD: {}", trimmed, e)))
}

fn parse_direction<'de, D>(deserializer: D) -> Result<Direction, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = String::deserialize(deserializer)?;
    let trimmed = s.trim();
    match trimmed.to_uppercase().as_str() {
        "LONG" => Ok(Direction::Long),
        "SHORT" => Ok(Direction::Short),
        _ => Err(de::Error::unknown_variant(trimmed, &["LONG", "SHORT"])),
    }
}

// Symbols go into the journal unquoted, so anything that would break the row is refused.
fn parse_symbol<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = String::deserialize(deserializer)?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(de::Error::custom("symbol is empty"));
    }
    if trimmed.contains([',', '"', '\n', '\r']) {
        return Err(de::Error::custom(format!(
            "symbol `{}` contains a CSV delimiter",
            trimmed
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "date": "2024-01-01",
            "symbol": "AAPL",
            "entryPrice": 150,
            "exitPrice": 155,
            "positionSize": 100,
            "direction": "LONG",
            "profitLoss": 500,
            "notes": "earnings"
        })
    }

    #[test]
    fn test_valid_object_becomes_trade() {
        let trade = TradeRecord::from_json(sample()).unwrap();

        assert_eq!(trade.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(trade.symbol, "AAPL");
        assert_eq!(trade.entry_price, 150.0);
        assert_eq!(trade.exit_price, 155.0);
        assert_eq!(trade.position_size, 100.0);
        assert_eq!(trade.direction, Direction::Long);
        assert_eq!(trade.profit_loss, 500.0);
        assert_eq!(trade.notes, "earnings");
    }

    #[test]
    fn test_numeric_strings_and_loose_direction_are_accepted() {
        let mut value = sample();
        value["entryPrice"] = json!(" 150.25 ");
        value["direction"] = json!(" short");

        let trade = TradeRecord::from_json(value).unwrap();
        assert_eq!(trade.entry_price, 150.25);
        assert_eq!(trade.direction, Direction::Short);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let mut value = sample();
        value.as_object_mut().unwrap().remove("symbol");

        let err = TradeRecord::from_json(value).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFields(_)));
        assert!(err.to_string().contains("symbol"));
    }

    #[test]
    fn test_wrong_field_names_are_rejected() {
        let value = json!({
            "day": "2024-01-01",
            "ticker": "AAPL",
            "buy": 150,
            "sell": 155,
            "qty": 100,
            "side": "LONG",
            "pnl": 500,
            "comment": "earnings"
        });

        assert!(TradeRecord::from_json(value).is_err());
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let mut value = sample();
        value["date"] = json!("01/02/2024");

        let err = TradeRecord::from_json(value).unwrap_err();
        assert!(err.to_string().contains("01/02/2024"));
    }

    #[test]
    fn test_unknown_direction_is_rejected() {
        let mut value = sample();
        value["direction"] = json!("SIDEWAYS");

        let err = TradeRecord::from_json(value).unwrap_err();
        assert!(err.to_string().contains("SIDEWAYS"));
    }

    #[test]
    fn test_non_numeric_price_is_rejected() {
        let mut value = sample();
        value["exitPrice"] = json!("a lot");

        assert!(TradeRecord::from_json(value).is_err());
    }

    #[test]
    fn test_symbol_with_delimiter_is_rejected() {
        let mut value = sample();
        value["symbol"] = json!("AAPL,MSFT");

        let err = TradeRecord::from_json(value).unwrap_err();
        assert!(err.to_string().contains("delimiter"));
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = TradeRecord::from_json(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, ValidationError::NotAnObject("an array")));
    }

    #[test]
    fn test_serializes_back_to_wire_shape() {
        let trade = TradeRecord::from_json(sample()).unwrap();
        let value = serde_json::to_value(&trade).unwrap();

        assert_eq!(value["date"], "2024-01-01");
        assert_eq!(value["direction"], "LONG");
        assert_eq!(value["entryPrice"], 150.0);
        assert_eq!(value["profitLoss"], 500.0);
    }
}
