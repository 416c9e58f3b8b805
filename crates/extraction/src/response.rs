use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

lazy_static! {
    // first `{` through last `}`, across newlines
    static ref BRACED_RE: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to parse AI response as JSON: no JSON object found")]
    NoJsonFound,
    #[error("failed to parse AI response as JSON: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Stage one: the whole response is JSON.
pub fn parse_direct(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(text)
}

/// Stage two: the widest brace-delimited span inside surrounding prose.
pub fn find_braced(text: &str) -> Option<&str> {
    BRACED_RE.find(text).map(|m| m.as_str())
}

pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    match parse_direct(text) {
        Ok(value) => return Ok(value),
        Err(e) => debug!("Response is not bare JSON ({}), searching for an embedded object", e),
    }

    let candidate = find_braced(text).ok_or(ExtractError::NoJsonFound)?;
    serde_json::from_str(candidate).map_err(ExtractError::Malformed)
}
