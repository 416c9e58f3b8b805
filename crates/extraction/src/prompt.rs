use chrono::NaiveDate;
use common::models::DATE_FORMAT;

/// Builds the extraction prompt. `today` is spelled out because the model has no clock.
pub fn build_prompt(trade_description: &str, today: NaiveDate) -> String {
    format!(
        "Extract trading information from the following description and return it as a JSON object.
Only return the JSON object, nothing else.
Use this exact format:
{{
    \"date\": \"YYYY-MM-DD\",
    \"symbol\": \"TICKER\",
    \"entryPrice\": number,
    \"exitPrice\": number,
    \"positionSize\": number,
    \"direction\": \"LONG\" or \"SHORT\",
    \"profitLoss\": number,
    \"notes\": \"string\"
}}
Use today's date if no date is specified. Today's date is {}.

Trade description: {}",
        today.format(DATE_FORMAT),
        trade_description
    )
}
