pub mod demo;
pub mod state;

use chrono::{DateTime, Utc};
use statedb::StateValue;

/// Turn a command-line argument into a value.
///
/// With `timestamp` the argument must be RFC 3339. Otherwise it is read as
/// JSON (`28`, `1.5`, `true`, `null`, `[1,2]`, `{"a":1}`) and anything that
/// is not valid JSON is kept as a plain string.
pub fn parse_value(raw: &str, timestamp: bool) -> anyhow::Result<StateValue> {
    if timestamp {
        let when = DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc);
        return Ok(StateValue::Timestamp(when));
    }
    Ok(match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => StateValue::from_json(json),
        Err(_) => StateValue::String(raw.to_string()),
    })
}
