//! CLI command implementations

pub mod config;
pub mod list;
pub mod show;
pub mod stats;
pub mod verify;

pub use config::execute as config;
pub use list::execute as list;
pub use show::execute as show;
pub use stats::execute as stats;
pub use verify::execute as verify;

use serde_json::Value;

/// JSON type name of a cached result
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compact one-line rendering of a cached result, cut to `max` chars
pub(crate) fn preview(value: &Value, max: usize) -> String {
    let compact = value.to_string();
    if compact.chars().count() <= max {
        return compact;
    }
    let cut: String = compact.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}
