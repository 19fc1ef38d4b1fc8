//! Terminal output for the memorizer CLI
//!
//! Uses `cliclack` styling in interactive terminals with automatic fallback
//! to plain, prefix-tagged lines in CI and when output is piped.

mod context;
mod output;

pub use context::UiContext;
pub use output::{field, field_status, heading, note, success, warning};
