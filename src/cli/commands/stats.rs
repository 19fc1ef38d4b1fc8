//! Stats command - summarize the state file

use super::value_kind;
use crate::config::Config;
use crate::error::{MemoError, MemoResult};
use crate::store::{MemoStore, StateFile};
use crate::ui::{self, UiContext};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use tokio::fs;

/// Execute the stats command
pub async fn execute(config: &Config) -> MemoResult<()> {
    let ctx = UiContext::detect();
    let path = &config.store.path;

    ui::heading(&ctx, "Cache Stats");
    ui::field(&ctx, "State file", &path.display().to_string());

    if !path.exists() {
        ui::note(&ctx, "No state file yet (nothing has been saved)");
        return Ok(());
    }

    let metadata = fs::metadata(path)
        .await
        .map_err(|e| MemoError::io(format!("reading metadata of {}", path.display()), e))?;

    let store = MemoStore::from_config(&config.store);
    let entries = store.entries();

    ui::field(&ctx, "Entries", &entries.len().to_string());
    ui::field(&ctx, "Size", &format_size(metadata.len()));
    if let Ok(modified) = metadata.modified() {
        let modified: DateTime<Local> = modified.into();
        ui::field(
            &ctx,
            "Modified",
            &modified.format("%Y-%m-%d %H:%M:%S").to_string(),
        );
    }

    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    for value in entries.values() {
        *kinds.entry(value_kind(value)).or_default() += 1;
    }
    if !kinds.is_empty() {
        let summary = kinds
            .iter()
            .map(|(kind, count)| format!("{} {}", count, kind))
            .collect::<Vec<_>>()
            .join(", ");
        ui::field(&ctx, "Results", &summary);
    }

    let valid = StateFile::new(path).load_strict().is_ok();
    ui::field_status(
        &ctx,
        "Format",
        if valid { "valid" } else { "invalid (loads as empty)" },
        valid,
    );

    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    match bytes {
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{} B", b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_formatting() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
