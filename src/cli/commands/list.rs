//! List command - show cached entries

use super::{preview, value_kind};
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::error::MemoResult;
use crate::store::{Entries, MemoStore};
use crate::ui::{self, UiContext};
use console::style;

const PREVIEW_WIDTH: usize = 48;

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> MemoResult<()> {
    let store = MemoStore::from_config(&config.store);
    let entries = store.entries();

    if entries.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::note(&ctx, "No cached entries");
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&entries),
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Plain => print_plain(&entries),
    }

    Ok(())
}

fn print_table(entries: &Entries) {
    println!(
        "{:<14} {:<8} {}",
        style("FINGERPRINT").bold(),
        style("KIND").bold(),
        style("RESULT").bold()
    );
    println!("{}", "-".repeat(72));

    for (fp, value) in entries {
        let short = fp.get(..12).unwrap_or(fp);
        println!(
            "{:<14} {:<8} {}",
            short,
            value_kind(value),
            preview(value, PREVIEW_WIDTH)
        );
    }

    println!();
    println!("{} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" });
}

fn print_json(entries: &Entries) -> MemoResult<()> {
    #[derive(serde::Serialize)]
    struct EntryJson<'a> {
        fingerprint: &'a str,
        kind: &'static str,
        value: &'a serde_json::Value,
    }

    let json_entries: Vec<EntryJson<'_>> = entries
        .iter()
        .map(|(fp, value)| EntryJson {
            fingerprint: fp,
            kind: value_kind(value),
            value,
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json_entries)?);
    Ok(())
}

fn print_plain(entries: &Entries) {
    for fp in entries.keys() {
        println!("{}", fp);
    }
}
