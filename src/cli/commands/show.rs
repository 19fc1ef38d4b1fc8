//! Show command - print one cached result

use crate::cli::args::ShowArgs;
use crate::config::Config;
use crate::error::{MemoError, MemoResult};
use crate::store::{Entries, MemoStore};
use serde_json::Value;

/// Execute the show command
pub async fn execute(args: ShowArgs, config: &Config) -> MemoResult<()> {
    let store = MemoStore::from_config(&config.store);
    let entries = store.entries();

    let (_, value) = resolve(&entries, &args.fingerprint)?;
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Find the single entry whose fingerprint starts with `prefix`
fn resolve<'a>(entries: &'a Entries, prefix: &str) -> MemoResult<(&'a String, &'a Value)> {
    let prefix = prefix.trim().to_ascii_lowercase();
    if prefix.is_empty() {
        return Err(MemoError::User("Fingerprint prefix is empty".to_string()));
    }

    let mut matches = entries
        .range(prefix.clone()..)
        .take_while(|(fp, _)| fp.starts_with(&prefix));

    let first = matches
        .next()
        .ok_or_else(|| MemoError::EntryNotFound(prefix.clone()))?;

    let others = matches.count();
    if others > 0 {
        return Err(MemoError::User(format!(
            "Ambiguous prefix {} matches {} entries",
            prefix,
            others + 1
        )));
    }

    Ok(first)
}
