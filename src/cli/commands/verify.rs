//! Verify command - strict check of the state file

use crate::config::Config;
use crate::error::MemoResult;
use crate::store::StateFile;
use crate::ui::{self, UiContext};

/// Execute the verify command
pub async fn execute(config: &Config) -> MemoResult<()> {
    let ctx = UiContext::detect();
    let state = StateFile::new(&config.store.path);

    let entries = state.load_strict()?;

    ui::success(
        &ctx,
        "State file is valid",
        &format!("{} entries in {}", entries.len(), state.path().display()),
    );
    Ok(())
}
