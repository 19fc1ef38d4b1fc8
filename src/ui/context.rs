//! Output mode detection

use std::io::IsTerminal;

/// Variables whose presence marks a CI run
const CI_VARS: [&str; 5] = ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "BUILDKITE", "TF_BUILD"];

/// How command output is rendered
#[derive(Debug, Clone, Copy)]
pub struct UiContext {
    fancy: bool,
}

impl UiContext {
    /// Framed, colored output on a terminal; tagged plain lines in CI, when
    /// piped, or with `NO_COLOR` set
    pub fn detect() -> Self {
        let fancy = std::io::stdout().is_terminal()
            && std::env::var_os("NO_COLOR").is_none()
            && !CI_VARS.iter().any(|var| std::env::var_os(var).is_some());
        Self { fancy }
    }

    #[cfg(test)]
    pub(super) fn plain() -> Self {
        Self { fancy: false }
    }

    pub(super) fn fancy(&self) -> bool {
        self.fancy
    }
}
