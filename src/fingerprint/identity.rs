//! Callable identity used as fingerprint input

use std::fmt;

/// The identity of a memoized callable
///
/// Rust has no runtime source introspection, so the source text is supplied
/// at registration. The [`memoize!`](crate::memoize!) macro captures it with
/// `stringify!`, which is whitespace-insensitive and stable across builds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FnIdentity {
    name: String,
    source: Option<String>,
}

impl FnIdentity {
    /// Identity backed by source text (or any version tag that changes
    /// whenever the implementation does)
    pub fn with_source(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: Some(source.into()),
        }
    }

    /// Name-only identity
    ///
    /// Changing the function body will NOT invalidate cached results.
    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
        }
    }

    /// Declared name of the callable
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source text, if available
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Whether body changes invalidate the cache for this callable
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }
}

impl fmt::Display for FnIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_source() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} (opaque)", self.name)
        }
    }
}
