//! memorizer - transparent memoization of deterministic function calls
//!
//! Wrap a function with [`MemoStore::memoize`] and repeated calls with equal
//! arguments and an unchanged implementation are answered from the store
//! instead of running the function again. Results persist across restarts
//! through an explicit [`MemoStore::save`].
//!
//! ```rust
//! use memorizer::{FnIdentity, MemoStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoStore::in_memory());
//! let square = store.memoize(FnIdentity::with_source("square", "x * x"), |x: u64| x * x);
//!
//! assert_eq!(square.call(12).unwrap(), 144);
//! assert_eq!(square.call(12).unwrap(), 144); // served from the store
//! assert_eq!(store.stats().hits, 1);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fingerprint;
mod macros;
pub mod store;
pub mod ui;

pub use error::{CallError, MemoError, MemoResult};
pub use fingerprint::{fingerprint, Args, ArgsShape, Fingerprint, FnIdentity};
pub use store::{MemoStore, Memoized, MemoizedAsync, StoreStats};
