//! Cache store for memoized results
//!
//! One `MemoStore` holds every fingerprint → result entry for the functions
//! memoized through it. Share it by cloning the `Arc`; there is no global
//! instance.
//!
//! # Lifecycle
//!
//! | Step | Effect |
//! |------|--------|
//! | `load` | Read state file, empty on missing/corrupt |
//! | miss | Run function, append entry in memory |
//! | hit | Return stored entry, function not run |
//! | `save` | Overwrite state file with all entries |
//!
//! Entries are never updated or removed. Nothing is written to disk unless
//! `save` is called.

pub mod memoize;
pub mod state;

pub use memoize::{Memoized, MemoizedAsync};
pub use state::{Entries, StateFile, DEFAULT_INDENT, DEFAULT_STATE_FILE};

use crate::config::schema::StoreConfig;
use crate::error::{MemoError, MemoResult};
use crate::fingerprint::{self, Args, Fingerprint, FnIdentity};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Counters describing store usage since it was loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Entries currently held in memory
    pub entries: usize,
    /// Calls answered from the cache
    pub hits: u64,
    /// Calls that ran the wrapped function
    pub misses: u64,
}

/// In-memory fingerprint → result mapping with optional file backing
#[derive(Debug)]
pub struct MemoStore {
    state: Option<StateFile>,
    entries: Mutex<Entries>,
    in_flight: Mutex<HashMap<String, Flight>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoStore {
    /// Load a store backed by the state file at `path`
    ///
    /// Never fails: a missing or corrupt file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> Self {
        Self::from_state(StateFile::new(path.as_ref()))
    }

    /// Load a store from configuration
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::from_state(StateFile::new(&config.path).with_indent(config.indent))
    }

    /// Load a store backed by `state`
    pub fn from_state(state: StateFile) -> Self {
        let entries = state.load_or_empty();
        Self::with_entries(Some(state), entries)
    }

    /// Store without a state file; `save` does nothing
    pub fn in_memory() -> Self {
        Self::with_entries(None, Entries::new())
    }

    fn with_entries(state: Option<StateFile>, entries: Entries) -> Self {
        Self {
            state,
            entries: Mutex::new(entries),
            in_flight: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Wrap a synchronous function
    ///
    /// The wrapper takes the function's arguments as one serializable value,
    /// usually a tuple.
    ///
    /// ```rust
    /// use memorizer::{FnIdentity, MemoStore};
    /// use std::sync::Arc;
    ///
    /// let store = Arc::new(MemoStore::in_memory());
    /// let add = store.memoize(
    ///     FnIdentity::with_source("add", "a + b"),
    ///     |(a, b): (i64, i64)| a + b,
    /// );
    ///
    /// assert_eq!(add.call((1, 2)).unwrap(), 3);
    /// assert_eq!(store.len(), 1);
    /// ```
    pub fn memoize<F>(self: &Arc<Self>, identity: FnIdentity, func: F) -> Memoized<F> {
        log_identity(&identity);
        Memoized::new(Arc::clone(self), identity, func)
    }

    /// Wrap an async function, with at most one execution in flight per
    /// fingerprint
    pub fn memoize_async<F>(self: &Arc<Self>, identity: FnIdentity, func: F) -> MemoizedAsync<F> {
        log_identity(&identity);
        MemoizedAsync::new(Arc::clone(self), identity, func)
    }

    /// Write all entries to the state file
    ///
    /// Failures are logged and returned; the in-memory entries are kept
    /// either way.
    pub fn save(&self) -> MemoResult<()> {
        let Some(state) = &self.state else {
            debug!("In-memory store, nothing to save");
            return Ok(());
        };

        let entries = self.lock_entries();
        match state.save(&entries) {
            Ok(()) => {
                info!(
                    "Saved {} entries to {}",
                    entries.len(),
                    state.path().display()
                );
                Ok(())
            }
            Err(e) => {
                warn!("Error saving state: {}", e);
                Err(e)
            }
        }
    }

    /// Path of the backing state file
    pub fn path(&self) -> Option<&Path> {
        self.state.as_ref().map(StateFile::path)
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.lock_entries().contains_key(fp.as_str())
    }

    /// Stored result for `fp`, as raw JSON
    pub fn get(&self, fp: &Fingerprint) -> Option<Value> {
        self.lock_entries().get(fp.as_str()).cloned()
    }

    /// Snapshot of all entries, sorted by fingerprint
    pub fn entries(&self) -> Entries {
        self.lock_entries().clone()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fingerprint a call of `identity` with typed `args`
    pub(crate) fn fingerprint_call<A: Serialize + ?Sized>(
        &self,
        identity: &FnIdentity,
        args: &A,
    ) -> MemoResult<Fingerprint> {
        let args = Args::from_serialize(args).map_err(|e| e.for_function(identity.name()))?;
        fingerprint::fingerprint(identity, &args)
    }

    /// Cached result for `fp`, decoded as `R`
    pub(crate) fn cached<R: DeserializeOwned>(&self, fp: &Fingerprint) -> MemoResult<Option<R>> {
        let Some(value) = self.get(fp) else {
            return Ok(None);
        };

        serde_json::from_value(value)
            .map(Some)
            .map_err(|source| MemoError::ResultDecode {
                fingerprint: fp.to_string(),
                source,
            })
    }

    /// Store `result` under `fp` unless an entry already exists
    ///
    /// A result is cached only if its JSON form decodes back to an `R`;
    /// anything else (non-string map keys, `NaN`) is returned uncached.
    pub(crate) fn record<R>(&self, identity: &FnIdentity, fp: &Fingerprint, result: &R)
    where
        R: Serialize + DeserializeOwned,
    {
        match stored_form(result) {
            Ok(value) => {
                self.lock_entries()
                    .entry(fp.to_string())
                    .or_insert(value);
                debug!("Cached result of {} under {}", identity, fp.short());
            }
            Err(e) => {
                warn!(
                    "Result of {} is not JSON-representable, not cached: {}",
                    identity, e
                );
            }
        }
    }

    pub(crate) fn count_hit(&self, identity: &FnIdentity, fp: &Fingerprint) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        debug!("Cache hit for {} ({})", identity, fp.short());
    }

    pub(crate) fn count_miss(&self, identity: &FnIdentity, fp: &Fingerprint) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("Cache miss for {} ({})", identity, fp.short());
    }

    /// Gate serializing async executions of the same fingerprint
    pub(crate) fn flight_gate(&self, fp: &Fingerprint) -> FlightGate<'_> {
        let mut in_flight = self.lock_in_flight();
        let flight = in_flight.entry(fp.to_string()).or_default();
        flight.holders += 1;

        FlightGate {
            store: self,
            key: fp.to_string(),
            gate: Arc::clone(&flight.gate),
        }
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<String, Flight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn in_flight_len(&self) -> usize {
        self.lock_in_flight().len()
    }
}

/// JSON form of a result, if it decodes back to the same type
fn stored_form<R: Serialize + DeserializeOwned>(result: &R) -> serde_json::Result<Value> {
    fingerprint::ensure_finite(result)?;
    let value = serde_json::to_value(result)?;
    serde_json::from_value::<R>(value.clone())?;
    Ok(value)
}

#[derive(Debug, Default)]
struct Flight {
    gate: Arc<tokio::sync::Mutex<()>>,
    holders: usize,
}

/// Claim on the in-flight gate of one fingerprint
///
/// The entry is removed from the store when the last claim drops, including
/// when the owning future is cancelled.
pub(crate) struct FlightGate<'a> {
    store: &'a MemoStore,
    key: String,
    gate: Arc<tokio::sync::Mutex<()>>,
}

impl FlightGate<'_> {
    pub(crate) async fn lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.gate.lock().await
    }
}

impl Drop for FlightGate<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.store.lock_in_flight();
        if let Some(flight) = in_flight.get_mut(&self.key) {
            flight.holders = flight.holders.saturating_sub(1);
            if flight.holders == 0 {
                in_flight.remove(&self.key);
            }
        }
    }
}

fn log_identity(identity: &FnIdentity) {
    if !identity.has_source() {
        debug!(
            "Memoizing {} without source text; body changes will not invalidate its entries",
            identity.name()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn sample_fp() -> Fingerprint {
        fingerprint::fingerprint(&FnIdentity::opaque("f"), &Args::new()).unwrap()
    }

    #[test]
    fn load_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = MemoStore::load(dir.path().join("state.json"));

        assert!(store.is_empty());
        assert_eq!(store.path(), Some(dir.path().join("state.json").as_path()));
    }

    #[test]
    fn load_corrupt_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "\u{0}\u{1}binary junk").unwrap();

        let store = MemoStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn record_and_get() {
        let store = MemoStore::in_memory();
        let fp = sample_fp();
        let id = FnIdentity::opaque("f");

        store.record(&id, &fp, &json!([1, 2, 3]));

        assert!(store.contains(&fp));
        assert_eq!(store.get(&fp), Some(json!([1, 2, 3])));
        assert_eq!(store.cached::<Vec<i32>>(&fp).unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn record_never_overwrites() {
        let store = MemoStore::in_memory();
        let fp = sample_fp();
        let id = FnIdentity::opaque("f");

        store.record(&id, &fp, &1);
        store.record(&id, &fp, &2);

        assert_eq!(store.get(&fp), Some(json!(1)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn cached_type_mismatch_is_error() {
        let store = MemoStore::in_memory();
        let fp = sample_fp();
        store.record(&FnIdentity::opaque("f"), &fp, &"text".to_string());

        let err = store.cached::<i64>(&fp).unwrap_err();
        assert!(matches!(err, MemoError::ResultDecode { .. }));
    }

    #[test]
    fn unrepresentable_result_not_cached() {
        let store = MemoStore::in_memory();
        let fp = sample_fp();

        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        store.record(&FnIdentity::opaque("f"), &fp, &map);

        assert!(store.is_empty());
    }

    #[test]
    fn non_finite_result_not_cached() {
        let store = MemoStore::in_memory();
        let fp = sample_fp();
        let id = FnIdentity::opaque("f");

        store.record(&id, &fp, &f64::NAN);
        store.record(&id, &fp, &Some(f64::INFINITY));
        assert!(store.is_empty());

        store.record(&id, &fp, &Some(0.5));
        assert_eq!(store.cached::<Option<f64>>(&fp).unwrap(), Some(Some(0.5)));
    }

    #[test]
    fn result_that_does_not_decode_is_not_cached() {
        #[derive(Serialize, serde::Deserialize)]
        struct Level {
            #[serde(rename(serialize = "value", deserialize = "v"))]
            v: u8,
        }

        let store = MemoStore::in_memory();
        store.record(&FnIdentity::opaque("f"), &sample_fp(), &Level { v: 3 });

        assert!(store.is_empty());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let store = MemoStore::load(&path);
        store.record(&FnIdentity::opaque("f"), &sample_fp(), &json!({"x": 1.5, "y": null}));
        store.save().unwrap();

        let reloaded = MemoStore::load(&path);
        assert_eq!(reloaded.entries(), store.entries());
    }

    #[test]
    fn in_memory_save_is_noop() {
        let store = MemoStore::in_memory();
        store.record(&FnIdentity::opaque("f"), &sample_fp(), &1);

        assert!(store.save().is_ok());
        assert!(store.path().is_none());
    }

    #[test]
    fn save_failure_keeps_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("occupied");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("file"), "x").unwrap();

        let store = MemoStore::load(&path);
        store.record(&FnIdentity::opaque("f"), &sample_fp(), &1);

        assert!(store.save().is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn from_config_uses_indent() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig {
            path: dir.path().join("state.json"),
            indent: 2,
        };

        let store = MemoStore::from_config(&config);
        store.record(&FnIdentity::opaque("f"), &sample_fp(), &1);
        store.save().unwrap();

        let content = fs::read_to_string(&config.path).unwrap();
        assert!(content.starts_with("{\n  \""));
    }

    #[test]
    fn flight_gate_is_shared_until_released() {
        let store = MemoStore::in_memory();
        let fp = sample_fp();

        let a = store.flight_gate(&fp);
        let b = store.flight_gate(&fp);
        assert!(Arc::ptr_eq(&a.gate, &b.gate));
        assert_eq!(store.in_flight_len(), 1);

        drop(a);
        assert_eq!(store.in_flight_len(), 1);
        drop(b);
        assert_eq!(store.in_flight_len(), 0);

        let c = store.flight_gate(&fp);
        assert_eq!(Arc::strong_count(&c.gate), 2);
    }
}
