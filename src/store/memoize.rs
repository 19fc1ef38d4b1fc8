//! Memoizing wrappers around sync and async functions

use super::MemoStore;
use crate::error::{CallError, MemoError, MemoResult};
use crate::fingerprint::FnIdentity;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

/// A synchronous function whose results are served from a [`MemoStore`]
///
/// The wrapper does not hold any lock while the function runs, so memoized
/// functions may call themselves recursively. Two threads missing on the
/// same call at once both run it; the first result stored wins.
pub struct Memoized<F> {
    store: Arc<MemoStore>,
    identity: FnIdentity,
    func: F,
}

impl<F> Memoized<F> {
    pub(super) fn new(store: Arc<MemoStore>, identity: FnIdentity, func: F) -> Self {
        Self {
            store,
            identity,
            func,
        }
    }

    pub fn identity(&self) -> &FnIdentity {
        &self.identity
    }

    pub fn store(&self) -> &Arc<MemoStore> {
        &self.store
    }

    /// Call the function, or return its cached result
    pub fn call<A, R>(&self, args: A) -> MemoResult<R>
    where
        F: Fn(A) -> R,
        A: Serialize,
        R: Serialize + DeserializeOwned,
    {
        self.run(args, |a| Ok::<R, Infallible>((self.func)(a)))
            .map_err(into_memo_error)
    }

    /// Call a fallible function, or return its cached result
    ///
    /// An `Err` from the function is returned as [`CallError::Inner`] and is
    /// never cached.
    pub fn try_call<A, R, E>(&self, args: A) -> Result<R, CallError<E>>
    where
        F: Fn(A) -> Result<R, E>,
        A: Serialize,
        R: Serialize + DeserializeOwned,
    {
        self.run(args, |a| (self.func)(a))
    }

    fn run<A, R, E>(
        &self,
        args: A,
        invoke: impl FnOnce(A) -> Result<R, E>,
    ) -> Result<R, CallError<E>>
    where
        A: Serialize,
        R: Serialize + DeserializeOwned,
    {
        let fp = self.store.fingerprint_call(&self.identity, &args)?;

        if let Some(hit) = self.store.cached(&fp)? {
            self.store.count_hit(&self.identity, &fp);
            return Ok(hit);
        }

        self.store.count_miss(&self.identity, &fp);
        let result = invoke(args).map_err(CallError::Inner)?;
        self.store.record(&self.identity, &fp, &result);
        Ok(result)
    }
}

/// An async function whose results are served from a [`MemoStore`]
///
/// Concurrent calls that miss on the same fingerprint are serialized: the
/// first runs the function, the rest wait and then read its cached result.
/// If the first call fails, the next waiter runs the function itself.
pub struct MemoizedAsync<F> {
    store: Arc<MemoStore>,
    identity: FnIdentity,
    func: F,
}

impl<F> MemoizedAsync<F> {
    pub(super) fn new(store: Arc<MemoStore>, identity: FnIdentity, func: F) -> Self {
        Self {
            store,
            identity,
            func,
        }
    }

    pub fn identity(&self) -> &FnIdentity {
        &self.identity
    }

    pub fn store(&self) -> &Arc<MemoStore> {
        &self.store
    }

    /// Await the function, or return its cached result
    pub async fn call<A, R, Fut>(&self, args: A) -> MemoResult<R>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = R>,
        A: Serialize,
        R: Serialize + DeserializeOwned,
    {
        self.run(args, |a| {
            let fut = (self.func)(a);
            async move { Ok::<R, Infallible>(fut.await) }
        })
        .await
        .map_err(into_memo_error)
    }

    /// Await a fallible function, or return its cached result
    pub async fn try_call<A, R, E, Fut>(&self, args: A) -> Result<R, CallError<E>>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        A: Serialize,
        R: Serialize + DeserializeOwned,
    {
        self.run(args, |a| (self.func)(a)).await
    }

    async fn run<A, R, E, Fut>(
        &self,
        args: A,
        invoke: impl FnOnce(A) -> Fut,
    ) -> Result<R, CallError<E>>
    where
        Fut: Future<Output = Result<R, E>>,
        A: Serialize,
        R: Serialize + DeserializeOwned,
    {
        let fp = self.store.fingerprint_call(&self.identity, &args)?;

        if let Some(hit) = self.store.cached(&fp)? {
            self.store.count_hit(&self.identity, &fp);
            return Ok(hit);
        }

        let gate = self.store.flight_gate(&fp);
        let _running = gate.lock().await;

        // Filled by the call we waited on
        if let Some(hit) = self.store.cached(&fp)? {
            self.store.count_hit(&self.identity, &fp);
            return Ok(hit);
        }

        self.store.count_miss(&self.identity, &fp);
        let result = invoke(args).await;
        if let Ok(value) = &result {
            self.store.record(&self.identity, &fp, value);
        }
        result.map_err(CallError::Inner)
    }
}

fn into_memo_error(err: CallError<Infallible>) -> MemoError {
    match err {
        CallError::Memo(e) => e,
        CallError::Inner(never) => match never {},
    }
}
