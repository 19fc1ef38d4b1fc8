//! Macros for memoizing functions with their source text as identity

/// Define a function and memoize it with its own source as identity
///
/// The wrapper takes the arguments as a tuple. Editing the body changes the
/// captured source, so earlier results stop matching.
///
/// ```rust
/// use memorizer::MemoStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoStore::in_memory());
/// let add = memorizer::memoize!(store, fn add(a: i64, b: i64) -> i64 { a + b });
///
/// assert_eq!(add.call((1, 2)).unwrap(), 3);
/// assert!(add.identity().source().unwrap().contains("a + b"));
/// ```
///
/// Source text comes from `stringify!`, whose spacing can differ between
/// compiler versions; a toolchain upgrade may cause misses, never false hits.
#[macro_export]
macro_rules! memoize {
    ($store:expr, fn $name:ident($($arg:ident : $ty:ty),* $(,)?) -> $ret:ty $body:block) => {{
        fn $name($($arg: $ty),*) -> $ret $body

        $store.memoize(
            $crate::FnIdentity::with_source(
                stringify!($name),
                stringify!(fn $name($($arg: $ty),*) -> $ret $body),
            ),
            |($($arg,)*): ($($ty,)*)| $name($($arg),*),
        )
    }};
}
