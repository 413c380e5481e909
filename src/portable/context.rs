//! Request-scoped context bag.
//!
//! # Design Decisions
//! - A `Context` is a handle: clones point at the same map, so every handler
//!   in a chain reads and writes one shared bag
//! - Keys are names, integer indices or unique symbols
//! - Values are type-erased and downcast on read

use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

static SYMBOL_COUNTER: AtomicU64 = AtomicU64::new(1);

/// A key that never collides with any other key, including other symbols
/// with the same description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    id: u64,
    description: &'static str,
}

impl Symbol {
    /// Mint a fresh symbol.
    pub fn new(description: &'static str) -> Self {
        Self {
            id: SYMBOL_COUNTER.fetch_add(1, Ordering::Relaxed),
            description,
        }
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

/// Key into a [`Context`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContextKey {
    Name(Cow<'static, str>),
    Index(i64),
    Symbol(Symbol),
}

impl From<&'static str> for ContextKey {
    fn from(name: &'static str) -> Self {
        ContextKey::Name(Cow::Borrowed(name))
    }
}

impl From<String> for ContextKey {
    fn from(name: String) -> Self {
        ContextKey::Name(Cow::Owned(name))
    }
}

impl From<i64> for ContextKey {
    fn from(index: i64) -> Self {
        ContextKey::Index(index)
    }
}

impl From<i32> for ContextKey {
    fn from(index: i32) -> Self {
        ContextKey::Index(index.into())
    }
}

impl From<Symbol> for ContextKey {
    fn from(symbol: Symbol) -> Self {
        ContextKey::Symbol(symbol)
    }
}

type Value = Arc<dyn Any + Send + Sync>;

/// Mutable, open-ended state attached to one request's processing.
#[derive(Clone, Default)]
pub struct Context {
    entries: Arc<Mutex<HashMap<ContextKey, Value>>>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`. Returns true if an earlier value was replaced.
    pub fn insert<K, V>(&self, key: K, value: V) -> bool
    where
        K: Into<ContextKey>,
        V: Any + Send + Sync,
    {
        self.entries
            .lock()
            .insert(key.into(), Arc::new(value))
            .is_some()
    }

    /// Fetch the value under `key` if it exists and has type `V`.
    pub fn get<V>(&self, key: impl Into<ContextKey>) -> Option<Arc<V>>
    where
        V: Any + Send + Sync,
    {
        let value = self.entries.lock().get(&key.into()).cloned()?;
        value.downcast::<V>().ok()
    }

    pub fn contains_key(&self, key: impl Into<ContextKey>) -> bool {
        self.entries.lock().contains_key(&key.into())
    }

    /// Remove `key`. Returns true if it was present.
    pub fn remove(&self, key: impl Into<ContextKey>) -> bool {
        self.entries.lock().remove(&key.into()).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Snapshot of the keys currently present.
    pub fn keys(&self) -> Vec<ContextKey> {
        self.entries.lock().keys().cloned().collect()
    }

    /// True if both handles point at the same context.
    pub fn same_as(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("keys", &self.keys())
            .finish()
    }
}
