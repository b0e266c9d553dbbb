//! Store configuration.
//!
//! ```
//! use flyweight_cache::{from_fn, Builder};
//!
//! let store = Builder::new()
//!     .creator(from_fn(|path: &String| path.len()))
//!     .capacity(64)
//!     .build_sync_refcounted::<String, usize>();
//!
//! assert_eq!(store.get("a.png".to_string()), Ok(5));
//! assert_eq!(store.reference_count(&"a.png".to_string()), 1);
//! ```

use crate::callbacks::{Create, Delete, FromKey, Noop};
use crate::key::CompositeKey;
use crate::rc_store::RcFlyweight;
use crate::shared::{LocalFlyweight, SyncFlyweight};
use crate::store::Flyweight;
use core::hash::BuildHasher;
use std::collections::hash_map::RandomState;

/// Collects a creator, a deleter, a hasher, and an initial capacity, then
/// builds any store variant from them.
#[derive(Debug, Clone)]
pub struct Builder<C = FromKey, D = Noop, S = RandomState> {
    creator: C,
    deleter: D,
    hasher: S,
    capacity: usize,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            creator: FromKey,
            deleter: Noop,
            hasher: RandomState::new(),
            capacity: 0,
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, D, S> Builder<C, D, S> {
    pub fn creator<C2>(self, creator: C2) -> Builder<C2, D, S> {
        Builder {
            creator,
            deleter: self.deleter,
            hasher: self.hasher,
            capacity: self.capacity,
        }
    }

    pub fn deleter<D2>(self, deleter: D2) -> Builder<C, D2, S> {
        Builder {
            creator: self.creator,
            deleter,
            hasher: self.hasher,
            capacity: self.capacity,
        }
    }

    pub fn hasher<S2>(self, hasher: S2) -> Builder<C, D, S2> {
        Builder {
            creator: self.creator,
            deleter: self.deleter,
            hasher,
            capacity: self.capacity,
        }
    }

    /// Slots to reserve up front.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn build<K, V>(self) -> Flyweight<K, V, C, D, S>
    where
        K: CompositeKey,
        D: Delete<K, V>,
        S: BuildHasher,
    {
        Flyweight::from_parts(self.creator, self.deleter, self.hasher, self.capacity)
    }

    pub fn build_refcounted<K, V>(self) -> RcFlyweight<K, V, C, D, S>
    where
        K: CompositeKey,
        D: Delete<K, V>,
        S: BuildHasher,
    {
        RcFlyweight::from_parts(self.creator, self.deleter, self.hasher, self.capacity)
    }

    pub fn build_sync<K, V>(self) -> SyncFlyweight<Flyweight<K, V, C, D, S>>
    where
        K: CompositeKey,
        C: Create<K, V>,
        D: Delete<K, V>,
        S: BuildHasher,
    {
        SyncFlyweight::new(self.build())
    }

    pub fn build_sync_refcounted<K, V>(self) -> SyncFlyweight<RcFlyweight<K, V, C, D, S>>
    where
        K: CompositeKey,
        C: Create<K, V>,
        D: Delete<K, V>,
        S: BuildHasher,
    {
        SyncFlyweight::new(self.build_refcounted())
    }

    pub fn build_local<K, V>(self) -> LocalFlyweight<Flyweight<K, V, C, D, S>>
    where
        K: CompositeKey,
        C: Create<K, V>,
        D: Delete<K, V>,
        S: BuildHasher,
    {
        LocalFlyweight::new(self.build())
    }

    pub fn build_local_refcounted<K, V>(self) -> LocalFlyweight<RcFlyweight<K, V, C, D, S>>
    where
        K: CompositeKey,
        C: Create<K, V>,
        D: Delete<K, V>,
        S: BuildHasher,
    {
        LocalFlyweight::new(self.build_refcounted())
    }
}
