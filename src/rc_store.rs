//! RcFlyweight: reference counting atop the exclusive store.
//!
//! Each slot carries a signed claim counter next to its payload. `get`
//! adds a claim (creating the slot with zero claims first on a miss) and
//! `release` drops one, deleting the slot when the count falls to zero or
//! below. A release for a key that is not loaded is a no-op, so stray
//! releases never leave a negative counter behind.

use crate::callbacks::{Create, Delete, FromKey, Noop};
use crate::error::ReleaseError;
use crate::key::CompositeKey;
use crate::store::{Flyweight, Store};
use core::fmt;
use core::hash::BuildHasher;
use std::collections::hash_map::RandomState;

/// A payload and its outstanding claim count.
#[derive(Debug)]
pub(crate) struct Counted<V> {
    refcount: i64,
    value: V,
}

impl<V> Counted<V> {
    fn new(value: V) -> Self {
        Self { refcount: 0, value }
    }

    fn reference(&mut self) {
        self.refcount += 1;
    }

    /// Drop one claim; true when none are left.
    fn dereference(&mut self) -> bool {
        self.refcount -= 1;
        self.refcount <= 0
    }
}

/// Lifts a payload creator or deleter to work on [`Counted`] slots.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Counting<T>(T);

impl<K, V, C> Create<K, Counted<V>> for Counting<C>
where
    C: Create<K, V>,
{
    type Error = C::Error;

    fn create(&mut self, key: &K) -> Result<Counted<V>, C::Error> {
        self.0.create(key).map(Counted::new)
    }
}

impl<K, V, D> Delete<K, Counted<V>> for Counting<D>
where
    D: Delete<K, V>,
{
    fn delete(&mut self, key: &K, slot: Counted<V>) {
        self.0.delete(key, slot.value)
    }
}

/// Stores whose slots are shared by counted claims.
pub trait RefCounted: Store {
    /// Outstanding claims on `key`, or 0 if it is not loaded.
    fn reference_count(&self, key: &Self::Key) -> i64;
}

pub struct RcFlyweight<K, V, C = FromKey, D = Noop, S = RandomState>
where
    D: Delete<K, V>,
{
    inner: Flyweight<K, Counted<V>, Counting<C>, Counting<D>, S>,
}

impl<K, V> RcFlyweight<K, V>
where
    K: CompositeKey,
{
    pub fn new() -> Self {
        Self::from_parts(FromKey, Noop, RandomState::new(), 0)
    }
}

impl<K, V> Default for RcFlyweight<K, V>
where
    K: CompositeKey,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> RcFlyweight<K, V, C>
where
    K: CompositeKey,
    C: Create<K, V>,
{
    pub fn with_creator(creator: C) -> Self {
        Self::from_parts(creator, Noop, RandomState::new(), 0)
    }
}

impl<K, V, C, D> RcFlyweight<K, V, C, D>
where
    K: CompositeKey,
    C: Create<K, V>,
    D: Delete<K, V>,
{
    pub fn with_callbacks(creator: C, deleter: D) -> Self {
        Self::from_parts(creator, deleter, RandomState::new(), 0)
    }
}

impl<K, V, C, D, S> RcFlyweight<K, V, C, D, S>
where
    K: CompositeKey,
    D: Delete<K, V>,
    S: BuildHasher,
{
    pub fn with_hasher(creator: C, deleter: D, hasher: S) -> Self {
        Self::from_parts(creator, deleter, hasher, 0)
    }

    pub(crate) fn from_parts(creator: C, deleter: D, hasher: S, capacity: usize) -> Self {
        Self {
            inner: Flyweight::from_parts(Counting(creator), Counting(deleter), hasher, capacity),
        }
    }

    pub fn peek(&self, key: &K) -> Option<&V> {
        self.inner.peek(key).map(|slot| &slot.value)
    }

    pub fn is_loaded(&self, key: &K) -> bool {
        self.inner.is_loaded(key)
    }

    pub fn reference_count(&self, key: &K) -> i64 {
        self.inner.peek(key).map_or(0, |slot| slot.refcount)
    }

    /// Drop one claim on `key`. Returns `true` when that was the last
    /// claim and the slot was deleted; `false` when claims remain or the
    /// key was not loaded.
    pub fn release(&mut self, key: &K) -> bool {
        self.inner.release_if(key, Counted::dereference)
    }

    /// Strict [`release`](Self::release): a key with no slot is reported
    /// as an over-release.
    pub fn try_release(&mut self, key: &K) -> Result<bool, ReleaseError> {
        if !self.is_loaded(key) {
            return Err(ReleaseError::NotLoaded);
        }
        Ok(self.release(key))
    }

    /// Delete every slot regardless of outstanding claims.
    pub fn clear(&mut self) {
        self.inner.clear()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Loaded keys with their payloads and claim counts.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V, i64)> {
        self.inner
            .iter()
            .map(|(k, slot)| (k, &slot.value, slot.refcount))
    }
}

impl<K, V, C, D, S> RcFlyweight<K, V, C, D, S>
where
    K: CompositeKey,
    C: Create<K, V>,
    D: Delete<K, V>,
    S: BuildHasher,
{
    /// Add a claim on `key` and return its payload, creating the slot on
    /// a miss. A failed creation adds no claim and inserts nothing.
    pub fn get(&mut self, key: K) -> Result<&V, C::Error> {
        let slot = self.inner.acquire(key)?;
        slot.reference();
        Ok(&slot.value)
    }
}

impl<K, V, C, D, S> fmt::Debug for RcFlyweight<K, V, C, D, S>
where
    D: Delete<K, V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RcFlyweight")
            .field("len", &self.inner.len())
            .finish_non_exhaustive()
    }
}

impl<K, V, C, D, S> Store for RcFlyweight<K, V, C, D, S>
where
    K: CompositeKey,
    C: Create<K, V>,
    D: Delete<K, V>,
    S: BuildHasher,
{
    type Key = K;
    type Value = V;
    type Error = C::Error;

    fn get(&mut self, key: K) -> Result<&V, C::Error> {
        RcFlyweight::get(self, key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        RcFlyweight::peek(self, key)
    }

    fn is_loaded(&self, key: &K) -> bool {
        RcFlyweight::is_loaded(self, key)
    }

    fn release(&mut self, key: &K) -> bool {
        RcFlyweight::release(self, key)
    }

    fn clear(&mut self) {
        RcFlyweight::clear(self)
    }

    fn len(&self) -> usize {
        RcFlyweight::len(self)
    }
}

impl<K, V, C, D, S> RefCounted for RcFlyweight<K, V, C, D, S>
where
    K: CompositeKey,
    C: Create<K, V>,
    D: Delete<K, V>,
    S: BuildHasher,
{
    fn reference_count(&self, key: &K) -> i64 {
        RcFlyweight::reference_count(self, key)
    }
}
