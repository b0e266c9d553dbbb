//! Scope-bound claims on a shared store.
//!
//! [`Autorelease`] pairs one `get` with exactly one `release`: the claim
//! is taken when the guard is built and given back when it is dropped,
//! however the scope is left. Cloning takes a fresh claim on the same key
//! instead of aliasing the old one, so refcounted stores see one claim per
//! live guard. Moving a guard moves its claim and touches the store not at
//! all.
//!
//! Guards need a store that can be reached through `&self` while other
//! guards are alive ([`SharedStore`]) and that counts claims
//! ([`SharedRefCounted`]). On a store without counts a second guard, or
//! an earlier plain `get`, would share one slot with a single release, so
//! the first drop would unload a value another holder still uses.
//!
//! ```compile_fail
//! use flyweight_cache::{Flyweight, LocalFlyweight};
//!
//! let store: LocalFlyweight<Flyweight<u32, u32>> = LocalFlyweight::default();
//! let _guard = store.get_autorelease(1);
//! ```

use crate::key::CompositeKey;
use core::convert::Infallible;
use core::fmt;
use core::ops::Deref;

/// A store reachable through shared references. Values come back by clone;
/// use `Arc<T>` payloads when callers need to share one allocation.
pub trait SharedStore {
    type Key: CompositeKey + Clone;
    type Value: Clone;
    type Error;

    /// Take a claim on `key`, creating its slot on a miss.
    fn get(&self, key: Self::Key) -> Result<Self::Value, Self::Error>;

    /// Give back one claim on `key`.
    fn release(&self, key: &Self::Key) -> bool;
}

/// Shared stores where each `get` adds one claim and each `release` drops
/// one, so a slot stays loaded while any claim on it is outstanding.
pub trait SharedRefCounted: SharedStore {
    /// Outstanding claims on `key`, or 0 if it is not loaded.
    fn reference_count(&self, key: &Self::Key) -> i64;

    /// Take a claim on `key` that is given back when the guard drops.
    fn get_autorelease(&self, key: Self::Key) -> Result<Autorelease<'_, Self>, Self::Error>
    where
        Self: Sized,
    {
        Autorelease::acquire(self, key)
    }
}

/// One claim on a slot of `St`, released when dropped.
#[must_use = "dropping the guard releases the claim immediately"]
pub struct Autorelease<'s, St>
where
    St: SharedRefCounted,
{
    value: St::Value,
    key: St::Key,
    store: &'s St,
}

impl<'s, St> Autorelease<'s, St>
where
    St: SharedRefCounted,
{
    pub fn acquire(store: &'s St, key: St::Key) -> Result<Self, St::Error> {
        let value = store.get(key.clone())?;
        Ok(Self { value, key, store })
    }

    pub fn key(&self) -> &St::Key {
        &self.key
    }

    pub fn value(&self) -> &St::Value {
        &self.value
    }

    /// The store this guard will release into.
    pub fn store(&self) -> &'s St {
        self.store
    }

    /// Take another claim on the same key. Fails only if the slot had to
    /// be recreated and the creator failed.
    pub fn try_clone(&self) -> Result<Self, St::Error> {
        Self::acquire(self.store, self.key.clone())
    }
}

impl<'s, St> Deref for Autorelease<'s, St>
where
    St: SharedRefCounted,
{
    type Target = St::Value;

    fn deref(&self) -> &St::Value {
        &self.value
    }
}

impl<'s, St> AsRef<St::Value> for Autorelease<'s, St>
where
    St: SharedRefCounted,
{
    fn as_ref(&self) -> &St::Value {
        &self.value
    }
}

impl<'s, St> Clone for Autorelease<'s, St>
where
    St: SharedRefCounted<Error = Infallible>,
{
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(guard) => guard,
            Err(never) => match never {},
        }
    }

    /// Give back this guard's claim first, then take one on `source`'s key.
    fn clone_from(&mut self, source: &Self) {
        self.store.release(&self.key);
        let value = match source.store.get(source.key.clone()) {
            Ok(v) => v,
            Err(never) => match never {},
        };
        self.value = value;
        self.key = source.key.clone();
        self.store = source.store;
    }
}

impl<'s, St> Drop for Autorelease<'s, St>
where
    St: SharedRefCounted,
{
    fn drop(&mut self) {
        self.store.release(&self.key);
    }
}

impl<'s, St> fmt::Debug for Autorelease<'s, St>
where
    St: SharedRefCounted,
    St::Key: fmt::Debug,
    St::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autorelease")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}
