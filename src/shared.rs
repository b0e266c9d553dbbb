//! Shared-access wrappers around any [`Store`].
//!
//! - [`SyncFlyweight`]: one `parking_lot::Mutex` per store, held for the
//!   whole of every operation, creator and deleter calls included. Calls on
//!   one instance are linearizable; a slow creator stalls every other key.
//! - [`LocalFlyweight`]: the same operation set for a single thread, using
//!   `RefCell` so guards and direct calls can interleave without a lock.
//!
//! Both hand out clones of the payload, since a borrow into the map cannot
//! outlive the lock or cell borrow that produced it. Guards are offered
//! only when the wrapped store counts claims.
//!
//! Creators and deleters must not call back into the wrapper that invoked
//! them: `SyncFlyweight` would deadlock and `LocalFlyweight` panics on the
//! nested borrow.

use crate::autorelease::{Autorelease, SharedRefCounted, SharedStore};
use crate::error::ReleaseError;
use crate::rc_store::RefCounted;
use crate::store::Store;
use core::cell::RefCell;
use core::fmt;
use parking_lot::Mutex;

pub struct SyncFlyweight<St> {
    inner: Mutex<St>,
}

impl<St> SyncFlyweight<St>
where
    St: Store,
{
    pub fn new(store: St) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    pub fn into_inner(self) -> St {
        self.inner.into_inner()
    }

    /// Run `f` with the lock held, for sequences that must be atomic as a
    /// whole.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut St) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn get(&self, key: St::Key) -> Result<St::Value, St::Error>
    where
        St::Value: Clone,
    {
        self.inner.lock().get(key).map(Clone::clone)
    }

    pub fn peek(&self, key: &St::Key) -> Option<St::Value>
    where
        St::Value: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    pub fn is_loaded(&self, key: &St::Key) -> bool {
        self.inner.lock().is_loaded(key)
    }

    pub fn release(&self, key: &St::Key) -> bool {
        self.inner.lock().release(key)
    }

    pub fn try_release(&self, key: &St::Key) -> Result<bool, ReleaseError> {
        self.inner.lock().try_release(key)
    }

    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl<St> SyncFlyweight<St>
where
    St: RefCounted,
{
    pub fn reference_count(&self, key: &St::Key) -> i64 {
        self.inner.lock().reference_count(key)
    }

    /// Take a claim on `key` that is released when the guard drops.
    pub fn get_autorelease(&self, key: St::Key) -> Result<Autorelease<'_, Self>, St::Error>
    where
        St::Key: Clone,
        St::Value: Clone,
    {
        Autorelease::acquire(self, key)
    }
}

impl<St> Default for SyncFlyweight<St>
where
    St: Store + Default,
{
    fn default() -> Self {
        Self::new(St::default())
    }
}

impl<St> From<St> for SyncFlyweight<St>
where
    St: Store,
{
    fn from(store: St) -> Self {
        Self::new(store)
    }
}

impl<St> SharedStore for SyncFlyweight<St>
where
    St: Store,
    St::Key: Clone,
    St::Value: Clone,
{
    type Key = St::Key;
    type Value = St::Value;
    type Error = St::Error;

    fn get(&self, key: St::Key) -> Result<St::Value, St::Error> {
        SyncFlyweight::get(self, key)
    }

    fn release(&self, key: &St::Key) -> bool {
        SyncFlyweight::release(self, key)
    }
}

impl<St> SharedRefCounted for SyncFlyweight<St>
where
    St: RefCounted,
    St::Key: Clone,
    St::Value: Clone,
{
    fn reference_count(&self, key: &St::Key) -> i64 {
        SyncFlyweight::reference_count(self, key)
    }
}

impl<St> fmt::Debug for SyncFlyweight<St>
where
    St: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(store) => f.debug_tuple("SyncFlyweight").field(&*store).finish(),
            None => f.write_str("SyncFlyweight(<locked>)"),
        }
    }
}

pub struct LocalFlyweight<St> {
    inner: RefCell<St>,
}

impl<St> LocalFlyweight<St>
where
    St: Store,
{
    pub fn new(store: St) -> Self {
        Self {
            inner: RefCell::new(store),
        }
    }

    pub fn into_inner(self) -> St {
        self.inner.into_inner()
    }

    pub fn with_store<R>(&self, f: impl FnOnce(&mut St) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    pub fn get(&self, key: St::Key) -> Result<St::Value, St::Error>
    where
        St::Value: Clone,
    {
        self.inner.borrow_mut().get(key).map(Clone::clone)
    }

    pub fn peek(&self, key: &St::Key) -> Option<St::Value>
    where
        St::Value: Clone,
    {
        self.inner.borrow().peek(key).cloned()
    }

    pub fn is_loaded(&self, key: &St::Key) -> bool {
        self.inner.borrow().is_loaded(key)
    }

    pub fn release(&self, key: &St::Key) -> bool {
        self.inner.borrow_mut().release(key)
    }

    pub fn try_release(&self, key: &St::Key) -> Result<bool, ReleaseError> {
        self.inner.borrow_mut().try_release(key)
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().clear()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl<St> LocalFlyweight<St>
where
    St: RefCounted,
{
    pub fn reference_count(&self, key: &St::Key) -> i64 {
        self.inner.borrow().reference_count(key)
    }

    /// Take a claim on `key` that is released when the guard drops.
    pub fn get_autorelease(&self, key: St::Key) -> Result<Autorelease<'_, Self>, St::Error>
    where
        St::Key: Clone,
        St::Value: Clone,
    {
        Autorelease::acquire(self, key)
    }
}

impl<St> Default for LocalFlyweight<St>
where
    St: Store + Default,
{
    fn default() -> Self {
        Self::new(St::default())
    }
}

impl<St> From<St> for LocalFlyweight<St>
where
    St: Store,
{
    fn from(store: St) -> Self {
        Self::new(store)
    }
}

impl<St> SharedStore for LocalFlyweight<St>
where
    St: Store,
    St::Key: Clone,
    St::Value: Clone,
{
    type Key = St::Key;
    type Value = St::Value;
    type Error = St::Error;

    fn get(&self, key: St::Key) -> Result<St::Value, St::Error> {
        LocalFlyweight::get(self, key)
    }

    fn release(&self, key: &St::Key) -> bool {
        LocalFlyweight::release(self, key)
    }
}

impl<St> SharedRefCounted for LocalFlyweight<St>
where
    St: RefCounted,
    St::Key: Clone,
    St::Value: Clone,
{
    fn reference_count(&self, key: &St::Key) -> i64 {
        LocalFlyweight::reference_count(self, key)
    }
}

impl<St> fmt::Debug for LocalFlyweight<St>
where
    St: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(store) => f.debug_tuple("LocalFlyweight").field(&*store).finish(),
            Err(_) => f.write_str("LocalFlyweight(<borrowed>)"),
        }
    }
}
