//! Creator and deleter callbacks.
//!
//! A store owns one creator and one deleter. The creator builds a payload
//! from the key on a lookup miss; the deleter disposes of a payload when
//! its slot is removed. Both are plain traits so closures, unit structs,
//! and stateful objects all plug in the same way.

use core::convert::Infallible;
use core::fmt;
use core::marker::PhantomData;

/// Builds the payload for a key that is not loaded yet.
pub trait Create<K, V> {
    type Error;

    fn create(&mut self, key: &K) -> Result<V, Self::Error>;
}

/// Disposes of a payload whose slot has just been removed.
///
/// Deleters are expected not to panic. If one does, the slot is already
/// unlinked and the store stays consistent, but the payload is dropped
/// during unwinding.
pub trait Delete<K, V> {
    fn delete(&mut self, key: &K, value: V);
}

/// Default creator: direct construction of `V` from a clone of the key.
#[derive(Copy, Clone, Debug, Default)]
pub struct FromKey;

impl<K, V> Create<K, V> for FromKey
where
    K: Clone,
    V: From<K>,
{
    type Error = Infallible;

    #[inline]
    fn create(&mut self, key: &K) -> Result<V, Infallible> {
        Ok(V::from(key.clone()))
    }
}

/// Default deleter: drops the payload and does nothing else.
#[derive(Copy, Clone, Debug, Default)]
pub struct Noop;

impl<K, V> Delete<K, V> for Noop {
    #[inline]
    fn delete(&mut self, _key: &K, _value: V) {}
}

impl<K, V, F> Delete<K, V> for F
where
    F: FnMut(&K, V),
{
    #[inline]
    fn delete(&mut self, key: &K, value: V) {
        self(key, value)
    }
}

/// Creator backed by an infallible closure. See [`from_fn`].
pub struct FromFn<F>(F);

/// Creator backed by a fallible closure. See [`try_from_fn`].
pub struct TryFromFn<F, E> {
    f: F,
    _err: PhantomData<fn() -> E>,
}

/// Wrap an infallible `FnMut(&K) -> V` as a creator.
pub fn from_fn<K, V, F>(f: F) -> FromFn<F>
where
    F: FnMut(&K) -> V,
{
    FromFn(f)
}

/// Wrap a fallible `FnMut(&K) -> Result<V, E>` as a creator. Its errors
/// reach the caller of `get` unchanged.
pub fn try_from_fn<K, V, E, F>(f: F) -> TryFromFn<F, E>
where
    F: FnMut(&K) -> Result<V, E>,
{
    TryFromFn {
        f,
        _err: PhantomData,
    }
}

impl<K, V, F> Create<K, V> for FromFn<F>
where
    F: FnMut(&K) -> V,
{
    type Error = Infallible;

    #[inline]
    fn create(&mut self, key: &K) -> Result<V, Infallible> {
        Ok((self.0)(key))
    }
}

impl<K, V, E, F> Create<K, V> for TryFromFn<F, E>
where
    F: FnMut(&K) -> Result<V, E>,
{
    type Error = E;

    #[inline]
    fn create(&mut self, key: &K) -> Result<V, E> {
        (self.f)(key)
    }
}

impl<F> fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromFn").finish_non_exhaustive()
    }
}

impl<F, E> fmt::Debug for TryFromFn<F, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryFromFn").finish_non_exhaustive()
    }
}
