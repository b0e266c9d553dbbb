//! flyweight-cache: a keyed object cache that keeps at most one live value
//! per key, built lazily on first request and disposed of deterministically.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one shared, expensive-to-build value per argument tuple, with
//!   creation and disposal both going through user callbacks.
//! - Layers:
//!   - SlotTable<K, V, S>: structural map with stable generational handles
//!     and precomputed composite-key hashes.
//!   - Flyweight<K, V, C, D, S>: exclusive store. `get` creates on a miss,
//!     `release`/`clear`/drop run the deleter.
//!   - RcFlyweight<K, V, C, D, S>: Flyweight over counted slots; `get` adds
//!     a claim, `release` drops one and deletes at zero.
//!   - SyncFlyweight<St> / LocalFlyweight<St>: `&self` access to any store,
//!     behind one mutex or one `RefCell`.
//!   - Autorelease<'s, St>: a scope-bound claim on a refcounted shared store
//!     that releases on drop.
//!
//! Keys
//! - The key is the argument tuple itself (see `CompositeKey`). Component
//!   hashes are combined in order with the golden-ratio mixer; single
//!   components hash as themselves.
//!
//! Ownership
//! - The exclusive stores return borrows (`&V`), so the borrow checker
//!   rejects use of a value after its slot is released.
//! - The shared wrappers return clones. Use `Arc<T>` payloads to share one
//!   allocation; guards then keep the slot claimed while they live.
//!
//! Removal
//! - A slot is unlinked from the table before its payload reaches the
//!   deleter, so the deleter never runs on an entry that still looks
//!   loaded, and runs exactly once per removal.
//! - Over-release on a refcounted store is clamped: releasing a key that is
//!   not loaded does nothing. `try_release` reports it instead.
//!
//! Concurrency
//! - No internal threads or timers. `SyncFlyweight` serializes every call,
//!   including creator and deleter runs; there is no per-key locking.
//!
//! ```
//! use flyweight_cache::{LocalFlyweight, RcFlyweight};
//!
//! let rc: LocalFlyweight<RcFlyweight<&str, String>> = LocalFlyweight::default();
//! rc.get("a").unwrap();
//! {
//!     let guard = rc.get_autorelease("a").unwrap();
//!     assert_eq!(guard.as_str(), "a");
//!     assert_eq!(rc.reference_count(&"a"), 2);
//! }
//! assert_eq!(rc.reference_count(&"a"), 1);
//! ```

pub mod autorelease;
pub mod builder;
pub mod callbacks;
pub mod error;
pub mod key;
mod rc_store;
mod shared;
mod slot_table;
#[cfg(test)]
mod slot_table_proptest;
mod store;

// Public surface
pub use autorelease::{Autorelease, SharedRefCounted, SharedStore};
pub use builder::Builder;
pub use callbacks::{from_fn, try_from_fn, Create, Delete, FromKey, Noop};
pub use error::ReleaseError;
pub use key::{hash_combine, CompositeKey};
pub use rc_store::{RcFlyweight, RefCounted};
pub use shared::{LocalFlyweight, SyncFlyweight};
pub use store::{Flyweight, Store};
