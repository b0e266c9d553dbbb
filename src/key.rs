//! Composite keys and order-sensitive hash combination.
//!
//! A flyweight key is the tuple of arguments a value was built from. Each
//! component is hashed on its own with the store's `BuildHasher`, and the
//! component hashes are folded right-to-left with [`hash_combine`]:
//!
//! ```text
//! hash((a, b, c)) = combine(h(a), combine(h(b), h(c)))
//! ```
//!
//! A single-component key hashes to the plain hash of that component, so
//! `("file1",)` and `"file1"` land in the same bucket under the same hasher.

use core::hash::{BuildHasher, Hash};
use std::path::PathBuf;

/// Golden-ratio constant used by [`hash_combine`].
pub const GOLDEN_RATIO: u64 = 0x9e37_79b9;

/// Combine two hash values. Not commutative: `hash_combine(a, b)` and
/// `hash_combine(b, a)` differ for almost all inputs.
#[inline]
pub const fn hash_combine(a: u64, b: u64) -> u64 {
    a ^ b
        .wrapping_add(GOLDEN_RATIO)
        .wrapping_add(a << 6)
        .wrapping_add(a >> 2)
}

/// A key identifying one flyweight slot.
///
/// Equality is the usual pairwise, in-order comparison of components.
/// `key_hash` must agree with it: equal keys produce equal hashes for the
/// same `BuildHasher` state.
pub trait CompositeKey: Eq {
    /// Number of components in the key.
    const ARITY: usize;

    /// Hash this key with `build`, combining component hashes in order.
    fn key_hash<S: BuildHasher>(&self, build: &S) -> u64;
}

macro_rules! single_component_key {
    ($($t:ty),* $(,)?) => {
        $(
            impl CompositeKey for $t {
                const ARITY: usize = 1;

                #[inline]
                fn key_hash<S: BuildHasher>(&self, build: &S) -> u64 {
                    build.hash_one(self)
                }
            }
        )*
    };
}

single_component_key!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char, String,
    Box<str>, PathBuf,
);

impl<'a> CompositeKey for &'a str {
    const ARITY: usize = 1;

    #[inline]
    fn key_hash<S: BuildHasher>(&self, build: &S) -> u64 {
        build.hash_one(self)
    }
}

// Right fold over the component hashes, mirroring the recursive definition
// combine(h(first), hash(rest...)).
macro_rules! fold_hashes {
    ($build:ident, $self:ident; $last:tt) => {
        $build.hash_one(&$self.$last)
    };
    ($build:ident, $self:ident; $head:tt $($rest:tt)+) => {
        hash_combine($build.hash_one(&$self.$head), fold_hashes!($build, $self; $($rest)+))
    };
}

macro_rules! tuple_key {
    ($n:expr => $($name:ident $idx:tt),+) => {
        impl<$($name: Hash + Eq),+> CompositeKey for ($($name,)+) {
            const ARITY: usize = $n;

            #[inline]
            fn key_hash<S: BuildHasher>(&self, build: &S) -> u64 {
                fold_hashes!(build, self; $($idx)+)
            }
        }
    };
}

tuple_key!(1 => A 0);
tuple_key!(2 => A 0, B 1);
tuple_key!(3 => A 0, B 1, C 2);
tuple_key!(4 => A 0, B 1, C 2, D 3);
tuple_key!(5 => A 0, B 1, C 2, D 3, E 4);
tuple_key!(6 => A 0, B 1, C 2, D 3, E 4, F 5);
tuple_key!(7 => A 0, B 1, C 2, D 3, E 4, F 5, G 6);
tuple_key!(8 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
