//! Fx hash aliases and content hashing.
//!
//! Maps keyed by export names and paths use the Fx hash from `rustc-hash`.
//! Anything whose iteration order reaches generated output must go through
//! a `BTreeMap` or an explicit sort instead; Fx maps are lookup-only.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Computes the 64-bit Fx hash of a module's text.
///
/// Used as the analysis cache key: a file is re-parsed only when its hash
/// changes between passes.
///
/// # Examples
///
/// ```
/// use barrel_core::content_hash;
///
/// assert_eq!(content_hash("export const a = 1;"), content_hash("export const a = 1;"));
/// assert_ne!(content_hash("export const a = 1;"), content_hash("export const a = 2;"));
/// ```
#[must_use]
pub fn content_hash(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}
