//! Fast hash collections used for internal membership checks.
//!
//! Public registry maps are ordered (`BTreeMap` / `IndexMap`); this alias is
//! for lookups whose order never escapes.

pub type FxHashSet<T> = rustc_hash::FxHashSet<T>;
