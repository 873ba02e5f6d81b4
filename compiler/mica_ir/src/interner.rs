//! String interner backing `Name` ids.
//!
//! Interned strings are leaked into `'static` storage so lookups can hand
//! out `&'static str` without holding the lock. A module interns a bounded
//! set of identifiers, so the leak is the arena.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::Name;

/// Shared handle to a `StringInterner`.
pub type SharedInterner = Arc<StringInterner>;

struct Inner {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

/// String interner for identifier storage.
///
/// `intern` is idempotent: the same text always yields the same `Name`.
/// Guarded by an `RwLock` so a module under construction can be shared
/// with query threads.
pub struct StringInterner {
    inner: RwLock<Inner>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned at `Name::EMPTY`.
    pub fn new() -> Self {
        let mut map = FxHashMap::default();
        map.insert("", 0);
        StringInterner {
            inner: RwLock::new(Inner {
                map,
                strings: vec![""],
            }),
        }
    }

    /// Intern a string, returning its `Name`.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&ix) = self.inner.read().map.get(s) {
            return Name::from_raw(ix);
        }
        let mut inner = self.inner.write();
        // Re-check under the write lock: another writer may have interned it.
        if let Some(&ix) = inner.map.get(s) {
            return Name::from_raw(ix);
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let ix = u32::try_from(inner.strings.len()).unwrap_or_else(|_| {
            panic!("interner exceeded u32 capacity ({} strings)", inner.strings.len())
        });
        inner.strings.push(leaked);
        inner.map.insert(leaked, ix);
        Name::from_raw(ix)
    }

    /// Resolve a `Name` back to its text.
    ///
    /// # Panics
    ///
    /// Panics if the `Name` was issued by a different interner.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.inner.read().strings[name.raw() as usize]
    }

    /// Number of interned strings, including the pre-interned empty string.
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Whether the interner holds only the pre-interned empty string.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
