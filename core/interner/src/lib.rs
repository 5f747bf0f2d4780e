//! A small string interner used to give `JsString` cheap equality and
//! hashing for property-key lookups.
//!
//! Every distinct string gets interned at most once per [`Interner`]; after
//! that, comparing two interned strings for equality is a `u32` comparison
//! rather than a byte-for-byte scan, which matters on hot paths like
//! `[[Get]]`/`[[Set]]` property lookups and `Map`/`Set` key hashing.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use rustc_hash::FxBuildHasher;
use std::fmt;

/// An interned string's identity. Two `Sym`s are equal iff they were
/// produced by interning the same byte sequence (in the same interner, for
/// per-`Interner` ids; see [`Sym::common`] for ids that are stable across
/// every interner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sym(u32);

static_assertions::assert_eq_size!(Sym, u32);

impl Sym {
    fn from_index(index: usize) -> Self {
        Sym(u32::try_from(index).expect("interner exceeded u32::MAX entries"))
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Strings interned ahead of time, in a fixed order, so that
/// `Sym::common(CommonSym::Length)` resolves to the same id no matter which
/// `Interner` is asked, without a lookup.
macro_rules! common_strings {
    ($($name:ident => $text:literal),* $(,)?) => {
        /// Property keys and other strings that appear often enough in the
        /// object model (`length`, `prototype`, `constructor`, the
        /// `Symbol.*` well-known names, ...) to be interned once, globally,
        /// rather than per-`Interner`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[allow(missing_docs)]
        pub enum CommonSym {
            $($name),*
        }

        impl CommonSym {
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(CommonSym::$name => $text),*
                }
            }

            const ALL: &'static [&'static str] = &[$($text),*];
        }
    };
}

common_strings! {
    Length => "length",
    Name => "name",
    Prototype => "prototype",
    Constructor => "constructor",
    Message => "message",
    Value => "value",
    Writable => "writable",
    Enumerable => "enumerable",
    Configurable => "configurable",
    Get => "get",
    Set => "set",
    Done => "done",
    Next => "next",
    ToString => "toString",
    ValueOf => "valueOf",
    Size => "size",
    Caller => "caller",
    Callee => "callee",
    BoundPrefix => "bound ",
}

/// The common strings, interned once at process start, shared read-only by
/// every [`Interner`] so their `Sym` ids never need recomputing per `Context`.
static COMMON: Lazy<Vec<Box<str>>> = Lazy::new(|| {
    CommonSym::ALL.iter().map(|s| (*s).into()).collect()
});

impl Sym {
    /// The stable, process-wide id for one of the pre-interned common
    /// strings. Valid against *any* [`Interner`] created with
    /// [`Interner::new`].
    pub fn common(which: CommonSym) -> Self {
        Sym::from_index(which as usize)
    }
}

/// A string interner. Each `Context` owns exactly one.
pub struct Interner {
    strings: IndexSet<Box<str>, FxBuildHasher>,
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner")
            .field("len", &self.strings.len())
            .finish()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    /// Creates an interner pre-seeded with the common strings, so
    /// [`Sym::common`] ids line up across every interner instance.
    pub fn new() -> Self {
        let mut strings = IndexSet::with_hasher(FxBuildHasher::default());
        for s in COMMON.iter() {
            strings.insert(s.clone());
        }
        Interner { strings }
    }

    /// Interns `text`, returning its `Sym`. Interning the same text twice
    /// returns the same `Sym`.
    pub fn get_or_intern(&mut self, text: &str) -> Sym {
        if let Some(index) = self.strings.get_index_of(text) {
            return Sym::from_index(index);
        }
        let (index, _inserted) = self.strings.insert_full(text.into());
        Sym::from_index(index)
    }

    /// Resolves a `Sym` back to its text. Panics if `sym` was not produced
    /// by this interner (or by `Sym::common` against a *different*
    /// interner instance, which is a programmer error).
    pub fn resolve(&self, sym: Sym) -> &str {
        self.strings
            .get_index(sym.index())
            .expect("Sym not present in this Interner")
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_text_yields_same_sym() {
        let mut i = Interner::new();
        let a = i.get_or_intern("hello");
        let b = i.get_or_intern("hello");
        assert_eq!(a, b);
        assert_eq!(i.resolve(a), "hello");
    }

    #[test]
    fn common_syms_are_stable_across_interners() {
        let a = Interner::new();
        let b = Interner::new();
        let sym = Sym::common(CommonSym::Length);
        assert_eq!(a.resolve(sym), "length");
        assert_eq!(b.resolve(sym), "length");
    }

    #[test]
    fn distinct_text_yields_distinct_syms() {
        let mut i = Interner::new();
        let a = i.get_or_intern("foo");
        let b = i.get_or_intern("bar");
        assert_ne!(a, b);
    }
}
