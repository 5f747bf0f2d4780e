//! The `String` runtime value, used both as a `JsValue::String` payload and
//! as the string half of a [`crate::property::PropertyKey`].

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// A cheaply-clonable, immutable JavaScript string.
///
/// Content equality (not pointer equality) is what ECMAScript string
/// equality means, so `PartialEq`/`Hash` compare bytes; [`JsString::ptr_eq`]
/// is available separately for callers (e.g. `well_known_strings` caches)
/// that want to short-circuit the common case of comparing two handles to
/// the same interned allocation.
#[derive(Debug, Clone, Eq)]
pub struct JsString(Rc<str>);

impl JsString {
    pub fn new(s: impl Into<Rc<str>>) -> Self {
        JsString(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub fn len_utf16(&self) -> usize {
        self.0.encode_utf16().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for JsString {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl PartialEq for JsString {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || self.0 == other.0
    }
}

impl std::hash::Hash for JsString {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (*self.0).hash(state);
    }
}

impl PartialOrd for JsString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for JsString {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        JsString(Rc::from(s))
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString(Rc::from(s.as_str()))
    }
}

/// Builds a [`JsString`] without an intermediate allocation for literals,
/// mirroring this codebase's `js_string!` convenience macro.
#[macro_export]
macro_rules! js_string {
    ($s:expr) => {
        $crate::string::JsString::from($s)
    };
}
