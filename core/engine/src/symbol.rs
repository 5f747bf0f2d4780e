//! `Symbol` primitive values: process-unique identities with an optional
//! description, used both as `JsValue::Symbol` payloads and as the symbol
//! half of a [`crate::property::PropertyKey`].

use crate::string::JsString;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

thread_local! {
    static NEXT_ID: Cell<u64> = const { Cell::new(1) };
}

fn next_id() -> u64 {
    NEXT_ID.with(|c| {
        let id = c.get();
        c.set(id + 1);
        id
    })
}

#[derive(Debug)]
struct Inner {
    id: u64,
    description: Option<JsString>,
}

/// A `Symbol` value. Cloning shares identity (`JsSymbol` is a handle, like
/// `JsObject`); two symbols are equal iff they are the same allocation,
/// never by description text.
#[derive(Debug, Clone)]
pub struct JsSymbol(Rc<Inner>);

impl JsSymbol {
    pub fn new(description: Option<JsString>) -> Self {
        JsSymbol(Rc::new(Inner {
            id: next_id(),
            description,
        }))
    }

    pub fn description(&self) -> Option<&JsString> {
        self.0.description.as_ref()
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }
}

impl PartialEq for JsSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}
impl Eq for JsSymbol {}

impl std::hash::Hash for JsSymbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Display for JsSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Symbol({})",
            self.description().map(JsString::as_str).unwrap_or("")
        )
    }
}

/// Well-known symbols referenced directly by the spec (`Symbol.iterator`,
/// `Symbol.toPrimitive`, `Symbol.isConcatSpreadable`, ...). Allocated once
/// per `Context` realm (see `context::Realm`), never process-wide, so
/// independent `Context`s never share a well-known symbol identity.
#[derive(Debug, Clone)]
pub struct WellKnownSymbols {
    pub iterator: JsSymbol,
    pub to_primitive: JsSymbol,
    pub to_string_tag: JsSymbol,
    pub is_concat_spreadable: JsSymbol,
    pub has_instance: JsSymbol,
}

impl WellKnownSymbols {
    pub fn new() -> Self {
        WellKnownSymbols {
            iterator: JsSymbol::new(Some("Symbol.iterator".into())),
            to_primitive: JsSymbol::new(Some("Symbol.toPrimitive".into())),
            to_string_tag: JsSymbol::new(Some("Symbol.toStringTag".into())),
            is_concat_spreadable: JsSymbol::new(Some("Symbol.isConcatSpreadable".into())),
            has_instance: JsSymbol::new(Some("Symbol.hasInstance".into())),
        }
    }
}

impl Default for WellKnownSymbols {
    fn default() -> Self {
        Self::new()
    }
}
