//! A value-and-object runtime core for a tree-walking ECMAScript
//! interpreter: the data model, property semantics, and built-in exotic
//! objects, with no parser or AST-walker of its own. An embedder supplies
//! those by implementing [`context::Evaluator`].

pub mod bigint;
pub mod context;
pub mod error;
pub mod object;
pub mod property;
pub mod reflect;
pub mod string;
pub mod symbol;
pub mod value;

pub use bigint::JsBigInt;
pub use context::Context;
pub use error::{JsError, JsNativeError, JsNativeErrorKind, JsResult};
pub use object::JsObject;
pub use property::{Attribute, PartialDescriptor, PropertyDescriptor, PropertyKey};
pub use string::JsString;
pub use symbol::JsSymbol;
pub use value::JsValue;
