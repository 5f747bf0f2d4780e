//! Engine exceptions: the "thrown value" channel described in §7.
//!
//! A `JsError` is always catchable by user `try`/`catch`; it is distinct
//! from a Rust `panic!`, which signals a host-side invariant violation and
//! is never exposed across the Value API.

use crate::value::JsValue;
use std::fmt;

/// A distinguished thrown value. ECMAScript permits `throw`ing anything, so
/// the general case wraps an arbitrary [`JsValue`]; most errors raised by
/// this core are constructed as a [`JsNativeError`] and converted lazily.
#[derive(Debug, Clone)]
pub struct JsError {
    repr: Repr,
}

#[derive(Debug, Clone)]
enum Repr {
    Native(JsNativeError),
    Value(JsValue),
}

impl JsError {
    /// Wraps an arbitrary thrown value (e.g. `throw 42` or `throw "oops"`).
    pub fn from_value(value: JsValue) -> Self {
        JsError {
            repr: Repr::Value(value),
        }
    }

    /// Returns the thrown value as a plain [`JsValue`]. For a
    /// [`JsNativeError`], this requires the Evaluator's globally-bound Error
    /// constructors (§6.3) to materialize an actual `Error` instance, so the
    /// core only exposes the native error's fields here; the Evaluator is
    /// responsible for the final `instanceof`-observable conversion.
    pub fn as_native(&self) -> Option<&JsNativeError> {
        match &self.repr {
            Repr::Native(e) => Some(e),
            Repr::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&JsValue> {
        match &self.repr {
            Repr::Value(v) => Some(v),
            Repr::Native(_) => None,
        }
    }

    /// Materializes this error as a concrete thrown value: a pre-built
    /// `Value(...)` passes through unchanged; a `JsNativeError` becomes a
    /// fresh `Error`-kind object wired to the realm's `Error.prototype`
    /// (§6.3). Used wherever a [`JsError`] must cross into the Value API,
    /// e.g. settling a rejected `Promise`.
    pub fn into_value(self, context: &mut crate::context::Context) -> JsValue {
        match self.repr {
            Repr::Value(v) => v,
            Repr::Native(native) => {
                let name = native.kind.to_string();
                let message = native.message.clone();
                let cause = native.cause.map(|c| (*c).into_value(context));
                let proto = context.intrinsics().error_prototype.clone();
                let obj = crate::object::misc::new_error_object(
                    crate::string::JsString::from(name.as_str()),
                    crate::string::JsString::from(message.as_str()),
                    cause,
                    Some(proto),
                );
                JsValue::object(obj)
            }
        }
    }
}

impl From<JsNativeError> for JsError {
    fn from(native: JsNativeError) -> Self {
        JsError {
            repr: Repr::Native(native),
        }
    }
}

impl fmt::Display for JsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Native(e) => e.fmt(f),
            Repr::Value(v) => write!(f, "uncaught exception: {v:?}"),
        }
    }
}

impl std::error::Error for JsError {}

/// The taxonomy of errors raised directly by the core (§6.3, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum JsNativeErrorKind {
    #[error("TypeError")]
    Type,
    #[error("RangeError")]
    Range,
    #[error("ReferenceError")]
    Reference,
    #[error("SyntaxError")]
    Syntax,
    #[error("URIError")]
    Uri,
    #[error("AggregateError")]
    Aggregate,
    #[error("Error")]
    Error,
}

/// A structured, cheap-to-construct error: a kind, a message, an optional
/// cause, and (for `AggregateError` only) the list of contained errors.
#[derive(Debug, Clone)]
pub struct JsNativeError {
    kind: JsNativeErrorKind,
    message: String,
    cause: Option<Box<JsError>>,
    errors: Vec<JsValue>,
}

impl fmt::Display for JsNativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for JsNativeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_deref().map(|e| e as &dyn std::error::Error)
    }
}

impl JsNativeError {
    fn new(kind: JsNativeErrorKind) -> Self {
        JsNativeError {
            kind,
            message: String::new(),
            cause: None,
            errors: Vec::new(),
        }
    }

    pub fn typ() -> Self {
        Self::new(JsNativeErrorKind::Type)
    }
    pub fn range() -> Self {
        Self::new(JsNativeErrorKind::Range)
    }
    pub fn reference() -> Self {
        Self::new(JsNativeErrorKind::Reference)
    }
    pub fn syntax() -> Self {
        Self::new(JsNativeErrorKind::Syntax)
    }
    pub fn uri() -> Self {
        Self::new(JsNativeErrorKind::Uri)
    }
    pub fn error() -> Self {
        Self::new(JsNativeErrorKind::Error)
    }

    /// Builds an `AggregateError` carrying every reason from a rejected
    /// `Promise.any`.
    pub fn aggregate(errors: Vec<JsValue>) -> Self {
        JsNativeError {
            kind: JsNativeErrorKind::Aggregate,
            message: "all promises were rejected".into(),
            cause: None,
            errors,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn with_cause(mut self, cause: JsError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn kind(&self) -> JsNativeErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn errors(&self) -> &[JsValue] {
        &self.errors
    }
}

/// Result type for every fallible Value-API operation.
pub type JsResult<T> = Result<T, JsError>;
