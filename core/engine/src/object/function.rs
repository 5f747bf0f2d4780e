//! Component D: function and class objects (§6).
//!
//! Scripted bodies and class constructors never run inside this crate —
//! they're handed to the [`crate::context::Evaluator`] the embedder installs.
//! Native functions are plain Rust closures and are invoked directly.

use crate::context::Context;
use crate::error::JsResult;
use crate::object::JsObject;
use crate::value::JsValue;
use std::rc::Rc;

pub type NativeFn = Rc<dyn Fn(&JsValue, &[JsValue], &mut Context) -> JsResult<JsValue>>;

/// A function object's behavior (§6.2): either a native Rust closure, a
/// scripted body delegated to the `Evaluator`, or a bound wrapper.
pub enum FunctionData {
    Native {
        name: String,
        length: u32,
        func: NativeFn,
        constructor: bool,
    },
    Scripted {
        name: String,
        length: u32,
        handle: crate::context::ScriptedHandle,
        constructor: bool,
        this_mode: ThisMode,
    },
    Bound {
        target: JsObject,
        bound_this: JsValue,
        bound_args: Vec<JsValue>,
    },
}

/// Whether calling a function without a receiver binds `this` to
/// `undefined` (strict) or the global object (sloppy) — resolved once at
/// creation time since this crate has no per-call strict-mode tracking of
/// its own (that lives with the `Evaluator`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThisMode {
    Strict,
    Global,
    Lexical,
}

impl FunctionData {
    pub fn native(name: impl Into<String>, length: u32, func: NativeFn) -> Self {
        FunctionData::Native {
            name: name.into(),
            length,
            func,
            constructor: false,
        }
    }

    pub fn native_constructor(name: impl Into<String>, length: u32, func: NativeFn) -> Self {
        FunctionData::Native {
            name: name.into(),
            length,
            func,
            constructor: true,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FunctionData::Native { name, .. } | FunctionData::Scripted { name, .. } => name,
            FunctionData::Bound { target, .. } => {
                // `bound ` prefix is conventionally attached at construction
                // time on the object's own `name` property, not here.
                let _ = target;
                ""
            }
        }
    }

    pub fn length(&self) -> u32 {
        match self {
            FunctionData::Native { length, .. } | FunctionData::Scripted { length, .. } => *length,
            FunctionData::Bound { target, bound_args, .. } => {
                target.borrow().kind.as_function().map(FunctionData::length).unwrap_or(0)
                    .saturating_sub(bound_args.len() as u32)
            }
        }
    }

    pub fn is_constructor(&self) -> bool {
        match self {
            FunctionData::Native { constructor, .. } => *constructor,
            FunctionData::Scripted { constructor, .. } => *constructor,
            FunctionData::Bound { target, .. } => target.is_constructor(),
        }
    }

    /// Whether this function is a "strict function" for the purposes of the
    /// `.caller`/`.callee` poison pill (§4.D): scripted functions resolved
    /// to strict `this`-binding, and bound functions forwarding to one.
    fn is_strict(&self) -> bool {
        match self {
            FunctionData::Scripted { this_mode, .. } => *this_mode == ThisMode::Strict,
            FunctionData::Native { .. } => false,
            FunctionData::Bound { target, .. } => target
                .borrow()
                .kind
                .as_function()
                .map(FunctionData::is_strict)
                .unwrap_or(false),
        }
    }
}

/// `Function.prototype.caller`'s accessor (§4.D): `TypeError` on a strict
/// function or when called from strict-mode code, otherwise the function
/// that's currently calling `func` (or `null` if there is none), sourced
/// from the embedder's `Evaluator` since this crate keeps no call stack.
pub fn caller_accessor(func: &JsObject, context: &mut Context) -> JsResult<JsValue> {
    let is_strict = match &func.borrow().kind {
        crate::object::ObjectKind::Function(f) => f.is_strict(),
        crate::object::ObjectKind::Class(_) => true,
        _ => false,
    };
    if is_strict || context.current_strict_mode() {
        return Err(crate::error::JsNativeError::typ()
            .with_message("'caller' is restricted on strict-mode functions")
            .into());
    }
    Ok(context
        .current_caller(func)
        .map(JsValue::object)
        .unwrap_or_else(JsValue::null))
}

/// The shared poison-pill accessor (§4.D, the `%ThrowTypeError%` role):
/// calling it always throws `TypeError`. Installed as both getter and
/// setter of a strict-mode `arguments` object's `.callee`.
pub fn throw_type_error_accessor(message: &'static str) -> JsValue {
    JsValue::object(JsObject::from_data(
        None,
        crate::object::ObjectKind::Function(FunctionData::native(
            "",
            0,
            Rc::new(move |_this, _args, _ctx| {
                Err(crate::error::JsNativeError::typ().with_message(message).into())
            }),
        )),
    ))
}

impl crate::object::ObjectKind {
    pub(crate) fn as_function(&self) -> Option<&FunctionData> {
        match self {
            crate::object::ObjectKind::Function(f) => Some(f),
            _ => None,
        }
    }
}

/// `[[Call]]` (§6.2): native functions run directly; scripted bodies and
/// bound-function forwarding go through the context.
pub fn call(obj: &JsObject, this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let data = match &obj.borrow().kind {
        crate::object::ObjectKind::Function(f) => clone_shape(f),
        crate::object::ObjectKind::Class(_) => {
            return Err(crate::error::JsNativeError::typ()
                .with_message("class constructor cannot be invoked without 'new'")
                .into());
        }
        _ => {
            return Err(crate::error::JsNativeError::typ()
                .with_message("value is not callable")
                .into());
        }
    };
    match data {
        Shape::Native { func, .. } => func(this, args, context),
        Shape::Scripted { handle, .. } => context.call_scripted(&handle, obj, this, args),
        Shape::Bound { target, bound_this, mut bound_args } => {
            bound_args.extend_from_slice(args);
            call(&target, &bound_this, &bound_args, context)
        }
    }
}

/// `[[Construct]]` (§6.2) with an explicit `new.target`, driving class
/// hierarchies through their base-class chain via the `Evaluator`.
pub fn construct(
    obj: &JsObject,
    args: &[JsValue],
    new_target: &JsObject,
    context: &mut Context,
) -> JsResult<JsObject> {
    if !obj.is_constructor() {
        return Err(crate::error::JsNativeError::typ()
            .with_message("value is not a constructor")
            .into());
    }
    match &obj.borrow().kind {
        crate::object::ObjectKind::Function(FunctionData::Native { func, .. }) => {
            let result = func(&JsValue::undefined(), args, context)?;
            result.as_object().cloned().ok_or_else(|| {
                crate::error::JsNativeError::typ()
                    .with_message("native constructor did not return an object")
                    .into()
            })
        }
        crate::object::ObjectKind::Function(FunctionData::Scripted { handle, .. }) => {
            let handle = handle.clone();
            context.construct_scripted(&handle, obj, args, new_target)
        }
        crate::object::ObjectKind::Function(FunctionData::Bound { target, bound_args, .. }) => {
            let target = target.clone();
            let mut all_args = bound_args.clone();
            all_args.extend_from_slice(args);
            construct(&target, &all_args, new_target, context)
        }
        crate::object::ObjectKind::Class(class) => {
            let class = class.clone_shape();
            context.construct_class(&class, obj, args, new_target)
        }
        _ => unreachable!("is_constructor() guards this"),
    }
}

enum Shape {
    Native {
        func: NativeFn,
    },
    Scripted {
        handle: crate::context::ScriptedHandle,
    },
    Bound {
        target: JsObject,
        bound_this: JsValue,
        bound_args: Vec<JsValue>,
    },
}

fn clone_shape(f: &FunctionData) -> Shape {
    match f {
        FunctionData::Native { func, .. } => Shape::Native { func: func.clone() },
        FunctionData::Scripted { handle, .. } => Shape::Scripted { handle: handle.clone() },
        FunctionData::Bound { target, bound_this, bound_args } => Shape::Bound {
            target: target.clone(),
            bound_this: bound_this.clone(),
            bound_args: bound_args.clone(),
        },
    }
}

pub fn bind(target: JsObject, bound_this: JsValue, bound_args: Vec<JsValue>, proto: Option<JsObject>) -> JsObject {
    JsObject::from_data(
        proto,
        crate::object::ObjectKind::Function(FunctionData::Bound {
            target,
            bound_this,
            bound_args,
        }),
    )
}

/// A class's layout (§6.3): its base, its constructor body, and the method
/// tables split by instance/static and public/private, plus static field
/// initializers run once at class-evaluation time by the `Evaluator`.
pub struct ClassData {
    pub base: Option<JsObject>,
    pub constructor: crate::context::ScriptedHandle,
    pub prototype: JsObject,
    pub instance_methods: Vec<(crate::property::PropertyKey, JsValue)>,
    pub static_methods: Vec<(crate::property::PropertyKey, JsValue)>,
    pub private_instance_methods: Vec<(String, JsValue)>,
    pub instance_fields: Vec<(crate::property::PropertyKey, crate::context::ScriptedHandle)>,
    pub private_instance_fields: Vec<(String, crate::context::ScriptedHandle)>,
}

impl ClassData {
    fn clone_shape(&self) -> ClassData {
        ClassData {
            base: self.base.clone(),
            constructor: self.constructor.clone(),
            prototype: self.prototype.clone(),
            instance_methods: self.instance_methods.clone(),
            static_methods: self.static_methods.clone(),
            private_instance_methods: self.private_instance_methods.clone(),
            instance_fields: self.instance_fields.clone(),
            private_instance_fields: self.private_instance_fields.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn native_function_call_roundtrip() {
        let mut context = Context::default();
        let f = JsObject::from_data(
            None,
            crate::object::ObjectKind::Function(FunctionData::native(
                "identity",
                1,
                Rc::new(|_this, args, _ctx| Ok(args.first().cloned().unwrap_or_else(JsValue::undefined))),
            )),
        );
        let result = call(&f, &JsValue::undefined(), &[JsValue::number(42.0)], &mut context).unwrap();
        assert_eq!(result.as_number(), Some(42.0));
    }

    #[test]
    fn bound_function_prepends_args() {
        let mut context = Context::default();
        let sum = JsObject::from_data(
            None,
            crate::object::ObjectKind::Function(FunctionData::native(
                "sum",
                2,
                Rc::new(|_this, args, _ctx| {
                    let total: f64 = args.iter().filter_map(JsValue::as_number).sum();
                    Ok(JsValue::number(total))
                }),
            )),
        );
        let bound = bind(sum, JsValue::undefined(), vec![JsValue::number(10.0)], None);
        let result = call(&bound, &JsValue::undefined(), &[JsValue::number(5.0)], &mut context).unwrap();
        assert_eq!(result.as_number(), Some(15.0));
    }
}
