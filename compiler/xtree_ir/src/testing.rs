//! Test doubles for code that builds and evaluates trees.
//!
//! [`Mock`] is a recording host object: every member read and method call is
//! logged so tests can assert on call counts and ordering after a tree has
//! been evaluated. [`FieldMock`] exposes one field and one property holding
//! the same integer.
//!
//! Enabled for this crate's tests and, through the `testing` feature, for
//! downstream crates.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::builtins::{self, disposable};
use crate::handles::{MemberDef, MemberRef, MethodDef, MethodRef};
use crate::ty::{ClassType, Ty};
use crate::value::{HostObject, Thrown, Value};

#[derive(Debug)]
struct MockState {
    calls: Vec<String>,
    string: Value,
    int: i64,
    condition: bool,
    method_result: Result<Value, Thrown>,
}

/// A recording object of class `IMock` (which implements `Disposable`).
///
/// Properties: `String: string`, `Int: int`, `Condition: bool`,
/// `Self: IMock` (the mock itself). Methods: `MethodWithReturn(): string`,
/// `VoidMethodWithParameter(string)`, `VoidMethodWithoutParameters()`,
/// `dispose()`.
#[derive(Debug)]
pub struct Mock {
    me: Weak<Mock>,
    state: Mutex<MockState>,
}

impl Mock {
    pub fn new() -> Arc<Mock> {
        Arc::new_cyclic(|me| Mock {
            me: me.clone(),
            state: Mutex::new(MockState {
                calls: Vec::new(),
                string: Value::str(""),
                int: 0,
                condition: false,
                method_result: Ok(Value::str("")),
            }),
        })
    }

    pub fn class() -> Ty {
        Ty::class(ClassType::interface("IMock").implements(disposable()))
    }

    pub fn string_property() -> MemberRef {
        MemberDef::property("String", Mock::class(), Ty::Str)
    }

    pub fn int_property() -> MemberRef {
        MemberDef::property("Int", Mock::class(), Ty::Int)
    }

    pub fn condition_property() -> MemberRef {
        MemberDef::property("Condition", Mock::class(), Ty::Bool)
    }

    pub fn self_property() -> MemberRef {
        MemberDef::property("Self", Mock::class(), Mock::class())
    }

    pub fn method_with_return() -> MethodRef {
        MethodDef::virtual_method("MethodWithReturn", Mock::class(), Vec::new(), Ty::Str)
    }

    pub fn void_method_with_parameter() -> MethodRef {
        MethodDef::virtual_method(
            "VoidMethodWithParameter",
            Mock::class(),
            vec![Ty::Str],
            Ty::Void,
        )
    }

    pub fn void_method_without_parameters() -> MethodRef {
        MethodDef::virtual_method(
            "VoidMethodWithoutParameters",
            Mock::class(),
            Vec::new(),
            Ty::Void,
        )
    }

    /// The mock as a runtime value.
    pub fn value(self: &Arc<Self>) -> Value {
        Value::Object(self.clone())
    }

    pub fn set_string(&self, value: &str) {
        self.state.lock().string = Value::str(value);
    }

    pub fn set_int(&self, value: i64) {
        self.state.lock().int = value;
    }

    pub fn set_condition(&self, value: bool) {
        self.state.lock().condition = value;
    }

    /// Make `MethodWithReturn` return `value`.
    pub fn returns(&self, value: &str) {
        self.state.lock().method_result = Ok(Value::str(value));
    }

    /// Make `MethodWithReturn` throw.
    pub fn throws(&self, error: Thrown) {
        self.state.lock().method_result = Err(error);
    }

    /// Every recorded interaction, oldest first. Property reads are logged
    /// as the bare name, calls as `Name(args)`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// How many times `member` was read or called.
    pub fn received(&self, member: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| {
                call.as_str() == member
                    || call
                        .strip_prefix(member)
                        .is_some_and(|rest| rest.starts_with('('))
            })
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }
}

impl HostObject for Mock {
    fn class(&self) -> Ty {
        Mock::class()
    }

    fn get(&self, member: &str) -> Result<Value, Thrown> {
        let mut state = self.state.lock();
        state.calls.push(member.to_owned());
        match member {
            "String" => Ok(state.string.clone()),
            "Int" => Ok(Value::Int(state.int)),
            "Condition" => Ok(Value::Bool(state.condition)),
            "Self" => Ok(self
                .me
                .upgrade()
                .map_or(Value::Null, |me| Value::Object(me))),
            _ => Err(builtins::missing_member(&Mock::class(), member)),
        }
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, Thrown> {
        let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
        let mut state = self.state.lock();
        state.calls.push(format!("{method}({})", rendered.join(", ")));
        match method {
            "MethodWithReturn" => state.method_result.clone(),
            "VoidMethodWithParameter" | "VoidMethodWithoutParameters" | "dispose" => {
                Ok(Value::Void)
            }
            _ => Err(builtins::missing_member(&Mock::class(), method)),
        }
    }
}

/// An object of class `MockWithField` with a `Value` field and a
/// `ValueProperty` property, both holding the constructor argument.
#[derive(Debug)]
pub struct FieldMock {
    value: i64,
}

impl FieldMock {
    pub fn new(value: i64) -> Self {
        FieldMock { value }
    }

    pub fn class() -> Ty {
        Ty::class(ClassType::new("MockWithField"))
    }

    pub fn value_field() -> MemberRef {
        MemberDef::field("Value", FieldMock::class(), Ty::Int)
    }

    pub fn value_property() -> MemberRef {
        MemberDef::property("ValueProperty", FieldMock::class(), Ty::Int)
    }
}

impl HostObject for FieldMock {
    fn class(&self) -> Ty {
        FieldMock::class()
    }

    fn get(&self, member: &str) -> Result<Value, Thrown> {
        match member {
            "Value" | "ValueProperty" => Ok(Value::Int(self.value)),
            _ => Err(builtins::missing_member(&FieldMock::class(), member)),
        }
    }
}
