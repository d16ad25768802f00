//! Variable scopes.
//!
//! Scopes form a parent chain. A scope is shared (`Arc`) because lambdas
//! capture the scope they were created in and may outlive the block that
//! created it; bindings sit behind a mutex so captured variables stay
//! assignable from both sides.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use xtree_ir::{ParamId, Value};

/// Error returned by [`Scope::assign`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignError {
    /// No scope in the chain declares the variable.
    Undefined,
}

#[derive(Debug)]
struct ScopeData {
    bindings: Mutex<FxHashMap<ParamId, Value>>,
    parent: Option<Scope>,
    /// Exception being handled, for catch-clause scopes.
    exception: Option<Value>,
}

/// A lexical scope.
#[derive(Clone, Debug)]
pub struct Scope(Arc<ScopeData>);

impl Scope {
    /// A scope with no parent.
    pub fn root() -> Self {
        Scope::with_parent(None, None)
    }

    fn with_parent(parent: Option<Scope>, exception: Option<Value>) -> Self {
        Scope(Arc::new(ScopeData {
            bindings: Mutex::new(FxHashMap::default()),
            parent,
            exception,
        }))
    }

    /// A nested scope.
    #[must_use]
    pub fn child(&self) -> Self {
        Scope::with_parent(Some(self.clone()), None)
    }

    /// A nested scope for a catch clause handling `exception`.
    #[must_use]
    pub fn child_handling(&self, exception: Value) -> Self {
        Scope::with_parent(Some(self.clone()), Some(exception))
    }

    /// Bind `id` in this scope, shadowing outer bindings.
    pub fn declare(&self, id: ParamId, value: Value) {
        self.0.bindings.lock().insert(id, value);
    }

    pub fn lookup(&self, id: ParamId) -> Option<Value> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(value) = current.0.bindings.lock().get(&id) {
                return Some(value.clone());
            }
            scope = current.0.parent.as_ref();
        }
        None
    }

    /// Overwrite the innermost binding of `id`.
    pub fn assign(&self, id: ParamId, value: Value) -> Result<(), AssignError> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            let mut bindings = current.0.bindings.lock();
            if let Some(slot) = bindings.get_mut(&id) {
                *slot = value;
                return Ok(());
            }
            drop(bindings);
            scope = current.0.parent.as_ref();
        }
        Err(AssignError::Undefined)
    }

    /// The exception handled by the nearest enclosing catch clause.
    pub fn current_exception(&self) -> Option<Value> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(exception) = &current.0.exception {
                return Some(exception.clone());
            }
            scope = current.0.parent.as_ref();
        }
        None
    }
}
