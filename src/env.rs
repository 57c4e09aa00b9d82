// ABOUTME: Scope chains for variable bindings

use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct Variable {
    pub mutable: bool,
    pub identifier: String,
    pub value: Option<Value>,
}

/// A lexical variable-binding frame. Scopes form a parent-chain mirroring block nesting and
/// reset (`parent = None`) at function-call boundaries. `value_expected` is inherited from the
/// containing function-call site and governs what `Return` means to every block nested inside.
#[derive(Debug)]
pub struct Scope {
    variables: Vec<Variable>,
    parent: Option<Rc<RefCell<Scope>>>,
    pub value_expected: bool,
}

pub type ScopeRef = Rc<RefCell<Scope>>;

impl Scope {
    /// A fresh root scope, as created at every function-call entry.
    pub fn root(value_expected: bool) -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            variables: Vec::new(),
            parent: None,
            value_expected,
        }))
    }

    /// A nested scope, as created at every block entry. Inherits `value_expected` from `parent`.
    pub fn child(parent: &ScopeRef) -> ScopeRef {
        let value_expected = parent.borrow().value_expected;
        Rc::new(RefCell::new(Scope {
            variables: Vec::new(),
            parent: Some(Rc::clone(parent)),
            value_expected,
        }))
    }

    /// Whether a variable of this name is visible anywhere in the chain from `scope` outward.
    /// Declaration must check this across the *entire* chain, not just the innermost scope.
    pub fn is_declared(scope: &ScopeRef, name: &str) -> bool {
        let here = scope.borrow();
        if here.variables.iter().any(|v| v.identifier == name) {
            return true;
        }
        match &here.parent {
            Some(parent) => {
                let parent = Rc::clone(parent);
                drop(here);
                Scope::is_declared(&parent, name)
            }
            None => false,
        }
    }

    /// Inserts a new variable into `scope` itself (never a parent). Callers are responsible for
    /// having already rejected redeclarations via `is_declared`.
    pub fn declare(scope: &ScopeRef, mutable: bool, identifier: String, value: Option<Value>) {
        scope.borrow_mut().variables.push(Variable {
            mutable,
            identifier,
            value,
        });
    }

    /// Looks up a variable's current value, walking from `scope` outward. `None` distinguishes
    /// both "not found" and "declared but never initialized" — callers combine this with
    /// `is_declared` when they need to tell those two apart.
    pub fn get(scope: &ScopeRef, name: &str) -> Option<Value> {
        let here = scope.borrow();
        if let Some(v) = here.variables.iter().rev().find(|v| v.identifier == name) {
            return v.value.clone();
        }
        let parent = here.parent.clone();
        drop(here);
        parent.and_then(|p| Scope::get(&p, name))
    }

    /// Whether `name` is declared and, if so, whether it is mutable.
    pub fn mutability(scope: &ScopeRef, name: &str) -> Option<bool> {
        let here = scope.borrow();
        if let Some(v) = here.variables.iter().rev().find(|v| v.identifier == name) {
            return Some(v.mutable);
        }
        let parent = here.parent.clone();
        drop(here);
        parent.and_then(|p| Scope::mutability(&p, name))
    }

    /// Replaces the current value of an existing variable, walking outward. Returns `false` if
    /// no variable of this name was found anywhere in the chain.
    pub fn assign(scope: &ScopeRef, name: &str, value: Value) -> bool {
        {
            let mut here = scope.borrow_mut();
            if let Some(v) = here
                .variables
                .iter_mut()
                .rev()
                .find(|v| v.identifier == name)
            {
                v.value = Some(value);
                return true;
            }
        }
        let parent = scope.borrow().parent.clone();
        match parent {
            Some(parent) => Scope::assign(&parent, name, value),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_and_get() {
        let scope = Scope::root(false);
        Scope::declare(&scope, false, "x".to_string(), Some(Value::Int(42)));
        assert!(matches!(Scope::get(&scope, "x"), Some(Value::Int(42))));
    }

    #[test]
    fn undeclared_variable_is_none() {
        let scope = Scope::root(false);
        assert!(Scope::get(&scope, "missing").is_none());
    }

    #[test]
    fn is_declared_sees_parent_chain() {
        let parent = Scope::root(false);
        Scope::declare(&parent, false, "x".to_string(), Some(Value::Int(1)));
        let child = Scope::child(&parent);
        assert!(Scope::is_declared(&child, "x"));
    }

    #[test]
    fn child_scope_cannot_shadow_parent_variable() {
        // Unlike a permissive environment, this scope model treats a name declared anywhere
        // in the visible chain as already taken: shadowing is rejected, not allowed.
        let parent = Scope::root(false);
        Scope::declare(&parent, false, "x".to_string(), Some(Value::Int(1)));
        let child = Scope::child(&parent);
        assert!(Scope::is_declared(&child, "x"));
        // A real interpreter would refuse to declare "x" again in `child` because of this.
    }

    #[test]
    fn get_walks_multiple_levels() {
        let grandparent = Scope::root(false);
        Scope::declare(&grandparent, false, "a".to_string(), Some(Value::Int(1)));
        let parent = Scope::child(&grandparent);
        Scope::declare(&parent, false, "b".to_string(), Some(Value::Int(2)));
        let child = Scope::child(&parent);
        Scope::declare(&child, false, "c".to_string(), Some(Value::Int(3)));

        assert!(matches!(Scope::get(&child, "a"), Some(Value::Int(1))));
        assert!(matches!(Scope::get(&child, "b"), Some(Value::Int(2))));
        assert!(matches!(Scope::get(&child, "c"), Some(Value::Int(3))));
    }

    #[test]
    fn assign_requires_mutable_flag_checked_separately() {
        let scope = Scope::root(false);
        Scope::declare(&scope, false, "a".to_string(), Some(Value::Int(1)));
        assert_eq!(Scope::mutability(&scope, "a"), Some(false));
        assert!(Scope::assign(&scope, "a", Value::Int(2)));
        assert!(matches!(Scope::get(&scope, "a"), Some(Value::Int(2))));
    }

    #[test]
    fn assign_to_unknown_variable_fails() {
        let scope = Scope::root(false);
        assert!(!Scope::assign(&scope, "missing", Value::Int(1)));
    }

    #[test]
    fn child_inherits_value_expected() {
        let parent = Scope::root(true);
        let child = Scope::child(&parent);
        assert!(child.borrow().value_expected);
    }
}
