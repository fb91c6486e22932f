/// Scope tracking for local declarations during traversal.
///
/// A stack of scopes keyed by identifier value (verbatim `@` stripped), so
/// `@int` and `int` name the same binding.
///
/// ```rust
/// use refactorkit::visit::scope_tracker::ScopeTracker;
///
/// let mut tracker = ScopeTracker::<&str>::with_initial_scope();
/// tracker.insert("foo", "object");
///
/// tracker.push_scope();
/// tracker.insert("@int", "int");
/// assert_eq!(tracker.lookup("int"), Some(&"int"));
///
/// tracker.pop_scope();
/// assert_eq!(tracker.lookup("int"), None);
/// assert_eq!(tracker.lookup("foo"), Some(&"object"));
/// ```

use crate::parser::ast::ident_value;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ScopeTracker<T> {
    scopes: Vec<HashMap<String, T>>,
}

impl<T> ScopeTracker<T> {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn with_initial_scope() -> Self {
        let mut tracker = Self::new();
        tracker.push_scope();
        tracker
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pop the innermost scope, returning its contents.
    pub fn pop_scope(&mut self) -> Option<HashMap<String, T>> {
        self.scopes.pop()
    }

    /// Bind `name` in the innermost scope, opening one if the stack is empty.
    /// Returns the binding it replaced in that same scope.
    pub fn insert(&mut self, name: &str, value: T) -> Option<T> {
        if self.scopes.is_empty() {
            self.push_scope();
        }
        let key = ident_value(name).to_string();
        self.scopes.last_mut().and_then(|scope| scope.insert(key, value))
    }

    /// Look up a binding, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&T> {
        let key = ident_value(name);
        self.scopes.iter().rev().find_map(|scope| scope.get(key))
    }

    /// Depth (0 = outermost) of the scope that binds `name`.
    pub fn lookup_with_depth(&self, name: &str) -> Option<(&T, usize)> {
        let key = ident_value(name);
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, scope)| scope.get(key).map(|v| (v, i)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

impl<T> Default for ScopeTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}
