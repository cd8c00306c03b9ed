//! Lexical scope stack used while checking function bodies.
//!
//! Modeled as an explicit stack of scopes rather than the reference
//! implementation's single process-global pointer (spec.md §9, "Global
//! analyzer tables"): each `Scope` knows its parent index in the stack, and
//! lookups walk up the chain. The root ("global") scope holds function
//! prototypes' visibility and persists for the whole analysis.

use ahash::AHashMap;

use crate::types::Type;

pub struct Scope<'a> {
    bindings: AHashMap<&'a str, &'a Type<'a>>,
    parent: Option<usize>,
}

/// A stack of lexical scopes. Index `0` is the persistent global scope.
pub struct ScopeStack<'a> {
    scopes: Vec<Scope<'a>>,
    current: usize,
}

impl<'a> ScopeStack<'a> {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                bindings: AHashMap::new(),
                parent: None,
            }],
            current: 0,
        }
    }

    /// Pushes a fresh child scope of the current scope and makes it current.
    pub fn push(&mut self) {
        let parent = self.current;
        self.scopes.push(Scope {
            bindings: AHashMap::new(),
            parent: Some(parent),
        });
        self.current = self.scopes.len() - 1;
    }

    /// Pops back to the current scope's parent.
    pub fn pop(&mut self) {
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    /// Binds `name` to `ty` in the current scope, without checking for a
    /// prior binding (callers that need "already declared" diagnostics do
    /// that check via [`is_declared_in_current_scope`](Self::is_declared_in_current_scope)
    /// first).
    pub fn bind(&mut self, name: &'a str, ty: &'a Type<'a>) {
        self.scopes[self.current].bindings.insert(name, ty);
    }

    pub fn is_declared_in_current_scope(&self, name: &str) -> bool {
        self.scopes[self.current].bindings.contains_key(name)
    }

    /// Resolves `name` by walking from the current scope up to the global
    /// scope.
    pub fn resolve(&self, name: &str) -> Option<&'a Type<'a>> {
        let mut index = Some(self.current);
        while let Some(i) = index {
            if let Some(ty) = self.scopes[i].bindings.get(name) {
                return Some(*ty);
            }
            index = self.scopes[i].parent;
        }
        None
    }
}

impl<'a> Default for ScopeStack<'a> {
    fn default() -> Self {
        Self::new()
    }
}
