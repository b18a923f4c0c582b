//! Binding and scope management for the BlueJay interpreter.
//!
//! BlueJay keeps a single flat namespace: a name maps to at most one value
//! for the whole program, and inner blocks never shadow outer names. Block
//! lifetime is tracked separately by a stack of declaration sets, one per
//! open block. Each set records the names first bound while that block was
//! current, and those names are removed again when the block exits.

use crate::error::{Result, RuntimeError};
use crate::value::Value;
use indexmap::IndexSet;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Variable environment with block-lifetime declaration tracking
#[derive(Debug, Clone)]
pub struct Environment {
    /// Flat name to value mapping shared by every depth
    bindings: HashMap<String, Value>,
    /// One declaration set per open block; index 0 is the program root
    declarations: Vec<IndexSet<String>>,
}

impl Environment {
    /// Create an environment at depth 0 with no bindings
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            declarations: vec![IndexSet::new()],
        }
    }

    /// Open a nested block
    pub fn enter_block(&mut self) {
        self.declarations.push(IndexSet::new());
        debug!(depth = self.depth(), "entered block");
    }

    /// Close the innermost block, dropping every name it declared
    ///
    /// The root declaration set is never discarded; an exit at depth 0 is
    /// refused and logged.
    pub fn exit_block(&mut self) {
        if self.declarations.len() <= 1 {
            warn!("refusing to exit the root scope");
            return;
        }

        if let Some(declared) = self.declarations.pop() {
            for name in &declared {
                self.bindings.remove(name);
            }
            debug!(
                depth = self.depth(),
                released = declared.len(),
                "exited block"
            );
        }
    }

    /// Bind `name` to `value`
    ///
    /// An unbound name is created and recorded in the current depth's
    /// declaration set. A bound name is overwritten in place wherever it was
    /// declared, and no declaration set changes.
    pub fn declare_or_assign(&mut self, name: &str, value: Value) {
        if let Some(slot) = self.bindings.get_mut(name) {
            trace!(name, %value, "assigned");
            *slot = value;
            return;
        }

        trace!(name, %value, depth = self.depth(), "declared");
        self.bindings.insert(name.to_string(), value);
        if let Some(current) = self.declarations.last_mut() {
            current.insert(name.to_string());
        }
    }

    /// Get the live value bound to `name`
    pub fn lookup(&self, name: &str) -> Result<Value> {
        self.bindings
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::undefined_symbol(name))
    }

    /// Current nesting depth (0 = program root)
    pub fn depth(&self) -> usize {
        self.declarations.len() - 1
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Names first declared at `depth`, in declaration order
    pub fn declared_at(&self, depth: usize) -> Option<Vec<&str>> {
        self.declarations
            .get(depth)
            .map(|declared| declared.iter().map(String::as_str).collect())
    }

    /// Snapshot of every live binding, sorted by name (for the REPL /vars command)
    pub fn bindings(&self) -> Vec<(String, Value)> {
        let mut bindings: Vec<(String, Value)> = self
            .bindings
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        bindings.sort_by(|(a, _), (b, _)| a.cmp(b));
        bindings
    }

    /// Number of live bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Drop every binding and return to depth 0
    pub fn reset(&mut self) {
        self.bindings.clear();
        self.declarations.truncate(1);
        if let Some(root) = self.declarations.first_mut() {
            root.clear();
        }
        debug!("environment reset");
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
