use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One scope in the chain. Blocks and function calls create a child node;
/// lookups and assignments walk toward the root.
#[derive(Default)]
pub struct Environment {
    values: RefCell<HashMap<Rc<str>, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: Rc<Environment>) -> Self {
        Self {
            values: RefCell::new(HashMap::new()),
            parent: Some(parent),
        }
    }

    /// Bind a new variable in this scope. Returns false if the name is
    /// already declared here; shadowing an outer scope is allowed.
    pub fn declare(&self, name: Rc<str>, value: Value) -> bool {
        let mut values = self.values.borrow_mut();
        if values.contains_key(name.as_ref()) {
            return false;
        }
        values.insert(name, value);
        true
    }

    /// Assign to an existing variable, searching this scope and then its
    /// ancestors. Returns false if the variable is declared nowhere.
    pub fn set(&self, name: &str, value: Value) -> bool {
        let mut values = self.values.borrow_mut();
        if let Some(slot) = values.get_mut(name) {
            *slot = value;
            return true;
        }
        drop(values);

        match &self.parent {
            Some(parent) => parent.set(name, value),
            None => false,
        }
    }

    /// Read a variable, searching this scope and then its ancestors.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.borrow().get(name) {
            return Some(value.clone());
        }

        match &self.parent {
            Some(parent) => parent.get(name),
            None => None,
        }
    }
}
