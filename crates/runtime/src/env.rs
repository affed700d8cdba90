use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::value::Value;

/// A chain of scope frames. Cloning an `Env` clones a handle to the same
/// frame, which is how closures keep their defining scope alive.
#[derive(Clone)]
pub struct Env(Rc<RefCell<Frame>>);

struct Frame {
  vars: IndexMap<String, Value>,
  parent: Option<Env>,
}

impl Env {
  pub fn root() -> Env {
    Env(Rc::new(RefCell::new(Frame {
      vars: IndexMap::new(),
      parent: None,
    })))
  }

  pub fn child(parent: &Env) -> Env {
    Env(Rc::new(RefCell::new(Frame {
      vars: IndexMap::new(),
      parent: Some(parent.clone()),
    })))
  }

  /// Creates or overwrites a binding in this frame.
  pub fn define(&self, name: impl Into<String>, value: Value) {
    self.0.borrow_mut().vars.insert(name.into(), value);
  }

  /// Updates the nearest enclosing frame that already binds `name`,
  /// otherwise creates the binding in this frame.
  pub fn assign(&self, name: &str, value: Value) {
    let mut env = self.clone();
    let target = loop {
      if env.0.borrow().vars.contains_key(name) {
        break env;
      }
      let parent = env.0.borrow().parent.clone();
      match parent {
        Some(p) => env = p,
        None => break self.clone(),
      }
    };
    target.0.borrow_mut().vars.insert(name.to_owned(), value);
  }

  pub fn get(&self, name: &str) -> Option<Value> {
    let mut env = self.clone();
    loop {
      if let Some(value) = env.0.borrow().vars.get(name) {
        return Some(value.clone());
      }
      let parent = env.0.borrow().parent.clone();
      env = parent?;
    }
  }

  /// The bindings of this frame alone, in insertion order.
  pub fn snapshot(&self) -> IndexMap<String, Value> {
    self.0.borrow().vars.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn define_and_get() {
    let env = Env::root();
    env.define("x", Value::Int(1));
    assert_eq!(env.get("x"), Some(Value::Int(1)));
    assert_eq!(env.get("y"), None);
  }

  #[test]
  fn lookup_walks_parents() {
    let root = Env::root();
    root.define("x", Value::Int(1));
    let child = Env::child(&root);
    assert_eq!(child.get("x"), Some(Value::Int(1)));
  }

  #[test]
  fn assign_updates_nearest_binding_frame() {
    let root = Env::root();
    root.define("x", Value::Int(1));
    let child = Env::child(&root);
    child.assign("x", Value::Int(2));
    assert_eq!(root.get("x"), Some(Value::Int(2)));
    // child frame gained no binding of its own
    assert!(child.snapshot().is_empty());
  }

  #[test]
  fn assign_without_binding_defines_locally() {
    let root = Env::root();
    let child = Env::child(&root);
    child.assign("x", Value::Int(3));
    assert_eq!(child.get("x"), Some(Value::Int(3)));
    assert_eq!(root.get("x"), None);
  }

  #[test]
  fn define_shadows_parent() {
    let root = Env::root();
    root.define("x", Value::Int(1));
    let child = Env::child(&root);
    child.define("x", Value::Int(9));
    assert_eq!(child.get("x"), Some(Value::Int(9)));
    assert_eq!(root.get("x"), Some(Value::Int(1)));
  }
}
