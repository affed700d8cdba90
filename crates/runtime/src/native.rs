use std::rc::Rc;

use diag::Code;
use indexmap::IndexMap;

use crate::value::Value;

/// Host-provided callable. Arguments arrive already evaluated; the arity is
/// checked by the evaluator before the call, uniformly for every native.
pub struct NativeFunction {
  pub name: String,
  pub arity: Arity,
  call: Box<dyn Fn(&[Value]) -> Result<Value, NativeError>>,
}

impl NativeFunction {
  pub fn new(
    name: impl Into<String>,
    arity: Arity,
    call: impl Fn(&[Value]) -> Result<Value, NativeError> + 'static,
  ) -> Self {
    NativeFunction {
      name: name.into(),
      arity,
      call: Box::new(call),
    }
  }

  pub fn call(&self, args: &[Value]) -> Result<Value, NativeError> {
    (self.call)(args)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
  Any,
  Exact(usize),
  AtLeast(usize),
  Between(usize, usize),
}

impl Arity {
  pub fn accepts(&self, n: usize) -> bool {
    match self {
      Arity::Any => true,
      Arity::Exact(want) => n == *want,
      Arity::AtLeast(min) => n >= *min,
      Arity::Between(min, max) => (*min..=*max).contains(&n),
    }
  }

  pub fn describe(&self) -> String {
    match self {
      Arity::Any => "un nombre quelconque d'arguments".to_owned(),
      Arity::Exact(1) => "1 argument".to_owned(),
      Arity::Exact(n) => format!("{n} arguments"),
      Arity::AtLeast(n) => format!("au moins {n} argument(s)"),
      Arity::Between(min, max) => format!("entre {min} et {max} arguments"),
    }
  }
}

/// What a native reports when it fails; the evaluator attaches the call
/// site's span.
#[derive(Clone, Debug)]
pub struct NativeError {
  pub code: Code,
  pub message: String,
}

impl NativeError {
  pub fn new(code: Code, message: impl Into<String>) -> Self {
    NativeError {
      code,
      message: message.into(),
    }
  }
}

/// The set of natives seeded into the root environment before execution.
/// The evaluator never hard-codes builtin names; everything it exposes to
/// programs goes through here.
#[derive(Default)]
pub struct BuiltinRegistry {
  items: IndexMap<String, Rc<NativeFunction>>,
}

impl BuiltinRegistry {
  pub fn new() -> Self {
    Self {
      items: IndexMap::new(),
    }
  }

  pub fn register(
    &mut self,
    name: &str,
    arity: Arity,
    call: impl Fn(&[Value]) -> Result<Value, NativeError> + 'static,
  ) {
    self
      .items
      .insert(name.to_owned(), Rc::new(NativeFunction::new(name, arity, call)));
  }

  pub fn items(&self) -> impl Iterator<Item = (&str, &Rc<NativeFunction>)> {
    self.items.iter().map(|(k, v)| (k.as_str(), v))
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn arity_bounds() {
    assert!(Arity::Any.accepts(0));
    assert!(Arity::Exact(2).accepts(2));
    assert!(!Arity::Exact(2).accepts(3));
    assert!(Arity::AtLeast(1).accepts(5));
    assert!(!Arity::AtLeast(1).accepts(0));
    assert!(Arity::Between(1, 2).accepts(2));
    assert!(!Arity::Between(1, 2).accepts(3));
  }

  #[test]
  fn registry_keeps_insertion_order() {
    let mut registry = BuiltinRegistry::new();
    registry.register("b", Arity::Any, |_| Ok(Value::Nothing));
    registry.register("a", Arity::Any, |_| Ok(Value::Nothing));
    let names: Vec<&str> = registry.items().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["b", "a"]);
  }
}
