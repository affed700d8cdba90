use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::env::Env;
use crate::interp::ScriptCtx;
use crate::native::NativeFunction;

/// A MeowLang runtime value.
///
/// Lists and dictionaries are shared by reference: two bindings to the same
/// list observe each other's mutations.
#[derive(Clone)]
pub enum Value {
  Nothing,
  Bool(bool),
  Int(i64),
  Float(f64),
  Str(Rc<str>),
  List(Rc<RefCell<Vec<Value>>>),
  Dict(Rc<RefCell<IndexMap<Key, Value>>>),
  Func(Rc<Function>),
  Native(Rc<NativeFunction>),
  File(Rc<RefCell<FileHandle>>),
  Module(Rc<crate::module::ModuleObject>),
}

/// A user function: its definition shared with the syntax tree, the
/// environment it closed over, and the script it was defined in.
pub struct Function {
  pub def: Rc<syntax::ast::Func>,
  pub env: Env,
  pub ctx: Rc<ScriptCtx>,
}

/// An open-file handle. The host opens and closes the underlying file; a
/// handle dropped while still open closes with it.
pub struct FileHandle {
  pub path: String,
  pub mode: String,
  pub file: Option<std::fs::File>,
}

/// Dictionary keys. Floats with no fractional part normalize to `Int`;
/// anything else that is not text, integer or boolean is unhashable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
  Bool(bool),
  Int(i64),
  Str(Rc<str>),
}

impl Key {
  pub fn from_value(value: &Value) -> Option<Key> {
    match value {
      Value::Bool(v) => Some(Key::Bool(*v)),
      Value::Int(v) => Some(Key::Int(*v)),
      Value::Float(v) if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v <= i64::MAX as f64 => {
        Some(Key::Int(*v as i64))
      }
      Value::Str(v) => Some(Key::Str(v.clone())),
      _ => None,
    }
  }

  pub fn to_value(&self) -> Value {
    match self {
      Key::Bool(v) => Value::Bool(*v),
      Key::Int(v) => Value::Int(*v),
      Key::Str(v) => Value::Str(v.clone()),
    }
  }
}

impl fmt::Display for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Key::Bool(v) => f.write_str(if *v { "vrai" } else { "faux" }),
      Key::Int(v) => write!(f, "{v}"),
      Key::Str(v) => write!(f, "{v}"),
    }
  }
}

impl Value {
  pub fn str(s: impl AsRef<str>) -> Value {
    Value::Str(Rc::from(s.as_ref()))
  }

  pub fn list(items: Vec<Value>) -> Value {
    Value::List(Rc::new(RefCell::new(items)))
  }

  pub fn dict(pairs: IndexMap<Key, Value>) -> Value {
    Value::Dict(Rc::new(RefCell::new(pairs)))
  }

  /// Falsy values: `rien`, `faux`, zero, empty text, empty list, empty dict.
  pub fn is_truthy(&self) -> bool {
    match self {
      Value::Nothing => false,
      Value::Bool(v) => *v,
      Value::Int(v) => *v != 0,
      Value::Float(v) => *v != 0.0,
      Value::Str(v) => !v.is_empty(),
      Value::List(v) => !v.borrow().is_empty(),
      Value::Dict(v) => !v.borrow().is_empty(),
      _ => true,
    }
  }

  /// French type name used in diagnostics.
  pub fn type_name(&self) -> &'static str {
    match self {
      Value::Nothing => "rien",
      Value::Bool(_) => "booléen",
      Value::Int(_) => "nombre entier",
      Value::Float(_) => "nombre décimal",
      Value::Str(_) => "texte",
      Value::List(_) => "liste",
      Value::Dict(_) => "dictionnaire",
      Value::Func(_) => "fonction",
      Value::Native(_) => "fonction native",
      Value::File(_) => "fichier",
      Value::Module(_) => "module",
    }
  }
}

// Structural equality for data, identity for functions, files and modules.
// Ints and floats compare across representations, like `2 == 2.0`.
impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::Nothing, Value::Nothing) => true,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Int(a), Value::Int(b)) => a == b,
      (Value::Float(a), Value::Float(b)) => a == b,
      (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
      (Value::Str(a), Value::Str(b)) => a == b,
      (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
      (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
      (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
      (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
      (Value::File(a), Value::File(b)) => Rc::ptr_eq(a, b),
      (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
      _ => false,
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Nothing => f.write_str("rien"),
      Value::Bool(v) => f.write_str(if *v { "vrai" } else { "faux" }),
      Value::Int(v) => write!(f, "{v}"),
      Value::Float(v) => write!(f, "{v}"),
      Value::Str(v) => write!(f, "{v}"),
      Value::List(v) => {
        f.write_str("[")?;
        for (i, item) in v.borrow().iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{item}")?;
        }
        f.write_str("]")
      }
      Value::Dict(v) => {
        f.write_str("{")?;
        for (i, (key, value)) in v.borrow().iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
      }
      Value::Func(v) => write!(f, "<fonction {}>", v.def.name),
      Value::Native(v) => write!(f, "<native {}>", v.name),
      Value::File(v) => write!(f, "<fichier {}>", v.borrow().path),
      Value::Module(v) => write!(f, "<module {}>", v.name),
    }
  }
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{self}")
  }
}
