//! The MeowLang evaluator: runtime values, environments, the tree walker,
//! the module loader and the native-function registry.

use std::rc::Rc;

use diag::Code;
use span::Span;

pub mod env;
pub mod host;
pub mod interp;
pub mod module;
pub mod native;
pub mod value;

pub use env::Env;
pub use host::{Clock, Console, Input, Randomness, SourceReader};
pub use interp::{Interp, ScriptCtx};
pub use module::ModuleObject;
pub use native::{Arity, BuiltinRegistry, NativeError, NativeFunction};
pub use value::{FileHandle, Function, Key, Value};

pub type Result<T, E = RuntimeError> = std::result::Result<T, E>;

/// A runtime error. Catchable by `essayer`/`sauf` unless its code is
/// critical.
#[derive(Clone, Debug)]
pub struct RuntimeError {
  pub code: Code,
  pub message: String,
  pub span: Span,
  /// Script the span points into, attached by the evaluator when the error
  /// first crosses a statement boundary.
  pub origin: Option<ErrorOrigin>,
}

#[derive(Clone, Debug)]
pub struct ErrorOrigin {
  pub name: String,
  pub src: Rc<str>,
}

impl RuntimeError {
  pub fn new(code: Code, message: impl Into<String>, span: impl Into<Span>) -> Self {
    RuntimeError {
      code,
      message: message.into(),
      span: span.into(),
      origin: None,
    }
  }

  pub fn is_catchable(&self) -> bool {
    !self.code.is_critical()
  }

  /// 1-based line of the error inside its origin script.
  pub fn line(&self) -> Option<usize> {
    let origin = self.origin.as_ref()?;
    span::line_col(&origin.src, self.span.start).map(|(line, _)| line)
  }

  pub(crate) fn with_origin(mut self, name: &str, src: &Rc<str>) -> Self {
    if self.origin.is_none() {
      self.origin = Some(ErrorOrigin {
        name: name.to_owned(),
        src: src.clone(),
      });
    }
    self
  }
}

impl std::error::Error for RuntimeError {}

impl std::fmt::Display for RuntimeError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "erreur {} : {}", self.code, self.message)
  }
}
