use std::path::{Path, PathBuf};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::env::Env;
use crate::value::Value;

/// An executed module: its exported namespace, immutable once built.
///
/// Exports are the top-level bindings of the module's own frame, in
/// insertion order; the builtins seeded below that frame are not part of
/// the namespace.
pub struct ModuleObject {
  pub name: String,
  pub path: PathBuf,
  namespace: IndexMap<String, Value>,
}

impl ModuleObject {
  pub fn capture(name: &str, path: &Path, env: &Env) -> Self {
    ModuleObject {
      name: name.to_owned(),
      path: path.to_owned(),
      namespace: env.snapshot(),
    }
  }

  pub fn get(&self, member: &str) -> Option<Value> {
    self.namespace.get(member).cloned()
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.namespace.keys().map(|k| k.as_str())
  }
}

/// Cache of loaded modules, keyed by canonical absolute path. Owned by one
/// evaluator instance, so independent interpretations never share state.
#[derive(Default)]
pub(crate) struct ModuleRegistry {
  entries: IndexMap<PathBuf, ModuleState>,
}

pub(crate) enum ModuleState {
  /// Top-level execution still in flight; a re-entrant import snapshots the
  /// environment as it is at that moment.
  Loading(Env),
  Ready(Rc<ModuleObject>),
}

impl ModuleRegistry {
  pub fn new() -> Self {
    Self {
      entries: IndexMap::new(),
    }
  }

  pub fn get(&self, path: &Path) -> Option<&ModuleState> {
    self.entries.get(path)
  }

  pub fn begin(&mut self, path: PathBuf, env: Env) {
    self.entries.insert(path, ModuleState::Loading(env));
  }

  pub fn finish(&mut self, path: &Path, module: Rc<ModuleObject>) {
    self
      .entries
      .insert(path.to_owned(), ModuleState::Ready(module));
  }

  pub fn abort(&mut self, path: &Path) {
    self.entries.shift_remove(path);
  }
}
