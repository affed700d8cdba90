//! MeowLang: a small dynamically-typed scripting language with French
//! keywords, significant indentation and cat-themed diagnostics.
//!
//! ```
//! let meow = meow::Meow::default();
//! meow.eval("miaou\necrire \"bonjour\"\nmeow").unwrap();
//! ```
//!
//! The pipeline lives in the workspace crates: `meow_syntax` lexes and
//! parses, `meow_runtime` walks the tree, `meow_diag` renders errors. This
//! crate ties them together behind [`Meow`] and provides the standard
//! builtin registry plus the real-world host capabilities.

use std::cell::RefCell;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use diag::{Report, Source};
use runtime::{Interp, ScriptCtx};
use span::Span;

pub mod builtins;
pub mod host;

pub use diag::{Code, Griffure};
pub use runtime::{
  Arity, BuiltinRegistry, Clock, Console, Input, NativeError, Randomness, RuntimeError,
  SourceReader, Value,
};
pub use syntax::Error as SyntaxError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Anything that can go wrong while running a program.
#[derive(Debug)]
pub enum Error {
  Syntax(Vec<SyntaxError>),
  Runtime(RuntimeError),
}

impl Error {
  /// Renders the error through the diagnostic engine. Runtime errors
  /// carrying an origin script (e.g. raised inside an imported module) are
  /// rendered against that script instead of `name`/`src`.
  pub fn render(&self, name: &str, src: &str, color: bool) -> String {
    match self {
      Error::Syntax(errors) => errors
        .iter()
        .map(|e| report_one(e.code, &e.message, e.span, name, src, color))
        .collect::<Vec<_>>()
        .join("\n"),
      Error::Runtime(e) => match &e.origin {
        Some(origin) => report_one(e.code, &e.message, e.span, &origin.name, &origin.src, color),
        None => report_one(e.code, &e.message, e.span, name, src, color),
      },
    }
  }
}

fn report_one(
  code: Code,
  message: &str,
  span: Span,
  name: &str,
  src: &str,
  color: bool,
) -> String {
  Report::new(code)
    .source(Source::file(name, src))
    .span(span)
    .message(message.to_owned())
    .color(color)
    .build()
    .emit_to_string()
    .unwrap_or_default()
}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Error::Syntax(errors) => match errors.first() {
        Some(first) => write!(f, "{first}"),
        None => write!(f, "erreur de syntaxe"),
      },
      Error::Runtime(e) => write!(f, "{e}"),
    }
  }
}

impl std::error::Error for Error {}

/// The MeowLang engine: one builtin registry, one module cache, as many
/// programs as you like.
pub struct Meow {
  interp: RefCell<Interp>,
  script_dir: PathBuf,
}

impl Meow {
  pub fn builder() -> MeowBuilder {
    MeowBuilder::new()
  }

  /// Parses without executing.
  pub fn check(&self, src: &str) -> Result<(), Vec<SyntaxError>> {
    syntax::parse(src)?;
    Ok(())
  }

  /// Runs a program. Module resolution is based at the configured script
  /// directory.
  pub fn eval(&self, src: &str) -> Result<()> {
    let dir = self.script_dir.clone();
    self.eval_named(src, "<script>", &dir)
  }

  /// Reads and runs a `.miaou` file; an uncaught error is rendered to
  /// stderr before being returned, so a host binary only has to map the
  /// `Err` onto its exit status.
  pub fn run_file(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let src = std::fs::read_to_string(path).map_err(|e| {
      Error::Runtime(RuntimeError::new(
        Code::E801,
        format!("impossible de lire `{}` : {e}", path.display()),
        Span::default(),
      ))
    })?;
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| path.display().to_string());
    let dir = path
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_else(|| PathBuf::from("."));

    let result = self.eval_named(&src, &name, &dir);
    if let Err(e) = &result {
      eprintln!("{}", e.render(&name, &src, true));
    }
    result
  }

  fn eval_named(&self, src: &str, name: &str, dir: &Path) -> Result<()> {
    let program = syntax::parse(src).map_err(Error::Syntax)?;
    let ctx = Rc::new(ScriptCtx::new(name, src, dir));
    self
      .interp
      .borrow_mut()
      .evaluate(&program, ctx)
      .map_err(Error::Runtime)
  }
}

impl Default for Meow {
  fn default() -> Self {
    Self::builder().build()
  }
}

/// Swaps host capabilities in before building the engine. Every capability
/// defaults to the real one: stdout, stdin, the system clock, thread-local
/// randomness and the file system.
pub struct MeowBuilder {
  console: Rc<RefCell<dyn Console>>,
  input: Rc<RefCell<dyn Input>>,
  clock: Rc<dyn Clock>,
  random: Rc<RefCell<dyn Randomness>>,
  sources: Option<Box<dyn SourceReader>>,
  registry: Option<BuiltinRegistry>,
  script_dir: PathBuf,
}

impl MeowBuilder {
  fn new() -> Self {
    Self {
      console: Rc::new(RefCell::new(host::StdConsole)),
      input: Rc::new(RefCell::new(host::StdInput)),
      clock: Rc::new(host::StdClock),
      random: Rc::new(RefCell::new(host::StdRandom::new())),
      sources: None,
      registry: None,
      script_dir: PathBuf::from("."),
    }
  }

  pub fn with_console(mut self, console: impl Console + 'static) -> Self {
    self.console = Rc::new(RefCell::new(console));
    self
  }

  pub fn with_input(mut self, input: impl Input + 'static) -> Self {
    self.input = Rc::new(RefCell::new(input));
    self
  }

  pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
    self.clock = Rc::new(clock);
    self
  }

  pub fn with_random(mut self, random: impl Randomness + 'static) -> Self {
    self.random = Rc::new(RefCell::new(random));
    self
  }

  pub fn with_source_reader(mut self, sources: impl SourceReader + 'static) -> Self {
    self.sources = Some(Box::new(sources));
    self
  }

  /// Replaces the standard builtins wholesale.
  pub fn with_registry(mut self, registry: BuiltinRegistry) -> Self {
    self.registry = Some(registry);
    self
  }

  /// Base directory for `importer` resolution of top-level programs.
  pub fn with_script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.script_dir = dir.into();
    self
  }

  pub fn build(self) -> Meow {
    let registry = self.registry.unwrap_or_else(|| {
      builtins::standard(self.console, self.input, self.clock, self.random)
    });
    let sources = self.sources.unwrap_or_else(|| Box::new(host::FsReader));
    Meow {
      interp: RefCell::new(Interp::new(&registry, sources)),
      script_dir: self.script_dir,
    }
  }
}
