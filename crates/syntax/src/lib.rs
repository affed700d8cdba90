use beef::lean::Cow;
use diag::Code;
use span::Span;

pub mod ast;
pub mod lexer;
pub mod parser;

pub use parser::parse;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A lexing or parsing error, tagged with its catalog code so the host can
/// render it through `diag::Report`.
#[derive(Clone, Debug)]
pub struct Error {
  pub code: Code,
  pub message: Cow<'static, str>,
  pub span: Span,
}

impl Error {
  pub fn new(code: Code, message: impl Into<Cow<'static, str>>, span: impl Into<Span>) -> Self {
    Error {
      code,
      message: message.into(),
      span: span.into(),
    }
  }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let Error {
      code,
      message,
      span,
    } = self;
    write!(f, "erreur {code} à {span} : {message}")
  }
}
