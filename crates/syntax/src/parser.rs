#![deny(unused_must_use)]

use diag::Code;
use span::{Span, Spanned};

use crate::lexer::TokenKind::*;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::{ast, Error, Result};

/// Parses a whole program, reporting every error it can recover from.
pub fn parse(src: &str) -> Result<ast::Program, Vec<Error>> {
  let tokens = tokenize(src).map_err(|e| vec![e])?;
  Parser::new(src, tokens).program()
}

struct Parser<'src> {
  src: &'src str,
  tokens: Vec<Token>,
  pos: usize,
  errors: Vec<Error>,
  /// Nesting depth of enclosing loops; `stop`/`suivant` need it non-zero.
  loop_depth: usize,
  /// Nesting depth of enclosing functions; `retour` needs it non-zero.
  func_depth: usize,
}

impl<'src> Parser<'src> {
  fn new(src: &'src str, tokens: Vec<Token>) -> Self {
    debug_assert!(matches!(tokens.last(), Some(t) if t.is(Tok_Eof)));
    Self {
      src,
      tokens,
      pos: 0,
      errors: Vec::new(),
      loop_depth: 0,
      func_depth: 0,
    }
  }

  fn program(mut self) -> Result<ast::Program, Vec<Error>> {
    let mut program = ast::Program::new();

    self.skip_newlines();
    if !self.bump_if(Kw_Miaou) {
      self.errors.push(Error::new(
        Code::E001,
        "le programme doit commencer par `miaou`",
        self.current().span,
      ));
      return Err(self.errors);
    }
    if let Err(e) = self.end_of_stmt() {
      self.errors.push(e);
      self.sync();
    }

    loop {
      self.skip_newlines();
      if self.bump_if(Kw_Meow) {
        // everything after `meow` is ignored
        break;
      }
      if self.current().is(Tok_Eof) {
        self.errors.push(Error::new(
          Code::E002,
          "le programme doit se terminer par `meow`",
          self.current().span,
        ));
        break;
      }
      match self.stmt().and_then(|stmt| {
        self.end_of_stmt()?;
        Ok(stmt)
      }) {
        Ok(stmt) => program.body.push(stmt),
        Err(e) => {
          self.errors.push(e);
          self.sync();
        }
      }
    }

    if self.errors.is_empty() {
      Ok(program)
    } else {
      Err(self.errors)
    }
  }

  #[inline]
  fn current(&self) -> &Token {
    &self.tokens[self.pos]
  }

  #[inline]
  fn previous(&self) -> &Token {
    &self.tokens[self.pos.saturating_sub(1)]
  }

  #[inline]
  fn peek(&self, n: usize) -> &Token {
    let last = self.tokens.len() - 1;
    &self.tokens[(self.pos + n).min(last)]
  }

  #[inline]
  fn lexeme(&self, token: &Token) -> &'src str {
    &self.src[token.span.range()]
  }

  /// Move forward by one token, returning the previous one.
  #[inline]
  fn bump(&mut self) -> &Token {
    if !self.current().is(Tok_Eof) {
      self.pos += 1;
    }
    self.previous()
  }

  #[inline]
  fn bump_if(&mut self, kind: TokenKind) -> bool {
    if self.current().is(kind) {
      self.bump();
      true
    } else {
      false
    }
  }

  #[inline]
  fn expect(&mut self, kind: TokenKind) -> Result<()> {
    if self.bump_if(kind) {
      Ok(())
    } else {
      Err(Error::new(
        Code::E100,
        format!(
          "symbole inattendu : `{}` (attendu : `{}`)",
          self.current().kind.name(),
          kind.name()
        ),
        self.current().span,
      ))
    }
  }

  /// Like [`Self::expect`] for closing delimiters, reported as `E105`.
  #[inline]
  fn expect_close(&mut self, kind: TokenKind) -> Result<()> {
    if self.bump_if(kind) {
      Ok(())
    } else {
      Err(Error::new(
        Code::E105,
        format!("délimiteur fermant `{}` manquant", kind.name()),
        self.current().span,
      ))
    }
  }

  fn ident(&mut self) -> Result<ast::Ident> {
    if !self.current().is(Lit_Ident) {
      return Err(Error::new(
        Code::E100,
        format!(
          "symbole inattendu : `{}` (attendu : identifiant)",
          self.current().kind.name()
        ),
        self.current().span,
      ));
    }
    let token = self.bump().clone();
    let lexeme = self.lexeme(&token);
    // two-word builtin names fold their interior blanks
    let name = if lexeme.contains([' ', '\t']) {
      lexeme.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
      lexeme.to_owned()
    };
    Ok(Spanned::new(token.span, name))
  }

  fn skip_newlines(&mut self) {
    while self.bump_if(Tok_Newline) {}
  }

  /// A statement must exhaust its line. A statement ending in a block has
  /// already consumed its line break along with the closing dedent.
  fn end_of_stmt(&mut self) -> Result<()> {
    if self.previous().is(Tok_Dedent)
      || self.bump_if(Tok_Newline)
      || self.current().is(Tok_Dedent)
      || self.current().is(Tok_Eof)
    {
      Ok(())
    } else {
      Err(Error::new(
        Code::E100,
        format!(
          "symbole inattendu : `{}` (attendu : fin de ligne)",
          self.current().kind.name()
        ),
        self.current().span,
      ))
    }
  }

  /// True at `kinds`, also looking through one line break so that block
  /// continuations (`sinon`, `sauf`) parse after single-line bodies.
  fn at_continuation(&mut self, kinds: &[TokenKind]) -> bool {
    if kinds.iter().any(|k| self.current().is(*k)) {
      return true;
    }
    if self.current().is(Tok_Newline) && kinds.iter().any(|k| self.peek(1).is(*k)) {
      self.bump();
      return true;
    }
    false
  }

  /// Skips to the next statement boundary after an error.
  fn sync(&mut self) {
    loop {
      match self.current().kind {
        Tok_Eof | Kw_Meow | Tok_Dedent => break,
        Tok_Newline => {
          self.bump();
          break;
        }
        _ => {
          self.bump();
        }
      }
    }
  }
}

mod expr;
mod stmt;

// Headroom required before descending into a nested statement or
// expression. Must cover the deepest chain of parser frames a single
// level of nesting can add.
#[cfg(feature = "check-recursion-limit")]
const MINIMUM_STACK_REQUIRED: usize = 64_000;

#[cfg(not(feature = "check-recursion-limit"))]
fn check_recursion_limit(_span: Span) -> Result<()> {
  Ok(())
}

#[cfg(feature = "check-recursion-limit")]
fn check_recursion_limit(span: Span) -> Result<()> {
  if stacker::remaining_stack()
    .map(|available| available > MINIMUM_STACK_REQUIRED)
    .unwrap_or(true)
  {
    Ok(())
  } else {
    Err(Error::new(
      Code::E100,
      "limite d'imbrication atteinte",
      span,
    ))
  }
}

#[cfg(test)]
mod tests;
