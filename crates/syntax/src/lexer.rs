#![allow(non_camel_case_types)]

use std::borrow::Borrow;
use std::fmt;
use std::mem::discriminant;
use std::ops::Range;

use diag::Code;
use logos::Logos;
use span::Span;

use crate::{Error, Result};

#[derive(Clone, Debug)]
pub struct Token {
  pub kind: TokenKind,
  pub span: Span,
}

impl Token {
  pub fn is(&self, kind: impl Borrow<TokenKind>) -> bool {
    discriminant(&self.kind) == discriminant(kind.borrow())
  }
}

/// Turns source text into the flat token stream consumed by the parser.
///
/// Layout is resolved here: the indentation stack lives in the lexer and the
/// output contains balanced `Tok_Indent`/`Tok_Dedent` pairs plus one
/// `Tok_Newline` per logical line, ending with `Tok_Eof`. Inside brackets no
/// layout tokens are emitted at all.
pub fn tokenize(src: &str) -> Result<Vec<Token>> {
  Layout::new(src).run()
}

struct Layout<'src> {
  src: &'src str,
  inner: logos::Lexer<'src, RawToken>,
  tokens: Vec<Token>,
  /// Open indentation widths, innermost last. Never empty.
  indents: Vec<usize>,
  /// Bracket nesting depth. Layout is suppressed while > 0.
  depth: usize,
  pending: Option<Pending>,
}

/// Leading whitespace of a line whose first real token has not appeared yet.
/// Blank and comment lines overwrite it, so they never affect layout.
struct Pending {
  width: usize,
  mixed: bool,
  span: Span,
}

impl<'src> Layout<'src> {
  fn new(src: &'src str) -> Self {
    Self {
      src,
      inner: RawToken::lexer(src),
      tokens: Vec::new(),
      indents: vec![0],
      depth: 0,
      pending: None,
    }
  }

  fn run(mut self) -> Result<Vec<Token>> {
    while let Some(raw) = self.inner.next() {
      let span: Span = self.inner.span().into();
      let lexeme = self.inner.slice();

      match raw {
        Err(()) => return Err(self.error_at(span, lexeme)),
        Ok(RawToken::Line) => {
          if self.depth == 0 {
            let at = lexeme.rfind('\n').map(|i| i + 1).unwrap_or(0);
            self.measure(&lexeme[at..], (span.start + at..span.end).into());
          }
        }
        Ok(RawToken::Whitespace) => {
          // Only whitespace at the very start of the file is an indent; the
          // line pattern owns every later line start.
          if span.start == 0 && self.depth == 0 {
            self.measure(lexeme, span);
          }
        }
        Ok(RawToken::Comment) => {}
        Ok(raw) => {
          self.open_line(span)?;
          let kind = raw.kind();
          self.bracket(kind);
          self.tokens.push(Token { kind, span });
        }
      }
    }

    let end = self.src.len();
    let eof: Span = (end..end).into();
    self.tokens.push(Token {
      kind: TokenKind::Tok_Newline,
      span: eof,
    });
    while self.indents.pop().filter(|w| *w > 0).is_some() {
      self.tokens.push(Token {
        kind: TokenKind::Tok_Dedent,
        span: eof,
      });
    }
    self.tokens.push(Token {
      kind: TokenKind::Tok_Eof,
      span: eof,
    });

    Ok(self.tokens)
  }

  fn measure(&mut self, ws: &str, span: Span) {
    self.pending = Some(Pending {
      width: ws.chars().count(),
      mixed: ws.contains(' ') && ws.contains('\t'),
      span,
    });
  }

  /// Emits the layout tokens owed before the first real token of a line.
  fn open_line(&mut self, token_span: Span) -> Result<()> {
    let Some(pending) = self.pending.take() else {
      return Ok(());
    };

    if pending.mixed {
      return Err(Error::new(
        Code::E101,
        "mélange de tabulations et d'espaces dans l'indentation",
        pending.span,
      ));
    }

    if !self.tokens.is_empty() {
      self.tokens.push(Token {
        kind: TokenKind::Tok_Newline,
        span: (pending.span.start..pending.span.start).into(),
      });
    }

    let current = *self.indents.last().unwrap_or(&0);
    if pending.width > current {
      self.indents.push(pending.width);
      self.tokens.push(Token {
        kind: TokenKind::Tok_Indent,
        span: pending.span,
      });
    } else if pending.width < current {
      while self.indents.last().is_some_and(|w| *w > pending.width) {
        self.indents.pop();
        self.tokens.push(Token {
          kind: TokenKind::Tok_Dedent,
          span: pending.span,
        });
      }
      if self.indents.last() != Some(&pending.width) {
        return Err(Error::new(
          Code::E102,
          "désindentation vers un niveau inconnu",
          token_span,
        ));
      }
    }

    Ok(())
  }

  fn bracket(&mut self, kind: TokenKind) {
    use TokenKind::*;
    match kind {
      Brk_ParenL | Brk_SquareL | Brk_CurlyL => self.depth += 1,
      Brk_ParenR | Brk_SquareR | Brk_CurlyR => self.depth = self.depth.saturating_sub(1),
      _ => {}
    }
  }

  fn error_at(&self, span: Span, lexeme: &str) -> Error {
    if lexeme.starts_with('"') {
      let line_end = self.src[span.start..]
        .find('\n')
        .map(|i| i + span.start)
        .unwrap_or(self.src.len());
      Error::new(
        Code::E103,
        "chaîne de caractères non terminée",
        span.start..line_end,
      )
    } else {
      Error::new(
        Code::E100,
        format!("caractère inattendu : `{lexeme}`"),
        span,
      )
    }
  }
}

// Raw lexical tokens. Keywords are case-insensitive and the composite ones
// are resolved here by greedy longest-match, so the grammar stays
// context-free. The composite patterns use `[ \t]+` and therefore never
// cross a newline. Identifiers stay case-sensitive. The layout pass in
// `tokenize` filters the trivia and maps the rest onto [`TokenKind`].
#[derive(Clone, Copy, Debug, Logos, PartialEq)]
enum RawToken {
  // Program markers
  #[token("miaou", ignore(case))]
  Miaou,
  #[token("meow", ignore(case))]
  Meow,

  // Keywords
  #[token("si", ignore(case))]
  Si,
  #[token("alors", ignore(case))]
  Alors,
  #[token("sinon", ignore(case))]
  Sinon,
  #[regex(r"sinon[ \t]+si", ignore(case))]
  SinonSi,
  #[regex(r"tant[ \t]+que", ignore(case))]
  TantQue,
  #[token("repeter", ignore(case))]
  #[token("répéter", ignore(case))]
  Repeter,
  #[token("fois", ignore(case))]
  Fois,
  #[regex(r"pour[ \t]+chaque", ignore(case))]
  PourChaque,
  #[token("dans", ignore(case))]
  Dans,
  #[token("fonction", ignore(case))]
  Fonction,
  #[token("retour", ignore(case))]
  Retour,
  #[token("stop", ignore(case))]
  Stop,
  #[token("suivant", ignore(case))]
  Suivant,
  #[token("essayer", ignore(case))]
  Essayer,
  #[token("sauf", ignore(case))]
  Sauf,
  #[token("erreur", ignore(case))]
  Erreur,
  #[token("importer", ignore(case))]
  Importer,
  #[token("et", ignore(case))]
  Et,
  #[token("ou", ignore(case))]
  Ou,
  #[token("non", ignore(case))]
  Non,

  // Brackets
  #[token("(")]
  ParenL,
  #[token(")")]
  ParenR,
  #[token("[")]
  SquareL,
  #[token("]")]
  SquareR,
  #[token("{")]
  CurlyL,
  #[token("}")]
  CurlyR,

  // Misc characters
  #[token(".")]
  Dot,
  #[token(",")]
  Comma,
  #[token(":")]
  Colon,

  // Operators
  #[token("=")]
  Equal,
  #[token("==")]
  EqualEqual,
  #[token("!=")]
  BangEqual,
  #[token("<")]
  Less,
  #[token("<=")]
  LessEqual,
  #[token(">")]
  More,
  #[token(">=")]
  MoreEqual,
  #[token("+")]
  Plus,
  #[token("-")]
  Minus,
  #[token("*")]
  Star,
  #[token("/")]
  Slash,
  #[token("//")]
  SlashSlash,
  #[token("%")]
  Percent,
  #[token("**")]
  StarStar,

  // Literals
  /// `0`, `42`
  #[regex(r"[0-9]+")]
  Int,
  /// `0.5`, `3.14`
  #[regex(r"[0-9]+\.[0-9]+")]
  Float,
  /// `vrai` or `faux`
  #[token("vrai", ignore(case))]
  #[token("faux", ignore(case))]
  Bool,
  #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
  Str,
  /// `chat`, `mot_composé`, plus the two-word builtin names
  #[regex(r"[A-Za-zÀ-ÖØ-öø-ÿ_][A-Za-z0-9À-ÖØ-öø-ÿ_]*")]
  #[regex(r"demander[ \t]+(texte|nombre)")]
  Ident,

  // Trivia, consumed by the layout pass
  #[regex(r"(\r?\n)+[ \t]*")]
  Line,
  #[regex(r"[ \t]+")]
  Whitespace,
  #[regex(r"#[^\n]*")]
  Comment,
}

impl RawToken {
  fn kind(self) -> TokenKind {
    use TokenKind::*;
    match self {
      RawToken::Miaou => Kw_Miaou,
      RawToken::Meow => Kw_Meow,
      RawToken::Si => Kw_Si,
      RawToken::Alors => Kw_Alors,
      RawToken::Sinon => Kw_Sinon,
      RawToken::SinonSi => Kw_SinonSi,
      RawToken::TantQue => Kw_TantQue,
      RawToken::Repeter => Kw_Repeter,
      RawToken::Fois => Kw_Fois,
      RawToken::PourChaque => Kw_PourChaque,
      RawToken::Dans => Kw_Dans,
      RawToken::Fonction => Kw_Fonction,
      RawToken::Retour => Kw_Retour,
      RawToken::Stop => Kw_Stop,
      RawToken::Suivant => Kw_Suivant,
      RawToken::Essayer => Kw_Essayer,
      RawToken::Sauf => Kw_Sauf,
      RawToken::Erreur => Kw_Erreur,
      RawToken::Importer => Kw_Importer,
      RawToken::Et => Kw_Et,
      RawToken::Ou => Kw_Ou,
      RawToken::Non => Kw_Non,
      RawToken::ParenL => Brk_ParenL,
      RawToken::ParenR => Brk_ParenR,
      RawToken::SquareL => Brk_SquareL,
      RawToken::SquareR => Brk_SquareR,
      RawToken::CurlyL => Brk_CurlyL,
      RawToken::CurlyR => Brk_CurlyR,
      RawToken::Dot => Op_Dot,
      RawToken::Comma => Tok_Comma,
      RawToken::Colon => Tok_Colon,
      RawToken::Equal => Op_Equal,
      RawToken::EqualEqual => Op_EqualEqual,
      RawToken::BangEqual => Op_BangEqual,
      RawToken::Less => Op_Less,
      RawToken::LessEqual => Op_LessEqual,
      RawToken::More => Op_More,
      RawToken::MoreEqual => Op_MoreEqual,
      RawToken::Plus => Op_Plus,
      RawToken::Minus => Op_Minus,
      RawToken::Star => Op_Star,
      RawToken::Slash => Op_Slash,
      RawToken::SlashSlash => Op_SlashSlash,
      RawToken::Percent => Op_Percent,
      RawToken::StarStar => Op_StarStar,
      RawToken::Int => Lit_Int,
      RawToken::Float => Lit_Float,
      RawToken::Bool => Lit_Bool,
      RawToken::Str => Lit_String,
      RawToken::Ident => Lit_Ident,
      RawToken::Line | RawToken::Whitespace | RawToken::Comment => {
        unreachable!("trivia is filtered before mapping")
      }
    }
  }
}

/// What the parser consumes: the raw tokens plus the synthetic layout
/// markers produced by `tokenize`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TokenKind {
  // Program markers
  Kw_Miaou,
  Kw_Meow,

  // Keywords
  Kw_Si,
  Kw_Alors,
  Kw_Sinon,
  Kw_SinonSi,
  Kw_TantQue,
  Kw_Repeter,
  Kw_Fois,
  Kw_PourChaque,
  Kw_Dans,
  Kw_Fonction,
  Kw_Retour,
  Kw_Stop,
  Kw_Suivant,
  Kw_Essayer,
  Kw_Sauf,
  Kw_Erreur,
  Kw_Importer,
  Kw_Et,
  Kw_Ou,
  Kw_Non,

  // Brackets
  Brk_ParenL,
  Brk_ParenR,
  Brk_SquareL,
  Brk_SquareR,
  Brk_CurlyL,
  Brk_CurlyR,

  // Misc characters
  Op_Dot,
  Tok_Comma,
  Tok_Colon,

  // Operators
  Op_Equal,
  Op_EqualEqual,
  Op_BangEqual,
  Op_Less,
  Op_LessEqual,
  Op_More,
  Op_MoreEqual,
  Op_Plus,
  Op_Minus,
  Op_Star,
  Op_Slash,
  Op_SlashSlash,
  Op_Percent,
  Op_StarStar,

  // Literals
  Lit_Int,
  Lit_Float,
  Lit_Bool,
  Lit_String,
  Lit_Ident,

  // Layout, produced by `tokenize`
  Tok_Newline,
  Tok_Indent,
  Tok_Dedent,
  Tok_Eof,
}

impl TokenKind {
  /// Human-readable name used in `symbole inattendu` messages.
  pub fn name(&self) -> &'static str {
    use TokenKind::*;
    match self {
      Kw_Miaou => "miaou",
      Kw_Meow => "meow",
      Kw_Si => "si",
      Kw_Alors => "alors",
      Kw_Sinon => "sinon",
      Kw_SinonSi => "sinon si",
      Kw_TantQue => "tant que",
      Kw_Repeter => "repeter",
      Kw_Fois => "fois",
      Kw_PourChaque => "pour chaque",
      Kw_Dans => "dans",
      Kw_Fonction => "fonction",
      Kw_Retour => "retour",
      Kw_Stop => "stop",
      Kw_Suivant => "suivant",
      Kw_Essayer => "essayer",
      Kw_Sauf => "sauf",
      Kw_Erreur => "erreur",
      Kw_Importer => "importer",
      Kw_Et => "et",
      Kw_Ou => "ou",
      Kw_Non => "non",
      Brk_ParenL => "(",
      Brk_ParenR => ")",
      Brk_SquareL => "[",
      Brk_SquareR => "]",
      Brk_CurlyL => "{",
      Brk_CurlyR => "}",
      Op_Dot => ".",
      Tok_Comma => ",",
      Tok_Colon => ":",
      Op_Equal => "=",
      Op_EqualEqual => "==",
      Op_BangEqual => "!=",
      Op_Less => "<",
      Op_LessEqual => "<=",
      Op_More => ">",
      Op_MoreEqual => ">=",
      Op_Plus => "+",
      Op_Minus => "-",
      Op_Star => "*",
      Op_Slash => "/",
      Op_SlashSlash => "//",
      Op_Percent => "%",
      Op_StarStar => "**",
      Lit_Int => "nombre entier",
      Lit_Float => "nombre décimal",
      Lit_Bool => "booléen",
      Lit_String => "texte",
      Lit_Ident => "identifiant",
      Tok_Newline => "fin de ligne",
      Tok_Indent => "indentation",
      Tok_Dedent => "désindentation",
      Tok_Eof => "fin de fichier",
    }
  }
}

pub struct DebugToken<'src>(pub Token, pub &'src str);

impl<'src> fmt::Debug for DebugToken<'src> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let kind = self.0.kind;
    let span = self.0.span;
    if let TokenKind::Lit_Ident = kind {
      let lexeme = &self.1[Range::from(span)];
      write!(f, "({kind:?} `{lexeme}` @{span})")
    } else {
      write!(f, "({kind:?} @{span})")
    }
  }
}

#[cfg(test)]
mod tests;
