//! Rendering of catalog diagnostics.
//!
//! The entrypoint to this module is [Report][`crate::Report`]: pick a
//! [`Code`], attach a [`Source`] and a [`Span`], and emit.

use std::fmt;
use std::fmt::Write;

use beef::lean::Cow;
use span::Span;
use thiserror::Error;

use crate::catalog::Code;
use crate::snippet::Excerpt;
use crate::source::Source;
use crate::style::Style;

#[derive(Clone)]
pub struct ReportBuilder<'a, Src, Sp> {
  code: Code,
  source: Src,
  span: Sp,
  message: Option<Cow<'a, str>>,
  color: bool,
}

impl<'a, Sp> ReportBuilder<'a, (), Sp> {
  pub fn source(self, source: impl Into<Source<'a>>) -> ReportBuilder<'a, Source<'a>, Sp> {
    ReportBuilder {
      code: self.code,
      source: source.into(),
      span: self.span,
      message: self.message,
      color: self.color,
    }
  }
}

impl<'a, Src> ReportBuilder<'a, Src, ()> {
  pub fn span(self, span: impl Into<Span>) -> ReportBuilder<'a, Src, Span> {
    ReportBuilder {
      code: self.code,
      source: self.source,
      span: span.into(),
      message: self.message,
      color: self.color,
    }
  }
}

impl<'a, Src, Sp> ReportBuilder<'a, Src, Sp> {
  /// Technical detail from the raise site. Without it the catalog's
  /// template message is rendered.
  pub fn message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
    self.message = Some(message.into());
    self
  }

  pub fn color(mut self, enabled: bool) -> Self {
    self.color = enabled;
    self
  }
}

impl<'a> ReportBuilder<'a, Source<'a>, Span> {
  pub fn build(self) -> Report<'a> {
    Report {
      code: self.code,
      source: self.source,
      span: self.span,
      message: self.message,
      color: self.color,
    }
  }
}

/// A single diagnostic, ready to be emitted to anything that implements
/// [`fmt::Write`].
pub struct Report<'a> {
  pub code: Code,
  pub source: Source<'a>,
  pub span: Span,
  pub message: Option<Cow<'a, str>>,
  pub color: bool,
}

impl<'a> Report<'a> {
  pub fn new(code: Code) -> ReportBuilder<'a, (), ()> {
    ReportBuilder {
      code,
      source: (),
      span: (),
      message: None,
      color: true,
    }
  }

  /// Emit the report to `w`.
  pub fn emit<W: Write>(self, w: &mut W) -> Result<(), EmitError> {
    let info = self.code.info();
    let style = Style::for_griffure(self.color, info.griffure);

    let excerpt = Excerpt::new(self.source.str(), self.span);

    let header = format!("{0} ERREUR {1} {0}", "━".repeat(12), info.code);
    let footer = "━".repeat(header.chars().count());
    writeln!(w, "🐱{}🐱", style.banner(&header))?;

    let file = self.source.name().unwrap_or("<script>");
    writeln!(w, "  {} : {}", style.field("Fichier    "), file)?;
    match &excerpt {
      Some(e) => {
        writeln!(w, "  {} : {}", style.field("Ligne      "), e.line)?;
        writeln!(w, "  {} : {}", style.field("Colonne    "), e.col)?;
        let instruction = e.lines.last().map(|(_, t)| t.trim()).unwrap_or("?");
        writeln!(w, "  {} : {}", style.field("Instruction"), instruction)?;
      }
      // Synthetic position, nothing to point at.
      None => {
        writeln!(w, "  {} : ?", style.field("Ligne      "))?;
        writeln!(w, "  {} : ?", style.field("Colonne    "))?;
        writeln!(w, "  {} : ?", style.field("Instruction"))?;
      }
    }
    writeln!(w, "  {} : {}", style.field("Type       "), info.kind)?;
    writeln!(w)?;

    let technical = self.message.as_deref().unwrap_or(info.technical);
    writeln!(w, "  💬 Technique : {technical}")?;
    writeln!(w, "  😿 MeowLang  : {}", info.playful)?;

    if let Some(e) = &excerpt {
      writeln!(w)?;
      let width = e.lines.last().map(|(n, _)| n.to_string().len()).unwrap_or(1);
      for (n, text) in &e.lines {
        if text.is_empty() {
          writeln!(w, "   {n:>width$} │")?;
        } else {
          writeln!(w, "   {n:>width$} │ {text}")?;
        }
      }
      writeln!(
        w,
        "   {:>width$} │ {}{}",
        "",
        " ".repeat(e.col - 1),
        style.caret("^".repeat(e.caret_len)),
      )?;
    }

    writeln!(w)?;
    writeln!(
      w,
      "  Humeur du chat : {} ({})",
      info.griffure.mood(),
      info.griffure.label()
    )?;
    writeln!(w, "  💡 Suggestion : {}", info.suggestion)?;
    if let Some(example) = info.example {
      writeln!(w, "  📖 Exemple :")?;
      for line in example.lines() {
        if line.is_empty() {
          writeln!(w)?;
        } else {
          writeln!(w, "     {line}")?;
        }
      }
    }
    writeln!(w, "🐱{}🐱", style.banner(&footer))?;

    Ok(())
  }

  /// Emit the report to a string.
  pub fn emit_to_string(self) -> Result<String, EmitError> {
    let mut buf = String::new();
    self.emit(&mut buf)?;
    Ok(buf)
  }
}

#[derive(Debug, Error)]
pub enum EmitError {
  #[error("failed to format")]
  Fmt(#[from] fmt::Error),
}
