use std::fmt;
use std::fmt::Display;

use owo_colors as colors;

/// Color styling for rendered diagnostics, with a global on/off switch so
/// tests and non-tty hosts get plain text.
pub struct Style {
  pub enabled: bool,
  pub banner: colors::Style,
  pub field: colors::Style,
  pub caret: colors::Style,
}

impl Style {
  pub fn for_griffure(enabled: bool, griffure: crate::Griffure) -> Self {
    let banner = match griffure {
      crate::Griffure::Legere => colors::style().yellow(),
      crate::Griffure::Moyenne => colors::style().red(),
      crate::Griffure::Grave => colors::style().red().bold(),
    };
    Style {
      enabled,
      banner,
      field: colors::style().cyan(),
      caret: colors::style().red().bold(),
    }
  }

  pub fn banner<'a, T: Display + 'a>(&'a self, inner: T) -> Styled<'a, T> {
    Styled {
      inner,
      style: self.enabled.then_some(&self.banner),
    }
  }

  pub fn field<'a, T: Display + 'a>(&'a self, inner: T) -> Styled<'a, T> {
    Styled {
      inner,
      style: self.enabled.then_some(&self.field),
    }
  }

  pub fn caret<'a, T: Display + 'a>(&'a self, inner: T) -> Styled<'a, T> {
    Styled {
      inner,
      style: self.enabled.then_some(&self.caret),
    }
  }
}

pub struct Styled<'a, T: Display + 'a> {
  inner: T,
  style: Option<&'a colors::Style>,
}

impl<'a, T: Display> Display for Styled<'a, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    use colors::OwoColorize;

    if let Some(style) = self.style {
      write!(f, "{}", self.inner.style(*style))
    } else {
      write!(f, "{}", self.inner)
    }
  }
}
