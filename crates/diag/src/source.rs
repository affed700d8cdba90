use std::borrow::Cow;

/// A piece of MeowLang source text, optionally tied to a file name.
#[derive(Clone, Debug)]
pub struct Source<'a> {
  name: Option<Cow<'a, str>>,
  str: Cow<'a, str>,
}

impl<'a> Source<'a> {
  pub fn string(str: impl Into<Cow<'a, str>>) -> Self {
    Source {
      name: None,
      str: str.into(),
    }
  }

  pub fn file(name: impl Into<Cow<'a, str>>, str: impl Into<Cow<'a, str>>) -> Self {
    Source {
      name: Some(name.into()),
      str: str.into(),
    }
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  pub fn str(&self) -> &str {
    self.str.as_ref()
  }

  /// 1-based line accessor, without its trailing newline.
  pub fn line(&self, n: usize) -> Option<&str> {
    if n == 0 {
      return None;
    }
    self
      .str()
      .split('\n')
      .nth(n - 1)
      .map(|l| l.strip_suffix('\r').unwrap_or(l))
  }
}

impl<'a> From<String> for Source<'a> {
  fn from(value: String) -> Self {
    Source::string(value)
  }
}

impl<'a> From<&'a str> for Source<'a> {
  fn from(value: &'a str) -> Self {
    Source::string(value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn line_access() {
    let src = Source::file("chat.miaou", "miaou\r\necrire 1\nmeow");
    assert_eq!(src.name(), Some("chat.miaou"));
    assert_eq!(src.line(1), Some("miaou"));
    assert_eq!(src.line(2), Some("ecrire 1"));
    assert_eq!(src.line(3), Some("meow"));
    assert_eq!(src.line(4), None);
    assert_eq!(src.line(0), None);
  }
}
