use span::Span;

/// The context block of a rendered diagnostic: the offending line, up to two
/// preceding lines, and the caret position under the offending column.
#[derive(Clone, Debug, PartialEq)]
pub struct Excerpt<'a> {
  /// `(1-based line number, text)`, ending with the offending line.
  pub lines: Vec<(usize, &'a str)>,
  /// 1-based line of the span start.
  pub line: usize,
  /// 1-based char column of the span start within its line.
  pub col: usize,
  /// Width of the caret run, in chars, clamped to the offending line.
  pub caret_len: usize,
}

impl<'a> Excerpt<'a> {
  /// `None` when the span does not land inside `src` (synthetic positions).
  pub fn new(src: &'a str, span: impl Into<Span>) -> Option<Self> {
    let span: Span = span.into();
    if span.start > src.len() || !src.is_char_boundary(span.start.min(src.len())) {
      return None;
    }

    let (line, col) = span::line_col(src, span.start)?;

    let mut lines = Vec::with_capacity(3);
    for n in line.saturating_sub(2).max(1)..=line {
      let text = nth_line(src, n)?;
      lines.push((n, text));
    }

    let offending = lines.last().map(|(_, t)| *t).unwrap_or("");
    let remaining = offending.chars().count().saturating_sub(col - 1).max(1);
    let spanned = src[span.start..span.end.min(src.len())]
      .split('\n')
      .next()
      .map(|s| s.chars().count())
      .unwrap_or(0);
    let caret_len = spanned.clamp(1, remaining);

    Some(Excerpt {
      lines,
      line,
      col,
      caret_len,
    })
  }
}

fn nth_line(src: &str, n: usize) -> Option<&str> {
  src
    .split('\n')
    .nth(n - 1)
    .map(|l| l.strip_suffix('\r').unwrap_or(l))
}

#[cfg(test)]
mod tests {
  use super::*;

  const SRC: &str = "miaou\nessayer:\n    ecrire 1 / 0\nmeow\n";

  #[test]
  fn excerpt_keeps_two_preceding_lines() {
    let at = SRC.find('/').unwrap();
    let excerpt = Excerpt::new(SRC, at..at + 1).unwrap();
    assert_eq!(excerpt.line, 3);
    assert_eq!(excerpt.col, 14);
    assert_eq!(excerpt.caret_len, 1);
    assert_eq!(
      excerpt.lines,
      vec![(1, "miaou"), (2, "essayer:"), (3, "    ecrire 1 / 0")]
    );
  }

  #[test]
  fn excerpt_at_start_of_file() {
    let excerpt = Excerpt::new(SRC, 0..5).unwrap();
    assert_eq!(excerpt.line, 1);
    assert_eq!(excerpt.col, 1);
    assert_eq!(excerpt.caret_len, 5);
    assert_eq!(excerpt.lines, vec![(1, "miaou")]);
  }

  #[test]
  fn synthetic_span_yields_no_excerpt() {
    assert!(Excerpt::new(SRC, SRC.len() + 1..SRC.len() + 2).is_none());
  }
}
