use indoc::indoc;

use super::TokenKind::*;
use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
  tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
}

fn lex_err(src: &str) -> Error {
  tokenize(src).unwrap_err()
}

#[test]
fn flat_program() {
  let src = indoc! {r#"
    miaou
    ecrire "bonjour"
    meow
  "#};
  assert_eq!(
    kinds(src),
    vec![
      Kw_Miaou,
      Tok_Newline,
      Lit_Ident,
      Lit_String,
      Tok_Newline,
      Kw_Meow,
      Tok_Newline,
      Tok_Eof,
    ]
  );
}

#[test]
fn indent_and_dedent_are_balanced() {
  let src = indoc! {r#"
    miaou
    si x:
        ecrire x
        si y:
            ecrire y
    meow
  "#};
  let toks = kinds(src);
  let indents = toks.iter().filter(|k| **k == Tok_Indent).count();
  let dedents = toks.iter().filter(|k| **k == Tok_Dedent).count();
  assert_eq!(indents, 2);
  assert_eq!(indents, dedents);
  assert_eq!(toks.last(), Some(&Tok_Eof));
}

#[test]
fn blank_and_comment_lines_do_not_affect_layout() {
  let src = indoc! {r#"
    miaou
    si x:
        ecrire x

       # un commentaire désaligné
        ecrire x
    meow
  "#};
  let toks = kinds(src);
  assert_eq!(toks.iter().filter(|k| **k == Tok_Indent).count(), 1);
  assert_eq!(toks.iter().filter(|k| **k == Tok_Dedent).count(), 1);
}

#[test]
fn composite_keywords_lex_as_one_token() {
  let src = "tant que sinon si pour chaque sinon\n";
  assert_eq!(
    kinds(src),
    vec![Kw_TantQue, Kw_SinonSi, Kw_PourChaque, Kw_Sinon, Tok_Newline, Tok_Eof]
  );
  // extra interior blanks still fold into a single token
  assert_eq!(
    kinds("tant   que x\n"),
    vec![Kw_TantQue, Lit_Ident, Tok_Newline, Tok_Eof]
  );
}

#[test]
fn keywords_are_case_insensitive() {
  assert_eq!(
    kinds("MIAOU Si TANT QUE vrai MEOW\n"),
    vec![Kw_Miaou, Kw_Si, Kw_TantQue, Lit_Bool, Kw_Meow, Tok_Newline, Tok_Eof]
  );
}

#[test]
fn identifiers_stay_case_sensitive_and_accented() {
  let src = "Chat chaton_agé été\n";
  let tokens = tokenize(src).unwrap();
  let names: Vec<&str> = tokens
    .iter()
    .filter(|t| t.is(Lit_Ident))
    .map(|t| &src[t.span.range()])
    .collect();
  assert_eq!(names, vec!["Chat", "chaton_agé", "été"]);
}

#[test]
fn two_word_builtin_names_are_single_idents() {
  let src = "demander texte demander  nombre demandeur\n";
  let tokens = tokenize(src).unwrap();
  let names: Vec<&str> = tokens
    .iter()
    .filter(|t| t.is(Lit_Ident))
    .map(|t| &src[t.span.range()])
    .collect();
  assert_eq!(names, vec!["demander texte", "demander  nombre", "demandeur"]);
}

#[test]
fn layout_is_suppressed_inside_brackets() {
  let src = indoc! {r#"
    liste(1,
        2,
      3)
  "#};
  assert_eq!(
    kinds(src),
    vec![
      Lit_Ident,
      Brk_ParenL,
      Lit_Int,
      Tok_Comma,
      Lit_Int,
      Tok_Comma,
      Lit_Int,
      Brk_ParenR,
      Tok_Newline,
      Tok_Eof,
    ]
  );
}

#[test]
fn numbers_split_into_int_and_float() {
  assert_eq!(
    kinds("1 2.5 10 0.0\n"),
    vec![Lit_Int, Lit_Float, Lit_Int, Lit_Float, Tok_Newline, Tok_Eof]
  );
}

#[test]
fn operators() {
  assert_eq!(
    kinds("+ - * / // % ** = == != < <= > >= : , .\n"),
    vec![
      Op_Plus,
      Op_Minus,
      Op_Star,
      Op_Slash,
      Op_SlashSlash,
      Op_Percent,
      Op_StarStar,
      Op_Equal,
      Op_EqualEqual,
      Op_BangEqual,
      Op_Less,
      Op_LessEqual,
      Op_More,
      Op_MoreEqual,
      Tok_Colon,
      Tok_Comma,
      Op_Dot,
      Tok_Newline,
      Tok_Eof,
    ]
  );
}

#[test]
fn mixed_indentation_is_rejected() {
  let err = lex_err("si x:\n \t ecrire x\n");
  assert_eq!(err.code, diag::Code::E101);
}

#[test]
fn mixed_indentation_on_comment_line_is_fine() {
  let src = "a\n \t # commentaire\nb\n";
  assert_eq!(
    kinds(src),
    vec![Lit_Ident, Tok_Newline, Lit_Ident, Tok_Newline, Tok_Eof]
  );
}

#[test]
fn dedent_to_unknown_level_is_rejected() {
  let err = lex_err("si x:\n        a\n    b\n  c\n");
  assert_eq!(err.code, diag::Code::E102);
}

#[test]
fn unterminated_string_is_rejected() {
  let err = lex_err("ecrire \"bonjour\n");
  assert_eq!(err.code, diag::Code::E103);
}

#[test]
fn crlf_sources_lex_like_lf() {
  assert_eq!(
    kinds("miaou\r\nx = 1\r\nmeow\r\n"),
    kinds("miaou\nx = 1\nmeow\n")
  );
}
