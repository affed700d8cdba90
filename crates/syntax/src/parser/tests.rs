use indoc::indoc;

use super::*;
use crate::ast::{Ctrl, ExprKind, Literal, StmtKind};

fn parse_ok(src: &str) -> ast::Program {
  match parse(src) {
    Ok(program) => program,
    Err(errors) => panic!("failed to parse:\n{errors:#?}"),
  }
}

fn parse_err(src: &str) -> Vec<Error> {
  match parse(src) {
    Ok(_) => panic!("source parsed successfully"),
    Err(errors) => errors,
  }
}

fn first_code(src: &str) -> Code {
  parse_err(src)[0].code
}

/// Wraps a single line into a program and returns its only statement.
fn stmt_of(line: &str) -> ast::Stmt {
  let src = format!("miaou\n{line}\nmeow\n");
  let mut program = parse_ok(&src);
  assert_eq!(program.body.len(), 1, "expected a single statement");
  program.body.remove(0)
}

fn expr_of(line: &str) -> ast::Expr {
  match stmt_of(line).into_inner() {
    StmtKind::Expr(e) => *e,
    other => panic!("expected expression statement, got {other:?}"),
  }
}

fn sexpr_of(line: &str) -> String {
  sexpr(&expr_of(line))
}

fn sexpr(e: &ast::Expr) -> String {
  use ast::{BinaryOp::*, UnaryOp};
  match &**e {
    ExprKind::Literal(l) => match &**l {
      Literal::Int(v) => v.to_string(),
      Literal::Float(v) => format!("{v:?}"),
      Literal::Bool(v) => if *v { "vrai" } else { "faux" }.to_owned(),
      Literal::String(v) => format!("{v:?}"),
      Literal::List(xs) => format!(
        "(list {})",
        xs.iter().map(sexpr).collect::<Vec<_>>().join(" ")
      ),
      Literal::Dict(ps) => format!(
        "(dict {})",
        ps.iter()
          .map(|(k, v)| format!("{}:{}", sexpr(k), sexpr(v)))
          .collect::<Vec<_>>()
          .join(" ")
      ),
    },
    ExprKind::GetVar(v) => v.name.to_string(),
    ExprKind::Binary(b) => {
      let op = match b.op {
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        IntDiv => "//",
        Rem => "%",
        Pow => "**",
        Eq => "==",
        Neq => "!=",
        Less => "<",
        LessEq => "<=",
        More => ">",
        MoreEq => ">=",
        And => "et",
        Or => "ou",
      };
      format!("({op} {} {})", sexpr(&b.left), sexpr(&b.right))
    }
    ExprKind::Unary(u) => {
      let op = match u.op {
        UnaryOp::Neg => "neg",
        UnaryOp::Not => "non",
      };
      format!("({op} {})", sexpr(&u.right))
    }
    ExprKind::Call(c) => format!(
      "(call {} {})",
      sexpr(&c.target),
      c.args.iter().map(sexpr).collect::<Vec<_>>().join(" ")
    ),
    ExprKind::GetIndex(g) => format!("(index {} {})", sexpr(&g.target), sexpr(&g.index)),
    ExprKind::GetField(g) => format!("(field {} {})", sexpr(&g.target), g.name),
  }
}

#[test]
fn precedence_ladder() {
  assert_eq!(sexpr_of("2 + 3 * 4"), "(+ 2 (* 3 4))");
  assert_eq!(sexpr_of("2 * 3 + 4"), "(+ (* 2 3) 4)");
  assert_eq!(sexpr_of("1 + 2 - 3"), "(- (+ 1 2) 3)");
  assert_eq!(sexpr_of("a ou b et c"), "(ou a (et b c))");
  assert_eq!(sexpr_of("a < b == c"), "(== (< a b) c)");
  assert_eq!(sexpr_of("1 + 2 < 3 * 4"), "(< (+ 1 2) (* 3 4))");
  assert_eq!(sexpr_of("10 // 3 % 2"), "(% (// 10 3) 2)");
}

#[test]
fn power_is_right_associative() {
  assert_eq!(sexpr_of("2 ** 3 ** 2"), "(** 2 (** 3 2))");
  // unary minus binds tighter than `**`
  assert_eq!(sexpr_of("-2 ** 2"), "(** (neg 2) 2)");
  assert_eq!(sexpr_of("2 ** -3"), "(** 2 (neg 3))");
}

#[test]
fn logical_not_sits_between_et_and_comparisons() {
  assert_eq!(sexpr_of("non a == b"), "(non (== a b))");
  assert_eq!(sexpr_of("non a et b"), "(et (non a) b)");
  assert_eq!(sexpr_of("non non a"), "(non (non a))");
}

#[test]
fn equal_sign_is_equality_in_expression_position() {
  assert_eq!(sexpr_of("(x) = 1"), "(== x 1)");
  assert_eq!(sexpr_of("ecrire(x = 1)"), "(call ecrire (== x 1))");
}

#[test]
fn postfix_chains() {
  assert_eq!(sexpr_of("a.b[c].d"), "(field (index (field a b) c) d)");
  assert_eq!(sexpr_of("f(1, 2)(3)"), "(call (call f 1 2) 3)");
  assert_eq!(sexpr_of("carre(7)"), "(call carre 7)");
}

#[test]
fn literals() {
  assert_eq!(sexpr_of("42"), "42");
  assert_eq!(sexpr_of("2.5"), "2.5");
  assert_eq!(sexpr_of("vrai"), "vrai");
  assert_eq!(sexpr_of("FAUX"), "faux");
  assert_eq!(sexpr_of(r#""chat\n""#), "\"chat\\n\"");
  assert_eq!(sexpr_of("[1, 2, 3,]"), "(list 1 2 3)");
  assert_eq!(sexpr_of(r#"{"a": 1, "b": 2}"#), "(dict \"a\":1 \"b\":2)");
}

#[test]
fn huge_integers_widen_to_float() {
  let e = expr_of("99999999999999999999999999");
  assert!(matches!(
    &*e,
    ExprKind::Literal(l) if matches!(**l, Literal::Float(_))
  ));
}

#[test]
fn assignment_vs_equality_statements() {
  assert!(matches!(stmt_of("x = 1").into_inner(), StmtKind::Var(_)));
  assert!(matches!(stmt_of("x == 1").into_inner(), StmtKind::Expr(_)));
}

#[test]
fn index_assignment() {
  let stmt = stmt_of("x[0] = 5");
  assert!(matches!(stmt.into_inner(), StmtKind::SetIndex(_)));

  // chained subscripts assign through the last one
  let stmt = stmt_of("x[f(1)][2] = 3");
  let StmtKind::SetIndex(si) = stmt.into_inner() else {
    panic!("expected index assignment");
  };
  assert_eq!(sexpr(&si.target), "(index x (call f 1))");
  assert_eq!(sexpr(&si.index), "2");
  assert_eq!(sexpr(&si.value), "3");

  // an index read on the right stays an expression
  assert!(matches!(
    stmt_of("ecrire(x[0])").into_inner(),
    StmtKind::Expr(_)
  ));
}

#[test]
fn if_elif_else() {
  let src = indoc! {r#"
    miaou
    si a:
        ecrire 1
    sinon si b:
        ecrire 2
    sinon:
        ecrire 3
    meow
  "#};
  let program = parse_ok(src);
  let StmtKind::If(stmt) = &**program.body.first().unwrap() else {
    panic!("expected if");
  };
  assert_eq!(stmt.branches.len(), 2);
  assert!(stmt.default.is_some());
}

#[test]
fn alors_is_tolerated_before_the_colon() {
  let src = indoc! {r#"
    miaou
    si a alors:
        ecrire 1
    meow
  "#};
  parse_ok(src);
}

#[test]
fn single_line_bodies() {
  let src = indoc! {r#"
    miaou
    si v >= 10: ecrire "grand"
    sinon: ecrire "petit"
    meow
  "#};
  let program = parse_ok(src);
  assert_eq!(program.body.len(), 1);
}

#[test]
fn loops() {
  let src = indoc! {r#"
    miaou
    tant que x < 3:
        x = x + 1
    repeter 3 fois:
        ecrire compteur
    pour chaque c dans "chat":
        ecrire c
    meow
  "#};
  let program = parse_ok(src);
  assert!(matches!(&**program.body.first().unwrap(), StmtKind::While(_)));
  assert!(matches!(&*program.body[1], StmtKind::Repeat(_)));
  assert!(matches!(&*program.body[2], StmtKind::ForEach(_)));
}

#[test]
fn functions_and_return() {
  let src = indoc! {r#"
    miaou
    fonction carre(n):
        retour n * n
    fonction rien():
        retour
    meow
  "#};
  let program = parse_ok(src);
  let StmtKind::Func(f) = &**program.body.first().unwrap() else {
    panic!("expected function");
  };
  assert_eq!(f.name.to_string(), "carre");
  assert_eq!(f.params.len(), 1);
  assert!(matches!(
    &*f.body[0],
    StmtKind::Ctrl(c) if matches!(**c, Ctrl::Return(Some(_)))
  ));
}

#[test]
fn control_keywords_outside_their_construct() {
  assert_eq!(first_code("miaou\nretour 1\nmeow\n"), Code::E603);
  assert_eq!(first_code("miaou\nstop\nmeow\n"), Code::E401);
  assert_eq!(first_code("miaou\nsuivant\nmeow\n"), Code::E401);
  // a function body does not inherit an enclosing loop
  let src = indoc! {r#"
    miaou
    tant que x:
        fonction f():
            stop
    meow
  "#};
  assert_eq!(first_code(src), Code::E401);
}

#[test]
fn control_keywords_inside_loops() {
  let src = indoc! {r#"
    miaou
    tant que vrai:
        si x: stop
        suivant
    meow
  "#};
  parse_ok(src);
}

#[test]
fn try_except_forms() {
  let plain = parse_ok(indoc! {r#"
    miaou
    essayer:
        ecrire 1 / 0
    sauf:
        ecrire "oups"
    meow
  "#});
  let StmtKind::TryExcept(t) = &*plain.body[0] else {
    panic!("expected try");
  };
  assert!(t.err_name.is_none());

  let bound = parse_ok(indoc! {r#"
    miaou
    essayer:
        ecrire 1 / 0
    sauf erreur e:
        ecrire e
    meow
  "#});
  let StmtKind::TryExcept(t) = &*bound.body[0] else {
    panic!("expected try");
  };
  assert_eq!(t.err_name.as_ref().unwrap().to_string(), "e");

  // bare `erreur` binds under that name
  let default_name = parse_ok(indoc! {r#"
    miaou
    essayer:
        ecrire 1 / 0
    sauf erreur:
        ecrire "oups"
    meow
  "#});
  let StmtKind::TryExcept(t) = &*default_name.body[0] else {
    panic!("expected try");
  };
  assert_eq!(t.err_name.as_ref().unwrap().to_string(), "erreur");
}

#[test]
fn import_statement() {
  let program = parse_ok("miaou\nimporter util\nmeow\n");
  let StmtKind::Import(i) = &*program.body[0] else {
    panic!("expected import");
  };
  assert_eq!(i.name.to_string(), "util");
}

#[test]
fn program_markers() {
  assert_eq!(first_code("x = 1\nmeow\n"), Code::E001);
  assert_eq!(first_code("miaou\nx = 1\n"), Code::E002);
  // empty body is fine
  assert!(parse_ok("miaou\nmeow\n").body.is_empty());
  // trailing text after `meow` is ignored
  parse_ok("miaou\nmeow\nceci est apres la fin 123\n");
}

#[test]
fn block_errors() {
  assert_eq!(first_code("miaou\nsi x\n    ecrire x\nmeow\n"), Code::E104);
  assert_eq!(first_code("miaou\nsi x:\nmeow\n"), Code::E106);
  assert_eq!(first_code("miaou\necrire (1 + 2\nmeow\n"), Code::E105);
  assert_eq!(first_code("miaou\nx = [1, 2\nmeow\n"), Code::E105);
}

#[test]
fn command_style_calls() {
  assert_eq!(sexpr_of(r#"ecrire "bonjour""#), "(call ecrire \"bonjour\")");
  assert_eq!(sexpr_of("ecrire x, y + 1"), "(call ecrire x (+ y 1))");
  assert_eq!(sexpr_of("ecrire carre(7)"), "(call ecrire (call carre 7))");
  assert_eq!(
    sexpr_of("ecrire util.doubler(21)"),
    "(call ecrire (call (field util doubler) 21))"
  );
  // a bare expression stays a plain expression statement
  assert_eq!(sexpr_of("x + 1"), "(+ x 1)");
}

#[test]
fn two_word_builtin_call() {
  assert_eq!(
    sexpr_of(r#"demander texte("ton nom ?")"#),
    "(call demander texte \"ton nom ?\")"
  );
}

#[test]
fn multiple_errors_are_collected() {
  let src = indoc! {r#"
    miaou
    x = )
    y = )
    meow
  "#};
  let errors = parse_err(src);
  assert_eq!(errors.len(), 2);
}
