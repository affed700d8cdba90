//! Syntax tree for MeowLang.
//!
//! Nodes own their strings: module sources are parsed at runtime and their
//! trees are cached past the life of the source buffer. Function bodies sit
//! behind [`Rc`] so closures can share them without cloning the tree.

use std::rc::Rc;

use span::{Span, Spanned};

pub type Ident = Spanned<String>;

#[cfg_attr(test, derive(Debug))]
pub struct Program {
  pub body: Vec<Stmt>,
}

impl Program {
  pub fn new() -> Self {
    Self { body: vec![] }
  }
}

impl Default for Program {
  fn default() -> Self {
    Self::new()
  }
}

pub type Stmt = Spanned<StmtKind>;

#[cfg_attr(test, derive(Debug))]
pub enum StmtKind {
  Var(Box<Var>),
  SetIndex(Box<SetIndex>),
  If(Box<If>),
  While(Box<While>),
  Repeat(Box<Repeat>),
  ForEach(Box<ForEach>),
  Func(Rc<Func>),
  Ctrl(Box<Ctrl>),
  TryExcept(Box<TryExcept>),
  Import(Box<Import>),
  Expr(Box<Expr>),
}

#[cfg_attr(test, derive(Debug))]
pub struct Var {
  pub name: Ident,
  pub value: Expr,
}

#[cfg_attr(test, derive(Debug))]
pub struct SetIndex {
  pub target: Expr,
  pub index: Expr,
  pub value: Expr,
}

#[cfg_attr(test, derive(Debug))]
pub struct If {
  pub branches: Vec<Branch>,
  pub default: Option<Vec<Stmt>>,
}

#[cfg_attr(test, derive(Debug))]
pub struct Branch {
  pub cond: Expr,
  pub body: Vec<Stmt>,
}

#[cfg_attr(test, derive(Debug))]
pub struct While {
  pub cond: Expr,
  pub body: Vec<Stmt>,
}

#[cfg_attr(test, derive(Debug))]
pub struct Repeat {
  pub count: Expr,
  pub body: Vec<Stmt>,
}

#[cfg_attr(test, derive(Debug))]
pub struct ForEach {
  pub item: Ident,
  pub iter: Expr,
  pub body: Vec<Stmt>,
}

#[cfg_attr(test, derive(Debug))]
pub struct Func {
  pub name: Ident,
  pub params: Vec<Ident>,
  pub body: Vec<Stmt>,
}

#[cfg_attr(test, derive(Debug))]
pub enum Ctrl {
  Return(Option<Expr>),
  Break,
  Continue,
}

#[cfg_attr(test, derive(Debug))]
pub struct TryExcept {
  pub body: Vec<Stmt>,
  pub err_name: Option<Ident>,
  pub handler: Vec<Stmt>,
}

#[cfg_attr(test, derive(Debug))]
pub struct Import {
  pub name: Ident,
}

pub type Expr = Spanned<ExprKind>;

#[cfg_attr(test, derive(Debug))]
pub enum ExprKind {
  Literal(Box<Literal>),
  GetVar(Box<GetVar>),
  Binary(Box<Binary>),
  Unary(Box<Unary>),
  Call(Box<Call>),
  GetIndex(Box<GetIndex>),
  GetField(Box<GetField>),
}

#[cfg_attr(test, derive(Debug))]
pub enum Literal {
  Int(i64),
  Float(f64),
  Bool(bool),
  String(String),
  List(Vec<Expr>),
  Dict(Vec<(Expr, Expr)>),
}

#[cfg_attr(test, derive(Debug))]
pub struct GetVar {
  pub name: Ident,
}

#[cfg_attr(test, derive(Debug))]
pub struct Binary {
  pub op: BinaryOp,
  pub left: Expr,
  pub right: Expr,
}

#[cfg_attr(test, derive(Debug))]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  IntDiv,
  Rem,
  Pow,
  Eq,
  Neq,
  Less,
  LessEq,
  More,
  MoreEq,
  And,
  Or,
}

#[cfg_attr(test, derive(Debug))]
pub struct Unary {
  pub op: UnaryOp,
  pub right: Expr,
}

#[cfg_attr(test, derive(Debug))]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
  Neg,
  Not,
}

#[cfg_attr(test, derive(Debug))]
pub struct Call {
  pub target: Expr,
  pub args: Vec<Expr>,
}

#[cfg_attr(test, derive(Debug))]
pub struct GetIndex {
  pub target: Expr,
  pub index: Expr,
}

#[cfg_attr(test, derive(Debug))]
pub struct GetField {
  pub target: Expr,
  pub name: Ident,
}

pub fn var_stmt(name: Ident, value: Expr) -> Stmt {
  Stmt::new(
    name.span.join(value.span),
    StmtKind::Var(Box::new(Var { name, value })),
  )
}

pub fn set_index_stmt(s: impl Into<Span>, target: Expr, index: Expr, value: Expr) -> Stmt {
  Stmt::new(
    s,
    StmtKind::SetIndex(Box::new(SetIndex {
      target,
      index,
      value,
    })),
  )
}

pub fn if_stmt(s: impl Into<Span>, branches: Vec<Branch>, default: Option<Vec<Stmt>>) -> Stmt {
  Stmt::new(s, StmtKind::If(Box::new(If { branches, default })))
}

pub fn branch(cond: Expr, body: Vec<Stmt>) -> Branch {
  Branch { cond, body }
}

pub fn while_stmt(s: impl Into<Span>, cond: Expr, body: Vec<Stmt>) -> Stmt {
  Stmt::new(s, StmtKind::While(Box::new(While { cond, body })))
}

pub fn repeat_stmt(s: impl Into<Span>, count: Expr, body: Vec<Stmt>) -> Stmt {
  Stmt::new(s, StmtKind::Repeat(Box::new(Repeat { count, body })))
}

pub fn foreach_stmt(s: impl Into<Span>, item: Ident, iter: Expr, body: Vec<Stmt>) -> Stmt {
  Stmt::new(s, StmtKind::ForEach(Box::new(ForEach { item, iter, body })))
}

pub fn func_stmt(s: impl Into<Span>, name: Ident, params: Vec<Ident>, body: Vec<Stmt>) -> Stmt {
  Stmt::new(s, StmtKind::Func(Rc::new(Func { name, params, body })))
}

pub fn return_stmt(s: impl Into<Span>, value: Option<Expr>) -> Stmt {
  Stmt::new(s, StmtKind::Ctrl(Box::new(Ctrl::Return(value))))
}

pub fn break_stmt(s: impl Into<Span>) -> Stmt {
  Stmt::new(s, StmtKind::Ctrl(Box::new(Ctrl::Break)))
}

pub fn continue_stmt(s: impl Into<Span>) -> Stmt {
  Stmt::new(s, StmtKind::Ctrl(Box::new(Ctrl::Continue)))
}

pub fn try_stmt(
  s: impl Into<Span>,
  body: Vec<Stmt>,
  err_name: Option<Ident>,
  handler: Vec<Stmt>,
) -> Stmt {
  Stmt::new(
    s,
    StmtKind::TryExcept(Box::new(TryExcept {
      body,
      err_name,
      handler,
    })),
  )
}

pub fn import_stmt(s: impl Into<Span>, name: Ident) -> Stmt {
  Stmt::new(s, StmtKind::Import(Box::new(Import { name })))
}

pub fn expr_stmt(expr: Expr) -> Stmt {
  Stmt::new(expr.span, StmtKind::Expr(Box::new(expr)))
}

pub fn expr_binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
  Expr::new(
    left.span.join(right.span),
    ExprKind::Binary(Box::new(Binary { op, left, right })),
  )
}

pub fn expr_unary(s: impl Into<Span>, op: UnaryOp, right: Expr) -> Expr {
  Expr::new(s, ExprKind::Unary(Box::new(Unary { op, right })))
}

pub fn expr_call(s: impl Into<Span>, target: Expr, args: Vec<Expr>) -> Expr {
  Expr::new(s, ExprKind::Call(Box::new(Call { target, args })))
}

pub fn expr_index(s: impl Into<Span>, target: Expr, index: Expr) -> Expr {
  Expr::new(s, ExprKind::GetIndex(Box::new(GetIndex { target, index })))
}

pub fn expr_field(s: impl Into<Span>, target: Expr, name: Ident) -> Expr {
  Expr::new(s, ExprKind::GetField(Box::new(GetField { target, name })))
}

pub fn expr_get_var(name: Ident) -> Expr {
  Expr::new(name.span, ExprKind::GetVar(Box::new(GetVar { name })))
}

pub fn expr_list(s: impl Into<Span>, items: Vec<Expr>) -> Expr {
  Expr::new(s, ExprKind::Literal(Box::new(Literal::List(items))))
}

pub fn expr_dict(s: impl Into<Span>, pairs: Vec<(Expr, Expr)>) -> Expr {
  Expr::new(s, ExprKind::Literal(Box::new(Literal::Dict(pairs))))
}

pub mod lit {
  use span::Span;

  use super::*;

  pub fn bool(s: impl Into<Span>, lexeme: &str) -> Expr {
    let v = lexeme.eq_ignore_ascii_case("vrai");
    Expr::new(s, ExprKind::Literal(Box::new(Literal::Bool(v))))
  }

  /// Integers that overflow `i64` widen to a float.
  pub fn int(s: impl Into<Span>, lexeme: &str) -> Expr {
    let s = s.into();
    let lit = match lexeme.parse::<i64>() {
      Ok(v) => Literal::Int(v),
      Err(_) => Literal::Float(lexeme.parse().unwrap_or(f64::INFINITY)),
    };
    Expr::new(s, ExprKind::Literal(Box::new(lit)))
  }

  pub fn float(s: impl Into<Span>, lexeme: &str) -> Expr {
    let s = s.into();
    let v = lexeme.parse().unwrap_or(f64::INFINITY);
    Expr::new(s, ExprKind::Literal(Box::new(Literal::Float(v))))
  }

  pub fn str(s: impl Into<Span>, lexeme: &str) -> Expr {
    let lexeme = lexeme.strip_prefix('"').unwrap_or(lexeme);
    let lexeme = lexeme.strip_suffix('"').unwrap_or(lexeme);
    Expr::new(
      s,
      ExprKind::Literal(Box::new(Literal::String(unescape(lexeme)))),
    )
  }

  /// Resolves `\n \t \r \\ \"`. Unknown escapes keep both characters.
  fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
      if ch != '\\' {
        out.push(ch);
        continue;
      }
      match chars.next() {
        Some('n') => out.push('\n'),
        Some('t') => out.push('\t'),
        Some('r') => out.push('\r'),
        Some('\\') => out.push('\\'),
        Some('"') => out.push('"'),
        Some(other) => {
          out.push(ch);
          out.push(other);
        }
        None => out.push(ch),
      }
    }
    out
  }
}
