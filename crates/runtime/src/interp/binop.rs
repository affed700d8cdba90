//! Operator semantics: arithmetic with int→float widening, floored `//`
//! and `%`, comparisons, and indexing.

use diag::Code;
use span::Span;
use syntax::ast::{BinaryOp, UnaryOp};

use crate::value::{Key, Value};
use crate::{Result, RuntimeError};

pub(crate) fn binary(op: BinaryOp, left: Value, right: Value, span: Span) -> Result<Value> {
  use BinaryOp::*;
  match op {
    Add | Sub | Mul | Div | IntDiv | Rem | Pow => arith(op, left, right, span),
    Eq => Ok(Value::Bool(left == right)),
    Neq => Ok(Value::Bool(left != right)),
    Less | LessEq | More | MoreEq => compare(op, left, right, span),
    And | Or => unreachable!("short-circuit operators are handled by the evaluator"),
  }
}

pub(crate) fn unary(op: UnaryOp, right: Value, span: Span) -> Result<Value> {
  match op {
    UnaryOp::Not => Ok(Value::Bool(!right.is_truthy())),
    UnaryOp::Neg => match right {
      Value::Int(v) => Ok(
        v.checked_neg()
          .map(Value::Int)
          .unwrap_or(Value::Float(-(v as f64))),
      ),
      Value::Float(v) => Ok(Value::Float(-v)),
      other => Err(RuntimeError::new(
        Code::E202,
        format!("négation impossible sur {}", other.type_name()),
        span,
      )),
    },
  }
}

fn arith(op: BinaryOp, left: Value, right: Value, span: Span) -> Result<Value> {
  use BinaryOp::*;
  match (&left, &right) {
    (Value::Int(a), Value::Int(b)) => int_arith(op, *a, *b, span),
    (Value::Str(a), Value::Str(b)) if op == Add => Ok(Value::str(format!("{a}{b}"))),
    (Value::List(a), Value::List(b)) if op == Add => {
      let mut items = a.borrow().clone();
      items.extend(b.borrow().iter().cloned());
      Ok(Value::list(items))
    }
    _ => match (as_float(&left), as_float(&right)) {
      (Some(a), Some(b)) => float_arith(op, a, b, span),
      _ => Err(RuntimeError::new(
        Code::E202,
        format!(
          "opération `{}` impossible entre {} et {}",
          op_symbol(op),
          left.type_name(),
          right.type_name()
        ),
        span,
      )),
    },
  }
}

fn int_arith(op: BinaryOp, a: i64, b: i64, span: Span) -> Result<Value> {
  use BinaryOp::*;
  let widened = |v: Option<i64>, f: fn(f64, f64) -> f64| match v {
    Some(v) => Value::Int(v),
    // overflow promotes to float
    None => Value::Float(f(a as f64, b as f64)),
  };
  match op {
    Add => Ok(widened(a.checked_add(b), |x, y| x + y)),
    Sub => Ok(widened(a.checked_sub(b), |x, y| x - y)),
    Mul => Ok(widened(a.checked_mul(b), |x, y| x * y)),
    Div => {
      if b == 0 {
        return Err(div_by_zero(span));
      }
      // exact quotients stay integers
      if a % b == 0 {
        Ok(widened(a.checked_div(b), |x, y| x / y))
      } else {
        Ok(Value::Float(a as f64 / b as f64))
      }
    }
    IntDiv => {
      if b == 0 {
        return Err(div_by_zero(span));
      }
      Ok(widened(checked_div_floor(a, b), |x, y| (x / y).floor()))
    }
    Rem => {
      if b == 0 {
        return Err(div_by_zero(span));
      }
      Ok(Value::Int(rem_floor(a, b)))
    }
    Pow => match u32::try_from(b) {
      Ok(exp) => Ok(widened(a.checked_pow(exp), |x, y| x.powf(y))),
      // negative or huge exponents go through floats
      Err(_) => Ok(Value::Float((a as f64).powf(b as f64))),
    },
    _ => unreachable!("not an arithmetic operator"),
  }
}

fn float_arith(op: BinaryOp, a: f64, b: f64, span: Span) -> Result<Value> {
  use BinaryOp::*;
  match op {
    Add => Ok(Value::Float(a + b)),
    Sub => Ok(Value::Float(a - b)),
    Mul => Ok(Value::Float(a * b)),
    Div => {
      if b == 0.0 {
        return Err(div_by_zero(span));
      }
      Ok(Value::Float(a / b))
    }
    IntDiv => {
      if b == 0.0 {
        return Err(div_by_zero(span));
      }
      Ok(Value::Float((a / b).floor()))
    }
    Rem => {
      if b == 0.0 {
        return Err(div_by_zero(span));
      }
      // floored remainder: the sign follows the divisor
      Ok(Value::Float(a - b * (a / b).floor()))
    }
    Pow => Ok(Value::Float(a.powf(b))),
    _ => unreachable!("not an arithmetic operator"),
  }
}

fn compare(op: BinaryOp, left: Value, right: Value, span: Span) -> Result<Value> {
  use std::cmp::Ordering;

  let ordering = match (&left, &right) {
    (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
    (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
    _ => match (as_float(&left), as_float(&right)) {
      (Some(a), Some(b)) => a.partial_cmp(&b),
      _ => {
        return Err(RuntimeError::new(
          Code::E502,
          format!(
            "comparaison impossible entre {} et {}",
            left.type_name(),
            right.type_name()
          ),
          span,
        ))
      }
    },
  };

  // NaN never satisfies an ordering
  let Some(ordering) = ordering else {
    return Ok(Value::Bool(false));
  };
  let result = match op {
    BinaryOp::Less => ordering == Ordering::Less,
    BinaryOp::LessEq => ordering != Ordering::Greater,
    BinaryOp::More => ordering == Ordering::Greater,
    BinaryOp::MoreEq => ordering != Ordering::Less,
    _ => unreachable!("not a comparison operator"),
  };
  Ok(Value::Bool(result))
}

pub(crate) fn index_get(target: Value, index: Value, span: Span) -> Result<Value> {
  match &target {
    Value::List(list) => {
      let items = list.borrow();
      let i = list_index(&index, items.len(), span)?;
      Ok(items[i].clone())
    }
    Value::Str(text) => {
      let len = text.chars().count();
      let i = list_index(&index, len, span)?;
      Ok(Value::str(
        text.chars().nth(i).map(String::from).unwrap_or_default(),
      ))
    }
    Value::Dict(dict) => {
      let key = dict_key(&index, span)?;
      dict.borrow().get(&key).cloned().ok_or_else(|| {
        RuntimeError::new(Code::E703, format!("clé absente : `{key}`"), span)
      })
    }
    other => Err(RuntimeError::new(
      Code::E202,
      format!("indexation impossible sur {}", other.type_name()),
      span,
    )),
  }
}

pub(crate) fn index_set(target: Value, index: Value, value: Value, span: Span) -> Result<()> {
  match &target {
    Value::List(list) => {
      let mut items = list.borrow_mut();
      let i = list_index(&index, items.len(), span)?;
      items[i] = value;
      Ok(())
    }
    Value::Dict(dict) => {
      let key = dict_key(&index, span)?;
      dict.borrow_mut().insert(key, value);
      Ok(())
    }
    other => Err(RuntimeError::new(
      Code::E202,
      format!("affectation par indice impossible sur {}", other.type_name()),
      span,
    )),
  }
}

fn list_index(index: &Value, len: usize, span: Span) -> Result<usize> {
  let Value::Int(i) = index else {
    return Err(RuntimeError::new(
      Code::E704,
      format!("type d'indice invalide : {}", index.type_name()),
      span,
    ));
  };
  if *i < 0 || *i as usize >= len {
    return Err(RuntimeError::new(
      Code::E702,
      format!("indice hors limites : {i} (longueur {len})"),
      span,
    ));
  }
  Ok(*i as usize)
}

fn dict_key(index: &Value, span: Span) -> Result<Key> {
  Key::from_value(index).ok_or_else(|| {
    RuntimeError::new(
      Code::E705,
      format!("cette valeur ne peut pas servir de clé : {}", index.type_name()),
      span,
    )
  })
}

fn as_float(value: &Value) -> Option<f64> {
  match value {
    Value::Int(v) => Some(*v as f64),
    Value::Float(v) => Some(*v),
    _ => None,
  }
}

fn div_by_zero(span: Span) -> RuntimeError {
  RuntimeError::new(Code::E501, "division par zéro", span)
}

/// Floored division, `None` on `i64::MIN / -1`.
fn checked_div_floor(a: i64, b: i64) -> Option<i64> {
  let q = a.checked_div(b)?;
  let r = a % b;
  if r != 0 && (r < 0) != (b < 0) {
    Some(q - 1)
  } else {
    Some(q)
  }
}

/// Floored remainder: the sign matches the divisor and
/// `(a // b) * b + a % b == a`.
fn rem_floor(a: i64, b: i64) -> i64 {
  let r = a % b;
  if r != 0 && (r < 0) != (b < 0) {
    r + b
  } else {
    r
  }
}

fn op_symbol(op: BinaryOp) -> &'static str {
  use BinaryOp::*;
  match op {
    Add => "+",
    Sub => "-",
    Mul => "*",
    Div => "/",
    IntDiv => "//",
    Rem => "%",
    Pow => "**",
    Eq | Neq | Less | LessEq | More | MoreEq | And | Or => "?",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn span() -> Span {
    Span::default()
  }

  fn int_op(op: BinaryOp, a: i64, b: i64) -> Value {
    binary(op, Value::Int(a), Value::Int(b), span()).unwrap()
  }

  #[test]
  fn floored_division_identity() {
    for a in [-7i64, -3, 0, 3, 7, 10] {
      for b in [-4i64, -3, -1, 1, 2, 5] {
        let q = int_op(BinaryOp::IntDiv, a, b);
        let r = int_op(BinaryOp::Rem, a, b);
        let (Value::Int(q), Value::Int(r)) = (q, r) else {
          panic!("expected integers");
        };
        assert_eq!(q * b + r, a, "identity broken for {a} et {b}");
        // the sign of the remainder follows the divisor
        assert!(r == 0 || (r < 0) == (b < 0), "sign broken for {a} et {b}");
      }
    }
  }

  #[test]
  fn division_by_zero() {
    for op in [BinaryOp::Div, BinaryOp::IntDiv, BinaryOp::Rem] {
      let err = binary(op, Value::Int(1), Value::Int(0), span()).unwrap_err();
      assert_eq!(err.code, Code::E501);
    }
    let err = binary(BinaryOp::Div, Value::Float(1.0), Value::Float(0.0), span()).unwrap_err();
    assert_eq!(err.code, Code::E501);
  }

  #[test]
  fn exact_int_division_stays_int() {
    assert_eq!(int_op(BinaryOp::Div, 6, 2), Value::Int(3));
    assert_eq!(int_op(BinaryOp::Div, 7, 2), Value::Float(3.5));
  }

  #[test]
  fn overflow_widens_to_float() {
    let result = int_op(BinaryOp::Add, i64::MAX, 1);
    assert!(matches!(result, Value::Float(_)));
    let result = int_op(BinaryOp::Pow, 10, 40);
    assert!(matches!(result, Value::Float(_)));
  }

  #[test]
  fn plus_concatenates_text_and_lists() {
    let text = binary(BinaryOp::Add, Value::str("mia"), Value::str("ou"), span()).unwrap();
    assert_eq!(text, Value::str("miaou"));

    let l = Value::list(vec![Value::Int(1)]);
    let r = Value::list(vec![Value::Int(2), Value::Int(3)]);
    let joined = binary(BinaryOp::Add, l.clone(), r, span()).unwrap();
    assert_eq!(
      joined,
      Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
    // a fresh list: the operand is untouched
    assert_eq!(l, Value::list(vec![Value::Int(1)]));
  }

  #[test]
  fn mixed_type_addition_is_rejected() {
    let err = binary(BinaryOp::Add, Value::str("a"), Value::Int(1), span()).unwrap_err();
    assert_eq!(err.code, Code::E202);
  }

  #[test]
  fn comparisons() {
    assert_eq!(int_op(BinaryOp::Less, 1, 2), Value::Bool(true));
    assert_eq!(
      binary(BinaryOp::Less, Value::Int(1), Value::Float(1.5), span()).unwrap(),
      Value::Bool(true)
    );
    assert_eq!(
      binary(BinaryOp::More, Value::str("b"), Value::str("a"), span()).unwrap(),
      Value::Bool(true)
    );
    let err = binary(BinaryOp::Less, Value::str("a"), Value::Int(1), span()).unwrap_err();
    assert_eq!(err.code, Code::E502);
  }

  #[test]
  fn indexing() {
    let list = Value::list(vec![Value::Int(10), Value::Int(20)]);
    assert_eq!(
      index_get(list.clone(), Value::Int(1), span()).unwrap(),
      Value::Int(20)
    );
    assert_eq!(
      index_get(list.clone(), Value::Int(2), span()).unwrap_err().code,
      Code::E702
    );
    assert_eq!(
      index_get(list.clone(), Value::Int(-1), span()).unwrap_err().code,
      Code::E702
    );
    assert_eq!(
      index_get(list, Value::str("x"), span()).unwrap_err().code,
      Code::E704
    );

    let text = Value::str("chat");
    assert_eq!(
      index_get(text, Value::Int(1), span()).unwrap(),
      Value::str("h")
    );
  }

  #[test]
  fn index_assignment_mutates_shared_lists() {
    let list = Value::list(vec![Value::Int(1)]);
    let alias = list.clone();
    index_set(list, Value::Int(0), Value::Int(9), span()).unwrap();
    assert_eq!(alias, Value::list(vec![Value::Int(9)]));
  }
}
