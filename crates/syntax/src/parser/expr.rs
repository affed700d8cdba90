use super::*;

impl<'src> Parser<'src> {
  pub(super) fn expr(&mut self) -> Result<ast::Expr> {
    self.or_expr()
  }

  fn or_expr(&mut self) -> Result<ast::Expr> {
    let mut left = self.and_expr()?;
    while self.bump_if(Kw_Ou) {
      let right = self.and_expr()?;
      left = ast::expr_binary(ast::BinaryOp::Or, left, right);
    }
    Ok(left)
  }

  fn and_expr(&mut self) -> Result<ast::Expr> {
    let mut left = self.not_expr()?;
    while self.bump_if(Kw_Et) {
      let right = self.not_expr()?;
      left = ast::expr_binary(ast::BinaryOp::And, left, right);
    }
    Ok(left)
  }

  fn not_expr(&mut self) -> Result<ast::Expr> {
    if self.bump_if(Kw_Non) {
      let start = self.previous().span;
      let right = self.not_expr()?;
      let span = start.join(right.span);
      return Ok(ast::expr_unary(span, ast::UnaryOp::Not, right));
    }
    self.cmp_expr()
  }

  /// One flat comparison level; `=` in expression position means equality.
  fn cmp_expr(&mut self) -> Result<ast::Expr> {
    let mut left = self.add_expr()?;
    loop {
      let op = match self.current().kind {
        Op_EqualEqual | Op_Equal => ast::BinaryOp::Eq,
        Op_BangEqual => ast::BinaryOp::Neq,
        Op_Less => ast::BinaryOp::Less,
        Op_LessEqual => ast::BinaryOp::LessEq,
        Op_More => ast::BinaryOp::More,
        Op_MoreEqual => ast::BinaryOp::MoreEq,
        _ => break,
      };
      self.bump(); // bump operator
      let right = self.add_expr()?;
      left = ast::expr_binary(op, left, right);
    }
    Ok(left)
  }

  fn add_expr(&mut self) -> Result<ast::Expr> {
    let mut left = self.mul_expr()?;
    loop {
      let op = match self.current().kind {
        Op_Plus => ast::BinaryOp::Add,
        Op_Minus => ast::BinaryOp::Sub,
        _ => break,
      };
      self.bump(); // bump operator
      let right = self.mul_expr()?;
      left = ast::expr_binary(op, left, right);
    }
    Ok(left)
  }

  fn mul_expr(&mut self) -> Result<ast::Expr> {
    let mut left = self.pow_expr()?;
    loop {
      let op = match self.current().kind {
        Op_Star => ast::BinaryOp::Mul,
        Op_Slash => ast::BinaryOp::Div,
        Op_SlashSlash => ast::BinaryOp::IntDiv,
        Op_Percent => ast::BinaryOp::Rem,
        _ => break,
      };
      self.bump(); // bump operator
      let right = self.pow_expr()?;
      left = ast::expr_binary(op, left, right);
    }
    Ok(left)
  }

  /// `**` is right-associative.
  fn pow_expr(&mut self) -> Result<ast::Expr> {
    let left = self.unary_expr()?;
    if self.bump_if(Op_StarStar) {
      let right = self.pow_expr()?;
      return Ok(ast::expr_binary(ast::BinaryOp::Pow, left, right));
    }
    Ok(left)
  }

  fn unary_expr(&mut self) -> Result<ast::Expr> {
    if self.bump_if(Op_Minus) {
      let start = self.previous().span;
      let right = self.unary_expr()?;
      let span = start.join(right.span);
      return Ok(ast::expr_unary(span, ast::UnaryOp::Neg, right));
    }
    self.postfix_expr()
  }

  pub(super) fn postfix_expr(&mut self) -> Result<ast::Expr> {
    let mut expr = self.primary_expr()?;
    loop {
      match self.current().kind {
        Brk_ParenL => {
          let args = self.call_args()?; // bumps `(`
          expr = ast::expr_call(expr.span.join(self.previous().span), expr, args);
        }
        Brk_SquareL => {
          self.bump(); // bump `[`
          let index = self.expr()?;
          self.expect_close(Brk_SquareR)?;
          expr = ast::expr_index(expr.span.join(self.previous().span), expr, index);
        }
        Op_Dot => {
          self.bump(); // bump `.`
          let name = self.ident()?;
          expr = ast::expr_field(expr.span.join(name.span), expr, name);
        }
        _ => break,
      }
    }
    Ok(expr)
  }

  fn primary_expr(&mut self) -> Result<ast::Expr> {
    check_recursion_limit(self.current().span)?;

    if self.bump_if(Lit_Bool) {
      let token = self.previous().clone();
      return Ok(ast::lit::bool(token.span, self.lexeme(&token)));
    }

    if self.bump_if(Lit_Int) {
      let token = self.previous().clone();
      return Ok(ast::lit::int(token.span, self.lexeme(&token)));
    }

    if self.bump_if(Lit_Float) {
      let token = self.previous().clone();
      return Ok(ast::lit::float(token.span, self.lexeme(&token)));
    }

    if self.bump_if(Lit_String) {
      let token = self.previous().clone();
      return Ok(ast::lit::str(token.span, self.lexeme(&token)));
    }

    if self.current().is(Lit_Ident) {
      return Ok(ast::expr_get_var(self.ident()?));
    }

    if self.bump_if(Brk_SquareL) {
      let start = self.previous().span;

      let mut items = vec![];
      if !self.current().is(Brk_SquareR) {
        items.push(self.expr()?);
        while self.bump_if(Tok_Comma) && !self.current().is(Brk_SquareR) {
          items.push(self.expr()?);
        }
      }

      self.expect_close(Brk_SquareR)?;
      return Ok(ast::expr_list(start.join(self.previous().span), items));
    }

    if self.bump_if(Brk_CurlyL) {
      let start = self.previous().span;

      let mut pairs = vec![];
      if !self.current().is(Brk_CurlyR) {
        pairs.push(self.dict_pair()?);
        while self.bump_if(Tok_Comma) && !self.current().is(Brk_CurlyR) {
          pairs.push(self.dict_pair()?);
        }
      }

      self.expect_close(Brk_CurlyR)?;
      return Ok(ast::expr_dict(start.join(self.previous().span), pairs));
    }

    if self.bump_if(Brk_ParenL) {
      let expr = self.expr()?;
      self.expect_close(Brk_ParenR)?;
      return Ok(expr);
    }

    Err(Error::new(
      Code::E100,
      format!("symbole inattendu : `{}`", self.current().kind.name()),
      self.current().span,
    ))
  }

  fn dict_pair(&mut self) -> Result<(ast::Expr, ast::Expr)> {
    let key = self.expr()?;
    self.expect(Tok_Colon)?;
    let value = self.expr()?;
    Ok((key, value))
  }

  fn call_args(&mut self) -> Result<Vec<ast::Expr>> {
    self.expect(Brk_ParenL)?;
    let mut args = vec![];
    if !self.current().is(Brk_ParenR) {
      args.push(self.expr()?);
      while self.bump_if(Tok_Comma) && !self.current().is(Brk_ParenR) {
        args.push(self.expr()?);
      }
    }
    self.expect_close(Brk_ParenR)?;
    Ok(args)
  }
}
