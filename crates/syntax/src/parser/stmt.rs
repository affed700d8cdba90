use super::*;

impl<'src> Parser<'src> {
  pub(super) fn stmt(&mut self) -> Result<ast::Stmt> {
    check_recursion_limit(self.current().span)?;
    match self.current().kind {
      Kw_Si => self.if_stmt(),
      Kw_TantQue => self.while_stmt(),
      Kw_Repeter => self.repeat_stmt(),
      Kw_PourChaque => self.foreach_stmt(),
      Kw_Fonction => self.func_stmt(),
      Kw_Essayer => self.try_stmt(),
      Kw_Importer => self.import_stmt(),
      _ => self.simple_stmt(),
    }
  }

  fn simple_stmt(&mut self) -> Result<ast::Stmt> {
    match self.current().kind {
      Kw_Retour => self.return_stmt(),
      Kw_Stop => self.break_stmt(),
      Kw_Suivant => self.continue_stmt(),
      _ => self.assign_or_expr_stmt(),
    }
  }

  /// `:` then an indented block, or a single simple statement on the same
  /// line.
  fn body(&mut self) -> Result<Vec<ast::Stmt>> {
    check_recursion_limit(self.current().span)?;
    if !self.bump_if(Tok_Colon) {
      return Err(Error::new(
        Code::E104,
        format!(
          "deux-points `:` attendus avant le bloc (trouvé : `{}`)",
          self.current().kind.name()
        ),
        self.current().span,
      ));
    }

    if !self.current().is(Tok_Newline) {
      return Ok(vec![self.simple_stmt()?]);
    }
    self.bump(); // line break

    if !self.bump_if(Tok_Indent) {
      return Err(Error::new(Code::E106, "bloc vide", self.current().span));
    }

    let mut body = vec![];
    loop {
      self.skip_newlines();
      if self.bump_if(Tok_Dedent) || self.current().is(Tok_Eof) {
        break;
      }
      let stmt = self.stmt()?;
      body.push(stmt);
      self.end_of_stmt()?;
    }

    if body.is_empty() {
      return Err(Error::new(Code::E106, "bloc vide", self.previous().span));
    }
    Ok(body)
  }

  fn loop_body(&mut self) -> Result<Vec<ast::Stmt>> {
    self.loop_depth += 1;
    let body = self.body();
    self.loop_depth -= 1;
    body
  }

  fn if_stmt(&mut self) -> Result<ast::Stmt> {
    self.expect(Kw_Si)?;
    let start = self.previous().span;

    let mut branches = vec![self.if_branch()?];
    let mut default = None;

    while self.at_continuation(&[Kw_SinonSi, Kw_Sinon]) {
      if self.bump_if(Kw_SinonSi) {
        branches.push(self.if_branch()?);
      } else {
        self.bump(); // `sinon`
        default = Some(self.body()?);
        break;
      }
    }

    Ok(ast::if_stmt(
      start.join(self.previous().span),
      branches,
      default,
    ))
  }

  fn if_branch(&mut self) -> Result<ast::Branch> {
    let cond = self.expr()?;
    self.bump_if(Kw_Alors); // `si x alors:` and `si x:` both parse
    let body = self.body()?;
    Ok(ast::branch(cond, body))
  }

  fn while_stmt(&mut self) -> Result<ast::Stmt> {
    self.expect(Kw_TantQue)?;
    let start = self.previous().span;
    let cond = self.expr()?;
    let body = self.loop_body()?;
    Ok(ast::while_stmt(start.join(self.previous().span), cond, body))
  }

  /// `repeter EXPR fois :`
  fn repeat_stmt(&mut self) -> Result<ast::Stmt> {
    self.expect(Kw_Repeter)?;
    let start = self.previous().span;
    let count = self.expr()?;
    self.expect(Kw_Fois)?;
    let body = self.loop_body()?;
    Ok(ast::repeat_stmt(
      start.join(self.previous().span),
      count,
      body,
    ))
  }

  /// `pour chaque IDENT dans EXPR :`
  fn foreach_stmt(&mut self) -> Result<ast::Stmt> {
    self.expect(Kw_PourChaque)?;
    let start = self.previous().span;
    let item = self.ident()?;
    self.expect(Kw_Dans)?;
    let iter = self.expr()?;
    let body = self.loop_body()?;
    Ok(ast::foreach_stmt(
      start.join(self.previous().span),
      item,
      iter,
      body,
    ))
  }

  fn func_stmt(&mut self) -> Result<ast::Stmt> {
    self.expect(Kw_Fonction)?;
    let start = self.previous().span;
    let name = self.ident()?;
    let params = self.func_params()?;

    // `retour` becomes legal, `stop`/`suivant` do not reach out of the body
    let enclosing_loops = std::mem::take(&mut self.loop_depth);
    self.func_depth += 1;
    let body = self.body();
    self.func_depth -= 1;
    self.loop_depth = enclosing_loops;

    Ok(ast::func_stmt(
      start.join(self.previous().span),
      name,
      params,
      body?,
    ))
  }

  fn func_params(&mut self) -> Result<Vec<ast::Ident>> {
    self.expect(Brk_ParenL)?;
    let mut params: Vec<ast::Ident> = vec![];
    if !self.current().is(Brk_ParenR) {
      params.push(self.ident()?);
      while self.bump_if(Tok_Comma) && !self.current().is(Brk_ParenR) {
        let param = self.ident()?;
        if params.iter().any(|p| **p == **param) {
          return Err(Error::new(
            Code::E100,
            format!("paramètre en double : `{}`", *param),
            param.span,
          ));
        }
        params.push(param);
      }
    }
    self.expect_close(Brk_ParenR)?;
    Ok(params)
  }

  fn return_stmt(&mut self) -> Result<ast::Stmt> {
    if self.func_depth == 0 {
      return Err(Error::new(
        Code::E603,
        "`retour` en dehors d'une fonction",
        self.current().span,
      ));
    }

    self.expect(Kw_Retour)?;
    let start = self.previous().span;
    let value = if matches!(
      self.current().kind,
      Tok_Newline | Tok_Dedent | Tok_Eof | Kw_Meow
    ) {
      None
    } else {
      Some(self.expr()?)
    };
    Ok(ast::return_stmt(start.join(self.previous().span), value))
  }

  fn break_stmt(&mut self) -> Result<ast::Stmt> {
    if self.loop_depth == 0 {
      return Err(Error::new(
        Code::E401,
        "`stop` en dehors d'une boucle",
        self.current().span,
      ));
    }
    self.expect(Kw_Stop)?;
    Ok(ast::break_stmt(self.previous().span))
  }

  fn continue_stmt(&mut self) -> Result<ast::Stmt> {
    if self.loop_depth == 0 {
      return Err(Error::new(
        Code::E401,
        "`suivant` en dehors d'une boucle",
        self.current().span,
      ));
    }
    self.expect(Kw_Suivant)?;
    Ok(ast::continue_stmt(self.previous().span))
  }

  /// `essayer : ... sauf [erreur [IDENT]] : ...`
  fn try_stmt(&mut self) -> Result<ast::Stmt> {
    self.expect(Kw_Essayer)?;
    let start = self.previous().span;
    let body = self.body()?;

    if !self.at_continuation(&[Kw_Sauf]) {
      return Err(Error::new(
        Code::E100,
        format!(
          "symbole inattendu : `{}` (attendu : `sauf`)",
          self.current().kind.name()
        ),
        self.current().span,
      ));
    }
    self.bump(); // `sauf`

    let err_name = if self.bump_if(Kw_Erreur) {
      let kw_span = self.previous().span;
      if self.current().is(Lit_Ident) {
        Some(self.ident()?)
      } else {
        // bare `sauf erreur:` binds the error under `erreur` itself
        Some(Spanned::new(kw_span, "erreur".to_owned()))
      }
    } else {
      None
    };

    let handler = self.body()?;
    Ok(ast::try_stmt(
      start.join(self.previous().span),
      body,
      err_name,
      handler,
    ))
  }

  fn import_stmt(&mut self) -> Result<ast::Stmt> {
    self.expect(Kw_Importer)?;
    let start = self.previous().span;
    let name = self.ident()?;
    Ok(ast::import_stmt(start.join(name.span), name))
  }

  fn assign_or_expr_stmt(&mut self) -> Result<ast::Stmt> {
    if self.current().is(Lit_Ident) {
      if self.peek(1).is(Op_Equal) {
        let name = self.ident()?;
        self.bump(); // `=`
        let value = self.expr()?;
        return Ok(ast::var_stmt(name, value));
      }
      if self.peek(1).is(Brk_SquareL) && self.scan_index_assign() {
        return self.index_assign_stmt();
      }
    }

    let expr = self.expr()?;

    // command-style call, `ecrire "bonjour", x` — a named callee followed by
    // comma-separated arguments up to the end of the line
    if matches!(
      &*expr,
      ast::ExprKind::GetVar(_) | ast::ExprKind::GetField(_)
    ) && self.starts_expr()
    {
      let mut args = vec![self.expr()?];
      while self.bump_if(Tok_Comma) {
        args.push(self.expr()?);
      }
      let span = expr.span.join(self.previous().span);
      return Ok(ast::expr_stmt(ast::expr_call(span, expr, args)));
    }

    Ok(ast::expr_stmt(expr))
  }

  /// Could the current token begin a command argument? Operators never
  /// appear here: the expression parser already consumed them.
  fn starts_expr(&self) -> bool {
    matches!(
      self.current().kind,
      Lit_Int | Lit_Float | Lit_Bool | Lit_String | Lit_Ident | Brk_CurlyL | Kw_Non
    )
  }

  /// Decides `IDENT[...]... ] =` by scanning ahead with bracket matching,
  /// never past the end of the line.
  fn scan_index_assign(&self) -> bool {
    let last = self.tokens.len() - 1;
    let mut i = self.pos + 1;
    let mut depth = 0usize;
    loop {
      let token = &self.tokens[i.min(last)];
      match token.kind {
        Brk_SquareL | Brk_ParenL | Brk_CurlyL => depth += 1,
        Brk_SquareR | Brk_ParenR | Brk_CurlyR => {
          depth = depth.saturating_sub(1);
          if depth == 0 {
            if token.kind != Brk_SquareR {
              return false;
            }
            match self.tokens[(i + 1).min(last)].kind {
              Op_Equal => return true,
              Brk_SquareL => {}
              _ => return false,
            }
          }
        }
        Tok_Newline | Tok_Eof => return false,
        _ => {}
      }
      i += 1;
    }
  }

  fn index_assign_stmt(&mut self) -> Result<ast::Stmt> {
    let target = self.postfix_expr()?;
    self.expect(Op_Equal)?;
    let value = self.expr()?;
    let span = target.span.join(value.span);
    match target.into_inner() {
      ast::ExprKind::GetIndex(gi) => Ok(ast::set_index_stmt(span, gi.target, gi.index, value)),
      _ => Err(Error::new(
        Code::E100,
        "cible d'affectation invalide",
        span,
      )),
    }
  }
}
