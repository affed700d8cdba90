use std::path::PathBuf;
use std::rc::Rc;

use diag::Code;
use indexmap::IndexMap;
use span::Span;
use syntax::ast;

use crate::env::Env;
use crate::host::SourceReader;
use crate::module::{ModuleObject, ModuleRegistry, ModuleState};
use crate::native::BuiltinRegistry;
use crate::value::{Function, Key, Value};
use crate::{Result, RuntimeError};

mod binop;

/// The script a piece of code comes from. Functions keep a handle to their
/// defining script so errors raised from their bodies point at the right
/// file, wherever the call happens.
pub struct ScriptCtx {
  pub name: String,
  pub src: Rc<str>,
  pub dir: PathBuf,
}

impl ScriptCtx {
  pub fn new(name: impl Into<String>, src: impl Into<Rc<str>>, dir: impl Into<PathBuf>) -> Self {
    ScriptCtx {
      name: name.into(),
      src: src.into(),
      dir: dir.into(),
    }
  }
}

/// Statement outcome. `Return`/`Break`/`Continue` are control signals, not
/// errors; the innermost matching construct consumes them.
pub(crate) enum Flow {
  Normal,
  Return(Value),
  Break,
  Continue,
}

enum LoopSignal {
  Next,
  Stop,
  Return(Value),
}

/// The tree walker. Owns the builtin frame and the module cache; one
/// instance per independent interpretation.
pub struct Interp {
  builtins: Env,
  modules: ModuleRegistry,
  sources: Box<dyn SourceReader>,
  search_paths: Vec<PathBuf>,
  scripts: Vec<Rc<ScriptCtx>>,
}

impl Interp {
  /// Seeds the root frame from `registry` and picks up `MEOWLANG_PATH`.
  pub fn new(registry: &BuiltinRegistry, sources: Box<dyn SourceReader>) -> Self {
    let builtins = Env::root();
    for (name, native) in registry.items() {
      builtins.define(name, Value::Native(native.clone()));
    }
    let search_paths = std::env::var_os("MEOWLANG_PATH")
      .map(|raw| std::env::split_paths(&raw).collect())
      .unwrap_or_default();
    Self {
      builtins,
      modules: ModuleRegistry::new(),
      sources,
      search_paths,
      scripts: Vec::new(),
    }
  }

  /// Runs a program top to bottom in a fresh environment over the builtin
  /// frame. A program evaluates to nothing; its observable behavior flows
  /// through the host capabilities.
  pub fn evaluate(&mut self, program: &ast::Program, ctx: Rc<ScriptCtx>) -> Result<()> {
    let env = Env::child(&self.builtins);
    self.scripts.push(ctx);
    let result = self.exec_top(program, &env);
    self.scripts.pop();
    result
  }

  fn exec_top(&mut self, program: &ast::Program, env: &Env) -> Result<()> {
    for stmt in &program.body {
      match self.exec_stmt(stmt, env)? {
        Flow::Normal => {}
        Flow::Return(_) => {
          return Err(RuntimeError::new(
            Code::E603,
            "`retour` en dehors d'une fonction",
            stmt.span,
          ))
        }
        Flow::Break | Flow::Continue => {
          return Err(RuntimeError::new(
            Code::E401,
            "`stop` ou `suivant` en dehors d'une boucle",
            stmt.span,
          ))
        }
      }
    }
    Ok(())
  }

  fn script(&self) -> Rc<ScriptCtx> {
    self
      .scripts
      .last()
      .cloned()
      .expect("a script context is always pushed before execution")
  }

  fn exec_block(&mut self, stmts: &[ast::Stmt], env: &Env) -> Result<Flow> {
    for stmt in stmts {
      match self.exec_stmt(stmt, env)? {
        Flow::Normal => {}
        flow => return Ok(flow),
      }
    }
    Ok(Flow::Normal)
  }

  fn exec_stmt(&mut self, stmt: &ast::Stmt, env: &Env) -> Result<Flow> {
    let ctx = self.script();
    self
      .exec_stmt_inner(stmt, env)
      .map_err(|e| e.with_origin(&ctx.name, &ctx.src))
  }

  fn exec_stmt_inner(&mut self, stmt: &ast::Stmt, env: &Env) -> Result<Flow> {
    match &**stmt {
      ast::StmtKind::Var(v) => {
        let value = self.eval_expr(&v.value, env)?;
        env.assign(&v.name, value);
        Ok(Flow::Normal)
      }
      ast::StmtKind::SetIndex(s) => {
        let target = self.eval_expr(&s.target, env)?;
        let index = self.eval_expr(&s.index, env)?;
        let value = self.eval_expr(&s.value, env)?;
        binop::index_set(target, index, value, stmt.span)?;
        Ok(Flow::Normal)
      }
      ast::StmtKind::If(i) => {
        for branch in &i.branches {
          if self.eval_expr(&branch.cond, env)?.is_truthy() {
            return self.exec_block(&branch.body, env);
          }
        }
        if let Some(default) = &i.default {
          return self.exec_block(default, env);
        }
        Ok(Flow::Normal)
      }
      ast::StmtKind::While(w) => {
        while self.eval_expr(&w.cond, env)?.is_truthy() {
          match self.loop_body(&w.body, env)? {
            LoopSignal::Next => {}
            LoopSignal::Stop => break,
            LoopSignal::Return(v) => return Ok(Flow::Return(v)),
          }
        }
        Ok(Flow::Normal)
      }
      ast::StmtKind::Repeat(r) => {
        let count = self.eval_expr(&r.count, env)?;
        let count = repeat_count(&count, r.count.span)?;
        for i in 0..count {
          let frame = Env::child(env);
          frame.define("compteur", Value::Int(i));
          match self.loop_body(&r.body, &frame)? {
            LoopSignal::Next => {}
            LoopSignal::Stop => break,
            LoopSignal::Return(v) => return Ok(Flow::Return(v)),
          }
        }
        Ok(Flow::Normal)
      }
      ast::StmtKind::ForEach(fe) => self.exec_foreach(fe, env),
      ast::StmtKind::Func(def) => {
        let function = Function {
          def: def.clone(),
          env: env.clone(),
          ctx: self.script(),
        };
        env.define((*def.name).clone(), Value::Func(Rc::new(function)));
        Ok(Flow::Normal)
      }
      ast::StmtKind::Ctrl(c) => match &**c {
        ast::Ctrl::Return(value) => {
          let value = match value {
            Some(expr) => self.eval_expr(expr, env)?,
            None => Value::Nothing,
          };
          Ok(Flow::Return(value))
        }
        ast::Ctrl::Break => Ok(Flow::Break),
        ast::Ctrl::Continue => Ok(Flow::Continue),
      },
      ast::StmtKind::TryExcept(t) => match self.exec_block(&t.body, env) {
        Ok(flow) => Ok(flow),
        Err(e) if e.is_catchable() => {
          let frame = Env::child(env);
          if let Some(name) = &t.err_name {
            frame.define((**name).clone(), error_value(&e));
          }
          self.exec_block(&t.handler, &frame)
        }
        Err(e) => Err(e),
      },
      ast::StmtKind::Import(i) => {
        self.import_module(&i.name, i.name.span, env)?;
        Ok(Flow::Normal)
      }
      ast::StmtKind::Expr(e) => {
        self.eval_expr(e, env)?;
        Ok(Flow::Normal)
      }
    }
  }

  fn loop_body(&mut self, body: &[ast::Stmt], env: &Env) -> Result<LoopSignal> {
    match self.exec_block(body, env)? {
      Flow::Normal | Flow::Continue => Ok(LoopSignal::Next),
      Flow::Break => Ok(LoopSignal::Stop),
      Flow::Return(v) => Ok(LoopSignal::Return(v)),
    }
  }

  fn exec_foreach(&mut self, fe: &ast::ForEach, env: &Env) -> Result<Flow> {
    let iter = self.eval_expr(&fe.iter, env)?;
    let name: &str = &fe.item;

    macro_rules! iterate {
      ($item:expr) => {{
        let frame = Env::child(env);
        frame.define(name, $item);
        match self.loop_body(&fe.body, &frame)? {
          LoopSignal::Next => {}
          LoopSignal::Stop => break,
          LoopSignal::Return(v) => return Ok(Flow::Return(v)),
        }
      }};
    }

    match iter {
      Value::List(list) => {
        // index-based so the body may grow or shrink the list
        let mut i = 0;
        loop {
          let item = {
            let items = list.borrow();
            match items.get(i) {
              Some(item) => item.clone(),
              None => break,
            }
          };
          i += 1;
          iterate!(item);
        }
      }
      Value::Dict(dict) => {
        let keys: Vec<Key> = dict.borrow().keys().cloned().collect();
        for key in keys {
          iterate!(key.to_value());
        }
      }
      Value::Str(text) => {
        for ch in text.chars() {
          iterate!(Value::str(ch.to_string()));
        }
      }
      other => {
        return Err(RuntimeError::new(
          Code::E701,
          format!("cette valeur n'est pas itérable : {}", other.type_name()),
          fe.iter.span,
        ))
      }
    }

    Ok(Flow::Normal)
  }

  pub(crate) fn eval_expr(&mut self, expr: &ast::Expr, env: &Env) -> Result<Value> {
    match &**expr {
      ast::ExprKind::Literal(lit) => self.eval_literal(lit, env),
      ast::ExprKind::GetVar(v) => env.get(&v.name).ok_or_else(|| {
        RuntimeError::new(
          Code::E200,
          format!("nom non défini : `{}`", v.name),
          v.name.span,
        )
      }),
      ast::ExprKind::Binary(b) => match b.op {
        // `et`/`ou` short-circuit and return the deciding operand unchanged
        ast::BinaryOp::And => {
          let left = self.eval_expr(&b.left, env)?;
          if !left.is_truthy() {
            return Ok(left);
          }
          self.eval_expr(&b.right, env)
        }
        ast::BinaryOp::Or => {
          let left = self.eval_expr(&b.left, env)?;
          if left.is_truthy() {
            return Ok(left);
          }
          self.eval_expr(&b.right, env)
        }
        op => {
          let left = self.eval_expr(&b.left, env)?;
          let right = self.eval_expr(&b.right, env)?;
          binop::binary(op, left, right, expr.span)
        }
      },
      ast::ExprKind::Unary(u) => {
        let right = self.eval_expr(&u.right, env)?;
        binop::unary(u.op, right, expr.span)
      }
      ast::ExprKind::Call(c) => {
        let callee = self.eval_expr(&c.target, env)?;
        let mut args = Vec::with_capacity(c.args.len());
        for arg in &c.args {
          args.push(self.eval_expr(arg, env)?);
        }
        self.call_value(callee, args, expr.span)
      }
      ast::ExprKind::GetIndex(g) => {
        let target = self.eval_expr(&g.target, env)?;
        let index = self.eval_expr(&g.index, env)?;
        binop::index_get(target, index, expr.span)
      }
      ast::ExprKind::GetField(g) => {
        let target = self.eval_expr(&g.target, env)?;
        match target {
          Value::Module(module) => module.get(&g.name).ok_or_else(|| {
            RuntimeError::new(
              Code::E201,
              format!("membre inconnu : `{}.{}`", module.name, *g.name),
              g.name.span,
            )
          }),
          other => Err(RuntimeError::new(
            Code::E202,
            format!("accès par membre impossible sur {}", other.type_name()),
            expr.span,
          )),
        }
      }
    }
  }

  fn eval_literal(&mut self, lit: &ast::Literal, env: &Env) -> Result<Value> {
    Ok(match lit {
      ast::Literal::Int(v) => Value::Int(*v),
      ast::Literal::Float(v) => Value::Float(*v),
      ast::Literal::Bool(v) => Value::Bool(*v),
      ast::Literal::String(v) => Value::str(v),
      ast::Literal::List(items) => {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
          values.push(self.eval_expr(item, env)?);
        }
        Value::list(values)
      }
      ast::Literal::Dict(pairs) => {
        let mut map = IndexMap::with_capacity(pairs.len());
        for (key_expr, value_expr) in pairs {
          let key = self.eval_expr(key_expr, env)?;
          let key = Key::from_value(&key).ok_or_else(|| {
            RuntimeError::new(
              Code::E705,
              format!("cette valeur ne peut pas servir de clé : {}", key.type_name()),
              key_expr.span,
            )
          })?;
          let value = self.eval_expr(value_expr, env)?;
          // later duplicates overwrite earlier entries
          map.insert(key, value);
        }
        Value::dict(map)
      }
    })
  }

  pub(crate) fn call_value(&mut self, callee: Value, args: Vec<Value>, span: Span) -> Result<Value> {
    match callee {
      Value::Func(f) => {
        if args.len() != f.def.params.len() {
          return Err(RuntimeError::new(
            Code::E601,
            format!(
              "la fonction `{}` attend {} argument(s), reçu {}",
              f.def.name,
              f.def.params.len(),
              args.len()
            ),
            span,
          ));
        }
        // lexical scope: the frame hangs off the captured environment
        let frame = Env::child(&f.env);
        for (param, arg) in f.def.params.iter().zip(args) {
          frame.define((**param).clone(), arg);
        }
        self.scripts.push(f.ctx.clone());
        let flow = self.exec_block(&f.def.body, &frame);
        self.scripts.pop();
        match flow? {
          Flow::Return(v) => Ok(v),
          Flow::Normal => Ok(Value::Nothing),
          Flow::Break | Flow::Continue => Err(RuntimeError::new(
            Code::E401,
            "`stop` ou `suivant` en dehors d'une boucle",
            span,
          )),
        }
      }
      Value::Native(native) => {
        if !native.arity.accepts(args.len()) {
          return Err(RuntimeError::new(
            Code::E601,
            format!(
              "la fonction `{}` attend {}, reçu {}",
              native.name,
              native.arity.describe(),
              args.len()
            ),
            span,
          ));
        }
        native
          .call(&args)
          .map_err(|e| RuntimeError::new(e.code, e.message, span))
      }
      other => Err(RuntimeError::new(
        Code::E602,
        format!("cette valeur n'est pas appelable : {}", other.type_name()),
        span,
      )),
    }
  }

  /// `importer NAME`: resolve, execute once, cache by canonical path.
  fn import_module(&mut self, name: &str, span: Span, env: &Env) -> Result<()> {
    let (path, src) = self.resolve_module(name, span)?;

    if let Some(state) = self.modules.get(&path) {
      let module = match state {
        ModuleState::Ready(module) => module.clone(),
        // import cycle: expose what the module has defined so far
        ModuleState::Loading(module_env) => {
          Rc::new(ModuleObject::capture(name, &path, module_env))
        }
      };
      env.define(name, Value::Module(module));
      return Ok(());
    }

    let program = syntax::parse(&src).map_err(|errors| {
      let detail = errors
        .first()
        .map(|e| e.message.to_string())
        .unwrap_or_else(|| "erreur de syntaxe".to_owned());
      RuntimeError::new(
        Code::E902,
        format!("le module `{name}` contient des erreurs : {detail}"),
        span,
      )
    })?;

    let module_env = Env::child(&self.builtins);
    self.modules.begin(path.clone(), module_env.clone());

    let dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| PathBuf::from("."));
    let ctx = Rc::new(ScriptCtx::new(format!("{name}.miaou"), src, dir));
    self.scripts.push(ctx);
    let result = self.exec_top(&program, &module_env);
    self.scripts.pop();

    match result {
      Ok(()) => {
        let module = Rc::new(ModuleObject::capture(name, &path, &module_env));
        self.modules.finish(&path, module.clone());
        env.define(name, Value::Module(module));
        Ok(())
      }
      Err(e) => {
        self.modules.abort(&path);
        Err(RuntimeError::new(
          Code::E902,
          format!("le module `{name}` a échoué : {}", e.message),
          span,
        ))
      }
    }
  }

  fn resolve_module(&mut self, name: &str, span: Span) -> Result<(PathBuf, String)> {
    let mut dirs = vec![self.script().dir.clone()];
    dirs.extend(self.search_paths.iter().cloned());

    for dir in dirs {
      let candidate = dir.join(format!("{name}.miaou"));
      if let Ok(src) = self.sources.read(&candidate) {
        let path = std::fs::canonicalize(&candidate).unwrap_or(candidate);
        return Ok((path, src));
      }
    }

    Err(RuntimeError::new(
      Code::E901,
      format!("module introuvable : `{name}`"),
      span,
    ))
  }
}

/// `repeter` counts: non-negative integers, or floats with no fraction.
fn repeat_count(value: &Value, span: Span) -> Result<i64> {
  match value {
    Value::Int(n) if *n >= 0 => Ok(*n),
    Value::Float(f) if *f >= 0.0 && f.fract() == 0.0 && *f <= i64::MAX as f64 => Ok(*f as i64),
    _ => Err(RuntimeError::new(
      Code::E503,
      format!("nombre de répétitions invalide : {value}"),
      span,
    )),
  }
}

/// The `{code, message, ligne}` dictionary bound by `sauf erreur NOM`.
fn error_value(e: &RuntimeError) -> Value {
  let mut map = IndexMap::new();
  map.insert(Key::Str(Rc::from("code")), Value::str(e.code.as_str()));
  map.insert(Key::Str(Rc::from("message")), Value::str(&e.message));
  map.insert(
    Key::Str(Rc::from("ligne")),
    match e.line() {
      Some(line) => Value::Int(line as i64),
      None => Value::Nothing,
    },
  );
  Value::dict(map)
}
