//! The standard builtin registry: every native callable MeowLang programs
//! see by default, written against the host capabilities so embedders can
//! swap the terminal, the clock or the randomness source.

use std::cell::RefCell;
use std::io::Read;
use std::rc::Rc;

use diag::Code;
use indexmap::IndexMap;
use runtime::{
  Arity, BuiltinRegistry, Clock, Console, FileHandle, Input, Key, NativeError, Randomness, Value,
};

pub fn standard(
  console: Rc<RefCell<dyn Console>>,
  input: Rc<RefCell<dyn Input>>,
  clock: Rc<dyn Clock>,
  random: Rc<RefCell<dyn Randomness>>,
) -> BuiltinRegistry {
  let mut registry = BuiltinRegistry::new();

  {
    let console = console.clone();
    registry.register("ecrire", Arity::Any, move |args| {
      let line = args
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
      console.borrow_mut().print(&line);
      Ok(Value::Nothing)
    });
  }

  {
    let input = input.clone();
    registry.register("demander texte", Arity::Between(0, 1), move |args| {
      let text = prompt(&input, args)?;
      Ok(Value::str(text))
    });
  }

  {
    let input = input.clone();
    registry.register("demander nombre", Arity::Between(0, 1), move |args| {
      let text = prompt(&input, args)?;
      let text = text.trim();
      if let Ok(v) = text.parse::<i64>() {
        return Ok(Value::Int(v));
      }
      text.parse::<f64>().map(Value::Float).map_err(|_| {
        NativeError::new(Code::E202, format!("ce n'est pas un nombre : `{text}`"))
      })
    });
  }

  registry.register("minuscule", Arity::Exact(1), |args| {
    Ok(Value::str(text_arg(&args[0], "minuscule")?.to_lowercase()))
  });

  registry.register("majuscule", Arity::Exact(1), |args| {
    Ok(Value::str(text_arg(&args[0], "majuscule")?.to_uppercase()))
  });

  registry.register("longueur", Arity::Exact(1), |args| match &args[0] {
    Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
    Value::List(l) => Ok(Value::Int(l.borrow().len() as i64)),
    Value::Dict(d) => Ok(Value::Int(d.borrow().len() as i64)),
    other => Err(type_error(format!(
      "`longueur` attend un texte, une liste ou un dictionnaire, reçu {}",
      other.type_name()
    ))),
  });

  registry.register("remplacer", Arity::Exact(3), |args| {
    let text = text_arg(&args[0], "remplacer")?;
    let from = text_arg(&args[1], "remplacer")?;
    let to = text_arg(&args[2], "remplacer")?;
    Ok(Value::str(text.replace(&*from, &to)))
  });

  registry.register("contient", Arity::Exact(2), |args| {
    let found = match (&args[0], &args[1]) {
      (Value::Str(haystack), Value::Str(needle)) => haystack.contains(&**needle),
      (Value::List(items), needle) => items.borrow().iter().any(|item| item == needle),
      (Value::Dict(dict), key) => match Key::from_value(key) {
        Some(key) => dict.borrow().contains_key(&key),
        None => false,
      },
      (other, _) => {
        return Err(type_error(format!(
          "`contient` attend un texte, une liste ou un dictionnaire, reçu {}",
          other.type_name()
        )))
      }
    };
    Ok(Value::Bool(found))
  });

  {
    let random = random.clone();
    registry.register("aleatoire", Arity::Exact(2), move |args| {
      let (Value::Int(min), Value::Int(max)) = (&args[0], &args[1]) else {
        return Err(type_error("`aleatoire` attend deux nombres entiers".to_owned()));
      };
      if min > max {
        return Err(type_error(format!("bornes invalides : {min} > {max}")));
      }
      Ok(Value::Int(random.borrow_mut().uniform_int(*min, *max)))
    });
  }

  registry.register("sqrt", Arity::Exact(1), |args| {
    let v = number_arg(&args[0], "sqrt")?;
    if v < 0.0 {
      return Err(type_error("racine carrée d'un nombre négatif".to_owned()));
    }
    Ok(Value::Float(v.sqrt()))
  });

  registry.register("abs", Arity::Exact(1), |args| match &args[0] {
    Value::Int(v) => Ok(
      v.checked_abs()
        .map(Value::Int)
        .unwrap_or(Value::Float((*v as f64).abs())),
    ),
    Value::Float(v) => Ok(Value::Float(v.abs())),
    other => Err(type_error(format!(
      "`abs` attend un nombre, reçu {}",
      other.type_name()
    ))),
  });

  registry.register("round", Arity::Exact(1), |args| {
    Ok(int_if_possible(number_arg(&args[0], "round")?.round()))
  });

  registry.register("floor", Arity::Exact(1), |args| {
    Ok(int_if_possible(number_arg(&args[0], "floor")?.floor()))
  });

  registry.register("ceil", Arity::Exact(1), |args| {
    Ok(int_if_possible(number_arg(&args[0], "ceil")?.ceil()))
  });

  registry.register("liste", Arity::Any, |args| Ok(Value::list(args.to_vec())));

  registry.register("dictionnaire", Arity::Any, |args| {
    if args.len() % 2 != 0 {
      return Err(NativeError::new(
        Code::E601,
        "`dictionnaire` attend des paires clé, valeur",
      ));
    }
    let mut map = IndexMap::with_capacity(args.len() / 2);
    for pair in args.chunks(2) {
      let key = Key::from_value(&pair[0]).ok_or_else(|| {
        NativeError::new(
          Code::E705,
          format!(
            "cette valeur ne peut pas servir de clé : {}",
            pair[0].type_name()
          ),
        )
      })?;
      map.insert(key, pair[1].clone());
    }
    Ok(Value::dict(map))
  });

  registry.register("ouvrir", Arity::Exact(2), |args| {
    let path = text_arg(&args[0], "ouvrir")?;
    let mode = text_arg(&args[1], "ouvrir")?;
    let file = match &*mode {
      "lecture" => std::fs::File::open(&*path),
      "ecriture" => std::fs::File::create(&*path),
      "ajout" => std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(&*path),
      other => {
        return Err(NativeError::new(
          Code::E801,
          format!("mode inconnu : `{other}` (lecture, ecriture ou ajout)"),
        ))
      }
    };
    let file = file.map_err(|e| {
      NativeError::new(Code::E801, format!("impossible d'ouvrir `{path}` : {e}"))
    })?;
    Ok(Value::File(Rc::new(RefCell::new(FileHandle {
      path: path.to_string(),
      mode: mode.to_string(),
      file: Some(file),
    }))))
  });

  registry.register("lire", Arity::Exact(1), |args| {
    let Value::File(handle) = &args[0] else {
      return Err(type_error(format!(
        "`lire` attend un fichier, reçu {}",
        args[0].type_name()
      )));
    };
    let mut handle = handle.borrow_mut();
    let path = handle.path.clone();
    let Some(file) = handle.file.as_mut() else {
      return Err(NativeError::new(
        Code::E802,
        format!("le fichier `{path}` est fermé"),
      ));
    };
    let mut text = String::new();
    file.read_to_string(&mut text).map_err(|e| {
      NativeError::new(Code::E801, format!("impossible de lire `{path}` : {e}"))
    })?;
    Ok(Value::str(text))
  });

  registry.register("fermer", Arity::Exact(1), |args| {
    let Value::File(handle) = &args[0] else {
      return Err(type_error(format!(
        "`fermer` attend un fichier, reçu {}",
        args[0].type_name()
      )));
    };
    // dropping the inner handle closes it; `fermer` twice is harmless
    handle.borrow_mut().file = None;
    Ok(Value::Nothing)
  });

  {
    let clock = clock.clone();
    registry.register("attendre", Arity::Exact(1), move |args| {
      let seconds = number_arg(&args[0], "attendre")?;
      if seconds < 0.0 {
        return Err(type_error("durée négative".to_owned()));
      }
      clock.sleep(seconds);
      Ok(Value::Nothing)
    });
  }

  registry
}

fn prompt(input: &Rc<RefCell<dyn Input>>, args: &[Value]) -> Result<String, NativeError> {
  let text = match args.first() {
    Some(Value::Str(s)) => s.to_string(),
    Some(other) => {
      return Err(type_error(format!(
        "l'invite doit être un texte, reçu {}",
        other.type_name()
      )))
    }
    None => String::new(),
  };
  input
    .borrow_mut()
    .prompt(&text)
    .map_err(|e| NativeError::new(Code::E801, format!("lecture impossible : {e}")))
}

fn text_arg(value: &Value, name: &str) -> Result<Rc<str>, NativeError> {
  match value {
    Value::Str(s) => Ok(s.clone()),
    other => Err(type_error(format!(
      "`{name}` attend un texte, reçu {}",
      other.type_name()
    ))),
  }
}

fn number_arg(value: &Value, name: &str) -> Result<f64, NativeError> {
  match value {
    Value::Int(v) => Ok(*v as f64),
    Value::Float(v) => Ok(*v),
    other => Err(type_error(format!(
      "`{name}` attend un nombre, reçu {}",
      other.type_name()
    ))),
  }
}

fn type_error(message: String) -> NativeError {
  NativeError::new(Code::E202, message)
}

fn int_if_possible(v: f64) -> Value {
  if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
    Value::Int(v as i64)
  } else {
    Value::Float(v)
  }
}
