use std::cell::RefCell;
use std::rc::Rc;

use indoc::indoc;
use meow::{Code, Console, Error, Input, Meow, Randomness};

#[derive(Clone, Default)]
struct Capture(Rc<RefCell<Vec<String>>>);

impl Capture {
  fn lines(&self) -> Vec<String> {
    self.0.borrow().clone()
  }
}

impl Console for Capture {
  fn print(&mut self, text: &str) {
    self.0.borrow_mut().push(text.to_owned());
  }
}

struct ScriptedInput(Vec<String>);

impl Input for ScriptedInput {
  fn prompt(&mut self, _text: &str) -> std::io::Result<String> {
    Ok(if self.0.is_empty() {
      String::new()
    } else {
      self.0.remove(0)
    })
  }
}

struct FixedRandom;

impl Randomness for FixedRandom {
  fn uniform_int(&mut self, min: i64, _max: i64) -> i64 {
    min
  }
}

fn engine() -> (Meow, Capture) {
  let capture = Capture::default();
  let meow = Meow::builder().with_console(capture.clone()).build();
  (meow, capture)
}

fn run(src: &str) -> Vec<String> {
  let (meow, capture) = engine();
  meow.eval(src).unwrap_or_else(|e| panic!("program failed: {e}"));
  capture.lines()
}

#[test]
fn prints_a_greeting() {
  let out = run(indoc! {r#"
    miaou
    ecrire "bonjour"
    meow
  "#});
  assert_eq!(out, vec!["bonjour"]);
}

#[test]
fn arithmetic_respects_precedence() {
  let out = run(indoc! {r#"
    miaou
    x = 2 + 3 * 4
    ecrire x
    meow
  "#});
  assert_eq!(out, vec!["14"]);
}

#[test]
fn repeat_counts_from_zero() {
  let out = run(indoc! {r#"
    miaou
    repeter 3 fois:
        ecrire compteur
    meow
  "#});
  assert_eq!(out, vec!["0", "1", "2"]);
}

#[test]
fn user_functions_return_values() {
  let out = run(indoc! {r#"
    miaou
    fonction carre(n):
        retour n * n
    ecrire carre(7)
    meow
  "#});
  assert_eq!(out, vec!["49"]);
}

#[test]
fn try_except_recovers_from_division_by_zero() {
  let out = run(indoc! {r#"
    miaou
    essayer:
        ecrire 1 / 0
    sauf erreur:
        ecrire "oups"
    meow
  "#});
  assert_eq!(out, vec!["oups"]);
}

#[test]
fn imports_resolve_next_to_the_script() {
  let dir = tempfile::tempdir().unwrap();
  std::fs::write(
    dir.path().join("util.miaou"),
    indoc! {r#"
      miaou
      fonction doubler(n):
          retour n * 2
      meow
    "#},
  )
  .unwrap();
  std::fs::write(
    dir.path().join("main.miaou"),
    indoc! {r#"
      miaou
      importer util
      ecrire util.doubler(21)
      meow
    "#},
  )
  .unwrap();

  let (meow, capture) = engine();
  meow.run_file(dir.path().join("main.miaou")).unwrap();
  assert_eq!(capture.lines(), vec!["42"]);
}

#[test]
fn empty_program_is_fine() {
  let out = run("miaou\nmeow\n");
  assert!(out.is_empty());
}

#[test]
fn mixed_indentation_is_a_syntax_error() {
  let (meow, _) = engine();
  let err = meow
    .eval("miaou\nsi vrai:\n \t ecrire 1\nmeow\n")
    .unwrap_err();
  let Error::Syntax(errors) = err else {
    panic!("expected a syntax error");
  };
  assert_eq!(errors[0].code, Code::E101);
}

#[test]
fn uncaught_errors_render_with_context_and_caret() {
  let src = indoc! {r#"
    miaou
    ecrire 1 / 0
    meow
  "#};
  let (meow, _) = engine();
  let err = meow.eval(src).unwrap_err();
  let Error::Runtime(e) = &err else {
    panic!("expected a runtime error");
  };
  assert_eq!(e.code, Code::E501);

  let rendered = err.render("<script>", src, false);
  assert!(rendered.contains("ERREUR E501"));
  assert!(rendered.contains("Ligne       : 2"));
  assert!(rendered.contains("ecrire 1 / 0"));
  assert!(rendered.contains("^"));
  assert!(rendered.contains("💡 Suggestion"));
}

#[test]
fn scripted_input_feeds_demander_texte() {
  let capture = Capture::default();
  let meow = Meow::builder()
    .with_console(capture.clone())
    .with_input(ScriptedInput(vec!["Minou".to_owned()]))
    .build();
  meow
    .eval(indoc! {r#"
      miaou
      nom = demander texte("Ton nom ? ")
      ecrire "Bonjour " + nom
      meow
    "#})
    .unwrap();
  assert_eq!(capture.lines(), vec!["Bonjour Minou"]);
}

#[test]
fn builtins_compose_with_the_language() {
  let capture = Capture::default();
  let meow = Meow::builder()
    .with_console(capture.clone())
    .with_random(FixedRandom)
    .build();
  meow
    .eval(indoc! {r#"
      miaou
      ecrire majuscule("chat")
      ecrire longueur("miaou"), longueur(liste(1, 2, 3))
      ecrire remplacer("miaou", "ou", "aou")
      ecrire contient("chaton", "chat")
      ecrire aleatoire(3, 9)
      ecrire floor(2.7), ceil(2.1), round(2.5), abs(0 - 4)
      d = dictionnaire("a", 1, "b", 2)
      ecrire d["b"]
      meow
    "#})
    .unwrap();
  assert_eq!(
    capture.lines(),
    vec!["CHAT", "5 3", "miaaou", "vrai", "3", "2 3 3 4", "2"]
  );
}

#[test]
fn module_state_is_per_engine() {
  let dir = tempfile::tempdir().unwrap();
  std::fs::write(
    dir.path().join("bavard.miaou"),
    "miaou\necrire \"coucou\"\nmeow\n",
  )
  .unwrap();
  let src = indoc! {r#"
    miaou
    importer bavard
    importer bavard
    meow
  "#};

  let capture = Capture::default();
  let meow = Meow::builder()
    .with_console(capture.clone())
    .with_script_dir(dir.path())
    .build();
  meow.eval(src).unwrap();
  // cached after the first load
  assert_eq!(capture.lines(), vec!["coucou"]);

  // a fresh engine has a fresh module cache
  let capture2 = Capture::default();
  let meow2 = Meow::builder()
    .with_console(capture2.clone())
    .with_script_dir(dir.path())
    .build();
  meow2.eval(src).unwrap();
  assert_eq!(capture2.lines(), vec!["coucou"]);
}

#[test]
fn files_round_trip_through_builtins() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("notes.txt");
  std::fs::write(&path, "croquettes\n").unwrap();

  let src = format!(
    indoc! {r#"
      miaou
      f = ouvrir("{}", "lecture")
      ecrire lire(f)
      fermer(f)
      meow
    "#},
    path.display()
  );
  let out = run(&src);
  assert_eq!(out, vec!["croquettes\n"]);
}
