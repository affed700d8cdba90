//! Standard host capabilities: real terminal, file system, clock and
//! randomness. Embedders swap any of these through [`crate::MeowBuilder`].

use std::io;
use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Duration;

use rand::rngs::ThreadRng;
use rand::Rng;
use runtime::{Clock, Console, Input, Randomness, SourceReader};

pub struct StdConsole;

impl Console for StdConsole {
  fn print(&mut self, text: &str) {
    println!("{text}");
  }
}

pub struct StdInput;

impl Input for StdInput {
  fn prompt(&mut self, text: &str) -> io::Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{text}")?;
    stdout.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    while line.ends_with('\n') || line.ends_with('\r') {
      line.pop();
    }
    Ok(line)
  }
}

pub struct StdClock;

impl Clock for StdClock {
  fn sleep(&self, seconds: f64) {
    if seconds > 0.0 {
      std::thread::sleep(Duration::from_secs_f64(seconds));
    }
  }
}

pub struct StdRandom(ThreadRng);

impl StdRandom {
  pub fn new() -> Self {
    Self(rand::thread_rng())
  }
}

impl Default for StdRandom {
  fn default() -> Self {
    Self::new()
  }
}

impl Randomness for StdRandom {
  fn uniform_int(&mut self, min: i64, max: i64) -> i64 {
    if min >= max {
      return min;
    }
    self.0.gen_range(min..=max)
  }
}

pub struct FsReader;

impl SourceReader for FsReader {
  fn read(&self, path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
  }
}
