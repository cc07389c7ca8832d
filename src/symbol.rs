use std::fmt::{self, Debug, Display, Formatter};
use std::rc::Rc;

/// Immutable name handle. Clones share the same text.
///
/// The empty symbol stands for "no value": epsilon inside an expression and
/// the end marker of a rule.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Rc<str>);

impl Symbol {
  pub fn new(name: &str) -> Self {
    Symbol(Rc::from(name))
  }

  pub fn empty() -> Self {
    Symbol(Rc::from(""))
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl Default for Symbol {
  fn default() -> Self {
    Symbol::empty()
  }
}

impl From<&str> for Symbol {
  fn from(name: &str) -> Self {
    Symbol::new(name)
  }
}

impl From<String> for Symbol {
  fn from(name: String) -> Self {
    Symbol(Rc::from(name))
  }
}

impl From<char> for Symbol {
  fn from(c: char) -> Self {
    let mut buf = [0; 4];
    Symbol::new(c.encode_utf8(&mut buf))
  }
}

impl From<&Symbol> for Symbol {
  fn from(sym: &Symbol) -> Self {
    sym.clone()
  }
}

impl Display for Symbol {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl Debug for Symbol {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    Debug::fmt(&*self.0, f)
  }
}
