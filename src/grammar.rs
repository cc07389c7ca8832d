use indexmap::IndexMap;
use crate::regex::{Expr, RegularExpr};
use crate::symbol::Symbol;

/// Rules keyed by head symbol, plus a designated root.
///
/// Lookups never fail: an unbound symbol resolves to the empty rule.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolGrammar {
  rules: IndexMap<Symbol, RegularExpr>,
  root: Option<Symbol>,
  empty: RegularExpr,
}

impl Default for SymbolGrammar {
  fn default() -> Self {
    SymbolGrammar {
      rules: IndexMap::new(),
      root: None,
      empty: RegularExpr::empty(),
    }
  }
}

impl SymbolGrammar {
  pub fn new() -> Self {
    Self::default()
  }

  /// Binds `head` to `body`, overwriting any earlier binding.
  ///
  /// A redefined symbol keeps its original place in the enumeration order.
  /// Returns the body it replaced.
  pub fn define(
    &mut self,
    head: impl Into<Symbol>,
    body: impl Into<RegularExpr>,
  ) -> Option<RegularExpr> {
    let head = head.into();
    let old = self.rules.insert(head.clone(), body.into());
    if old.is_some() {
      log::debug!("redefined rule `{}`", head);
    }
    old
  }

  pub fn resolve(&self, sym: &Symbol) -> &RegularExpr {
    self.rules.get(sym).unwrap_or(&self.empty)
  }

  pub fn get(&self, sym: &Symbol) -> Option<&RegularExpr> {
    self.rules.get(sym)
  }

  pub fn contains(&self, sym: &Symbol) -> bool {
    self.rules.contains_key(sym)
  }

  pub fn set_root(&mut self, sym: impl Into<Symbol>) {
    self.root = Some(sym.into());
  }

  pub fn root_symbol(&self) -> Option<&Symbol> {
    self.root.as_ref()
  }

  /// The root's rule, or the empty rule when the root is unset or unbound.
  pub fn root(&self) -> &RegularExpr {
    match &self.root {
      Some(root) => self.resolve(root),
      None => &self.empty,
    }
  }

  pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
    self.rules.keys()
  }

  pub fn rules(&self) -> impl Iterator<Item = (&Symbol, &RegularExpr)> {
    self.rules.iter()
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }
}

pub fn grammar(
  root: &str,
  rules: &[(&str, Expr)],
) -> SymbolGrammar {
  let mut grammar = SymbolGrammar::new();
  for (name, expr) in rules {
    grammar.define(*name, expr.clone());
  }
  grammar.set_root(root);
  grammar
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::regex::{lit, sym};
  use pretty_assertions::assert_eq;

  #[test]
  fn resolve_unbound() {
    let g = grammar("S", &[
      ("A", lit("x")),
    ]);

    assert!(g.resolve(&"B".into()).is_empty());
    assert!(!g.contains(&"B".into()));
    assert!(g.get(&"B".into()).is_none());
    assert_eq!(g.resolve(&"A".into()).to_string(), "x");
  }

  #[test]
  fn root_lookup() {
    let mut g = SymbolGrammar::new();
    assert!(g.root().is_empty());
    assert!(g.root_symbol().is_none());

    g.set_root("S");
    assert!(g.root().is_empty());

    g.define("S", sym("A"));
    assert_eq!(g.root().to_string(), "A");
  }

  #[test]
  fn redefine_overwrites() {
    let mut g = SymbolGrammar::new();
    assert!(g.define("A", lit("x")).is_none());
    g.define("B", lit("y"));

    let old = g.define("A", lit("z"));

    assert_eq!(old.map(|r| r.to_string()), Some("x".to_owned()));
    assert_eq!(g.resolve(&"A".into()).to_string(), "z");
    assert_eq!(
      g.symbols().map(|s| s.as_str()).collect::<Vec<_>>(),
      vec!["A", "B"]);
    assert_eq!(g.len(), 2);
  }

  #[test]
  fn empty() {
    let g = SymbolGrammar::new();
    assert!(g.is_empty());
    assert_eq!(g.rules().count(), 0);
    assert_eq!(g, SymbolGrammar::default());
  }
}
