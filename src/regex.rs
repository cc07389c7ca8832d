use std::fmt::{self, Debug, Display, Formatter};
use std::ops::BitOr;
use std::rc::Rc;
use once_cell::unsync::OnceCell;
use crate::bitset::PosSet;
use crate::symbol::Symbol;
use self::positions::Positions;

mod positions;

/// Body of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
  /// A symbol occurrence; the empty symbol is epsilon.
  Atom(Symbol),
  Concat(Box<Expr>, Box<Expr>),
  Altern(Box<Expr>, Box<Expr>),
  Star(Box<Expr>),
  Plus(Box<Expr>),
  Optional(Box<Expr>),
}

pub fn sym(
  sym: impl Into<Symbol>,
) -> Expr {
  Expr::Atom(sym.into())
}

pub fn eps() -> Expr {
  Expr::Atom(Symbol::empty())
}

/// Concatenation. An empty sequence is epsilon.
pub fn seq<const N: usize>(
  exprs: [Expr; N],
) -> Expr {
  pairwise(exprs.into(), Expr::Concat)
}

/// Alternation. An empty alternation is epsilon.
pub fn alt<const N: usize>(
  exprs: [Expr; N],
) -> Expr {
  pairwise(exprs.into(), Expr::Altern)
}

pub fn many(
  expr: Expr,
) -> Expr {
  Expr::Star(Box::new(expr))
}

pub fn some(
  expr: Expr,
) -> Expr {
  Expr::Plus(Box::new(expr))
}

pub fn option(
  expr: Expr,
) -> Expr {
  Expr::Optional(Box::new(expr))
}

/// Concatenation of one-character atoms, e.g. a token's literal text.
pub fn lit(
  text: &str,
) -> Expr {
  pairwise(text.chars().map(|c| Expr::Atom(c.into())).collect(), Expr::Concat)
}

/// Alternation of one-character atoms, e.g. a character class.
pub fn one_of(
  chars: &str,
) -> Expr {
  pairwise(chars.chars().map(|c| Expr::Atom(c.into())).collect(), Expr::Altern)
}

/// Joins neighbours pairwise until one expression is left, keeping the
/// operands in order. The tree is O(log n) deep.
fn pairwise(
  mut exprs: Vec<Expr>,
  join: fn(Box<Expr>, Box<Expr>) -> Expr,
) -> Expr {
  while exprs.len() > 1 {
    let mut joined = Vec::with_capacity((exprs.len() + 1) / 2);
    let mut iter = exprs.into_iter();
    while let Some(l) = iter.next() {
      match iter.next() {
        Some(r) => joined.push(join(Box::new(l), Box::new(r))),
        None => joined.push(l),
      }
    }
    exprs = joined;
  }
  exprs.pop().unwrap_or_else(eps)
}

impl BitOr for Expr {
  type Output = Expr;

  fn bitor(self, rhs: Expr) -> Expr {
    Expr::Altern(Box::new(self), Box::new(rhs))
  }
}

impl Expr {
  fn fmt_prec(&self, prec: u8, f: &mut Formatter) -> fmt::Result {
    match self {
      Expr::Atom(sym) if sym.is_empty() => f.write_str("()"),
      Expr::Atom(sym) => write!(f, "{}", sym),
      Expr::Altern(l, r) => {
        if prec > 0 {
          f.write_str("(")?;
        }
        l.fmt_prec(0, f)?;
        f.write_str(" | ")?;
        r.fmt_prec(0, f)?;
        if prec > 0 {
          f.write_str(")")?;
        }
        Ok(())
      }
      Expr::Concat(l, r) => {
        if prec > 1 {
          f.write_str("(")?;
        }
        l.fmt_prec(1, f)?;
        f.write_str(" ")?;
        r.fmt_prec(1, f)?;
        if prec > 1 {
          f.write_str(")")?;
        }
        Ok(())
      }
      Expr::Star(inner) => {
        inner.fmt_prec(2, f)?;
        f.write_str("*")
      }
      Expr::Plus(inner) => {
        inner.fmt_prec(2, f)?;
        f.write_str("+")
      }
      Expr::Optional(inner) => {
        inner.fmt_prec(2, f)?;
        f.write_str("?")
      }
    }
  }
}

impl Display for Expr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    self.fmt_prec(0, f)
  }
}

/// A rule body together with its lazily computed position calculus.
///
/// The body gets an implicit end marker (an atom of the empty symbol)
/// appended, so reaching the last position means the rule matched. Clones
/// share the body and the computed tables.
#[derive(Clone)]
pub struct RegularExpr(Rc<Inner>);

struct Inner {
  expr: Option<Expr>,
  positions: OnceCell<Positions>,
}

impl RegularExpr {
  pub fn new(expr: Expr) -> Self {
    RegularExpr(Rc::new(Inner {
      expr: Some(expr),
      positions: OnceCell::new(),
    }))
  }

  /// The rule that matches nothing, returned for unbound symbols.
  pub fn empty() -> Self {
    RegularExpr(Rc::new(Inner {
      expr: None,
      positions: OnceCell::new(),
    }))
  }

  pub fn is_empty(&self) -> bool {
    self.0.expr.is_none()
  }

  pub fn expr(&self) -> Option<&Expr> {
    self.0.expr.as_ref()
  }

  fn positions(&self) -> &Positions {
    self.0.positions.get_or_init(|| Positions::compute(self.0.expr.as_ref()))
  }

  /// Number of positions, end marker included.
  pub fn len(&self) -> usize {
    self.positions().values.len()
  }

  pub fn end_pos(&self) -> Option<usize> {
    self.len().checked_sub(1)
  }

  pub fn first_pos(&self) -> &PosSet {
    &self.positions().first
  }

  pub fn last_pos(&self) -> &PosSet {
    &self.positions().last
  }

  /// Positions that may come right after `pos`; empty when out of range.
  pub fn follow_pos(&self, pos: usize) -> &PosSet {
    let positions = self.positions();
    positions.follow.get(pos).unwrap_or(&positions.none)
  }

  /// The symbol at `pos`. The end marker is the empty symbol.
  pub fn pos_value(&self, pos: usize) -> Option<&Symbol> {
    self.positions().values.get(pos)
  }

  /// Whether the body matches the empty string.
  pub fn is_nullable(&self) -> bool {
    self.positions().nullable
  }

  pub fn pos_values(&self) -> impl Iterator<Item = (usize, &Symbol)> {
    self.positions().values.iter().enumerate()
  }
}

impl From<Expr> for RegularExpr {
  fn from(expr: Expr) -> Self {
    RegularExpr::new(expr)
  }
}

impl PartialEq for RegularExpr {
  fn eq(&self, other: &Self) -> bool {
    self.0.expr == other.0.expr
  }
}

impl Eq for RegularExpr {}

impl Display for RegularExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match &self.0.expr {
      Some(expr) => Display::fmt(expr, f),
      None => Ok(()),
    }
  }
}

impl Debug for RegularExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "RegularExpr({})", self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn set(s: &PosSet) -> Vec<usize> {
    s.iter().collect()
  }

  #[test]
  fn star_loops_back() {
    let re = RegularExpr::new(many(sym("a")));

    assert_eq!(re.len(), 2);
    assert_eq!(re.pos_value(0), Some(&Symbol::from("a")));
    assert_eq!(re.pos_value(1), Some(&Symbol::empty()));
    assert_eq!(set(re.follow_pos(0)), vec![0, 1]);
    assert_eq!(set(re.first_pos()), vec![0, 1]);
    assert!(re.is_nullable());
  }

  #[test]
  fn concat() {
    let re = RegularExpr::new(lit("ab"));

    assert_eq!(set(re.first_pos()), vec![0]);
    assert_eq!(set(re.follow_pos(0)), vec![1]);
    assert_eq!(set(re.follow_pos(1)), vec![2]);
    assert_eq!(set(re.last_pos()), vec![2]);
    assert_eq!(re.end_pos(), Some(2));
    assert!(!re.is_nullable());
  }

  #[test]
  fn textbook() {
    // (a|b)*abb
    let re = RegularExpr::new(seq([
      many(sym("a") | sym("b")),
      lit("abb"),
    ]));

    assert_eq!(re.len(), 6);
    assert_eq!(set(re.first_pos()), vec![0, 1, 2]);
    assert_eq!(set(re.follow_pos(0)), vec![0, 1, 2]);
    assert_eq!(set(re.follow_pos(1)), vec![0, 1, 2]);
    assert_eq!(set(re.follow_pos(2)), vec![3]);
    assert_eq!(set(re.follow_pos(3)), vec![4]);
    assert_eq!(set(re.follow_pos(4)), vec![5]);
    assert_eq!(set(re.follow_pos(5)), Vec::<usize>::new());
  }

  #[test]
  fn epsilon_atoms_take_no_position() {
    let re = RegularExpr::new(seq([sym("x"), eps(), option(sym("y"))]));

    assert_eq!(re.len(), 3);
    assert_eq!(set(re.first_pos()), vec![0]);
    assert_eq!(set(re.follow_pos(0)), vec![1, 2]);
    assert!(!re.is_nullable());
    assert!(RegularExpr::new(eps()).is_nullable());
    assert!(RegularExpr::new(some(option(sym("x")))).is_nullable());
    assert!(!RegularExpr::new(some(sym("x"))).is_nullable());
  }

  #[test]
  fn stable_across_queries() {
    let re = RegularExpr::new(seq([some(sym("a")), option(sym("b"))]));
    let copy = re.clone();

    let first = set(re.first_pos());
    let follow = (0..re.len()).map(|p| set(re.follow_pos(p))).collect::<Vec<_>>();

    assert_eq!(set(copy.first_pos()), first);
    assert_eq!(
      (0..copy.len()).map(|p| set(copy.follow_pos(p))).collect::<Vec<_>>(),
      follow);
    assert_eq!(
      re.pos_values().map(|(p, _)| p).collect::<Vec<_>>(),
      vec![0, 1, 2]);

    let again = RegularExpr::new(seq([some(sym("a")), option(sym("b"))]));
    assert_eq!(set(again.first_pos()), first);
    assert_eq!(again, re);
  }

  #[test]
  fn empty_rule() {
    let re = RegularExpr::empty();

    assert!(re.is_empty());
    assert_eq!(re.len(), 0);
    assert_eq!(re.end_pos(), None);
    assert!(re.first_pos().is_empty());
    assert!(re.follow_pos(3).is_empty());
    assert_eq!(re.pos_value(0), None);
    assert!(!re.is_nullable());
  }

  #[test]
  fn long_literal_and_class() {
    let re = RegularExpr::new(lit(&"a".repeat(10_000)));

    assert_eq!(re.len(), 10_001);
    assert_eq!(set(re.first_pos()), vec![0]);
    assert_eq!(set(re.follow_pos(4_999)), vec![5_000]);
    assert_eq!(set(re.follow_pos(9_999)), vec![10_000]);

    let class = (0..10_000u32).filter_map(char::from_u32).collect::<String>();
    let re = RegularExpr::new(one_of(&class));

    assert_eq!(re.len(), 10_001);
    assert_eq!(re.first_pos().len(), 10_000);
    assert_eq!(set(re.follow_pos(1_234)), vec![10_000]);
    assert_eq!(re.pos_value(65), Some(&Symbol::from('A')));
  }

  #[test]
  fn builders_keep_operand_order() {
    let re = RegularExpr::new(lit("abcde"));

    assert_eq!(
      re.pos_values().map(|(_, v)| v.to_string()).collect::<Vec<_>>(),
      vec!["a", "b", "c", "d", "e", ""]);
    assert_eq!(lit("abcde").to_string(), "a b c d e");
    assert_eq!(alt([sym("x"), sym("y"), sym("z"), sym("w")]).to_string(),
      "x | y | z | w");
  }

  #[test]
  fn display() {
    let e = seq([
      sym("a"),
      many(sym("b") | sym("c")),
      option(lit("de")),
    ]) | eps();

    assert_eq!(e.to_string(), "a (b | c)* (d e)? | ()");
    assert_eq!(one_of("xyz").to_string(), "x | y | z");
  }
}
