use crate::bitset::PosSet;
use crate::symbol::Symbol;
use super::Expr;

/// Position calculus of one rule body with its end marker appended.
///
/// Positions are numbered left to right over the non-empty atoms of the
/// body; the end marker takes the last number.
#[derive(Debug)]
pub(crate) struct Positions {
  pub(crate) values: Vec<Symbol>,
  /// whether the body (without the end marker) derives the empty string
  pub(crate) nullable: bool,
  pub(crate) first: PosSet,
  pub(crate) last: PosSet,
  pub(crate) follow: Vec<PosSet>,
  pub(crate) none: PosSet,
}

struct Summary {
  nullable: bool,
  first: PosSet,
  last: PosSet,
}

struct Numbering {
  width: usize,
  values: Vec<Symbol>,
  follow: Vec<PosSet>,
}

impl Positions {
  pub(crate) fn compute(expr: Option<&Expr>) -> Self {
    let expr = match expr {
      Some(expr) => expr,
      None => {
        return Positions {
          values: vec![],
          nullable: false,
          first: PosSet::new(0),
          last: PosSet::new(0),
          follow: vec![],
          none: PosSet::new(0),
        };
      }
    };

    let width = count_atoms(expr) + 1;
    let mut numbering = Numbering {
      width,
      values: Vec::with_capacity(width),
      follow: vec![PosSet::new(width); width],
    };

    let body = numbering.visit(expr);

    let end = numbering.values.len();
    numbering.values.push(Symbol::empty());
    for p in &body.last {
      numbering.follow[p].insert(end);
    }

    let mut first = body.first;
    if body.nullable {
      first.insert(end);
    }

    Positions {
      values: numbering.values,
      nullable: body.nullable,
      first,
      last: PosSet::from_bit(width, end),
      follow: numbering.follow,
      none: PosSet::new(width),
    }
  }
}

impl Numbering {
  fn visit(&mut self, expr: &Expr) -> Summary {
    match expr {
      Expr::Atom(sym) if sym.is_empty() => {
        Summary {
          nullable: true,
          first: PosSet::new(self.width),
          last: PosSet::new(self.width),
        }
      }
      Expr::Atom(sym) => {
        let pos = self.values.len();
        self.values.push(sym.clone());
        Summary {
          nullable: false,
          first: PosSet::from_bit(self.width, pos),
          last: PosSet::from_bit(self.width, pos),
        }
      }
      Expr::Concat(l, r) => {
        let l = self.visit(l);
        let r = self.visit(r);
        for p in &l.last {
          self.follow[p].union_with(&r.first);
        }

        let mut first = l.first;
        if l.nullable {
          first.union_with(&r.first);
        }
        let mut last = r.last;
        if r.nullable {
          last.union_with(&l.last);
        }
        Summary {
          nullable: l.nullable && r.nullable,
          first,
          last,
        }
      }
      Expr::Altern(l, r) => {
        let mut l = self.visit(l);
        let r = self.visit(r);
        l.first.union_with(&r.first);
        l.last.union_with(&r.last);
        Summary {
          nullable: l.nullable || r.nullable,
          first: l.first,
          last: l.last,
        }
      }
      Expr::Star(inner) => {
        let inner = self.loop_back(inner);
        Summary {
          nullable: true,
          ..inner
        }
      }
      Expr::Plus(inner) => self.loop_back(inner),
      Expr::Optional(inner) => {
        let inner = self.visit(inner);
        Summary {
          nullable: true,
          ..inner
        }
      }
    }
  }

  fn loop_back(&mut self, inner: &Expr) -> Summary {
    let inner = self.visit(inner);
    for p in &inner.last {
      self.follow[p].union_with(&inner.first);
    }
    inner
  }
}

fn count_atoms(expr: &Expr) -> usize {
  match expr {
    Expr::Atom(sym) => (!sym.is_empty()) as usize,
    Expr::Concat(l, r) | Expr::Altern(l, r) => count_atoms(l) + count_atoms(r),
    Expr::Star(inner) | Expr::Plus(inner) | Expr::Optional(inner) => {
      count_atoms(inner)
    }
  }
}
