use indexmap::IndexMap;
use crate::automaton::{Automaton, State, StateId};
use crate::error::NameConflictError;
use crate::grammar::SymbolGrammar;
use crate::network::TransNetwork;
use crate::symbol::Symbol;
use self::item::ItemSet;

pub use self::item::StateItem;

mod item;

pub type Elr = Automaton<ElrState>;

/// Rule completed in a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
  pub head: Symbol,
  /// index into the state's back-link list of the item that completed
  pub back_link: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElrState {
  pub(crate) id: StateId,
  /// terminal -> index of target state
  pub(crate) shifts: IndexMap<Symbol, StateId>,
  /// nonterminal -> index of target state
  pub(crate) gotos: IndexMap<Symbol, StateId>,
  /// back-link of every item, in item order
  pub(crate) back_links: Vec<Option<u32>>,
  pub(crate) reduction: Option<Reduction>,
}

impl ElrState {
  pub fn id(&self) -> StateId {
    self.id
  }

  pub fn shifts(&self) -> &IndexMap<Symbol, StateId> {
    &self.shifts
  }

  pub fn gotos(&self) -> &IndexMap<Symbol, StateId> {
    &self.gotos
  }

  pub fn shift(&self, terminal: &Symbol) -> Option<StateId> {
    self.shifts.get(terminal).copied()
  }

  pub fn goto(&self, nonterminal: &Symbol) -> Option<StateId> {
    self.gotos.get(nonterminal).copied()
  }

  pub fn back_links(&self) -> &[Option<u32>] {
    &self.back_links
  }

  pub fn reduction(&self) -> Option<&Reduction> {
    self.reduction.as_ref()
  }
}

impl State for ElrState {
  fn edges(&self) -> Vec<(String, StateId)> {
    let shifts = self.shifts.iter()
      .map(|(label, &target)| (format!("'{}'", label), target));
    let gotos = self.gotos.iter()
      .map(|(label, &target)| (label.to_string(), target));
    shifts.chain(gotos).collect()
  }

  fn describe(&self) -> String {
    let links = self.back_links.iter()
      .map(|link| match link {
        Some(link) => link.to_string(),
        None => "-".to_owned(),
      })
      .collect::<Vec<_>>()
      .join(", ");

    match &self.reduction {
      Some(Reduction { head, back_link }) => {
        format!("[{}]; reduce {}@{}", links, head, back_link)
      }
      None => format!("[{}]", links),
    }
  }
}

/// Builds the parser automaton of `grammar`, starting at its root.
///
/// A grammar whose root has no rule yields the empty automaton.
pub fn build(
  grammar: &SymbolGrammar,
) -> Result<Elr, NameConflictError> {
  let network = TransNetwork::build(grammar)?;
  match grammar.root_symbol() {
    Some(root) => from_network(&network, root),
    None => Ok(Automaton::empty()),
  }
}

pub fn from_network(
  network: &TransNetwork,
  root: &Symbol,
) -> Result<Elr, NameConflictError> {
  match network.start_state(root) {
    Some(start) => ElrBuilder::new(network).build(start),
    None => Ok(Automaton::empty()),
  }
}

struct ElrBuilder<'n> {
  network: &'n TransNetwork,
  states: IndexMap<ItemSet, ElrState>,
}

impl<'n> ElrBuilder<'n> {
  fn new(network: &'n TransNetwork) -> Self {
    ElrBuilder {
      network,
      states: IndexMap::new(),
    }
  }

  fn build(mut self, root: StateId) -> Result<Elr, NameConflictError> {
    let network = self.network;
    let start = self.state_for(vec![StateItem::root(root)]);

    let mut i = 0;
    while let Some((set, _)) = self.states.get_index(i) {
      let items = set.items.clone();
      let kernel_len = set.kernel_len;

      let mut reduction: Option<Reduction> = None;
      let mut moves = IndexMap::<&'n Symbol, Vec<StateItem>>::new();
      for (k, item) in items.iter().enumerate() {
        let state = match network.state(item.state) {
          Some(state) => state,
          None => continue,
        };

        if let Some(head) = state.accept() {
          if let Some(r) = &reduction {
            if &r.head != head {
              return Err(NameConflictError(r.head.clone(), head.clone()));
            }
          } else {
            reduction = Some(Reduction {
              head: head.clone(),
              back_link: k,
            });
          }
        }

        for (label, &target) in state.transitions() {
          moves.entry(label)
            .or_insert_with(Vec::new)
            .push(StateItem {
              state: target,
              back_link: item.back_link,
            });
        }
      }

      let mut shifts = IndexMap::new();
      let mut gotos = IndexMap::new();
      for (label, kernel) in moves {
        let target = self.state_for(kernel);
        if network.start_state(label).is_some() {
          gotos.insert(label.clone(), target);
        } else {
          shifts.insert(label.clone(), target);
        }
      }

      log::trace!("elr state {} {:?} (kernel {}): {} shifts, {} gotos, reduction {:?}",
        i, items, kernel_len, shifts.len(), gotos.len(), reduction);

      if let Some((_, state)) = self.states.get_index_mut(i) {
        state.shifts = shifts;
        state.gotos = gotos;
        state.back_links = items.iter().map(|item| item.back_link).collect();
        state.reduction = reduction;
      }
      i += 1;
    }

    log::debug!("built elr automaton with {} states from {} network states",
      self.states.len(), network.len());

    Ok(Automaton {
      states: self.states.into_iter().map(|(_, state)| state).collect(),
      start: Some(start),
    })
  }

  /// Id of the state of the closure of `kernel`, allocated on first sight.
  fn state_for(&mut self, kernel: Vec<StateItem>) -> StateId {
    let set = ItemSet::closure(kernel, self.network);
    if let Some((id, _, _)) = self.states.get_full(&set) {
      return id as StateId;
    }
    let id = self.states.len() as StateId;
    self.states.insert(set, ElrState {
      id,
      shifts: IndexMap::new(),
      gotos: IndexMap::new(),
      back_links: vec![],
      reduction: None,
    });
    id
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grammar::grammar;
  use crate::regex::{alt, lit, option, seq, sym};
  use insta::assert_snapshot;
  use pretty_assertions::assert_eq;

  fn sequence() -> SymbolGrammar {
    grammar("S", &[
      ("S", seq([sym("A"), sym("B")])),
      ("A", lit("x")),
      ("B", lit("y")),
    ])
  }

  fn state(elr: &Elr, id: StateId) -> &ElrState {
    elr.state(id).unwrap()
  }

  #[test]
  fn sequence_of_nonterminals() {
    let elr = build(&sequence()).unwrap();
    let start = state(&elr, elr.start().unwrap());

    // the start state enters A's sub-automaton from S's first item
    assert_eq!(start.back_links(), &[None, Some(0)]);
    assert!(start.reduction().is_none());

    let after_x = state(&elr, start.shift(&"x".into()).unwrap());
    assert_eq!(after_x.reduction(), Some(&Reduction {
      head: "A".into(),
      back_link: 0,
    }));
    assert_eq!(after_x.back_links(), &[Some(0)]);

    // resuming item 0 of the start state continues with B
    let after_a = state(&elr, start.goto(&"A".into()).unwrap());
    assert!(after_a.shift(&"y".into()).is_some());
    assert_eq!(after_a.back_links(), &[None, Some(0)]);

    let after_b = state(&elr, after_a.goto(&"B".into()).unwrap());
    assert_eq!(after_b.reduction(), Some(&Reduction {
      head: "S".into(),
      back_link: 0,
    }));
    assert_eq!(after_b.back_links(), &[None]);

    assert_snapshot!(elr.fingerprint().join("\n"), @r###"
    0 ([-, 0]): 'x'->1 A->2
    1 ([0]; reduce A@0)
    2 ([-, 0]): 'y'->3 B->4
    3 ([0]; reduce B@0)
    4 ([-]; reduce S@0)
    "###);
  }

  #[test]
  fn left_recursion() {
    let g = grammar("E", &[
      ("E", alt([seq([sym("E"), lit("+x")]), lit("x")])),
    ]);

    let elr = build(&g).unwrap();

    assert_eq!(elr.len(), 4);
    assert_snapshot!(elr.fingerprint().join("\n"), @r###"
    0 ([-, 0]): 'x'->1 E->2
    1 ([-, 0]; reduce E@0)
    2 ([-, 0]): '+'->3
    3 ([-, 0]): 'x'->1
    "###);
  }

  #[test]
  fn empty_reduction_at_start() {
    let g = grammar("S", &[
      ("S", seq([sym("A"), sym("y")])),
      ("A", option(sym("x"))),
    ]);

    let elr = build(&g).unwrap();
    let start = state(&elr, elr.start().unwrap());

    assert_eq!(start.reduction(), Some(&Reduction {
      head: "A".into(),
      back_link: 1,
    }));
    assert!(start.shift(&"x".into()).is_some());
    assert!(start.goto(&"A".into()).is_some());
  }

  #[test]
  fn ambiguous_reduction() {
    let g = grammar("S", &[
      ("S", sym("A") | sym("B")),
      ("A", lit("x")),
      ("B", lit("x")),
    ]);

    assert_eq!(build(&g), Err(NameConflictError("A".into(), "B".into())));
  }

  #[test]
  fn deterministic() {
    let g = grammar("E", &[
      ("E", alt([seq([sym("E"), lit("+"), sym("T")]), sym("T")])),
      ("T", alt([seq([sym("T"), lit("*"), sym("F")]), sym("F")])),
      ("F", alt([seq([lit("("), sym("E"), lit(")")]), lit("x")])),
    ]);

    let first = build(&g).unwrap();
    let second = build(&g.clone()).unwrap();

    assert!(!first.is_empty());
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first, second);
  }

  #[test]
  fn definition_order_does_not_matter() {
    let forward = grammar("S", &[
      ("S", seq([sym("A"), lit("q")]) | sym("B")),
      ("B", seq([sym("A"), lit("r")])),
      ("A", lit("x")),
    ]);
    let backward = grammar("S", &[
      ("A", lit("x")),
      ("B", seq([sym("A"), lit("r")])),
      ("S", seq([sym("A"), lit("q")]) | sym("B")),
    ]);
    assert_eq!(forward, backward);

    assert_eq!(
      build(&forward).unwrap().fingerprint(),
      build(&backward).unwrap().fingerprint());
  }

  #[test]
  fn missing_root() {
    let mut g = sequence();
    g.set_root("Z");

    assert!(build(&g).unwrap().is_empty());
    assert!(build(&SymbolGrammar::new()).unwrap().is_empty());
    assert_eq!(build(&SymbolGrammar::new()).unwrap().start(), None);
  }

  #[test]
  fn unbound_symbol_is_terminal() {
    let g = grammar("S", &[
      ("S", seq([sym("A"), sym("Q")])),
      ("A", lit("x")),
    ]);

    let elr = build(&g).unwrap();
    let start = state(&elr, elr.start().unwrap());
    let after_a = state(&elr, start.goto(&"A".into()).unwrap());

    assert!(after_a.shift(&"Q".into()).is_some());
    assert!(after_a.gotos().is_empty());
  }
}
