use indexmap::IndexMap;
use crate::automaton::{Automaton, State, StateId};
use crate::bitset::PosSet;
use crate::error::NameConflictError;
use crate::grammar::SymbolGrammar;
use crate::regex::RegularExpr;
use crate::symbol::Symbol;

pub type Dfa = Automaton<DfaState>;

#[derive(Debug, Clone, PartialEq)]
pub struct DfaState {
  pub(crate) id: StateId,
  /// symbol -> index of target state
  pub(crate) transitions: IndexMap<Symbol, StateId>,
  /// head of the rule matched on reaching this state
  pub(crate) accept: Option<Symbol>,
}

impl DfaState {
  pub fn id(&self) -> StateId {
    self.id
  }

  pub fn transitions(&self) -> &IndexMap<Symbol, StateId> {
    &self.transitions
  }

  pub fn next(&self, label: &Symbol) -> Option<StateId> {
    self.transitions.get(label).copied()
  }

  pub fn accept(&self) -> Option<&Symbol> {
    self.accept.as_ref()
  }

  /// Moves the state and its targets `base` ids up.
  pub(crate) fn offset(mut self, base: StateId) -> Self {
    self.id += base;
    for target in self.transitions.values_mut() {
      *target += base;
    }
    self
  }
}

impl State for DfaState {
  fn edges(&self) -> Vec<(String, StateId)> {
    self.transitions.iter()
      .map(|(label, &target)| (label.to_string(), target))
      .collect()
  }

  fn describe(&self) -> String {
    match &self.accept {
      Some(head) => format!("accept {}", head),
      None => String::new(),
    }
  }
}

/// Builds one DFA recognizing every rule of `grammar`, each accepting state
/// labelled with the rule it matches.
pub fn build(
  grammar: &SymbolGrammar,
) -> Result<Dfa, NameConflictError> {
  DfaBuilder::new(grammar.rules()).build()
}

/// Builds the DFA of a single rule.
pub fn build_rule(
  head: &Symbol,
  body: &RegularExpr,
) -> Result<Dfa, NameConflictError> {
  DfaBuilder::new(std::iter::once((head, body))).build()
}

/// Subset construction over the positions of several rules at once.
///
/// The positions of each rule are laid out one after the other, so a single
/// set describes a state across all rules.
struct DfaBuilder<'a> {
  width: usize,
  heads: Vec<&'a Symbol>,
  /// position -> index into `heads`
  owner: Vec<usize>,
  values: Vec<&'a Symbol>,
  follow: Vec<PosSet>,
  start: PosSet,
  states: IndexMap<PosSet, DfaState>,
}

impl<'a> DfaBuilder<'a> {
  fn new(
    rules: impl IntoIterator<Item = (&'a Symbol, &'a RegularExpr)>,
  ) -> Self {
    let rules = rules.into_iter()
      .filter(|(_, body)| !body.is_empty())
      .collect::<Vec<_>>();
    let width: usize = rules.iter().map(|(_, body)| body.len()).sum();

    let mut builder = DfaBuilder {
      width,
      heads: Vec::with_capacity(rules.len()),
      owner: Vec::with_capacity(width),
      values: Vec::with_capacity(width),
      follow: Vec::with_capacity(width),
      start: PosSet::new(width),
      states: IndexMap::new(),
    };

    let mut base = 0;
    for (head, body) in rules {
      let rule = builder.heads.len();
      builder.heads.push(head);
      for (pos, value) in body.pos_values() {
        builder.owner.push(rule);
        builder.values.push(value);
        builder.follow.push(shift(body.follow_pos(pos), base, width));
      }
      builder.start.union_with(&shift(body.first_pos(), base, width));
      base += body.len();
    }

    builder
  }

  fn build(mut self) -> Result<Dfa, NameConflictError> {
    if self.heads.is_empty() {
      return Ok(Automaton::empty());
    }

    let start = self.state_for(self.start.clone());

    let mut i = 0;
    while let Some((positions, _)) = self.states.get_index(i) {
      let positions = positions.clone();
      let accept = self.accept(&positions)?;

      let mut moves = IndexMap::<&'a Symbol, PosSet>::new();
      for p in &positions {
        let value = self.values[p];
        if value.is_empty() {
          continue;
        }
        moves.entry(value)
          .or_insert_with(|| PosSet::new(self.width))
          .union_with(&self.follow[p]);
      }

      let transitions = moves.into_iter()
        .map(|(label, next)| (label.clone(), self.state_for(next)))
        .collect::<IndexMap<_, _>>();

      log::trace!("dfa state {} {:?}: {} transitions, accept {:?}",
        i, positions, transitions.len(), accept);

      if let Some((_, state)) = self.states.get_index_mut(i) {
        state.transitions = transitions;
        state.accept = accept;
      }
      i += 1;
    }

    log::debug!("built dfa with {} states for {} rules",
      self.states.len(), self.heads.len());

    Ok(Automaton {
      states: self.states.into_iter().map(|(_, state)| state).collect(),
      start: Some(start),
    })
  }

  /// The rule whose end marker is among `positions`, if any.
  fn accept(
    &self,
    positions: &PosSet,
  ) -> Result<Option<Symbol>, NameConflictError> {
    let mut accept: Option<&Symbol> = None;
    for p in positions {
      if !self.values[p].is_empty() {
        continue;
      }
      let head = self.heads[self.owner[p]];
      match accept {
        Some(prev) if prev != head => {
          return Err(NameConflictError(prev.clone(), head.clone()));
        }
        Some(_) => {}
        None => accept = Some(head),
      }
    }
    Ok(accept.cloned())
  }

  fn state_for(&mut self, positions: PosSet) -> StateId {
    if let Some((id, _, _)) = self.states.get_full(&positions) {
      return id as StateId;
    }
    let id = self.states.len() as StateId;
    self.states.insert(positions, DfaState {
      id,
      transitions: IndexMap::new(),
      accept: None,
    });
    id
  }
}

fn shift(
  set: &PosSet,
  base: usize,
  width: usize,
) -> PosSet {
  let mut shifted = PosSet::new(width);
  for p in set {
    shifted.insert(base + p);
  }
  shifted
}
