use indexmap::IndexMap;
use crate::automaton::StateId;
use crate::dfa::{self, DfaState};
use crate::error::NameConflictError;
use crate::grammar::SymbolGrammar;
use crate::symbol::Symbol;

/// The DFAs of all rules of a grammar in one id space.
///
/// A transition labelled with a symbol that has a rule here means "enter
/// that symbol's sub-automaton" at [`TransNetwork::start_state`]. A symbol
/// bound to the empty rule gets no sub-automaton, so it reads as a terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct TransNetwork {
  states: Vec<DfaState>,
  /// symbol -> id of the start state of its own DFA
  starts: IndexMap<Symbol, StateId>,
}

impl TransNetwork {
  pub fn build(
    grammar: &SymbolGrammar,
  ) -> Result<Self, NameConflictError> {
    let mut states = vec![];
    let mut starts = IndexMap::new();

    for (head, body) in grammar.rules() {
      if body.is_empty() {
        log::warn!("rule `{}` is empty, references to it are terminals", head);
        continue;
      }
      let sub = dfa::build_rule(head, body)?;
      let start = match sub.start() {
        Some(start) => start,
        None => continue,
      };

      let base = states.len() as StateId;
      states.extend(sub.states.into_iter().map(|state| state.offset(base)));
      starts.insert(head.clone(), base + start);
    }

    log::debug!("built transition network with {} states for {} rules",
      states.len(), starts.len());

    Ok(TransNetwork {
      states,
      starts,
    })
  }

  pub fn state(&self, id: StateId) -> Option<&DfaState> {
    self.states.get(id as usize)
  }

  /// Entry state of `sym`'s sub-automaton, `None` if it has no rule.
  pub fn start_state(&self, sym: &Symbol) -> Option<StateId> {
    self.starts.get(sym).copied()
  }

  pub fn states(&self) -> &[DfaState] {
    &self.states
  }

  pub fn starts(&self) -> impl Iterator<Item = (&Symbol, StateId)> {
    self.starts.iter().map(|(sym, &id)| (sym, id))
  }

  pub fn len(&self) -> usize {
    self.states.len()
  }

  pub fn is_empty(&self) -> bool {
    self.states.is_empty()
  }
}
