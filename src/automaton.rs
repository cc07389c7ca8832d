use indexmap::IndexSet;

/// Index of a state within its automaton.
pub type StateId = u32;

/// What the fingerprint needs to know about a state.
pub trait State {
  /// Outgoing edges as `(label, target)`.
  fn edges(&self) -> Vec<(String, StateId)>;

  /// Everything about the state other than its edges, empty if nothing.
  fn describe(&self) -> String;
}

/// States addressed by id, plus the entry state.
///
/// An automaton built from nothing has no states and no start.
#[derive(Debug, Clone, PartialEq)]
pub struct Automaton<S> {
  pub(crate) states: Vec<S>,
  pub(crate) start: Option<StateId>,
}

impl<S> Automaton<S> {
  pub fn empty() -> Self {
    Automaton {
      states: vec![],
      start: None,
    }
  }

  pub fn start(&self) -> Option<StateId> {
    self.start
  }

  pub fn states(&self) -> &[S] {
    &self.states
  }

  pub fn state(&self, id: StateId) -> Option<&S> {
    self.states.get(id as usize)
  }

  pub fn len(&self) -> usize {
    self.states.len()
  }

  pub fn is_empty(&self) -> bool {
    self.states.is_empty()
  }
}

impl<S: State> Automaton<S> {
  /// Describes the reachable part of the automaton independently of how ids
  /// were assigned.
  ///
  /// States are renumbered in breadth-first order from the start, visiting
  /// each state's edges sorted by label. One line per state.
  pub fn fingerprint(&self) -> Vec<String> {
    let mut order = IndexSet::new();
    let mut lines = vec![];

    if let Some(start) = self.start {
      order.insert(start);
    }

    let mut i = 0;
    while let Some(&id) = order.get_index(i) {
      let state = match self.state(id) {
        Some(state) => state,
        None => break,
      };

      let mut line = i.to_string();
      let desc = state.describe();
      if !desc.is_empty() {
        line.push_str(&format!(" ({})", desc));
      }

      let mut edges = state.edges();
      edges.sort_by(|a, b| a.0.cmp(&b.0));
      if !edges.is_empty() {
        line.push(':');
      }
      for (label, target) in edges {
        let (n, _) = order.insert_full(target);
        line.push_str(&format!(" {}->{}", label, n));
      }

      lines.push(line);
      i += 1;
    }

    lines
  }
}
