use std::collections::HashSet;
use crate::automaton::StateId;
use crate::network::TransNetwork;

/// A network state paired with the item that caused it to be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateItem {
  /// id of a [`TransNetwork`] state
  pub state: StateId,
  /// Index, in the item set where the enclosing rule was entered, of the item
  /// whose nonterminal transition added this one. `None` for the root.
  pub back_link: Option<u32>,
}

impl StateItem {
  pub fn root(state: StateId) -> Self {
    StateItem {
      state,
      back_link: None,
    }
  }
}

/// Items of one ELR state: the kernel in the order its items were reached,
/// then the items added by closure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ItemSet {
  pub(crate) items: Vec<StateItem>,
  pub(crate) kernel_len: usize,
}

impl ItemSet {
  pub(crate) fn closure(
    kernel: Vec<StateItem>,
    network: &TransNetwork,
  ) -> Self {
    let mut seen = HashSet::new();
    let kernel = kernel.into_iter()
      .filter(|item| seen.insert(*item))
      .collect::<Vec<_>>();

    let mut set = ItemSet {
      kernel_len: kernel.len(),
      items: kernel,
    };
    set.close(network);
    set
  }

  /// Adds, for every nonterminal transition of every item, an item entering
  /// that nonterminal's sub-automaton, until nothing new is added.
  ///
  /// A sub-automaton is entered at most once per originating network state.
  /// Items sharing a network state read the same labels, so every such item
  /// resumes through the one entry, whether or not the rule recurses. This
  /// is also what keeps left-recursive rules finite.
  pub(crate) fn close(&mut self, network: &TransNetwork) {
    let mut seen = self.items.iter().copied().collect::<HashSet<_>>();
    let mut entered = HashSet::new();

    let mut i = 0;
    while i < self.items.len() {
      let from = self.items[i].state;
      if let Some(state) = network.state(from) {
        for label in state.transitions().keys() {
          let start = match network.start_state(label) {
            Some(start) => start,
            None => continue,
          };
          let item = StateItem {
            state: start,
            back_link: Some(i as u32),
          };
          if !entered.insert((start, from)) || !seen.insert(item) {
            continue;
          }
          self.items.push(item);
        }
      }
      i += 1;
    }
  }
}
