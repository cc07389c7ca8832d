//! Automaton construction for a lexer/parser generator.
//!
//! A [`SymbolGrammar`] binds symbols to regular-expression bodies. Token
//! grammars become one character-level [`Dfa`] through [`build_lexer`];
//! syntax grammars become an ELR automaton through [`build_parser`], which
//! stitches the per-rule DFAs of a [`TransNetwork`] together by entering a
//! rule's sub-automaton wherever its symbol is read.

pub mod automaton;
pub mod dfa;
pub mod elr;
pub mod grammar;
pub mod network;
pub mod regex;
pub mod symbol;
mod bitset;
mod error;

pub use automaton::{Automaton, StateId};
pub use dfa::Dfa;
pub use elr::Elr;
pub use error::NameConflictError;
pub use grammar::SymbolGrammar;
pub use network::TransNetwork;
pub use regex::{Expr, RegularExpr};
pub use symbol::Symbol;
pub use bitset::PosSet;

pub fn build_lexer(grammar: &SymbolGrammar) -> Result<Dfa, NameConflictError> {
  dfa::build(grammar)
}

pub fn build_parser(grammar: &SymbolGrammar) -> Result<Elr, NameConflictError> {
  elr::build(grammar)
}
