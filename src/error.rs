use thiserror::Error;
use crate::symbol::Symbol;

/// Two distinct rules match at the same constructed state.
///
/// The first name is the match already recorded at the state, the second
/// the one found after it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("conflicting rules `{0}` and `{1}`")]
pub struct NameConflictError(pub Symbol, pub Symbol);
