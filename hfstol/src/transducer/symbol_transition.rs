use crate::types::{StateIndex, SymbolNumber, TransitionTableIndex, Weight};

/// Handle to an arc record in the transition table.
///
/// Only produced by the traversal primitives, so it always refers to a record
/// that existed when it was handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionRef(pub(crate) TransitionTableIndex);

impl TransitionRef {
    /// Record number in the transition table.
    #[inline(always)]
    pub fn index(&self) -> TransitionTableIndex {
        self.0
    }
}

/// A decoded arc of the transducer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolTransition {
    pub input: SymbolNumber,
    pub output: SymbolNumber,
    pub target: StateIndex,
    /// Arc weight; zero for unweighted transducers.
    pub weight: Weight,
}

impl SymbolTransition {
    pub fn new(
        input: SymbolNumber,
        output: SymbolNumber,
        target: StateIndex,
        weight: Weight,
    ) -> SymbolTransition {
        SymbolTransition {
            input,
            output,
            target,
            weight,
        }
    }

    #[inline(always)]
    pub fn is_epsilon(&self) -> bool {
        self.input.is_epsilon()
    }
}
