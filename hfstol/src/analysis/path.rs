use crate::types::{
    FlagDiacriticOperation, FlagDiacriticOperator, FlagDiacriticState, SymbolNumber, ValueNumber,
    Weight,
};

/// The state of one path through the transducer: output so far, flag
/// diacritic values and accumulated weight.
#[derive(Debug, Clone, PartialEq)]
pub struct PathNode {
    pub string: Vec<SymbolNumber>,
    pub flag_state: FlagDiacriticState,
    pub weight: Weight,
}

impl PathNode {
    pub fn empty(flag_state_size: usize) -> PathNode {
        PathNode {
            string: Vec::with_capacity(16),
            flag_state: vec![ValueNumber::NEUTRAL; flag_state_size],
            weight: Weight::ZERO,
        }
    }

    #[inline(always)]
    fn feature(&self, feature: u16) -> ValueNumber {
        self.flag_state
            .get(feature as usize)
            .copied()
            .unwrap_or(ValueNumber::NEUTRAL)
    }

    #[inline(always)]
    fn update_flag(&mut self, feature: u16, value: ValueNumber) {
        let feature = feature as usize;
        if feature >= self.flag_state.len() {
            self.flag_state.resize(feature + 1, ValueNumber::NEUTRAL);
        }
        self.flag_state[feature] = value;
    }

    /// Check `op` against the current flag state. On success the state is
    /// updated and the previous value of the feature is returned, so the
    /// caller can restore it with [`PathNode::restore_flag`].
    pub fn apply_operation(&mut self, op: &FlagDiacriticOperation) -> Option<ValueNumber> {
        let f = self.feature(op.feature);

        let next = match op.operation {
            FlagDiacriticOperator::PositiveSet => op.value,
            FlagDiacriticOperator::NegativeSet => op.value.invert(),
            FlagDiacriticOperator::Require => {
                let res = if op.value.is_neutral() {
                    !f.is_neutral()
                } else {
                    f == op.value
                };

                if !res {
                    return None;
                }
                f
            }
            FlagDiacriticOperator::Disallow => {
                let res = if op.value.is_neutral() {
                    f.is_neutral()
                } else {
                    f != op.value
                };

                if !res {
                    return None;
                }
                f
            }
            FlagDiacriticOperator::Clear => ValueNumber::NEUTRAL,
            FlagDiacriticOperator::Unification => {
                // Unset, already this value, or negatively set to another value.
                if f.is_neutral() || f == op.value || (f.0 < 0 && f.invert() != op.value) {
                    op.value
                } else {
                    return None;
                }
            }
        };

        self.update_flag(op.feature, next);
        Some(f)
    }

    #[inline(always)]
    pub fn restore_flag(&mut self, feature: u16, value: ValueNumber) {
        self.update_flag(feature, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(operation: FlagDiacriticOperator, value: i16) -> FlagDiacriticOperation {
        FlagDiacriticOperation {
            operation,
            feature: 0,
            value: ValueNumber(value),
        }
    }

    fn state_after(ops: &[FlagDiacriticOperation]) -> Option<ValueNumber> {
        let mut node = PathNode::empty(1);
        for o in ops {
            node.apply_operation(o)?;
        }
        Some(node.flag_state[0])
    }

    use crate::types::FlagDiacriticOperator::*;

    #[test]
    fn set_and_require() {
        assert_eq!(state_after(&[op(PositiveSet, 1), op(Require, 1)]), Some(ValueNumber(1)));
        assert_eq!(state_after(&[op(PositiveSet, 1), op(Require, 2)]), None);
        assert_eq!(state_after(&[op(Require, 0)]), None);
        assert_eq!(state_after(&[op(PositiveSet, 2), op(Require, 0)]), Some(ValueNumber(2)));
    }

    #[test]
    fn negative_set() {
        assert_eq!(state_after(&[op(NegativeSet, 1)]), Some(ValueNumber(-1)));
        assert_eq!(state_after(&[op(NegativeSet, 1), op(Require, 1)]), None);
        assert_eq!(state_after(&[op(NegativeSet, 1), op(Disallow, 1)]), Some(ValueNumber(-1)));
    }

    #[test]
    fn disallow() {
        assert_eq!(state_after(&[op(Disallow, 0)]), Some(ValueNumber(0)));
        assert_eq!(state_after(&[op(PositiveSet, 1), op(Disallow, 0)]), None);
        assert_eq!(state_after(&[op(PositiveSet, 1), op(Disallow, 1)]), None);
        assert_eq!(state_after(&[op(PositiveSet, 1), op(Disallow, 2)]), Some(ValueNumber(1)));
    }

    #[test]
    fn clear() {
        assert_eq!(state_after(&[op(PositiveSet, 3), op(Clear, 0)]), Some(ValueNumber(0)));
    }

    #[test]
    fn unification() {
        assert_eq!(state_after(&[op(Unification, 1)]), Some(ValueNumber(1)));
        assert_eq!(state_after(&[op(PositiveSet, 1), op(Unification, 1)]), Some(ValueNumber(1)));
        assert_eq!(state_after(&[op(PositiveSet, 1), op(Unification, 2)]), None);
        assert_eq!(state_after(&[op(NegativeSet, 1), op(Unification, 2)]), Some(ValueNumber(2)));
        assert_eq!(state_after(&[op(NegativeSet, 1), op(Unification, 1)]), None);
    }

    #[test]
    fn restore_undoes_operation() {
        let mut node = PathNode::empty(2);
        let set = FlagDiacriticOperation {
            operation: PositiveSet,
            feature: 1,
            value: ValueNumber(4),
        };
        let previous = node.apply_operation(&set).unwrap();
        assert_eq!(node.flag_state[1], ValueNumber(4));
        node.restore_flag(1, previous);
        assert_eq!(node.flag_state, vec![ValueNumber(0), ValueNumber(0)]);
    }
}
