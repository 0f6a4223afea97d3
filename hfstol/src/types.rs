//! Strongly typed numbers used throughout the transducer.

use std::{fmt::Display, ops::Add};

use serde::{Deserialize, Serialize};

use crate::constants::{NO_SYMBOL, NO_TABLE_INDEX, TARGET_TABLE};

/// The flag diacritic operators as given in Beesley & Karttunen,
/// Finite State Morphology (2003).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagDiacriticOperator {
    /// `P`: set the feature to the value.
    PositiveSet,
    /// `N`: set the feature to anything but the value.
    NegativeSet,
    /// `R`: require the value (or any value).
    Require,
    /// `D`: disallow the value (or any value).
    Disallow,
    /// `C`: reset the feature to neutral.
    Clear,
    /// `U`: unify the feature with the value.
    Unification,
}

impl std::str::FromStr for FlagDiacriticOperator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P" => Ok(FlagDiacriticOperator::PositiveSet),
            "N" => Ok(FlagDiacriticOperator::NegativeSet),
            "R" => Ok(FlagDiacriticOperator::Require),
            "D" => Ok(FlagDiacriticOperator::Disallow),
            "C" => Ok(FlagDiacriticOperator::Clear),
            "U" => Ok(FlagDiacriticOperator::Unification),
            _ => Err(()),
        }
    }
}

/// The nine boolean properties stored in the header, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFlag {
    Weighted,
    Deterministic,
    InputDeterministic,
    Minimized,
    Cyclic,
    HasEpsilonEpsilonTransitions,
    HasInputEpsilonTransitions,
    HasInputEpsilonCycles,
    HasUnweightedInputEpsilonCycles,
}

impl HeaderFlag {
    /// All flags, in the order they are stored.
    pub const ALL: [HeaderFlag; 9] = [
        HeaderFlag::Weighted,
        HeaderFlag::Deterministic,
        HeaderFlag::InputDeterministic,
        HeaderFlag::Minimized,
        HeaderFlag::Cyclic,
        HeaderFlag::HasEpsilonEpsilonTransitions,
        HeaderFlag::HasInputEpsilonTransitions,
        HeaderFlag::HasInputEpsilonCycles,
        HeaderFlag::HasUnweightedInputEpsilonCycles,
    ];
}

/// A parsed flag diacritic: operator, interned feature id and interned value id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagDiacriticOperation {
    pub operation: FlagDiacriticOperator,
    pub feature: u16,
    pub value: ValueNumber,
}

/// Ordinal of a symbol in the alphabet. Zero is epsilon.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SymbolNumber(pub u16);

impl SymbolNumber {
    pub const EPSILON: Self = SymbolNumber(0);

    /// Interpret a raw table value, mapping `NO_SYMBOL` to `None`.
    #[inline(always)]
    pub fn from_raw(raw: u16) -> Option<Self> {
        if raw == NO_SYMBOL {
            None
        } else {
            Some(SymbolNumber(raw))
        }
    }

    #[inline(always)]
    pub fn is_epsilon(&self) -> bool {
        self.0 == 0
    }
}

impl Display for SymbolNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interned flag diacritic value. Zero is the neutral (unset) value; negative
/// values record a negative set (`N`) of their absolute value.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ValueNumber(pub i16);

impl ValueNumber {
    pub const NEUTRAL: Self = ValueNumber(0);

    #[inline(always)]
    pub(crate) fn invert(&self) -> Self {
        ValueNumber(-self.0)
    }

    #[inline(always)]
    pub(crate) fn incr(&self) -> Self {
        ValueNumber(self.0 + 1)
    }

    #[inline(always)]
    pub fn is_neutral(&self) -> bool {
        self.0 == 0
    }
}

/// Record number inside one of the two tables.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
#[serde(transparent)]
pub struct TransitionTableIndex(pub u32);

impl Display for TransitionTableIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransitionTableIndex {
    #[inline(always)]
    pub(crate) fn incr(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    #[inline(always)]
    pub(crate) fn offset(&self, by: u32) -> Option<Self> {
        self.0.checked_add(by).map(Self)
    }
}

/// Which table a state lives in, with its record number in that table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Index(TransitionTableIndex),
    Transition(TransitionTableIndex),
}

/// A state of the transducer. States are implicit: values below
/// [`TARGET_TABLE`] are index table records, values at or above it are
/// transition table records offset by [`TARGET_TABLE`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
#[serde(transparent)]
pub struct StateIndex(pub u32);

impl StateIndex {
    /// The initial state of every transducer.
    pub const START: Self = StateIndex(0);

    /// Interpret a raw target value, mapping `NO_TABLE_INDEX` to `None`.
    #[inline(always)]
    pub fn from_raw(raw: u32) -> Option<Self> {
        if raw == NO_TABLE_INDEX {
            None
        } else {
            Some(StateIndex(raw))
        }
    }

    #[inline(always)]
    pub fn region(&self) -> Region {
        if self.0 >= TARGET_TABLE {
            Region::Transition(TransitionTableIndex(self.0 - TARGET_TABLE))
        } else {
            Region::Index(TransitionTableIndex(self.0))
        }
    }
}

impl Display for StateIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.region() {
            Region::Index(i) => write!(f, "i{}", i),
            Region::Transition(i) => write!(f, "t{}", i),
        }
    }
}

/// Tropical weight; paths accumulate by addition and lower is better.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Weight(pub f32);

impl Weight {
    pub const ZERO: Self = Weight(0.0);
    pub const MAX: Self = Weight(f32::MAX);
    pub const INFINITE: Self = Weight(f32::INFINITY);

    #[inline(always)]
    pub fn from_bits(bits: u32) -> Self {
        Weight(f32::from_bits(bits))
    }
}

impl Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Weight {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Weight(self.0 + rhs.0)
    }
}

pub type FlagDiacriticState = Vec<ValueNumber>;
pub type OperationsMap = hashbrown::HashMap<SymbolNumber, FlagDiacriticOperation>;
