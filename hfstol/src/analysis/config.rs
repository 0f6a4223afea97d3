use serde::{Deserialize, Serialize};

use crate::types::Weight;

/// Tuning for [`Analyser`](super::Analyser). Every field may be left out of a
/// JSON config file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LookupConfig {
    /// Keep at most this many analyses.
    pub n_best: Option<usize>,
    /// Drop analyses heavier than this.
    pub max_weight: Option<Weight>,
    /// Keep one analysis per output string, with its best weight.
    pub unique: bool,
    /// Follow flag diacritic arcs and enforce their constraints.
    pub flag_diacritics: bool,
    /// Most arcs consuming no input that a path may take in a row.
    pub max_path_length: usize,
    /// How often a path may return to a state without consuming input.
    pub max_epsilon_cycles: usize,
    /// Stop searching once this many analyses have been found.
    pub max_analyses: usize,
}

impl LookupConfig {
    pub const fn default() -> LookupConfig {
        LookupConfig {
            n_best: None,
            max_weight: None,
            unique: false,
            flag_diacritics: false,
            max_path_length: 1000,
            max_epsilon_cycles: 0,
            max_analyses: 100_000,
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig::default()
    }
}
