//! Enumerating every analysis of a word.
//!
//! [`Analyser`] walks all paths from the start state that consume the whole
//! input and end in a final state, optionally enforcing flag diacritics along
//! the way.

mod config;
mod path;

use std::cmp::Ordering;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

pub use self::config::LookupConfig;
pub use self::path::PathNode;
use crate::encoder::EncodeError;
use crate::transducer::{SymbolTransition, Transducer};
use crate::types::{StateIndex, SymbolNumber, Weight};

/// One output of a lookup with its path weight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub output: SmolStr,
    pub weight: Weight,
}

/// Mutable state of one depth-first search.
struct Search {
    node: PathNode,
    /// States on the current path with the input left when they were entered.
    visits: Vec<(StateIndex, usize)>,
    found: Vec<Analysis>,
}

pub struct Analyser<'t> {
    transducer: &'t Transducer,
    config: LookupConfig,
}

impl<'t> Analyser<'t> {
    pub fn new(transducer: &'t Transducer, config: LookupConfig) -> Analyser<'t> {
        Analyser { transducer, config }
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// All analyses of `word`, lightest first. A word that cannot be split
    /// into input symbols is an error; a word with no path is an empty list.
    pub fn analyse(&self, word: &str) -> Result<Vec<Analysis>, EncodeError> {
        let input = self.transducer.tokenize(word)?;
        let mut search = Search {
            node: PathNode::empty(self.transducer.alphabet().state_size()),
            visits: Vec::with_capacity(input.len() + 1),
            found: vec![],
        };

        self.walk(StateIndex::START, &input, &mut search);
        log::trace!("{}: {} raw analyses", word, search.found.len());

        if search.found.len() >= self.config.max_analyses {
            log::warn!("{}: search stopped after {} analyses", word, search.found.len());
        }

        Ok(self.finish(search.found))
    }

    fn walk(&self, state: StateIndex, input: &[SymbolNumber], search: &mut Search) {
        if search.found.len() >= self.config.max_analyses {
            return;
        }

        // Visits since input was last consumed are on top of the stack.
        let remaining = input.len();
        let mut free_arcs = 0;
        let mut returns = 0;
        for &(visited, at) in search.visits.iter().rev() {
            if at != remaining {
                break;
            }
            free_arcs += 1;
            if visited == state {
                returns += 1;
            }
        }

        if free_arcs > self.config.max_path_length || returns > self.config.max_epsilon_cycles {
            log::trace!("Epsilon path cut at {}", state);
            return;
        }

        search.visits.push((state, remaining));

        let mut arc = self.transducer.free_transition_start(state);
        while let Some(t) = arc {
            if let Some(st) = self.transducer.symbol_transition(t) {
                match self.transducer.alphabet().operations().get(&st.input) {
                    Some(op) if self.config.flag_diacritics => {
                        if let Some(previous) = search.node.apply_operation(op) {
                            self.follow(&st, input, search);
                            search.node.restore_flag(op.feature, previous);
                        }
                    }
                    Some(_) => {}
                    None => self.follow(&st, input, search),
                }
            }
            arc = self.transducer.next_free_transition(t);
        }

        match input.split_first() {
            None => {
                if let Some(w) = self.transducer.final_weight_unchecked(state) {
                    search.found.push(Analysis {
                        output: self.transducer.output_string(&search.node.string),
                        weight: search.node.weight + w,
                    });
                }
            }
            Some((&symbol, rest)) => {
                let mut arc = self.transducer.transition_start(state, symbol);
                while let Some(t) = arc {
                    if let Some(st) = self.transducer.symbol_transition(t) {
                        self.follow(&st, rest, search);
                    }
                    arc = self.transducer.next_transition(t, symbol);
                }
            }
        }

        search.visits.pop();
    }

    #[inline]
    fn follow(&self, st: &SymbolTransition, input: &[SymbolNumber], search: &mut Search) {
        let weight = search.node.weight;
        search.node.string.push(st.output);
        search.node.weight = weight + st.weight;

        self.walk(st.target, input, search);

        search.node.string.pop();
        search.node.weight = weight;
    }

    fn finish(&self, mut found: Vec<Analysis>) -> Vec<Analysis> {
        if let Some(max) = self.config.max_weight {
            found.retain(|a| a.weight <= max);
        }

        found.sort_by(|a, b| {
            a.weight
                .partial_cmp(&b.weight)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.output.cmp(&b.output))
        });

        if self.config.unique {
            let mut seen = HashSet::new();
            found.retain(|a| seen.insert(a.output.clone()));
        }

        if let Some(n) = self.config.n_best {
            found.truncate(n);
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::FixtureBuilder;

    fn outputs(analyses: &[Analysis]) -> Vec<(&str, f32)> {
        analyses
            .iter()
            .map(|a| (a.output.as_str(), a.weight.0))
            .collect()
    }

    #[test]
    fn all_analyses_sorted_by_weight() {
        let t = FixtureBuilder::ambiguous().load();
        let a = Analyser::new(&t, LookupConfig::default());

        assert_eq!(
            outputs(&a.analyse("a").unwrap()),
            vec![("Y", 0.5), ("X", 1.0), ("X", 2.0)]
        );
        assert!(a.analyse("aa").unwrap().is_empty());
        assert_eq!(a.analyse("b"), Err(EncodeError::Unencodable { offset: 0 }));
    }

    #[test]
    fn unique_keeps_best_weight() {
        let t = FixtureBuilder::ambiguous().load();
        let config = LookupConfig {
            unique: true,
            ..LookupConfig::default()
        };

        assert_eq!(
            outputs(&Analyser::new(&t, config).analyse("a").unwrap()),
            vec![("Y", 0.5), ("X", 1.0)]
        );
    }

    #[test]
    fn n_best_and_max_weight() {
        let t = FixtureBuilder::ambiguous().load();

        let config = LookupConfig {
            n_best: Some(1),
            ..LookupConfig::default()
        };
        assert_eq!(
            outputs(&Analyser::new(&t, config).analyse("a").unwrap()),
            vec![("Y", 0.5)]
        );

        let config = LookupConfig {
            max_weight: Some(Weight(1.0)),
            ..LookupConfig::default()
        };
        assert_eq!(
            outputs(&Analyser::new(&t, config).analyse("a").unwrap()),
            vec![("Y", 0.5), ("X", 1.0)]
        );
    }

    #[test]
    fn flag_diacritics_are_enforced() {
        let t = FixtureBuilder::flags().load();
        assert!(t.alphabet().has_flag_diacritics());

        let config = LookupConfig {
            flag_diacritics: true,
            ..LookupConfig::default()
        };
        assert_eq!(
            outputs(&Analyser::new(&t, config).analyse("x").unwrap()),
            vec![("x+Nom", 0.75)]
        );

        let a = Analyser::new(&t, LookupConfig::default());
        assert!(a.analyse("x").unwrap().is_empty());
    }

    #[test]
    fn epsilon_cycles_are_bounded() {
        let t = FixtureBuilder::epsilon_loop().load();

        let a = Analyser::new(&t, LookupConfig::default());
        assert_eq!(outputs(&a.analyse("").unwrap()), vec![("", 0.0)]);

        let config = LookupConfig {
            max_epsilon_cycles: 3,
            ..LookupConfig::default()
        };
        assert_eq!(
            outputs(&Analyser::new(&t, config).analyse("").unwrap()),
            vec![("", 0.0), ("a", 1.0), ("aa", 2.0), ("aaa", 3.0)]
        );

        let config = LookupConfig {
            max_epsilon_cycles: 10,
            max_path_length: 2,
            ..LookupConfig::default()
        };
        assert_eq!(
            outputs(&Analyser::new(&t, config).analyse("").unwrap()),
            vec![("", 0.0), ("a", 1.0), ("aa", 2.0)]
        );
    }

    #[test]
    fn two_epsilon_loops_finish() {
        let t = FixtureBuilder::two_epsilon_loops().load();
        assert_eq!(t.lookup(""), Some(("".into(), Weight::ZERO)));

        let config = LookupConfig {
            max_epsilon_cycles: 2,
            ..LookupConfig::default()
        };
        assert_eq!(
            outputs(&Analyser::new(&t, config).analyse("").unwrap()),
            vec![
                ("", 0.0),
                ("a", 1.0),
                ("aa", 2.0),
                ("b", 2.0),
                ("ab", 3.0),
                ("ba", 3.0),
                ("bb", 4.0)
            ]
        );

        let config = LookupConfig {
            max_epsilon_cycles: 100,
            max_path_length: 100,
            max_analyses: 50,
            ..LookupConfig::default()
        };
        assert_eq!(Analyser::new(&t, config).analyse("").unwrap().len(), 50);
    }

    #[test]
    fn long_words_are_analysed() {
        let t = FixtureBuilder::a_star().load();
        let word = "a".repeat(1200);

        let (out, w) = t.lookup(&word).unwrap();
        assert_eq!(out.as_str(), word);
        assert_eq!(w, Weight::ZERO);
        assert_eq!(t.lookup(&"a".repeat(1001)).map(|(o, _)| o.len()), Some(1001));
    }

    #[test]
    fn analyse_matches_lookup() {
        let t = FixtureBuilder::ab().load();
        let a = Analyser::new(&t, LookupConfig::default());

        for word in &["a", "b"] {
            let best = a.analyse(word).unwrap().into_iter().next();
            assert_eq!(best.map(|a| (a.output, a.weight)), t.lookup(word));
        }
    }

    #[test]
    fn analysis_serializes() {
        let a = Analysis {
            output: "kissa+N".into(),
            weight: Weight(1.5),
        };
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            r#"{"output":"kissa+N","weight":1.5}"#
        );
    }
}
