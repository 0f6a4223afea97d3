//! Small hand-built transducers for tests.

use crate::constants::{
    HEADER_PROPERTY_COUNT, HFST3_HEADER_TAG, NO_SYMBOL, NO_TABLE_INDEX, TARGET_TABLE,
};
use crate::transducer::{Transducer, TransducerError};
use crate::types::HeaderFlag;

pub(crate) const B: u32 = TARGET_TABLE;
const NO: u16 = NO_SYMBOL;
const EMPTY: (u16, u32) = (NO_SYMBOL, NO_TABLE_INDEX);
const HEAD: (u16, u16, u32, f32) = (NO_SYMBOL, NO_SYMBOL, NO_TABLE_INDEX, 0.0);

fn final_head(weight: f32) -> (u16, u16, u32, f32) {
    (NO, NO, 1, weight)
}

pub(crate) struct FixtureBuilder {
    vendor: Vec<(String, String)>,
    symbols: Vec<String>,
    input_symbols: u16,
    index: Vec<(u16, u32)>,
    transitions: Vec<(u16, u16, u32, f32)>,
    properties: [bool; HEADER_PROPERTY_COUNT],
}

impl FixtureBuilder {
    pub fn new(symbols: &[&str]) -> FixtureBuilder {
        let mut properties = [false; HEADER_PROPERTY_COUNT];
        properties[HeaderFlag::Weighted as usize] = true;

        FixtureBuilder {
            vendor: vec![],
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            input_symbols: symbols.len() as u16,
            index: vec![],
            transitions: vec![],
            properties,
        }
    }

    /// `0 --a:a/0.0--> F`, `0 --b:b/0.5--> F`, final weight 0.5.
    pub fn ab() -> FixtureBuilder {
        FixtureBuilder::new(&["", "a", "b"])
            .index(&[EMPTY, EMPTY, (1, B + 2), (2, B + 3)])
            .transitions(&[final_head(0.5), HEAD, (1, 1, B, 0.0), (2, 2, B, 0.5)])
    }

    /// `0 --a:X/1.0--> F`, `0 --a:Y/0.5--> F`, `0 --a:X/2.0--> F`.
    pub fn ambiguous() -> FixtureBuilder {
        FixtureBuilder::new(&["", "a", "X", "Y"])
            .input_symbols(2)
            .index(&[EMPTY, EMPTY, (1, B + 2)])
            .transitions(&[
                final_head(0.0),
                HEAD,
                (1, 2, B, 1.0),
                (1, 3, B, 0.5),
                (1, 2, B, 2.0),
            ])
    }

    /// Final start state with an `0:a/1.0` loop back to itself.
    pub fn epsilon_loop() -> FixtureBuilder {
        FixtureBuilder::new(&["", "a"])
            .index(&[(NO, 0.0f32.to_bits()), (0, B + 1)])
            .transitions(&[HEAD, (0, 1, 0, 1.0)])
            .property(HeaderFlag::HasInputEpsilonCycles, true)
    }

    /// Final start state with `0:a/1.0` and `0:b/2.0` loops back to itself.
    pub fn two_epsilon_loops() -> FixtureBuilder {
        FixtureBuilder::new(&["", "a", "b"])
            .index(&[(NO, 0.0f32.to_bits()), (0, B + 1)])
            .transitions(&[HEAD, (0, 1, 0, 1.0), (0, 2, 0, 2.0)])
            .property(HeaderFlag::HasInputEpsilonCycles, true)
    }

    /// Final start state with an `a:a/0.0` loop, accepting `a*`.
    pub fn a_star() -> FixtureBuilder {
        FixtureBuilder::new(&["", "a"])
            .index(&[(NO, 0.0f32.to_bits()), EMPTY, (1, B + 1)])
            .transitions(&[HEAD, (1, 1, 0, 0.0)])
    }

    /// `@P.CASE.NOM@ x` followed by either `@R.CASE.NOM@:+Nom` or
    /// `@R.CASE.GEN@:+Gen`; only the first is allowed.
    pub fn flags() -> FixtureBuilder {
        FixtureBuilder::new(&[
            "",
            "@P.CASE.NOM@",
            "@R.CASE.NOM@",
            "@R.CASE.GEN@",
            "x",
            "+Nom",
            "+Gen",
        ])
        .input_symbols(5)
        .index(&[EMPTY, (0, B), EMPTY, EMPTY, EMPTY, EMPTY])
        .transitions(&[
            (1, 1, B + 1, 0.0),
            HEAD,
            (4, 4, B + 3, 0.25),
            HEAD,
            (2, 5, B + 6, 0.0),
            (3, 6, B + 6, 0.0),
            final_head(0.5),
        ])
    }

    pub fn input_symbols(mut self, count: u16) -> FixtureBuilder {
        self.input_symbols = count;
        self
    }

    pub fn vendor(mut self, pairs: &[(&str, &str)]) -> FixtureBuilder {
        self.vendor = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    pub fn index(mut self, records: &[(u16, u32)]) -> FixtureBuilder {
        self.index = records.to_vec();
        self
    }

    pub fn transitions(mut self, records: &[(u16, u16, u32, f32)]) -> FixtureBuilder {
        self.transitions = records.to_vec();
        self
    }

    pub fn property(mut self, flag: HeaderFlag, value: bool) -> FixtureBuilder {
        self.properties[flag as usize] = value;
        self
    }

    pub fn unweighted(self) -> FixtureBuilder {
        self.property(HeaderFlag::Weighted, false)
    }

    fn is_weighted(&self) -> bool {
        self.properties[HeaderFlag::Weighted as usize]
    }

    pub fn header_bytes(&self) -> Vec<u8> {
        let mut out = vec![];

        if !self.vendor.is_empty() {
            let mut payload = vec![];
            for (k, v) in &self.vendor {
                payload.extend_from_slice(k.as_bytes());
                payload.push(0);
                payload.extend_from_slice(v.as_bytes());
                payload.push(0);
            }
            out.extend_from_slice(HFST3_HEADER_TAG);
            out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
            out.push(0);
            out.extend(payload);
        }

        let arcs = self.transitions.iter().filter(|t| t.0 != NO).count() as u32;
        let heads = self.transitions.len() as u32 - arcs;

        out.extend_from_slice(&self.input_symbols.to_le_bytes());
        out.extend_from_slice(&(self.symbols.len() as u16).to_le_bytes());
        out.extend_from_slice(&(self.index.len() as u32).to_le_bytes());
        out.extend_from_slice(&(self.transitions.len() as u32).to_le_bytes());
        out.extend_from_slice(&(heads + 1).to_le_bytes());
        out.extend_from_slice(&arcs.to_le_bytes());
        for p in &self.properties {
            out.extend_from_slice(&u32::from(*p).to_le_bytes());
        }

        out
    }

    pub fn alphabet_bytes(&self) -> Vec<u8> {
        let mut out = vec![];
        for s in &self.symbols {
            out.extend_from_slice(s.as_bytes());
            out.push(0);
        }
        out
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = self.header_bytes();
        out.extend(self.alphabet_bytes());

        for (sym, target) in &self.index {
            out.extend_from_slice(&sym.to_le_bytes());
            out.extend_from_slice(&target.to_le_bytes());
        }

        let weighted = self.is_weighted();
        for (input, output, target, weight) in &self.transitions {
            out.extend_from_slice(&input.to_le_bytes());
            out.extend_from_slice(&output.to_le_bytes());
            out.extend_from_slice(&target.to_le_bytes());
            if weighted {
                out.extend_from_slice(&weight.to_le_bytes());
            }
        }

        out
    }

    pub fn try_load(&self) -> Result<Transducer, TransducerError> {
        Transducer::from_bytes(&self.build())
    }

    pub fn load(&self) -> Transducer {
        self.try_load().unwrap()
    }
}
