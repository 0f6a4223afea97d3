//! Transducer is a Finite-State Automaton with two tapes / two symbols per
//! transition.
//!
//! The optimized-lookup format stores states implicitly in two tables. States
//! with many arcs get a block of slots in the index table, addressed by input
//! symbol; the rest live directly in the transition table as a head record
//! followed by their arcs. [`StateIndex::region`] tells the two apart.
pub mod alphabet;
pub mod error;
pub mod header;
pub mod index_table;
pub(crate) mod source;
pub mod symbol_transition;
pub mod transition_table;

use std::fmt;
use std::io::{BufReader, Read};
use std::path::Path;

use smol_str::SmolStr;

use self::alphabet::{TransducerAlphabet, TransducerAlphabetParser};
pub use self::error::TransducerError;
use self::header::TransducerHeader;
use self::index_table::IndexTable;
use self::source::ByteSource;
pub use self::symbol_transition::{SymbolTransition, TransitionRef};
use self::transition_table::TransitionTable;
use crate::analysis::{Analyser, LookupConfig};
use crate::encoder::{EncodeError, Encoder};
use crate::types::{HeaderFlag, Region, StateIndex, SymbolNumber, TransitionTableIndex, Weight};
use crate::vfs::{self, Filesystem};

/// A loaded optimized-lookup transducer. Immutable after loading.
pub struct Transducer {
    header: TransducerHeader,
    alphabet: TransducerAlphabet,
    encoder: Encoder,
    index_table: IndexTable,
    transition_table: TransitionTable,
}

impl fmt::Debug for Transducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transducer")
            .field("header", &self.header)
            .field("index_table", &self.index_table)
            .field("transition_table", &self.transition_table)
            .finish()
    }
}

impl Transducer {
    /// Read a transducer from any byte stream.
    pub fn from_reader<R: Read>(reader: R) -> Result<Transducer, TransducerError> {
        let mut rdr = ByteSource::new(BufReader::new(reader));

        let header = TransducerHeader::read_from(&mut rdr)?;
        let alphabet = TransducerAlphabetParser::read_from(&mut rdr, header.symbol_count())?;
        let index_table = IndexTable::read_from(&mut rdr, header.index_table_size())?;
        let transition_table = TransitionTable::read_from(
            &mut rdr,
            header.target_table_size(),
            header.has_flag(HeaderFlag::Weighted),
        )?;

        index_table.validate(header.target_table_size())?;
        transition_table.validate(header.index_table_size())?;

        let encoder = Encoder::new(alphabet.key_table(), header.input_symbol_count());

        log::debug!("Loaded transducer of {} bytes", rdr.position());

        Ok(Transducer {
            header,
            alphabet,
            encoder,
            index_table,
            transition_table,
        })
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Transducer, TransducerError> {
        Transducer::from_reader(buf)
    }

    /// Memory map a file and read a transducer from it.
    pub fn from_path<P, FS>(fs: &FS, path: P) -> Result<Transducer, TransducerError>
    where
        P: AsRef<Path>,
        FS: Filesystem,
    {
        use vfs::File;

        let file = fs.open(path).map_err(TransducerError::Io)?;
        if file.is_empty().map_err(TransducerError::Io)? {
            return Transducer::from_bytes(&[]);
        }

        let mmap = unsafe { file.memory_map() }.map_err(TransducerError::Memmap)?;
        Transducer::from_bytes(&mmap)
    }

    pub fn header(&self) -> &TransducerHeader {
        &self.header
    }

    pub fn alphabet(&self) -> &TransducerAlphabet {
        &self.alphabet
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn index_table(&self) -> &IndexTable {
        &self.index_table
    }

    pub fn transition_table(&self) -> &TransitionTable {
        &self.transition_table
    }

    pub fn symbol_count(&self) -> SymbolNumber {
        self.header.symbol_count()
    }

    pub fn is_weighted(&self) -> bool {
        self.header.has_flag(HeaderFlag::Weighted)
    }

    /// First arc of `state` consuming `symbol`.
    pub fn transition_start(&self, state: StateIndex, symbol: SymbolNumber) -> Option<TransitionRef> {
        let first = match state.region() {
            Region::Index(i) => {
                let slot = i.offset(1)?.offset(u32::from(symbol.0))?;
                if self.index_table.input_symbol(slot)? != symbol {
                    return None;
                }
                self.index_target(slot)?
            }
            Region::Transition(t) => t.incr()?,
        };

        if self.transition_table.input_symbol(first)? == symbol {
            Some(TransitionRef(first))
        } else {
            None
        }
    }

    /// The arc after `t`, if it consumes the same symbol.
    pub fn next_transition(&self, t: TransitionRef, symbol: SymbolNumber) -> Option<TransitionRef> {
        let next = t.0.incr()?;

        if self.transition_table.input_symbol(next)? == symbol {
            Some(TransitionRef(next))
        } else {
            None
        }
    }

    /// First arc of `state` that consumes no input: epsilon or flag diacritic.
    pub fn free_transition_start(&self, state: StateIndex) -> Option<TransitionRef> {
        let first = match state.region() {
            Region::Index(i) => {
                let slot = i.incr()?;
                if !self.index_table.input_symbol(slot)?.is_epsilon() {
                    return None;
                }
                self.index_target(slot)?
            }
            Region::Transition(t) => t.incr()?,
        };

        if self.is_free(first) {
            Some(TransitionRef(first))
        } else {
            None
        }
    }

    pub fn next_free_transition(&self, t: TransitionRef) -> Option<TransitionRef> {
        let next = t.0.incr()?;

        if self.is_free(next) {
            Some(TransitionRef(next))
        } else {
            None
        }
    }

    #[inline(always)]
    fn is_free(&self, i: TransitionTableIndex) -> bool {
        match self.transition_table.input_symbol(i) {
            Some(s) => s.is_epsilon() || self.alphabet.is_flag(s),
            None => false,
        }
    }

    #[inline(always)]
    fn index_target(&self, slot: TransitionTableIndex) -> Option<TransitionTableIndex> {
        match self.index_table.target(slot)?.region() {
            Region::Transition(t) => Some(t),
            Region::Index(_) => None,
        }
    }

    #[inline(always)]
    pub fn symbol_transition(&self, t: TransitionRef) -> Option<SymbolTransition> {
        self.transition_table.symbol_transition(t.0)
    }

    #[inline(always)]
    pub fn target(&self, t: TransitionRef) -> Option<StateIndex> {
        self.transition_table.target(t.0)
    }

    #[inline(always)]
    pub fn input_symbol(&self, t: TransitionRef) -> Option<SymbolNumber> {
        self.transition_table.input_symbol(t.0)
    }

    #[inline(always)]
    pub fn output_symbol(&self, t: TransitionRef) -> Option<SymbolNumber> {
        self.transition_table.output_symbol(t.0)
    }

    pub fn weight(&self, t: TransitionRef) -> Result<Option<Weight>, TransducerError> {
        if !self.is_weighted() {
            return Err(TransducerError::UnweightedEngineMisuse);
        }

        Ok(self.transition_table.weight(t.0))
    }

    pub fn is_final(&self, state: StateIndex) -> bool {
        match state.region() {
            Region::Index(i) => self.index_table.is_final(i),
            Region::Transition(t) => self.transition_table.is_final(t),
        }
    }

    /// Final weight of `state`, or `None` if it is not final.
    pub fn final_weight(&self, state: StateIndex) -> Result<Option<Weight>, TransducerError> {
        if !self.is_weighted() {
            return Err(TransducerError::UnweightedEngineMisuse);
        }

        Ok(self.final_weight_unchecked(state))
    }

    /// Final weight for path scoring: zero in unweighted transducers.
    #[inline]
    pub(crate) fn final_weight_unchecked(&self, state: StateIndex) -> Option<Weight> {
        if !self.is_final(state) {
            return None;
        }

        if !self.is_weighted() {
            return Some(Weight::ZERO);
        }

        match state.region() {
            Region::Index(i) => self.index_table.final_weight(i),
            Region::Transition(t) => self.transition_table.weight(t),
        }
    }

    /// Split a word into input symbols.
    pub fn tokenize(&self, word: &str) -> Result<Vec<SymbolNumber>, EncodeError> {
        self.encoder.encode(word)
    }

    /// Output string of a symbol sequence.
    pub fn output_string(&self, symbols: &[SymbolNumber]) -> SmolStr {
        self.alphabet.string_from_symbols(symbols)
    }

    /// Lowest-weight analysis of `word`. Flag diacritic arcs are not followed.
    pub fn lookup(&self, word: &str) -> Option<(SmolStr, Weight)> {
        let config = LookupConfig {
            n_best: Some(1),
            flag_diacritics: false,
            ..LookupConfig::default()
        };

        Analyser::new(self, config)
            .analyse(word)
            .ok()?
            .into_iter()
            .next()
            .map(|a| (a.output, a.weight))
    }
}
