use std::fmt;
use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};

use super::error::TransducerError;
use super::index_table::read_table;
use super::source::ByteSource;
use super::symbol_transition::SymbolTransition;
use crate::constants::{
    FINAL_MARKER_TARGET, NO_SYMBOL, TARGET_TABLE, TRANS_TABLE_SIZE, UNWEIGHTED_TRANS_TABLE_SIZE,
};
use crate::types::{StateIndex, SymbolNumber, TransitionTableIndex, Weight};

pub struct TransitionTable {
    size: TransitionTableIndex,
    buf: Vec<u8>,
    offset: u64,
    weighted: bool,
}

impl fmt::Debug for TransitionTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Transition table index: {}", self.size)?;
        Ok(())
    }
}

#[allow(clippy::len_without_is_empty)]
impl TransitionTable {
    pub(crate) fn read_from<R: Read>(
        rdr: &mut ByteSource<R>,
        size: TransitionTableIndex,
        weighted: bool,
    ) -> Result<TransitionTable, TransducerError> {
        let offset = rdr.position();
        let stride = if weighted {
            TRANS_TABLE_SIZE
        } else {
            UNWEIGHTED_TRANS_TABLE_SIZE
        };
        let buf = read_table(rdr, size, stride)
            .map_err(|reason| TransducerError::TransitionTableRead { offset, reason })?;

        log::debug!(
            "Transition table: {} records of {} bytes at byte {}",
            size,
            stride,
            offset
        );

        Ok(TransitionTable {
            size,
            buf,
            offset,
            weighted,
        })
    }

    /// Number of records.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.size.0 as usize
    }

    #[inline(always)]
    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    #[inline(always)]
    fn stride(&self) -> usize {
        if self.weighted {
            TRANS_TABLE_SIZE
        } else {
            UNWEIGHTED_TRANS_TABLE_SIZE
        }
    }

    #[inline(always)]
    fn record(&self, i: TransitionTableIndex) -> Option<&[u8]> {
        if i >= self.size {
            return None;
        }

        let stride = self.stride();
        let index = stride * i.0 as usize;
        self.buf.get(index..index + stride)
    }

    #[inline(always)]
    pub(crate) fn raw_input_symbol(&self, i: TransitionTableIndex) -> Option<u16> {
        self.record(i).map(|r| LittleEndian::read_u16(&r[0..2]))
    }

    #[inline(always)]
    fn raw_output_symbol(&self, i: TransitionTableIndex) -> Option<u16> {
        self.record(i).map(|r| LittleEndian::read_u16(&r[2..4]))
    }

    #[inline(always)]
    fn raw_target(&self, i: TransitionTableIndex) -> Option<u32> {
        self.record(i).map(|r| LittleEndian::read_u32(&r[4..8]))
    }

    #[inline(always)]
    pub fn input_symbol(&self, i: TransitionTableIndex) -> Option<SymbolNumber> {
        self.raw_input_symbol(i).and_then(SymbolNumber::from_raw)
    }

    #[inline(always)]
    pub fn output_symbol(&self, i: TransitionTableIndex) -> Option<SymbolNumber> {
        self.raw_output_symbol(i).and_then(SymbolNumber::from_raw)
    }

    #[inline(always)]
    pub fn target(&self, i: TransitionTableIndex) -> Option<StateIndex> {
        self.raw_target(i).and_then(StateIndex::from_raw)
    }

    /// Stored weight of a record; `None` when out of range or unweighted.
    #[inline(always)]
    pub fn weight(&self, i: TransitionTableIndex) -> Option<Weight> {
        if !self.weighted {
            return None;
        }

        self.record(i)
            .map(|r| Weight(LittleEndian::read_f32(&r[8..12])))
    }

    #[inline(always)]
    pub fn is_final(&self, i: TransitionTableIndex) -> bool {
        self.raw_input_symbol(i) == Some(NO_SYMBOL)
            && self.raw_output_symbol(i) == Some(NO_SYMBOL)
            && self.raw_target(i) == Some(FINAL_MARKER_TARGET)
    }

    /// Decode the arc at `i`. State head records are not arcs.
    pub fn symbol_transition(&self, i: TransitionTableIndex) -> Option<SymbolTransition> {
        let input = self.input_symbol(i)?;
        let output = self.output_symbol(i)?;
        let target = self.target(i)?;
        let weight = self.weight(i).unwrap_or(Weight::ZERO);

        Some(SymbolTransition::new(input, output, target, weight))
    }

    /// Check that every arc points at an index table slot or a transition
    /// table record.
    pub(crate) fn validate(
        &self,
        index_table_size: TransitionTableIndex,
    ) -> Result<(), TransducerError> {
        let end = u64::from(TARGET_TABLE) + u64::from(self.size.0);

        for i in 0..self.size.0 {
            let i = TransitionTableIndex(i);
            if self.raw_input_symbol(i) == Some(NO_SYMBOL) {
                continue;
            }

            let target = self.raw_target(i).map_or(u64::MAX, u64::from);
            let in_index = target < u64::from(index_table_size.0);
            let in_transitions = target >= u64::from(TARGET_TABLE) && target < end;

            if !in_index && !in_transitions {
                return Err(TransducerError::TransitionTableRead {
                    offset: self.offset + (self.stride() * i.0 as usize) as u64,
                    reason: format!("record {} has out-of-range target {}", i, target),
                });
            }
        }

        Ok(())
    }
}
