use std::fmt;
use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};

use super::error::TransducerError;
use super::source::ByteSource;
use crate::constants::{INDEX_TABLE_SIZE, NO_SYMBOL, NO_TABLE_INDEX, TARGET_TABLE};
use crate::types::{StateIndex, SymbolNumber, TransitionTableIndex, Weight};

/// Read exactly `size * stride` bytes of a table, or report how many were there.
pub(crate) fn read_table<R: Read>(
    rdr: &mut ByteSource<R>,
    size: TransitionTableIndex,
    stride: usize,
) -> Result<Vec<u8>, String> {
    let len = (size.0 as usize)
        .checked_mul(stride)
        .ok_or_else(|| format!("{} records do not fit in memory", size))?;

    let mut buf = Vec::with_capacity(len.min(1 << 20));
    rdr.by_ref()
        .take(len as u64)
        .read_to_end(&mut buf)
        .map_err(|e| e.to_string())?;

    if buf.len() < len {
        return Err(format!(
            "expected {} bytes, only {} available",
            len,
            buf.len()
        ));
    }

    Ok(buf)
}

pub struct IndexTable {
    size: TransitionTableIndex,
    buf: Vec<u8>,
    offset: u64,
}

impl fmt::Debug for IndexTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Index table index: {}", self.size)?;
        Ok(())
    }
}

#[allow(clippy::len_without_is_empty)]
impl IndexTable {
    pub(crate) fn read_from<R: Read>(
        rdr: &mut ByteSource<R>,
        size: TransitionTableIndex,
    ) -> Result<IndexTable, TransducerError> {
        let offset = rdr.position();
        let buf = read_table(rdr, size, INDEX_TABLE_SIZE)
            .map_err(|reason| TransducerError::IndexTableRead { offset, reason })?;

        log::debug!("Index table: {} records at byte {}", size, offset);

        Ok(IndexTable { size, buf, offset })
    }

    /// Number of records.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.size.0 as usize
    }

    #[inline(always)]
    fn record(&self, i: TransitionTableIndex) -> Option<&[u8]> {
        if i >= self.size {
            return None;
        }

        let index = INDEX_TABLE_SIZE * i.0 as usize;
        self.buf.get(index..index + INDEX_TABLE_SIZE)
    }

    #[inline(always)]
    fn raw_input_symbol(&self, i: TransitionTableIndex) -> Option<u16> {
        self.record(i).map(|r| LittleEndian::read_u16(&r[0..2]))
    }

    #[inline(always)]
    fn raw_target(&self, i: TransitionTableIndex) -> Option<u32> {
        self.record(i).map(|r| LittleEndian::read_u32(&r[2..6]))
    }

    #[inline(always)]
    pub fn input_symbol(&self, i: TransitionTableIndex) -> Option<SymbolNumber> {
        self.raw_input_symbol(i).and_then(SymbolNumber::from_raw)
    }

    #[inline(always)]
    pub fn target(&self, i: TransitionTableIndex) -> Option<StateIndex> {
        self.raw_target(i).and_then(StateIndex::from_raw)
    }

    #[inline(always)]
    pub fn is_final(&self, i: TransitionTableIndex) -> bool {
        self.raw_input_symbol(i) == Some(NO_SYMBOL)
            && self.raw_target(i).map_or(false, |t| t != NO_TABLE_INDEX)
    }

    /// Final weight stored in place of the target, for final records only.
    #[inline(always)]
    pub fn final_weight(&self, i: TransitionTableIndex) -> Option<Weight> {
        if !self.is_final(i) {
            return None;
        }

        self.raw_target(i).map(Weight::from_bits)
    }

    /// Check that every arc record points into the transition table.
    pub(crate) fn validate(
        &self,
        target_table_size: TransitionTableIndex,
    ) -> Result<(), TransducerError> {
        let end = u64::from(TARGET_TABLE) + u64::from(target_table_size.0);

        for i in 0..self.size.0 {
            let i = TransitionTableIndex(i);
            if self.raw_input_symbol(i) == Some(NO_SYMBOL) {
                continue;
            }

            let target = self.raw_target(i).map_or(0, u64::from);
            if target < u64::from(TARGET_TABLE) || target >= end {
                return Err(TransducerError::IndexTableRead {
                    offset: self.offset + (INDEX_TABLE_SIZE * i.0 as usize) as u64,
                    reason: format!("record {} has out-of-range target {}", i, target),
                });
            }
        }

        Ok(())
    }
}
