use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use smol_str::SmolStr;

use super::error::{read_reason, TransducerError};
use super::source::ByteSource;
use crate::constants::{HEADER_PROPERTY_COUNT, HFST3_HEADER_TAG};
use crate::types::{HeaderFlag, SymbolNumber, TransitionTableIndex};

const ACCEPTED_TYPES: [&str; 2] = ["HFST_OL", "HFST_OLW"];

#[derive(Debug, Clone)]
pub struct TransducerHeader {
    symbols: SymbolNumber,
    input_symbols: SymbolNumber,
    trans_index_table: TransitionTableIndex,
    trans_target_table: TransitionTableIndex,
    states: TransitionTableIndex,
    transitions: TransitionTableIndex,

    properties: [bool; HEADER_PROPERTY_COUNT],
    metadata: Vec<(SmolStr, SmolStr)>,
    header_size: usize,
}

#[allow(clippy::len_without_is_empty)]
impl TransducerHeader {
    pub(crate) fn read_from<R: Read>(
        rdr: &mut ByteSource<R>,
    ) -> Result<TransducerHeader, TransducerError> {
        let start = rdr.position();
        let metadata = read_vendor_header(rdr)?;

        let input_symbols = rdr
            .read_u16::<LittleEndian>()
            .map_err(|e| header_error(rdr.position(), &e))?;
        let symbols = rdr
            .read_u16::<LittleEndian>()
            .map_err(|e| header_error(rdr.position(), &e))?;

        let mut sizes = [0u32; 4];
        for size in sizes.iter_mut() {
            *size = rdr
                .read_u32::<LittleEndian>()
                .map_err(|e| header_error(rdr.position(), &e))?;
        }

        let mut props = [false; HEADER_PROPERTY_COUNT];
        for prop in props.iter_mut() {
            let v = rdr
                .read_u32::<LittleEndian>()
                .map_err(|e| header_error(rdr.position(), &e))?;
            *prop = v != 0
        }

        let header = TransducerHeader {
            symbols: SymbolNumber(symbols),
            input_symbols: SymbolNumber(input_symbols),
            trans_index_table: TransitionTableIndex(sizes[0]),
            trans_target_table: TransitionTableIndex(sizes[1]),
            states: TransitionTableIndex(sizes[2]),
            transitions: TransitionTableIndex(sizes[3]),
            properties: props,
            metadata,
            header_size: (rdr.position() - start) as usize,
        };

        log::debug!(
            "Header: {} symbols ({} input), index table {}, transition table {}, weighted: {}",
            header.symbols,
            header.input_symbols,
            header.trans_index_table,
            header.trans_target_table,
            header.has_flag(HeaderFlag::Weighted)
        );

        if header.has_flag(HeaderFlag::HasInputEpsilonCycles)
            || header.has_flag(HeaderFlag::HasUnweightedInputEpsilonCycles)
        {
            log::warn!("Transducer has input-epsilon cycles; lookups are bounded by path length");
        }

        Ok(header)
    }

    pub fn symbol_count(&self) -> SymbolNumber {
        self.symbols
    }

    pub fn input_symbol_count(&self) -> SymbolNumber {
        self.input_symbols
    }

    pub fn index_table_size(&self) -> TransitionTableIndex {
        self.trans_index_table
    }

    pub fn target_table_size(&self) -> TransitionTableIndex {
        self.trans_target_table
    }

    pub fn has_flag(&self, flag: HeaderFlag) -> bool {
        self.properties[flag as usize]
    }

    pub fn states(&self) -> TransitionTableIndex {
        self.states
    }

    pub fn transitions(&self) -> TransitionTableIndex {
        self.transitions
    }

    pub fn properties(&self) -> &[bool; HEADER_PROPERTY_COUNT] {
        &self.properties
    }

    /// Key/value pairs of the vendor sub-header, in file order.
    pub fn metadata(&self) -> &[(SmolStr, SmolStr)] {
        &self.metadata
    }

    /// Bytes consumed by the header, vendor sub-header included.
    pub fn len(&self) -> usize {
        self.header_size
    }
}

fn header_error(offset: u64, e: &std::io::Error) -> TransducerError {
    TransducerError::HeaderParsing {
        offset,
        reason: read_reason(e),
    }
}

fn read_vendor_header<R: Read>(
    rdr: &mut ByteSource<R>,
) -> Result<Vec<(SmolStr, SmolStr)>, TransducerError> {
    let err = |offset: u64, reason: &str| TransducerError::HeaderParsing {
        offset,
        reason: reason.to_string(),
    };

    if !rdr
        .starts_with(HFST3_HEADER_TAG)
        .map_err(|e| header_error(rdr.position(), &e))?
    {
        return Ok(vec![]);
    }

    let remaining = rdr
        .read_u16::<LittleEndian>()
        .map_err(|e| header_error(rdr.position(), &e))?;
    let sep = rdr
        .read_u8()
        .map_err(|e| header_error(rdr.position(), &e))?;
    if sep != 0 {
        return Err(err(rdr.position() - 1, "vendor header separator is not NUL"));
    }

    let payload_start = rdr.position();
    let mut payload = vec![0u8; remaining as usize];
    rdr.read_exact(&mut payload)
        .map_err(|e| header_error(payload_start, &e))?;

    if payload.last().map_or(false, |b| *b != 0) {
        return Err(err(
            payload_start + payload.len() as u64 - 1,
            "vendor header is not NUL-terminated",
        ));
    }

    let mut strings = payload
        .split(|b| *b == 0)
        .map(|s| SmolStr::new(String::from_utf8_lossy(s)));
    let mut metadata = vec![];

    // A terminated payload splits into an empty trailing piece.
    while let (Some(key), Some(value)) = (strings.next(), strings.next()) {
        if key.is_empty() && value.is_empty() {
            break;
        }
        metadata.push((key, value));
    }

    if let Some((_, ty)) = metadata.iter().find(|(k, _)| k.as_str() == "type") {
        if !ACCEPTED_TYPES.contains(&ty.as_str()) {
            return Err(TransducerError::TransducerType { found: ty.clone() });
        }
    }

    log::trace!("Vendor header: {:?}", metadata);

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::FixtureBuilder;

    fn read(bytes: &[u8]) -> Result<TransducerHeader, TransducerError> {
        TransducerHeader::read_from(&mut ByteSource::new(bytes))
    }

    #[test]
    fn plain_header() {
        let bytes = FixtureBuilder::ab().header_bytes();
        let header = read(&bytes).unwrap();

        assert_eq!(header.len(), 56);
        assert_eq!(header.symbol_count(), SymbolNumber(3));
        assert_eq!(header.input_symbol_count(), SymbolNumber(3));
        assert_eq!(header.index_table_size(), TransitionTableIndex(4));
        assert_eq!(header.target_table_size(), TransitionTableIndex(4));
        assert!(header.has_flag(HeaderFlag::Weighted));
        assert!(!header.has_flag(HeaderFlag::Cyclic));
        assert!(header.metadata().is_empty());
    }

    #[test]
    fn vendor_header_is_skipped_and_kept() {
        let bytes = FixtureBuilder::ab()
            .vendor(&[("version", "3.0"), ("type", "HFST_OLW"), ("name", "ab")])
            .header_bytes();
        let header = read(&bytes).unwrap();

        assert_eq!(header.symbol_count(), SymbolNumber(3));
        assert_eq!(header.len(), bytes.len());
        let metadata: Vec<(&str, &str)> = header
            .metadata()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            metadata,
            vec![("version", "3.0"), ("type", "HFST_OLW"), ("name", "ab")]
        );
    }

    #[test]
    fn vendor_header_unweighted_type() {
        let bytes = FixtureBuilder::ab()
            .unweighted()
            .vendor(&[("type", "HFST_OL")])
            .header_bytes();
        let header = read(&bytes).unwrap();

        assert!(!header.has_flag(HeaderFlag::Weighted));
        assert_eq!(header.metadata().len(), 1);
        assert_eq!(header.metadata()[0].1.as_str(), "HFST_OL");
    }

    #[test]
    fn vendor_header_without_type() {
        let bytes = FixtureBuilder::ab().vendor(&[("name", "ab")]).header_bytes();
        let header = read(&bytes).unwrap();

        assert_eq!(header.len(), bytes.len());
        assert_eq!(header.symbol_count(), SymbolNumber(3));
        assert_eq!(header.metadata()[0].0.as_str(), "name");
    }

    #[test]
    fn vendor_type_mismatch() {
        let bytes = FixtureBuilder::ab()
            .vendor(&[("type", "FOMA")])
            .header_bytes();
        match read(&bytes) {
            Err(TransducerError::TransducerType { found }) => assert_eq!(found.as_str(), "FOMA"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn vendor_header_without_terminator() {
        let mut bytes = b"HFST\0".to_vec();
        bytes.extend_from_slice(&[3, 0, 0]);
        bytes.extend_from_slice(b"abc");
        bytes.extend(FixtureBuilder::ab().header_bytes());

        assert!(matches!(
            read(&bytes),
            Err(TransducerError::HeaderParsing { offset: 10, .. })
        ));
    }

    #[test]
    fn truncated_header() {
        let bytes = FixtureBuilder::ab().header_bytes();
        for cut in [0, 1, 3, 20, 55] {
            assert!(
                matches!(
                    read(&bytes[..cut]),
                    Err(TransducerError::HeaderParsing { .. })
                ),
                "cut at {}",
                cut
            );
        }
    }
}
