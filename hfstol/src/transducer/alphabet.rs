use std::io::Read;
use std::str::FromStr;

use hashbrown::HashMap;
use smol_str::SmolStr;

use super::error::{read_reason, TransducerError};
use super::source::ByteSource;
use crate::constants::{MAX_SYMBOL_BYTES, UNKNOWN_SYMBOL};
use crate::types::{
    FlagDiacriticOperation, FlagDiacriticOperator, OperationsMap, SymbolNumber, ValueNumber,
};

/// The symbol alphabet of a transducer.
///
/// Flag diacritics, the unknown symbol and any other bracketed control
/// symbol are stored as empty strings, so they never surface in output and
/// are never matched by the encoder.
#[derive(Debug)]
pub struct TransducerAlphabet {
    pub(crate) key_table: Vec<SmolStr>,
    pub(crate) initial_symbol_count: SymbolNumber,
    pub(crate) flag_state_size: usize,
    pub(crate) length: usize,
    pub(crate) string_to_symbol: HashMap<SmolStr, SymbolNumber>,
    pub(crate) operations: OperationsMap,
    pub(crate) other_symbol: Option<SymbolNumber>,
}

impl TransducerAlphabet {
    /// Dense ordinal to string table.
    pub fn key_table(&self) -> &[SmolStr] {
        &self.key_table
    }

    pub fn initial_symbol_count(&self) -> SymbolNumber {
        self.initial_symbol_count
    }

    /// Number of distinct flag diacritic features.
    pub fn state_size(&self) -> usize {
        self.flag_state_size
    }

    /// Bytes consumed by the alphabet in the file.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.key_table.is_empty()
    }

    pub fn string_to_symbol(&self) -> &HashMap<SmolStr, SymbolNumber> {
        &self.string_to_symbol
    }

    pub fn operations(&self) -> &OperationsMap {
        &self.operations
    }

    /// The ordinal of `@_UNKNOWN_SYMBOL_@`, if the alphabet has one.
    pub fn other_symbol(&self) -> Option<SymbolNumber> {
        self.other_symbol
    }

    pub fn has_flag_diacritics(&self) -> bool {
        !self.operations.is_empty()
    }

    #[inline(always)]
    pub fn is_flag(&self, symbol: SymbolNumber) -> bool {
        self.operations.contains_key(&symbol)
    }

    /// Concatenate the strings of a symbol sequence. Out-of-range ordinals
    /// contribute nothing.
    pub fn string_from_symbols(&self, syms: &[SymbolNumber]) -> SmolStr {
        syms.iter()
            .filter_map(|s| self.key_table.get(s.0 as usize))
            .map(|s| s.as_str())
            .collect::<String>()
            .into()
    }
}

pub(crate) struct TransducerAlphabetParser {
    key_table: Vec<SmolStr>,
    string_to_symbol: HashMap<SmolStr, SymbolNumber>,
    operations: OperationsMap,
    feature_bucket: HashMap<SmolStr, u16>,
    value_bucket: HashMap<SmolStr, ValueNumber>,
    val_n: ValueNumber,
    other_symbol: Option<SymbolNumber>,
}

impl std::default::Default for TransducerAlphabetParser {
    fn default() -> Self {
        let mut value_bucket = HashMap::new();
        value_bucket.insert(SmolStr::default(), ValueNumber::NEUTRAL);

        TransducerAlphabetParser {
            key_table: Vec::with_capacity(64),
            string_to_symbol: HashMap::new(),
            operations: HashMap::new(),
            feature_bucket: HashMap::new(),
            value_bucket,
            val_n: ValueNumber(1),
            other_symbol: None,
        }
    }
}

/// Split `@OP.FEATURE.VALUE@` or `@OP.FEATURE@` into its parts.
fn split_flag(key: &str) -> Option<(FlagDiacriticOperator, &str, &str)> {
    let bytes = key.as_bytes();

    if bytes.len() < 5 || bytes[0] != b'@' || bytes[bytes.len() - 1] != b'@' || bytes[2] != b'.'
    {
        return None;
    }

    let op = FlagDiacriticOperator::from_str(key.get(1..2)?).ok()?;
    let rest = &key[3..];
    let feature_end = rest.find(|c: char| c == '.' || c == '@')?;
    let feature = &rest[..feature_end];
    let value = if rest.as_bytes()[feature_end] == b'.' {
        let tail = &rest[feature_end + 1..];
        &tail[..tail.find('@')?]
    } else {
        ""
    };

    Some((op, feature, value))
}

impl TransducerAlphabetParser {
    fn handle_flag(
        &mut self,
        i: SymbolNumber,
        op: FlagDiacriticOperator,
        feature: &str,
        value: &str,
    ) -> Result<(), String> {
        let feature = match self.feature_bucket.get(feature) {
            Some(f) => *f,
            None => {
                let n = self.feature_bucket.len() as u16;
                self.feature_bucket.insert(feature.into(), n);
                n
            }
        };

        let value = match self.value_bucket.get(value) {
            Some(v) => *v,
            None => {
                let n = self.val_n;
                if n.0 == i16::MAX {
                    return Err("too many flag diacritic values".to_string());
                }
                self.value_bucket.insert(value.into(), n);
                self.val_n = n.incr();
                n
            }
        };

        self.operations.insert(
            i,
            FlagDiacriticOperation {
                operation: op,
                feature,
                value,
            },
        );
        self.key_table.push(SmolStr::default());
        Ok(())
    }

    fn handle_key(&mut self, i: SymbolNumber, key: SmolStr) -> Result<(), String> {
        if i.is_epsilon() {
            self.key_table.push(SmolStr::default());
            return Ok(());
        }

        if let Some((op, feature, value)) = split_flag(&key) {
            return self.handle_flag(i, op, feature, value);
        }

        if key.starts_with('@') && key.ends_with('@') {
            if key.as_str() == UNKNOWN_SYMBOL {
                self.other_symbol = Some(i);
            } else {
                log::trace!("Suppressing control symbol {} ({})", i, key);
            }
            self.key_table.push(SmolStr::default());
        } else {
            self.string_to_symbol.insert(key.clone(), i);
            self.key_table.push(key);
        }

        Ok(())
    }

    pub(crate) fn read_from<R: Read>(
        rdr: &mut ByteSource<R>,
        symbols: SymbolNumber,
    ) -> Result<TransducerAlphabet, TransducerError> {
        let mut p = TransducerAlphabetParser::default();
        let start = rdr.position();

        for i in 0..symbols.0 {
            let symbol_start = rdr.position();
            let raw = rdr
                .read_until_nul(MAX_SYMBOL_BYTES)
                .map_err(|e| TransducerError::AlphabetParsing {
                    offset: rdr.position(),
                    reason: read_reason(&e),
                })?
                .ok_or_else(|| TransducerError::AlphabetParsing {
                    offset: symbol_start,
                    reason: format!(
                        "symbol {} is longer than {} bytes",
                        i, MAX_SYMBOL_BYTES
                    ),
                })?;

            let key: SmolStr = match std::str::from_utf8(&raw) {
                Ok(s) => s.into(),
                Err(_) => {
                    log::warn!("Symbol {} at byte {} is not valid UTF-8", i, symbol_start);
                    SmolStr::new(String::from_utf8_lossy(&raw))
                }
            };

            p.handle_key(SymbolNumber(i), key)
                .map_err(|reason| TransducerError::AlphabetParsing {
                    offset: symbol_start,
                    reason,
                })?;
        }

        log::debug!(
            "Alphabet: {} symbols, {} flag diacritics over {} features",
            symbols,
            p.operations.len(),
            p.feature_bucket.len()
        );

        Ok(TransducerAlphabet {
            key_table: p.key_table,
            initial_symbol_count: symbols,
            flag_state_size: p.feature_bucket.len(),
            length: (rdr.position() - start) as usize,
            string_to_symbol: p.string_to_symbol,
            operations: p.operations,
            other_symbol: p.other_symbol,
        })
    }
}
