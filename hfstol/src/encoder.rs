//! Tokenization of raw input into alphabet symbols.
//!
//! Symbols may be several bytes long, and one symbol may be a prefix of
//! another, so input is split greedily: at each position the longest symbol
//! that matches wins.

use smol_str::SmolStr;

use crate::types::SymbolNumber;

/// Input could not be split into symbols.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// No input symbol starts at this byte offset.
    #[error("No symbol matches input at byte {offset}")]
    Unencodable { offset: usize },
}

/// A 256-way trie keyed on raw bytes.
#[derive(Debug)]
pub struct LetterTrie {
    letters: Vec<Option<Box<LetterTrie>>>,
    symbols: Vec<Option<SymbolNumber>>,
}

impl Default for LetterTrie {
    fn default() -> Self {
        LetterTrie {
            letters: (0..256).map(|_| None).collect(),
            symbols: vec![None; 256],
        }
    }
}

impl LetterTrie {
    pub fn new() -> LetterTrie {
        Self::default()
    }

    /// Add a symbol string. The last byte stores the symbol, every byte before
    /// it descends into a child trie.
    pub fn add_string(&mut self, bytes: &[u8], symbol: SymbolNumber) {
        match bytes {
            [] => {}
            [last] => self.symbols[*last as usize] = Some(symbol),
            [first, rest @ ..] => self.letters[*first as usize]
                .get_or_insert_with(Default::default)
                .add_string(rest, symbol),
        }
    }

    /// Match the longest symbol at `cursor`, advancing past it. On a miss the
    /// cursor is left where it was.
    pub fn find_key(&self, input: &[u8], cursor: &mut usize) -> Option<SymbolNumber> {
        let start = *cursor;
        let byte = *input.get(start)? as usize;
        *cursor += 1;

        if let Some(child) = &self.letters[byte] {
            if let Some(symbol) = child.find_key(input, cursor) {
                return Some(symbol);
            }
        }

        match self.symbols[byte] {
            Some(symbol) => Some(symbol),
            None => {
                *cursor = start;
                None
            }
        }
    }

    #[inline(always)]
    fn has_child(&self, byte: u8) -> bool {
        self.letters[byte as usize].is_some()
    }

    #[inline(always)]
    fn symbol(&self, byte: u8) -> Option<SymbolNumber> {
        self.symbols[byte as usize]
    }
}

/// Tokenizer over the input side of an alphabet.
#[derive(Debug)]
pub struct Encoder {
    letters: LetterTrie,
    ascii_symbols: [Option<SymbolNumber>; 128],
}

impl Encoder {
    /// Build from the key table, using the first `input_symbol_count`
    /// ordinals. Empty strings (epsilon, flags, control symbols) are skipped.
    pub fn new(key_table: &[SmolStr], input_symbol_count: SymbolNumber) -> Encoder {
        let mut letters = LetterTrie::new();
        let count = (input_symbol_count.0 as usize).min(key_table.len());

        for (k, key) in key_table.iter().enumerate().take(count) {
            if key.is_empty() {
                continue;
            }
            letters.add_string(key.as_bytes(), SymbolNumber(k as u16));
        }

        // Bytes that also begin a longer symbol must go through the trie.
        let mut ascii_symbols = [None; 128];
        for (byte, slot) in (0u8..128).zip(ascii_symbols.iter_mut()) {
            if !letters.has_child(byte) {
                *slot = letters.symbol(byte);
            }
        }

        Encoder {
            letters,
            ascii_symbols,
        }
    }

    /// Match one symbol at `cursor`, advancing past it on success.
    #[inline]
    pub fn find_key(&self, input: &[u8], cursor: &mut usize) -> Option<SymbolNumber> {
        let byte = *input.get(*cursor)?;

        if byte < 128 {
            if let Some(symbol) = self.ascii_symbols[byte as usize] {
                *cursor += 1;
                return Some(symbol);
            }
        }

        self.letters.find_key(input, cursor)
    }

    /// Split a whole string into symbols.
    pub fn encode(&self, input: &str) -> Result<Vec<SymbolNumber>, EncodeError> {
        let bytes = input.as_bytes();
        let mut cursor = 0;
        let mut out = Vec::with_capacity(bytes.len());

        while cursor < bytes.len() {
            match self.find_key(bytes, &mut cursor) {
                Some(symbol) => out.push(symbol),
                None => return Err(EncodeError::Unencodable { offset: cursor }),
            }
        }

        Ok(out)
    }
}
