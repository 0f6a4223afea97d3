//! Format constants of the optimized-lookup binary layout.

/// Byte width of one index table record: input symbol + target (or final weight).
pub const INDEX_TABLE_SIZE: usize = 6;
/// Byte width of one transition table record in a weighted transducer.
pub const TRANS_TABLE_SIZE: usize = 12;
/// Byte width of one transition table record in an unweighted transducer.
pub const UNWEIGHTED_TRANS_TABLE_SIZE: usize = 8;

/// State indices at or above this value address the transition table.
pub const TARGET_TABLE: u32 = 2_147_483_648;

/// Raw symbol value meaning "no symbol".
pub const NO_SYMBOL: u16 = u16::MAX;
/// Raw table index value meaning "no target".
pub const NO_TABLE_INDEX: u32 = u32::MAX;

/// Target value carried by final markers in both tables.
pub const FINAL_MARKER_TARGET: u32 = 1;

/// Upper bound on the byte length of a single alphabet symbol.
pub const MAX_SYMBOL_BYTES: usize = 1000;

/// Tag opening the optional vendor sub-header, including its NUL.
pub const HFST3_HEADER_TAG: &[u8; 5] = b"HFST\0";

/// Alphabet string of the catch-all symbol.
pub const UNKNOWN_SYMBOL: &str = "@_UNKNOWN_SYMBOL_@";

/// Number of boolean properties in the header.
pub const HEADER_PROPERTY_COUNT: usize = 9;
