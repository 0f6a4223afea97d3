use smol_str::SmolStr;

/// Error with transducer reading or processing.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransducerError {
    /// The fixed-layout header or vendor sub-header could not be read.
    #[error("Header parsing failed at byte {offset}: {reason}")]
    HeaderParsing { offset: u64, reason: String },
    /// The vendor sub-header declares a transducer type this reader cannot use.
    #[error("Unsupported transducer type: {found}")]
    TransducerType { found: SmolStr },
    /// The symbol alphabet could not be read.
    #[error("Alphabet parsing failed at byte {offset}: {reason}")]
    AlphabetParsing { offset: u64, reason: String },
    /// The index table was short or held an out-of-range target.
    #[error("Index table read failed at byte {offset}: {reason}")]
    IndexTableRead { offset: u64, reason: String },
    /// The transition table was short or held an out-of-range target.
    #[error("Transition table read failed at byte {offset}: {reason}")]
    TransitionTableRead { offset: u64, reason: String },
    /// A weight was requested from an unweighted transducer.
    #[error("Weights requested from an unweighted transducer")]
    UnweightedEngineMisuse,
    /// Error with input/output.
    #[error("IO error")]
    Io(#[source] std::io::Error),
    /// Error with mmapping
    #[error("Memory mapping error")]
    Memmap(#[source] std::io::Error),
}

impl TransducerError {
    /// Wrap into i/o error.
    pub fn into_io_error(self) -> std::io::Error {
        match self {
            TransducerError::Memmap(v) => v,
            TransducerError::Io(v) => v,
            e => std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{}", e)),
        }
    }
}

/// Human-readable reason for a failed read at load time.
pub(crate) fn read_reason(e: &std::io::Error) -> String {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        "ended unexpectedly".to_string()
    } else {
        e.to_string()
    }
}
