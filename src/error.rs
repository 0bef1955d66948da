//! Error types for the Huffman codec and its file envelope.

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No symbols to build a tree from.
    #[error("empty input: no symbols to compress")]
    EmptyInput,

    /// A frequency table or tree violates a structural invariant.
    #[error("malformed tree: {0}")]
    MalformedTree(String),

    /// The packed buffer ran out before every symbol was decoded.
    #[error("truncated data: decoded {decoded} of {expected} symbols")]
    TruncatedData { decoded: u64, expected: u64 },

    /// Serialized artifact or envelope bytes end mid-field.
    #[error("unexpected EOF: {0} ends early")]
    UnexpectedEof(String),

    /// The recorded bit count disagrees with the packed stream.
    #[error("length mismatch: expected {expected} bits, found {actual}")]
    LengthMismatch { expected: u64, actual: u64 },

    /// Bytes that do not follow the artifact or envelope layout.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),

    /// Decoded output does not hash to the digest stored in the envelope.
    #[error("checksum mismatch: decoded data does not match stored digest")]
    ChecksumMismatch,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedTree(message.into())
    }

    /// Map a bincode failure onto the codec's error kinds.
    ///
    /// Running out of bytes mid-parse is an EOF; anything else means the
    /// bytes were never a valid layout.
    pub(crate) fn from_bincode(err: bincode::Error, what: &str) -> Self {
        match *err {
            bincode::ErrorKind::Io(ref io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                Error::UnexpectedEof(what.to_string())
            }
            other => Error::InvalidFormat(format!("{what}: {other}")),
        }
    }

    /// True for failures caused by damaged or foreign input bytes.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::MalformedTree(_)
                | Error::TruncatedData { .. }
                | Error::UnexpectedEof(_)
                | Error::LengthMismatch { .. }
                | Error::InvalidFormat(_)
                | Error::ChecksumMismatch
        )
    }
}
