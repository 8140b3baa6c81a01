use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Errors produced while decoding, encoding or binding rows.
///
/// End of input is modelled as an error variant rather than an `Option`
/// because rows travel through channels and callbacks carrying their own
/// terminal condition; every consumption path treats [`CsvError::Eof`] as
/// "stop, no more data", never as a failure.
///
/// The I/O variant keeps the underlying [`std::io::Error`] intact behind an
/// `Arc` so that rows (which carry their error) remain cheap to clone when
/// they cross an iteration channel.
#[derive(Error, Debug, Clone)]
pub enum CsvError {
    /// The distinguished terminal marker: the byte source has no more data.
    #[error("end of input")]
    Eof,

    /// An I/O failure from the underlying byte source or sink, propagated
    /// verbatim and never retried.
    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),

    /// Binding ran out of row fields before every destination was filled.
    #[error("not enough fields to bind")]
    NotEnoughFields,

    /// A row field could not be parsed into the destination's type.
    #[error("field {index} cannot be parsed: {reason}")]
    FieldParse {
        /// Zero-based position of the offending field within the row.
        index: usize,
        /// Human-readable parse failure description.
        reason: String,
    },

    /// The destination or source value has a shape the binder does not
    /// support.
    #[error("unsupported binding type")]
    Unsupported,
}

impl CsvError {
    /// Returns true for the distinguished end-of-input marker.
    pub fn is_eof(&self) -> bool {
        matches!(self, CsvError::Eof)
    }
}

impl From<io::Error> for CsvError {
    fn from(err: io::Error) -> Self {
        CsvError::Io(Arc::new(err))
    }
}

/// A binding failure that remembers how far it got.
///
/// [`Row::bind`](crate::Row::bind) assigns fields greedily from left to
/// right; when a destination rejects a field the caller still needs to know
/// how many fields were consumed before the failure.
#[derive(Error, Debug, Clone)]
#[error("bound {assigned} field(s) before failing: {source}")]
pub struct BindError {
    /// Number of fields successfully assigned before the error.
    pub assigned: usize,
    /// The underlying failure.
    #[source]
    pub source: CsvError,
}

impl From<BindError> for CsvError {
    fn from(err: BindError) -> Self {
        err.source
    }
}

/// A write failure that remembers the number of bytes already written.
///
/// Encoder operations short-circuit on the first error; the partial byte
/// count lets callers report or recover from truncated output.
#[derive(Error, Debug, Clone)]
#[error("wrote {written} byte(s) before failing: {source}")]
pub struct WriteError {
    /// Bytes successfully handed to the buffered sink before the error.
    pub written: usize,
    /// The underlying failure.
    #[source]
    pub source: CsvError,
}

impl From<WriteError> for CsvError {
    fn from(err: WriteError) -> Self {
        err.source
    }
}
