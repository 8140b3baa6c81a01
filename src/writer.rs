use std::io::{BufWriter, Write};

use log::trace;

use crate::config::Config;
use crate::error::{CsvError, WriteError};

/// A streaming row encoder over any sequential byte sink.
///
/// All writes pass through an internal [`BufWriter`]; call
/// [`flush`](Writer::flush) to guarantee the bytes reach the underlying
/// sink. Flushing is an explicit, caller-owned step, never implicit in
/// disposal.
///
/// No containment checking is performed: a field holding the separator or a
/// newline is written as-is and will not survive a decode round trip, by
/// the same no-quoting contract the [`Reader`](crate::Reader) parses under.
///
/// # Examples
///
/// ```
/// use csvutil::{Config, Writer};
///
/// let mut out = Vec::new();
/// let mut writer = Writer::new(&mut out, Config::default());
/// writer.write_row(&["a", "b", "c"]).unwrap();
/// writer.write_row(&["1", "2", "3"]).unwrap();
/// writer.flush().unwrap();
/// drop(writer);
///
/// assert_eq!(out, b"a,b,c\n1,2,3\n");
/// ```
pub struct Writer<W: Write> {
    config: Config,
    sink: BufWriter<W>,
}

impl<W: Write> Writer<W> {
    /// Creates a writer over `sink` with a default-sized buffer.
    pub fn new(sink: W, config: Config) -> Self {
        Writer {
            config,
            sink: BufWriter::new(sink),
        }
    }

    /// Creates a writer whose buffer holds at least `capacity` bytes.
    pub fn with_capacity(capacity: usize, sink: W, config: Config) -> Self {
        Writer {
            config,
            sink: BufWriter::with_capacity(capacity, sink),
        }
    }

    /// The writer's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access to the configuration; affects subsequent writes only.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Writes one field followed by the separator, or by a newline when
    /// `terminal` is set. Returns the number of bytes written.
    fn write_field(&mut self, field: &str, terminal: bool) -> Result<usize, CsvError> {
        let trail = if terminal { '\n' } else { self.config.separator };
        let mut encoded = [0u8; 4];
        let trail = trail.encode_utf8(&mut encoded);

        self.sink.write_all(field.as_bytes())?;
        self.sink.write_all(trail.as_bytes())?;
        Ok(field.len() + trail.len())
    }

    /// Writes one row: every field followed by the separator, except the
    /// last, which is followed by a newline.
    ///
    /// Returns the number of bytes written; on failure the error carries
    /// the bytes written before it.
    pub fn write_row<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<usize, WriteError> {
        let mut written = 0;
        let last = fields.len().saturating_sub(1);
        for (i, field) in fields.iter().enumerate() {
            let n = self
                .write_field(field.as_ref(), i == last)
                .map_err(|source| WriteError { written, source })?;
            written += n;
        }
        Ok(written)
    }

    /// Writes every field followed by the separator, with no terminating
    /// newline, so a row can be composed from several calls.
    pub fn write_fields<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<usize, WriteError> {
        let mut written = 0;
        for field in fields {
            let n = self
                .write_field(field.as_ref(), false)
                .map_err(|source| WriteError { written, source })?;
            written += n;
        }
        Ok(written)
    }

    /// Writes multiple rows, short-circuiting on the first failure with the
    /// partial byte count on the error.
    pub fn write_rows<S: AsRef<str>>(&mut self, rows: &[Vec<S>]) -> Result<usize, WriteError> {
        let mut written = 0;
        for row in rows {
            match self.write_row(row) {
                Ok(n) => written += n,
                Err(err) => {
                    return Err(WriteError {
                        written: written + err.written,
                        source: err.source,
                    });
                }
            }
        }
        Ok(written)
    }

    /// Writes comment lines: each comment is split on embedded newlines and
    /// every resulting line is prefixed with the comment prefix and
    /// newline-terminated. Writing zero comments is a no-op.
    pub fn write_comments<S: AsRef<str>>(&mut self, comments: &[S]) -> Result<usize, WriteError> {
        let mut written = 0;
        let prefix = self.config.comment_prefix.clone();
        for comment in comments {
            for line in comment.as_ref().split('\n') {
                let mut emit = |bytes: &[u8]| -> Result<(), WriteError> {
                    self.sink
                        .write_all(bytes)
                        .map_err(|err| WriteError {
                            written,
                            source: err.into(),
                        })
                };
                emit(prefix.as_bytes())?;
                emit(line.as_bytes())?;
                emit(b"\n")?;
                written += prefix.len() + line.len() + 1;
            }
        }
        Ok(written)
    }

    /// Flushes buffered output to the underlying sink.
    pub fn flush(&mut self) -> Result<(), CsvError> {
        trace!("flushing buffered row output");
        self.sink.flush()?;
        Ok(())
    }
}
