use std::io::{BufRead, BufReader, Read};

use log::{debug, trace};

use crate::config::Config;
use crate::error::CsvError;
use crate::row::Row;

/// Smallest allocation for the long-line scratch buffer. Purely an
/// amortization constant, not a data-format limit.
pub const MIN_BUFFER_SIZE: usize = 30;

/// A streaming row decoder over any sequential byte source.
///
/// The reader pulls physical line fragments from an internal [`BufReader`],
/// reassembles them into logical lines in a geometrically growing scratch
/// buffer, applies the comment-skip policy, splits on the configured
/// separator and optionally trims each field. It never loads more than one
/// logical line into memory at a time.
///
/// Fields are split purely on the separator code point within a single
/// physical line; there is no quoting or escaping mechanism, so a field can
/// contain neither the separator nor a newline.
///
/// # Examples
///
/// ```
/// use csvutil::{Config, Reader};
///
/// let mut reader = Reader::new("a,b,c\n1,2,3\n".as_bytes(), Config::default());
///
/// let header = reader.read_row();
/// assert_eq!(header.fields.as_deref(), Some(&["a".to_string(), "b".into(), "c".into()][..]));
///
/// let data = reader.read_row();
/// assert_eq!(data.fields.as_deref(), Some(&["1".to_string(), "2".into(), "3".into()][..]));
///
/// assert!(reader.read_row().has_eof());
/// assert_eq!(reader.line_num(), 2);
/// ```
pub struct Reader<R: Read> {
    config: Config,
    src: BufReader<R>,
    /// Scratch buffer for lines longer than one buffered fragment.
    scratch: Vec<u8>,
    /// Fill index into `scratch`.
    fill: usize,
    line_num: u64,
    past_header: bool,
    last_row: Option<Vec<String>>,
}

impl<R: Read> Reader<R> {
    /// Creates a reader over `src` with a default-sized internal buffer.
    pub fn new(src: R, config: Config) -> Self {
        Self::from_parts(BufReader::new(src), config)
    }

    /// Creates a reader whose internal buffer holds `capacity` bytes.
    ///
    /// The capacity bounds the size of a physical fragment, not of a line:
    /// lines longer than the buffer are reassembled from multiple fragments.
    pub fn with_capacity(capacity: usize, src: R, config: Config) -> Self {
        Self::from_parts(BufReader::with_capacity(capacity, src), config)
    }

    fn from_parts(src: BufReader<R>, config: Config) -> Self {
        Reader {
            config,
            src,
            scratch: Vec::new(),
            fill: 0,
            line_num: 0,
            past_header: false,
            last_row: None,
        }
    }

    /// The reader's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access to the configuration. Changing it mid-stream is legal
    /// and affects only subsequent rows.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Number of physical lines consumed so far, skipped comments included.
    pub fn line_num(&self) -> u64 {
        self.line_num
    }

    /// Fields of the row most recently published by an iteration session.
    ///
    /// Updated by [`row_iter`](Reader::row_iter) and
    /// [`row_iter_auto`](Reader::row_iter_auto) producers; inspect it after
    /// [`into_reader`](crate::RowIter::into_reader) for diagnostics.
    pub fn last_row(&self) -> Option<&[String]> {
        self.last_row.as_deref()
    }

    pub(crate) fn set_last_row(&mut self, fields: Vec<String>) {
        self.last_row = Some(fields);
    }

    /// Consumes the reader, returning the underlying byte source.
    ///
    /// Bytes already pulled into the internal buffer are lost.
    pub fn into_inner(self) -> R {
        self.src.into_inner()
    }

    /// Appends a fragment to the scratch buffer, growing it geometrically:
    /// first allocation is `max(fragment, MIN_BUFFER_SIZE)`, growth doubles
    /// (never exact fit) so repeated long lines amortize.
    fn push_fragment(scratch: &mut Vec<u8>, fill: &mut usize, piece: &[u8]) {
        let needed = *fill + piece.len();
        if scratch.is_empty() {
            scratch.resize(needed.max(MIN_BUFFER_SIZE), 0);
        } else if scratch.len() < needed {
            scratch.resize((scratch.len() * 2).max(needed), 0);
        }
        scratch[*fill..needed].copy_from_slice(piece);
        *fill = needed;
    }

    /// Assembles the next logical line from as many physical fragments as it
    /// takes. The scratch buffer is zeroed and its fill index reset only
    /// after the full line has been extracted.
    fn read_line(&mut self) -> Result<String, CsvError> {
        let mut terminated = false;
        loop {
            let (consumed, done) = {
                let buf = self.src.fill_buf().map_err(CsvError::from)?;
                if buf.is_empty() {
                    if self.fill == 0 {
                        return Err(CsvError::Eof);
                    }
                    // Unterminated final line.
                    (0, true)
                } else {
                    match buf.iter().position(|&b| b == b'\n') {
                        Some(pos) => {
                            Self::push_fragment(&mut self.scratch, &mut self.fill, &buf[..pos]);
                            terminated = true;
                            (pos + 1, true)
                        }
                        None => {
                            // Fragment cap hit; the line continues.
                            let len = buf.len();
                            Self::push_fragment(&mut self.scratch, &mut self.fill, buf);
                            (len, false)
                        }
                    }
                }
            };
            self.src.consume(consumed);
            if done {
                break;
            }
        }

        let mut end = self.fill;
        if terminated && end > 0 && self.scratch[end - 1] == b'\r' {
            end -= 1;
        }
        let line = String::from_utf8_lossy(&self.scratch[..end]).into_owned();
        self.scratch[..self.fill].fill(0);
        self.fill = 0;
        Ok(line)
    }

    /// Reads the next row, skipping comment lines as configured.
    ///
    /// Errors are carried on the returned [`Row`]: the distinguished
    /// end-of-input marker once the source is exhausted, or the underlying
    /// I/O failure propagated verbatim. An accepted empty line is a valid
    /// row holding a single empty field, matching plain split semantics.
    pub fn read_row(&mut self) -> Row {
        let line = loop {
            let line = match self.read_line() {
                Ok(line) => line,
                Err(err) => {
                    if !err.is_eof() {
                        debug!("read failure after line {}: {err}", self.line_num);
                    }
                    return Row::from_error(err);
                }
            };
            self.line_num += 1;
            if !self.config.comments
                || !self.config.looks_like_comment(&line)
                || (self.past_header && !self.config.comments_in_body)
            {
                break line;
            }
            trace!("skipped comment on line {}", self.line_num);
        };
        self.past_header = true;

        let separator = self.config.separator;
        let fields: Vec<String> = if self.config.trim {
            line.split(separator)
                .map(|field| {
                    field
                        .trim_matches(|c| self.config.cutset.contains(c))
                        .to_owned()
                })
                .collect()
        } else {
            line.split(separator).map(str::to_owned).collect()
        };
        Row::from_fields(fields)
    }

    /// Reads rows until `f` returns false or the input ends.
    ///
    /// The terminal end-of-input row is never passed to `f`; rows carrying
    /// any other error are, and `f` decides whether to continue.
    pub fn do_rows<F>(&mut self, mut f: F)
    where
        F: FnMut(Row) -> bool,
    {
        loop {
            let row = self.read_row();
            if row.has_eof() {
                break;
            }
            if !f(row) {
                break;
            }
        }
    }

    /// Like [`do_rows`](Reader::do_rows), but stops after `n` rows even if
    /// `f` keeps returning true.
    pub fn do_n_rows<F>(&mut self, n: usize, mut f: F)
    where
        F: FnMut(Row) -> bool,
    {
        if n == 0 {
            return;
        }
        let mut remaining = n;
        self.do_rows(|row| {
            remaining -= 1;
            f(row) && remaining > 0
        });
    }

    /// Reads up to `n` rows into a fresh matrix.
    ///
    /// A clean end of input before `n` rows is not an error; any other
    /// failure aborts the read (rows decoded before the failure are
    /// recoverable through [`do_rows`](Reader::do_rows) instead).
    pub fn read_rows(&mut self, n: usize) -> Result<Vec<Vec<String>>, CsvError> {
        let mut rows = Vec::with_capacity(n);
        let mut failure = None;
        self.do_n_rows(n, |row| match (row.fields, row.error) {
            (Some(fields), None) => {
                rows.push(fields);
                true
            }
            (_, error) => {
                failure = error;
                false
            }
        });
        match failure {
            Some(err) => Err(err),
            None => Ok(rows),
        }
    }

    /// Reads every remaining row into a fresh matrix.
    pub fn remaining_rows(&mut self) -> Result<Vec<Vec<String>>, CsvError> {
        let mut rows = Vec::with_capacity(16);
        let mut failure = None;
        self.do_rows(|row| match (row.fields, row.error) {
            (Some(fields), None) => {
                rows.push(fields);
                true
            }
            (_, error) => {
                failure = error;
                false
            }
        });
        match failure {
            Some(err) => Err(err),
            None => Ok(rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn string_reader(data: &'static str, config: Config) -> Reader<&'static [u8]> {
        Reader::new(data.as_bytes(), config)
    }

    fn owned(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reads_simple_matrix() {
        let mut reader = string_reader("a,b,c\n1,2,3\n", Config::default());
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["a", "b", "c"]));
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["1", "2", "3"]));
        assert!(reader.read_row().has_eof());
        // The terminal marker repeats on further reads.
        assert!(reader.read_row().has_eof());
        assert_eq!(reader.line_num(), 2);
    }

    #[test]
    fn preserves_empty_fields() {
        let mut reader = string_reader("a,,c\n,,\n", Config::default());
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["a", "", "c"]));
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["", "", ""]));
    }

    #[test]
    fn empty_line_is_one_empty_field() {
        let mut reader = string_reader("\n", Config::default());
        assert_eq!(reader.read_row().fields.unwrap(), owned(&[""]));
        assert!(reader.read_row().has_eof());
    }

    #[test]
    fn unterminated_final_line_is_a_row() {
        let mut reader = string_reader("a,b\nc,d", Config::default());
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["a", "b"]));
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["c", "d"]));
        assert!(reader.read_row().has_eof());
    }

    #[test]
    fn drops_carriage_return_before_newline() {
        let mut reader = string_reader("a,b\r\nc,d\r\n", Config::default());
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["a", "b"]));
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["c", "d"]));
    }

    #[test]
    fn trims_configured_cutset() {
        let config = Config::new().trim(true);
        let mut reader = string_reader(" a \t,\tb,  c\n", config);
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["a", "b", "c"]));
    }

    #[test]
    fn trimming_is_idempotent() {
        let config = Config::new().trim(true);
        let mut reader = string_reader(" a ,b \n", config.clone());
        let once = reader.read_row().fields.unwrap();

        let retrimmed: Vec<String> = once
            .iter()
            .map(|f| f.trim_matches(|c| config.cutset.contains(c)).to_owned())
            .collect();
        assert_eq!(once, retrimmed);
    }

    #[test]
    fn skips_leading_comments_only() {
        let config = Config::new().comments(true);
        let mut reader = string_reader("#hdr\n#hdr2\na\tb\tc\n#body\nx\n", config.separator('\t'));
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["a", "b", "c"]));
        // Past the first data row, comment-prefixed lines are ordinary data.
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["#body"]));
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["x"]));
    }

    #[test]
    fn skips_body_comments_when_allowed() {
        let config = Config::new().comments(true).comments_in_body(true);
        let mut reader = string_reader("#hdr\na,b\n#body\nc,d\n", config);
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["a", "b"]));
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["c", "d"]));
        assert!(reader.read_row().has_eof());
        assert_eq!(reader.line_num(), 4);
    }

    #[test]
    fn comments_disabled_reads_prefixed_lines_as_data() {
        let mut reader = string_reader("#not a comment\n", Config::default());
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["#not a comment"]));
    }

    #[test]
    fn reassembles_fragmented_lines() {
        // A 4-byte fragment cap forces many fragments per line and at least
        // two doubling events in the scratch buffer (30 -> 60 -> 120 < 300).
        let long_a = "a".repeat(150);
        let long_b = "b".repeat(149);
        let data = format!("{long_a},{long_b}\nshort,row\n");

        let mut reader = Reader::with_capacity(4, data.as_bytes(), Config::default());
        assert_eq!(reader.read_row().fields.unwrap(), vec![long_a, long_b]);
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["short", "row"]));
        assert!(reader.read_row().has_eof());
    }

    #[test]
    fn scratch_buffer_grows_by_doubling() {
        let mut scratch = Vec::new();
        let mut fill = 0;

        Reader::<&[u8]>::push_fragment(&mut scratch, &mut fill, b"ab");
        assert_eq!(scratch.len(), MIN_BUFFER_SIZE);
        assert_eq!(fill, 2);

        Reader::<&[u8]>::push_fragment(&mut scratch, &mut fill, &[b'c'; 40]);
        assert_eq!(scratch.len(), 60);
        assert_eq!(fill, 42);
        assert_eq!(&scratch[..2], b"ab");

        Reader::<&[u8]>::push_fragment(&mut scratch, &mut fill, &[b'd'; 200]);
        assert_eq!(scratch.len(), 242);
        assert_eq!(fill, 242);
        assert_eq!(&scratch[..2], b"ab");
        assert_eq!(scratch[41], b'c');
    }

    #[test]
    fn read_rows_caps_at_n() {
        let mut reader = string_reader("1\n2\n3\n4\n", Config::default());
        let rows = reader.read_rows(2).unwrap();
        assert_eq!(rows, vec![owned(&["1"]), owned(&["2"])]);
        // The decoder did not read past row n.
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["3"]));
    }

    #[test]
    fn read_rows_short_on_early_eof() {
        let mut reader = string_reader("1\n2\n", Config::default());
        let rows = reader.read_rows(5).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn remaining_rows_reads_everything() {
        let mut reader = string_reader("a,b\nc,d\ne,f\n", Config::default());
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["a", "b"]));
        let rest = reader.remaining_rows().unwrap();
        assert_eq!(rest, vec![owned(&["c", "d"]), owned(&["e", "f"])]);
    }

    #[test]
    fn do_rows_stops_when_callback_declines() {
        let mut reader = string_reader("1\n2\n3\n", Config::default());
        let mut seen = 0;
        reader.do_rows(|_| {
            seen += 1;
            seen < 2
        });
        assert_eq!(seen, 2);
    }

    /// Yields its payload, then fails instead of reporting a clean end.
    struct FailingSource {
        data: &'static [u8],
    }

    impl io::Read for FailingSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::other("wire cut"));
            }
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn io_failures_propagate_verbatim() {
        let source = FailingSource { data: b"a,b\n" };
        let mut reader = Reader::new(source, Config::default());
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["a", "b"]));

        let row = reader.read_row();
        assert!(row.fields.is_none());
        assert!(matches!(row.error, Some(CsvError::Io(_))));

        let err = {
            let source = FailingSource { data: b"x\ny\n" };
            Reader::new(source, Config::default()).remaining_rows().unwrap_err()
        };
        assert!(err.to_string().contains("wire cut"));
    }

    #[test]
    fn separator_mutation_affects_subsequent_rows() {
        let mut reader = string_reader("a,b\nc;d\n", Config::default());
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["a", "b"]));
        reader.config_mut().separator = ';';
        assert_eq!(reader.read_row().fields.unwrap(), owned(&["c", "d"]));
    }
}
