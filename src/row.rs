use crate::bind::{BindRow, FormatRow, NumberStyle};
use crate::error::{BindError, CsvError};

/// One decoded or encoded unit of tabular data: an ordered sequence of
/// string fields plus an optional terminal error.
///
/// A `Row` is a value type, produced fresh by every read. It carries at most
/// one error; when that error is the distinguished end-of-input marker the
/// row has no fields at all (`fields` is `None`, which is different from an
/// empty field list).
///
/// # Examples
///
/// ```
/// use csvutil::{Config, Reader};
///
/// let mut reader = Reader::new("a,b,c\n".as_bytes(), Config::default());
/// let row = reader.read_row();
/// assert_eq!(row.fields.as_deref(), Some(&["a".to_string(), "b".into(), "c".into()][..]));
///
/// let terminal = reader.read_row();
/// assert!(terminal.has_eof());
/// assert!(terminal.fields.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Row {
    /// Field data, in order of appearance. `None` when the row only conveys
    /// an error.
    pub fields: Option<Vec<String>>,
    /// Error encountered producing the row, if any.
    pub error: Option<CsvError>,
}

impl Row {
    /// Creates a row from decoded fields.
    pub fn from_fields(fields: Vec<String>) -> Self {
        Row {
            fields: Some(fields),
            error: None,
        }
    }

    /// Creates a field-less row conveying an error.
    pub fn from_error(error: CsvError) -> Self {
        Row {
            fields: None,
            error: Some(error),
        }
    }

    /// Creates the distinguished terminal end-of-input row.
    pub fn eof() -> Self {
        Row::from_error(CsvError::Eof)
    }

    /// Returns true when the row marks the end of input.
    pub fn has_eof(&self) -> bool {
        matches!(self.error, Some(CsvError::Eof))
    }

    /// Returns true when the row carries any error, end-of-input included.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Number of fields in the row; zero for field-less rows.
    pub fn len(&self) -> usize {
        self.fields.as_ref().map_or(0, Vec::len)
    }

    /// Returns true when the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Greedily assigns the row's fields, left to right, into `dest`.
    ///
    /// The destination may be any scalar, sequence or tuple implementing
    /// [`BindRow`]; consecutive fields fill consecutive elements. Returns
    /// the number of fields consumed, or a [`BindError`] carrying the count
    /// assigned before the first failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use csvutil::Row;
    ///
    /// let row = Row::from_fields(vec!["10".into(), "20".into(), "30".into()]);
    /// let mut dest = (0i64, 0i64, 0i64);
    /// assert_eq!(row.bind(&mut dest).unwrap(), 3);
    /// assert_eq!(dest, (10, 20, 30));
    ///
    /// let row = Row::from_fields(vec!["10".into(), "x".into(), "30".into()]);
    /// let err = row.bind(&mut dest).unwrap_err();
    /// assert_eq!(err.assigned, 1);
    /// ```
    pub fn bind<D: BindRow + ?Sized>(&self, dest: &mut D) -> Result<usize, BindError> {
        let fields: &[String] = self.fields.as_deref().unwrap_or(&[]);
        dest.bind_fields(fields, 0)
    }

    /// Flattens `values` into a new row, the inverse of [`Row::bind`].
    ///
    /// Sequences and tuples expand to one field per element. Formatting
    /// stops at the first unformattable value: fields collected before the
    /// failure point are kept and the error is recorded on the row.
    ///
    /// The numeric style is an explicit parameter; there is no process-wide
    /// formatting state.
    ///
    /// # Examples
    ///
    /// ```
    /// use csvutil::{NumberStyle, Row};
    ///
    /// let row = Row::from_values(&("Ben Franklin".to_string(), 3.704f64, 10u32), NumberStyle::default());
    /// assert_eq!(
    ///     row.fields.as_deref(),
    ///     Some(&["Ben Franklin".to_string(), "3.704".into(), "10".into()][..])
    /// );
    /// assert!(!row.has_error());
    /// ```
    pub fn from_values<V: FormatRow + ?Sized>(values: &V, style: NumberStyle) -> Row {
        let mut fields = Vec::new();
        match values.format_fields(&mut fields, style) {
            Ok(()) => Row::from_fields(fields),
            Err(error) => Row {
                fields: Some(fields),
                error: Some(error),
            },
        }
    }
}
