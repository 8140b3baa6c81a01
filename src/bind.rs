//! Positional binding between row fields and typed values.
//!
//! The binder is a closed set of capabilities selected statically through
//! trait impls: scalar strings, integers, floats and booleans implement
//! [`FieldValue`]; sequences (slices, arrays, `Vec`) and tuples compose them
//! into aggregate destinations via [`BindRow`] and aggregate sources via
//! [`FormatRow`]. A user struct joins the set by delegating to a tuple of
//! mutable references over its fields:
//!
//! ```
//! use csvutil::{BindError, BindRow, Row};
//!
//! #[derive(Default)]
//! struct Point {
//!     x: i64,
//!     y: i64,
//!     z: i64,
//! }
//!
//! impl BindRow for Point {
//!     fn bind_fields(&mut self, fields: &[String], at: usize) -> Result<usize, BindError> {
//!         (&mut self.x, &mut self.y, &mut self.z).bind_fields(fields, at)
//!     }
//! }
//!
//! let row = Row::from_fields(vec!["10".into(), "20".into(), "30".into()]);
//! let mut point = Point::default();
//! assert_eq!(row.bind(&mut point).unwrap(), 3);
//! assert_eq!((point.x, point.y, point.z), (10, 20, 30));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{BindError, CsvError};

/// How floating-point values are rendered when formatting a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FloatStyle {
    /// Shortest representation that round-trips (`format!("{}")`).
    #[default]
    Compact,
    /// Decimal notation, honoring the configured precision.
    Fixed,
    /// Exponent notation (`format!("{:e}")`).
    Scientific,
}

/// Numeric formatting style threaded explicitly through every formatting
/// call, so concurrent callers can format with different styles safely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NumberStyle {
    /// Floating-point notation.
    pub float: FloatStyle,
    /// Number of digits after the decimal point; `None` picks the shortest
    /// representation.
    pub precision: Option<usize>,
}

impl NumberStyle {
    fn format_f64(&self, v: f64) -> String {
        match (self.float, self.precision) {
            (FloatStyle::Scientific, None) => format!("{v:e}"),
            (FloatStyle::Scientific, Some(p)) => format!("{v:.p$e}"),
            (_, Some(p)) => format!("{v:.p$}"),
            (_, None) => format!("{v}"),
        }
    }

    fn format_f32(&self, v: f32) -> String {
        match (self.float, self.precision) {
            (FloatStyle::Scientific, None) => format!("{v:e}"),
            (FloatStyle::Scientific, Some(p)) => format!("{v:.p$e}"),
            (_, Some(p)) => format!("{v:.p$}"),
            (_, None) => format!("{v}"),
        }
    }
}

/// A scalar that can be parsed from, and formatted into, a single row field.
///
/// The impls shipped with the crate cover strings, the signed and unsigned
/// integer widths, `f32`/`f64` and `bool`. `index` is the zero-based position
/// of the field within its row and is only used to report parse failures.
pub trait FieldValue: Sized {
    /// Parses one row field into the scalar.
    fn parse_field(field: &str, index: usize) -> Result<Self, CsvError>;

    /// Formats the scalar as one row field.
    fn format_field(&self, style: NumberStyle) -> Result<String, CsvError>;
}

impl FieldValue for String {
    fn parse_field(field: &str, _index: usize) -> Result<Self, CsvError> {
        Ok(field.to_owned())
    }

    fn format_field(&self, _style: NumberStyle) -> Result<String, CsvError> {
        Ok(self.clone())
    }
}

impl FieldValue for bool {
    fn parse_field(field: &str, index: usize) -> Result<Self, CsvError> {
        match field {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            _ => Err(CsvError::FieldParse {
                index,
                reason: format!("invalid boolean {field:?}"),
            }),
        }
    }

    fn format_field(&self, _style: NumberStyle) -> Result<String, CsvError> {
        Ok(self.to_string())
    }
}

impl FieldValue for f32 {
    fn parse_field(field: &str, index: usize) -> Result<Self, CsvError> {
        field.parse().map_err(|err| CsvError::FieldParse {
            index,
            reason: format!("{err}"),
        })
    }

    fn format_field(&self, style: NumberStyle) -> Result<String, CsvError> {
        Ok(style.format_f32(*self))
    }
}

impl FieldValue for f64 {
    fn parse_field(field: &str, index: usize) -> Result<Self, CsvError> {
        field.parse().map_err(|err| CsvError::FieldParse {
            index,
            reason: format!("{err}"),
        })
    }

    fn format_field(&self, style: NumberStyle) -> Result<String, CsvError> {
        Ok(style.format_f64(*self))
    }
}

macro_rules! integer_field_value {
    ($($t:ty),+ $(,)?) => {
        $(
            impl FieldValue for $t {
                fn parse_field(field: &str, index: usize) -> Result<Self, CsvError> {
                    field.parse().map_err(|err| CsvError::FieldParse {
                        index,
                        reason: format!("{err}"),
                    })
                }

                fn format_field(&self, _style: NumberStyle) -> Result<String, CsvError> {
                    Ok(self.to_string())
                }
            }
        )+
    };
}

integer_field_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// A positional destination for row fields.
///
/// `bind_fields` assigns consecutive fields starting at `at` into the
/// destination and returns how many it consumed. On failure the returned
/// [`BindError`] carries the count of fields assigned before the error.
pub trait BindRow {
    /// Assigns fields starting at position `at`; returns the number consumed.
    fn bind_fields(&mut self, fields: &[String], at: usize) -> Result<usize, BindError>;
}

/// A positional source of row fields, the inverse of [`BindRow`].
///
/// `format_fields` appends the value's flattened representation to `out`,
/// stopping at the first unformattable element; fields appended before the
/// failure point are kept.
pub trait FormatRow {
    /// Appends the value's fields to `out`.
    fn format_fields(&self, out: &mut Vec<String>, style: NumberStyle) -> Result<(), CsvError>;
}

macro_rules! scalar_row_impls {
    ($($t:ty),+ $(,)?) => {
        $(
            impl BindRow for $t {
                fn bind_fields(&mut self, fields: &[String], at: usize) -> Result<usize, BindError> {
                    let field = fields.get(at).ok_or_else(|| BindError {
                        assigned: 0,
                        source: CsvError::NotEnoughFields,
                    })?;
                    *self = <$t as FieldValue>::parse_field(field, at)
                        .map_err(|source| BindError { assigned: 0, source })?;
                    Ok(1)
                }
            }

            impl FormatRow for $t {
                fn format_fields(
                    &self,
                    out: &mut Vec<String>,
                    style: NumberStyle,
                ) -> Result<(), CsvError> {
                    out.push(self.format_field(style)?);
                    Ok(())
                }
            }
        )+
    };
}

scalar_row_impls!(String, bool, f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: FieldValue> BindRow for [T] {
    fn bind_fields(&mut self, fields: &[String], at: usize) -> Result<usize, BindError> {
        let mut assigned = 0;
        for item in self.iter_mut() {
            let field = fields.get(at + assigned).ok_or_else(|| BindError {
                assigned,
                source: CsvError::NotEnoughFields,
            })?;
            *item = T::parse_field(field, at + assigned)
                .map_err(|source| BindError { assigned, source })?;
            assigned += 1;
        }
        Ok(assigned)
    }
}

impl<T: FieldValue, const N: usize> BindRow for [T; N] {
    fn bind_fields(&mut self, fields: &[String], at: usize) -> Result<usize, BindError> {
        self.as_mut_slice().bind_fields(fields, at)
    }
}

impl<T: FieldValue> BindRow for Vec<T> {
    fn bind_fields(&mut self, fields: &[String], at: usize) -> Result<usize, BindError> {
        self.as_mut_slice().bind_fields(fields, at)
    }
}

impl<D: BindRow + ?Sized> BindRow for &mut D {
    fn bind_fields(&mut self, fields: &[String], at: usize) -> Result<usize, BindError> {
        (**self).bind_fields(fields, at)
    }
}

impl<T: FieldValue> FormatRow for [T] {
    fn format_fields(&self, out: &mut Vec<String>, style: NumberStyle) -> Result<(), CsvError> {
        for item in self {
            out.push(item.format_field(style)?);
        }
        Ok(())
    }
}

impl<T: FieldValue, const N: usize> FormatRow for [T; N] {
    fn format_fields(&self, out: &mut Vec<String>, style: NumberStyle) -> Result<(), CsvError> {
        self.as_slice().format_fields(out, style)
    }
}

impl<T: FieldValue> FormatRow for Vec<T> {
    fn format_fields(&self, out: &mut Vec<String>, style: NumberStyle) -> Result<(), CsvError> {
        self.as_slice().format_fields(out, style)
    }
}

impl<S: FormatRow + ?Sized> FormatRow for &S {
    fn format_fields(&self, out: &mut Vec<String>, style: NumberStyle) -> Result<(), CsvError> {
        (**self).format_fields(out, style)
    }
}

macro_rules! tuple_row_impls {
    ($(($T:ident, $idx:tt)),+) => {
        impl<$($T: BindRow),+> BindRow for ($($T,)+) {
            fn bind_fields(&mut self, fields: &[String], at: usize) -> Result<usize, BindError> {
                let mut assigned = 0;
                $(
                    match self.$idx.bind_fields(fields, at + assigned) {
                        Ok(n) => assigned += n,
                        Err(err) => {
                            return Err(BindError {
                                assigned: assigned + err.assigned,
                                source: err.source,
                            });
                        }
                    }
                )+
                Ok(assigned)
            }
        }

        impl<$($T: FormatRow),+> FormatRow for ($($T,)+) {
            fn format_fields(
                &self,
                out: &mut Vec<String>,
                style: NumberStyle,
            ) -> Result<(), CsvError> {
                $( self.$idx.format_fields(out, style)?; )+
                Ok(())
            }
        }
    };
}

tuple_row_impls!((A, 0));
tuple_row_impls!((A, 0), (B, 1));
tuple_row_impls!((A, 0), (B, 1), (C, 2));
tuple_row_impls!((A, 0), (B, 1), (C, 2), (D, 3));
tuple_row_impls!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4));
tuple_row_impls!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5));
tuple_row_impls!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6));
tuple_row_impls!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7));
tuple_row_impls!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7), (I, 8));
tuple_row_impls!(
    (A, 0),
    (B, 1),
    (C, 2),
    (D, 3),
    (E, 4),
    (F, 5),
    (G, 6),
    (H, 7),
    (I, 8),
    (J, 9)
);
tuple_row_impls!(
    (A, 0),
    (B, 1),
    (C, 2),
    (D, 3),
    (E, 4),
    (F, 5),
    (G, 6),
    (H, 7),
    (I, 8),
    (J, 9),
    (K, 10)
);
tuple_row_impls!(
    (A, 0),
    (B, 1),
    (C, 2),
    (D, 3),
    (E, 4),
    (F, 5),
    (G, 6),
    (H, 7),
    (I, 8),
    (J, 9),
    (K, 10),
    (L, 11)
);

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_integer_widths() {
        assert_eq!(i8::parse_field("-128", 0).unwrap(), -128);
        assert_eq!(u64::parse_field("18446744073709551615", 0).unwrap(), u64::MAX);
        assert!(matches!(
            u8::parse_field("256", 3),
            Err(CsvError::FieldParse { index: 3, .. })
        ));
    }

    #[test]
    fn parses_go_style_booleans() {
        for s in ["1", "t", "T", "true", "TRUE", "True"] {
            assert!(bool::parse_field(s, 0).unwrap());
        }
        for s in ["0", "f", "F", "false", "FALSE", "False"] {
            assert!(!bool::parse_field(s, 0).unwrap());
        }
        assert!(bool::parse_field("yes", 0).is_err());
    }

    #[test]
    fn float_styles() {
        let compact = NumberStyle::default();
        assert_eq!(3.5f64.format_field(compact).unwrap(), "3.5");

        let fixed = NumberStyle {
            float: FloatStyle::Fixed,
            precision: Some(2),
        };
        assert_eq!(3.5f64.format_field(fixed).unwrap(), "3.50");

        let scientific = NumberStyle {
            float: FloatStyle::Scientific,
            precision: None,
        };
        assert_eq!(1500.0f64.format_field(scientific).unwrap(), "1.5e3");
    }

    #[test]
    fn binds_scalar() {
        let row = fields(&["42"]);
        let mut n = 0i32;
        assert_eq!(n.bind_fields(&row, 0).unwrap(), 1);
        assert_eq!(n, 42);
    }

    #[test]
    fn binds_array_and_vec() {
        let row = fields(&["1", "2", "3"]);
        let mut arr = [0u32; 3];
        assert_eq!(arr.bind_fields(&row, 0).unwrap(), 3);
        assert_eq!(arr, [1, 2, 3]);

        let mut vec = vec![0i64; 2];
        assert_eq!(vec.bind_fields(&row, 1).unwrap(), 2);
        assert_eq!(vec, vec![2, 3]);
    }

    #[test]
    fn binds_mixed_tuple() {
        let row = fields(&["Ben Franklin", "3.704", "10"]);
        let mut dest = (String::new(), 0.0f64, 0u32);
        assert_eq!(dest.bind_fields(&row, 0).unwrap(), 3);
        assert_eq!(dest, ("Ben Franklin".to_string(), 3.704, 10));
    }

    #[test]
    fn tuple_error_carries_partial_count() {
        let row = fields(&["10", "x", "30"]);
        let mut dest = (0i64, 0i64, 0i64);
        let err = dest.bind_fields(&row, 0).unwrap_err();
        assert_eq!(err.assigned, 1);
        assert!(matches!(err.source, CsvError::FieldParse { index: 1, .. }));
        // The first destination keeps its successfully bound value.
        assert_eq!(dest.0, 10);
    }

    #[test]
    fn sequence_runs_out_of_fields() {
        let row = fields(&["1"]);
        let mut arr = [0i32; 3];
        let err = arr.bind_fields(&row, 0).unwrap_err();
        assert_eq!(err.assigned, 1);
        assert!(matches!(err.source, CsvError::NotEnoughFields));
    }

    #[test]
    fn formats_sequences_and_tuples() {
        let style = NumberStyle::default();
        let mut out = Vec::new();
        ("a".to_string(), 1u8, true)
            .format_fields(&mut out, style)
            .unwrap();
        [2.5f64, 3.0].format_fields(&mut out, style).unwrap();
        assert_eq!(out, vec!["a", "1", "true", "2.5", "3"]);
    }
}
