#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # csvutil

 A streaming reader and writer for delimiter-separated tabular text.

 `csvutil` converts between byte streams and sequences of string-field
 rows, one logical line at a time, with optional comment-line skipping and
 whitespace trimming, and binds rows positionally to typed values. It is
 deliberately not a full CSV-standard implementation: fields are split on a
 single configured separator code point within one physical line, with no
 quoting or escaping, so a field can contain neither the separator nor a
 newline.

 ## Core concepts

 - **[`Config`]:** separator, trimming, cutset and comment policy, shared
   by readers and writers.
 - **[`Row`]:** one decoded or encoded unit, holding ordered string fields
   plus an optional terminal error. End of input is a distinguished marker
   on the row, never an application-level failure.
 - **[`Reader`]:** incremental line assembly (arbitrarily long lines,
   amortized buffer growth), comment-aware row decoding, and synchronous
   bulk helpers.
 - **[`RowIter`] / [`RowIterAuto`]:** two concurrent consumption protocols
   over a background decoding thread: explicit pull-and-cancel, or
   automatic drain-to-completion.
 - **[`Writer`]:** buffered row encoding with explicit flush and comment
   blocks.
 - **[`bind`]:** positional mapping between row fields and typed values
   (scalars, sequences, tuples and delegating structs).

 ## Getting started

 ```rust
 use csvutil::{Config, Reader, Writer};

 // Decode rows from any `Read` source.
 let config = Config::new().comments(true);
 let mut reader = Reader::new("#header\nname,score\nAda,10\n".as_bytes(), config);

 let header = reader.read_row();
 assert_eq!(header.fields.as_deref(), Some(&["name".to_string(), "score".into()][..]));

 // Bind a data row into typed destinations.
 let mut dest = (String::new(), 0u32);
 reader.read_row().bind(&mut dest).unwrap();
 assert_eq!(dest, ("Ada".to_string(), 10));

 // Encode rows back out; flushing is explicit.
 let mut out = Vec::new();
 let mut writer = Writer::new(&mut out, Config::default());
 writer.write_row(&["name", "score"]).unwrap();
 writer.write_row(&["Ada", "10"]).unwrap();
 writer.flush().unwrap();
 drop(writer);
 assert_eq!(out, b"name,score\nAda,10\n");
 ```

 ## Concurrent iteration

 Each iteration session moves the reader onto a producer thread and hands
 rows over an unbuffered rendezvous channel; the reader comes back when the
 session ends:

 ```rust
 use csvutil::{Config, Reader};

 let reader = Reader::new("a,b\nc,d\ne,f\n".as_bytes(), Config::default());
 let mut rows = reader.row_iter();

 let first = rows.next_row().unwrap();
 assert_eq!(first.len(), 2);

 rows.stop(); // explicit, idempotent cancellation
 let reader = rows.into_reader();
 assert_eq!(reader.line_num(), 1);
 ```
*/

pub mod bind;
pub mod config;
pub mod error;
pub mod file;
pub mod iter;
pub mod reader;
pub mod row;
pub mod writer;

pub use bind::{BindRow, FieldValue, FloatStyle, FormatRow, NumberStyle};
pub use config::Config;
pub use error::{BindError, CsvError, WriteError};
pub use iter::{RowIter, RowIterAuto};
pub use reader::Reader;
pub use row::Row;
pub use writer::Writer;
