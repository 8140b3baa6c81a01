//! Whole-stream conveniences: one-call reading and writing of row matrices
//! against streams and named files, and callback-per-row drivers. All of
//! them run with the default [`Config`](crate::Config); build a
//! [`Reader`](crate::Reader) or [`Writer`](crate::Writer) directly when a
//! custom configuration is needed.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use log::debug;

use crate::config::Config;
use crate::error::CsvError;
use crate::reader::Reader;
use crate::row::Row;
use crate::writer::Writer;

/// Writes a row matrix to a byte sink and flushes it.
///
/// Returns the number of bytes written.
///
/// # Examples
///
/// ```
/// let rows = vec![vec!["a".to_string(), "b".into()], vec!["c".into(), "d".into()]];
/// let mut out = Vec::new();
/// csvutil::file::write(&mut out, &rows).unwrap();
/// assert_eq!(out, b"a,b\nc,d\n");
/// ```
pub fn write<W: Write>(sink: W, rows: &[Vec<String>]) -> Result<usize, CsvError> {
    let mut writer = Writer::new(sink, Config::default());
    let written = writer.write_rows(rows)?;
    writer.flush()?;
    Ok(written)
}

/// Writes a row matrix to a named file, creating it if absent and
/// truncating it otherwise.
///
/// `perm` supplies the permission bits applied when the file is created
/// (`0o600`, `0o644` and the like); it is honored on Unix and ignored on
/// platforms without Unix permission semantics.
pub fn write_file<P: AsRef<Path>>(
    path: P,
    perm: u32,
    rows: &[Vec<String>],
) -> Result<usize, CsvError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(perm);
    }
    #[cfg(not(unix))]
    let _ = perm;

    let file = options.open(path.as_ref())?;
    let written = write(file, rows)?;
    debug!(
        "wrote {} row(s), {written} byte(s) to {}",
        rows.len(),
        path.as_ref().display()
    );
    Ok(written)
}

/// Reads every row from a byte source into a fresh matrix.
///
/// # Examples
///
/// ```
/// let rows = csvutil::file::read("a,b\nc,d\n".as_bytes()).unwrap();
/// assert_eq!(rows, vec![
///     vec!["a".to_string(), "b".into()],
///     vec!["c".to_string(), "d".into()],
/// ]);
/// ```
pub fn read<R: Read>(source: R) -> Result<Vec<Vec<String>>, CsvError> {
    Reader::new(source, Config::default()).remaining_rows()
}

/// Reads every row from a named file into a fresh matrix.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<String>>, CsvError> {
    let rows = read(File::open(path.as_ref())?)?;
    debug!("read {} row(s) from {}", rows.len(), path.as_ref().display());
    Ok(rows)
}

/// Applies `f` to each row read from a byte source until `f` returns false
/// or the input ends.
pub fn do_rows<R: Read, F>(source: R, f: F)
where
    F: FnMut(Row) -> bool,
{
    Reader::new(source, Config::default()).do_rows(f)
}

/// Applies `f` to each row read from a named file until `f` returns false
/// or the input ends.
pub fn do_file<P: AsRef<Path>, F>(path: P, f: F) -> Result<(), CsvError>
where
    F: FnMut(Row) -> bool,
{
    do_rows(File::open(path)?, f);
    Ok(())
}
