//! Concurrent row-iteration protocols.
//!
//! Both protocols move the [`Reader`] onto a producer thread that decodes
//! rows and publishes them over a rendezvous channel, so the consumer pulls
//! rows at its own pace while decoding happens off its thread. Moving the
//! reader into the session is what makes the model lock-free: the producer
//! owns all decoder state for the session's lifetime, and the channels are
//! the only synchronization points. The reader comes back through
//! `into_reader` when the session ends.
//!
//! Two variants with distinct cancellation contracts:
//!
//! - [`RowIter`] is the cancelable protocol: an additional control channel
//!   gates the producer, one permit per decoded row, and [`RowIter::stop`]
//!   (or simply dropping the iterator) terminates it cleanly at any point.
//! - [`RowIterAuto`] runs to completion with no external pacing. It is the
//!   simpler protocol for exhaustive consumption, but abandoning it early
//!   discards the row the producer was publishing at that moment.

use std::io::Read;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

use crate::reader::Reader;
use crate::row::Row;

impl<R: Read + Send + 'static> Reader<R> {
    /// Starts a cancelable iteration session, consuming the reader.
    ///
    /// The producer decodes one row per permit and parks between permits;
    /// it publishes decode errors as a terminal row and then stops. See
    /// [`RowIter`].
    ///
    /// # Examples
    ///
    /// ```
    /// use csvutil::{Config, Reader};
    ///
    /// let reader = Reader::new("a,b\nc,d\n".as_bytes(), Config::default());
    /// let mut rows = reader.row_iter();
    ///
    /// let first = rows.next_row().unwrap();
    /// assert_eq!(first.fields.as_deref(), Some(&["a".to_string(), "b".into()][..]));
    ///
    /// // Stop early; the producer terminates without the remaining rows.
    /// rows.stop();
    /// let reader = rows.into_reader();
    /// assert_eq!(reader.last_row(), Some(&["a".to_string(), "b".into()][..]));
    /// ```
    pub fn row_iter(self) -> RowIter<R> {
        let (row_tx, row_rx) = mpsc::sync_channel::<Row>(0);
        let (control_tx, control_rx) = mpsc::sync_channel::<bool>(0);
        let mut reader = self;

        let handle = thread::spawn(move || {
            loop {
                match control_rx.recv() {
                    Ok(true) => {}
                    Ok(false) | Err(_) => break,
                }
                let row = reader.read_row();
                if row.has_eof() {
                    break;
                }
                if row.has_error() {
                    // Terminal: forward the failure, then shut down.
                    let _ = row_tx.send(row);
                    break;
                }
                let Some(fields) = row.fields.clone() else {
                    panic!("decoder produced a row with neither fields nor an error");
                };
                reader.set_last_row(fields);
                if row_tx.send(row).is_err() {
                    break;
                }
            }
            reader
        });

        RowIter {
            rows: row_rx,
            control: Some(control_tx),
            handle,
        }
    }

    /// Starts an auto-draining iteration session, consuming the reader.
    ///
    /// The producer decodes and publishes continuously until end of input
    /// or a decode error (published as a terminal row). See [`RowIterAuto`].
    ///
    /// # Examples
    ///
    /// ```
    /// use csvutil::{Config, Reader};
    ///
    /// let reader = Reader::new("a,b\nc,d\n".as_bytes(), Config::default());
    /// let rows: Vec<_> = reader.row_iter_auto().collect();
    /// assert_eq!(rows.len(), 2);
    /// ```
    pub fn row_iter_auto(self) -> RowIterAuto<R> {
        let (row_tx, row_rx) = mpsc::sync_channel::<Row>(0);
        let mut reader = self;

        let handle = thread::spawn(move || {
            loop {
                let row = reader.read_row();
                if row.has_eof() {
                    break;
                }
                if row.has_error() {
                    let _ = row_tx.send(row);
                    break;
                }
                let Some(fields) = row.fields.clone() else {
                    panic!("decoder produced a row with neither fields nor an error");
                };
                reader.set_last_row(fields);
                if row_tx.send(row).is_err() {
                    // Consumer abandoned the session; this row is lost.
                    break;
                }
            }
            reader
        });

        RowIterAuto {
            rows: row_rx,
            handle,
        }
    }
}

/// The cancelable row-iteration protocol.
///
/// Each [`next_row`](RowIter::next_row) call hands the producer exactly one
/// permit over an unbuffered control channel and then receives the decoded
/// row; the rendezvous on both channels is what gives the protocol its
/// exactly-once-per-request pacing. [`stop`](RowIter::stop) is idempotent
/// and may be called at any point; dropping the iterator closes the control
/// channel too, so an abandoned session cannot strand its producer.
///
/// The row channel is closed exactly once on every producer exit path,
/// end-of-input, forwarded error, cancellation and panic included.
pub struct RowIter<R: Read> {
    rows: Receiver<Row>,
    control: Option<SyncSender<bool>>,
    handle: JoinHandle<Reader<R>>,
}

impl<R: Read> RowIter<R> {
    /// Requests and receives the next row.
    ///
    /// Returns `None` once the producer has terminated: after end of input,
    /// after a forwarded error row, or after [`stop`](RowIter::stop).
    pub fn next_row(&mut self) -> Option<Row> {
        if let Some(control) = &self.control {
            // A refused permit means the producer already exited; fall
            // through to drain whatever it left on the row channel.
            let _ = control.send(true);
        }
        self.rows.recv().ok()
    }

    /// Terminates the session. Idempotent; further calls are no-ops.
    pub fn stop(&mut self) {
        self.control.take();
    }

    /// Stops the session and returns the reader for post-hoc inspection
    /// ([`last_row`](Reader::last_row), [`line_num`](Reader::line_num)) or
    /// further synchronous reading.
    pub fn into_reader(self) -> Reader<R> {
        let RowIter {
            rows,
            control,
            handle,
        } = self;
        // Unblock the producer wherever it is parked: on the control
        // channel (permit wait) or on the row channel (publish wait).
        drop(control);
        drop(rows);
        match handle.join() {
            Ok(reader) => reader,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

impl<R: Read> Iterator for RowIter<R> {
    type Item = Row;

    /// One permit per `next` call; breaking out of a `for` loop is safe as
    /// long as the iterator is eventually stopped or dropped.
    fn next(&mut self) -> Option<Row> {
        self.next_row()
    }
}

/// The auto-draining row-iteration protocol.
///
/// The producer runs to completion unprompted, so exhaustive consumption is
/// the only safe pattern. Abandoning the iterator early terminates the
/// producer, but the row it was blocked on publishing is discarded with it;
/// use [`RowIter`] when early exit must not lose data.
pub struct RowIterAuto<R: Read> {
    rows: Receiver<Row>,
    handle: JoinHandle<Reader<R>>,
}

impl<R: Read> RowIterAuto<R> {
    /// Receives the next row, or `None` once the producer has terminated.
    pub fn next_row(&mut self) -> Option<Row> {
        self.rows.recv().ok()
    }

    /// Waits for the producer to finish and returns the reader.
    ///
    /// Call this after draining the iterator; calling it mid-stream
    /// abandons the session and discards the in-flight row.
    pub fn into_reader(self) -> Reader<R> {
        let RowIterAuto { rows, handle } = self;
        drop(rows);
        match handle.join() {
            Ok(reader) => reader,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

impl<R: Read> Iterator for RowIterAuto<R> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.next_row()
    }
}
