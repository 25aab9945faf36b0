use crate::{
    observability::{log_debug, log_warn},
    record::{DataReader, RecordError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Positioned,
    Exhausted,
}

/// A forward-only reader exposed as a sequence of rows.
///
/// Every advance moves the single underlying cursor, and the row handed out is always the
/// reader itself. Once exhausted the sequence stays exhausted without touching the reader
/// again. It cannot be restarted.
#[derive(Debug)]
pub struct RecordSequence<'r, R: ?Sized> {
    reader: &'r mut R,
    state: State,
    rows: usize,
}

impl<R: ?Sized> RecordSequence<'_, R> {
    /// Number of rows advanced over so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == State::Exhausted
    }
}

impl<'r, R> RecordSequence<'r, R>
where
    R: DataReader + ?Sized,
{
    pub fn new(reader: &'r mut R) -> Self {
        Self {
            reader,
            state: State::Fresh,
            rows: 0,
        }
    }

    /// Moves to the next row and returns it, or `None` once the reader is exhausted.
    ///
    /// The returned row is overwritten by the following advance.
    pub fn advance(&mut self) -> Result<Option<&R>, RecordError> {
        if self.state == State::Exhausted {
            return Ok(None);
        }
        if self.reader.read()? {
            self.state = State::Positioned;
            self.rows += 1;
            Ok(Some(&*self.reader))
        } else {
            self.state = State::Exhausted;
            log_debug!(event = "sequence_exhausted", rows = self.rows);
            Ok(None)
        }
    }

    /// The row the sequence is positioned on.
    pub fn current(&self) -> Option<&R> {
        match self.state {
            State::Positioned => Some(&*self.reader),
            State::Fresh | State::Exhausted => None,
        }
    }

    /// Always fails: a forward-only reader cannot go back. The traversal ends here.
    pub fn reset(&mut self) -> Result<(), RecordError> {
        log_warn!(event = "rewind_rejected", rows = self.rows);
        self.state = State::Exhausted;
        Err(RecordError::ForwardOnly)
    }
}
