//! Ready-made record sources.

use std::collections::VecDeque;
use std::io::BufRead;

use serde_json::{Map, Value};

use crate::iter::{RecordSource, SourceError};
use crate::record::{RawRecord, RecordMap};

/// In-memory source over a list of records.
#[derive(Debug, Clone)]
pub struct VecSource<M> {
    records: VecDeque<RawRecord<M>>,
    close_count: usize,
}

impl<M: RecordMap> VecSource<M> {
    /// Source yielding `records` in order.
    pub fn new(records: Vec<RawRecord<M>>) -> Self {
        Self {
            records: records.into(),
            close_count: 0,
        }
    }

    /// Records not yet taken.
    pub fn remaining(&self) -> usize {
        self.records.len()
    }

    /// How many times `close` has been called.
    pub fn close_count(&self) -> usize {
        self.close_count
    }
}

impl<M: RecordMap> RecordSource for VecSource<M> {
    type Record = M;

    fn has_next(&mut self) -> Result<bool, SourceError> {
        Ok(!self.records.is_empty())
    }

    fn take_next(&mut self) -> Result<RawRecord<M>, SourceError> {
        self.records.pop_front().ok_or(SourceError::Exhausted)
    }

    fn close(&mut self) -> Result<(), SourceError> {
        self.close_count += 1;
        self.records.clear();
        Ok(())
    }
}

/// Newline-delimited JSON records.
///
/// Each non-blank line holds either an object (a bare record) or a
/// two-element array `[object, companion]` (a pair). One line is read ahead
/// so that `has_next` can answer without consuming.
#[derive(Debug)]
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
    peeked: Option<(usize, String)>,
    buffer: String,
}

impl<R: BufRead> JsonLinesSource<R> {
    /// Read records from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            peeked: None,
            buffer: String::new(),
        }
    }

    /// Number of input lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.line
    }

    fn fill(&mut self) -> Result<(), SourceError> {
        while self.peeked.is_none() {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(());
            }
            self.line += 1;
            let trimmed = self.buffer.trim();
            if !trimmed.is_empty() {
                self.peeked = Some((self.line, trimmed.to_string()));
            }
        }
        Ok(())
    }
}

impl<R: BufRead> RecordSource for JsonLinesSource<R> {
    type Record = Map<String, Value>;

    fn has_next(&mut self) -> Result<bool, SourceError> {
        self.fill()?;
        Ok(self.peeked.is_some())
    }

    fn take_next(&mut self) -> Result<RawRecord<Self::Record>, SourceError> {
        self.fill()?;
        let (line, text) = self.peeked.take().ok_or(SourceError::Exhausted)?;
        let value: Value = serde_json::from_str(&text).map_err(|err| SourceError::Malformed {
            line,
            reason: err.to_string(),
        })?;
        RawRecord::from_json(value).map_err(|_| SourceError::Malformed {
            line,
            reason: "expected an object or an [object, companion] pair".to_string(),
        })
    }
}
