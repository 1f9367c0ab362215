//! Lazy, forward-only iteration over an external record source.
//!
//! [`ElementIterator`] owns a [`RecordSource`] and converts one record per
//! call. It is its own cursor: it cannot be restarted and must have a single
//! consumer. The source is released exactly once, by [`ElementIterator::close`],
//! by [`ElementIterator::scoped`], or on drop.

use std::iter::FusedIterator;

use thiserror::Error;
use tracing::{debug, warn, Span};

use crate::convert::{convert_record, ConversionError};
use crate::element::Element;
use crate::record::{RawRecord, RecordMap};
use crate::BridgeError;

/// Errors reported by a record source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No further records are available.
    #[error("record source exhausted")]
    Exhausted,

    /// Reading from the underlying input failed.
    #[error("i/o error while reading records: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be read into a raw record.
    #[error("malformed record on line {line}: {reason}")]
    Malformed {
        /// 1-based input line.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The foreign iterator raised an error other than exhaustion.
    #[error("foreign iterator failed: {0}")]
    Foreign(String),
}

/// An external iterator of raw records.
pub trait RecordSource {
    /// Record representation handed out by this source.
    type Record: RecordMap;

    /// Whether another record is available. Must not consume anything.
    fn has_next(&mut self) -> Result<bool, SourceError>;

    /// Take the next record, or [`SourceError::Exhausted`] at the end.
    fn take_next(&mut self) -> Result<RawRecord<Self::Record>, SourceError>;

    /// Release whatever the source holds.
    fn close(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}

impl<S: RecordSource + ?Sized> RecordSource for &mut S {
    type Record = S::Record;

    fn has_next(&mut self) -> Result<bool, SourceError> {
        (**self).has_next()
    }

    fn take_next(&mut self) -> Result<RawRecord<Self::Record>, SourceError> {
        (**self).take_next()
    }

    fn close(&mut self) -> Result<(), SourceError> {
        (**self).close()
    }
}

/// Behaviour switches for [`ElementIterator`].
#[derive(Debug, Clone, Default)]
pub struct IteratorConfig {
    /// Log and skip records that fail conversion instead of yielding the error.
    /// Records that cannot be read at all are never skipped.
    pub skip_unconvertible: bool,
}

impl IteratorConfig {
    /// Set whether unconvertible records are skipped.
    pub fn with_skip_unconvertible(mut self, skip: bool) -> Self {
        self.skip_unconvertible = skip;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Open,
    Exhausted,
    Closed,
}

/// Converts records from a [`RecordSource`] into [`Element`]s on demand.
#[derive(Debug)]
pub struct ElementIterator<S: RecordSource> {
    source: S,
    config: IteratorConfig,
    span: Span,
    cursor: Cursor,
    records_read: usize,
    records_skipped: usize,
}

impl<S: RecordSource> ElementIterator<S> {
    /// Wrap `source` with the default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, IteratorConfig::default())
    }

    /// Wrap `source` with an explicit configuration.
    pub fn with_config(source: S, config: IteratorConfig) -> Self {
        Self {
            source,
            config,
            span: Span::none(),
            cursor: Cursor::Open,
            records_read: 0,
            records_skipped: 0,
        }
    }

    /// Emit this iterator's events under `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Whether the source reports another record.
    ///
    /// With `skip_unconvertible` set, a `true` answer can still be followed by
    /// end of sequence if every remaining record is skipped.
    pub fn has_next(&mut self) -> Result<bool, SourceError> {
        if self.cursor != Cursor::Open {
            return Ok(false);
        }
        let _entered = self.span.enter();
        self.source.has_next()
    }

    /// Take and convert the next record; `Ok(None)` at end of sequence.
    pub fn next_element(&mut self) -> Result<Option<Element>, BridgeError> {
        let _entered = self.span.enter();
        while self.cursor == Cursor::Open {
            let record = match self.source.take_next() {
                Ok(record) => record,
                Err(SourceError::Exhausted) => {
                    self.cursor = Cursor::Exhausted;
                    debug!(
                        read = self.records_read,
                        skipped = self.records_skipped,
                        "record source exhausted"
                    );
                    break;
                }
                Err(err) => return Err(err.into()),
            };
            self.records_read += 1;

            match convert_record(&record) {
                Ok(element) => return Ok(Some(element)),
                Err(err) if self.config.skip_unconvertible && !is_read_failure(&err) => {
                    self.records_skipped += 1;
                    warn!(
                        record = self.records_read,
                        error = %err,
                        "skipping unconvertible record"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(None)
    }

    /// Release the source. Later calls are no-ops.
    pub fn close(&mut self) -> Result<(), SourceError> {
        if self.cursor == Cursor::Closed {
            return Ok(());
        }
        self.cursor = Cursor::Closed;
        let _entered = self.span.enter();
        debug!(read = self.records_read, "closing record source");
        self.source.close()
    }

    /// Run `f` over this iterator and close the source afterwards, whatever
    /// `f` returned.
    ///
    /// An error from `f` takes precedence over an error from closing.
    pub fn scoped<T, E>(mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<SourceError>,
    {
        let outcome = f(&mut self);
        let closed = self.close();
        let value = outcome?;
        closed?;
        Ok(value)
    }

    /// Whether [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.cursor == Cursor::Closed
    }

    /// Records taken from the source so far, including skipped ones.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Records dropped because they failed conversion.
    pub fn records_skipped(&self) -> usize {
        self.records_skipped
    }

    /// Configuration in effect.
    pub fn config(&self) -> &IteratorConfig {
        &self.config
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: RecordSource> Iterator for ElementIterator<S> {
    type Item = Result<Element, BridgeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_element().transpose()
    }
}

impl<S: RecordSource> FusedIterator for ElementIterator<S> {}

impl<S: RecordSource> Drop for ElementIterator<S> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "failed to close record source");
        }
    }
}

fn is_read_failure(err: &ConversionError) -> bool {
    matches!(err, ConversionError::Lookup(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LookupError;
    use crate::source::VecSource;
    use serde_json::{json, Map, Value};

    fn records(values: Vec<Value>) -> VecSource<Map<String, Value>> {
        VecSource::new(
            values
                .into_iter()
                .map(|value| RawRecord::from_json(value).expect("object or pair"))
                .collect(),
        )
    }

    #[test]
    fn test_exhaustion_is_sticky() {
        let source = records(vec![json!({"type": "entity_seed", "vertex": 1})]);
        let mut iter = ElementIterator::new(source);
        assert!(iter.next().is_some());
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
        assert!(!iter.has_next().unwrap());
    }

    #[test]
    fn test_skip_unconvertible_counts() {
        let source = records(vec![
            json!({"type": "bogus"}),
            json!({"type": "entity_seed", "vertex": "v"}),
            json!({"group": "untagged"}),
        ]);
        let config = IteratorConfig::default().with_skip_unconvertible(true);
        let mut iter = ElementIterator::with_config(source, config);
        assert!(iter.config().skip_unconvertible);

        let elements: Vec<_> = iter.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(iter.records_read(), 3);
        assert_eq!(iter.records_skipped(), 2);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut iter = ElementIterator::new(records(vec![]));
        iter.close().unwrap();
        iter.close().unwrap();
        assert!(iter.is_closed());
        assert_eq!(iter.source().close_count(), 1);
        assert!(iter.next().is_none());
    }

    /// Record whose owning runtime has gone away.
    #[derive(Debug)]
    struct Unreadable;

    impl RecordMap for Unreadable {
        fn get(&self, _key: &str) -> Result<Option<Value>, LookupError> {
            Err(LookupError::new("gateway closed"))
        }

        fn keys(&self) -> Result<Vec<String>, LookupError> {
            Err(LookupError::new("gateway closed"))
        }
    }

    #[test]
    fn test_unreadable_record_is_not_skipped() {
        let source = VecSource::new(vec![RawRecord::Map(Unreadable)]);
        let config = IteratorConfig::default().with_skip_unconvertible(true);
        let mut iter = ElementIterator::with_config(source, config);

        let err = iter.next_element().unwrap_err();
        let BridgeError::Conversion(ConversionError::Lookup(lookup)) = &err else {
            panic!("expected a lookup failure, got {err:?}");
        };
        assert_eq!(lookup.0, "gateway closed");
        assert_eq!(iter.records_skipped(), 0);
    }
}
