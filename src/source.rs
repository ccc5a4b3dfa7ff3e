//! Thread-safe item producers feeding the parallel driver.
//!
//! A source is the only shared mutable boundary in the pipeline: a single
//! mutex guards the producer's cursor, and workers hold it only while
//! filling a batch, never while matching.

use std::io::BufRead;
use std::sync::Mutex;

use crate::Error;

/// Advisory number of items per `fill` call: large enough to amortize the
/// lock, small enough to keep a batch in cache.
pub const DEFAULT_BATCH_SIZE: usize = 512;

/// A thread-safe batch producer.
pub trait Source<I>: Sync {
    /// Appends up to `batch_size()` items to `batch`. Returns `true` iff
    /// more items may arrive later. Called concurrently from every worker.
    fn fill(&self, batch: &mut Vec<I>) -> Result<bool, Error>;

    /// Advisory upper bound on items appended per `fill` call.
    fn batch_size(&self) -> usize {
        DEFAULT_BATCH_SIZE
    }
}

struct IterState<It> {
    iter: It,
    done: bool,
}

/// Source over any iterator; items are handed out in batches under a mutex.
pub struct IterSource<It> {
    state: Mutex<IterState<It>>,
}

impl<It> IterSource<It> {
    pub fn new<C>(items: C) -> Self
    where
        C: IntoIterator<IntoIter = It>,
    {
        Self {
            state: Mutex::new(IterState {
                iter: items.into_iter(),
                done: false,
            }),
        }
    }
}

impl<I, It> Source<I> for IterSource<It>
where
    It: Iterator<Item = I> + Send,
{
    fn fill(&self, batch: &mut Vec<I>) -> Result<bool, Error> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| Error::Source("item iterator poisoned".into()))?;
        if state.done {
            return Ok(false);
        }
        for _ in 0..self.batch_size() {
            match state.iter.next() {
                Some(item) => batch.push(item),
                None => {
                    state.done = true;
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

struct LineState<R> {
    reader: R,
    done: bool,
}

/// Source reading byte lines from a `BufRead`, one item per line. Trailing
/// `\n` (and `\r\n`) are stripped; the bytes are otherwise untouched, so
/// malformed UTF-8 flows through to the matcher's substituting decoder.
pub struct LineSource<R, F> {
    state: Mutex<LineState<R>>,
    make: F,
}

impl<R: BufRead, F> LineSource<R, F> {
    pub fn new(reader: R, make: F) -> Self {
        Self {
            state: Mutex::new(LineState { reader, done: false }),
            make,
        }
    }
}

impl<R, I, F> Source<I> for LineSource<R, F>
where
    R: BufRead + Send,
    F: Fn(Vec<u8>) -> I + Sync,
{
    fn fill(&self, batch: &mut Vec<I>) -> Result<bool, Error> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| Error::Source("line reader poisoned".into()))?;
        if state.done {
            return Ok(false);
        }
        for _ in 0..self.batch_size() {
            let mut line = Vec::new();
            match state.reader.read_until(b'\n', &mut line) {
                Ok(0) => {
                    state.done = true;
                    return Ok(false);
                }
                Ok(_) => {
                    if line.last() == Some(&b'\n') {
                        line.pop();
                        if line.last() == Some(&b'\r') {
                            line.pop();
                        }
                    }
                    batch.push((self.make)(line));
                }
                Err(err) => {
                    // The done flag is set under the same lock that guards
                    // the reader, so other workers see a clean shutdown.
                    state.done = true;
                    return Err(Error::Source(err.to_string()));
                }
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_iter_source_drains_in_batches() {
        let n = DEFAULT_BATCH_SIZE + 3;
        let source = IterSource::new((0..n).map(|i| i.to_string()));
        let mut batch: Vec<String> = Vec::new();

        let more = source.fill(&mut batch).unwrap();
        assert!(more);
        assert_eq!(batch.len(), DEFAULT_BATCH_SIZE);

        batch.clear();
        let more = source.fill(&mut batch).unwrap();
        assert!(!more);
        assert_eq!(batch.len(), 3);

        batch.clear();
        assert!(!source.fill(&mut batch).unwrap());
        assert!(batch.is_empty());
    }

    #[test]
    fn test_line_source_strips_endings() {
        let input = Cursor::new(b"one\ntwo\r\nthree".to_vec());
        let source = LineSource::new(input, |line| line);
        let mut batch: Vec<Vec<u8>> = Vec::new();
        let more = source.fill(&mut batch).unwrap();
        assert!(!more);
        assert_eq!(batch, vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);
    }

    #[test]
    fn test_line_source_passes_raw_bytes() {
        let input = Cursor::new(b"caf\xC3\xA9\nbad\xFF\n".to_vec());
        let source = LineSource::new(input, |line| line);
        let mut batch: Vec<Vec<u8>> = Vec::new();
        source.fill(&mut batch).unwrap();
        assert_eq!(batch[0], b"caf\xC3\xA9");
        assert_eq!(batch[1], b"bad\xFF");
    }
}
