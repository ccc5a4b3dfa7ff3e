//! The parallel matching driver.
//!
//! `for_each_match` spawns `nr_threads` workers, each pulling batches from
//! the shared source and keeping a bounded top-K min-heap under the
//! better-than order, then merges the per-thread results, sorts, and emits
//! winners to the sink in descending match quality. Workers never unwind
//! past the join barrier: panics and source failures are captured and the
//! first one is re-raised after all workers have joined.

use std::any::Any;
use std::borrow::Cow;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::thread;

use crate::item::{sort_limit, Item, Matched};
use crate::matcher::{MatchInfo, Matcher, MatcherOptions};
use crate::source::Source;
use crate::{Error, Options};

/// Matches every item the source produces against `query` and invokes
/// `sink` once per matched item, in descending match quality (score, then
/// ascending sort key). With `want_match_info`, each winner is re-matched
/// on the driver thread to reconstruct its positions.
pub fn for_each_match<I, S, F>(
    query: &[u8],
    opts: &Options,
    source: &S,
    mut sink: F,
) -> Result<(), Error>
where
    I: Item,
    S: Source<I> + ?Sized,
    F: FnMut(I, Option<&MatchInfo>),
{
    if opts.nr_threads < 1 {
        return Err(Error::InvalidOption(format!(
            "invalid nr_threads: {}",
            opts.nr_threads
        )));
    }
    let query = invert_query(query, &opts.query_inverting_delimiter)?;

    let mopts = MatcherOptions {
        is_path: opts.path,
        query_path_mode: opts.query_path_mode,
        crfile: opts.crfile.clone(),
        match_crfile: opts.match_crfile,
        unicode: opts.unicode,
    };
    let matcher = Matcher::new(&query, &mopts);
    let limit = opts.limit;

    // Match in parallel; each worker owns its results until the merge.
    let per_thread: Vec<Vec<Matched<I>>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..opts.nr_threads)
            .map(|worker| {
                let matcher = &matcher;
                scope.spawn(move || worker_loop(worker, matcher, source, limit))
            })
            .collect();

        let mut lists = Vec::with_capacity(handles.len());
        let mut first_failure: Option<Error> = None;
        for handle in handles {
            match handle.join() {
                Ok(Ok(matches)) => lists.push(matches),
                Ok(Err(err)) => {
                    first_failure.get_or_insert(err);
                }
                Err(panic) => {
                    first_failure.get_or_insert(Error::Worker(panic_message(&panic)));
                }
            }
        }
        match first_failure {
            Some(err) => Err(err),
            None => Ok(lists),
        }
    })?;

    let total: usize = per_thread.iter().map(Vec::len).sum();
    let mut all: Vec<Matched<I>> = Vec::with_capacity(total);
    for list in per_thread {
        all.extend(list);
    }
    debug!("driver: {} matches before sort/limit", all.len());
    sort_limit(&mut all, limit);

    if opts.want_match_info {
        for m in all {
            let info = matcher.match_info(m.item.match_key()).ok_or_else(|| {
                Error::Internal(format!(
                    "failed to re-match known match '{}' during position collection",
                    String::from_utf8_lossy(m.item.match_key())
                ))
            })?;
            sink(m.item, Some(&info));
        }
    } else {
        for m in all {
            sink(m.item, None);
        }
    }
    Ok(())
}

fn worker_loop<I, S>(
    worker: usize,
    matcher: &Matcher,
    source: &S,
    limit: usize,
) -> Result<Vec<Matched<I>>, Error>
where
    I: Item,
    S: Source<I> + ?Sized,
{
    let mut batch: Vec<I> = Vec::with_capacity(source.batch_size());
    let mut matches: Vec<Matched<I>> = Vec::new();
    // The min-heap keeps the worst of the kept top-K at its root.
    let mut heap: BinaryHeap<Reverse<Matched<I>>> = BinaryHeap::new();
    if limit > 0 {
        heap.reserve(limit + 1);
    }
    let mut processed = 0usize;

    loop {
        batch.clear();
        let more = source.fill(&mut batch)?;
        for item in batch.drain(..) {
            processed += 1;
            if let Some(score) = matcher.match_item(item.match_key()) {
                let matched = Matched {
                    score: score.packed(),
                    item,
                };
                if limit == 0 {
                    matches.push(matched);
                } else {
                    heap.push(Reverse(matched));
                    if heap.len() > limit {
                        heap.pop();
                    }
                }
            }
        }
        if !more {
            break;
        }
    }

    if limit > 0 {
        matches.extend(heap.into_iter().map(|Reverse(m)| m));
    }
    trace!("worker {worker}: {}/{processed} items matched", matches.len());
    Ok(matches)
}

/// Applies the query-inverting delimiter: the query is split on it and the
/// parts are re-joined in reverse order.
fn invert_query<'a>(query: &'a [u8], delimiter: &[u8]) -> Result<Cow<'a, [u8]>, Error> {
    match delimiter {
        [] => Ok(Cow::Borrowed(query)),
        &[delim] => {
            let mut parts: Vec<&[u8]> = query.split(|&b| b == delim).collect();
            parts.reverse();
            Ok(Cow::Owned(parts.concat()))
        }
        _ => Err(Error::InvalidOption(
            "query inverting delimiter must be a single character".into(),
        )),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "(unknown worker panic)".to_string()
    }
}
