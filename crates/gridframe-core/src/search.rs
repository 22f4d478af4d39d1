//! Partitioned search over an ordered column
//!
//! The scan range is split into contiguous partitions that run on Rayon.
//! Each partition collects its matches in row order and the partition
//! results are joined in partition order, so the output is always ascending
//! whatever order the workers finish in.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::column::{Column, OrderedColumn, RowMatcher};
use crate::config::SearchOptions;
use crate::error::{DataError, DataResult};
use crate::lock::ReadAccess;
use crate::parallel::partitions;
use crate::value::Value;

/// Find the rows holding a value within `[lower, upper]`
///
/// Equal bounds make this an equality search. Matches come back in
/// ascending row order. With `options.max` set, at most that many rows are
/// returned; a single worker always returns the first `max` matches.
///
/// # Errors
/// Returns range errors, `TypeMismatch` for bounds of the wrong type, and
/// `SearchCancelled` carrying the rows matched so far when the token fires.
pub fn search<C>(
    column: ReadAccess<'_, C>,
    lower: &Value,
    upper: &Value,
    options: &SearchOptions,
    token: &CancellationToken,
) -> DataResult<Vec<usize>>
where
    C: OrderedColumn + ?Sized,
{
    column.with(|col| {
        let (start, end) = options.range.limits(col.row_count())?;
        let matcher = col.row_matcher(lower, upper)?;

        if options.max == Some(0) {
            return Ok(Vec::new());
        }

        let workers = options.parallel.worker_count(end - start + 1);
        let mut found = if workers == 1 {
            scan(&matcher, start, end, options.max, None, token)
        } else {
            let parts = partitions(start, end, workers);
            debug!(start, end, workers = parts.len(), "search partitioned");

            let counter = AtomicUsize::new(0);
            let results: Vec<Vec<usize>> = options.parallel.install(|| {
                parts
                    .par_iter()
                    .map(|&(first, last)| {
                        scan(&matcher, first, last, options.max, Some(&counter), token)
                    })
                    .collect()
            })?;
            results.concat()
        };

        if let Some(max) = options.max {
            found.truncate(max);
        }
        debug!(matches = found.len(), "search merged");

        if token.is_cancelled() {
            return Err(DataError::SearchCancelled { partial: found });
        }
        Ok(found)
    })
}

/// [`search`] for a column held as `dyn Column`
///
/// # Errors
/// Returns `InvalidOperation` if the column has no ordering, otherwise as
/// [`search`]
pub fn search_column(
    column: ReadAccess<'_, dyn Column + '_>,
    lower: &Value,
    upper: &Value,
    options: &SearchOptions,
    token: &CancellationToken,
) -> DataResult<Vec<usize>> {
    column.with(|col| {
        let ordered = col.as_ordered().ok_or_else(|| {
            DataError::InvalidOperation(format!("column '{}' has no ordering", col.name()))
        })?;
        search(ReadAccess::AssumeHeld(ordered), lower, upper, options, token)
    })
}

/// Scan `[first, last]`, stopping early on cancellation or once the shared
/// match count reaches `max`
fn scan(
    matcher: &RowMatcher<'_>,
    first: usize,
    last: usize,
    max: Option<usize>,
    counter: Option<&AtomicUsize>,
    token: &CancellationToken,
) -> Vec<usize> {
    let mut local = Vec::new();
    for row in first..=last {
        if token.is_cancelled() {
            break;
        }
        if let Some(max) = max {
            let seen = counter.map_or(local.len(), |c| c.load(Ordering::Acquire));
            if seen >= max {
                break;
            }
        }
        if matcher(row) {
            local.push(row);
            if let Some(c) = counter {
                c.fetch_add(1, Ordering::AcqRel);
            }
        }
    }
    local
}
