//! Filter: keep or drop rows by a per-row verdict

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Frame;
use crate::cancel::CancellationToken;
use crate::error::DataResult;
use crate::lock::{ReadAccess, WriteAccess};

/// Verdict returned by a filter callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterAction {
    Drop,
    Keep,
    /// Treated as `Keep`
    Choose,
}

impl FilterAction {
    #[must_use]
    pub fn is_kept(self) -> bool {
        !matches!(self, FilterAction::Drop)
    }
}

impl From<bool> for FilterAction {
    fn from(keep: bool) -> Self {
        if keep {
            FilterAction::Keep
        } else {
            FilterAction::Drop
        }
    }
}

/// Scan every row and collect the ones whose verdict passes `want`
fn scan<F, C>(
    frame: &F,
    f: &mut C,
    token: &CancellationToken,
    want: bool,
) -> DataResult<Vec<usize>>
where
    F: Frame + ?Sized,
    C: FnMut(&F::Row, usize, usize) -> DataResult<FilterAction>,
{
    let rows = frame.frame_rows();
    let mut picked = Vec::new();
    for row in 0..rows {
        token.check()?;
        let current = frame.read_row(row);
        if f(&current, row, rows)?.is_kept() == want {
            picked.push(row);
        }
    }
    Ok(picked)
}

/// Remove every row the callback drops, returning how many were removed
///
/// Rows are scanned first; removal happens afterwards from the highest index
/// down, so nothing is removed if the scan fails or is cancelled.
///
/// # Errors
/// Returns `Cancelled` or the callback's error, with the frame unmodified
pub fn filter<F, C>(frame: WriteAccess<'_, F>, mut f: C, token: &CancellationToken) -> DataResult<usize>
where
    F: Frame + ?Sized,
    C: FnMut(&F::Row, usize, usize) -> DataResult<FilterAction>,
{
    frame.with(|frame| {
        let dropped = scan(&*frame, &mut f, token, false)?;
        for &row in dropped.iter().rev() {
            frame.remove_row(row);
        }
        debug!(
            removed = dropped.len(),
            remaining = frame.frame_rows(),
            "filter finished"
        );
        Ok(dropped.len())
    })
}

/// Build a new frame holding only the kept rows, in their original order
///
/// # Errors
/// Returns `Cancelled` or the callback's error
pub fn filter_copy<F, C>(
    frame: ReadAccess<'_, F>,
    mut f: C,
    token: &CancellationToken,
) -> DataResult<F::Output>
where
    F: Frame + ?Sized,
    C: FnMut(&F::Row, usize, usize) -> DataResult<FilterAction>,
{
    frame.with(|frame| {
        let kept = scan(frame, &mut f, token, true)?;
        let mut out = frame.empty_output(kept.len());
        for &row in &kept {
            frame.copy_row(&mut out, row, None)?;
        }
        debug!(kept = kept.len(), rows = frame.frame_rows(), "filter copy finished");
        Ok(out)
    })
}
