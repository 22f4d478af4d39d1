//! Apply: run a per-row callback and write back what it returns

use tracing::debug;

use super::Frame;
use crate::cancel::CancellationToken;
use crate::error::DataResult;
use crate::lock::{ReadAccess, WriteAccess};

/// Run `f` over every row in ascending order, writing each returned patch
/// back into the frame
///
/// The callback receives the current row, its index and the row count.
/// Returning `None` leaves the row unchanged.
///
/// # Errors
/// Returns `Cancelled` as soon as the token fires; rows before that point
/// keep their new values and no later row is touched. A callback error or a
/// patch that does not fit is returned the same way.
pub fn apply<F, C>(frame: WriteAccess<'_, F>, mut f: C, token: &CancellationToken) -> DataResult<()>
where
    F: Frame + ?Sized,
    C: FnMut(&F::Row, usize, usize) -> DataResult<Option<F::Patch>>,
{
    frame.with(|frame| {
        let rows = frame.frame_rows();
        let mut patched = 0_usize;
        for row in 0..rows {
            token.check()?;
            let current = frame.read_row(row);
            if let Some(patch) = f(&current, row, rows)? {
                frame.write_row(row, patch)?;
                patched += 1;
            }
        }
        debug!(rows, patched, "apply finished");
        Ok(())
    })
}

/// Like [`apply`], but builds a new frame of the same shape and leaves the
/// source untouched
///
/// # Errors
/// Returns `Cancelled` if the token fires; the partial copy is discarded
pub fn apply_copy<F, C>(
    frame: ReadAccess<'_, F>,
    mut f: C,
    token: &CancellationToken,
) -> DataResult<F::Output>
where
    F: Frame + ?Sized,
    C: FnMut(&F::Row, usize, usize) -> DataResult<Option<F::Patch>>,
{
    frame.with(|frame| {
        let rows = frame.frame_rows();
        let mut out = frame.empty_output(rows);
        for row in 0..rows {
            token.check()?;
            let current = frame.read_row(row);
            let patch = f(&current, row, rows)?;
            frame.copy_row(&mut out, row, patch)?;
        }
        debug!(rows, "apply copy finished");
        Ok(out)
    })
}
