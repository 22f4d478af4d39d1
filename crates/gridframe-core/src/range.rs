//! Inclusive row ranges with open ends and negative (from-the-end) indexing

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, DataResult};

/// An inclusive row interval
///
/// A missing `start` means "from the first row" and a missing `end` means
/// "to the last row". Negative values count from the end, so `-1` is the
/// last row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub end: Option<i64>,
}

impl Range {
    /// Every row
    pub const ALL: Range = Range {
        start: None,
        end: None,
    };

    /// Create a range with both bounds set
    #[must_use]
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Rows from `start` to the end
    #[must_use]
    pub fn starting(start: i64) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// Rows from the beginning up to and including `end`
    #[must_use]
    pub fn until(end: i64) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// A single row
    #[must_use]
    pub fn row(row: i64) -> Self {
        Self::new(row, row)
    }

    /// Resolve against a concrete length into `(start, end)`, both inclusive
    ///
    /// # Errors
    /// Returns `RangeUndefined` for zero length and `InvalidRange` when the
    /// bounds fall outside `[0, length)` or cross each other.
    pub fn limits(&self, length: usize) -> DataResult<(usize, usize)> {
        if length == 0 {
            return Err(DataError::RangeUndefined);
        }

        let len = length as i64;
        let resolve = |bound: i64| if bound < 0 { len + bound } else { bound };
        let start = self.start.map_or(0, resolve);
        let end = self.end.map_or(len - 1, resolve);

        if start < 0 || end < 0 || start > end || start >= len || end >= len {
            return Err(DataError::InvalidRange {
                start: self.start,
                end: self.end,
                length,
            });
        }

        Ok((start as usize, end as usize))
    }

    /// Number of rows covered once resolved against `length`
    ///
    /// # Errors
    /// Same conditions as [`Range::limits`]
    pub fn num_rows(&self, length: usize) -> DataResult<usize> {
        let (start, end) = self.limits(length)?;
        Ok(end - start + 1)
    }

    /// The resolved rows as a `std::ops::RangeInclusive`
    ///
    /// # Errors
    /// Same conditions as [`Range::limits`]
    pub fn rows(&self, length: usize) -> DataResult<std::ops::RangeInclusive<usize>> {
        let (start, end) = self.limits(length)?;
        Ok(start..=end)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: Option<i64>| b.map_or_else(String::new, |v| v.to_string());
        write!(f, "[{}:{}]", bound(self.start), bound(self.end))
    }
}

/// Collapse sorted row indices into the fewest contiguous ranges
///
/// Useful for turning search results back into scan ranges. Input is
/// expected in ascending order; duplicates are ignored.
#[must_use]
pub fn ints_to_ranges(rows: &[usize]) -> Vec<Range> {
    let mut ranges = Vec::new();
    let mut iter = rows.iter().copied();
    let Some(first) = iter.next() else {
        return ranges;
    };

    let (mut start, mut end) = (first, first);
    for row in iter {
        if row == end || row == end + 1 {
            end = row;
        } else {
            ranges.push(Range::new(start as i64, end as i64));
            start = row;
            end = row;
        }
    }
    ranges.push(Range::new(start as i64, end as i64));
    ranges
}
