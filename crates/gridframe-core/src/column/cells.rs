//! Backing storage shared by every column variant
//!
//! `Cells` owns the value vector and the cached missing count; every
//! mutation adjusts both together.

use std::cmp::Ordering;

use num_complex::Complex64;

use super::SortOrder;
use crate::cancel::CancellationToken;
use crate::error::DataResult;
use crate::range::Range;

/// A stored cell with its own missing encoding
pub trait Cell: Clone + std::fmt::Debug + Send + Sync + 'static {
    /// The encoding of "no value"
    fn missing() -> Self;

    /// Whether this cell holds the missing encoding
    fn is_missing(&self) -> bool;
}

/// NaN is missing. A computed NaN cannot be told apart from an absent value.
impl Cell for f64 {
    fn missing() -> Self {
        f64::NAN
    }

    fn is_missing(&self) -> bool {
        self.is_nan()
    }
}

impl Cell for Complex64 {
    fn missing() -> Self {
        Complex64::new(f64::NAN, f64::NAN)
    }

    fn is_missing(&self) -> bool {
        self.re.is_nan() || self.im.is_nan()
    }
}

/// `None` is missing
impl<T: Clone + std::fmt::Debug + Send + Sync + 'static> Cell for Option<T> {
    fn missing() -> Self {
        None
    }

    fn is_missing(&self) -> bool {
        self.is_none()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Cells<C> {
    values: Vec<C>,
    nil_count: usize,
}

impl<C: Cell> Cells<C> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            nil_count: 0,
        }
    }

    pub(crate) fn from_vec(values: Vec<C>) -> Self {
        let nil_count = values.iter().filter(|c| c.is_missing()).count();
        Self { values, nil_count }
    }

    /// A column of `len` missing cells
    pub(crate) fn missing(len: usize) -> Self {
        Self {
            values: vec![C::missing(); len],
            nil_count: len,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn nil_count(&self) -> usize {
        self.nil_count
    }

    pub(crate) fn as_slice(&self) -> &[C] {
        &self.values
    }

    fn check_row(&self, row: usize) {
        assert!(
            row < self.values.len(),
            "row {row} out of range for {} rows",
            self.values.len()
        );
    }

    pub(crate) fn get(&self, row: usize) -> &C {
        self.check_row(row);
        &self.values[row]
    }

    pub(crate) fn push(&mut self, cell: C) {
        if cell.is_missing() {
            self.nil_count += 1;
        }
        self.values.push(cell);
    }

    pub(crate) fn insert(&mut self, row: usize, cell: C) {
        assert!(
            row <= self.values.len(),
            "insert position {row} out of range for {} rows",
            self.values.len()
        );
        if cell.is_missing() {
            self.nil_count += 1;
        }
        self.values.insert(row, cell);
    }

    pub(crate) fn remove(&mut self, row: usize) -> C {
        self.check_row(row);
        let cell = self.values.remove(row);
        if cell.is_missing() {
            self.nil_count -= 1;
        }
        cell
    }

    pub(crate) fn update(&mut self, row: usize, cell: C) -> C {
        self.check_row(row);
        match (self.values[row].is_missing(), cell.is_missing()) {
            (true, false) => self.nil_count -= 1,
            (false, true) => self.nil_count += 1,
            _ => {}
        }
        std::mem::replace(&mut self.values[row], cell)
    }

    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        self.check_row(a);
        self.check_row(b);
        if a != b {
            self.values.swap(a, b);
        }
    }

    /// Rearrange so that new row `i` holds old row `order[i]`
    ///
    /// Panics unless `order` is a permutation of the rows.
    pub(crate) fn reorder(&mut self, order: &[usize]) {
        assert_eq!(
            order.len(),
            self.values.len(),
            "reorder permutation length does not match row count"
        );
        let mut seen = vec![false; order.len()];
        for &row in order {
            assert!(
                row < seen.len() && !seen[row],
                "reorder index {row} repeated or out of range"
            );
            seen[row] = true;
        }
        self.values = order.iter().map(|&row| self.get(row).clone()).collect();
    }

    pub(crate) fn clear(&mut self) {
        self.values.clear();
        self.nil_count = 0;
    }

    /// Count missing cells in `range`, stopping at the first one if asked
    pub(crate) fn nil_count_in(
        &self,
        range: &Range,
        stop_at_one: bool,
        token: &CancellationToken,
    ) -> DataResult<usize> {
        let (start, end) = range.limits(self.values.len())?;
        if self.nil_count == 0 {
            return Ok(0);
        }
        if *range == Range::ALL {
            return Ok(if stop_at_one { 1 } else { self.nil_count });
        }

        let mut count = 0;
        for cell in &self.values[start..=end] {
            token.check()?;
            if cell.is_missing() {
                count += 1;
                if stop_at_one {
                    break;
                }
            }
        }
        Ok(count)
    }

    /// Sort with missing cells ordered before every present cell
    pub(crate) fn sort_by(
        &mut self,
        order: SortOrder,
        stable: bool,
        cmp: impl Fn(&C, &C) -> Ordering,
    ) {
        let full = |a: &C, b: &C| {
            let ord = compare_cells(a, b, &cmp);
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        };
        if stable {
            self.values.sort_by(full);
        } else {
            self.values.sort_unstable_by(full);
        }
    }
}

/// Total order over cells: missing first, then `cmp` on present values
pub(crate) fn compare_cells<C: Cell>(a: &C, b: &C, cmp: impl Fn(&C, &C) -> Ordering) -> Ordering {
    match (a.is_missing(), b.is_missing()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => cmp(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;

    #[test]
    fn test_nil_count_tracks_mutations() {
        let mut cells = Cells::from_vec(vec![1.0, f64::NAN, 3.0]);
        assert_eq!(cells.nil_count(), 1);

        cells.update(0, f64::NAN);
        assert_eq!(cells.nil_count(), 2);
        cells.update(1, 2.0);
        assert_eq!(cells.nil_count(), 1);

        cells.insert(1, f64::NAN);
        assert_eq!(cells.nil_count(), 2);
        cells.remove(0);
        assert_eq!(cells.nil_count(), 1);
        assert_eq!(cells.len(), 3);
    }

    #[test]
    fn test_nil_count_in_range() {
        let cells = Cells::from_vec(vec![None, Some(1_i64), None, None]);
        let token = CancellationToken::new();
        assert_eq!(cells.nil_count_in(&Range::ALL, false, &token), Ok(3));
        assert_eq!(cells.nil_count_in(&Range::starting(1), false, &token), Ok(2));
        assert_eq!(cells.nil_count_in(&Range::starting(1), true, &token), Ok(1));
        assert_eq!(cells.nil_count_in(&Range::row(1), false, &token), Ok(0));
    }

    #[test]
    fn test_nil_count_in_empty_cells() {
        let cells: Cells<Option<i64>> = Cells::from_vec(Vec::new());
        let token = CancellationToken::new();
        assert_eq!(
            cells.nil_count_in(&Range::ALL, false, &token),
            Err(DataError::RangeUndefined)
        );
        assert_eq!(
            cells.nil_count_in(&Range::starting(0), true, &token),
            Err(DataError::RangeUndefined)
        );
    }

    #[test]
    fn test_reorder_keeps_nil_count() {
        let mut cells = Cells::from_vec(vec![None, Some(1_i64), Some(2)]);
        cells.reorder(&[2, 0, 1]);
        assert_eq!(cells.as_slice(), &[Some(2), None, Some(1)]);
        assert_eq!(cells.nil_count(), 1);
    }

    #[test]
    #[should_panic(expected = "repeated or out of range")]
    fn test_reorder_rejects_repeated_rows() {
        let mut cells = Cells::from_vec(vec![None, Some(1_i64), Some(2)]);
        cells.reorder(&[1, 1, 2]);
    }

    #[test]
    #[should_panic(expected = "repeated or out of range")]
    fn test_reorder_rejects_out_of_range_rows() {
        let mut cells = Cells::from_vec(vec![Some(1_i64), Some(2)]);
        cells.reorder(&[0, 2]);
    }

    #[test]
    fn test_sort_puts_missing_first() {
        let mut cells = Cells::from_vec(vec![Some(3_i64), None, Some(1), Some(2)]);
        cells.sort_by(SortOrder::Ascending, true, |a, b| a.cmp(b));
        assert_eq!(cells.as_slice(), &[None, Some(1), Some(2), Some(3)]);

        cells.sort_by(SortOrder::Descending, false, |a, b| a.cmp(b));
        assert_eq!(cells.as_slice(), &[Some(3), Some(2), Some(1), None]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_panics() {
        let cells: Cells<f64> = Cells::from_vec(vec![1.0]);
        let _ = cells.get(1);
    }
}
