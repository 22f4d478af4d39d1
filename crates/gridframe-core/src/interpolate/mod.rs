//! Missing-value interpolation for numeric columns
//!
//! Missing rows inside the active range are grouped into runs. Interior runs
//! sit between two known values; boundary runs sit before the first or after
//! the last known value. Each run is filled by the chosen [`Strategy`], in
//! the order given by the [`Direction`], up to the optional per-run limit.

mod lagrange;
mod spline;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::cancel::CancellationToken;
use crate::column::{Column, Element, Float64Column, TimeColumn, TypedColumn};
use crate::config::InterpolateOptions;
use crate::error::{DataError, DataResult};
use crate::lock::{ReadAccess, WriteAccess};
use crate::value::time_to_f64;

use lagrange::Lagrange;
use spline::NaturalSpline;

/// How a missing value is computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Repeat the known value before the run
    ForwardFill,
    /// Repeat the known value after the run
    BackwardFill,
    /// Straight line between the two known values around the run
    #[default]
    Linear,
    /// Natural cubic spline through every known value in range
    Spline,
    /// Lagrange polynomial through every known value in range; interior only
    Lagrange,
}

/// Which end of a run filling starts from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
    /// Alternate between the two ends, starting from the left
    Both,
}

impl Direction {
    fn forward(self) -> bool {
        matches!(self, Direction::Forward | Direction::Both)
    }

    fn backward(self) -> bool {
        matches!(self, Direction::Backward | Direction::Both)
    }
}

/// Which runs are filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Runs between two known values
    #[default]
    Interior,
    /// Runs before the first or after the last known value (extrapolation)
    Boundary,
    Both,
}

impl Region {
    fn interior(self) -> bool {
        matches!(self, Region::Interior | Region::Both)
    }

    fn boundary(self) -> bool {
        matches!(self, Region::Boundary | Region::Both)
    }
}

/// Horizontal position of each row
///
/// Rows are evenly spaced by default; a float or time column gives
/// irregular spacing. An axis column must have no missing value in the
/// active range.
#[derive(Debug, Clone, Copy, Default)]
pub enum Axis<'a> {
    #[default]
    Row,
    Float(&'a Float64Column),
    Time(&'a TimeColumn),
}

impl Axis<'_> {
    fn x(&self, row: usize) -> f64 {
        match self {
            Axis::Row => row as f64,
            Axis::Float(col) => col.values()[row],
            Axis::Time(col) => col.get(row).map_or(f64::NAN, |t| time_to_f64(&t)),
        }
    }

    /// # Panics
    /// Panics if the axis is shorter than the range or has a missing value in it
    fn validate(&self, start: usize, end: usize) {
        let col: &dyn Column = match self {
            Axis::Row => return,
            Axis::Float(col) => *col,
            Axis::Time(col) => *col,
        };
        assert!(
            col.row_count() > end,
            "axis column '{}' has {} rows, range ends at row {end}",
            col.name(),
            col.row_count()
        );
        if let Some(row) = (start..=end).find(|&row| col.is_missing(row)) {
            panic!("axis column '{}' has a missing value at row {row}", col.name());
        }
    }
}

/// Fill missing values in place, returning how many rows were filled
///
/// Works on any float-backed column (`Float64Column`, `MixedColumn`).
///
/// # Errors
/// Returns range errors, `InvalidOperation` when a curve strategy meets a
/// non-increasing axis, or `Cancelled`. Values are computed before any row
/// is written, so an error leaves the column unchanged.
///
/// # Panics
/// Panics if the axis column has a missing value in the active range
pub fn interpolate<E>(
    column: WriteAccess<'_, TypedColumn<E>>,
    axis: &Axis<'_>,
    options: &InterpolateOptions,
    token: &CancellationToken,
) -> DataResult<usize>
where
    E: Element<Cell = f64>,
{
    column.with(|col| {
        let fills = plan(col.values(), axis, options, token)?;
        for (&row, &value) in &fills {
            col.set(row, value);
        }
        Ok(fills.len())
    })
}

/// Compute the values [`interpolate`] would write, without writing them
///
/// # Errors
/// As [`interpolate`]
///
/// # Panics
/// As [`interpolate`]
pub fn interpolated_values<E>(
    column: ReadAccess<'_, TypedColumn<E>>,
    axis: &Axis<'_>,
    options: &InterpolateOptions,
    token: &CancellationToken,
) -> DataResult<BTreeMap<usize, f64>>
where
    E: Element<Cell = f64>,
{
    column.with(|col| plan(col.values(), axis, options, token))
}

enum Curve {
    Spline(NaturalSpline),
    Lagrange(Lagrange),
}

impl Curve {
    fn eval(&self, x: f64) -> f64 {
        match self {
            Curve::Spline(s) => s.eval(x),
            Curve::Lagrange(p) => p.eval(x),
        }
    }
}

/// Work out the fill value of every row that will be filled
fn plan(
    values: &[f64],
    axis: &Axis<'_>,
    options: &InterpolateOptions,
    token: &CancellationToken,
) -> DataResult<BTreeMap<usize, f64>> {
    let (start, end) = options.range.limits(values.len())?;
    axis.validate(start, end);

    let known: Vec<usize> = (start..=end).filter(|&r| !values[r].is_nan()).collect();
    let mut fills = BTreeMap::new();
    let (Some(&first_known), Some(&last_known)) = (known.first(), known.last()) else {
        debug!(start, end, "no known values to interpolate from");
        return Ok(fills);
    };

    let curve = fit(values, &known, axis, options.strategy)?;
    let limit = options.limit.unwrap_or(usize::MAX);
    let direction = options.direction;
    let mut runs = 0_usize;

    if options.region.interior() {
        for pair in known.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if b - a < 2 {
                continue;
            }
            runs += 1;
            trace!(first = a + 1, last = b - 1, "interior run");

            let (xa, xb) = (axis.x(a), axis.x(b));
            let (ya, yb) = (values[a], values[b]);
            for row in run_order(a + 1, b - 1, direction).take(limit) {
                token.check()?;
                let value = match (options.strategy, &curve) {
                    (Strategy::ForwardFill, _) => ya,
                    (Strategy::BackwardFill, _) => yb,
                    (Strategy::Spline | Strategy::Lagrange, Some(curve)) => curve.eval(axis.x(row)),
                    _ => ya + (yb - ya) * (axis.x(row) - xa) / (xb - xa),
                };
                fills.insert(row, value);
            }
        }
    }

    if options.region.boundary() {
        if options.strategy == Strategy::Lagrange {
            debug!("lagrange extrapolation unsupported; boundary runs skipped");
        } else {
            let extrapolate = |row: usize, edge: usize, inner: Option<usize>| {
                extrapolated(values, axis, options.strategy, curve.as_ref(), row, edge, inner)
            };

            if first_known > start && direction.backward() {
                runs += 1;
                trace!(first = start, last = first_known - 1, "leading run");
                let inner = known.get(1).copied();
                for row in (start..first_known).rev().take(limit) {
                    token.check()?;
                    fills.insert(row, extrapolate(row, first_known, inner));
                }
            }

            if last_known < end && direction.forward() {
                runs += 1;
                trace!(first = last_known + 1, last = end, "trailing run");
                let inner = known.len().checked_sub(2).map(|i| known[i]);
                for row in (last_known + 1..=end).take(limit) {
                    token.check()?;
                    fills.insert(row, extrapolate(row, last_known, inner));
                }
            }
        }
    }

    debug!(
        strategy = ?options.strategy,
        runs,
        filled = fills.len(),
        "interpolation planned"
    );
    Ok(fills)
}

/// Fit the curve a spline or Lagrange strategy evaluates
fn fit(
    values: &[f64],
    known: &[usize],
    axis: &Axis<'_>,
    strategy: Strategy,
) -> DataResult<Option<Curve>> {
    if !matches!(strategy, Strategy::Spline | Strategy::Lagrange) || known.len() < 2 {
        return Ok(None);
    }

    let xs: Vec<f64> = known.iter().map(|&r| axis.x(r)).collect();
    let ys: Vec<f64> = known.iter().map(|&r| values[r]).collect();
    if xs.windows(2).any(|w| w[1] <= w[0]) {
        return Err(DataError::InvalidOperation(
            "curve interpolation needs a strictly increasing axis".to_string(),
        ));
    }

    Ok(Some(match strategy {
        Strategy::Lagrange => Curve::Lagrange(Lagrange::new(xs, ys)),
        _ => Curve::Spline(NaturalSpline::new(xs, ys)),
    }))
}

/// Value for a boundary row past the known value at `edge`
///
/// `inner` is the next known row inward from `edge`, if there is one.
fn extrapolated(
    values: &[f64],
    axis: &Axis<'_>,
    strategy: Strategy,
    curve: Option<&Curve>,
    row: usize,
    edge: usize,
    inner: Option<usize>,
) -> f64 {
    match (strategy, curve, inner) {
        (Strategy::Spline, Some(curve), _) => curve.eval(axis.x(row)),
        (Strategy::Linear, _, Some(inner)) => {
            let (x0, x1) = (axis.x(inner), axis.x(edge));
            let gradient = (values[edge] - values[inner]) / (x1 - x0);
            values[edge] + gradient * (axis.x(row) - x1)
        }
        _ => values[edge],
    }
}

/// Rows of `[first, last]` in fill order
///
/// `Both` alternates: even steps take the next row from the left, odd steps
/// the next row from the right.
fn run_order(first: usize, last: usize, direction: Direction) -> Box<dyn Iterator<Item = usize>> {
    match direction {
        Direction::Forward => Box::new(first..=last),
        Direction::Backward => Box::new((first..=last).rev()),
        Direction::Both => {
            let len = last - first + 1;
            Box::new((0..len).map(move |i| {
                if i % 2 == 0 {
                    first + i / 2
                } else {
                    last - i / 2
                }
            }))
        }
    }
}
