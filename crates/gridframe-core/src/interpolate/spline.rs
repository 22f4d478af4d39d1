//! Natural cubic spline through a set of known points

/// A natural cubic spline (zero second derivative at both end knots)
///
/// Outside the knots the curve continues as a straight line with the end
/// slope, which is what the zero-curvature end condition implies.
#[derive(Debug, Clone)]
pub(crate) struct NaturalSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivative at each knot
    m: Vec<f64>,
}

impl NaturalSpline {
    /// Fit through `(xs[i], ys[i])`; `xs` must be strictly increasing and
    /// hold at least two knots
    pub(crate) fn new(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        debug_assert_eq!(xs.len(), ys.len());
        debug_assert!(xs.len() >= 2);

        let n = xs.len();
        let mut m = vec![0.0; n];
        if n > 2 {
            // Thomas algorithm over the interior knots 1..n-1
            let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
            let size = n - 2;
            let mut diag = vec![0.0; size];
            let mut upper = vec![0.0; size];
            let mut rhs = vec![0.0; size];

            for k in 0..size {
                let i = k + 1;
                diag[k] = 2.0 * (h[i - 1] + h[i]);
                upper[k] = h[i];
                rhs[k] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
            }

            for k in 1..size {
                let lower = h[k];
                let w = lower / diag[k - 1];
                diag[k] -= w * upper[k - 1];
                rhs[k] -= w * rhs[k - 1];
            }

            let mut solved = vec![0.0; size];
            solved[size - 1] = rhs[size - 1] / diag[size - 1];
            for k in (0..size - 1).rev() {
                solved[k] = (rhs[k] - upper[k] * solved[k + 1]) / diag[k];
            }
            m[1..n - 1].copy_from_slice(&solved);
        }

        Self { xs, ys, m }
    }

    pub(crate) fn eval(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let (first, last) = (self.xs[0], self.xs[n - 1]);

        if x < first {
            return self.ys[0] + self.slope_at_start() * (x - first);
        }
        if x > last {
            return self.ys[n - 1] + self.slope_at_end() * (x - last);
        }

        let i = self
            .xs
            .partition_point(|&k| k <= x)
            .saturating_sub(1)
            .min(n - 2);
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        let (m0, m1) = (self.m[i], self.m[i + 1]);
        let h = x1 - x0;
        let a = x1 - x;
        let b = x - x0;

        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }

    fn slope_at_start(&self) -> f64 {
        let h = self.xs[1] - self.xs[0];
        (self.ys[1] - self.ys[0]) / h - (2.0 * self.m[0] + self.m[1]) * h / 6.0
    }

    fn slope_at_end(&self) -> f64 {
        let n = self.xs.len();
        let h = self.xs[n - 1] - self.xs[n - 2];
        (self.ys[n - 1] - self.ys[n - 2]) / h + (self.m[n - 2] + 2.0 * self.m[n - 1]) * h / 6.0
    }
}
