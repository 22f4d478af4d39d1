//! Lagrange polynomial through a set of known points, in barycentric form

#[derive(Debug, Clone)]
pub(crate) struct Lagrange {
    xs: Vec<f64>,
    ys: Vec<f64>,
    weights: Vec<f64>,
}

impl Lagrange {
    /// Fit through `(xs[i], ys[i])`; `xs` must be distinct
    pub(crate) fn new(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        debug_assert_eq!(xs.len(), ys.len());
        let weights = xs
            .iter()
            .enumerate()
            .map(|(j, &xj)| {
                let product: f64 = xs
                    .iter()
                    .enumerate()
                    .filter(|&(k, _)| k != j)
                    .map(|(_, &xk)| xj - xk)
                    .product();
                1.0 / product
            })
            .collect();
        Self { xs, ys, weights }
    }

    pub(crate) fn eval(&self, x: f64) -> f64 {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for ((&xj, &yj), &wj) in self.xs.iter().zip(&self.ys).zip(&self.weights) {
            let dx = x - xj;
            if dx == 0.0 {
                return yj;
            }
            let t = wj / dx;
            numerator += t * yj;
            denominator += t;
        }
        numerator / denominator
    }
}
