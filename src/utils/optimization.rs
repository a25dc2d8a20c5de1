//! Derivative-free minimization for smoothing-parameter search.

/// Options for [`minimize_bounded`].
#[derive(Debug, Clone, Copy)]
pub struct SimplexOptions {
    pub max_iterations: usize,
    /// Stop once the objective spread across the simplex falls below this.
    pub tolerance: f64,
    /// Relative nudge used to seed the initial simplex.
    pub initial_step: f64,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-8,
            initial_step: 0.1,
        }
    }
}

fn clamp_into(point: &mut [f64], bounds: &[(f64, f64)]) {
    for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
        *x = x.clamp(lo, hi);
    }
}

/// Minimize `objective` over a box-bounded domain with a Nelder–Mead
/// simplex. Every candidate is clamped into the bounds before evaluation,
/// so the objective never sees an out-of-range point.
///
/// Returns the best point found; with a pathological objective that is
/// still the best of the evaluated candidates, never a panic.
pub fn minimize_bounded<F>(
    objective: F,
    start: &[f64],
    bounds: &[(f64, f64)],
    options: SimplexOptions,
) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let dim = start.len();
    debug_assert_eq!(bounds.len(), dim);

    let eval = |point: &mut Vec<f64>| -> f64 {
        clamp_into(point, bounds);
        let f = objective(point);
        if f.is_nan() {
            f64::INFINITY
        } else {
            f
        }
    };

    // Seed simplex: the start plus one vertex per coordinate, nudged by a
    // fraction of that coordinate's bound width.
    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dim + 1);
    let mut origin = start.to_vec();
    let f0 = eval(&mut origin);
    simplex.push((origin.clone(), f0));
    for i in 0..dim {
        let (lo, hi) = bounds[i];
        let mut vertex = origin.clone();
        vertex[i] += options.initial_step * (hi - lo);
        let f = eval(&mut vertex);
        simplex.push((vertex, f));
    }

    for _ in 0..options.max_iterations {
        simplex.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let spread = simplex[dim].1 - simplex[0].1;
        if spread.abs() < options.tolerance {
            break;
        }

        // Centroid of all vertices except the worst.
        let mut centroid = vec![0.0; dim];
        for (vertex, _) in &simplex[..dim] {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x / dim as f64;
            }
        }

        let worst = simplex[dim].clone();
        let step = |scale: f64| -> Vec<f64> {
            centroid
                .iter()
                .zip(&worst.0)
                .map(|(c, w)| c + scale * (c - w))
                .collect()
        };

        // Reflection.
        let mut reflected = step(1.0);
        let f_reflected = eval(&mut reflected);

        if f_reflected < simplex[0].1 {
            // Expansion.
            let mut expanded = step(2.0);
            let f_expanded = eval(&mut expanded);
            simplex[dim] = if f_expanded < f_reflected {
                (expanded, f_expanded)
            } else {
                (reflected, f_reflected)
            };
        } else if f_reflected < simplex[dim - 1].1 {
            simplex[dim] = (reflected, f_reflected);
        } else {
            // Contraction toward the centroid.
            let mut contracted = step(-0.5);
            let f_contracted = eval(&mut contracted);
            if f_contracted < worst.1 {
                simplex[dim] = (contracted, f_contracted);
            } else {
                // Shrink everything toward the best vertex.
                let best = simplex[0].0.clone();
                for entry in simplex.iter_mut().skip(1) {
                    let mut shrunk: Vec<f64> = best
                        .iter()
                        .zip(&entry.0)
                        .map(|(b, x)| b + 0.5 * (x - b))
                        .collect();
                    let f = eval(&mut shrunk);
                    *entry = (shrunk, f);
                }
            }
        }
    }

    simplex
        .into_iter()
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(point, _)| point)
        .unwrap_or_else(|| start.to_vec())
}
