//! A small, self-contained L-BFGS minimizer.
//!
//! The CRF learner hand-rolls this the same way the teacher hand-rolls
//! k-means for font-size clustering (`pdf/hierarchy/clustering.rs`) rather
//! than pulling in a general-purpose optimization crate for one algorithm.

const HISTORY_SIZE: usize = 10;
const ARMIJO_C: f64 = 1e-4;
const MAX_LINE_SEARCH_STEPS: usize = 20;

pub struct LbfgsResult {
    pub weights: Vec<f64>,
    pub final_loss: f64,
    pub iterations: usize,
}

/// Minimizes `objective`, which returns `(loss, gradient)` for a weight
/// vector. Stops after `max_iterations` or once the gradient norm falls
/// below `tolerance`.
pub fn minimize(
    initial: Vec<f64>,
    max_iterations: usize,
    tolerance: f64,
    mut objective: impl FnMut(&[f64]) -> (f64, Vec<f64>),
) -> LbfgsResult {
    let n = initial.len();
    let mut w = initial;
    let (mut loss, mut grad) = objective(&w);

    let mut s_history: Vec<Vec<f64>> = Vec::with_capacity(HISTORY_SIZE);
    let mut y_history: Vec<Vec<f64>> = Vec::with_capacity(HISTORY_SIZE);
    let mut rho_history: Vec<f64> = Vec::with_capacity(HISTORY_SIZE);

    let mut iterations = 0;
    while iterations < max_iterations {
        let grad_norm = grad.iter().map(|g| g * g).sum::<f64>().sqrt();
        if grad_norm < tolerance || n == 0 {
            break;
        }

        let direction = two_loop_recursion(&grad, &s_history, &y_history, &rho_history);

        let directional_derivative: f64 = grad.iter().zip(&direction).map(|(g, d)| g * d).sum();
        if directional_derivative >= 0.0 {
            // Not a descent direction (can happen after a bad curvature
            // update); fall back to plain steepest descent for this step.
            let steepest: Vec<f64> = grad.iter().map(|g| -g).collect();
            let (new_w, new_loss, new_grad) = backtracking_line_search(&w, loss, &grad, &steepest, &mut objective);
            update_history(&mut s_history, &mut y_history, &mut rho_history, &w, &new_w, &grad, &new_grad);
            w = new_w;
            loss = new_loss;
            grad = new_grad;
            iterations += 1;
            continue;
        }

        let (new_w, new_loss, new_grad) = backtracking_line_search(&w, loss, &grad, &direction, &mut objective);
        update_history(&mut s_history, &mut y_history, &mut rho_history, &w, &new_w, &grad, &new_grad);

        w = new_w;
        loss = new_loss;
        grad = new_grad;
        iterations += 1;
    }

    LbfgsResult { weights: w, final_loss: loss, iterations }
}

fn two_loop_recursion(grad: &[f64], s_history: &[Vec<f64>], y_history: &[Vec<f64>], rho_history: &[f64]) -> Vec<f64> {
    let mut q = grad.to_vec();
    let m = s_history.len();
    let mut alpha = vec![0.0; m];

    for i in (0..m).rev() {
        alpha[i] = rho_history[i] * dot(&s_history[i], &q);
        axpy(&mut q, -alpha[i], &y_history[i]);
    }

    let gamma = if m > 0 {
        let s = &s_history[m - 1];
        let y = &y_history[m - 1];
        dot(s, y) / dot(y, y).max(1e-12)
    } else {
        1.0
    };
    let mut r: Vec<f64> = q.iter().map(|v| v * gamma).collect();

    for i in 0..m {
        let beta = rho_history[i] * dot(&y_history[i], &r);
        axpy(&mut r, alpha[i] - beta, &s_history[i]);
    }

    r.iter().map(|v| -v).collect()
}

fn backtracking_line_search(
    w: &[f64],
    loss: f64,
    grad: &[f64],
    direction: &[f64],
    objective: &mut impl FnMut(&[f64]) -> (f64, Vec<f64>),
) -> (Vec<f64>, f64, Vec<f64>) {
    let directional_derivative: f64 = dot(grad, direction);
    let mut step = 1.0;

    for _ in 0..MAX_LINE_SEARCH_STEPS {
        let candidate: Vec<f64> = w.iter().zip(direction).map(|(wi, di)| wi + step * di).collect();
        let (candidate_loss, candidate_grad) = objective(&candidate);
        if candidate_loss <= loss + ARMIJO_C * step * directional_derivative {
            return (candidate, candidate_loss, candidate_grad);
        }
        step *= 0.5;
    }

    // Line search failed to improve; take a tiny safe step.
    let candidate: Vec<f64> = w.iter().zip(direction).map(|(wi, di)| wi + step * di).collect();
    let (candidate_loss, candidate_grad) = objective(&candidate);
    (candidate, candidate_loss, candidate_grad)
}

fn update_history(
    s_history: &mut Vec<Vec<f64>>,
    y_history: &mut Vec<Vec<f64>>,
    rho_history: &mut Vec<f64>,
    old_w: &[f64],
    new_w: &[f64],
    old_grad: &[f64],
    new_grad: &[f64],
) {
    let s: Vec<f64> = new_w.iter().zip(old_w).map(|(a, b)| a - b).collect();
    let y: Vec<f64> = new_grad.iter().zip(old_grad).map(|(a, b)| a - b).collect();
    let sy = dot(&s, &y);
    if sy > 1e-10 {
        if s_history.len() == HISTORY_SIZE {
            s_history.remove(0);
            y_history.remove(0);
            rho_history.remove(0);
        }
        s_history.push(s);
        y_history.push(y);
        rho_history.push(1.0 / sy);
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn axpy(y: &mut [f64], alpha: f64, x: &[f64]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimizes_a_simple_quadratic() {
        // f(w) = (w0 - 3)^2 + (w1 + 2)^2, minimum at (3, -2).
        let result = minimize(vec![0.0, 0.0], 100, 1e-8, |w| {
            let loss = (w[0] - 3.0).powi(2) + (w[1] + 2.0).powi(2);
            let grad = vec![2.0 * (w[0] - 3.0), 2.0 * (w[1] + 2.0)];
            (loss, grad)
        });

        assert!((result.weights[0] - 3.0).abs() < 1e-3);
        assert!((result.weights[1] + 2.0).abs() < 1e-3);
    }
}
