//! Limited-memory BFGS for smooth, unconstrained problems.
//!
//! The objective writes its gradient into the supplied buffer and returns the loss.
//! Coordinates whose gradient is identically zero are never moved: both the search
//! direction and the curvature pairs stay zero in those components.

use std::collections::VecDeque;

// Armijo sufficient decrease constant and backtracking limits
const ARMIJO_C1: f64 = 1e-4;
const BACKTRACK_FACTOR: f64 = 0.5;
const MAX_BACKTRACKS: usize = 60;

#[derive(Debug, Clone, Copy)]
pub struct LbfgsOptions {
    pub max_iterations: usize,
    pub history_size: usize,
    pub gradient_tolerance: f64,
    pub function_tolerance: f64,
}

impl Default for LbfgsOptions {
    fn default() -> Self {
        Self {
            max_iterations: 15_000,
            history_size: 10,
            gradient_tolerance: 1e-8,
            function_tolerance: 1e-12,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Minimization {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
    pub message: String,
}

struct CurvaturePair {
    s: Vec<f64>,
    y: Vec<f64>,
    rho: f64,
}

pub fn minimize<F>(objective: F, x0: Vec<f64>, options: &LbfgsOptions) -> Minimization
where
    F: Fn(&[f64], &mut [f64]) -> f64,
{
    let n = x0.len();
    let mut x = x0;
    let mut grad = vec![0.0; n];
    let mut value = objective(&x, &mut grad);

    let mut history: VecDeque<CurvaturePair> = VecDeque::with_capacity(options.history_size);
    let mut x_new = vec![0.0; n];
    let mut grad_new = vec![0.0; n];

    let finish = |x: Vec<f64>, value: f64, iterations: usize, converged: bool, message: &str| Minimization {
        x,
        value,
        iterations,
        converged,
        message: message.to_string(),
    };

    if !value.is_finite() {
        return finish(x, value, 0, false, "loss is not finite at the starting point");
    }

    for iteration in 0..options.max_iterations {
        if inf_norm(&grad) <= options.gradient_tolerance {
            return finish(x, value, iteration, true, "gradient norm below tolerance");
        }

        let mut direction = search_direction(&grad, &history);
        let mut slope = dot(&direction, &grad);
        if slope >= 0.0 || slope.is_nan() {
            // Stale curvature information, fall back to steepest descent
            history.clear();
            direction = grad.iter().map(|g| -g).collect();
            slope = dot(&direction, &grad);
        }

        // Without curvature information the first step is scaled to unit length
        let mut step = if history.is_empty() {
            (1.0 / l2_norm(&direction)).min(1.0)
        } else {
            1.0
        };

        let mut accepted = None;
        for _ in 0..MAX_BACKTRACKS {
            for i in 0..n {
                x_new[i] = x[i] + step * direction[i];
            }
            let candidate = objective(&x_new, &mut grad_new);
            if candidate.is_finite() && candidate <= value + ARMIJO_C1 * step * slope {
                accepted = Some(candidate);
                break;
            }
            step *= BACKTRACK_FACTOR;
        }

        let Some(value_new) = accepted else {
            return finish(x, value, iteration, false, "line search could not find a lower loss");
        };

        let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
        let y: Vec<f64> = grad_new.iter().zip(&grad).map(|(a, b)| a - b).collect();
        let sy = dot(&s, &y);
        if sy > f64::EPSILON * dot(&y, &y) {
            if history.len() == options.history_size {
                history.pop_front();
            }
            if options.history_size > 0 {
                history.push_back(CurvaturePair { s, y, rho: 1.0 / sy });
            }
        }

        let reduction = (value - value_new) / value.abs().max(value_new.abs()).max(1.0);

        std::mem::swap(&mut x, &mut x_new);
        std::mem::swap(&mut grad, &mut grad_new);
        value = value_new;

        if reduction <= options.function_tolerance {
            return finish(x, value, iteration + 1, true, "relative reduction of loss below tolerance");
        }
    }

    if inf_norm(&grad) <= options.gradient_tolerance {
        return finish(x, value, options.max_iterations, true, "gradient norm below tolerance");
    }
    finish(x, value, options.max_iterations, false, "iteration limit reached")
}

// Two-loop recursion. Returns the descent direction -H * grad.
fn search_direction(grad: &[f64], history: &VecDeque<CurvaturePair>) -> Vec<f64> {
    let mut q = grad.to_vec();
    let mut alphas = Vec::with_capacity(history.len());

    for pair in history.iter().rev() {
        let alpha = pair.rho * dot(&pair.s, &q);
        for (qi, yi) in q.iter_mut().zip(&pair.y) {
            *qi -= alpha * yi;
        }
        alphas.push(alpha);
    }

    if let Some(last) = history.back() {
        let gamma = dot(&last.s, &last.y) / dot(&last.y, &last.y);
        for qi in q.iter_mut() {
            *qi *= gamma;
        }
    }

    for (pair, alpha) in history.iter().zip(alphas.iter().rev()) {
        let beta = pair.rho * dot(&pair.y, &q);
        for (qi, si) in q.iter_mut().zip(&pair.s) {
            *qi += (alpha - beta) * si;
        }
    }

    q.iter().map(|v| -v).collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn l2_norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

fn inf_norm(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |acc, x| f64::max(acc, x.abs()))
}
