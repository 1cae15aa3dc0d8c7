//! CfC (Closed-form Continuous-time) cell implementation.
//!
//! Implements the continuous-time RNN cell with time-gated updates:
//!
//! ```text
//! For each neuron i:
//!   tau[i] = softplus(W_tau * [x; h] + b_tau)
//!   f[i]   = sigmoid(-(dt * tau[i]) * (W_f * [x; h] + b_f))
//!   g[i]   = tanh(W_g * [x; h] + b_g)
//!   h_new[i] = f[i] * g[i] + (1 - f[i]) * h[i]
//! ```
//!
//! Wiring is dense: every neuron sees every input and every hidden unit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// CfC cell weights and biases.
///
/// Gate matrices are stored row-major: `[num_neurons x (num_inputs + num_neurons)]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CfcWeights {
    pub num_inputs: usize,
    pub num_neurons: usize,

    pub w_tau: Vec<f64>,
    pub w_f: Vec<f64>,
    pub w_g: Vec<f64>,

    pub b_tau: Vec<f64>,
    pub b_f: Vec<f64>,
    pub b_g: Vec<f64>,

    /// Scalar readout: [num_neurons]
    pub w_out: Vec<f64>,
    pub b_out: f64,
}

impl CfcWeights {
    /// Initialize weights with Xavier/Glorot-style uniform initialization.
    pub fn init(num_inputs: usize, num_neurons: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let fan_in = num_inputs + num_neurons;
        let total = num_neurons * fan_in;

        // Xavier init: std = sqrt(2 / (fan_in + fan_out))
        let std = (2.0 / (fan_in + 1) as f64).sqrt();
        let mut init = |n: usize, std: f64| -> Vec<f64> {
            (0..n).map(|_| rng.gen::<f64>() * 2.0 * std - std).collect()
        };

        let w_tau = init(total, std);
        let w_f = init(total, std);
        let w_g = init(total, std);
        let out_std = (2.0 / (num_neurons + 1) as f64).sqrt();
        let w_out = init(num_neurons, out_std);

        Self {
            num_inputs,
            num_neurons,
            w_tau,
            w_f,
            w_g,
            // Bias toward moderate time constants
            b_tau: vec![0.5; num_neurons],
            b_f: vec![0.0; num_neurons],
            b_g: vec![0.0; num_neurons],
            w_out,
            b_out: 0.0,
        }
    }
}

/// CfC cell: stateless forward pass over caller-owned hidden state.
pub struct CfcCell;

impl CfcCell {
    /// Advance hidden state `h` by one step of length `dt` given `input`.
    ///
    /// `input.len()` must equal `weights.num_inputs`; extra values are ignored
    /// and missing ones read as zero.
    pub fn step(input: &[f64], h: &[f64], dt: f64, weights: &CfcWeights) -> Vec<f64> {
        let n = weights.num_neurons;
        let fan_in = weights.num_inputs + n;

        let concat: Vec<f64> = (0..weights.num_inputs)
            .map(|i| input.get(i).copied().unwrap_or(0.0))
            .chain(h.iter().copied())
            .collect();

        let dot = |w: &[f64], row: usize| -> f64 {
            w[row * fan_in..(row + 1) * fan_in]
                .iter()
                .zip(&concat)
                .map(|(a, b)| a * b)
                .sum()
        };

        (0..n)
            .map(|i| {
                let tau = softplus(dot(&weights.w_tau, i) + weights.b_tau[i]);
                let f = sigmoid(-(dt * tau) * (dot(&weights.w_f, i) + weights.b_f[i]));
                let g = (dot(&weights.w_g, i) + weights.b_g[i]).tanh();
                f * g + (1.0 - f) * h[i]
            })
            .collect()
    }

    /// Bounded scalar readout of a hidden state, in (-1, 1).
    pub fn readout(h: &[f64], weights: &CfcWeights) -> f64 {
        let z: f64 = weights.w_out.iter().zip(h).map(|(w, x)| w * x).sum::<f64>() + weights.b_out;
        z.tanh()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softplus(x: f64) -> f64 {
    // ln(1 + e^x), stable for large |x|
    if x > 20.0 {
        x
    } else {
        x.exp().ln_1p()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_deterministic_per_seed() {
        let a = CfcWeights::init(6, 8, 7);
        let b = CfcWeights::init(6, 8, 7);
        let c = CfcWeights::init(6, 8, 8);
        assert_eq!(a.w_g, b.w_g);
        assert_ne!(a.w_g, c.w_g);
        assert_eq!(a.w_tau.len(), 8 * 14);
        assert_eq!(a.b_g.len(), 8);
        assert_eq!(a.w_out.len(), 8);
    }

    #[test]
    fn test_step_keeps_state_bounded() {
        let w = CfcWeights::init(6, 8, 1);
        let mut h = vec![0.0; 8];
        for _ in 0..50 {
            h = CfcCell::step(&[3.0, -2.0, 1.0, 0.5, 4.0, -1.0], &h, 1.0, &w);
        }
        // g is tanh-bounded and h is a convex blend, so |h| <= 1
        assert!(h.iter().all(|x| x.abs() <= 1.0 + 1e-12));
        let y = CfcCell::readout(&h, &w);
        assert!(y > -1.0 && y < 1.0);
    }

    #[test]
    fn test_softplus_positive() {
        assert!(softplus(-30.0) > 0.0);
        assert!((softplus(0.0) - 2f64.ln()).abs() < 1e-12);
        assert_eq!(softplus(50.0), 50.0);
    }
}
