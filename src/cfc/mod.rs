//! CfC (Closed-form Continuous-time) sequence encoder.
//!
//! A single small dense CfC network with fixed, seeded weights. It runs a
//! feature sequence through the cell and reduces the final hidden state to a
//! bounded scalar in (-1, 1). Inference only: the weights never change after
//! construction, so the same sequence always yields the same output.
//!
//! ## Architecture
//!
//! - `num_inputs` normalized features per step
//! - 8 dense CfC neurons (default)
//! - tanh readout over the hidden state

pub mod cell;

pub use cell::{CfcCell, CfcWeights};

/// Default hidden width.
pub const DEFAULT_NEURONS: usize = 8;

/// Seeded, read-only CfC network.
#[derive(Debug, Clone)]
pub struct CfcNetwork {
    weights: CfcWeights,
}

impl CfcNetwork {
    /// Create a network with deterministic weights for `seed`.
    pub fn new(num_inputs: usize, num_neurons: usize, seed: u64) -> Self {
        Self {
            weights: CfcWeights::init(num_inputs, num_neurons, seed),
        }
    }

    /// Run `sequence` (oldest first) from a zero state, each step `dt` long,
    /// then continue `extra_steps` more steps holding the last input.
    ///
    /// The continuation models forecast drift: the state keeps evolving under
    /// the most recent conditions. Returns the readout in (-1, 1); an empty
    /// sequence reads out the zero state.
    pub fn encode(&self, sequence: &[Vec<f64>], dt: f64, extra_steps: u32) -> f64 {
        let mut h = vec![0.0; self.weights.num_neurons];
        for x in sequence {
            h = CfcCell::step(x, &h, dt, &self.weights);
        }
        if let Some(last) = sequence.last() {
            for _ in 0..extra_steps {
                h = CfcCell::step(last, &h, dt, &self.weights);
            }
        }
        CfcCell::readout(&h, &self.weights)
    }
}
