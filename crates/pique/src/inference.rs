use serde::{Deserialize, Serialize};

use crate::config::SEARCH;

/// Priors handed to the protein inference engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl ModelParams {
    /// True if any parameter is still left to the grid search
    pub fn searched(&self) -> bool {
        self.alpha == SEARCH || self.beta == SEARCH || self.gamma == SEARCH
    }
}

/// One entry of the ranked probability list: a posterior error probability
/// and the protein names sharing it. Entries are ordered by ascending
/// `pep` (most confident first); duplicate keys are permitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedGroup {
    pub pep: f64,
    pub proteins: Vec<String>,
}

/// Contract with the protein inference graph. Given a set of priors it
/// produces a fresh ranked probability list; the grid search calls this
/// once per candidate triple, and the estimator once more with the
/// committed parameters.
pub trait InferenceEngine {
    fn infer(&mut self, params: ModelParams) -> Vec<RankedGroup>;
}
