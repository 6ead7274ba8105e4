use crate::inference::ModelParams;
use serde::{Deserialize, Serialize};

/// Parameter a grid search should determine rather than the user
pub const SEARCH: f64 = -1.0;

/// Settings for protein-level statistical inference.
///
/// `alpha`, `beta` and `gamma` are the priors consumed by the inference
/// engine: `gamma` the prior probability that a protein is present, `alpha`
/// the probability that a present protein emits an observed peptide, `beta`
/// the probability of a false detection. Setting any of them to -1 leaves
/// that parameter to the grid search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProteinConfig {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,

    /// Trade-off weight between partial ROC area and FDR divergence in the
    /// grid-search objective
    pub lambda: f64,
    /// Estimated-FDR level past which the FDR divergence integral stops
    pub threshold: f64,
    /// Estimated-FDR level below which the ROC operating point may widen
    pub roc_threshold: f64,
    /// Number of false positives the partial ROC area is evaluated at;
    /// 0 lets the FDR curve walk pick the operating point
    pub roc_n: u32,
    /// Grid coarseness, 0 (widest, slowest) to 3 (narrowest, fastest)
    pub deepness: u8,
    pub grid_search: bool,

    /// Treat a tie group as a single protein when accumulating counts
    pub ties_as_one: bool,
    /// Scale empirical FDR by a bootstrapped estimate of the null proportion
    pub use_pi0: bool,
    /// Integrate absolute rather than squared FDR differences
    pub conservative: bool,

    // Passed through to the inference engine, not interpreted here
    pub group_proteins: bool,
    pub no_separate: bool,
    pub no_prune: bool,

    /// Derive pi0 from a database-driven decoy FDR estimate instead of the
    /// p-value bootstrap
    pub mayu_fdr: bool,
    pub target_db: Option<String>,
    pub decoy_db: Option<String>,
    pub decoy_pattern: String,
}

impl Default for ProteinConfig {
    fn default() -> Self {
        ProteinConfig {
            alpha: SEARCH,
            beta: SEARCH,
            gamma: SEARCH,
            lambda: 0.15,
            threshold: 0.10,
            roc_threshold: 0.05,
            roc_n: 0,
            deepness: 3,
            grid_search: true,
            ties_as_one: false,
            use_pi0: true,
            conservative: false,
            group_proteins: false,
            no_separate: false,
            no_prune: false,
            mayu_fdr: false,
            target_db: None,
            decoy_db: None,
            decoy_pattern: "random".into(),
        }
    }
}

impl ProteinConfig {
    pub fn model_params(&self) -> ModelParams {
        ModelParams {
            alpha: self.alpha,
            beta: self.beta,
            gamma: self.gamma,
        }
    }

    /// The ROC operating point is recalibrated during the FDR curve walk
    /// unless the user fixed it
    pub fn update_roc_n(&self) -> bool {
        self.roc_n == 0
    }

    /// Initial ROC operating point: the configured value, or the lower
    /// recalibration bound when the walk is left to pick one
    pub fn initial_roc_n(&self) -> u32 {
        if self.roc_n > 0 {
            self.roc_n
        } else {
            50
        }
    }
}
