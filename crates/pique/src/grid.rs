//! Grid search over the inference priors (alpha, beta, gamma), scoring
//! each candidate by partial ROC area against FDR divergence

use itertools::iproduct;

use crate::config::{ProteinConfig, SEARCH};
use crate::inference::{InferenceEngine, ModelParams};
use crate::protein::ProteinRegistry;
use crate::stats::roc::{self, RocCurve};
use crate::Error;

/// Candidate values per parameter, selected by the grid coarseness level
#[derive(Debug, Clone)]
pub struct CandidateGrid {
    pub gamma: Vec<f64>,
    pub alpha: Vec<f64>,
    pub beta: Vec<f64>,
}

impl CandidateGrid {
    /// Deepness 0 is the widest (slowest) grid, 3 the narrowest; anything
    /// past 3 falls back to the narrow grid
    pub fn for_deepness(deepness: u8) -> Self {
        match deepness {
            0 => CandidateGrid {
                gamma: vec![0.1, 0.25, 0.5, 0.75, 0.9],
                alpha: vec![0.01, 0.04, 0.09, 0.16, 0.25, 0.36, 0.5],
                beta: vec![0.0, 0.01, 0.15, 0.025, 0.35, 0.05, 0.1],
            },
            1 => CandidateGrid {
                gamma: vec![0.1, 0.25, 0.5, 0.75],
                alpha: vec![0.01, 0.04, 0.09, 0.16, 0.25, 0.36],
                beta: vec![0.0, 0.01, 0.15, 0.02, 0.025, 0.05],
            },
            2 => CandidateGrid {
                gamma: vec![0.1, 0.5, 0.75],
                alpha: vec![0.01, 0.04, 0.16, 0.25, 0.36],
                beta: vec![0.0, 0.01, 0.15, 0.025, 0.05],
            },
            _ => CandidateGrid {
                gamma: vec![0.5],
                alpha: vec![0.01, 0.04, 0.16, 0.25, 0.36],
                beta: vec![0.0, 0.01, 0.15, 0.025, 0.05],
            },
        }
    }

    /// Collapse the list of any externally pinned parameter to its value
    pub fn pin(mut self, params: &ModelParams) -> Self {
        if params.alpha != SEARCH {
            self.alpha = vec![params.alpha];
        }
        if params.beta != SEARCH {
            self.beta = vec![params.beta];
        }
        if params.gamma != SEARCH {
            self.gamma = vec![params.gamma];
        }
        self
    }
}

/// Winning parameters plus the objective they scored and the ROC operating
/// point in effect when the search finished
#[derive(Debug, Clone, Copy)]
pub struct GridResult {
    pub params: ModelParams,
    pub objective: f64,
    pub roc_n: u32,
}

/// Scan the candidate grid in nested order (gamma outer, then alpha, then
/// beta). Each triple gets a fresh ranked list from the inference engine
/// and is scored by `lambda * rocN - (1 - lambda) * divergence`; a strictly
/// larger objective takes over, so ties keep the earliest triple.
pub fn grid_search(
    config: &ProteinConfig,
    registry: &ProteinRegistry,
    engine: &mut dyn InferenceEngine,
    pi0: f64,
) -> Result<GridResult, Error> {
    let grid = CandidateGrid::for_deepness(config.deepness).pin(&config.model_params());
    let mut roc_n = config.initial_roc_n();
    let mut best: Option<(ModelParams, f64)> = None;

    for (&gamma, &alpha, &beta) in iproduct!(&grid.gamma, &grid.alpha, &grid.beta) {
        let params = ModelParams { alpha, beta, gamma };
        let ranked = engine.infer(params);

        let curves = roc::fdr_curves(&ranked, registry, pi0, config, roc_n);
        roc_n = curves.roc_n;
        let divergence = roc::fdr_divergence(
            &curves.estimated,
            &curves.empirical,
            config.threshold,
            config.conservative,
        );
        let roc_area = RocCurve::build(&ranked, registry, roc_n).partial_auc(roc_n)?;

        let objective = config.lambda * roc_area - (1.0 - config.lambda) * divergence;
        log::trace!(
            "grid: alpha {} beta {} gamma {} -> roc{} {:.6} divergence {:.6} objective {:.6}",
            alpha,
            beta,
            gamma,
            roc_n,
            roc_area,
            divergence,
            objective
        );

        match best {
            Some((_, incumbent)) if objective <= incumbent => {}
            _ => best = Some((params, objective)),
        }
    }

    // The grid is never empty: every candidate list holds at least one value
    let (params, objective) = best.expect("empty candidate grid");
    Ok(GridResult {
        params,
        objective,
        roc_n,
    })
}
