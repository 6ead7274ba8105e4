//! End-to-end protein-level confidence estimation: aggregate PSM evidence,
//! pick inference priors by grid search, and publish per-protein PEP,
//! q-value, empirical q-value and p-value.

use rand::Rng;

use crate::config::ProteinConfig;
use crate::decoy_fdr::{self, ProteinFdrEstimator, PSM_FDR_THRESHOLD};
use crate::grid;
use crate::inference::{InferenceEngine, ModelParams};
use crate::protein::{ProteinRegistry, PsmRecord};
use crate::stats::pi0;
use crate::stats::qvalue::{self, RankStatistics};
use crate::Error;

pub struct ProteinEstimator {
    config: ProteinConfig,
    params: ModelParams,
    registry: ProteinRegistry,
    pi0: f64,
}

impl ProteinEstimator {
    pub fn new(config: ProteinConfig, psms: &[PsmRecord]) -> Self {
        let params = config.model_params();
        ProteinEstimator {
            config,
            params,
            registry: ProteinRegistry::from_psms(psms),
            pi0: 1.0,
        }
    }

    /// Run the full pipeline:
    ///
    /// 1. If configured, derive pi0 from the database-driven decoy FDR
    ///    estimate.
    /// 2. Grid-search any unpinned inference priors.
    /// 3. Rank proteins once more under the committed priors and derive
    ///    q-values, pi0 (bootstrap, unless the database estimate is in
    ///    effect), empirical q-values and p-values.
    /// 4. Publish the statistics onto the registry.
    ///
    /// The random source drives only the pi0 bootstrap; a seeded generator
    /// makes the whole pipeline deterministic.
    pub fn run<R: Rng>(
        &mut self,
        engine: &mut dyn InferenceEngine,
        fdr_estimator: Option<&mut dyn ProteinFdrEstimator>,
        rng: &mut R,
    ) -> Result<(), Error> {
        if self.config.mayu_fdr {
            match fdr_estimator {
                Some(estimator) => {
                    let (targets, decoys) = self.registry.proteins_at_psm_fdr(PSM_FDR_THRESHOLD);
                    self.pi0 = decoy_fdr::protein_fdr_pi0(estimator, &targets, &decoys)?;
                }
                None => {
                    log::warn!(
                        "database-driven FDR requested but no estimator supplied; keeping pi0 = 1.0"
                    );
                }
            }
        }

        if self.config.grid_search || self.params.searched() {
            let result = grid::grid_search(&self.config, &self.registry, engine, self.pi0)?;
            self.params = result.params;
            log::info!(
                "selected gamma = {}, alpha = {}, beta = {} (objective {:.6})",
                self.params.gamma,
                self.params.alpha,
                self.params.beta,
                result.objective
            );
        }

        let ranked = engine.infer(self.params);
        let q = qvalue::qvalues(&ranked, &self.registry, self.config.ties_as_one);

        if self.config.use_pi0 && !self.config.mayu_fdr {
            let pvalues = qvalue::target_pvalues(&ranked, &self.registry);
            self.pi0 = match pi0::estimate_pi0(&pvalues, rng) {
                Some(pi0) => pi0,
                None => {
                    let fallback = q.last().copied().unwrap_or(1.0);
                    log::warn!(
                        "too good a separation between target and decoy proteins to \
                         estimate pi0; taking the highest q-value {:.4} instead",
                        fallback
                    );
                    fallback
                }
            };
        }

        let (q_emp, p) =
            qvalue::empirical_qvalues(&ranked, &self.registry, self.pi0, self.config.ties_as_one);
        let stats = RankStatistics { q, q_emp, p };
        self.registry
            .publish(&ranked, &stats, self.config.ties_as_one);

        log::info!(
            "pi0 = {:.4}; {} target proteins at q <= 0.01",
            self.pi0,
            self.registry.qvalues_below(0.01)
        );
        Ok(())
    }

    pub fn registry(&self) -> &ProteinRegistry {
        &self.registry
    }

    pub fn params(&self) -> ModelParams {
        self.params
    }

    pub fn pi0(&self) -> f64 {
        self.pi0
    }
}
