//! Contract with a database-driven protein FDR estimator (MAYU style)
//!
//! Reiter, 2009 [https://pubmed.ncbi.nlm.nih.gov/19608599/]

use fnv::FnvHashSet;

use crate::Error;

/// Peptide-level q-value cutoff selecting the proteins handed to the
/// estimator
pub const PSM_FDR_THRESHOLD: f64 = 0.05;

/// A collaborator that, given target/decoy sequence databases and the
/// proteins implicated below [`PSM_FDR_THRESHOLD`], estimates the expected
/// number of false positive target proteins.
///
/// An unreadable database is fatal and surfaces as `Err`; an estimator
/// that cannot produce a value on this data reports `Ok(None)`, which the
/// caller treats as "no information" rather than an abort.
pub trait ProteinFdrEstimator {
    fn expected_false_positives(
        &mut self,
        targets: &FnvHashSet<String>,
        decoys: &FnvHashSet<String>,
    ) -> Result<Option<f64>, Error>;
}

/// Convert the estimator's expected false positive count into pi0,
/// `falsePositives / |targetProteins|`. Estimates outside (0, 1) carry no
/// usable information and reset to 1.0, as does estimator failure.
pub fn protein_fdr_pi0(
    estimator: &mut dyn ProteinFdrEstimator,
    targets: &FnvHashSet<String>,
    decoys: &FnvHashSet<String>,
) -> Result<f64, Error> {
    match estimator.expected_false_positives(targets, decoys)? {
        Some(false_positives) => {
            let pi0 = false_positives / targets.len() as f64;
            if pi0 <= 0.0 || pi0 >= 1.0 {
                Ok(1.0)
            } else {
                log::info!(
                    "estimated protein-level pi0 {:.4} from {:.1} expected false positives",
                    pi0,
                    false_positives
                );
                Ok(pi0)
            }
        }
        None => {
            log::warn!("protein FDR estimation failed; keeping pi0 = 1.0");
            Ok(1.0)
        }
    }
}
