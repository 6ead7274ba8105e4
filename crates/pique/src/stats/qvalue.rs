//! Protein-level q-values from posterior error probabilities, and their
//! empirical (decoy-based) counterparts
//!
//! Käll, 2008 [https://pubmed.ncbi.nlm.nih.gov/18052118/]
//! Serang, 2010 [https://pubmed.ncbi.nlm.nih.gov/20712337/]

use super::{clamp_unit, cummin_from_worst};
use crate::inference::RankedGroup;
use crate::protein::ProteinRegistry;

/// Per-rank statistics published onto the registry after the final pass.
/// Layout matches the tie mode that produced it: one slot per ranked entry
/// with ties as one protein, one slot per protein name otherwise.
#[derive(Debug, Clone, Default)]
pub struct RankStatistics {
    pub q: Vec<f64>,
    pub q_emp: Vec<f64>,
    pub p: Vec<f64>,
}

fn running_mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        // No targets seen yet: no statistical confidence
        return 1.0;
    }
    clamp_unit(sum / count as f64)
}

/// Model-based q-values: the cumulative mean of posterior error
/// probabilities over target proteins, walked in ascending-probability
/// order and monotonized from the worst rank back to the best.
///
/// # Invariants
/// * `ranked` must be sorted by ascending `pep` (best entry first)
pub fn qvalues(ranked: &[RankedGroup], registry: &ProteinRegistry, ties_as_one: bool) -> Vec<f64> {
    let mut qvalues = Vec::with_capacity(ranked.len());
    let mut sum = 0.0;
    let mut count = 0_usize;

    for group in ranked {
        if ties_as_one {
            let targets = registry.count_targets(&group.proteins);
            sum += group.pep * targets as f64;
            count += targets;
            qvalues.push(running_mean(sum, count));
        } else {
            for name in &group.proteins {
                if !registry.is_decoy(name) {
                    sum += group.pep;
                    count += 1;
                }
                qvalues.push(running_mean(sum, count));
            }
        }
    }

    cummin_from_worst(&mut qvalues);
    qvalues
}

/// Decoy-based q-values and p-values over the same walk.
///
/// Per rank, the empirical q-value is
/// `decoys * pi0 * (targetProteins / decoyProteins) / targets`, zero while
/// no target has been seen, clamped to [0, 1] and monotonized like
/// [`qvalues`]. The p-value is the continuity-corrected empirical CDF under
/// the decoy null: `decoys / D` when the step contains a decoy, else
/// `(decoys + 1) / (D + 1)`.
pub fn empirical_qvalues(
    ranked: &[RankedGroup],
    registry: &ProteinRegistry,
    pi0: f64,
    ties_as_one: bool,
) -> (Vec<f64>, Vec<f64>) {
    let total_decoys = registry.decoy_count() as f64;
    let ratio = registry.target_count() as f64 / total_decoys;

    let mut q_emp = Vec::with_capacity(ranked.len());
    let mut pvalues = Vec::with_capacity(ranked.len());
    let mut decoys = 0_usize;
    let mut targets = 0_usize;
    let mut qvalue = 0.0;

    for group in ranked {
        if ties_as_one {
            let decoy_change = registry.count_decoys(&group.proteins);
            let target_change = registry.count_targets(&group.proteins);
            decoys += decoy_change;
            targets += target_change;

            if targets > 0 {
                qvalue = clamp_unit(decoys as f64 * pi0 * ratio / targets as f64);
            }
            q_emp.push(qvalue);

            if decoy_change > 0 {
                pvalues.push(decoys as f64 / total_decoys);
            } else {
                pvalues.push((decoys as f64 + 1.0) / (total_decoys + 1.0));
            }
        } else {
            for name in &group.proteins {
                if registry.is_decoy(name) {
                    decoys += 1;
                    pvalues.push(decoys as f64 / total_decoys);
                } else {
                    targets += 1;
                    pvalues.push((decoys as f64 + 1.0) / (total_decoys + 1.0));
                }

                if targets > 0 {
                    qvalue = clamp_unit(decoys as f64 * pi0 * ratio / targets as f64);
                }
                q_emp.push(qvalue);
            }
        }
    }

    cummin_from_worst(&mut q_emp);
    (q_emp, pvalues)
}

/// P-values of target proteins under the decoy null, the input to the pi0
/// bootstrap. Proteins are visited per rank; records sharing one
/// probability form a tie block, and each target in a block is assigned the
/// decoy count before the block plus a mid-rank share of the decoys inside
/// it. Output is ascending by construction.
pub fn target_pvalues(ranked: &[RankedGroup], registry: &ProteinRegistry) -> Vec<f64> {
    let mut pvalues = Vec::new();
    let mut decoys = 0_usize;
    let mut block_targets = 0_usize;
    let mut block_decoys = 0_usize;
    let mut prev: Option<f64> = None;

    for group in ranked {
        for name in &group.proteins {
            if prev != Some(group.pep) {
                flush_block(&mut pvalues, decoys, block_targets, block_decoys);
                decoys += block_decoys;
                block_targets = 0;
                block_decoys = 0;
                prev = Some(group.pep);
            }
            if registry.is_decoy(name) {
                block_decoys += 1;
            } else {
                block_targets += 1;
            }
        }
    }
    flush_block(&mut pvalues, decoys, block_targets, block_decoys);
    decoys += block_decoys;

    let n = decoys as f64;
    for p in pvalues.iter_mut() {
        *p /= n;
    }
    pvalues
}

fn flush_block(pvalues: &mut Vec<f64>, decoys_before: usize, targets: usize, decoys: usize) {
    for ix in 0..targets {
        pvalues.push(
            decoys_before as f64
                + (decoys as f64 / (targets as f64 + 1.0)) * (ix as f64 + 1.0),
        );
    }
}
