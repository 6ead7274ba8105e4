//! ROC evaluation and FDR divergence scoring for the grid search.
//!
//! Both metrics are read off the ranked probability list: the partial area
//! under the ROC curve rewards early separation of targets from decoys, and
//! the divergence between estimated and empirical FDR penalizes a
//! miscalibrated model.

use super::{area, area_sq, clamp_unit};
use crate::config::ProteinConfig;
use crate::inference::RankedGroup;
use crate::protein::ProteinRegistry;
use crate::Error;

/// Cumulative (false positives, true positives) step curve
#[derive(Debug, Clone)]
pub struct RocCurve {
    pub fp: Vec<u32>,
    pub tp: Vec<u32>,
}

impl RocCurve {
    /// Accumulate decoy/target counts per ranked entry. The detailed walk
    /// stops once false positives exceed `roc_n` (further points cannot
    /// contribute to the partial area); the curve then closes with its
    /// asymptotic totals, all known decoys and targets.
    pub fn build(ranked: &[RankedGroup], registry: &ProteinRegistry, roc_n: u32) -> Self {
        let mut fp = Vec::new();
        let mut tp = Vec::new();
        let mut fp_count = 0_u32;
        let mut tp_count = 0_u32;

        for group in ranked {
            fp_count += registry.count_decoys(&group.proteins) as u32;
            tp_count += registry.count_targets(&group.proteins) as u32;
            fp.push(fp_count);
            tp.push(tp_count);
            if fp_count > roc_n {
                break;
            }
        }

        fp.push(fp_count);
        tp.push(tp_count);
        fp.push(registry.decoy_count() as u32);
        tp.push(registry.target_count() as u32);

        RocCurve { fp, tp }
    }

    /// Partial area under the curve up to `n` false positives, normalized
    /// by `n * totalTruePositives`. Requesting an operating point beyond
    /// the observed decoys is fatal: the curve never reaches it.
    pub fn partial_auc(&self, n: u32) -> Result<f64, Error> {
        let (&available, &total_tp) = match (self.fp.last(), self.tp.last()) {
            (Some(fp), Some(tp)) => (fp, tp),
            _ => (&0, &0),
        };
        if available < n {
            return Err(Error::NotEnoughDecoys {
                needed: n,
                available,
            });
        }

        let mut auc = 0.0;
        for k in 1..self.fp.len() {
            let (x1, x2) = (self.fp[k - 1], self.fp[k]);
            if x1 >= n {
                break;
            }
            if x1 != x2 {
                auc += area(
                    x1 as f64,
                    self.tp[k - 1] as f64,
                    x2 as f64,
                    self.tp[k] as f64,
                    n as f64,
                );
            }
        }
        Ok(auc / (n as f64 * total_tp as f64))
    }
}

/// Estimated and empirical FDR along the ranking, plus the (possibly
/// widened) ROC operating point observed while building them
#[derive(Debug, Clone)]
pub struct FdrCurves {
    pub estimated: Vec<f64>,
    pub empirical: Vec<f64>,
    pub roc_n: u32,
}

/// Walk the ranked list accumulating the estimated FDR (cumulative mean of
/// model probabilities over targets) and the empirical, decoy-based FDR.
///
/// Both curves are monotonized forward by running maximum: a worse rank can
/// never claim a lower FDR. While estimated FDR sits below the secondary
/// `roc_threshold`, the ROC operating point is widened to the false
/// positive count seen so far, clamped to [50, 1000]. The walk stops after
/// the first point whose estimated FDR exceeds the primary `threshold`.
pub fn fdr_curves(
    ranked: &[RankedGroup],
    registry: &ProteinRegistry,
    pi0: f64,
    config: &ProteinConfig,
    roc_n: u32,
) -> FdrCurves {
    let ratio = registry.target_count() as f64 / registry.decoy_count() as f64;

    let mut estimated = Vec::new();
    let mut empirical = Vec::new();
    let mut roc_n = roc_n;
    let mut fp_count = 0.0_f64;
    let mut tp_count = 0.0_f64;
    let mut total_fdr = 0.0;
    let mut est_fdr = 0.0;
    let mut emp_fdr = 0.0;
    let mut prev_est = 0.0;
    let mut prev_emp = 0.0;

    'walk: for group in ranked {
        if config.ties_as_one {
            let fp_change = registry.count_decoys(&group.proteins) as f64;
            let tp_change = registry.count_targets(&group.proteins) as f64;
            fp_count += fp_change;
            tp_count += tp_change;

            total_fdr += group.pep * tp_change;
            est_fdr = if tp_count > 0.0 {
                clamp_unit(total_fdr / tp_count)
            } else {
                1.0
            };
            if tp_count > 0.0 {
                emp_fdr = clamp_unit(fp_count * pi0 * ratio / tp_count);
            }

            est_fdr = est_fdr.max(prev_est);
            prev_est = est_fdr;
            emp_fdr = emp_fdr.max(prev_emp);
            prev_emp = emp_fdr;

            if est_fdr <= config.roc_threshold && config.update_roc_n() {
                roc_n = roc_n.max((fp_count as u32).clamp(50, 1000));
            }

            estimated.push(est_fdr);
            empirical.push(emp_fdr);

            if est_fdr > config.threshold {
                break;
            }
        } else {
            for name in &group.proteins {
                if registry.is_decoy(name) {
                    fp_count += 1.0;
                    // A decoy re-emits the previous estimated FDR
                } else {
                    tp_count += 1.0;
                    total_fdr += group.pep;
                    est_fdr = clamp_unit(total_fdr / tp_count);
                }
                if tp_count > 0.0 {
                    emp_fdr = clamp_unit(fp_count * pi0 * ratio / tp_count);
                }

                est_fdr = est_fdr.max(prev_est);
                prev_est = est_fdr;
                emp_fdr = emp_fdr.max(prev_emp);
                prev_emp = emp_fdr;

                if est_fdr <= config.roc_threshold && config.update_roc_n() {
                    roc_n = roc_n.max((fp_count as u32).clamp(50, 1000));
                }

                estimated.push(est_fdr);
                empirical.push(emp_fdr);

                if est_fdr > config.threshold {
                    break 'walk;
                }
            }
        }
    }

    if config.update_roc_n() {
        log::trace!("ROC operating point after FDR walk: {}", roc_n);
    }

    FdrCurves {
        estimated,
        empirical,
        roc_n,
    }
}

/// Divergence between the estimated and empirical FDR curves over the
/// domain where estimated FDR stays below `threshold`: the integral of the
/// pointwise difference (absolute-linear in conservative mode, squared
/// otherwise), normalized by the covered x-range. Positive infinity when
/// even the first point exceeds the threshold, so the curves are not
/// comparable at all.
pub fn fdr_divergence(
    estimated: &[f64],
    empirical: &[f64],
    threshold: f64,
    conservative: bool,
) -> f64 {
    debug_assert_eq!(estimated.len(), empirical.len());
    if estimated.is_empty() {
        return 0.0;
    }
    if estimated[0] >= threshold {
        return f64::INFINITY;
    }

    let mut total = 0.0;
    let mut k = 0;
    while k + 1 < estimated.len() {
        if estimated[k] >= threshold {
            break;
        }
        let diff_lo = estimated[k] - empirical[k];
        let diff_hi = estimated[k + 1] - empirical[k + 1];
        if conservative {
            total += area(
                estimated[k],
                diff_lo,
                estimated[k + 1],
                diff_hi,
                estimated[k + 1],
            )
            .abs();
        } else {
            total += area_sq(
                estimated[k],
                diff_lo,
                estimated[k + 1],
                diff_hi,
                estimated[k + 1],
            );
        }
        k += 1;
    }

    let x_range = threshold.min(estimated[k]) - estimated[0];
    if x_range > 0.0 {
        total / x_range
    } else {
        0.0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::protein::PsmRecord;

    fn registry(names: &[&str]) -> ProteinRegistry {
        let psms = names
            .iter()
            .map(|name| PsmRecord {
                peptide: format!("PEPTIDE_{}", name),
                decoy: name.starts_with("rev_"),
                proteins: vec![name.to_string()],
                pep: 0.0,
                q: 0.0,
                p: 0.0,
            })
            .collect::<Vec<_>>();
        ProteinRegistry::from_psms(&psms)
    }

    fn singletons(entries: &[(f64, &str)]) -> Vec<RankedGroup> {
        entries
            .iter()
            .map(|(pep, name)| RankedGroup {
                pep: *pep,
                proteins: vec![name.to_string()],
            })
            .collect()
    }

    #[test]
    fn two_point_curve_partial_auc() {
        let curve = RocCurve {
            fp: vec![0, 10],
            tp: vec![0, 5],
        };
        // area(0,0,10,5,10) / (10 * 5) = 25 / 50
        assert!((curve.partial_auc(10).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn partial_auc_beyond_observed_decoys_is_fatal() {
        let curve = RocCurve {
            fp: vec![0, 3],
            tp: vec![0, 5],
        };
        match curve.partial_auc(10) {
            Err(Error::NotEnoughDecoys { needed, available }) => {
                assert_eq!(needed, 10);
                assert_eq!(available, 3);
            }
            other => panic!("expected NotEnoughDecoys, got {:?}", other),
        }
    }

    #[test]
    fn build_appends_asymptotic_totals() {
        let registry = registry(&["P1", "P2", "rev_P1"]);
        let ranked = singletons(&[(0.01, "P1"), (0.02, "rev_P1"), (0.9, "P2")]);
        let curve = RocCurve::build(&ranked, &registry, 50);
        assert_eq!(curve.fp, vec![0, 1, 1, 1, 1]);
        assert_eq!(curve.tp, vec![1, 1, 2, 2, 2]);
    }

    #[test]
    fn build_stops_once_past_operating_point() {
        let registry = registry(&["rev_P1", "rev_P2", "P1"]);
        let ranked = singletons(&[(0.1, "rev_P1"), (0.2, "rev_P2"), (0.3, "P1")]);
        let curve = RocCurve::build(&ranked, &registry, 1);
        // Walk stops after fp exceeds 1, then repeats the point and closes
        // with the totals
        assert_eq!(curve.fp, vec![1, 2, 2, 2]);
        assert_eq!(curve.tp, vec![0, 0, 0, 1]);
    }

    #[test]
    fn fdr_curves_are_nondecreasing_by_rank() {
        let registry = registry(&["P1", "P2", "P3", "rev_P1", "rev_P2"]);
        let ranked = singletons(&[
            (0.001, "P1"),
            (0.01, "P2"),
            (0.02, "rev_P1"),
            (0.03, "P3"),
            (0.5, "rev_P2"),
        ]);
        let config = ProteinConfig {
            threshold: 1.0,
            ..Default::default()
        };
        let curves = fdr_curves(&ranked, &registry, 1.0, &config, 50);
        assert_eq!(curves.estimated.len(), curves.empirical.len());
        assert!(curves.estimated.windows(2).all(|w| w[0] <= w[1]));
        assert!(curves.empirical.windows(2).all(|w| w[0] <= w[1]));
        assert!(curves
            .estimated
            .iter()
            .chain(curves.empirical.iter())
            .all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn fdr_walk_stops_past_primary_threshold() {
        let registry = registry(&["P1", "P2", "P3"]);
        let ranked = singletons(&[(0.01, "P1"), (0.5, "P2"), (0.9, "P3")]);
        let config = ProteinConfig {
            threshold: 0.10,
            ..Default::default()
        };
        let curves = fdr_curves(&ranked, &registry, 1.0, &config, 50);
        // The entry crossing the threshold is stored, nothing after it
        assert_eq!(curves.estimated.len(), 2);
        assert!(curves.estimated[1] > 0.10);
    }

    #[test]
    fn divergence_zero_for_identical_curves() {
        let est = vec![0.01, 0.02, 0.05];
        let div = fdr_divergence(&est, &est, 0.10, false);
        assert_eq!(div, 0.0);
        let div = fdr_divergence(&est, &est, 0.10, true);
        assert_eq!(div, 0.0);
    }

    #[test]
    fn divergence_infinite_when_first_point_exceeds_threshold() {
        let est = vec![0.5, 0.6];
        let emp = vec![0.0, 0.0];
        assert_eq!(fdr_divergence(&est, &emp, 0.10, false), f64::INFINITY);
        // The walk may have stored a single point before stopping
        assert_eq!(fdr_divergence(&[1.0], &[0.0], 0.10, false), f64::INFINITY);
    }

    #[test]
    fn divergence_integrates_constant_gap() {
        // est - emp = 0.1 everywhere, est spans [0.0, 0.05]
        let est = vec![0.0, 0.05];
        let emp = vec![-0.1, -0.05];
        // squared: 0.01 * 0.05 / 0.05 = 0.01
        assert!((fdr_divergence(&est, &emp, 0.10, false) - 0.01).abs() < 1e-12);
        // conservative: |0.1 * 0.05| / 0.05 = 0.1
        assert!((fdr_divergence(&est, &emp, 0.10, true) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn roc_operating_point_widens_below_secondary_threshold() {
        let names = (0..120)
            .map(|ix| format!("rev_P{}", ix))
            .chain((0..10).map(|ix| format!("P{}", ix)))
            .collect::<Vec<_>>();
        let refs = names.iter().map(|s| s.as_str()).collect::<Vec<_>>();
        let registry = registry(&refs);

        // Ten confident targets, then a sea of decoys at negligible pep so
        // the estimated FDR stays under the secondary threshold
        let mut entries = (0..10)
            .map(|ix| (1e-6 * (ix + 1) as f64, format!("P{}", ix)))
            .collect::<Vec<_>>();
        entries.extend((0..120).map(|ix| (1e-4 + 1e-6 * ix as f64, format!("rev_P{}", ix))));
        let ranked = entries
            .iter()
            .map(|(pep, name)| RankedGroup {
                pep: *pep,
                proteins: vec![name.clone()],
            })
            .collect::<Vec<_>>();

        let config = ProteinConfig::default();
        let curves = fdr_curves(&ranked, &registry, 1.0, &config, config.initial_roc_n());
        assert!(curves.roc_n > 50, "roc_n = {}", curves.roc_n);
        assert!(curves.roc_n <= 120);
    }
}
