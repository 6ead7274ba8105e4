//! Bootstrap estimation of pi0, the proportion of truly null proteins
//! among all tested
//!
//! Storey, 2002 [https://doi.org/10.1111/1467-9868.00346]

use rand::Rng;

const NUM_LAMBDA: usize = 100;
const MAX_LAMBDA: f64 = 0.5;
const MAX_RESAMPLE: usize = 1000;

/// Default number of bootstrap rounds
pub const BOOTSTRAP_ROUNDS: usize = 100;

/// Storey-style pi0 estimate from p-values sorted in ascending order.
///
/// For 100 evenly spaced thresholds lambda in (0, 0.5], pi0(lambda) =
/// |{p >= lambda}| / (n * (1 - lambda)); candidates with pi0 <= 0 are
/// discarded. Bootstrap resampling then selects the lambda whose estimate
/// is most stable around the smallest observed pi0.
///
/// Returns `None` when no candidate survives (too good a separation
/// between targets and decoys); the caller is expected to fall back to the
/// maximum observed q-value.
pub fn estimate_pi0<R: Rng>(pvalues: &[f64], rng: &mut R) -> Option<f64> {
    estimate_pi0_with(pvalues, BOOTSTRAP_ROUNDS, rng)
}

pub fn estimate_pi0_with<R: Rng>(
    pvalues: &[f64],
    bootstrap_rounds: usize,
    rng: &mut R,
) -> Option<f64> {
    let n = pvalues.len();
    if n == 0 {
        return None;
    }

    let mut lambdas = Vec::new();
    let mut pi0s = Vec::new();
    for ix in 0..NUM_LAMBDA {
        let lambda = ((ix + 1) as f64 / NUM_LAMBDA as f64) * MAX_LAMBDA;
        let pi0 = count_at_least(pvalues, lambda) as f64 / n as f64 / (1.0 - lambda);
        if pi0 > 0.0 {
            lambdas.push(lambda);
            pi0s.push(pi0);
        }
    }
    if pi0s.is_empty() {
        return None;
    }

    let min_pi0 = pi0s.iter().fold(f64::INFINITY, |acc, &pi0| acc.min(pi0));

    // Examine which lambda level is most stable under bootstrap
    let mut mse = vec![0.0; pi0s.len()];
    let mut resample = Vec::with_capacity(n.min(MAX_RESAMPLE));
    for _ in 0..bootstrap_rounds {
        bootstrap(pvalues, &mut resample, rng);
        let m = resample.len() as f64;
        for (ix, &lambda) in lambdas.iter().enumerate() {
            let pi0_boot = count_at_least(&resample, lambda) as f64 / m / (1.0 - lambda);
            mse[ix] += (pi0_boot - min_pi0) * (pi0_boot - min_pi0);
        }
    }

    let best = mse
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(ix, _)| ix)?;

    Some(pi0s[best].clamp(0.0, 1.0))
}

/// Number of elements >= `threshold` in an ascending-sorted slice
fn count_at_least(sorted: &[f64], threshold: f64) -> usize {
    sorted.len() - sorted.partition_point(|&p| p < threshold)
}

/// Draw a resample of `input` with replacement, uniform over the input
/// indices, sorted ascending. Sample size is capped at 1000.
fn bootstrap<R: Rng>(input: &[f64], out: &mut Vec<f64>, rng: &mut R) {
    out.clear();
    let n = input.len();
    for _ in 0..n.min(MAX_RESAMPLE) {
        out.push(input[rng.gen_range(0..n)]);
    }
    out.sort_by(|a, b| a.total_cmp(b));
}
