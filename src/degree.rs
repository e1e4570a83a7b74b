//! Degree distributions: how many source symbols a generated symbol combines.
//!
//! Modeled as a capability trait so `LtCodec` can hold either implementation
//! behind a `Box<dyn DegreeDistribution>` without knowing which one it
//! got — the same shape `strata-transport` uses for its congestion-control
//! strategy objects.

use crate::prng::Prng;

/// Samples a degree in `[1, k]` and can report the closed-form PMF it
/// samples from. Each implementation owns its own [`Prng`]; `set_seed`
/// keeps that PRNG in lockstep with whatever the owning codec seeds its
/// own generator with, so an encoder and a decoder constructed with the
/// same seed draw the same degree sequence.
pub trait DegreeDistribution {
    /// Seed this distribution's internal PRNG.
    fn set_seed(&mut self, seed: u32);

    /// Tell the distribution how many source symbols (`k`) it is sampling
    /// degrees for. Must be called before the first `sample_degree`.
    fn set_input_size(&mut self, k: usize);

    /// Draw a degree in `[1, k]`.
    fn sample_degree(&mut self) -> usize;

    /// The closed-form probability mass function this distribution samples
    /// from, for `k` source symbols: `result[d - 1]` is the probability of
    /// degree `d`.
    fn expected_pmf(&self, k: usize) -> Vec<f64>;
}

/// ρ(1) = 1/k, ρ(d) = 1/(d(d-1)) for 2 ≤ d ≤ k.
#[derive(Debug, Default)]
pub struct IdealSoliton {
    prng: Prng,
    k: usize,
}

impl IdealSoliton {
    pub fn new() -> Self {
        IdealSoliton {
            prng: Prng::new(),
            k: 0,
        }
    }
}

impl DegreeDistribution for IdealSoliton {
    fn set_seed(&mut self, seed: u32) {
        self.prng.set_seed(seed);
    }

    fn set_input_size(&mut self, k: usize) {
        self.k = k;
    }

    fn sample_degree(&mut self) -> usize {
        let u = self.prng.rand_float();
        let v = 1.0 / (1.0 - u);
        if v < self.k as f64 {
            v.ceil() as usize
        } else {
            1
        }
    }

    fn expected_pmf(&self, k: usize) -> Vec<f64> {
        ideal_pmf(k)
    }
}

fn ideal_pmf(k: usize) -> Vec<f64> {
    let mut pmf = vec![0.0; k];
    if k == 0 {
        return pmf;
    }
    pmf[0] = 1.0 / k as f64;
    for d in 2..=k {
        pmf[d - 1] = 1.0 / (d as f64 * (d as f64 - 1.0));
    }
    pmf
}

/// Ideal Soliton plus a spike term tuned by `(delta, c)`, per Luby's Robust
/// Soliton construction. `delta` is the target decode-failure probability,
/// `c` a tuning constant for the spike's height and width.
///
/// Callers should choose `(delta, c)` so that `R = c * ln(k/delta) * sqrt(k)`
/// stays below `k` — a debug assertion flags violations, but release builds
/// silently clamp the spike index instead (spec's behavior for that regime
/// is implementation-defined).
#[derive(Debug)]
pub struct RobustSoliton {
    prng: Prng,
    delta: f64,
    c: f64,
    k: usize,
    cdf: Vec<f64>,
}

impl RobustSoliton {
    pub fn new(delta: f64, c: f64) -> Self {
        RobustSoliton {
            prng: Prng::new(),
            delta,
            c,
            k: 0,
            cdf: Vec::new(),
        }
    }
}

impl DegreeDistribution for RobustSoliton {
    fn set_seed(&mut self, seed: u32) {
        self.prng.set_seed(seed);
    }

    fn set_input_size(&mut self, k: usize) {
        self.k = k;
        if k > 1 {
            let r = self.c * (k as f64 / self.delta).ln() * (k as f64).sqrt();
            debug_assert!(
                r < k as f64,
                "R ({r}) should stay below k ({k}); choose a smaller c or larger delta"
            );
        }
        let pmf = self.expected_pmf(k);
        let mut cumulative = 0.0;
        self.cdf = Vec::with_capacity(k);
        for p in &pmf {
            cumulative += p;
            self.cdf.push(cumulative);
        }
    }

    fn sample_degree(&mut self) -> usize {
        let u = self.prng.rand_float();
        // Lowest index whose cumulative value >= u.
        match self.cdf.iter().position(|&cum| cum >= u) {
            Some(idx) => idx + 1,
            None => self.k,
        }
    }

    fn expected_pmf(&self, k: usize) -> Vec<f64> {
        if k == 0 {
            return Vec::new();
        }
        let mut combined = ideal_pmf(k);

        let delta = self.delta;
        let c = self.c;
        let kf = k as f64;
        let r = c * (kf / delta).ln() * kf.sqrt();
        // R may exceed k for small k / aggressive (delta, c); that regime is
        // left to the caller to avoid. Clamp so `spike` stays a valid index.
        let spike = ((kf / r).ceil() as usize).min(k.saturating_sub(1)).max(1);

        for d in 1..=spike {
            combined[d - 1] += r / (d as f64 * kf);
        }
        if spike < k {
            combined[spike] += r * (r / delta).ln() / kf;
        }

        let sum: f64 = combined.iter().sum();
        if sum > 0.0 {
            for p in &mut combined {
                *p /= sum;
            }
        }
        combined
    }
}
