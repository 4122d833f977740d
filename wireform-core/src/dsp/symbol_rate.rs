//! Symbol-rate recovery from run-length statistics.
//!
//! The demodulated stream is binarized against a provisional center and
//! the multiset of same-value run lengths is clustered with a 10 %
//! tolerance; the bit length is the approximate greatest common divisor
//! of the dominant cluster centroids. Pure noise produces runs of one or
//! two samples, the candidate collapses below 2, and the estimator
//! reports failure.

use std::f32::consts::FRAC_PI_2;

use crate::dsp::segment::Plateau;

/// Relative tolerance when matching run lengths to candidate multiples.
const RUN_TOLERANCE: f64 = 0.10;
/// Largest divisor tried when deriving candidates from cluster centroids.
const MAX_DIVISOR: usize = 3;

/// Robust midpoint of the plateau samples, used to binarize the stream
/// before the real center is known.
pub fn provisional_center(stream: &[f32], plateaus: &[Plateau]) -> f32 {
    let mut samples: Vec<f32> = Vec::new();
    for p in plateaus {
        let end = p.end.min(stream.len());
        if end > p.start {
            samples.extend_from_slice(&stream[p.start..end]);
        }
    }
    if samples.is_empty() {
        return 0.0;
    }
    samples.sort_by(|a, b| a.partial_cmp(b).expect("finite samples"));
    let lo = samples[((samples.len() - 1) as f32 * 0.05).round() as usize];
    let hi = samples[((samples.len() - 1) as f32 * 0.95).round() as usize];
    (lo + hi) / 2.0
}

/// Lengths of same-value runs of the binarized stream, per plateau.
/// The first and last run of each plateau are dropped as truncated.
pub fn binary_runs(stream: &[f32], center: f32, plateaus: &[Plateau]) -> Vec<usize> {
    let mut runs = Vec::new();
    for p in plateaus {
        let end = p.end.min(stream.len());
        if end <= p.start {
            continue;
        }
        let quantized: Vec<bool> = stream[p.start..end].iter().map(|&v| v > center).collect();
        let mut plateau_runs = Vec::new();
        let mut run = 1usize;
        for w in quantized.windows(2) {
            if w[0] == w[1] {
                run += 1;
            } else {
                plateau_runs.push(run);
                run = 1;
            }
        }
        plateau_runs.push(run);
        if plateau_runs.len() > 2 {
            runs.extend_from_slice(&plateau_runs[1..plateau_runs.len() - 1]);
        }
    }
    runs
}

/// Distances between phase-step spikes, the run statistic for PSK where
/// symbol boundaries show as isolated jumps in the phase derivative.
pub fn spike_distances(frequency: &[f32], plateaus: &[Plateau]) -> Vec<usize> {
    let mut distances = Vec::new();
    for p in plateaus {
        let end = p.end.min(frequency.len());
        if end <= p.start {
            continue;
        }
        let mut last: Option<usize> = None;
        for (n, &f) in frequency[p.start..end].iter().enumerate() {
            if f.abs() > FRAC_PI_2 {
                if let Some(prev) = last {
                    if n - prev > 1 {
                        distances.push(n - prev);
                    }
                }
                last = Some(n);
            }
        }
    }
    distances
}

/// Estimate the samples-per-symbol from run lengths.
///
/// Returns `None` when the approximate GCD of the dominant run-length
/// clusters rounds below 2, which is the failure mode for noise-only
/// input. `hint` (from the spectral period estimate) breaks ties between
/// candidates covering the same run population.
pub fn estimate_bit_length(runs: &[usize], hint: Option<f32>) -> Option<usize> {
    if runs.is_empty() {
        return None;
    }

    // cluster sorted run lengths within tolerance of the running centroid
    let mut sorted = runs.to_vec();
    sorted.sort_unstable();
    let mut clusters: Vec<(f64, usize)> = Vec::new();
    for &r in &sorted {
        match clusters.last_mut() {
            Some((centroid, count)) if (r as f64) <= *centroid * (1.0 + RUN_TOLERANCE) + 1.0 => {
                *centroid = (*centroid * *count as f64 + r as f64) / (*count + 1) as f64;
                *count += 1;
            }
            _ => clusters.push((r as f64, 1)),
        }
    }

    // runs dominated by one- and two-sample stretches are noise, not symbols
    let dominant = clusters
        .iter()
        .max_by_key(|&&(_, count)| count)
        .map(|&(centroid, _)| centroid)
        .unwrap_or(0.0);
    if dominant < 2.0 {
        return None;
    }

    let mut best: Option<(usize, f64)> = None; // (weight, candidate)
    for &(centroid, _) in &clusters {
        for divisor in 1..=MAX_DIVISOR {
            let candidate = centroid / divisor as f64;
            if candidate < 1.5 {
                continue;
            }
            let weight: usize = clusters
                .iter()
                .filter(|&&(c, _)| {
                    let k = (c / candidate).round();
                    k >= 1.0 && (c - k * candidate).abs() <= RUN_TOLERANCE * c
                })
                .map(|&(_, n)| n)
                .sum();
            let better = match best {
                None => true,
                Some((best_weight, best_candidate)) => {
                    weight > best_weight
                        || (weight == best_weight && prefer(candidate, best_candidate, hint))
                }
            };
            if better {
                best = Some((weight, candidate));
            }
        }
    }

    let (_, candidate) = best?;
    let bit_length = candidate.round() as usize;
    if bit_length < 2 {
        None
    } else {
        Some(bit_length)
    }
}

/// On equal coverage, a candidate agreeing with the spectral hint
/// (within 30 %) beats one that does not; otherwise the larger divisor
/// wins (greatest common divisor).
fn prefer(candidate: f64, incumbent: f64, hint: Option<f32>) -> bool {
    if let Some(h) = hint {
        let h = f64::from(h);
        let candidate_agrees = (candidate / h - 1.0).abs() <= 0.3;
        let incumbent_agrees = (incumbent / h - 1.0).abs() <= 0.3;
        if candidate_agrees != incumbent_agrees {
            return candidate_agrees;
        }
    }
    candidate > incumbent
}
