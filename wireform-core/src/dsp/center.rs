//! Decision-center and tolerance estimation.

use crate::config::EstimatorConfig;
use crate::dsp::segment::Plateau;

/// The two level centroids of the demodulated stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clusters {
    pub low: f32,
    pub high: f32,
}

/// Two-means clustering over the plateau samples of the demod stream.
///
/// Returns `None` when the stream is degenerate or when either cluster
/// holds less than `min_cluster_fraction` of the samples, in which case
/// the estimator fails.
pub fn two_means(stream: &[f32], plateaus: &[Plateau], cfg: &EstimatorConfig) -> Option<Clusters> {
    let mut samples: Vec<f32> = Vec::new();
    for p in plateaus {
        let end = p.end.min(stream.len());
        if end > p.start {
            samples.extend_from_slice(&stream[p.start..end]);
        }
    }
    if samples.len() < 4 {
        return None;
    }

    let mut sorted = samples.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("finite samples"));
    let mut low = sorted[((sorted.len() - 1) as f32 * 0.10).round() as usize];
    let mut high = sorted[((sorted.len() - 1) as f32 * 0.90).round() as usize];
    if (high - low).abs() < cfg.cluster_epsilon {
        return None;
    }

    let mut low_count = 0usize;
    for _ in 0..64 {
        let split = (low + high) / 2.0;
        let mut low_sum = 0.0f64;
        let mut high_sum = 0.0f64;
        let mut high_count = 0usize;
        low_count = 0;
        for &v in &samples {
            if v <= split {
                low_sum += f64::from(v);
                low_count += 1;
            } else {
                high_sum += f64::from(v);
                high_count += 1;
            }
        }
        if low_count == 0 || high_count == 0 {
            return None;
        }
        let new_low = (low_sum / low_count as f64) as f32;
        let new_high = (high_sum / high_count as f64) as f32;
        let moved = (new_low - low).abs().max((new_high - high).abs());
        low = new_low;
        high = new_high;
        if moved < cfg.cluster_epsilon {
            break;
        }
    }

    let low_fraction = low_count as f32 / samples.len() as f32;
    if low_fraction < cfg.min_cluster_fraction || 1.0 - low_fraction < cfg.min_cluster_fraction {
        return None;
    }
    Some(Clusters { low, high })
}

/// Decision threshold: the midpoint of the two centroids.
pub fn decision_center(clusters: &Clusters) -> f32 {
    (clusters.low + clusters.high) / 2.0
}

/// Timing tolerance: about 5 % of a symbol, at least one sample, and
/// always below half a symbol.
pub fn tolerance_for(bit_length: usize, cfg: &EstimatorConfig) -> usize {
    let t = ((bit_length as f32) * cfg.tolerance_fraction).round() as usize;
    t.max(1).min(bit_length.saturating_sub(1) / 2)
}
