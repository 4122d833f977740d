//! Noise-floor estimation.
//!
//! Windows are ranked by their mean magnitude and the quietest quantile
//! is taken as pure noise; the floor is the strongest sample seen inside
//! those windows, plus headroom. Anchoring the floor at the top of the
//! noise distribution (rather than its mean) guarantees that silence
//! stays below the segmenter's falling threshold. The ranking by window
//! mean is robust against long active regions dominating the capture
//! and needs no prior segmentation.

use crate::config::EstimatorConfig;

/// Margin above the strongest noise sample. Large enough that the
/// segmenter's rising threshold sits beyond the reach of noise spikes
/// even on captures of millions of samples.
const HEADROOM: f32 = 1.5;

/// Noise floor plus the strongest magnitude of the capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseEstimate {
    /// Noise floor, clamped away from zero.
    pub floor: f32,
    /// Largest magnitude sample; a floor close to it means the capture
    /// holds no signal.
    pub peak: f32,
}

impl NoiseEstimate {
    /// A capture is noise-dominated when the floor reaches 95 % of the
    /// maximum magnitude.
    pub fn is_noise_dominated(&self) -> bool {
        self.floor >= 0.95 * self.peak
    }
}

/// Estimate the noise floor from the magnitude envelope.
pub fn estimate_noise(magnitude: &[f32], cfg: &EstimatorConfig) -> NoiseEstimate {
    if magnitude.is_empty() {
        return NoiseEstimate {
            floor: cfg.noise_floor_min,
            peak: 0.0,
        };
    }
    let window = cfg.noise_window.max(1);
    let mut stats: Vec<(f32, f32)> = magnitude
        .chunks(window)
        .map(|chunk| {
            let mean = chunk.iter().sum::<f32>() / chunk.len() as f32;
            let max = chunk.iter().fold(0.0f32, |acc, &m| acc.max(m));
            (mean, max)
        })
        .collect();
    stats.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("window means are finite"));

    let peak = stats.iter().fold(0.0f32, |acc, &(_, max)| acc.max(max));
    let quiet_count = (((stats.len() as f32) * cfg.noise_quantile).round() as usize)
        .clamp(1, stats.len());
    let quiet_max = stats[..quiet_count]
        .iter()
        .fold(0.0f32, |acc, &(_, max)| acc.max(max));

    NoiseEstimate {
        floor: (HEADROOM * quiet_max).max(cfg.noise_floor_min),
        peak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_tracks_the_quiet_windows() {
        let cfg = EstimatorConfig::default();
        // 1/4 quiet at 0.01, 3/4 active at 1.0
        let mut magnitude = vec![0.01f32; 16 * cfg.noise_window];
        magnitude.extend(vec![1.0f32; 48 * cfg.noise_window]);
        let estimate = estimate_noise(&magnitude, &cfg);
        assert!((estimate.floor - 0.015).abs() < 1e-6);
        assert_eq!(estimate.peak, 1.0);
        assert!(!estimate.is_noise_dominated());
    }

    #[test]
    fn floor_is_clamped() {
        let cfg = EstimatorConfig::default();
        let estimate = estimate_noise(&vec![0.0f32; 4096], &cfg);
        assert_eq!(estimate.floor, cfg.noise_floor_min);
    }

    #[test]
    fn flat_capture_is_noise_dominated() {
        let cfg = EstimatorConfig::default();
        let estimate = estimate_noise(&vec![0.5f32; 4096], &cfg);
        assert!(estimate.is_noise_dominated());
    }

    #[test]
    fn silence_stays_below_the_falling_threshold() {
        let cfg = EstimatorConfig::default();
        // constant silence must end up strictly under floor * (1 - h_out)
        let mut magnitude = vec![0.004f32; 32 * cfg.noise_window];
        magnitude.extend(vec![0.8f32; 32 * cfg.noise_window]);
        let estimate = estimate_noise(&magnitude, &cfg);
        assert!(0.004 < estimate.floor * (1.0 - cfg.hysteresis_out));
        assert!(0.8 > estimate.floor * (1.0 + cfg.hysteresis_in));
    }
}
