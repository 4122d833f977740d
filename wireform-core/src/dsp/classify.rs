//! Modulation classification from dispersion features.
//!
//! Three per-plateau features discriminate the modulation classes:
//! the coefficient of variation of the envelope (ASK keys the envelope),
//! the dispersion of the median-filtered instantaneous frequency (FSK
//! keys the tone), and the dispersion of the raw per-sample phase steps
//! (PSK concentrates its energy in abrupt steps that the median filter
//! removes). Each score is normalized by the matching dispersion of the
//! noise-only regions so the three are comparable.

use crate::config::EstimatorConfig;
use crate::dsp::segment::Plateau;
use crate::params::Modulation;

/// Coefficient of variation of a Rayleigh-distributed envelope.
const RAYLEIGH_CV: f32 = 0.52;
/// Dispersion of median-filtered uniform phase steps.
const MEDFILT_STEP_SIGMA: f32 = 1.19;
/// Dispersion of raw uniform phase steps on `(-pi, pi]`.
const UNIFORM_STEP_SIGMA: f32 = 1.814;
/// Noise regions shorter than this fall back to the analytic dispersions.
const MIN_BASELINE_SAMPLES: usize = 256;

/// Normalized dispersion scores, one per modulation hypothesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispersionScores {
    pub ask: f32,
    pub fsk: f32,
    pub psk: f32,
}

/// Decide the modulation of a capture from its plateaus.
///
/// Candidates within `classify_margin` of the best score resolve in the
/// fixed order FSK, ASK, PSK; an all-tied (ambiguous) capture therefore
/// defaults to FSK.
pub fn classify(
    magnitude: &[f32],
    frequency: &[f32],
    plateaus: &[Plateau],
    cfg: &EstimatorConfig,
) -> (Modulation, DispersionScores) {
    let mut cv_scores = Vec::with_capacity(plateaus.len());
    let mut filtered_scores = Vec::with_capacity(plateaus.len());
    let mut step_scores = Vec::with_capacity(plateaus.len());

    for plateau in plateaus {
        let mag = &magnitude[plateau.start..plateau.end.min(magnitude.len())];
        if mag.is_empty() {
            continue;
        }
        let strong_level = 0.5 * percentile(mag, 0.95);

        let mean = mean(mag);
        if mean > 0.0 {
            cv_scores.push(std_dev(mag) / mean);
        }

        let freq_end = plateau.end.min(frequency.len());
        if freq_end > plateau.start {
            let freq = &frequency[plateau.start..freq_end];
            // keep only steps whose flanking samples carry signal energy
            let strong: Vec<f32> = freq
                .iter()
                .enumerate()
                .filter(|&(k, _)| {
                    mag[k] >= strong_level && mag.get(k + 1).map_or(true, |&m| m >= strong_level)
                })
                .map(|(_, &f)| f)
                .collect();
            if strong.len() >= 8 {
                filtered_scores.push(std_dev(&median_filter(&strong, 5)));
                step_scores.push(std_dev(&strong));
            }
        }
    }

    let baseline = noise_baseline(magnitude, frequency, plateaus);
    let scores = DispersionScores {
        ask: median(&cv_scores) / baseline.0,
        fsk: median(&filtered_scores) / baseline.1,
        psk: median(&step_scores) / baseline.2,
    };

    let ranked = [
        (Modulation::Fsk, scores.fsk),
        (Modulation::Ask, scores.ask),
        (Modulation::Psk, scores.psk),
    ];
    let best = ranked.iter().fold(0.0f32, |acc, &(_, s)| acc.max(s));
    let decision = ranked
        .iter()
        .find(|&&(_, s)| s >= best * (1.0 - cfg.classify_margin))
        .map(|&(m, _)| m)
        .unwrap_or(Modulation::Fsk);
    (decision, scores)
}

/// Dispersions of the inter-plateau gaps, used to normalize the scores.
/// Falls back to analytic values when the capture has no usable silence.
fn noise_baseline(magnitude: &[f32], frequency: &[f32], plateaus: &[Plateau]) -> (f32, f32, f32) {
    let mut gap_mag: Vec<f32> = Vec::new();
    let mut gap_freq: Vec<f32> = Vec::new();
    let mut cursor = 0usize;
    for plateau in plateaus {
        let gap_end = plateau.start.min(magnitude.len());
        if gap_end > cursor {
            gap_mag.extend_from_slice(&magnitude[cursor..gap_end]);
            let freq_end = gap_end.min(frequency.len());
            if freq_end > cursor {
                gap_freq.extend_from_slice(&frequency[cursor..freq_end]);
            }
        }
        cursor = plateau.end;
    }
    if cursor < magnitude.len() {
        gap_mag.extend_from_slice(&magnitude[cursor..]);
        gap_freq.extend_from_slice(&frequency[cursor.min(frequency.len())..]);
    }

    if gap_mag.len() < MIN_BASELINE_SAMPLES || gap_freq.len() < MIN_BASELINE_SAMPLES {
        return (RAYLEIGH_CV, MEDFILT_STEP_SIGMA, UNIFORM_STEP_SIGMA);
    }
    let mag_mean = mean(&gap_mag);
    let cv = if mag_mean > 0.0 {
        std_dev(&gap_mag) / mag_mean
    } else {
        RAYLEIGH_CV
    };
    (
        cv.max(0.25 * RAYLEIGH_CV),
        std_dev(&median_filter(&gap_freq, 5)).max(0.25 * MEDFILT_STEP_SIGMA),
        std_dev(&gap_freq).max(0.25 * UNIFORM_STEP_SIGMA),
    )
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

fn std_dev(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|&v| (v - m) * (v - m)).sum::<f32>() / values.len() as f32;
    var.sqrt()
}

fn median(values: &[f32]) -> f32 {
    percentile(values, 0.5)
}

fn percentile(values: &[f32], q: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("finite samples"));
    let index = ((sorted.len() - 1) as f32 * q).round() as usize;
    sorted[index]
}

fn median_filter(values: &[f32], order: usize) -> Vec<f32> {
    let half = order / 2;
    (0..values.len())
        .map(|n| {
            let lo = n.saturating_sub(half);
            let hi = (n + half + 1).min(values.len());
            percentile(&values[lo..hi], 0.5)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plateau(start: usize, end: usize) -> Plateau {
        Plateau {
            start,
            end,
            pause: 0,
        }
    }

    fn cfg() -> EstimatorConfig {
        EstimatorConfig::default()
    }

    #[test]
    fn keyed_envelope_classifies_as_ask() {
        // on-off envelope, flat frequency while on
        let mut magnitude = vec![0.001f32; 300];
        for k in 0..1200 {
            magnitude.push(if (k / 100) % 2 == 0 { 1.0 } else { 0.2 });
        }
        magnitude.extend(vec![0.001f32; 300]);
        let frequency = vec![0.0f32; magnitude.len() - 1];
        let (decision, scores) = classify(&magnitude, &frequency, &[plateau(300, 1500)], &cfg());
        assert_eq!(decision, Modulation::Ask);
        assert!(scores.ask > scores.fsk);
    }

    #[test]
    fn keyed_frequency_classifies_as_fsk() {
        let mut magnitude = vec![0.001f32; 300];
        magnitude.extend(vec![1.0f32; 1200]);
        magnitude.extend(vec![0.001f32; 300]);
        let mut frequency = vec![0.0f32; magnitude.len() - 1];
        for (k, f) in frequency.iter_mut().enumerate().take(1500).skip(300) {
            *f = if ((k - 300) / 100) % 2 == 0 { 0.5 } else { -0.5 };
        }
        let (decision, scores) = classify(&magnitude, &frequency, &[plateau(300, 1500)], &cfg());
        assert_eq!(decision, Modulation::Fsk);
        assert!(scores.fsk > scores.ask);
    }

    #[test]
    fn isolated_phase_steps_classify_as_psk() {
        let mut magnitude = vec![0.001f32; 300];
        magnitude.extend(vec![1.0f32; 1200]);
        magnitude.extend(vec![0.001f32; 300]);
        let mut frequency = vec![0.0f32; magnitude.len() - 1];
        // a pi step every 100 samples, one sample wide
        for k in (399..1500).step_by(100) {
            frequency[k] = std::f32::consts::PI;
        }
        let (decision, scores) = classify(&magnitude, &frequency, &[plateau(300, 1500)], &cfg());
        assert_eq!(decision, Modulation::Psk);
        assert!(scores.psk > scores.fsk);
    }
}
