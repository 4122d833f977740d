//! Plateau segmentation of the magnitude envelope.

use crate::config::EstimatorConfig;

/// A half-open index interval `[start, end)` identifying a candidate
/// message, plus the silence trailing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plateau {
    pub start: usize,
    pub end: usize,
    /// `start` of the next plateau minus `end` of this one; 0 for the
    /// last plateau of a capture.
    pub pause: usize,
}

impl Plateau {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Extract plateaus from the magnitude envelope.
///
/// A plateau opens at the first sample reaching `floor * (1 + h_in)` and
/// closes at the first sample below `floor * (1 - h_out)` that stays
/// below for at least `min_pause` samples. Plateaus shorter than
/// `min_plateau` are discarded as glitches.
pub fn segment(
    magnitude: &[f32],
    noise_floor: f32,
    min_pause: usize,
    cfg: &EstimatorConfig,
) -> Vec<Plateau> {
    let rise = noise_floor * (1.0 + cfg.hysteresis_in);
    let fall = noise_floor * (1.0 - cfg.hysteresis_out);
    let min_pause = min_pause.max(1);

    let mut raw: Vec<(usize, usize)> = Vec::new();
    let mut open: Option<usize> = None;
    let mut below_run = 0usize;
    let mut candidate_end = 0usize;

    for (n, &m) in magnitude.iter().enumerate() {
        match open {
            None => {
                if m >= rise {
                    open = Some(n);
                    below_run = 0;
                }
            }
            Some(start) => {
                if m < fall {
                    if below_run == 0 {
                        candidate_end = n;
                    }
                    below_run += 1;
                    if below_run >= min_pause {
                        raw.push((start, candidate_end));
                        open = None;
                        below_run = 0;
                    }
                } else {
                    below_run = 0;
                }
            }
        }
    }
    if let Some(start) = open {
        let end = if below_run > 0 {
            candidate_end
        } else {
            magnitude.len()
        };
        raw.push((start, end));
    }

    raw.retain(|&(start, end)| end - start >= cfg.min_plateau);

    let mut plateaus = Vec::with_capacity(raw.len());
    for (k, &(start, end)) in raw.iter().enumerate() {
        let pause = match raw.get(k + 1) {
            Some(&(next_start, _)) => next_start - end,
            None => 0,
        };
        plateaus.push(Plateau { start, end, pause });
    }
    plateaus
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(spans: &[(usize, f32)]) -> Vec<f32> {
        spans
            .iter()
            .flat_map(|&(len, level)| std::iter::repeat(level).take(len))
            .collect()
    }

    fn cfg() -> EstimatorConfig {
        EstimatorConfig {
            min_pause: 50,
            ..EstimatorConfig::default()
        }
    }

    #[test]
    fn finds_two_bursts_and_their_pause() {
        let magnitude = envelope(&[(100, 0.005), (200, 1.0), (300, 0.005), (150, 1.0), (80, 0.005)]);
        let plateaus = segment(&magnitude, 0.01, 50, &cfg());
        assert_eq!(plateaus.len(), 2);
        assert_eq!((plateaus[0].start, plateaus[0].end), (100, 300));
        assert_eq!(plateaus[0].pause, 300);
        assert_eq!((plateaus[1].start, plateaus[1].end), (600, 750));
        assert_eq!(plateaus[1].pause, 0);
    }

    #[test]
    fn short_dips_do_not_split_a_plateau() {
        // a 20-sample dip is shorter than min_pause
        let magnitude = envelope(&[(60, 0.005), (100, 1.0), (20, 0.001), (100, 1.0), (200, 0.005)]);
        let plateaus = segment(&magnitude, 0.01, 50, &cfg());
        assert_eq!(plateaus.len(), 1);
        assert_eq!((plateaus[0].start, plateaus[0].end), (60, 280));
    }

    #[test]
    fn glitches_are_discarded() {
        let magnitude = envelope(&[(100, 0.005), (5, 1.0), (200, 0.005)]);
        assert!(segment(&magnitude, 0.01, 50, &cfg()).is_empty());
    }

    #[test]
    fn burst_reaching_the_buffer_end_is_closed() {
        let magnitude = envelope(&[(40, 0.005), (90, 1.0)]);
        let plateaus = segment(&magnitude, 0.01, 50, &cfg());
        assert_eq!(plateaus.len(), 1);
        assert_eq!((plateaus[0].start, plateaus[0].end), (40, 130));
        assert_eq!(plateaus[0].pause, 0);
    }
}
