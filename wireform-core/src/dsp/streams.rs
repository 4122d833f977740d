//! Derived sample streams: magnitude, phase, instantaneous frequency.
//!
//! Only the streams required by the selected modulation are materialized
//! by the pipeline; each function here is a pure array transform.

use std::f32::consts::{PI, TAU};

use crate::dsp::segment::Plateau;
use crate::iq::IqFrame;

/// Wrap an angle difference onto `(-pi, pi]`.
pub fn wrap_angle(x: f32) -> f32 {
    x - TAU * (x / TAU).round()
}

/// Envelope magnitude `sqrt(I^2 + Q^2)` per sample.
pub fn magnitude(frame: &IqFrame) -> Vec<f32> {
    (0..frame.len())
        .map(|n| frame.i(n).hypot(frame.q(n)))
        .collect()
}

/// Instantaneous phase `atan2(Q, I)`, unwrapped so consecutive samples
/// never jump by more than pi.
pub fn instantaneous_phase(frame: &IqFrame) -> Vec<f32> {
    let mut phase = Vec::with_capacity(frame.len());
    let mut offset = 0.0f32;
    let mut prev_raw = 0.0f32;
    for n in 0..frame.len() {
        let raw = frame.q(n).atan2(frame.i(n));
        if n > 0 {
            let delta = raw - prev_raw;
            if delta > PI {
                offset -= TAU;
            } else if delta < -PI {
                offset += TAU;
            }
        }
        prev_raw = raw;
        phase.push(raw + offset);
    }
    phase
}

/// Instantaneous frequency: the phase derivative `phi[n+1] - phi[n]`,
/// defined on `[0, N-1)`.
pub fn instantaneous_frequency(phase: &[f32]) -> Vec<f32> {
    phase.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Per-symbol phase rotation folded to `[0, pi]`.
///
/// For sample `n` the reference is `phi[n - span]`; within the first
/// `span` samples of a plateau the reference is the plateau's first
/// sample, so the stream never reaches back into the preceding silence.
pub fn differential_phase(phase: &[f32], span: usize, plateaus: &[Plateau]) -> Vec<f32> {
    let mut reference: Vec<usize> = (0..phase.len()).map(|n| n.saturating_sub(span)).collect();
    for p in plateaus {
        let guard = (p.start + span).min(p.end).min(phase.len());
        for r in reference.iter_mut().take(guard).skip(p.start) {
            *r = p.start;
        }
    }
    phase
        .iter()
        .zip(reference.iter())
        .map(|(&phi, &r)| wrap_angle(phi - phase[r]).abs())
        .collect()
}
