//! Bit slicing of a demodulated stream.

use crate::config::EstimatorConfig;
use crate::dsp::segment::Plateau;
use crate::params::SignalParameters;

/// Quantize one plateau into a bit vector.
///
/// The stream is thresholded against the decision center and same-value
/// runs are binned into symbols `bit_length` samples wide, with
/// `tolerance` slack absorbed at each boundary. Returns `None` when more
/// than `max_ambiguous_ratio` of the symbols are inconsistent with the
/// symbol grid, dropping the plateau.
pub fn demodulate_plateau(
    stream: &[f32],
    plateau: &Plateau,
    params: &SignalParameters,
    cfg: &EstimatorConfig,
) -> Option<Vec<u8>> {
    let end = plateau.end.min(stream.len());
    if end <= plateau.start || params.bit_length == 0 {
        return None;
    }
    let bit_length = params.bit_length as f32;

    let quantized: Vec<u8> = stream[plateau.start..end]
        .iter()
        .map(|&v| u8::from(v > params.center))
        .collect();

    let mut bits: Vec<u8> = Vec::with_capacity(quantized.len() / params.bit_length + 1);
    let mut symbols = 0usize;
    let mut ambiguous = 0usize;
    let slack = params.tolerance * 2;

    let mut i = 0usize;
    while i < quantized.len() {
        let value = quantized[i];
        let mut j = i + 1;
        while j < quantized.len() && quantized[j] == value {
            j += 1;
        }
        let run = j - i;
        let count = (run as f32 / bit_length).round() as usize;
        if count == 0 {
            // shorter than half a symbol: boundary jitter or a glitch
            ambiguous += 1;
        } else {
            if run.abs_diff(count * params.bit_length) > slack {
                ambiguous += 1;
            }
            symbols += count;
            bits.extend(std::iter::repeat(value).take(count));
        }
        i = j;
    }

    if symbols == 0 {
        return None;
    }
    if ambiguous as f32 > cfg.max_ambiguous_ratio * symbols as f32 {
        return None;
    }
    Some(bits)
}
