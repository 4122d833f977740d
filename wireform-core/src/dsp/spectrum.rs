//! Spectral helpers built on FFT.

use rustfft::{num_complex::Complex32, FftPlanner};

/// Smallest stream the period estimator will look at.
const MIN_SAMPLES: usize = 64;
/// FFT size is capped so the hint stays cheap on long captures.
const MAX_FFT: usize = 1 << 15;
/// A peak must carry this multiple of the mean bin power to count.
const PROMINENCE: f32 = 4.0;

/// Estimate the dominant alternation period of a binarized stream.
///
/// The stream is mapped to +/-1, Hamming-windowed, and transformed; a
/// sufficiently prominent low-frequency peak yields the alternation
/// period in samples. Streams without strong periodicity (random
/// payloads) return `None`, and the caller falls back to run-length
/// statistics alone.
pub fn dominant_period(symbols: &[i8]) -> Option<f32> {
    if symbols.len() < MIN_SAMPLES {
        return None;
    }
    let used = symbols.len().min(MAX_FFT);
    let fft_size = used.next_power_of_two().min(MAX_FFT);

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(fft_size);

    let mut buffer: Vec<Complex32> = Vec::with_capacity(fft_size);
    for (n, &s) in symbols.iter().take(fft_size).enumerate() {
        let window = hamming(n, used.min(fft_size));
        buffer.push(Complex32::new(f32::from(s) * window, 0.0));
    }
    buffer.resize(fft_size, Complex32::new(0.0, 0.0));

    fft.process(&mut buffer);

    let half = fft_size / 2;
    let power: Vec<f32> = buffer[1..half].iter().map(|c| c.norm_sqr()).collect();
    if power.is_empty() {
        return None;
    }
    let mean = power.iter().sum::<f32>() / power.len() as f32;
    let (peak_bin, peak_power) = power
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).expect("finite power"))
        .map(|(idx, &p)| (idx + 1, p))
        .expect("spectrum is non-empty");

    if peak_power < PROMINENCE * mean {
        return None;
    }
    Some(fft_size as f32 / peak_bin as f32)
}

fn hamming(n: usize, size: usize) -> f32 {
    if size < 2 {
        return 1.0;
    }
    0.54 - 0.46 * (std::f32::consts::TAU * n as f32 / (size as f32 - 1.0)).cos()
}
