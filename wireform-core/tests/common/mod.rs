//! Synthetic capture builders shared by the integration suites.
//!
//! All generators are seeded so every test run sees byte-identical
//! captures.
#![allow(dead_code)]

use num_complex::Complex32;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use wireform_core::bits::hex_to_bits;
use wireform_core::IqInput;

pub const ASK_LOW: f32 = 0.2;

/// One ASK burst: bit 1 at full amplitude, bit 0 at a reduced level so
/// trailing zeros stay inside the plateau.
pub fn ask_burst(bits: &[u8], bit_length: usize) -> Vec<Complex32> {
    bits.iter()
        .flat_map(|&b| {
            let amplitude = if b == 1 { 1.0 } else { ASK_LOW };
            std::iter::repeat(Complex32::new(amplitude, 0.0)).take(bit_length)
        })
        .collect()
}

/// One FSK burst with continuous phase: bit 1 at `+deviation` rad/sample,
/// bit 0 at `-deviation`.
pub fn fsk_burst(bits: &[u8], bit_length: usize, deviation: f32) -> Vec<Complex32> {
    let mut phase = 0.0f32;
    let mut samples = Vec::with_capacity(bits.len() * bit_length);
    for &b in bits {
        let step = if b == 1 { deviation } else { -deviation };
        for _ in 0..bit_length {
            phase += step;
            samples.push(Complex32::from_polar(1.0, phase));
        }
    }
    samples
}

/// One differentially keyed PSK burst: bit 1 flips the carrier phase by
/// pi, bit 0 keeps it. The first bit sets no flip, so its value is not
/// observable in the capture.
pub fn psk_burst(bits: &[u8], bit_length: usize) -> Vec<Complex32> {
    let mut phase = 0.3f32;
    let mut samples = Vec::with_capacity(bits.len() * bit_length);
    for (k, &b) in bits.iter().enumerate() {
        if k > 0 && b == 1 {
            phase += std::f32::consts::PI;
        }
        for _ in 0..bit_length {
            samples.push(Complex32::from_polar(1.0, phase));
        }
    }
    samples
}

/// Assemble bursts into a capture: leading/trailing silence, a fixed gap
/// between bursts, and seeded white noise over everything.
pub fn capture(bursts: &[Vec<Complex32>], gap: usize, pad: usize, sigma: f32, seed: u64) -> IqInput {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut samples: Vec<Complex32> = Vec::new();
    samples.extend(std::iter::repeat(Complex32::new(0.0, 0.0)).take(pad));
    for (k, burst) in bursts.iter().enumerate() {
        if k > 0 {
            samples.extend(std::iter::repeat(Complex32::new(0.0, 0.0)).take(gap));
        }
        samples.extend_from_slice(burst);
    }
    samples.extend(std::iter::repeat(Complex32::new(0.0, 0.0)).take(pad));

    for s in samples.iter_mut() {
        let re: f32 = rng.sample(StandardNormal);
        let im: f32 = rng.sample(StandardNormal);
        *s += Complex32::new(re * sigma, im * sigma);
    }
    IqInput::Complex(samples)
}

/// Bits of a hex string, via the core helper.
pub fn bits_of(hex: &str) -> Vec<u8> {
    hex_to_bits(hex)
}
