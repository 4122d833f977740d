//! Trailing-checksum recognition.
//!
//! The trailing window of each message is checked against a catalogue of
//! CRC polynomials, widest window first, then against plain byte sums.
//! The checksum input spans the bytes from the sync word (exclusive) to
//! the trailing window.

use serde::{Deserialize, Serialize};

use crate::bits::{pack_bits, window_value};
use crate::config::EstimatorConfig;

/// Trailing window widths tried, widest first.
const WIDTHS: [usize; 3] = [32, 16, 8];

/// One entry of the checksum-recognition catalogue, in the usual
/// width/poly/init/reflect/xor parametrization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrcSpec {
    pub name: String,
    pub width: u32,
    pub poly: u64,
    pub init: u64,
    pub reflect_in: bool,
    pub reflect_out: bool,
    pub xor_out: u64,
}

impl CrcSpec {
    /// Bitwise (table-less) CRC over `data`.
    pub fn checksum(&self, data: &[u8]) -> u64 {
        let top = 1u64 << (self.width - 1);
        let mask = if self.width == 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        };
        let mut register = self.init;
        for &byte in data {
            let byte = if self.reflect_in {
                byte.reverse_bits()
            } else {
                byte
            };
            register ^= u64::from(byte) << (self.width - 8);
            for _ in 0..8 {
                register = if register & top != 0 {
                    ((register << 1) ^ self.poly) & mask
                } else {
                    (register << 1) & mask
                };
            }
        }
        if self.reflect_out {
            register = register.reverse_bits() >> (64 - self.width);
        }
        (register ^ self.xor_out) & mask
    }
}

/// Find a trailing checksum shared by all messages of a type.
///
/// Only message sets of one uniform bit length can carry a trailing
/// range; for others the stage is skipped. Returns the bit range of the
/// checksum within the message.
pub fn find_checksum(
    bits: &[&[u8]],
    lens: &[usize],
    sync_end: usize,
    cfg: &EstimatorConfig,
) -> Option<(usize, usize)> {
    let len = *lens.first()?;
    if lens.iter().any(|&l| l != len) {
        return None;
    }
    let data_start = (sync_end + 7) / 8 * 8;

    for &width in &WIDTHS {
        if len < width + data_start + 8 {
            continue;
        }
        let data_bits = len - width - data_start;
        if data_bits % 8 != 0 {
            continue;
        }
        let inputs: Vec<Vec<u8>> = bits
            .iter()
            .map(|b| pack_bits(&b[data_start..len - width]))
            .collect();
        let expected: Vec<u64> = bits
            .iter()
            .map(|b| window_value(b, len - width, width))
            .collect();

        for spec in &cfg.crc_catalogue {
            if spec.width as usize != width {
                continue;
            }
            if inputs
                .iter()
                .zip(expected.iter())
                .all(|(input, &want)| spec.checksum(input) == want)
            {
                return Some((len - width, len));
            }
        }
        if width <= 16 {
            let modulus = 1u64 << width;
            if inputs.iter().zip(expected.iter()).all(|(input, &want)| {
                input.iter().map(|&b| u64::from(b)).sum::<u64>() % modulus == want
            }) {
                return Some((len - width, len));
            }
        }
    }
    None
}
