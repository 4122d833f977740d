//! Sequence-number detection.

use crate::bits::window_value;

/// Window widths tried, narrowest first.
const WIDTHS: [usize; 2] = [8, 16];
/// Admissible per-message increments.
const INCREMENTS: [u64; 2] = [1, 2];

/// Find a counter field: a byte-aligned window whose values, in arrival
/// order, increase by one constant increment of 1 or 2 modulo 2^w.
/// At most one per message type; the narrowest, earliest window wins.
pub fn find_sequence(
    bits: &[&[u8]],
    common_len: usize,
    assigned: &[(usize, usize)],
) -> Option<(usize, usize)> {
    if bits.len() < 2 {
        return None;
    }
    for &width in &WIDTHS {
        if width > common_len {
            continue;
        }
        let modulus = 1u64 << width;
        let mut offset = 0usize;
        while offset + width <= common_len {
            if assigned.iter().any(|&(s, e)| offset < e && offset + width > s) {
                offset += 8;
                continue;
            }
            let values: Vec<u64> = bits
                .iter()
                .map(|b| window_value(b, offset, width))
                .collect();
            let first_step = (values[1].wrapping_sub(values[0])) % modulus;
            let constant = values
                .windows(2)
                .all(|w| (w[1].wrapping_sub(w[0])) % modulus == first_step);
            if constant && INCREMENTS.contains(&first_step) {
                return Some((offset, offset + width));
            }
            offset += 8;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::hex_to_bits;

    #[test]
    fn incrementing_byte_is_found() {
        let a = hex_to_bits("2dd4450137");
        let b = hex_to_bits("2dd4450237");
        let c = hex_to_bits("2dd4450337");
        let msgs = [a.as_slice(), b.as_slice(), c.as_slice()];
        assert_eq!(find_sequence(&msgs, 40, &[(0, 16)]), Some((24, 32)));
    }

    #[test]
    fn wrapping_counters_are_accepted() {
        let a = hex_to_bits("ff");
        let b = hex_to_bits("00");
        let c = hex_to_bits("01");
        let msgs = [a.as_slice(), b.as_slice(), c.as_slice()];
        assert_eq!(find_sequence(&msgs, 8, &[]), Some((0, 8)));
    }

    #[test]
    fn inconsistent_increments_are_rejected() {
        let a = hex_to_bits("01");
        let b = hex_to_bits("02");
        let c = hex_to_bits("05");
        let msgs = [a.as_slice(), b.as_slice(), c.as_slice()];
        assert_eq!(find_sequence(&msgs, 8, &[]), None);
    }

    #[test]
    fn assigned_ranges_are_skipped() {
        let a = hex_to_bits("0137");
        let b = hex_to_bits("0237");
        let msgs = [a.as_slice(), b.as_slice()];
        assert_eq!(find_sequence(&msgs, 16, &[(0, 8)]), None);
    }
}
