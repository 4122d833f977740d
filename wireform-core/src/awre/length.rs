//! Length-field detection.
//!
//! A length field is a byte-aligned window shortly after the sync word
//! whose value relates affinely to the amount of payload that follows
//! it, in bytes or in bits, with one integer offset shared by every
//! message of the type.

use crate::bits::window_value;
use crate::config::EstimatorConfig;

/// Window widths tried, narrowest first at each offset.
const WIDTHS: [usize; 4] = [4, 8, 12, 16];

/// Find the length field. `lens` holds the full bit length of each
/// message; the search window is `[sync_end, sync_end + length_search_bits)`
/// clamped to the common prefix. First qualifying window wins (earliest
/// offset, then narrowest width, big-endian before byte-swapped).
pub fn find_length(
    bits: &[&[u8]],
    lens: &[usize],
    sync_end: usize,
    cfg: &EstimatorConfig,
) -> Option<(usize, usize)> {
    let common_len = *lens.iter().min()?;
    let limit = (sync_end + cfg.length_search_bits).min(common_len);
    let mut offset = (sync_end + 7) / 8 * 8;

    while offset < limit {
        for &width in &WIDTHS {
            if offset + width > common_len {
                continue;
            }
            for swap in [false, true] {
                if swap && width != 16 {
                    continue;
                }
                let values: Vec<i64> = bits
                    .iter()
                    .map(|b| {
                        let v = window_value(b, offset, width);
                        if swap {
                            (((v & 0xFF) << 8) | (v >> 8)) as i64
                        } else {
                            v as i64
                        }
                    })
                    .collect();
                if relation_holds(&values, lens, offset + width, cfg, true)
                    || relation_holds(&values, lens, offset + width, cfg, false)
                {
                    return Some((offset, offset + width));
                }
            }
        }
        offset += 8;
    }
    None
}

/// Check `v_i = a * p_i + b` with `a` = 1 byte⁻¹ (`in_bytes`) or 1 bit⁻¹,
/// `p_i` the payload following the window, and one integer `b` with
/// `|b| <= length_slack`.
fn relation_holds(
    values: &[i64],
    lens: &[usize],
    window_end: usize,
    cfg: &EstimatorConfig,
    in_bytes: bool,
) -> bool {
    let mut shared_offset: Option<i64> = None;
    for (&v, &len) in values.iter().zip(lens.iter()) {
        if len < window_end {
            return false;
        }
        let payload_bits = (len - window_end) as i64;
        let payload = if in_bytes {
            if payload_bits % 8 != 0 {
                return false;
            }
            payload_bits / 8
        } else {
            payload_bits
        };
        let b = v - payload;
        if b.abs() > cfg.length_slack {
            return false;
        }
        match shared_offset {
            None => shared_offset = Some(b),
            Some(prev) if prev != b => return false,
            Some(_) => {}
        }
    }
    shared_offset.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::hex_to_bits;

    fn cfg() -> EstimatorConfig {
        EstimatorConfig::default()
    }

    #[test]
    fn byte_count_length_is_found() {
        // byte 8 holds 13, the number of bytes following it
        let a = hex_to_bits("aaaaaaaa2dd44e9a0d2471639e0148654c50337a448f");
        let b = hex_to_bits("aaaaaaaa2dd44e9a0d2471639e0248654c50337a9c0d");
        let msgs = [a.as_slice(), b.as_slice()];
        let lens = [176, 176];
        assert_eq!(find_length(&msgs, &lens, 64, &cfg()), Some((64, 72)));
    }

    #[test]
    fn varying_lengths_pin_the_relation() {
        // 6-byte and 8-byte frames whose second byte counts trailing bytes
        let a = hex_to_bits("2d04deadbeef");
        let b = hex_to_bits("2d06deadbeefcafe");
        let msgs = [a.as_slice(), b.as_slice()];
        let lens = [48, 64];
        assert_eq!(find_length(&msgs, &lens, 8, &cfg()), Some((8, 16)));
    }

    #[test]
    fn unrelated_constants_do_not_qualify() {
        let a = hex_to_bits("2dd4c7b2e59c62b7");
        let msgs = [a.as_slice(), a.as_slice()];
        let lens = [64, 64];
        assert_eq!(find_length(&msgs, &lens, 16, &cfg()), None);
    }
}
