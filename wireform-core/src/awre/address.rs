//! Address-field detection.
//!
//! Two passes. The symmetry pass looks for byte-aligned windows whose
//! small value set reappears at a different offset in another message,
//! the signature of swapped source/destination addresses. When no such
//! symmetry exists, the fallback takes the constant region right after
//! the length field (a shared device identifier) and covers it with at
//! most two fields of the admissible widths.

use std::collections::HashMap;

use crate::bits::window_value;

/// Admissible address widths, in bits.
const WIDTHS: [usize; 6] = [8, 16, 24, 32, 48, 64];
/// At most this many address fields per message type.
const MAX_FIELDS: usize = 2;

/// Find address fields. `after` is the end of the length field (or sync
/// word) and anchors the constant-extent fallback; `assigned` holds the
/// ranges already claimed by other fields.
pub fn find_addresses(
    bits: &[&[u8]],
    common_len: usize,
    after: usize,
    assigned: &[(usize, usize)],
) -> Vec<(usize, usize)> {
    let symmetric = symmetry_pass(bits, common_len, assigned);
    if !symmetric.is_empty() {
        return symmetric;
    }
    constant_extent_pass(bits, common_len, after)
}

fn overlaps(assigned: &[(usize, usize)], start: usize, end: usize) -> bool {
    assigned.iter().any(|&(s, e)| start < e && end > s)
}

fn symmetry_pass(
    bits: &[&[u8]],
    common_len: usize,
    assigned: &[(usize, usize)],
) -> Vec<(usize, usize)> {
    let message_count = bits.len();
    let mut found: Vec<(usize, usize)> = Vec::new();

    for &width in WIDTHS.iter().rev() {
        if width > common_len {
            continue;
        }
        // value -> every (message, offset) it occurs at, over free windows
        let mut occurrences: HashMap<u64, Vec<(usize, usize)>> = HashMap::new();
        let offsets: Vec<usize> = (0..=common_len - width)
            .step_by(8)
            .filter(|&o| !overlaps(assigned, o, o + width))
            .collect();
        for &offset in &offsets {
            for (m, b) in bits.iter().enumerate() {
                occurrences
                    .entry(window_value(b, offset, width))
                    .or_default()
                    .push((m, offset));
            }
        }
        for &offset in &offsets {
            if found.len() >= MAX_FIELDS || overlaps(&found, offset, offset + width) {
                continue;
            }
            let values: Vec<u64> = bits.iter().map(|b| window_value(b, offset, width)).collect();
            let mut distinct = values.clone();
            distinct.sort_unstable();
            distinct.dedup();
            // a constant column is a device id, handled by the fallback
            if distinct.len() < 2 || distinct.len() > message_count {
                continue;
            }
            let symmetric = values.iter().enumerate().any(|(m, v)| {
                occurrences
                    .get(v)
                    .map_or(false, |occ| occ.iter().any(|&(om, oo)| om != m && oo != offset))
            });
            if symmetric {
                found.push((offset, offset + width));
            }
        }
        if !found.is_empty() {
            break;
        }
    }
    found.sort_unstable();
    found
}

fn constant_extent_pass(bits: &[&[u8]], common_len: usize, after: usize) -> Vec<(usize, usize)> {
    let mut extent = 0usize;
    while after + extent < common_len {
        let column = after + extent;
        let value = bits[0][column];
        if !bits.iter().all(|b| b[column] == value) {
            break;
        }
        extent += 1;
    }
    let mut extent = extent / 8 * 8;

    let mut fields = Vec::new();
    let mut cursor = after;
    for &width in WIDTHS.iter().rev() {
        while extent >= width && fields.len() < MAX_FIELDS {
            fields.push((cursor, cursor + width));
            cursor += width;
            extent -= width;
        }
    }
    fields
}
