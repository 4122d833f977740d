//! Bitstream helpers shared by the demodulator and the format finder.
//!
//! Bit vectors are `Vec<u8>` holding 0/1 values, most significant bit
//! first, matching the order in which symbols leave the slicer.

/// Pack a bit vector into bytes, most significant bit first.
/// A trailing partial byte is padded with zeros.
pub fn pack_bits(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            let mut byte = 0u8;
            for i in 0..8 {
                byte = (byte << 1) | chunk.get(i).copied().unwrap_or(0);
            }
            byte
        })
        .collect()
}

/// Render a bit vector as big-endian nibbles, padding the trailing
/// partial nibble with zeros.
pub fn bits_to_hex(bits: &[u8]) -> String {
    bits.chunks(4)
        .map(|chunk| {
            let mut nibble = 0u32;
            for i in 0..4 {
                nibble = (nibble << 1) | u32::from(chunk.get(i).copied().unwrap_or(0));
            }
            char::from_digit(nibble, 16).expect("nibble is below 16")
        })
        .collect()
}

/// Render the full bytes of a bit vector as printable ASCII, substituting
/// `.` for non-printable values. Trailing bits that do not fill a byte are
/// dropped.
pub fn bits_to_ascii(bits: &[u8]) -> String {
    bits.chunks_exact(8)
        .map(|chunk| {
            let byte = chunk.iter().fold(0u8, |acc, &b| (acc << 1) | (b & 1));
            if (0x20..=0x7e).contains(&byte) {
                byte as char
            } else {
                '.'
            }
        })
        .collect()
}

/// Unsigned big-endian value of the bit window `[start, start + width)`.
pub fn window_value(bits: &[u8], start: usize, width: usize) -> u64 {
    debug_assert!(start + width <= bits.len());
    bits[start..start + width]
        .iter()
        .fold(0u64, |acc, &b| (acc << 1) | u64::from(b))
}

/// Expand a hex string into a bit vector, four bits per digit.
pub fn hex_to_bits(hex: &str) -> Vec<u8> {
    hex.chars()
        .map(|c| c.to_digit(16).expect("invalid hex digit") as u8)
        .flat_map(|nibble| (0..4).rev().map(move |i| (nibble >> i) & 1))
        .collect()
}
