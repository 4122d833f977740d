//! Demodulated message container.
//!
//! A [`Message`] is immutable once emitted; the `hex` and `ascii` views
//! are pure functions of `bits` computed at construction time.

use serde::{Serialize, Serializer};

use crate::bits;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    #[serde(serialize_with = "serialize_bits")]
    bits: Vec<u8>,
    hex: String,
    ascii: String,
    pause: usize,
}

impl Message {
    /// Build a message from slicer output and the trailing silence length.
    pub fn new(bits: Vec<u8>, pause: usize) -> Self {
        let hex = bits::bits_to_hex(&bits);
        let ascii = bits::bits_to_ascii(&bits);
        Self {
            bits,
            hex,
            ascii,
            pause,
        }
    }

    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }

    pub fn ascii(&self) -> &str {
        &self.ascii
    }

    /// Silence samples trailing this message; 0 for the last message of
    /// a capture.
    pub fn pause(&self) -> usize {
        self.pause
    }
}

fn serialize_bits<S: Serializer>(bits: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    let text: String = bits.iter().map(|&b| if b == 0 { '0' } else { '1' }).collect();
    serializer.serialize_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::hex_to_bits;

    #[test]
    fn views_derive_from_bits() {
        let msg = Message::new(hex_to_bits("b25b6db6c80"), 29500);
        assert_eq!(msg.len(), 44);
        assert_eq!(msg.hex(), "b25b6db6c80");
        assert_eq!(msg.ascii().len(), 5);
        assert_eq!(msg.pause(), 29500);
    }

    #[test]
    fn views_are_idempotent() {
        let bits = hex_to_bits("48657921");
        let a = Message::new(bits.clone(), 0);
        let b = Message::new(bits, 0);
        assert_eq!(a, b);
        assert_eq!(a.hex(), b.hex());
        assert_eq!(a.ascii(), "Hey!");
    }

    #[test]
    fn bits_serialize_as_string() {
        let msg = Message::new(vec![1, 0, 1, 1], 7);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["bits"], "1011");
        assert_eq!(json["hex"], "b");
        assert_eq!(json["pause"], 7);
    }
}
