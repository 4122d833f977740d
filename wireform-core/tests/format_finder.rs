//! Format-finder scenarios: full field layouts recovered end-to-end.

mod common;

use common::{bits_of, capture, fsk_burst, psk_burst};
use wireform_core::{analyze_iq, AnalysisOptions, FieldLabel, Modulation};

/// Two 176-bit FSK frames: preamble, sync, length byte (13 payload
/// bytes), a 4-byte address block, a sequence byte (0x01/0x02) and a
/// valid CRC-16/CCITT over the bytes after the sync word.
const FRAME_A: &str = "aaaaaaaa2dd44e9a0d2471639e0148654c50337a448f";
const FRAME_B: &str = "aaaaaaaa2dd44e9a0d2471639e0248654c50337a9c0d";

#[test]
fn fsk_two_message_frame_layout() {
    let bursts = vec![
        fsk_burst(&bits_of(FRAME_A), 50, 0.5),
        fsk_burst(&bits_of(FRAME_B), 50, 0.5),
    ];
    let input = capture(&bursts, 4000, 4000, 0.003, 21);

    let result = analyze_iq(&input, &AnalysisOptions::default()).unwrap();
    let params = result.signal_parameters.expect("parameters recovered");
    assert_eq!(params.modulation, Modulation::Fsk);
    assert_eq!(params.bit_length, 50);
    assert_eq!(result.num_messages, 2);
    assert_eq!(result.messages[0].hex(), FRAME_A);
    assert_eq!(result.messages[1].hex(), FRAME_B);

    let expected = [
        (FieldLabel::Preamble, 0, 32),
        (FieldLabel::Sync, 32, 64),
        (FieldLabel::Length, 64, 72),
        (FieldLabel::Address, 72, 104),
        (FieldLabel::SequenceNumber, 104, 112),
        (FieldLabel::Data, 112, 160),
        (FieldLabel::Checksum, 160, 176),
    ];
    assert_eq!(result.protocol_fields.len(), expected.len());
    for (field, &(label, start, end)) in result.protocol_fields.iter().zip(expected.iter()) {
        assert_eq!(field.label, label);
        assert_eq!((field.start, field.end), (start, end));
        assert_eq!(field.message_type, "Default");
    }
}

/// Three 128-bit PSK frames whose twelfth byte counts 0x01, 0x02, 0x03.
/// The first transmitted bit of a differentially keyed burst is not
/// observable, so every recovered message starts with a zero bit; the
/// counter byte stays at bit offset 88.
#[test]
fn psk_three_messages_with_incrementing_sequence() {
    let frames = ["01", "02", "03"].map(|seq| {
        bits_of(&format!("aaaa2dd40599c7b2e59cd1{seq}376b24f1"))
    });
    let bursts: Vec<_> = frames.iter().map(|f| psk_burst(f, 50)).collect();
    let input = capture(&bursts, 4000, 4000, 0.003, 31);

    let result = analyze_iq(&input, &AnalysisOptions::default()).unwrap();
    let params = result.signal_parameters.expect("parameters recovered");
    assert_eq!(params.modulation, Modulation::Psk);
    assert_eq!(params.bit_length, 50);
    assert_eq!(result.num_messages, 3);
    for (message, frame) in result.messages.iter().zip(frames.iter()) {
        assert_eq!(&message.bits()[1..], &frame[1..]);
    }

    let sequence: Vec<_> = result
        .protocol_fields
        .iter()
        .filter(|f| f.label == FieldLabel::SequenceNumber)
        .collect();
    assert_eq!(sequence.len(), 1);
    assert_eq!((sequence[0].start, sequence[0].end), (88, 96));
    assert_eq!(sequence[0].message_type, "Default");
}

/// P2: within every message type the induced fields tile the common
/// prefix without gaps or overlaps.
#[test]
fn field_ranges_cover_the_prefix() {
    let bursts = vec![
        fsk_burst(&bits_of(FRAME_A), 20, 0.5),
        fsk_burst(&bits_of(FRAME_B), 20, 0.5),
    ];
    let input = capture(&bursts, 2000, 2000, 0.003, 41);
    let result = analyze_iq(&input, &AnalysisOptions::default()).unwrap();

    let mut cursor = 0usize;
    for field in &result.protocol_fields {
        assert_eq!(field.start, cursor, "gap or overlap at bit {cursor}");
        cursor = field.end;
    }
    assert_eq!(cursor, 176);
}
