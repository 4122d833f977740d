//! End-to-end pipeline scenarios on synthetic captures.

mod common;

use common::{ask_burst, bits_of, capture, fsk_burst};
use wireform_core::{analyze_iq, AnalysisError, AnalysisOptions, IqInput, Modulation};

#[test]
fn fsk_single_message() {
    let bits = bits_of("aaaaaaaac626c626f4dc");
    let burst = fsk_burst(&bits, 100, 0.5);
    let input = capture(&[burst], 0, 5000, 0.005, 11);

    let result = analyze_iq(&input, &AnalysisOptions::default()).unwrap();
    let params = result.signal_parameters.expect("parameters recovered");
    assert_eq!(params.modulation, Modulation::Fsk);
    assert_eq!(params.bit_length, 100);
    assert_eq!(result.num_messages, 1);
    assert!(result.messages[0].hex().starts_with("aaaaaaaac626c626"));
    assert!(result.protocol_fields.is_empty());
    assert_eq!(result.messages[0].pause(), 0);
}

#[test]
fn ask_remote_with_eleven_repeats() {
    let bits = bits_of("b25b6db6c80");
    let bursts: Vec<_> = (0..11).map(|_| ask_burst(&bits, 1000)).collect();
    let input = capture(&bursts, 29_500, 5000, 0.001, 7);

    let result = analyze_iq(&input, &AnalysisOptions::default()).unwrap();
    let params = result.signal_parameters.expect("parameters recovered");
    assert_eq!(params.modulation, Modulation::Ask);
    assert_eq!(params.bit_length, 1000);
    assert_eq!(result.num_messages, 11);
    for message in &result.messages {
        assert_eq!(message.hex(), "b25b6db6c80");
    }
    // all repeats carry the same silence except the last one
    for message in &result.messages[..10] {
        assert_eq!(message.pause(), 29_500);
    }
    assert_eq!(result.messages[10].pause(), 0);

    let preambles: Vec<_> = result
        .protocol_fields
        .iter()
        .filter(|f| f.label == wireform_core::FieldLabel::Preamble)
        .collect();
    assert_eq!(preambles.len(), 1);
    assert_eq!((preambles[0].start, preambles[0].end), (0, 8));
}

#[test]
fn gaussian_noise_yields_an_empty_result() {
    let input = capture(&[], 0, 1_000_000, 0.01, 3);
    let result = analyze_iq(&input, &AnalysisOptions::default()).unwrap();
    assert!(result.signal_parameters.is_none());
    assert!(result.messages.is_empty());
    assert!(result.protocol_fields.is_empty());
    assert_eq!(result.num_messages, 0);
}

#[test]
fn wrong_modulation_override_degrades_without_error() {
    let bits = bits_of("aaaaaaaac626c626f4dc");
    let burst = fsk_burst(&bits, 100, 0.5);
    let input = capture(&[burst], 0, 5000, 0.005, 11);

    let options = AnalysisOptions {
        modulation: Some(Modulation::Ask),
        ..AnalysisOptions::default()
    };
    // the constant FSK envelope holds no amplitude information: either
    // garbage bits come out or the estimator gives up; never an error
    let result = analyze_iq(&input, &options).unwrap();
    if let Some(params) = &result.signal_parameters {
        assert_eq!(params.modulation, Modulation::Ask);
    }
}

#[test]
fn noise_override_replaces_the_estimate() {
    let bits = bits_of("b25b6db6c855");
    let bursts: Vec<_> = (0..2).map(|_| ask_burst(&bits, 100)).collect();
    let input = capture(&bursts, 4000, 2000, 0.001, 5);

    let options = AnalysisOptions {
        noise: Some(0.05),
        ..AnalysisOptions::default()
    };
    let result = analyze_iq(&input, &options).unwrap();
    let params = result.signal_parameters.expect("parameters recovered");
    assert_eq!(params.noise, 0.05);
    assert_eq!(result.num_messages, 2);
}

#[test]
fn negative_noise_override_is_invalid() {
    let input = IqInput::ScalarReal(vec![0.1; 64]);
    let options = AnalysisOptions {
        noise: Some(-1.0),
        ..AnalysisOptions::default()
    };
    assert!(matches!(
        analyze_iq(&input, &options),
        Err(AnalysisError::InvalidArgument(_))
    ));
}

#[test]
fn interleaved_and_complex_inputs_agree() {
    let bits = bits_of("b25b6db6c80");
    let burst = ask_burst(&bits, 200);
    let complex_input = capture(&[burst], 0, 3000, 0.001, 9);

    let interleaved = match &complex_input {
        IqInput::Complex(samples) => {
            IqInput::InterleavedReal(samples.iter().flat_map(|c| [c.re, c.im]).collect())
        }
        _ => unreachable!(),
    };

    let a = analyze_iq(&complex_input, &AnalysisOptions::default()).unwrap();
    let b = analyze_iq(&interleaved, &AnalysisOptions::default()).unwrap();
    assert_eq!(a, b);
}
