//! Recovered physical-layer parameter types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;

/// Modulation class of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modulation {
    /// Amplitude-shift keying (including on-off keying).
    #[serde(rename = "ASK")]
    Ask,
    /// Frequency-shift keying.
    #[serde(rename = "FSK")]
    Fsk,
    /// Phase-shift keying, one carrier.
    #[serde(rename = "PSK")]
    Psk,
}

impl Modulation {
    pub fn as_str(self) -> &'static str {
        match self {
            Modulation::Ask => "ASK",
            Modulation::Fsk => "FSK",
            Modulation::Psk => "PSK",
        }
    }
}

impl fmt::Display for Modulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Modulation {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASK" | "OOK" => Ok(Modulation::Ask),
            "FSK" => Ok(Modulation::Fsk),
            "PSK" => Ok(Modulation::Psk),
            other => Err(AnalysisError::InvalidArgument(format!(
                "unknown modulation {other:?}, expected ASK, FSK or PSK"
            ))),
        }
    }
}

/// Physical-layer parameters recovered by the estimator.
///
/// Invariants: `bit_length >= 2`, `tolerance < bit_length / 2`, and
/// `center` lies between the two level clusters of the demodulated stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalParameters {
    #[serde(rename = "modulation_type")]
    pub modulation: Modulation,
    /// Samples per transmitted symbol.
    pub bit_length: usize,
    /// Decision threshold separating the two binary levels.
    pub center: f32,
    /// Noise floor of the capture.
    pub noise: f32,
    /// Symbol-boundary jitter absorbed by the slicer, in samples.
    pub tolerance: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulation_parses_case_insensitively() {
        assert_eq!("fsk".parse::<Modulation>().unwrap(), Modulation::Fsk);
        assert_eq!("OOK".parse::<Modulation>().unwrap(), Modulation::Ask);
        assert!("QAM".parse::<Modulation>().is_err());
    }

    #[test]
    fn parameters_serialize_with_schema_names() {
        let params = SignalParameters {
            modulation: Modulation::Fsk,
            bit_length: 100,
            center: 0.0,
            noise: 0.001,
            tolerance: 5,
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["modulation_type"], "FSK");
        assert_eq!(json["bit_length"], 100);
    }
}
