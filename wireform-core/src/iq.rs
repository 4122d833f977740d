//! IQ sample containers and input normalization.

use ndarray::Array2;
use num_complex::Complex32;

use crate::errors::AnalysisError;

/// Tagged input accepted at the analysis boundary.
///
/// The pipeline never duck-types its input: the variant is decided where
/// the buffer enters the system and the core only sees the normalized
/// [`IqFrame`], except for [`IqInput::ScalarReal`] which short-circuits
/// straight to demodulation.
#[derive(Debug, Clone)]
pub enum IqInput {
    /// Complex baseband samples.
    Complex(Vec<Complex32>),
    /// Interleaved I/Q buffer of length 2N.
    InterleavedReal(Vec<f32>),
    /// An already-demodulated scalar stream.
    ScalarReal(Vec<f32>),
}

impl IqInput {
    /// Number of time steps represented by this input.
    pub fn len(&self) -> usize {
        match self {
            IqInput::Complex(v) => v.len(),
            IqInput::InterleavedReal(v) => v.len() / 2,
            IqInput::ScalarReal(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Normalized N x 2 sample frame.
#[derive(Debug, Clone)]
pub struct IqFrame {
    samples: Array2<f32>,
}

impl IqFrame {
    /// Normalize an input buffer into the N x 2 shape, validating that
    /// every sample is finite and that interleaved buffers pair up.
    pub fn from_input(input: &IqInput) -> Result<Self, AnalysisError> {
        let data: Vec<f32> = match input {
            IqInput::Complex(v) => v.iter().flat_map(|c| [c.re, c.im]).collect(),
            IqInput::InterleavedReal(v) => {
                if v.len() % 2 != 0 {
                    return Err(AnalysisError::InvalidArgument(format!(
                        "interleaved buffer holds {} values, expected an even count",
                        v.len()
                    )));
                }
                v.clone()
            }
            IqInput::ScalarReal(v) => v.iter().flat_map(|&x| [x, 0.0]).collect(),
        };
        if data.iter().any(|x| !x.is_finite()) {
            return Err(AnalysisError::InvalidArgument(
                "capture contains non-finite samples".to_string(),
            ));
        }
        let rows = data.len() / 2;
        let samples =
            Array2::from_shape_vec((rows, 2), data).expect("interleaved buffer maps onto N x 2");
        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn i(&self, n: usize) -> f32 {
        self.samples[[n, 0]]
    }

    pub fn q(&self, n: usize) -> f32 {
        self.samples[[n, 1]]
    }

    pub fn samples(&self) -> &Array2<f32> {
        &self.samples
    }
}
