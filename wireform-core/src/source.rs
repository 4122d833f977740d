//! Pluggable IQ capture sources.
//!
//! File-format codecs live outside the core: a decoder implements
//! [`IqSource`] and hands over a tagged sample buffer plus its sample
//! rate. Decoder failures propagate as [`SourceError`]; the pipeline
//! never attempts a partial analysis on them.

use crate::errors::SourceError;
use crate::iq::IqInput;

/// Default sample rate assumed when a source does not carry one.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 1_000_000.0;

/// A decoded capture handed over by a pluggable source.
#[derive(Debug, Clone)]
pub struct IqCapture {
    pub input: IqInput,
    pub sample_rate_hz: f64,
}

/// Contract implemented by IQ decoders (file formats, buffers, URIs).
pub trait IqSource {
    fn open(&self) -> Result<IqCapture, SourceError>;
}

/// Source wrapping an already-loaded buffer.
#[derive(Debug, Clone)]
pub struct MemorySource {
    input: IqInput,
    sample_rate_hz: f64,
}

impl MemorySource {
    pub fn new(input: IqInput, sample_rate_hz: f64) -> Self {
        Self {
            input,
            sample_rate_hz,
        }
    }
}

impl IqSource for MemorySource {
    fn open(&self) -> Result<IqCapture, SourceError> {
        Ok(IqCapture {
            input: self.input.clone(),
            sample_rate_hz: self.sample_rate_hz,
        })
    }
}
