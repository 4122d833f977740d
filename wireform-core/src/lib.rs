//! Wireform core library
//!
//! This crate is the headless engine of an automated radio-signal
//! reverse-engineering pipeline: given a recorded IQ capture it recovers
//! the physical-layer modulation parameters, demodulates the capture into
//! discrete message bitstrings, and induces a protocol field layout
//! (preamble, sync, length, address, sequence number, payload, checksum)
//! by statistical comparison of the demodulated messages.

pub mod awre;
pub mod bits;
pub mod config;
pub mod dsp;
pub mod errors;
pub mod iq;
pub mod logging;
pub mod message;
pub mod params;
pub mod pipeline;
pub mod source;

// Re-export the canonical analysis interface
pub use awre::{FieldLabel, ProtocolField};
pub use config::EstimatorConfig;
pub use errors::{AnalysisError, SourceError};
pub use iq::IqInput;
pub use message::Message;
pub use params::{Modulation, SignalParameters};
pub use pipeline::{analyze_from_source, analyze_iq, AnalysisOptions, AnalysisResult, Analyzer};
pub use source::{IqCapture, IqSource, MemorySource};
