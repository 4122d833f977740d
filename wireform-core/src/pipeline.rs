//! End-to-end analysis pipeline.
//!
//! `analyze_iq` wires the stages together: derived streams, noise floor,
//! segmentation, classification, symbol rate, center, slicing, format
//! finding. Estimator failures return a result without signal
//! parameters; only invalid overrides and decoder failures are errors.

use serde::Serialize;

use crate::awre::{self, ProtocolField};
use crate::config::EstimatorConfig;
use crate::dsp::{self, NoiseEstimate, Plateau};
use crate::errors::{AnalysisError, Result};
use crate::iq::{IqFrame, IqInput};
use crate::logging::AnalysisLogger;
use crate::message::Message;
use crate::params::{Modulation, SignalParameters};
use crate::source::IqSource;

/// Anything shorter cannot hold two symbols of the smallest bit length.
const MIN_INPUT_SAMPLES: usize = 16;

/// Caller-supplied overrides; each one replaces the corresponding
/// estimator stage.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Noise floor override.
    pub noise: Option<f32>,
    /// Modulation override; skips the classifier.
    pub modulation: Option<Modulation>,
}

/// Immutable record produced by one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub signal_parameters: Option<SignalParameters>,
    pub messages: Vec<Message>,
    pub protocol_fields: Vec<ProtocolField>,
    pub num_messages: usize,
}

impl AnalysisResult {
    fn empty() -> Self {
        Self {
            signal_parameters: None,
            messages: Vec::new(),
            protocol_fields: Vec::new(),
            num_messages: 0,
        }
    }

    fn from_parts(
        params: SignalParameters,
        messages: Vec<Message>,
        protocol_fields: Vec<ProtocolField>,
    ) -> Self {
        Self {
            signal_parameters: Some(params),
            num_messages: messages.len(),
            messages,
            protocol_fields,
        }
    }
}

/// Analysis engine owning a configuration and a structured log.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: EstimatorConfig,
    logger: AnalysisLogger,
}

impl Analyzer {
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            config,
            logger: AnalysisLogger::default(),
        }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Structured trace of the estimator decisions of the last run.
    pub fn logger(&self) -> &AnalysisLogger {
        &self.logger
    }

    /// Analyze an already-loaded buffer.
    pub fn analyze_iq(&mut self, input: &IqInput, options: &AnalysisOptions) -> Result<AnalysisResult> {
        validate_options(options)?;
        self.logger.clear();
        match input {
            IqInput::ScalarReal(stream) => self.analyze_scalar(stream, options),
            _ => {
                let frame = IqFrame::from_input(input)?;
                self.analyze_frame(&frame, options)
            }
        }
    }

    /// Analyze a capture delivered by a pluggable decoder. Decoder
    /// failures propagate; no partial analysis is attempted.
    pub fn analyze_from_source(
        &mut self,
        source: &dyn IqSource,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult> {
        let capture = source.open()?;
        self.analyze_iq(&capture.input, options)
    }

    fn analyze_frame(&mut self, frame: &IqFrame, options: &AnalysisOptions) -> Result<AnalysisResult> {
        if frame.len() < MIN_INPUT_SAMPLES {
            self.logger.warn("NOISE", "capture too short to analyze");
            return Ok(AnalysisResult::empty());
        }

        let magnitude = dsp::magnitude(frame);
        let noise = match options.noise {
            Some(floor) => NoiseEstimate { floor, peak: f32::MAX },
            None => {
                let estimate = dsp::estimate_noise(&magnitude, &self.config);
                self.logger.info(
                    "NOISE",
                    format!("floor {:.6}, peak magnitude {:.6}", estimate.floor, estimate.peak),
                );
                if estimate.is_noise_dominated() {
                    self.logger.warn("NOISE", "noise floor reaches the peak magnitude");
                    return Ok(AnalysisResult::empty());
                }
                estimate
            }
        };

        let plateaus = dsp::segment(&magnitude, noise.floor, self.config.min_pause, &self.config);
        self.logger
            .info("SEGMENT", format!("{} plateaus on the first pass", plateaus.len()));
        if plateaus.is_empty() {
            return Ok(AnalysisResult::empty());
        }

        // phase-derived streams are only materialized when some stage
        // will read them
        let needs_phase = options.modulation != Some(Modulation::Ask);
        let phase = needs_phase.then(|| dsp::instantaneous_phase(frame));
        let frequency = phase.as_deref().map(dsp::instantaneous_frequency);

        let modulation = match options.modulation {
            Some(m) => m,
            None => {
                let freq = frequency.as_deref().expect("frequency stream materialized");
                let (decision, scores) = dsp::classify(&magnitude, freq, &plateaus, &self.config);
                self.logger.info(
                    "CLASSIFY",
                    format!(
                        "{decision} (ask {:.3}, fsk {:.3}, psk {:.3})",
                        scores.ask, scores.fsk, scores.psk
                    ),
                );
                decision
            }
        };

        let runs = match modulation {
            Modulation::Ask => {
                let center = dsp::provisional_center(&magnitude, &plateaus);
                dsp::binary_runs(&magnitude, center, &plateaus)
            }
            Modulation::Fsk => {
                let freq = frequency.as_deref().expect("frequency stream materialized");
                let center = dsp::provisional_center(freq, &plateaus);
                dsp::binary_runs(freq, center, &plateaus)
            }
            Modulation::Psk => {
                let freq = frequency.as_deref().expect("frequency stream materialized");
                dsp::spike_distances(freq, &plateaus)
            }
        };
        let hint = self.spectral_hint(&magnitude, frequency.as_deref(), &plateaus, modulation);
        let Some(bit_length) = dsp::estimate_bit_length(&runs, hint) else {
            self.logger.warn("SYMBOL", "no common divisor in the run lengths");
            return Ok(AnalysisResult::empty());
        };
        self.logger
            .info("SYMBOL", format!("bit length {bit_length} samples"));

        // second pass with the pause budget derived from the symbol rate
        let min_pause = self.config.pause_symbols * bit_length;
        let plateaus = dsp::segment(&magnitude, noise.floor, min_pause, &self.config);
        if plateaus.is_empty() {
            return Ok(AnalysisResult::empty());
        }

        let stream: Vec<f32> = match modulation {
            Modulation::Ask => magnitude.clone(),
            Modulation::Fsk => frequency.clone().expect("frequency stream materialized"),
            Modulation::Psk => {
                let phase = phase.as_deref().expect("phase stream materialized");
                dsp::differential_phase(phase, bit_length, &plateaus)
            }
        };

        self.finish(stream, plateaus, modulation, bit_length, noise.floor)
    }

    /// Real-only input: the buffer already is a demod stream. ASK is
    /// assumed unless the caller says otherwise.
    fn analyze_scalar(&mut self, stream: &[f32], options: &AnalysisOptions) -> Result<AnalysisResult> {
        if stream.len() < MIN_INPUT_SAMPLES {
            return Ok(AnalysisResult::empty());
        }
        if stream.iter().any(|x| !x.is_finite()) {
            return Err(AnalysisError::InvalidArgument(
                "capture contains non-finite samples".to_string(),
            ));
        }
        let modulation = options.modulation.unwrap_or(Modulation::Ask);
        let magnitude: Vec<f32> = stream.iter().map(|&x| x.abs()).collect();

        let noise = match options.noise {
            Some(floor) => NoiseEstimate { floor, peak: f32::MAX },
            None => {
                let estimate = dsp::estimate_noise(&magnitude, &self.config);
                if estimate.is_noise_dominated() {
                    return Ok(AnalysisResult::empty());
                }
                estimate
            }
        };

        let plateaus = dsp::segment(&magnitude, noise.floor, self.config.min_pause, &self.config);
        if plateaus.is_empty() {
            return Ok(AnalysisResult::empty());
        }
        let center = dsp::provisional_center(stream, &plateaus);
        let runs = dsp::binary_runs(stream, center, &plateaus);
        let Some(bit_length) = dsp::estimate_bit_length(&runs, None) else {
            return Ok(AnalysisResult::empty());
        };

        let min_pause = self.config.pause_symbols * bit_length;
        let plateaus = dsp::segment(&magnitude, noise.floor, min_pause, &self.config);
        if plateaus.is_empty() {
            return Ok(AnalysisResult::empty());
        }
        self.finish(stream.to_vec(), plateaus, modulation, bit_length, noise.floor)
    }

    /// Shared tail: center, tolerance, slicing, format finding.
    fn finish(
        &mut self,
        stream: Vec<f32>,
        plateaus: Vec<Plateau>,
        modulation: Modulation,
        bit_length: usize,
        noise_floor: f32,
    ) -> Result<AnalysisResult> {
        let Some(clusters) = dsp::two_means(&stream, &plateaus, &self.config) else {
            self.logger.warn("CENTER", "level clusters did not separate");
            return Ok(AnalysisResult::empty());
        };
        let center = dsp::decision_center(&clusters);
        let tolerance = dsp::tolerance_for(bit_length, &self.config);
        self.logger.info(
            "CENTER",
            format!("center {center:.4} between {:.4} and {:.4}", clusters.low, clusters.high),
        );

        let params = SignalParameters {
            modulation,
            bit_length,
            center,
            noise: noise_floor,
            tolerance,
        };

        let mut messages = Vec::new();
        for plateau in &plateaus {
            match dsp::demodulate_plateau(&stream, plateau, &params, &self.config) {
                Some(bits) => messages.push(Message::new(bits, plateau.pause)),
                None => self.logger.debug(
                    "DEMOD",
                    format!("dropped plateau [{}, {})", plateau.start, plateau.end),
                ),
            }
        }
        self.logger
            .info("DEMOD", format!("{} messages", messages.len()));

        let protocol_fields = if messages.len() >= 2 {
            let fields = awre::infer_fields(&messages, &self.config);
            self.logger
                .info("AWRE", format!("{} fields induced", fields.len()));
            fields
        } else {
            Vec::new()
        };

        Ok(AnalysisResult::from_parts(params, messages, protocol_fields))
    }

    /// Spectral alternation hint for the symbol-rate estimator.
    fn spectral_hint(
        &mut self,
        magnitude: &[f32],
        frequency: Option<&[f32]>,
        plateaus: &[Plateau],
        modulation: Modulation,
    ) -> Option<f32> {
        let stream: &[f32] = match modulation {
            Modulation::Ask => magnitude,
            Modulation::Fsk | Modulation::Psk => frequency?,
        };
        let center = dsp::provisional_center(stream, plateaus);
        let mut symbols: Vec<i8> = Vec::new();
        for p in plateaus {
            let end = p.end.min(stream.len());
            symbols.extend(stream[p.start..end].iter().map(|&v| if v > center { 1i8 } else { -1 }));
        }
        let period = dsp::spectrum::dominant_period(&symbols)?;
        self.logger
            .debug("SYMBOL", format!("spectral alternation period {period:.1}"));
        Some(period / 2.0)
    }
}

fn validate_options(options: &AnalysisOptions) -> Result<()> {
    if let Some(noise) = options.noise {
        if !noise.is_finite() || noise < 0.0 {
            return Err(AnalysisError::InvalidArgument(format!(
                "noise floor must be finite and non-negative, got {noise}"
            )));
        }
    }
    Ok(())
}

/// Analyze an already-loaded buffer with the default configuration.
pub fn analyze_iq(input: &IqInput, options: &AnalysisOptions) -> Result<AnalysisResult> {
    Analyzer::new(EstimatorConfig::default()).analyze_iq(input, options)
}

/// Analyze a capture delivered by a pluggable decoder with the default
/// configuration.
pub fn analyze_from_source(source: &dyn IqSource, options: &AnalysisOptions) -> Result<AnalysisResult> {
    Analyzer::new(EstimatorConfig::default()).analyze_from_source(source, options)
}
