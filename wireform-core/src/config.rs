//! Configuration types for the Wireform pipeline.
//!
//! All tunables live in an immutable [`EstimatorConfig`] value threaded
//! through the pipeline as an argument; there is no global mutable state.

use serde::{Deserialize, Serialize};

use crate::awre::checksum::CrcSpec;

/// Tunable parameters of the estimation and format-finding stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Window length for the noise-floor quantile, in samples.
    pub noise_window: usize,
    /// Quantile of window means taken as the noise floor.
    pub noise_quantile: f32,
    /// Lower clamp for the noise floor.
    pub noise_floor_min: f32,
    /// Rising-edge hysteresis: a plateau opens at `floor * (1 + h_in)`.
    pub hysteresis_in: f32,
    /// Falling-edge hysteresis: a plateau closes below `floor * (1 - h_out)`.
    pub hysteresis_out: f32,
    /// Silence length that separates two plateaus on the first pass,
    /// before a symbol length is known.
    pub min_pause: usize,
    /// Silence length in symbols once the symbol length is known.
    pub pause_symbols: usize,
    /// Plateaus shorter than this are discarded as glitches.
    pub min_plateau: usize,
    /// Relative margin inside which classifier scores count as tied.
    pub classify_margin: f32,
    /// Symbol-boundary jitter budget as a fraction of the bit length.
    pub tolerance_fraction: f32,
    /// A plateau is dropped when more than this fraction of its symbols
    /// is ambiguous.
    pub max_ambiguous_ratio: f32,
    /// Minimum population of each of the two level clusters.
    pub min_cluster_fraction: f32,
    /// Convergence threshold for the two-means centroids.
    pub cluster_epsilon: f32,
    /// Upper bound on the sync word length, in bits.
    pub sync_max_bits: usize,
    /// Width of the window searched for a length field, in bits after
    /// the sync word.
    pub length_search_bits: usize,
    /// Largest admissible constant offset in the length relation.
    pub length_slack: i64,
    /// Checksum polynomials recognized by the format finder.
    pub crc_catalogue: Vec<CrcSpec>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            noise_window: 64,
            noise_quantile: 0.05,
            noise_floor_min: 1e-6,
            hysteresis_in: 0.1,
            hysteresis_out: 0.05,
            min_pause: 1000,
            pause_symbols: 8,
            min_plateau: 10,
            classify_margin: 0.10,
            tolerance_fraction: 0.05,
            max_ambiguous_ratio: 0.25,
            min_cluster_fraction: 0.05,
            cluster_epsilon: 1e-6,
            sync_max_bits: 32,
            length_search_bits: 64,
            length_slack: 4,
            crc_catalogue: default_crc_catalogue(),
        }
    }
}

/// Checksum catalogue applied by the format finder, widest window first.
pub fn default_crc_catalogue() -> Vec<CrcSpec> {
    vec![
        CrcSpec {
            name: "crc32".to_string(),
            width: 32,
            poly: 0x04C1_1DB7,
            init: 0xFFFF_FFFF,
            reflect_in: true,
            reflect_out: true,
            xor_out: 0xFFFF_FFFF,
        },
        CrcSpec {
            name: "crc16-ccitt".to_string(),
            width: 16,
            poly: 0x1021,
            init: 0xFFFF,
            reflect_in: false,
            reflect_out: false,
            xor_out: 0x0000,
        },
        CrcSpec {
            name: "crc16-ibm".to_string(),
            width: 16,
            poly: 0x8005,
            init: 0x0000,
            reflect_in: true,
            reflect_out: true,
            xor_out: 0x0000,
        },
        CrcSpec {
            name: "crc8".to_string(),
            width: 8,
            poly: 0x07,
            init: 0x00,
            reflect_in: false,
            reflect_out: false,
            xor_out: 0x00,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        let cfg = EstimatorConfig::default();
        assert!(cfg.noise_quantile > 0.0 && cfg.noise_quantile < 1.0);
        assert!(cfg.hysteresis_in > cfg.hysteresis_out);
        assert!(cfg.min_plateau < cfg.min_pause);
        assert_eq!(cfg.crc_catalogue.len(), 4);
        assert!(cfg.crc_catalogue.windows(2).all(|w| w[0].width >= w[1].width));
    }

    #[test]
    fn config_round_trips_through_serde() {
        let cfg = EstimatorConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: EstimatorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.noise_window, cfg.noise_window);
        assert_eq!(back.crc_catalogue.len(), cfg.crc_catalogue.len());
        assert_eq!(back.crc_catalogue[1].poly, 0x1021);
    }
}
