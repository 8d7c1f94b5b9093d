//! Tuning knobs for analysis.

use serde::Deserialize;
use thiserror::Error;

use crate::tree::fingerprint::{ContentHasher, Fingerprint};

/// Default minimum cohesion for a cluster.
pub const DEFAULT_MINIMUM_COHESION: f64 = 0.5;
/// Default minimum number of occurrences for a pattern.
pub const DEFAULT_MINIMUM_FREQUENCY: usize = 2;
/// Default depth ceiling for hierarchical detection.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// An option value outside its valid range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    /// Cohesion must lie in `[0, 1]`.
    #[error("minimum_cohesion must be within [0, 1], got {0}")]
    Cohesion(f64),
    /// Frequency must be at least 1.
    #[error("minimum_frequency must be at least 1")]
    Frequency,
    /// Depth must be at least 1.
    #[error("max_depth must be at least 1")]
    Depth,
}

/// Validated analysis options.
///
/// ```rust
/// use stylesmith::AnalysisOptions;
///
/// let options = AnalysisOptions::builder()
///     .minimum_cohesion(0.8)
///     .max_depth(2)
///     .build()
///     .unwrap();
/// assert_eq!(options.minimum_frequency(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawOptions")]
pub struct AnalysisOptions {
    minimum_cohesion: f64,
    minimum_frequency: usize,
    max_depth: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            minimum_cohesion: DEFAULT_MINIMUM_COHESION,
            minimum_frequency: DEFAULT_MINIMUM_FREQUENCY,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl AnalysisOptions {
    /// Starts a builder seeded with the defaults.
    pub fn builder() -> AnalysisOptionsBuilder {
        AnalysisOptionsBuilder::default()
    }

    /// Minimum Jaccard similarity for two patterns to share a cluster.
    pub fn minimum_cohesion(&self) -> f64 {
        self.minimum_cohesion
    }

    /// Minimum occurrence count for a pattern to be reported.
    pub fn minimum_frequency(&self) -> usize {
        self.minimum_frequency
    }

    /// Depth ceiling for hierarchical detection (roots are depth 1).
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Content hash of the option values, used in cache keys.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = ContentHasher::new("options");
        hasher.write_f64(self.minimum_cohesion);
        hasher.write_usize(self.minimum_frequency);
        hasher.write_usize(self.max_depth);
        hasher.finish()
    }

    /// Returns a builder seeded with these values.
    pub fn to_builder(&self) -> AnalysisOptionsBuilder {
        AnalysisOptionsBuilder {
            minimum_cohesion: Some(self.minimum_cohesion),
            minimum_frequency: Some(self.minimum_frequency),
            max_depth: Some(self.max_depth),
        }
    }
}

/// Builder for [`AnalysisOptions`].
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptionsBuilder {
    minimum_cohesion: Option<f64>,
    minimum_frequency: Option<usize>,
    max_depth: Option<usize>,
}

impl AnalysisOptionsBuilder {
    /// Set the minimum cluster cohesion.
    pub fn minimum_cohesion(mut self, value: f64) -> Self {
        self.minimum_cohesion = Some(value);
        self
    }

    /// Set the minimum pattern frequency.
    pub fn minimum_frequency(mut self, value: usize) -> Self {
        self.minimum_frequency = Some(value);
        self
    }

    /// Set the hierarchical depth ceiling.
    pub fn max_depth(mut self, value: usize) -> Self {
        self.max_depth = Some(value);
        self
    }

    /// Validates and builds the options.
    pub fn build(self) -> Result<AnalysisOptions, OptionsError> {
        let default = AnalysisOptions::default();
        let options = AnalysisOptions {
            minimum_cohesion: self.minimum_cohesion.unwrap_or(default.minimum_cohesion),
            minimum_frequency: self.minimum_frequency.unwrap_or(default.minimum_frequency),
            max_depth: self.max_depth.unwrap_or(default.max_depth),
        };

        if !(0.0..=1.0).contains(&options.minimum_cohesion) {
            return Err(OptionsError::Cohesion(options.minimum_cohesion));
        }
        if options.minimum_frequency == 0 {
            return Err(OptionsError::Frequency);
        }
        if options.max_depth == 0 {
            return Err(OptionsError::Depth);
        }
        Ok(options)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOptions {
    #[serde(default)]
    minimum_cohesion: Option<f64>,
    #[serde(default)]
    minimum_frequency: Option<usize>,
    #[serde(default)]
    max_depth: Option<usize>,
}

impl TryFrom<RawOptions> for AnalysisOptions {
    type Error = OptionsError;

    fn try_from(raw: RawOptions) -> Result<Self, Self::Error> {
        AnalysisOptionsBuilder {
            minimum_cohesion: raw.minimum_cohesion,
            minimum_frequency: raw.minimum_frequency,
            max_depth: raw.max_depth,
        }
        .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = AnalysisOptions::default();
        assert_eq!(options.minimum_cohesion(), 0.5);
        assert_eq!(options.minimum_frequency(), 2);
        assert_eq!(options.max_depth(), 3);
        assert_eq!(AnalysisOptions::builder().build(), Ok(options));
    }

    #[test]
    fn test_builder_rejects_out_of_range() {
        assert_eq!(
            AnalysisOptions::builder().minimum_cohesion(1.5).build(),
            Err(OptionsError::Cohesion(1.5))
        );
        assert!(AnalysisOptions::builder()
            .minimum_cohesion(f64::NAN)
            .build()
            .is_err());
        assert_eq!(
            AnalysisOptions::builder().minimum_frequency(0).build(),
            Err(OptionsError::Frequency)
        );
        assert_eq!(
            AnalysisOptions::builder().max_depth(0).build(),
            Err(OptionsError::Depth)
        );
    }

    #[test]
    fn test_fingerprint_tracks_values() {
        let a = AnalysisOptions::default();
        let b = a.to_builder().max_depth(4).build().unwrap();
        assert_eq!(a.fingerprint(), AnalysisOptions::default().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_deserialize_partial_yaml() {
        let options: AnalysisOptions = serde_yaml::from_str("minimum_cohesion: 0.75\n").unwrap();
        assert_eq!(options.minimum_cohesion(), 0.75);
        assert_eq!(options.max_depth(), 3);
    }

    #[test]
    fn test_deserialize_validates() {
        let result: Result<AnalysisOptions, _> = serde_yaml::from_str("max_depth: 0\n");
        assert!(result.is_err());
        let result: Result<AnalysisOptions, _> = serde_yaml::from_str("colour: red\n");
        assert!(result.is_err());
    }
}
