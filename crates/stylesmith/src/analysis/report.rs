use serde::Serialize;

use super::bem::NamingViolation;
use super::cluster::Cluster;
use super::detect::PatternCandidate;
use super::metrics::{PerformanceMetrics, StyleMetrics};
use crate::validate::ValidationError;

/// Everything one analysis run found. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Warning-severity validation findings.
    pub warnings: Vec<ValidationError>,
    /// Merged pattern candidates.
    pub candidates: Vec<PatternCandidate>,
    /// Clusters of similar candidates.
    pub clusters: Vec<Cluster>,
    /// BEM naming violations.
    pub naming_violations: Vec<NamingViolation>,
    /// Duplication and specificity metrics.
    pub metrics: StyleMetrics,
    /// Selector cost indicators.
    pub performance: PerformanceMetrics,
}

impl AnalysisReport {
    /// Returns true if nothing worth reporting was found.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
            && self.candidates.is_empty()
            && self.naming_violations.is_empty()
    }
}
