//! Distributional drift scoring
//!
//! Quantifies how much each feature's distribution shifted between a
//! reference batch and a current batch, using the Population Stability
//! Index, and assembles the per-feature scores into a ranked report.

mod psi;
mod report;

pub use psi::PsiScorer;
pub use report::{DriftReport, DriftRow, DriftScorer};

use crate::error::Result;
use crate::io::DataLoader;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Qualitative drift level assigned to a PSI score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    High,
    Moderate,
    Low,
    None,
    /// Score undefined (too few points on either side)
    Undefined,
}

impl Severity {
    /// Map a finite PSI score to its level. Bounds are inclusive-lower:
    /// 0.3 is HIGH, 0.2 is MODERATE, 0.1 is LOW.
    pub fn from_psi(psi: f64) -> Self {
        if psi >= 0.3 {
            Severity::High
        } else if psi >= 0.2 {
            Severity::Moderate
        } else if psi >= 0.1 {
            Severity::Low
        } else {
            Severity::None
        }
    }

    /// Position in the report's fixed ordering, worst first
    pub fn rank(self) -> u8 {
        match self {
            Severity::High => 0,
            Severity::Moderate => 1,
            Severity::Low => 2,
            Severity::None => 3,
            Severity::Undefined => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Moderate => "MODERATE",
            Severity::Low => "LOW",
            Severity::None => "NONE",
            Severity::Undefined => "N/A",
        }
    }

    /// CSS class used for the report row ("N/A" is not a valid class name)
    pub fn css_class(self) -> &'static str {
        match self {
            Severity::Undefined => "NA",
            other => other.label(),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Stage entry point: score two persisted feature batches and write the
/// HTML report. The batch paths double as the dataset labels in the
/// report header.
pub struct DriftStage;

impl DriftStage {
    pub fn run(reference: &Path, current: &Path, out: &Path) -> Result<DriftReport> {
        let ref_df = DataLoader::load_auto(reference)?;
        let cur_df = DataLoader::load_auto(current)?;

        let report = DriftScorer::default().compare(
            &ref_df,
            &cur_df,
            &reference.display().to_string(),
            &current.display().to_string(),
        )?;
        report.save_html(out)?;

        tracing::info!(path = %out.display(), summary = %report.summary(), "drift report saved");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_boundaries_are_inclusive_lower() {
        assert_eq!(Severity::from_psi(0.3), Severity::High);
        assert_eq!(Severity::from_psi(0.2999), Severity::Moderate);
        assert_eq!(Severity::from_psi(0.2), Severity::Moderate);
        assert_eq!(Severity::from_psi(0.1), Severity::Low);
        assert_eq!(Severity::from_psi(0.0999), Severity::None);
        assert_eq!(Severity::from_psi(0.0), Severity::None);
    }

    #[test]
    fn test_severity_ordering_worst_first() {
        let mut levels = vec![
            Severity::None,
            Severity::Undefined,
            Severity::High,
            Severity::Low,
            Severity::Moderate,
        ];
        levels.sort_by_key(|l| l.rank());
        assert_eq!(
            levels,
            vec![
                Severity::High,
                Severity::Moderate,
                Severity::Low,
                Severity::None,
                Severity::Undefined,
            ]
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(Severity::Undefined.label(), "N/A");
        assert_eq!(Severity::Undefined.css_class(), "NA");
        assert_eq!(Severity::High.css_class(), "HIGH");
    }
}
