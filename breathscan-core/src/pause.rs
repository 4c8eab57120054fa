//! Domain types: detected pauses, severity grades, and per-file summaries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity grade of a breathing pause.
///
/// `Unset` is the state between segmentation and classification; the
/// classifier replaces it with one of the graded variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Unset,
    Normal,
    Hypopnea,
    MildApnea,
    ModerateApnea,
    SevereApnea,
}

impl Severity {
    /// Whether this grade counts as a clinically relevant event.
    pub fn is_health_concern(self) -> bool {
        matches!(
            self,
            Severity::Hypopnea | Severity::MildApnea | Severity::ModerateApnea | Severity::SevereApnea
        )
    }

    /// Stable lowercase name, matching the serde representation.
    pub fn name(self) -> &'static str {
        match self {
            Severity::Unset => "unset",
            Severity::Normal => "normal",
            Severity::Hypopnea => "hypopnea",
            Severity::MildApnea => "mild_apnea",
            Severity::ModerateApnea => "moderate_apnea",
            Severity::SevereApnea => "severe_apnea",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One detected breathing pause within a single audio file.
///
/// A value record: classification produces a new value via
/// `with_severity` rather than mutating a shared one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathingPause {
    /// Identity of the source audio file (its file name).
    pub source: String,
    /// 1-based sequence index within the source file.
    pub index: u32,
    pub start_secs: f64,
    pub end_secs: f64,
    pub severity: Severity,
}

impl BreathingPause {
    pub fn new(source: impl Into<String>, index: u32, start_secs: f64, end_secs: f64) -> Self {
        Self {
            source: source.into(),
            index,
            start_secs,
            end_secs,
            severity: Severity::Unset,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }

    /// Returns a copy of this pause with the severity bound.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Per-pause entry of an [`AnalysisSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseReport {
    pub index: u32,
    pub start_secs: f64,
    pub end_secs: f64,
    pub duration_secs: f64,
    pub severity: Severity,
}

/// Roll-up of one file's classified pauses with a per-severity breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub filename: String,
    pub total_pauses: usize,
    pub normal_count: usize,
    pub hypopnea_count: usize,
    pub mild_apnea_count: usize,
    pub moderate_apnea_count: usize,
    pub severe_apnea_count: usize,
    /// Pauses graded hypopnea or worse.
    pub apnea_event_count: usize,
    pub pauses: Vec<PauseReport>,
}

impl AnalysisSummary {
    pub fn from_pauses(filename: impl Into<String>, pauses: &[BreathingPause]) -> Self {
        let count = |severity: Severity| pauses.iter().filter(|p| p.severity == severity).count();

        Self {
            filename: filename.into(),
            total_pauses: pauses.len(),
            normal_count: count(Severity::Normal),
            hypopnea_count: count(Severity::Hypopnea),
            mild_apnea_count: count(Severity::MildApnea),
            moderate_apnea_count: count(Severity::ModerateApnea),
            severe_apnea_count: count(Severity::SevereApnea),
            apnea_event_count: pauses.iter().filter(|p| p.severity.is_health_concern()).count(),
            pauses: pauses
                .iter()
                .map(|p| PauseReport {
                    index: p.index,
                    start_secs: p.start_secs,
                    end_secs: p.end_secs,
                    duration_secs: p.duration_secs(),
                    severity: p.severity,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_severity_returns_a_new_value() {
        let pause = BreathingPause::new("night.wav", 1, 1.0, 5.0);
        assert_eq!(pause.severity, Severity::Unset);

        let graded = pause.clone().with_severity(Severity::Hypopnea);
        assert_eq!(graded.severity, Severity::Hypopnea);
        assert_eq!(pause.severity, Severity::Unset);
        assert_eq!(graded.duration_secs(), 4.0);
    }

    #[test]
    fn summary_counts_each_severity() {
        let pauses = vec![
            BreathingPause::new("a.wav", 1, 0.0, 1.0).with_severity(Severity::Normal),
            BreathingPause::new("a.wav", 2, 2.0, 6.0).with_severity(Severity::Hypopnea),
            BreathingPause::new("a.wav", 3, 8.0, 20.0).with_severity(Severity::MildApnea),
            BreathingPause::new("a.wav", 4, 25.0, 60.0).with_severity(Severity::SevereApnea),
        ];

        let summary = AnalysisSummary::from_pauses("a.wav", &pauses);
        assert_eq!(summary.total_pauses, 4);
        assert_eq!(summary.normal_count, 1);
        assert_eq!(summary.hypopnea_count, 1);
        assert_eq!(summary.mild_apnea_count, 1);
        assert_eq!(summary.moderate_apnea_count, 0);
        assert_eq!(summary.severe_apnea_count, 1);
        assert_eq!(summary.apnea_event_count, 3);
        assert_eq!(summary.pauses.len(), 4);
        assert_eq!(summary.pauses[3].duration_secs, 35.0);
    }

    #[test]
    fn summary_serializes_with_camel_case_and_snake_case_severity() {
        let pauses = vec![BreathingPause::new("a.wav", 1, 0.0, 12.0).with_severity(Severity::MildApnea)];
        let summary = AnalysisSummary::from_pauses("a.wav", &pauses);

        let json = serde_json::to_value(&summary).expect("serialize summary");
        assert_eq!(json["filename"], "a.wav");
        assert_eq!(json["totalPauses"], 1);
        assert_eq!(json["mildApneaCount"], 1);
        assert_eq!(json["apneaEventCount"], 1);
        assert_eq!(json["pauses"][0]["severity"], "mild_apnea");
        assert_eq!(json["pauses"][0]["durationSecs"], 12.0);

        let round_trip: AnalysisSummary = serde_json::from_value(json).expect("deserialize summary");
        assert_eq!(round_trip, summary);
    }
}
