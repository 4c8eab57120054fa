//! Duration-based severity grading of detected pauses.

use serde::{Deserialize, Serialize};

use crate::pause::{BreathingPause, Severity};

/// Ascending duration cutoffs, in seconds. Each cutoff is an inclusive
/// lower bound for its grade; durations below the hypopnea cutoff are
/// graded normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeverityThresholds {
    pub hypopnea_secs: f64,
    pub mild_secs: f64,
    pub moderate_secs: f64,
    pub severe_secs: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            hypopnea_secs: 3.0,
            mild_secs: 10.0,
            moderate_secs: 20.0,
            severe_secs: 30.0,
        }
    }
}

impl SeverityThresholds {
    /// Grades a pause duration: the highest severity whose cutoff is met,
    /// evaluated from most to least severe.
    pub fn grade(&self, duration_secs: f64) -> Severity {
        if duration_secs >= self.severe_secs {
            Severity::SevereApnea
        } else if duration_secs >= self.moderate_secs {
            Severity::ModerateApnea
        } else if duration_secs >= self.mild_secs {
            Severity::MildApnea
        } else if duration_secs >= self.hypopnea_secs {
            Severity::Hypopnea
        } else {
            Severity::Normal
        }
    }
}

/// Grades every pause by its duration, returning new values.
///
/// Elements are independent: no ordering dependency, no shared state, so
/// a caller may split the work across threads freely.
pub fn classify(pauses: Vec<BreathingPause>, thresholds: &SeverityThresholds) -> Vec<BreathingPause> {
    pauses
        .into_iter()
        .map(|pause| {
            let severity = thresholds.grade(pause.duration_secs());
            pause.with_severity(severity)
        })
        .collect()
}
