//! Sync report: the aggregated, serializable outcome of one sweep.

use serde::Serialize;

use sitegen_core::{LocaleCode, RecordId};

use crate::paths::ArtifactPath;

/// Classification of one `(locale, record)` pair. First match wins, in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Decision {
    SkipProtected,
    SkipManual,
    Generate,
    SkipUpToDate,
}

/// Decision for one pair, and whether the artifact was actually written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairOutcome {
    pub locale: LocaleCode,
    pub record: RecordId,
    pub path: ArtifactPath,
    pub decision: Decision,
    pub written: bool,
}

/// A record skipped for bad data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordWarning {
    pub record: RecordId,
    pub message: String,
}

/// A pair whose render failed. Its ledger entry was left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairFailure {
    pub locale: LocaleCode,
    pub record: RecordId,
    pub path: ArtifactPath,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub dry_run: bool,
    pub template_changed: bool,
    /// Written artifacts, or in a dry run the pairs that would be written.
    pub generated: usize,
    pub skipped_protected: usize,
    pub skipped_manual: usize,
    pub skipped_up_to_date: usize,
    pub outcomes: Vec<PairOutcome>,
    pub warnings: Vec<RecordWarning>,
    pub failures: Vec<PairFailure>,
}

impl SyncReport {
    pub(crate) fn new(dry_run: bool, template_changed: bool) -> Self {
        SyncReport {
            dry_run,
            template_changed,
            ..SyncReport::default()
        }
    }

    /// Count a classified pair. Generate is counted by the caller once it succeeds.
    pub(crate) fn record(&mut self, outcome: PairOutcome) {
        match outcome.decision {
            Decision::SkipProtected => self.skipped_protected += 1,
            Decision::SkipManual => self.skipped_manual += 1,
            Decision::SkipUpToDate => self.skipped_up_to_date += 1,
            Decision::Generate if outcome.written || self.dry_run => self.generated += 1,
            Decision::Generate => {}
        }
        self.outcomes.push(outcome);
    }

    /// All skips, whatever the reason.
    pub fn skipped(&self) -> usize {
        self.skipped_protected + self.skipped_manual + self.skipped_up_to_date
    }

    /// `true` when no record was skipped for bad data and no render failed.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.failures.is_empty()
    }

    /// Path and decision per pair, in sweep order.
    pub fn decisions(&self) -> Vec<(&ArtifactPath, Decision)> {
        self.outcomes
            .iter()
            .map(|outcome| (&outcome.path, outcome.decision))
            .collect()
    }

    /// Paths written during this sweep.
    pub fn written(&self) -> impl Iterator<Item = &ArtifactPath> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.written)
            .map(|outcome| &outcome.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(decision: Decision, written: bool) -> PairOutcome {
        PairOutcome {
            locale: LocaleCode::parse("en").unwrap(),
            record: RecordId::from("Estonia"),
            path: ArtifactPath::new("en/country/send-sms-estonia.astro"),
            decision,
            written,
        }
    }

    #[test]
    fn counts_follow_decisions() {
        let mut report = SyncReport::new(false, false);
        report.record(outcome(Decision::Generate, true));
        report.record(outcome(Decision::Generate, false));
        report.record(outcome(Decision::SkipManual, false));
        report.record(outcome(Decision::SkipProtected, false));
        report.record(outcome(Decision::SkipUpToDate, false));
        assert_eq!(report.generated, 1, "unwritten generate is a failure, not a write");
        assert_eq!(report.skipped(), 3);
        assert_eq!(report.written().count(), 1);
        assert_eq!(report.decisions().len(), 5);
    }

    #[test]
    fn dry_run_counts_would_generate() {
        let mut report = SyncReport::new(true, false);
        report.record(outcome(Decision::Generate, false));
        assert_eq!(report.generated, 1);
        assert_eq!(report.written().count(), 0);
    }

    #[test]
    fn serializes_camel_case() {
        let mut report = SyncReport::new(false, true);
        report.record(outcome(Decision::SkipUpToDate, false));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["skippedUpToDate"], 1);
        assert_eq!(json["templateChanged"], true);
        assert_eq!(json["outcomes"][0]["decision"], "skipUpToDate");
        assert_eq!(json["outcomes"][0]["path"], "en/country/send-sms-estonia.astro");
        assert_eq!(json["outcomes"][0]["locale"], "en");
    }
}
