//! End-of-run report

use super::{Event, EventKind, Listener};
use crate::error::Result;
use crate::replay::{ReplayBuffer, REPLAY_TARGET};
use chrono::{DateTime, Utc};
use evision_types::Applicant;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub applicant: Option<Applicant>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Caveat {
    pub applicant: Option<Applicant>,
    pub problematic: Vec<String>,
}

/// Tally of the run so far
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub downloaded: Vec<(Applicant, PathBuf)>,
    pub failures: Vec<Failure>,
    pub caveats: Vec<Caveat>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Summary {
    pub fn successes(&self) -> usize {
        self.downloaded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Read access to the summary the summarizer keeps
#[derive(Debug, Clone, Default)]
pub struct SummaryHandle(Arc<Mutex<Summary>>);

impl SummaryHandle {
    pub fn snapshot(&self) -> Summary {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

pub struct Summarizer {
    summary: SummaryHandle,
    current: Option<Applicant>,
    started_at: DateTime<Utc>,
    replay: Option<ReplayBuffer>,
}

impl Summarizer {
    pub fn new(replay: Option<ReplayBuffer>) -> Self {
        Self {
            summary: SummaryHandle::default(),
            current: None,
            started_at: Utc::now(),
            replay,
        }
    }

    pub fn summary_handle(&self) -> SummaryHandle {
        self.summary.clone()
    }

    fn update(&self, f: impl FnOnce(&mut Summary)) {
        let mut summary = self.summary.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut summary);
    }

    fn instant_replay(&self) {
        let Some(replay) = &self.replay else {
            return;
        };
        let lines = replay.take();
        if lines.is_empty() {
            return;
        }
        log::warn!(target: REPLAY_TARGET, "We encountered a problem! Begin instant replay:");
        for line in lines {
            log::warn!(target: REPLAY_TARGET, "{}", line);
        }
        log::warn!(target: REPLAY_TARGET, "End instant replay");
    }

    fn report(&self, summary: &Summary) {
        let elapsed = summary.finished_at.unwrap_or_else(Utc::now) - self.started_at;
        log::info!(
            "Downloaded {} PDFs successfully and {} unsuccessfully in {} minutes",
            summary.successes(),
            summary.failure_count(),
            elapsed.num_minutes()
        );

        if !summary.caveats.is_empty() {
            log::warn!("Generated {} PDFs with caveats:", summary.caveats.len());
            for caveat in &summary.caveats {
                log::warn!("  {}: omitted {}", describe(&caveat.applicant), caveat.problematic.join(", "));
            }
        }

        if !summary.failures.is_empty() {
            log::error!("Failed to download {} PDFs:", summary.failures.len());
            for failure in &summary.failures {
                log::error!("  {}: {}", describe(&failure.applicant), failure.reason);
            }
        }
    }
}

fn describe(applicant: &Option<Applicant>) -> String {
    match applicant {
        Some(applicant) => applicant.to_string(),
        None => "Unknown applicant".to_string(),
    }
}

impl Listener for Summarizer {
    fn name(&self) -> &'static str {
        "summarizer"
    }

    fn interests(&self) -> &'static [EventKind] {
        &[
            EventKind::ApplicantChanged,
            EventKind::PdfGenerationCaveat,
            EventKind::PdfGenerationFailed,
            EventKind::PdfDownloaded,
            EventKind::PdfDownloadFailed,
            EventKind::RunFinishing,
        ]
    }

    fn handle(&mut self, event: &Event) -> Result<Vec<Event>> {
        match event {
            Event::ApplicantChanged(applicant) => {
                self.current = applicant.clone();
                if let Some(replay) = &self.replay {
                    replay.clear();
                }
            }
            Event::PdfGenerationCaveat { problematic } => {
                let caveat = Caveat {
                    applicant: self.current.clone(),
                    problematic: problematic.clone(),
                };
                self.update(|s| s.caveats.push(caveat));
            }
            Event::PdfGenerationFailed { message } => {
                let failure = Failure {
                    applicant: self.current.clone(),
                    reason: message.clone(),
                };
                self.update(|s| s.failures.push(failure));
            }
            Event::PdfDownloaded { applicant, path } => {
                let entry = (applicant.clone(), path.clone());
                self.update(|s| s.downloaded.push(entry));
            }
            Event::PdfDownloadFailed { applicant, error } => {
                let failure = Failure {
                    applicant: Some(applicant.clone()),
                    reason: error.clone(),
                };
                self.update(|s| s.failures.push(failure));
            }
            Event::RunFinishing { error } => {
                if let Some(error) = error {
                    if let Some(applicant) = self.current.take() {
                        let failure = Failure {
                            applicant: Some(applicant),
                            reason: format!("crashed: {}", error),
                        };
                        self.update(|s| s.failures.push(failure));
                    }
                    self.instant_replay();
                }
                self.update(|s| s.finished_at = Some(Utc::now()));
                self.report(&self.summary.snapshot());
            }
            Event::PdfGenerated(_) => {}
        }
        Ok(vec![])
    }
}
