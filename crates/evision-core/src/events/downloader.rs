//! Saves generated PDFs under the destination directory

use super::{Event, EventKind, Listener, PdfSource};
use crate::clients::Fetcher;
use crate::error::Result;
use evision_types::Applicant;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// `Surname, Preferred (12345678).pdf`, safe to use as a single path component
pub fn pdf_file_name(applicant: &Applicant) -> String {
    // Keep names like ".Smith" from becoming hidden files
    let surname = if applicant.surname.starts_with('.') {
        format!(" {}", applicant.surname)
    } else {
        applicant.surname.clone()
    };
    format!(
        "{}, {} ({}).pdf",
        surname, applicant.preferred_name, applicant.student_number
    )
    .replace(['/', '\\'], " ")
}

pub fn pdf_dest_path(dest_dir: &Path, applicant: &Applicant) -> PathBuf {
    dest_dir.join(pdf_file_name(applicant))
}

/// Background downloads, at most `workers` at a time.
///
/// Completion events come back through [`DownloadCompletions`] so they can be
/// posted from the driving task.
#[derive(Clone)]
pub struct DownloadPool {
    fetcher: Arc<dyn Fetcher>,
    permits: Arc<Semaphore>,
    tasks: Arc<Mutex<JoinSet<()>>>,
    completed: mpsc::UnboundedSender<Event>,
}

pub struct DownloadCompletions(mpsc::UnboundedReceiver<Event>);

impl DownloadCompletions {
    /// Next finished download, without waiting
    pub fn try_next(&mut self) -> Option<Event> {
        self.0.try_recv().ok()
    }
}

impl DownloadPool {
    pub fn new(fetcher: Arc<dyn Fetcher>, workers: usize) -> (Self, DownloadCompletions) {
        let (completed, receiver) = mpsc::unbounded_channel();
        let pool = Self {
            fetcher,
            permits: Arc::new(Semaphore::new(workers.max(1))),
            tasks: Arc::new(Mutex::new(JoinSet::new())),
            completed,
        };
        (pool, DownloadCompletions(receiver))
    }

    fn tasks(&self) -> std::sync::MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn submit(&self, applicant: Applicant, source: PdfSource, dest: PathBuf) {
        let fetcher = Arc::clone(&self.fetcher);
        let permits = Arc::clone(&self.permits);
        let completed = self.completed.clone();

        self.tasks().spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            let event = match fetcher.fetch(&source.url, &source.headers, &dest).await {
                Ok(bytes) => {
                    log::info!("Saved {} ({} bytes)", dest.display(), bytes);
                    Event::PdfDownloaded { applicant, path: dest }
                }
                Err(e) => {
                    log::error!("Failed to download PDF for {}: {}", applicant, e);
                    Event::PdfDownloadFailed {
                        applicant,
                        error: e.to_string(),
                    }
                }
            };
            // The receiver only goes away when the run is over
            let _ = completed.send(event);
        });
    }

    pub fn in_flight(&self) -> usize {
        self.tasks().len()
    }

    /// Wait for every submitted download to finish
    pub async fn drain(&self) {
        let mut tasks = std::mem::take(&mut *self.tasks());
        if !tasks.is_empty() {
            log::info!("Waiting for {} download(s) to finish", tasks.len());
        }
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                log::error!("Download task failed: {}", e);
            }
        }
    }

    /// Cancel every download still running
    pub fn abort(&self) {
        let mut tasks = self.tasks();
        if !tasks.is_empty() {
            log::warn!("Abandoning {} download(s)", tasks.len());
        }
        tasks.abort_all();
    }
}

/// Downloads each generated PDF, or leaves an empty placeholder when
/// generation failed
pub struct Downloader {
    dest_dir: PathBuf,
    current: Option<Applicant>,
    pool: DownloadPool,
}

impl Downloader {
    pub fn new(dest_dir: impl Into<PathBuf>, pool: DownloadPool) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            current: None,
            pool,
        }
    }
}

impl Listener for Downloader {
    fn name(&self) -> &'static str {
        "downloader"
    }

    fn interests(&self) -> &'static [EventKind] {
        &[
            EventKind::ApplicantChanged,
            EventKind::PdfGenerated,
            EventKind::PdfGenerationFailed,
        ]
    }

    fn handle(&mut self, event: &Event) -> Result<Vec<Event>> {
        match event {
            Event::ApplicantChanged(applicant) => {
                self.current = applicant.clone();
                Ok(vec![])
            }
            Event::PdfGenerationFailed { message } => {
                let Some(applicant) = &self.current else {
                    log::warn!("PDF generation failed with no current applicant: {}", message);
                    return Ok(vec![]);
                };
                log::error!("No PDF for {}: {}", applicant, message);
                let path = pdf_dest_path(&self.dest_dir, applicant);
                if let Err(e) = std::fs::File::create(&path) {
                    log::error!("Failed to write placeholder {}: {}", path.display(), e);
                }
                Ok(vec![Event::ApplicantChanged(None)])
            }
            Event::PdfGenerated(source) => {
                let Some(applicant) = &self.current else {
                    log::warn!("PDF generated with no current applicant: {}", source.url);
                    return Ok(vec![]);
                };
                log::debug!("PDF for {} is at {}", applicant, source.url);
                let path = pdf_dest_path(&self.dest_dir, applicant);
                self.pool.submit(applicant.clone(), source.clone(), path);
                Ok(vec![Event::ApplicantChanged(None)])
            }
            _ => Ok(vec![]),
        }
    }
}
