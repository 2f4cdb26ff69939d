//! Events posted by the screens and the listeners that react to them

pub mod applicant_logger;
pub mod downloader;
pub mod summarizer;

pub use applicant_logger::ApplicantLogger;
pub use downloader::{pdf_dest_path, pdf_file_name, DownloadCompletions, DownloadPool, Downloader};
pub use summarizer::{Summarizer, Summary, SummaryHandle};

use crate::error::Result;
use evision_types::Applicant;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::PathBuf;

/// Where a generated PDF can be fetched from, with the headers the
/// browser session would have sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfSource {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A new applicant is current, or the current one is finished with
    ApplicantChanged(Option<Applicant>),
    PdfGenerated(PdfSource),
    /// The PDF was generated without the listed documents
    PdfGenerationCaveat { problematic: Vec<String> },
    PdfGenerationFailed { message: String },
    PdfDownloaded { applicant: Applicant, path: PathBuf },
    PdfDownloadFailed { applicant: Applicant, error: String },
    /// `error` is set when the run is ending because of an uncaught error
    RunFinishing { error: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ApplicantChanged,
    PdfGenerated,
    PdfGenerationCaveat,
    PdfGenerationFailed,
    PdfDownloaded,
    PdfDownloadFailed,
    RunFinishing,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ApplicantChanged(_) => EventKind::ApplicantChanged,
            Self::PdfGenerated(_) => EventKind::PdfGenerated,
            Self::PdfGenerationCaveat { .. } => EventKind::PdfGenerationCaveat,
            Self::PdfGenerationFailed { .. } => EventKind::PdfGenerationFailed,
            Self::PdfDownloaded { .. } => EventKind::PdfDownloaded,
            Self::PdfDownloadFailed { .. } => EventKind::PdfDownloadFailed,
            Self::RunFinishing { .. } => EventKind::RunFinishing,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApplicantChanged(Some(applicant)) => write!(f, "ApplicantChanged({})", applicant),
            Self::ApplicantChanged(None) => write!(f, "ApplicantChanged(None)"),
            Self::PdfGenerated(source) => write!(f, "PdfGenerated({})", source.url),
            Self::PdfGenerationCaveat { problematic } => write!(f, "PdfGenerationCaveat({:?})", problematic),
            Self::PdfGenerationFailed { message } => write!(f, "PdfGenerationFailed({:?})", message),
            Self::PdfDownloaded { applicant, path } => {
                write!(f, "PdfDownloaded({}, {})", applicant, path.display())
            }
            Self::PdfDownloadFailed { applicant, error } => {
                write!(f, "PdfDownloadFailed({}, {:?})", applicant, error)
            }
            Self::RunFinishing { error: Some(error) } => write!(f, "RunFinishing(error={:?})", error),
            Self::RunFinishing { error: None } => write!(f, "RunFinishing"),
        }
    }
}

/// Something that reacts to events
pub trait Listener: Send {
    fn name(&self) -> &'static str;

    /// Kinds of events this listener is routed
    fn interests(&self) -> &'static [EventKind];

    /// Handle one event, returning follow-up events to post
    fn handle(&mut self, event: &Event) -> Result<Vec<Event>>;
}

/// Routes events to listeners by kind
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn Listener>>,
    routes: HashMap<EventKind, Vec<usize>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: impl Listener + 'static) {
        let index = self.listeners.len();
        for kind in listener.interests() {
            self.routes.entry(*kind).or_default().push(index);
        }
        log::debug!("Registered listener {}", listener.name());
        self.listeners.push(Box::new(listener));
    }

    /// Dispatch an event and, after it, every follow-up event in FIFO order.
    ///
    /// A failing listener is logged and skipped.
    pub fn post(&mut self, event: Event) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            log::trace!("Posting {}", event);
            let Some(route) = self.routes.get(&event.kind()) else {
                continue;
            };
            for &index in route {
                let listener = &mut self.listeners[index];
                match listener.handle(&event) {
                    Ok(follow_ups) => queue.extend(follow_ups),
                    Err(e) => log::error!("Listener {} failed to handle {}: {}", listener.name(), event, e),
                }
            }
        }
    }
}
