//! eVision Core Library
//!
//! Drives the eVision graduate admissions pages through WebDriver: visits
//! each applicant in the open folder, asks eVision for the merged applicant
//! PDF and saves it, working around the documents that make the merge fail.

pub mod browser;
pub mod clients;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod overlay;
pub mod replay;
pub mod robot;
pub mod screens;
pub mod ui;
pub mod wait;

// Re-export main types for easy access
pub use browser::{Browser, BrowserError, Cookie, Selector};
pub use crate::config::EvisionConfig;
pub use error::{EvisionError, Result};
pub use replay::ReplayBuffer;
pub use robot::{ExitStatus, Robot};
pub use screens::Screen;

pub use clients::{FirefoxBrowser, Geckodriver, HttpFetcher};

pub use events::{
    ApplicantLogger, DownloadPool, Downloader, Event, EventBus, EventKind, Listener, PdfSource,
    Summarizer, Summary, SummaryHandle,
};

pub use evision_types::{Applicant, Document, DocumentId, DocumentSet, StudentNumber, WindowHandle};
