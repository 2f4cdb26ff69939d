use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "evision-dl", version, about = "Download merged applicant PDFs from eVision")]
pub struct Cli {
    /// Directory the applicant PDFs are saved to
    pub dest_dir: PathBuf,

    /// Settings file (TOML, JSON or YAML)
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log filter directives, e.g. "debug" or "evision_core::screens=trace"
    #[arg(long, value_name = "SPEC")]
    pub log_filter: Option<String>,

    /// Don't replay recent debug output when a run crashes
    #[arg(long)]
    pub no_replay: bool,

    /// Write geckodriver's own log here instead of discarding it
    #[arg(long, value_name = "PATH")]
    pub webdriver_log: Option<PathBuf>,

    /// Use an already running WebDriver server instead of starting geckodriver
    #[arg(long, value_name = "URL", env = "EVISION_WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// geckodriver binary to start
    #[arg(long, value_name = "PATH", default_value = "geckodriver")]
    pub geckodriver: PathBuf,

    /// Port for the geckodriver we start
    #[arg(long, default_value_t = 4444)]
    pub port: u16,
}
