//! Console logging plus capture into the instant-replay buffer

use evision_core::replay::{ReplayBuffer, REPLAY_TARGET};
use log::{LevelFilter, Log, Metadata, Record};

/// Forwards records to env_logger and keeps the debug-level ones from our
/// own crates in a [`ReplayBuffer`]
pub struct ReplayLogger {
    console: env_logger::Logger,
    replay: Option<ReplayBuffer>,
}

impl ReplayLogger {
    pub fn new(filter: Option<&str>, replay: Option<ReplayBuffer>) -> Self {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
        if let Some(filter) = filter {
            builder.parse_filters(filter);
        }
        Self {
            console: builder.build(),
            replay,
        }
    }

    /// Most verbose level any destination wants
    pub fn max_level(&self) -> LevelFilter {
        match self.replay {
            Some(_) => self.console.filter().max(LevelFilter::Debug),
            None => self.console.filter(),
        }
    }

    fn captures(&self, metadata: &Metadata) -> bool {
        self.replay.is_some()
            && metadata.level() <= LevelFilter::Debug
            && metadata.target().starts_with("evision")
            && metadata.target() != REPLAY_TARGET
    }

    /// Install as the global logger
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        let max_level = self.max_level();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl Log for ReplayLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata) || self.captures(metadata)
    }

    fn log(&self, record: &Record) {
        self.console.log(record);

        if let Some(replay) = &self.replay {
            if self.captures(record.metadata()) {
                replay.record(format!(
                    "{} {:<5} {}: {}",
                    chrono::Local::now().format("%H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    record.args()
                ));
            }
        }
    }

    fn flush(&self) {
        self.console.flush();
    }
}
