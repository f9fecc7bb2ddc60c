//! Logging setup.
//!
//! A [`Logging`] value turns [`LoggingSettings`] into a `tracing` dispatcher.
//! Nothing here touches process-wide state until [`Logging::install`] is
//! called, which binaries do exactly once in `main`. Tests can build the
//! dispatcher and scope it with `tracing::dispatcher::with_default` instead.

use crate::config::LoggingSettings;
use crate::error::{CoreError, CoreResult};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Dispatch;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

pub struct Logging {
    settings: LoggingSettings,
    env_override: bool,
}

impl Logging {
    pub fn new(settings: LoggingSettings) -> Self {
        Self {
            settings,
            env_override: true,
        }
    }

    /// Ignore `RUST_LOG` and use only the configured level.
    pub fn without_env_override(mut self) -> Self {
        self.env_override = false;
        self
    }

    /// Path of today's log file, if a file sink is configured.
    pub fn file_path(&self) -> Option<PathBuf> {
        self.settings.file_dir.as_ref().map(|dir| {
            let today = chrono::Local::now().format("%Y-%m-%d");
            Path::new(dir).join(format!("{}.log", today))
        })
    }

    fn filter(&self) -> CoreResult<EnvFilter> {
        if self.env_override {
            if let Ok(filter) = EnvFilter::try_from_default_env() {
                return Ok(filter);
            }
        }
        EnvFilter::try_new(&self.settings.level)
            .map_err(|e| CoreError::Config(format!("Invalid log level '{}': {}", self.settings.level, e)))
    }

    /// Build the dispatcher without installing it.
    pub fn build(&self) -> CoreResult<Dispatch> {
        let console = self.settings.console.then(|| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
        });

        let file = match self.file_path() {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new().create(true).append(true).open(&path)?;
                Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(false)
                        .with_writer(Mutex::new(file)),
                )
            }
            None => None,
        };

        let subscriber = Registry::default()
            .with(self.filter()?)
            .with(console)
            .with(file);

        Ok(Dispatch::new(subscriber))
    }

    /// Install the dispatcher process-wide and return the root span every
    /// binary runs inside, so each line carries the application name.
    pub fn install(&self) -> CoreResult<tracing::Span> {
        let dispatch = self.build()?;
        tracing::dispatcher::set_global_default(dispatch)
            .map_err(|e| CoreError::Config(format!("Logging already initialised: {}", e)))?;
        Ok(tracing::info_span!("app", name = %self.settings.app_name))
    }
}
