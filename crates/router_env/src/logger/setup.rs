//!
//! Setup logging subsystem.
//!

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use super::config;

/// Keeps the non-blocking log writers flushing until it is dropped.
#[derive(Debug)]
pub struct TelemetryGuard {
    _log_guards: Vec<WorkerGuard>,
}

///
/// Setup logging sub-system.
/// Expects config and list of names of crates to watch.
///
/// `RUST_LOG` overrides the levels from the config. Installing a second global subscriber fails;
/// the failure is reported and the already installed one stays in place.
///
pub fn setup<Str: AsRef<str>>(
    conf: &config::Log,
    service_name: &str,
    crates_to_watch: impl IntoIterator<Item = Str>,
) -> TelemetryGuard {
    let mut guards = Vec::new();

    let file_layer = if conf.file.enabled {
        let mut path = crate::env::workspace_path();
        path.push(PathBuf::from(&conf.file.path));
        let file_appender = tracing_appender::rolling::hourly(&path, &conf.file.file_name);
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
        guards.push(guard);

        let file_filter = filter::Targets::new().with_default(conf.file.level.into_level());
        Some(
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(file_writer)
                .with_filter(file_filter),
        )
    } else {
        None
    };

    let console_layer = if conf.console.enabled {
        let (console_writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        guards.push(guard);

        let level = conf.console.level.into_level();
        let mut console_filter = filter::Targets::new().with_default(tracing::Level::WARN);
        for acrate in crates_to_watch {
            console_filter = console_filter.with_target(acrate.as_ref(), level);
        }

        let layer = match conf.console.log_format {
            config::LogFormat::Default => fmt::layer()
                .with_timer(fmt::time::time())
                .pretty()
                .with_writer(console_writer)
                .with_filter(console_filter)
                .boxed(),
            config::LogFormat::Json => fmt::layer()
                .json()
                .with_writer(console_writer)
                .with_filter(console_filter)
                .boxed(),
        };
        Some(layer)
    } else {
        None
    };

    let env_filter = match conf.console.filtering_directive.as_deref() {
        Some(directive) => EnvFilter::builder()
            .with_default_directive(tracing::Level::TRACE.into())
            .parse_lossy(directive),
        None => EnvFilter::builder()
            .with_default_directive(tracing::Level::TRACE.into())
            .from_env_lossy(),
    };

    let installed = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(env_filter)
        .try_init();

    if let Err(error) = installed {
        tracing::warn!(service = service_name, %error, "logger was already initialised");
    } else {
        tracing::debug!(service = service_name, "logger initialised");
    }

    TelemetryGuard {
        _log_guards: guards,
    }
}
