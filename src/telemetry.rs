use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level when set. `format` is one of
/// `json`, `pretty` or `compact`; anything else falls back to `compact`.
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(settings: &LoggingSettings) -> bool {
    let installed =
        tracing::subscriber::set_global_default(build_subscriber(settings, std::io::stdout)).is_ok();

    if installed {
        tracing::info!(
            "Tracing initialised (level {}, format {})",
            settings.level,
            settings.format
        );
    }
    installed
}

fn build_subscriber<W>(settings: &LoggingSettings, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(writer);

    match settings.format.as_str() {
        "json" => Box::new(builder.json().finish()),
        "pretty" => Box::new(builder.pretty().finish()),
        _ => Box::new(builder.compact().finish()),
    }
}
