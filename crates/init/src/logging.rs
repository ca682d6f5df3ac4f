//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "research_init=info,research_db=info";

/// Output format of log lines, selected with `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Install the global subscriber, reading `RUST_LOG` and `LOG_FORMAT`.
///
/// An unrecognised `LOG_FORMAT` falls back to text and is reported once
/// the subscriber is up.
pub fn init_tracing() {
    let requested = std::env::var("LOG_FORMAT").ok();
    let format = requested.as_deref().and_then(LogFormat::parse);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    match format.unwrap_or_default() {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    if let (Some(value), None) = (&requested, format) {
        tracing::warn!(value = value.as_str(), "Unknown LOG_FORMAT, using text");
    }
}
