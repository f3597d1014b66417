//! Tracing subscriber setup for the console binary.

use std::env;
use std::sync::OnceLock;
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Level for a `-v` count: warnings by default, more with each flag.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Filter directives: a non-empty `RUST_LOG` is used verbatim, otherwise the
/// level chosen by `-v`.
fn directives(verbosity: u8, rust_log: Option<String>) -> String {
    rust_log
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| level_for(verbosity).to_string())
}

/// Install the global subscriber. When `RUST_LOG` is set it replaces the
/// `-v` level entirely. Later calls are ignored.
pub fn init(verbosity: u8) {
    INIT.get_or_init(|| {
        let directives = directives(verbosity, env::var(EnvFilter::DEFAULT_ENV).ok());
        let filter = EnvFilter::try_new(&directives)
            .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity).to_string()));
        SubscriberBuilder::default()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact()
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(2), Level::DEBUG);
        assert_eq!(level_for(9), Level::TRACE);
    }

    #[test]
    fn rust_log_wins_over_verbosity() {
        assert_eq!(directives(0, Some("debug".to_string())), "debug");
        assert_eq!(
            directives(3, Some("new0::audit=info".to_string())),
            "new0::audit=info"
        );
    }

    #[test]
    fn verbosity_applies_without_rust_log() {
        assert_eq!(directives(0, None), "WARN");
        assert_eq!(directives(1, Some("  ".to_string())), "INFO");
    }
}
