//! Logging setup
//!
//! Two layers share one registry:
//!
//! - stderr, filtered by `RUST_LOG` (default [`CONSOLE_DEFAULT`]), so reports
//!   on stdout stay clean
//! - `~/.config/boxfit/logs/boxfit.log`, rotated daily and filtered by
//!   `BOXFIT_LOG` (default [`FILE_DEFAULT`])
//!
//! Examples: `RUST_LOG=boxfit::tags=trace`, `BOXFIT_LOG=boxfit::glyph=trace`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Loaded fonts and sheets are reported on the console; everything else only warns
pub const CONSOLE_DEFAULT: &str = "warn,boxfit::resource=info";
/// Dependencies stay quiet in the log file; this crate logs at debug
pub const FILE_DEFAULT: &str = "warn,boxfit=debug";

/// Environment variable holding the file layer's filter directives
pub const FILE_FILTER_ENV: &str = "BOXFIT_LOG";

/// Filter from `var`, or `default` when it is unset or does not parse
fn filter_from_env(var: &str, default: &str) -> EnvFilter {
    match std::env::var(var) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .unwrap_or_else(|e| {
                eprintln!("Warning: ignoring invalid {}={}: {}", var, directives, e);
                EnvFilter::new(default)
            }),
        _ => EnvFilter::new(default),
    }
}

/// Install the console and file layers. Call once, at startup.
pub fn init() {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time()
        .with_filter(filter_from_env(EnvFilter::DEFAULT_ENV, CONSOLE_DEFAULT));

    let file_layer = crate::config_paths::ensure_logs_dir()
        .map_err(|e| eprintln!("Warning: file logging disabled: {}", e))
        .ok()
        .map(|logs_dir| {
            fmt::layer()
                .with_writer(tracing_appender::rolling::daily(logs_dir, "boxfit.log"))
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_filter(filter_from_env(FILE_FILTER_ENV, FILE_DEFAULT))
        });

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_parse() {
        assert!(EnvFilter::try_new(CONSOLE_DEFAULT).is_ok());
        assert!(EnvFilter::try_new(FILE_DEFAULT).is_ok());
    }

    #[test]
    fn test_unset_variable_uses_default() {
        let filter = filter_from_env("BOXFIT_TEST_UNSET_FILTER", FILE_DEFAULT);
        assert_eq!(filter.to_string(), EnvFilter::new(FILE_DEFAULT).to_string());
    }
}
