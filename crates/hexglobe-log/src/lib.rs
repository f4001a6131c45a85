//! Tracing subscriber setup for globe binaries.
//!
//! Console output always; a JSON log file next to it in debug builds.
//! `RUST_LOG` takes precedence over the configured level.

use std::path::Path;

use hexglobe_config::GlobeConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "hexglobe.log";

/// Filter directive for `config`, falling back to [`DEFAULT_FILTER`].
pub fn filter_directive(config: Option<&GlobeConfig>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => config.debug.log_level.clone(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Install the global subscriber.
///
/// * `log_dir` - directory for the JSON log file, used only when `debug_build`
/// * `config` - source of the log level when `RUST_LOG` is unset
///
/// ```no_run
/// use hexglobe_config::GlobeConfig;
///
/// let config = GlobeConfig::default();
/// hexglobe_log::init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&GlobeConfig>) {
    let filter_str = filter_directive(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        tracing::debug!(dir = %log_dir.display(), "File logging enabled");
        return;
    }

    subscriber.init();
}

/// [`DEFAULT_FILTER`] as an `EnvFilter`.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiets_gpu_crates() {
        let filter_str = format!("{}", default_env_filter());
        assert!(filter_str.contains("wgpu=warn"));
        assert!(filter_str.contains("naga=warn"));
        assert!(filter_str.contains("info"));
    }

    #[test]
    fn test_directive_without_config_is_default() {
        assert_eq!(filter_directive(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_directive_uses_configured_level() {
        let mut config = GlobeConfig::default();
        config.debug.log_level = "debug,hexglobe_globe=trace".to_string();
        assert_eq!(filter_directive(Some(&config)), "debug,hexglobe_globe=trace");
    }

    #[test]
    fn test_blank_configured_level_falls_back() {
        let mut config = GlobeConfig::default();
        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directive(Some(&config)), DEFAULT_FILTER);
    }

    #[test]
    fn test_crate_filters_parse() {
        for directive in ["info", "debug,hexglobe_globe=trace", "warn,hexglobe_particles=debug"] {
            assert!(EnvFilter::try_new(directive).is_ok(), "failed to parse {directive}");
        }
    }

    #[test]
    fn test_log_file_lands_in_log_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(LOG_FILE_NAME);
        assert_eq!(path.parent(), Some(temp_dir.path()));
        assert_eq!(path.file_name().unwrap(), "hexglobe.log");
    }
}
