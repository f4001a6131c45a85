//! Command-line arguments for the globe runner.

use std::path::PathBuf;

use clap::Parser;

use crate::GlobeConfig;

/// Globe runner command-line arguments.
///
/// Values given here win over `globe.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "hexglobe", about = "Headless hex globe scene runner")]
pub struct CliArgs {
    /// Globe width in pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Globe height in pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Tile file in the compact JSON array format.
    #[arg(long)]
    pub tiles: Option<PathBuf>,

    /// Number of frames to run before destroying the globe.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Seed for jitter and missing tile values.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl GlobeConfig {
    /// Overlay the flags that map onto configuration values.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.view.width = w;
        }
        if let Some(h) = args.height {
            self.view.height = h;
        }
        if let Some(seed) = args.seed {
            self.globe.seed = Some(seed);
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = GlobeConfig::default();
        let args = CliArgs {
            width: Some(1920),
            height: None,
            tiles: None,
            frames: Some(10),
            seed: Some(7),
            log_level: None,
            config: None,
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.view.width, 1920);
        assert_eq!(config.globe.seed, Some(7));
        // Non-overridden fields retain defaults
        assert_eq!(config.view.height, 600);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = GlobeConfig::default();
        let mut config = GlobeConfig::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "hexglobe",
            "--frames",
            "120",
            "--tiles",
            "tiles.json",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.frames, Some(120));
        assert_eq!(args.tiles, Some(PathBuf::from("tiles.json")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.width, None);
    }
}
