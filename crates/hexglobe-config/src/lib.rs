//! Globe configuration.
//!
//! Every tunable of the globe (colors, sizes, durations, capacities) lives in
//! one RON file, `globe.ron`. Missing sections and fields fall back to their
//! defaults so partial files load, and command-line flags override the file.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    DebugConfig, GlobeConfig, GlobeStyleConfig, LabelConfig, LineConfig, MarkerConfig, PinConfig,
    SatelliteConfig, SmokeConfig, ViewConfig, CONFIG_FILE_NAME,
};
pub use error::ConfigError;
