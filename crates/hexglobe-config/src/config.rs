//! Globe settings with defaults and RON persistence.

use std::path::Path;

use hexglobe_math::Rgb;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File the configuration is stored in, inside the config directory.
pub const CONFIG_FILE_NAME: &str = "globe.ron";

/// Top-level globe configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlobeConfig {
    pub view: ViewConfig,
    /// Marker trails.
    pub lines: LineConfig,
    pub labels: LabelConfig,
    pub markers: MarkerConfig,
    pub pins: PinConfig,
    pub smoke: SmokeConfig,
    pub satellites: SatelliteConfig,
    /// Tile mesh coloring.
    pub globe: GlobeStyleConfig,
    pub debug: DebugConfig,
}

/// Viewport, camera and intro sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    /// Globe width in CSS pixels.
    pub width: u32,
    /// Globe height in CSS pixels.
    pub height: u32,
    pub pixel_ratio: f64,
    /// Distance between fog near and far, also added to the camera far plane.
    pub depth: f64,
    /// Initial camera scale. The camera sits at `1700 / scale`.
    pub scale: f64,
    pub background: Rgb,
    pub fog_color: Rgb,
    pub intro_line_color: Rgb,
    pub intro_line_count: usize,
    pub intro_line_altitude: f64,
    pub intro_line_duration_ms: f64,
    /// Delay before the first initial data pin appears.
    pub intro_data_offset_ms: f64,
    /// Time over which initial data pins sweep in by longitude.
    pub intro_data_duration_ms: f64,
    pub font_timeout_ms: f64,
    /// Time for one full camera orbit. Zero stops the orbit.
    pub day_length_ms: f64,
    /// Camera tilt above the equator, in radians.
    pub view_angle: f64,
    pub fov_deg: f64,
}

/// Trails between chained markers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LineConfig {
    /// Side of the shared trail texture.
    pub canvas: u32,
    pub color: Rgb,
    /// Waypoints per trail, minus one.
    pub segments: usize,
    pub opacity: f64,
    pub width: f64,
    /// Time to reveal a full trail.
    pub draw_ms: f64,
    /// Altitude offset of the dotted twin trail. Zero hides the twin.
    pub dot_wiggle: f64,
}

/// Text labels on markers and pins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LabelConfig {
    pub font_family: String,
    pub color: Rgb,
    pub size: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub stroke_color: Rgb,
    pub stroke_width: f64,
    pub underline_width: f64,
    pub underline_offset: f64,
    pub underline_color: Rgb,
    pub background: Rgb,
    pub fade_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarkerConfig {
    pub color: Rgb,
    pub opacity: f64,
    /// Side of the shared marker texture, also the icon's full scale.
    pub canvas: u32,
    pub stroke_width: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Duration of the icon's grow-in.
    pub scale_ms: f64,
    pub max_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PinConfig {
    pub color: Rgb,
    pub line_color: Rgb,
    /// Side of the shared pin-top texture, also the top sprite's scale.
    pub canvas: u32,
    pub text_size: f64,
    pub fade_ms: f64,
    pub outer_radius: f64,
    /// Duration of the stalk's rise.
    pub draw_ms: f64,
    pub max_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SmokeConfig {
    pub color: Rgb,
    /// Total particle slots.
    pub count: usize,
    pub per_pin: usize,
    pub per_second: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SatelliteConfig {
    pub color: Rgb,
    /// Period of the satellite wave animation.
    pub wave_period_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlobeStyleConfig {
    /// Color of anomalous tiles.
    pub base_color: Rgb,
    /// Stops of the basis spline tiles are colored through.
    pub scheme_stops: Vec<Rgb>,
    /// Seed for jitter and missing tile values. Unset draws from entropy.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter directive, e.g. "debug" or "info,hexglobe_globe=trace".
    pub log_level: String,
}

// --- Default implementations ---

const YELLOW: Rgb = Rgb::new(1.0, 204.0 / 255.0, 0.0);
const TEAL: Rgb = Rgb::new(143.0 / 255.0, 216.0 / 255.0, 216.0 / 255.0);
const LIGHT_GREY: Rgb = Rgb::new(238.0 / 255.0, 238.0 / 255.0, 238.0 / 255.0);

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            pixel_ratio: 1.0,
            depth: 350.0,
            scale: 1.0,
            background: Rgb::BLACK,
            fog_color: Rgb::BLACK,
            intro_line_color: TEAL,
            intro_line_count: 80,
            intro_line_altitude: 1.10,
            intro_line_duration_ms: 2000.0,
            intro_data_offset_ms: 2000.0,
            intro_data_duration_ms: 2000.0,
            font_timeout_ms: 10_000.0,
            day_length_ms: 28_000.0,
            view_angle: 0.0,
            fov_deg: 50.0,
        }
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            canvas: 128,
            color: YELLOW,
            segments: 256,
            opacity: 0.7,
            width: 6.0,
            draw_ms: 5000.0,
            dot_wiggle: 0.0,
        }
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            font_family: "Verdana".to_string(),
            color: Rgb::WHITE,
            size: 22.0,
            padding_x: 10.0,
            padding_y: 10.0,
            stroke_color: Rgb::BLACK,
            stroke_width: 3.0,
            underline_width: 4.0,
            underline_offset: 4.0,
            underline_color: YELLOW,
            background: LIGHT_GREY,
            fade_ms: 2000.0,
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            color: YELLOW,
            opacity: 0.85,
            canvas: 64,
            stroke_width: 3.0,
            inner_radius: 14.0,
            outer_radius: 22.0,
            scale_ms: 2000.0,
            max_count: 4,
        }
    }
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            color: TEAL,
            line_color: TEAL,
            canvas: 32,
            text_size: 18.0,
            fade_ms: 500.0,
            outer_radius: 7.0,
            draw_ms: 2000.0,
            max_count: 500,
        }
    }
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            color: LIGHT_GREY,
            count: 5000,
            per_pin: 30,
            per_second: 20.0,
        }
    }
}

impl Default for SatelliteConfig {
    fn default() -> Self {
        Self {
            color: Rgb::new(1.0, 0.0, 0.0),
            wave_period_ms: 1000.0,
        }
    }
}

impl Default for GlobeStyleConfig {
    fn default() -> Self {
        Self {
            base_color: Rgb::new(3.0 / 255.0, 21.0 / 255.0, 61.0 / 255.0),
            scheme_stops: vec![
                Rgb::from_u8(252, 237, 177),
                Rgb::from_u8(252, 220, 88),
                Rgb::from_u8(252, 202, 3),
                Rgb::from_u8(166, 133, 2),
                Rgb::from_u8(166, 144, 58),
                Rgb::from_u8(166, 156, 116),
                Rgb::from_u8(77, 72, 54),
            ],
            seed: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Validation ---

impl GlobeConfig {
    /// Reject values the globe cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::InvalidValue {
                field,
                reason: reason.to_string(),
            })
        };
        if self.view.scale <= 0.0 {
            return invalid("view.scale", "must be positive");
        }
        if self.lines.segments == 0 {
            return invalid("lines.segments", "must be at least 1");
        }
        if self.smoke.per_pin > self.smoke.count {
            return invalid("smoke.per_pin", "cannot exceed smoke.count");
        }
        if self.smoke.per_second <= 0.0 {
            return invalid("smoke.per_second", "must be positive");
        }
        if self.globe.scheme_stops.len() < 2 {
            return invalid("globe.scheme_stops", "needs at least two stops");
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl GlobeConfig {
    /// Load `globe.ron` from `config_dir`, or write and return the default.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let config = Self::read(config_dir)?;
            config.validate()?;
            tracing::info!(path = %config_path.display(), "Loaded globe config");
            Ok(config)
        } else {
            let config = GlobeConfig::default();
            config.save(config_dir)?;
            tracing::info!(path = %config_path.display(), "Created default globe config");
            Ok(config)
        }
    }

    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE_NAME), serialized)
            .map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-read the file. `Some` only when its contents differ from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(config_dir)?;
        if &new_config != self {
            new_config.validate()?;
            tracing::info!("Globe config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(config_dir: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(config_dir.join(CONFIG_FILE_NAME))
            .map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = GlobeConfig::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("segments: 256"));
        assert!(ron_str.contains("max_count: 500"));
        assert!(ron_str.contains("\"#ffcc00\""));
        assert!(ron_str.contains("\"#03153d\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = GlobeConfig::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: GlobeConfig = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let config = GlobeConfig::default();
        assert_eq!(config.view.day_length_ms, 28_000.0);
        assert_eq!(config.view.intro_line_count, 80);
        assert_eq!(config.markers.max_count, 4);
        assert_eq!(config.smoke.count, 5000);
        assert_eq!(config.smoke.per_pin, 30);
        assert_eq!(config.lines.color.to_hex(), "#ffcc00");
        assert_eq!(config.pins.color.to_hex(), "#8fd8d8");
        assert_eq!(config.smoke.color.to_hex(), "#eeeeee");
        assert_eq!(config.globe.scheme_stops.len(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(view: (width: 1024), pins: (max_count: 10))";
        let config: GlobeConfig = ron::from_str(ron_str).unwrap();
        assert_eq!(config.view.width, 1024);
        assert_eq!(config.view.height, 600);
        assert_eq!(config.pins.max_count, 10);
        assert_eq!(config.smoke, SmokeConfig::default());
    }

    #[test]
    fn test_color_fields_accept_short_hex() {
        let config: GlobeConfig = ron::from_str(r##"(satellites: (color: "#0f0"))"##).unwrap();
        assert_eq!(config.satellites.color.to_hex(), "#00ff00");
    }

    #[test]
    fn test_invalid_color_is_parse_error() {
        let result: Result<GlobeConfig, _> = ron::from_str(r#"(pins: (color: "teal"))"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<GlobeConfig, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_fire() {
        let mut config = GlobeConfig::default();
        config.smoke.per_pin = config.smoke.count + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "smoke.per_pin", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_segments() {
        let mut config = GlobeConfig::default();
        config.lines.segments = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GlobeConfig::default();
        config.view.width = 1920;
        config.globe.seed = Some(42);
        config.labels.font_family = "Inter".to_string();

        config.save(dir.path()).unwrap();
        let loaded = GlobeConfig::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = GlobeConfig::load_or_create(dir.path()).unwrap();
        assert_eq!(config, GlobeConfig::default());
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "(view: (scale: 0.0))").unwrap();
        assert!(matches!(
            GlobeConfig::load_or_create(dir.path()),
            Err(ConfigError::InvalidValue { field: "view.scale", .. })
        ));
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = GlobeConfig::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.pins.max_count = 50;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().pins.max_count, 50);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = GlobeConfig::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_reload_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = GlobeConfig::default().reload(dir.path());
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }

    #[test]
    fn test_ron_comments_accepted() {
        let ron_str = "// globe settings\n(\n  // nothing overridden\n)";
        let config: GlobeConfig = ron::from_str(ron_str).unwrap();
        assert_eq!(config, GlobeConfig::default());
    }
}
