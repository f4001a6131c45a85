//! Gates in front of the frame loop: font readiness and the capability check.

use thiserror::Error;

use crate::GlobeError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FontError {
    #[error("font '{family}' did not load within {timeout_ms} ms")]
    Timeout { family: String, timeout_ms: f64 },

    #[error("font '{family}' is unavailable: {reason}")]
    Unavailable { family: String, reason: String },
}

/// Loads the label font before anything is drawn.
pub trait FontLoader {
    fn load(&mut self, family: &str, timeout_ms: f64) -> Result<(), FontError>;
}

/// Font loader backed by a fixed list of installed families.
#[derive(Debug, Clone, Default)]
pub struct StaticFontLoader {
    families: Vec<String>,
}

impl StaticFontLoader {
    pub fn new<I, S>(families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            families: families.into_iter().map(Into::into).collect(),
        }
    }
}

impl FontLoader for StaticFontLoader {
    fn load(&mut self, family: &str, _timeout_ms: f64) -> Result<(), FontError> {
        if self.families.iter().any(|f| f.eq_ignore_ascii_case(family)) {
            Ok(())
        } else {
            Err(FontError::Unavailable {
                family: family.to_string(),
                reason: "not installed".to_string(),
            })
        }
    }
}

/// Reports whether hardware accelerated 3D drawing is available.
pub trait CapabilityProbe {
    fn supports_3d(&self) -> bool;
}

/// Probe with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe(pub bool);

impl CapabilityProbe for StaticProbe {
    fn supports_3d(&self) -> bool {
        self.0
    }
}

/// Check the environment before constructing a globe.
pub fn preflight(probe: &dyn CapabilityProbe) -> Result<(), GlobeError> {
    if probe.supports_3d() {
        Ok(())
    } else {
        tracing::warn!("3D acceleration unavailable");
        Err(GlobeError::UnsupportedEnvironment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_loader_matches_case_insensitively() {
        let mut loader = StaticFontLoader::new(["Verdana"]);
        assert!(loader.load("verdana", 10_000.0).is_ok());
        assert!(matches!(
            loader.load("Inter", 10_000.0),
            Err(FontError::Unavailable { family, .. }) if family == "Inter"
        ));
    }

    #[test]
    fn test_preflight() {
        assert!(preflight(&StaticProbe(true)).is_ok());
        assert!(matches!(
            preflight(&StaticProbe(false)),
            Err(GlobeError::UnsupportedEnvironment)
        ));
    }
}
