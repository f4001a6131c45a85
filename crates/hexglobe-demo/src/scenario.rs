//! The sample scene the runner populates: intro data, a few live pins, a
//! flight path of markers and a small constellation.

use hexglobe_globe::{
    Connection, DataPoint, Globe, GlobeError, MarkerSpec, PinOptions, SatelliteOptions,
    SatelliteSpec,
};
use hexglobe_render::FrameRenderer;
use tracing::info;

const CITIES: &[(f64, f64, &str)] = &[
    (40.71, -74.01, "New York"),
    (51.51, -0.13, "London"),
    (35.68, 139.69, "Tokyo"),
    (-33.87, 151.21, "Sydney"),
    (-23.55, -46.63, "Sao Paulo"),
    (19.08, 72.88, "Mumbai"),
    (30.04, 31.24, "Cairo"),
    (55.76, 37.62, "Moscow"),
];

const ROUTE: &[(f64, f64, &str)] = &[
    (37.77, -122.42, "San Francisco"),
    (21.31, -157.86, "Honolulu"),
    (-17.73, 168.32, "Port Vila"),
    (1.35, 103.82, "Singapore"),
];

/// Points revealed west to east while the globe draws in.
pub(crate) fn intro_data() -> Vec<DataPoint> {
    CITIES
        .iter()
        .map(|&(lat, lon, label)| DataPoint::new(lat, lon, label))
        .collect()
}

/// Counts of what [`populate`] added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Populated {
    pub pins: usize,
    pub markers: usize,
    pub satellites: usize,
}

/// Add the live annotations to a running globe.
pub(crate) fn populate<R: FrameRenderer>(globe: &mut Globe<R>) -> Result<Populated, GlobeError> {
    let mut added = Populated::default();

    // Unlabelled pins cluster around the first city and never collide.
    let (lat, lon, _) = CITIES[0];
    for i in 0..5 {
        let offset = i as f64 * 0.8;
        globe.add_pin(lat + offset, lon - offset, "", PinOptions::default())?;
        added.pins += 1;
    }
    globe.add_pin(48.86, 2.35, "Paris", PinOptions::default())?;
    added.pins += 1;

    for (i, &(lat, lon, label)) in ROUTE.iter().enumerate() {
        let connection = if i == 0 { Connection::None } else { Connection::Last };
        globe.add_marker(MarkerSpec::new(lat, lon, label), connection)?;
        added.markers += 1;
    }

    let constellation: Vec<SatelliteSpec> = (0..6)
        .map(|i| SatelliteSpec {
            lat: -30.0 + i as f64 * 12.0,
            lon: -60.0 + i as f64 * 24.0,
            altitude: 1.3,
        })
        .collect();
    added.satellites += globe
        .add_constellation(&constellation, SatelliteOptions::default())?
        .len();

    info!(
        pins = added.pins,
        markers = added.markers,
        satellites = added.satellites,
        "Populated sample scene"
    );
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexglobe_config::GlobeConfig;
    use hexglobe_globe::{GlobeOptions, ManualClock};
    use hexglobe_render::HeadlessRenderer;

    #[test]
    fn test_populate_running_globe() {
        let mut config = GlobeConfig::default();
        config.globe.seed = Some(5);
        let clock = ManualClock::new(0.0);
        let mut globe = Globe::new(GlobeOptions::new(config), HeadlessRenderer::new(320, 240))
            .with_clock(clock);
        globe.resolve_fonts(Ok(())).unwrap();

        let added = populate(&mut globe).unwrap();
        assert_eq!(added.pins, 6);
        assert_eq!(globe.pin_count(), 6);
        assert_eq!(added.markers, ROUTE.len());
        // Default cap keeps every marker of the route.
        assert_eq!(globe.marker_count(), 4);
        assert_eq!(globe.trails().len(), 3);
        assert_eq!(globe.satellite_count(), 6);
    }

    #[test]
    fn test_populate_requires_running_globe() {
        let mut globe = Globe::new(GlobeOptions::default(), HeadlessRenderer::new(1, 1));
        assert!(matches!(populate(&mut globe), Err(GlobeError::NotRunning { .. })));
    }

    #[test]
    fn test_intro_data_covers_cities() {
        let data = intro_data();
        assert_eq!(data.len(), CITIES.len());
        assert!(data.iter().any(|p| p.label == "Tokyo"));
    }
}
