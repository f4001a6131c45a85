//! The globe controller and its frame loop.
//!
//! A [`Globe`] is constructed inert. Once its label font has loaded it builds
//! the scene and enters [`GlobeState::Running`], after which every call to
//! [`Globe::tick`] advances tweens, trails, the camera orbit, satellites and
//! the intro, then renders one frame. [`Globe::destroy`] recedes the camera
//! for a grace period before clearing the scene.

use std::collections::VecDeque;
use std::f64::consts::{PI, TAU};

use hexglobe_animation::{TweenEngine, TweenUpdate};
use hexglobe_config::GlobeConfig;
use hexglobe_math::{ApproxTextMeasure, ColorScheme, Rgb, RgbBasis, TextMeasure};
use hexglobe_mesh::{Tile, TileLayer};
use hexglobe_particles::{SmokeOptions, SmokeProvider};
use hexglobe_render::{
    Fog, FrameRenderer, PerspectiveCamera, Scene, TextureCache, TextureDescriptor, TextureHandle,
    TextureKind, TextureParams,
};
use hexglobe_spatial::Quadtree;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::data::{DataPoint, PendingData};
use crate::intro::IntroLines;
use crate::marker::{Connection, Marker, MarkerId, MarkerSpec};
use crate::pin::{Pin, PinAction, PinId, PinOptions, PinSpec};
use crate::readiness::{FontError, FontLoader};
use crate::satellite::{SATELLITE_SIZE, Satellite, SatelliteOptions, SatelliteSpec, satellite_key};
use crate::stage::{Stage, Tweened};
use crate::trail::{Trail, Waypoint};
use crate::GlobeError;

/// Altitude of a labelled pin.
pub const PIN_ALTITUDE: f64 = 1.2;

/// Colliding labelled pins older than this are pushed back by a newcomer.
pub const PUSH_BACK_AGE_MS: f64 = 5000.0;

/// How long the camera recedes after [`Globe::destroy`] before the scene is
/// cleared.
pub const DESTROY_GRACE_MS: f64 = 1000.0;

/// Camera distance at scale 1.
pub const BASE_CAMERA_DISTANCE: f64 = 1700.0;

/// Camera recession speed while destroying, in scene units per millisecond.
const RECEDE_PER_MS: f64 = 1.0;

const CAMERA_NEAR: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobeState {
    /// Constructed; waiting for the label font.
    WaitingForFonts,
    Running,
    /// Camera receding; the scene clears after the grace period.
    Destroying,
    Destroyed,
    /// The font never loaded. Terminal.
    Failed,
}

/// Construction-time inputs.
#[derive(Debug, Clone, Default)]
pub struct GlobeOptions {
    pub config: GlobeConfig,
    /// Points revealed as pins during the intro.
    pub data: Vec<DataPoint>,
    pub tiles: Vec<Tile>,
}

impl GlobeOptions {
    pub fn new(config: GlobeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn with_data(mut self, data: Vec<DataPoint>) -> Self {
        self.data = data;
        self
    }

    pub fn with_tiles(mut self, tiles: Vec<Tile>) -> Self {
        self.tiles = tiles;
        self
    }
}

type DestroyCallback = Box<dyn FnOnce()>;

/// Timestamps of the frame loop, all read from the globe's clock.
#[derive(Debug, Clone, Copy, Default)]
struct FrameTimes {
    first_ms: Option<f64>,
    last_ms: Option<f64>,
    total_ms: f64,
    destroy_started_ms: Option<f64>,
}

pub struct Globe<R: FrameRenderer> {
    config: GlobeConfig,
    renderer: R,
    clock: Box<dyn Clock>,
    rng: ChaCha8Rng,
    scheme: Box<dyn ColorScheme>,
    measure: Box<dyn TextMeasure>,
    state: GlobeState,
    stage: Option<Stage>,
    tiles: TileLayer,

    pins: FxHashMap<PinId, Pin>,
    pin_order: VecDeque<PinId>,
    quadtree: Quadtree<PinId>,
    next_pin: u64,
    max_pins: usize,

    markers: FxHashMap<MarkerId, Marker>,
    marker_order: VecDeque<MarkerId>,
    trails: Vec<Trail>,
    next_marker: u64,
    max_markers: usize,

    satellites: FxHashMap<String, Satellite>,
    pending: PendingData,

    scale: f64,
    camera_distance: f64,
    camera_angle: f64,
    times: FrameTimes,
    on_destroyed: Option<DestroyCallback>,
}

impl<R: FrameRenderer> Globe<R> {
    pub fn new(options: GlobeOptions, renderer: R) -> Self {
        let GlobeOptions {
            config,
            data,
            tiles,
        } = options;
        let rng = match config.globe.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        let scheme = RgbBasis::new(&config.globe.scheme_stops);
        let pending = PendingData::new(data, &config.view);
        let tiles = TileLayer::new(
            tiles,
            config.view.intro_line_duration_ms,
            config.view.intro_line_altitude,
        );
        let scale = config.view.scale;
        debug!(
            tiles = tiles.tiles().len(),
            pending = pending.len(),
            "Globe constructed"
        );
        Self {
            max_pins: config.pins.max_count,
            max_markers: config.markers.max_count,
            camera_distance: BASE_CAMERA_DISTANCE / scale,
            config,
            renderer,
            clock: Box::new(SystemClock::new()),
            rng,
            scheme: Box::new(scheme),
            measure: Box::new(ApproxTextMeasure::default()),
            state: GlobeState::WaitingForFonts,
            stage: None,
            tiles,
            pins: FxHashMap::default(),
            pin_order: VecDeque::new(),
            quadtree: Quadtree::lat_lon(),
            next_pin: 0,
            markers: FxHashMap::default(),
            marker_order: VecDeque::new(),
            trails: Vec::new(),
            next_marker: 0,
            satellites: FxHashMap::default(),
            pending,
            scale,
            camera_angle: PI,
            times: FrameTimes::default(),
            on_destroyed: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_color_scheme(mut self, scheme: impl ColorScheme + 'static) -> Self {
        self.scheme = Box::new(scheme);
        self
    }

    pub fn with_text_measure(mut self, measure: impl TextMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Load the configured label font and, on success, start running.
    pub fn load_fonts(&mut self, loader: &mut dyn FontLoader) -> Result<(), GlobeError> {
        if self.state != GlobeState::WaitingForFonts {
            return self.already_resolved();
        }
        let result = loader.load(&self.config.labels.font_family, self.config.view.font_timeout_ms);
        self.resolve_fonts(result)
    }

    /// Complete readiness with the outcome of an external font load.
    pub fn resolve_fonts(&mut self, result: Result<(), FontError>) -> Result<(), GlobeError> {
        if self.state != GlobeState::WaitingForFonts {
            return self.already_resolved();
        }
        match result {
            Ok(()) => {
                self.init();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Globe failed to become ready");
                self.state = GlobeState::Failed;
                Err(GlobeError::Readiness(e))
            }
        }
    }

    fn already_resolved(&self) -> Result<(), GlobeError> {
        match self.state {
            GlobeState::Running => Ok(()),
            state => Err(GlobeError::NotRunning { state }),
        }
    }

    fn init(&mut self) {
        let view = &self.config.view;
        let far = self.camera_distance + view.depth;
        let camera = PerspectiveCamera::new(
            view.fov_deg,
            view.width as f64 / view.height.max(1) as f64,
            CAMERA_NEAR,
            far,
        );
        let mut scene = Scene::new(view.background);
        let fog = Fog {
            color: view.fog_color,
            near: self.camera_distance,
            far,
        };
        let smoke = SmokeProvider::new(
            &mut scene,
            &SmokeOptions {
                count: self.config.smoke.count,
                per_pin: self.config.smoke.per_pin,
                per_second: self.config.smoke.per_second,
                color: self.config.smoke.color,
            },
        );
        let intro = IntroLines::spawn(&mut scene, view, &mut self.rng);
        self.tiles.set_fog(&fog);
        self.tiles.build(
            &mut scene,
            self.scheme.as_ref(),
            self.config.globe.base_color,
            &mut self.rng,
        );

        let mut stage = Stage {
            scene,
            camera,
            fog,
            smoke,
            textures: TextureCache::new(),
            tweens: TweenEngine::new(),
            intro: Some(intro),
        };
        stage.follow_distance(self.camera_distance, view.depth);
        stage.orbit_camera(self.camera_distance, self.camera_angle, view.view_angle);
        self.renderer.set_size(view.width, view.height, view.pixel_ratio);
        self.stage = Some(stage);
        self.state = GlobeState::Running;
        info!(
            width = view.width,
            height = view.height,
            font = %self.config.labels.font_family,
            "Globe running"
        );
    }

    /// Start tearing the globe down. `on_destroyed` runs once the scene has
    /// been cleared, on the first tick after the grace period.
    pub fn destroy(&mut self, on_destroyed: impl FnOnce() + 'static) {
        match self.state {
            GlobeState::Running => {
                self.state = GlobeState::Destroying;
                self.times.destroy_started_ms = Some(self.clock.now_ms());
                self.on_destroyed = Some(Box::new(on_destroyed));
                info!("Globe destroying");
            }
            GlobeState::Destroying => {
                warn!("Globe is already being destroyed");
            }
            GlobeState::WaitingForFonts | GlobeState::Failed | GlobeState::Destroyed => {
                self.state = GlobeState::Destroyed;
                on_destroyed();
            }
        }
    }

    fn finish_destroy(&mut self) {
        if let Some(stage) = self.stage.as_mut() {
            stage.scene.clear();
            stage.tweens.clear();
            stage.textures.clear();
            stage.intro = None;
        }
        self.pins.clear();
        self.pin_order.clear();
        self.quadtree.clear();
        self.markers.clear();
        self.marker_order.clear();
        self.trails.clear();
        self.satellites.clear();
        self.state = GlobeState::Destroyed;
        info!("Globe destroyed");
        if let Some(callback) = self.on_destroyed.take() {
            callback();
        }
    }

    // -----------------------------------------------------------------------
    // Frame loop
    // -----------------------------------------------------------------------

    /// Advance every animation to the clock's current time and render.
    /// Does nothing unless the globe is running or being destroyed.
    pub fn tick(&mut self) {
        if !matches!(self.state, GlobeState::Running | GlobeState::Destroying) || self.stage.is_none() {
            return;
        }
        let now = self.clock.now_ms();
        let first = *self.times.first_ms.get_or_insert(now);
        self.add_due_data(first, now);

        let last = self.times.last_ms.replace(now).unwrap_or(now);
        let render_time = (now - last).max(0.0);
        self.times.total_ms = self.times.total_ms.max(now - first);
        let total = self.times.total_ms;

        let updates = match self.stage.as_mut() {
            Some(stage) => stage.tweens.advance(render_time),
            None => return,
        };
        self.apply_tweens(updates);

        let view = &self.config.view;
        if view.day_length_ms > 0.0 {
            self.camera_angle += TAU * render_time / view.day_length_ms;
        }
        if self.state == GlobeState::Destroying {
            self.camera_distance += RECEDE_PER_MS * render_time;
        }

        let Some(stage) = self.stage.as_mut() else {
            return;
        };
        self.trails.retain_mut(|trail| !trail.advance(render_time, &mut stage.scene));

        stage.orbit_camera(self.camera_distance, self.camera_angle, view.view_angle);
        let camera = stage.camera.position;
        for satellite in self.satellites.values_mut() {
            satellite.tick(camera, self.camera_angle, render_time, &mut stage.scene);
        }

        if let Some(intro) = stage.intro.as_mut()
            && !intro.tick(total, render_time, view.intro_line_duration_ms, &mut stage.scene)
        {
            stage.intro = None;
        }

        self.tiles.set_current_time(total);
        stage.smoke.tick(total);
        self.renderer.render(&stage.scene, &stage.camera);

        if self.state == GlobeState::Destroying
            && let Some(started) = self.times.destroy_started_ms
            && now - started >= DESTROY_GRACE_MS
        {
            self.finish_destroy();
        }
    }

    fn add_due_data(&mut self, first: f64, now: f64) {
        for point in self.pending.drain_due(first, now) {
            if let Err(e) = self.spawn_pin(point.lat, point.lon, &point.label, PinOptions::default()) {
                warn!(error = %e, label = %point.label, "Dropped intro data point");
            }
        }
    }

    fn apply_tweens(&mut self, updates: Vec<TweenUpdate<Tweened>>) {
        let Some(stage) = self.stage.as_mut() else {
            return;
        };
        for update in updates {
            let value = update.values.first().copied().unwrap_or_default();
            match update.key {
                Tweened::PinRise(id) => {
                    if let Some(pin) = self.pins.get(&id) {
                        pin.apply_rise(&update.values, &mut stage.scene);
                    }
                }
                Tweened::PinFade(id) => {
                    if let Some(pin) = self.pins.get(&id) {
                        pin.apply_fade(value, &mut stage.scene);
                    }
                }
                Tweened::PinAltitude(id) => {
                    if let Some(pin) = self.pins.get_mut(&id) {
                        pin.apply_altitude(value, update.finished, stage);
                    }
                }
                Tweened::MarkerIcon(id) => {
                    if let Some(marker) = self.markers.get_mut(&id) {
                        marker.apply_icon(value, update.finished, self.scale, &mut stage.scene);
                    }
                }
                Tweened::MarkerLabel(id) => {
                    if let Some(marker) = self.markers.get(&id) {
                        marker.apply_label(value, &mut stage.scene);
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // View
    // -----------------------------------------------------------------------

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.view.width = width;
        self.config.view.height = height;
        if let Some(stage) = self.stage.as_mut() {
            stage.camera.set_aspect_ratio(width as f64, height as f64);
            self.renderer.set_size(width, height, self.config.view.pixel_ratio);
        }
        debug!(width, height, "Globe resized");
    }

    /// Zoom: the camera sits at `1700 / scale` and markers shrink as it
    /// closes in. Non-positive scales are ignored.
    pub fn set_scale(&mut self, scale: f64) {
        if !(scale.is_finite() && scale > 0.0) {
            warn!(scale, "Ignoring invalid globe scale");
            return;
        }
        self.scale = scale;
        self.camera_distance = BASE_CAMERA_DISTANCE / scale;
        if let Some(stage) = self.stage.as_mut() {
            for marker in self.markers.values() {
                marker.rescale(scale, &mut stage.scene);
            }
            stage.follow_distance(self.camera_distance, self.config.view.depth);
            self.tiles.set_fog(&stage.fog);
        }
        debug!(scale, distance = self.camera_distance, "Globe scale set");
    }

    /// Recolor anomalous tiles. Rebuilds the tile mesh when running.
    pub fn set_base_color(&mut self, color: Rgb) {
        self.config.globe.base_color = color;
        if let Some(stage) = self.stage.as_mut() {
            self.tiles
                .build(&mut stage.scene, self.scheme.as_ref(), color, &mut self.rng);
        }
    }

    pub fn set_base_color_hex(&mut self, hex: &str) -> Result<(), GlobeError> {
        self.set_base_color(Rgb::from_hex(hex)?);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Pins
    // -----------------------------------------------------------------------

    /// Add a pin. Labelled pins that land on other labelled pins either push
    /// the stale ones back or, if any of them is recent, are pushed back
    /// themselves.
    pub fn add_pin(&mut self, lat: f64, lon: f64, text: &str, options: PinOptions) -> Result<PinId, GlobeError> {
        self.ensure_running()?;
        self.spawn_pin(lat, lon, text, options)
    }

    fn spawn_pin(&mut self, lat: f64, lon: f64, text: &str, options: PinOptions) -> Result<PinId, GlobeError> {
        let state = self.state;
        let stage = self.stage.as_mut().ok_or(GlobeError::NotRunning { state })?;
        let now = self.clock.now_ms();
        let has_text = !text.is_empty();
        let mut altitude = PIN_ALTITUDE;
        if !has_text {
            altitude -= 0.05 + self.rng.random::<f64>() * 0.05;
        }

        let id = PinId(self.next_pin);
        self.next_pin += 1;
        let pin = Pin::spawn(
            PinSpec {
                id,
                lat,
                lon,
                text: text.to_string(),
                altitude,
                created_ms: now,
                options,
            },
            stage,
            &self.config,
            self.measure.as_ref(),
        );
        self.quadtree.insert(id, pin.footprint());
        self.pins.insert(id, pin);
        self.pin_order.push_back(id);

        if has_text {
            let mut collisions = 0usize;
            let mut too_young = 0usize;
            let mut stale = Vec::new();
            for other in self.quadtree.query_colliding(&id) {
                let Some(pin) = self.pins.get(&other) else {
                    continue;
                };
                if !pin.has_text() {
                    continue;
                }
                collisions += 1;
                if pin.age(now) > PUSH_BACK_AGE_MS {
                    stale.push(other);
                } else {
                    too_young += 1;
                }
            }

            let pushed = if collisions > 0 && too_young == 0 {
                stale
            } else if collisions > 0 {
                vec![id]
            } else {
                Vec::new()
            };
            for target in pushed {
                let altitude = self.rng.random::<f64>() * 0.05 + 1.1;
                if let Some(pin) = self.pins.get_mut(&target) {
                    push_back(pin, altitude, stage);
                    debug!(pin = target.0, by = id.0, "Pushed back colliding pin");
                }
            }
        }

        debug!(id = id.0, lat, lon, text, "Added pin");
        self.evict_pins();
        Ok(id)
    }

    pub fn remove_pin(&mut self, id: PinId) -> Result<(), GlobeError> {
        self.ensure_running()?;
        let pin = self.pins.remove(&id).ok_or(GlobeError::UnknownPin(id))?;
        self.pin_order.retain(|p| *p != id);
        self.quadtree.remove(&id);
        if let Some(stage) = self.stage.as_mut() {
            pin.remove(stage);
        }
        debug!(id = id.0, "Removed pin");
        Ok(())
    }

    /// Show, hide or move part of a pin.
    pub fn pin_action(&mut self, id: PinId, action: PinAction) -> Result<(), GlobeError> {
        self.ensure_running()?;
        let pin = self.pins.get_mut(&id).ok_or(GlobeError::UnknownPin(id))?;
        if let Some(stage) = self.stage.as_mut() {
            pin.apply(action, stage);
        }
        Ok(())
    }

    pub fn set_max_pins(&mut self, max: usize) {
        self.max_pins = max;
        self.evict_pins();
    }

    fn evict_pins(&mut self) {
        while self.pins.len() > self.max_pins {
            let Some(oldest) = self.pin_order.pop_front() else {
                break;
            };
            self.quadtree.remove(&oldest);
            if let Some(pin) = self.pins.remove(&oldest)
                && let Some(stage) = self.stage.as_mut()
            {
                pin.remove(stage);
            }
            debug!(id = oldest.0, "Evicted oldest pin");
        }
    }

    /// Show or hide smoke on every pin.
    pub fn set_smoke(&mut self, visible: bool) {
        let Some(stage) = self.stage.as_mut() else {
            return;
        };
        for id in &self.pin_order {
            if let Some(pin) = self.pins.get_mut(id) {
                if visible {
                    pin.show_smoke(stage);
                } else {
                    pin.hide_smoke(stage);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Markers
    // -----------------------------------------------------------------------

    /// Add a marker, optionally chained onto another with an animated trail.
    pub fn add_marker(&mut self, spec: MarkerSpec, connection: Connection) -> Result<MarkerId, GlobeError> {
        self.ensure_running()?;
        let previous = match connection {
            Connection::None => None,
            Connection::Last => self.marker_order.back().copied(),
            Connection::To(target) => {
                if !self.markers.contains_key(&target) {
                    warn!(marker = target.0, "Cannot chain onto unknown marker");
                    return Err(GlobeError::UnknownMarker(target));
                }
                Some(target)
            }
        };
        let state = self.state;
        let stage = self.stage.as_mut().ok_or(GlobeError::NotRunning { state })?;

        let id = MarkerId(self.next_marker);
        self.next_marker += 1;
        let to = Waypoint {
            lat: spec.lat,
            lon: spec.lon,
        };
        let marker = Marker::spawn(
            id,
            spec,
            previous,
            self.scale,
            stage,
            &self.config,
            self.measure.as_ref(),
        );

        if let Some(prev) = previous
            && let Some(from) = self.markers.get_mut(&prev)
        {
            from.link_next(id);
            let from_at = Waypoint {
                lat: from.lat(),
                lon: from.lon(),
            };
            self.trails
                .push(Trail::spawn((prev, from_at), (id, to), &self.config.lines, stage));
        }

        self.markers.insert(id, marker);
        self.marker_order.push_back(id);
        debug!(id = id.0, previous = ?previous.map(|p| p.0), "Added marker");
        self.evict_markers();
        Ok(id)
    }

    pub fn remove_marker(&mut self, id: MarkerId) -> Result<(), GlobeError> {
        self.ensure_running()?;
        if !self.markers.contains_key(&id) {
            return Err(GlobeError::UnknownMarker(id));
        }
        self.detach_marker(id);
        Ok(())
    }

    pub fn set_max_markers(&mut self, max: usize) {
        self.max_markers = max;
        self.evict_markers();
    }

    fn evict_markers(&mut self) {
        while self.markers.len() > self.max_markers {
            let Some(&oldest) = self.marker_order.front() else {
                break;
            };
            self.detach_marker(oldest);
            debug!(id = oldest.0, "Evicted oldest marker");
        }
    }

    /// Remove a marker, unlink its neighbours and retract its trails.
    fn detach_marker(&mut self, id: MarkerId) {
        self.marker_order.retain(|m| *m != id);
        let Some(marker) = self.markers.remove(&id) else {
            return;
        };
        if let Some(prev) = marker.previous()
            && let Some(m) = self.markers.get_mut(&prev)
        {
            m.unlink(id);
        }
        for next in marker.next() {
            if let Some(m) = self.markers.get_mut(next) {
                m.unlink(id);
            }
        }
        for trail in self.trails.iter_mut().filter(|t| t.touches(id)) {
            trail.retract();
        }
        if let Some(stage) = self.stage.as_mut() {
            marker.remove(stage);
        }
    }

    // -----------------------------------------------------------------------
    // Satellites
    // -----------------------------------------------------------------------

    /// Add a satellite and return its key. A satellite already registered at
    /// the same coordinates wins and no new one is created.
    pub fn add_satellite(
        &mut self,
        lat: f64,
        lon: f64,
        altitude: f64,
        options: SatelliteOptions,
    ) -> Result<String, GlobeError> {
        self.ensure_running()?;
        self.spawn_satellite(SatelliteSpec { lat, lon, altitude }, options, None)
    }

    /// Add several satellites sharing the first one's texture.
    pub fn add_constellation(
        &mut self,
        specs: &[SatelliteSpec],
        options: SatelliteOptions,
    ) -> Result<Vec<String>, GlobeError> {
        self.ensure_running()?;
        let mut keys = Vec::with_capacity(specs.len());
        let mut texture = None;
        for spec in specs {
            let key = self.spawn_satellite(*spec, options, texture)?;
            if texture.is_none() {
                texture = self.satellites.get(&key).map(Satellite::texture);
            }
            keys.push(key);
        }
        debug!(count = keys.len(), "Added constellation");
        Ok(keys)
    }

    fn spawn_satellite(
        &mut self,
        spec: SatelliteSpec,
        options: SatelliteOptions,
        texture: Option<TextureHandle>,
    ) -> Result<String, GlobeError> {
        let key = satellite_key(spec.lat, spec.lon);
        if self.satellites.contains_key(&key) {
            debug!(%key, "Satellite already registered");
            return Ok(key);
        }
        let state = self.state;
        let stage = self.stage.as_mut().ok_or(GlobeError::NotRunning { state })?;
        let default_color = self.config.satellites.color;
        let color = options.core_color.unwrap_or(default_color);
        let texture = texture.unwrap_or_else(|| {
            let descriptor = TextureDescriptor::square(
                SATELLITE_SIZE as u32,
                TextureParams::Satellite { color },
            );
            if color == default_color {
                stage.textures.get_or_create(TextureKind::Satellite, || descriptor)
            } else {
                stage.textures.insert(descriptor)
            }
        });
        let satellite = Satellite::spawn(
            spec,
            texture,
            self.config.satellites.wave_period_ms,
            &mut stage.scene,
        );
        debug!(%key, altitude = spec.altitude, "Added satellite");
        self.satellites.insert(key.clone(), satellite);
        Ok(key)
    }

    /// Unregister and detach a satellite. Returns whether it existed.
    pub fn remove_satellite(&mut self, key: &str) -> bool {
        let Some(satellite) = self.satellites.remove(key) else {
            return false;
        };
        if let Some(stage) = self.stage.as_mut() {
            satellite.detach(&mut stage.scene);
            let texture = satellite.texture();
            if !self.satellites.values().any(|s| s.texture() == texture) {
                stage.textures.release(texture);
            }
        }
        debug!(key, "Removed satellite");
        true
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    fn ensure_running(&self) -> Result<(), GlobeError> {
        match self.state {
            GlobeState::Running => Ok(()),
            state => Err(GlobeError::NotRunning { state }),
        }
    }

    pub fn state(&self) -> GlobeState {
        self.state
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn stage(&self) -> Option<&Stage> {
        self.stage.as_ref()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.stage.as_ref().map(|s| &s.scene)
    }

    pub fn tiles(&self) -> &TileLayer {
        &self.tiles
    }

    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.get(&id)
    }

    /// Pins, oldest first.
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.pin_order.iter().filter_map(|id| self.pins.get(id))
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    pub fn max_pins(&self) -> usize {
        self.max_pins
    }

    pub fn quadtree(&self) -> &Quadtree<PinId> {
        &self.quadtree
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(&id)
    }

    /// Markers, oldest first.
    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.marker_order.iter().filter_map(|id| self.markers.get(id))
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn max_markers(&self) -> usize {
        self.max_markers
    }

    pub fn trails(&self) -> &[Trail] {
        &self.trails
    }

    pub fn satellite(&self, key: &str) -> Option<&Satellite> {
        self.satellites.get(key)
    }

    pub fn satellite_count(&self) -> usize {
        self.satellites.len()
    }

    pub fn pending_data(&self) -> usize {
        self.pending.len()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn camera_distance(&self) -> f64 {
        self.camera_distance
    }

    pub fn camera_angle(&self) -> f64 {
        self.camera_angle
    }

    /// Milliseconds since the first tick.
    pub fn total_run_ms(&self) -> f64 {
        self.times.total_ms
    }
}

/// Demote a pin that lost a label collision.
fn push_back(pin: &mut Pin, altitude: f64, stage: &mut Stage) {
    pin.hide_label(&mut stage.scene);
    pin.hide_smoke(stage);
    pin.hide_top(&mut stage.scene);
    pin.change_altitude(altitude, stage);
}

#[cfg(test)]
#[path = "globe_tests.rs"]
mod tests;
