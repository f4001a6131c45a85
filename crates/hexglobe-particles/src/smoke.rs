//! Smoke particle ring buffer.

use bytemuck::{Pod, Zeroable};
use glam::DVec3;
use hexglobe_math::{GLOBE_RADIUS, Rgb, map_point_scaled};
use hexglobe_render::{Blending, Fog, NodeId, NodeKind, Scene, SceneNode, ShaderMaterial};
use tracing::{debug, trace};

use crate::SMOKE_SHADER_SOURCE;

/// How long one puff takes to rise and fade, in milliseconds.
pub const PARTICLE_LIFETIME_MS: f64 = 1500.0;

/// Delay before the first particle of a fire appears.
const FIRST_PUFF_DELAY_MS: f64 = 1500.0;

/// Longitude drift in degrees per millisecond of particle age.
const DRIFT_DEG_PER_MS: f64 = 1.0 / 50.0;

/// One particle slot as uploaded to the GPU.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SmokeSlot {
    pub start_time: f32,
    pub lat: f32,
    pub lon: f32,
    pub altitude: f32,
    /// 1.0 when emitting, 0.0 when extinguished or never used.
    pub active: f32,
}

/// Handle to a fire: the first slot of its run.
///
/// A fire always spans `per_pin` slots from this index, modulo capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SmokeHandle(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct SmokeOptions {
    /// Total slot capacity.
    pub count: usize,
    /// Slots claimed by each fire.
    pub per_pin: usize,
    /// Emission rate of a single fire.
    pub per_second: f64,
    pub color: Rgb,
}

impl Default for SmokeOptions {
    fn default() -> Self {
        Self {
            count: 5000,
            per_pin: 30,
            per_second: 20.0,
            color: Rgb::new(0.933, 0.933, 0.933),
        }
    }
}

/// A particle's state at some instant, computed the way the shader does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSample {
    pub position: DVec3,
    pub opacity: f64,
    pub size: f64,
}

/// Fixed-capacity smoke particle system.
pub struct SmokeProvider {
    slots: Vec<SmokeSlot>,
    per_pin: usize,
    per_second: f64,
    smoke_index: usize,
    total_run_time: f64,
    material: ShaderMaterial,
    dirty: bool,
    node: NodeId,
}

impl SmokeProvider {
    /// Allocate every slot and attach the particle node to `scene`.
    pub fn new(scene: &mut Scene, opts: &SmokeOptions) -> Self {
        let mut material = ShaderMaterial::new("smoke", SMOKE_SHADER_SOURCE);
        material.transparent = true;
        material.depth_write = false;
        material.blending = Blending::Normal;
        material.set_color(opts.color);

        let node = scene.add(SceneNode::new(NodeKind::Custom {
            label: "smoke",
            vertex_count: opts.count,
        }));
        debug!(count = opts.count, per_pin = opts.per_pin, "Allocated smoke slots");

        Self {
            slots: vec![SmokeSlot::zeroed(); opts.count],
            per_pin: opts.per_pin,
            per_second: opts.per_second.max(f64::MIN_POSITIVE),
            smoke_index: 0,
            total_run_time: 0.0,
            material,
            dirty: true,
            node,
        }
    }

    /// Start a fire, overwriting the next `per_pin` slots in ring order.
    ///
    /// The i-th particle starts `1000 * i / per_second + 1500` ms from the
    /// current run time. Returns the handle used by
    /// [`extinguish`](Self::extinguish) and [`change_altitude`](Self::change_altitude).
    pub fn set_fire(&mut self, lat: f64, lon: f64, altitude: f64) -> SmokeHandle {
        let start = SmokeHandle(self.smoke_index);
        let capacity = self.slots.len();
        if capacity == 0 {
            return start;
        }
        for i in 0..self.per_pin {
            self.slots[self.smoke_index] = SmokeSlot {
                start_time: (self.total_run_time + 1000.0 * i as f64 / self.per_second + FIRST_PUFF_DELAY_MS) as f32,
                lat: lat as f32,
                lon: lon as f32,
                altitude: altitude as f32,
                active: 1.0,
            };
            self.smoke_index = (self.smoke_index + 1) % capacity;
        }
        self.dirty = true;
        trace!(start = start.0, lat, lon, "Set fire");
        start
    }

    /// Deactivate a fire's slots. The slots are reclaimed only when a later
    /// fire wraps around onto them.
    pub fn extinguish(&mut self, handle: SmokeHandle) {
        self.for_each_slot(handle, |slot| slot.active = 0.0);
    }

    pub fn change_altitude(&mut self, altitude: f64, handle: SmokeHandle) {
        self.for_each_slot(handle, |slot| slot.altitude = altitude as f32);
    }

    fn for_each_slot(&mut self, handle: SmokeHandle, mut f: impl FnMut(&mut SmokeSlot)) {
        let capacity = self.slots.len();
        if capacity == 0 {
            return;
        }
        for i in 0..self.per_pin {
            f(&mut self.slots[(handle.0 + i) % capacity]);
        }
        self.dirty = true;
    }

    /// Record the run time and push it into the shader's time uniform.
    pub fn tick(&mut self, total_run_time: f64) {
        self.total_run_time = total_run_time;
        self.material.set_current_time(total_run_time);
    }

    pub fn color(&self) -> Rgb {
        self.material.color()
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.material.set_color(color);
    }

    pub fn set_fog(&mut self, fog: &Fog) {
        self.material.set_fog(fog);
    }

    /// Host-side evaluation of the particle shader for one slot.
    ///
    /// `None` when the slot is inactive, not yet started, or exactly at a
    /// lifetime boundary.
    pub fn sample(&self, slot: usize, now: f64) -> Option<ParticleSample> {
        let s = self.slots.get(slot)?;
        if s.active <= 0.0 {
            return None;
        }
        let age = now - s.start_time as f64;
        if age <= 0.0 {
            return None;
        }
        let age = age % PARTICLE_LIFETIME_MS;
        if age == 0.0 {
            return None;
        }
        let position = map_point_scaled(
            s.lat as f64,
            s.lon as f64 - age * DRIFT_DEG_PER_MS,
            GLOBE_RADIUS * s.altitude as f64,
        );
        Some(ParticleSample {
            position,
            opacity: 1.0 - age / PARTICLE_LIFETIME_MS,
            size: 2.5 - age / PARTICLE_LIFETIME_MS,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn per_pin(&self) -> usize {
        self.per_pin
    }

    /// Next slot a fire will claim.
    pub fn smoke_index(&self) -> usize {
        self.smoke_index
    }

    pub fn total_run_time(&self) -> f64 {
        self.total_run_time
    }

    pub fn slot(&self, index: usize) -> Option<&SmokeSlot> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[SmokeSlot] {
        &self.slots
    }

    /// Raw slot bytes for the vertex buffer.
    pub fn slot_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.slots)
    }

    /// Whether slots changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn material(&self) -> &ShaderMaterial {
        &self.material
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}
