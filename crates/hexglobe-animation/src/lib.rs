//! Time-driven animation primitives.
//!
//! Everything here is advanced explicitly by elapsed milliseconds from the
//! frame loop; nothing schedules itself. A [`TweenEngine`] interpolates value
//! lists with easing and start delays and reports per-advance updates keyed by
//! a caller-chosen key. A [`StepTimer`] fires discrete steps at a fixed
//! interval, used for progressive reveal and retraction of trails.

pub mod easing;
pub mod step;
pub mod tween;

pub use easing::Easing;
pub use step::StepTimer;
pub use tween::{TweenEngine, TweenId, TweenSpec, TweenUpdate};
