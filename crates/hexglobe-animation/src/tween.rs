//! Keyed tween engine.
//!
//! A tween interpolates a list of values from `from` to `to` over a duration,
//! after an optional start delay. Instead of invoking callbacks, each call to
//! [`TweenEngine::advance`] returns the updates produced during that advance;
//! the owner dispatches them on the key it chose when creating the tween.

use tracing::trace;

use crate::Easing;

// ---------------------------------------------------------------------------
// TweenSpec
// ---------------------------------------------------------------------------

/// Description of a tween to start.
#[derive(Debug, Clone, PartialEq)]
pub struct TweenSpec {
    pub from: Vec<f64>,
    pub to: Vec<f64>,
    pub duration_ms: f64,
    pub delay_ms: f64,
    pub easing: Easing,
}

impl TweenSpec {
    pub fn new(from: impl Into<Vec<f64>>, to: impl Into<Vec<f64>>, duration_ms: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            duration_ms,
            delay_ms: 0.0,
            easing: Easing::Linear,
        }
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    fn value_at(&self, eased: f64) -> Vec<f64> {
        self.from
            .iter()
            .zip(&self.to)
            .map(|(a, b)| a + (b - a) * eased)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// TweenUpdate
// ---------------------------------------------------------------------------

/// Identifier of a running tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub u64);

/// One tween's new values after an advance.
#[derive(Debug, Clone, PartialEq)]
pub struct TweenUpdate<K> {
    pub id: TweenId,
    pub key: K,
    pub values: Vec<f64>,
    /// Linear progress in `[0, 1]` before easing.
    pub progress: f64,
    /// Set on the final update; the tween has been dropped from the engine.
    pub finished: bool,
}

struct ActiveTween<K> {
    id: TweenId,
    key: K,
    spec: TweenSpec,
    elapsed_ms: f64,
}

// ---------------------------------------------------------------------------
// TweenEngine
// ---------------------------------------------------------------------------

/// Owns every running tween and advances them together.
///
/// Tweens do not emit updates while their delay is pending. Once the delay
/// has elapsed, every advance emits exactly one update per tween, the last of
/// which carries the exact `to` values and `finished = true`.
pub struct TweenEngine<K> {
    tweens: Vec<ActiveTween<K>>,
    next_id: u64,
}

impl<K> Default for TweenEngine<K> {
    fn default() -> Self {
        Self {
            tweens: Vec::new(),
            next_id: 0,
        }
    }
}

impl<K: Clone> TweenEngine<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween. It begins counting from the next [`advance`](Self::advance).
    pub fn add(&mut self, key: K, spec: TweenSpec) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        self.tweens.push(ActiveTween {
            id,
            key,
            spec,
            elapsed_ms: 0.0,
        });
        id
    }

    /// Advance every tween by `dt_ms` and collect the resulting updates in
    /// creation order. Finished tweens are removed.
    pub fn advance(&mut self, dt_ms: f64) -> Vec<TweenUpdate<K>> {
        let dt_ms = dt_ms.max(0.0);
        let mut updates = Vec::new();
        self.tweens.retain_mut(|tween| {
            tween.elapsed_ms += dt_ms;
            let running_ms = tween.elapsed_ms - tween.spec.delay_ms;
            if running_ms < 0.0 {
                return true;
            }
            let progress = if tween.spec.duration_ms <= 0.0 {
                1.0
            } else {
                (running_ms / tween.spec.duration_ms).min(1.0)
            };
            let finished = progress >= 1.0;
            let values = if finished {
                tween.spec.to.clone()
            } else {
                tween.spec.value_at(tween.spec.easing.apply(progress))
            };
            updates.push(TweenUpdate {
                id: tween.id,
                key: tween.key.clone(),
                values,
                progress,
                finished,
            });
            !finished
        });
        updates
    }

    /// Stop a tween without a final update. Returns whether it was running.
    pub fn cancel(&mut self, id: TweenId) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.id != id);
        before != self.tweens.len()
    }

    /// Stop every tween whose key matches. Returns how many were stopped.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&K) -> bool) -> usize {
        let before = self.tweens.len();
        self.tweens.retain(|t| !pred(&t.key));
        let cancelled = before - self.tweens.len();
        if cancelled > 0 {
            trace!(cancelled, "Cancelled tweens");
        }
        cancelled
    }

    pub fn is_active(&self, id: TweenId) -> bool {
        self.tweens.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn clear(&mut self) {
        self.tweens.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_tween_interpolates_and_finishes() {
        let mut engine = TweenEngine::new();
        engine.add("fade", TweenSpec::new([0.0], [1.0], 100.0));

        let u = engine.advance(25.0);
        assert_eq!(u.len(), 1);
        assert!((u[0].values[0] - 0.25).abs() < 1e-12);
        assert!(!u[0].finished);

        let u = engine.advance(100.0);
        assert_eq!(u[0].values, vec![1.0]);
        assert!(u[0].finished);
        assert!(engine.is_empty());
        assert!(engine.advance(10.0).is_empty());
    }

    #[test]
    fn test_delay_suppresses_updates() {
        let mut engine = TweenEngine::new();
        engine.add(1u8, TweenSpec::new([0.0, 0.0], [2.0, 4.0], 100.0).with_delay(50.0));

        assert!(engine.advance(49.0).is_empty());
        let u = engine.advance(51.0);
        assert_eq!(u.len(), 1);
        assert!((u[0].values[0] - 1.0).abs() < 1e-9);
        assert!((u[0].values[1] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut engine = TweenEngine::new();
        engine.add((), TweenSpec::new([3.0], [7.0], 0.0));
        let u = engine.advance(0.0);
        assert_eq!(u[0].values, vec![7.0]);
        assert!(u[0].finished);
    }

    #[test]
    fn test_elastic_final_value_is_exact() {
        let mut engine = TweenEngine::new();
        engine.add(0, TweenSpec::new([0.0], [5.0], 1000.0).with_easing(Easing::ElasticOut));
        let mut last = Vec::new();
        for _ in 0..20 {
            last = engine.advance(60.0);
        }
        assert_eq!(last[0].values, vec![5.0]);
        assert!(last[0].finished);
    }

    #[test]
    fn test_cancel_where_stops_matching_keys() {
        let mut engine = TweenEngine::new();
        engine.add(1, TweenSpec::new([0.0], [1.0], 100.0));
        let keep = engine.add(2, TweenSpec::new([0.0], [1.0], 100.0));
        engine.add(1, TweenSpec::new([0.0], [1.0], 100.0));

        assert_eq!(engine.cancel_where(|k| *k == 1), 2);
        assert!(engine.is_active(keep));
        let u = engine.advance(10.0);
        assert_eq!(u.len(), 1);
        assert_eq!(u[0].key, 2);

        assert!(engine.cancel(keep));
        assert!(!engine.cancel(keep));
    }

    #[test]
    fn test_updates_follow_creation_order() {
        let mut engine = TweenEngine::new();
        for k in 0..5 {
            engine.add(k, TweenSpec::new([0.0], [1.0], 100.0));
        }
        let keys: Vec<_> = engine.advance(1.0).into_iter().map(|u| u.key).collect();
        assert_eq!(keys, vec![0, 1, 2, 3, 4]);
    }
}
