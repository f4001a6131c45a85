//! Initial data revealed pin by pin during the intro.

use std::collections::VecDeque;

use hexglobe_config::ViewConfig;

/// A labelled point supplied up front.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
}

impl DataPoint {
    pub fn new(lat: f64, lon: f64, label: impl Into<String>) -> Self {
        Self {
            lat,
            lon,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Scheduled {
    point: DataPoint,
    /// Offset from the first tick at which the point is due.
    when_ms: f64,
}

/// Data points waiting for their reveal time, west to east with long labels
/// nudged earlier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingData {
    queue: VecDeque<Scheduled>,
}

impl PendingData {
    pub fn new(points: Vec<DataPoint>, view: &ViewConfig) -> Self {
        let mut scheduled: Vec<Scheduled> = points
            .into_iter()
            .map(|point| Scheduled {
                when_ms: view.intro_data_duration_ms * ((180.0 + point.lon) / 360.0)
                    + view.intro_data_offset_ms,
                point,
            })
            .collect();
        scheduled.sort_by(|a, b| sort_key(&a.point).total_cmp(&sort_key(&b.point)));
        Self {
            queue: scheduled.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pop every point due at `now_ms`, in queue order. Stops at the first
    /// point that is not yet due, even if later ones are.
    pub fn drain_due(&mut self, first_ms: f64, now_ms: f64) -> Vec<DataPoint> {
        let mut due = Vec::new();
        while let Some(next) = self.queue.front()
            && first_ms + next.when_ms < now_ms
        {
            if let Some(s) = self.queue.pop_front() {
                due.push(s.point);
            }
        }
        due
    }
}

fn sort_key(point: &DataPoint) -> f64 {
    point.lon - 2.0 * point.label.chars().count() as f64
}
