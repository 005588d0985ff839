use std::time::{Duration, Instant};

/// Averages over one reporting window of the loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LoopMetrics {
    pub(crate) fps: f32,
    pub(crate) tps: f32,
    pub(crate) frame_time_ms: f32,
    pub(crate) live_entities: usize,
}

/// Counts frames and ticks until the window closes, then reports and restarts.
#[derive(Debug)]
pub(crate) struct MetricsWindow {
    started_at: Instant,
    length: Duration,
    frames: u32,
    ticks: u32,
    frame_time_total: Duration,
}

impl MetricsWindow {
    pub(crate) fn new(length: Duration) -> Self {
        Self::opened_at(Instant::now(), length)
    }

    fn opened_at(started_at: Instant, length: Duration) -> Self {
        Self {
            started_at,
            length,
            frames: 0,
            ticks: 0,
            frame_time_total: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_total = self.frame_time_total.saturating_add(frame_dt);
    }

    pub(crate) fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    /// Closes the window once `length` has passed since it opened.
    pub(crate) fn close_if_due(&mut self, now: Instant, live_entities: usize) -> Option<LoopMetrics> {
        let elapsed = now.saturating_duration_since(self.started_at);
        if elapsed < self.length {
            return None;
        }

        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = match self.frames {
            0 => 0.0,
            frames => self.frame_time_total.as_secs_f32() * 1000.0 / frames as f32,
        };
        let metrics = LoopMetrics {
            fps: self.frames as f32 / seconds,
            tps: self.ticks as f32 / seconds,
            frame_time_ms,
            live_entities,
        };

        *self = Self::opened_at(now, self.length);
        Some(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_reports_rates_over_its_length_then_restarts() {
        let opened = Instant::now();
        let mut window = MetricsWindow::opened_at(opened, Duration::from_secs(2));

        for _ in 0..4 {
            window.record_frame(Duration::from_millis(20));
        }
        for _ in 0..6 {
            window.record_tick();
        }

        let metrics = window
            .close_if_due(opened + Duration::from_secs(2), 11)
            .expect("window closes");
        assert!((metrics.fps - 2.0).abs() < 0.01);
        assert!((metrics.tps - 3.0).abs() < 0.01);
        assert!((metrics.frame_time_ms - 20.0).abs() < 0.001);
        assert_eq!(metrics.live_entities, 11);

        let empty = window
            .close_if_due(opened + Duration::from_secs(4), 11)
            .expect("second window");
        assert_eq!(empty.fps, 0.0);
        assert_eq!(empty.frame_time_ms, 0.0);
    }

    #[test]
    fn window_stays_open_until_due() {
        let opened = Instant::now();
        let mut window = MetricsWindow::opened_at(opened, Duration::from_secs(1));
        window.record_frame(Duration::from_millis(16));

        assert!(window
            .close_if_due(opened + Duration::from_millis(999), 0)
            .is_none());
    }
}
