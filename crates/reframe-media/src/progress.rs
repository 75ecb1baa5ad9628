//! Render progress reported by FFmpeg's `-progress` stream.

use serde::{Deserialize, Serialize};

/// Snapshot of an in-flight crop render.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderProgress {
    /// Frames written so far
    pub frame: u64,
    /// Output position in milliseconds
    pub out_time_ms: i64,
    /// Encoding speed relative to realtime
    pub speed: f64,
    /// Set once FFmpeg reports `progress=end`
    pub is_complete: bool,
}

impl RenderProgress {
    /// Percent of a clip of `clip_duration_secs` rendered, capped at 100.
    pub fn percentage(&self, clip_duration_secs: f64) -> f64 {
        if clip_duration_secs <= 0.0 {
            return 0.0;
        }
        let done = self.out_time_ms as f64 / 1000.0;
        (done / clip_duration_secs * 100.0).clamp(0.0, 100.0)
    }

    /// Seconds of wall time left at the current speed.
    pub fn eta_seconds(&self, clip_duration_secs: f64) -> Option<f64> {
        if self.speed <= 0.0 || self.out_time_ms <= 0 {
            return None;
        }
        let remaining = clip_duration_secs - self.out_time_ms as f64 / 1000.0;
        Some((remaining / self.speed).max(0.0))
    }

    /// Fold one `key=value` line into this snapshot.
    ///
    /// Returns a copy whenever a block ends (`progress=continue|end`).
    pub fn apply_line(&mut self, line: &str) -> Option<RenderProgress> {
        let (key, value) = line.trim().split_once('=')?;
        match key {
            "out_time_us" => {
                if let Ok(us) = value.parse::<i64>() {
                    self.out_time_ms = us / 1000;
                }
            }
            // Despite the name, FFmpeg reports this one in microseconds as well.
            "out_time_ms" => {
                if let Ok(us) = value.parse::<i64>() {
                    self.out_time_ms = us / 1000;
                }
            }
            "frame" => {
                if let Ok(frame) = value.parse() {
                    self.frame = frame;
                }
            }
            "speed" => {
                if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                    self.speed = speed;
                }
            }
            "progress" => {
                self.is_complete = value == "end";
                return Some(self.clone());
            }
            _ => {}
        }
        None
    }
}
