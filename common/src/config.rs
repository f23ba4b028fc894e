use serde::{Deserialize, Serialize};

use crate::{io::Hsv, scheduler::Millis};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub countdown_tick_ms: Millis,
    pub animation_frame_ms: Millis,
    pub input_timeout_ms: Millis,
    pub dim_after_ms: Millis,
    pub blink_on_ms: Millis,
    pub blink_off_ms: Millis,
    pub blink_cycles: u8,
    pub ring_pixels: u8,
    pub standby_color: Hsv,
    pub animation_color: Hsv,
    pub self_test_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            countdown_tick_ms: 1_000,
            animation_frame_ms: 75,
            input_timeout_ms: 60_000,
            dim_after_ms: 15_000,
            blink_on_ms: 500,
            blink_off_ms: 200,
            blink_cycles: 4,
            ring_pixels: 24,
            standby_color: Hsv::new(4_000, 255, 50),
            animation_color: Hsv::new(4_000, 255, 255),
            self_test_ms: 100,
        }
    }
}

impl TimerConfig {
    pub fn sanitize(&mut self) {
        self.countdown_tick_ms = self.countdown_tick_ms.max(1);
        self.animation_frame_ms = self.animation_frame_ms.clamp(10, 1_000);
        self.input_timeout_ms = self.input_timeout_ms.max(1_000);
        self.dim_after_ms = self.dim_after_ms.max(1_000);
        self.blink_on_ms = self.blink_on_ms.max(1);
        self.blink_off_ms = self.blink_off_ms.max(1);
        self.blink_cycles = self.blink_cycles.max(1);
        self.ring_pixels = self.ring_pixels.max(1);
        self.self_test_ms = self.self_test_ms.min(5_000);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub timer: TimerConfig,
    pub loop_period_ms: u64,
    pub status_log_interval_ms: Millis,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            loop_period_ms: 5,
            status_log_interval_ms: 10_000,
        }
    }
}

impl RuntimeConfig {
    pub fn from_json(raw: &[u8]) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_slice(raw)?;
        config.sanitize();
        Ok(config)
    }

    pub fn sanitize(&mut self) {
        self.timer.sanitize();
        self.loop_period_ms = self.loop_period_ms.clamp(1, 50);
        self.status_log_interval_ms = self.status_log_interval_ms.max(1_000);
    }
}
