use serde::{Deserialize, Serialize};

use crate::types::BUSY_ANIMATION_FRAMES;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub tick_interval_ms: u64,
    pub segment_timeout_ms: u64,
    pub report_every_ticks: u32,
    pub blink_repeats: u32,
    pub blink_on_ms: u64,
    pub blink_off_ms: u64,
    pub busy_cycles: u32,
    pub busy_step_ms: u64,
    pub default_setpoint_f: i32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            segment_timeout_ms: 3_000,
            report_every_ticks: 30,
            blink_repeats: 5,
            blink_on_ms: 300,
            blink_off_ms: 300,
            busy_cycles: 4,
            busy_step_ms: 50,
            default_setpoint_f: 72,
        }
    }
}

impl PanelConfig {
    /// Clamp timing knobs into ranges the loop can actually run at. The
    /// setpoint default is deliberately left alone; setpoints are unbounded.
    pub fn sanitize(&mut self) {
        self.tick_interval_ms = self.tick_interval_ms.clamp(100, 60_000);
        self.segment_timeout_ms = self.segment_timeout_ms.max(500);
        self.report_every_ticks = self.report_every_ticks.max(1);
        self.blink_repeats = self.blink_repeats.clamp(1, 20);
        self.blink_on_ms = self.blink_on_ms.clamp(50, 2_000);
        self.blink_off_ms = self.blink_off_ms.clamp(50, 2_000);
        self.busy_cycles = self.busy_cycles.clamp(1, 20);
        self.busy_step_ms = self.busy_step_ms.clamp(10, 500);
    }

    /// Total wall time of one unit-acknowledge blink.
    pub fn blink_total_ms(&self) -> u64 {
        u64::from(self.blink_repeats) * (self.blink_on_ms + self.blink_off_ms)
    }

    /// Total wall time of one busy animation.
    pub fn busy_total_ms(&self) -> u64 {
        u64::from(self.busy_cycles) * u64::from(BUSY_ANIMATION_FRAMES) * self.busy_step_ms
    }
}
