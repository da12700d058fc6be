//! Capability interfaces for the panel hardware. The engine never sees
//! these; the panel runtime applies engine actions to whichever
//! implementations were injected at construction. Output calls are
//! fire-and-forget: an absent or failing device costs visual feedback,
//! never correctness.

use std::time::Duration;

use async_trait::async_trait;
use thermostat_core::{Glyph, IndicatorState};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor did not respond")]
    NotResponding,
    #[error("sensor i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Single-digit seven-segment display.
#[async_trait]
pub trait SegmentDisplay: Send {
    fn show(&mut self, glyph: Glyph);
    fn blank(&mut self);

    /// Alternate `glyph` and blank `repeats` times, holding the caller for
    /// the whole duration.
    async fn blink(&mut self, glyph: Glyph, repeats: u32, on: Duration, off: Duration);

    /// The device's built-in activity animation. Holds the caller for the
    /// whole duration and leaves the display blank.
    async fn busy_animation(&mut self, cycles: u32, step: Duration);
}

/// The two mode indicator lights.
pub trait IndicatorLights: Send {
    fn set_heat(&mut self, state: IndicatorState);
    fn set_cool(&mut self, state: IndicatorState);
}

/// Two-line text display. The panel treats this driver as optional and
/// skips rendering when none is fitted.
pub trait TextDisplay: Send {
    fn render(&mut self, line1: &str, line2: &str);
}

/// Ambient temperature source, canonical unit degrees Celsius.
#[async_trait]
pub trait TemperatureSensor: Send {
    async fn read_celsius(&mut self) -> Result<f32, SensorError>;
}

/// Outbound channel for status records. At-most-once: a failed send is
/// logged by the caller and never retried.
#[async_trait]
pub trait StatusReporter: Send {
    async fn send(&mut self, payload: &[u8]) -> std::io::Result<()>;
}
