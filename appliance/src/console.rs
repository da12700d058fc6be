//! Console stand-ins for the panel hardware, used by host builds. Each type
//! logs what the real device would render; GPIO/I2C drivers slot in behind
//! the same traits on the appliance target.

use std::time::Duration;

use async_trait::async_trait;
use thermostat_core::{Glyph, IndicatorState, BUSY_ANIMATION_FRAMES};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::drivers::{
    IndicatorLights, SegmentDisplay, SensorError, TemperatureSensor, TextDisplay,
};

pub struct ConsoleSegment;

#[async_trait]
impl SegmentDisplay for ConsoleSegment {
    fn show(&mut self, glyph: Glyph) {
        info!("7-seg: {}", glyph.as_char());
    }

    fn blank(&mut self) {
        info!("7-seg: blank");
    }

    async fn blink(&mut self, glyph: Glyph, repeats: u32, on: Duration, off: Duration) {
        for _ in 0..repeats {
            self.show(glyph);
            sleep(on).await;
            self.blank();
            sleep(off).await;
        }
    }

    async fn busy_animation(&mut self, cycles: u32, step: Duration) {
        debug!("7-seg: busy animation, {cycles} cycles");
        for _ in 0..cycles {
            // the rotating frame patterns are the device's own; only the
            // cadence is observable here
            for _ in 0..BUSY_ANIMATION_FRAMES {
                sleep(step).await;
            }
        }
        self.blank();
    }
}

pub struct ConsoleIndicators;

impl IndicatorLights for ConsoleIndicators {
    fn set_heat(&mut self, state: IndicatorState) {
        info!("heat indicator: {}", state.as_str());
    }

    fn set_cool(&mut self, state: IndicatorState) {
        info!("cool indicator: {}", state.as_str());
    }
}

pub struct ConsoleText;

impl TextDisplay for ConsoleText {
    fn render(&mut self, line1: &str, line2: &str) {
        debug!("lcd: {line1} | {line2}");
    }
}

/// Smooth synthetic ambient profile for host runs, with optional fault
/// injection to exercise the read-failure path.
/// Hardware integration point: replace with an AHT20 driver behind the same
/// trait on the appliance target.
pub struct SimulatedSensor {
    base_c: f32,
    fail_every: Option<u64>,
    sample: u64,
}

impl SimulatedSensor {
    pub fn new(base_c: f32, fail_every: Option<u64>) -> Self {
        Self {
            base_c,
            fail_every: fail_every.filter(|n| *n > 0),
            sample: 0,
        }
    }
}

#[async_trait]
impl TemperatureSensor for SimulatedSensor {
    async fn read_celsius(&mut self) -> Result<f32, SensorError> {
        self.sample = self.sample.wrapping_add(1);
        if let Some(every) = self.fail_every {
            if self.sample % every == 0 {
                return Err(SensorError::NotResponding);
            }
        }
        Ok(self.base_c + ((self.sample % 8) as f32) * 0.1)
    }
}
