use std::fmt;

use crate::types::Mode;

/// Periodic record sent to the remote temperature server. The wire contract
/// is Fahrenheit-only, whatever unit the panel is displaying; the terminator
/// (if any) belongs to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRecord {
    pub mode: Mode,
    pub temp_f: f32,
    pub setpoint_f: i32,
}

impl fmt::Display for StatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{:.1},{}",
            self.mode.as_str(),
            self.temp_f,
            self.setpoint_f
        )
    }
}
