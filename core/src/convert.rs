//! Temperature scale conversions.
//!
//! Setpoint conversions are integer and truncate toward zero, so a round
//! trip can drift by a degree (72 F -> 22 C -> 71 F). The drift is accepted
//! behavior and pinned by tests; callers must not round-correct it.

/// Setpoint conversion used by the unit toggle: Fahrenheit to Celsius.
pub fn setpoint_to_celsius(fahrenheit: i32) -> i32 {
    (fahrenheit - 32) * 5 / 9
}

/// Setpoint conversion used by the unit toggle: Celsius to Fahrenheit.
/// Also used when a Celsius setpoint goes into a Fahrenheit status record.
pub fn setpoint_to_fahrenheit(celsius: i32) -> i32 {
    celsius * 9 / 5 + 32
}

/// Sensor reading (canonical Celsius) to Fahrenheit.
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_toward_zero() {
        assert_eq!(setpoint_to_celsius(72), 22);
        assert_eq!(setpoint_to_celsius(71), 21);
        // (30 - 32) * 5 / 9 = -1.11.., truncated to -1
        assert_eq!(setpoint_to_celsius(30), -1);
        assert_eq!(setpoint_to_fahrenheit(22), 71);
        assert_eq!(setpoint_to_fahrenheit(0), 32);
    }

    #[test]
    fn fixed_points() {
        assert_eq!(setpoint_to_celsius(32), 0);
        assert_eq!(setpoint_to_celsius(-40), -40);
        assert_eq!(setpoint_to_fahrenheit(-40), -40);
    }

    #[test]
    fn round_trip_drifts_by_at_most_one_degree() {
        for f in -40..=120 {
            let back = setpoint_to_fahrenheit(setpoint_to_celsius(f));
            assert!((back - f).abs() <= 1, "{f} -> {back}");
        }
        // the documented drift case
        assert_eq!(setpoint_to_fahrenheit(setpoint_to_celsius(72)), 71);
    }

    #[test]
    fn sensor_conversion() {
        assert!((celsius_to_fahrenheit(0.0) - 32.0).abs() < f32::EPSILON);
        assert!((celsius_to_fahrenheit(21.0) - 69.8).abs() < 0.001);
    }
}
