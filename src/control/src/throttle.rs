// CO2 concentration above which the alert condition is active, in ppm
pub const CO2_ALERT_THRESHOLD_PPM: u16 = 1500;

// Minimum time between two outbound notifications, in seconds (5 minutes)
pub const NOTIFY_COOLDOWN_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSample {
    /// Equivalent CO2 concentration in ppm
    pub co2: u16,
    /// Total volatile organic compounds in ppb
    pub tvoc: u16,
    /// Monotonic seconds since boot at which the sample was taken
    pub timestamp_secs: u64,
}

impl SensorSample {
    pub fn is_alarm(&self) -> bool {
        self.co2 > CO2_ALERT_THRESHOLD_PPM
    }
}

/// Cooldown gate for outbound alert notifications.
///
/// Level-triggered with cooldown: as long as CO2 stays above the threshold
/// it re-fires once per cooldown interval, without requiring the level to
/// drop below the threshold in between.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThrottleState {
    last_notified_secs: Option<u64>,
}

impl ThrottleState {
    /// Fresh state with the cooldown already elapsed, so the first
    /// qualifying sample after boot notifies immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether a notification should go out for this sample.
    ///
    /// On `true` the timestamp is recorded right away, before the caller
    /// performs the outbound call. The cooldown is consumed by the attempt,
    /// not by its success; a failed POST does not retry within the window.
    pub fn should_notify(&mut self, sample: &SensorSample) -> bool {
        if !sample.is_alarm() {
            return false;
        }
        let elapsed = match self.last_notified_secs {
            None => return self.fire(sample.timestamp_secs),
            Some(last) => sample.timestamp_secs.saturating_sub(last),
        };
        if elapsed > NOTIFY_COOLDOWN_SECS {
            return self.fire(sample.timestamp_secs);
        }
        false
    }

    fn fire(&mut self, now_secs: u64) -> bool {
        self.last_notified_secs = Some(now_secs);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(co2: u16, timestamp_secs: u64) -> SensorSample {
        SensorSample {
            co2,
            tvoc: 42,
            timestamp_secs,
        }
    }

    #[test]
    fn test_below_threshold_never_notifies() {
        let mut state = ThrottleState::new();
        assert!(!state.should_notify(&sample(400, 0)));
        assert!(!state.should_notify(&sample(1500, 1_000)));
        assert!(!state.should_notify(&sample(1499, 1_000_000)));
    }

    #[test]
    fn test_first_qualifying_sample_notifies_immediately() {
        let mut state = ThrottleState::new();
        assert!(state.should_notify(&sample(1501, 0)));
    }

    #[test]
    fn test_notify_updates_timestamp() {
        let mut state = ThrottleState::new();
        assert!(state.should_notify(&sample(2000, 10)));
        // Fires again only once the cooldown from t=10 has elapsed
        assert!(!state.should_notify(&sample(2000, 300)));
        assert!(state.should_notify(&sample(2000, 311)));
    }

    #[test]
    fn test_suppressed_sample_does_not_consume_cooldown() {
        let mut state = ThrottleState::new();
        assert!(state.should_notify(&sample(2000, 0)));
        // Each suppressed sample leaves the timestamp at t=0, so the gate
        // reopens relative to the original notification
        assert!(!state.should_notify(&sample(2000, 100)));
        assert!(!state.should_notify(&sample(2000, 200)));
        assert!(state.should_notify(&sample(2000, 301)));
    }

    #[test]
    fn test_cooldown_boundary() {
        let mut state = ThrottleState::new();
        assert!(state.should_notify(&sample(2000, 0)));
        assert!(!state.should_notify(&sample(2000, 299)));

        let mut state = ThrottleState::new();
        assert!(state.should_notify(&sample(2000, 0)));
        assert!(state.should_notify(&sample(2000, 301)));
    }

    #[test]
    fn test_exact_cooldown_does_not_fire() {
        // The comparison is strict: elapsed must exceed the interval
        let mut state = ThrottleState::new();
        assert!(state.should_notify(&sample(2000, 0)));
        assert!(!state.should_notify(&sample(2000, 300)));
    }

    #[test]
    fn test_below_threshold_does_not_rearm() {
        // Level-triggered: dipping below the threshold is not required and
        // does not reset the cooldown
        let mut state = ThrottleState::new();
        assert!(state.should_notify(&sample(2000, 0)));
        assert!(!state.should_notify(&sample(400, 100)));
        assert!(!state.should_notify(&sample(2000, 200)));
        assert!(state.should_notify(&sample(2000, 301)));
    }
}
