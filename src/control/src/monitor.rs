use log::{error, info};

use crate::sensor::ErrorRegister;
use crate::throttle::{SensorSample, ThrottleState};

/// What the sensor driver reported for one poll of the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorEvent {
    /// New algorithm results are available
    Reading { co2: u16, tvoc: u16 },
    /// The status register flagged an error; no data this round
    Fault(ErrorRegister),
    /// Nothing new since the last poll
    Idle,
}

pub trait AirQualitySensor {
    fn poll(&mut self) -> SensorEvent;
}

/// Rendering is fire-and-forget: implementations log their own failures
/// and never feed back into the loop.
pub trait DisplaySink {
    fn show_reading(&mut self, co2: u16, tvoc: u16, alarm: bool);
}

/// Outbound alert delivery. Failures are the implementation's problem to
/// log; the cooldown is consumed by the attempt either way.
pub trait Notifier {
    fn notify(&mut self, co2: u16, tvoc: u16);
}

/// One-thread polling loop body: sensor -> throttle -> notifier -> display.
///
/// The caller owns the pacing (one `poll_once` per tick) and the clock.
pub struct Monitor<S, D, N> {
    sensor: S,
    display: D,
    notifier: N,
    throttle: ThrottleState,
}

impl<S, D, N> Monitor<S, D, N>
where
    S: AirQualitySensor,
    D: DisplaySink,
    N: Notifier,
{
    pub fn new(sensor: S, display: D, notifier: N) -> Self {
        Self {
            sensor,
            display,
            notifier,
            throttle: ThrottleState::new(),
        }
    }

    pub fn poll_once(&mut self, now_secs: u64) {
        match self.sensor.poll() {
            SensorEvent::Reading { co2, tvoc } => {
                let sample = SensorSample {
                    co2,
                    tvoc,
                    timestamp_secs: now_secs,
                };
                if self.throttle.should_notify(&sample) {
                    self.notifier.notify(co2, tvoc);
                }
                info!("{} ppm", co2);
                self.display.show_reading(co2, tvoc, sample.is_alarm());
            }
            SensorEvent::Fault(ErrorRegister::CommFailure) => {
                error!("Failed to get ERROR_ID register.");
            }
            SensorEvent::Fault(ErrorRegister::Faults(flags)) => {
                error!("Sensor error: {}", flags);
            }
            SensorEvent::Idle => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    struct ScriptedSensor {
        events: Vec<SensorEvent>,
        cursor: usize,
    }

    impl ScriptedSensor {
        fn new(events: Vec<SensorEvent>) -> Self {
            Self { events, cursor: 0 }
        }
    }

    impl AirQualitySensor for &mut ScriptedSensor {
        fn poll(&mut self) -> SensorEvent {
            let event = self.events[self.cursor];
            self.cursor += 1;
            event
        }
    }

    #[derive(Default)]
    struct RecordingDisplay {
        frames: Vec<(u16, u16, bool)>,
    }

    impl DisplaySink for &mut RecordingDisplay {
        fn show_reading(&mut self, co2: u16, tvoc: u16, alarm: bool) {
            self.frames.push((co2, tvoc, alarm));
        }
    }

    #[derive(Default)]
    struct CountingNotifier {
        sent: Vec<(u16, u16)>,
    }

    impl Notifier for &mut CountingNotifier {
        fn notify(&mut self, co2: u16, tvoc: u16) {
            self.sent.push((co2, tvoc));
        }
    }

    fn reading(co2: u16, tvoc: u16) -> SensorEvent {
        SensorEvent::Reading { co2, tvoc }
    }

    #[test]
    fn test_alert_scenario_after_boot() {
        // t=0 fires, t=100 is inside the cooldown, t=400 fires again
        let mut sensor = ScriptedSensor::new(alloc::vec![
            reading(2000, 120),
            reading(2000, 130),
            reading(2000, 140),
        ]);
        let mut display = RecordingDisplay::default();
        let mut notifier = CountingNotifier::default();
        let mut monitor = Monitor::new(&mut sensor, &mut display, &mut notifier);

        monitor.poll_once(0);
        monitor.poll_once(100);
        monitor.poll_once(400);

        assert_eq!(notifier.sent, alloc::vec![(2000, 120), (2000, 140)]);
        // Every reading is rendered with the alarm background
        assert_eq!(
            display.frames,
            alloc::vec![(2000, 120, true), (2000, 130, true), (2000, 140, true)]
        );
    }

    #[test]
    fn test_clean_air_renders_without_alarm() {
        let mut sensor = ScriptedSensor::new(alloc::vec![reading(450, 8)]);
        let mut display = RecordingDisplay::default();
        let mut notifier = CountingNotifier::default();
        let mut monitor = Monitor::new(&mut sensor, &mut display, &mut notifier);

        monitor.poll_once(0);

        assert!(notifier.sent.is_empty());
        assert_eq!(display.frames, alloc::vec![(450, 8, false)]);
    }

    #[test]
    fn test_fault_and_idle_touch_nothing() {
        let mut sensor = ScriptedSensor::new(alloc::vec![
            SensorEvent::Fault(ErrorRegister::CommFailure),
            SensorEvent::Fault(ErrorRegister::decode(0b0000_1010)),
            SensorEvent::Idle,
        ]);
        let mut display = RecordingDisplay::default();
        let mut notifier = CountingNotifier::default();
        let mut monitor = Monitor::new(&mut sensor, &mut display, &mut notifier);

        monitor.poll_once(0);
        monitor.poll_once(5);
        monitor.poll_once(10);

        assert!(notifier.sent.is_empty());
        assert!(display.frames.is_empty());
    }

    #[test]
    fn test_fault_does_not_consume_cooldown() {
        let mut sensor = ScriptedSensor::new(alloc::vec![
            SensorEvent::Fault(ErrorRegister::CommFailure),
            reading(1600, 20),
        ]);
        let mut display = RecordingDisplay::default();
        let mut notifier = CountingNotifier::default();
        let mut monitor = Monitor::new(&mut sensor, &mut display, &mut notifier);

        monitor.poll_once(0);
        monitor.poll_once(5);

        assert_eq!(notifier.sent, alloc::vec![(1600, 20)]);
    }
}
