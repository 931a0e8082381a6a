//! End-to-end ranging: trigger → simulated echo edges → register →
//! ControllerService, with a manually advanced microsecond clock.

use std::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use super::mock_hw::LogSink;

use rover::app::events::AppEvent;
use rover::app::ports::{ActuatorPort, RangingPort};
use rover::app::service::ControllerService;
use rover::config::RoverConfig;
use rover::drivers::motor::{ChannelOutputs, MotorDriver};
use rover::error::SensorError;
use rover::fsm::MotionState;
use rover::sensors::register::{DistanceCm, DistanceRegister, NO_ECHO_CM};
use rover::sensors::ultrasonic::{EchoCapture, Phase, RangingStatus, UltrasonicSensor};

struct SimPin;

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Ranging through the real driver, motors through the host LEDC stubs.
struct SimRover<'a> {
    sensor: UltrasonicSensor<'a, SimPin, NoDelay>,
    motors: MotorDriver,
    now_us: u32,
}

impl RangingPort for SimRover<'_> {
    fn trigger_ranging(&mut self) -> Result<RangingStatus, SensorError> {
        self.sensor.range_once(self.now_us)
    }
    fn read_distance_cm(&mut self) -> DistanceCm {
        self.sensor.distance_cm()
    }
}

impl ActuatorPort for SimRover<'_> {
    fn stop_all(&mut self) {
        self.motors.stop_all().unwrap();
    }
    fn set_outputs(&mut self, outputs: ChannelOutputs) {
        self.motors.write(outputs).unwrap();
    }
}

const POLL_US: u32 = 60_000;

/// Simulate the echo ISR answering the current cycle with `cm`.
fn echo(cap: &EchoCapture, reg: &DistanceRegister, start_us: u32, cm: u32) {
    cap.on_edge(true, start_us + 400, reg);
    cap.on_edge(false, start_us + 400 + cm * 58, reg);
}

#[test]
fn echo_published_between_ticks_drives_the_controller() {
    let reg = DistanceRegister::new();
    let cap = EchoCapture::new();
    let cfg = RoverConfig::default();
    let sensor = UltrasonicSensor::new(SimPin, NoDelay, &cap, &reg, &cfg);
    let mut rover = SimRover { sensor, motors: MotorDriver::new(), now_us: 0 };
    let mut sink = LogSink::new();
    let mut app = ControllerService::new(cfg);
    app.start(&mut rover, &mut sink);

    // Tick 1 triggers; the register still holds the power-on 0.
    app.tick(&mut rover, &mut sink);
    assert_eq!(app.state(), MotionState::Stopped);
    echo(&cap, &reg, rover.now_us, 100);
    assert_eq!(reg.read(), 100);

    // Tick 2 sees the 100 cm published by the ISR.
    rover.now_us += POLL_US;
    app.tick(&mut rover, &mut sink);
    assert_eq!(app.state(), MotionState::Forward);
    assert_eq!(rover.motors.applied().left_forward, 255);

    // Obstacle closes in.
    echo(&cap, &reg, rover.now_us, 35);
    rover.now_us += POLL_US;
    app.tick(&mut rover, &mut sink);
    assert_eq!(app.state(), MotionState::TurningLeft);
    assert_eq!(rover.motors.applied().right_forward, 150);
    assert_eq!(rover.sensor.phase(), Phase::Triggered);
}

#[test]
fn silent_sensor_times_out_into_no_echo() {
    let reg = DistanceRegister::new();
    let cap = EchoCapture::new();
    let cfg = RoverConfig::default();
    let sensor = UltrasonicSensor::new(SimPin, NoDelay, &cap, &reg, &cfg);
    let mut rover = SimRover { sensor, motors: MotorDriver::new(), now_us: 1_000 };
    let mut sink = LogSink::new();
    let mut app = ControllerService::new(cfg);
    app.start(&mut rover, &mut sink);

    app.tick(&mut rover, &mut sink);
    rover.now_us += POLL_US;
    app.tick(&mut rover, &mut sink);

    assert_eq!(reg.read(), NO_ECHO_CM);
    assert!(sink.events.contains(&AppEvent::EchoTimeout));
    assert_eq!(app.state(), MotionState::Forward);
}

#[test]
fn late_echo_of_abandoned_cycle_is_not_mistaken_for_new_one() {
    let reg = DistanceRegister::new();
    let cap = EchoCapture::new();
    let cfg = RoverConfig::default();
    let timeout = cfg.echo_timeout_us();

    assert_eq!(cap.begin(0, timeout, &reg), Ok(RangingStatus::Started));
    // Rising edge arrives, falling edge never does before the timeout.
    cap.on_edge(true, 500, &reg);
    assert_eq!(
        cap.begin(POLL_US, timeout, &reg),
        Ok(RangingStatus::RestartedAfterTimeout)
    );
    // A stray falling edge with no rising edge in the new cycle is ignored.
    assert_eq!(cap.on_edge(false, POLL_US + 10, &reg), None);
    assert_eq!(reg.read(), NO_ECHO_CM);
}

#[test]
fn overlapping_trigger_is_refused_until_echo_completes() {
    let reg = DistanceRegister::new();
    let cap = EchoCapture::new();
    let cfg = RoverConfig::default();
    let mut sensor = UltrasonicSensor::new(SimPin, NoDelay, &cap, &reg, &cfg);

    assert_eq!(sensor.range_once(0), Ok(RangingStatus::Started));
    assert_eq!(sensor.range_once(20_000), Err(SensorError::Busy));
    echo(&cap, &reg, 0, 60);
    assert_eq!(sensor.range_once(30_000), Ok(RangingStatus::Started));
    assert_eq!(sensor.distance_cm(), 60);
}

#[test]
fn global_isr_entry_feeds_global_register() {
    use rover::sensors::{DISTANCE_REGISTER, ECHO_CAPTURE, echo_isr_handler};

    // The only test touching the statics.
    let timeout = RoverConfig::default().echo_timeout_us();
    ECHO_CAPTURE.begin(5_000, timeout, &DISTANCE_REGISTER).unwrap();
    echo_isr_handler(true, 5_300);
    echo_isr_handler(false, 5_300 + 58 * 250);
    assert_eq!(DISTANCE_REGISTER.read(), 250);
    assert_eq!(ECHO_CAPTURE.phase(), Phase::Idle);
}
