//! Integration tests for the ControllerService → FSM → actuators pipeline.
//!
//! Drive the service tick by tick through the port traits with a scripted
//! distance and check transitions, actuator command order and events.

use super::mock_hw::{ActuatorCall, LogSink, MockHardware};

use rover::app::events::AppEvent;
use rover::app::service::ControllerService;
use rover::config::{Preset, RoverConfig};
use rover::drivers::motor::{ChannelOutputs, apply_state};
use rover::error::SensorError;
use rover::fsm::MotionState;
use rover::sensors::register::NO_ECHO_CM;
use rover::sensors::ultrasonic::RangingStatus;

fn make_app_with(config: RoverConfig) -> (ControllerService, MockHardware, LogSink) {
    let mut app = ControllerService::new(config);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    app.start(&mut hw, &mut sink);
    (app, hw, sink)
}

fn make_app() -> (ControllerService, MockHardware, LogSink) {
    make_app_with(RoverConfig::default())
}

fn run(app: &mut ControllerService, hw: &mut MockHardware, sink: &mut LogSink, ticks: usize) {
    for _ in 0..ticks {
        app.tick(hw, sink);
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_stops_motors_and_reports_initial_state() {
    let (app, hw, sink) = make_app();
    assert_eq!(app.state(), MotionState::Stopped);
    assert_eq!(hw.calls, vec![ActuatorCall::StopAll]);
    assert_eq!(sink.events, vec![AppEvent::Started(MotionState::Stopped)]);
}

#[test]
fn power_on_zero_reading_keeps_rover_stopped() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.clear_calls();
    run(&mut app, &mut hw, &mut sink, 20);
    assert_eq!(app.state(), MotionState::Stopped);
    assert!(hw.calls.is_empty(), "no transition, no actuator writes");
    assert_eq!(hw.triggers, 20, "a ranging cycle is requested every tick");
}

#[test]
fn first_clear_reading_starts_driving_stop_then_set() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.clear_calls();
    hw.distance = 120;
    app.tick(&mut hw, &mut sink);

    assert_eq!(app.state(), MotionState::Forward);
    let fwd = apply_state(MotionState::Forward, app.config());
    assert_eq!(hw.calls, vec![ActuatorCall::StopAll, ActuatorCall::Set(fwd)]);
    assert!(sink.events.contains(&AppEvent::StateChanged {
        from: MotionState::Stopped,
        to: MotionState::Forward,
        distance_cm: 120,
    }));
}

// ── Avoidance ─────────────────────────────────────────────────

#[test]
fn avoidance_turns_alternate_starting_left() {
    let (mut app, mut hw, mut sink) = make_app();

    hw.distance = 200;
    app.tick(&mut hw, &mut sink);
    hw.distance = 30;
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), MotionState::TurningLeft);

    hw.distance = 200;
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), MotionState::Forward);
    hw.distance = 30;
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), MotionState::TurningRight);

    assert_eq!(
        sink.transitions(),
        vec![
            (MotionState::Stopped, MotionState::Forward),
            (MotionState::Forward, MotionState::TurningLeft),
            (MotionState::TurningLeft, MotionState::Forward),
            (MotionState::Forward, MotionState::TurningRight),
        ]
    );
    assert_eq!(hw.outputs(), ChannelOutputs { left_forward: 150, ..ChannelOutputs::OFF });
}

#[test]
fn forward_keeps_counting_while_clear() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.distance = 100;
    app.tick(&mut hw, &mut sink);
    hw.clear_calls();
    run(&mut app, &mut hw, &mut sink, 6);
    assert_eq!(app.state(), MotionState::Forward);
    assert_eq!(app.state_timer(), 6);
    assert!(hw.calls.is_empty());
}

// ── Stuck escalation ──────────────────────────────────────────

#[test]
fn dead_end_turn_backs_up_then_recovers() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.distance = 200;
    app.tick(&mut hw, &mut sink);
    hw.distance = 20;
    app.tick(&mut hw, &mut sink);
    assert!(app.state().is_turning());

    // Timer 0..=30 holds the turn, 31 escalates on the next evaluation.
    run(&mut app, &mut hw, &mut sink, 31);
    assert!(app.state().is_turning());
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), MotionState::Backward);
    assert_eq!(hw.outputs(), apply_state(MotionState::Backward, app.config()));

    // Backs up for the full timeout even though the path is still blocked.
    run(&mut app, &mut hw, &mut sink, 31);
    assert_eq!(app.state(), MotionState::Backward);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), MotionState::Forward);
    assert_eq!(app.state_timer(), 0);
}

#[test]
fn stuck_cycle_repeats_without_fault() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.distance = 200;
    app.tick(&mut hw, &mut sink);
    hw.distance = 10;
    run(&mut app, &mut hw, &mut sink, 500);

    let transitions = sink.transitions();
    assert!(transitions.contains(&(MotionState::TurningLeft, MotionState::Backward)));
    assert!(transitions.contains(&(MotionState::TurningRight, MotionState::Backward)));
    assert!(transitions.contains(&(MotionState::Backward, MotionState::Forward)));
    assert!(!transitions.iter().any(|(_, to)| *to == MotionState::Stopped));
}

#[test]
fn simple_preset_turns_until_clear() {
    let cfg = RoverConfig { preset: Preset::Simple, ..RoverConfig::default() };
    let (mut app, mut hw, mut sink) = make_app_with(cfg);
    hw.distance = 200;
    app.tick(&mut hw, &mut sink);
    hw.distance = 10;
    run(&mut app, &mut hw, &mut sink, 300);

    assert_eq!(app.state(), MotionState::TurningLeft);
    assert!(!sink.transitions().iter().any(|(_, to)| *to == MotionState::Backward));

    hw.distance = 90;
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), MotionState::Forward);
}

// ── Ranging outcomes ──────────────────────────────────────────

#[test]
fn echo_timeout_reads_as_clear_path() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.ranging.push_back(Ok(RangingStatus::RestartedAfterTimeout));
    hw.distance = NO_ECHO_CM;
    app.tick(&mut hw, &mut sink);

    assert_eq!(app.state(), MotionState::Forward);
    assert!(sink.events.contains(&AppEvent::EchoTimeout));
    assert_eq!(app.build_telemetry().echo_timeouts, 1);
}

#[test]
fn busy_sensor_reuses_last_distance() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.distance = 150;
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), MotionState::Forward);

    hw.ranging.push_back(Err(SensorError::Busy));
    hw.ranging.push_back(Err(SensorError::Busy));
    run(&mut app, &mut hw, &mut sink, 2);
    assert_eq!(app.state(), MotionState::Forward);
    assert_eq!(app.build_telemetry().busy_refusals, 2);
}

#[test]
fn trigger_failure_does_not_stop_the_loop() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.ranging.push_back(Err(SensorError::TriggerFailed));
    hw.distance = 150;
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), MotionState::Forward);
    assert!(sink.events.contains(&AppEvent::TriggerFailed));
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_snapshot_matches_controller() {
    let cfg = RoverConfig { telemetry_interval_ticks: 5, ..RoverConfig::default() };
    let (mut app, mut hw, mut sink) = make_app_with(cfg);
    hw.distance = 75;
    run(&mut app, &mut hw, &mut sink, 5);

    let telem: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(t.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(telem.len(), 1);
    let t = &telem[0];
    assert_eq!(t.state, MotionState::Forward);
    assert_eq!(t.distance_cm, 75);
    assert_eq!(t.state_timer, 4);
    assert_eq!(t.tick_count, 5);
    assert_eq!(t.transitions, 1);
    assert_eq!(t.outputs, apply_state(MotionState::Forward, app.config()));
}
