//! Rover Firmware: main entry point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  HardwareAdapter              LogEventSink               │
//! │  (Ranging + Actuator)         (EventSink)                │
//! │                                                          │
//! │  ──────────── Port Trait Boundary ───────────            │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │        ControllerService (pure logic)          │      │
//! │  │        Movement FSM · MotionContext            │      │
//! │  └────────────────────────────────────────────────┘      │
//! │                                                          │
//! │  echo ISR ──▶ DistanceRegister ◀── polling loop          │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::{Ets, FreeRtos};
use log::{error, info, warn};

use rover::adapters::hardware::HardwareAdapter;
use rover::adapters::log_sink::LogEventSink;
use rover::adapters::time::Esp32TimeAdapter;
use rover::app::service::ControllerService;
use rover::config::RoverConfig;
use rover::drivers::hw_init;
use rover::drivers::motor::MotorDriver;
use rover::drivers::trigger_pin::GpioTrigger;
use rover::pins;
use rover::sensors::ultrasonic::UltrasonicSensor;
use rover::sensors::{DISTANCE_REGISTER, ECHO_CAPTURE};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Rover v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = match RoverConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config override rejected ({}), using defaults", e);
            RoverConfig::default()
        }
    };
    info!(
        "Config: threshold={}cm stuck={} ticks poll={}ms preset={:?}",
        config.obstacle_threshold_cm, config.stuck_timeout_ticks, config.poll_interval_ms, config.preset
    );

    // ── 3. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Motors may be in an undefined state; do not start driving.
        error!("HAL init failed: {}, halting", e);
        return Err(anyhow::anyhow!(e));
    }
    hw_init::init_isr_service().map_err(|e| anyhow::anyhow!("ISR service init failed: {}", e))?;

    // ── 4. Adapters + service ─────────────────────────────────
    let sensor = UltrasonicSensor::new(
        GpioTrigger::new(pins::US_TRIGGER_GPIO),
        Ets,
        &ECHO_CAPTURE,
        &DISTANCE_REGISTER,
        &config,
    );
    let mut hw = HardwareAdapter::new(sensor, MotorDriver::new(), Esp32TimeAdapter::new());
    let mut sink = LogEventSink::new();

    let poll_ms = config.poll_interval_ms;
    let mut app = ControllerService::new(config);
    app.start(&mut hw, &mut sink);

    info!("System ready. Entering polling loop ({} ms).", poll_ms);

    // ── 5. Polling loop ───────────────────────────────────────
    loop {
        FreeRtos::delay_ms(poll_ms);
        app.tick(&mut hw, &mut sink);
    }
}
