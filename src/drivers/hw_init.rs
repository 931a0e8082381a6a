//! One-shot hardware peripheral initialization.
//!
//! Configures the ultrasonic trigger/echo GPIOs, the LEDC timer and the four
//! motor channels using raw ESP-IDF sys calls, and registers the echo-edge
//! ISR. Called once from `main()` before the polling loop starts. Host
//! builds get no-op stubs.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

use crate::error::ActuatorError;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(e: HwInitError) -> Self {
        match e {
            HwInitError::GpioConfigFailed(_) => Self::Init("gpio"),
            HwInitError::LedcInitFailed(_) => Self::Init("ledc"),
            HwInitError::IsrInstallFailed(_) => Self::Init("isr"),
        }
    }
}

#[cfg(target_os = "espidf")]
fn check(ret: esp_err_t, err: fn(i32) -> HwInitError) -> Result<(), HwInitError> {
    if ret == ESP_OK as i32 { Ok(()) } else { Err(err(ret)) }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the polling loop; single-threaded.
    unsafe {
        init_ultrasonic_gpio()?;
        init_ledc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── Ultrasonic GPIO ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_ultrasonic_gpio() -> Result<(), HwInitError> {
    let trigger = gpio_config_t {
        pin_bit_mask: 1u64 << pins::US_TRIGGER_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    check(unsafe { gpio_config(&trigger) }, HwInitError::GpioConfigFailed)?;
    unsafe { gpio_set_level(pins::US_TRIGGER_GPIO, 0) };

    // Interrupt type is set when the ISR is registered.
    let echo = gpio_config_t {
        pin_bit_mask: 1u64 << pins::US_ECHO_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    check(unsafe { gpio_config(&echo) }, HwInitError::GpioConfigFailed)?;

    info!(
        "hw_init: ultrasonic trigger=GPIO{} echo=GPIO{}",
        pins::US_TRIGGER_GPIO,
        pins::US_ECHO_GPIO
    );
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), i32> {
    // SAFETY: pin was configured as an output in init_ultrasonic_gpio().
    let ret = unsafe { gpio_set_level(pin, if high { 1 } else { 0 }) };
    if ret == ESP_OK as i32 { Ok(()) } else { Err(ret) }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) -> Result<(), i32> {
    Ok(())
}

// ── LEDC PWM ─────────────────────────────────────────────────

pub const LEDC_CH_RIGHT_FWD: u32 = 0;
pub const LEDC_CH_LEFT_FWD: u32 = 1;
pub const LEDC_CH_RIGHT_BACK: u32 = 2;
pub const LEDC_CH_LEFT_BACK: u32 = 3;

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    // Timer 0: drive motors (1 kHz, 8-bit)
    let timer0 = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
        freq_hz: pins::MOTOR_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    check(unsafe { ledc_timer_config(&timer0) }, HwInitError::LedcInitFailed)?;

    let channels = [
        (LEDC_CH_RIGHT_FWD, pins::MOTOR_RIGHT_FWD_GPIO),
        (LEDC_CH_LEFT_FWD, pins::MOTOR_LEFT_FWD_GPIO),
        (LEDC_CH_RIGHT_BACK, pins::MOTOR_RIGHT_BACK_GPIO),
        (LEDC_CH_LEFT_BACK, pins::MOTOR_LEFT_BACK_GPIO),
    ];
    for (channel, gpio) in channels {
        let cfg = ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel,
            timer_sel: ledc_timer_t_LEDC_TIMER_0,
            gpio_num: gpio,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        };
        check(unsafe { ledc_channel_config(&cfg) }, HwInitError::LedcInitFailed)?;
    }

    info!("hw_init: LEDC configured (motors=CH0-3, {} Hz)", pins::MOTOR_PWM_FREQ_HZ);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u8) -> Result<(), ActuatorError> {
    // SAFETY: LEDC channels were configured in init_ledc(); only the polling
    // loop writes duty registers.
    unsafe {
        let ret = ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, duty as u32);
        if ret != ESP_OK as i32 {
            return Err(ActuatorError::PwmWriteFailed(ret));
        }
        let ret = ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
        if ret != ESP_OK as i32 {
            return Err(ActuatorError::PwmWriteFailed(ret));
        }
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u8) -> Result<(), ActuatorError> {
    Ok(())
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn echo_gpio_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: register read and RTC counter read; both safe in ISR context.
    let high = unsafe { gpio_get_level(pins::US_ECHO_GPIO) } != 0;
    // Truncation is intended: widths use wrapping u32 arithmetic.
    let now_us = unsafe { esp_timer_get_time() } as u32;
    crate::sensors::echo_isr_handler(high, now_us);
}

/// Install the GPIO ISR service and register the echo any-edge handler.
/// Call after init_peripherals() and before the polling loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: ESP_ERR_INVALID_STATE means the service was already installed
    // (acceptable). The handler only touches the lock-free echo capture.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        check(
            gpio_set_intr_type(pins::US_ECHO_GPIO, gpio_int_type_t_GPIO_INTR_ANYEDGE),
            HwInitError::IsrInstallFailed,
        )?;
        check(
            gpio_isr_handler_add(pins::US_ECHO_GPIO, Some(echo_gpio_isr), core::ptr::null_mut()),
            HwInitError::IsrInstallFailed,
        )?;
        check(gpio_intr_enable(pins::US_ECHO_GPIO), HwInitError::IsrInstallFailed)?;
    }
    info!("hw_init: ISR service installed (echo any-edge)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
